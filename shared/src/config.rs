//! Configuration management for Lambda functions.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table mapping Alexa user IDs to IoT thing names
    pub user_device_table: String,
    /// DynamoDB table holding the sensor telemetry history
    pub telemetry_table: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// table names used by the provisioning stack.
    pub fn from_env() -> Self {
        Self {
            user_device_table: env::var("USER_DEVICE_TABLE")
                .unwrap_or_else(|_| "user_thing".to_string()),
            telemetry_table: env::var("TELEMETRY_TABLE")
                .unwrap_or_else(|_| "SensorDataHistory".to_string()),
        }
    }
}

//! Telemetry Writer Lambda - persists sensor telemetry to the history table.
//!
//! Triggered by an IoT topic rule with one flat event per reading. Writes
//! a single DynamoDB item per invocation and re-raises write failures so
//! the rule engine can apply its own retry and alerting policy.

use aws_sdk_dynamodb::types::AttributeValue;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use shared::Config;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Flat event produced by the IoT rule's SQL projection. Every field is
/// optional; a partial reading is still a valid record.
#[derive(Debug, Serialize, Deserialize)]
struct TelemetryEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thing_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    humidity: Option<f64>,
    #[serde(rename = "pumpState", default, skip_serializing_if = "Option::is_none")]
    pump_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

impl TelemetryEvent {
    /// Build the history item, dropping absent fields entirely. Nothing is
    /// ever stored as a null or empty attribute.
    fn into_item(self) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        if let Some(thing_name) = self.thing_name {
            item.insert("thing_name".to_string(), AttributeValue::S(thing_name));
        }
        if let Some(timestamp) = self.timestamp {
            item.insert(
                "timestamp".to_string(),
                AttributeValue::N(timestamp.to_string()),
            );
        }
        if let Some(humidity) = self.humidity {
            item.insert(
                "humidity".to_string(),
                AttributeValue::N(humidity.to_string()),
            );
        }
        if let Some(pump_state) = self.pump_state {
            item.insert("pumpState".to_string(), AttributeValue::S(pump_state));
        }
        if let Some(mode) = self.mode {
            item.insert("mode".to_string(), AttributeValue::S(mode));
        }
        item
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WriterResponse {
    status_code: u16,
    body: String,
}

struct AppState {
    dynamo: aws_sdk_dynamodb::Client,
    table: String,
}

impl AppState {
    async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let config = Config::from_env();

        Self {
            dynamo: aws_sdk_dynamodb::Client::new(&aws_config),
            table: config.telemetry_table,
        }
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<TelemetryEvent>,
) -> Result<WriterResponse, Error> {
    let telemetry = event.payload;
    if let Ok(json) = serde_json::to_string(&telemetry) {
        info!(event = %json, "event received from IoT rule");
    }

    let result = state
        .dynamo
        .put_item()
        .table_name(&state.table)
        .set_item(Some(telemetry.into_item()))
        .send()
        .await;

    finish_write(result.map(|_| ()), &state.table)
}

/// Turn the store call's outcome into the handler result. Failures are
/// logged and then surfaced unchanged; the IoT rule owns retry policy.
fn finish_write<E>(result: Result<(), E>, table: &str) -> Result<WriterResponse, Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match result {
        Ok(()) => {
            info!(table = %table, "telemetry record written");
            Ok(WriterResponse {
                status_code: 200,
                body: "Data saved successfully!".to_string(),
            })
        }
        Err(e) => {
            error!(table = %table, error = %e, "failed to write telemetry record");
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}

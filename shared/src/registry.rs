//! User-to-device registry backed by DynamoDB.
//!
//! The mapping table is owned by the provisioning stack; this client only
//! ever reads from it.

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::debug;

use crate::{Error, Result};

/// Read-only client for the Alexa-user to IoT-thing mapping table.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    client: Client,
    table: String,
}

impl DeviceRegistry {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Resolve an Alexa user ID to its provisioned thing name. Returns
    /// `Ok(None)` when no mapping exists for the user.
    pub async fn thing_name_for_user(&self, user_id: &str) -> Result<Option<String>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Registry(e.to_string()))?;

        let thing_name = output
            .item
            .and_then(|mut item| item.remove("thing_name"))
            .and_then(|value| match value {
                AttributeValue::S(s) => Some(s),
                _ => None,
            });

        debug!(user_id = %user_id, found = thing_name.is_some(), "registry lookup");
        Ok(thing_name)
    }
}

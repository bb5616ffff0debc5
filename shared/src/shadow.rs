//! Device shadow access through the IoT Data Plane.

use aws_sdk_iotdataplane::primitives::Blob;
use aws_sdk_iotdataplane::Client;
use serde::Serialize;
use tracing::debug;

use crate::models::{DesiredState, ShadowDocument};
use crate::{Error, Result};

/// Update payload wrapper: `{"state": {"desired": {...}}}`.
#[derive(Debug, Serialize)]
struct ShadowUpdate<'a> {
    state: UpdateState<'a>,
}

#[derive(Debug, Serialize)]
struct UpdateState<'a> {
    desired: &'a DesiredState,
}

/// Client for reading and updating per-device shadow documents.
#[derive(Debug, Clone)]
pub struct ShadowClient {
    client: Client,
}

impl ShadowClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Merge a partial desired state into the device's shadow. The shadow
    /// store owns conflict resolution; no version handling happens here.
    pub async fn update_desired(&self, thing_name: &str, desired: &DesiredState) -> Result<()> {
        let payload = serde_json::to_vec(&ShadowUpdate {
            state: UpdateState { desired },
        })?;

        self.client
            .update_thing_shadow()
            .thing_name(thing_name)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| Error::Shadow(e.to_string()))?;

        debug!(thing_name = %thing_name, "shadow desired state updated");
        Ok(())
    }

    /// Fetch the full shadow document for a device.
    pub async fn get(&self, thing_name: &str) -> Result<ShadowDocument> {
        let output = self
            .client
            .get_thing_shadow()
            .thing_name(thing_name)
            .send()
            .await
            .map_err(|e| Error::Shadow(e.to_string()))?;

        let payload = output
            .payload
            .ok_or_else(|| Error::Shadow("empty shadow payload".to_string()))?;

        Ok(serde_json::from_slice(payload.as_ref())?)
    }
}

//! Shared data models: Alexa request/response envelopes and the
//! irrigation domain types carried through the device shadow.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inbound Alexa skill event. A tolerant projection of the raw request
/// value; unmodeled Alexa fields are ignored on deserialization.
#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub request: Request,
    #[serde(default)]
    pub session: Option<Session>,
}

impl SkillRequest {
    /// The Alexa user ID of the caller, if the event carries one.
    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref()?.user.as_ref()?.user_id.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub user: Option<SessionUser>,
}

#[derive(Debug, Deserialize)]
pub struct SessionUser {
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub intent: Option<IntentPayload>,
}

#[derive(Debug, Deserialize)]
pub struct IntentPayload {
    pub name: String,
    #[serde(default)]
    pub slots: Option<HashMap<String, Slot>>,
}

impl IntentPayload {
    /// Value of a named slot, if present and filled.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots.as_ref()?.get(name)?.value.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

/// Outbound Alexa response envelope.
#[derive(Debug, Serialize)]
pub struct SkillResponse {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub output_speech: OutputSpeech,
    pub should_end_session: bool,
}

#[derive(Debug, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub text: String,
}

impl SkillResponse {
    /// Plain-text response that ends the session.
    pub fn speak(text: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            response: ResponseBody {
                output_speech: OutputSpeech {
                    speech_type: "PlainText".to_string(),
                    text: text.into(),
                },
                should_end_session: true,
            },
        }
    }
}

/// Pump actuator state as stored in the device shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PumpState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
}

impl PumpState {
    /// Normalize a voice slot value. Lenient on purpose: anything that is
    /// not exactly "ON" maps to OFF, including a missing slot.
    pub fn from_slot(value: Option<&str>) -> Self {
        match value {
            Some("ON") => PumpState::On,
            _ => PumpState::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PumpState::On => "ON",
            PumpState::Off => "OFF",
        }
    }
}

/// Operating mode of the irrigation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingMode {
    #[serde(rename = "AUTO")]
    Auto,
    #[serde(rename = "MANUAL")]
    Manual,
}

impl OperatingMode {
    /// Normalize a voice slot value. "auto" and "automático" (any letter
    /// case) select AUTO; everything else falls back to MANUAL.
    pub fn from_slot(value: Option<&str>) -> Self {
        match value.map(|v| v.to_lowercase()).as_deref() {
            Some("auto") | Some("automático") => OperatingMode::Auto,
            _ => OperatingMode::Manual,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingMode::Auto => "AUTO",
            OperatingMode::Manual => "MANUAL",
        }
    }
}

/// Desired-state partition written to the device shadow. Absent fields are
/// omitted from the payload so the shadow store merges only what we set.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_state: Option<PumpState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<OperatingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_threshold: Option<i64>,
}

/// Reported-state partition read back from the device shadow. The device
/// owns these fields; every one of them may be missing independently.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedState {
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub pump_state: Option<String>,
    #[serde(default)]
    pub humidity_threshold: Option<i64>,
}

/// Full shadow document as returned by GetThingShadow.
#[derive(Debug, Deserialize)]
pub struct ShadowDocument {
    pub state: ShadowState,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShadowState {
    #[serde(default)]
    pub desired: Option<serde_json::Value>,
    #[serde(default)]
    pub reported: Option<ReportedState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pump_state_only_exact_on_is_on() {
        assert_eq!(PumpState::from_slot(Some("ON")), PumpState::On);
        assert_eq!(PumpState::from_slot(Some("on")), PumpState::Off);
        assert_eq!(PumpState::from_slot(Some("encendida")), PumpState::Off);
        assert_eq!(PumpState::from_slot(None), PumpState::Off);
    }

    #[test]
    fn test_mode_normalization() {
        assert_eq!(OperatingMode::from_slot(Some("auto")), OperatingMode::Auto);
        assert_eq!(OperatingMode::from_slot(Some("AUTO")), OperatingMode::Auto);
        assert_eq!(
            OperatingMode::from_slot(Some("Automático")),
            OperatingMode::Auto
        );
        assert_eq!(
            OperatingMode::from_slot(Some("manual")),
            OperatingMode::Manual
        );
        assert_eq!(
            OperatingMode::from_slot(Some("whatever")),
            OperatingMode::Manual
        );
        assert_eq!(OperatingMode::from_slot(None), OperatingMode::Manual);
    }

    #[test]
    fn test_desired_state_omits_absent_fields() {
        let desired = DesiredState {
            humidity_threshold: Some(40),
            ..Default::default()
        };
        let json = serde_json::to_value(&desired).unwrap();
        assert_eq!(json, serde_json::json!({"humidityThreshold": 40}));
    }

    #[test]
    fn test_desired_state_pump_update_shape() {
        let desired = DesiredState {
            pump_state: Some(PumpState::On),
            mode: Some(OperatingMode::Manual),
            humidity_threshold: None,
        };
        let json = serde_json::to_value(&desired).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"pumpState": "ON", "mode": "MANUAL"})
        );
    }

    #[test]
    fn test_skill_response_envelope_shape() {
        let response = SkillResponse::speak("Goodbye.");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": {"type": "PlainText", "text": "Goodbye."},
                    "shouldEndSession": true
                }
            })
        );
    }

    #[test]
    fn test_skill_request_accessors() {
        let event: SkillRequest = serde_json::from_value(serde_json::json!({
            "session": {"user": {"userId": "amzn1.ask.account.ABC"}},
            "request": {
                "type": "IntentRequest",
                "intent": {
                    "name": "PumpControlIntent",
                    "slots": {"state": {"value": "ON"}}
                }
            }
        }))
        .unwrap();

        assert_eq!(event.user_id(), Some("amzn1.ask.account.ABC"));
        let intent = event.request.intent.as_ref().unwrap();
        assert_eq!(intent.slot_value("state"), Some("ON"));
        assert_eq!(intent.slot_value("missing"), None);
    }

    #[test]
    fn test_shadow_document_without_reported() {
        let doc: ShadowDocument =
            serde_json::from_value(serde_json::json!({"state": {"desired": {"mode": "AUTO"}}}))
                .unwrap();
        assert!(doc.state.reported.is_none());
    }
}

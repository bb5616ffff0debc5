//! Alexa Skill Lambda - voice control for the irrigation controller.
//!
//! Resolves the calling Alexa user to an IoT thing, then routes the intent
//! to a device-shadow operation:
//! - PumpControlIntent - set pump ON/OFF (always forces MANUAL mode)
//! - SetThresholdIntent - set the humidity threshold for AUTO mode
//! - SetModeIntent - switch between AUTO and MANUAL
//! - GetStateIntent - speak the full reported state
//! - GetHumidityOnlyIntent - speak the current humidity reading
//!
//! Every failure degrades to a spoken apology; this handler never returns
//! an error to the Alexa platform.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{
    Config, DesiredState, DeviceRegistry, IntentPayload, OperatingMode, PumpState, ShadowClient,
    ShadowDocument, SkillRequest, SkillResponse,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const WELCOME: &str =
    "Welcome to the irrigation controller. You can ask for the status, change the mode, or control the pump.";
const HELP: &str =
    "You can ask for the status, turn the pump on or off, switch to auto or manual mode, or set the humidity threshold.";
const GOODBYE: &str = "Goodbye.";
const NOT_UNDERSTOOD: &str = "I did not understand that action.";
const UNSUPPORTED_REQUEST: &str = "I do not know how to handle that kind of request.";
const NO_DEVICE: &str = "Sorry, I could not find a device linked to your account.";
const THRESHOLD_NOT_UNDERSTOOD: &str =
    "I did not catch the humidity percentage. Please try again with a number.";
const UPDATE_FAILED: &str = "Sorry, I could not reach the device to apply that change.";
const NOT_REPORTED_YET: &str = "The device has not reported its state yet. Try again later.";
const STATUS_FAILED: &str = "Sorry, I could not get the device status.";
const NO_HUMIDITY_YET: &str =
    "I do not have a humidity reading from the sensor yet. Try again in a moment.";
const HUMIDITY_FAILED: &str = "Sorry, I could not get the humidity reading.";
const UNKNOWN_FIELD: &str = "unknown";

/// What an intent asks us to do against the device, decided before any
/// store call is made.
#[derive(Debug, PartialEq)]
enum Action {
    Speak(String),
    UpdateShadow {
        desired: DesiredState,
        confirmation: String,
    },
    ReadFullStatus,
    ReadHumidity,
}

/// Map an intent to its device action. Exact, case-sensitive match on the
/// intent name; anything outside the known set is a spoken fallback.
fn route(intent: &IntentPayload) -> Action {
    match intent.name.as_str() {
        // Manual pump control always leaves AUTO mode; the mode write in
        // the same update is a product decision, not an accident.
        "PumpControlIntent" => {
            let pump = PumpState::from_slot(intent.slot_value("state"));
            Action::UpdateShadow {
                desired: DesiredState {
                    pump_state: Some(pump),
                    mode: Some(OperatingMode::Manual),
                    humidity_threshold: None,
                },
                confirmation: format!(
                    "Done, I set the pump to {} and switched to manual mode.",
                    pump.as_str().to_lowercase()
                ),
            }
        }
        "SetThresholdIntent" => match intent
            .slot_value("humidity")
            .and_then(|v| v.parse::<i64>().ok())
        {
            Some(threshold) => Action::UpdateShadow {
                desired: DesiredState {
                    humidity_threshold: Some(threshold),
                    ..Default::default()
                },
                confirmation: format!(
                    "Understood, I set the humidity threshold to {} percent.",
                    threshold
                ),
            },
            None => Action::Speak(THRESHOLD_NOT_UNDERSTOOD.to_string()),
        },
        "SetModeIntent" => {
            let mode = OperatingMode::from_slot(intent.slot_value("mode"));
            Action::UpdateShadow {
                desired: DesiredState {
                    mode: Some(mode),
                    ..Default::default()
                },
                confirmation: format!(
                    "Perfect, I switched the system to {} mode.",
                    mode.as_str().to_lowercase()
                ),
            }
        }
        "GetStateIntent" => Action::ReadFullStatus,
        "GetHumidityOnlyIntent" => Action::ReadHumidity,
        "AMAZON.HelpIntent" => Action::Speak(HELP.to_string()),
        "AMAZON.CancelIntent" | "AMAZON.StopIntent" => Action::Speak(GOODBYE.to_string()),
        _ => Action::Speak(NOT_UNDERSTOOD.to_string()),
    }
}

/// One-sentence status report. Each reported field missing on its own is
/// spoken as "unknown"; a shadow with no reported partition at all gets
/// the dedicated "has not reported" reply.
fn render_status(doc: &ShadowDocument) -> String {
    let Some(reported) = &doc.state.reported else {
        return NOT_REPORTED_YET.to_string();
    };

    let humidity = reported
        .humidity
        .map(|h| h.to_string())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string());
    let mode = reported.mode.as_deref().unwrap_or(UNKNOWN_FIELD);
    let pump = reported.pump_state.as_deref().unwrap_or(UNKNOWN_FIELD);
    let threshold = reported
        .humidity_threshold
        .map(|t| t.to_string())
        .unwrap_or_else(|| UNKNOWN_FIELD.to_string());

    format!(
        "The current status is: mode {}, humidity at {} percent, threshold at {}, and the pump is {}.",
        mode, humidity, threshold, pump
    )
}

/// Humidity-only report. Requires a reported humidity value; everything
/// else gets the "no reading yet" reply, distinct from the full-status one.
fn render_humidity(doc: &ShadowDocument) -> String {
    match doc.state.reported.as_ref().and_then(|r| r.humidity) {
        Some(humidity) => format!(
            "The humidity currently reported by the sensor is {} percent.",
            humidity
        ),
        None => NO_HUMIDITY_YET.to_string(),
    }
}

struct AppState {
    registry: DeviceRegistry,
    shadows: ShadowClient,
}

impl AppState {
    async fn new() -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let config = Config::from_env();

        Self {
            registry: DeviceRegistry::new(
                aws_sdk_dynamodb::Client::new(&aws_config),
                config.user_device_table,
            ),
            shadows: ShadowClient::new(aws_sdk_iotdataplane::Client::new(&aws_config)),
        }
    }
}

/// What to do once the caller's device mapping is known. Without a
/// mapping the reply is fixed no matter which intent was asked.
#[derive(Debug, PartialEq)]
enum Decision {
    Reply(String),
    Device { thing_name: String, action: Action },
}

fn decide(thing_name: Option<String>, intent: Option<&IntentPayload>) -> Decision {
    let Some(thing_name) = thing_name else {
        return Decision::Reply(NO_DEVICE.to_string());
    };
    let Some(intent) = intent else {
        return Decision::Reply(NOT_UNDERSTOOD.to_string());
    };

    match route(intent) {
        Action::Speak(text) => Decision::Reply(text),
        action => Decision::Device { thing_name, action },
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<serde_json::Value>,
) -> Result<SkillResponse, Error> {
    // Log the raw value before typing it, so unmodeled Alexa fields
    // still show up in the trace.
    let raw = event.payload;
    info!(event = %raw, "event received from Alexa");

    let reply = match serde_json::from_value::<SkillRequest>(raw) {
        Ok(request) => match request.request.request_type.as_str() {
            "LaunchRequest" => SkillResponse::speak(WELCOME),
            "IntentRequest" => handle_intent(&state, &request).await,
            _ => SkillResponse::speak(UNSUPPORTED_REQUEST),
        },
        Err(e) => {
            warn!(error = %e, "malformed skill event");
            SkillResponse::speak(UNSUPPORTED_REQUEST)
        }
    };

    if let Ok(json) = serde_json::to_string(&reply) {
        info!(response = %json, "response sent to Alexa");
    }
    Ok(reply)
}

async fn handle_intent(state: &AppState, request: &SkillRequest) -> SkillResponse {
    let thing_name = resolve_thing_name(state, request).await;
    match decide(thing_name, request.request.intent.as_ref()) {
        Decision::Reply(text) => SkillResponse::speak(text),
        Decision::Device { thing_name, action } => execute(state, &thing_name, action).await,
    }
}

async fn execute(state: &AppState, thing_name: &str, action: Action) -> SkillResponse {
    match action {
        Action::Speak(text) => SkillResponse::speak(text),
        Action::UpdateShadow {
            desired,
            confirmation,
        } => match state.shadows.update_desired(thing_name, &desired).await {
            Ok(()) => SkillResponse::speak(confirmation),
            Err(e) => {
                warn!(thing_name = %thing_name, error = %e, "shadow update failed");
                SkillResponse::speak(UPDATE_FAILED)
            }
        },
        Action::ReadFullStatus => match state.shadows.get(thing_name).await {
            Ok(doc) => SkillResponse::speak(render_status(&doc)),
            Err(e) => {
                warn!(thing_name = %thing_name, error = %e, "shadow read failed");
                SkillResponse::speak(STATUS_FAILED)
            }
        },
        Action::ReadHumidity => match state.shadows.get(thing_name).await {
            Ok(doc) => SkillResponse::speak(render_humidity(&doc)),
            Err(e) => {
                warn!(thing_name = %thing_name, error = %e, "shadow read failed");
                SkillResponse::speak(HUMIDITY_FAILED)
            }
        },
    }
}

/// Map the calling user to their provisioned thing. A missing user ID, a
/// lookup error, and an absent mapping all end up as "no device".
async fn resolve_thing_name(state: &AppState, request: &SkillRequest) -> Option<String> {
    let user_id = request.user_id()?;
    match state.registry.thing_name_for_user(user_id).await {
        Ok(thing_name) => thing_name,
        Err(e) => {
            error!(error = %e, "failed to look up device for user");
            None
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

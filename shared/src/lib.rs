//! Shared library for the irrigation Lambda functions.
//!
//! This crate provides the configuration, error types, Alexa envelope
//! models, and store clients used by the skill and telemetry Lambdas.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod shadow;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    DesiredState, IntentPayload, OperatingMode, PumpState, ReportedState, ShadowDocument,
    SkillRequest, SkillResponse,
};
pub use registry::DeviceRegistry;
pub use shadow::ShadowClient;

//! Host-side building blocks shared by device-mode integrations: the generic
//! event model, the integration traits and registry, host configuration,
//! errors and tracing setup.

pub mod config;
pub mod error;
pub mod integration;
pub mod telemetry;
pub mod types;

pub use config::{HostConfig, LogLevel};
pub use error::{IntegrationError, IntegrationResult};
pub use integration::{
    AnonymousClient, HostClient, Integration, IntegrationFactory, IntegrationRegistry,
};
pub use types::{EventType, GenericEvent, LifecycleEvent, Properties};

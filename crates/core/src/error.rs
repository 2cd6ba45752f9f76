use thiserror::Error;

pub type IntegrationResult<T> = Result<T, IntegrationError>;

#[derive(Error, Debug)]
pub enum IntegrationError {
    /// The destination configuration cannot produce a usable integration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A vendor factory returned no object. The affected feature degrades.
    #[error("Factory produced no {0}")]
    FactoryProduction(&'static str),

    #[error("No integration registered under '{0}'")]
    UnknownIntegration(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

impl IntegrationError {
    /// Whether the integration instance must be discarded after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IntegrationError::Config(_) | IntegrationError::UnknownIntegration(_)
        )
    }
}

use thiserror::Error;

/// Application level error type used throughout the crate.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// I/O related failure
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error while parsing YAML configuration files
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Error while encoding a wire payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MQTT client request could not be queued
    #[error("MQTT client error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Broker connection was refused or lost during the handshake
    #[error("MQTT connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
}

/// Convenient alias over [`Result`] using [`TelemetryError`]
pub type Result<T> = std::result::Result<T, TelemetryError>;

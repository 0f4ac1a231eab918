//! Error types for the EPC map engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EpcMapError {
    // Map errors
    #[error("Feature not found in rendered map: {feature_id}")]
    FeatureNotFound { feature_id: String },

    #[error("Map instance not created. Call setup first")]
    MapNotReady,

    #[error("Map style unavailable: {style}")]
    StyleUnavailable { style: String },

    // Spatial filter errors
    #[error("Invalid search polygon: {reason}")]
    InvalidPolygon { reason: String },

    // Data-fetch errors
    #[error("Data source failed: {reason}")]
    DataSource { reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EpcMapError {
    fn from(err: serde_json::Error) -> Self {
        EpcMapError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EpcMapError>;

use super::types::Region;
use thiserror::Error;

/// Failures reported by a vehicle manager
#[derive(Debug, Error)]
pub enum VehicleError {
    /// The manager has no implementation for this operation
    #[error("{0} is not supported by this vehicle client")]
    Unsupported(&'static str),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown brand: {0}")]
    UnknownBrand(String),

    #[error("Region {0} is not supported by this vehicle client")]
    UnsupportedRegion(Region),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("A PIN is required for remote commands")]
    PinRequired,

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

//! Error types for the terrain system

use thiserror::Error;

/// Main error type for the terrain system
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid LOD configuration: {0}")]
    InvalidLodConfig(String),

    #[error("invalid terrain configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

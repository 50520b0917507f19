//! Error types for raster aggregation.

use thiserror::Error;

/// Errors that can occur while configuring or running an aggregation.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// The raster's storage element type has no aggregation code path.
    #[error("unsupported storage element type: {0}")]
    UnsupportedElementType(String),

    /// The missing-value token's type differs from the raster's element type.
    #[error("missing value of type {token} cannot filter a raster of type {raster}")]
    MissingValueTypeMismatch { token: String, raster: String },

    /// A scale/offset attribute could not be parsed as a number.
    #[error("attribute '{attribute}' of variable '{variable}' is not numeric: {value}")]
    InvalidAttribute {
        variable: String,
        attribute: String,
        value: String,
    },

    /// Shape, origin and buffer length disagree.
    #[error("invalid raster shape: {0}")]
    InvalidShape(String),

    /// An integration-point group does not have one axis per raster axis.
    #[error("group has {group} axes but the raster has {raster}")]
    RankMismatch { group: usize, raster: usize },

    /// An index of a group lies outside the resident raster block.
    #[error("index {index} on axis {axis} is outside the block [{start}, {end})")]
    IndexOutOfBounds {
        axis: usize,
        index: i64,
        start: i64,
        end: i64,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Dataset metadata could not be decoded.
    #[error("invalid dataset metadata: {0}")]
    InvalidMetadata(String),
}

impl AggregationError {
    /// Create an UnsupportedElementType error.
    pub fn unsupported(dtype: impl Into<String>) -> Self {
        Self::UnsupportedElementType(dtype.into())
    }

    /// Create an InvalidShape error.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Create a ConfigError.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}

impl From<serde_json::Error> for AggregationError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMetadata(err.to_string())
    }
}

/// Result type for aggregation operations.
pub type Result<T> = std::result::Result<T, AggregationError>;

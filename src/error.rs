//! Error types for raster conversion.
//!
//! Every failure is reported before a single instruction byte reaches the caller,
//! so an `Err` always means "nothing was produced".

use thiserror::Error;

/// Main error type for QL raster operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unknown label or printer model identifier.
    ///
    /// Lookups never fall back to a default record.
    #[error("Unknown {kind} identifier: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Image and label do not fit together, the label record itself is malformed,
    /// or the page length is outside what the model can feed.
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// An option value is out of range (e.g. threshold outside 0..=100).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The label would not be fully contained in the device raster buffer.
    #[error("Label placement [{start}, {end}) exceeds raster buffer width {buffer_width}")]
    OutOfBounds {
        start: i64,
        end: i64,
        buffer_width: u32,
    },

    /// A capability was requested that the target model does not advertise.
    #[error("{feature} is not supported by {model}")]
    UnsupportedFeature { feature: String, model: String },

    /// The raster encoder was driven out of order.
    #[error("Raster encoder is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: crate::raster::State,
        actual: crate::raster::State,
    },
}

impl Error {
    pub(crate) fn label_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "label",
            id: id.to_string(),
        }
    }

    pub(crate) fn model_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "model",
            id: id.to_string(),
        }
    }

    pub(crate) fn unsupported(feature: impl Into<String>, model: &str) -> Self {
        Self::UnsupportedFeature {
            feature: feature.into(),
            model: model.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

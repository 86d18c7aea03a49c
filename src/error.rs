//! Error types for channel assembly and SUDS serialization.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SudsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported sample encoding: {0:?}")]
    UnsupportedEncoding(String),

    #[error("unreasonable sample rate {rate} Hz (minimum 0.01)")]
    InvalidSampleRate { rate: f64 },

    /// Ordinary overflow. The assembler absorbs this and reports a truncated channel.
    #[error("assembly buffer exhausted: need {needed} samples, capacity {capacity}")]
    BufferExhausted { needed: usize, capacity: usize },

    #[error("gap fill of {fill} samples exceeds remaining capacity of {available}")]
    GapTooLarge { fill: usize, available: usize },

    #[error("failed writing {section}: {source}")]
    WriteFailed {
        section: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("unrecognized platform: {0:?}")]
    UnrecognizedPlatform(String),

    #[error("record too short: expected at least {expected} bytes, got {actual}")]
    RecordTooShort { expected: usize, actual: usize },
}

impl SudsError {
    /// Whether this error aborts the current channel.
    ///
    /// Only [`SudsError::BufferExhausted`] is recoverable: the samples
    /// accumulated so far are still serialized.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::BufferExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, SudsError>;

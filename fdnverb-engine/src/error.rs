//! Error types for fdnverb-engine.
//!
//! Nothing on the per-sample path returns these; they come from host glue
//! (sample-rate and channel validation) and preset lookup.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    #[error("invalid channel count: {0}")]
    InvalidChannelCount(usize),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;

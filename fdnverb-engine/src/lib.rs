//! fdnverb engine: the stereo reverb built on `fdnverb-core`.
//!
//! Crate layout:
//! - [`reverb`]    : delay-line table, per-sample topology and the [`Reverb`] type
//! - [`params`]    : the five normalized controls as a value type
//! - [`presets`]   : read-only factory presets
//! - [`smoothing`] : linear parameter ramps and [`SmoothedReverb`]
//! - [`host`]      : `Effect` trait and `Host<E>` for interleaved device buffers
//! - [`error`]     : errors raised by host glue and lookups
//!
//! Processing never allocates; a `Reverb` carries its whole delay memory inline
//! (128 KiB with f32 storage), so box it if it has to live on a small stack.

pub mod error;
pub mod host;
pub mod params;
pub mod presets;
pub mod reverb;
pub mod smoothing;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use error::{Error, Result};
pub use host::{Effect, Host};
pub use params::{ParamId, ReverbParams};
pub use presets::{Preset, FACTORY_PRESETS};
pub use reverb::{Frame, Reverb, TAIL_SECONDS};
pub use smoothing::{LinearRamp, SmoothedReverb};

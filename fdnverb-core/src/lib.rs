#![cfg_attr(not(feature = "std"), no_std)]
//! fdnverb core: an allocation-free delay-network engine.
//!
//! Features
//! - `std`      : (default) use the Rust standard library
//! - `no-std`   : build with `#![no_std]` and use `libm`/`micromath` math backends
//! - `fast-math`: polynomial cosine for the LFOs, rational soft clip
//!
//! Modules
//! - [`dsp`]     : math backend, clamping, interpolation and metering helpers
//! - [`format`]  : storage encodings (f32 passthrough, 16-bit and 12-bit fixed point)
//! - [`memory`]  : reservation table and [`DelayLine`](memory::DelayLine) handles
//! - [`lfo`]     : cosine LFOs running in cycles per sample
//! - [`filters`] : one-pole low/high-pass steps over caller-owned state
//! - [`context`] : the per-sample operation algebra
//! - [`engine`]  : [`FxEngine`](engine::FxEngine), which ties the above together
//!
//! Design
//! - One power-of-two buffer per engine, addressed only by masking
//! - Delay lines are plain `(base, length)` handles computed at build time
//! - No heap, no locks, O(1) work per operation

pub mod context;
pub mod dsp;
pub mod engine;
pub mod filters;
pub mod format;
pub mod lfo;
pub mod memory;

/// Commonly used types/functions for convenience:
pub mod prelude {
    pub use crate::context::Context;
    pub use crate::dsp::{clamp, clamp01, crossfade, kill_denormals, lerp, soft_clip, Meter};
    pub use crate::engine::FxEngine;
    pub use crate::format::{Fixed12, Fixed16, Float32, SampleFormat};
    pub use crate::lfo::{Lfo, LfoIndex};
    pub use crate::memory::{DelayLine, Layout, LayoutError};
}

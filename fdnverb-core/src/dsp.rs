//! Math backend and small scalar helpers shared by the engine.
//!
//! Design goals:
//! - `no_std` ready (guarded by the crate feature `no-std`)
//! - Math backend selection that works in both `std` and `no_std` contexts
//! - Optional `fast-math` approximations for the per-sample hot path
//!
//! Conventions:
//! - All functions are `#[inline]`.
//! - Argument and return domains are documented per function.

#![allow(clippy::excessive_precision)]

use cfg_if::cfg_if;
use num_traits::float::FloatCore;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    // micromath preferred if explicitly requested (works in no_std)
    if #[cfg(feature = "micromath")] {
        use micromath::F32Ext as _;
        #[inline] fn m_cos(x: f32) -> f32 { x.cos() }
        #[inline] fn m_tanh(x: f32) -> f32 { x.tanh() }
    // libm (C math) in no_std
    } else if #[cfg(feature = "no-std")] {
        #[inline] fn m_cos(x: f32) -> f32 { libm::cosf(x) }
        #[inline] fn m_tanh(x: f32) -> f32 { libm::tanhf(x) }
    // std backend
    } else {
        #[inline] fn m_cos(x: f32) -> f32 { x.cos() }
        #[inline] fn m_tanh(x: f32) -> f32 { x.tanh() }
    }
}

// --------------------------------- Constants -------------------------------------

/// 2π
pub const TAU: f32 = core::f32::consts::TAU;

/// Magnitude below which filter state is flushed to zero.
pub const EPS_SMALL: f32 = 1.0e-20;

// --------------------------------- Utilities -------------------------------------

/// Clamp `x` into `[lo, hi]`. NaN maps to `lo`.
#[inline]
pub fn clamp(x: f32, lo: f32, hi: f32) -> f32 {
    if x.is_nan() || x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Clamp into the normalized control range `[0, 1]`.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    clamp(x, 0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move `dry` towards `wet` by `amount` (0 = dry, 1 = wet).
#[inline]
pub fn crossfade(dry: f32, wet: f32, amount: f32) -> f32 {
    dry + (wet - dry) * amount
}

/// Wrap phase into [0, 1).
#[inline]
pub fn wrap_phase01(p: f32) -> f32 {
    let w = p - FloatCore::floor(p);
    if w >= 1.0 { 0.0 } else { w }
}

/// Split a non-negative offset into its integral and fractional parts.
#[inline]
pub fn split_offset(offset: f32) -> (usize, f32) {
    let integral = FloatCore::floor(offset);
    // offsets handed to delay lines are never negative
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    (integral as usize, offset - integral)
}

/// Kill denormal/subnormal values. Returns 0.0 if |x| < EPS_SMALL.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if FloatCore::abs(x) < EPS_SMALL { 0.0 } else { x }
}

// --------------------------------- Fast trig -------------------------------------

/// Cosine of `x` radians.
///
/// With `fast-math` this is `sin(x + π/2)` through a corrected parabolic sine
/// (max abs error ~1e-3), which is plenty for modulating a delay tap.
#[inline]
pub fn fast_cos(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            use core::f32::consts::{FRAC_PI_2, PI};
            let mut xr = x + FRAC_PI_2;
            xr -= FloatCore::round(xr / TAU) * TAU;
            let y = (4.0 / PI) * xr - (4.0 / (PI * PI)) * xr * FloatCore::abs(xr);
            0.225 * (y * FloatCore::abs(y) - y) + y
        } else {
            m_cos(x)
        }
    }
}

/// Unipolar cosine of a normalized phase: `0.5 + 0.5 cos(2π phase)`, in [0, 1].
#[inline]
pub fn unipolar_cos(phase01: f32) -> f32 {
    0.5 + 0.5 * fast_cos(TAU * phase01)
}

// --------------------------------- Nonlinearities --------------------------------

/// Soft clip via tanh. If `fast-math` is enabled, uses a stable rational approximation.
///
/// Approximation used when `fast-math`:
/// `tanh(x) ≈ x * (27 + x^2) / (27 + 9 x^2)` inside ±3, hard ±1 outside.
/// The approximation reaches exactly ±1 at ±3, so the pieces join.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            if x < -3.0 {
                -1.0
            } else if x > 3.0 {
                1.0
            } else {
                let x2 = x * x;
                x * (27.0 + x2) / (27.0 + 9.0 * x2)
            }
        } else {
            m_tanh(x)
        }
    }
}

// --------------------------------- Meter -----------------------------------------

/// Peak + running-RMS meter (exponentially windowed). Call `tick` once per sample.
///
/// `alpha` is the smoothing factor in (0, 1]; smaller means a longer window.
#[derive(Copy, Clone, Debug)]
pub struct Meter {
    alpha: f32,
    mean_square: f32,
    peak: f32,
}

impl Meter {
    #[inline]
    pub fn new(alpha: f32) -> Self {
        Self { alpha: clamp(alpha, 1.0e-6, 1.0), mean_square: 0.0, peak: 0.0 }
    }

    #[inline]
    pub fn tick(&mut self, x: f32) {
        self.mean_square += self.alpha * (x * x - self.mean_square);
        let a = FloatCore::abs(x);
        if a > self.peak {
            self.peak = a;
        }
    }

    /// Current RMS estimate. Requires `std` or a math backend for `sqrt`.
    #[cfg(feature = "std")]
    #[inline]
    pub fn rms(&self) -> f32 {
        self.mean_square.sqrt()
    }

    #[inline]
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Forget the held peak (the RMS window keeps running).
    #[inline]
    pub fn reset_peak(&mut self) {
        self.peak = 0.0;
    }
}

// --------------------------------- Tests (std only) ------------------------------

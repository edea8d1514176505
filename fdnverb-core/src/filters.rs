//! One-pole filter steps over caller-owned state.
//!
//! Both filters use the inexpensive `s += a * (x - s)` form. `a` is the raw
//! coefficient in [0, 1] (1 = no filtering for the low-pass); the state lives
//! with the caller so it can persist across samples and blocks while the
//! signal context is rebuilt every sample.

/// Low-pass step: moves `state` towards `x` and returns the new state.
#[inline]
pub fn one_pole_lp(state: &mut f32, coeff: f32, x: f32) -> f32 {
    *state += coeff * (x - *state);
    *state
}

/// High-pass step: the input minus the low-passed input.
///
/// Converges to 0 for a constant input.
#[inline]
pub fn one_pole_hp(state: &mut f32, coeff: f32, x: f32) -> f32 {
    *state += coeff * (x - *state);
    x - *state
}

// ------------------------------------ Tests --------------------------------------

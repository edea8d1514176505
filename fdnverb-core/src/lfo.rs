//! Low-frequency oscillators that wobble delay taps.
//!
//! Frequency is expressed in **cycles per sample**, so the engine never needs
//! to know the sample rate; callers convert from Hz once at init time.

use core::fmt::Debug;

use crate::dsp::{unipolar_cos, wrap_phase01};

/// Which of the engine's two oscillators to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LfoIndex {
    First,
    Second,
}

impl LfoIndex {
    #[inline]
    pub const fn slot(self) -> usize {
        match self {
            LfoIndex::First => 0,
            LfoIndex::Second => 1,
        }
    }
}

/// Free-running cosine LFO with phase in [0, 1).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Lfo {
    phase: f32,
    freq: f32,
}

impl Lfo {
    #[inline]
    pub const fn new(cycles_per_sample: f32) -> Self {
        Self { phase: 0.0, freq: cycles_per_sample }
    }

    #[inline]
    pub fn set_frequency(&mut self, cycles_per_sample: f32) {
        self.freq = cycles_per_sample.max(0.0);
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Hard-set phase; wrapped into [0, 1).
    #[inline]
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_phase01(phase);
    }

    /// Advance one sample.
    #[inline]
    pub fn tick(&mut self) {
        self.phase = wrap_phase01(self.phase + self.freq);
    }

    /// Current value in **[0, 1]**.
    #[inline]
    pub fn value(&self) -> f32 {
        unipolar_cos(self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn phase_wraps_every_cycle() {
        let mut lfo = Lfo::new(0.25);
        for _ in 0..3 {
            lfo.tick();
        }
        assert_abs_diff_eq!(lfo.phase(), 0.75, epsilon = 1e-6);
        lfo.tick();
        assert_abs_diff_eq!(lfo.phase(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn value_stays_unipolar() {
        let mut lfo = Lfo::new(0.013);
        for _ in 0..1000 {
            lfo.tick();
            let v = lfo.value();
            assert!((-1e-3..=1.0 + 1e-3).contains(&v), "v={v}");
        }
    }

    #[test]
    fn negative_frequency_is_ignored() {
        let mut lfo = Lfo::new(0.0);
        lfo.set_frequency(-1.0);
        lfo.tick();
        assert_eq!(lfo.phase(), 0.0);
        assert_eq!(LfoIndex::Second.slot(), 1);
    }
}

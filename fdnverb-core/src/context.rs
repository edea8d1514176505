//! Per-sample signal context: the operation algebra used to wire delay lines,
//! filters and LFOs into a feedback graph.
//!
//! A [`Context`] is handed out by [`FxEngine::start`](crate::engine::FxEngine::start)
//! and lives for exactly one sample. It carries two registers:
//!
//! - the **accumulator**, which every operation reads and/or updates
//! - **previous read**, the last value fetched from a delay line, consumed by
//!   [`Context::write_all_pass`]
//!
//! Operations run strictly in program order. A typical allpass section is
//!
//! ```
//! use fdnverb_core::prelude::*;
//!
//! let mut engine: FxEngine<256> = FxEngine::new();
//! let ap = DelayLine::new(0, 100);
//! let kap = 0.625;
//!
//! let mut c = engine.start();
//! c.load(1.0);
//! c.read_tail(ap, kap);
//! c.write_all_pass(ap, -kap);
//! assert_eq!(c.accumulator(), -0.625);
//! ```

use core::fmt::Debug;

use crate::dsp::{lerp, split_offset};
use crate::filters::{one_pole_hp, one_pole_lp};
use crate::format::SampleFormat;
use crate::lfo::LfoIndex;
use crate::memory::DelayLine;

/// One sample's worth of processing state, borrowed from the engine.
pub struct Context<'a, F: SampleFormat> {
    buffer: &'a mut [F::Word],
    mask: usize,
    cursor: usize,
    accumulator: f32,
    previous_read: f32,
    lfo_value: [f32; 2],
}

impl<'a, F: SampleFormat> Context<'a, F> {
    /// `buffer.len()` must be a power of two; the engine guarantees it.
    #[inline]
    pub(crate) fn new(buffer: &'a mut [F::Word], cursor: usize, lfo_value: [f32; 2]) -> Self {
        let mask = buffer.len() - 1;
        Self { buffer, mask, cursor, accumulator: 0.0, previous_read: 0.0, lfo_value }
    }

    #[inline]
    fn address(&self, line: DelayLine, offset: usize) -> usize {
        (line.base() + offset).wrapping_sub(self.cursor) & self.mask
    }

    #[inline]
    fn fetch(&self, line: DelayLine, offset: usize) -> f32 {
        F::decompress(self.buffer[self.address(line, offset)])
    }

    // ------------------------------ accumulator -----------------------------------

    /// `acc = value`
    #[inline]
    pub fn load(&mut self, value: f32) {
        self.accumulator = value;
    }

    /// `acc += value * scale`
    #[inline]
    pub fn add(&mut self, value: f32, scale: f32) {
        self.accumulator += value * scale;
    }

    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Return the accumulator, then scale it in place.
    ///
    /// `export(0.0)` hands the value out and leaves a clean accumulator.
    #[inline]
    pub fn export(&mut self, scale: f32) -> f32 {
        let value = self.accumulator;
        self.accumulator *= scale;
        value
    }

    #[inline]
    pub fn previous_read(&self) -> f32 {
        self.previous_read
    }

    /// LFO value snapshotted when the context was started, in [0, 1].
    #[inline]
    pub fn lfo_value(&self, which: LfoIndex) -> f32 {
        self.lfo_value[which.slot()]
    }

    // ------------------------------ delay lines -----------------------------------

    /// Fetch `line[offset]` (offset 0 is the newest slot), remember it as the
    /// previous read and add `value * scale` to the accumulator.
    #[inline]
    pub fn read(&mut self, line: DelayLine, offset: usize, scale: f32) {
        let value = self.fetch(line, offset);
        self.previous_read = value;
        self.accumulator += value * scale;
    }

    /// Read the oldest sample held by `line`.
    #[inline]
    pub fn read_tail(&mut self, line: DelayLine, scale: f32) {
        self.read(line, line.tail(), scale);
    }

    /// Store the accumulator at `line[offset]`, then scale the accumulator.
    #[inline]
    pub fn write(&mut self, line: DelayLine, offset: usize, scale: f32) {
        let address = self.address(line, offset);
        self.buffer[address] = F::compress(self.accumulator);
        self.accumulator *= scale;
    }

    /// Allpass write: store the accumulator at the head of `line`, then
    /// `acc = acc * coefficient + previous_read`.
    ///
    /// Pair with a preceding [`read_tail`](Self::read_tail) on the same line.
    #[inline]
    pub fn write_all_pass(&mut self, line: DelayLine, coefficient: f32) {
        self.write(line, 0, coefficient);
        self.accumulator += self.previous_read;
    }

    /// Linear read at a fractional `offset`.
    #[inline]
    pub fn interpolate(&mut self, line: DelayLine, offset: f32, scale: f32) {
        let (integral, fractional) = split_offset(offset);
        let a = self.fetch(line, integral);
        let b = self.fetch(line, integral + 1);
        let value = lerp(a, b, fractional);
        self.previous_read = value;
        self.accumulator += value * scale;
    }

    /// Linear read at `offset + amplitude * lfo`, where the LFO value is in [0, 1].
    #[inline]
    pub fn interpolate_mod(&mut self, line: DelayLine, offset: f32, lfo: LfoIndex, amplitude: f32, scale: f32) {
        let modulated = offset + amplitude * self.lfo_value[lfo.slot()];
        self.interpolate(line, modulated, scale);
    }

    // -------------------------------- filters -------------------------------------

    /// One-pole low-pass on the accumulator; `state` persists with the caller.
    #[inline]
    pub fn lp(&mut self, state: &mut f32, coefficient: f32) {
        self.accumulator = one_pole_lp(state, coefficient, self.accumulator);
    }

    /// One-pole high-pass on the accumulator; `state` persists with the caller.
    #[inline]
    pub fn hp(&mut self, state: &mut f32, coefficient: f32) {
        self.accumulator = one_pole_hp(state, coefficient, self.accumulator);
    }
}

impl<F: SampleFormat> Debug for Context<'_, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("cursor", &self.cursor)
            .field("accumulator", &self.accumulator)
            .field("previous_read", &self.previous_read)
            .field("lfo_value", &self.lfo_value)
            .finish_non_exhaustive()
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;
    use approx::assert_abs_diff_eq;

    type TestEngine = FxEngine<256>;

    const LINE: DelayLine = DelayLine::new(0, 64);

    #[test]
    fn load_and_add() {
        let mut engine = TestEngine::new();
        let mut c = engine.start();
        c.load(0.5);
        c.add(0.25, 1.0);
        assert_eq!(c.accumulator(), 0.75);
        c.load(0.0);
        c.add(1.0, 0.5);
        assert_eq!(c.accumulator(), 0.5);
    }

    #[test]
    fn export_returns_then_scales() {
        let mut engine = TestEngine::new();
        let mut c = engine.start();
        c.load(1.0);
        assert_eq!(c.export(0.5), 1.0);
        assert_eq!(c.accumulator(), 0.5);
        assert_eq!(c.export(0.0), 0.5);
        assert_eq!(c.accumulator(), 0.0);
    }

    #[test]
    fn written_sample_comes_back_one_step_later() {
        let mut engine = TestEngine::new();
        {
            let mut c = engine.start();
            c.load(0.5);
            c.write(LINE, 0, 1.0);
        }
        let mut c = engine.start();
        c.load(0.0);
        c.read(LINE, 1, 1.0);
        assert_eq!(c.accumulator(), 0.5);
        assert_eq!(c.previous_read(), 0.5);
    }

    #[test]
    fn write_scales_accumulator_after_storing() {
        let mut engine = TestEngine::new();
        {
            let mut c = engine.start();
            c.load(0.4);
            c.write(LINE, 0, 2.0);
            assert_eq!(c.accumulator(), 0.8);
        }
        let mut c = engine.start();
        c.read(LINE, 1, 1.0);
        assert_eq!(c.accumulator(), 0.4);
    }

    #[test]
    fn tail_read_sees_the_oldest_sample() {
        let mut engine = TestEngine::new();
        {
            let mut c = engine.start();
            c.load(0.9);
            c.write(LINE, 0, 1.0);
        }
        for _ in 0..LINE.tail() - 1 {
            let _ = engine.start();
        }
        let mut c = engine.start();
        c.read_tail(LINE, 1.0);
        assert_eq!(c.accumulator(), 0.9);
    }

    #[test]
    fn allpass_adds_previous_read_exactly() {
        let mut engine = TestEngine::new();
        {
            let mut c = engine.start();
            c.load(0.5);
            c.write(LINE, 0, 1.0);
        }
        for _ in 0..LINE.tail() - 1 {
            let _ = engine.start();
        }
        let mut c = engine.start();
        c.load(0.0);
        c.read_tail(LINE, 1.0);
        assert_eq!(c.accumulator(), 0.5);
        c.load(0.3);
        c.write_all_pass(LINE, 0.7);
        assert_eq!(c.accumulator(), 0.3 * 0.7 + 0.5);
    }

    #[test]
    fn allpass_stores_the_pre_update_accumulator() {
        let mut engine = TestEngine::new();
        {
            let mut c = engine.start();
            c.load(0.3);
            c.write_all_pass(LINE, -0.5);
            assert_eq!(c.accumulator(), -0.15);
        }
        let mut c = engine.start();
        c.read(LINE, 1, 1.0);
        assert_eq!(c.accumulator(), 0.3);
    }

    #[test]
    fn interpolation_blends_neighbours() {
        let mut engine = TestEngine::new();
        for v in [0.0, 1.0] {
            let mut c = engine.start();
            c.load(v);
            c.write(LINE, 0, 1.0);
        }
        let mut c = engine.start();
        c.load(0.0);
        c.interpolate(LINE, 1.5, 1.0);
        assert_abs_diff_eq!(c.accumulator(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(c.previous_read(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn modulated_interpolation_uses_lfo_snapshot() {
        let mut engine = TestEngine::new();
        // frequency 0 keeps phase at 0 -> LFO value 1.0
        engine.set_lfo_frequency(LfoIndex::Second, 0.0);
        for v in [3.0, 2.0, 1.0] {
            let mut c = engine.start();
            c.load(v);
            c.write(LINE, 0, 1.0);
        }
        let mut c = engine.start();
        assert_abs_diff_eq!(c.lfo_value(LfoIndex::Second), 1.0, epsilon = 1e-3);
        // offset 1 + 1.5 * 1.0 = 2.5 -> between 2.0 and 3.0
        c.interpolate_mod(LINE, 1.0, LfoIndex::Second, 1.5, 1.0);
        assert_abs_diff_eq!(c.accumulator(), 2.5, epsilon = 5e-3);
    }

    #[test]
    fn lp_and_hp_update_caller_state() {
        let mut engine = TestEngine::new();
        let mut lp_state = 0.0;
        let mut c = engine.start();
        c.load(1.0);
        c.lp(&mut lp_state, 0.5);
        assert_eq!(lp_state, 0.5);
        assert_eq!(c.accumulator(), 0.5);

        let mut hp_state = 0.0;
        for _ in 0..100 {
            let mut c = engine.start();
            c.load(1.0);
            c.hp(&mut hp_state, 0.1);
        }
        let mut c = engine.start();
        c.load(1.0);
        c.hp(&mut hp_state, 0.1);
        assert!(c.accumulator().abs() < 0.1);
    }
}

//! The delay-network engine: ring buffer, write cursor and two LFOs.
//!
//! `FxEngine<N, F>` owns `N` samples of storage (encoded with `F`) inline, so
//! building one allocates nothing beyond its own footprint and processing
//! never allocates at all. Every sample the caller does
//!
//! 1. [`FxEngine::start`] to advance cursor and LFOs and obtain a [`Context`]
//! 2. a fixed sequence of context operations on [`DelayLine`]s
//!
//! Addresses are `(line.base + offset - cursor) mod N`: every line slides
//! through the whole buffer together with the shared cursor, and offsets are
//! never clipped per segment.

use core::ptr::addr_of_mut;

use crate::context::Context;
use crate::format::{Float32, SampleFormat};
use crate::lfo::{Lfo, LfoIndex};
use crate::memory::{Layout, LayoutError};

/// Ring buffer of `N` samples (power of two) stored as `F`.
#[derive(Clone)]
pub struct FxEngine<const N: usize, F: SampleFormat = Float32> {
    buffer: [F::Word; N],
    cursor: usize,
    lfo: [Lfo; 2],
}

impl<const N: usize, F: SampleFormat> FxEngine<N, F> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(N.is_power_of_two(), "FxEngine capacity must be a power of two");

    /// Zeroed buffer, cursor at 0, both LFOs stopped at phase 0.
    pub fn new() -> Self {
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self { buffer: [F::ZERO; N], cursor: 0, lfo: [Lfo::default(); 2] }
    }

    /// Build an engine directly at `slot`, writing the buffer one word at a
    /// time, so no `N`-sized temporary ever lands on the stack.
    ///
    /// # Safety
    /// `slot` must be valid for writes and properly aligned. Whatever it
    /// pointed to before is overwritten without being dropped.
    pub unsafe fn write_new(slot: *mut Self) {
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        let buffer = addr_of_mut!((*slot).buffer).cast::<F::Word>();
        for i in 0..N {
            buffer.add(i).write(F::ZERO);
        }
        addr_of_mut!((*slot).cursor).write(0);
        addr_of_mut!((*slot).lfo).write([Lfo::default(); 2]);
    }

    /// Zero the buffer and rewind cursor and LFO phases. Frequencies are kept.
    pub fn init(&mut self) {
        self.clear();
        self.cursor = 0;
        for lfo in &mut self.lfo {
            lfo.set_phase(0.0);
        }
    }

    /// Zero the buffer. Cursor and LFO phase are left alone.
    pub fn clear(&mut self) {
        self.buffer.fill(F::ZERO);
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Set an LFO rate in cycles per sample.
    #[inline]
    pub fn set_lfo_frequency(&mut self, which: LfoIndex, cycles_per_sample: f32) {
        self.lfo[which.slot()].set_frequency(cycles_per_sample);
    }

    #[inline]
    pub fn lfo(&self, which: LfoIndex) -> &Lfo {
        &self.lfo[which.slot()]
    }

    /// Check that `layout` fits this engine's buffer.
    pub fn validate<const K: usize>(&self, layout: &Layout<K>) -> Result<(), LayoutError> {
        if layout.footprint() > N {
            return Err(LayoutError::Overflow { required: layout.footprint(), capacity: N });
        }
        Ok(())
    }

    /// True when every slot holds the encoding of 0.0.
    pub fn is_silent(&self) -> bool {
        self.buffer.iter().all(|w| F::decompress(*w) == 0.0)
    }

    /// Advance one sample and hand out the context for it.
    #[inline]
    pub fn start(&mut self) -> Context<'_, F> {
        self.cursor = (self.cursor + 1) & (N - 1);
        self.lfo[0].tick();
        self.lfo[1].tick();
        let lfo_value = [self.lfo[0].value(), self.lfo[1].value()];
        Context::new(&mut self.buffer, self.cursor, lfo_value)
    }
}

impl<const N: usize, F: SampleFormat> Default for FxEngine<N, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, F: SampleFormat> core::fmt::Debug for FxEngine<N, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FxEngine")
            .field("capacity", &N)
            .field("cursor", &self.cursor)
            .field("lfo", &self.lfo)
            .finish_non_exhaustive()
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Fixed12, Fixed16};
    use crate::memory::DelayLine;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn init_zeroes_buffer_and_rewinds_cursor() {
        let mut engine: FxEngine<256> = FxEngine::new();
        let line = DelayLine::new(0, 64);
        for _ in 0..10 {
            let mut c = engine.start();
            c.load(1.0);
            c.write(line, 0, 1.0);
        }
        assert!(!engine.is_silent());
        assert_eq!(engine.cursor(), 10);

        engine.init();
        assert!(engine.is_silent());
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn clear_keeps_cursor_and_lfo_phase() {
        let mut engine: FxEngine<256> = FxEngine::new();
        engine.set_lfo_frequency(LfoIndex::First, 0.01);
        for _ in 0..5 {
            let mut c = engine.start();
            c.load(0.5);
            c.write(DelayLine::new(0, 8), 0, 1.0);
        }
        let phase = engine.lfo(LfoIndex::First).phase();
        engine.clear();
        assert!(engine.is_silent());
        assert_eq!(engine.cursor(), 5);
        assert_eq!(engine.lfo(LfoIndex::First).phase(), phase);
    }

    #[test]
    fn engine_written_in_place_starts_silent() {
        let mut slot = core::mem::MaybeUninit::<FxEngine<64, Fixed16>>::uninit();
        // SAFETY: `slot` is a valid, aligned, uninitialized engine.
        let engine = unsafe {
            FxEngine::write_new(slot.as_mut_ptr());
            slot.assume_init_mut()
        };
        assert!(engine.is_silent());
        assert_eq!(engine.cursor(), 0);
        assert_eq!(engine.lfo(LfoIndex::Second).phase(), 0.0);
    }

    #[test]
    fn cursor_wraps_at_capacity() {
        let mut engine: FxEngine<16> = FxEngine::new();
        for _ in 0..16 {
            let _ = engine.start();
        }
        assert_eq!(engine.cursor(), 0);
        assert_eq!(engine.capacity(), 16);
    }

    #[test]
    fn lfos_advance_independently() {
        let mut engine: FxEngine<64> = FxEngine::new();
        engine.set_lfo_frequency(LfoIndex::First, 0.01);
        engine.set_lfo_frequency(LfoIndex::Second, 0.02);
        for _ in 0..10 {
            let _ = engine.start();
        }
        assert_abs_diff_eq!(engine.lfo(LfoIndex::First).phase(), 0.1, epsilon = 1e-5);
        assert_abs_diff_eq!(engine.lfo(LfoIndex::Second).phase(), 0.2, epsilon = 1e-5);
    }

    #[test]
    fn lines_from_one_layout_stay_independent() {
        let layout = Layout::try_new([16, 32, 64], 256).unwrap();
        let mut engine: FxEngine<256> = FxEngine::new();
        engine.validate(&layout).unwrap();
        let values = [0.3, 0.7, 0.9];
        {
            let mut c = engine.start();
            for (line, v) in layout.lines().iter().zip(values) {
                c.load(v);
                c.write(*line, 0, 1.0);
            }
        }
        let mut c = engine.start();
        for (line, v) in layout.lines().iter().zip(values) {
            c.load(0.0);
            c.read(*line, 1, 1.0);
            assert_eq!(c.accumulator(), v);
        }
    }

    #[test]
    fn random_delays_return_what_was_written() {
        let mut rng = StdRng::seed_from_u64(11);
        let line = DelayLine::new(40, 200);
        let mut engine: FxEngine<512> = FxEngine::new();
        let mut history = Vec::new();
        for _ in 0..2000 {
            let x: f32 = rng.gen_range(-1.0..1.0);
            let d: usize = rng.gen_range(1..200);
            let mut c = engine.start();
            c.read(line, d, 1.0);
            if history.len() >= d {
                assert_eq!(c.accumulator(), history[history.len() - d]);
            }
            c.load(x);
            c.write(line, 0, 1.0);
            history.push(x);
        }
    }

    #[test]
    fn validate_rejects_layouts_that_do_not_fit() {
        let layout = Layout::try_new([100, 100], 256).unwrap();
        let engine: FxEngine<128> = FxEngine::new();
        assert_eq!(
            engine.validate(&layout),
            Err(LayoutError::Overflow { required: 202, capacity: 128 })
        );
    }

    #[test]
    fn fixed_point_engines_store_quantized_samples() {
        let line = DelayLine::new(0, 8);
        let mut e16: FxEngine<64, Fixed16> = FxEngine::new();
        let mut e12: FxEngine<64, Fixed12> = FxEngine::new();
        assert!(e16.is_silent() && e12.is_silent());
        {
            let mut c = e16.start();
            c.load(0.25);
            c.write(line, 0, 1.0);
        }
        {
            let mut c = e12.start();
            c.load(2.0);
            c.write(line, 0, 1.0);
        }
        let mut c = e16.start();
        c.read(line, 1, 1.0);
        assert_abs_diff_eq!(c.accumulator(), 0.25, epsilon = 1.0 / 32_768.0);
        let mut c = e12.start();
        c.read(line, 1, 1.0);
        assert_abs_diff_eq!(c.accumulator(), 1.0, epsilon = 1.0 / 2_048.0);
    }

    /// Run an impulse through four cascaded allpass sections and return the
    /// indices where cumulative energy first reaches 5 % and 90 %.
    fn cascade_energy_indices() -> (usize, usize) {
        let layout = Layout::try_new([113, 162, 241, 399], 1024).unwrap();
        let mut engine: FxEngine<1024> = FxEngine::new();
        let kap = 0.625;

        let mut response = Vec::with_capacity(6000);
        for i in 0..6000 {
            let mut c = engine.start();
            c.load(if i == 0 { 1.0 } else { 0.0 });
            for ap in layout.lines() {
                c.read_tail(*ap, kap);
                c.write_all_pass(*ap, -kap);
            }
            response.push(c.accumulator());
        }

        let total: f32 = response.iter().map(|x| x * x).sum();
        let mut running = 0.0;
        let (mut i5, mut i90) = (None, None);
        for (i, x) in response.iter().enumerate() {
            running += x * x;
            if i5.is_none() && running >= 0.05 * total {
                i5 = Some(i);
            }
            if i90.is_none() && running >= 0.9 * total {
                i90 = Some(i);
            }
        }
        (i5.unwrap(), i90.unwrap())
    }

    #[test]
    fn cascaded_allpasses_spread_an_impulse() {
        let (i5, i90) = cascade_energy_indices();
        assert!(i90 - i5 > 50, "i5={i5} i90={i90}");
        assert!(i90 > 399, "i90={i90}");
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        assert_eq!(cascade_energy_indices(), cascade_energy_indices());

        let run = || {
            let mut engine: FxEngine<512> = FxEngine::new();
            engine.set_lfo_frequency(LfoIndex::First, 0.003);
            let line = DelayLine::new(0, 300);
            (0..2000)
                .map(|i| {
                    let mut c = engine.start();
                    c.load(((i * 7919) % 13) as f32 / 13.0 - 0.5);
                    c.interpolate_mod(line, 100.0, LfoIndex::First, 30.0, 0.5);
                    c.write(line, 0, 1.0);
                    c.accumulator().to_bits()
                })
                .collect::<Vec<u32>>()
        };
        assert_eq!(run(), run());
    }
}

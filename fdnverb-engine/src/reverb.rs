//! Stereo diffusion reverb on a single delay-network engine (no heap, realtime-safe).
//!
//! Topology
//! - Input: the mono sum `(l + r) * input_gain` runs through four short allpasses.
//! - Tank: two cross-coupled branches. Each branch reads the *other* branch's
//!   long delay through an LFO-modulated interpolated tap scaled by `time`,
//!   low-passes it, diffuses it through two allpasses and writes its own long
//!   delay at twice the level.
//! - Output: each branch's wet signal crossfades its own input channel by `amount`.
//!
//! All ten lines share one 32768-sample ring (~0.68 s at 48 kHz). The engine is
//! generic over the storage format so the same topology runs on 16-bit or 12-bit
//! fixed-point memory.

use core::ptr::addr_of_mut;

use fdnverb_core::dsp::{clamp01, crossfade, kill_denormals, soft_clip};
use fdnverb_core::engine::FxEngine;
use fdnverb_core::format::{Float32, SampleFormat};
use fdnverb_core::lfo::LfoIndex;
use fdnverb_core::memory::Layout;

use crate::params::ReverbParams;

/// Ring size shared by every line.
pub const BUFFER_SIZE: usize = 32_768;

/// Segment lengths in reservation order.
pub const LINE_LENGTHS: [usize; 10] = [150, 214, 319, 527, 2182, 2690, 4501, 2525, 2197, 6312];

pub const LAYOUT: Layout<10> = match Layout::try_new(LINE_LENGTHS, BUFFER_SIZE) {
    Ok(layout) => layout,
    Err(_) => panic!("reverb layout does not fit its buffer"),
};

/// Named handles into [`LAYOUT`].
pub mod lines {
    use super::LAYOUT;
    use fdnverb_core::memory::DelayLine;

    pub const AP1: DelayLine = LAYOUT.line(0);
    pub const AP2: DelayLine = LAYOUT.line(1);
    pub const AP3: DelayLine = LAYOUT.line(2);
    pub const AP4: DelayLine = LAYOUT.line(3);
    pub const DAP1A: DelayLine = LAYOUT.line(4);
    pub const DAP1B: DelayLine = LAYOUT.line(5);
    pub const DEL1: DelayLine = LAYOUT.line(6);
    pub const DAP2A: DelayLine = LAYOUT.line(7);
    pub const DAP2B: DelayLine = LAYOUT.line(8);
    pub const DEL2: DelayLine = LAYOUT.line(9);
}

use lines::{AP1, AP2, AP3, AP4, DAP1A, DAP1B, DAP2A, DAP2B, DEL1, DEL2};

/// LFO rates are specified at this rate and rescaled in [`Reverb::init`].
pub const REFERENCE_RATE: f32 = 32_000.0;
const LFO1_RATE: f32 = 0.5 / REFERENCE_RATE;
const LFO2_RATE: f32 = 0.3 / REFERENCE_RATE;

// Modulated taps into the long delays: centre and swing in samples.
const DEL1_TAP: f32 = 4460.0;
const DEL1_SWING: f32 = 40.0;
const DEL2_TAP: f32 = 6261.0;
const DEL2_SWING: f32 = 50.0;

const TANK_WRITE_GAIN: f32 = 2.0;

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

/// How long a host should keep feeding silence after the input ends.
pub const TAIL_SECONDS: f32 = 5.0;

/// One stereo sample.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub l: f32,
    pub r: f32,
}

impl Frame {
    #[inline]
    pub const fn new(l: f32, r: f32) -> Self {
        Self { l, r }
    }

    #[inline]
    pub const fn mono(x: f32) -> Self {
        Self { l: x, r: x }
    }
}

/// Per-block snapshot of the controls.
#[derive(Copy, Clone)]
struct Coefficients {
    amount: f32,
    gain: f32,
    krt: f32,
    kap: f32,
    klp: f32,
    limit: bool,
}

/// Stereo reverb.
///
/// Parameters are read once per `process*` call; change them between blocks.
#[derive(Clone)]
pub struct Reverb<F: SampleFormat = Float32> {
    engine: FxEngine<BUFFER_SIZE, F>,
    sample_rate: f32,
    amount: f32,
    input_gain: f32,
    reverb_time: f32,
    diffusion: f32,
    lp: f32,
    // Tank low-pass states, one per branch.
    damping: [f32; 2],
    limiter: bool,
}

impl<F: SampleFormat> Reverb<F> {
    /// Build and initialize at [`DEFAULT_SAMPLE_RATE`].
    ///
    /// The result is as large as its delay memory; use [`Reverb::new_boxed`]
    /// on threads with a small stack.
    pub fn new() -> Self {
        let mut reverb = Self {
            engine: FxEngine::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            amount: 0.0,
            input_gain: 0.0,
            reverb_time: 0.0,
            diffusion: 0.0,
            lp: 0.0,
            damping: [0.0; 2],
            limiter: false,
        };
        reverb.configure(DEFAULT_SAMPLE_RATE);
        reverb
    }

    /// Build and initialize at `sample_rate` straight into heap memory.
    pub fn new_boxed(sample_rate: f32) -> Box<Self> {
        let mut slot = Box::<Self>::new_uninit();
        let p = slot.as_mut_ptr();
        // SAFETY: `p` points at an aligned allocation for `Self` and every
        // field is written before `assume_init`.
        let mut reverb = unsafe {
            FxEngine::write_new(addr_of_mut!((*p).engine));
            addr_of_mut!((*p).sample_rate).write(DEFAULT_SAMPLE_RATE);
            addr_of_mut!((*p).amount).write(0.0);
            addr_of_mut!((*p).input_gain).write(0.0);
            addr_of_mut!((*p).reverb_time).write(0.0);
            addr_of_mut!((*p).diffusion).write(0.0);
            addr_of_mut!((*p).lp).write(0.0);
            addr_of_mut!((*p).damping).write([0.0; 2]);
            addr_of_mut!((*p).limiter).write(false);
            slot.assume_init()
        };
        reverb.configure(sample_rate);
        reverb
    }

    /// Clear all memory, rescale the LFOs for `sample_rate` and restore the
    /// default controls. The output limiter setting is kept.
    pub fn init(&mut self, sample_rate: f32) {
        self.engine.init();
        self.configure(sample_rate);
    }

    // Everything `init` does except wiping the engine, which callers have
    // either just built or just wiped.
    fn configure(&mut self, sample_rate: f32) {
        let sr = if sample_rate.is_finite() { sample_rate.max(1.0) } else { DEFAULT_SAMPLE_RATE };
        self.sample_rate = sr;
        let rate_scale = REFERENCE_RATE / sr;
        self.engine.set_lfo_frequency(LfoIndex::First, LFO1_RATE * rate_scale);
        self.engine.set_lfo_frequency(LfoIndex::Second, LFO2_RATE * rate_scale);
        self.damping = [0.0; 2];
        self.apply(&ReverbParams::DEFAULT);
        log::debug!(
            "reverb init: sr={sr} lfo=({}, {}) cycles/sample, footprint {} of {BUFFER_SIZE}",
            LFO1_RATE * rate_scale,
            LFO2_RATE * rate_scale,
            LAYOUT.footprint()
        );
    }

    /// Silence the tail without touching parameters, LFO phase or sample rate.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.damping = [0.0; 2];
    }

    // ---- controls ----

    #[inline] pub fn set_amount(&mut self, v: f32) { self.amount = clamp01(v); }
    #[inline] pub fn set_input_gain(&mut self, v: f32) { self.input_gain = clamp01(v); }
    #[inline] pub fn set_time(&mut self, v: f32) { self.reverb_time = clamp01(v); }
    #[inline] pub fn set_diffusion(&mut self, v: f32) { self.diffusion = clamp01(v); }
    #[inline] pub fn set_lp(&mut self, v: f32) { self.lp = clamp01(v); }

    #[inline] pub fn amount(&self) -> f32 { self.amount }
    #[inline] pub fn input_gain(&self) -> f32 { self.input_gain }
    #[inline] pub fn time(&self) -> f32 { self.reverb_time }
    #[inline] pub fn diffusion(&self) -> f32 { self.diffusion }
    #[inline] pub fn lp(&self) -> f32 { self.lp }
    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }

    /// Set all five controls at once (each clamped).
    pub fn set_parameters(&mut self, amount: f32, input_gain: f32, time: f32, diffusion: f32, lp: f32) {
        self.set_amount(amount);
        self.set_input_gain(input_gain);
        self.set_time(time);
        self.set_diffusion(diffusion);
        self.set_lp(lp);
    }

    pub fn apply(&mut self, params: &ReverbParams) {
        self.set_parameters(params.amount, params.input_gain, params.time, params.diffusion, params.lp);
    }

    pub fn params(&self) -> ReverbParams {
        ReverbParams::new(self.amount, self.input_gain, self.reverb_time, self.diffusion, self.lp)
    }

    /// Soft-clip the outputs. Off by default.
    #[inline] pub fn set_output_limiter(&mut self, on: bool) { self.limiter = on; }
    #[inline] pub fn output_limiter(&self) -> bool { self.limiter }

    #[inline]
    pub fn engine(&self) -> &FxEngine<BUFFER_SIZE, F> {
        &self.engine
    }

    // ---- processing ----

    /// Process interleaved stereo frames in place.
    pub fn process(&mut self, frames: &mut [Frame]) {
        let k = self.coefficients();
        let mut state = self.damping;
        for frame in frames.iter_mut() {
            let (l, r) = Self::tick(&mut self.engine, &k, &mut state, frame.l, frame.r);
            frame.l = l;
            frame.r = r;
        }
        self.persist(state);
    }

    /// Process separate left/right buffers in place. Extra samples in the
    /// longer buffer are left untouched.
    pub fn process_split(&mut self, left: &mut [f32], right: &mut [f32]) {
        let k = self.coefficients();
        let mut state = self.damping;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (ol, or) = Self::tick(&mut self.engine, &k, &mut state, *l, *r);
            *l = ol;
            *r = or;
        }
        self.persist(state);
    }

    /// Feed a mono signal to both inputs and write stereo out.
    pub fn process_mono(&mut self, input: &[f32], left: &mut [f32], right: &mut [f32]) {
        let k = self.coefficients();
        let mut state = self.damping;
        for ((x, l), r) in input.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
            let (ol, or) = Self::tick(&mut self.engine, &k, &mut state, *x, *x);
            *l = ol;
            *r = or;
        }
        self.persist(state);
    }

    /// One stereo sample.
    #[inline]
    pub fn process_frame(&mut self, frame: Frame) -> Frame {
        let k = self.coefficients();
        let mut state = self.damping;
        let (l, r) = Self::tick(&mut self.engine, &k, &mut state, frame.l, frame.r);
        self.persist(state);
        Frame { l, r }
    }

    #[inline]
    fn coefficients(&self) -> Coefficients {
        Coefficients {
            amount: self.amount,
            gain: self.input_gain,
            krt: self.reverb_time,
            kap: self.diffusion,
            klp: self.lp,
            limit: self.limiter,
        }
    }

    #[inline]
    fn persist(&mut self, state: [f32; 2]) {
        self.damping = state.map(kill_denormals);
    }

    #[inline]
    fn tick(
        engine: &mut FxEngine<BUFFER_SIZE, F>,
        k: &Coefficients,
        state: &mut [f32; 2],
        l: f32,
        r: f32,
    ) -> (f32, f32) {
        let mut c = engine.start();
        let kap = k.kap;

        // Input diffusion.
        c.load((l + r) * k.gain);
        for ap in [AP1, AP2, AP3, AP4] {
            c.read_tail(ap, kap);
            c.write_all_pass(ap, -kap);
        }
        let apout = c.accumulator();

        // Left branch, fed from DEL2.
        c.load(apout);
        c.interpolate_mod(DEL2, DEL2_TAP, LfoIndex::Second, DEL2_SWING, k.krt);
        c.lp(&mut state[0], k.klp);
        c.read_tail(DAP1A, -kap);
        c.write_all_pass(DAP1A, kap);
        c.read_tail(DAP1B, kap);
        c.write_all_pass(DAP1B, -kap);
        c.write(DEL1, 0, TANK_WRITE_GAIN);
        let wet_l = c.export(0.0);

        // Right branch, fed from DEL1.
        c.load(apout);
        c.interpolate_mod(DEL1, DEL1_TAP, LfoIndex::First, DEL1_SWING, k.krt);
        c.lp(&mut state[1], k.klp);
        c.read_tail(DAP2A, kap);
        c.write_all_pass(DAP2A, -kap);
        c.read_tail(DAP2B, -kap);
        c.write_all_pass(DAP2B, kap);
        c.write(DEL2, 0, TANK_WRITE_GAIN);
        let wet_r = c.export(0.0);

        let out_l = crossfade(l, wet_l, k.amount);
        let out_r = crossfade(r, wet_r, k.amount);
        if k.limit {
            (soft_clip(out_l), soft_clip(out_r))
        } else {
            (out_l, out_r)
        }
    }
}

impl<F: SampleFormat> Default for Reverb<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: SampleFormat> core::fmt::Debug for Reverb<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reverb")
            .field("sample_rate", &self.sample_rate)
            .field("params", &self.params())
            .field("limiter", &self.limiter)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

// ------------------------------------ Tests --------------------------------------

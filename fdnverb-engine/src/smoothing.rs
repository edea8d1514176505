//! Zipper-free parameter changes.
//!
//! [`LinearRamp`] glides one value towards a target over a fixed time.
//! [`SmoothedReverb`] keeps one ramp per control and, while any of them is
//! moving, processes in short chunks so the reverb sees a fresh value every
//! [`CHUNK`] samples. Once every ramp has landed it processes whole blocks.

use fdnverb_core::dsp::clamp01;
use fdnverb_core::format::{Float32, SampleFormat};

use crate::params::{ParamId, ReverbParams};
use crate::reverb::{Frame, Reverb, DEFAULT_SAMPLE_RATE};

pub const DEFAULT_RAMP_SECONDS: f32 = 0.05;

/// Samples per sub-block while ramping.
pub const CHUNK: usize = 32;

/// Linear glide from the current value to a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    step: f32,
    remaining: u32,
    ramp_len: u32,
}

impl LinearRamp {
    pub fn new(initial: f32, seconds: f32, sample_rate: f32) -> Self {
        let mut ramp = Self { current: initial, target: initial, step: 0.0, remaining: 0, ramp_len: 0 };
        ramp.reset(seconds, sample_rate);
        ramp
    }

    /// Change the glide time. Any ramp in flight jumps to its target.
    pub fn reset(&mut self, seconds: f32, sample_rate: f32) {
        let samples = (seconds.max(0.0) * sample_rate.max(1.0)).round();
        self.ramp_len = if samples.is_finite() { samples as u32 } else { 0 };
        self.set_immediate(self.target);
    }

    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_len == 0 {
            self.set_immediate(target);
        } else {
            self.remaining = self.ramp_len;
            self.step = (target - self.current) / self.ramp_len as f32;
        }
    }

    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.remaining = 0;
    }

    #[inline] pub fn current(&self) -> f32 { self.current }
    #[inline] pub fn target(&self) -> f32 { self.target }
    #[inline] pub fn is_ramping(&self) -> bool { self.remaining > 0 }

    /// Advance one sample.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.skip(1)
    }

    /// Advance `n` samples and return the new value. Lands exactly on the target.
    pub fn skip(&mut self, n: usize) -> f32 {
        if self.remaining == 0 {
            return self.current;
        }
        let n = u32::try_from(n).unwrap_or(u32::MAX);
        if n >= self.remaining {
            self.current = self.target;
            self.remaining = 0;
        } else {
            self.current += self.step * n as f32;
            self.remaining -= n;
        }
        self.current
    }
}

/// A [`Reverb`] whose controls glide instead of jumping.
#[derive(Clone, Debug)]
pub struct SmoothedReverb<F: SampleFormat = Float32> {
    reverb: Reverb<F>,
    ramps: [LinearRamp; 5],
    ramp_seconds: f32,
}

impl<F: SampleFormat> SmoothedReverb<F> {
    pub fn new() -> Self {
        Self::with_ramp_time(DEFAULT_RAMP_SECONDS)
    }

    pub fn with_ramp_time(seconds: f32) -> Self {
        let reverb = Reverb::new();
        let params = reverb.params();
        let ramps = ParamId::ALL.map(|id| LinearRamp::new(params.get(id), seconds, DEFAULT_SAMPLE_RATE));
        Self { reverb, ramps, ramp_seconds: seconds }
    }

    /// Re-initialize the reverb at `sample_rate` and snap every control to its
    /// pending target.
    pub fn init(&mut self, sample_rate: f32) {
        let targets = self.targets();
        self.reverb.init(sample_rate);
        let sr = self.reverb.sample_rate();
        for ramp in &mut self.ramps {
            ramp.reset(self.ramp_seconds, sr);
        }
        self.reverb.apply(&targets);
    }

    pub fn clear(&mut self) {
        self.reverb.clear();
    }

    pub fn set_target(&mut self, id: ParamId, value: f32) {
        self.ramps[id.index()].set_target(clamp01(value));
    }

    pub fn set_targets(&mut self, params: &ReverbParams) {
        for id in ParamId::ALL {
            self.set_target(id, params.get(id));
        }
    }

    /// Where the controls are heading.
    pub fn targets(&self) -> ReverbParams {
        let mut p = ReverbParams::DEFAULT;
        for id in ParamId::ALL {
            p.set(id, self.ramps[id.index()].target());
        }
        p
    }

    pub fn is_ramping(&self) -> bool {
        self.ramps.iter().any(LinearRamp::is_ramping)
    }

    #[inline] pub fn reverb(&self) -> &Reverb<F> { &self.reverb }
    #[inline] pub fn reverb_mut(&mut self) -> &mut Reverb<F> { &mut self.reverb }

    fn advance(&mut self, n: usize) {
        let mut p = ReverbParams::DEFAULT;
        for id in ParamId::ALL {
            p.set(id, self.ramps[id.index()].skip(n));
        }
        self.reverb.apply(&p);
    }

    pub fn process(&mut self, frames: &mut [Frame]) {
        if !self.is_ramping() {
            self.reverb.process(frames);
            return;
        }
        for chunk in frames.chunks_mut(CHUNK) {
            self.advance(chunk.len());
            self.reverb.process(chunk);
        }
    }

    pub fn process_split(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.is_ramping() {
            self.reverb.process_split(left, right);
            return;
        }
        for (l, r) in left.chunks_mut(CHUNK).zip(right.chunks_mut(CHUNK)) {
            self.advance(l.len().min(r.len()));
            self.reverb.process_split(l, r);
        }
    }

    #[inline]
    pub fn process_frame(&mut self, frame: Frame) -> Frame {
        if self.is_ramping() {
            self.advance(1);
        }
        self.reverb.process_frame(frame)
    }
}

impl<F: SampleFormat> Default for SmoothedReverb<F> {
    fn default() -> Self {
        Self::new()
    }
}

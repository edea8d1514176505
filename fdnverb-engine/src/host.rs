//! Host glue: a minimal `Effect` trait and a `Host<E>` wrapper that owns one
//! effect, tracks the host sample rate and renders interleaved device buffers.
//!
//! Design goals
//! - No allocations in the audio callback
//! - Sample-rate changes handled lazily, with one cheap comparison per buffer
//! - Generic over the effect, so plain and smoothed reverbs swap without trait objects

use fdnverb_core::format::SampleFormat;

use crate::error::{Error, Result};
use crate::reverb::{Frame, Reverb};
use crate::smoothing::SmoothedReverb;

/// Anything that turns one stereo frame into another.
pub trait Effect {
    /// Called on construction and whenever the sample rate changes.
    /// Controls must survive a reset.
    fn reset(&mut self, sample_rate: f32);

    fn process_frame(&mut self, frame: Frame) -> Frame;
}

impl<F: SampleFormat> Effect for Reverb<F> {
    fn reset(&mut self, sample_rate: f32) {
        let params = self.params();
        self.init(sample_rate);
        self.apply(&params);
    }

    #[inline]
    fn process_frame(&mut self, frame: Frame) -> Frame {
        Reverb::process_frame(self, frame)
    }
}

impl<F: SampleFormat> Effect for SmoothedReverb<F> {
    fn reset(&mut self, sample_rate: f32) {
        self.init(sample_rate);
    }

    #[inline]
    fn process_frame(&mut self, frame: Frame) -> Frame {
        SmoothedReverb::process_frame(self, frame)
    }
}

fn check_rate(sample_rate: f32) -> Result<f32> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}

/// Owns an effect and feeds it device-shaped buffers.
#[derive(Debug)]
pub struct Host<E: Effect> {
    sample_rate: f32,
    effect: E,
}

impl<E: Effect> Host<E> {
    pub fn new(mut effect: E, sample_rate: f32) -> Result<Self> {
        let sample_rate = check_rate(sample_rate)?;
        effect.reset(sample_rate);
        Ok(Self { sample_rate, effect })
    }

    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }
    #[inline] pub fn effect(&self) -> &E { &self.effect }
    #[inline] pub fn effect_mut(&mut self) -> &mut E { &mut self.effect }

    /// Reset the effect only if `sample_rate` differs from the current one.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        let sample_rate = check_rate(sample_rate)?;
        if sample_rate != self.sample_rate {
            log::info!("host sample rate {} -> {}", self.sample_rate, sample_rate);
            self.sample_rate = sample_rate;
            self.effect.reset(sample_rate);
        }
        Ok(())
    }

    /// Process an interleaved buffer with `channels` channels in place and
    /// return the number of frames rendered.
    ///
    /// Channel 0 feeds the left input, channel 1 (or channel 0 again on mono
    /// buffers) the right. A mono buffer receives the average of both outputs;
    /// channels beyond the second receive the same average.
    pub fn render_interleaved(&mut self, buffer: &mut [f32], channels: usize) -> Result<usize> {
        if channels == 0 {
            return Err(Error::InvalidChannelCount(channels));
        }
        let mut frames = 0;
        for slot in buffer.chunks_exact_mut(channels) {
            let input = if channels == 1 { Frame::mono(slot[0]) } else { Frame::new(slot[0], slot[1]) };
            let out = self.effect.process_frame(input);
            let mid = 0.5 * (out.l + out.r);
            if channels == 1 {
                slot[0] = mid;
            } else {
                slot[0] = out.l;
                slot[1] = out.r;
                slot[2..].fill(mid);
            }
            frames += 1;
        }
        Ok(frames)
    }
}

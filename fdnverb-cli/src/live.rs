//! Real-time demo: decaying noise bursts through the reverb on an output device.

use std::error::Error;

use cpal::traits::{DeviceTrait, HostTrait};
use fdnverb_core::dsp::{clamp, Meter};
use fdnverb_engine::{Host, Reverb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BURST_PERIOD_SEC: f32 = 1.5;
const BURST_LENGTH_SEC: f32 = 0.03;

/// A short noise burst with a linear decay, repeated every period.
#[derive(Debug)]
pub struct NoiseBursts {
    rng: StdRng,
    period: usize,
    length: usize,
    pos: usize,
    level: f32,
}

impl NoiseBursts {
    pub fn new(sample_rate: f32, rng: StdRng) -> Self {
        let period = ((BURST_PERIOD_SEC * sample_rate) as usize).max(2);
        let length = ((BURST_LENGTH_SEC * sample_rate) as usize).clamp(1, period - 1);
        Self { rng, period, length, pos: 0, level: 0.8 }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let x = if self.pos < self.length {
            let env = 1.0 - self.pos as f32 / self.length as f32;
            self.rng.gen_range(-1.0..1.0) * env * self.level
        } else {
            0.0
        };
        self.pos = (self.pos + 1) % self.period;
        x
    }
}

pub fn list_output_devices() -> Result<(), Box<dyn Error>> {
    let host = cpal::default_host();
    println!("Available output devices:");
    for dev in host.output_devices()? {
        println!("- {}", dev.name()?);
    }
    Ok(())
}

pub fn pick_device(name: Option<&str>) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices()? {
            if d.name()? == name {
                return Ok(d);
            }
        }
        return Err(format!("requested device not found: {name}").into());
    }
    host.default_output_device().ok_or_else(|| "no default output device".into())
}

/// Closest supported config to the requested rate and channel count.
pub fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig, Box<dyn Error>> {
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let ch_pen = req_ch.map_or(0, |c| u64::from(range.channels().abs_diff(c)));
        let (lo, hi) = (range.min_sample_rate().0, range.max_sample_rate().0);
        let sr_pen = req_sr.map_or(0, |sr| {
            if (lo..=hi).contains(&sr) { 0 } else { u64::from(lo.abs_diff(sr).min(hi.abs_diff(sr))) }
        });
        let score = sr_pen.saturating_mul(1000) + ch_pen;
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or("no supported output configs")?;
    let sr = match req_sr {
        Some(sr) => cpal::SampleRate(sr.clamp(range.min_sample_rate().0, range.max_sample_rate().0)),
        None => range.max_sample_rate(),
    };
    Ok(range.with_sample_rate(sr))
}

/// Frames rendered per pass through the scratch buffer.
const SCRATCH_FRAMES: usize = 1_024;

/// Fill `output` with reverberated bursts, at most `scratch.len()` samples
/// per pass. `scratch.len()` must be a non-zero multiple of `channels`.
fn render_bursts<T>(
    output: &mut [T],
    scratch: &mut [f32],
    channels: usize,
    host: &mut Host<Reverb>,
    bursts: &mut NoiseBursts,
    gain: f32,
    meter: &mut Meter,
) -> fdnverb_engine::Result<()>
where
    T: cpal::Sample + cpal::FromSample<f32>,
{
    if channels == 0 || scratch.len() < channels {
        return Err(fdnverb_engine::Error::InvalidChannelCount(channels));
    }
    let step = scratch.len() - scratch.len() % channels;
    for chunk in output.chunks_mut(step) {
        let buf = &mut scratch[..chunk.len()];
        for frame in buf.chunks_mut(channels) {
            frame.fill(bursts.next_sample());
        }
        host.render_interleaved(buf, channels)?;
        for (out, s) in chunk.iter_mut().zip(buf.iter()) {
            let s = clamp(s * gain, -1.0, 1.0);
            *out = T::from_sample(s);
            meter.tick(s);
        }
    }
    Ok(())
}

pub fn build_stream<T>(
    device: &cpal::Device,
    cfg: &cpal::StreamConfig,
    mut host: Host<Reverb>,
    gain: f32,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, Box<dyn Error>>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
{
    let sr = cfg.sample_rate.0 as f32;
    let channels = usize::from(cfg.channels);
    host.set_sample_rate(sr)?;

    let mut bursts = NoiseBursts::new(sr, StdRng::from_entropy());
    // Sized once here; the callback never grows it.
    let mut scratch = vec![0.0f32; SCRATCH_FRAMES * channels.max(1)];

    // ~1 second meter at the stream rate
    let meter_interval = (cfg.sample_rate.0).max(1) as usize;
    let mut meter = Meter::new(0.001);
    let mut meter_count: usize = 0;

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _| {
            if let Err(e) = render_bursts(output, &mut scratch, channels, &mut host, &mut bursts, gain, &mut meter) {
                log::error!("render failed: {e}");
                output.fill(T::EQUILIBRIUM);
                return;
            }
            meter_count += output.len() / channels.max(1);
            if meter_count >= meter_interval {
                log::info!("[meter] peak ~ {:.3}  rms ~ {:.3}", meter.peak(), meter.rms());
                meter.reset_peak();
                meter_count = 0;
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bursts_repeat_with_silence_between() {
        let sr = 1_000.0;
        let mut b = NoiseBursts::new(sr, StdRng::seed_from_u64(1));
        let first: Vec<f32> = (0..1_500).map(|_| b.next_sample()).collect();
        assert!(first[..30].iter().any(|x| *x != 0.0));
        assert!(first[30..].iter().all(|x| *x == 0.0));
        assert!(first.iter().all(|x| x.abs() <= 0.8));
        let second: Vec<f32> = (0..30).map(|_| b.next_sample()).collect();
        assert!(second.iter().any(|x| *x != 0.0));
    }

    fn render_with_scratch(scratch_frames: usize, output_frames: usize) -> Vec<f32> {
        let sr = 8_000.0;
        let mut host: Host<Reverb> = Host::new(Reverb::new(), sr).unwrap();
        host.effect_mut().set_amount(0.5);
        let mut bursts = NoiseBursts::new(sr, StdRng::seed_from_u64(9));
        let mut meter = Meter::new(0.01);
        let mut scratch = vec![0.0f32; 2 * scratch_frames];
        let mut output = vec![0.0f32; 2 * output_frames];
        render_bursts(&mut output, &mut scratch, 2, &mut host, &mut bursts, 0.5, &mut meter).unwrap();
        assert_eq!(scratch.len(), 2 * scratch_frames);
        output
    }

    #[test]
    fn device_buffers_larger_than_scratch_render_in_chunks() {
        let chunked = render_with_scratch(64, 20_000);
        let whole = render_with_scratch(20_000, 20_000);
        assert_eq!(chunked, whole);
        assert!(chunked.iter().any(|x| *x != 0.0));
        assert!(chunked.iter().all(|x| x.abs() <= 1.0));
    }

    #[test]
    fn zero_channels_is_rejected() {
        let mut host: Host<Reverb> = Host::new(Reverb::new(), 48_000.0).unwrap();
        let mut bursts = NoiseBursts::new(48_000.0, StdRng::seed_from_u64(1));
        let mut meter = Meter::new(0.01);
        let mut output = [0.0f32; 8];
        let mut scratch = [0.0f32; 8];
        assert!(render_bursts(&mut output, &mut scratch, 0, &mut host, &mut bursts, 1.0, &mut meter).is_err());
    }
}

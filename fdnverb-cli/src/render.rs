//! Offline rendering: WAV in, reverberated WAV out.

use std::error::Error;
use std::io::{Read, Seek, Write};
use std::path::Path;

use fdnverb_engine::{Frame, Reverb, ReverbParams};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Decode any PCM or float WAV to stereo frames. Mono is duplicated; channels
/// past the second are dropped.
pub fn read_frames<R: Read>(reader: WavReader<R>) -> Result<(Vec<Frame>, u32), hound::Error> {
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<Result<_, _>>()?
        }
    };

    let frames = samples
        .chunks_exact(channels)
        .map(|ch| if channels == 1 { Frame::mono(ch[0]) } else { Frame::new(ch[0], ch[1]) })
        .collect();
    Ok((frames, spec.sample_rate))
}

/// 32-bit float stereo.
pub fn write_frames<W: Write + Seek>(writer: W, frames: &[Frame], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = WavSpec { channels: 2, sample_rate, bits_per_sample: 32, sample_format: SampleFormat::Float };
    let mut writer = WavWriter::new(writer, spec)?;
    for f in frames {
        writer.write_sample(f.l)?;
        writer.write_sample(f.r)?;
    }
    writer.finalize()
}

/// Run `input` plus `tail_sec` of silence through a fresh reverb.
pub fn render(input: &[Frame], sample_rate: u32, params: &ReverbParams, tail_sec: f32, limiter: bool) -> Vec<Frame> {
    let mut reverb: Box<Reverb> = Reverb::new_boxed(sample_rate as f32);
    reverb.apply(params);
    reverb.set_output_limiter(limiter);

    let tail = (tail_sec.max(0.0) * sample_rate as f32) as usize;
    let mut frames = Vec::with_capacity(input.len() + tail);
    frames.extend_from_slice(input);
    frames.resize(input.len() + tail, Frame::default());
    reverb.process(&mut frames);
    frames
}

pub fn peak(frames: &[Frame]) -> f32 {
    frames.iter().fold(0.0, |m, f| m.max(f.l.abs()).max(f.r.abs()))
}

pub fn render_file(
    input: Option<&Path>,
    output: &Path,
    fallback_rate: u32,
    params: &ReverbParams,
    tail_sec: f32,
    limiter: bool,
) -> Result<(), Box<dyn Error>> {
    let (dry, sample_rate) = match input {
        Some(path) => {
            let reader = WavReader::open(path).map_err(|e| format!("failed to open '{}': {e}", path.display()))?;
            read_frames(reader)?
        }
        None => (vec![Frame::mono(1.0)], fallback_rate),
    };
    log::info!("rendering {} frames at {} Hz, tail {:.2}s, {:?}", dry.len(), sample_rate, tail_sec, params);

    let wet = render(&dry, sample_rate, params, tail_sec, limiter);
    let peak = peak(&wet);
    if peak > 1.0 && !limiter {
        log::warn!("output peaks at {peak:.3}; pass --limiter to soft-clip");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::io::BufWriter::new(std::fs::File::create(output)?);
    write_frames(file, &wet, sample_rate)?;
    println!("wrote {} ({} frames, peak {:.3})", output.display(), wet.len(), peak);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn render_appends_tail_and_reverberates() {
        let params = ReverbParams { amount: 1.0, ..ReverbParams::DEFAULT };
        let out = render(&[Frame::mono(1.0)], 48_000, &params, 0.5, false);
        assert_eq!(out.len(), 1 + 24_000);
        let late: f32 = out[1000..].iter().map(|f| f.l * f.l + f.r * f.r).sum();
        assert!(late > 0.0);
    }

    #[test]
    fn limiter_bounds_rendered_peak() {
        let params = ReverbParams::new(1.0, 1.0, 0.95, 0.7, 1.0);
        let loud = vec![Frame::mono(4.0); 4800];
        assert!(peak(&render(&loud, 48_000, &params, 0.1, true)) <= 1.0);
    }

    #[test]
    fn wav_io_preserves_float_frames() {
        let frames = [Frame::new(0.25, -0.5), Frame::new(1.0, 0.0)];
        let mut bytes = Cursor::new(Vec::new());
        write_frames(&mut bytes, &frames, 44_100).unwrap();
        bytes.set_position(0);
        let (back, sr) = read_frames(WavReader::new(bytes).unwrap()).unwrap();
        assert_eq!(sr, 44_100);
        assert_eq!(back, frames);
    }

    #[test]
    fn int_mono_wav_is_scaled_and_duplicated() {
        let spec = WavSpec { channels: 1, sample_rate: 8_000, bits_per_sample: 16, sample_format: SampleFormat::Int };
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut w = WavWriter::new(&mut bytes, spec).unwrap();
            w.write_sample(16_384i16).unwrap();
            w.write_sample(-32_768i16).unwrap();
            w.finalize().unwrap();
        }
        bytes.set_position(0);
        let (frames, _) = read_frames(WavReader::new(bytes).unwrap()).unwrap();
        assert_eq!(frames, [Frame::mono(0.5), Frame::mono(-1.0)]);
    }
}

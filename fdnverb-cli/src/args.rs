//! `--key=value` command-line parsing.

use std::path::PathBuf;

use fdnverb_engine::{presets, ParamId, ReverbParams};
use log::LevelFilter;

pub const USAGE: &str = "\
fdnverb: stereo diffusion reverb

Offline:
  fdnverb --input=in.wav --output=out.wav [--preset=NAME] [--tail=SECONDS]
  fdnverb --impulse --output=ir.wav [--sample-rate=HZ]

Live demo (noise bursts through the reverb):
  fdnverb [--device=NAME] [--sample-rate=HZ] [--channels=N] [--duration=SECONDS] [--gain=G]

Controls (0..1, override the preset):
  --amount= --input-gain= --time= --diffusion= --lp=

Other:
  --list-presets  --list-devices  --limiter  --log=LEVEL  --help";

#[derive(Debug, Default)]
pub struct Args {
    pub help: bool,
    pub list_devices: bool,
    pub list_presets: bool,
    pub device_name: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub duration_sec: Option<u64>,
    pub gain: Option<f32>,
    pub preset: Option<String>,
    pub overrides: Vec<(ParamId, f32)>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub tail_sec: Option<f32>,
    pub impulse: bool,
    pub limiter: bool,
    pub log_level: Option<LevelFilter>,
}

impl Args {
    /// Preset (or defaults) with per-control overrides applied in order.
    pub fn params(&self) -> fdnverb_engine::Result<ReverbParams> {
        let mut params = match &self.preset {
            Some(name) => presets::by_name(name)?.params,
            None => ReverbParams::DEFAULT,
        };
        for (id, v) in &self.overrides {
            params.set(*id, *v);
        }
        Ok(params.clamped())
    }
}

pub fn parse_args() -> Args {
    parse_from(std::env::args().skip(1))
}

pub fn parse_from<I: IntoIterator<Item = String>>(items: I) -> Args {
    let mut a = Args::default();
    for s in items {
        match s.as_str() {
            "--help" | "-h" => { a.help = true; continue; }
            "--list-devices" => { a.list_devices = true; continue; }
            "--list-presets" => { a.list_presets = true; continue; }
            "--impulse" => { a.impulse = true; continue; }
            "--limiter" => { a.limiter = true; continue; }
            _ => {}
        }
        let Some((key, value)) = s.strip_prefix("--").and_then(|kv| kv.split_once('=')) else {
            eprintln!("[warn] unknown arg: {s}");
            continue;
        };
        let ok = match key {
            "device" => { a.device_name = Some(value.to_string()); true }
            "sample-rate" => { a.sample_rate = value.parse().ok(); a.sample_rate.is_some() }
            "channels" => { a.channels = value.parse().ok(); a.channels.is_some() }
            "duration" => { a.duration_sec = value.parse().ok(); a.duration_sec.is_some() }
            "gain" => { a.gain = value.parse().ok(); a.gain.is_some() }
            "preset" => { a.preset = Some(value.to_string()); true }
            "input" => { a.input = Some(PathBuf::from(value)); true }
            "output" => { a.output = Some(PathBuf::from(value)); true }
            "tail" => { a.tail_sec = value.parse().ok(); a.tail_sec.is_some() }
            "log" => { a.log_level = value.parse().ok(); a.log_level.is_some() }
            other => match (other.parse::<ParamId>(), value.parse::<f32>()) {
                (Ok(id), Ok(v)) => { a.overrides.push((id, v)); true }
                (Ok(_), Err(_)) => false,
                (Err(_), _) => { eprintln!("[warn] unknown arg: {s}"); continue; }
            },
        };
        if !ok {
            eprintln!("[warn] bad value in: {s}");
        }
    }
    a
}

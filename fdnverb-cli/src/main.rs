//! fdnverb CLI: offline WAV renderer and real-time demo player.

mod args;
mod live;
mod logger;
mod render;

use std::error::Error;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use fdnverb_engine::{Host, Reverb, FACTORY_PRESETS, TAIL_SECONDS};
use log::LevelFilter;

use crate::args::{parse_args, Args, USAGE};

fn print_presets() {
    println!("Factory presets (amount / input gain / time / diffusion / lp):");
    for (i, p) in FACTORY_PRESETS.iter().enumerate() {
        let q = &p.params;
        println!(
            "{i:>2}  {:<15} {:.2} / {:.2} / {:.2} / {:.3} / {:.2}",
            p.name, q.amount, q.input_gain, q.time, q.diffusion, q.lp
        );
    }
}

fn run_live(args: &Args) -> Result<(), Box<dyn Error>> {
    let device = live::pick_device(args.device_name.as_deref())?;
    let sup_cfg = live::choose_config(&device, args.sample_rate, args.channels)?;
    let sample_format = sup_cfg.sample_format();
    let mut cfg = sup_cfg.config();
    if let Some(ch) = args.channels {
        cfg.channels = ch;
    }

    let mut reverb: Reverb = Reverb::new();
    reverb.apply(&args.params()?);
    reverb.set_output_limiter(args.limiter);
    let host = Host::new(reverb, cfg.sample_rate.0 as f32)?;
    let gain = args.gain.unwrap_or(0.5);

    println!("Using device: {}", device.name()?);
    println!("Stream config: {cfg:?} (sample_format: {sample_format:?})");
    println!("Reverb: {:?}  | Gain: {gain:.2}", host.effect().params());
    if let Some(d) = args.duration_sec {
        println!("Auto-stop after {d} seconds");
    }
    println!("Press Ctrl+C to stop…\n");

    let err_fn = |e: cpal::StreamError| log::error!("stream error: {e}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => live::build_stream::<f32>(&device, &cfg, host, gain, err_fn)?,
        cpal::SampleFormat::I16 => live::build_stream::<i16>(&device, &cfg, host, gain, err_fn)?,
        cpal::SampleFormat::U16 => live::build_stream::<u16>(&device, &cfg, host, gain, err_fn)?,
        other => return Err(format!("unsupported device sample format: {other:?}").into()),
    };

    stream.play()?;

    if let Some(d) = args.duration_sec {
        std::thread::sleep(Duration::from_secs(d));
        return Ok(());
    }

    loop {
        std::thread::sleep(Duration::from_millis(500));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    logger::init(args.log_level.unwrap_or(LevelFilter::Info));

    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    if args.list_presets {
        print_presets();
        return Ok(());
    }
    if args.list_devices {
        live::list_output_devices()?;
        return Ok(());
    }

    if let Some(output) = &args.output {
        let input = if args.impulse { None } else { args.input.as_deref() };
        if input.is_none() && !args.impulse {
            return Err("--output needs --input or --impulse".into());
        }
        let params = args.params()?;
        let tail = args.tail_sec.unwrap_or(TAIL_SECONDS);
        return render::render_file(input, output, args.sample_rate.unwrap_or(48_000), &params, tail, args.limiter);
    }
    if args.input.is_some() || args.impulse {
        return Err("--input/--impulse need --output".into());
    }

    println!("fdnverb: live reverb demo\n");
    run_live(&args)
}

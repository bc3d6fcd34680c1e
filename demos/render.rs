// Copyright (c) 2024 Mike Tsao

//! Renders a drone to a WAV file, faster than real time.

use clap::Parser;
use harmonic_drone::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Use the seven-voice profile rather than the four-voice one
    #[clap(long)]
    septet: bool,

    /// Load the profile and sample rate from a settings file instead
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// How many full cycles to render
    #[clap(short, long, default_value_t = 2)]
    cycles: usize,

    /// Where to write the WAV file
    #[clap(short, long, default_value = "drone.wav")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let settings = match &args.settings {
        Some(path) => DroneSettings::load(path)?,
        None if args.septet => DroneSettings::new_with(DroneProfile::septet(), Default::default()),
        None => DroneSettings::default(),
    };

    let mut performance =
        Performance::new_with(settings.profile().clone(), settings.audio().sample_rate())?;
    performance.start()?;
    let duration = performance.profile().duration() * args.cycles as f64;
    PerformanceExporter::export_to_wav(&mut performance, duration, &args.output)?;
    performance.stop()?;

    println!("Wrote {duration} to {}", args.output.display());
    Ok(())
}

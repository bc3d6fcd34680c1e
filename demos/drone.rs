// Copyright (c) 2024 Mike Tsao

//! Plays a drone through the default audio device until its time is up.

use clap::{Parser, ValueEnum};
use harmonic_drone::prelude::*;
use harmonic_drone_services::prelude::*;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Preset {
    /// Four voices over a 16-second cycle
    #[default]
    Quartet,
    /// Seven voices over a 32-second cycle
    Septet,
}
impl From<Preset> for DroneProfile {
    fn from(value: Preset) -> Self {
        match value {
            Preset::Quartet => DroneProfile::quartet(),
            Preset::Septet => DroneProfile::septet(),
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Which built-in profile to play
    #[clap(short, long, value_enum, default_value_t)]
    preset: Preset,

    /// Load the profile from a settings file instead
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// How long to play, in seconds
    #[clap(short = 't', long, default_value_t = 60.0)]
    seconds: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let profile = match &args.settings {
        Some(path) => DroneSettings::load(path)?.profile().clone(),
        None => args.preset.into(),
    };

    let audio = CpalAudioService::new_with(None)?;
    let mut timer = TimerService::new();

    // The stream might ask for frames before it announces its format.
    let sample_rate = loop {
        if let CpalAudioServiceEvent::Reset(sample_rate, channel_count) = audio.receiver().recv()? {
            log::info!("playing {channel_count} channels at {sample_rate}Hz");
            break SampleRate::new(sample_rate);
        }
    };

    let mut scheduler =
        HarmonicScheduler::new_with(profile, SoftwareBackend::new_with(sample_rate)?)?;
    scheduler.start(&mut timer)?;
    let stop_at = Seconds(args.seconds);

    let audio_events = audio.receiver().clone();
    let timer_events = timer.receiver().clone();
    let mut buffer = Vec::default();
    while scheduler.backend().now() < stop_at {
        crossbeam::select! {
            recv(audio_events) -> event => match event? {
                CpalAudioServiceEvent::FramesNeeded(count) => {
                    buffer.resize(count, StereoSample::SILENCE);
                    scheduler.backend_mut().render(&mut buffer);
                    audio.send_input(CpalAudioServiceInput::frames_from(&buffer));
                }
                CpalAudioServiceEvent::Underrun => log::warn!("audio underrun"),
                CpalAudioServiceEvent::Reset(..) => {}
            },
            recv(timer_events) -> event => match event? {
                TimerServiceEvent::Tick(handle) => scheduler.handle_tick(handle)?,
            },
        }
    }

    scheduler.stop(&mut timer)?;
    audio.send_input(CpalAudioServiceInput::Quit);
    Ok(())
}

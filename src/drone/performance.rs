// Copyright (c) 2024 Mike Tsao

use super::{DroneProfile, HarmonicScheduler, ManualTicker};
use crate::{
    backend::SoftwareBackend,
    error::Result,
    traits::{Configurable, ToneBackend},
    types::{NodeUid, SampleRate, Seconds, StereoSample},
};
use delegate::delegate;

/// A self-contained drone that produces audio on demand. It renders with a
/// [SoftwareBackend] and keeps a [ManualTicker] in step with the audio clock,
/// so every voice is armed on the exact frame its tick falls due.
#[derive(Debug)]
pub struct Performance {
    scheduler: HarmonicScheduler<SoftwareBackend>,
    ticker: ManualTicker,
}
impl Performance {
    /// Creates a stopped performance of the given profile.
    pub fn new_with(profile: DroneProfile, sample_rate: SampleRate) -> Result<Self> {
        Ok(Self {
            scheduler: HarmonicScheduler::new_with(
                profile,
                SoftwareBackend::new_with(sample_rate)?,
            )?,
            ticker: ManualTicker::default(),
        })
    }

    /// Starts the drone at the current audio time.
    pub fn start(&mut self) -> Result<()> {
        self.ticker.advance_to(self.scheduler.backend().now());
        self.scheduler.start(&mut self.ticker)
    }

    /// Stops the drone. Whatever was sounding is cut off.
    pub fn stop(&mut self) -> Result<()> {
        self.scheduler.stop(&mut self.ticker)
    }

    /// Fills the buffer with the next frames, arming voices as their ticks
    /// fall due.
    pub fn render(&mut self, frames: &mut [StereoSample]) -> Result<()> {
        for frame in frames {
            let now = self.scheduler.backend().now();
            while let Some(handle) = self.ticker.poll(now) {
                self.scheduler.handle_tick(handle)?;
            }
            *frame = self.scheduler.backend_mut().render_frame();
        }
        Ok(())
    }

    /// Renders the next `duration` worth of audio.
    pub fn render_for(&mut self, duration: Seconds) -> Result<Vec<StereoSample>> {
        let mut frames = vec![StereoSample::SILENCE; self.sample_rate().frames_in(duration)];
        self.render(&mut frames)?;
        Ok(frames)
    }

    /// The current audio time.
    pub fn now(&self) -> Seconds {
        self.scheduler.backend().now()
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.scheduler.backend().sample_rate()
    }

    delegate! {
        to self.scheduler {
            #[allow(missing_docs)]
            pub fn is_running(&self) -> bool;
            /// The slot that the next tick arms.
            pub fn cursor(&self) -> usize;
            /// The bus that carries the whole drone.
            pub fn output(&self) -> NodeUid;
            #[allow(missing_docs)]
            pub fn profile(&self) -> &DroneProfile;
        }
    }

    /// The scheduler, for inspection.
    pub fn scheduler(&self) -> &HarmonicScheduler<SoftwareBackend> {
        &self.scheduler
    }
}

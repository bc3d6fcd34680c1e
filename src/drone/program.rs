// Copyright (c) 2024 Mike Tsao

use super::DroneProfile;
use crate::{
    error::Result,
    traits::Automatable,
    types::{FrequencyHz, Normal, ParameterType, RangedF64, Seconds},
};
use serde::{Deserialize, Serialize};

/// Everything one voice does during one cycle: an exponential frequency sweep
/// and a fade-in, plateau, fade-out gain envelope, both anchored at `start`.
///
/// Applying a program replaces whatever the voice had scheduled from `start`
/// onward, so it's always legal to apply one to a fresh or a busy voice, and
/// applying the same program twice is the same as applying it once.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VoiceProgram {
    start: Seconds,
    duration: Seconds,
    start_frequency: FrequencyHz,
    end_frequency: FrequencyHz,
}
impl VoiceProgram {
    /// The envelope's loudest level.
    pub const PEAK_GAIN: ParameterType = 0.5;
    /// Where in the cycle the fade-in reaches [Self::PEAK_GAIN].
    pub const ATTACK_END: Normal = RangedF64(0.7);
    /// Where in the cycle the fade-out begins.
    pub const RELEASE_START: Normal = RangedF64(0.9);

    #[allow(missing_docs)]
    pub fn new(
        start: Seconds,
        duration: Seconds,
        start_frequency: FrequencyHz,
        end_frequency: FrequencyHz,
    ) -> Self {
        Self {
            start,
            duration,
            start_frequency,
            end_frequency,
        }
    }

    /// The program for one voice of the given profile, beginning at `start`.
    pub fn new_with(profile: &DroneProfile, start: Seconds) -> Self {
        Self::new(
            start,
            profile.duration(),
            profile.start_frequency(),
            profile.end_frequency(),
        )
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> Seconds {
        self.start
    }

    /// When the voice falls silent and is safe to arm again.
    pub fn end(&self) -> Seconds {
        self.start + self.duration
    }

    /// When the fade-in tops out.
    pub fn attack_end(&self) -> Seconds {
        self.start + self.duration * Self::ATTACK_END
    }

    /// When the fade-out begins.
    pub fn release_start(&self) -> Seconds {
        self.start + self.duration * Self::RELEASE_START
    }

    /// Schedules the frequency sweep: `start_frequency` at the start, moving
    /// exponentially so that it sounds like an even glide, arriving at
    /// `end_frequency` at the end.
    pub fn apply_sweep(&self, frequency: &mut impl Automatable) -> Result<()> {
        frequency.cancel_after(self.start);
        frequency.set_value_at(self.start_frequency.0, self.start)?;
        frequency.ramp_exponential_to(self.end_frequency.0, self.end())
    }

    /// Schedules the gain envelope: silent at the start, rising linearly to
    /// [Self::PEAK_GAIN], holding, then falling linearly to silence at the end.
    pub fn apply_envelope(&self, gain: &mut impl Automatable) -> Result<()> {
        gain.cancel_after(self.start);
        gain.set_value_at(0.0, self.start)?;
        gain.ramp_linear_to(Self::PEAK_GAIN, self.attack_end())?;
        gain.ramp_linear_to(Self::PEAK_GAIN, self.release_start())?;
        gain.ramp_linear_to(0.0, self.end())
    }
}

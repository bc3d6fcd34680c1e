// Copyright (c) 2024 Mike Tsao

use crate::types::{FrequencyHz, Seconds};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// The numbers that distinguish one drone from another. All the behavior is
/// shared; a profile only says how long a cycle lasts, how many voices share
/// it, and where each voice's sweep begins and ends.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(private, name = "build_from_builder"))]
#[serde(rename_all = "kebab-case")]
pub struct DroneProfile {
    /// How long one voice takes to sweep and fade, which is also how long
    /// the scheduler takes to visit every slot once.
    #[builder(setter(into))]
    duration: Seconds,

    /// How many voices share a cycle.
    slot_count: usize,

    /// Where each sweep begins.
    #[builder(setter(into))]
    start_frequency: FrequencyHz,

    /// Where each sweep ends.
    #[builder(setter(into))]
    end_frequency: FrequencyHz,
}
impl DroneProfileBuilder {
    /// Builds the [DroneProfile], rejecting numbers that can't make a drone.
    pub fn build(&self) -> Result<DroneProfile, DroneProfileBuilderError> {
        let profile = self.build_from_builder()?;
        profile
            .validate()
            .map_err(DroneProfileBuilderError::ValidationError)?;
        Ok(profile)
    }
}
impl Default for DroneProfile {
    fn default() -> Self {
        Self::quartet()
    }
}
impl DroneProfile {
    /// The most voices a profile can ask for.
    pub const MAX_SLOT_COUNT: usize = 64;
    /// The shortest time allowed between voice arms.
    pub const MIN_TICK_INTERVAL: Seconds = Seconds(0.001);

    /// Four voices over a 16-second cycle, each sweeping 110Hz to 1760Hz.
    pub fn quartet() -> Self {
        Self {
            duration: Seconds(16.0),
            slot_count: 4,
            start_frequency: FrequencyHz(110.0),
            end_frequency: FrequencyHz(1760.0),
        }
    }

    /// Seven voices over a 32-second cycle, each sweeping 27.5Hz to 1760Hz.
    pub fn septet() -> Self {
        Self {
            duration: Seconds(32.0),
            slot_count: 7,
            start_frequency: FrequencyHz(27.5),
            end_frequency: FrequencyHz(1760.0),
        }
    }

    #[allow(missing_docs)]
    pub fn duration(&self) -> Seconds {
        self.duration
    }

    #[allow(missing_docs)]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[allow(missing_docs)]
    pub fn start_frequency(&self) -> FrequencyHz {
        self.start_frequency
    }

    #[allow(missing_docs)]
    pub fn end_frequency(&self) -> FrequencyHz {
        self.end_frequency
    }

    /// The time between consecutive voice arms. Exactly `slot_count` of them
    /// span one `duration`.
    pub fn tick_interval(&self) -> Seconds {
        self.duration / self.slot_count.max(1)
    }

    /// Explains what's wrong with the profile, if anything.
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration.0.is_finite() || self.duration.0 <= 0.0 {
            return Err(format!("duration {} must be positive", self.duration));
        }
        if self.slot_count == 0 {
            return Err("slot count must be at least one".to_string());
        }
        if self.slot_count > Self::MAX_SLOT_COUNT {
            return Err(format!(
                "slot count {} can't be more than {}",
                self.slot_count,
                Self::MAX_SLOT_COUNT
            ));
        }
        if self.tick_interval() < Self::MIN_TICK_INTERVAL {
            return Err(format!(
                "duration {} is too short to divide among {} voices",
                self.duration, self.slot_count
            ));
        }
        for (name, frequency) in [
            ("start", self.start_frequency),
            ("end", self.end_frequency),
        ] {
            if !frequency.is_audible_range_candidate() {
                return Err(format!("{name} frequency {frequency} must be positive"));
            }
        }
        Ok(())
    }
}

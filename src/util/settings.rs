// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::{drone::DroneProfile, traits::HasSettings, types::SampleRate};
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Contains persistent audio settings.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct AudioSettings {
    sample_rate: SampleRate,
    #[derivative(Default(value = "2"))]
    channel_count: u16,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    has_been_saved: bool,
}
impl HasSettings for AudioSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl AudioSettings {
    /// Returns the currently selected audio sample rate, in Hertz (samples per
    /// second).
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Returns the currently selected number of audio channels. In most cases,
    /// this will be two (left channel and right channel).
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_sample_rate(&mut self, sample_rate: SampleRate) {
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.needs_save();
        }
    }
}

/// Everything needed to reproduce a drone: which profile to play, and how to
/// play it.
#[derive(Clone, Debug, Default, Derivative, Serialize, Deserialize)]
#[derivative(PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DroneSettings {
    profile: DroneProfile,
    #[serde(default)]
    audio: AudioSettings,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    has_been_saved: bool,
}
impl HasSettings for DroneSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved && self.audio.has_been_saved()
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
        self.audio.mark_clean();
    }
}
impl DroneSettings {
    #[allow(missing_docs)]
    pub fn new_with(profile: DroneProfile, audio: AudioSettings) -> Self {
        Self {
            profile,
            audio,
            has_been_saved: false,
        }
    }

    #[allow(missing_docs)]
    pub fn profile(&self) -> &DroneProfile {
        &self.profile
    }

    #[allow(missing_docs)]
    pub fn audio(&self) -> &AudioSettings {
        &self.audio
    }

    #[allow(missing_docs)]
    pub fn audio_mut(&mut self) -> &mut AudioSettings {
        &mut self.audio
    }

    /// Updates the field and marks the struct eligible to save.
    pub fn set_profile(&mut self, profile: DroneProfile) {
        if profile != self.profile {
            self.profile = profile;
            self.needs_save();
        }
    }

    /// Reads settings from a JSON file. The profile is checked, because a
    /// hand-edited file can say anything.
    #[cfg(feature = "std")]
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::{anyhow, Context};

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings
            .profile
            .validate()
            .map_err(|e| anyhow!("{}: {e}", path.display()))?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Writes settings to a JSON file.
    #[cfg(feature = "std")]
    pub fn save(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let json = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        self.mark_clean();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("harmonic-drone-{}-{name}", std::process::id()))
    }

    #[test]
    fn defaults_are_reasonable() {
        let settings = DroneSettings::default();
        assert_eq!(settings.profile(), &DroneProfile::quartet());
        assert_eq!(settings.audio().sample_rate(), SampleRate::DEFAULT);
        assert_eq!(settings.audio().channel_count(), 2);
        assert!(!settings.has_been_saved());
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("roundtrip.json");
        let mut settings = DroneSettings::default();
        settings.set_profile(DroneProfile::septet());
        settings.audio_mut().set_sample_rate(SampleRate::new(48000));
        settings.save(&path).unwrap();
        assert!(settings.has_been_saved());

        let loaded = DroneSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert!(loaded.has_been_saved());

        settings.audio_mut().set_sample_rate(SampleRate::new(44100));
        assert!(!settings.has_been_saved());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_invalid_profile() {
        let path = temp_path("invalid.json");
        std::fs::write(
            &path,
            r#"{"profile": {"duration": 0.0, "slot-count": 4, "start-frequency": 110.0, "end-frequency": 1760.0}}"#,
        )
        .unwrap();
        assert!(DroneSettings::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_oversized_profile() {
        let path = temp_path("oversized.json");
        std::fs::write(
            &path,
            r#"{"profile": {"duration": 16.0, "slot-count": 4000000000, "start-frequency": 110.0, "end-frequency": 1760.0}}"#,
        )
        .unwrap();
        let e = DroneSettings::load(&path).unwrap_err();
        assert!(e.to_string().contains("slot count"), "{e}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_reports_missing_file() {
        let path = temp_path("does-not-exist.json");
        let e = DroneSettings::load(&path).unwrap_err();
        assert!(e.to_string().contains("reading settings"), "{e}");
    }
}

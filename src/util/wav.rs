// Copyright (c) 2024 Mike Tsao

use crate::{
    drone::Performance,
    types::{Seconds, StereoSample},
};
use std::path::Path;

/// Exports [Performance]s to audio files.
pub struct PerformanceExporter {}
impl PerformanceExporter {
    /// How much audio to render between writes.
    const CHUNK: Seconds = Seconds(1.0);

    /// Renders the next `duration` of the performance as a 16-bit stereo WAV
    /// file at the specified path.
    pub fn export_to_wav(
        performance: &mut Performance,
        duration: Seconds,
        path: &Path,
    ) -> anyhow::Result<()> {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: performance.sample_rate().into(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;

        let mut remaining = performance.sample_rate().frames_in(duration);
        let chunk_frames = performance.sample_rate().frames_in(Self::CHUNK).max(1);
        while remaining > 0 {
            let mut frames = vec![StereoSample::SILENCE; remaining.min(chunk_frames)];
            performance.render(&mut frames)?;
            for frame in frames {
                let (left, right) = frame.into_i16();
                writer.write_sample(left)?;
                writer.write_sample(right)?;
            }
            remaining = remaining.saturating_sub(chunk_frames);
        }
        writer.finalize()?;
        log::info!("wrote {duration} of audio to {}", path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{drone::DroneProfile, types::SampleRate};

    #[test]
    fn exported_file_has_expected_shape() {
        let path = std::env::temp_dir().join(format!(
            "harmonic-drone-{}-export.wav",
            std::process::id()
        ));
        let mut performance =
            Performance::new_with(DroneProfile::quartet(), SampleRate::new(1000)).unwrap();
        performance.start().unwrap();
        PerformanceExporter::export_to_wav(&mut performance, Seconds(2.5), &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 1000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 2 * 2500);
        assert_eq!(performance.now(), Seconds(2.5));
        let _ = std::fs::remove_file(&path);
    }
}

// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use core::{
    fmt::Display,
    ops::{Add, AddAssign, Mul},
};
use serde::{Deserialize, Serialize};

/// The type of a value carried by an automatable parameter.
pub type ParameterType = f64;

/// The primitive Rust type of a single audio sample.
pub type SampleType = f64;

/// [Sample] represents a single-channel audio sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Sample(pub SampleType);
impl Sample {
    /// The [SampleType] value of silence.
    pub const SILENCE_VALUE: SampleType = 0.0;
    /// A [Sample] that is silent.
    pub const SILENCE: Sample = Sample(Self::SILENCE_VALUE);
    /// The maximum positive [SampleType] value.
    pub const MAX_VALUE: SampleType = 1.0;
    /// A [Sample] having the maximum positive value.
    pub const MAX: Sample = Sample(Self::MAX_VALUE);
    /// The maximum negative [SampleType] value.
    pub const MIN_VALUE: SampleType = -1.0;
    /// A [Sample] having the maximum negative value.
    pub const MIN: Sample = Sample(Self::MIN_VALUE);

    /// Converts to a 16-bit integer, clipping anything outside [-1.0, 1.0].
    pub fn into_i16(self) -> i16 {
        (self.0.clamp(Self::MIN_VALUE, Self::MAX_VALUE) * i16::MAX as SampleType) as i16
    }
}
impl Add for Sample {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl AddAssign for Sample {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl Mul<ParameterType> for Sample {
    type Output = Self;

    fn mul(self, rhs: ParameterType) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Sample(value)
    }
}
impl From<f32> for Sample {
    fn from(value: f32) -> Self {
        Sample(value as SampleType)
    }
}

/// [StereoSample] is a two-channel sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct StereoSample(pub Sample, pub Sample);
impl StereoSample {
    /// Silence (0.0).
    pub const SILENCE: StereoSample = StereoSample(Sample::SILENCE, Sample::SILENCE);
    /// The loudest positive value (1.0).
    pub const MAX: StereoSample = StereoSample(Sample::MAX, Sample::MAX);
    /// The loudest negative value (-1.0).
    pub const MIN: StereoSample = StereoSample(Sample::MIN, Sample::MIN);

    /// Creates a new [StereoSample] from left and right [Sample]s.
    pub fn new(left: Sample, right: Sample) -> Self {
        Self(left, right)
    }

    /// Converts both channels to 16-bit integers for export.
    pub fn into_i16(self) -> (i16, i16) {
        (self.0.into_i16(), self.1.into_i16())
    }
}
impl From<Sample> for StereoSample {
    fn from(value: Sample) -> Self {
        Self(value, value)
    }
}

/// A frequency in [Hertz](https://en.wikipedia.org/wiki/Hertz).
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FrequencyHz(pub ParameterType);
impl FrequencyHz {
    /// Whether this frequency can drive an oscillator or an exponential ramp.
    pub fn is_audible_range_candidate(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}
impl Display for FrequencyHz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}Hz", self.0)
    }
}
impl From<f64> for FrequencyHz {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_to_stereo() {
        assert_eq!(StereoSample::from(Sample::MIN), StereoSample::MIN);
        assert_eq!(StereoSample::from(Sample::SILENCE), StereoSample::SILENCE);
        assert_eq!(StereoSample::from(Sample::MAX), StereoSample::MAX);
    }

    #[test]
    fn sample_to_i16_clips() {
        assert_eq!(Sample::MAX.into_i16(), i16::MAX);
        assert_eq!(Sample(2.0).into_i16(), i16::MAX);
        assert_eq!(Sample(-2.0).into_i16(), -i16::MAX);
        assert_eq!(Sample::SILENCE.into_i16(), 0);
    }

    #[test]
    fn frequency_validity() {
        assert!(FrequencyHz(27.5).is_audible_range_candidate());
        assert!(!FrequencyHz(0.0).is_audible_range_candidate());
        assert!(!FrequencyHz(-110.0).is_audible_range_candidate());
        assert!(!FrequencyHz(f64::NAN).is_audible_range_candidate());
    }
}

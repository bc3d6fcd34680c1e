// Copyright (c) 2024 Mike Tsao

use crate::{
    traits::{Configurable, Generates},
    types::{FrequencyHz, Sample, SampleRate},
};
use core::f64::consts::PI;
use derivative::Derivative;
use kahan::KahanSum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// Classic oscillator waveforms
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    EnumIter,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    /// Silence
    None,
    /// Sine wave
    #[default]
    Sine,
    /// Square wave
    Square,
    /// Triangle wave. Odd harmonics only, falling off quickly, so it's brighter
    /// than a sine without being harsh.
    Triangle,
    /// Sawtooth wave
    Sawtooth,
}

/// A signal generator that produces traditional waveforms (sine, square,
/// triangle, etc.)
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct Oscillator {
    /// The fundamental waveform for this oscillator.
    waveform: Waveform,

    /// Hertz. Any positive number. 440 = A4
    #[derivative(Default(value = "FrequencyHz(440.0)"))]
    frequency: FrequencyHz,

    #[serde(skip)]
    e: OscillatorEphemerals,
}
#[derive(Clone, Debug, Derivative)]
#[derivative(Default)]
struct OscillatorEphemerals {
    // Remembering where we are in the current cycle, rather than deriving it
    // from elapsed time, keeps the waveform continuous while the frequency
    // sweeps. Kahan summation keeps the position from drifting.
    cycle_position: KahanSum<f64>,

    delta: f64,
    delta_updated: bool,

    #[derivative(Default(value = "true"))]
    reset_pending: bool,

    sample_rate: SampleRate,
}
impl Generates<Sample> for Oscillator {
    fn generate(&mut self, values: &mut [Sample]) -> bool {
        for value in values {
            let cycle_position = self.calculate_cycle_position();
            self.e.reset_pending = false;
            *value = Sample(Self::amplitude_for_position(self.waveform, cycle_position));
        }
        !matches!(self.waveform, Waveform::None)
    }
}
impl Configurable for Oscillator {
    fn sample_rate(&self) -> SampleRate {
        self.e.sample_rate
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.e.sample_rate = sample_rate;
        self.e.delta_updated = false;
        self.reset();
    }

    fn reset(&mut self) {
        self.e.reset_pending = true;
    }
}
impl Oscillator {
    /// Creates an oscillator that's ready to run at the given sample rate.
    pub fn new_with(waveform: Waveform, frequency: FrequencyHz, sample_rate: SampleRate) -> Self {
        let mut r = Self {
            waveform,
            frequency,
            ..Default::default()
        };
        r.update_sample_rate(sample_rate);
        r
    }

    /// Changes the frequency. The cycle position carries over, so the change
    /// is glitch-free and can happen every frame.
    pub fn set_frequency(&mut self, frequency: FrequencyHz) {
        if frequency != self.frequency {
            self.frequency = frequency;
            self.e.delta_updated = false;
        }
    }

    #[allow(missing_docs)]
    pub fn frequency(&self) -> FrequencyHz {
        self.frequency
    }

    #[allow(missing_docs)]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[allow(missing_docs)]
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    fn update_delta(&mut self) {
        if !self.e.delta_updated {
            self.e.delta = self.frequency.0 / self.e.sample_rate.0 as f64;

            // This resets the accumulated error.
            self.e.cycle_position = KahanSum::new_with_value(self.e.cycle_position.sum());

            self.e.delta_updated = true;
        }
    }

    fn calculate_cycle_position(&mut self) -> f64 {
        self.update_delta();

        if self.e.reset_pending {
            self.e.cycle_position = Default::default();
            return 0.0;
        }
        self.e.cycle_position += self.e.delta;
        if self.e.cycle_position.sum() > 0.999999999999 {
            self.e.cycle_position += -(self.e.cycle_position.sum().floor().max(1.0));
        }
        self.e.cycle_position.sum()
    }

    // https://en.wikipedia.org/wiki/Sine_wave
    // https://en.wikipedia.org/wiki/Square_wave
    // https://en.wikipedia.org/wiki/Triangle_wave
    // https://en.wikipedia.org/wiki/Sawtooth_wave
    fn amplitude_for_position(waveform: Waveform, cycle_position: f64) -> f64 {
        match waveform {
            Waveform::None => 0.0,
            Waveform::Sine => (cycle_position * 2.0 * PI).sin(),
            Waveform::Square => -(cycle_position - 0.5).signum(),
            Waveform::Triangle => {
                4.0 * (cycle_position - (0.5 + cycle_position).floor()).abs() - 1.0
            }
            Waveform::Sawtooth => 2.0 * (cycle_position - (0.5 + cycle_position).floor()),
        }
    }
}

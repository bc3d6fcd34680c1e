// Copyright (c) 2024 Mike Tsao

use crate::{
    error::{DroneError, Result},
    traits::Automatable,
    types::{ParameterType, Seconds},
};
use serde::{Deserialize, Serialize};

/// How a parameter arrives at an [AutomationPoint] from the point before it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Curve {
    /// Holds the previous value, then jumps at the point's time.
    #[default]
    Instant,
    /// Moves in a straight line.
    Linear,
    /// Moves by a constant ratio per unit of time.
    Exponential,
}

/// One time-stamped target in a [ParamTimeline].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AutomationPoint {
    /// When the parameter reaches `value`.
    pub when: Seconds,
    /// The value at `when`.
    pub value: ParameterType,
    /// How the parameter gets there.
    pub curve: Curve,
}
impl AutomationPoint {
    #[allow(missing_docs)]
    pub fn new(when: Seconds, value: ParameterType, curve: Curve) -> Self {
        Self { when, value, curve }
    }
}

/// A parameter value that follows an ordered list of [AutomationPoint]s on the
/// audio clock.
///
/// Before the first point, the timeline reports its default value. After the
/// last point, it holds the last point's value. In between, each point's
/// [Curve] decides how the value travels from the previous point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParamTimeline {
    default_value: ParameterType,
    points: Vec<AutomationPoint>,
}
impl ParamTimeline {
    /// Creates an empty timeline that reports `default_value` until it's
    /// automated.
    pub fn new_with(default_value: ParameterType) -> Self {
        Self {
            default_value,
            points: Default::default(),
        }
    }

    /// The value reported before any point takes effect.
    pub fn default_value(&self) -> ParameterType {
        self.default_value
    }

    /// The scheduled points, in time order.
    pub fn points(&self) -> &[AutomationPoint] {
        &self.points
    }

    /// The parameter's value at the given time.
    pub fn value_at(&self, when: Seconds) -> ParameterType {
        let index = self.points.partition_point(|p| p.when <= when);
        let Some(next) = self.points.get(index) else {
            return self
                .points
                .last()
                .map_or(self.default_value, |p| p.value);
        };
        let (start_when, start_value) = if index == 0 {
            (Seconds::zero(), self.default_value)
        } else {
            let previous = &self.points[index - 1];
            (previous.when, previous.value)
        };
        match next.curve {
            Curve::Instant => start_value,
            Curve::Linear | Curve::Exponential if when < start_when => start_value,
            Curve::Linear => {
                let fraction = Self::fraction(start_when, next.when, when);
                start_value + (next.value - start_value) * fraction
            }
            Curve::Exponential => {
                if start_value * next.value <= 0.0 {
                    return start_value;
                }
                let fraction = Self::fraction(start_when, next.when, when);
                start_value * (next.value / start_value).powf(fraction)
            }
        }
    }

    fn fraction(start: Seconds, end: Seconds, when: Seconds) -> f64 {
        let span = (end - start).0;
        if span <= 0.0 {
            1.0
        } else {
            ((when - start).0 / span).clamp(0.0, 1.0)
        }
    }

    fn validate(value: ParameterType, when: Seconds) -> Result<()> {
        if !value.is_finite() {
            return Err(DroneError::InvalidAutomation {
                value,
                when,
                reason: "value must be finite",
            });
        }
        if !when.is_valid() {
            return Err(DroneError::InvalidAutomation {
                value,
                when,
                reason: "time must be finite and non-negative",
            });
        }
        Ok(())
    }

    // Equal-time points keep their insertion order. An instant set
    // immediately following another instant set at the same time replaces it.
    fn insert(&mut self, point: AutomationPoint) {
        let index = self.points.partition_point(|p| p.when <= point.when);
        if point.curve == Curve::Instant && index > 0 {
            let previous = &mut self.points[index - 1];
            if previous.when == point.when && previous.curve == Curve::Instant {
                *previous = point;
                return;
            }
        }
        self.points.insert(index, point);
    }
}
impl Automatable for ParamTimeline {
    fn set_value_at(&mut self, value: ParameterType, when: Seconds) -> Result<()> {
        Self::validate(value, when)?;
        self.insert(AutomationPoint::new(when, value, Curve::Instant));
        Ok(())
    }

    fn ramp_linear_to(&mut self, value: ParameterType, when: Seconds) -> Result<()> {
        Self::validate(value, when)?;
        self.insert(AutomationPoint::new(when, value, Curve::Linear));
        Ok(())
    }

    fn ramp_exponential_to(&mut self, value: ParameterType, when: Seconds) -> Result<()> {
        Self::validate(value, when)?;
        if value == 0.0 {
            return Err(DroneError::InvalidAutomation {
                value,
                when,
                reason: "exponential ramps can't reach zero",
            });
        }
        self.insert(AutomationPoint::new(when, value, Curve::Exponential));
        Ok(())
    }

    // Points before `when` have already been heard, so they collapse into a
    // single anchor that holds the value audible at `when`.
    fn cancel_after(&mut self, when: Seconds) {
        let held = self.value_at(when);
        self.points.clear();
        if held.is_finite() && when.is_valid() {
            self.points
                .push(AutomationPoint::new(when, held, Curve::Instant));
        }
    }
}

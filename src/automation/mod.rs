// Copyright (c) 2024 Mike Tsao

//! Support for changing parameters over time on the audio clock.
//!
//! A [ParamTimeline] holds a list of time-stamped [AutomationPoint]s. Each point
//! says what value the parameter should have at a moment in time, and which
//! [Curve] it should follow to get there from the previous point. Once points
//! are scheduled, the timeline answers [ParamTimeline::value_at()] for any
//! moment without further intervention, which is what lets a voice sweep and
//! fade for many seconds after it's been armed.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{AutomationPoint, Curve, ParamTimeline};
}

pub use timeline::{AutomationPoint, Curve, ParamTimeline};

mod timeline;

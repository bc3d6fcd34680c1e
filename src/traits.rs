// Copyright (c) 2024 Mike Tsao

//! The traits that define the seams between the drone and the things it drives:
//! the tone backend that makes sound, the parameters it automates, and the host
//! facility that calls it back periodically.

use crate::{
    elements::Waveform,
    error::Result,
    types::{NodeUid, ParameterType, SampleRate, Seconds, TickHandle},
};
use serde::{Deserialize, Serialize};

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{
        Automatable, Configurable, Generates, HasSettings, SchedulesTicks, ToneBackend,
        VoiceNodes,
    };
}

/// A parameter whose value follows a schedule of time-stamped points on the
/// audio clock. Once a point is scheduled, it takes effect in real time without
/// further intervention.
pub trait Automatable {
    /// Jumps to `value` at `when`.
    fn set_value_at(&mut self, value: ParameterType, when: Seconds) -> Result<()>;

    /// Moves in a straight line from the previous point, arriving at `value`
    /// at `when`.
    fn ramp_linear_to(&mut self, value: ParameterType, when: Seconds) -> Result<()>;

    /// Moves along an exponential curve from the previous point, arriving at
    /// `value` at `when`. `value` can't be zero.
    fn ramp_exponential_to(&mut self, value: ParameterType, when: Seconds) -> Result<()>;

    /// Discards every point scheduled at or after `when`, leaving the value
    /// that is audible at `when` in place.
    fn cancel_after(&mut self, when: Seconds);
}

/// The handles of one voice: a generator and the amplitude controller that it
/// feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VoiceNodes {
    /// The oscillating signal source.
    pub generator: NodeUid,
    /// The gain stage that follows the generator.
    pub controller: NodeUid,
}

/// A source of tone generators, gain stages, and the routing between them.
///
/// Implementations own the nodes; callers hold [NodeUid] handles. Every node
/// produces silence until it is connected, directly or through other nodes, to
/// [ToneBackend::destination()].
pub trait ToneBackend {
    /// The automatable parameter type that generators and controllers expose.
    type Param: Automatable;

    /// The current time on the backend's monotonic audio clock.
    fn now(&self) -> Seconds;

    /// The final sink. Anything reaching it is heard.
    fn destination(&self) -> NodeUid;

    /// Creates a node that sums its inputs.
    fn create_bus(&mut self) -> Result<NodeUid>;

    /// Creates an unconnected generator and amplitude controller.
    fn create_voice(&mut self) -> Result<VoiceNodes>;

    /// Routes the output of `source` into `sink`.
    fn connect(&mut self, source: NodeUid, sink: NodeUid) -> Result<()>;

    /// Destroys a node along with every connection touching it.
    fn release(&mut self, node: NodeUid) -> Result<()>;

    /// Chooses the generator's waveform.
    fn set_waveform(&mut self, generator: NodeUid, waveform: Waveform) -> Result<()>;

    /// Starts the generator. It runs until deactivated.
    fn activate(&mut self, generator: NodeUid) -> Result<()>;

    /// Stops the generator for good. Stopping a stopped generator does nothing.
    fn deactivate(&mut self, generator: NodeUid) -> Result<()>;

    /// The frequency parameter (in Hertz) of a running or not-yet-started
    /// generator.
    fn frequency_mut(&mut self, generator: NodeUid) -> Result<&mut Self::Param>;

    /// The gain parameter of an amplitude controller.
    fn gain_mut(&mut self, controller: NodeUid) -> Result<&mut Self::Param>;
}

/// A host facility that invokes a callback at a fixed interval.
///
/// Each firing is delivered by the host as a [TickHandle], which it forwards
/// to whatever subscribed (see
/// [HarmonicScheduler::handle_tick()](crate::drone::HarmonicScheduler::handle_tick)).
/// Firings for one subscription never overlap.
pub trait SchedulesTicks {
    /// Begins firing every `interval`, starting one interval from now.
    fn schedule_repeating(&mut self, interval: Seconds) -> TickHandle;

    /// Stops a subscription. Cancelling an unknown handle does nothing.
    fn cancel(&mut self, handle: TickHandle);
}

/// Something that produces a signal, one value per frame.
pub trait Generates<V>: Configurable {
    /// Fills the slice with the next values. Returns whether any of them were
    /// non-silent.
    fn generate(&mut self, values: &mut [V]) -> bool;
}

/// Something that needs to know the audio configuration.
pub trait Configurable {
    /// The current sample rate.
    fn sample_rate(&self) -> SampleRate;

    /// Changes the sample rate.
    fn update_sample_rate(&mut self, sample_rate: SampleRate);

    /// Returns to the state just after construction.
    fn reset(&mut self) {}
}

/// A settings struct that knows whether it has unsaved changes. Composed
/// settings structs ask their parts.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}

// Copyright (c) 2024 Mike Tsao

//! The generative drone.
//!
//! A [HarmonicScheduler] owns a [VoicePool] of `slot_count` voices. While it
//! runs, a periodic tick arms one voice at a time, round-robin, with a
//! [VoiceProgram]: a long exponential frequency sweep under a fade-in,
//! plateau, fade-out gain envelope. Ticks arrive every `duration /
//! slot_count`, so by the time a voice's envelope returns to silence, every
//! other voice has been armed once, and the layers overlap at different
//! points in their sweeps.
//!
//! The numbers come from a [DroneProfile]. [Performance] bundles a scheduler
//! with an in-process backend and ticker for offline rendering.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        DroneProfile, DroneProfileBuilder, HarmonicScheduler, ManualTicker, Performance,
        SchedulerState, VoicePool, VoiceProgram,
    };
}

pub use performance::Performance;
pub use pool::{VoicePool, VoiceSlot};
pub use profile::{DroneProfile, DroneProfileBuilder, DroneProfileBuilderError};
pub use program::VoiceProgram;
pub use scheduler::{HarmonicScheduler, SchedulerState};
pub use ticker::ManualTicker;

mod performance;
mod pool;
mod profile;
mod program;
mod scheduler;
mod ticker;

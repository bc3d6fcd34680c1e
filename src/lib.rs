// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Harmonic Drone makes a slowly evolving drone out of a handful of voices.
//!
//! Each voice sweeps exponentially from a low frequency to a high one while
//! fading in, holding, and fading out. A [HarmonicScheduler] rearms one voice
//! at a time on a fixed cadence, so several voices always overlap at
//! different points in their sweeps.
//!
//! There are a few ways to use it, depending on how much control you need.
//!
//! * *Easiest*: Create a [Performance] from a [DroneProfile], start it, and
//! pull [StereoSample](types::StereoSample)s from
//! [Performance::render()]. With the `hound` feature,
//! [PerformanceExporter](util::PerformanceExporter) writes them to a WAV file.
//! * *Your own clock*: Drive a [HarmonicScheduler] with any
//! [SchedulesTicks](traits::SchedulesTicks) facility, forwarding each firing
//! to [HarmonicScheduler::handle_tick()].
//! * *Your own sound*: Implement [ToneBackend](traits::ToneBackend) for another
//! synthesis engine and hand it to the scheduler.

/// A collection of imports that are useful to users of this crate. `use
/// harmonic_drone::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        automation::prelude::*, backend::prelude::*, drone::prelude::*, elements::prelude::*,
        error::DroneError,
        traits::prelude::*,
        types::prelude::*,
        util::prelude::*,
    };
}

// Fundamental structures that are important enough to re-export at top level.
pub use {
    drone::{DroneProfile, HarmonicScheduler, Performance},
    error::DroneError,
};

pub mod automation;
pub mod backend;
pub mod drone;
pub mod elements;
pub mod error;
pub mod traits;
pub mod types;
pub mod util;

// Copyright (c) 2024 Mike Tsao

//! Wrappers around third-party crates and OS facilities that make them easier
//! to use with crossbeam channels.

#![deny(missing_docs)]

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        CrossbeamChannel, ProvidesService, TimerService, TimerServiceEvent, TimerServiceInput,
    };
    #[cfg(feature = "audio")]
    pub use super::{CpalAudioService, CpalAudioServiceEvent, CpalAudioServiceInput};
}

#[cfg(feature = "audio")]
pub use audio::{
    AudioSampleType, AudioStereoSampleType, CpalAudioService, CpalAudioServiceEvent,
    CpalAudioServiceInput,
};
pub use timer::{TimerService, TimerServiceEvent, TimerServiceInput};
pub use traits::ProvidesService;
pub use types::CrossbeamChannel;

#[cfg(feature = "audio")]
mod audio;
mod timer;
mod traits;
mod types;

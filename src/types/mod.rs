// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        FrequencyHz, IsUid, NodeUid, Normal, ParameterType, Sample, SampleRate, SampleType,
        Seconds, StereoSample, TickHandle, UidFactory,
    };
}

pub use {
    numbers::{FrequencyHz, ParameterType, Sample, SampleType, StereoSample},
    ranges::{Normal, RangedF64},
    time::{SampleRate, Seconds},
    uid::{IsUid, NodeUid, TickHandle, UidFactory},
};

mod numbers;
mod ranges;
mod time;
mod uid;

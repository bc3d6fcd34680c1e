// Copyright (c) 2024 Mike Tsao

//! Tone backends: the things that actually make sound when the drone asks.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{GeneratorState, SoftwareBackend};
}

pub use software::{GeneratorState, SoftwareBackend};

mod software;

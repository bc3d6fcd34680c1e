// Copyright (c) 2024 Mike Tsao

//! Building blocks for tone backends.

/// The most commonly used imports.
pub mod prelude {
    pub use super::generators::{Oscillator, Waveform};
}

pub use generators::{Oscillator, Waveform};

mod generators;

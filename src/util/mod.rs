// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::settings::{AudioSettings, DroneSettings};
    #[cfg(all(feature = "std", feature = "hound"))]
    pub use super::wav::PerformanceExporter;
}

pub use settings::{AudioSettings, DroneSettings};
#[cfg(all(feature = "std", feature = "hound"))]
pub use wav::PerformanceExporter;

mod settings;
#[cfg(all(feature = "std", feature = "hound"))]
mod wav;

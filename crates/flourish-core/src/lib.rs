//! Core types shared by the flourish crates.
//!
//! This crate holds the pieces every effect builds on: the virtual-time
//! [`Scheduler`], the [`StopHandle`], the [`Surface`] effects draw onto, and
//! the settings records with their stock values.

mod scheduler;
mod settings;
mod stop;
mod surface;

pub use scheduler::{Millis, Scheduler};
pub use settings::{
    AmbientSettings, DEFAULT_WORDS, PageSettings, ParticleSettings, SampleRange, TypewriterTiming,
};
pub use stop::StopHandle;
pub use surface::{ElementState, MemorySurface, ParticleId, ParticleStyle, Surface};

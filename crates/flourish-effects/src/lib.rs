//! Decorative page effects driven by virtual-time timers.
//!
//! Three independent effects share nothing but the [`Surface`] they draw on:
//! a word-cycling typewriter, a bounded particle pool and ambient hue drift
//! with pointer parallax. [`Page`] starts whichever of them the surface
//! supports and raises the loaded flag once startup has settled.
//!
//! [`Surface`]: flourish_core::Surface

mod ambient;
mod error;
mod page;
mod particles;
mod shuffle;
mod typewriter;

pub use ambient::{AmbientEffectsDriver, PointerState, validate_ambient};
pub use error::EffectsError;
pub use page::{Page, PageSetup};
pub use particles::{ParticleManager, ParticlePool, sample_style, validate_particles};
pub use shuffle::fisher_yates;
pub use typewriter::{Phase, WordCycler, WordList, validate_timing};

//! Errors raised while building effects.

use thiserror::Error;

/// Reasons an effect cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectsError {
    /// The typewriter needs at least one word to cycle.
    #[error("word list is empty")]
    EmptyWordList,
    /// A particle pool that can hold nothing.
    #[error("particle capacity must be at least 1")]
    ZeroCapacity,
    /// A sampling range that is empty, inverted or not finite.
    #[error("particle {field} range is invalid")]
    InvalidRange { field: &'static str },
    /// A repeating timer with a zero interval would never let time advance.
    #[error("{field} interval must be greater than zero")]
    ZeroInterval { field: &'static str },
    /// Typewriter timings under which a pass through the words takes no time.
    #[error("typewriter timing lets a whole pass through the word list take no time")]
    InstantCycle,
}

//! Word-cycling typewriter effect.
//!
//! Types a word one character at a time, holds it, erases it, pauses, then
//! moves on to the next word of a shuffled working list. The list is
//! reshuffled every time the cycle wraps back to its first word.

use flourish_core::{Millis, Scheduler, StopHandle, Surface, TypewriterTiming};
use tracing::debug;

use crate::error::EffectsError;
use crate::shuffle::fisher_yates;

/// Check that a pass through the word list always lets time pass.
///
/// A word of `n` characters takes `n - 1` typing and `n - 1` erasing
/// intervals plus both pauses. If every word of the list takes no time, a
/// host advancing the cycler would never get control back.
pub fn validate_timing(timing: &TypewriterTiming, words: &WordList) -> Result<(), EffectsError> {
    let pauses = timing.pre_pause_ms.saturating_add(timing.word_pause_ms);
    let per_char = timing.typing_speed_ms.saturating_add(timing.erasing_speed_ms);
    let pass_takes_time = words.as_slice().iter().any(|word| {
        let steps = word.chars().count().saturating_sub(1) as Millis;
        pauses.saturating_add(steps.saturating_mul(per_char)) > 0
    });
    if !pass_takes_time {
        return Err(EffectsError::InstantCycle);
    }
    Ok(())
}

/// Validated, immutable source list of words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Build a word list, rejecting an empty one.
    pub fn new<I, S>(words: I) -> Result<Self, EffectsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(EffectsError::EmptyWordList);
        }
        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    /// A freshly shuffled copy of the list.
    pub fn shuffled(&self, rng: &mut fastrand::Rng) -> Vec<String> {
        let mut working = self.words.clone();
        fisher_yates(&mut working, rng);
        working
    }
}

/// Where the cycler is within the current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Revealing one character per tick.
    Typing,
    /// Full word shown, waiting to erase.
    PausedFull,
    /// Removing one trailing character per tick.
    Erasing,
    /// Nothing shown, waiting to type the next word.
    PausedEmpty,
}

/// The only timer the cycler uses: "do the next step".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tick;

/// Typewriter state machine bound to one text element.
#[derive(Debug)]
pub struct WordCycler {
    source: WordList,
    working: Vec<String>,
    timing: TypewriterTiming,
    target: String,
    glow_class: String,
    current_index: usize,
    char_count: usize,
    phase: Phase,
    passes: u64,
    started: bool,
    scheduler: Scheduler<Tick>,
    rng: fastrand::Rng,
    stop: StopHandle,
}

impl WordCycler {
    /// Create a cycler writing into the element `target`.
    ///
    /// The working list is shuffled immediately; nothing is written until
    /// [`start`](Self::start) has been called and the initial delay elapsed.
    /// Fails when a pass through `words` would take no time at all.
    pub fn new(
        words: WordList,
        timing: TypewriterTiming,
        target: impl Into<String>,
        glow_class: impl Into<String>,
        mut rng: fastrand::Rng,
    ) -> Result<Self, EffectsError> {
        validate_timing(&timing, &words)?;
        let working = words.shuffled(&mut rng);
        Ok(Self {
            source: words,
            working,
            timing,
            target: target.into(),
            glow_class: glow_class.into(),
            current_index: 0,
            char_count: 0,
            phase: Phase::Typing,
            passes: 0,
            started: false,
            scheduler: Scheduler::new(),
            rng,
            stop: StopHandle::new(),
        })
    }

    /// Share an existing stop handle instead of the cycler's own.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Schedule the first tick `initial_delay_ms` after `now`.
    ///
    /// Calling this more than once has no effect.
    pub fn start(&mut self, now: Millis) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduler = Scheduler::starting_at(now);
        self.scheduler.schedule_in(self.timing.initial_delay_ms, Tick);
        debug!(
            element = %self.target,
            words = self.working.len(),
            "typewriter scheduled"
        );
    }

    /// Run every tick that is due at or before `now`.
    pub fn advance<S: Surface + ?Sized>(&mut self, now: Millis, surface: &mut S) {
        if self.stop.is_stopped() {
            self.scheduler.clear();
            return;
        }
        while let Some(Tick) = self.scheduler.pop_due(now) {
            self.step(surface);
            if self.stop.is_stopped() {
                self.scheduler.clear();
                return;
            }
        }
        self.scheduler.settle(now);
    }

    fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        match self.phase {
            Phase::Typing => self.type_char(surface),
            Phase::PausedFull => {
                self.phase = Phase::Erasing;
                self.erase_char(surface);
            }
            Phase::Erasing => self.erase_char(surface),
            Phase::PausedEmpty => {
                self.phase = Phase::Typing;
                self.type_char(surface);
            }
        }
    }

    fn type_char<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        let len = self.current_word_len();
        if self.char_count < len {
            self.char_count += 1;
            self.write_visible(surface);
            surface.set_class(&self.target, &self.glow_class, true);
        }
        if self.char_count >= len {
            self.phase = Phase::PausedFull;
            self.scheduler.schedule_in(self.timing.pre_pause_ms, Tick);
        } else {
            self.scheduler.schedule_in(self.timing.typing_speed_ms, Tick);
        }
    }

    fn erase_char<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.char_count > 0 {
            self.char_count -= 1;
            self.write_visible(surface);
        }
        if self.char_count == 0 {
            surface.set_class(&self.target, &self.glow_class, false);
            self.next_word();
            self.phase = Phase::PausedEmpty;
            self.scheduler.schedule_in(self.timing.word_pause_ms, Tick);
        } else {
            self.scheduler.schedule_in(self.timing.erasing_speed_ms, Tick);
        }
    }

    fn next_word(&mut self) {
        self.current_index = (self.current_index + 1) % self.working.len();
        if self.current_index == 0 {
            self.working = self.source.shuffled(&mut self.rng);
            self.passes += 1;
            debug!(passes = self.passes, "typewriter reshuffled word list");
        }
    }

    fn write_visible<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.set_text(&self.target, self.visible_text());
    }

    fn current_word_len(&self) -> usize {
        self.current_word().chars().count()
    }

    /// The word currently being typed or erased.
    pub fn current_word(&self) -> &str {
        &self.working[self.current_index]
    }

    /// The prefix of the current word that is visible right now.
    pub fn visible_text(&self) -> &str {
        let word = self.current_word();
        let end = word
            .char_indices()
            .nth(self.char_count)
            .map_or(word.len(), |(idx, _)| idx);
        &word[..end]
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Visible characters of the current word.
    pub fn char_count(&self) -> usize {
        self.char_count
    }

    /// The shuffled order used for the current pass.
    pub fn working_list(&self) -> &[String] {
        &self.working
    }

    pub fn source(&self) -> &WordList {
        &self.source
    }

    /// Completed passes through the whole list.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Due time of the next tick, if one is pending.
    pub fn next_due(&self) -> Option<Millis> {
        self.scheduler.next_due()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

//! Tunable parameters for each effect, with the page's stock values.

use serde::{Deserialize, Serialize};

use crate::scheduler::Millis;

/// Titles cycled by the typewriter when no list is configured.
pub const DEFAULT_WORDS: &[&str] = &[
    "Developer",
    "Engineer",
    "Scientist",
    "Physicist",
    "Mathematician",
    "Economist",
    "Doctor",
    "Lawyer",
    "Psychologist",
    "Biologist",
    "Philosopher",
    "Clown",
    "Chihuahua Daddy",
];

/// Typewriter timing, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterTiming {
    /// Gap between revealed characters.
    pub typing_speed_ms: Millis,
    /// Gap between erased characters.
    pub erasing_speed_ms: Millis,
    /// Blank pause before the next word starts typing.
    pub word_pause_ms: Millis,
    /// Pause with the full word shown before erasing.
    pub pre_pause_ms: Millis,
    /// Wait after startup before the first word, so page load settles.
    pub initial_delay_ms: Millis,
}

impl Default for TypewriterTiming {
    fn default() -> Self {
        Self {
            typing_speed_ms: 80,
            erasing_speed_ms: 30,
            word_pause_ms: 500,
            pre_pause_ms: 2000,
            initial_delay_ms: 2500,
        }
    }
}

/// Half-open sampling range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether the range is non-empty and finite.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min < self.max
    }

    /// Whether `value` lies in `[min, max)`.
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }

    /// Map a unit sample in `[0, 1)` into this range.
    ///
    /// Clamped below `max` so float rounding cannot land on the open end.
    pub fn lerp(&self, unit: f32) -> f32 {
        let value = self.min + (self.max - self.min) * unit;
        if value >= self.max {
            float_below(self.max).max(self.min)
        } else {
            value.max(self.min)
        }
    }
}

/// Largest float strictly below a finite `x`.
fn float_below(x: f32) -> f32 {
    if x == 0.0 {
        -f32::from_bits(1)
    } else if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else {
        f32::from_bits(x.to_bits() + 1)
    }
}

/// Particle pool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    /// Maximum number of live particles.
    pub capacity: usize,
    /// Gap between the staggered spawns of the initial fill.
    pub stagger_ms: Millis,
    /// Interval of the replenish timer.
    pub replenish_ms: Millis,
    /// Size in pixels.
    pub size: SampleRange,
    /// Horizontal position in percent.
    pub left_percent: SampleRange,
    /// Drift duration in seconds.
    pub duration_secs: SampleRange,
    /// Delay before drifting, in seconds.
    pub delay_secs: SampleRange,
    pub opacity: SampleRange,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            capacity: 50,
            stagger_ms: 100,
            replenish_ms: 300,
            size: SampleRange::new(1.0, 4.0),
            left_percent: SampleRange::new(0.0, 100.0),
            duration_secs: SampleRange::new(8.0, 15.0),
            delay_secs: SampleRange::new(0.0, 5.0),
            opacity: SampleRange::new(0.1, 0.4),
        }
    }
}

/// Hue drift and pointer parallax parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientSettings {
    /// Starting value of the hue accumulator.
    pub hue_start: f32,
    /// Added to the accumulator on every drift tick, modulo 360.
    pub hue_step: f32,
    /// Interval of the drift timer.
    pub hue_interval_ms: Millis,
    /// Factor applied to the accumulator before it reaches the filter.
    pub hue_scale: f32,
    /// Per-frame interpolation factor toward the raw pointer.
    pub smoothing: f32,
    /// Displacement factor per floating-element depth layer.
    pub parallax_step: f32,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            hue_start: 200.0,
            hue_step: 0.5,
            hue_interval_ms: 100,
            hue_scale: 0.1,
            smoothing: 0.1,
            parallax_step: 0.01,
        }
    }
}

/// Element lookup and page-level flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Id of the element the typewriter writes into.
    pub text_target: String,
    /// Id of the element particles are attached under.
    pub particle_container: String,
    /// Selector of the parallax layers.
    pub floating_selector: String,
    /// Class set on the text target while a word is shown.
    pub glow_class: String,
    /// Class set on the page root once loading has settled.
    pub loaded_class: String,
    /// Delay after startup before the loaded class is set.
    pub loaded_delay_ms: Millis,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            text_target: "typewriter".to_string(),
            particle_container: "particles".to_string(),
            floating_selector: "floating-element".to_string(),
            glow_class: "glow".to_string(),
            loaded_class: "loaded".to_string(),
            loaded_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_range_lerp_stays_half_open() {
        let range = SampleRange::new(1.0, 4.0);
        assert_eq!(range.lerp(0.0), 1.0);
        assert!((range.lerp(0.5) - 2.5).abs() < 1e-6);
        assert!(range.contains(range.lerp(0.999_999_9)));
        assert!(range.contains(range.lerp(1.0)));
    }

    #[test]
    fn test_sample_range_validity() {
        assert!(SampleRange::new(0.0, 1.0).is_valid());
        assert!(!SampleRange::new(1.0, 1.0).is_valid());
        assert!(!SampleRange::new(2.0, 1.0).is_valid());
        assert!(!SampleRange::new(0.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_defaults_match_page() {
        let timing = TypewriterTiming::default();
        assert_eq!(timing.typing_speed_ms, 80);
        assert_eq!(timing.pre_pause_ms, 2000);
        assert_eq!(ParticleSettings::default().capacity, 50);
        assert_eq!(AmbientSettings::default().hue_start, 200.0);
        assert_eq!(PageSettings::default().loaded_delay_ms, 1000);
        assert_eq!(DEFAULT_WORDS.len(), 13);
    }
}

//! The page abstraction effects draw onto.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::scheduler::Millis;

/// Identifier of a particle node, unique for the lifetime of its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticleId(pub u64);

/// Visual parameters of a particle node.
///
/// Sampled once when the particle is created and never changed afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleStyle {
    /// Edge length in pixels (cells on a terminal).
    pub size: f32,
    /// Horizontal position as a percentage of the container width.
    pub left_percent: f32,
    /// Length of the drift animation in seconds.
    pub duration_secs: f32,
    /// Delay before the drift animation starts, in seconds.
    pub delay_secs: f32,
    /// Opacity (0.0 - 1.0).
    pub opacity: f32,
    /// Page time at which the particle was attached.
    pub spawned_at: Millis,
}

impl ParticleStyle {
    /// Total time the node stays attached, in milliseconds.
    pub fn lifetime_ms(&self) -> Millis {
        ((self.duration_secs + self.delay_secs) * 1000.0).round() as Millis
    }

    /// Animation progress (0.0 - 1.0) at page time `now`.
    ///
    /// Zero until the delay has elapsed, then linear over the duration.
    pub fn progress_at(&self, now: Millis) -> f32 {
        let age_secs = now.saturating_sub(self.spawned_at) as f32 / 1000.0;
        let running = age_secs - self.delay_secs;
        if running <= 0.0 || self.duration_secs <= 0.0 {
            return 0.0;
        }
        (running / self.duration_secs).min(1.0)
    }
}

/// Everything an effect is allowed to read from or write to the page.
///
/// Elements are looked up by stable id; floating elements by selector and
/// index.
pub trait Surface {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Replace the text content of an element.
    fn set_text(&mut self, id: &str, text: &str);

    /// Add or remove a boolean class on an element.
    fn set_class(&mut self, id: &str, class: &str, on: bool);

    /// Attach a particle node under a container.
    fn append_particle(&mut self, container: &str, id: ParticleId, style: &ParticleStyle);

    /// Detach a particle node. Removing an unknown node is a no-op.
    fn remove_particle(&mut self, container: &str, id: ParticleId);

    /// Apply a hue rotation filter to the whole page, in degrees.
    fn set_hue_rotation(&mut self, degrees: f32);

    /// Add or remove a boolean class on the page root.
    fn set_root_class(&mut self, class: &str, on: bool);

    /// Number of elements matching a floating-element selector.
    fn floating_count(&self, selector: &str) -> usize;

    /// Translate the `index`-th element matching `selector`.
    fn set_translation(&mut self, selector: &str, index: usize, dx: f32, dy: f32);

    /// Viewport width and height.
    fn viewport(&self) -> (f32, f32);
}

/// State recorded for a single element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementState {
    pub text: String,
    pub classes: BTreeSet<String>,
}

/// In-memory surface that records every write.
///
/// Used by tests and by headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    elements: HashMap<String, ElementState>,
    text_history: HashMap<String, Vec<String>>,
    skip_history: bool,
    cleared: HashMap<String, usize>,
    particles: HashMap<String, BTreeMap<ParticleId, ParticleStyle>>,
    floating: HashMap<String, Vec<(f32, f32)>>,
    root_classes: BTreeSet<String>,
    hue_rotation: Option<f32>,
    viewport: (f32, f32),
    writes: usize,
}

impl MemorySurface {
    /// Create an empty surface with the given viewport size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: (width, height),
            ..Self::default()
        }
    }

    /// Add an element with the given id.
    pub fn with_element(mut self, id: &str) -> Self {
        self.elements.insert(id.to_string(), ElementState::default());
        self
    }

    /// Add `count` floating elements matching `selector`.
    pub fn with_floating(mut self, selector: &str, count: usize) -> Self {
        self.floating
            .insert(selector.to_string(), vec![(0.0, 0.0); count]);
        self
    }

    /// Stop recording text history; long runs only need counters.
    pub fn without_text_history(mut self) -> Self {
        self.skip_history = true;
        self.text_history.clear();
        self
    }

    /// Resize the viewport.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    /// Recorded state of an element.
    pub fn element(&self, id: &str) -> Option<&ElementState> {
        self.elements.get(id)
    }

    /// Current text of an element, empty if it does not exist.
    pub fn text(&self, id: &str) -> &str {
        self.elements.get(id).map_or("", |e| e.text.as_str())
    }

    /// Whether an element currently carries `class`.
    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.elements
            .get(id)
            .is_some_and(|e| e.classes.contains(class))
    }

    /// Every text written to an element, oldest first.
    pub fn text_history(&self, id: &str) -> &[String] {
        self.text_history
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// How many times an element's text went from non-empty to empty.
    pub fn cleared_count(&self, id: &str) -> usize {
        self.cleared.get(id).copied().unwrap_or_default()
    }

    /// Particles currently attached under a container.
    pub fn particles(&self, container: &str) -> impl Iterator<Item = (&ParticleId, &ParticleStyle)> {
        self.particles.get(container).into_iter().flatten()
    }

    /// Number of particles currently attached under a container.
    pub fn particle_count(&self, container: &str) -> usize {
        self.particles.get(container).map_or(0, BTreeMap::len)
    }

    /// Translations applied to the floating elements matching `selector`.
    pub fn translations(&self, selector: &str) -> &[(f32, f32)] {
        self.floating
            .get(selector)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether the page root carries `class`.
    pub fn has_root_class(&self, class: &str) -> bool {
        self.root_classes.contains(class)
    }

    /// Last hue rotation applied, if any.
    pub fn hue_rotation(&self) -> Option<f32> {
        self.hue_rotation
    }

    /// Total number of writes recorded so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Surface for MemorySurface {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if let Some(element) = self.elements.get_mut(id) {
            if text.is_empty() && !element.text.is_empty() {
                *self.cleared.entry(id.to_string()).or_default() += 1;
            }
            element.text = text.to_string();
            if !self.skip_history {
                self.text_history
                    .entry(id.to_string())
                    .or_default()
                    .push(text.to_string());
            }
            self.writes += 1;
        }
    }

    fn set_class(&mut self, id: &str, class: &str, on: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            if on {
                element.classes.insert(class.to_string());
            } else {
                element.classes.remove(class);
            }
            self.writes += 1;
        }
    }

    fn append_particle(&mut self, container: &str, id: ParticleId, style: &ParticleStyle) {
        if self.elements.contains_key(container) {
            self.particles
                .entry(container.to_string())
                .or_default()
                .insert(id, *style);
            self.writes += 1;
        }
    }

    fn remove_particle(&mut self, container: &str, id: ParticleId) {
        if let Some(nodes) = self.particles.get_mut(container) {
            if nodes.remove(&id).is_some() {
                self.writes += 1;
            }
        }
    }

    fn set_hue_rotation(&mut self, degrees: f32) {
        self.hue_rotation = Some(degrees);
        self.writes += 1;
    }

    fn set_root_class(&mut self, class: &str, on: bool) {
        if on {
            self.root_classes.insert(class.to_string());
        } else {
            self.root_classes.remove(class);
        }
        self.writes += 1;
    }

    fn floating_count(&self, selector: &str) -> usize {
        self.floating.get(selector).map_or(0, Vec::len)
    }

    fn set_translation(&mut self, selector: &str, index: usize, dx: f32, dy: f32) {
        if let Some(slot) = self
            .floating
            .get_mut(selector)
            .and_then(|elements| elements.get_mut(index))
        {
            *slot = (dx, dy);
            self.writes += 1;
        }
    }

    fn viewport(&self) -> (f32, f32) {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(spawned_at: Millis) -> ParticleStyle {
        ParticleStyle {
            size: 2.0,
            left_percent: 50.0,
            duration_secs: 10.0,
            delay_secs: 2.0,
            opacity: 0.2,
            spawned_at,
        }
    }

    #[test]
    fn test_lifetime_covers_delay_and_duration() {
        assert_eq!(style(0).lifetime_ms(), 12_000);
    }

    #[test]
    fn test_progress_waits_for_delay() {
        let s = style(1_000);
        assert_eq!(s.progress_at(0), 0.0);
        assert_eq!(s.progress_at(3_000), 0.0);
        assert!((s.progress_at(8_000) - 0.5).abs() < 1e-6);
        assert_eq!(s.progress_at(60_000), 1.0);
    }

    #[test]
    fn test_writes_to_missing_elements_are_ignored() {
        let mut surface = MemorySurface::new(100.0, 100.0);
        surface.set_text("missing", "hello");
        surface.set_class("missing", "glow", true);
        surface.append_particle("missing", ParticleId(1), &style(0));
        assert_eq!(surface.writes(), 0);
        assert_eq!(surface.text("missing"), "");
    }

    #[test]
    fn test_records_text_and_classes() {
        let mut surface = MemorySurface::new(100.0, 100.0).with_element("typewriter");
        surface.set_text("typewriter", "D");
        surface.set_text("typewriter", "De");
        surface.set_class("typewriter", "glow", true);

        assert_eq!(surface.text("typewriter"), "De");
        assert_eq!(surface.text_history("typewriter"), ["D", "De"]);
        assert!(surface.has_class("typewriter", "glow"));

        surface.set_class("typewriter", "glow", false);
        assert!(!surface.has_class("typewriter", "glow"));
    }

    #[test]
    fn test_counts_clears_without_history() {
        let mut surface = MemorySurface::new(100.0, 100.0)
            .with_element("typewriter")
            .without_text_history();
        for _ in 0..3 {
            surface.set_text("typewriter", "a");
            surface.set_text("typewriter", "ab");
            surface.set_text("typewriter", "a");
            surface.set_text("typewriter", "");
        }
        // Clearing an already empty element does not count.
        surface.set_text("typewriter", "");

        assert_eq!(surface.cleared_count("typewriter"), 3);
        assert!(surface.text_history("typewriter").is_empty());
        assert_eq!(surface.writes(), 13);
        assert_eq!(surface.cleared_count("missing"), 0);
    }

    #[test]
    fn test_particles_attach_and_detach() {
        let mut surface = MemorySurface::new(100.0, 100.0).with_element("particles");
        surface.append_particle("particles", ParticleId(7), &style(0));
        assert_eq!(surface.particle_count("particles"), 1);
        surface.remove_particle("particles", ParticleId(7));
        surface.remove_particle("particles", ParticleId(7));
        assert_eq!(surface.particle_count("particles"), 0);
    }

    #[test]
    fn test_translation_out_of_range_is_ignored() {
        let mut surface = MemorySurface::new(100.0, 100.0).with_floating("floating-element", 2);
        surface.set_translation("floating-element", 1, 3.0, 4.0);
        surface.set_translation("floating-element", 5, 3.0, 4.0);
        assert_eq!(surface.translations("floating-element"), [(0.0, 0.0), (3.0, 4.0)]);
    }
}

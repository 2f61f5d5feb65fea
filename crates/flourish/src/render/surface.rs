//! Surface backed by terminal cells.

use std::collections::BTreeMap;

use flourish_core::{PageSettings, ParticleId, ParticleStyle, Surface};

use super::chars::FLOATING_CHARS;

/// A floating glyph and its parallax translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatingLayer {
    /// Resting column as a fraction of the width.
    pub x: f32,
    /// Resting row as a fraction of the height.
    pub y: f32,
    pub glyph: char,
    /// Current translation in cells.
    pub offset: (f32, f32),
}

/// Resting positions of the floating layers.
const LAYER_ANCHORS: [(f32, f32); 5] = [
    (0.15, 0.25),
    (0.82, 0.20),
    (0.25, 0.75),
    (0.70, 0.70),
    (0.50, 0.12),
];

/// Page state as the terminal renderer sees it.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    settings: PageSettings,
    text: String,
    glow: bool,
    particles: BTreeMap<ParticleId, ParticleStyle>,
    layers: Vec<FloatingLayer>,
    hue_rotation: f32,
    loaded: bool,
    width: u16,
    height: u16,
}

impl TerminalSurface {
    /// Create a surface for a terminal of `width` x `height` cells.
    pub fn new(settings: PageSettings, width: u16, height: u16) -> Self {
        let layers = LAYER_ANCHORS
            .iter()
            .zip(FLOATING_CHARS)
            .map(|(&(x, y), &glyph)| FloatingLayer {
                x,
                y,
                glyph,
                offset: (0.0, 0.0),
            })
            .collect();
        Self {
            settings,
            text: String::new(),
            glow: false,
            particles: BTreeMap::new(),
            layers,
            hue_rotation: 0.0,
            loaded: false,
            width,
            height,
        }
    }

    /// Track a terminal resize.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_glowing(&self) -> bool {
        self.glow
    }

    pub fn particles(&self) -> impl Iterator<Item = &ParticleStyle> {
        self.particles.values()
    }

    pub fn layers(&self) -> &[FloatingLayer] {
        &self.layers
    }

    pub fn hue_rotation(&self) -> f32 {
        self.hue_rotation
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl Surface for TerminalSurface {
    fn has_element(&self, id: &str) -> bool {
        id == self.settings.text_target || id == self.settings.particle_container
    }

    fn set_text(&mut self, id: &str, text: &str) {
        if id == self.settings.text_target {
            self.text.clear();
            self.text.push_str(text);
        }
    }

    fn set_class(&mut self, id: &str, class: &str, on: bool) {
        if id == self.settings.text_target && class == self.settings.glow_class {
            self.glow = on;
        }
    }

    fn append_particle(&mut self, container: &str, id: ParticleId, style: &ParticleStyle) {
        if container == self.settings.particle_container {
            self.particles.insert(id, *style);
        }
    }

    fn remove_particle(&mut self, container: &str, id: ParticleId) {
        if container == self.settings.particle_container {
            self.particles.remove(&id);
        }
    }

    fn set_hue_rotation(&mut self, degrees: f32) {
        self.hue_rotation = degrees;
    }

    fn set_root_class(&mut self, class: &str, on: bool) {
        if class == self.settings.loaded_class {
            self.loaded = on;
        }
    }

    fn floating_count(&self, selector: &str) -> usize {
        if selector == self.settings.floating_selector {
            self.layers.len()
        } else {
            0
        }
    }

    fn set_translation(&mut self, selector: &str, index: usize, dx: f32, dy: f32) {
        if selector != self.settings.floating_selector {
            return;
        }
        if let Some(layer) = self.layers.get_mut(index) {
            layer.offset = (dx, dy);
        }
    }

    fn viewport(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

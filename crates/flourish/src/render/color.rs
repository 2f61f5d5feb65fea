//! Color helpers: HSL conversion and the page-wide hue rotation.

use ratatui::style::Color;

/// Hue of the particles before any rotation.
pub const PARTICLE_HUE: f32 = 200.0;

/// Hue of the typewriter text before any rotation.
pub const TEXT_HUE: f32 = 180.0;

/// Hue of the floating layers before any rotation.
pub const FLOATING_HUE: f32 = 260.0;

/// Convert an HSL color, rotated by `rotation` degrees, to RGB.
pub fn rotated(hue: f32, s: f32, l: f32, rotation: f32) -> Color {
    hsl_to_rgb((hue + rotation).rem_euclid(360.0), s, l)
}

/// Convert HSL to RGB color.
///
/// Lives with the renderer: the effects crates only deal in hue degrees and
/// never need terminal colors.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Color::Rgb(v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Color::Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), Color::Rgb(255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), Color::Rgb(0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), Color::Rgb(0, 0, 255));
        assert_eq!(hsl_to_rgb(42.0, 0.0, 0.5), Color::Rgb(127, 127, 127));
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(rotated(350.0, 1.0, 0.5, 10.0), hsl_to_rgb(0.0, 1.0, 0.5));
        assert_eq!(rotated(100.0, 1.0, 0.5, 380.0), hsl_to_rgb(120.0, 1.0, 0.5));
    }
}

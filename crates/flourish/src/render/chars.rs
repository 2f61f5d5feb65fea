//! Glyphs used to draw the page in a terminal.

/// Particle glyphs, smallest to largest.
pub const PARTICLE_CHARS: &[char] = &['·', '•', '✦'];

/// Glyphs of the floating parallax layers, nearest layer first.
pub const FLOATING_CHARS: &[char] = &['◇', '○', '△', '□', '✧'];

/// Cursor drawn after the typewriter text.
pub const CURSOR: char = '▌';

/// Pick the particle glyph for a size in `[1, 4)`.
pub fn particle_char(size: f32) -> char {
    let idx = (size - 1.0).max(0.0) as usize;
    PARTICLE_CHARS[idx.min(PARTICLE_CHARS.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_char_by_size() {
        assert_eq!(particle_char(1.0), '·');
        assert_eq!(particle_char(2.5), '•');
        assert_eq!(particle_char(3.99), '✦');
        assert_eq!(particle_char(12.0), '✦');
        assert_eq!(particle_char(0.2), '·');
    }
}

//! Terminal rendering of the page.

mod chars;
mod color;
mod surface;

use flourish_core::Millis;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

pub use surface::TerminalSurface;

use chars::{CURSOR, particle_char};
use color::{FLOATING_HUE, PARTICLE_HUE, TEXT_HUE, rotated};

/// Text shown before the typewriter target.
const PREFIX: &str = "I am a ";

/// A single cell of the background layer.
type Cell = Option<(char, Color)>;

/// Draw the whole page.
pub fn render(frame: &mut Frame, surface: &TerminalSurface, now: Millis, frozen: bool) {
    let area = frame.area();
    let grid = background_grid(surface, area.width, area.height, now);

    let dim = if surface.is_loaded() {
        Modifier::empty()
    } else {
        Modifier::DIM
    };

    let lines: Vec<Line> = grid
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    Some((ch, color)) => Span::styled(
                        ch.to_string(),
                        Style::new().fg(color).add_modifier(dim),
                    ),
                    None => Span::raw(" "),
                })
                .collect();
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    let chunks = Layout::vertical([
        Constraint::Fill(1),   // Top padding
        Constraint::Length(1), // Typewriter
        Constraint::Fill(1),   // Bottom padding
        Constraint::Length(1), // Help text
    ])
    .split(area);

    frame.render_widget(
        Paragraph::new(typewriter_line(surface, now)).alignment(Alignment::Center),
        chunks[1],
    );

    let accent = rotated(TEXT_HUE, 0.7, 0.6, surface.hue_rotation());
    let freeze_label = if frozen { " frozen" } else { " freeze" };
    let help = Line::from(vec![
        "q".bold().fg(accent),
        " quit  ".dark_gray(),
        "f".bold().fg(accent),
        freeze_label.dark_gray(),
    ])
    .centered();
    frame.render_widget(help, chunks[3]);
}

/// The typewriter text with a blinking cursor.
fn typewriter_line(surface: &TerminalSurface, now: Millis) -> Line<'static> {
    let rotation = surface.hue_rotation();
    let mut style = Style::new().fg(rotated(TEXT_HUE, 0.6, 0.55, rotation));
    if surface.is_glowing() {
        style = style
            .fg(rotated(TEXT_HUE, 0.9, 0.7, rotation))
            .add_modifier(Modifier::BOLD);
    }
    if !surface.is_loaded() {
        style = style.add_modifier(Modifier::DIM);
    }

    let cursor = if (now / 500) % 2 == 0 { CURSOR } else { ' ' };
    Line::from(vec![
        Span::styled(PREFIX, Style::new().fg(Color::Gray)),
        Span::styled(surface.text().to_string(), style),
        Span::styled(cursor.to_string(), style),
    ])
}

/// Particles and floating layers rasterized to cells.
fn background_grid(surface: &TerminalSurface, width: u16, height: u16, now: Millis) -> Vec<Vec<Cell>> {
    let mut grid = vec![vec![None; width as usize]; height as usize];
    if width == 0 || height == 0 {
        return grid;
    }
    let rotation = surface.hue_rotation();
    let (w, h) = (width as f32, height as f32);

    for style in surface.particles() {
        let age_secs = now.saturating_sub(style.spawned_at) as f32 / 1000.0;
        if age_secs < style.delay_secs {
            continue;
        }
        // Drift from the bottom edge to the top over the particle's lifetime.
        let progress = style.progress_at(now);
        let x = (style.left_percent / 100.0 * w) as usize;
        let y = ((1.0 - progress) * (h - 1.0)).round() as usize;
        let color = rotated(PARTICLE_HUE, 0.6, 0.25 + style.opacity, rotation);
        if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = Some((particle_char(style.size), color));
        }
    }

    for (depth, layer) in surface.layers().iter().enumerate() {
        let x = layer.x * w + layer.offset.0;
        let y = layer.y * h + layer.offset.1;
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let lightness = 0.35 + depth as f32 * 0.08;
        let color = rotated(FLOATING_HUE, 0.5, lightness, rotation);
        if let Some(cell) = grid
            .get_mut(y.round() as usize)
            .and_then(|row| row.get_mut(x.round() as usize))
        {
            *cell = Some((layer.glyph, color));
        }
    }

    grid
}

#[cfg(test)]
mod tests {
    use flourish_core::{PageSettings, ParticleId, ParticleStyle, Surface};

    use super::*;

    fn particle(delay_secs: f32) -> ParticleStyle {
        ParticleStyle {
            size: 1.5,
            left_percent: 50.0,
            duration_secs: 10.0,
            delay_secs,
            opacity: 0.3,
            spawned_at: 0,
        }
    }

    fn glyphs(grid: &[Vec<Cell>]) -> Vec<(usize, usize, char)> {
        grid.iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter_map(move |(x, cell)| cell.map(|(ch, _)| (x, y, ch)))
            })
            .collect()
    }

    #[test]
    fn test_particle_hidden_during_delay_then_rises() {
        let mut surface = TerminalSurface::new(PageSettings::default(), 40, 11);
        surface.append_particle("particles", ParticleId(0), &particle(2.0));

        let hidden = background_grid(&surface, 40, 11, 1_000);
        assert!(!glyphs(&hidden).iter().any(|&(_, _, ch)| ch == '·'));

        let start = background_grid(&surface, 40, 11, 2_000);
        assert!(glyphs(&start).contains(&(20, 10, '·')));

        let half = background_grid(&surface, 40, 11, 7_000);
        assert!(glyphs(&half).contains(&(20, 5, '·')));
    }

    #[test]
    fn test_floating_layers_follow_offset() {
        let mut surface = TerminalSurface::new(PageSettings::default(), 100, 20);
        let before = glyphs(&background_grid(&surface, 100, 20, 0));
        assert!(before.contains(&(15, 5, '◇')));

        surface.set_translation("floating-element", 0, 3.0, 1.0);
        let after = glyphs(&background_grid(&surface, 100, 20, 0));
        assert!(after.contains(&(18, 6, '◇')));
    }

    #[test]
    fn test_zero_sized_area() {
        let surface = TerminalSurface::new(PageSettings::default(), 0, 0);
        assert!(background_grid(&surface, 0, 0, 0).is_empty());
    }
}

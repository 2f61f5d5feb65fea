//! Terminal host: drives the page from wall-clock time and input events.

use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
};
use flourish_core::{Millis, StopHandle};
use flourish_effects::{Page, PageSetup};
use ratatui::{DefaultTerminal, Frame};
use tracing::debug;

use crate::render::{self, TerminalSurface};

/// Target gap between animation frames.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// The main application which holds the page and its surface.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// The running page effects.
    page: Page,
    /// Page state drawn each frame.
    surface: TerminalSurface,
    /// Stops every effect on the page.
    stop: StopHandle,
    /// When the page started.
    started_at: Instant,
}

impl App {
    /// Start the page effects on a terminal of the given size.
    pub fn new(
        setup: PageSetup,
        rng: fastrand::Rng,
        width: u16,
        height: u16,
    ) -> color_eyre::Result<Self> {
        let surface = TerminalSurface::new(setup.page.clone(), width, height);
        let page = Page::start(setup, &surface, rng, 0)?;
        let stop = page.stop_handle();
        Ok(Self {
            running: false,
            page,
            surface,
            stop,
            started_at: Instant::now(),
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        execute!(io::stdout(), EnableMouseCapture)?;
        let result = self.main_loop(&mut terminal);
        execute!(io::stdout(), DisableMouseCapture)?;
        result
    }

    fn main_loop(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        while self.running {
            let now = self.now();
            self.page.advance(now, &mut self.surface);
            self.page.frame(&mut self.surface);
            terminal.draw(|frame| self.render(frame, now))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    /// Milliseconds since the page started.
    fn now(&self) -> Millis {
        self.started_at.elapsed().as_millis() as Millis
    }

    /// Renders the user interface.
    fn render(&self, frame: &mut Frame, now: Millis) {
        render::render(frame, &self.surface, now, self.stop.is_stopped());
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval so animation keeps running between events.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                    self.surface.resize(width, height);
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('f')) => self.freeze(),
            _ => {}
        }
    }

    /// Feeds pointer movement to the parallax effect.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        if matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) {
            self.page
                .pointer_moved(mouse.column as f32, mouse.row as f32);
        }
    }

    /// Stop every effect, leaving the page as it is.
    fn freeze(&mut self) {
        if !self.stop.is_stopped() {
            debug!(at_ms = self.now(), "page frozen");
            self.stop.stop();
        }
    }

    /// Stop the page and leave the main loop.
    fn quit(&mut self) {
        debug!(at_ms = self.now(), "quitting");
        self.stop.stop();
        self.running = false;
    }
}

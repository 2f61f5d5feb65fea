mod app;
mod render;

use std::path::PathBuf;

use clap::Parser;
use flourish_config::Config;
use flourish_core::{MemorySurface, Millis};
use flourish_effects::Page;
use ratatui::DefaultTerminal;
use tracing::debug;

use crate::app::App;

/// Typewriter, particle and parallax effects in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for a reproducible run.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,

    /// Simulate this many milliseconds without a terminal and print a summary.
    #[arg(long, value_name = "MS")]
    headless: Option<Millis>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let rng = match cli.seed.or(config.seed) {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    debug!(seed = rng.get_seed(), headless = cli.headless.is_some(), "starting page");

    if let Some(duration) = cli.headless {
        return run_headless(&config, rng, duration);
    }

    let terminal = ratatui::init();
    let result = run_terminal(terminal, &config, rng);
    ratatui::restore();
    result
}

/// Run the page in the terminal until the user quits.
fn run_terminal(
    terminal: DefaultTerminal,
    config: &Config,
    rng: fastrand::Rng,
) -> color_eyre::Result<()> {
    let size = terminal.size()?;
    App::new(config.page_setup()?, rng, size.width, size.height)?.run(terminal)
}

/// Step the page on an in-memory surface with a virtual clock.
fn run_headless(config: &Config, rng: fastrand::Rng, duration: Millis) -> color_eyre::Result<()> {
    const FRAME_MS: Millis = 16;
    const FLOATING_LAYERS: usize = 5;

    let page_settings = &config.page;
    let mut surface = MemorySurface::new(1280.0, 720.0)
        .without_text_history()
        .with_element(&page_settings.text_target)
        .with_element(&page_settings.particle_container)
        .with_floating(&page_settings.floating_selector, FLOATING_LAYERS);
    let mut page = Page::start(config.page_setup()?, &surface, rng, 0)?;

    let mut now = 0;
    while now <= duration {
        page.advance(now, &mut surface);
        page.frame(&mut surface);
        now += FRAME_MS;
    }

    let words_shown = surface.cleared_count(&page_settings.text_target);
    println!("simulated      {duration} ms");
    println!("loaded         {}", page.is_loaded());
    println!("text           {:?}", surface.text(&page_settings.text_target));
    println!("words shown    {words_shown}");
    println!(
        "particles      {} live, {} spawned",
        surface.particle_count(&page_settings.particle_container),
        page.particles().map_or(0, |p| p.spawned_total())
    );
    println!(
        "hue rotation   {:.2} deg",
        surface.hue_rotation().unwrap_or_default()
    );
    Ok(())
}

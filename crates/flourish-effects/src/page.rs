//! Page-ready startup wiring the three effects together.

use flourish_core::{
    AmbientSettings, Millis, PageSettings, ParticleSettings, Scheduler, StopHandle, Surface,
    TypewriterTiming,
};
use tracing::debug;

use crate::ambient::AmbientEffectsDriver;
use crate::error::EffectsError;
use crate::particles::ParticleManager;
use crate::typewriter::{WordCycler, WordList};

/// Everything needed to start the page effects.
#[derive(Debug, Clone)]
pub struct PageSetup {
    pub words: WordList,
    pub timing: TypewriterTiming,
    pub particles: ParticleSettings,
    pub ambient: AmbientSettings,
    pub page: PageSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageEvent {
    Loaded,
}

/// The running set of page effects.
///
/// Effects whose element is missing from the surface are never created.
/// One stop handle halts all of them.
#[derive(Debug)]
pub struct Page {
    settings: PageSettings,
    cycler: Option<WordCycler>,
    particles: Option<ParticleManager>,
    ambient: AmbientEffectsDriver,
    scheduler: Scheduler<PageEvent>,
    loaded: bool,
    stop: StopHandle,
}

impl Page {
    /// Start every effect whose element exists on `surface`.
    pub fn start<S: Surface + ?Sized>(
        setup: PageSetup,
        surface: &S,
        mut rng: fastrand::Rng,
        now: Millis,
    ) -> Result<Self, EffectsError> {
        let PageSetup {
            words,
            timing,
            particles,
            ambient,
            page,
        } = setup;
        let stop = StopHandle::new();

        let cycler = if surface.has_element(&page.text_target) {
            let mut cycler = WordCycler::new(
                words,
                timing,
                page.text_target.as_str(),
                page.glow_class.as_str(),
                rng.fork(),
            )?
            .with_stop_handle(stop.clone());
            cycler.start(now);
            Some(cycler)
        } else {
            debug!(id = %page.text_target, "text target missing, typewriter disabled");
            None
        };

        let particles = if surface.has_element(&page.particle_container) {
            let mut manager =
                ParticleManager::new(particles, page.particle_container.as_str(), rng.fork())?
                    .with_stop_handle(stop.clone());
            manager.start(now);
            Some(manager)
        } else {
            debug!(id = %page.particle_container, "particle container missing, particles disabled");
            None
        };

        let mut ambient = AmbientEffectsDriver::new(ambient, page.floating_selector.as_str())?
            .with_stop_handle(stop.clone());
        ambient.start(now);

        let mut scheduler = Scheduler::starting_at(now);
        scheduler.schedule_in(page.loaded_delay_ms, PageEvent::Loaded);

        Ok(Self {
            settings: page,
            cycler,
            particles,
            ambient,
            scheduler,
            loaded: false,
            stop,
        })
    }

    /// Run every timer due at or before `now` across all effects.
    pub fn advance<S: Surface + ?Sized>(&mut self, now: Millis, surface: &mut S) {
        if self.stop.is_stopped() {
            self.scheduler.clear();
        }
        while let Some(PageEvent::Loaded) = self.scheduler.pop_due(now) {
            surface.set_root_class(&self.settings.loaded_class, true);
            self.loaded = true;
        }
        self.scheduler.settle(now);

        if let Some(cycler) = self.cycler.as_mut() {
            cycler.advance(now, surface);
        }
        if let Some(particles) = self.particles.as_mut() {
            particles.advance(now, surface);
        }
        self.ambient.advance(now, surface);
    }

    /// Run one animation frame. False once the page has been stopped.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        self.ambient.frame(surface)
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.ambient.pointer_moved(x, y);
    }

    /// Whether the loaded class has been set on the page root.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn cycler(&self) -> Option<&WordCycler> {
        self.cycler.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleManager> {
        self.particles.as_ref()
    }

    pub fn ambient(&self) -> &AmbientEffectsDriver {
        &self.ambient
    }

    /// Handle that stops every effect on the page.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

#[cfg(test)]
mod tests {
    use flourish_core::{DEFAULT_WORDS, MemorySurface};

    use super::*;

    fn setup() -> PageSetup {
        PageSetup {
            words: WordList::new(DEFAULT_WORDS.iter().copied()).unwrap(),
            timing: TypewriterTiming::default(),
            particles: ParticleSettings::default(),
            ambient: AmbientSettings::default(),
            page: PageSettings::default(),
        }
    }

    fn full_surface() -> MemorySurface {
        MemorySurface::new(1280.0, 720.0)
            .with_element("typewriter")
            .with_element("particles")
            .with_floating("floating-element", 3)
    }

    #[test]
    fn test_loaded_flag_after_one_second() {
        let mut surface = full_surface();
        let mut page = Page::start(setup(), &surface, fastrand::Rng::with_seed(1), 0).unwrap();

        page.advance(999, &mut surface);
        assert!(!surface.has_root_class("loaded"));
        assert!(!page.is_loaded());

        page.advance(1_000, &mut surface);
        assert!(surface.has_root_class("loaded"));
        assert!(page.is_loaded());
    }

    #[test]
    fn test_missing_elements_disable_effects() {
        let mut surface = MemorySurface::new(1280.0, 720.0);
        let mut page = Page::start(setup(), &surface, fastrand::Rng::with_seed(2), 0).unwrap();
        assert!(page.cycler().is_none());
        assert!(page.particles().is_none());

        // Ambient effects and the loaded flag still run.
        page.advance(5_000, &mut surface);
        assert!(surface.hue_rotation().is_some());
        assert!(surface.has_root_class("loaded"));
    }

    #[test]
    fn test_all_effects_run_together() {
        let mut surface = full_surface();
        let mut page = Page::start(setup(), &surface, fastrand::Rng::with_seed(3), 0).unwrap();
        page.pointer_moved(1280.0, 0.0);

        let mut now = 0;
        while now <= 10_000 {
            page.advance(now, &mut surface);
            assert!(page.frame(&mut surface));
            now += 16;
        }

        assert!(!surface.text_history("typewriter").is_empty());
        let live = surface.particle_count("particles");
        assert!(live > 0 && live <= 50);
        assert!(surface.translations("floating-element")[0].0 > 0.0);
    }

    #[test]
    fn test_stop_handle_freezes_page() {
        let mut surface = full_surface();
        let mut page = Page::start(setup(), &surface, fastrand::Rng::with_seed(4), 0).unwrap();
        page.advance(3_000, &mut surface);
        let writes = surface.writes();

        page.stop_handle().stop();
        page.advance(60_000, &mut surface);
        assert!(!page.frame(&mut surface));
        assert_eq!(surface.writes(), writes);
    }

    #[test]
    fn test_invalid_particle_settings_fail_start() {
        let surface = full_surface();
        let mut bad = setup();
        bad.particles.capacity = 0;
        let result = Page::start(bad, &surface, fastrand::Rng::with_seed(5), 0);
        assert_eq!(result.err(), Some(EffectsError::ZeroCapacity));
    }

    #[test]
    fn test_instant_typewriter_timing_fails_start() {
        let surface = full_surface();
        let mut bad = setup();
        bad.words = WordList::new(["x"]).unwrap();
        bad.timing = TypewriterTiming {
            typing_speed_ms: 0,
            erasing_speed_ms: 0,
            word_pause_ms: 0,
            pre_pause_ms: 0,
            initial_delay_ms: 0,
        };
        let result = Page::start(bad, &surface, fastrand::Rng::with_seed(6), 0);
        assert_eq!(result.err(), Some(EffectsError::InstantCycle));
    }
}

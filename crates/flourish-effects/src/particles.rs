//! Bounded particle pool with staggered fill and steady replenishment.

use std::collections::BTreeMap;

use flourish_core::{Millis, ParticleId, ParticleSettings, ParticleStyle, Scheduler, StopHandle, Surface};
use tracing::{debug, trace};

use crate::error::EffectsError;

/// Check that particle settings describe a usable pool.
pub fn validate_particles(settings: &ParticleSettings) -> Result<(), EffectsError> {
    if settings.capacity == 0 {
        return Err(EffectsError::ZeroCapacity);
    }
    if settings.replenish_ms == 0 {
        return Err(EffectsError::ZeroInterval { field: "replenish" });
    }
    let ranges = [
        ("size", settings.size),
        ("left_percent", settings.left_percent),
        ("duration_secs", settings.duration_secs),
        ("delay_secs", settings.delay_secs),
        ("opacity", settings.opacity),
    ];
    for (field, range) in ranges {
        if !range.is_valid() {
            return Err(EffectsError::InvalidRange { field });
        }
    }
    if settings.duration_secs.min < 0.0 {
        return Err(EffectsError::InvalidRange { field: "duration_secs" });
    }
    if settings.delay_secs.min < 0.0 {
        return Err(EffectsError::InvalidRange { field: "delay_secs" });
    }
    Ok(())
}

/// Sample the visual parameters of a new particle.
pub fn sample_style(settings: &ParticleSettings, rng: &mut fastrand::Rng, now: Millis) -> ParticleStyle {
    ParticleStyle {
        size: settings.size.lerp(rng.f32()),
        left_percent: settings.left_percent.lerp(rng.f32()),
        duration_secs: settings.duration_secs.lerp(rng.f32()),
        delay_secs: settings.delay_secs.lerp(rng.f32()),
        opacity: settings.opacity.lerp(rng.f32()),
        spawned_at: now,
    }
}

/// Live particles, never more than `capacity`.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    capacity: usize,
    live: BTreeMap<ParticleId, ParticleStyle>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            live: BTreeMap::new(),
        }
    }

    /// Add a particle. Refused, returning false, when the pool is full.
    pub fn insert(&mut self, id: ParticleId, style: ParticleStyle) -> bool {
        if self.is_full() {
            return false;
        }
        self.live.insert(id, style);
        true
    }

    pub fn remove(&mut self, id: ParticleId) -> Option<ParticleStyle> {
        self.live.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.live.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: ParticleId) -> Option<&ParticleStyle> {
        self.live.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParticleId, &ParticleStyle)> {
        self.live.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParticleEvent {
    /// One slot of the staggered initial fill.
    Fill,
    /// Steady-state replenish timer.
    Replenish,
    /// A particle's lifetime is over.
    Retire(ParticleId),
}

/// Owns the particle pool and every particle node on the surface.
#[derive(Debug)]
pub struct ParticleManager {
    settings: ParticleSettings,
    container: String,
    pool: ParticlePool,
    next_id: u64,
    spawned_total: u64,
    started: bool,
    scheduler: Scheduler<ParticleEvent>,
    rng: fastrand::Rng,
    stop: StopHandle,
}

impl ParticleManager {
    /// Create a manager attaching particles under `container`.
    pub fn new(
        settings: ParticleSettings,
        container: impl Into<String>,
        rng: fastrand::Rng,
    ) -> Result<Self, EffectsError> {
        validate_particles(&settings)?;
        Ok(Self {
            pool: ParticlePool::new(settings.capacity),
            settings,
            container: container.into(),
            next_id: 0,
            spawned_total: 0,
            started: false,
            scheduler: Scheduler::new(),
            rng,
            stop: StopHandle::new(),
        })
    }

    /// Share an existing stop handle instead of the manager's own.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Schedule the staggered initial fill and the replenish timer.
    pub fn start(&mut self, now: Millis) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduler = Scheduler::starting_at(now);
        for i in 0..self.settings.capacity as u64 {
            self.scheduler
                .schedule_in(i * self.settings.stagger_ms, ParticleEvent::Fill);
        }
        self.scheduler
            .schedule_in(self.settings.replenish_ms, ParticleEvent::Replenish);
        debug!(
            container = %self.container,
            capacity = self.settings.capacity,
            "particle pool scheduled"
        );
    }

    /// Run every particle event due at or before `now`.
    pub fn advance<S: Surface + ?Sized>(&mut self, now: Millis, surface: &mut S) {
        if self.stop.is_stopped() {
            self.scheduler.clear();
            return;
        }
        while let Some(event) = self.scheduler.pop_due(now) {
            match event {
                ParticleEvent::Fill => {
                    self.spawn(surface);
                }
                ParticleEvent::Replenish => {
                    self.spawn(surface);
                    self.scheduler
                        .schedule_in(self.settings.replenish_ms, ParticleEvent::Replenish);
                }
                ParticleEvent::Retire(id) => self.retire(id, surface),
            }
            if self.stop.is_stopped() {
                self.scheduler.clear();
                return;
            }
        }
        self.scheduler.settle(now);
    }

    /// Create one particle unless the pool is full.
    ///
    /// The particle is attached to the surface and its retirement scheduled
    /// for `duration + delay` after now.
    pub fn spawn<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<ParticleId> {
        if self.pool.is_full() || self.stop.is_stopped() {
            return None;
        }
        let now = self.scheduler.now();
        let style = sample_style(&self.settings, &mut self.rng, now);
        let id = ParticleId(self.next_id);
        if !self.pool.insert(id, style) {
            return None;
        }
        self.next_id += 1;
        self.spawned_total += 1;
        surface.append_particle(&self.container, id, &style);
        self.scheduler
            .schedule_in(style.lifetime_ms(), ParticleEvent::Retire(id));
        trace!(id = id.0, live = self.pool.len(), "particle spawned");
        Some(id)
    }

    fn retire<S: Surface + ?Sized>(&mut self, id: ParticleId, surface: &mut S) {
        if self.pool.remove(id).is_some() {
            surface.remove_particle(&self.container, id);
            trace!(id = id.0, live = self.pool.len(), "particle retired");
        }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn live_count(&self) -> usize {
        self.pool.len()
    }

    /// Particles created since start, including retired ones.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

#[cfg(test)]
mod tests {
    use flourish_core::{MemorySurface, SampleRange};

    use super::*;

    const CONTAINER: &str = "particles";

    fn surface() -> MemorySurface {
        MemorySurface::new(800.0, 600.0).with_element(CONTAINER)
    }

    fn manager(seed: u64) -> ParticleManager {
        ParticleManager::new(
            ParticleSettings::default(),
            CONTAINER,
            fastrand::Rng::with_seed(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_validation_rejects_bad_settings() {
        let zero = ParticleSettings {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(validate_particles(&zero), Err(EffectsError::ZeroCapacity));

        let inverted = ParticleSettings {
            opacity: SampleRange::new(0.4, 0.1),
            ..Default::default()
        };
        assert_eq!(
            validate_particles(&inverted),
            Err(EffectsError::InvalidRange { field: "opacity" })
        );

        let still = ParticleSettings {
            replenish_ms: 0,
            ..Default::default()
        };
        assert!(validate_particles(&still).is_err());
        assert!(validate_particles(&ParticleSettings::default()).is_ok());
    }

    #[test]
    fn test_pool_refuses_insert_when_full() {
        let mut pool = ParticlePool::new(2);
        let style = sample_style(&ParticleSettings::default(), &mut fastrand::Rng::with_seed(1), 0);
        assert!(pool.insert(ParticleId(0), style));
        assert!(pool.insert(ParticleId(1), style));
        assert!(!pool.insert(ParticleId(2), style));
        assert_eq!(pool.len(), 2);
        assert!(pool.remove(ParticleId(0)).is_some());
        assert!(!pool.is_full());
    }

    #[test]
    fn test_initial_fill_is_staggered() {
        let mut manager = manager(3);
        let mut surface = surface();
        manager.start(0);

        manager.advance(0, &mut surface);
        assert_eq!(manager.live_count(), 1);

        // Fill slots at 0, 100 and 200; the first replenish is not due until 300.
        manager.advance(250, &mut surface);
        assert_eq!(manager.live_count(), 3);

        manager.advance(4_900, &mut surface);
        assert!(manager.live_count() >= 50 - 1);
        assert!(manager.live_count() <= 50);
    }

    #[test]
    fn test_spawn_at_capacity_does_not_grow() {
        let mut manager = manager(5);
        let mut surface = surface();
        for _ in 0..50 {
            assert!(manager.spawn(&mut surface).is_some());
        }
        assert_eq!(manager.live_count(), 50);
        assert!(manager.spawn(&mut surface).is_none());
        assert_eq!(manager.live_count(), 50);
        assert_eq!(surface.particle_count(CONTAINER), 50);
    }

    #[test]
    fn test_pool_never_exceeds_capacity_over_time() {
        let mut manager = manager(8);
        let mut surface = surface();
        manager.start(0);
        for now in (0..120_000).step_by(50) {
            manager.advance(now, &mut surface);
            assert!(manager.live_count() <= 50);
            assert_eq!(surface.particle_count(CONTAINER), manager.live_count());
        }
        // Particles have retired and been replaced.
        assert!(manager.spawned_total() > 50);
    }

    #[test]
    fn test_particle_retires_after_duration_and_delay() {
        let mut manager = manager(13);
        let mut surface = surface();
        let id = manager.spawn(&mut surface).unwrap();
        let lifetime = manager.pool().get(id).unwrap().lifetime_ms();

        manager.advance(lifetime - 1, &mut surface);
        assert!(manager.pool().get(id).is_some());
        manager.advance(lifetime, &mut surface);
        assert!(manager.pool().get(id).is_none());
        assert!(surface.particles(CONTAINER).all(|(pid, _)| *pid != id));
    }

    #[test]
    fn test_replenish_adds_one_per_tick() {
        let settings = ParticleSettings {
            capacity: 10,
            stagger_ms: 10_000,
            ..Default::default()
        };
        let mut manager =
            ParticleManager::new(settings, CONTAINER, fastrand::Rng::with_seed(2)).unwrap();
        let mut surface = surface();
        manager.start(0);
        // Fill slot at 0 and replenish ticks at 300, 600, 900.
        manager.advance(900, &mut surface);
        assert_eq!(manager.live_count(), 4);
    }

    #[test]
    fn test_stop_halts_spawning() {
        let mut manager = manager(4);
        let stop = manager.stop_handle();
        let mut surface = surface();
        manager.start(0);
        manager.advance(1_000, &mut surface);
        let writes = surface.writes();

        stop.stop();
        manager.advance(60_000, &mut surface);
        assert!(manager.spawn(&mut surface).is_none());
        assert_eq!(surface.writes(), writes);
    }
}

#[cfg(test)]
mod proptests {
    use flourish_core::MemorySurface;
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// Every sampled parameter falls inside its declared range.
        #[test]
        fn sampled_styles_in_range(seed in any::<u64>()) {
            let settings = ParticleSettings::default();
            let mut rng = fastrand::Rng::with_seed(seed);
            for _ in 0..64 {
                let style = sample_style(&settings, &mut rng, 0);
                prop_assert!(settings.size.contains(style.size));
                prop_assert!(settings.left_percent.contains(style.left_percent));
                prop_assert!(settings.duration_secs.contains(style.duration_secs));
                prop_assert!(settings.delay_secs.contains(style.delay_secs));
                prop_assert!(settings.opacity.contains(style.opacity));
            }
        }

        /// Live count stays bounded whatever the capacity and cadence.
        #[test]
        fn live_count_bounded(
            capacity in 1usize..20,
            stagger_ms in 0u64..200,
            replenish_ms in 1u64..500,
            seed in any::<u64>(),
        ) {
            let settings = ParticleSettings {
                capacity,
                stagger_ms,
                replenish_ms,
                ..Default::default()
            };
            let mut manager = ParticleManager::new(settings, "p", fastrand::Rng::with_seed(seed)).unwrap();
            let mut surface = MemorySurface::new(10.0, 10.0).with_element("p");
            manager.start(0);
            for now in (0..30_000).step_by(97) {
                manager.advance(now, &mut surface);
                prop_assert!(manager.live_count() <= capacity);
            }
        }
    }
}

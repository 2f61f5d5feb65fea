//! Ambient page effects: slow hue drift and pointer parallax.

use flourish_core::{AmbientSettings, Millis, Scheduler, StopHandle, Surface};
use tracing::debug;

use crate::error::EffectsError;

/// Check that ambient settings can drive a drift timer and a smoothing filter.
pub fn validate_ambient(settings: &AmbientSettings) -> Result<(), EffectsError> {
    if settings.hue_interval_ms == 0 {
        return Err(EffectsError::ZeroInterval { field: "hue" });
    }
    if !(settings.smoothing > 0.0 && settings.smoothing <= 1.0) {
        return Err(EffectsError::InvalidRange { field: "smoothing" });
    }
    Ok(())
}

/// Raw and low-pass filtered pointer position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub raw_x: f32,
    pub raw_y: f32,
    pub smoothed_x: f32,
    pub smoothed_y: f32,
}

impl PointerState {
    /// Record the latest pointer position.
    pub fn record(&mut self, x: f32, y: f32) {
        self.raw_x = x;
        self.raw_y = y;
    }

    /// Move the smoothed position `factor` of the way toward the raw one.
    pub fn smooth(&mut self, factor: f32) {
        self.smoothed_x += (self.raw_x - self.smoothed_x) * factor;
        self.smoothed_y += (self.raw_y - self.smoothed_y) * factor;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HueTick;

/// Drives the hue drift timer and the per-frame parallax.
#[derive(Debug)]
pub struct AmbientEffectsDriver {
    settings: AmbientSettings,
    selector: String,
    hue: f32,
    pointer: PointerState,
    frames: u64,
    started: bool,
    scheduler: Scheduler<HueTick>,
    stop: StopHandle,
}

impl AmbientEffectsDriver {
    /// Create a driver moving the elements matching `selector`.
    pub fn new(settings: AmbientSettings, selector: impl Into<String>) -> Result<Self, EffectsError> {
        validate_ambient(&settings)?;
        Ok(Self {
            hue: settings.hue_start,
            settings,
            selector: selector.into(),
            pointer: PointerState::default(),
            frames: 0,
            started: false,
            scheduler: Scheduler::new(),
            stop: StopHandle::new(),
        })
    }

    /// Share an existing stop handle instead of the driver's own.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Schedule the first hue drift tick.
    pub fn start(&mut self, now: Millis) {
        if self.started {
            return;
        }
        self.started = true;
        self.scheduler = Scheduler::starting_at(now);
        self.scheduler
            .schedule_in(self.settings.hue_interval_ms, HueTick);
        debug!(selector = %self.selector, "ambient effects scheduled");
    }

    /// Run every hue tick due at or before `now`.
    pub fn advance<S: Surface + ?Sized>(&mut self, now: Millis, surface: &mut S) {
        if self.stop.is_stopped() {
            self.scheduler.clear();
            return;
        }
        while let Some(HueTick) = self.scheduler.pop_due(now) {
            self.hue = (self.hue + self.settings.hue_step) % 360.0;
            surface.set_hue_rotation(self.hue_rotation());
            self.scheduler
                .schedule_in(self.settings.hue_interval_ms, HueTick);
        }
        self.scheduler.settle(now);
    }

    /// Record a pointer-move event.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.record(x, y);
    }

    /// Run one animation frame.
    ///
    /// Returns false once the driver has been stopped, so a host render loop
    /// knows to stop requesting frames.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) -> bool {
        if self.stop.is_stopped() {
            return false;
        }
        self.pointer.smooth(self.settings.smoothing);
        let viewport = surface.viewport();
        for index in 0..surface.floating_count(&self.selector) {
            let (dx, dy) = self.parallax_offset(index, viewport);
            surface.set_translation(&self.selector, index, dx, dy);
        }
        self.frames += 1;
        true
    }

    /// Translation of the `index`-th floating layer for the current pointer.
    ///
    /// Deeper layers (higher index) move further.
    pub fn parallax_offset(&self, index: usize, (width, height): (f32, f32)) -> (f32, f32) {
        let speed = (index + 1) as f32 * self.settings.parallax_step;
        (
            (self.pointer.smoothed_x - width / 2.0) * speed,
            (self.pointer.smoothed_y - height / 2.0) * speed,
        )
    }

    /// Current hue accumulator, in `[0, 360)`.
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Degrees of hue rotation applied to the page.
    pub fn hue_rotation(&self) -> f32 {
        self.hue * self.settings.hue_scale
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

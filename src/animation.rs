//! Flame animation controller
//!
//! Owns the particle population, the surface and the palette list, and runs
//! the frame loop as a two-state machine:
//!
//! - STOPPED: no frame requested from the host (initial state)
//! - RUNNING: exactly one frame requested and not yet delivered
//!
//! `start()` renders one frame immediately; every rendered frame requests
//! the next one from the host. The host hands due frames back through
//! `on_frame`, and `stop()` cancels whatever is pending.

use crate::config::AnimationSettings;
use crate::error::{FlameError, Result};
use crate::host::{FrameHandle, Host, ListenerId};
use crate::palette::{Color, ColorScheme};
use crate::particles::{Particle, ParticleConfig};
use crate::surface::{PaintContext, Surface};
use crate::util::Rng;

pub struct FlameAnimation<S: Surface, H: Host> {
    surface: S,
    host: H,
    particles: Vec<Particle>,
    settings: AnimationSettings,
    color_mode: usize,
    /// Pending frame; `Some` iff RUNNING
    frame: Option<FrameHandle>,
    resize_listener: Option<ListenerId>,
    rng: Rng,
    frames_rendered: u64,
}

impl<S: Surface, H: Host> FlameAnimation<S, H> {
    /// Bind an animation to `surface`, sized to the host viewport
    ///
    /// Fails if the surface has no 2D paint context or the settings carry
    /// no color schemes.
    pub fn new(mut surface: S, mut host: H, settings: AnimationSettings) -> Result<Self> {
        if surface.context_2d().is_none() {
            return Err(FlameError::NoContext);
        }
        settings.validate()?;

        let (width, height) = host.viewport_size();
        surface.set_size(width, height);
        let resize_listener = host.subscribe_resize();

        let rng = settings.seed.map_or_else(Rng::from_time, Rng::new);

        tracing::debug!(width, height, schemes = settings.schemes.len(), "flame animation created");

        Ok(Self {
            surface,
            host,
            particles: Vec::new(),
            settings,
            color_mode: 0,
            frame: None,
            resize_listener: Some(resize_listener),
            rng,
            frames_rendered: 0,
        })
    }

    /// Same as `new` with default physics, fade and palettes
    pub fn with_defaults(surface: S, host: H) -> Result<Self> {
        Self::new(surface, host, AnimationSettings::default())
    }

    /// Resize the population to `floor(intensity * 2)` particles
    ///
    /// Growing appends fresh particles after the existing ones; shrinking
    /// drops particles from the tail. Particles that stay are not touched,
    /// unless dead-slot recycling is enabled, in which case dead survivors
    /// are respawned in place.
    pub fn create_particles(&mut self, intensity: f32) {
        let target = target_population(intensity);
        let (width, height) = self.surface.size();
        let config = self.settings.particle;

        if self.settings.recycle_dead {
            let kept = self.particles.len().min(target);
            let mut recycled = 0usize;
            for p in self.particles[..kept].iter_mut().filter(|p| !p.is_alive()) {
                p.respawn(width, height, &config, &mut self.rng);
                recycled += 1;
            }
            if recycled > 0 {
                tracing::debug!(recycled, "respawned dead particles");
            }
        }

        let before = self.particles.len();
        if before < target {
            for _ in before..target {
                self.particles
                    .push(Particle::spawn(width, height, &config, &mut self.rng));
            }
        } else {
            self.particles.truncate(target);
        }

        if before != target {
            tracing::debug!(intensity, before, after = target, "population resized");
        }
    }

    /// Start the frame loop (no-op when already running)
    pub fn start(&mut self) {
        if self.frame.is_some() {
            return;
        }
        tracing::debug!(particles = self.particles.len(), "animation started");
        self.render_frame();
    }

    /// Stop the frame loop (no-op when already stopped)
    pub fn stop(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
            tracing::debug!(frames = self.frames_rendered, "animation stopped");
        }
    }

    /// Advance to the next color scheme, wrapping around
    pub fn toggle_color_mode(&mut self) {
        self.color_mode = (self.color_mode + 1) % self.settings.schemes.len();
        tracing::debug!(mode = self.color_mode, scheme = %self.active_scheme().name, "color mode");
    }

    /// Deliver a due frame from the host
    ///
    /// Returns false (and does nothing) for a handle that is not the one
    /// currently pending, e.g. one that was cancelled by `stop()`.
    pub fn on_frame(&mut self, handle: FrameHandle) -> bool {
        if self.frame != Some(handle) {
            return false;
        }
        self.frame = None;
        self.render_frame();
        true
    }

    /// Deliver a viewport resize; the surface follows the host viewport
    pub fn on_resize(&mut self) {
        if self.resize_listener.is_none() {
            return;
        }
        let (width, height) = self.host.viewport_size();
        if self.surface.size() != (width, height) {
            self.surface.set_size(width, height);
            tracing::debug!(width, height, "surface resized");
        }
    }

    /// Stop the loop and release the resize subscription
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.stop();
        if let Some(id) = self.resize_listener.take() {
            self.host.unsubscribe_resize(id);
        }
    }

    fn render_frame(&mut self) {
        let (width, height) = self.surface.size();
        let fade_alpha = self.settings.fade_alpha;
        let scheme = &self.settings.schemes[self.color_mode];

        match self.surface.context_2d() {
            Some(ctx) => {
                ctx.fill_rect(0.0, 0.0, width as f32, height as f32, Color::BLACK, fade_alpha);
                for p in &mut self.particles {
                    p.update();
                    p.draw(ctx, scheme);
                }
            },
            None => {
                // Context went away after construction; keep physics running
                for p in &mut self.particles {
                    p.update();
                }
            },
        }

        self.frames_rendered += 1;
        self.frame = Some(self.host.request_frame());
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn alive_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn color_mode(&self) -> usize {
        self.color_mode
    }

    pub fn scheme_count(&self) -> usize {
        self.settings.schemes.len()
    }

    pub fn active_scheme(&self) -> &ColorScheme {
        &self.settings.schemes[self.color_mode]
    }

    pub fn particle_config(&self) -> &ParticleConfig {
        &self.settings.particle
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<S: Surface, H: Host> Drop for FlameAnimation<S, H> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Population size for an intensity: floor(intensity * 2), never negative.
/// Non-finite intensities map to an empty population.
fn target_population(intensity: f32) -> usize {
    let target = (intensity * 2.0).floor();
    if target.is_finite() && target > 0.0 {
        target as usize
    } else {
        0
    }
}

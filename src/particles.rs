//! Flame particles
//!
//! Each particle spawns just below the bottom edge, shoots upward, arcs
//! back down under gravity and fades out as its life runs down.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::palette::ColorScheme;
use crate::surface::PaintContext;
use crate::util::Rng;

/// How far below the bottom edge particles may spawn (pixels)
const SPAWN_DEPTH: f32 = 100.0;
/// Minimum per-tick decay, so every particle eventually dies
const DECAY_FLOOR: f32 = 0.01;

/// Shape and physics bounds for newly spawned particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub max_size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Added to vertical velocity every tick (positive pulls down)
    pub gravity: f32,
    pub decay_rate: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_size: 10.0,
            min_speed: 2.0,
            max_speed: 3.0,
            gravity: 0.1,
            decay_rate: 0.015,
        }
    }
}

/// A single flame particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    radius: f32,
    decay: f32,
    gravity: f32,
}

impl Particle {
    /// Spawn a particle for a surface of the given size
    pub fn spawn(width: u32, height: u32, config: &ParticleConfig, rng: &mut Rng) -> Self {
        let x = rng.next_f32() * width as f32;
        let y = height as f32 + rng.next_f32() * SPAWN_DEPTH;
        let vx = rng.range_f32(-1.0, 1.0);
        let vy = -(rng.next_f32() * config.max_speed + config.min_speed);
        let radius = rng.next_f32() * config.max_size;
        let decay = rng.next_f32() * config.decay_rate + DECAY_FLOOR;

        Self {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            life: 1.0,
            radius,
            decay,
            gravity: config.gravity,
        }
    }

    /// Re-roll this particle in place (dead-slot recycling)
    pub fn respawn(&mut self, width: u32, height: u32, config: &ParticleConfig, rng: &mut Rng) {
        *self = Self::spawn(width, height, config, rng);
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Per-tick life decrement
    #[inline]
    pub fn decay(&self) -> f32 {
        self.decay
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Advance one tick: explicit Euler, then gravity, then decay
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.life -= self.decay;
    }

    /// Paint this particle as a gradient disc faded by its life
    pub fn draw<C: PaintContext + ?Sized>(&self, ctx: &mut C, scheme: &ColorScheme) {
        let gradient = scheme.gradient(self.pos.x, self.pos.y, self.radius);
        ctx.set_global_alpha(self.life);
        ctx.fill_circle_gradient(self.pos.x, self.pos.y, self.radius, &gradient);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{Color, RadialGradient};

    #[derive(Default)]
    struct RecordingContext {
        alpha: f32,
        discs: Vec<(f32, f32, f32, f32, RadialGradient)>,
    }

    impl PaintContext for RecordingContext {
        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _c: Color, _a: f32) {}

        fn set_global_alpha(&mut self, alpha: f32) {
            self.alpha = alpha;
        }

        fn global_alpha(&self) -> f32 {
            self.alpha
        }

        fn fill_circle_gradient(&mut self, cx: f32, cy: f32, radius: f32, g: &RadialGradient) {
            self.discs.push((cx, cy, radius, self.alpha, g.clone()));
        }
    }

    #[test]
    fn test_spawn_bounds() {
        let config = ParticleConfig::default();
        let mut rng = Rng::new(0xF1A3E);
        for _ in 0..2000 {
            let p = Particle::spawn(800, 600, &config, &mut rng);
            assert!(p.pos.x >= 0.0 && p.pos.x < 800.0);
            assert!(p.pos.y >= 600.0 && p.pos.y < 700.0);
            assert!(p.vel.x >= -1.0 && p.vel.x <= 1.0);
            assert!(p.vel.y <= -config.min_speed);
            assert!(p.vel.y > -(config.min_speed + config.max_speed));
            assert!(p.radius() >= 0.0 && p.radius() < config.max_size);
            assert!(p.decay() >= 0.01 && p.decay() < 0.01 + config.decay_rate);
            assert_eq!(p.life, 1.0);
        }
    }

    #[test]
    fn test_upward_even_with_zero_speeds() {
        let config = ParticleConfig {
            min_speed: 0.0,
            max_speed: 0.0,
            ..ParticleConfig::default()
        };
        let mut rng = Rng::new(3);
        let p = Particle::spawn(100, 100, &config, &mut rng);
        assert!(p.vel.y <= 0.0);
    }

    #[test]
    fn test_update_integrates_linearly() {
        let config = ParticleConfig::default();
        let mut rng = Rng::new(99);
        let mut p = Particle::spawn(800, 600, &config, &mut rng);
        let start = p.clone();

        let n = 25;
        for _ in 0..n {
            p.update();
        }

        let expected_life = 1.0 - n as f32 * p.decay();
        assert!((p.life - expected_life).abs() < 1e-4);
        let expected_vy = start.vel.y + n as f32 * config.gravity;
        assert!((p.vel.y - expected_vy).abs() < 1e-4);
        // no damping on vx
        assert_eq!(p.vel.x, start.vel.x);
        assert!((p.pos.x - (start.pos.x + n as f32 * start.vel.x)).abs() < 1e-2);
        assert_eq!(p.radius(), start.radius());
        assert_eq!(p.decay(), start.decay());
    }

    #[test]
    fn test_first_update_moves_before_gravity() {
        let mut rng = Rng::new(5);
        let mut p = Particle::spawn(50, 50, &ParticleConfig::default(), &mut rng);
        let y0 = p.pos.y;
        let vy0 = p.vel.y;
        p.update();
        assert_eq!(p.pos.y, y0 + vy0);
        assert_eq!(p.vel.y, vy0 + 0.1);
    }

    #[test]
    fn test_draw_uses_life_as_alpha_and_scheme_stops() {
        let mut rng = Rng::new(11);
        let mut p = Particle::spawn(200, 200, &ParticleConfig::default(), &mut rng);
        p.update();
        let scheme = ColorScheme::fire();
        let mut ctx = RecordingContext::default();
        p.draw(&mut ctx, &scheme);

        assert_eq!(ctx.discs.len(), 1);
        let (cx, cy, radius, alpha, gradient) = &ctx.discs[0];
        assert_eq!((*cx, *cy), (p.pos.x, p.pos.y));
        assert_eq!(*radius, p.radius());
        assert_eq!(*alpha, p.life);
        let stops: Vec<Color> = gradient.stops().iter().map(|(_, c)| *c).collect();
        assert_eq!(stops, scheme.colors.to_vec());
        assert_eq!(gradient.radius, p.radius());
    }

    #[test]
    fn test_dead_particle_still_draws_without_error() {
        let mut rng = Rng::new(12);
        let mut p = Particle::spawn(200, 200, &ParticleConfig::default(), &mut rng);
        while p.is_alive() {
            p.update();
        }
        let mut ctx = RecordingContext::default();
        p.draw(&mut ctx, &ColorScheme::arcane());
        assert!(ctx.alpha <= 0.0);
    }

    #[test]
    fn test_config_json_defaults() {
        let config: ParticleConfig = serde_json::from_str(r#"{"gravity": 0.2}"#).unwrap();
        assert_eq!(config.gravity, 0.2);
        assert_eq!(config.max_size, 10.0);
        assert_eq!(config.decay_rate, 0.015);
    }
}

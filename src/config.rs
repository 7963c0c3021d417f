//! Emitter configuration.
//!
//! Everything that shapes an effect lives here: pool size, spawn rate,
//! lifetime, the start/end visual curves, spawn randomization and the
//! constant acceleration applied to every particle. The [`Emitter`] owns a
//! config and re-reads it every update, so fields can be changed at any time;
//! only [`max_particles`](EmitterConfig::max_particles) needs an explicit
//! call on the emitter because it resizes the pool.
//!
//! # Quick Start
//!
//! ```ignore
//! use embers::prelude::*;
//!
//! let config = EmitterConfig::new()
//!     .with_rate(250.0)
//!     .with_lifetime(1.5)
//!     .with_color(Vec4::new(1.0, 0.9, 0.3, 1.0), Vec4::new(0.8, 0.2, 0.0, 0.0))
//!     .with_velocity(Vec3::Y, Vec3::splat(0.4));
//! let emitter = Emitter::new(config);
//! ```
//!
//! [`Emitter`]: crate::emitter::Emitter

use std::ops::Range;

use glam::{Vec3, Vec4};

use crate::sprite::SpriteSheet;

/// Spawn rates below this are treated as one particle per second, keeping
/// the per-particle interval finite.
pub const MIN_RATE: f32 = 1.0;

/// Lifetimes at or below zero are bumped to this so life fractions stay
/// well defined.
const MIN_LIFETIME: f32 = 1e-3;

/// Tunable parameters for one emitter.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Pool capacity. Changing it on a live emitter takes effect through
    /// [`Emitter::set_max_particles`](crate::emitter::Emitter::set_max_particles).
    pub max_particles: usize,
    /// Spawn rate in particles per second. Read through
    /// [`seconds_per_particle`](Self::seconds_per_particle), which clamps
    /// rates below [`MIN_RATE`].
    pub particles_per_second: f32,
    /// Seconds a particle lives. Read through [`lifetime`](Self::lifetime).
    pub particle_lifetime: f32,

    /// Quad half-extent at spawn, world units.
    pub start_size: f32,
    /// Quad half-extent at end of life.
    pub end_size: f32,
    /// RGBA tint at spawn.
    pub start_color: Vec4,
    /// RGBA tint at end of life.
    pub end_color: Vec4,
    /// In-plane rotation at spawn, radians, sampled uniformly.
    pub start_rotation: Range<f32>,
    /// In-plane rotation at end of life, radians, sampled uniformly.
    pub end_rotation: Range<f32>,

    /// Emission point.
    pub position: Vec3,
    /// Per-axis half-extent of the uniform spawn position jitter.
    pub position_jitter: Vec3,
    /// Base velocity given to every particle.
    pub velocity: Vec3,
    /// Per-axis half-extent of the uniform velocity jitter.
    pub velocity_jitter: Vec3,
    /// Constant acceleration applied over the whole life (gravity, wind).
    pub acceleration: Vec3,

    /// Optional flipbook animation over the particle texture.
    pub sprite_sheet: Option<SpriteSheet>,
    /// Billboard with world-space Y as the up axis instead of the camera's
    /// up. Keeps effects like fire upright under a tilted camera.
    pub constrain_y: bool,

    /// A paused emitter neither ages, retires nor spawns.
    pub paused: bool,
    /// An invisible emitter keeps simulating but draws nothing.
    pub visible: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            particles_per_second: 100.0,
            particle_lifetime: 2.0,
            start_size: 0.1,
            end_size: 0.05,
            start_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            end_color: Vec4::new(1.0, 1.0, 1.0, 0.0),
            start_rotation: 0.0..0.0,
            end_rotation: 0.0..0.0,
            position: Vec3::ZERO,
            position_jitter: Vec3::ZERO,
            velocity: Vec3::Y,
            velocity_jitter: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            sprite_sheet: None,
            constrain_y: false,
            paused: false,
            visible: true,
        }
    }
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles.max(1);
        self
    }

    pub fn with_rate(mut self, particles_per_second: f32) -> Self {
        self.particles_per_second = particles_per_second.max(MIN_RATE);
        self
    }

    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.particle_lifetime = seconds.max(MIN_LIFETIME);
        self
    }

    pub fn with_size(mut self, start: f32, end: f32) -> Self {
        self.start_size = start;
        self.end_size = end;
        self
    }

    pub fn with_color(mut self, start: Vec4, end: Vec4) -> Self {
        self.start_color = start;
        self.end_color = end;
        self
    }

    /// Rotation ranges sampled per particle at spawn, radians.
    pub fn with_rotation(mut self, start: Range<f32>, end: Range<f32>) -> Self {
        self.start_rotation = start;
        self.end_rotation = end;
        self
    }

    pub fn with_position(mut self, position: Vec3, jitter: Vec3) -> Self {
        self.position = position;
        self.position_jitter = jitter;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3, jitter: Vec3) -> Self {
        self.velocity = velocity;
        self.velocity_jitter = jitter;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_sprite_sheet(mut self, sheet: SpriteSheet) -> Self {
        self.sprite_sheet = Some(sheet);
        self
    }

    pub fn with_constrain_y(mut self, constrain_y: bool) -> Self {
        self.constrain_y = constrain_y;
        self
    }

    // =========================================================================
    // PRESETS
    // =========================================================================

    /// Fire preset: warm particles that rise, shrink and redden.
    pub fn fire(position: Vec3) -> Self {
        Self {
            max_particles: 600,
            particles_per_second: 220.0,
            particle_lifetime: 1.3,
            start_size: 0.09,
            end_size: 0.02,
            start_color: Vec4::new(1.0, 0.9, 0.3, 0.9), // Bright yellow-white
            end_color: Vec4::new(0.8, 0.2, 0.0, 0.0),   // Deep red-orange
            position,
            position_jitter: Vec3::new(0.12, 0.02, 0.12),
            velocity: Vec3::new(0.0, 1.1, 0.0),
            velocity_jitter: Vec3::new(0.25, 0.3, 0.25),
            acceleration: Vec3::new(0.0, 0.6, 0.0), // Hot air keeps accelerating up
            constrain_y: true,
            ..Default::default()
        }
    }

    /// Smoke preset: slow gray puffs that grow as they rise and thin out.
    pub fn smoke(position: Vec3) -> Self {
        Self {
            max_particles: 400,
            particles_per_second: 60.0,
            particle_lifetime: 4.0,
            start_size: 0.08,
            end_size: 0.35, // Smoke expands, doesn't shrink
            start_color: Vec4::new(0.4, 0.4, 0.4, 0.5),    // Medium gray
            end_color: Vec4::new(0.15, 0.15, 0.15, 0.0),   // Dark gray, gone
            start_rotation: -0.5..0.5,
            end_rotation: -2.0..2.0,
            position,
            position_jitter: Vec3::new(0.1, 0.0, 0.1),
            velocity: Vec3::new(0.0, 0.45, 0.0),
            velocity_jitter: Vec3::new(0.12, 0.1, 0.12),
            acceleration: Vec3::new(0.08, 0.05, 0.0), // Light sideways drift
            ..Default::default()
        }
    }

    /// Sparks preset: short bright streaks thrown out fast and pulled down.
    pub fn sparks(position: Vec3) -> Self {
        Self {
            max_particles: 800,
            particles_per_second: 350.0,
            particle_lifetime: 0.8,
            start_size: 0.03,
            end_size: 0.005,
            start_color: Vec4::new(1.0, 1.0, 0.8, 1.0), // Bright flash
            end_color: Vec4::new(1.0, 0.3, 0.0, 0.0),   // Orange ember
            start_rotation: 0.0..std::f32::consts::TAU,
            end_rotation: 0.0..std::f32::consts::TAU,
            position,
            position_jitter: Vec3::splat(0.02),
            velocity: Vec3::new(0.0, 1.8, 0.0),
            velocity_jitter: Vec3::new(1.6, 0.9, 1.6),
            acceleration: Vec3::new(0.0, -4.0, 0.0),
            ..Default::default()
        }
    }

    /// Fountain preset: particles arc up, fall under gravity and fade.
    pub fn fountain(position: Vec3) -> Self {
        Self {
            max_particles: 1200,
            particles_per_second: 400.0,
            particle_lifetime: 2.4,
            start_size: 0.05,
            end_size: 0.04,
            start_color: Vec4::new(0.7, 0.85, 1.0, 0.9), // Light blue
            end_color: Vec4::new(0.2, 0.4, 0.8, 0.0),    // Deeper blue
            position,
            position_jitter: Vec3::new(0.03, 0.0, 0.03),
            velocity: Vec3::new(0.0, 3.0, 0.0),
            velocity_jitter: Vec3::new(0.5, 0.4, 0.5),
            acceleration: Vec3::new(0.0, -3.2, 0.0),
            ..Default::default()
        }
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Spawn interval in seconds, with the rate clamped to [`MIN_RATE`].
    #[inline]
    pub fn seconds_per_particle(&self) -> f32 {
        1.0 / self.particles_per_second.max(MIN_RATE)
    }

    /// Particle lifetime with the zero/negative guard applied.
    #[inline]
    pub fn lifetime(&self) -> f32 {
        self.particle_lifetime.max(MIN_LIFETIME)
    }

    /// Tint at a life fraction in `[0, 1]`.
    #[inline]
    pub fn color_at(&self, life_fraction: f32) -> Vec4 {
        self.start_color.lerp(self.end_color, life_fraction)
    }

    /// Quad half-extent at a life fraction in `[0, 1]`.
    #[inline]
    pub fn size_at(&self, life_fraction: f32) -> f32 {
        self.start_size + (self.end_size - self.start_size) * life_fraction
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_clamps_to_minimum() {
        let config = EmitterConfig::new().with_rate(0.0);
        assert_eq!(config.particles_per_second, MIN_RATE);
        assert_eq!(config.seconds_per_particle(), 1.0);

        // Clamping also holds when the field is poked directly.
        let mut config = EmitterConfig::new();
        config.particles_per_second = -5.0;
        assert_eq!(config.seconds_per_particle(), 1.0);
    }

    #[test]
    fn test_lifetime_guards_against_zero() {
        let mut config = EmitterConfig::new();
        config.particle_lifetime = 0.0;
        assert!(config.lifetime() > 0.0);
    }

    #[test]
    fn test_max_particles_clamps_to_one() {
        let config = EmitterConfig::new().with_max_particles(0);
        assert_eq!(config.max_particles, 1);
    }

    #[test]
    fn test_curves_interpolate_endpoints() {
        let config = EmitterConfig::new()
            .with_size(1.0, 3.0)
            .with_color(Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(config.size_at(0.0), 1.0);
        assert_eq!(config.size_at(1.0), 3.0);
        assert_eq!(config.size_at(0.5), 2.0);
        assert_eq!(config.color_at(0.5), Vec4::new(0.5, 0.0, 0.5, 0.5));
    }

    #[test]
    fn test_presets_are_self_consistent() {
        for config in [
            EmitterConfig::fire(Vec3::ZERO),
            EmitterConfig::smoke(Vec3::ZERO),
            EmitterConfig::sparks(Vec3::ZERO),
            EmitterConfig::fountain(Vec3::ZERO),
        ] {
            assert!(config.max_particles >= 1);
            assert!(config.particles_per_second >= MIN_RATE);
            assert!(config.particle_lifetime > 0.0);
            assert!(config.visible);
            assert!(!config.paused);
            // Rough capacity check: the pool holds a full lifetime of spawns.
            let needed = (config.particles_per_second * config.particle_lifetime).ceil();
            assert!(config.max_particles as f32 >= needed);
        }
    }
}

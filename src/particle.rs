//! The per-particle record stored in the pool and streamed to the GPU.
//!
//! A particle is deliberately small: everything that can be derived from
//! age and the emitter's configuration (color, size, current position,
//! current rotation) is *not* stored. Instead the record keeps the spawn-time
//! state and the evaluation happens closed-form wherever it is needed,
//! on the CPU during quad expansion or on the GPU in the record shader.

use glam::Vec3;

/// Spawn-time state plus accumulated age for one particle.
///
/// The layout is `#[repr(C)]` and padded to 48 bytes so a pool slice can be
/// copied into a GPU vertex buffer with `bytemuck::cast_slice` and consumed
/// directly by the instance-stepped record shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    /// World-space position at spawn time.
    pub start_position: Vec3,
    /// Seconds this particle has been alive. Advanced by `Emitter::update`.
    pub age: f32,
    /// World-space velocity at spawn time.
    pub start_velocity: Vec3,
    /// In-plane rotation at spawn, radians.
    pub start_rotation: f32,
    /// In-plane rotation at end of life, radians.
    pub end_rotation: f32,
    pub _pad: [f32; 3],
}

impl Particle {
    /// Normalized life fraction in `[0, 1]` for the given lifetime.
    ///
    /// Clamped, so a particle kept around past its lifetime (it can survive
    /// one frame at most before retirement) evaluates as fully aged rather
    /// than extrapolating.
    #[inline]
    pub fn life_fraction(&self, lifetime: f32) -> f32 {
        (self.age / lifetime).clamp(0.0, 1.0)
    }

    /// Current world position under constant acceleration.
    ///
    /// `p(t) = p0 + v0 * t + 0.5 * a * t^2`, evaluated at `t = age`. No
    /// per-frame integration state exists, so position never drifts with
    /// frame rate.
    #[inline]
    pub fn position(&self, acceleration: Vec3) -> Vec3 {
        self.start_position
            + self.start_velocity * self.age
            + 0.5 * acceleration * self.age * self.age
    }

    /// Current in-plane rotation, linearly interpolated over the life fraction.
    #[inline]
    pub fn rotation(&self, life_fraction: f32) -> f32 {
        self.start_rotation + (self.end_rotation - self.start_rotation) * life_fraction
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(age: f32) -> Particle {
        Particle {
            start_position: Vec3::new(1.0, 2.0, 3.0),
            age,
            start_velocity: Vec3::new(0.5, 1.0, -0.25),
            start_rotation: 0.0,
            end_rotation: std::f32::consts::PI,
            _pad: [0.0; 3],
        }
    }

    #[test]
    fn test_record_is_48_bytes() {
        // The record shader assumes three 16-byte rows per instance.
        assert_eq!(std::mem::size_of::<Particle>(), 48);
        assert_eq!(std::mem::align_of::<Particle>(), 4);
    }

    #[test]
    fn test_position_at_age_zero_is_start() {
        let p = particle(0.0);
        assert_eq!(p.position(Vec3::new(0.0, -9.8, 0.0)), p.start_position);
    }

    #[test]
    fn test_position_closed_form() {
        let p = particle(2.0);
        let accel = Vec3::new(0.0, -10.0, 0.0);
        // p0 + v0*2 + 0.5*a*4
        let expected = Vec3::new(1.0, 2.0, 3.0)
            + Vec3::new(0.5, 1.0, -0.25) * 2.0
            + Vec3::new(0.0, -20.0, 0.0);
        assert!((p.position(accel) - expected).length() < 1e-5);
    }

    #[test]
    fn test_position_is_frame_rate_independent() {
        // Evaluating at age 1.5 gives the same answer whether the particle
        // got there in two updates or twenty; only age matters.
        let a = particle(1.5);
        let mut b = particle(0.0);
        for _ in 0..20 {
            b.age += 0.075;
        }
        let accel = Vec3::new(0.3, -9.8, 0.0);
        assert!((a.position(accel) - b.position(accel)).length() < 1e-4);
    }

    #[test]
    fn test_life_fraction_clamps() {
        assert_eq!(particle(-1.0).life_fraction(2.0), 0.0);
        assert_eq!(particle(1.0).life_fraction(2.0), 0.5);
        assert_eq!(particle(5.0).life_fraction(2.0), 1.0);
    }

    #[test]
    fn test_rotation_lerp_endpoints() {
        let p = particle(0.0);
        assert_eq!(p.rotation(0.0), 0.0);
        assert!((p.rotation(1.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((p.rotation(0.5) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}

//! The emitter: spawn scheduling, aging and retirement.
//!
//! An [`Emitter`] owns a [`ParticlePool`] and an [`EmitterConfig`] and advances
//! them with explicit `update(dt)` calls; it holds no GPU state and no clock
//! of its own, so it can be driven headless in tests and benchmarks exactly
//! as it is driven by a window loop.
//!
//! Each update runs three passes in a fixed order:
//!
//! 1. age every live particle by `dt`,
//! 2. retire expired particles oldest-first, stopping at the first survivor,
//! 3. fold `dt` into the spawn accumulator and emit one particle per full
//!    spawn interval it contains.
//!
//! Spawns that find the pool full are dropped silently; the interval is
//! still consumed so the accumulator never builds up a backlog that would
//! burst-spawn the moment a slot frees up.
//!
//! # Quick Start
//!
//! ```ignore
//! use embers::prelude::*;
//!
//! let mut emitter = Emitter::new(EmitterConfig::fire(Vec3::ZERO));
//! loop {
//!     emitter.update(delta_seconds);
//!     // expand or stream emitter.pool() ...
//! }
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::EmitterConfig;
use crate::particle::Particle;
use crate::pool::ParticlePool;

/// Lifetime counters for one emitter. Monotonic; survive `clear`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmitterStats {
    /// Particles actually written into the pool.
    pub spawned: u64,
    /// Spawns skipped because the pool was full.
    pub dropped: u64,
    /// Particles retired after exceeding their lifetime.
    pub retired: u64,
}

/// A CPU-simulated particle emitter over a fixed-capacity pool.
pub struct Emitter {
    config: EmitterConfig,
    pool: ParticlePool,
    rng: SmallRng,
    /// Seconds of spawn debt not yet converted into particles; `update`
    /// pays out the whole intervals it contains.
    accumulator: f32,
    stats: EmitterStats,
}

impl Emitter {
    /// Creates an emitter with a randomly seeded spawn RNG.
    pub fn new(config: EmitterConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Creates an emitter whose spawn randomization is reproducible: two
    /// emitters built from the same config and seed and stepped with the
    /// same deltas produce identical pools.
    pub fn with_seed(config: EmitterConfig, seed: u64) -> Self {
        let pool = ParticlePool::new(config.max_particles);
        Self {
            config,
            pool,
            rng: SmallRng::seed_from_u64(seed),
            accumulator: 0.0,
            stats: EmitterStats::default(),
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Negative deltas are treated as zero. A paused emitter ignores the
    /// call entirely, so particle ages freeze along with spawning.
    pub fn update(&mut self, dt: f32) {
        if self.config.paused {
            return;
        }
        let dt = dt.max(0.0);

        if dt > 0.0 {
            self.pool.for_each_alive_mut(|_, p| p.age += dt);
        }

        // Oldest-first retirement. Ages are monotone along the ring (spawn
        // order), so the first survivor ends the scan.
        let lifetime = self.config.lifetime();
        while let Some(oldest) = self.pool.oldest() {
            if oldest.age < lifetime {
                break;
            }
            self.pool.retire_oldest();
            self.stats.retired += 1;
        }

        self.accumulator += dt;
        let interval = self.config.seconds_per_particle();
        // Whole intervals are paid out by division, not repeated
        // subtraction: an interval below the accumulator's float
        // resolution would make the subtraction a no-op.
        let mut pending = (self.accumulator / interval) as u64;
        if pending > 0 {
            self.accumulator = (self.accumulator - pending as f32 * interval).max(0.0);
            while pending > 0 && self.spawn_one() {
                pending -= 1;
            }
            // A full pool drops the rest in one step, intervals consumed.
            self.stats.dropped = self.stats.dropped.saturating_add(pending);
        }
    }

    /// Samples and writes one particle. Returns false when the pool is full.
    fn spawn_one(&mut self) -> bool {
        let Some(index) = self.pool.try_reserve() else {
            return false;
        };

        let config = &self.config;
        let rng = &mut self.rng;
        let particle = Particle {
            start_position: config.position + jitter(rng, config.position_jitter),
            age: 0.0,
            start_velocity: config.velocity + jitter(rng, config.velocity_jitter),
            start_rotation: sample(rng, &config.start_rotation),
            end_rotation: sample(rng, &config.end_rotation),
            _pad: [0.0; 3],
        };
        *self.pool.slot_mut(index) = particle;
        self.stats.spawned += 1;
        true
    }

    // =========================================================================
    // RUNTIME CONTROLS
    // =========================================================================

    /// Replaces the pool with a fresh one of the given capacity (clamped to
    /// at least 1). All live particles are lost.
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.config.max_particles = max_particles.max(1);
        self.pool.reset(self.config.max_particles);
    }

    /// Kills every live particle and forgets accumulated spawn debt. The
    /// pool keeps its capacity and the stats keep counting.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.accumulator = 0.0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.config.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.config.paused
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.config.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.config.visible
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Live edits apply from the next `update` or draw. Pool capacity is the
    /// exception; see [`set_max_particles`](Self::set_max_particles).
    pub fn config_mut(&mut self) -> &mut EmitterConfig {
        &mut self.config
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn live_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }
}

/// Uniform sample from a closed range. Degenerate or inverted ranges
/// collapse to their start, which also covers the fixed-value case.
fn sample(rng: &mut SmallRng, range: &std::ops::Range<f32>) -> f32 {
    if range.end <= range.start {
        range.start
    } else {
        rng.gen_range(range.start..=range.end)
    }
}

/// Uniform per-axis offset in `[-extent, extent]`.
fn jitter(rng: &mut SmallRng, extent: glam::Vec3) -> glam::Vec3 {
    glam::Vec3::new(
        jitter_axis(rng, extent.x),
        jitter_axis(rng, extent.y),
        jitter_axis(rng, extent.z),
    )
}

fn jitter_axis(rng: &mut SmallRng, extent: f32) -> f32 {
    let extent = extent.abs();
    if extent <= f32::EPSILON {
        0.0
    } else {
        rng.gen_range(-extent..=extent)
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn test_config() -> EmitterConfig {
        EmitterConfig::new()
            .with_max_particles(4)
            .with_rate(2.0)
            .with_lifetime(1.0)
    }

    #[test]
    fn test_rate_accumulates_across_frames() {
        // 10 particles/second, stepped in 0.05 s slices: a spawn every
        // second frame, and never a fractional particle.
        let mut emitter = Emitter::with_seed(
            EmitterConfig::new().with_rate(10.0).with_lifetime(10.0),
            1,
        );
        let mut counts = Vec::new();
        for _ in 0..6 {
            emitter.update(0.05);
            counts.push(emitter.live_count());
        }
        assert_eq!(counts, vec![0, 1, 1, 2, 2, 3]);
    }

    #[test]
    fn test_update_order_is_age_retire_spawn() {
        // capacity 4, 2/s, lifetime 1.0, three 0.6 s steps.
        let mut emitter = Emitter::with_seed(test_config(), 7);

        emitter.update(0.6);
        assert_eq!(emitter.live_count(), 1);

        emitter.update(0.6);
        assert_eq!(emitter.live_count(), 2);
        assert_eq!(emitter.stats().retired, 0);

        // Third step ages the first particle to 1.2 s; it must retire even
        // though a new spawn lands in the same update.
        emitter.update(0.6);
        assert_eq!(emitter.live_count(), 2);
        assert_eq!(emitter.stats().retired, 1);
        assert_eq!(emitter.stats().spawned, 3);
    }

    #[test]
    fn test_full_pool_drops_silently_and_consumes_interval() {
        // Rate 128/s keeps the spawn interval a power of two, so the
        // accumulator math below is exact.
        let config = EmitterConfig::new()
            .with_max_particles(1)
            .with_rate(128.0)
            .with_lifetime(100.0);
        let mut emitter = Emitter::with_seed(config, 3);

        emitter.update(0.09375); // 12 spawn intervals
        assert_eq!(emitter.live_count(), 1);
        let stats = emitter.stats();
        assert_eq!(stats.spawned, 1);
        assert_eq!(stats.dropped, 11);

        // The dropped intervals were consumed, not banked: another update
        // emits only what its own dt pays for.
        emitter.update(1.0 / 128.0);
        assert_eq!(emitter.stats().dropped, 12);
    }

    #[test]
    fn test_extreme_rate_saturates_pool_in_one_update() {
        // The spawn interval at this rate sits far below the accumulator's
        // float resolution; the payout still has to complete and fill the
        // pool, with the uncountable rest dropped.
        let config = EmitterConfig::new()
            .with_max_particles(4)
            .with_rate(1e10)
            .with_lifetime(100.0);
        let mut emitter = Emitter::with_seed(config, 5);

        emitter.update(1.0 / 64.0);
        assert_eq!(emitter.live_count(), 4);
        assert_eq!(emitter.stats().spawned, 4);
        assert!(emitter.stats().dropped > 1_000_000);

        emitter.update(1.0 / 64.0);
        assert_eq!(emitter.live_count(), 4);
        assert_eq!(emitter.stats().spawned, 4);
    }

    #[test]
    fn test_live_count_never_exceeds_capacity() {
        let config = EmitterConfig::new()
            .with_max_particles(50)
            .with_rate(64.0)
            .with_lifetime(1000.0);
        let mut emitter = Emitter::with_seed(config, 9);
        emitter.update(10.0); // 640 spawn intervals, exactly
        assert_eq!(emitter.live_count(), 50);
        assert_eq!(emitter.stats().dropped, 590);
    }

    #[test]
    fn test_pause_freezes_ages_and_spawning() {
        let mut emitter = Emitter::with_seed(test_config(), 5);
        emitter.update(0.6);
        let age_before = emitter.pool().oldest().unwrap().age;

        emitter.set_paused(true);
        for _ in 0..10 {
            emitter.update(0.6);
        }
        assert_eq!(emitter.live_count(), 1);
        assert_eq!(emitter.pool().oldest().unwrap().age, age_before);

        // Resuming picks up where the simulation left off, with no burst
        // from the paused wall time.
        emitter.set_paused(false);
        emitter.update(0.0);
        assert_eq!(emitter.live_count(), 1);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut emitter = Emitter::with_seed(test_config(), 5);
        emitter.update(0.6);
        let age_before = emitter.pool().oldest().unwrap().age;
        emitter.update(-5.0);
        assert_eq!(emitter.pool().oldest().unwrap().age, age_before);
        assert_eq!(emitter.live_count(), 1);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = Emitter::with_seed(EmitterConfig::sparks(Vec3::ZERO), 42);
        let mut b = Emitter::with_seed(EmitterConfig::sparks(Vec3::ZERO), 42);
        for _ in 0..30 {
            a.update(0.016);
            b.update(0.016);
        }
        assert_eq!(a.live_count(), b.live_count());
        let mut pairs = Vec::new();
        a.pool().for_each_alive(|index, p| pairs.push((index, *p)));
        b.pool().for_each_alive(|index, p| {
            let (expected_index, expected) = pairs.remove(0);
            assert_eq!(index, expected_index);
            assert_eq!(*p, expected);
        });
    }

    #[test]
    fn test_different_seeds_diverge() {
        let config = EmitterConfig::sparks(Vec3::ZERO);
        let mut a = Emitter::with_seed(config.clone(), 1);
        let mut b = Emitter::with_seed(config, 2);
        a.update(0.5);
        b.update(0.5);
        let mut velocities_a = Vec::new();
        a.pool().for_each_alive(|_, p| velocities_a.push(p.start_velocity));
        let mut any_different = false;
        let mut i = 0;
        b.pool().for_each_alive(|_, p| {
            if velocities_a[i] != p.start_velocity {
                any_different = true;
            }
            i += 1;
        });
        assert!(any_different);
    }

    #[test]
    fn test_set_max_particles_resets_pool() {
        let mut emitter = Emitter::with_seed(test_config(), 5);
        emitter.update(2.0);
        assert!(emitter.live_count() > 0);

        emitter.set_max_particles(16);
        assert_eq!(emitter.capacity(), 16);
        assert_eq!(emitter.live_count(), 0);

        emitter.set_max_particles(0);
        assert_eq!(emitter.capacity(), 1);
    }

    #[test]
    fn test_clear_drops_particles_and_debt() {
        let mut emitter = Emitter::with_seed(test_config(), 5);
        emitter.update(0.9); // one spawn, 0.4 s of debt
        emitter.clear();
        assert_eq!(emitter.live_count(), 0);
        // Immediately after clear, a tiny step spawns nothing.
        emitter.update(0.1);
        assert_eq!(emitter.live_count(), 0);
    }

    #[test]
    fn test_jitter_stays_within_extent() {
        let config = EmitterConfig::new()
            .with_rate(1000.0)
            .with_lifetime(100.0)
            .with_max_particles(2000)
            .with_position(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.25));
        let mut emitter = Emitter::with_seed(config, 11);
        emitter.update(1.0);
        emitter.pool().for_each_alive(|_, p| {
            assert!((p.start_position.x - 5.0).abs() <= 0.5 + 1e-5);
            assert_eq!(p.start_position.y, 0.0);
            assert!(p.start_position.z.abs() <= 0.25 + 1e-5);
        });
    }
}

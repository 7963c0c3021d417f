//! Fixed-capacity circular particle pool.
//!
//! Live particles occupy one contiguous run of slots in ring order, from
//! `first_alive` up to (but not including) `first_dead`, wrapping at
//! capacity. Spawning takes the slot at `first_dead`, retirement frees the
//! slot at `first_alive`, so particles always die oldest-first and the live
//! run never fragments. Because the two cursors are equal both when the pool
//! is empty and when it is full, a separate live counter disambiguates.
//!
//! The pool never allocates after construction and never shuffles records:
//! a spawn and a retire are both O(1) cursor bumps. That also means slots
//! outside the live run still hold stale bytes; the pool only hands out
//! indices that are inside the live run or were just reserved.

use std::ops::Range;

use bytemuck::Zeroable;

use crate::particle::Particle;

/// Ring buffer of particle records with oldest-first retirement.
pub struct ParticlePool {
    slots: Vec<Particle>,
    /// Slot of the oldest live particle. Meaningless when `live == 0`.
    first_alive: usize,
    /// Slot the next spawn will take.
    first_dead: usize,
    live: usize,
}

impl ParticlePool {
    /// Creates a pool with all slots free. Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![Particle::zeroed(); capacity],
            first_alive: 0,
            first_dead: 0,
            live: 0,
        }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live particles.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.live == self.slots.len()
    }

    /// Drops every live particle but keeps the allocation.
    pub fn clear(&mut self) {
        self.first_alive = 0;
        self.first_dead = 0;
        self.live = 0;
    }

    /// Reallocates to `capacity` slots and drops every live particle.
    ///
    /// Existing particles are not migrated. Capacity is clamped to at
    /// least 1.
    pub fn reset(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        self.slots.clear();
        self.slots.resize(capacity, Particle::zeroed());
        self.clear();
    }

    /// Claims the next free slot and returns its index, or `None` when the
    /// pool is full.
    ///
    /// The slot still holds whatever record last lived there; the caller is
    /// expected to overwrite it via [`slot_mut`](Self::slot_mut) before the
    /// next iteration pass.
    pub fn try_reserve(&mut self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        let index = self.first_dead;
        self.first_dead = self.wrap(self.first_dead + 1);
        self.live += 1;
        Some(index)
    }

    /// The oldest live particle, if any.
    #[inline]
    pub fn oldest(&self) -> Option<&Particle> {
        if self.live == 0 {
            None
        } else {
            Some(&self.slots[self.first_alive])
        }
    }

    /// Frees the oldest live particle's slot.
    ///
    /// Must only be called when at least one particle is live.
    pub fn retire_oldest(&mut self) {
        debug_assert!(self.live > 0, "retire on empty pool");
        self.first_alive = self.wrap(self.first_alive + 1);
        self.live -= 1;
    }

    /// Borrow a slot. Only indices inside the live run (or just returned by
    /// [`try_reserve`](Self::try_reserve)) hold meaningful records.
    #[inline]
    pub fn slot(&self, index: usize) -> &Particle {
        &self.slots[index]
    }

    /// Mutably borrow a slot. Same validity rule as [`slot`](Self::slot).
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.slots[index]
    }

    /// The live run as at most two index ranges, oldest first.
    ///
    /// The second range is present only when the run wraps past the end of
    /// the slot array; it always starts at slot 0. A full pool whose cursors
    /// coincide is reported as wrapped, covering every slot exactly once.
    pub fn alive_ranges(&self) -> (Range<usize>, Option<Range<usize>>) {
        if self.live == 0 {
            (0..0, None)
        } else if self.first_alive < self.first_dead {
            (self.first_alive..self.first_dead, None)
        } else {
            (self.first_alive..self.slots.len(), Some(0..self.first_dead))
        }
    }

    /// The live run as at most two slices, oldest first. The second slice is
    /// empty unless the run wraps.
    ///
    /// Uploading these back to back reproduces emission order in a contiguous
    /// destination buffer.
    pub fn alive_slices(&self) -> (&[Particle], &[Particle]) {
        let (head, tail) = self.alive_ranges();
        match tail {
            Some(tail) => (&self.slots[head], &self.slots[tail]),
            None => (&self.slots[head], &[]),
        }
    }

    /// Visits every live particle in emission order (oldest first).
    pub fn for_each_alive(&self, mut visit: impl FnMut(usize, &Particle)) {
        let (head, tail) = self.alive_ranges();
        for index in head {
            visit(index, &self.slots[index]);
        }
        if let Some(tail) = tail {
            for index in tail {
                visit(index, &self.slots[index]);
            }
        }
    }

    /// Visits every live particle mutably in emission order (oldest first).
    pub fn for_each_alive_mut(&mut self, mut visit: impl FnMut(usize, &mut Particle)) {
        let (head, tail) = self.alive_ranges();
        for index in head {
            visit(index, &mut self.slots[index]);
        }
        if let Some(tail) = tail {
            for index in tail {
                visit(index, &mut self.slots[index]);
            }
        }
    }

    #[inline]
    fn wrap(&self, index: usize) -> usize {
        // Capacity is never 0, so the modulo is safe.
        index % self.slots.len()
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn visit_order(pool: &ParticlePool) -> Vec<usize> {
        let mut order = Vec::new();
        pool.for_each_alive(|index, _| order.push(index));
        order
    }

    #[test]
    fn test_new_pool_is_empty() {
        let pool = ParticlePool::new(8);
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.live_count(), 0);
        assert!(pool.is_empty());
        assert!(!pool.is_full());
        assert!(pool.oldest().is_none());
        assert_eq!(pool.alive_ranges(), (0..0, None));
        assert!(visit_order(&pool).is_empty());
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let pool = ParticlePool::new(0);
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_reserve_fills_in_slot_order() {
        let mut pool = ParticlePool::new(4);
        assert_eq!(pool.try_reserve(), Some(0));
        assert_eq!(pool.try_reserve(), Some(1));
        assert_eq!(pool.try_reserve(), Some(2));
        assert_eq!(pool.live_count(), 3);
        assert_eq!(visit_order(&pool), vec![0, 1, 2]);
    }

    #[test]
    fn test_reserve_on_full_pool_fails() {
        let mut pool = ParticlePool::new(2);
        assert!(pool.try_reserve().is_some());
        assert!(pool.try_reserve().is_some());
        assert!(pool.is_full());
        assert_eq!(pool.try_reserve(), None);
        // Failure must not disturb the cursors.
        assert_eq!(pool.live_count(), 2);
        assert_eq!(visit_order(&pool), vec![0, 1]);
    }

    #[test]
    fn test_full_pool_with_coincident_cursors_iterates_all() {
        // After 4 spawns both cursors sit at 0; the live counter is what
        // distinguishes this state from an empty pool.
        let mut pool = ParticlePool::new(4);
        for _ in 0..4 {
            pool.try_reserve();
        }
        assert!(pool.is_full());
        assert_eq!(pool.alive_ranges(), (0..4, Some(0..0)));
        assert_eq!(visit_order(&pool), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_retire_advances_oldest() {
        let mut pool = ParticlePool::new(4);
        for age in 0..3 {
            let index = pool.try_reserve().unwrap();
            pool.slot_mut(index).age = age as f32;
        }
        pool.retire_oldest();
        assert_eq!(pool.live_count(), 2);
        assert_eq!(pool.oldest().unwrap().age, 1.0);
        assert_eq!(visit_order(&pool), vec![1, 2]);
    }

    #[test]
    fn test_wrapped_run_iterates_oldest_first() {
        let mut pool = ParticlePool::new(4);
        for _ in 0..4 {
            pool.try_reserve();
        }
        pool.retire_oldest();
        pool.retire_oldest();
        // Slots 0 and 1 are free again; the next spawns wrap around.
        assert_eq!(pool.try_reserve(), Some(0));
        assert_eq!(pool.try_reserve(), Some(1));
        assert_eq!(pool.alive_ranges(), (2..4, Some(0..2)));
        assert_eq!(visit_order(&pool), vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_alive_slices_match_ranges() {
        let mut pool = ParticlePool::new(3);
        for age in 0..3 {
            let index = pool.try_reserve().unwrap();
            pool.slot_mut(index).age = age as f32;
        }
        pool.retire_oldest();
        let index = pool.try_reserve().unwrap();
        pool.slot_mut(index).age = 3.0;

        let (head, tail) = pool.alive_slices();
        let ages: Vec<f32> = head.iter().chain(tail.iter()).map(|p| p.age).collect();
        assert_eq!(ages, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut pool = ParticlePool::new(4);
        pool.try_reserve();
        pool.try_reserve();
        pool.clear();
        assert_eq!(pool.capacity(), 4);
        assert!(pool.is_empty());
        assert_eq!(pool.try_reserve(), Some(0));
    }

    #[test]
    fn test_reset_reallocates_and_empties() {
        let mut pool = ParticlePool::new(4);
        for _ in 0..4 {
            pool.try_reserve();
        }
        pool.reset(7);
        assert_eq!(pool.capacity(), 7);
        assert!(pool.is_empty());
        pool.reset(0);
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn test_for_each_alive_mut_visits_live_only() {
        let mut pool = ParticlePool::new(4);
        for _ in 0..3 {
            pool.try_reserve();
        }
        pool.retire_oldest();
        pool.for_each_alive_mut(|_, p| p.age += 1.0);
        assert_eq!(pool.slot(0).age, 0.0);
        assert_eq!(pool.slot(1).age, 1.0);
        assert_eq!(pool.slot(2).age, 1.0);
    }

    #[test]
    fn test_random_walk_matches_queue_model() {
        // Drive the ring through a long random spawn/retire sequence and
        // check it against a simple FIFO model at every step.
        let mut rng = SmallRng::seed_from_u64(0xDECADE);
        let mut pool = ParticlePool::new(5);
        let mut model: std::collections::VecDeque<u32> = std::collections::VecDeque::new();
        let mut serial = 0u32;

        for _ in 0..10_000 {
            if rng.gen_bool(0.55) {
                match pool.try_reserve() {
                    Some(index) => {
                        pool.slot_mut(index).age = serial as f32;
                        model.push_back(serial);
                        serial += 1;
                    }
                    None => assert_eq!(model.len(), pool.capacity()),
                }
            } else if !pool.is_empty() {
                pool.retire_oldest();
                model.pop_front();
            }

            assert_eq!(pool.live_count(), model.len());
            let seen: Vec<u32> = {
                let mut ages = Vec::new();
                pool.for_each_alive(|_, p| ages.push(p.age as u32));
                ages
            };
            let expected: Vec<u32> = model.iter().copied().collect();
            assert_eq!(seen, expected, "ring order diverged from FIFO model");

            let (head, tail) = pool.alive_ranges();
            let counted = head.len() + tail.map_or(0, |t| t.len());
            assert_eq!(counted, pool.live_count());
        }
    }
}

//! Fixed-capacity entity pool with O(1) slot reuse.
//!
//! Every slot is built once, up front, from a factory closure. Acquiring a
//! slot pops an index from a ring of free indices; entities deactivate
//! themselves and the per-tick sweep puts their index back on the ring the
//! first time it sees them inactive. Nothing is allocated after construction.

use std::collections::VecDeque;

/// Capability an entity needs to live in an [`EntityPool`].
pub trait Poolable {
    /// Whatever the entity needs from the outside world during a tick.
    type Context<'a>;

    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Per-tick update, only called while active.
    fn update(&mut self, dt: f32, ctx: &mut Self::Context<'_>);

    /// Called once by the sweep when the entity is found newly inactive.
    fn retire(&mut self, _ctx: &mut Self::Context<'_>) {}
}

/// Stable reference to a pool slot.
///
/// The generation changes every time the slot is handed out again, so a
/// handle kept past its entity's lifetime resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    pub index: u32,
    pub generation: u32,
}

impl PoolHandle {
    /// Pack into 64 bits (generation high, index low).
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    entity: T,
    generation: u32,
    /// Active as of the last acquire/sweep. The sweep compares this against
    /// the entity's own flag to spot slots that went inactive since.
    tracked_active: bool,
}

/// Contiguous pool of `T` with a ring of free slot indices.
#[derive(Debug)]
pub struct EntityPool<T> {
    slots: Vec<Slot<T>>,
    free: VecDeque<u32>,
}

impl<T: Poolable> EntityPool<T> {
    /// Build `capacity` entities with `factory(index)`, all inactive.
    ///
    /// # Panics
    /// If `capacity` is zero or does not fit a `u32` index.
    pub fn new(capacity: usize, mut factory: impl FnMut(usize) -> T) -> Self {
        assert!(capacity > 0, "entity pool capacity must be > 0");
        assert!(
            u32::try_from(capacity).is_ok(),
            "entity pool capacity {capacity} exceeds u32 indices"
        );

        let mut slots = Vec::with_capacity(capacity);
        let mut free = VecDeque::with_capacity(capacity);
        for index in 0..capacity {
            let mut entity = factory(index);
            entity.set_active(false);
            slots.push(Slot {
                entity,
                generation: 0,
                tracked_active: false,
            });
            free.push_back(index as u32);
        }
        Self { slots, free }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slots ready to be acquired.
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.entity.is_active()).count()
    }

    /// Activate a free slot. `None` when the pool is exhausted, which callers
    /// treat as "spawn nothing".
    pub fn acquire(&mut self) -> Option<(PoolHandle, &mut T)> {
        let index = self.free.pop_front()?;
        let slot = &mut self.slots[index as usize];
        debug_assert!(!slot.tracked_active, "slot {index} was free and active");
        slot.generation = slot.generation.wrapping_add(1);
        slot.tracked_active = true;
        slot.entity.set_active(true);
        let handle = PoolHandle {
            index,
            generation: slot.generation,
        };
        Some((handle, &mut slot.entity))
    }

    /// Mark the entity inactive. Its slot becomes acquirable after the next
    /// sweep. Stale handles are ignored.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        match self.get_mut(handle) {
            Some(entity) => {
                entity.set_active(false);
                true
            }
            None => false,
        }
    }

    fn slot_for(&self, handle: PoolHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.entity.is_active())
    }

    /// Entity behind `handle` if the handle is current and the entity active.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slot_for(handle).map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.entity.is_active())
            .map(|slot| &mut slot.entity)
    }

    /// Update every active entity, then recycle the slots of entities that
    /// went inactive since the last sweep (including during this update).
    pub fn update_all(&mut self, dt: f32, ctx: &mut T::Context<'_>) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entity.is_active() {
                slot.entity.update(dt, ctx);
            }
            if slot.tracked_active && !slot.entity.is_active() {
                slot.tracked_active = false;
                slot.entity.retire(ctx);
                self.free.push_back(index as u32);
            }
        }
        debug_assert!(self.free.len() <= self.slots.len());
    }

    /// Active entities with their handles, in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity.is_active().then_some((
                PoolHandle {
                    index: index as u32,
                    generation: slot.generation,
                },
                &slot.entity,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Counts down and deactivates itself at zero.
    #[derive(Debug, Default)]
    struct Countdown {
        active: bool,
        ticks_left: u32,
        updates: u32,
    }

    #[derive(Default)]
    struct Retired(Vec<u32>);

    impl Poolable for Countdown {
        type Context<'a> = Retired;

        fn is_active(&self) -> bool {
            self.active
        }

        fn set_active(&mut self, active: bool) {
            self.active = active;
        }

        fn update(&mut self, _dt: f32, _ctx: &mut Retired) {
            self.updates += 1;
            self.ticks_left = self.ticks_left.saturating_sub(1);
            if self.ticks_left == 0 {
                self.active = false;
            }
        }

        fn retire(&mut self, ctx: &mut Retired) {
            ctx.0.push(self.updates);
        }
    }

    fn pool(capacity: usize) -> EntityPool<Countdown> {
        EntityPool::new(capacity, |_| Countdown::default())
    }

    #[test]
    fn starts_fully_free() {
        let p = pool(4);
        assert_eq!(p.capacity(), 4);
        assert_eq!(p.free_count(), 4);
        assert_eq!(p.active_count(), 0);
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut p = pool(2);
        assert!(p.acquire().is_some());
        assert!(p.acquire().is_some());
        assert!(p.acquire().is_none());
    }

    #[test]
    fn slots_are_reused_after_sweep() {
        let capacity = 8;
        let mut p = pool(capacity);
        let mut ctx = Retired::default();

        let first: Vec<PoolHandle> = (0..capacity)
            .map(|_| {
                let (h, e) = p.acquire().expect("pool should have room");
                e.ticks_left = 1;
                h
            })
            .collect();
        assert!(p.acquire().is_none());

        // Every entity expires on this sweep and is recycled exactly once.
        p.update_all(0.1, &mut ctx);
        assert_eq!(p.free_count(), capacity);
        assert_eq!(ctx.0.len(), capacity);

        let mut live = HashSet::new();
        for _ in 0..capacity {
            let (h, e) = p.acquire().expect("recycled slot");
            e.ticks_left = 100;
            assert!(live.insert(h.index), "slot {} handed out twice", h.index);
        }
        assert!(p.acquire().is_none());

        // Old handles no longer resolve.
        for h in first {
            assert!(p.get(h).is_none());
        }
    }

    #[test]
    fn repeated_sweeps_do_not_double_enqueue() {
        let mut p = pool(3);
        let mut ctx = Retired::default();
        let (h, e) = p.acquire().unwrap();
        e.ticks_left = 100;
        assert!(p.release(h));
        for _ in 0..5 {
            p.update_all(0.1, &mut ctx);
        }
        assert_eq!(p.free_count(), 3);
        assert_eq!(ctx.0.len(), 1);
        assert!(!p.release(h));
    }

    #[test]
    fn only_active_entities_update() {
        let mut p = pool(4);
        let mut ctx = Retired::default();
        let (h, e) = p.acquire().unwrap();
        e.ticks_left = 3;
        p.update_all(0.1, &mut ctx);
        p.update_all(0.1, &mut ctx);
        assert_eq!(p.get(h).map(|e| e.updates), Some(2));
        assert_eq!(p.iter_active().count(), 1);
        p.update_all(0.1, &mut ctx);
        assert_eq!(p.iter_active().count(), 0);
        assert_eq!(ctx.0, vec![3]);
    }

    #[test]
    fn released_slot_waits_for_the_sweep() {
        let mut p = pool(1);
        let mut ctx = Retired::default();
        let (h, e) = p.acquire().unwrap();
        e.ticks_left = 10;
        p.release(h);
        assert!(p.acquire().is_none());
        p.update_all(0.1, &mut ctx);
        let (h2, _) = p.acquire().unwrap();
        assert_eq!(h2.index, h.index);
        assert_ne!(h2.generation, h.generation);
    }

    #[test]
    fn handle_bits_round_trip() {
        let h = PoolHandle {
            index: 5999,
            generation: 0xDEAD_BEEF,
        };
        assert_eq!(PoolHandle::from_bits(h.to_bits()), h);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_is_rejected() {
        let _ = pool(0);
    }
}

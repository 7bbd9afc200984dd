//! Timed asteroid spawning.
//!
//! Every `interval` seconds a burst of asteroids is launched into a shell
//! centred some distance ahead of the craft, so the field keeps streaming
//! toward the player however it turns. An exhausted pool simply spawns
//! nothing.

use engine_core::{EntityPool, PoolHandle, Quat, Randomizer, Transform};
use physics::PhysicsWorld;

use crate::asteroid::{Asteroid, AsteroidLaunch};
use crate::config::SpawnConfig;

/// Manages continuous asteroid spawning.
pub struct ObstacleSpawner {
    config: SpawnConfig,
    /// Accumulator for spawn timing.
    timer: f32,
    rng: Randomizer,
    /// Asteroids launched so far.
    spawned: u64,
    /// Spawns dropped because the pool was full.
    suppressed: u64,
}

impl ObstacleSpawner {
    pub fn new(config: SpawnConfig, rng: Randomizer) -> Self {
        Self {
            config,
            timer: 0.0,
            rng,
            spawned: 0,
            suppressed: 0,
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// Tick the spawn clock by a frame. Returns how many asteroids launched.
    pub fn update(
        &mut self,
        dt: f32,
        craft: &Transform,
        pool: &mut EntityPool<Asteroid>,
        physics: &mut PhysicsWorld,
    ) -> usize {
        self.timer += dt;
        if self.timer < self.config.interval {
            return 0;
        }
        self.timer = 0.0;
        self.spawn_burst(self.config.per_burst, craft, pool, physics)
    }

    /// Launch up to `count` asteroids at once.
    pub fn spawn_burst(
        &mut self,
        count: usize,
        craft: &Transform,
        pool: &mut EntityPool<Asteroid>,
        physics: &mut PhysicsWorld,
    ) -> usize {
        (0..count)
            .filter(|_| self.spawn_one(craft, pool, physics).is_some())
            .count()
    }

    /// Launch one asteroid, or nothing if the pool is exhausted.
    pub fn spawn_one(
        &mut self,
        craft: &Transform,
        pool: &mut EntityPool<Asteroid>,
        physics: &mut PhysicsWorld,
    ) -> Option<PoolHandle> {
        let Some((handle, asteroid)) = pool.acquire() else {
            self.suppressed += 1;
            log::trace!("Asteroid pool exhausted, spawn skipped");
            return None;
        };

        let launch = self.random_launch(craft);
        asteroid.launch(handle, &launch, physics);
        self.spawned += 1;
        log::trace!(
            "Spawned asteroid {}#{} at {} (scale {:.1})",
            handle.index,
            handle.generation,
            launch.position,
            launch.scale
        );
        Some(handle)
    }

    fn random_launch(&mut self, craft: &Transform) -> AsteroidLaunch {
        let c = &self.config;
        let rng = &mut self.rng;
        let center = craft.position + craft.forward() * c.lead_distance;
        let position = center + rng.in_shell(c.min_radius, c.max_radius);
        let rotation = Quat::from_axis_angle(rng.unit_vector(), rng.range(0.0, std::f32::consts::TAU));
        let velocity = rng.unit_vector() * rng.range(c.min_speed, c.max_speed);
        let angular_velocity = rng.unit_vector() * rng.range(0.0, c.max_angular_speed);
        let scale = rng.range(c.min_scale, c.max_scale);
        AsteroidLaunch {
            position,
            rotation,
            velocity,
            angular_velocity,
            scale,
            lifetime: c.lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Vec3;

    fn config() -> SpawnConfig {
        SpawnConfig {
            pool_capacity: 8,
            interval: 0.1,
            per_burst: 3,
            ..Default::default()
        }
    }

    fn setup() -> (ObstacleSpawner, EntityPool<Asteroid>, PhysicsWorld) {
        let config = config();
        let pool = EntityPool::new(config.pool_capacity, |_| Asteroid::detached());
        let spawner = ObstacleSpawner::new(config, Randomizer::seeded(3));
        (spawner, pool, PhysicsWorld::new())
    }

    #[test]
    fn bursts_follow_the_interval() {
        let (mut spawner, mut pool, mut physics) = setup();
        let craft = Transform::default();
        assert_eq!(spawner.update(0.05, &craft, &mut pool, &mut physics), 0);
        assert_eq!(spawner.update(0.06, &craft, &mut pool, &mut physics), 3);
        assert_eq!(spawner.update(0.05, &craft, &mut pool, &mut physics), 0);
        assert_eq!(pool.active_count(), 3);
    }

    #[test]
    fn exhaustion_is_silent() {
        let (mut spawner, mut pool, mut physics) = setup();
        let craft = Transform::default();
        assert_eq!(spawner.spawn_burst(10, &craft, &mut pool, &mut physics), 8);
        assert_eq!(spawner.spawned(), 8);
        assert_eq!(spawner.suppressed(), 2);
        assert!(spawner.spawn_one(&craft, &mut pool, &mut physics).is_none());
    }

    #[test]
    fn asteroids_land_in_the_shell_ahead() {
        let (mut spawner, mut pool, mut physics) = setup();
        let craft = Transform::from_position(Vec3::new(10.0, 0.0, 0.0));
        spawner.spawn_burst(8, &craft, &mut pool, &mut physics);
        let c = config();
        let center = Vec3::new(10.0, 0.0, -c.lead_distance);
        for (_, rock) in pool.iter_active() {
            let r = rock.position().distance(center);
            assert!(r >= c.min_radius - 1e-2 && r <= c.max_radius + 1e-2, "r = {r}");
            assert!(rock.scale() >= c.min_scale && rock.scale() <= c.max_scale);
        }
    }

    #[test]
    fn same_seed_same_field() {
        let (mut a, mut pool_a, mut physics_a) = setup();
        let (mut b, mut pool_b, mut physics_b) = setup();
        let craft = Transform::default();
        a.spawn_burst(5, &craft, &mut pool_a, &mut physics_a);
        b.spawn_burst(5, &craft, &mut pool_b, &mut physics_b);
        let pa: Vec<Vec3> = pool_a.iter_active().map(|(_, r)| r.position()).collect();
        let pb: Vec<Vec3> = pool_b.iter_active().map(|(_, r)| r.position()).collect();
        assert_eq!(pa, pb);
    }
}

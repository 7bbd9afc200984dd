//! Simulation root: owns the craft, the asteroid field, physics and camera.

use std::time::Duration;

use engine_core::{EntityPool, FixedStepIntegrator, Mat4, PoolHandle, Randomizer, Transform, Vec3};
use input::PilotIntents;
use physics::{CollisionPair, PhysicsWorld};
use renderer::{ChaseCamera, DrawItem, Drawable, FrameView, Projection, RenderSink};

use crate::asteroid::{Asteroid, AsteroidContext};
use crate::config::GameConfig;
use crate::craft::Craft;
use crate::entity::EntityId;
use crate::spawner::ObstacleSpawner;

/// Half the edge length of the sky cube.
const SPACE_BOX_HALF_EXTENT: f32 = 2.0e5;
const LIGHT_POSITION: Vec3 = Vec3::new(0.0, 1000.0, 0.0);
const LIGHT_COLOR: Vec3 = Vec3::ONE;

/// What one `World::update` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub physics_steps: u32,
    pub spawned: usize,
    pub craft_hits: u32,
}

pub struct World {
    physics: PhysicsWorld,
    integrator: FixedStepIntegrator,
    craft: Craft,
    asteroids: EntityPool<Asteroid>,
    spawner: ObstacleSpawner,
    camera: ChaseCamera,
    projection: Projection,
    despawn_distance: f32,
}

impl World {
    /// Build everything and launch the initial asteroid burst.
    ///
    /// # Panics
    /// If `config` fails validation; call [`GameConfig::validate`] first to
    /// get the error instead.
    pub fn new(config: &GameConfig) -> Self {
        if let Err(err) = config.validate() {
            panic!("invalid game config: {err}");
        }

        let mut physics = PhysicsWorld::new();
        let craft = Craft::spawn(&config.craft, Transform::default(), &mut physics);
        let mut asteroids = EntityPool::new(config.spawn.pool_capacity, |_| {
            Asteroid::with_body(&mut physics)
        });
        let mut spawner = ObstacleSpawner::new(config.spawn.clone(), Randomizer::new(config.seed));
        let launched = spawner.spawn_burst(
            config.spawn.initial_burst,
            craft.flight.current(),
            &mut asteroids,
            &mut physics,
        );

        let camera = ChaseCamera::new(
            craft.flight.camera_target(0.0),
            config.camera.chase.clone(),
            config.camera.forward_offset,
            config.camera.up_offset,
        );

        log::info!(
            "World ready: {} Hz physics, {} pooled asteroids, {} launched",
            config.physics_hz,
            asteroids.capacity(),
            launched
        );

        Self {
            physics,
            integrator: FixedStepIntegrator::with_rate(config.physics_hz),
            craft,
            asteroids,
            spawner,
            camera,
            projection: config.projection,
            despawn_distance: config.spawn.despawn_distance,
        }
    }

    /// Advance the simulation by one rendered frame.
    pub fn update(&mut self, frame: Duration, intents: &PilotIntents) -> FrameReport {
        let Self {
            physics,
            integrator,
            craft,
            asteroids,
            spawner,
            camera,
            despawn_distance,
            ..
        } = self;

        craft.flight.set_intents(*intents);
        let hits_before = craft.hits();

        let physics_steps = integrator.advance(frame, |dt| {
            craft.flight.update(dt, physics);
            physics.step(dt);
            {
                let mut ctx = AsteroidContext {
                    physics: &mut *physics,
                    craft_position: craft.position(),
                    despawn_distance: *despawn_distance,
                };
                asteroids.update_all(dt, &mut ctx);
            }
            for pair in physics.drain_collisions() {
                dispatch_collision(pair, craft, asteroids, physics);
            }
        });

        let frame_dt = frame.as_secs_f32();
        let spawned = spawner.update(frame_dt, craft.flight.current(), asteroids, physics);

        craft.blink.update(frame_dt);
        let alpha = integrator.interpolation_factor();
        camera.update_view_matrix(craft.flight.camera_target(alpha), frame_dt);

        FrameReport {
            physics_steps,
            spawned,
            craft_hits: craft.hits() - hits_before,
        }
    }

    /// Submit the frame: sky box, craft, then every active asteroid.
    pub fn render(&self, sink: &mut impl RenderSink) {
        let alpha = self.integrator.interpolation_factor();
        sink.begin_frame(&FrameView {
            camera_position: self.camera.position(),
            view: self.camera.view_matrix(),
            projection: self.projection.matrix(),
            light_position: LIGHT_POSITION,
            light_color: LIGHT_COLOR,
        });

        sink.draw(
            &DrawItem::new(
                Drawable::SpaceBox,
                Mat4::from_scale(Vec3::splat(SPACE_BOX_HALF_EXTENT)),
            )
            .with_force_ambient(true),
        );
        sink.draw(
            &DrawItem::new(Drawable::Craft, self.craft.render_transform(alpha).to_matrix())
                .with_visible(self.craft.blink.visible()),
        );
        for (_, asteroid) in self.asteroids.iter_active() {
            sink.draw(&DrawItem::new(
                Drawable::Asteroid,
                asteroid.render_transform(alpha).to_matrix(),
            ));
        }
    }

    pub fn craft(&self) -> &Craft {
        &self.craft
    }

    pub fn craft_destroyed(&self) -> bool {
        self.craft.is_destroyed()
    }

    pub fn camera(&self) -> &ChaseCamera {
        &self.camera
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn asteroids(&self) -> &EntityPool<Asteroid> {
        &self.asteroids
    }

    pub fn spawner(&self) -> &ObstacleSpawner {
        &self.spawner
    }

    pub fn interpolation_factor(&self) -> f32 {
        self.integrator.interpolation_factor()
    }

    pub fn total_steps(&self) -> u64 {
        self.integrator.total_steps()
    }
}

/// Route a contact start to the entities involved.
fn dispatch_collision(
    pair: CollisionPair,
    craft: &mut Craft,
    asteroids: &mut EntityPool<Asteroid>,
    physics: &mut PhysicsWorld,
) {
    let ids = (
        EntityId::from_user_data(pair.first),
        EntityId::from_user_data(pair.second),
    );
    match ids {
        (Some(EntityId::Craft), Some(EntityId::Obstacle(handle)))
        | (Some(EntityId::Obstacle(handle)), Some(EntityId::Craft)) => {
            craft_hits_obstacle(handle, craft, asteroids, physics);
        }
        // The physics engine already resolves rock-on-rock contacts.
        (Some(EntityId::Obstacle(_)), Some(EntityId::Obstacle(_))) => {}
        _ => log::trace!("Ignoring contact between {:?}", ids),
    }
}

fn craft_hits_obstacle(
    handle: PoolHandle,
    craft: &mut Craft,
    asteroids: &mut EntityPool<Asteroid>,
    physics: &mut PhysicsWorld,
) {
    // A stale handle means the asteroid already went away this tick.
    let Some(asteroid) = asteroids.get_mut(handle) else {
        return;
    };
    log::debug!("Craft struck asteroid {} at {:.1}", handle.index, asteroid.position());
    asteroid.despawn(physics);
    craft.hit();
}

//! Pooled asteroid obstacles.

use engine_core::{Lifetime, PoolHandle, Poolable, Quat, Transform, Vec3};
use physics::{ColliderShape, CollisionGroup, PhysicsBody, PhysicsWorld};

use crate::entity::EntityId;

/// What an asteroid needs from the world during a tick.
pub struct AsteroidContext<'a> {
    pub physics: &'a mut PhysicsWorld,
    pub craft_position: Vec3,
    pub despawn_distance: f32,
}

/// Where and how a freshly acquired asteroid starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidLaunch {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Edge length of the cube.
    pub scale: f32,
    pub lifetime: f32,
}

#[derive(Debug)]
pub struct Asteroid {
    active: bool,
    body: Option<PhysicsBody>,
    previous: Transform,
    current: Transform,
    scale: f32,
    lifetime: Lifetime,
}

impl Asteroid {
    /// Asteroid with no physics body. It only ages.
    pub fn detached() -> Self {
        Self {
            active: false,
            body: None,
            previous: Transform::default(),
            current: Transform::default(),
            scale: 1.0,
            lifetime: Lifetime::new(0.0),
        }
    }

    /// Asteroid with a dynamic cube body, parked disabled until launched.
    pub fn with_body(physics: &mut PhysicsWorld) -> Self {
        let body = physics.add_dynamic_body(&Transform::default(), 0);
        let collider = physics.add_collider(
            body,
            ColliderShape::Cuboid {
                half_extents: Vec3::splat(0.5),
            },
            CollisionGroup::obstacle(),
        );
        physics.set_enabled(body, false);
        Self {
            body: Some(PhysicsBody::with_collider(body, collider)),
            ..Self::detached()
        }
    }

    /// Place a just-acquired asteroid and wake its body.
    pub fn launch(&mut self, handle: PoolHandle, launch: &AsteroidLaunch, physics: &mut PhysicsWorld) {
        let pose = Transform::from_position_rotation(launch.position, launch.rotation);
        self.previous = pose;
        self.current = pose;
        self.scale = launch.scale;
        self.lifetime = Lifetime::new(launch.lifetime);

        if let Some(body) = self.body {
            let handle_data = EntityId::Obstacle(handle).to_user_data();
            physics.set_user_data(body.rigid_body, handle_data);
            if let Some(collider) = body.collider {
                physics.set_collider_shape(
                    collider,
                    ColliderShape::Cuboid {
                        half_extents: Vec3::splat(launch.scale * 0.5),
                    },
                );
            }
            physics.set_body_transform(body.rigid_body, &pose);
            physics.set_linear_velocity(body.rigid_body, launch.velocity);
            physics.set_angular_velocity(body.rigid_body, launch.angular_velocity);
            physics.set_enabled(body.rigid_body, true);
        }
    }

    /// Deactivate now and take the body out of the simulation.
    pub fn despawn(&mut self, physics: &mut PhysicsWorld) {
        self.active = false;
        if let Some(body) = self.body {
            physics.set_enabled(body.rigid_body, false);
        }
    }

    pub fn body(&self) -> Option<PhysicsBody> {
        self.body
    }

    pub fn position(&self) -> Vec3 {
        self.current.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn remaining_lifetime(&self) -> f32 {
        self.lifetime.remaining
    }

    /// Interpolated transform with the cube scale applied.
    pub fn render_transform(&self, alpha: f32) -> Transform {
        Transform::interpolate(&self.previous, &self.current, alpha).with_scale(Vec3::splat(self.scale))
    }
}

impl Poolable for Asteroid {
    type Context<'a> = AsteroidContext<'a>;

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn update(&mut self, dt: f32, ctx: &mut AsteroidContext<'_>) {
        if let Some(body) = self.body {
            if let Some(pose) = ctx.physics.get_body_transform(body.rigid_body) {
                self.previous = self.current;
                self.current = pose;
            }
        }

        if self.lifetime.update(dt) {
            self.active = false;
        } else if self.current.position.distance(ctx.craft_position) > ctx.despawn_distance {
            log::trace!("Asteroid left the field at {}", self.current.position);
            self.active = false;
        }
    }

    fn retire(&mut self, ctx: &mut AsteroidContext<'_>) {
        if let Some(body) = self.body {
            ctx.physics.set_enabled(body.rigid_body, false);
        }
    }
}

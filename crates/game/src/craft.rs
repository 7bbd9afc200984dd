//! The player craft: flight model plus hit points and hit feedback.

use engine_core::{Blink, Health, Transform, Vec3};
use physics::{ColliderShape, CollisionGroup, PhysicsBody, PhysicsWorld};

use crate::config::CraftConfig;
use crate::entity::EntityId;
use crate::flight::FlightController;

pub struct Craft {
    pub flight: FlightController,
    pub health: Health,
    pub blink: Blink,
    pub physics_body: Option<PhysicsBody>,
    collision_damage: f32,
    model_scale: f32,
    hits: u32,
}

impl Craft {
    /// Craft at `pose` without a physics body.
    pub fn new(config: &CraftConfig, pose: Transform) -> Self {
        Self {
            flight: FlightController::new(config.motion, pose),
            health: Health::new(config.health),
            blink: Blink::new(config.blink_duration, config.blinks),
            physics_body: None,
            collision_damage: config.collision_damage,
            model_scale: config.model_scale,
            hits: 0,
        }
    }

    /// Craft at `pose` with a kinematic body and ball collider.
    pub fn spawn(config: &CraftConfig, pose: Transform, physics: &mut PhysicsWorld) -> Self {
        let mut craft = Self::new(config, pose);
        let body = physics.add_kinematic_body(&pose, EntityId::Craft.to_user_data());
        let collider = physics.add_collider(
            body,
            ColliderShape::Ball {
                radius: config.collision_radius,
            },
            CollisionGroup::craft(),
        );
        craft.flight.attach_body(body);
        craft.physics_body = Some(PhysicsBody::with_collider(body, collider));
        craft
    }

    pub fn position(&self) -> Vec3 {
        self.flight.position()
    }

    /// Take collision damage and start blinking.
    pub fn hit(&mut self) {
        self.hits += 1;
        self.health.take_damage(self.collision_damage);
        self.blink.start();
        if self.health.is_dead() {
            log::info!("Craft destroyed after {} hits", self.hits);
        } else {
            log::debug!("Craft hit, health at {:.0}%", self.health.percentage() * 100.0);
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn is_destroyed(&self) -> bool {
        self.health.is_dead()
    }

    /// Interpolated model transform with the render scale applied.
    pub fn render_transform(&self, alpha: f32) -> Transform {
        self.flight
            .interpolated(alpha)
            .with_scale(Vec3::splat(self.model_scale))
    }
}

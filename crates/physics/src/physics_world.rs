//! Physics world management with Rapier3D.
//!
//! Space has no gravity. Dynamic bodies (obstacles) are integrated by Rapier;
//! the craft is a kinematic body whose pose is pushed in every tick.

use crate::collision::CollisionPair;
use engine_core::{Quat, Transform, Vec3};
use rapier3d::crossbeam::channel::{unbounded, Receiver};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Shape attached to a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

impl ColliderShape {
    fn to_shared(self) -> SharedShape {
        match self {
            ColliderShape::Ball { radius } => SharedShape::ball(radius),
            ColliderShape::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
        }
    }
}

fn to_isometry(transform: &Transform) -> Isometry3<Real> {
    let p = transform.position;
    let r = transform.rotation.normalize();
    Isometry3::from_parts(
        Translation3::new(p.x, p.y, p.z),
        UnitQuaternion::from_quaternion(Quaternion::new(r.w, r.x, r.y, r.z)),
    )
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Main physics world containing all simulation state.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    event_handler: ChannelEventCollector,
    collision_events: Receiver<CollisionEvent>,
    contact_force_events: Receiver<ContactForceEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create a new physics world without gravity.
    pub fn new() -> Self {
        let (collision_send, collision_events) = unbounded();
        let (contact_force_send, contact_force_events) = unbounded();
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, 0.0, 0.0],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_handler: ChannelEventCollector::new(collision_send, contact_force_send),
            collision_events,
            contact_force_events,
        }
    }

    /// Advance the simulation by exactly `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_handler,
        );
    }

    /// Contact pairs that started since the last call, tagged with their
    /// colliders' user data. Pairs whose collider is already gone are skipped.
    pub fn drain_collisions(&mut self) -> Vec<CollisionPair> {
        while self.contact_force_events.try_recv().is_ok() {}
        let mut pairs = Vec::new();
        while let Ok(event) = self.collision_events.try_recv() {
            if !event.started() {
                continue;
            }
            let (Some(first), Some(second)) = (
                self.collider_set.get(event.collider1()),
                self.collider_set.get(event.collider2()),
            ) else {
                log::trace!("Dropping contact with a removed collider");
                continue;
            };
            pairs.push(CollisionPair {
                first: first.user_data,
                second: second.user_data,
            });
        }
        pairs
    }

    /// Add a dynamic rigid body at `transform`, tagged with `user_data`.
    pub fn add_dynamic_body(&mut self, transform: &Transform, user_data: u128) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::dynamic()
            .position(to_isometry(transform))
            .can_sleep(false)
            .user_data(user_data)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Add a kinematic rigid body whose pose is driven from outside.
    pub fn add_kinematic_body(&mut self, transform: &Transform, user_data: u128) -> RigidBodyHandle {
        let rigid_body = RigidBodyBuilder::kinematic_position_based()
            .position(to_isometry(transform))
            .user_data(user_data)
            .build();
        self.rigid_body_set.insert(rigid_body)
    }

    /// Attach a collider with collision events enabled. The collider carries
    /// the same user data as its body so contacts can be traced to entities.
    pub fn add_collider(
        &mut self,
        body_handle: RigidBodyHandle,
        shape: ColliderShape,
        groups: InteractionGroups,
    ) -> ColliderHandle {
        let user_data = self
            .rigid_body_set
            .get(body_handle)
            .map(|body| body.user_data)
            .unwrap_or_default();
        let collider = ColliderBuilder::new(shape.to_shared())
            .collision_groups(groups)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(user_data)
            .build();
        self.collider_set
            .insert_with_parent(collider, body_handle, &mut self.rigid_body_set)
    }

    /// Retag a body and all of its colliders.
    pub fn set_user_data(&mut self, handle: RigidBodyHandle, user_data: u128) {
        let Some(body) = self.rigid_body_set.get_mut(handle) else {
            return;
        };
        body.user_data = user_data;
        for collider_handle in body.colliders() {
            if let Some(collider) = self.collider_set.get_mut(*collider_handle) {
                collider.user_data = user_data;
            }
        }
    }

    /// Replace a collider's shape (e.g. when a pooled body is respawned at a new size).
    pub fn set_collider_shape(&mut self, handle: ColliderHandle, shape: ColliderShape) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_shape(shape.to_shared());
        }
    }

    /// Include or exclude a body (and its colliders) from the simulation.
    pub fn set_enabled(&mut self, handle: RigidBodyHandle, enabled: bool) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_enabled(enabled);
        }
    }

    pub fn is_enabled(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .get(handle)
            .is_some_and(|body| body.is_enabled())
    }

    /// Teleport a body to `transform`.
    pub fn set_body_transform(&mut self, handle: RigidBodyHandle, transform: &Transform) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_position(to_isometry(transform), true);
        }
    }

    /// Pose a kinematic body will reach at the end of the next step.
    pub fn set_kinematic_transform(&mut self, handle: RigidBodyHandle, transform: &Transform) {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) => body.set_next_kinematic_position(to_isometry(transform)),
            None => log::warn!("kinematic push to missing body {:?}", handle),
        }
    }

    /// Get the transform of a rigid body.
    pub fn get_body_transform(&self, handle: RigidBodyHandle) -> Option<Transform> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            let rot = body.rotation();
            Transform {
                position: Vec3::new(pos.x, pos.y, pos.z),
                rotation: Quat::from_xyzw(rot.i, rot.j, rot.k, rot.w),
                scale: Vec3::ONE,
            }
        })
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    pub fn linear_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    pub fn angular_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.angvel()))
    }

    /// Remove a rigid body and its colliders.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionGroup;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn dynamic_body_drifts_without_gravity() {
        let mut world = PhysicsWorld::new();
        let body = world.add_dynamic_body(&Transform::from_position(Vec3::ZERO), 0);
        world.add_collider(body, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::obstacle());
        world.set_linear_velocity(body, Vec3::new(6.0, 0.0, 0.0));
        for _ in 0..60 {
            world.step(DT);
        }
        let t = world.get_body_transform(body).unwrap();
        assert!((t.position.x - 6.0).abs() < 0.05, "x = {}", t.position.x);
        assert!(t.position.y.abs() < 1e-4);
        let v = world.linear_velocity(body).unwrap();
        assert!((v - Vec3::new(6.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn kinematic_body_reaches_pushed_pose() {
        let mut world = PhysicsWorld::new();
        let body = world.add_kinematic_body(&Transform::default(), 0);
        let target = Transform::from_position_rotation(Vec3::new(1.0, 2.0, -3.0), Quat::from_rotation_y(0.5));
        world.set_kinematic_transform(body, &target);
        world.step(DT);
        let t = world.get_body_transform(body).unwrap();
        assert!((t.position - target.position).length() < 1e-4);
        assert!(t.rotation.angle_between(target.rotation) < 1e-3);
    }

    #[test]
    fn overlapping_bodies_report_their_user_data() {
        let mut world = PhysicsWorld::new();
        let craft = world.add_kinematic_body(&Transform::default(), 1);
        world.add_collider(craft, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::craft());
        let rock = world.add_dynamic_body(&Transform::from_position(Vec3::new(1.5, 0.0, 0.0)), 2);
        world.add_collider(rock, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::obstacle());

        world.step(DT);
        let pairs = world.drain_collisions();
        assert_eq!(pairs.len(), 1);
        let pair = pairs[0];
        let ids = [pair.first, pair.second];
        assert!(ids.contains(&1) && ids.contains(&2));
        assert!(world.drain_collisions().is_empty());

        // Still touching: no new start event.
        world.step(DT);
        assert!(world.drain_collisions().is_empty());
    }

    #[test]
    fn separating_reports_no_pair() {
        let mut world = PhysicsWorld::new();
        let craft = world.add_kinematic_body(&Transform::default(), 1);
        world.add_collider(craft, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::craft());
        let rock = world.add_dynamic_body(&Transform::from_position(Vec3::new(1.5, 0.0, 0.0)), 2);
        world.add_collider(rock, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::obstacle());
        world.step(DT);
        assert_eq!(world.drain_collisions().len(), 1);

        world.set_enabled(rock, false);
        world.step(DT);
        assert!(world.drain_collisions().is_empty());
    }

    #[test]
    fn disabled_bodies_do_not_collide() {
        let mut world = PhysicsWorld::new();
        let craft = world.add_kinematic_body(&Transform::default(), 1);
        world.add_collider(craft, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::craft());
        let rock = world.add_dynamic_body(&Transform::from_position(Vec3::new(1.5, 0.0, 0.0)), 2);
        world.add_collider(rock, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::obstacle());
        world.set_enabled(rock, false);
        assert!(!world.is_enabled(rock));

        world.step(DT);
        assert!(world.drain_collisions().is_empty());
    }

    #[test]
    fn resized_collider_starts_touching() {
        let mut world = PhysicsWorld::new();
        let craft = world.add_kinematic_body(&Transform::default(), 1);
        world.add_collider(craft, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::craft());
        let rock = world.add_dynamic_body(&Transform::from_position(Vec3::new(5.0, 0.0, 0.0)), 2);
        let collider =
            world.add_collider(rock, ColliderShape::Ball { radius: 1.0 }, CollisionGroup::obstacle());
        world.step(DT);
        assert!(world.drain_collisions().is_empty());

        world.set_collider_shape(
            collider,
            ColliderShape::Cuboid {
                half_extents: Vec3::splat(4.5),
            },
        );
        world.set_user_data(rock, 7);
        world.step(DT);
        let pairs = world.drain_collisions();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].first == 7 || pairs[0].second == 7);
    }

    #[test]
    fn removing_a_body_drops_it() {
        let mut world = PhysicsWorld::new();
        let body = world.add_dynamic_body(&Transform::default(), 0);
        assert_eq!(world.body_count(), 1);
        world.remove_body(body);
        assert_eq!(world.body_count(), 0);
        assert!(world.get_body_transform(body).is_none());
    }
}

//! Collision groups and body bookkeeping.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// The player craft
    Craft = 1 << 0,
    /// Asteroids and other spawned obstacles
    Obstacle = 1 << 1,
    /// Craft weapon fire (no weapons yet; reserved so obstacle filters stay stable)
    Projectile = 1 << 2,
}

impl CollisionGroup {
    /// Membership and filter for the player craft.
    pub fn craft() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Craft as u32),
            Group::from_bits_retain(Self::Obstacle as u32),
        )
    }

    /// Membership and filter for obstacles: they hit the craft, projectiles
    /// and each other.
    pub fn obstacle() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Obstacle as u32),
            Group::from_bits_retain(
                Self::Craft as u32 | Self::Obstacle as u32 | Self::Projectile as u32,
            ),
        )
    }

    /// Membership and filter for projectiles.
    pub fn projectile() -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_retain(Self::Projectile as u32),
            Group::from_bits_retain(Self::Obstacle as u32),
        )
    }
}

/// Links a game entity to its physics handles.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub rigid_body: RigidBodyHandle,
    pub collider: Option<ColliderHandle>,
}

impl PhysicsBody {
    pub fn with_collider(rigid_body: RigidBodyHandle, collider: ColliderHandle) -> Self {
        Self {
            rigid_body,
            collider: Some(collider),
        }
    }
}

/// Two colliders that started touching during a step, identified by the
/// user data of their colliders (the owning entities' packed ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub first: u128,
    pub second: u128,
}

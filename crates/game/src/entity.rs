//! Entity identities stored in physics user data.

use engine_core::PoolHandle;

const KIND_SHIFT: u32 = 64;
const KIND_CRAFT: u128 = 1;
const KIND_OBSTACLE: u128 = 2;

/// Which game object a rigid body or collider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    Craft,
    Obstacle(PoolHandle),
}

impl EntityId {
    /// Pack into a physics user-data word: kind in the high 64 bits, pool
    /// handle in the low 64. Zero is never produced, so untagged bodies stay
    /// distinguishable.
    pub fn to_user_data(self) -> u128 {
        match self {
            EntityId::Craft => KIND_CRAFT << KIND_SHIFT,
            EntityId::Obstacle(handle) => {
                (KIND_OBSTACLE << KIND_SHIFT) | u128::from(handle.to_bits())
            }
        }
    }

    pub fn from_user_data(data: u128) -> Option<Self> {
        match data >> KIND_SHIFT {
            KIND_CRAFT => Some(EntityId::Craft),
            KIND_OBSTACLE => Some(EntityId::Obstacle(PoolHandle::from_bits(data as u64))),
            _ => None,
        }
    }
}

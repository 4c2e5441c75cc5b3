use num_traits::{One, PrimInt};
use rapier3d::geometry::{Group, InteractionGroups};
use serde::{Deserialize, Serialize};

/// Trait implemented by flag enums whose discriminant is a bit index.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over any primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(flags: &[U]) -> Self {
        let mut out = Self::new(T::zero());
        for &flag in flags {
            out.add(flag);
        }
        out
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// ```ignore
/// define_bitmask_flags!(CollisionLayer, u32, { Default, Ground, Player });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::layers::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

define_bitmask_flags!(CollisionLayer, u32, {
    Default,
    Ground,
    Player,
    Platform,
    Trigger,
});

/// Set of collision layers, stored as rapier-compatible 32-bit group bits.
pub type LayerMask = BitmaskFlags<u32>;

impl LayerMask {
    pub const ALL: Self = Self { bits: u32::MAX };

    /// Layers a rolling body treats as walkable ground by default.
    pub fn ground() -> Self {
        Self::from_flags(&[
            CollisionLayer::Default,
            CollisionLayer::Ground,
            CollisionLayer::Platform,
        ])
    }

    pub fn group(&self) -> Group {
        Group::from_bits_truncate(self.bits)
    }

    /// Interaction groups for a collider that belongs to `self` and collides with everything.
    pub fn interaction_groups(&self) -> InteractionGroups {
        let mut groups = InteractionGroups::all();
        groups.memberships = self.group();
        groups
    }

    /// Does a collider with these interaction groups belong to any layer in this mask?
    pub fn matches(&self, groups: &InteractionGroups) -> bool {
        self.bits & groups.memberships.bits() != 0
    }
}

impl From<CollisionLayer> for LayerMask {
    fn from(layer: CollisionLayer) -> Self {
        Self::from_flags(&[layer])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_mask_excludes_player_layer() {
        let mask = LayerMask::ground();
        assert!(mask.has(CollisionLayer::Ground));
        assert!(mask.has(CollisionLayer::Platform));
        assert!(!mask.has(CollisionLayer::Player));
        assert!(!mask.has(CollisionLayer::Trigger));
    }

    #[test]
    fn matches_checks_collider_membership_bits() {
        let player = LayerMask::from(CollisionLayer::Player).interaction_groups();
        let platform = LayerMask::from(CollisionLayer::Platform).interaction_groups();

        assert!(!LayerMask::ground().matches(&player));
        assert!(LayerMask::ground().matches(&platform));
        assert!(LayerMask::ALL.matches(&player));
    }

    #[test]
    fn add_and_remove_round_out_a_mask() {
        let mut mask = LayerMask::default();
        assert!(mask.is_empty());

        mask.add(CollisionLayer::Trigger);
        assert_eq!(mask.bits, 1 << 4);

        mask.remove(CollisionLayer::Trigger);
        assert!(mask.is_empty());
    }
}

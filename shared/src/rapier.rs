use rapier3d::{na::UnitQuaternion, prelude::*};
use serde::{Deserialize, Serialize};

use crate::layers::{CollisionLayer, LayerMask};

/// Canonical definition of an immutable level collider.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    pub shape: ColliderShapeDef,
    #[serde(default = "default_static_layers")]
    pub layers: LayerMask,
    /// Sensors report overlaps but are ignored by ground checks.
    #[serde(default)]
    pub sensor: bool,
    #[serde(default = "default_friction")]
    pub friction: f32,
}

fn default_static_layers() -> LayerMask {
    CollisionLayer::Ground.into()
}

fn default_friction() -> f32 {
    0.7
}

/// Supported static collider shapes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) whose normal is `rotation * +Y`.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },
}

/// Build a Rapier collider from a `StaticDef`.
///
/// Colliders are meant to be attached to a fixed body carrying the def's pose, so the collider
/// itself gets an identity local transform, except for planes which are placed along their
/// normal.
pub fn collider_from_def(def: &StaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the rotation, so the half-space is +Y in local
            // space and only the offset needs placing.
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vector::y_axis())))
                .translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
    };

    builder
        .sensor(def.sensor)
        .friction(def.friction)
        .collision_groups(def.layers.interaction_groups())
        .build()
}

/// Radius of the sphere that describes `collider` for rolling purposes.
///
/// Balls report their exact radius; anything else falls back to its local bounding sphere.
pub fn rolling_radius(collider: &Collider) -> f32 {
    let shape = collider.shape();
    match shape.as_ball() {
        Some(ball) => ball.radius,
        None => shape.compute_local_bounding_sphere().radius(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn def(shape: ColliderShapeDef) -> StaticDef {
        StaticDef {
            id: 1,
            translation: Vector::zeros(),
            rotation: UnitQuaternion::identity(),
            shape,
            layers: CollisionLayer::Ground.into(),
            sensor: false,
            friction: 0.5,
        }
    }

    #[test]
    fn collider_carries_layers_and_sensor_flag() {
        let mut trigger = def(ColliderShapeDef::Sphere { radius: 2.0 });
        trigger.sensor = true;
        trigger.layers = CollisionLayer::Trigger.into();

        let collider = collider_from_def(&trigger);
        assert!(collider.is_sensor());
        assert!(LayerMask::from(CollisionLayer::Trigger).matches(&collider.collision_groups()));
        assert!(!LayerMask::ground().matches(&collider.collision_groups()));
    }

    #[test]
    fn rolling_radius_reads_balls_exactly() {
        let ball = collider_from_def(&def(ColliderShapeDef::Sphere { radius: 0.4 }));
        assert_relative_eq!(rolling_radius(&ball), 0.4);
    }

    #[test]
    fn rolling_radius_falls_back_to_bounding_sphere() {
        let cube = collider_from_def(&def(ColliderShapeDef::Cuboid {
            half_extents: Vector::new(1.0, 1.0, 1.0),
        }));
        assert_relative_eq!(rolling_radius(&cube), 3.0f32.sqrt(), epsilon = 1.0e-5);
    }
}

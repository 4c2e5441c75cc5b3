//! The boundary between the controllers and whatever physics engine hosts them.
//!
//! Controllers never own a physics world. The host hands them a body handle at construction and
//! passes itself into every callback, so the same controller code runs against rapier, a test
//! double, or anything else that can answer these queries.

use std::fmt::Debug;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::{error::HostError, layers::LayerMask};

/// A world-space ray used for ground checks.
#[derive(Clone, Copy, Debug)]
pub struct GroundRay {
    pub origin: Point3<f32>,
    /// Unit direction.
    pub direction: Vector3<f32>,
    pub max_distance: f32,
    /// Only colliders belonging to one of these layers are hit.
    pub layers: LayerMask,
}

/// Closest accepted ray contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundHit {
    /// World-space surface normal at the contact.
    pub normal: Vector3<f32>,
    /// Distance from the ray origin to the contact (meters).
    pub distance: f32,
}

pub trait PhysicsHost {
    type Body: Copy + Debug;

    /// Closest hit along `ray`, ignoring sensors and any collider attached to `exclude`.
    fn cast_ray(&self, ray: &GroundRay, exclude: Option<Self::Body>) -> Option<GroundHit>;

    fn contains(&self, body: Self::Body) -> bool;

    fn linear_velocity(&self, body: Self::Body) -> Option<Vector3<f32>>;

    fn angular_velocity(&self, body: Self::Body) -> Option<Vector3<f32>>;

    fn set_angular_velocity(
        &mut self,
        body: Self::Body,
        angvel: Vector3<f32>,
    ) -> Result<(), HostError>;

    /// World-space center of mass.
    fn center_of_mass(&self, body: Self::Body) -> Option<Point3<f32>>;

    /// World-space orientation.
    fn rotation(&self, body: Self::Body) -> Option<UnitQuaternion<f32>>;

    /// Collision-aware rotation for a kinematic body, applied on the next physics step.
    /// Position is left untouched.
    fn move_rotation(
        &mut self,
        body: Self::Body,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), HostError>;

    /// Radius of the sphere that best describes the body's collision shape.
    fn collider_radius(&self, body: Self::Body) -> Option<f32>;
}

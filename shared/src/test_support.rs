//! In-memory `PhysicsHost` double holding a single body.

use std::cell::Cell;

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::{
    error::HostError,
    host::{GroundHit, GroundRay, PhysicsHost},
};

#[derive(Debug)]
pub struct MockHost {
    pub present: bool,
    pub kinematic: bool,
    pub radius: Option<f32>,
    pub linvel: Vector3<f32>,
    pub angvel: Vector3<f32>,
    pub center: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
    /// Ground normal returned by every ray cast, or `None` for no hit.
    pub ground: Option<Vector3<f32>>,
    pub last_ray: Cell<Option<GroundRay>>,
    pub commanded: Vec<UnitQuaternion<f32>>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self {
            present: false,
            kinematic: false,
            radius: None,
            linvel: Vector3::zeros(),
            angvel: Vector3::zeros(),
            center: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            ground: None,
            last_ray: Cell::new(None),
            commanded: Vec::new(),
        }
    }
}

impl MockHost {
    pub const BALL: u32 = 1;
    pub const PLATFORM: u32 = 2;

    pub fn with_ball(radius: f32) -> Self {
        Self {
            present: true,
            radius: Some(radius),
            center: Point3::new(0.0, radius, 0.0),
            ..Self::default()
        }
    }

    pub fn with_platform(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            present: true,
            kinematic: true,
            rotation,
            ..Self::default()
        }
    }

    pub fn remove_body(&mut self) {
        self.present = false;
    }

    fn check(&self, body: u32) -> Result<(), HostError> {
        if self.present {
            Ok(())
        } else {
            Err(HostError::MissingBody(body.to_string()))
        }
    }
}

impl PhysicsHost for MockHost {
    type Body = u32;

    fn cast_ray(&self, ray: &GroundRay, _exclude: Option<u32>) -> Option<GroundHit> {
        self.last_ray.set(Some(*ray));
        self.ground.map(|normal| GroundHit {
            normal,
            distance: ray.max_distance * 0.5,
        })
    }

    fn contains(&self, _body: u32) -> bool {
        self.present
    }

    fn linear_velocity(&self, _body: u32) -> Option<Vector3<f32>> {
        self.present.then_some(self.linvel)
    }

    fn angular_velocity(&self, _body: u32) -> Option<Vector3<f32>> {
        self.present.then_some(self.angvel)
    }

    fn set_angular_velocity(&mut self, body: u32, angvel: Vector3<f32>) -> Result<(), HostError> {
        self.check(body)?;
        self.angvel = angvel;
        Ok(())
    }

    fn center_of_mass(&self, _body: u32) -> Option<Point3<f32>> {
        self.present.then_some(self.center)
    }

    fn rotation(&self, _body: u32) -> Option<UnitQuaternion<f32>> {
        self.present.then_some(self.rotation)
    }

    fn move_rotation(
        &mut self,
        body: u32,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), HostError> {
        self.check(body)?;
        if !self.kinematic {
            return Err(HostError::NotKinematic(body.to_string()));
        }
        self.commanded.push(rotation);
        self.rotation = rotation;
        Ok(())
    }

    fn collider_radius(&self, _body: u32) -> Option<f32> {
        if self.present { self.radius } else { None }
    }
}

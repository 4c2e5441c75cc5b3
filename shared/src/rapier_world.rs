//! Rapier-backed physics world that hosts the controllers.
//!
//! Owns the full simulation state (bodies, colliders, broad/narrow phase, CCD solver) and steps it
//! on a fixed `dt`. It implements [`PhysicsHost`] so the rolling and tilt controllers can query and
//! mutate bodies without knowing about Rapier.
//!
//! Static level geometry is inserted deterministically (sorted by `id`) as fixed bodies.

// Re-export Rapier so the client can use Rapier types without depending on `rapier3d` directly.
pub use rapier3d;

use log::debug;
use rapier3d::na::{Point3, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::{
    constants::GRAVITY_MPS2,
    error::HostError,
    host::{GroundHit, GroundRay, PhysicsHost},
    rapier::{StaticDef, collider_from_def, rolling_radius},
};

pub struct PhysicsWorld {
    pub gravity: Vector<f32>,
    pub integration_parameters: IntegrationParameters,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self {
            gravity: vector![0.0, -GRAVITY_MPS2, 0.0],
            integration_parameters: IntegrationParameters::default(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }
}

impl PhysicsWorld {
    /// Build a world containing the given static level geometry.
    pub fn build(mut statics: Vec<StaticDef>) -> Self {
        // Ensure deterministic insertion order.
        statics.sort_by_key(|d| d.id);

        let mut world = Self::default();
        for def in &statics {
            world.insert_static(def);
        }
        debug!("physics world built with {} statics", statics.len());
        world
    }

    pub fn insert_static(&mut self, def: &StaticDef) -> RigidBodyHandle {
        let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
        let rb = RigidBodyBuilder::fixed().pose(iso).build();
        let rb_handle = self.bodies.insert(rb);

        let collider = collider_from_def(def);
        self.colliders
            .insert_with_parent(collider, rb_handle, &mut self.bodies);
        rb_handle
    }

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        // Using default hooks/events (none).
        let hooks = ();
        let events = ();

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &hooks,
            &events,
        );
    }

    /// Borrowed `QueryPipeline` over the state of the last step.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    pub fn pose(&self, body: RigidBodyHandle) -> Option<Isometry<f32>> {
        self.bodies.get(body).map(|rb| *rb.position())
    }
}

impl PhysicsHost for PhysicsWorld {
    type Body = RigidBodyHandle;

    fn cast_ray(&self, ray: &GroundRay, exclude: Option<RigidBodyHandle>) -> Option<GroundHit> {
        let layers = ray.layers;
        let on_layer =
            move |_: ColliderHandle, collider: &Collider| layers.matches(&collider.collision_groups());

        let mut filter = QueryFilter::default().exclude_sensors().predicate(&on_layer);
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body);
        }

        let query_pipeline = self.query_pipeline(filter);
        let query_ray = Ray::new(ray.origin, ray.direction);
        query_pipeline
            .cast_ray_and_get_normal(&query_ray, ray.max_distance.max(0.0), true)
            .map(|(_handle, hit)| GroundHit {
                normal: hit.normal,
                distance: hit.time_of_impact,
            })
    }

    fn contains(&self, body: RigidBodyHandle) -> bool {
        self.bodies.contains(body)
    }

    fn linear_velocity(&self, body: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(body).map(|rb| *rb.linvel())
    }

    fn angular_velocity(&self, body: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(body).map(|rb| *rb.angvel())
    }

    fn set_angular_velocity(
        &mut self,
        body: RigidBodyHandle,
        angvel: Vector3<f32>,
    ) -> Result<(), HostError> {
        let rb = self
            .bodies
            .get_mut(body)
            .ok_or_else(|| HostError::MissingBody(format!("{body:?}")))?;
        rb.set_angvel(angvel, true);
        Ok(())
    }

    fn center_of_mass(&self, body: RigidBodyHandle) -> Option<Point3<f32>> {
        self.bodies.get(body).map(|rb| *rb.center_of_mass())
    }

    fn rotation(&self, body: RigidBodyHandle) -> Option<UnitQuaternion<f32>> {
        self.bodies.get(body).map(|rb| *rb.rotation())
    }

    fn move_rotation(
        &mut self,
        body: RigidBodyHandle,
        rotation: UnitQuaternion<f32>,
    ) -> Result<(), HostError> {
        let rb = self
            .bodies
            .get_mut(body)
            .ok_or_else(|| HostError::MissingBody(format!("{body:?}")))?;
        if !rb.is_kinematic() {
            return Err(HostError::NotKinematic(format!("{body:?}")));
        }
        rb.set_next_kinematic_rotation(rotation);
        Ok(())
    }

    fn collider_radius(&self, body: RigidBodyHandle) -> Option<f32> {
        let rb = self.bodies.get(body)?;
        rb.colliders()
            .iter()
            .filter_map(|handle| self.colliders.get(*handle))
            .find(|collider| !collider.is_sensor())
            .map(rolling_radius)
    }
}

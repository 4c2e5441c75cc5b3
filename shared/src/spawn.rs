//! Player and platform spawning helpers.
//!
//! The host decides where things go; these helpers only translate a definition into Rapier bodies
//! and colliders with the settings the controllers expect (a CCD-enabled dynamic ball, a kinematic
//! platform).

use log::info;
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_BALL_RADIUS,
    error::HostError,
    layers::{CollisionLayer, LayerMask},
    rapier_world::PhysicsWorld,
};

/// Where a player (re)appears.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub translation: Vector<f32>,
    #[serde(default = "identity_rotation")]
    pub rotation: UnitQuaternion<f32>,
}

fn identity_rotation() -> UnitQuaternion<f32> {
    UnitQuaternion::identity()
}

impl SpawnPoint {
    pub fn at(translation: Vector<f32>) -> Self {
        Self {
            translation,
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn isometry(&self) -> Isometry<f32> {
        Isometry::from_parts(Translation3::from(self.translation), self.rotation)
    }
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self::at(vector![0.0, 2.0, 0.0])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawnDef {
    pub spawn: SpawnPoint,
    pub radius: f32,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Continuous collision detection, so a fast ball cannot tunnel through a thin platform.
    pub continuous_collision: bool,
    pub layers: LayerMask,
}

impl Default for PlayerSpawnDef {
    fn default() -> Self {
        Self {
            spawn: SpawnPoint::default(),
            radius: DEFAULT_BALL_RADIUS,
            density: 1.0,
            friction: 0.8,
            restitution: 0.1,
            linear_damping: 0.05,
            angular_damping: 0.05,
            continuous_collision: true,
            layers: CollisionLayer::Player.into(),
        }
    }
}

/// Insert the player ball and return its body handle.
pub fn spawn_player(world: &mut PhysicsWorld, def: &PlayerSpawnDef) -> RigidBodyHandle {
    let body = RigidBodyBuilder::dynamic()
        .pose(def.spawn.isometry())
        .ccd_enabled(def.continuous_collision)
        .linear_damping(def.linear_damping)
        .angular_damping(def.angular_damping)
        .build();
    let handle = world.bodies.insert(body);

    let collider = ColliderBuilder::ball(def.radius)
        .density(def.density)
        .friction(def.friction)
        .restitution(def.restitution)
        .collision_groups(def.layers.interaction_groups())
        .build();
    world
        .colliders
        .insert_with_parent(collider, handle, &mut world.bodies);

    info!(
        "spawned player {handle:?} at {:?}",
        def.spawn.translation.as_slice()
    );
    handle
}

/// Put an existing player back on `spawn` at rest.
pub fn respawn(
    world: &mut PhysicsWorld,
    body: RigidBodyHandle,
    spawn: &SpawnPoint,
) -> Result<(), HostError> {
    let rb = world
        .bodies
        .get_mut(body)
        .ok_or_else(|| HostError::MissingBody(format!("{body:?}")))?;

    rb.set_translation(spawn.translation, true);
    rb.set_rotation(spawn.rotation, true);
    rb.set_linvel(Vector::zeros(), true);
    rb.set_angvel(Vector::zeros(), true);

    info!("respawned player {body:?}");
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformDef {
    pub translation: Vector<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub half_extents: Vector<f32>,
    pub friction: f32,
    pub layers: LayerMask,
}

impl Default for PlatformDef {
    fn default() -> Self {
        Self {
            translation: Vector::zeros(),
            rotation: UnitQuaternion::identity(),
            half_extents: vector![10.0, 0.25, 10.0],
            friction: 0.9,
            layers: CollisionLayer::Platform.into(),
        }
    }
}

/// Insert a kinematic, position-driven platform and return its body handle.
pub fn spawn_platform(world: &mut PhysicsWorld, def: &PlatformDef) -> RigidBodyHandle {
    let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
    let body = RigidBodyBuilder::kinematic_position_based().pose(iso).build();
    let handle = world.bodies.insert(body);

    let he = def.half_extents;
    let collider = ColliderBuilder::cuboid(he.x, he.y, he.z)
        .friction(def.friction)
        .collision_groups(def.layers.interaction_groups())
        .build();
    world
        .colliders
        .insert_with_parent(collider, handle, &mut world.bodies);

    info!("spawned platform {handle:?}");
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::PhysicsHost;

    #[test]
    fn player_ball_is_dynamic_with_ccd() {
        let mut world = PhysicsWorld::default();
        let handle = spawn_player(&mut world, &PlayerSpawnDef::default());

        let rb = &world.bodies[handle];
        assert!(rb.is_dynamic());
        assert!(rb.is_ccd_enabled());
        assert_eq!(world.collider_radius(handle), Some(DEFAULT_BALL_RADIUS));
    }

    #[test]
    fn respawn_resets_pose_and_velocities() {
        let mut world = PhysicsWorld::default();
        let handle = spawn_player(&mut world, &PlayerSpawnDef::default());
        {
            let rb = world.bodies.get_mut(handle).unwrap();
            rb.set_translation(vector![5.0, -30.0, 2.0], true);
            rb.set_linvel(vector![1.0, -9.0, 0.0], true);
            rb.set_angvel(vector![0.0, 3.0, 0.0], true);
        }

        let spawn = SpawnPoint::at(vector![1.0, 3.0, 1.0]);
        respawn(&mut world, handle, &spawn).unwrap();

        let rb = &world.bodies[handle];
        assert_eq!(*rb.translation(), spawn.translation);
        assert_eq!(*rb.linvel(), Vector::zeros());
        assert_eq!(*rb.angvel(), Vector::zeros());
    }

    #[test]
    fn respawn_of_unknown_body_is_an_error() {
        let mut other = PhysicsWorld::default();
        let handle = spawn_player(&mut other, &PlayerSpawnDef::default());
        let mut world = PhysicsWorld::default();

        assert!(matches!(
            respawn(&mut world, handle, &SpawnPoint::default()),
            Err(HostError::MissingBody(_))
        ));
    }

    #[test]
    fn platform_is_kinematic() {
        let mut world = PhysicsWorld::default();
        let handle = spawn_platform(&mut world, &PlatformDef::default());
        assert!(world.bodies[handle].is_kinematic());
        assert!(world.contains(handle));
    }
}

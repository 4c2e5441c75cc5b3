//! Bevy side of the Rapier world: fixed-step stepping and render interpolation.
//!
//! The simulation only advances in `FixedUpdate`. After each step the pose of every linked body is
//! snapshotted, and `Update` blends the last two snapshots by the fixed clock's overstep so motion
//! stays smooth at any frame rate.

use bevy::prelude::*;
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use tiltball_shared::{PhysicsWorld, rapier_world::rapier3d::prelude::RigidBodyHandle};

use crate::config::GameConfig;

#[derive(Resource, Deref, DerefMut)]
pub struct Physics(pub PhysicsWorld);

/// Links an entity to its Rapier body.
#[derive(Component, Clone, Copy, Debug)]
pub struct PhysicsBody(pub RigidBodyHandle);

/// The body's pose after the previous and the latest fixed step.
#[derive(Component, Clone, Copy, Debug)]
pub struct PhysicsPose {
    pub previous: Isometry3<f32>,
    pub current: Isometry3<f32>,
}

impl PhysicsPose {
    pub fn at(pose: Isometry3<f32>) -> Self {
        Self {
            previous: pose,
            current: pose,
        }
    }

    /// Snap both snapshots, e.g. after a teleport.
    pub fn reset(&mut self, pose: Isometry3<f32>) {
        *self = Self::at(pose);
    }
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicsSet {
    /// Controllers write velocities and kinematic targets.
    Controllers,
    Step,
    Snapshot,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(PreStartup, build_world);
    app.configure_sets(
        FixedUpdate,
        (
            PhysicsSet::Controllers,
            PhysicsSet::Step,
            PhysicsSet::Snapshot,
        )
            .chain(),
    );
    app.add_systems(FixedUpdate, step.in_set(PhysicsSet::Step));
    app.add_systems(FixedUpdate, snapshot.in_set(PhysicsSet::Snapshot));
    app.add_systems(Update, interpolate);
}

fn build_world(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(Physics(PhysicsWorld::build(config.statics.clone())));
}

fn step(time: Res<Time<Fixed>>, mut physics: ResMut<Physics>) {
    physics.step(time.delta_secs());
}

fn snapshot(physics: Res<Physics>, mut query: Query<(&PhysicsBody, &mut PhysicsPose)>) {
    for (body, mut pose) in &mut query {
        if let Some(latest) = physics.pose(body.0) {
            pose.previous = pose.current;
            pose.current = latest;
        }
    }
}

fn interpolate(
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut Transform, &PhysicsPose)>,
) {
    let alpha = time.overstep_fraction();
    query
        .par_iter_mut()
        .for_each(|(mut transform, pose)| {
            let blended = pose.previous.lerp_slerp(&pose.current, alpha);
            transform.translation = to_vec3(&blended.translation.vector);
            transform.rotation = to_quat(&blended.rotation);
        });
}

pub fn to_vec3(v: &Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn to_quat(q: &UnitQuaternion<f32>) -> Quat {
    let c = q.coords;
    Quat::from_xyzw(c.x, c.y, c.z, c.w)
}

pub fn transform_from_pose(pose: &Isometry3<f32>) -> Transform {
    Transform::from_translation(to_vec3(&pose.translation.vector))
        .with_rotation(to_quat(&pose.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, Vector3};

    #[test]
    fn quaternion_conversion_preserves_rotation() {
        let q = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.3);
        let converted = to_quat(&q);
        let v = converted * Vec3::Y;
        let expected = q * Vector3::y();
        assert!((v - to_vec3(&expected)).length() < 1.0e-6);
    }

    #[test]
    fn reset_collapses_both_snapshots() {
        let mut pose = PhysicsPose::at(Isometry3::identity());
        let moved = Isometry3::from_parts(
            Translation3::new(1.0, 2.0, 3.0),
            UnitQuaternion::identity(),
        );
        pose.current = moved;
        pose.reset(Isometry3::identity());
        assert_eq!(pose.previous, pose.current);
    }
}

use bevy::prelude::*;
use tiltball_shared::{
    RollingController, SpawnPoint, rapier_world::rapier3d::prelude::RigidBodyHandle,
};

use crate::{
    config::GameConfig,
    level::{RestartLevel, restart_level},
    physics::{Physics, PhysicsPose, PhysicsSet},
    platform::apply_tilt,
};

/// The player ball: its rolling controller and where it respawns.
#[derive(Component, Debug)]
pub struct Ball {
    pub roller: RollingController<RigidBodyHandle>,
    pub spawn: SpawnPoint,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(
        FixedUpdate,
        roll.in_set(PhysicsSet::Controllers).after(apply_tilt),
    );
    app.add_systems(Update, check_kill_plane.before(restart_level));
}

fn roll(time: Res<Time<Fixed>>, mut physics: ResMut<Physics>, mut balls: Query<&mut Ball>) {
    let dt = time.delta_secs();
    for mut ball in &mut balls {
        ball.roller.on_physics_step(dt, &mut physics.0);
    }
}

/// Uses the latest simulated pose, which a restart resets in the same frame.
fn check_kill_plane(
    config: Res<GameConfig>,
    balls: Query<&PhysicsPose, With<Ball>>,
    mut restarts: MessageWriter<RestartLevel>,
) {
    if balls
        .iter()
        .any(|pose| below_kill_plane(pose, config.kill_plane_y))
    {
        restarts.write(RestartLevel);
    }
}

fn below_kill_plane(pose: &PhysicsPose, kill_plane_y: f32) -> bool {
    pose.current.translation.vector.y < kill_plane_y
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Isometry3, Translation3, UnitQuaternion};

    fn at_height(y: f32) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::new(0.0, y, 0.0), UnitQuaternion::identity())
    }

    #[test]
    fn kill_plane_reads_the_latest_step() {
        let mut pose = PhysicsPose::at(at_height(1.0));
        pose.current = at_height(-25.0);
        assert!(below_kill_plane(&pose, -20.0));

        // A stale previous pose below the plane does not count.
        let mut pose = PhysicsPose::at(at_height(-25.0));
        pose.current = at_height(1.0);
        assert!(!below_kill_plane(&pose, -20.0));
    }

    #[test]
    fn restart_clears_the_fall() {
        let mut pose = PhysicsPose::at(at_height(-25.0));
        pose.reset(SpawnPoint::default().isometry());
        assert!(!below_kill_plane(&pose, -20.0));
    }
}

use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use nalgebra::Vector2;
use tiltball_shared::{TiltController, rapier_world::rapier3d::prelude::RigidBodyHandle};
use tracing::info;

use crate::{
    input::TiltAction,
    physics::{Physics, PhysicsSet},
};

/// The tilting platform and its controller.
#[derive(Component, Debug)]
pub struct Platform(pub TiltController<RigidBodyHandle>);

pub(super) fn plugin(app: &mut App) {
    // Input is sampled every frame; the orientation only reaches Rapier on the fixed step.
    app.add_systems(Update, (toggle_tilt, sample_tilt).chain());
    app.add_systems(FixedUpdate, apply_tilt.in_set(PhysicsSet::Controllers));
}

fn toggle_tilt(actions: Res<ActionState<TiltAction>>, mut platforms: Query<&mut Platform>) {
    if !actions.just_pressed(&TiltAction::Toggle) {
        return;
    }
    for mut platform in &mut platforms {
        let enabled = !platform.0.is_enabled();
        platform.0.set_enabled(enabled);
        info!("tilt input {}", if enabled { "enabled" } else { "disabled" });
    }
}

fn sample_tilt(
    time: Res<Time>,
    actions: Res<ActionState<TiltAction>>,
    mut platforms: Query<&mut Platform>,
) {
    let axis = actions.axis_pair(&TiltAction::Tilt);
    let input = Vector2::new(axis.x, axis.y);
    for mut platform in &mut platforms {
        platform.0.on_frame(input, time.delta_secs());
    }
}

pub(crate) fn apply_tilt(mut physics: ResMut<Physics>, mut platforms: Query<&mut Platform>) {
    for mut platform in &mut platforms {
        platform.0.on_physics_step(&mut physics.0);
    }
}

use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;
use nalgebra::Isometry3;
use tiltball_shared::{
    ColliderShapeDef, RollingController, StaticDef, TiltController, respawn, spawn_platform,
    spawn_player,
};
use tracing::{error, info, warn};

use crate::{
    ball::Ball,
    config::GameConfig,
    input::TiltAction,
    physics::{Physics, PhysicsBody, PhysicsPose, to_vec3, transform_from_pose},
    platform::Platform,
};

/// Put the ball back on its spawn point and level the platform.
#[derive(Message, Clone, Copy, Debug)]
pub struct RestartLevel;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<RestartLevel>();
    app.add_systems(Startup, (spawn_level, spawn_statics, spawn_light));
    app.add_systems(Update, (request_restart, restart_level).chain());
}

fn spawn_level(
    mut commands: Commands,
    mut physics: ResMut<Physics>,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let platform = spawn_platform(&mut physics.0, &config.platform);
    let platform_pose = physics.pose(platform).unwrap_or_else(Isometry3::identity);
    let he = config.platform.half_extents;
    let mut entity = commands.spawn((
        Name::new("Platform"),
        PhysicsBody(platform),
        PhysicsPose::at(platform_pose),
        transform_from_pose(&platform_pose),
        Mesh3d(meshes.add(Cuboid::new(he.x * 2.0, he.y * 2.0, he.z * 2.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.2, 0.3, 0.25),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
    ));
    match TiltController::new(config.tilt, platform, None, &physics.0) {
        Ok(controller) => {
            entity.insert(Platform(controller));
        }
        Err(err) => error!("platform will not tilt: {err}"),
    }

    let player = spawn_player(&mut physics.0, &config.player);
    let player_pose = physics.pose(player).unwrap_or_else(Isometry3::identity);
    let mut entity = commands.spawn((
        Name::new("Ball"),
        PhysicsBody(player),
        PhysicsPose::at(player_pose),
        transform_from_pose(&player_pose),
        Mesh3d(meshes.add(Sphere::new(config.player.radius))),
        MeshMaterial3d(materials.add(Color::srgb_u8(124, 144, 255))),
    ));
    match RollingController::new(config.rolling, player, &physics.0) {
        Ok(roller) => {
            entity.insert(Ball {
                roller,
                spawn: config.player.spawn,
            });
        }
        Err(err) => error!("ball will not roll: {err}"),
    }
}

/// Visuals for the fixed level geometry. Sensors stay invisible.
fn spawn_statics(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.5, 0.5, 0.55),
        perceptual_roughness: 0.9,
        ..default()
    });
    for def in config.statics.iter().filter(|def| !def.sensor) {
        let (mesh, transform) = static_mesh(def);
        commands.spawn((
            Name::new(format!("Static {}", def.id)),
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material.clone()),
            transform,
        ));
    }
}

fn static_mesh(def: &StaticDef) -> (Mesh, Transform) {
    let pose = Isometry3::from_parts(def.translation.into(), def.rotation);
    let mut transform = transform_from_pose(&pose);
    let mesh = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            transform.translation += transform.rotation * Vec3::Y * *offset_along_normal;
            Plane3d::default().mesh().size(200.0, 200.0).build()
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            let size = to_vec3(half_extents) * 2.0;
            Mesh::from(Cuboid::from_size(size))
        }
        ColliderShapeDef::Sphere { radius } => Mesh::from(Sphere::new(*radius)),
    };
    (mesh, transform)
}

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, -6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn request_restart(
    actions: Res<ActionState<TiltAction>>,
    mut restarts: MessageWriter<RestartLevel>,
) {
    if actions.just_pressed(&TiltAction::Reset) {
        restarts.write(RestartLevel);
    }
}

pub(crate) fn restart_level(
    mut restarts: MessageReader<RestartLevel>,
    mut physics: ResMut<Physics>,
    mut balls: Query<(&Ball, &PhysicsBody, &mut PhysicsPose), Without<Platform>>,
    mut platforms: Query<(&mut Platform, &PhysicsBody, &mut PhysicsPose), Without<Ball>>,
) {
    // Several requests in one frame collapse into one restart.
    if restarts.read().count() == 0 {
        return;
    }

    for (ball, body, mut pose) in &mut balls {
        if let Err(err) = respawn(&mut physics.0, body.0, &ball.spawn) {
            warn!("restart skipped a ball: {err}");
            continue;
        }
        pose.reset(ball.spawn.isometry());
    }

    for (mut platform, body, mut pose) in &mut platforms {
        platform.0.reset_tilt(&mut physics.0);
        // The kinematic target only lands on the next step; snap the visuals now.
        if let Some(current) = physics.pose(body.0) {
            let rest = platform.0.state().current.to_rotation();
            pose.reset(Isometry3::from_parts(current.translation, rest));
        }
    }

    info!("level restarted");
}

//! Debug/performance tooling for native dev builds.
//!
//! Compiled only behind `dev_native`. Besides the perf overlay it draws each ball's ground probe:
//! green while grounded, red while airborne.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;

use crate::ball::Ball;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, draw_ground_probe);
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_ground_probe(mut gizmos: Gizmos, balls: Query<(&Transform, &Ball)>) {
    for (transform, ball) in &balls {
        let roller = &ball.roller;
        let length = roller.radius() + roller.config().ground_check_offset;
        let color = if roller.is_grounded() {
            Color::srgb(0.2, 0.9, 0.3)
        } else {
            Color::srgb(0.9, 0.2, 0.2)
        };
        let start = transform.translation;
        gizmos.line(start, start - Vec3::Y * length, color);
    }
}

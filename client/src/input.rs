use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TiltAction {
    /// Two-axis tilt, each axis in [-1, 1].
    #[actionlike(DualAxis)]
    Tilt,
    /// Restart the level: respawn the ball and level the platform.
    Reset,
    /// Enable or disable tilt input.
    Toggle,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<TiltAction>::default());

    app.register_type::<TiltAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<TiltAction>::default());
}

/// Keyboard (WASD and arrows) and the left gamepad stick all drive the same tilt axis.
pub fn default_input_map() -> InputMap<TiltAction> {
    InputMap::default()
        .with_dual_axis(TiltAction::Tilt, VirtualDPad::wasd())
        .with_dual_axis(TiltAction::Tilt, VirtualDPad::arrow_keys())
        .with_dual_axis(TiltAction::Tilt, GamepadStick::LEFT)
        .with(TiltAction::Reset, KeyCode::KeyR)
        .with(TiltAction::Reset, GamepadButton::Select)
        .with(TiltAction::Toggle, KeyCode::KeyT)
}

/// Smallest contact radius the rolling solver divides by (meters).
///
/// Radii below this are clamped up so `omega = (n x v) / r` cannot blow up.
pub const MIN_ROLL_RADIUS: f32 = 1.0e-6;

/// Default tangential speed under which the no-slip target snaps to zero (m/s).
pub const DEFAULT_STOP_THRESHOLD: f32 = 0.05;

/// Default extra length added to the grounding ray beyond the sphere radius (meters).
pub const DEFAULT_GROUND_CHECK_OFFSET: f32 = 0.1;

/// Default response rate for blending angular velocity toward the rolling target (1/s).
///
/// This is a responsiveness knob, not a physical quantity: `rate * dt >= 1` snaps.
pub const DEFAULT_ROLL_LERP_RATE: f32 = 10.0;

/// Default maximum platform tilt on either axis (degrees).
pub const DEFAULT_MAX_TILT_ANGLE: f32 = 12.0;

/// Default rate limit for the tilt target (degrees per second).
pub const DEFAULT_TILT_SPEED: f32 = 60.0;

/// Default low-pass rate for the smoothed tilt (1/s).
pub const DEFAULT_SMOOTH_SPEED: f32 = 8.0;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Default fixed physics step (seconds). Matches bevy's default 64 Hz fixed clock.
pub const DEFAULT_FIXED_DT: f32 = 1.0 / 64.0;

/// Default player ball radius (meters).
pub const DEFAULT_BALL_RADIUS: f32 = 0.5;

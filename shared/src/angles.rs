//! Degree-based angle helpers used by the tilt controller.
//!
//! All angles here are in degrees. Rotations are built as pitch about +X followed by roll
//! about +Z (`R = Rx(pitch) * Rz(roll)`), with no yaw component.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A `(pitch, roll)` pair in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TiltAngles {
    /// Rotation about the local X axis.
    pub pitch: f32,
    /// Rotation about the local Z axis.
    pub roll: f32,
}

impl TiltAngles {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        roll: 0.0,
    };

    pub const fn new(pitch: f32, roll: f32) -> Self {
        Self { pitch, roll }
    }

    /// Clamp both axes into `[-max, max]`. A negative or NaN `max` clamps to zero.
    pub fn clamped(self, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            pitch: self.pitch.clamp(-max, max),
            roll: self.roll.clamp(-max, max),
        }
    }

    /// Local rotation for these angles.
    pub fn to_rotation(self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.to_radians())
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll.to_radians())
    }

    /// Recover `(pitch, roll)` from a rotation, discarding any yaw.
    ///
    /// Results are in the signed range `(-180, 180]`.
    pub fn from_rotation(rotation: &UnitQuaternion<f32>) -> Self {
        let m = rotation.to_rotation_matrix();
        let m = m.matrix();
        // For Rx(p) * Rz(r): m12 = -sin p, m22 = cos p * (..), m01 = -sin r, m00 = cos r.
        let pitch = (-m[(1, 2)]).atan2(m[(2, 2)]).to_degrees();
        let roll = (-m[(0, 1)]).atan2(m[(0, 0)]).to_degrees();
        Self {
            pitch: normalize_signed(pitch),
            roll: normalize_signed(roll),
        }
    }
}

#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Map any angle into `(-180, 180]` so `350` becomes `-10`.
#[inline]
pub fn normalize_signed(angle: f32) -> f32 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }
    let a = angle.rem_euclid(360.0);
    if a > 180.0 { a - 360.0 } else { a }
}

/// Shortest signed difference `target - current`, in `(-180, 180]`.
#[inline]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    normalize_signed(target - current)
}

/// Move `current` toward `target` by at most `max_delta`, taking the short way around.
///
/// Never overshoots. A negative `max_delta` is treated as zero.
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let max_delta = max_delta.max(0.0);
    let delta = delta_angle(current, target);
    if delta.abs() <= max_delta {
        return current + delta;
    }
    current + max_delta.copysign(delta)
}

/// Interpolate from `current` toward `target` along the short arc, `t` clamped to `[0, 1]`.
#[inline]
pub fn lerp_angle(current: f32, target: f32, t: f32) -> f32 {
    current + delta_angle(current, target) * clamp01(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_signed_folds_upper_half_turn() {
        assert_relative_eq!(normalize_signed(350.0), -10.0);
        assert_relative_eq!(normalize_signed(180.0), 180.0);
        assert_relative_eq!(normalize_signed(-190.0), 170.0);
        assert_relative_eq!(normalize_signed(720.0 + 5.0), 5.0);
    }

    #[test]
    fn move_towards_angle_wraps_through_zero() {
        // From 350 (i.e. -10) toward 10 the short way is +20 degrees.
        let next = move_towards_angle(350.0, 10.0, 5.0);
        assert_relative_eq!(normalize_signed(next), -5.0);
    }

    #[test]
    fn move_towards_angle_lands_exactly_without_overshoot() {
        assert_relative_eq!(move_towards_angle(0.0, 3.0, 5.0), 3.0);
        assert_relative_eq!(move_towards_angle(0.0, -12.0, 5.0), -5.0);
        assert_relative_eq!(move_towards_angle(4.0, 8.0, -1.0), 4.0);
    }

    #[test]
    fn lerp_angle_takes_short_arc() {
        assert_relative_eq!(lerp_angle(170.0, -170.0, 0.5), 180.0);
        assert_relative_eq!(lerp_angle(0.0, 10.0, 2.0), 10.0);
    }

    #[test]
    fn rotation_round_trips_pitch_and_roll() {
        let angles = TiltAngles::new(7.5, -11.0);
        let back = TiltAngles::from_rotation(&angles.to_rotation());
        assert_relative_eq!(back.pitch, angles.pitch, epsilon = 1.0e-4);
        assert_relative_eq!(back.roll, angles.roll, epsilon = 1.0e-4);
    }

    #[test]
    fn pure_yaw_reads_as_level() {
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.2);
        let angles = TiltAngles::from_rotation(&yaw);
        assert_relative_eq!(angles.pitch, 0.0, epsilon = 1.0e-4);
        assert_relative_eq!(angles.roll, 0.0, epsilon = 1.0e-4);
    }
}

//! Roll-without-slipping control for a dynamic sphere.
//!
//! Every fixed step the controller casts a short ray down from the body's center of mass. When
//! it finds ground, it computes the angular velocity for which the contact point is at rest
//! relative to the ground and blends the body's angular velocity toward it. In the air it does
//! nothing and lets the physics engine integrate freely.

use log::{debug, trace, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{
    angles::clamp01,
    constants::{
        DEFAULT_GROUND_CHECK_OFFSET, DEFAULT_ROLL_LERP_RATE, DEFAULT_STOP_THRESHOLD,
        MIN_ROLL_RADIUS,
    },
    error::ConfigError,
    host::{GroundRay, PhysicsHost},
    layers::LayerMask,
};

/// Angular velocity (rad/s) that makes a sphere of `radius` roll without slipping.
///
/// `ground_normal` must be unit length. Only the part of `linear_velocity` tangent to the ground
/// contributes: `omega = (n x v_t) / r`, so that `v + omega x (-n * r)` is zero at the contact.
/// When the tangential speed is below `stop_threshold` the result is exactly zero.
pub fn compute_angular_velocity_target(
    linear_velocity: Vector3<f32>,
    ground_normal: Vector3<f32>,
    radius: f32,
    stop_threshold: f32,
) -> Vector3<f32> {
    let radius = radius.max(MIN_ROLL_RADIUS);
    let tangent = linear_velocity - ground_normal * linear_velocity.dot(&ground_normal);

    if tangent.norm_squared() < stop_threshold * stop_threshold {
        return Vector3::zeros();
    }

    ground_normal.cross(&tangent) / radius
}

/// Exponential-style blend of `current` toward `target`, `t = clamp01(lerp_rate * dt)`.
#[inline]
pub fn blend_angular_velocity(
    current: Vector3<f32>,
    target: Vector3<f32>,
    lerp_rate: f32,
    dt: f32,
) -> Vector3<f32> {
    current.lerp(&target, clamp01(lerp_rate * dt))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    /// Contact radius. `None` (or a non-positive value) derives it from the body's collider.
    pub radius: Option<f32>,
    /// Extra ray length beyond the radius used to decide the sphere is grounded.
    pub ground_check_offset: f32,
    pub ground_layers: LayerMask,
    /// Tangential speed (m/s) under which the target snaps to zero.
    pub stop_threshold: f32,
    /// Blend rate toward the rolling target (1/s).
    pub lerp_rate: f32,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            radius: None,
            ground_check_offset: DEFAULT_GROUND_CHECK_OFFSET,
            ground_layers: LayerMask::ground(),
            stop_threshold: DEFAULT_STOP_THRESHOLD,
            lerp_rate: DEFAULT_ROLL_LERP_RATE,
        }
    }
}

impl RollingConfig {
    /// Negative thresholds, offsets and rates are corrected to zero.
    pub fn validated(self) -> Self {
        let fix = |name: &str, value: f32| {
            if value < 0.0 || value.is_nan() {
                warn!("rolling {name} {value} is invalid; using 0");
                0.0
            } else {
                value
            }
        };
        Self {
            ground_check_offset: fix("ground_check_offset", self.ground_check_offset),
            stop_threshold: fix("stop_threshold", self.stop_threshold),
            lerp_rate: fix("lerp_rate", self.lerp_rate),
            ..self
        }
    }
}

/// What a single physics step did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RollOutcome {
    /// Disabled, or the body could not be read or written.
    Skipped,
    /// No ground under the sphere; angular velocity left alone.
    Airborne,
    /// Angular velocity was blended toward `target`.
    Rolling {
        target: Vector3<f32>,
        applied: Vector3<f32>,
    },
}

#[derive(Debug)]
pub struct RollingController<B> {
    body: B,
    radius: f32,
    config: RollingConfig,
    enabled: bool,
    grounded: bool,
    reported_missing: bool,
}

impl<B: Copy + std::fmt::Debug> RollingController<B> {
    /// Bind a controller to `body`, fixing the contact radius once.
    pub fn new<H>(config: RollingConfig, body: B, host: &H) -> Result<Self, ConfigError>
    where
        H: PhysicsHost<Body = B>,
    {
        let config = config.validated();
        if !host.contains(body) {
            return Err(ConfigError::MissingBody(format!("{body:?}")));
        }

        let radius = match config.radius {
            Some(r) if r > 0.0 => r,
            explicit => {
                if let Some(r) = explicit {
                    warn!("ignoring non-positive rolling radius {r} for {body:?}; deriving it");
                }
                host.collider_radius(body)
                    .filter(|r| *r > 0.0)
                    .ok_or_else(|| ConfigError::MissingRadius(format!("{body:?}")))?
            }
        };

        debug!("rolling controller bound to {body:?} with radius {radius}");

        Ok(Self {
            body,
            radius: radius.max(MIN_ROLL_RADIUS),
            config,
            enabled: true,
            grounded: false,
            reported_missing: false,
        })
    }

    pub fn body(&self) -> B {
        self.body
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn config(&self) -> &RollingConfig {
        &self.config
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Fixed-step callback: ground check, then blend toward the no-slip angular velocity.
    pub fn on_physics_step<H>(&mut self, dt: f32, host: &mut H) -> RollOutcome
    where
        H: PhysicsHost<Body = B>,
    {
        if !self.enabled {
            return RollOutcome::Skipped;
        }

        let body = self.body;
        let (Some(origin), Some(linvel), Some(angvel)) = (
            host.center_of_mass(body),
            host.linear_velocity(body),
            host.angular_velocity(body),
        ) else {
            self.report_missing();
            return RollOutcome::Skipped;
        };

        let ray = GroundRay {
            origin,
            direction: -Vector3::y(),
            max_distance: self.radius + self.config.ground_check_offset,
            layers: self.config.ground_layers,
        };
        let normal = host
            .cast_ray(&ray, Some(body))
            .and_then(|hit| hit.normal.try_normalize(1.0e-6));

        let Some(normal) = normal else {
            self.set_grounded(false);
            return RollOutcome::Airborne;
        };
        self.set_grounded(true);

        let target = compute_angular_velocity_target(
            linvel,
            normal,
            self.radius,
            self.config.stop_threshold,
        );
        let applied = blend_angular_velocity(angvel, target, self.config.lerp_rate, dt);

        if let Err(err) = host.set_angular_velocity(body, applied) {
            warn!("rolling correction dropped: {err}");
            return RollOutcome::Skipped;
        }
        self.reported_missing = false;

        RollOutcome::Rolling { target, applied }
    }

    fn set_grounded(&mut self, grounded: bool) {
        if self.grounded != grounded {
            trace!("{:?} grounded: {grounded}", self.body);
        }
        self.grounded = grounded;
    }

    fn report_missing(&mut self) {
        if !self.reported_missing {
            warn!("rolling body {:?} is gone; skipping correction", self.body);
            self.reported_missing = true;
        }
    }
}

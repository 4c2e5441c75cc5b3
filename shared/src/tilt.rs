//! Two-axis platform tilt driven by directional input.
//!
//! Input is mapped to a `(pitch, roll)` goal, the target chases that goal at a limited angular
//! speed, and the current angles low-pass filter toward the target. Both happen on the frame
//! clock; the resulting orientation is handed to the physics engine on the fixed clock as a
//! kinematic rotation command.

use log::{debug, warn};
use nalgebra::{UnitQuaternion, Vector2};
use serde::{Deserialize, Serialize};

use crate::{
    angles::{TiltAngles, clamp01, lerp_angle, move_towards_angle},
    constants::{DEFAULT_MAX_TILT_ANGLE, DEFAULT_SMOOTH_SPEED, DEFAULT_TILT_SPEED},
    error::{ConfigError, HostError},
    host::PhysicsHost,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Largest tilt on either axis (degrees).
    pub max_tilt_angle: f32,
    /// Rate limit for the target angles (degrees per second).
    pub tilt_speed: f32,
    /// Low-pass rate for the current angles (1/s).
    pub smooth_speed: f32,
    pub invert_horizontal: bool,
    pub invert_vertical: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_tilt_angle: DEFAULT_MAX_TILT_ANGLE,
            tilt_speed: DEFAULT_TILT_SPEED,
            smooth_speed: DEFAULT_SMOOTH_SPEED,
            invert_horizontal: false,
            invert_vertical: false,
        }
    }
}

impl TiltConfig {
    /// Negative rates and limits are corrected to zero.
    pub fn validated(self) -> Self {
        let fix = |name: &str, value: f32| {
            if value < 0.0 || value.is_nan() {
                warn!("tilt {name} {value} is invalid; using 0");
                0.0
            } else {
                value
            }
        };
        Self {
            max_tilt_angle: fix("max_tilt_angle", self.max_tilt_angle),
            tilt_speed: fix("tilt_speed", self.tilt_speed),
            smooth_speed: fix("smooth_speed", self.smooth_speed),
            ..self
        }
    }

    /// Raw two-axis input mapped to the clamped `(pitch, roll)` goal.
    ///
    /// Vertical input pitches, horizontal input rolls the opposite way (`roll = -x * max`) so the
    /// platform dips toward the pressed direction.
    pub fn goal_for_input(&self, input: Vector2<f32>) -> TiltAngles {
        let finite = |v: f32| if v.is_finite() { v } else { 0.0 };
        let mut x = finite(input.x);
        let mut y = finite(input.y);
        if self.invert_horizontal {
            x = -x;
        }
        if self.invert_vertical {
            y = -y;
        }

        let max = self.max_tilt_angle;
        TiltAngles::new(y * max, -x * max).clamped(max)
    }
}

/// Smoothed and rate-limited tilt angles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltState {
    pub current: TiltAngles,
    pub target: TiltAngles,
}

impl TiltState {
    /// Seed both angle pairs from an existing local orientation so enabling doesn't snap.
    pub fn from_rotation(local: &UnitQuaternion<f32>, max_tilt_angle: f32) -> Self {
        let angles = TiltAngles::from_rotation(local).clamped(max_tilt_angle);
        Self {
            current: angles,
            target: angles,
        }
    }

    /// Chase the goal for `input`, moving each axis by at most `tilt_speed * dt`.
    pub fn update_target(&mut self, input: Vector2<f32>, dt: f32, config: &TiltConfig) {
        let goal = config.goal_for_input(input);
        let step = config.tilt_speed * dt.max(0.0);

        self.target = TiltAngles::new(
            move_towards_angle(self.target.pitch, goal.pitch, step),
            move_towards_angle(self.target.roll, goal.roll, step),
        )
        .clamped(config.max_tilt_angle);
    }

    /// Low-pass the current angles toward the target; returns the local orientation.
    pub fn integrate(&mut self, dt: f32, config: &TiltConfig) -> UnitQuaternion<f32> {
        let t = clamp01(config.smooth_speed * dt.max(0.0));
        self.current = TiltAngles::new(
            lerp_angle(self.current.pitch, self.target.pitch, t),
            lerp_angle(self.current.roll, self.target.roll, t),
        );
        self.current.to_rotation()
    }

    pub fn reset(&mut self) {
        self.current = TiltAngles::ZERO;
        self.target = TiltAngles::ZERO;
    }
}

#[derive(Debug)]
pub struct TiltController<B> {
    body: B,
    config: TiltConfig,
    state: TiltState,
    /// World rotation of the platform's parent frame, if any.
    parent: Option<UnitQuaternion<f32>>,
    enabled: bool,
    /// World rotation computed on the last frame, waiting for the next physics step.
    pending: Option<UnitQuaternion<f32>>,
    reported_missing: bool,
}

impl<B: Copy + std::fmt::Debug> TiltController<B> {
    /// Bind to a kinematic `body`, seeding the angles from its current orientation.
    pub fn new<H>(
        config: TiltConfig,
        body: B,
        parent: Option<UnitQuaternion<f32>>,
        host: &H,
    ) -> Result<Self, ConfigError>
    where
        H: PhysicsHost<Body = B>,
    {
        let config = config.validated();
        let world = host
            .rotation(body)
            .ok_or_else(|| ConfigError::MissingBody(format!("{body:?}")))?;
        let local = match parent {
            Some(parent) => parent.inverse() * world,
            None => world,
        };
        let state = TiltState::from_rotation(&local, config.max_tilt_angle);

        debug!(
            "tilt controller bound to {body:?} at pitch {} roll {}",
            state.current.pitch, state.current.roll
        );

        Ok(Self {
            body,
            config,
            state,
            parent,
            enabled: true,
            pending: None,
            reported_missing: false,
        })
    }

    pub fn body(&self) -> B {
        self.body
    }

    pub fn config(&self) -> &TiltConfig {
        &self.config
    }

    pub fn state(&self) -> &TiltState {
        &self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling freezes the platform at its last orientation.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending = None;
        }
    }

    /// Frame callback: update the target from input, then smooth. Returns the world rotation
    /// that the next physics step will apply.
    pub fn on_frame(&mut self, input: Vector2<f32>, dt: f32) -> Option<UnitQuaternion<f32>> {
        if !self.enabled {
            return None;
        }

        self.state.update_target(input, dt, &self.config);
        let local = self.state.integrate(dt, &self.config);
        let world = self.to_world(local);
        self.pending = Some(world);
        Some(world)
    }

    /// Fixed-step callback: issue the latest orientation as a kinematic rotation command.
    pub fn on_physics_step<H>(&mut self, host: &mut H)
    where
        H: PhysicsHost<Body = B>,
    {
        if !self.enabled {
            return;
        }
        let Some(rotation) = self.pending.take() else {
            return;
        };
        self.command(rotation, host);
    }

    /// Push the current smoothed angles to the body right away.
    pub fn apply<H>(&mut self, host: &mut H) -> Result<(), HostError>
    where
        H: PhysicsHost<Body = B>,
    {
        let rotation = self.to_world(self.state.current.to_rotation());
        host.move_rotation(self.body, rotation)
    }

    /// Level the platform instantly. Not rate limited.
    pub fn reset_tilt<H>(&mut self, host: &mut H)
    where
        H: PhysicsHost<Body = B>,
    {
        self.state.reset();
        self.pending = None;
        debug!("tilt reset on {:?}", self.body);
        if let Err(err) = self.apply(host) {
            warn!("tilt reset dropped: {err}");
        }
    }

    fn command<H>(&mut self, rotation: UnitQuaternion<f32>, host: &mut H)
    where
        H: PhysicsHost<Body = B>,
    {
        match host.move_rotation(self.body, rotation) {
            Ok(()) => self.reported_missing = false,
            Err(err) if !self.reported_missing => {
                warn!("tilt command dropped: {err}");
                self.reported_missing = true;
            }
            Err(_) => {}
        }
    }

    fn to_world(&self, local: UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        match self.parent {
            Some(parent) => parent * local,
            None => local,
        }
    }
}

pub mod angles;
pub mod constants;
pub mod error;
pub mod host;
pub mod layers;
pub mod rapier;
pub mod rapier_world;
pub mod rolling;
pub mod spawn;
pub mod tilt;

#[cfg(test)]
pub(crate) mod test_support;

pub use angles::TiltAngles;
pub use constants::{
    DEFAULT_FIXED_DT, DEFAULT_GROUND_CHECK_OFFSET, DEFAULT_MAX_TILT_ANGLE, DEFAULT_ROLL_LERP_RATE,
    DEFAULT_SMOOTH_SPEED, DEFAULT_STOP_THRESHOLD, DEFAULT_TILT_SPEED, GRAVITY_MPS2,
    MIN_ROLL_RADIUS,
};
pub use error::{ConfigError, HostError};
pub use host::{GroundHit, GroundRay, PhysicsHost};
pub use layers::{CollisionLayer, LayerMask};
pub use rapier::{ColliderShapeDef, StaticDef, collider_from_def};
pub use rapier_world::PhysicsWorld;
pub use rolling::{
    RollOutcome, RollingConfig, RollingController, blend_angular_velocity,
    compute_angular_velocity_target,
};
pub use spawn::{PlatformDef, PlayerSpawnDef, SpawnPoint, respawn, spawn_platform, spawn_player};
pub use tilt::{TiltConfig, TiltController, TiltState};

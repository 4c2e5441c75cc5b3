use thiserror::Error;

/// A controller could not be built from what the host supplied.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("body {0} is not present in the physics world")]
    MissingBody(String),
    #[error("no radius configured and none derivable from the colliders of body {0}")]
    MissingRadius(String),
}

/// A host refused a body mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("body {0} is not present in the physics world")]
    MissingBody(String),
    #[error("body {0} is not kinematic and cannot take a rotation command")]
    NotKinematic(String),
}

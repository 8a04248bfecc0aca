use thiserror::Error;

use crate::charge::ChargeId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChargeError {
    #[error("charge extent must be >= 0, got {extent}")]
    NegativeExtent { extent: f32 },
    #[error("charge {field} is not finite")]
    NonFinite { field: &'static str },
    #[error("unknown charge shape `{0}` (expected point, line, ring or disk)")]
    UnknownShape(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("charge index {index} out of range (scene holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("placement at ({x:.1}, {y:.1}) is closer than {min_distance} to an existing charge")]
    TooClose { x: f32, y: f32, min_distance: f32 },
    #[error("no charge with id {0}")]
    UnknownId(ChargeId),
    #[error(transparent)]
    Charge(#[from] ChargeError),
}

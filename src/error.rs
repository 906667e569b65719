//! Error types for stat evaluation and progression.
//!
//! Almost everything in this crate recovers locally ("no effect" is a valid
//! outcome), so the error surface is small. The one loud failure is
//! evaluating a current-pool stat whose pool maximum was never stored.

use crate::stat_kind::StatKind;
use thiserror::Error;

/// Errors that can occur while evaluating stats or managing a character.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{StatError, StatKind};
///
/// let err = StatError::UninitializedPool {
///     current: StatKind::CurrentHealth,
///     pool: StatKind::Health,
/// };
/// assert!(err.to_string().contains("Health"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    /// A current-pool stat was evaluated before its pool maximum was stored.
    #[error("Cannot evaluate {current}: pool maximum {pool} is not initialized")]
    UninitializedPool { current: StatKind, pool: StatKind },

    /// Every equipment slot is already taken.
    #[error("Equipment slots full (capacity {capacity})")]
    EquipmentFull { capacity: usize },

    /// The item cannot act as an equipment modifier.
    #[error("Invalid equipment: {0}")]
    InvalidEquipment(String),

    /// A stat kind name could not be parsed.
    #[error("Unknown stat kind: {0}")]
    UnknownStat(String),

    /// A character snapshot could not be encoded or decoded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// A configuration document could not be decoded or describes an unplayable progression.
    #[error("Config error: {0}")]
    Config(String),
}

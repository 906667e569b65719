//! Resolved stat results module.
//!
//! A `ResolvedStat` is the outcome of one pass through the stat pipeline,
//! with the value after each stage that ran. Handy for tooltips and for
//! explaining why a number came out the way it did.

use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};

/// A stat value with its stage-by-stage breakdown.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{ResolvedStat, StatKind};
///
/// let mut resolved = ResolvedStat::new(StatKind::Attack, 10.0);
/// resolved.add_step("equipment (+5.00, ×1.00)", 15.0);
///
/// assert_eq!(resolved.raw, 10.0);
/// assert_eq!(resolved.value, 15.0);
/// assert_eq!(resolved.steps.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedStat {
    pub kind: StatKind,

    /// Stored value before any stage.
    pub raw: f64,

    /// Final value.
    pub value: f64,

    /// `(stage description, value after the stage)`, in application order.
    pub steps: Vec<(String, f64)>,

    /// Whether the pool clamp lowered the value (and the stored current value).
    pub clamped: bool,
}

impl ResolvedStat {
    /// A breakdown holding only the raw value.
    pub fn new(kind: StatKind, raw: f64) -> Self {
        Self {
            kind,
            raw,
            value: raw,
            steps: Vec::new(),
            clamped: false,
        }
    }

    /// Record a stage and make its output the current value.
    pub fn add_step(&mut self, description: impl Into<String>, value: f64) {
        self.steps.push((description.into(), value));
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_no_steps() {
        let stat = ResolvedStat::new(StatKind::Speed, 4.0);
        assert_eq!(stat.value, 4.0);
        assert!(stat.steps.is_empty());
        assert!(!stat.clamped);
    }

    #[test]
    fn test_steps_keep_order() {
        let mut stat = ResolvedStat::new(StatKind::Attack, 10.0);
        stat.add_step("identity", 20.0);
        stat.add_step("equipment", 25.0);
        assert_eq!(stat.steps[0].0, "identity");
        assert_eq!(stat.steps[1], ("equipment".to_string(), 25.0));
        assert_eq!(stat.value, 25.0);
    }
}

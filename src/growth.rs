//! Growth table module.
//!
//! Maps a stat kind to the amount it grows when a character reaches a new
//! level. Growth is a pure function of `(kind, level)`; unknown kinds grow
//! by zero.

use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that can answer "how much does this stat grow at this level".
///
/// # Examples
///
/// ```rust
/// use zzlevel::{GrowthCurve, GrowthRule, GrowthTable, StatKind};
///
/// let table = GrowthTable::new()
///     .with_rule(StatKind::Attack, GrowthRule::Constant { value: 2.0 })
///     .with_rule(StatKind::Health, GrowthRule::Linear { base: 10.0, per_level: 1.0 });
///
/// assert_eq!(table.growth(&StatKind::Attack, 5), 2.0);
/// assert_eq!(table.growth(&StatKind::Health, 5), 15.0);
/// assert_eq!(table.growth(&StatKind::Speed, 5), 0.0);
/// ```
pub trait GrowthCurve {
    /// Growth delta applied to `kind` on reaching `level`.
    fn growth(&self, kind: &StatKind, level: u32) -> f64;
}

/// Per-stat growth formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrowthRule {
    /// Same delta at every level.
    Constant { value: f64 },
    /// `base + per_level × level`.
    Linear { base: f64, per_level: f64 },
}

impl GrowthRule {
    /// Growth on reaching `level`.
    pub fn delta(&self, level: u32) -> f64 {
        match *self {
            GrowthRule::Constant { value } => value,
            GrowthRule::Linear { base, per_level } => base + per_level * f64::from(level),
        }
    }
}

/// Table of growth rules keyed by stat kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthTable {
    rules: BTreeMap<StatKind, GrowthRule>,
}

impl GrowthTable {
    /// Empty table: every stat grows by zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for `kind`.
    pub fn insert(&mut self, kind: StatKind, rule: GrowthRule) {
        self.rules.insert(kind, rule);
    }

    /// Builder form of [`GrowthTable::insert`].
    pub fn with_rule(mut self, kind: StatKind, rule: GrowthRule) -> Self {
        self.insert(kind, rule);
        self
    }

    /// Rule configured for `kind`.
    pub fn rule(&self, kind: &StatKind) -> Option<&GrowthRule> {
        self.rules.get(kind)
    }
}

impl GrowthCurve for GrowthTable {
    fn growth(&self, kind: &StatKind, level: u32) -> f64 {
        self.rules.get(kind).map(|rule| rule.delta(level)).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kind_grows_zero() {
        let table = GrowthTable::new();
        assert_eq!(table.growth(&StatKind::Attack, 10), 0.0);
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = GrowthTable::new();
        table.insert(StatKind::Defense, GrowthRule::Constant { value: 1.0 });
        table.insert(StatKind::Defense, GrowthRule::Constant { value: 3.0 });
        assert_eq!(table.growth(&StatKind::Defense, 2), 3.0);
    }

    #[test]
    fn test_linear_depends_on_level() {
        let rule = GrowthRule::Linear {
            base: 1.0,
            per_level: 0.5,
        };
        assert_eq!(rule.delta(2), 2.0);
        assert_eq!(rule.delta(4), 3.0);
    }

    #[test]
    fn test_table_json_shape() {
        let table =
            GrowthTable::new().with_rule(StatKind::Mana, GrowthRule::Constant { value: 4.0 });
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rules"]["Mana"]["type"], "constant");
    }
}

//! Stat sources module.
//!
//! Sources answer the first question of every evaluation: what is the raw
//! stored value of a stat? Lookup is two-tier. Specially handled kinds
//! (the live current-pool values) are asked first, then the table of plain
//! stored base values. A kind neither tier knows has no raw value.

use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Something that can provide a stored value for a stat.
///
/// Returns `None` when the source does not hold `kind`.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{BaseStats, StatKind, StatSource};
///
/// let base = BaseStats::new().with(StatKind::Attack, 12.0);
/// assert_eq!(base.get_value(&StatKind::Attack), Some(12.0));
/// assert_eq!(base.get_value(&StatKind::Defense), None);
/// ```
pub trait StatSource {
    fn get_value(&self, kind: &StatKind) -> Option<f64>;
}

/// Stored base values for every non-current stat of a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseStats {
    values: BTreeMap<StatKind, f64>,
}

impl BaseStats {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`BaseStats::set`].
    pub fn with(mut self, kind: StatKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }

    /// Store `value` for `kind`, replacing any previous value.
    pub fn set(&mut self, kind: StatKind, value: f64) {
        self.values.insert(kind, value);
    }

    /// Stored value of `kind`, if any.
    pub fn get(&self, kind: &StatKind) -> Option<f64> {
        self.values.get(kind).copied()
    }

    /// Add `delta` to a stored value, treating a missing value as zero.
    pub fn add(&mut self, kind: StatKind, delta: f64) {
        *self.values.entry(kind).or_insert(0.0) += delta;
    }

    /// Whether `kind` has a stored value.
    pub fn contains(&self, kind: &StatKind) -> bool {
        self.values.contains_key(kind)
    }

    /// Stored values in stat-kind order.
    pub fn iter(&self) -> impl Iterator<Item = (&StatKind, f64)> {
        self.values.iter().map(|(kind, value)| (kind, *value))
    }
}

impl StatSource for BaseStats {
    fn get_value(&self, kind: &StatKind) -> Option<f64> {
        self.get(kind)
    }
}

/// Live current values of the pool stats.
///
/// These are game state, not derived: they persist across queries and
/// are written back when a query clamps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolValues {
    pub current_health: f64,
    pub current_mana: f64,
}

impl PoolValues {
    /// Pools holding the given current values.
    pub fn new(current_health: f64, current_mana: f64) -> Self {
        Self {
            current_health,
            current_mana,
        }
    }

    /// Current value for a current-pool kind; `None` for every other kind.
    pub fn get(&self, kind: &StatKind) -> Option<f64> {
        match kind {
            StatKind::CurrentHealth => Some(self.current_health),
            StatKind::CurrentMana => Some(self.current_mana),
            _ => None,
        }
    }

    /// Store a current value. Returns `false` if `kind` is not a current-pool kind.
    pub fn set(&mut self, kind: &StatKind, value: f64) -> bool {
        match kind {
            StatKind::CurrentHealth => self.current_health = value,
            StatKind::CurrentMana => self.current_mana = value,
            _ => return false,
        }
        true
    }
}

impl StatSource for PoolValues {
    fn get_value(&self, kind: &StatKind) -> Option<f64> {
        self.get(kind)
    }
}

/// Two-tier lookup: `special` first, then `fallback`.
///
/// # Examples
///
/// ```rust
/// use zzlevel::source::{LayeredSource, PoolValues};
/// use zzlevel::{BaseStats, StatKind, StatSource};
///
/// let base = BaseStats::new().with(StatKind::Health, 100.0);
/// let pools = PoolValues::new(80.0, 0.0);
/// let source = LayeredSource::new(&pools, &base);
///
/// assert_eq!(source.get_value(&StatKind::CurrentHealth), Some(80.0));
/// assert_eq!(source.get_value(&StatKind::Health), Some(100.0));
/// ```
pub struct LayeredSource<'a> {
    special: &'a dyn StatSource,
    fallback: &'a dyn StatSource,
}

impl<'a> LayeredSource<'a> {
    /// Look up in `special`, then `fallback`.
    pub fn new(special: &'a dyn StatSource, fallback: &'a dyn StatSource) -> Self {
        Self { special, fallback }
    }
}

impl StatSource for LayeredSource<'_> {
    fn get_value(&self, kind: &StatKind) -> Option<f64> {
        self.special
            .get_value(kind)
            .or_else(|| self.fallback.get_value(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_missing_starts_at_zero() {
        let mut base = BaseStats::new();
        base.add(StatKind::Speed, 1.5);
        base.add(StatKind::Speed, 1.5);
        assert_eq!(base.get(&StatKind::Speed), Some(3.0));
    }

    #[test]
    fn test_pool_set_rejects_non_current() {
        let mut pools = PoolValues::default();
        assert!(!pools.set(&StatKind::Health, 10.0));
        assert!(pools.set(&StatKind::CurrentMana, 10.0));
        assert_eq!(pools.current_mana, 10.0);
    }

    #[test]
    fn test_layered_prefers_special_tier() {
        let base = BaseStats::new().with(StatKind::CurrentMana, 999.0);
        let pools = PoolValues::new(0.0, 5.0);
        let source = LayeredSource::new(&pools, &base);
        assert_eq!(source.get_value(&StatKind::CurrentMana), Some(5.0));
        assert_eq!(source.get_value(&StatKind::Attack), None);
    }

    #[test]
    fn test_base_stats_json_is_flat_map() {
        let base = BaseStats::new().with(StatKind::Attack, 3.0);
        assert_eq!(serde_json::to_string(&base).unwrap(), r#"{"Attack":3.0}"#);
    }
}

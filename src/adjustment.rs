//! Identity adjustment module.
//!
//! Characters built from the same template are told apart by a type tag.
//! An adjustment rule rescales base stats for one tag before any equipment
//! or status effect is applied. Rules only ever apply to primary instances;
//! derived clones share the primary's growth and skip adjustment so the
//! rescale never compounds.

use crate::id::TypeTag;
use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a character is an original or a copy derived from one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Lineage {
    /// Subject to identity adjustments and level-up notifications.
    #[default]
    Primary,
    /// Exempt from both.
    Derived,
}

impl Lineage {
    /// Whether this is an original instance.
    pub fn is_primary(self) -> bool {
        matches!(self, Lineage::Primary)
    }
}

/// Per-stat multipliers for one type tag.
///
/// Stats without a multiplier pass through unchanged.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{StatAdjustment, StatKind};
///
/// let fire = StatAdjustment::new("Fire")
///     .with_multiplier(StatKind::Attack, 1.5)
///     .with_multiplier(StatKind::Defense, 0.5);
///
/// assert_eq!(fire.adjust(&StatKind::Attack, 10.0), 15.0);
/// assert_eq!(fire.adjust(&StatKind::Speed, 10.0), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatAdjustment {
    pub tag: TypeTag,
    #[serde(default)]
    multipliers: BTreeMap<StatKind, f64>,
}

impl StatAdjustment {
    /// Rule for `tag` with no multipliers.
    pub fn new(tag: impl Into<TypeTag>) -> Self {
        Self {
            tag: tag.into(),
            multipliers: BTreeMap::new(),
        }
    }

    /// Scale `kind` by `multiplier` for this tag.
    pub fn with_multiplier(mut self, kind: StatKind, multiplier: f64) -> Self {
        self.multipliers.insert(kind, multiplier);
        self
    }

    /// Multiplier configured for `kind`.
    pub fn multiplier(&self, kind: &StatKind) -> Option<f64> {
        self.multipliers.get(kind).copied()
    }

    /// Rescale `raw` for `kind`.
    pub fn adjust(&self, kind: &StatKind, raw: f64) -> f64 {
        match self.multipliers.get(kind) {
            Some(multiplier) => raw * multiplier,
            None => raw,
        }
    }
}

/// Ordered adjustment rules. Selection is first match by tag.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{AdjustmentSet, StatAdjustment, StatKind, TypeTag};
///
/// let set = AdjustmentSet::from(vec![
///     StatAdjustment::new("Ice").with_multiplier(StatKind::Defense, 2.0),
///     StatAdjustment::new("Ice").with_multiplier(StatKind::Defense, 9.0),
/// ]);
///
/// let ice = TypeTag::new("Ice");
/// assert_eq!(set.select(&ice).unwrap().multiplier(&StatKind::Defense), Some(2.0));
/// assert!(set.select(&TypeTag::new("Fire")).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentSet {
    rules: Vec<StatAdjustment>,
}

impl AdjustmentSet {
    /// No rules: every tag passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Earlier rules win on a tag collision.
    pub fn push(&mut self, rule: StatAdjustment) {
        self.rules.push(rule);
    }

    /// The first rule whose tag equals `tag`.
    pub fn select(&self, tag: &TypeTag) -> Option<&StatAdjustment> {
        self.rules.iter().find(|rule| &rule.tag == tag)
    }

    /// Adjust `raw` using the rule selected by `tag`, or pass it through.
    pub fn adjust(&self, tag: &TypeTag, kind: &StatKind, raw: f64) -> f64 {
        self.select(tag)
            .map(|rule| rule.adjust(kind, raw))
            .unwrap_or(raw)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in selection order.
    pub fn iter(&self) -> impl Iterator<Item = &StatAdjustment> {
        self.rules.iter()
    }
}

impl From<Vec<StatAdjustment>> for AdjustmentSet {
    fn from(rules: Vec<StatAdjustment>) -> Self {
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_match_passes_through() {
        let set = AdjustmentSet::from(vec![
            StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 3.0)
        ]);
        assert_eq!(set.adjust(&TypeTag::new("Water"), &StatKind::Attack, 12.0), 12.0);
    }

    #[test]
    fn test_first_match_wins() {
        let mut set = AdjustmentSet::new();
        set.push(StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 2.0));
        set.push(StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 4.0));
        assert_eq!(set.adjust(&TypeTag::new("Fire"), &StatKind::Attack, 5.0), 10.0);
    }

    #[test]
    fn test_lineage_default_is_primary() {
        assert!(Lineage::default().is_primary());
        assert!(!Lineage::Derived.is_primary());
    }
}

//! Stat engine module.
//!
//! The `StatEngine` owns one character's stored stats, its equipment and
//! the status effects an external manager has attached. Every query runs
//! the same pipeline fresh (nothing is cached):
//!
//! ```text
//! raw → [identity] → [equipment] → [status] → [pool clamp]
//! ```
//!
//! Which bracketed stages run is chosen with [`Stages`]. The pool clamp is a
//! mutating read: when a current-pool value exceeds its pool's effective
//! maximum, the stored current value is lowered to match.

use crate::adjustment::{AdjustmentSet, Lineage};
use crate::config::ProgressionConfig;
use crate::error::StatError;
use crate::id::{CharacterId, EffectId, ItemId, TypeTag};
use crate::modifier::{Equipment, ModifierAccumulator, StatusEffect};
use crate::resolved::ResolvedStat;
use crate::source::{BaseStats, LayeredSource, PoolValues, StatSource};
use crate::stat_kind::StatKind;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

bitflags! {
    /// Pipeline stages to run for a query.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::Stages;
    ///
    /// assert!(Stages::EFFECTIVE.contains(Stages::EQUIPMENT));
    /// assert!(!Stages::ADJUSTED.contains(Stages::STATUS));
    /// assert!(Stages::ADJUSTED.contains(Stages::CLAMP));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Stages: u8 {
        /// Rescale by the identity adjustment selected by type tag (primary instances only).
        const IDENTITY = 1 << 0;
        /// Apply equipment boosts.
        const EQUIPMENT = 1 << 1;
        /// Apply buffs and debuffs.
        const STATUS = 1 << 2;
        /// Clamp current-pool values to the effective pool maximum.
        const CLAMP = 1 << 3;

        /// Identity and clamp only. Used by leveling so equipment never leaks into growth.
        const ADJUSTED = Self::IDENTITY.bits() | Self::CLAMP.bits();
        /// Every stage.
        const EFFECTIVE = Self::IDENTITY.bits()
            | Self::EQUIPMENT.bits()
            | Self::STATUS.bits()
            | Self::CLAMP.bits();
    }
}

/// Evaluates stats for one character.
///
/// # Examples
///
/// ```rust
/// use zzlevel::*;
///
/// let mut engine = StatEngine::new(CharacterId(1), TypeTag::new("Fire"))
///     .with_base(BaseStats::new().with(StatKind::Attack, 10.0));
///
/// engine.equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 5.0));
/// engine.add_effect(StatusEffect::buff(
///     EffectId(1),
///     StatKind::All,
///     ModifierValue::Percent(100.0),
/// ));
///
/// // (10 + 5) × 2
/// assert_eq!(engine.effective_stat(&StatKind::Attack).unwrap(), 30.0);
/// assert_eq!(engine.adjusted_stat(&StatKind::Attack).unwrap(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEngine {
    owner: CharacterId,
    #[serde(default)]
    lineage: Lineage,
    type_tag: TypeTag,
    base: BaseStats,
    #[serde(default)]
    pools: PoolValues,
    #[serde(default)]
    adjustments: AdjustmentSet,
    #[serde(default)]
    equipment: Vec<Equipment>,
    #[serde(default)]
    effects: Vec<StatusEffect>,
    max_equipment: usize,
}

impl StatEngine {
    /// A primary engine for `owner` with no stats, items or effects.
    ///
    /// Slot capacity starts at [`ProgressionConfig::DEFAULT_MAX_EQUIPMENT`].
    pub fn new(owner: CharacterId, type_tag: TypeTag) -> Self {
        Self {
            owner,
            lineage: Lineage::Primary,
            type_tag,
            base: BaseStats::new(),
            pools: PoolValues::default(),
            adjustments: AdjustmentSet::new(),
            equipment: Vec::new(),
            effects: Vec::new(),
            max_equipment: ProgressionConfig::DEFAULT_MAX_EQUIPMENT,
        }
    }

    /// Replace the stored base values.
    pub fn with_base(mut self, base: BaseStats) -> Self {
        self.base = base;
        self
    }

    /// Replace the live current-pool values.
    pub fn with_pools(mut self, pools: PoolValues) -> Self {
        self.pools = pools;
        self
    }

    /// Replace the identity adjustment rules.
    pub fn with_adjustments(mut self, adjustments: AdjustmentSet) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Mark the engine as primary or derived.
    pub fn with_lineage(mut self, lineage: Lineage) -> Self {
        self.lineage = lineage;
        self
    }

    /// Set the number of equipment slots.
    pub fn with_max_equipment(mut self, max_equipment: usize) -> Self {
        self.max_equipment = max_equipment;
        self
    }

    /// The character this engine evaluates.
    pub fn owner(&self) -> CharacterId {
        self.owner
    }

    /// Whether identity adjustments apply.
    pub fn lineage(&self) -> Lineage {
        self.lineage
    }

    /// Tag used to select the identity adjustment.
    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    /// Stored base values.
    pub fn base_stats(&self) -> &BaseStats {
        &self.base
    }

    /// Live current-pool values, as last written.
    pub fn pools(&self) -> PoolValues {
        self.pools
    }

    /// Identity adjustment rules.
    pub fn adjustments(&self) -> &AdjustmentSet {
        &self.adjustments
    }

    /// Identity adjustment rules, for editing in place.
    pub fn adjustments_mut(&mut self) -> &mut AdjustmentSet {
        &mut self.adjustments
    }

    /// Store a value. Current-pool kinds go to the live pool values.
    pub fn set_base(&mut self, kind: StatKind, value: f64) {
        if !self.pools.set(&kind, value) {
            self.base.set(kind, value);
        }
    }

    /// Add `delta` to a stored base value.
    pub fn grow_base(&mut self, kind: StatKind, delta: f64) {
        self.base.add(kind, delta);
    }

    /// Rebind the engine to another character, carrying the item back-references along.
    pub(crate) fn rebind(&mut self, owner: CharacterId, lineage: Lineage) {
        self.owner = owner;
        self.lineage = lineage;
        for item in &mut self.equipment {
            item.set_owner(Some(owner));
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Final value of `kind` with every stage applied.
    ///
    /// Querying `CurrentHealth` / `CurrentMana` may lower the stored current
    /// value to the pool's effective maximum. Fails only when that maximum
    /// was never stored.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let mut engine = StatEngine::new(CharacterId(1), TypeTag::new("Fire"))
    ///     .with_base(BaseStats::new().with(StatKind::Health, 100.0))
    ///     .with_pools(PoolValues::new(100.0, 0.0));
    ///
    /// engine.add_effect(StatusEffect::debuff(
    ///     EffectId(1),
    ///     StatKind::Health,
    ///     ModifierValue::Percent(50.0),
    /// ));
    ///
    /// // Reading the current pool lowers it to the reduced maximum.
    /// assert_eq!(engine.effective_stat(&StatKind::CurrentHealth).unwrap(), 50.0);
    /// assert_eq!(engine.pools().current_health, 50.0);
    /// ```
    pub fn effective_stat(&mut self, kind: &StatKind) -> Result<f64, StatError> {
        self.resolve(kind, Stages::EFFECTIVE).map(|r| r.value)
    }

    /// Value of `kind` with identity adjustment and pool clamp, but no
    /// equipment or status effects.
    pub fn adjusted_stat(&mut self, kind: &StatKind) -> Result<f64, StatError> {
        self.resolve(kind, Stages::ADJUSTED).map(|r| r.value)
    }

    /// Stored value of `kind` with no stage applied. Unknown kinds are 0.
    pub fn raw_stat(&self, kind: &StatKind) -> f64 {
        LayeredSource::new(&self.pools, &self.base)
            .get_value(kind)
            .unwrap_or(0.0)
    }

    /// Run the pipeline for `kind` with the chosen stages and return the breakdown.
    ///
    /// Equipment and status steps are always recorded when their stage runs;
    /// the identity step only when a rule matches the type tag.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let mut engine = StatEngine::new(CharacterId(1), TypeTag::new("Fire"))
    ///     .with_base(BaseStats::new().with(StatKind::Attack, 10.0))
    ///     .with_adjustments(AdjustmentSet::from(vec![
    ///         StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 2.0),
    ///     ]));
    /// engine.equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 5.0));
    ///
    /// let resolved = engine.resolve(&StatKind::Attack, Stages::EFFECTIVE).unwrap();
    /// assert_eq!(resolved.raw, 10.0);
    /// assert_eq!(resolved.value, 25.0);
    /// assert_eq!(resolved.steps.len(), 3);
    /// assert!(!resolved.clamped);
    /// ```
    pub fn resolve(&mut self, kind: &StatKind, stages: Stages) -> Result<ResolvedStat, StatError> {
        if kind.is_wildcard() {
            return Ok(ResolvedStat::new(kind.clone(), 0.0));
        }

        let mut resolved = ResolvedStat::new(kind.clone(), self.raw_stat(kind));

        if stages.contains(Stages::IDENTITY) && self.lineage.is_primary() {
            if let Some(rule) = self.adjustments.select(&self.type_tag) {
                let adjusted = rule.adjust(kind, resolved.value);
                resolved.add_step(format!("identity ({})", rule.tag), adjusted);
            }
        }

        if stages.contains(Stages::EQUIPMENT) {
            let acc = ModifierAccumulator::from_equipment(&self.equipment, kind);
            resolved.add_step(describe("equipment", &acc), acc.apply(resolved.value));
        }

        if stages.contains(Stages::STATUS) {
            let acc = ModifierAccumulator::from_effects(&self.effects, kind);
            resolved.add_step(describe("status", &acc), acc.apply(resolved.value));
        }

        if stages.contains(Stages::CLAMP) {
            if let Some(pool) = kind.pool_max() {
                let max = self.pool_ceiling(kind, &pool)?;
                if max < resolved.value {
                    debug!(
                        owner = %self.owner,
                        stat = %kind,
                        from = resolved.value,
                        to = max,
                        "clamping current pool value"
                    );
                    self.pools.set(kind, max);
                    resolved.add_step(format!("clamp to {pool}"), max);
                    resolved.clamped = true;
                }
            }
        }

        Ok(resolved)
    }

    /// Effective maximum of `pool`, failing if it was never stored.
    fn pool_ceiling(&mut self, current: &StatKind, pool: &StatKind) -> Result<f64, StatError> {
        if !self.base.contains(pool) {
            return Err(StatError::UninitializedPool {
                current: current.clone(),
                pool: pool.clone(),
            });
        }
        self.effective_stat(pool)
    }

    // ------------------------------------------------------------------
    // Pools
    // ------------------------------------------------------------------

    /// Add to current mana, capped at effective max mana. Returns the new current mana.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let mut engine = StatEngine::new(CharacterId(1), TypeTag::new("Ice"))
    ///     .with_base(BaseStats::new().with(StatKind::Mana, 40.0))
    ///     .with_pools(PoolValues::new(0.0, 35.0));
    ///
    /// assert_eq!(engine.regenerate_mana(10.0).unwrap(), 40.0);
    /// ```
    pub fn regenerate_mana(&mut self, amount: f64) -> Result<f64, StatError> {
        self.restore_pool(&StatKind::CurrentMana, amount)
    }

    /// Add to current health, capped at effective max health. Returns the new current health.
    pub fn restore_health(&mut self, amount: f64) -> Result<f64, StatError> {
        self.restore_pool(&StatKind::CurrentHealth, amount)
    }

    fn restore_pool(&mut self, current: &StatKind, amount: f64) -> Result<f64, StatError> {
        let Some(pool) = current.pool_max() else {
            return Ok(self.raw_stat(current));
        };
        let ceiling = self.pool_ceiling(current, &pool)?;
        let mut value = self.raw_stat(current) + amount;
        if value > ceiling {
            value = ceiling;
        }
        self.pools.set(current, value);
        Ok(value)
    }

    /// Subtract from current health, never going below zero. Returns the new current health.
    pub fn apply_damage(&mut self, amount: f64) -> f64 {
        let value = (self.pools.current_health - amount).max(0.0);
        self.pools.current_health = value;
        value
    }

    /// Pay `cost` from current mana. Returns `false` without spending when
    /// there is not enough.
    pub fn spend_mana(&mut self, cost: f64) -> Result<bool, StatError> {
        self.resolve(&StatKind::CurrentMana, Stages::CLAMP)?;
        if self.pools.current_mana < cost {
            return Ok(false);
        }
        self.pools.current_mana -= cost;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Equipment
    // ------------------------------------------------------------------

    /// Attach an item, or explain why not. Nothing changes on failure.
    ///
    /// # Errors
    ///
    /// [`StatError::EquipmentFull`] when every slot is taken, and
    /// [`StatError::InvalidEquipment`] for an `All` target, a non-finite
    /// magnitude or an id that is already equipped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let mut engine =
    ///     StatEngine::new(CharacterId(1), TypeTag::new("Fire")).with_max_equipment(1);
    /// engine.try_equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 5.0)).unwrap();
    ///
    /// let err = engine
    ///     .try_equip_item(Equipment::flat(ItemId(2), "Axe", StatKind::Attack, 7.0))
    ///     .unwrap_err();
    /// assert_eq!(err, StatError::EquipmentFull { capacity: 1 });
    /// assert_eq!(engine.equipment()[0].owner(), Some(CharacterId(1)));
    /// ```
    pub fn try_equip_item(&mut self, mut item: Equipment) -> Result<(), StatError> {
        if self.equipment.len() >= self.max_equipment {
            return Err(StatError::EquipmentFull {
                capacity: self.max_equipment,
            });
        }
        item.validate()?;
        if self.equipment.iter().any(|equipped| equipped.id == item.id) {
            return Err(StatError::InvalidEquipment(format!(
                "{} is already equipped",
                item.id
            )));
        }

        item.set_owner(Some(self.owner));
        debug!(owner = %self.owner, item = %item.id, stat = %item.target, "equipped item");
        self.equipment.push(item);
        Ok(())
    }

    /// Attach an item. Returns `false` (and changes nothing) when slots are
    /// full or the item is invalid.
    pub fn equip_item(&mut self, item: Equipment) -> bool {
        match self.try_equip_item(item) {
            Ok(()) => true,
            Err(err) => {
                debug!(owner = %self.owner, error = %err, "equip rejected");
                false
            }
        }
    }

    /// Detach an item, clearing its owner.
    pub fn unequip_item(&mut self, id: ItemId) -> Option<Equipment> {
        let index = self.equipment.iter().position(|item| item.id == id)?;
        let mut item = self.equipment.remove(index);
        item.set_owner(None);
        debug!(owner = %self.owner, item = %id, "unequipped item");
        Some(item)
    }

    /// Attached items, in equip order.
    pub fn equipment(&self) -> &[Equipment] {
        &self.equipment
    }

    /// Number of equipment slots.
    pub fn equipment_capacity(&self) -> usize {
        self.max_equipment
    }

    // ------------------------------------------------------------------
    // Status effects (lifecycle owned by the caller)
    // ------------------------------------------------------------------

    /// Attach a status effect. It stays until removed.
    pub fn add_effect(&mut self, effect: StatusEffect) {
        debug!(owner = %self.owner, effect = %effect.id, stat = %effect.target, "effect added");
        self.effects.push(effect);
    }

    /// Detach the first effect with `id`.
    pub fn remove_effect(&mut self, id: EffectId) -> Option<StatusEffect> {
        let index = self.effects.iter().position(|effect| effect.id == id)?;
        debug!(owner = %self.owner, effect = %id, "effect removed");
        Some(self.effects.remove(index))
    }

    /// Detach every status effect.
    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    /// Active status effects, in the order they were added.
    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }
}

fn describe(stage: &str, acc: &ModifierAccumulator) -> String {
    format!("{stage} (+{:.2}, ×{:.2})", acc.additive, acc.multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::StatAdjustment;
    use crate::modifier::ModifierValue;

    fn engine() -> StatEngine {
        StatEngine::new(CharacterId(1), TypeTag::new("Fire")).with_base(
            BaseStats::new()
                .with(StatKind::Attack, 10.0)
                .with(StatKind::Health, 100.0)
                .with(StatKind::Mana, 50.0),
        )
    }

    #[test]
    fn test_raw_ignores_everything() {
        let mut e = engine().with_adjustments(AdjustmentSet::from(vec![
            StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 2.0),
        ]));
        e.equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 5.0));
        assert_eq!(e.raw_stat(&StatKind::Attack), 10.0);
        assert_eq!(e.adjusted_stat(&StatKind::Attack).unwrap(), 20.0);
        assert_eq!(e.effective_stat(&StatKind::Attack).unwrap(), 25.0);
    }

    #[test]
    fn test_unknown_kind_is_zero() {
        let mut e = engine();
        assert_eq!(e.effective_stat(&StatKind::custom("Luck")).unwrap(), 0.0);
        assert_eq!(e.effective_stat(&StatKind::All).unwrap(), 0.0);
    }

    #[test]
    fn test_resolve_breakdown_steps() {
        let mut e = engine();
        let resolved = e.resolve(&StatKind::Attack, Stages::EFFECTIVE).unwrap();
        // No identity rule for Fire, so only equipment and status steps.
        assert_eq!(resolved.steps.len(), 2);
        assert_eq!(resolved.value, 10.0);
    }

    #[test]
    fn test_set_base_routes_current_kinds() {
        let mut e = engine();
        e.set_base(StatKind::CurrentHealth, 40.0);
        assert_eq!(e.pools().current_health, 40.0);
        assert!(!e.base_stats().contains(&StatKind::CurrentHealth));
    }

    #[test]
    fn test_uninitialized_pool_fails() {
        let mut e = StatEngine::new(CharacterId(1), TypeTag::new("Fire"));
        let err = e.effective_stat(&StatKind::CurrentMana).unwrap_err();
        assert_eq!(
            err,
            StatError::UninitializedPool {
                current: StatKind::CurrentMana,
                pool: StatKind::Mana
            }
        );
        assert!(e.regenerate_mana(5.0).is_err());
        assert_eq!(e.pools().current_mana, 0.0);
    }

    #[test]
    fn test_raw_current_query_does_not_need_pool() {
        let e = StatEngine::new(CharacterId(1), TypeTag::new("Fire"));
        assert_eq!(e.raw_stat(&StatKind::CurrentHealth), 0.0);
    }

    #[test]
    fn test_spend_mana() {
        let mut e = engine().with_pools(PoolValues::new(100.0, 30.0));
        assert!(e.spend_mana(20.0).unwrap());
        assert_eq!(e.pools().current_mana, 10.0);
        assert!(!e.spend_mana(20.0).unwrap());
        assert_eq!(e.pools().current_mana, 10.0);
    }

    #[test]
    fn test_apply_damage_floors_at_zero() {
        let mut e = engine().with_pools(PoolValues::new(30.0, 0.0));
        assert_eq!(e.apply_damage(12.0), 18.0);
        assert_eq!(e.apply_damage(100.0), 0.0);
    }

    #[test]
    fn test_remove_effect() {
        let mut e = engine();
        e.add_effect(StatusEffect::buff(
            EffectId(9),
            StatKind::Attack,
            ModifierValue::Flat(1.0),
        ));
        assert!(e.remove_effect(EffectId(9)).is_some());
        assert!(e.remove_effect(EffectId(9)).is_none());
        assert!(e.effects().is_empty());
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let mut e = engine();
        assert!(e.equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 1.0)));
        let err = e
            .try_equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 1.0))
            .unwrap_err();
        assert!(matches!(err, StatError::InvalidEquipment(_)));
        assert_eq!(e.equipment().len(), 1);
    }
}

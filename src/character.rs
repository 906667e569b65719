//! Character module.
//!
//! A `Character` bundles everything one instance needs: its stat engine,
//! progression counters, growth table, learned spells and the config they
//! were built with. All of it is owned, so `Clone` is a deep copy and a
//! derived instance never shares containers with its primary.

use crate::adjustment::{AdjustmentSet, Lineage};
use crate::catalog::SpellCatalog;
use crate::config::ProgressionConfig;
use crate::engine::{Stages, StatEngine};
use crate::error::StatError;
use crate::growth::GrowthTable;
use crate::id::{CharacterId, SpellId, TypeTag};
use crate::modifier::Equipment;
use crate::progression::{LevelUpSink, Progression, ProgressionController};
use crate::resolved::ResolvedStat;
use crate::source::{BaseStats, PoolValues};
use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};

/// A playable character instance.
///
/// # Examples
///
/// ```rust
/// use zzlevel::*;
///
/// let mut hero = Character::new(
///     CharacterId(1),
///     TypeTag::new("Fire"),
///     ProgressionConfig::default(),
/// )
/// .with_base_stats(
///     BaseStats::new()
///         .with(StatKind::Health, 100.0)
///         .with(StatKind::Mana, 40.0),
/// )
/// .with_growth(
///     GrowthTable::new().with_rule(StatKind::Health, GrowthRule::Constant { value: 10.0 }),
/// );
///
/// let catalog = StaticSpellCatalog::new().with_unlock(2, "Fire", "ember");
/// let mut events: Vec<LevelUpEvent> = Vec::new();
/// hero.grant_experience(10, &catalog, &mut events);
///
/// assert_eq!(hero.level(), 2);
/// assert_eq!(hero.effective_stat(&StatKind::Health).unwrap(), 110.0);
/// assert_eq!(hero.spells(), &[SpellId::new("ember")]);
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CharacterRecord")]
pub struct Character {
    engine: StatEngine,
    progression: Progression,
    growth: GrowthTable,
    spells: Vec<SpellId>,
    config: ProgressionConfig,
}

/// Wire shape of a snapshot before the config-derived state is rebuilt.
#[derive(Deserialize)]
struct CharacterRecord {
    engine: StatEngine,
    progression: Progression,
    #[serde(default)]
    growth: GrowthTable,
    #[serde(default)]
    spells: Vec<SpellId>,
    #[serde(default)]
    config: ProgressionConfig,
}

impl TryFrom<CharacterRecord> for Character {
    type Error = StatError;

    fn try_from(record: CharacterRecord) -> Result<Self, Self::Error> {
        record.config.validate()?;

        // The config is the single source for the slot count and threshold.
        let mut progression = record.progression;
        progression.reconcile(&record.config);
        let engine = record
            .engine
            .with_max_equipment(record.config.max_equipment);

        Ok(Self {
            engine,
            progression,
            growth: record.growth,
            spells: record.spells,
            config: record.config,
        })
    }
}

impl Character {
    /// A level 1 primary character with no stats.
    pub fn new(id: CharacterId, type_tag: TypeTag, config: ProgressionConfig) -> Self {
        Self {
            engine: StatEngine::new(id, type_tag).with_max_equipment(config.max_equipment),
            progression: Progression::new(&config),
            growth: GrowthTable::new(),
            spells: Vec::new(),
            config,
        }
    }

    /// Set the base stats and fill both pools to their stored maximums.
    pub fn with_base_stats(mut self, base: BaseStats) -> Self {
        let pools = PoolValues::new(
            base.get(&StatKind::Health).unwrap_or(0.0),
            base.get(&StatKind::Mana).unwrap_or(0.0),
        );
        self.engine = self.engine.with_base(base).with_pools(pools);
        self
    }

    /// Override the live current-pool values.
    pub fn with_pools(mut self, pools: PoolValues) -> Self {
        self.engine = self.engine.with_pools(pools);
        self
    }

    /// Set the growth table used on level-up.
    pub fn with_growth(mut self, growth: GrowthTable) -> Self {
        self.growth = growth;
        self
    }

    /// Set the identity adjustment rules.
    pub fn with_adjustments(mut self, adjustments: AdjustmentSet) -> Self {
        self.engine = self.engine.with_adjustments(adjustments);
        self
    }

    /// Start at `level` (capped to the max level) with no experience.
    pub fn with_level(mut self, level: u32) -> Self {
        self.progression = Progression::at_level(level, &self.config);
        self
    }

    /// Handle of this instance.
    pub fn id(&self) -> CharacterId {
        self.engine.owner()
    }

    /// Primary or derived.
    pub fn lineage(&self) -> Lineage {
        self.engine.lineage()
    }

    /// Elemental/type tag.
    pub fn type_tag(&self) -> &TypeTag {
        self.engine.type_tag()
    }

    /// Current level.
    pub fn level(&self) -> u32 {
        self.progression.level()
    }

    /// Experience and level counters.
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Learned spells, in unlock order.
    pub fn spells(&self) -> &[SpellId] {
        &self.spells
    }

    /// Growth table applied on level-up.
    pub fn growth(&self) -> &GrowthTable {
        &self.growth
    }

    /// Tunables this character was built with.
    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// The stat engine.
    pub fn engine(&self) -> &StatEngine {
        &self.engine
    }

    /// The stat engine, for equipment, effects and pool changes.
    pub fn engine_mut(&mut self) -> &mut StatEngine {
        &mut self.engine
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// See [`StatEngine::effective_stat`].
    pub fn effective_stat(&mut self, kind: &StatKind) -> Result<f64, StatError> {
        self.engine.effective_stat(kind)
    }

    /// See [`StatEngine::adjusted_stat`].
    pub fn adjusted_stat(&mut self, kind: &StatKind) -> Result<f64, StatError> {
        self.engine.adjusted_stat(kind)
    }

    /// See [`StatEngine::raw_stat`].
    pub fn raw_stat(&self, kind: &StatKind) -> f64 {
        self.engine.raw_stat(kind)
    }

    /// See [`StatEngine::resolve`].
    pub fn resolve(&mut self, kind: &StatKind, stages: Stages) -> Result<ResolvedStat, StatError> {
        self.engine.resolve(kind, stages)
    }

    /// See [`StatEngine::regenerate_mana`].
    pub fn regenerate_mana(&mut self, amount: f64) -> Result<f64, StatError> {
        self.engine.regenerate_mana(amount)
    }

    /// See [`StatEngine::equip_item`].
    pub fn equip_item(&mut self, item: Equipment) -> bool {
        self.engine.equip_item(item)
    }

    // ------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------

    /// Controller over this character's progression state.
    pub fn controller(&mut self) -> ProgressionController<'_> {
        ProgressionController {
            progression: &mut self.progression,
            engine: &mut self.engine,
            spells: &mut self.spells,
            growth: &self.growth,
            config: &self.config,
        }
    }

    /// Grant experience. Returns the number of levels gained.
    ///
    /// See [`ProgressionController::grant_experience`].
    pub fn grant_experience(
        &mut self,
        amount: i64,
        catalog: &dyn SpellCatalog,
        sink: &mut dyn LevelUpSink,
    ) -> u32 {
        self.controller().grant_experience(amount, catalog, sink)
    }

    /// Run a single level-up step without spending experience.
    pub fn level_up(&mut self, catalog: &dyn SpellCatalog, sink: &mut dyn LevelUpSink) -> bool {
        self.controller().level_up(catalog, sink)
    }

    // ------------------------------------------------------------------
    // Copies and snapshots
    // ------------------------------------------------------------------

    /// Deep copy flagged as a derived instance under a new id.
    ///
    /// The copy keeps stats, equipment, effects and spells but skips identity
    /// adjustments and level-up notifications from now on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let mut hero = Character::new(
    ///     CharacterId(1),
    ///     TypeTag::new("Fire"),
    ///     ProgressionConfig::default(),
    /// )
    /// .with_base_stats(BaseStats::new().with(StatKind::Attack, 10.0))
    /// .with_adjustments(AdjustmentSet::from(vec![
    ///     StatAdjustment::new("Fire").with_multiplier(StatKind::Attack, 1.5),
    /// ]));
    ///
    /// let mut echo = hero.spawn_derived(CharacterId(2));
    /// assert_eq!(echo.lineage(), Lineage::Derived);
    /// assert_eq!(hero.effective_stat(&StatKind::Attack).unwrap(), 15.0);
    /// assert_eq!(echo.effective_stat(&StatKind::Attack).unwrap(), 10.0);
    /// ```
    pub fn spawn_derived(&self, id: CharacterId) -> Self {
        let mut derived = self.clone();
        derived.engine.rebind(id, Lineage::Derived);
        derived
    }

    /// Encode the whole instance as a JSON snapshot.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::*;
    ///
    /// let hero = Character::new(
    ///     CharacterId(1),
    ///     TypeTag::new("Fire"),
    ///     ProgressionConfig::default(),
    /// )
    /// .with_base_stats(BaseStats::new().with(StatKind::Health, 80.0))
    /// .with_level(4);
    ///
    /// let restored = Character::from_json(&hero.to_json().unwrap()).unwrap();
    /// assert_eq!(restored, hero);
    /// assert_eq!(restored.progression().experience_to_next(), 160);
    /// ```
    pub fn to_json(&self) -> Result<String, StatError> {
        serde_json::to_string(self).map_err(|e| StatError::Snapshot(e.to_string()))
    }

    /// Rebuild an instance from a JSON snapshot.
    ///
    /// The config is validated, and the slot count and experience threshold are
    /// re-derived from it rather than trusted.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::Snapshot`] for malformed JSON or an invalid config.
    pub fn from_json(json: &str) -> Result<Self, StatError> {
        serde_json::from_str(json).map_err(|e| StatError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticSpellCatalog;
    use crate::id::ItemId;
    use crate::progression::NoopSink;

    fn hero() -> Character {
        Character::new(CharacterId(1), TypeTag::new("Fire"), ProgressionConfig::default())
            .with_base_stats(
                BaseStats::new()
                    .with(StatKind::Attack, 10.0)
                    .with(StatKind::Health, 50.0)
                    .with(StatKind::Mana, 20.0),
            )
    }

    #[test]
    fn test_base_stats_fill_pools() {
        let c = hero();
        assert_eq!(c.engine().pools(), PoolValues::new(50.0, 20.0));
    }

    #[test]
    fn test_engine_uses_config_capacity() {
        let c = Character::new(
            CharacterId(1),
            TypeTag::new("Fire"),
            ProgressionConfig::default().with_max_equipment(1),
        );
        assert_eq!(c.engine().equipment_capacity(), 1);
    }

    #[test]
    fn test_spawn_derived_retargets_items() {
        let mut c = hero();
        assert!(c.equip_item(Equipment::flat(ItemId(1), "Sword", StatKind::Attack, 2.0)));
        let clone = c.spawn_derived(CharacterId(2));
        assert_eq!(clone.id(), CharacterId(2));
        assert_eq!(clone.lineage(), Lineage::Derived);
        assert_eq!(clone.engine().equipment()[0].owner(), Some(CharacterId(2)));
        assert_eq!(c.engine().equipment()[0].owner(), Some(CharacterId(1)));
    }

    #[test]
    fn test_level_up_without_experience() {
        let mut c = hero();
        assert!(c.level_up(&StaticSpellCatalog::new(), &mut NoopSink));
        assert_eq!(c.level(), 2);
        assert_eq!(c.progression().experience(), 0);
    }

    #[test]
    fn test_snapshot_threshold_comes_from_config() {
        let mut value = serde_json::to_value(hero().with_level(5)).unwrap();
        value["progression"]["experience_to_next"] = serde_json::json!(1);

        let mut loaded = Character::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.level(), 5);
        assert_eq!(loaded.progression().experience_to_next(), 250);

        loaded.grant_experience(1, &StaticSpellCatalog::new(), &mut NoopSink);
        assert_eq!(loaded.level(), 5);
    }

    #[test]
    fn test_snapshot_level_clamped_to_config() {
        let mut value = serde_json::to_value(hero()).unwrap();
        value["config"]["max_level"] = serde_json::json!(4);
        value["progression"]["level"] = serde_json::json!(9);

        let loaded = Character::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.level(), 4);
        assert!(loaded.progression().is_max_level(loaded.config()));
    }

    #[test]
    fn test_snapshot_slot_count_comes_from_config() {
        let c = Character::new(
            CharacterId(1),
            TypeTag::new("Fire"),
            ProgressionConfig::default().with_max_equipment(2),
        );
        let mut value = serde_json::to_value(&c).unwrap();
        value["engine"]["max_equipment"] = serde_json::json!(7);

        let loaded = Character::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.engine().equipment_capacity(), 2);
        assert_eq!(loaded.config().max_equipment, 2);
    }

    #[test]
    fn test_snapshot_with_invalid_config_rejected() {
        let mut value = serde_json::to_value(hero()).unwrap();
        value["config"]["experience_curve"] =
            serde_json::json!({ "type": "linear", "base": 0, "per_level": 0 });
        assert!(matches!(
            Character::from_json(&value.to_string()),
            Err(StatError::Snapshot(_))
        ));
    }

    #[test]
    fn test_bad_snapshot() {
        assert!(matches!(
            Character::from_json("not json"),
            Err(StatError::Snapshot(_))
        ));
    }
}

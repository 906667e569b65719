//! Progression module.
//!
//! Tracks experience and level, and drives level-ups:
//!
//! 1. A grant adds to both the total and the in-level counters.
//! 2. While the in-level counter reaches the threshold (and the level is
//!    below the cap), the threshold is paid and one level-up step runs.
//! 3. A level-up step raises the level, adds growth to every leveling stat's
//!    base value, unlocks catalog spells and notifies the presentation layer
//!    (primary instances only).
//!
//! Once at the level cap, total experience still accumulates but in-level
//! experience is discarded.

use crate::catalog::SpellCatalog;
use crate::config::ProgressionConfig;
use crate::engine::StatEngine;
use crate::growth::GrowthCurve;
use crate::id::{CharacterId, SpellId};
use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Experience and level counters.
///
/// The threshold for the current level is derived from the config and is
/// never stored in snapshots. A deserialized `Progression` must be passed
/// through [`Progression::reconcile`] before use; [`Character`] does this
/// on load.
///
/// [`Character`]: crate::Character
///
/// # Examples
///
/// ```rust
/// use zzlevel::{Progression, ProgressionConfig};
///
/// let config = ProgressionConfig::default();
/// let p = Progression::at_level(3, &config);
/// assert_eq!(p.level(), 3);
/// assert_eq!(p.experience_to_next(), 90);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    level: u32,
    #[serde(default)]
    experience: i64,
    #[serde(default)]
    total_experience: i64,
    #[serde(skip)]
    experience_to_next: i64,
}

impl Progression {
    /// A fresh level 1 character.
    pub fn new(config: &ProgressionConfig) -> Self {
        Self::at_level(1, config)
    }

    /// Counters for a character starting at `level` (capped to the max level).
    pub fn at_level(level: u32, config: &ProgressionConfig) -> Self {
        let level = level.clamp(1, config.max_level.max(1));
        Self {
            level,
            experience: 0,
            total_experience: 0,
            experience_to_next: config.experience_curve.threshold(level),
        }
    }

    /// Re-derive everything the config determines: the level is clamped to
    /// `1..=max_level`, the threshold is recomputed and in-level experience is
    /// dropped at the cap.
    pub fn reconcile(&mut self, config: &ProgressionConfig) {
        self.level = self.level.clamp(1, config.max_level.max(1));
        self.experience_to_next = config.experience_curve.threshold(self.level);
        if self.is_max_level(config) {
            self.experience = 0;
        }
    }

    /// Current level, starting at 1.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Experience earned since the last level-up.
    pub fn experience(&self) -> i64 {
        self.experience
    }

    /// Every grant ever received, including experience discarded at the cap.
    pub fn total_experience(&self) -> i64 {
        self.total_experience
    }

    /// Experience needed to leave the current level.
    pub fn experience_to_next(&self) -> i64 {
        self.experience_to_next
    }

    /// Whether the level cap of `config` has been reached.
    pub fn is_max_level(&self, config: &ProgressionConfig) -> bool {
        self.level >= config.max_level
    }
}

/// Fired once per level gained by a primary character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpEvent {
    pub character: CharacterId,
    /// Level just reached.
    pub level: u32,
    /// Spells learned at this level that were not already known.
    pub unlocked_spells: Vec<SpellId>,
}

/// Fire-and-forget receiver of level-up notifications.
///
/// `Vec<LevelUpEvent>` collects events; [`NoopSink`] drops them.
pub trait LevelUpSink {
    /// Called once per level gained, after growth and spell unlocks.
    fn on_level_up(&mut self, event: &LevelUpEvent);
}

/// Sink that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LevelUpSink for NoopSink {
    fn on_level_up(&mut self, _event: &LevelUpEvent) {}
}

impl LevelUpSink for Vec<LevelUpEvent> {
    fn on_level_up(&mut self, event: &LevelUpEvent) {
        self.push(event.clone());
    }
}

/// Applies experience and level-ups to one character.
///
/// Borrows everything it mutates for the duration of one operation; it
/// holds no state of its own.
///
/// # Examples
///
/// ```rust
/// use zzlevel::*;
///
/// let config = ProgressionConfig::default();
/// let mut progression = Progression::new(&config);
/// let mut engine = StatEngine::new(CharacterId(1), TypeTag::new("Fire"));
/// let mut spells = Vec::new();
/// let growth =
///     GrowthTable::new().with_rule(StatKind::Attack, GrowthRule::Constant { value: 2.0 });
///
/// let mut controller = ProgressionController {
///     progression: &mut progression,
///     engine: &mut engine,
///     spells: &mut spells,
///     growth: &growth,
///     config: &config,
/// };
/// let gained = controller.grant_experience(50, &StaticSpellCatalog::new(), &mut NoopSink);
///
/// assert_eq!(gained, 2); // 10 to reach level 2, 40 to reach level 3
/// assert_eq!(progression.level(), 3);
/// assert_eq!(engine.raw_stat(&StatKind::Attack), 4.0);
/// ```
pub struct ProgressionController<'a> {
    pub progression: &'a mut Progression,
    /// Receives growth on the base values.
    pub engine: &'a mut StatEngine,
    /// Known spells; unlocks are appended without duplicates.
    pub spells: &'a mut Vec<SpellId>,
    pub growth: &'a dyn GrowthCurve,
    pub config: &'a ProgressionConfig,
}

impl ProgressionController<'_> {
    /// Add experience and run every level-up it pays for. Returns the number
    /// of levels gained.
    ///
    /// Counters saturate rather than overflow. At the level cap the grant
    /// still counts toward the total but in-level experience stays at 0.
    pub fn grant_experience(
        &mut self,
        amount: i64,
        catalog: &dyn SpellCatalog,
        sink: &mut dyn LevelUpSink,
    ) -> u32 {
        let owner = self.engine.owner();
        if amount < 0 {
            warn!(character = %owner, amount, "negative experience granted");
        }

        let p = &mut *self.progression;
        p.total_experience = p.total_experience.saturating_add(amount);

        if p.is_max_level(self.config) {
            if amount > 0 {
                warn!(character = %owner, amount, "experience discarded at max level");
            }
            p.experience = 0;
            return 0;
        }
        p.experience = p.experience.saturating_add(amount);

        let mut gained = 0;
        while self.progression.experience >= self.progression.experience_to_next
            && !self.progression.is_max_level(self.config)
        {
            let threshold = self.progression.experience_to_next;
            self.progression.experience = self.progression.experience.saturating_sub(threshold);
            self.level_up(catalog, sink);
            gained += 1;
        }

        if self.progression.is_max_level(self.config) {
            self.progression.experience = 0;
        }
        gained
    }

    /// One level-up step. Does nothing and returns `false` at the level cap.
    pub fn level_up(&mut self, catalog: &dyn SpellCatalog, sink: &mut dyn LevelUpSink) -> bool {
        if self.progression.is_max_level(self.config) {
            return false;
        }

        let level = self.progression.level + 1;
        self.progression.level = level;

        for kind in StatKind::LEVELING.iter() {
            let delta = self.growth.growth(kind, level);
            if delta != 0.0 {
                self.engine.grow_base(kind.clone(), delta);
            }
        }

        let mut unlocked = Vec::new();
        for spell in catalog.spells_unlocked_at(level, self.engine.type_tag()) {
            if !self.spells.contains(&spell) {
                self.spells.push(spell.clone());
                unlocked.push(spell);
            }
        }

        self.progression.experience_to_next = self.config.experience_curve.threshold(level);

        info!(
            character = %self.engine.owner(),
            level,
            spells = unlocked.len(),
            "leveled up"
        );

        if self.engine.lineage().is_primary() {
            sink.on_level_up(&LevelUpEvent {
                character: self.engine.owner(),
                level,
                unlocked_spells: unlocked,
            });
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjustment::Lineage;
    use crate::catalog::StaticSpellCatalog;
    use crate::growth::{GrowthRule, GrowthTable};
    use crate::id::TypeTag;

    struct Fixture {
        progression: Progression,
        engine: StatEngine,
        spells: Vec<SpellId>,
        growth: GrowthTable,
        config: ProgressionConfig,
    }

    impl Fixture {
        fn new(config: ProgressionConfig) -> Self {
            Self {
                progression: Progression::new(&config),
                engine: StatEngine::new(CharacterId(1), TypeTag::new("Fire")),
                spells: Vec::new(),
                growth: GrowthTable::new()
                    .with_rule(StatKind::Attack, GrowthRule::Constant { value: 1.0 }),
                config,
            }
        }

        fn controller(&mut self) -> ProgressionController<'_> {
            ProgressionController {
                progression: &mut self.progression,
                engine: &mut self.engine,
                spells: &mut self.spells,
                growth: &self.growth,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_exact_threshold_levels_once() {
        let mut f = Fixture::new(ProgressionConfig::default());
        let gained = f
            .controller()
            .grant_experience(10, &StaticSpellCatalog::new(), &mut NoopSink);
        assert_eq!(gained, 1);
        assert_eq!(f.progression.level(), 2);
        assert_eq!(f.progression.experience(), 0);
        assert_eq!(f.progression.experience_to_next(), 40);
    }

    #[test]
    fn test_large_grant_levels_repeatedly() {
        let mut f = Fixture::new(ProgressionConfig::default());
        f.controller()
            .grant_experience(100, &StaticSpellCatalog::new(), &mut NoopSink);
        // 100 - 10 - 40 = 50 < 90
        assert_eq!(f.progression.level(), 3);
        assert_eq!(f.progression.experience(), 50);
        assert_eq!(f.progression.total_experience(), 100);
    }

    #[test]
    fn test_max_level_discards_experience() {
        let mut f = Fixture::new(ProgressionConfig::default().with_max_level(2));
        f.controller()
            .grant_experience(1_000, &StaticSpellCatalog::new(), &mut NoopSink);
        assert_eq!(f.progression.level(), 2);
        assert_eq!(f.progression.experience(), 0);
        assert_eq!(f.progression.total_experience(), 1_000);

        let gained = f
            .controller()
            .grant_experience(500, &StaticSpellCatalog::new(), &mut NoopSink);
        assert_eq!(gained, 0);
        assert_eq!(f.progression.experience(), 0);
        assert_eq!(f.progression.total_experience(), 1_500);
    }

    #[test]
    fn test_negative_grant_never_lowers_level() {
        let mut f = Fixture::new(ProgressionConfig::default());
        f.controller()
            .grant_experience(15, &StaticSpellCatalog::new(), &mut NoopSink);
        f.controller()
            .grant_experience(-20, &StaticSpellCatalog::new(), &mut NoopSink);
        assert_eq!(f.progression.level(), 2);
        assert_eq!(f.progression.experience(), -15);
        assert_eq!(f.progression.total_experience(), -5);
    }

    #[test]
    fn test_derived_instance_is_silent() {
        let mut f = Fixture::new(ProgressionConfig::default());
        f.engine = f.engine.clone().with_lineage(Lineage::Derived);
        let mut events: Vec<LevelUpEvent> = Vec::new();
        f.controller()
            .grant_experience(10, &StaticSpellCatalog::new(), &mut events);
        assert!(events.is_empty());
        assert_eq!(f.engine.raw_stat(&StatKind::Attack), 1.0);
    }

    #[test]
    fn test_zero_growth_does_not_create_base_entries() {
        let mut f = Fixture::new(ProgressionConfig::default());
        f.controller()
            .grant_experience(10, &StaticSpellCatalog::new(), &mut NoopSink);
        assert!(!f.engine.base_stats().contains(&StatKind::Health));
    }

    #[test]
    fn test_huge_grant_on_steep_curve_does_not_overflow() {
        let config = ProgressionConfig::default().with_experience_curve(
            crate::config::ExperienceCurve::Quadratic {
                factor: 3_000_000_000_000_000_000,
            },
        );
        let mut f = Fixture::new(config);
        let catalog = StaticSpellCatalog::new();
        let gained = f
            .controller()
            .grant_experience(3_000_000_000_000_000_000, &catalog, &mut NoopSink);
        assert_eq!(gained, 1);
        assert_eq!(f.progression.experience_to_next(), i64::MAX);

        f.controller().grant_experience(i64::MAX - 1, &catalog, &mut NoopSink);
        assert_eq!(f.progression.level(), 2);
        assert_eq!(f.progression.total_experience(), i64::MAX);
    }

    #[test]
    fn test_reconcile_ignores_stale_snapshot_fields() {
        let config = ProgressionConfig::default().with_max_level(10);
        let mut p: Progression =
            serde_json::from_str(r#"{ "level": 5, "experience": 3, "experience_to_next": 1 }"#)
                .unwrap();
        p.reconcile(&config);
        assert_eq!(p.level(), 5);
        assert_eq!(p.experience(), 3);
        assert_eq!(p.experience_to_next(), 250);

        let mut over: Progression =
            serde_json::from_str(r#"{ "level": 99, "experience": 40 }"#).unwrap();
        over.reconcile(&config);
        assert_eq!(over.level(), 10);
        assert_eq!(over.experience(), 0);
    }

    #[test]
    fn test_threshold_is_not_serialized() {
        let p = Progression::at_level(2, &ProgressionConfig::default());
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("experience_to_next").is_none());
    }

    #[test]
    fn test_at_level_caps() {
        let config = ProgressionConfig::default().with_max_level(5);
        let p = Progression::at_level(9, &config);
        assert_eq!(p.level(), 5);
        assert_eq!(p.experience_to_next(), 250);
    }
}

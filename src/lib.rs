//! # zzlevel - Deterministic Character Progression and Stat Engine
//!
//! Turns a character's stored base attributes, growth curves, equipped
//! items and active buffs/debuffs into one authoritative value per stat,
//! and drives leveling (experience, thresholds, growth, spell unlocks).
//!
//! ## Stat Pipeline
//!
//! Every query recomputes from scratch:
//!
//! ```text
//! raw → identity adjustment → equipment → status effects → pool clamp
//! ```
//!
//! 1. **Raw** value comes from a two-tier source: live current-pool values
//!    first, then the table of stored base values. Unknown stats are 0.
//! 2. **Identity adjustment** rescales the raw value by the rule selected
//!    with the character's type tag (primary instances only).
//! 3. **Equipment** and **status effects** each fold into
//!    `(value + flat) × (1 + Σ percent / 100)`.
//! 4. **Pool clamp** caps `CurrentHealth` / `CurrentMana` at the effective
//!    `Health` / `Mana` and writes the capped value back.
//!
//! [`Stages`] picks which stages run: [`Stages::EFFECTIVE`] for gameplay,
//! [`Stages::ADJUSTED`] for leveling logic that must not see equipment.
//!
//! ## Example
//!
//! ```rust
//! use zzlevel::*;
//!
//! let mut hero = Character::new(
//!     CharacterId(1),
//!     TypeTag::new("Fire"),
//!     ProgressionConfig::default(),
//! )
//! .with_base_stats(
//!     BaseStats::new()
//!         .with(StatKind::Attack, 20.0)
//!         .with(StatKind::Health, 100.0),
//! );
//!
//! hero.equip_item(Equipment::percent(ItemId(1), "Ring", StatKind::Attack, 10.0));
//! hero.equip_item(Equipment::percent(ItemId(2), "Amulet", StatKind::Attack, 10.0));
//!
//! // Percentages add: 20 × 1.20, not 20 × 1.21
//! let attack = hero.effective_stat(&StatKind::Attack).unwrap();
//! assert!((attack - 24.0).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`stat_kind`] - Stat kinds and pool pairs
//! - [`id`] - Identifier types
//! - [`source`] - Raw value lookup
//! - [`adjustment`] - Identity adjustments
//! - [`modifier`] - Equipment and status effects
//! - [`engine`] - The stat pipeline
//! - [`resolved`] - Stage-by-stage breakdowns
//! - [`growth`] - Growth tables
//! - [`progression`] - Experience and level-ups
//! - [`catalog`] - Spell unlocks
//! - [`character`] - Character aggregate and snapshots
//! - [`config`] - Tunables
//! - [`error`] - Error types

pub mod adjustment;
pub mod catalog;
pub mod character;
pub mod config;
pub mod engine;
pub mod error;
pub mod growth;
pub mod id;
pub mod modifier;
pub mod progression;
pub mod resolved;
pub mod source;
pub mod stat_kind;

pub use adjustment::{AdjustmentSet, Lineage, StatAdjustment};
pub use catalog::{SpellCatalog, SpellUnlock, StaticSpellCatalog};
pub use character::Character;
pub use config::{ExperienceCurve, ProgressionConfig};
pub use engine::{Stages, StatEngine};
pub use error::StatError;
pub use growth::{GrowthCurve, GrowthRule, GrowthTable};
pub use id::{CharacterId, EffectId, ItemId, SpellId, TypeTag};
pub use modifier::{EffectPolarity, Equipment, ModifierValue, StatusEffect};
pub use progression::{LevelUpEvent, LevelUpSink, NoopSink, Progression, ProgressionController};
pub use resolved::ResolvedStat;
pub use source::{BaseStats, PoolValues, StatSource};
pub use stat_kind::StatKind;

//! Modifier sources module.
//!
//! Two independent kinds of modifiers feed the stat pipeline:
//!
//! - [`Equipment`]: a flat or percentage boost to exactly one stat.
//! - [`StatusEffect`]: a buff or debuff that may target every stat via
//!   [`StatKind::All`]. Its lifecycle belongs to an external effect manager.
//!
//! Both fold into a [`ModifierAccumulator`], which keeps flat amounts and
//! percentages apart and combines them as `(value + additive) × multiplier`.

use crate::error::StatError;
use crate::id::{CharacterId, EffectId, ItemId};
use crate::stat_kind::StatKind;
use serde::{Deserialize, Serialize};

/// Magnitude of a modifier.
///
/// Percentages are expressed in percentage points: `Percent(10.0)` is +10%.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ModifierValue {
    Flat(f64),
    Percent(f64),
}

impl ModifierValue {
    /// The raw number, flat amount or percentage points.
    pub fn magnitude(self) -> f64 {
        match self {
            ModifierValue::Flat(v) | ModifierValue::Percent(v) => v,
        }
    }

    /// Whether this folds into the multiplier rather than the additive term.
    pub fn is_percentage(self) -> bool {
        matches!(self, ModifierValue::Percent(_))
    }
}

/// An equipment item granting one stat boost.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{Equipment, ItemId, StatKind};
///
/// let ring = Equipment::percent(ItemId(1), "Ring of Might", StatKind::Attack, 10.0);
/// assert!(ring.value.is_percentage());
/// assert_eq!(ring.owner(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: ItemId,
    pub name: String,
    pub target: StatKind,
    pub value: ModifierValue,
    /// Character currently wearing this item. Non-owning back-reference.
    #[serde(default)]
    owner: Option<CharacterId>,
}

impl Equipment {
    /// Unattached item with the given boost.
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        target: StatKind,
        value: ModifierValue,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            target,
            value,
            owner: None,
        }
    }

    /// Item adding `amount` to `target`.
    pub fn flat(id: ItemId, name: impl Into<String>, target: StatKind, amount: f64) -> Self {
        Self::new(id, name, target, ModifierValue::Flat(amount))
    }

    /// Item adding `percent` percentage points to `target`'s multiplier.
    pub fn percent(id: ItemId, name: impl Into<String>, target: StatKind, percent: f64) -> Self {
        Self::new(id, name, target, ModifierValue::Percent(percent))
    }

    /// Character wearing this item, if any.
    pub fn owner(&self) -> Option<CharacterId> {
        self.owner
    }

    /// Point the back-reference at `owner`, or clear it.
    pub(crate) fn set_owner(&mut self, owner: Option<CharacterId>) {
        self.owner = owner;
    }

    /// Check the item can be attached at all.
    pub fn validate(&self) -> Result<(), StatError> {
        if self.target.is_wildcard() {
            return Err(StatError::InvalidEquipment(format!(
                "{} targets the All wildcard",
                self.name
            )));
        }
        if !self.value.magnitude().is_finite() {
            return Err(StatError::InvalidEquipment(format!(
                "{} has a non-finite magnitude",
                self.name
            )));
        }
        Ok(())
    }
}

/// Whether a status effect helps or hinders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectPolarity {
    Buff,
    Debuff,
}

/// An active buff or debuff.
///
/// Magnitude is per stack; [`StatusEffect::total_boost`] aggregates stacks
/// and always yields a non-positive total for debuffs, regardless of the
/// sign the magnitude was authored with.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{EffectId, ModifierValue, StatKind, StatusEffect};
///
/// let poison = StatusEffect::debuff(EffectId(1), StatKind::Speed, ModifierValue::Flat(3.0))
///     .with_stacks(2);
/// assert_eq!(poison.total_boost(), -6.0);
///
/// let haste = StatusEffect::buff(EffectId(2), StatKind::All, ModifierValue::Percent(5.0));
/// assert!(haste.applies_to(&StatKind::Defense));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: EffectId,
    #[serde(default)]
    pub name: String,
    pub polarity: EffectPolarity,
    pub target: StatKind,
    pub value: ModifierValue,
    #[serde(default = "default_stacks")]
    pub stacks: u32,
}

fn default_stacks() -> u32 {
    1
}

impl StatusEffect {
    /// Single-stack effect with an empty name.
    pub fn new(
        id: EffectId,
        polarity: EffectPolarity,
        target: StatKind,
        value: ModifierValue,
    ) -> Self {
        Self {
            id,
            name: String::new(),
            polarity,
            target,
            value,
            stacks: 1,
        }
    }

    /// Single-stack buff.
    pub fn buff(id: EffectId, target: StatKind, value: ModifierValue) -> Self {
        Self::new(id, EffectPolarity::Buff, target, value)
    }

    /// Single-stack debuff. The sign of `value` does not matter.
    pub fn debuff(id: EffectId, target: StatKind, value: ModifierValue) -> Self {
        Self::new(id, EffectPolarity::Debuff, target, value)
    }

    /// Set a display name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the stack count.
    pub fn with_stacks(mut self, stacks: u32) -> Self {
        self.stacks = stacks;
        self
    }

    /// Whether this effect scales the multiplier.
    pub fn is_percentage(&self) -> bool {
        self.value.is_percentage()
    }

    /// Whether this effect contributes to a query for `kind`.
    pub fn applies_to(&self, kind: &StatKind) -> bool {
        self.target.matches(kind)
    }

    /// Signed total over all stacks.
    pub fn total_boost(&self) -> f64 {
        let total = self.value.magnitude() * f64::from(self.stacks);
        match self.polarity {
            EffectPolarity::Buff => total,
            EffectPolarity::Debuff => -total.abs(),
        }
    }
}

/// Running additive and multiplicative terms for one modifier layer.
///
/// Percentages add into a multiplier seeded at 1.0, so two +10% boosts
/// give ×1.20 rather than ×1.21.
///
/// # Examples
///
/// ```rust
/// use zzlevel::modifier::ModifierAccumulator;
///
/// let mut acc = ModifierAccumulator::new();
/// acc.add(5.0, false);
/// acc.add(50.0, true);
/// assert_eq!(acc.apply(15.0), 30.0); // (15 + 5) × 1.5
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModifierAccumulator {
    pub additive: f64,
    pub multiplier: f64,
}

impl ModifierAccumulator {
    /// Identity accumulator: no additive term, multiplier 1.0.
    pub fn new() -> Self {
        Self {
            additive: 0.0,
            multiplier: 1.0,
        }
    }

    /// Fold one contribution in. `amount` is signed.
    pub fn add(&mut self, amount: f64, percentage: bool) {
        if percentage {
            self.multiplier += amount / 100.0;
        } else {
            self.additive += amount;
        }
    }

    /// Whether applying this accumulator changes nothing.
    pub fn is_identity(&self) -> bool {
        self.additive == 0.0 && self.multiplier == 1.0
    }

    /// `(value + additive) × multiplier`.
    pub fn apply(&self, value: f64) -> f64 {
        (value + self.additive) * self.multiplier
    }

    /// Accumulate every equipment item targeting `kind`.
    ///
    /// Items never match through the `All` wildcard; only exact targets count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::modifier::ModifierAccumulator;
    /// use zzlevel::{Equipment, ItemId, StatKind};
    ///
    /// let items = vec![
    ///     Equipment::percent(ItemId(1), "Ring", StatKind::Attack, 10.0),
    ///     Equipment::percent(ItemId(2), "Amulet", StatKind::Attack, 10.0),
    ///     Equipment::flat(ItemId(3), "Boots", StatKind::Speed, 2.0),
    /// ];
    /// let acc = ModifierAccumulator::from_equipment(&items, &StatKind::Attack);
    /// assert!((acc.multiplier - 1.2).abs() < 1e-12);
    /// assert_eq!(acc.additive, 0.0);
    /// ```
    pub fn from_equipment<'a>(
        items: impl IntoIterator<Item = &'a Equipment>,
        kind: &StatKind,
    ) -> Self {
        let mut acc = Self::new();
        for item in items.into_iter().filter(|item| &item.target == kind) {
            acc.add(item.value.magnitude(), item.value.is_percentage());
        }
        acc
    }

    /// Accumulate every status effect that applies to `kind`, buffs first.
    ///
    /// Debuffs land in the same accumulator with negative totals.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzlevel::modifier::ModifierAccumulator;
    /// use zzlevel::{EffectId, ModifierValue, StatKind, StatusEffect};
    ///
    /// let effects = vec![
    ///     StatusEffect::buff(EffectId(1), StatKind::All, ModifierValue::Flat(4.0)),
    ///     StatusEffect::debuff(EffectId(2), StatKind::Defense, ModifierValue::Flat(1.0)),
    /// ];
    /// let acc = ModifierAccumulator::from_effects(&effects, &StatKind::Defense);
    /// assert_eq!(acc.additive, 3.0);
    /// assert_eq!(acc.apply(10.0), 13.0);
    /// ```
    pub fn from_effects<'a>(
        effects: impl IntoIterator<Item = &'a StatusEffect>,
        kind: &StatKind,
    ) -> Self {
        let (buffs, debuffs): (Vec<&StatusEffect>, Vec<&StatusEffect>) = effects
            .into_iter()
            .filter(|effect| effect.applies_to(kind))
            .partition(|effect| effect.polarity == EffectPolarity::Buff);

        let mut acc = Self::new();
        for effect in buffs.into_iter().chain(debuffs) {
            acc.add(effect.total_boost(), effect.is_percentage());
        }
        acc
    }
}

impl Default for ModifierAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

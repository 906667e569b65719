//! Stat kind module.
//!
//! `StatKind` is the closed set of stats every character carries, plus a
//! `Custom` escape hatch for template-specific extensions. Kinds serialize
//! as their plain names so snapshots stay human-readable.

use crate::error::StatError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::Arc;

/// Identifies a stat on a character.
///
/// Pool stats (`Health`, `Mana`) have a current counterpart
/// (`CurrentHealth`, `CurrentMana`) whose value is clamped to the pool's
/// effective maximum whenever it is evaluated. `All` is only meaningful as
/// the target of a status effect, where it matches every kind.
///
/// # Examples
///
/// ```rust
/// use zzlevel::StatKind;
///
/// assert_eq!(StatKind::CurrentHealth.pool_max(), Some(StatKind::Health));
/// assert!(StatKind::Attack.is_leveling());
/// assert!(!StatKind::CurrentMana.is_leveling());
///
/// let luck: StatKind = "Luck".parse().unwrap();
/// assert_eq!(luck, StatKind::custom("Luck"));
/// assert_eq!(luck.as_str(), "Luck");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatKind {
    Attack,
    Defense,
    Health,
    CurrentHealth,
    Mana,
    CurrentMana,
    Speed,
    CritRate,
    BlockRate,
    /// Wildcard target for status effects.
    All,
    /// Template-specific extension stat.
    Custom(Arc<str>),
}

const BUILTIN: [(StatKind, &str); 10] = [
    (StatKind::Attack, "Attack"),
    (StatKind::Defense, "Defense"),
    (StatKind::Health, "Health"),
    (StatKind::CurrentHealth, "CurrentHealth"),
    (StatKind::Mana, "Mana"),
    (StatKind::CurrentMana, "CurrentMana"),
    (StatKind::Speed, "Speed"),
    (StatKind::CritRate, "CritRate"),
    (StatKind::BlockRate, "BlockRate"),
    (StatKind::All, "All"),
];

impl StatKind {
    /// Stats that receive growth when a character levels up, in the order
    /// growth is applied.
    pub const LEVELING: [StatKind; 7] = [
        StatKind::Attack,
        StatKind::Defense,
        StatKind::Health,
        StatKind::Mana,
        StatKind::Speed,
        StatKind::CritRate,
        StatKind::BlockRate,
    ];

    /// Create a kind from a name, resolving built-in names to their variant.
    ///
    /// Always use this instead of constructing `Custom` directly, otherwise
    /// `Custom("Attack")` and `Attack` would be two different stats.
    pub fn custom(name: &str) -> Self {
        BUILTIN
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(kind, _)| kind.clone())
            .unwrap_or_else(|| StatKind::Custom(Arc::from(name)))
    }

    /// The name this kind serializes as.
    pub fn as_str(&self) -> &str {
        match self {
            StatKind::Attack => "Attack",
            StatKind::Defense => "Defense",
            StatKind::Health => "Health",
            StatKind::CurrentHealth => "CurrentHealth",
            StatKind::Mana => "Mana",
            StatKind::CurrentMana => "CurrentMana",
            StatKind::Speed => "Speed",
            StatKind::CritRate => "CritRate",
            StatKind::BlockRate => "BlockRate",
            StatKind::All => "All",
            StatKind::Custom(name) => name.as_ref(),
        }
    }

    /// Whether this kind grows on level-up.
    pub fn is_leveling(&self) -> bool {
        Self::LEVELING.contains(self)
    }

    /// For a current-pool kind, the pool maximum it is clamped to.
    pub fn pool_max(&self) -> Option<StatKind> {
        match self {
            StatKind::CurrentHealth => Some(StatKind::Health),
            StatKind::CurrentMana => Some(StatKind::Mana),
            _ => None,
        }
    }

    /// For a pool maximum, its live current counterpart.
    pub fn current_of(&self) -> Option<StatKind> {
        match self {
            StatKind::Health => Some(StatKind::CurrentHealth),
            StatKind::Mana => Some(StatKind::CurrentMana),
            _ => None,
        }
    }

    /// Whether this is the `All` wildcard.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, StatKind::All)
    }

    /// Whether a modifier targeting `self` applies to a query for `kind`.
    pub fn matches(&self, kind: &StatKind) -> bool {
        self.is_wildcard() || self == kind
    }
}

impl FromStr for StatKind {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(StatError::UnknownStat(s.to_string()));
        }
        Ok(Self::custom(trimmed))
    }
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for StatKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Spell catalog module.
//!
//! The catalog is an external collaborator: leveling asks it which spells
//! a character of a given type tag unlocks at a given level. Queries never
//! mutate the catalog.

use crate::error::StatError;
use crate::id::{SpellId, TypeTag};
use serde::{Deserialize, Serialize};

/// Source of spell unlocks.
pub trait SpellCatalog {
    /// Spells unlocked on reaching `level` for characters tagged `tag`.
    fn spells_unlocked_at(&self, level: u32, tag: &TypeTag) -> Vec<SpellId>;
}

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellUnlock {
    pub level: u32,
    pub tag: TypeTag,
    pub spell: SpellId,
}

/// In-memory catalog, buildable in code or loaded from JSON.
///
/// Rows are returned in insertion order.
///
/// # Examples
///
/// ```rust
/// use zzlevel::{SpellCatalog, SpellId, StaticSpellCatalog, TypeTag};
///
/// let catalog = StaticSpellCatalog::new()
///     .with_unlock(2, "Fire", "ember")
///     .with_unlock(2, "Ice", "frost")
///     .with_unlock(3, "Fire", "fireball");
///
/// let fire = TypeTag::new("Fire");
/// assert_eq!(catalog.spells_unlocked_at(2, &fire), vec![SpellId::new("ember")]);
/// assert!(catalog.spells_unlocked_at(4, &fire).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticSpellCatalog {
    unlocks: Vec<SpellUnlock>,
}

impl StaticSpellCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock `spell` for `tag` characters reaching `level`.
    pub fn insert(&mut self, level: u32, tag: impl Into<TypeTag>, spell: impl Into<SpellId>) {
        self.unlocks.push(SpellUnlock {
            level,
            tag: tag.into(),
            spell: spell.into(),
        });
    }

    /// Builder form of [`StaticSpellCatalog::insert`].
    pub fn with_unlock(
        mut self,
        level: u32,
        tag: impl Into<TypeTag>,
        spell: impl Into<SpellId>,
    ) -> Self {
        self.insert(level, tag, spell);
        self
    }

    /// Load a catalog from a JSON array of `{ level, tag, spell }` rows.
    pub fn from_json(json: &str) -> Result<Self, StatError> {
        serde_json::from_str(json).map_err(|e| StatError::Config(e.to_string()))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.unlocks.len()
    }

    /// Whether the catalog has no rows.
    pub fn is_empty(&self) -> bool {
        self.unlocks.is_empty()
    }
}

impl SpellCatalog for StaticSpellCatalog {
    fn spells_unlocked_at(&self, level: u32, tag: &TypeTag) -> Vec<SpellId> {
        self.unlocks
            .iter()
            .filter(|row| row.level == level && &row.tag == tag)
            .map(|row| row.spell.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let catalog = StaticSpellCatalog::from_json(
            r#"[{ "level": 5, "tag": "Water", "spell": "tide" }]"#,
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.spells_unlocked_at(5, &TypeTag::new("Water")),
            vec![SpellId::new("tide")]
        );
    }

    #[test]
    fn test_tag_must_match() {
        let catalog = StaticSpellCatalog::new().with_unlock(2, "Fire", "ember");
        assert!(catalog
            .spells_unlocked_at(2, &TypeTag::new("Ice"))
            .is_empty());
    }
}

//! Identifier types.
//!
//! Names that are compared often and cloned into many places (type tags,
//! spell ids) are interned as `Arc<str>`. Instance handles are plain
//! integers assigned by the host.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

macro_rules! interned_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            /// Create a new identifier from a string slice.
            pub fn new(s: &str) -> Self {
                Self(Arc::from(s))
            }

            /// The underlying name.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(Arc::from(s))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.0.as_ref().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

interned_name!(
    /// Discrete elemental/type tag of a character (e.g. `"Fire"`).
    ///
    /// Selects the identity adjustment rule and keys the spell catalog.
    ///
    /// ```rust
    /// use zzlevel::TypeTag;
    ///
    /// let fire: TypeTag = "Fire".into();
    /// assert_eq!(fire, TypeTag::new("Fire"));
    /// ```
    TypeTag
);

interned_name!(
    /// Identifier of a spell in the external catalog.
    SpellId
);

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

numeric_id!(
    /// Handle of a character instance.
    CharacterId
);
numeric_id!(
    /// Handle of an equipment item.
    ItemId
);
numeric_id!(
    /// Handle of a status effect instance.
    EffectId
);

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary key/value payload attached to an entity.
pub type EntityData = Map<String, Value>;

/// Key of an entity in a document's entity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u64);

impl EntityKey {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// How the host editor treats text carrying the entity. Never interpreted
/// by this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mutability {
    #[default]
    Mutable,
    Immutable,
    Segmented,
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mutability::Mutable => "MUTABLE",
            Mutability::Immutable => "IMMUTABLE",
            Mutability::Segmented => "SEGMENTED",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mutability: Mutability,
    #[serde(default)]
    pub data: EntityData,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, mutability: Mutability, data: EntityData) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }

    pub fn has_type(&self, entity_type: &str) -> bool {
        self.entity_type == entity_type
    }

    /// String value stored under `field`.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Shallow union: keys in `patch` overwrite, everything else stays.
    pub(crate) fn merged(&self, patch: &EntityData) -> Self {
        let mut data = self.data.clone();
        for (key, value) in patch {
            data.insert(key.clone(), value.clone());
        }
        Self {
            data,
            ..self.clone()
        }
    }

    pub(crate) fn replaced(&self, data: EntityData) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }
}

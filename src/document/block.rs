use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use super::EntityKey;

/// Stable identifier of a block within a document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(Arc<str>);

impl BlockKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single character together with its optional entity reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Character {
    pub ch: char,
    pub entity: Option<EntityKey>,
}

impl Character {
    pub fn new(ch: char) -> Self {
        Self { ch, entity: None }
    }

    pub fn with_entity(self, entity: Option<EntityKey>) -> Self {
        Self { entity, ..self }
    }
}

/// An immutable run of characters, one paragraph of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    key: BlockKey,
    characters: Vec<Character>,
}

impl Block {
    pub fn new(key: impl Into<BlockKey>, text: &str) -> Self {
        Self {
            key: key.into(),
            characters: text.chars().map(Character::new).collect(),
        }
    }

    pub fn from_characters(key: BlockKey, characters: Vec<Character>) -> Self {
        Self { key, characters }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn text(&self) -> String {
        self.characters.iter().map(|c| c.ch).collect()
    }

    /// Entity referenced by the character at `offset`, if any.
    ///
    /// Offsets past the end of the block have no entity.
    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.characters.get(offset).and_then(|c| c.entity)
    }

    /// Returns a copy of this block with `characters` replaced.
    pub fn with_characters(&self, characters: Vec<Character>) -> Self {
        Self {
            key: self.key.clone(),
            characters,
        }
    }

    /// Groups characters into runs sharing the same entity key and reports
    /// every run accepted by `filter` as an end-exclusive `(start, end)`.
    ///
    /// Two adjacent runs of distinct entities are reported separately even
    /// when both pass the filter.
    pub fn find_entity_ranges<F, C>(&self, mut filter: F, mut callback: C)
    where
        F: FnMut(&Character) -> bool,
        C: FnMut(usize, usize),
    {
        let mut idx = 0;
        while idx < self.characters.len() {
            let current = self.characters[idx];
            let start = idx;
            while idx < self.characters.len() && self.characters[idx].entity == current.entity {
                idx += 1;
            }
            if filter(&current) {
                callback(start, idx);
            }
        }
    }
}

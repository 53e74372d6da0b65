//! Raw content: the JSON interchange form of a document.
//!
//! ```json
//! {
//!   "blocks": [
//!     { "key": "b0", "text": "text with entity here",
//!       "entityRanges": [{ "offset": 17, "length": 4, "key": 1 }] }
//!   ],
//!   "entityMap": {
//!     "1": { "type": "LINK", "mutability": "MUTABLE", "data": { "url": "a.com" } }
//!   }
//! }
//! ```
//!
//! Offsets and lengths count characters (Unicode scalar values).

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::{Block, BlockKey, Character, Document, Entity, EntityKey};
use crate::error::{EntityError, EntityResult};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContent {
    pub blocks: Vec<RawBlock>,
    #[serde(default)]
    pub entity_map: IndexMap<EntityKey, Entity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBlock {
    pub key: BlockKey,
    pub text: String,
    #[serde(default)]
    pub entity_ranges: Vec<RawEntityRange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntityRange {
    pub offset: usize,
    pub length: usize,
    pub key: EntityKey,
}

impl Document {
    pub fn to_raw(&self) -> RawContent {
        let blocks = self
            .blocks()
            .map(|block| {
                let mut entity_ranges = Vec::new();
                block.find_entity_ranges(
                    |character| character.entity.is_some(),
                    |start, end| {
                        if let Some(key) = block.entity_at(start) {
                            entity_ranges.push(RawEntityRange {
                                offset: start,
                                length: end - start,
                                key,
                            });
                        }
                    },
                );
                RawBlock {
                    key: block.key().clone(),
                    text: block.text(),
                    entity_ranges,
                }
            })
            .collect();
        let entity_map = self
            .entities()
            .map(|(key, entity)| (key, entity.clone()))
            .collect();
        RawContent { blocks, entity_map }
    }

    /// Rebuilds a document, rejecting ranges that point at missing entities
    /// or past the end of their block.
    pub fn from_raw(raw: RawContent) -> EntityResult<Self> {
        let mut blocks = IndexMap::with_capacity(raw.blocks.len());
        for raw_block in raw.blocks {
            let mut characters: Vec<Character> =
                raw_block.text.chars().map(Character::new).collect();
            for range in &raw_block.entity_ranges {
                if !raw.entity_map.contains_key(&range.key) {
                    return Err(EntityError::UnknownEntity(range.key));
                }
                let Some(end) = range
                    .offset
                    .checked_add(range.length)
                    .filter(|end| *end <= characters.len())
                else {
                    return Err(EntityError::OffsetOutOfBounds {
                        block: raw_block.key.clone(),
                        offset: range.offset.saturating_add(range.length),
                        len: characters.len(),
                    });
                };
                for character in &mut characters[range.offset..end] {
                    character.entity = Some(range.key);
                }
            }
            let block = Block::from_characters(raw_block.key.clone(), characters);
            if blocks.insert(raw_block.key.clone(), Arc::new(block)).is_some() {
                return Err(EntityError::DuplicateBlock(raw_block.key));
            }
        }
        debug!(
            blocks = blocks.len(),
            entities = raw.entity_map.len(),
            "loaded raw content"
        );
        Ok(Self::assemble(blocks, raw.entity_map))
    }

    pub fn to_json(&self) -> EntityResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_raw())?)
    }

    pub fn from_json(json: &str) -> EntityResult<Self> {
        let raw: RawContent = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }
}

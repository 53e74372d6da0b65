//! Immutable block/entity document model the entity layer operates on.
//!
//! A [`Document`] is a persistent value: every update returns a new
//! document sharing all untouched blocks (and, when unchanged, the entity
//! table) with its predecessor through `Arc`.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::error::{EntityError, EntityResult};

mod block;
mod entity;
mod selection;

pub use block::{Block, BlockKey, Character};
pub use entity::{Entity, EntityData, EntityKey, Mutability};
pub use selection::{Selection, SelectionPatch};

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    blocks: Arc<IndexMap<BlockKey, Arc<Block>>>,
    entities: Arc<IndexMap<EntityKey, Entity>>,
    next_entity: EntityKey,
    last_created: Option<EntityKey>,
    selection_before: Option<Selection>,
    selection_after: Option<Selection>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            blocks: Arc::new(IndexMap::new()),
            entities: Arc::new(IndexMap::new()),
            next_entity: EntityKey::new(1),
            last_created: None,
            selection_before: None,
            selection_after: None,
        }
    }

    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> EntityResult<Self> {
        Self::from_parts(blocks, IndexMap::new())
    }

    /// Builds a document from blocks and a prepared entity table. Every
    /// entity referenced by a character must be present in `entities`.
    pub fn from_parts(
        blocks: impl IntoIterator<Item = Block>,
        entities: IndexMap<EntityKey, Entity>,
    ) -> EntityResult<Self> {
        let mut map = IndexMap::new();
        for block in blocks {
            for character in block.characters() {
                if let Some(key) = character.entity {
                    if !entities.contains_key(&key) {
                        return Err(EntityError::UnknownEntity(key));
                    }
                }
            }
            let key = block.key().clone();
            if map.insert(key.clone(), Arc::new(block)).is_some() {
                return Err(EntityError::DuplicateBlock(key));
            }
        }
        Ok(Self::assemble(map, entities))
    }

    /// Assembles a document from parts already known to be consistent.
    pub(crate) fn assemble(
        blocks: IndexMap<BlockKey, Arc<Block>>,
        entities: IndexMap<EntityKey, Entity>,
    ) -> Self {
        let next_entity = entities
            .keys()
            .max()
            .map(|key| key.next())
            .unwrap_or(EntityKey::new(1));
        Self {
            blocks: Arc::new(blocks),
            entities: Arc::new(entities),
            next_entity,
            last_created: None,
            selection_before: None,
            selection_after: None,
        }
    }

    pub fn block(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks.get(key).map(Arc::as_ref)
    }

    /// Shared handle to a block; untouched blocks keep their identity
    /// across updates.
    pub fn block_arc(&self, key: &BlockKey) -> Option<&Arc<Block>> {
        self.blocks.get(key)
    }

    pub fn block_at(&self, index: usize) -> Option<&Arc<Block>> {
        self.blocks.get_index(index).map(|(_, block)| block)
    }

    pub fn block_index(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.get_index_of(key)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Arc<Block>> {
        self.blocks.values()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn first_block(&self) -> Option<&Arc<Block>> {
        self.block_at(0)
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(&key)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter().map(|(key, entity)| (*key, entity))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn last_created_entity_key(&self) -> Option<EntityKey> {
        self.last_created
    }

    pub fn selection_before(&self) -> Option<&Selection> {
        self.selection_before.as_ref()
    }

    pub fn selection_after(&self) -> Option<&Selection> {
        self.selection_after.as_ref()
    }

    /// Registers a new entity and returns the updated document with its
    /// freshly generated key. No character references it yet.
    pub fn create_entity(
        &self,
        entity_type: impl Into<String>,
        mutability: Mutability,
        data: EntityData,
    ) -> (Self, EntityKey) {
        let key = self.next_entity;
        let mut next = self.clone();
        Arc::make_mut(&mut next.entities).insert(key, Entity::new(entity_type, mutability, data));
        next.next_entity = key.next();
        next.last_created = Some(key);
        (next, key)
    }

    pub fn merge_entity_data(&self, key: EntityKey, patch: &EntityData) -> EntityResult<Self> {
        let entity = self.entity(key).ok_or(EntityError::UnknownEntity(key))?;
        Ok(self.with_entity(key, entity.merged(patch)))
    }

    pub fn replace_entity_data(&self, key: EntityKey, data: EntityData) -> EntityResult<Self> {
        let entity = self.entity(key).ok_or(EntityError::UnknownEntity(key))?;
        Ok(self.with_entity(key, entity.replaced(data)))
    }

    fn with_entity(&self, key: EntityKey, entity: Entity) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.entities).insert(key, entity);
        next
    }

    /// Replaces the blocks whose keys match the given blocks, keeping order
    /// and sharing every other block. Blocks with unknown keys are ignored.
    pub fn with_blocks(&self, updated: impl IntoIterator<Item = Arc<Block>>) -> Self {
        let mut updated = updated.into_iter().peekable();
        if updated.peek().is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        let blocks = Arc::make_mut(&mut next.blocks);
        for block in updated {
            if let Some(slot) = blocks.get_mut(block.key()) {
                *slot = block;
            }
        }
        next
    }

    /// Appends a block at the end of the document.
    pub fn with_appended_block(&self, block: Block) -> EntityResult<Self> {
        if self.blocks.contains_key(block.key()) {
            return Err(EntityError::DuplicateBlock(block.key().clone()));
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.blocks).insert(block.key().clone(), Arc::new(block));
        Ok(next)
    }

    pub fn with_selections(&self, before: Selection, after: Selection) -> Self {
        Self {
            selection_before: Some(before),
            selection_after: Some(after),
            ..self.clone()
        }
    }

    /// Selection from `anchor` to `focus`, marked backward when the focus
    /// precedes the anchor in document order.
    pub fn select(&self, anchor: (BlockKey, usize), focus: (BlockKey, usize)) -> Selection {
        let anchor_pos = (self.block_index(&anchor.0), anchor.1);
        let focus_pos = (self.block_index(&focus.0), focus.1);
        let mut selection = Selection::new(anchor.0, anchor.1, focus.0, focus.1);
        selection.is_backward = focus_pos < anchor_pos;
        selection
    }

    /// Checks that a selection only references existing blocks and offsets
    /// and that its start does not come after its end.
    pub fn validate_selection(&self, selection: &Selection) -> EntityResult<()> {
        let start = self.position_index(selection.start_key(), selection.start_offset())?;
        let end = self.position_index(selection.end_key(), selection.end_offset())?;
        if start > end {
            return Err(EntityError::InvertedSelection);
        }
        Ok(())
    }

    fn position_index(&self, key: &BlockKey, offset: usize) -> EntityResult<(usize, usize)> {
        let (index, _, block) = self
            .blocks
            .get_full(key)
            .ok_or_else(|| EntityError::UnknownBlock(key.clone()))?;
        if offset > block.len() {
            return Err(EntityError::OffsetOutOfBounds {
                block: key.clone(),
                offset,
                len: block.len(),
            });
        }
        Ok((index, offset))
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .values()
            .map(|block| block.text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Kind of change recorded when a new content state is pushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChangeType {
    ApplyEntity,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::ApplyEntity => f.write_str("apply-entity"),
        }
    }
}

/// A document paired with the selection to display.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    content: Document,
    selection: Selection,
    last_change: Option<ChangeType>,
}

impl EditorState {
    pub fn new(content: Document, selection: Selection) -> Self {
        Self {
            content,
            selection,
            last_change: None,
        }
    }

    /// State with the cursor at the start of the first block. An empty
    /// document receives a single empty block first.
    pub fn from_document(content: Document) -> Self {
        let content = if content.block_count() > 0 {
            content
        } else {
            content
                .with_appended_block(Block::new("b0", ""))
                .unwrap_or(content)
        };
        let selection = content
            .first_block()
            .map(|block| Selection::collapsed(block.key().clone(), 0))
            .unwrap_or_else(|| Selection::collapsed(BlockKey::new("b0"), 0));
        Self::new(content, selection)
    }

    pub fn content(&self) -> &Document {
        &self.content
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_change(&self) -> Option<ChangeType> {
        self.last_change
    }

    /// Records `content` as the new current state. The displayed selection
    /// becomes the content's `selection_after`.
    pub fn push(&self, content: Document, change: ChangeType) -> Self {
        let selection = content
            .selection_after()
            .cloned()
            .unwrap_or_else(|| self.selection.clone());
        Self {
            content,
            selection,
            last_change: Some(change),
        }
    }

    /// Re-asserts `selection` as the one to display, even when the content
    /// carries a different `selection_after`.
    pub fn force_selection(self, selection: Selection) -> Self {
        Self { selection, ..self }
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;

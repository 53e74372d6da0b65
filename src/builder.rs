//! Fluent construction of editor states for fixtures, demos and benches.
//!
//! Offsets passed to `anchor`, `focus`, `collapse` and `add_entity` refer to
//! the most recently added block.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::document::{
    Block, BlockKey, Character, Document, EditorState, Entity, EntityData, EntityKey, Selection,
};
use crate::entities::EntityDescriptor;

#[derive(Debug, Default)]
pub struct DocumentBuilder {
    blocks: Vec<(BlockKey, Vec<Character>)>,
    entities: IndexMap<EntityKey, Entity>,
    anchor: Option<(BlockKey, usize)>,
    focus: Option<(BlockKey, usize)>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(mut self, text: &str) -> Self {
        let key = BlockKey::new(format!("b{}", self.blocks.len()));
        self.blocks
            .push((key, text.chars().map(Character::new).collect()));
        self
    }

    pub fn anchor(mut self, offset: usize) -> Self {
        self.anchor = self.current_key().map(|key| (key, offset));
        self
    }

    pub fn focus(mut self, offset: usize) -> Self {
        self.focus = self.current_key().map(|key| (key, offset));
        self
    }

    pub fn collapse(self, offset: usize) -> Self {
        self.anchor(offset).focus(offset)
    }

    /// Tags `[start, end)` of the current block with a new entity carrying
    /// the descriptor's default data.
    pub fn add_entity(self, descriptor: &EntityDescriptor, start: usize, end: usize) -> Self {
        let data = descriptor.data().clone();
        self.add_entity_with_data(descriptor, data, start, end)
    }

    pub fn add_entity_with_data(
        mut self,
        descriptor: &EntityDescriptor,
        data: EntityData,
        start: usize,
        end: usize,
    ) -> Self {
        let key = EntityKey::new(self.entities.len() as u64 + 1);
        let Some((_, characters)) = self.blocks.last_mut() else {
            return self;
        };
        let end = end.min(characters.len());
        let start = start.min(end);
        for character in &mut characters[start..end] {
            character.entity = Some(key);
        }
        self.entities.insert(
            key,
            Entity::new(descriptor.entity_type(), descriptor.mutability(), data),
        );
        self
    }

    fn current_key(&self) -> Option<BlockKey> {
        self.blocks.last().map(|(key, _)| key.clone())
    }

    pub fn build_document(&self) -> Document {
        let blocks = self
            .blocks
            .iter()
            .map(|(key, characters)| {
                let block = Block::from_characters(key.clone(), characters.clone());
                (key.clone(), Arc::new(block))
            })
            .collect();
        Document::assemble(blocks, self.entities.clone())
    }

    /// Builds the state. Without an anchor the cursor sits at the start of
    /// the first block; without a focus the selection is collapsed at the
    /// anchor.
    pub fn build(self) -> EditorState {
        let document = self.build_document();
        let Some(anchor) = self.anchor.clone() else {
            return EditorState::from_document(document);
        };
        let focus = self.focus.clone().unwrap_or_else(|| anchor.clone());
        let selection: Selection = document.select(anchor, focus);
        EditorState::new(document, selection)
    }
}

//! Conversion of `tdoc` documents (FTML, Markdown) into entity documents.
//!
//! Paragraph structure is flattened depth first: every text-bearing
//! paragraph and checklist item becomes one block. Inline styles other than
//! links are dropped; each link span becomes its own `LINK` entity.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tdoc::{ChecklistItem, InlineStyle, Paragraph, ParagraphType, Span};
use tracing::debug;

use crate::document::{Block, BlockKey, Character, Document, EditorState, Entity, EntityKey};
use crate::entities::EntityDescriptor;

/// Imports `source`, registering one `LINK` entity per link span.
pub fn import_document(source: &tdoc::Document) -> Document {
    let mut importer = Importer {
        blocks: IndexMap::new(),
        entities: IndexMap::new(),
        link: EntityDescriptor::link(),
    };
    for paragraph in &source.paragraphs {
        importer.paragraph(paragraph);
    }
    debug!(
        blocks = importer.blocks.len(),
        entities = importer.entities.len(),
        "imported tdoc document"
    );
    Document::assemble(importer.blocks, importer.entities)
}

/// Imports `source` with the cursor at the start of the first block.
pub fn import_state(source: &tdoc::Document) -> EditorState {
    EditorState::from_document(import_document(source))
}

struct Importer {
    blocks: IndexMap<BlockKey, Arc<Block>>,
    entities: IndexMap<EntityKey, Entity>,
    link: EntityDescriptor,
}

impl Importer {
    fn paragraph(&mut self, paragraph: &Paragraph) {
        let paragraph_type = paragraph.paragraph_type();
        if paragraph_type.is_leaf() && paragraph_type != ParagraphType::Checklist {
            let mut characters = Vec::new();
            self.spans(paragraph.content(), None, &mut characters);
            self.push_block(characters);
        }
        for child in paragraph.children() {
            self.paragraph(child);
        }
        for entry in paragraph.entries() {
            for child in entry {
                self.paragraph(child);
            }
        }
        if paragraph_type == ParagraphType::Checklist {
            for item in paragraph.checklist_items() {
                self.checklist_item(item);
            }
        }
    }

    fn checklist_item(&mut self, item: &ChecklistItem) {
        let mut characters = Vec::new();
        self.spans(&item.content, None, &mut characters);
        self.push_block(characters);
        for child in &item.children {
            self.checklist_item(child);
        }
    }

    fn spans(&mut self, spans: &[Span], entity: Option<EntityKey>, out: &mut Vec<Character>) {
        for span in spans {
            let entity = if span.style == InlineStyle::Link {
                Some(self.link_entity(span.link_target.as_deref().unwrap_or_default()))
            } else {
                entity
            };
            out.extend(
                span.text
                    .chars()
                    .map(|ch| Character::new(ch).with_entity(entity)),
            );
            self.spans(&span.children, entity, out);
        }
    }

    fn link_entity(&mut self, url: &str) -> EntityKey {
        let key = EntityKey::new(self.entities.len() as u64 + 1);
        let mut data = self.link.data().clone();
        data.insert("url".to_string(), Value::String(url.to_string()));
        self.entities.insert(
            key,
            Entity::new(self.link.entity_type(), self.link.mutability(), data),
        );
        key
    }

    fn push_block(&mut self, characters: Vec<Character>) {
        let key = BlockKey::new(format!("b{}", self.blocks.len()));
        let block = Block::from_characters(key.clone(), characters);
        self.blocks.insert(key, Arc::new(block));
    }
}

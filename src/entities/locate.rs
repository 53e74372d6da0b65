use tracing::trace;

use crate::document::{BlockKey, Document, EntityData, EntityKey, Selection};

use super::slice::selected_slices;

/// Where the first entity of a type was found under a selection.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityLocation {
    pub block_key: BlockKey,
    pub char_offset: usize,
    pub entity_key: EntityKey,
    pub data: EntityData,
}

/// Finds the first character under the selection carrying an entity of
/// `entity_type`, scanning blocks in document order and offsets in
/// ascending order.
///
/// The scan covers `start..=end` of every selected slice, so a collapsed
/// cursor still sees the character right after it.
pub fn find_first_entity_of_type_in_range(
    entity_type: &str,
    document: &Document,
    selection: &Selection,
) -> Option<EntityLocation> {
    for (block, range) in selected_slices(document, selection) {
        for char_offset in range.start..=range.end {
            let Some(entity_key) = block.entity_at(char_offset) else {
                continue;
            };
            let Some(entity) = document.entity(entity_key) else {
                continue;
            };
            if !entity.has_type(entity_type) {
                continue;
            }
            trace!(%entity_key, block = %block.key(), char_offset, "located {entity_type} entity");
            return Some(EntityLocation {
                block_key: block.key().clone(),
                char_offset,
                entity_key,
                data: entity.data.clone(),
            });
        }
    }
    None
}

use crate::document::{Block, Document};

use super::slice::TextRange;

/// Returns a scanner reporting the ranges of `block` tagged with an entity
/// of `entity_type`.
pub fn entity_ranges_of_type(
    entity_type: impl Into<String>,
) -> impl Fn(&Block, &Document) -> Vec<TextRange> {
    let entity_type = entity_type.into();
    move |block, document| find_entity_ranges_of_type(&entity_type, block, document)
}

pub fn find_entity_ranges_of_type(
    entity_type: &str,
    block: &Block,
    document: &Document,
) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    visit_entity_ranges(entity_type, block, document, &mut |start, end| {
        ranges.push(TextRange::new(start, end))
    });
    ranges
}

/// Decorator strategy for `entity_type`: reports every matching range of a
/// block through `emit`.
pub fn entity_strategy(
    entity_type: impl Into<String>,
) -> impl Fn(&Block, &mut dyn FnMut(usize, usize), &Document) {
    let entity_type = entity_type.into();
    move |block, emit, document| visit_entity_ranges(&entity_type, block, document, emit)
}

fn visit_entity_ranges(
    entity_type: &str,
    block: &Block,
    document: &Document,
    emit: &mut dyn FnMut(usize, usize),
) {
    block.find_entity_ranges(
        |character| {
            character
                .entity
                .and_then(|key| document.entity(key))
                .is_some_and(|entity| entity.has_type(entity_type))
        },
        emit,
    );
}

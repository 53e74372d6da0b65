use std::sync::Arc;

use crate::document::{Character, Document, Selection};

use super::slice::selected_slices;

/// Curried form of [`map_selected_characters`]: fixes the transform and
/// returns a function of the document and selection.
pub fn character_mapper<F>(transform: F) -> impl Fn(&Document, &Selection) -> Document
where
    F: Fn(&Character, &Document) -> Character,
{
    move |document, selection| map_selected_characters(document, selection, &transform)
}

/// Rewrites every selected character through `transform`.
///
/// Only blocks whose characters actually change are replaced; the rest are
/// shared with `document`. Both recorded selections of the result are set
/// to `selection`.
pub fn map_selected_characters<F>(document: &Document, selection: &Selection, transform: F) -> Document
where
    F: Fn(&Character, &Document) -> Character,
{
    let mut updated = Vec::new();
    for (block, range) in selected_slices(document, selection) {
        if range.is_empty() {
            continue;
        }
        let mut characters = block.characters().to_vec();
        let mut changed = false;
        for character in &mut characters[range.start..range.end] {
            let mapped = transform(character, document);
            if mapped != *character {
                *character = mapped;
                changed = true;
            }
        }
        if changed {
            updated.push(Arc::new(block.with_characters(characters)));
        }
    }

    document
        .with_blocks(updated)
        .with_selections(selection.clone(), selection.clone())
}

use tracing::{debug, trace};

use crate::document::{
    ChangeType, Document, EditorState, EntityData, EntityKey, Selection, SelectionPatch,
};
use crate::error::EntityResult;

use super::manager::EntityDescriptor;
use super::mapper::map_selected_characters;
use super::slice::selected_slices;

/// Registers a new entity built from `descriptor` (its defaults overlaid
/// with `data`) and applies it to the selection.
///
/// A collapsed cursor tags the single character after it; at or past the
/// end of the block nothing happens and `state` is returned as is, as it
/// is when the selection covers no characters at all. The returned state
/// always displays the caller's original selection.
pub fn create_entity(
    state: &EditorState,
    descriptor: &EntityDescriptor,
    data: EntityData,
) -> EditorState {
    let selection = state.selection();
    let Some(target) = tagging_selection(state.content(), selection) else {
        trace!(entity_type = descriptor.entity_type(), "cursor at end of block, nothing to tag");
        return state.clone();
    };
    let covers_nothing = selected_slices(state.content(), &target)
        .iter()
        .all(|(_, range)| range.is_empty());
    if covers_nothing {
        trace!(entity_type = descriptor.entity_type(), "selection covers no characters");
        return state.clone();
    }

    let (content, entity_key) = state.content().create_entity(
        descriptor.entity_type(),
        descriptor.mutability(),
        descriptor.data_with(&data),
    );
    let content = map_selected_characters(&content, &target, |character, _| {
        character.with_entity(Some(entity_key))
    });
    debug!(
        %entity_key,
        entity_type = descriptor.entity_type(),
        block = %target.start_key(),
        start = target.start_offset(),
        end = target.end_offset(),
        "created entity"
    );

    state
        .push(content, ChangeType::ApplyEntity)
        .force_selection(selection.clone())
}

/// Shallow-merges `patch` into the data of an existing entity. Which
/// characters reference the entity does not change.
pub fn merge_entity_data(
    state: &EditorState,
    entity_key: EntityKey,
    patch: &EntityData,
) -> EntityResult<EditorState> {
    let content = state.content().merge_entity_data(entity_key, patch)?;
    debug!(%entity_key, fields = patch.len(), "merged entity data");
    Ok(state
        .push(content, ChangeType::ApplyEntity)
        .force_selection(state.selection().clone()))
}

/// Replaces the whole data table of an existing entity.
pub fn set_entity_data(
    state: &EditorState,
    entity_key: EntityKey,
    data: EntityData,
) -> EntityResult<EditorState> {
    let content = state.content().replace_entity_data(entity_key, data)?;
    debug!(%entity_key, "replaced entity data");
    Ok(state
        .push(content, ChangeType::ApplyEntity)
        .force_selection(state.selection().clone()))
}

/// Clears references to entities of `entity_type` from the selected
/// characters. Entities of other types stay in place.
///
/// Collapsed cursors follow the same one-character rule as
/// [`create_entity`].
pub fn remove_entity(state: &EditorState, entity_type: &str) -> EditorState {
    let selection = state.selection();
    let Some(target) = tagging_selection(state.content(), selection) else {
        trace!(entity_type, "cursor at end of block, nothing to remove");
        return state.clone();
    };

    let content = map_selected_characters(state.content(), &target, |character, document| {
        let matches = character
            .entity
            .and_then(|key| document.entity(key))
            .is_some_and(|entity| entity.has_type(entity_type));
        if matches {
            character.with_entity(None)
        } else {
            *character
        }
    });
    debug!(
        entity_type,
        block = %target.start_key(),
        start = target.start_offset(),
        end = target.end_offset(),
        "removed entity references"
    );

    state
        .push(content, ChangeType::ApplyEntity)
        .force_selection(selection.clone())
}

/// The selection an entity operation actually touches: the selection
/// itself, or one character after a collapsed cursor. `None` when the
/// cursor sits at or past the end of its block.
fn tagging_selection(document: &Document, selection: &Selection) -> Option<Selection> {
    if !selection.is_collapsed() {
        return Some(selection.clone());
    }
    let offset = selection.start_offset();
    let len = document.block(selection.start_key())?.len();
    if offset >= len {
        return None;
    }
    Some(selection.merge(SelectionPatch {
        anchor_offset: Some(offset),
        focus_offset: Some(offset + 1),
        is_backward: Some(false),
        ..Default::default()
    }))
}

#[cfg(test)]
#[path = "mutate_tests.rs"]
mod mutate_tests;

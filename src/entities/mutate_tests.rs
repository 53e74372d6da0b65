use serde_json::json;

use super::*;
use crate::builder::DocumentBuilder;
use crate::entities::{COLOR, LINK, TextRange, find_entity_ranges_of_type};
use crate::error::EntityError;

const TEXT: &str = "text with entity here";

fn data(value: serde_json::Value) -> EntityData {
    value.as_object().cloned().unwrap_or_default()
}

fn ranges(state: &EditorState, entity_type: &str, index: usize) -> Vec<TextRange> {
    let document = state.content();
    find_entity_ranges_of_type(entity_type, document.block_at(index).unwrap(), document)
}

fn linked_state() -> EditorState {
    DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(17)
        .focus(21)
        .add_entity(&EntityDescriptor::link(), 17, 21)
        .add_block(TEXT)
        .build()
}

#[test]
fn create_tags_selected_range() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(17)
        .focus(21)
        .build();
    let next = create_entity(
        &state,
        &EntityDescriptor::link(),
        data(json!({"href": "hello-world.com", "target": "_blank"})),
    );

    assert_eq!(ranges(&next, LINK, 0), vec![TextRange::new(17, 21)]);
    assert_eq!(next.selection(), state.selection());
    assert_eq!(next.last_change(), Some(ChangeType::ApplyEntity));

    let key = next.content().first_block().unwrap().entity_at(17).unwrap();
    assert_eq!(
        next.content().entity(key).unwrap().data,
        data(json!({"url": "", "href": "hello-world.com", "target": "_blank"}))
    );
}

#[test]
fn create_leaves_input_state_untouched() {
    let state = DocumentBuilder::new().add_block(TEXT).anchor(0).focus(4).build();
    let _ = create_entity(&state, &EntityDescriptor::link(), EntityData::new());
    assert_eq!(state.content().entity_count(), 0);
    assert!(ranges(&state, LINK, 0).is_empty());
}

#[test]
fn create_spans_multiple_blocks_with_one_entity() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(17)
        .add_block("second")
        .focus(3)
        .build();
    let next = create_entity(&state, &EntityDescriptor::link(), EntityData::new());

    assert_eq!(ranges(&next, LINK, 0), vec![TextRange::new(17, 21)]);
    assert_eq!(ranges(&next, LINK, 1), vec![TextRange::new(0, 3)]);
    let first = next.content().block_at(0).unwrap().entity_at(17);
    let second = next.content().block_at(1).unwrap().entity_at(0);
    assert_eq!(first, second);
    assert_eq!(next.content().entity_count(), 1);
}

#[test]
fn collapsed_create_tags_one_character_and_keeps_cursor() {
    let state = DocumentBuilder::new().add_block(TEXT).collapse(5).build();
    let next = create_entity(&state, &EntityDescriptor::link(), EntityData::new());

    assert_eq!(ranges(&next, LINK, 0), vec![TextRange::new(5, 6)]);
    assert!(next.selection().is_collapsed());
    assert_eq!(next.selection().focus_offset, 5);
    assert_eq!(next.selection().anchor_offset, 5);
}

#[test]
fn collapsed_create_at_block_end_is_a_no_op() {
    let state = DocumentBuilder::new().add_block(TEXT).collapse(21).build();
    let next = create_entity(&state, &EntityDescriptor::link(), EntityData::new());
    assert_eq!(next, state);
    assert_eq!(next.content().entity_count(), 0);
    assert_eq!(next.last_change(), None);
}

#[test]
fn create_over_selection_without_characters_is_a_no_op() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(21)
        .add_block("second")
        .focus(0)
        .build();
    assert!(!state.selection().is_collapsed());
    let next = create_entity(&state, &EntityDescriptor::link(), EntityData::new());
    assert_eq!(next, state);
    assert_eq!(next.content().entity_count(), 0);
    assert_eq!(next.last_change(), None);
}

#[test]
fn merge_is_shallow_union_and_keeps_selection() {
    let state = linked_state();
    let key = state.content().first_block().unwrap().entity_at(17).unwrap();
    let next = merge_entity_data(&state, key, &data(json!({"url": "google.com"}))).unwrap();

    let updated = next.content().first_block().unwrap().entity_at(17).unwrap();
    assert_eq!(updated, key);
    assert_eq!(
        next.content().entity(key).unwrap().data,
        data(json!({"url": "google.com", "target": ""}))
    );
    assert_eq!(next.selection(), state.selection());
    assert_eq!(ranges(&next, LINK, 0), vec![TextRange::new(17, 21)]);
}

#[test]
fn set_replaces_data() {
    let state = linked_state();
    let key = state.content().first_block().unwrap().entity_at(17).unwrap();
    let new_data = data(json!({"href": "new-data", "target": "_blank", "other": "Hello"}));
    let next = set_entity_data(&state, key, new_data.clone()).unwrap();
    assert_eq!(next.content().entity(key).unwrap().data, new_data);
}

#[test]
fn set_is_idempotent() {
    let state = linked_state();
    let key = state.content().first_block().unwrap().entity_at(17).unwrap();
    let new_data = data(json!({"url": "once.com"}));
    let once = set_entity_data(&state, key, new_data.clone()).unwrap();
    let twice = set_entity_data(&once, key, new_data).unwrap();
    assert_eq!(
        once.content().entity(key).unwrap().data,
        twice.content().entity(key).unwrap().data
    );
}

#[test]
fn merge_and_set_reject_unknown_entities() {
    let state = DocumentBuilder::new().add_block(TEXT).build();
    let missing = EntityKey::new(9);
    assert!(matches!(
        merge_entity_data(&state, missing, &EntityData::new()),
        Err(EntityError::UnknownEntity(_))
    ));
    assert!(matches!(
        set_entity_data(&state, missing, EntityData::new()),
        Err(EntityError::UnknownEntity(_))
    ));
}

#[test]
fn remove_clears_selected_entity() {
    let next = remove_entity(&linked_state(), LINK);
    assert!(ranges(&next, LINK, 0).is_empty());
    assert_eq!(next.last_change(), Some(ChangeType::ApplyEntity));
}

#[test]
fn remove_leaves_other_types_in_place() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .add_entity(&EntityDescriptor::color(), 0, 4)
        .add_entity(&EntityDescriptor::link(), 5, 9)
        .anchor(0)
        .focus(9)
        .build();
    let next = remove_entity(&state, LINK);
    assert!(ranges(&next, LINK, 0).is_empty());
    assert_eq!(ranges(&next, COLOR, 0), vec![TextRange::new(0, 4)]);
}

#[test]
fn remove_only_touches_selection() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .add_entity(&EntityDescriptor::link(), 0, 21)
        .anchor(5)
        .focus(10)
        .build();
    let next = remove_entity(&state, LINK);
    assert_eq!(
        ranges(&next, LINK, 0),
        vec![TextRange::new(0, 5), TextRange::new(10, 21)]
    );
}

#[test]
fn collapsed_remove_clears_one_character_and_keeps_cursor() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .collapse(18)
        .add_entity(&EntityDescriptor::link(), 17, 21)
        .build();
    let next = remove_entity(&state, LINK);
    assert_eq!(
        ranges(&next, LINK, 0),
        vec![TextRange::new(17, 18), TextRange::new(19, 21)]
    );
    assert_eq!(next.selection(), state.selection());
}

#[test]
fn collapsed_remove_at_block_end_is_a_no_op() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .add_entity(&EntityDescriptor::link(), 17, 21)
        .collapse(21)
        .build();
    assert_eq!(remove_entity(&state, LINK), state);
}

use pretty_assertions::assert_eq;
use pure_entities::{
    ChangeType, Document, DocumentBuilder, EntityData, EntityKey, EntityManager, Mutability,
    decorate::CompositeDecorator,
    entities::{EntityDescriptor, LINK, TextRange, find_entity_ranges_of_type},
    raw::{RawBlock, RawEntityRange},
    theme::Theme,
};
use serde_json::json;

const TEXT: &str = "text with entity here";

fn data(value: serde_json::Value) -> EntityData {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn create_link_over_selected_word() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(17)
        .focus(21)
        .build();
    let next = EntityManager::link()
        .resolve(&state)
        .create(data(json!({"href": "hello-world.com", "target": "_blank"})));

    let document = next.content();
    assert_eq!(
        find_entity_ranges_of_type(LINK, document.first_block().unwrap(), document),
        vec![TextRange::new(17, 21)]
    );
    assert_eq!(next.last_change(), Some(ChangeType::ApplyEntity));
    assert_eq!(next.selection(), state.selection());
}

#[test]
fn collapsed_cursor_inside_link_is_found() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .collapse(18)
        .add_entity(&EntityDescriptor::link(), 17, 21)
        .build();
    let link = EntityManager::link().resolve(&state);
    assert!(link.exists());
    assert_eq!(link.char_offset(), Some(18));
}

#[test]
fn selection_across_blocks_finds_link_in_second_block() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(0)
        .add_block("text with entity right here")
        .add_entity(&EntityDescriptor::link(), 17, 21)
        .focus(23)
        .build();
    let link = EntityManager::link().resolve(&state);
    assert_eq!(link.char_offset(), Some(17));
    assert_eq!(link.block_key().map(|key| key.as_str()), Some("b1"));
}

#[test]
fn edit_cycle_through_the_manager() {
    let link = EntityManager::link();
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .anchor(10)
        .focus(16)
        .build();

    let created = link.resolve(&state).create(data(json!({"url": "a.com"})));
    let merged = link
        .resolve(&created)
        .merge(Some(data(json!({"target": "_blank"}))));
    assert_eq!(
        link.resolve(&merged).data(),
        Some(&data(json!({"url": "a.com", "target": "_blank"})))
    );

    let replaced = link
        .resolve(&merged)
        .set(Some(data(json!({"url": "b.com"}))));
    assert_eq!(
        link.resolve(&replaced).data(),
        Some(&data(json!({"url": "b.com"})))
    );
    assert_eq!(replaced.content().entity_count(), 1);

    let removed = link.resolve(&replaced).remove();
    assert!(!link.resolve(&removed).exists());
    assert_eq!(removed.content().plain_text(), TEXT);
}

#[test]
fn raw_content_survives_a_round_trip() {
    let state = DocumentBuilder::new()
        .add_block(TEXT)
        .add_entity_with_data(
            &EntityDescriptor::link(),
            data(json!({"url": "a.com", "target": ""})),
            17,
            21,
        )
        .add_block("second block")
        .add_entity_with_data(
            &EntityDescriptor::new("MENTION", Mutability::Immutable),
            data(json!({"name": "ada"})),
            0,
            6,
        )
        .build();

    let raw = state.content().to_raw();
    assert_eq!(
        raw.blocks[1],
        RawBlock {
            key: "b1".into(),
            text: "second block".to_string(),
            entity_ranges: vec![RawEntityRange {
                offset: 0,
                length: 6,
                key: EntityKey::new(2),
            }],
        }
    );

    let json = state.content().to_json().unwrap();
    let restored = Document::from_json(&json).unwrap();
    assert_eq!(restored.to_raw(), raw);
    assert_eq!(restored.plain_text(), state.content().plain_text());
}

#[test]
fn imported_markdown_links_render_with_hints() {
    let parsed = tdoc::markdown::parse(std::io::Cursor::new(
        "See [pure](https://github.com/roblillack/pure) for details.\n",
    ))
    .unwrap();
    let state = pure_entities::import::import_state(&parsed);
    let lines = CompositeDecorator::entities().render_document(
        state.content(),
        &Theme::default(),
        None,
    );
    let text: String = lines[0]
        .spans
        .iter()
        .map(|span| span.content.as_ref())
        .collect();
    assert!(text.contains("pure <https://github.com/roblillack/pure>"));
}

//! Selection-anchored entity operations.
//!
//! Everything here is a pure function of an [`EditorState`](crate::document::EditorState)
//! or a `(Document, Selection)` pair. The entry point for editing is
//! [`EntityManager`]: resolve a handle against the current state, then call
//! `create`, `merge`, `set` or `remove` on it.
//!
//! ```
//! use pure_entities::builder::DocumentBuilder;
//! use pure_entities::entities::{EntityManager, find_entity_ranges_of_type, LINK};
//! use serde_json::json;
//!
//! let state = DocumentBuilder::new()
//!     .add_block("text with entity here")
//!     .anchor(17)
//!     .focus(21)
//!     .build();
//! let link = EntityManager::link().resolve(&state);
//! assert!(!link.exists());
//!
//! let data = json!({"url": "hello-world.com"}).as_object().cloned().unwrap();
//! let next = link.create(data);
//! let block = next.content().first_block().unwrap();
//! let ranges = find_entity_ranges_of_type(LINK, block, next.content());
//! assert_eq!((ranges[0].start, ranges[0].end), (17, 21));
//! ```

mod locate;
mod manager;
mod mapper;
mod mutate;
mod ranges;
mod slice;

pub use locate::{EntityLocation, find_first_entity_of_type_in_range};
pub use manager::{COLOR, EntityDescriptor, EntityHandle, EntityManager, LINK, entity_manager};
pub use mapper::{character_mapper, map_selected_characters};
pub use mutate::{create_entity, merge_entity_data, remove_entity, set_entity_data};
pub use ranges::{entity_ranges_of_type, entity_strategy, find_entity_ranges_of_type};
pub use slice::{BlockSlice, TextRange, selected_blocks, selected_slices, slice_selected_block};

#[cfg(test)]
#[path = "entities_tests.rs"]
mod entities_tests;

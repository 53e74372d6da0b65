//! Selection-anchored entities (links, colors, ...) for block-structured
//! rich text.
//!
//! [`document`] holds the immutable document model, [`entities`] the
//! selection-driven operations on it, and [`decorate`] renders entity
//! ranges for the terminal.

pub mod ansi;
pub mod builder;
pub mod decorate;
pub mod document;
pub mod entities;
pub mod error;
pub mod import;
pub mod raw;
pub mod theme;

pub use builder::DocumentBuilder;
pub use document::{
    Block, BlockKey, ChangeType, Character, Document, EditorState, Entity, EntityData, EntityKey,
    Mutability, Selection, SelectionPatch,
};
pub use entities::{EntityDescriptor, EntityHandle, EntityManager, entity_manager};
pub use error::{EntityError, EntityResult};

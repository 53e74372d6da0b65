use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::document::{BlockKey, EditorState, EntityData, EntityKey, Mutability};

use super::locate::{EntityLocation, find_first_entity_of_type_in_range};
use super::mutate::{create_entity, merge_entity_data, remove_entity, set_entity_data};

pub const LINK: &str = "LINK";
pub const COLOR: &str = "COLOR";

/// Static description of one kind of entity: its type tag, mutability and
/// the default data every new entity starts from.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDescriptor {
    entity_type: String,
    mutability: Mutability,
    data: EntityData,
}

impl EntityDescriptor {
    pub fn new(entity_type: impl Into<String>, mutability: Mutability) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data: EntityData::new(),
        }
    }

    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }

    pub fn with_defaults(mut self, data: EntityData) -> Self {
        self.data = data;
        self
    }

    /// Hyperlink with `url` and `target`.
    pub fn link() -> Self {
        Self::new(LINK, Mutability::Mutable)
            .with_default("url", "")
            .with_default("target", "")
    }

    /// Colored text span with a `color` name or `#rrggbb` value.
    pub fn color() -> Self {
        Self::new(COLOR, Mutability::Mutable).with_default("color", "")
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    /// Default data overlaid with `overrides`.
    pub fn data_with(&self, overrides: &EntityData) -> EntityData {
        let mut data = self.data.clone();
        for (field, value) in overrides {
            data.insert(field.clone(), value.clone());
        }
        data
    }
}

/// Binds an [`EntityDescriptor`] to editor states.
///
/// Resolve a fresh [`EntityHandle`] for every interaction; handles are
/// snapshots of one state and are never updated.
#[derive(Clone, Debug)]
pub struct EntityManager {
    descriptor: Arc<EntityDescriptor>,
}

impl EntityManager {
    pub fn new(descriptor: EntityDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    pub fn link() -> Self {
        Self::new(EntityDescriptor::link())
    }

    pub fn color() -> Self {
        Self::new(EntityDescriptor::color())
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn resolve(&self, state: &EditorState) -> EntityHandle {
        let entity_type = self.descriptor.entity_type();
        let location =
            find_first_entity_of_type_in_range(entity_type, state.content(), state.selection());
        let existing = location
            .as_ref()
            .map(|found| found.entity_key)
            .filter(|key| {
                state
                    .content()
                    .entity(*key)
                    .is_some_and(|entity| entity.has_type(entity_type))
            });
        EntityHandle {
            descriptor: Arc::clone(&self.descriptor),
            state: state.clone(),
            location,
            existing,
        }
    }
}

/// Function form of [`EntityManager::resolve`].
pub fn entity_manager(descriptor: EntityDescriptor) -> impl Fn(&EditorState) -> EntityHandle {
    let manager = EntityManager::new(descriptor);
    move |state| manager.resolve(state)
}

/// Operations bound to one editor state and one entity kind.
#[derive(Clone, Debug)]
pub struct EntityHandle {
    descriptor: Arc<EntityDescriptor>,
    state: EditorState,
    location: Option<EntityLocation>,
    existing: Option<EntityKey>,
}

impl EntityHandle {
    /// Whether an entity of this kind intersects the selection.
    pub fn exists(&self) -> bool {
        self.existing.is_some()
    }

    pub fn entity_key(&self) -> Option<EntityKey> {
        self.location.as_ref().map(|found| found.entity_key)
    }

    pub fn block_key(&self) -> Option<&BlockKey> {
        self.location.as_ref().map(|found| &found.block_key)
    }

    pub fn char_offset(&self) -> Option<usize> {
        self.location.as_ref().map(|found| found.char_offset)
    }

    pub fn data(&self) -> Option<&EntityData> {
        self.location.as_ref().map(|found| &found.data)
    }

    pub fn location(&self) -> Option<&EntityLocation> {
        self.location.as_ref()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn create(&self, data: EntityData) -> EditorState {
        create_entity(&self.state, &self.descriptor, data)
    }

    /// Merges `data` (or the defaults) into the existing entity. Without
    /// one, a new entity is created instead.
    pub fn merge(&self, data: Option<EntityData>) -> EditorState {
        let Some(key) = self.existing else {
            return self.create(data.unwrap_or_default());
        };
        let patch = data.unwrap_or_else(|| self.descriptor.data().clone());
        match merge_entity_data(&self.state, key, &patch) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "merge target vanished, creating a new entity");
                self.create(patch)
            }
        }
    }

    /// Replaces the existing entity's data with `data` (or the defaults).
    /// Without one, a new entity is created instead.
    pub fn set(&self, data: Option<EntityData>) -> EditorState {
        let Some(key) = self.existing else {
            return self.create(data.unwrap_or_default());
        };
        let data = data.unwrap_or_else(|| self.descriptor.data().clone());
        match set_entity_data(&self.state, key, data.clone()) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "set target vanished, creating a new entity");
                self.create(data)
            }
        }
    }

    pub fn remove(&self) -> EditorState {
        remove_entity(&self.state, self.descriptor.entity_type())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod manager_tests;

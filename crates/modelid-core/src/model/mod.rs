//! In-memory form of the identity descriptor.
//!
//! A `Model` is loaded once per generation run, passed explicitly through
//! reconciliation and validation, then committed. Nothing here is global.

mod entity;
mod property;
mod retired;

pub use entity::Entity;
pub use property::Property;
pub use retired::RetiredUids;

use crate::id::{IdUid, Uid};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

///
/// Model
///

#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Freeform comment, written back exactly as loaded.
    pub comment: JsonValue,
    pub entities: Vec<Entity>,
    pub last_entity_id: Option<IdUid>,
    pub last_index_id: Option<IdUid>,
    pub retired_entity_uids: RetiredUids,
    pub retired_index_uids: RetiredUids,
    pub retired_property_uids: RetiredUids,
}

impl Model {
    /// Empty model whose comment is the given lines.
    #[must_use]
    pub fn new<I, S>(comment: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comment: JsonValue::Array(
                comment
                    .into_iter()
                    .map(|line| JsonValue::String(line.into()))
                    .collect(),
            ),
            entities: Vec::new(),
            last_entity_id: None,
            last_index_id: None,
            retired_entity_uids: RetiredUids::new(),
            retired_index_uids: RetiredUids::new(),
            retired_property_uids: RetiredUids::new(),
        }
    }

    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Every uid held by an active entity, property or index.
    pub fn active_uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.entities.iter().flat_map(Entity::uids)
    }

    /// Every uid ever retired, across all three kinds.
    pub fn retired_uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.retired_entity_uids
            .iter()
            .chain(self.retired_index_uids.iter())
            .chain(self.retired_property_uids.iter())
    }

    #[must_use]
    pub fn active_uid_set(&self) -> BTreeSet<Uid> {
        self.active_uids().collect()
    }

    #[must_use]
    pub fn retired_uid_set(&self) -> BTreeSet<Uid> {
        self.retired_uids().collect()
    }

    /// Number of active properties across all entities.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.entities.iter().map(|e| e.properties.len()).sum()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

mod entity;
mod property;

pub use entity::SchemaEntity;
pub use property::SchemaProperty;

use crate::{prelude::*, validate::validate_schema};

///
/// UidAnnotation
///
/// Uid annotation an author attached to an entity or property in source.
/// `Requested` is an empty annotation: the author wants to know the current
/// uid before renaming the element.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UidAnnotation {
    #[default]
    None,
    Pinned(u64),
    Requested,
}

impl UidAnnotation {
    #[must_use]
    pub const fn pinned(self) -> Option<u64> {
        match self {
            Self::Pinned(uid) => Some(uid),
            Self::None | Self::Requested => None,
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

///
/// Schema
///
/// Ordered entity list as declared in source.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Schema {
    #[serde(default)]
    pub entities: Vec<SchemaEntity>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn entity(mut self, entity: SchemaEntity) -> Self {
        self.entities.push(entity);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaEntity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Check naming and annotation rules on every entity and property.
    pub fn validate(&self) -> Result<(), ErrorTree> {
        validate_schema(self)
    }
}

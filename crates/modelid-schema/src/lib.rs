//! Incoming schema description handed over by a source extractor, plus the
//! naming rules every entity and property has to satisfy before its
//! identifiers are reconciled.

pub mod error;
pub mod node;
pub mod validate;

/// Maximum length for entity names.
pub const MAX_ENTITY_NAME_LEN: usize = 64;

/// Maximum length for property names.
pub const MAX_PROPERTY_NAME_LEN: usize = 64;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        err,
        error::ErrorTree,
        node::{Schema, SchemaEntity, SchemaProperty, UidAnnotation},
    };
    pub use serde::{Deserialize, Serialize};
}

//! Stable identity map for a source-declared data model: identifiers,
//! descriptor codec, uid allocation, reconciliation, validation and the
//! atomic descriptor writer.

pub mod alloc;
pub mod codec;
pub mod error;
pub mod generator;
pub mod id;
pub mod model;
pub mod reconcile;
pub mod validate;
pub mod writer;

pub use error::Error;
pub use generator::{Generator, RunOutcome};

///
/// Prelude
///
/// Domain vocabulary only. Errors and I/O helpers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        id::{IdUid, Sequence, Uid},
        model::{Entity, Model, Property, RetiredUids},
        reconcile::ReconcileSummary,
    };
    pub use modelid_schema::node::{Schema, SchemaEntity, SchemaProperty, UidAnnotation};
}

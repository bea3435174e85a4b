//! Schema validation orchestration.

pub mod naming;

use crate::prelude::*;

/// Validate every entity and property, routing errors by entity name.
pub(crate) fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    for entity in &schema.entities {
        errs.merge_for(entity.name.clone(), validate_entity(entity));
    }

    errs.result()
}

fn validate_entity(entity: &SchemaEntity) -> ErrorTree {
    let mut errs = ErrorTree::new();

    if let Err(msg) = naming::validate_entity_name(&entity.name) {
        errs.add(msg);
    }
    if let Err(msg) = validate_annotation(entity.uid) {
        errs.add(msg);
    }

    for property in &entity.properties {
        if let Err(msg) = naming::validate_property_name(&property.name) {
            errs.add_for(property.name.clone(), msg);
        }
        if let Err(msg) = validate_annotation(property.uid) {
            errs.add_for(property.name.clone(), msg);
        }
    }

    errs
}

fn validate_annotation(uid: UidAnnotation) -> Result<(), String> {
    if uid == UidAnnotation::Pinned(0) {
        return Err("uid annotation must not be zero".to_string());
    }

    Ok(())
}

///
/// TESTS
///

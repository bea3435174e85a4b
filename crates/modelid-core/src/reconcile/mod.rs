//! Reconciliation of an incoming schema against the stored model.
//!
//! Entities are matched first, then the properties of every surviving or new
//! entity. Existing elements keep their position; new ones are appended in
//! schema order. The input model is never mutated, so a failed run leaves
//! the caller's copy intact.

pub mod matcher;

use crate::{
    alloc::{UidAllocator, UidPool},
    error::{Error, Scope},
    model::{Entity, Model, Property},
};
use matcher::{Existing, Incoming, Match, plan_matches};
use modelid_schema::node::{Schema, SchemaEntity};
use rand::{CryptoRng, RngCore};
use std::fmt;
use tracing::debug;

///
/// ReconcileSummary
/// What a reconciliation changed.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReconcileSummary {
    pub entities_added: usize,
    pub entities_renamed: usize,
    pub entities_removed: usize,
    pub properties_added: usize,
    pub properties_renamed: usize,
    pub properties_removed: usize,
    pub indexes_added: usize,
    pub indexes_removed: usize,
}

impl ReconcileSummary {
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        self.entities_added == 0
            && self.entities_renamed == 0
            && self.entities_removed == 0
            && self.properties_added == 0
            && self.properties_renamed == 0
            && self.properties_removed == 0
            && self.indexes_added == 0
            && self.indexes_removed == 0
    }
}

impl fmt::Display for ReconcileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entities +{} ~{} -{}, properties +{} ~{} -{}, indexes +{} -{}",
            self.entities_added,
            self.entities_renamed,
            self.entities_removed,
            self.properties_added,
            self.properties_renamed,
            self.properties_removed,
            self.indexes_added,
            self.indexes_removed,
        )
    }
}

///
/// Reconciled
///

#[derive(Clone, Debug)]
pub struct Reconciled {
    pub model: Model,
    pub summary: ReconcileSummary,
}

/// Reconcile `schema` against `model`, allocating identifiers for new
/// elements and retiring the uids of removed ones.
pub fn reconcile<R>(
    model: &Model,
    schema: &Schema,
    allocator: &mut UidAllocator<R>,
) -> Result<Reconciled, Error>
where
    R: RngCore + CryptoRng,
{
    schema.validate().map_err(Error::InvalidSchema)?;

    let mut next = model.clone();
    next.entities = Vec::new();

    let mut merge = Merge {
        allocator,
        pool: UidPool::from_model(model),
        model: next,
        summary: ReconcileSummary::default(),
    };
    let entities = merge.entities(&model.entities, &schema.entities)?;

    let Merge {
        mut model,
        summary,
        ..
    } = merge;
    model.entities = entities;

    Ok(Reconciled { model, summary })
}

///
/// Merge
/// Working state of one reconciliation.
///

struct Merge<'a, R> {
    allocator: &'a mut UidAllocator<R>,
    pool: UidPool,
    model: Model,
    summary: ReconcileSummary,
}

impl<R: RngCore + CryptoRng> Merge<'_, R> {
    fn entities(
        &mut self,
        old: &[Entity],
        schema: &[SchemaEntity],
    ) -> Result<Vec<Entity>, Error> {
        let existing: Vec<Existing<'_>> = old
            .iter()
            .map(|e| Existing {
                uid: e.id.uid,
                name: &e.name,
            })
            .collect();
        let wanted: Vec<Incoming<'_>> = schema
            .iter()
            .map(|e| Incoming {
                name: &e.name,
                uid: e.uid,
            })
            .collect();
        let plan = plan_matches(&Scope::Entity, &existing, &wanted, |uid| {
            self.pool.is_retired(uid)
        })?;

        let mut kept: Vec<Option<Entity>> = vec![None; old.len()];
        let mut added = Vec::new();

        for step in plan {
            match step {
                Match::ExplicitPin { incoming, existing } | Match::Name { incoming, existing } => {
                    let source = &schema[incoming];
                    let mut entity = old[existing].clone();

                    if entity.name != source.name {
                        debug!(
                            from = %entity.name,
                            to = %source.name,
                            uid = entity.id.uid,
                            "renamed entity"
                        );
                        entity.name.clone_from(&source.name);
                        self.summary.entities_renamed += 1;
                    }
                    self.properties(&mut entity, source)?;
                    kept[existing] = Some(entity);
                }
                Match::New { incoming } => {
                    let source = &schema[incoming];
                    let id = self.allocator.allocate_id(
                        &mut self.pool,
                        self.model.last_entity_id,
                        format!("entity '{}'", source.name),
                    )?;
                    self.model.last_entity_id = Some(id);
                    debug!(entity = %source.name, %id, "allocated entity");

                    let mut entity = Entity::new(id, source.name.clone());
                    self.properties(&mut entity, source)?;
                    self.summary.entities_added += 1;
                    added.push(entity);
                }
                Match::Removed { existing } => self.remove_entity(&old[existing]),
            }
        }

        Ok(kept.into_iter().flatten().chain(added).collect())
    }

    fn properties(&mut self, entity: &mut Entity, source: &SchemaEntity) -> Result<(), Error> {
        let old = std::mem::take(&mut entity.properties);
        let existing: Vec<Existing<'_>> = old
            .iter()
            .map(|p| Existing {
                uid: p.id.uid,
                name: &p.name,
            })
            .collect();
        let wanted: Vec<Incoming<'_>> = source
            .properties
            .iter()
            .map(|p| Incoming {
                name: &p.name,
                uid: p.uid,
            })
            .collect();
        let scope = Scope::property(entity.name.clone());
        let plan = plan_matches(&scope, &existing, &wanted, |uid| self.pool.is_retired(uid))?;

        let mut kept: Vec<Option<Property>> = vec![None; old.len()];
        let mut added = Vec::new();

        for step in plan {
            match step {
                Match::ExplicitPin { incoming, existing } | Match::Name { incoming, existing } => {
                    let source = &source.properties[incoming];
                    let mut property = old[existing].clone();

                    if property.name != source.name {
                        debug!(
                            entity = %entity.name,
                            from = %property.name,
                            to = %source.name,
                            uid = property.id.uid,
                            "renamed property"
                        );
                        property.name.clone_from(&source.name);
                        self.summary.properties_renamed += 1;
                    }
                    self.sync_index(&entity.name, &mut property, source.index)?;
                    kept[existing] = Some(property);
                }
                Match::New { incoming } => {
                    let source = &source.properties[incoming];
                    let id = self.allocator.allocate_id(
                        &mut self.pool,
                        entity.last_property_id,
                        format!("property '{}.{}'", entity.name, source.name),
                    )?;
                    entity.last_property_id = Some(id);
                    debug!(
                        entity = %entity.name,
                        property = %source.name,
                        %id,
                        "allocated property"
                    );

                    let mut property = Property::new(id, source.name.clone());
                    self.sync_index(&entity.name, &mut property, source.index)?;
                    self.summary.properties_added += 1;
                    added.push(property);
                }
                Match::Removed { existing } => self.remove_property(&entity.name, &old[existing]),
            }
        }

        entity.properties = kept.into_iter().flatten().chain(added).collect();

        Ok(())
    }

    // bring the index identifier in line with the index flag
    fn sync_index(
        &mut self,
        entity: &str,
        property: &mut Property,
        wanted: bool,
    ) -> Result<(), Error> {
        match (wanted, property.index_id) {
            (true, None) => {
                let id = self.allocator.allocate_id(
                    &mut self.pool,
                    self.model.last_index_id,
                    format!("index of '{entity}.{}'", property.name),
                )?;
                self.model.last_index_id = Some(id);
                property.index_id = Some(id);
                self.summary.indexes_added += 1;
                debug!(entity, property = %property.name, %id, "allocated index");
            }
            (false, Some(id)) => {
                self.pool.retire(&mut self.model.retired_index_uids, id.uid);
                property.index_id = None;
                self.summary.indexes_removed += 1;
                debug!(entity, property = %property.name, %id, "removed index");
            }
            _ => {}
        }

        Ok(())
    }

    fn remove_entity(&mut self, entity: &Entity) {
        for property in &entity.properties {
            self.remove_property(&entity.name, property);
        }
        self.pool
            .retire(&mut self.model.retired_entity_uids, entity.id.uid);
        self.summary.entities_removed += 1;
        debug!(entity = %entity.name, id = %entity.id, "removed entity");
    }

    fn remove_property(&mut self, entity: &str, property: &Property) {
        if let Some(index_id) = property.index_id {
            self.pool
                .retire(&mut self.model.retired_index_uids, index_id.uid);
            self.summary.indexes_removed += 1;
        }
        self.pool
            .retire(&mut self.model.retired_property_uids, property.id.uid);
        self.summary.properties_removed += 1;
        debug!(entity, property = %property.name, id = %property.id, "removed property");
    }
}

///
/// TESTS
///

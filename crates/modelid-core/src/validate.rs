//! Structural invariants of a model.
//!
//! Runs on every loaded descriptor and again on every reconciled model
//! before it is committed. All violations are collected, not just the first.

use crate::{
    error::Error,
    id::{IdUid, Sequence, Uid},
    model::{Entity, Model, RetiredUids},
};
use modelid_schema::{err, error::ErrorTree};
use std::collections::{BTreeMap, BTreeSet};

/// Validate a model, failing with `InvariantViolation` on any problem.
pub fn validate_model(model: &Model) -> Result<(), Error> {
    check_model(model)
        .result()
        .map_err(Error::InvariantViolation)
}

/// Collect every invariant violation in `model`.
#[must_use]
pub fn check_model(model: &Model) -> ErrorTree {
    let mut errs = ErrorTree::new();

    check_uid_uniqueness(model, &mut errs);
    check_entities(model, &mut errs);
    check_indexes(model, &mut errs);

    errs
}

// Model-wide: a uid names exactly one thing, active or retired.
fn check_uid_uniqueness(model: &Model, errs: &mut ErrorTree) {
    let mut claims: Vec<(Uid, String)> = Vec::new();

    for entity in &model.entities {
        claims.push((entity.id.uid, format!("entity '{}'", entity.name)));

        for property in &entity.properties {
            let path = format!("{}.{}", entity.name, property.name);
            claims.push((property.id.uid, format!("property '{path}'")));
            if let Some(index_id) = property.index_id {
                claims.push((index_id.uid, format!("index of '{path}'")));
            }
        }
    }

    for (kind, set) in [
        ("entity", &model.retired_entity_uids),
        ("index", &model.retired_index_uids),
        ("property", &model.retired_property_uids),
    ] {
        claims.extend(set.iter().map(|uid| (uid, format!("retired {kind} uid"))));
    }

    let mut owners: BTreeMap<Uid, String> = BTreeMap::new();
    for (uid, owner) in claims {
        if uid == 0 {
            err!(errs, "{owner} has uid 0");
            continue;
        }
        if let Some(prev) = owners.get(&uid) {
            err!(errs, "uid {uid} is used by both {prev} and {owner}");
        } else {
            owners.insert(uid, owner);
        }
    }
}

fn check_entities(model: &Model, errs: &mut ErrorTree) {
    let ids: Vec<IdUid> = model.entities.iter().map(|e| e.id).collect();

    check_names(model.entities.iter().map(|e| e.name.as_str()), "entity", errs);
    check_sequences(&ids, errs);
    check_last_id(
        "lastEntityId",
        model.last_entity_id,
        &ids,
        &model.retired_entity_uids,
        errs,
    );

    for entity in &model.entities {
        let mut entity_errs = ErrorTree::new();
        check_properties(entity, &model.retired_property_uids, &mut entity_errs);

        errs.merge_for(entity.name.clone(), entity_errs);
    }
}

fn check_properties(entity: &Entity, retired: &RetiredUids, errs: &mut ErrorTree) {
    let ids: Vec<IdUid> = entity.properties.iter().map(|p| p.id).collect();

    check_names(
        entity.properties.iter().map(|p| p.name.as_str()),
        "property",
        errs,
    );
    check_sequences(&ids, errs);
    check_last_id("lastPropertyId", entity.last_property_id, &ids, retired, errs);
}

// Index sequences share one model-wide scope.
fn check_indexes(model: &Model, errs: &mut ErrorTree) {
    let ids: Vec<IdUid> = model
        .entities
        .iter()
        .flat_map(|e| e.properties.iter().filter_map(|p| p.index_id))
        .collect();

    let mut index_errs = ErrorTree::new();
    check_sequences(&ids, &mut index_errs);
    check_last_id(
        "lastIndexId",
        model.last_index_id,
        &ids,
        &model.retired_index_uids,
        &mut index_errs,
    );

    errs.merge_for("indexes", index_errs);
}

fn check_names<'a>(names: impl Iterator<Item = &'a str>, kind: &str, errs: &mut ErrorTree) {
    let mut seen = BTreeSet::new();

    for name in names {
        if name.is_empty() {
            err!(errs, "{kind} name is empty");
        } else if !seen.insert(name) {
            err!(errs, "duplicate {kind} name '{name}'");
        }
    }
}

fn check_sequences(ids: &[IdUid], errs: &mut ErrorTree) {
    let mut seen: BTreeMap<Sequence, Uid> = BTreeMap::new();

    for id in ids {
        if id.sequence == 0 {
            err!(errs, "identifier {id} has sequence 0");
            continue;
        }
        if let Some(prev) = seen.insert(id.sequence, id.uid) {
            err!(
                errs,
                "duplicate sequence {} (uids {prev} and {})",
                id.sequence,
                id.uid
            );
        }
    }
}

// The last id anchors future allocation: it must dominate every sequence in
// scope and point either at the active element with that sequence or at a
// retired uid.
fn check_last_id(
    label: &str,
    last: Option<IdUid>,
    ids: &[IdUid],
    retired: &RetiredUids,
    errs: &mut ErrorTree,
) {
    let Some(last) = last else {
        if let Some(id) = ids.first() {
            err!(errs, "{label} is missing but {id} is assigned");
        }
        return;
    };

    if last.sequence == 0 || last.uid == 0 {
        err!(errs, "{label} {last} has a zero component");
        return;
    }

    let mut matched = false;
    for id in ids {
        if id.sequence > last.sequence {
            err!(errs, "{label} {last} is lower than {id}");
        } else if id.sequence == last.sequence {
            matched = true;
            if id.uid != last.uid {
                err!(errs, "{label} {last} doesn't match {id}");
            }
        }
    }

    if !matched && !retired.contains(last.uid) {
        err!(
            errs,
            "{label} {last} doesn't match any active or retired element"
        );
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Property;

    fn task() -> Model {
        let mut entity = Entity::new(IdUid::new(1, 100), "Task");
        entity.properties = vec![
            Property::new(IdUid::new(1, 101), "Id"),
            Property::new(IdUid::new(2, 102), "Text").with_index(IdUid::new(1, 200)),
            Property::new(IdUid::new(4, 104), "DateCreated"),
        ];
        entity.last_property_id = Some(IdUid::new(4, 104));

        let mut model = Model::new(["keep"]);
        model.entities.push(entity);
        model.last_entity_id = Some(IdUid::new(1, 100));
        model.last_index_id = Some(IdUid::new(1, 200));
        model.retired_property_uids.insert(103);

        model
    }

    fn messages(model: &Model) -> Vec<String> {
        check_model(model).flatten()
    }

    #[test]
    fn accepts_consistent_model() {
        assert!(validate_model(&task()).is_ok());
    }

    #[test]
    fn accepts_removed_last_element_when_retired() {
        let mut model = task();
        let entity = &mut model.entities[0];
        entity.properties.pop();
        model.retired_property_uids.insert(104);

        assert!(validate_model(&model).is_ok(), "{:?}", messages(&model));
    }

    #[test]
    fn rejects_uid_shared_with_retired_set() {
        let mut model = task();
        model.retired_entity_uids.insert(101);

        let msgs = messages(&model);
        assert_eq!(msgs.len(), 1, "{msgs:?}");
        assert!(msgs[0].contains("uid 101 is used by both property 'Task.Id'"));
    }

    #[test]
    fn rejects_duplicate_names_and_sequences() {
        let mut model = task();
        model.entities[0].properties[2].name = "Text".to_string();
        model.entities[0].properties[2].id.sequence = 2;

        let msgs = messages(&model);
        assert!(msgs.iter().any(|m| m == "Task: duplicate property name 'Text'"), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.starts_with("Task: duplicate sequence 2")), "{msgs:?}");
    }

    #[test]
    fn rejects_last_id_below_active_sequence() {
        let mut model = task();
        model.entities[0].last_property_id = Some(IdUid::new(3, 103));

        let msgs = messages(&model);
        assert_eq!(
            msgs,
            vec!["Task: lastPropertyId 3:103 is lower than 4:104".to_string()]
        );
    }

    #[test]
    fn rejects_dangling_last_id() {
        let mut model = task();
        model.last_index_id = Some(IdUid::new(2, 999));

        let msgs = messages(&model);
        assert_eq!(
            msgs,
            ["indexes: lastIndexId 2:999 doesn't match any active or retired element"]
        );
    }

    #[test]
    fn rejects_missing_last_id() {
        let mut model = task();
        model.last_entity_id = None;

        assert!(matches!(
            validate_model(&model),
            Err(Error::InvariantViolation(tree)) if tree.len() == 1
        ));
    }

    #[test]
    fn rejects_zero_components() {
        let mut model = task();
        model.entities[0].properties[0].id = IdUid::new(0, 0);

        let msgs = messages(&model);
        assert!(msgs.iter().any(|m| m.contains("has uid 0")), "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("has sequence 0")), "{msgs:?}");
    }
}

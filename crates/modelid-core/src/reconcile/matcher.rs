//! Matching policy for one collection level.
//!
//! `plan_matches` decides, without touching the model, which incoming
//! element continues which existing element. Pins win over names, and
//! matching is strictly one-to-one.

use crate::{
    error::{ConflictKind, Error, MergeConflict, Scope},
    id::Uid,
};
use modelid_schema::node::UidAnnotation;
use std::collections::{BTreeMap, BTreeSet};

///
/// Existing
/// Active element already recorded in the descriptor.
///

#[derive(Clone, Copy, Debug)]
pub struct Existing<'a> {
    pub uid: Uid,
    pub name: &'a str,
}

///
/// Incoming
/// Element declared by the freshly extracted schema.
///

#[derive(Clone, Copy, Debug)]
pub struct Incoming<'a> {
    pub name: &'a str,
    pub uid: UidAnnotation,
}

///
/// Match
/// Positions refer to the `incoming` / `existing` slices given to `plan_matches`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Match {
    ExplicitPin { incoming: usize, existing: usize },
    Name { incoming: usize, existing: usize },
    New { incoming: usize },
    Removed { existing: usize },
}

/// Plan the matching for one collection.
///
/// The result lists one decision per incoming element in incoming order,
/// followed by `Removed` for every unmatched existing element in existing
/// order. `is_retired` tells unknown pins apart from pins to retired uids.
pub fn plan_matches(
    scope: &Scope,
    existing: &[Existing<'_>],
    incoming: &[Incoming<'_>],
    is_retired: impl Fn(Uid) -> bool,
) -> Result<Vec<Match>, Error> {
    let mut seen_names = BTreeSet::new();
    for inc in incoming {
        if !seen_names.insert(inc.name) {
            let name = inc.name.to_string();
            return Err(conflict(scope, ConflictKind::DuplicateName { name }));
        }
    }

    let pins = resolve_pins(scope, existing, incoming, is_retired)?;
    let mut by_name: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, e) in existing.iter().enumerate() {
        by_name.entry(e.name).or_default().push(i);
    }

    // decisions in incoming order
    let mut plan = Vec::with_capacity(incoming.len() + existing.len());
    let mut matched = BTreeSet::new();
    for (i, inc) in incoming.iter().enumerate() {
        // same-named elements nobody pinned
        let unclaimed: Vec<usize> = by_name
            .get(inc.name)
            .into_iter()
            .flatten()
            .copied()
            .filter(|e| !pins.claimed.contains(e))
            .collect();

        if let Some(target) = pins.targets[i] {
            if let Some(&other) = unclaimed.first() {
                return Err(conflict(
                    scope,
                    ConflictKind::PinNameConflict {
                        name: inc.name.to_string(),
                        pinned_uid: existing[target].uid,
                        pinned_name: existing[target].name.to_string(),
                        named_uid: existing[other].uid,
                    },
                ));
            }

            matched.insert(target);
            plan.push(Match::ExplicitPin {
                incoming: i,
                existing: target,
            });
            continue;
        }

        // unmatched, or its old holder was renamed away by a pin
        match match_by_name(scope, existing, inc, &unclaimed)? {
            Some(target) => {
                matched.insert(target);
                plan.push(Match::Name {
                    incoming: i,
                    existing: target,
                });
            }
            None => plan.push(Match::New { incoming: i }),
        }
    }

    plan.extend(
        (0..existing.len())
            .filter(|i| !matched.contains(i))
            .map(|existing| Match::Removed { existing }),
    );

    Ok(plan)
}

///
/// Pins
/// Pin resolution: the target of every incoming element, and the claimed set.
///

struct Pins {
    targets: Vec<Option<usize>>,
    claimed: BTreeSet<usize>,
}

fn resolve_pins(
    scope: &Scope,
    existing: &[Existing<'_>],
    incoming: &[Incoming<'_>],
    is_retired: impl Fn(Uid) -> bool,
) -> Result<Pins, Error> {
    let by_uid: BTreeMap<Uid, usize> = existing
        .iter()
        .enumerate()
        .map(|(i, e)| (e.uid, i))
        .collect();
    let mut pinned_by: BTreeMap<Uid, usize> = BTreeMap::new();
    let mut pins = Pins {
        targets: vec![None; incoming.len()],
        claimed: BTreeSet::new(),
    };

    for (i, inc) in incoming.iter().enumerate() {
        let Some(uid) = inc.uid.pinned() else {
            continue;
        };
        if let Some(&first) = pinned_by.get(&uid) {
            return Err(conflict(
                scope,
                ConflictKind::DuplicatePin {
                    uid,
                    first: incoming[first].name.to_string(),
                    second: inc.name.to_string(),
                },
            ));
        }
        let Some(&target) = by_uid.get(&uid) else {
            return Err(Error::UnknownUid {
                scope: scope.clone(),
                name: inc.name.to_string(),
                uid,
                retired: is_retired(uid),
            });
        };

        pinned_by.insert(uid, i);
        pins.targets[i] = Some(target);
        pins.claimed.insert(target);
    }

    Ok(pins)
}

// Unpinned element: at most one unclaimed existing element may share its name.
fn match_by_name(
    scope: &Scope,
    existing: &[Existing<'_>],
    inc: &Incoming<'_>,
    unclaimed: &[usize],
) -> Result<Option<usize>, Error> {
    if let [first, second, ..] = *unclaimed {
        return Err(conflict(
            scope,
            ConflictKind::DuplicateExisting {
                name: inc.name.to_string(),
                first: existing[first].uid,
                second: existing[second].uid,
            },
        ));
    }
    let target = unclaimed.first().copied();

    if inc.uid == UidAnnotation::Requested {
        return Err(Error::UidRequested {
            scope: scope.clone(),
            name: inc.name.to_string(),
            current: target.map(|e| existing[e].uid),
        });
    }

    Ok(target)
}

fn conflict(scope: &Scope, kind: ConflictKind) -> Error {
    Error::AmbiguousMerge(MergeConflict {
        scope: scope.clone(),
        kind,
    })
}

///
/// TESTS
///

//! Uid and sequence allocation.
//!
//! Random draws are explicit: the rng is a type parameter and the exclusion
//! sets are passed in, so a seeded rng makes allocation fully reproducible.

use crate::{
    error::Error,
    id::{IdUid, Sequence, Uid},
    model::{Model, RetiredUids},
};
use modelid_config::DEFAULT_MAX_UID_ATTEMPTS;
use rand::{CryptoRng, RngCore, rngs::OsRng};
use std::{collections::BTreeSet, fmt::Display};

/// Generated uids stay below 2^63 so signed 64-bit consumers see them as positive.
pub const UID_MASK: Uid = i64::MAX as Uid;

/// Draw a uid that is non-zero and in neither set.
/// Returns `None` once `max_attempts` draws all collided.
pub fn new_uid<R>(
    rng: &mut R,
    existing: &BTreeSet<Uid>,
    retired: &BTreeSet<Uid>,
    max_attempts: u32,
) -> Option<Uid>
where
    R: RngCore + CryptoRng + ?Sized,
{
    (0..max_attempts)
        .map(|_| rng.next_u64() & UID_MASK)
        .find(|uid| *uid != 0 && !existing.contains(uid) && !retired.contains(uid))
}

/// Sequence that follows `last`, or 1 for a scope that never assigned one.
pub fn next_sequence(last: Option<IdUid>, scope: impl Display) -> Result<Sequence, Error> {
    match last {
        None => Ok(1),
        Some(id) => id
            .sequence
            .checked_add(1)
            .ok_or_else(|| Error::AllocationExhausted {
                scope: format!("{scope} sequence"),
                attempts: 0,
            }),
    }
}

///
/// UidPool
///
/// Active and retired uid bookkeeping for one run. Retirement is one-way.
///

#[derive(Clone, Debug, Default)]
pub struct UidPool {
    active: BTreeSet<Uid>,
    retired: BTreeSet<Uid>,
}

impl UidPool {
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        Self {
            active: model.active_uid_set(),
            retired: model.retired_uid_set(),
        }
    }

    #[must_use]
    pub fn is_active(&self, uid: Uid) -> bool {
        self.active.contains(&uid)
    }

    #[must_use]
    pub fn is_retired(&self, uid: Uid) -> bool {
        self.retired.contains(&uid)
    }

    /// Move `uid` out of the active set and record it in `set`.
    pub fn retire(&mut self, set: &mut RetiredUids, uid: Uid) {
        self.active.remove(&uid);
        self.retired.insert(uid);
        if set.insert(uid) {
            tracing::debug!(uid, "retired uid");
        }
    }
}

///
/// UidAllocator
///

#[derive(Debug)]
pub struct UidAllocator<R = OsRng> {
    rng: R,
    max_attempts: u32,
}

impl UidAllocator<OsRng> {
    /// Allocator backed by the operating system rng.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for UidAllocator<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng> UidAllocator<R> {
    #[must_use]
    pub const fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_UID_ATTEMPTS,
        }
    }

    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Allocate a fresh uid and mark it active in `pool`.
    pub fn allocate(&mut self, pool: &mut UidPool, scope: impl Display) -> Result<Uid, Error> {
        let uid = new_uid(&mut self.rng, &pool.active, &pool.retired, self.max_attempts)
            .ok_or_else(|| Error::AllocationExhausted {
                scope: scope.to_string(),
                attempts: self.max_attempts,
            })?;
        pool.active.insert(uid);

        Ok(uid)
    }

    /// Allocate the identifier that follows `last` in its scope.
    pub fn allocate_id(
        &mut self,
        pool: &mut UidPool,
        last: Option<IdUid>,
        scope: impl Display,
    ) -> Result<IdUid, Error> {
        let sequence = next_sequence(last, &scope)?;
        let uid = self.allocate(pool, &scope)?;

        Ok(IdUid::new(sequence, uid))
    }
}

///
/// TESTS
///

use crate::id::Uid;

///
/// RetiredUids
///
/// Insertion-ordered set of uids that must never be handed out again.
/// Lists stay small, so lookups are linear.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetiredUids(Vec<Uid>);

impl RetiredUids {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn contains(&self, uid: Uid) -> bool {
        self.0.contains(&uid)
    }

    /// Add a uid; returns false if it was already retired.
    pub fn insert(&mut self, uid: Uid) -> bool {
        if self.contains(uid) {
            return false;
        }
        self.0.push(uid);

        true
    }

    pub fn iter(&self) -> impl Iterator<Item = Uid> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Uid] {
        &self.0
    }
}

// keeps duplicates so the validator can report them on load
impl FromIterator<Uid> for RetiredUids {
    fn from_iter<I: IntoIterator<Item = Uid>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_one_way_and_idempotent() {
        let mut retired = RetiredUids::new();

        assert!(retired.insert(9));
        assert!(!retired.insert(9));
        assert!(retired.insert(3));
        assert_eq!(retired.as_slice(), &[9, 3]);
    }
}

use crate::id::{IdUid, Uid};

///
/// Property
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub id: IdUid,
    pub name: String,
    pub index_id: Option<IdUid>,
}

impl Property {
    #[must_use]
    pub fn new(id: IdUid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            index_id: None,
        }
    }

    #[must_use]
    pub const fn with_index(mut self, index_id: IdUid) -> Self {
        self.index_id = Some(index_id);
        self
    }

    // property uid, then index uid if any
    pub fn uids(&self) -> impl Iterator<Item = Uid> {
        std::iter::once(self.id.uid).chain(self.index_id.map(|id| id.uid))
    }
}

use crate::{
    id::{IdUid, Uid},
    model::Property,
};

///
/// Entity
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entity {
    pub id: IdUid,
    pub name: String,

    /// Highest property identifier ever assigned in this entity.
    pub last_property_id: Option<IdUid>,

    pub properties: Vec<Property>,
}

impl Entity {
    #[must_use]
    pub fn new(id: IdUid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            last_property_id: None,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// The entity uid followed by every property and index uid it owns.
    pub fn uids(&self) -> impl Iterator<Item = Uid> + '_ {
        std::iter::once(self.id.uid).chain(self.properties.iter().flat_map(Property::uids))
    }
}

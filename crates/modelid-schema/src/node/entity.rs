use crate::prelude::*;

///
/// SchemaEntity
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SchemaEntity {
    pub name: String,

    #[serde(default, skip_serializing_if = "UidAnnotation::is_none")]
    pub uid: UidAnnotation,

    #[serde(default)]
    pub properties: Vec<SchemaProperty>,
}

impl SchemaEntity {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: UidAnnotation::None,
            properties: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_uid(mut self, uid: u64) -> Self {
        self.uid = UidAnnotation::Pinned(uid);
        self
    }

    #[must_use]
    pub const fn requesting_uid(mut self) -> Self {
        self.uid = UidAnnotation::Requested;
        self
    }

    #[must_use]
    pub fn property(mut self, property: SchemaProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Append plain (unpinned, unindexed) properties by name.
    #[must_use]
    pub fn properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties
            .extend(names.into_iter().map(SchemaProperty::new));
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

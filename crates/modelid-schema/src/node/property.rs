use crate::prelude::*;
use std::ops::Not;

///
/// SchemaProperty
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SchemaProperty {
    pub name: String,

    #[serde(default, skip_serializing_if = "UidAnnotation::is_none")]
    pub uid: UidAnnotation,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub index: bool,
}

impl SchemaProperty {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: UidAnnotation::None,
            index: false,
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
    pub const fn indexed(mut self) -> Self {
        self.index = true;
        self
    }
}

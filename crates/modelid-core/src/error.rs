use crate::id::Uid;
use modelid_config::ConfigError;
use modelid_schema::error::ErrorTree;
use std::{fmt, path::PathBuf};
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure aborts the generation run; the previously committed
/// descriptor stays the source of truth.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("uid allocation exhausted for {scope} after {attempts} attempts")]
    AllocationExhausted { scope: String, attempts: u32 },

    #[error("ambiguous merge: {0}")]
    AmbiguousMerge(MergeConflict),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid schema: {0}")]
    InvalidSchema(ErrorTree),

    #[error("invariant violation: {0}")]
    InvariantViolation(ErrorTree),

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed descriptor: {message}")]
    MalformedDescriptor { message: String },

    #[error(
        "uid annotation value must not be empty on {scope} '{name}' ({})",
        describe_current(.current)
    )]
    UidRequested {
        scope: Scope,
        name: String,
        current: Option<Uid>,
    },

    #[error("{scope} '{name}' is pinned to uid {uid}, which {}", describe_unknown(.retired))]
    UnknownUid {
        scope: Scope,
        name: String,
        uid: Uid,
        retired: bool,
    },
}

#[allow(clippy::ref_option)]
fn describe_current(current: &Option<Uid>) -> String {
    match current {
        Some(uid) => format!("current uid = {uid}"),
        None => "not found in the model, a new uid will be assigned".to_string(),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn describe_unknown(retired: &bool) -> &'static str {
    if *retired {
        "was retired and can not be reused"
    } else {
        "does not exist in the model"
    }
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AllocationExhausted { .. } => ErrorClass::Exhausted,
            Self::AmbiguousMerge(_) | Self::UidRequested { .. } | Self::UnknownUid { .. } => {
                ErrorClass::Conflict
            }
            Self::Config(_) | Self::InvalidSchema(_) => ErrorClass::InvalidInput,
            Self::InvariantViolation(_) => ErrorClass::InvariantViolation,
            Self::Io { .. } => ErrorClass::Io,
            Self::MalformedDescriptor { .. } => ErrorClass::Corruption,
        }
    }
}

///
/// ErrorClass
/// Coarse classification for callers that map errors to exit codes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Conflict,
    Corruption,
    Exhausted,
    InvalidInput,
    InvariantViolation,
    Io,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conflict => "conflict",
            Self::Corruption => "corruption",
            Self::Exhausted => "exhausted",
            Self::InvalidInput => "invalid_input",
            Self::InvariantViolation => "invariant_violation",
            Self::Io => "io",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Scope
/// Collection an element lives in.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scope {
    Entity,
    Property { entity: String },
}

impl Scope {
    #[must_use]
    pub fn property(entity: impl Into<String>) -> Self {
        Self::Property {
            entity: entity.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => f.write_str("entity"),
            Self::Property { entity } => write!(f, "property of entity '{entity}'"),
        }
    }
}

///
/// MergeConflict
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{scope}: {kind}")]
pub struct MergeConflict {
    pub scope: Scope,
    pub kind: ConflictKind,
}

///
/// ConflictKind
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConflictKind {
    #[error("'{first}' and '{second}' are both pinned to uid {uid}")]
    DuplicatePin {
        uid: Uid,
        first: String,
        second: String,
    },

    #[error("name '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("name '{name}' matches more than one existing element (uids {first} and {second})")]
    DuplicateExisting {
        name: String,
        first: Uid,
        second: Uid,
    },

    #[error(
        "'{name}' is pinned to uid {pinned_uid} ('{pinned_name}') but its name matches existing uid {named_uid}; pin or rename that element too"
    )]
    PinNameConflict {
        name: String,
        pinned_uid: Uid,
        pinned_name: String,
        named_uid: Uid,
    },
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_request_message_reports_current_uid() {
        let err = Error::UidRequested {
            scope: Scope::property("Task"),
            name: "Text".to_string(),
            current: Some(42),
        };

        assert_eq!(
            err.to_string(),
            "uid annotation value must not be empty on property of entity 'Task' 'Text' (current uid = 42)"
        );
        assert_eq!(err.class(), ErrorClass::Conflict);
    }

    #[test]
    fn merge_conflict_message_names_scope_and_uid() {
        let err = Error::AmbiguousMerge(MergeConflict {
            scope: Scope::Entity,
            kind: ConflictKind::DuplicatePin {
                uid: 7,
                first: "A".to_string(),
                second: "B".to_string(),
            },
        });

        assert_eq!(
            err.to_string(),
            "ambiguous merge: entity: 'A' and 'B' are both pinned to uid 7"
        );
    }
}

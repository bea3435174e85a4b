use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

/// Local creation-order ordinal within one collection.
pub type Sequence = u32;

/// Model-wide unique, never-reused identifier value.
pub type Uid = u64;

///
/// ParseIdUidError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ParseIdUidError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{0}' must have the form 'sequence:uid'")]
    Format(String),

    #[error("{part} '{value}' is not an unsigned decimal number")]
    NotNumeric { part: &'static str, value: String },

    #[error("{part} '{value}' is out of range")]
    OutOfRange { part: &'static str, value: String },

    #[error("{part} must not be zero")]
    Zero { part: &'static str },
}

///
/// IdUid
///
/// Identifier pair persisted as `"<sequence>:<uid>"`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct IdUid {
    pub sequence: Sequence,
    pub uid: Uid,
}

impl IdUid {
    #[must_use]
    pub const fn new(sequence: Sequence, uid: Uid) -> Self {
        Self { sequence, uid }
    }
}

impl fmt::Display for IdUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sequence, self.uid)
    }
}

impl FromStr for IdUid {
    type Err = ParseIdUidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseIdUidError::Empty);
        }

        let Some((sequence, uid)) = s.split_once(':') else {
            return Err(ParseIdUidError::Format(s.to_string()));
        };
        if uid.contains(':') {
            return Err(ParseIdUidError::Format(s.to_string()));
        }

        let sequence = parse_component::<Sequence>("sequence", sequence)?;
        let uid = parse_component::<Uid>("uid", uid)?;

        Ok(Self { sequence, uid })
    }
}

// str::parse accepts a leading '+', the descriptor format does not
fn parse_component<T>(part: &'static str, value: &str) -> Result<T, ParseIdUidError>
where
    T: FromStr + PartialEq + Default,
{
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseIdUidError::NotNumeric {
            part,
            value: value.to_string(),
        });
    }

    let parsed = value
        .parse::<T>()
        .map_err(|_| ParseIdUidError::OutOfRange {
            part,
            value: value.to_string(),
        })?;
    if parsed == T::default() {
        return Err(ParseIdUidError::Zero { part });
    }

    Ok(parsed)
}

impl Serialize for IdUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IdUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;

        s.parse().map_err(de::Error::custom)
    }
}

///
/// opt_id_uid
///
/// `Option<IdUid>` persisted as a pair-string, or `""` when never assigned.
///

pub mod opt_id_uid {
    use super::IdUid;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<IdUid>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<IdUid>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Ok(None);
        }

        s.parse().map(Some).map_err(de::Error::custom)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_pair() {
        let id: IdUid = "7:6044372234677422456".parse().expect("valid pair");

        assert_eq!(id, IdUid::new(7, 6_044_372_234_677_422_456));
        assert_eq!(id.to_string(), "7:6044372234677422456");
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert_eq!("".parse::<IdUid>(), Err(ParseIdUidError::Empty));
        assert!(matches!("12".parse::<IdUid>(), Err(ParseIdUidError::Format(_))));
        assert!(matches!("1:2:3".parse::<IdUid>(), Err(ParseIdUidError::Format(_))));
        assert!(matches!(
            " 1:2".parse::<IdUid>(),
            Err(ParseIdUidError::NotNumeric { part: "sequence", .. })
        ));
        assert!(matches!(
            "1:+2".parse::<IdUid>(),
            Err(ParseIdUidError::NotNumeric { part: "uid", .. })
        ));
        assert!(matches!(
            "1:abc".parse::<IdUid>(),
            Err(ParseIdUidError::NotNumeric { part: "uid", .. })
        ));
        assert!(matches!(
            "4294967296:1".parse::<IdUid>(),
            Err(ParseIdUidError::OutOfRange { part: "sequence", .. })
        ));
        assert_eq!("0:5".parse::<IdUid>(), Err(ParseIdUidError::Zero { part: "sequence" }));
        assert_eq!("5:0".parse::<IdUid>(), Err(ParseIdUidError::Zero { part: "uid" }));
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&IdUid::new(3, 42)).expect("serialize");
        assert_eq!(json, "\"3:42\"");

        let back: IdUid = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, IdUid::new(3, 42));
    }
}

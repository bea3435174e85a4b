//! Descriptor codec.
//!
//! The persisted descriptor is pretty-printed JSON with a fixed key order.
//! Unchanged models encode to identical bytes, which keeps the file quiet
//! under version control.

use crate::{
    error::Error,
    id::{IdUid, Uid, opt_id_uid},
    model::{Entity, Model, Property, RetiredUids},
    validate::validate_model,
};
use modelid_schema::error::ErrorTree;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

///
/// DescriptorDoc
/// Wire shape of the whole file.
///

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct DescriptorDoc {
    comment: JsonValue,
    entities: Vec<EntityDoc>,
    #[serde(with = "opt_id_uid")]
    last_entity_id: Option<IdUid>,
    #[serde(with = "opt_id_uid")]
    last_index_id: Option<IdUid>,
    #[serde(with = "uid_list")]
    retired_entity_uids: Vec<Uid>,
    #[serde(with = "uid_list")]
    retired_index_uids: Vec<Uid>,
    #[serde(with = "uid_list")]
    retired_property_uids: Vec<Uid>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct EntityDoc {
    id: IdUid,
    name: String,
    #[serde(with = "opt_id_uid")]
    last_property_id: Option<IdUid>,
    properties: Vec<PropertyDoc>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct PropertyDoc {
    id: IdUid,
    name: String,
    index_id: Option<IdUid>,
}

/// Decode a descriptor and check its structural invariants.
pub fn load(bytes: &[u8]) -> Result<Model, Error> {
    let doc: DescriptorDoc =
        serde_json::from_slice(bytes).map_err(|e| Error::malformed(e.to_string()))?;
    let model = Model::from(doc);

    validate_model(&model).map_err(|e| match e {
        Error::InvariantViolation(tree) => Error::malformed(tree.to_string()),
        other => other,
    })?;

    Ok(model)
}

/// Encode a model into its canonical byte form.
pub fn save(model: &Model) -> Result<Vec<u8>, Error> {
    serde_json::to_vec_pretty(&DescriptorDoc::from(model))
        .map_err(|e| Error::InvariantViolation(ErrorTree::from_message(e.to_string())))
}

impl From<DescriptorDoc> for Model {
    fn from(doc: DescriptorDoc) -> Self {
        Self {
            comment: doc.comment,
            entities: doc.entities.into_iter().map(Entity::from).collect(),
            last_entity_id: doc.last_entity_id,
            last_index_id: doc.last_index_id,
            retired_entity_uids: doc.retired_entity_uids.into_iter().collect(),
            retired_index_uids: doc.retired_index_uids.into_iter().collect(),
            retired_property_uids: doc.retired_property_uids.into_iter().collect(),
        }
    }
}

impl From<EntityDoc> for Entity {
    fn from(doc: EntityDoc) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            last_property_id: doc.last_property_id,
            properties: doc
                .properties
                .into_iter()
                .map(|p| Property {
                    id: p.id,
                    name: p.name,
                    index_id: p.index_id,
                })
                .collect(),
        }
    }
}

impl From<&Model> for DescriptorDoc {
    fn from(model: &Model) -> Self {
        let uids = |set: &RetiredUids| set.as_slice().to_vec();

        Self {
            comment: model.comment.clone(),
            entities: model.entities.iter().map(EntityDoc::from).collect(),
            last_entity_id: model.last_entity_id,
            last_index_id: model.last_index_id,
            retired_entity_uids: uids(&model.retired_entity_uids),
            retired_index_uids: uids(&model.retired_index_uids),
            retired_property_uids: uids(&model.retired_property_uids),
        }
    }
}

impl From<&Entity> for EntityDoc {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            last_property_id: entity.last_property_id,
            properties: entity
                .properties
                .iter()
                .map(|p| PropertyDoc {
                    id: p.id,
                    name: p.name.clone(),
                    index_id: p.index_id,
                })
                .collect(),
        }
    }
}

///
/// uid_list
///
/// Retired uids are written as decimal strings. Plain JSON numbers are
/// accepted on load for descriptors produced by older tooling.
///

mod uid_list {
    use crate::id::Uid;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum UidRepr {
        Number(u64),
        Text(String),
    }

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(uids: &Vec<Uid>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(uids.iter().map(ToString::to_string))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Uid>, D::Error> {
        Vec::<UidRepr>::deserialize(deserializer)?
            .into_iter()
            .map(|repr| match repr {
                UidRepr::Number(0) => Err(de::Error::custom("retired uid must not be zero")),
                UidRepr::Number(uid) => Ok(uid),
                UidRepr::Text(text) => parse_text(&text).map_err(de::Error::custom),
            })
            .collect()
    }

    fn parse_text(text: &str) -> Result<Uid, String> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("retired uid '{text}' is not an unsigned decimal number"));
        }

        match text.parse::<Uid>() {
            Ok(0) => Err("retired uid must not be zero".to_string()),
            Ok(uid) => Ok(uid),
            Err(_) => Err(format!("retired uid '{text}' is out of range")),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: &str = r#"{
  "Comment": [
    "KEEP THIS FILE! Check it into a version control system (VCS) like git."
  ],
  "Entities": [
    {
      "Id": "1:8717895732742165505",
      "Name": "Task",
      "LastPropertyId": "3:501233450539197794",
      "Properties": [
        {
          "Id": "1:2259404117704393152",
          "Name": "Id",
          "IndexId": null
        },
        {
          "Id": "2:6050128673802995827",
          "Name": "Text",
          "IndexId": "1:3390393562759376202"
        },
        {
          "Id": "3:501233450539197794",
          "Name": "DateCreated",
          "IndexId": null
        }
      ]
    }
  ],
  "LastEntityId": "1:8717895732742165505",
  "LastIndexId": "1:3390393562759376202",
  "RetiredEntityUids": [],
  "RetiredIndexUids": [],
  "RetiredPropertyUids": [
    "1774932891286980153"
  ]
}"#;

    #[test]
    fn round_trip_is_byte_identical() {
        let model = load(TASK.as_bytes()).expect("fixture should load");
        let bytes = save(&model).expect("save");

        assert_eq!(String::from_utf8(bytes).expect("utf8"), TASK);
    }

    #[test]
    fn decodes_identifiers_and_retired_uids() {
        let model = load(TASK.as_bytes()).expect("fixture should load");
        let task = model.entity("Task").expect("Task");

        assert_eq!(task.id, IdUid::new(1, 8_717_895_732_742_165_505));
        assert_eq!(
            task.property("Text").and_then(|p| p.index_id),
            Some(IdUid::new(1, 3_390_393_562_759_376_202))
        );
        assert_eq!(
            model.retired_property_uids.as_slice(),
            &[1_774_932_891_286_980_153]
        );
    }

    #[test]
    fn empty_model_encodes_empty_last_ids() {
        let model = Model::new(["keep"]);
        let text = String::from_utf8(save(&model).expect("save")).expect("utf8");

        assert!(text.contains("\"LastEntityId\": \"\""));
        assert!(text.contains("\"LastIndexId\": \"\""));
        assert_eq!(load(text.as_bytes()).expect("reload"), model);
    }

    #[test]
    fn accepts_numeric_retired_uids() {
        let text = TASK.replace("\"1774932891286980153\"", "1774932891286980153");
        let model = load(text.as_bytes()).expect("numeric uids should load");

        assert!(model.retired_property_uids.contains(1_774_932_891_286_980_153));
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let text = TASK.replacen("\"Comment\"", "\"Extra\": 1,\n  \"Comment\"", 1);

        assert!(matches!(
            load(text.as_bytes()),
            Err(Error::MalformedDescriptor { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_identifier() {
        let text = TASK.replace("\"2:6050128673802995827\"", "\"2:x6050128673802995827\"");

        assert!(matches!(
            load(text.as_bytes()),
            Err(Error::MalformedDescriptor { .. })
        ));
    }

    #[test]
    fn rejects_duplicate_sequence() {
        let text = TASK.replace("\"2:6050128673802995827\"", "\"1:6050128673802995827\"");

        let err = load(text.as_bytes()).expect_err("duplicate sequence must fail");
        let Error::MalformedDescriptor { message } = &err else {
            panic!("unexpected error: {err}");
        };
        assert!(message.contains("sequence 1"), "{message}");
    }

    #[test]
    fn rejects_non_object_document() {
        assert!(matches!(load(b"[]"), Err(Error::MalformedDescriptor { .. })));
        assert!(matches!(load(b""), Err(Error::MalformedDescriptor { .. })));
    }
}

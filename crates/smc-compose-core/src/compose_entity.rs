use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compose_audience::Audience;
use crate::compose_config::EntityLabels;
use crate::compose_serde::{lenient_optional_string, lenient_string};
use crate::ComposeCoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// One contact identifier an entity can be addressed by.
pub struct EntityIdentifier {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub identifier_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub identifier_value: String,
    #[serde(default)]
    pub entity_relation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
/// Candidate entity (claim or account) as returned by an entity lookup.
pub struct EntityRecord {
    #[serde(default)]
    pub business_data_type: u32,
    #[serde(default, deserialize_with = "lenient_string")]
    pub business_data_value: String,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub business_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub identifiers: Vec<EntityIdentifier>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl EntityRecord {
    pub fn identifier_named(&self, name: &str) -> Option<&EntityIdentifier> {
        self.identifiers
            .iter()
            .find(|identifier| identifier.name == name)
    }
}

/// Decodes an entity lookup's `content` array.
pub fn parse_entity_records(content: &Value) -> Result<Vec<EntityRecord>, serde_json::Error> {
    match content {
        Value::Null => Ok(Vec::new()),
        other => Vec::<EntityRecord>::deserialize(other),
    }
}

/// Finds a candidate by its business key. Linear in the candidate count.
pub fn find_entity_by_key<'a>(entities: &'a [EntityRecord], key: &str) -> Option<&'a EntityRecord> {
    entities
        .iter()
        .find(|entity| entity.business_data_value == key)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
/// The selected candidate plus its derived display attributes.
pub struct SelectedEntity {
    pub record: EntityRecord,
    #[serde(rename = "type")]
    pub kind: Audience,
    pub text: String,
    pub identifier: String,
    pub value: String,
}

impl SelectedEntity {
    pub fn from_record(
        record: EntityRecord,
        labels: &EntityLabels,
    ) -> Result<Self, ComposeCoreError> {
        let kind = Audience::from_business_data_type(record.business_data_type).ok_or(
            ComposeCoreError::UnsupportedBusinessDataType(record.business_data_type),
        )?;
        let (text, identifier) = match kind {
            Audience::Claims => (
                labels.claim.clone(),
                format!(
                    "{} {}",
                    record.first_name.as_deref().unwrap_or_default(),
                    record.last_name.as_deref().unwrap_or_default()
                )
                .trim()
                .to_string(),
            ),
            Audience::Employer => (
                labels.account.clone(),
                record.business_name.clone().unwrap_or_default(),
            ),
            Audience::None => {
                return Err(ComposeCoreError::UnsupportedBusinessDataType(
                    record.business_data_type,
                ))
            }
        };
        let value = record.business_data_value.clone();
        Ok(Self {
            record,
            kind,
            text,
            identifier,
            value,
        })
    }

    pub fn identifiers(&self) -> &[EntityIdentifier] {
        &self.record.identifiers
    }
}

//! Wire shapes of the Hazo interchange document
//!
//! Field names follow the document exactly (mixed camelCase and lowercase).
//! Every field is optional on input and `null` reads as the empty value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `null` reads as `T::default()`
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts strings, numbers and booleans for fields that are strings on the wire
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn is_empty(s: &str) -> bool {
    s.is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedPhoto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// String, or array of strings in older documents
    #[serde(default)]
    pub url: Value,
    #[serde(default)]
    pub label: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "nameEN", default, deserialize_with = "nullable")]
    pub name_en: String,
    #[serde(rename = "nameCN", default, deserialize_with = "nullable")]
    pub name_cn: String,
    #[serde(default, deserialize_with = "nullable")]
    pub photos: Vec<EncodedPhoto>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_empty")]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedBook {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedExtraField {
    #[serde(default, deserialize_with = "nullable")]
    pub std: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub label: String,
    #[serde(default, deserialize_with = "nullable")]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedDictionaryEntry {
    /// Numeric in most documents
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "nameCN", default, deserialize_with = "nullable")]
    pub name_cn: String,
    #[serde(rename = "nameEN", default, deserialize_with = "nullable")]
    pub name_en: String,
    #[serde(rename = "nameFR", default, deserialize_with = "nullable")]
    pub name_fr: String,
    #[serde(rename = "defCN", default, deserialize_with = "nullable")]
    pub def_cn: String,
    #[serde(rename = "defEN", default, deserialize_with = "nullable")]
    pub def_en: String,
    #[serde(rename = "defFR", default, deserialize_with = "nullable")]
    pub def_fr: String,
    #[serde(default, deserialize_with = "nullable")]
    pub url: String,
}

/// Fields shared by taxa and characters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(
        rename = "parentId",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "is_empty"
    )]
    pub parent_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "nameEN", default, deserialize_with = "nullable")]
    pub name_en: String,
    #[serde(rename = "nameCN", default, deserialize_with = "nullable")]
    pub name_cn: String,
    #[serde(rename = "vernacularName", default, deserialize_with = "nullable")]
    pub vernacular_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub detail: String,
    #[serde(default, deserialize_with = "nullable")]
    pub children: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub photos: Vec<EncodedPhoto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedBookInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub fasc: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page: String,
    #[serde(default, deserialize_with = "nullable")]
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedDescription {
    #[serde(rename = "descriptorId", default, deserialize_with = "lenient_string")]
    pub descriptor_id: String,
    #[serde(rename = "statesIds", default, deserialize_with = "nullable")]
    pub states_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedTaxon {
    #[serde(flatten)]
    pub item: EncodedItem,
    #[serde(default, deserialize_with = "nullable")]
    pub descriptions: Vec<EncodedDescription>,
    #[serde(default, deserialize_with = "nullable")]
    pub author: String,
    #[serde(
        rename = "vernacularName2",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "is_empty"
    )]
    pub vernacular_name2: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub name2: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub meaning: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub herbariumpicture: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub website: String,
    #[serde(
        rename = "noHerbier",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "is_empty"
    )]
    pub no_herbier: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub fasc: String,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "is_empty")]
    pub page: String,
    #[serde(
        rename = "bookInfobyids",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub book_info_by_ids: BTreeMap<String, EncodedBookInfo>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedCharacter {
    #[serde(flatten)]
    pub item: EncodedItem,
    #[serde(rename = "inherentstateid", default, deserialize_with = "lenient_string")]
    pub inherent_state_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub states: Vec<String>,
    #[serde(rename = "requiredStatesIds", default, deserialize_with = "nullable")]
    pub required_states_ids: Vec<String>,
    #[serde(rename = "inapplicablestatesids", default, deserialize_with = "nullable")]
    pub inapplicable_states_ids: Vec<String>,
}

/// Whole interchange document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedDataset {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub taxons: Vec<EncodedTaxon>,
    #[serde(default, deserialize_with = "nullable")]
    pub characters: Vec<EncodedCharacter>,
    #[serde(default, deserialize_with = "nullable")]
    pub states: Vec<EncodedState>,
    #[serde(default, deserialize_with = "nullable")]
    pub books: Vec<EncodedBook>,
    #[serde(rename = "extraFields", default, deserialize_with = "nullable")]
    pub extra_fields: Vec<EncodedExtraField>,
    #[serde(rename = "dictionaryEntries", default, deserialize_with = "nullable")]
    pub dictionary_entries: BTreeMap<String, EncodedDictionaryEntry>,
}

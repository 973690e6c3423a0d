//! Hazo document -> Dataset
//!
//! Only malformed JSON is an error. Everything past parsing is best effort:
//! references to unknown states are dropped, nodes with an unusable parent
//! are attached to the synthetic root.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use tracing::debug;

use super::format::{
    EncodedCharacter, EncodedDataset, EncodedDictionaryEntry, EncodedItem, EncodedPhoto,
    EncodedState, EncodedTaxon,
};
use super::LEGACY_TAXON_FIELDS;
use crate::domain::{
    Book, BookReference, Character, Dataset, DictionaryEntry, ExtraField, ExtraValue, Hierarchy,
    MultilangText, Picture, State, Taxon, LANG_CHINESE, LANG_ENGLISH, LANG_FRENCH,
    LANG_VERNACULAR,
};
use crate::error::{DatasetError, Result};

/// Read and decode a whole document
pub fn read_hazo<R: Read>(mut reader: R) -> Result<Dataset> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    decode_str(&text)
}

pub fn decode_str(text: &str) -> Result<Dataset> {
    let document: EncodedDataset = serde_json::from_str(text).map_err(|e| {
        DatasetError::decode(format!("Invalid Hazo document: {}", e)).with_source(e)
    })?;
    Ok(decode_document(&document))
}

/// Map an already parsed document to a dataset; never fails.
pub fn decode_document(document: &EncodedDataset) -> Dataset {
    let mut dataset = Dataset::new(document.id.clone());

    for state in &document.states {
        dataset.states.insert(state.id.clone(), decode_state(state));
    }
    for character in &document.characters {
        let decoded = decode_character(character, &dataset);
        dataset.characters.insert(decoded.hierarchy.id.clone(), decoded);
    }
    for taxon in &document.taxons {
        let decoded = decode_taxon(taxon, &dataset);
        dataset.taxa.insert(decoded.hierarchy.id.clone(), decoded);
    }

    let character_items: Vec<&EncodedItem> = document.characters.iter().map(|c| &c.item).collect();
    let mut character_children = wire_tree(&character_items);
    dataset.characters_root.children = character_children.remove("").unwrap_or_default();
    for (parent, children) in character_children {
        if let Some(character) = dataset.characters.get_mut(&parent) {
            character.hierarchy.children = children;
        }
    }

    let taxon_items: Vec<&EncodedItem> = document.taxons.iter().map(|t| &t.item).collect();
    let mut taxon_children = wire_tree(&taxon_items);
    dataset.taxa_root.children = taxon_children.remove("").unwrap_or_default();
    for (parent, children) in taxon_children {
        if let Some(taxon) = dataset.taxa.get_mut(&parent) {
            taxon.hierarchy.children = children;
        }
    }

    dataset.books = document
        .books
        .iter()
        .map(|b| Book {
            id: b.id.clone(),
            title: b.label.clone(),
        })
        .collect();
    dataset.extra_fields = document
        .extra_fields
        .iter()
        .map(|f| ExtraField {
            is_standard: f.std,
            id: f.id.clone(),
            label: f.label.clone(),
            icon: f.icon.clone(),
        })
        .collect();
    dataset.dictionary_entries = document
        .dictionary_entries
        .iter()
        .map(|(key, entry)| decode_dictionary_entry(key, entry))
        .collect();

    debug!(
        taxa = dataset.taxa.len(),
        characters = dataset.characters.len(),
        states = dataset.states.len(),
        "Decoded Hazo document"
    );
    dataset
}

/// First string of a string-or-array field
fn string_or_first(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

fn decode_pictures(photos: &[EncodedPhoto]) -> Vec<Picture> {
    photos
        .iter()
        .map(|photo| Picture {
            id: photo.id.clone(),
            source: string_or_first(&photo.url),
            legend: string_or_first(&photo.label),
        })
        .collect()
}

fn override_if_present(name: &mut MultilangText, lang: &str, text: &str) {
    if !text.is_empty() {
        name.set_override(lang, text);
    }
}

fn decode_hierarchy(item: &EncodedItem) -> Hierarchy {
    let mut name = MultilangText::new(item.name.clone());
    override_if_present(&mut name, LANG_ENGLISH, &item.name_en);
    override_if_present(&mut name, LANG_CHINESE, &item.name_cn);
    override_if_present(&mut name, LANG_VERNACULAR, &item.vernacular_name);
    Hierarchy {
        id: item.id.clone(),
        name,
        description: item.detail.clone(),
        pictures: decode_pictures(&item.photos),
        children: Vec::new(),
    }
}

fn decode_state(state: &EncodedState) -> State {
    let mut name = MultilangText::new(state.name.clone());
    override_if_present(&mut name, LANG_CHINESE, &state.name_cn);
    override_if_present(&mut name, LANG_ENGLISH, &state.name_en);
    override_if_present(&mut name, LANG_FRENCH, &state.name);
    State {
        id: state.id.clone(),
        name,
        description: state.description.clone(),
        pictures: decode_pictures(&state.photos),
        color: state.color.clone(),
    }
}

fn known_states(ids: &[String], dataset: &Dataset) -> Vec<String> {
    ids.iter()
        .filter(|id| dataset.states.contains_key(id.as_str()))
        .cloned()
        .collect()
}

fn decode_character(character: &EncodedCharacter, dataset: &Dataset) -> Character {
    let inherent = &character.inherent_state_id;
    Character {
        hierarchy: decode_hierarchy(&character.item),
        inherent_state: dataset
            .states
            .contains_key(inherent)
            .then(|| inherent.clone()),
        states: known_states(&character.states, dataset),
        inapplicable_states: known_states(&character.inapplicable_states_ids, dataset),
        required_states: known_states(&character.required_states_ids, dataset),
    }
}

fn extra_value(value: &Value) -> Option<ExtraValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(ExtraValue::Text(s.clone())),
        Value::Number(n) => n.as_f64().map(ExtraValue::Number),
        Value::Bool(b) => Some(ExtraValue::Boolean(*b)),
        other => Some(ExtraValue::Text(other.to_string())),
    }
}

fn decode_taxon(taxon: &EncodedTaxon, dataset: &Dataset) -> Taxon {
    let states = taxon
        .descriptions
        .iter()
        .flat_map(|d| known_states(&d.states_ids, dataset))
        .collect();

    let references = taxon
        .book_info_by_ids
        .iter()
        .map(|(book_id, info)| BookReference {
            book_id: book_id.clone(),
            page: info.page.trim().parse().unwrap_or(0),
            fasc: info.fasc.clone(),
            detail: info.detail.clone(),
        })
        .collect();

    let mut extra: BTreeMap<String, ExtraValue> = taxon
        .extra
        .iter()
        .filter_map(|(k, v)| extra_value(v).map(|v| (k.clone(), v)))
        .collect();
    for (key, value) in LEGACY_TAXON_FIELDS.iter().zip(legacy_values(taxon)) {
        if !value.is_empty() {
            extra.insert((*key).to_string(), ExtraValue::Text(value.to_string()));
        }
    }

    Taxon {
        hierarchy: decode_hierarchy(&taxon.item),
        author: taxon.author.clone(),
        states,
        references,
        extra,
    }
}

/// Flat legacy values, in `LEGACY_TAXON_FIELDS` order
fn legacy_values(taxon: &EncodedTaxon) -> [&str; 8] {
    [
        &taxon.vernacular_name2,
        &taxon.name2,
        &taxon.meaning,
        &taxon.herbariumpicture,
        &taxon.website,
        &taxon.no_herbier,
        &taxon.fasc,
        &taxon.page,
    ]
}

fn decode_dictionary_entry(key: &str, entry: &EncodedDictionaryEntry) -> DictionaryEntry {
    let id = match &entry.id {
        Value::Null => key.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut name = MultilangText::new(entry.name_fr.clone());
    override_if_present(&mut name, LANG_CHINESE, &entry.name_cn);
    override_if_present(&mut name, LANG_ENGLISH, &entry.name_en);
    let mut definition = MultilangText::new(entry.def_fr.clone());
    override_if_present(&mut definition, LANG_CHINESE, &entry.def_cn);
    override_if_present(&mut definition, LANG_ENGLISH, &entry.def_en);
    DictionaryEntry {
        id,
        url: entry.url.clone(),
        name,
        definition,
    }
}

/// Resolve parent links of one tree.
///
/// Returns ordered children per parent id, the synthetic root under `""`.
/// Parent choice: a declared `parentId` naming another record of the tree,
/// else the first record whose `children` list names the node, else the
/// root. A link that closes a cycle is replaced by a root link. Each child
/// list starts with the parent's own `children` order, then document order.
fn wire_tree(items: &[&EncodedItem]) -> BTreeMap<String, Vec<String>> {
    // Later duplicates carry the data, the first occurrence keeps the position.
    let mut last_record: BTreeMap<&str, &EncodedItem> = BTreeMap::new();
    let mut order: Vec<&str> = Vec::new();
    for item in items {
        if last_record.insert(item.id.as_str(), item).is_none() {
            order.push(item.id.as_str());
        }
    }

    let mut claimed_by: BTreeMap<&str, &str> = BTreeMap::new();
    for &parent in &order {
        for child in &last_record[parent].children {
            let child = child.as_str();
            if child != parent && last_record.contains_key(child) {
                claimed_by.entry(child).or_insert(parent);
            }
        }
    }

    let mut parent_of: BTreeMap<&str, &str> = BTreeMap::new();
    for &id in &order {
        let declared = last_record[id].parent_id.as_str();
        let parent = if !declared.is_empty() && declared != id && last_record.contains_key(declared) {
            declared
        } else {
            claimed_by.get(id).copied().unwrap_or("")
        };
        parent_of.insert(id, parent);
    }

    for &id in &order {
        let mut seen = HashSet::new();
        let mut current = parent_of[id];
        while !current.is_empty() && seen.insert(current) {
            if current == id {
                debug!(id, "Cycle in hierarchy, attaching to root");
                parent_of.insert(id, "");
                break;
            }
            current = parent_of[current];
        }
    }

    let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut placed: BTreeSet<&str> = BTreeSet::new();
    for &parent in &order {
        for child in &last_record[parent].children {
            let child = child.as_str();
            if parent_of.get(child) == Some(&parent) && placed.insert(child) {
                children.entry(parent.to_string()).or_default().push(child.to_string());
            }
        }
    }
    for &id in &order {
        if placed.insert(id) {
            children
                .entry(parent_of[id].to_string())
                .or_default()
                .push(id.to_string());
        }
    }
    children
}

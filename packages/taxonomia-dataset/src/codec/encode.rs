//! Dataset -> Hazo document

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use super::format::{
    EncodedBook, EncodedBookInfo, EncodedCharacter, EncodedDataset, EncodedDescription,
    EncodedDictionaryEntry, EncodedExtraField, EncodedItem, EncodedPhoto, EncodedState,
    EncodedTaxon,
};
use super::LEGACY_TAXON_FIELDS;
use crate::domain::{
    Dataset, DictionaryEntry, ExtraValue, HasHierarchy, Hierarchy, MultilangText, Picture, State,
    Taxon, LANG_CHINESE, LANG_ENGLISH, LANG_VERNACULAR,
};
use crate::error::Result;

pub fn write_hazo<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    serde_json::to_writer(writer, &encode_dataset(dataset))?;
    Ok(())
}

pub fn write_hazo_pretty<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    serde_json::to_writer_pretty(writer, &encode_dataset(dataset))?;
    Ok(())
}

/// Build the document for `dataset`.
///
/// Records come out in pre-order of their tree, then any record the tree
/// walk does not reach, by id. States are listed once, grouped by owning
/// character, followed by states no character owns.
pub fn encode_dataset(dataset: &Dataset) -> EncodedDataset {
    let characters = pre_order(&dataset.characters_root, &dataset.characters);
    let taxa = pre_order(&dataset.taxa_root, &dataset.taxa);

    let mut states = Vec::new();
    let mut owner_of: BTreeMap<&str, &str> = BTreeMap::new();
    for (character, _) in &characters {
        for state_id in &character.states {
            if owner_of.contains_key(state_id.as_str()) {
                continue;
            }
            if let Some(state) = dataset.states.get(state_id) {
                owner_of.insert(state_id, character.id());
                states.push(encode_state(state));
            }
        }
    }
    for (id, state) in &dataset.states {
        if !owner_of.contains_key(id.as_str()) {
            states.push(encode_state(state));
        }
    }

    EncodedDataset {
        id: dataset.id.clone(),
        taxons: taxa
            .iter()
            .map(|(taxon, parent)| encode_taxon(taxon, parent, &owner_of))
            .collect(),
        characters: characters
            .iter()
            .map(|(character, parent)| EncodedCharacter {
                item: encode_item(&character.hierarchy, parent),
                inherent_state_id: character.inherent_state.clone().unwrap_or_default(),
                states: character.states.clone(),
                required_states_ids: character.required_states.clone(),
                inapplicable_states_ids: character.inapplicable_states.clone(),
            })
            .collect(),
        states,
        books: dataset
            .books
            .iter()
            .map(|b| EncodedBook {
                id: b.id.clone(),
                label: b.title.clone(),
            })
            .collect(),
        extra_fields: dataset
            .extra_fields
            .iter()
            .map(|f| EncodedExtraField {
                std: f.is_standard,
                id: f.id.clone(),
                label: f.label.clone(),
                icon: f.icon.clone(),
            })
            .collect(),
        dictionary_entries: dataset
            .dictionary_entries
            .iter()
            .map(|entry| (entry.id.clone(), encode_dictionary_entry(entry)))
            .collect(),
    }
}

/// Records of one tree paired with their parent id (`""` under the root)
fn pre_order<'a, T: HasHierarchy>(
    root: &'a Hierarchy,
    records: &'a BTreeMap<String, T>,
) -> Vec<(&'a T, &'a str)> {
    fn visit<'a, T: HasHierarchy>(
        parent: &'a Hierarchy,
        parent_id: &'a str,
        records: &'a BTreeMap<String, T>,
        visited: &mut HashSet<&'a str>,
        out: &mut Vec<(&'a T, &'a str)>,
    ) {
        for child_id in &parent.children {
            let Some(record) = records.get(child_id) else {
                continue;
            };
            if !visited.insert(child_id.as_str()) {
                continue;
            }
            out.push((record, parent_id));
            visit(record.hierarchy(), record.id(), records, visited, out);
        }
    }

    let mut visited = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    visit(root, "", records, &mut visited, &mut out);
    for (id, record) in records {
        if !visited.contains(id.as_str()) {
            out.push((record, ""));
        }
    }
    out
}

fn encode_pictures(pictures: &[Picture]) -> Vec<EncodedPhoto> {
    pictures
        .iter()
        .map(|p| EncodedPhoto {
            id: p.id.clone(),
            url: Value::String(p.source.clone()),
            label: Value::String(p.legend.clone()),
        })
        .collect()
}

fn override_or_empty(name: &MultilangText, lang: &str) -> String {
    name.override_text(lang).unwrap_or_default().to_string()
}

fn encode_item(hierarchy: &Hierarchy, parent_id: &str) -> EncodedItem {
    EncodedItem {
        id: hierarchy.id.clone(),
        parent_id: parent_id.to_string(),
        name: hierarchy.name.scientific.clone(),
        name_en: override_or_empty(&hierarchy.name, LANG_ENGLISH),
        name_cn: override_or_empty(&hierarchy.name, LANG_CHINESE),
        vernacular_name: override_or_empty(&hierarchy.name, LANG_VERNACULAR),
        detail: hierarchy.description.clone(),
        children: hierarchy.children.clone(),
        photos: encode_pictures(&hierarchy.pictures),
    }
}

fn encode_state(state: &State) -> EncodedState {
    EncodedState {
        id: state.id.clone(),
        name: state.name.scientific.clone(),
        name_en: override_or_empty(&state.name, LANG_ENGLISH),
        name_cn: override_or_empty(&state.name, LANG_CHINESE),
        photos: encode_pictures(&state.pictures),
        description: state.description.clone(),
        color: state.color.clone(),
    }
}

fn json_value(value: &ExtraValue) -> Value {
    match value {
        ExtraValue::Text(s) => Value::String(s.clone()),
        ExtraValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        ExtraValue::Boolean(b) => Value::Bool(*b),
    }
}

fn legacy_slot<'a>(taxon: &'a mut EncodedTaxon, key: &str) -> Option<&'a mut String> {
    match key {
        "vernacularName2" => Some(&mut taxon.vernacular_name2),
        "name2" => Some(&mut taxon.name2),
        "meaning" => Some(&mut taxon.meaning),
        "herbariumpicture" => Some(&mut taxon.herbariumpicture),
        "website" => Some(&mut taxon.website),
        "noHerbier" => Some(&mut taxon.no_herbier),
        "fasc" => Some(&mut taxon.fasc),
        "page" => Some(&mut taxon.page),
        _ => None,
    }
}

fn encode_taxon(taxon: &Taxon, parent_id: &str, owner_of: &BTreeMap<&str, &str>) -> EncodedTaxon {
    let mut descriptions: Vec<EncodedDescription> = Vec::new();
    for state_id in &taxon.states {
        let descriptor = owner_of.get(state_id.as_str()).copied().unwrap_or_default();
        match descriptions.iter_mut().find(|d| d.descriptor_id == descriptor) {
            Some(group) => group.states_ids.push(state_id.clone()),
            None => descriptions.push(EncodedDescription {
                descriptor_id: descriptor.to_string(),
                states_ids: vec![state_id.clone()],
            }),
        }
    }

    let book_info_by_ids = taxon
        .references
        .iter()
        .map(|r| {
            let page = if r.page == 0 {
                String::new()
            } else {
                r.page.to_string()
            };
            let info = EncodedBookInfo {
                fasc: r.fasc.clone(),
                page,
                detail: r.detail.clone(),
            };
            (r.book_id.clone(), info)
        })
        .collect();

    let mut encoded = EncodedTaxon {
        item: encode_item(&taxon.hierarchy, parent_id),
        descriptions,
        author: taxon.author.clone(),
        book_info_by_ids,
        ..Default::default()
    };
    for (key, value) in &taxon.extra {
        if LEGACY_TAXON_FIELDS.contains(&key.as_str()) {
            if let Some(slot) = legacy_slot(&mut encoded, key) {
                *slot = value.to_text();
            }
        } else {
            encoded.extra.insert(key.clone(), json_value(value));
        }
    }
    encoded
}

fn encode_dictionary_entry(entry: &DictionaryEntry) -> EncodedDictionaryEntry {
    let id = entry
        .id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(entry.id.clone()));
    EncodedDictionaryEntry {
        id,
        name_cn: override_or_empty(&entry.name, LANG_CHINESE),
        name_en: override_or_empty(&entry.name, LANG_ENGLISH),
        name_fr: entry.name.scientific.clone(),
        def_cn: override_or_empty(&entry.definition, LANG_CHINESE),
        def_en: override_or_empty(&entry.definition, LANG_ENGLISH),
        def_fr: entry.definition.scientific.clone(),
        url: entry.url.clone(),
    }
}

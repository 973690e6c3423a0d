//! Dataset Domain Models
//!
//! - `MultilangText`: scientific name with per-language overrides
//! - `Hierarchy`: node shape shared by the taxon tree and the character tree
//! - `Taxon` / `Character`: a `Hierarchy` plus kind-specific fields (composition)
//! - `State`: selectable value of one character, stored in the dataset arena
//!
//! Cross references (assigned states, required states, children) are ids into
//! the id-keyed maps of [`Dataset`](super::Dataset), never direct links.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item id, unique across taxa, characters and states of one dataset
pub type ItemId = String;

/// State id (same namespace as [`ItemId`])
pub type StateId = String;

pub const LANG_SCIENTIFIC: &str = "NS";
pub const LANG_VERNACULAR: &str = "NV";
pub const LANG_CHINESE: &str = "CN";
pub const LANG_ENGLISH: &str = "EN";
pub const LANG_FRENCH: &str = "FR";

/// Language reference entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lang {
    pub code: String,
    pub label: String,
}

impl Lang {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Languages seeded into every new store
pub fn standard_languages() -> Vec<Lang> {
    vec![
        Lang::new(LANG_SCIENTIFIC, "Scientific"),
        Lang::new(LANG_VERNACULAR, "Vernacular"),
        Lang::new(LANG_CHINESE, "Chinese"),
        Lang::new(LANG_ENGLISH, "English"),
        Lang::new(LANG_FRENCH, "French"),
    ]
}

/// Multilingual name
///
/// `text(lang)` never fails: a missing override degrades to the scientific
/// name. An absent override map and an empty one are the same value, so the
/// derived equality already treats them as equal.
///
/// # Examples
///
/// ```rust
/// use taxonomia_dataset::domain::MultilangText;
///
/// let name = MultilangText::new("Oryza sativa").with_override("CN", "稻");
/// assert_eq!(name.text("CN"), "稻");
/// assert_eq!(name.text("EN"), "Oryza sativa");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilangText {
    pub scientific: String,
    #[serde(default)]
    pub names_by_lang: BTreeMap<String, String>,
}

impl MultilangText {
    pub fn new(scientific: impl Into<String>) -> Self {
        Self {
            scientific: scientific.into(),
            names_by_lang: BTreeMap::new(),
        }
    }

    /// Builder-style override
    pub fn with_override(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_override(lang, text);
        self
    }

    pub fn set_override(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.names_by_lang.insert(lang.into(), text.into());
    }

    /// Override for `lang`, without falling back
    pub fn override_text(&self, lang: &str) -> Option<&str> {
        self.names_by_lang.get(lang).map(String::as_str)
    }

    /// Text in `lang`, or the scientific name
    pub fn text(&self, lang: &str) -> &str {
        self.override_text(lang).unwrap_or(&self.scientific)
    }
}

/// Picture attached to an item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub id: String,
    /// Source URL
    pub source: String,
    pub legend: String,
}

impl Picture {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        legend: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            legend: legend.into(),
        }
    }
}

/// Tree node shared by taxa and characters
///
/// `children` holds the ordered ids of child nodes; the nodes themselves live
/// in the dataset's id-keyed maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub id: ItemId,
    pub name: MultilangText,
    pub description: String,
    pub pictures: Vec<Picture>,
    pub children: Vec<ItemId>,
}

impl Hierarchy {
    pub fn new(id: impl Into<String>, name: MultilangText) -> Self {
        Self {
            id: id.into(),
            name,
            ..Default::default()
        }
    }
}

/// Access to the `Hierarchy` embedded in a tree record
pub trait HasHierarchy {
    fn hierarchy(&self) -> &Hierarchy;
    fn hierarchy_mut(&mut self) -> &mut Hierarchy;

    fn id(&self) -> &str {
        &self.hierarchy().id
    }
}

/// Selectable value of exactly one character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: MultilangText,
    pub description: String,
    pub pictures: Vec<Picture>,
    /// Display color, free text as found in the source document
    pub color: String,
}

impl State {
    pub fn new(id: impl Into<String>, name: MultilangText) -> Self {
        Self {
            id: id.into(),
            name,
            ..Default::default()
        }
    }
}

/// Diagnostic character
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub hierarchy: Hierarchy,
    pub inherent_state: Option<StateId>,
    /// Owned states, in display order
    pub states: Vec<StateId>,
    /// States making this character inapplicable (references)
    pub inapplicable_states: Vec<StateId>,
    /// Precondition states (references, possibly owned by other characters)
    pub required_states: Vec<StateId>,
}

impl Character {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            ..Default::default()
        }
    }
}

impl HasHierarchy for Character {
    fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }
}

/// Reference to a page of a book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReference {
    pub book_id: String,
    pub page: u32,
    pub fasc: String,
    pub detail: String,
}

/// Typed value of the taxon extension map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ExtraValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl ExtraValue {
    /// Text rendering used when a value is written back as a flat string field
    pub fn to_text(&self) -> String {
        match self {
            ExtraValue::Text(text) => text.clone(),
            ExtraValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                format!("{}", *n as i64)
            }
            ExtraValue::Number(n) => n.to_string(),
            ExtraValue::Boolean(b) => b.to_string(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            ExtraValue::Text(text) => text.is_empty(),
            ExtraValue::Number(n) => *n == 0.0,
            ExtraValue::Boolean(_) => false,
        }
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Text(value)
    }
}

impl From<f64> for ExtraValue {
    fn from(value: f64) -> Self {
        ExtraValue::Number(value)
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Boolean(value)
    }
}

/// Taxon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    pub hierarchy: Hierarchy,
    pub author: String,
    /// Assigned states (references into states owned by characters)
    pub states: Vec<StateId>,
    pub references: Vec<BookReference>,
    /// Extension map for legacy fields
    pub extra: BTreeMap<String, ExtraValue>,
}

impl Taxon {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            ..Default::default()
        }
    }
}

impl HasHierarchy for Taxon {
    fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }
}

/// Glossary entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub id: String,
    pub url: String,
    pub name: MultilangText,
    pub definition: MultilangText,
}

/// Definition of an additional taxon field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    pub is_standard: bool,
    pub id: String,
    pub label: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
}

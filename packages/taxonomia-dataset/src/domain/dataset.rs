//! Dataset aggregate root
//!
//! Owns the two synthetic roots, the id-keyed taxon and character maps and
//! the state arena. Builder operations mirror the incremental editing flow:
//! locate a parent through child-index breadcrumbs, then append below it.

use std::collections::BTreeMap;

use super::models::{
    Book, BookReference, Character, DictionaryEntry, ExtraField, ExtraValue, HasHierarchy,
    Hierarchy, ItemId, MultilangText, Picture, State, StateId, Taxon,
};

pub const TAXA_ROOT_ID: &str = "t0";
pub const CHARACTERS_ROOT_ID: &str = "c0";

/// Which of the two trees an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tree {
    Taxa,
    Characters,
}

impl Tree {
    pub fn root_id(self) -> &'static str {
        match self {
            Tree::Taxa => TAXA_ROOT_ID,
            Tree::Characters => CHARACTERS_ROOT_ID,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Tree::Taxa => "t",
            Tree::Characters => "c",
        }
    }
}

/// Fields for [`Dataset::create_taxon`]
#[derive(Debug, Clone, Default)]
pub struct TaxonInit {
    /// Explicit id; generated when `None` or empty
    pub id: Option<ItemId>,
    pub name: MultilangText,
    pub description: String,
    pub author: String,
    pub states: Vec<StateId>,
    pub references: Vec<BookReference>,
    pub extra: BTreeMap<String, ExtraValue>,
}

/// Fields for [`Dataset::create_character`]
#[derive(Debug, Clone, Default)]
pub struct CharacterInit {
    pub id: Option<ItemId>,
    pub name: MultilangText,
    pub description: String,
}

/// Fields for [`Dataset::add_state`]
#[derive(Debug, Clone, Default)]
pub struct StateInit {
    pub id: Option<StateId>,
    pub name: MultilangText,
    pub description: String,
    pub pictures: Vec<Picture>,
    pub color: String,
}

/// Identification dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub id: String,
    pub taxa_root: Hierarchy,
    pub characters_root: Hierarchy,
    pub taxa: BTreeMap<ItemId, Taxon>,
    pub characters: BTreeMap<ItemId, Character>,
    /// State arena, shared by both trees
    pub states: BTreeMap<StateId, State>,
    pub dictionary_entries: Vec<DictionaryEntry>,
    pub extra_fields: Vec<ExtraField>,
    pub books: Vec<Book>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new("")
    }
}

impl Dataset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            taxa_root: Hierarchy::new(TAXA_ROOT_ID, MultilangText::new("Taxons")),
            characters_root: Hierarchy::new(CHARACTERS_ROOT_ID, MultilangText::new("Characters")),
            taxa: BTreeMap::new(),
            characters: BTreeMap::new(),
            states: BTreeMap::new(),
            dictionary_entries: Vec::new(),
            extra_fields: Vec::new(),
            books: Vec::new(),
        }
    }

    pub fn root(&self, tree: Tree) -> &Hierarchy {
        match tree {
            Tree::Taxa => &self.taxa_root,
            Tree::Characters => &self.characters_root,
        }
    }

    /// Node of `tree` by id, the synthetic root included
    pub fn hierarchy(&self, tree: Tree, id: &str) -> Option<&Hierarchy> {
        if id == tree.root_id() {
            return Some(self.root(tree));
        }
        match tree {
            Tree::Taxa => self.taxa.get(id).map(HasHierarchy::hierarchy),
            Tree::Characters => self.characters.get(id).map(HasHierarchy::hierarchy),
        }
    }

    fn hierarchy_mut(&mut self, tree: Tree, id: &str) -> Option<&mut Hierarchy> {
        match tree {
            Tree::Taxa if id == TAXA_ROOT_ID => Some(&mut self.taxa_root),
            Tree::Characters if id == CHARACTERS_ROOT_ID => Some(&mut self.characters_root),
            Tree::Taxa => self.taxa.get_mut(id).map(HasHierarchy::hierarchy_mut),
            Tree::Characters => self.characters.get_mut(id).map(HasHierarchy::hierarchy_mut),
        }
    }

    /// Follow child-index breadcrumbs from the root of `tree`.
    ///
    /// # Panics
    ///
    /// Panics when an index is out of range or a child id has no record;
    /// breadcrumbs are expected to come from a previous navigation.
    pub fn get_in(&self, tree: Tree, path: &[usize]) -> &Hierarchy {
        let mut it = self.root(tree);
        for &index in path {
            let child_id = &it.children[index];
            it = self
                .hierarchy(tree, child_id)
                .unwrap_or_else(|| panic!("no record for child '{}' in path {:?}", child_id, path));
        }
        it
    }

    pub fn taxon(&self, id: &str) -> Option<&Taxon> {
        self.taxa.get(id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    /// Character owning `state_id`
    pub fn owner_of(&self, state_id: &str) -> Option<&Character> {
        self.characters
            .values()
            .find(|ch| ch.states.iter().any(|id| id == state_id))
    }

    /// Whether `id` is used anywhere in the shared id namespace
    pub fn contains_id(&self, id: &str) -> bool {
        id == TAXA_ROOT_ID
            || id == CHARACTERS_ROOT_ID
            || self.taxa.contains_key(id)
            || self.characters.contains_key(id)
            || self.states.contains_key(id)
    }

    /// `<prefix><size + 1>`, counting up past ids already in use
    fn generate_id(&self, prefix: &str, size: usize) -> ItemId {
        let mut index = size + 1;
        loop {
            let candidate = format!("{}{}", prefix, index);
            if !self.contains_id(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }

    fn resolve_id(&self, requested: Option<ItemId>, prefix: &str, size: usize) -> ItemId {
        match requested {
            Some(id) if !id.is_empty() => id,
            _ => self.generate_id(prefix, size),
        }
    }

    /// Append `child_id` below `parent_id`, or below the root when the parent
    /// is absent or unknown.
    fn attach(&mut self, tree: Tree, child_id: ItemId, parent_id: Option<&str>) {
        let parent = parent_id
            .filter(|id| self.hierarchy(tree, id).is_some())
            .unwrap_or(tree.root_id())
            .to_string();
        if let Some(node) = self.hierarchy_mut(tree, &parent) {
            node.children.push(child_id);
        }
    }

    pub fn add_taxon_below(&mut self, taxon: Taxon, parent_id: Option<&str>) {
        let id = taxon.hierarchy.id.clone();
        self.taxa.insert(id.clone(), taxon);
        self.attach(Tree::Taxa, id, parent_id);
    }

    pub fn add_character_below(&mut self, character: Character, parent_id: Option<&str>) {
        let id = character.hierarchy.id.clone();
        self.characters.insert(id.clone(), character);
        self.attach(Tree::Characters, id, parent_id);
    }

    /// Create a taxon below the node at `path`; returns the new node's path.
    pub fn create_taxon(&mut self, path: &[usize], init: TaxonInit) -> Vec<usize> {
        let id = self.resolve_id(init.id, Tree::Taxa.id_prefix(), self.taxa.len());
        let parent_id = self.get_in(Tree::Taxa, path).id.clone();
        let mut hierarchy = Hierarchy::new(id, init.name);
        hierarchy.description = init.description;
        let taxon = Taxon {
            hierarchy,
            author: init.author,
            states: init.states,
            references: init.references,
            extra: init.extra,
        };
        self.add_taxon_below(taxon, Some(&parent_id));
        child_path(path, self.get_in(Tree::Taxa, path).children.len())
    }

    /// Create a character below the node at `path`; returns the new node's path.
    pub fn create_character(&mut self, path: &[usize], init: CharacterInit) -> Vec<usize> {
        let id = self.resolve_id(init.id, Tree::Characters.id_prefix(), self.characters.len());
        let parent_id = self.get_in(Tree::Characters, path).id.clone();
        let mut hierarchy = Hierarchy::new(id, init.name);
        hierarchy.description = init.description;
        self.add_character_below(Character::new(hierarchy), Some(&parent_id));
        child_path(path, self.get_in(Tree::Characters, path).children.len())
    }

    /// Add a state owned by `character_id`; `None` when the character is unknown.
    pub fn add_state(&mut self, character_id: &str, init: StateInit) -> Option<StateId> {
        if !self.characters.contains_key(character_id) {
            return None;
        }
        let id = self.resolve_id(init.id, "s", self.states.len());
        let state = State {
            id: id.clone(),
            name: init.name,
            description: init.description,
            pictures: init.pictures,
            color: init.color,
        };
        self.states.insert(id.clone(), state);
        if let Some(character) = self.characters.get_mut(character_id) {
            character.states.push(id.clone());
        }
        Some(id)
    }
}

fn child_path(parent: &[usize], child_count: usize) -> Vec<usize> {
    let mut path = parent.to_vec();
    path.push(child_count.saturating_sub(1));
    path
}

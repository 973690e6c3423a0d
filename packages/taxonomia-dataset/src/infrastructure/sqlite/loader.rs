//! Bulk loader: pre-order insertion of one tree inside one transaction

use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::domain::{
    Character, Dataset, Hierarchy, LoadReport, MultilangText, Picture, Taxon, Tree,
};
use crate::error::{DatasetError, Result};

const INSERT_ITEM: &str = "INSERT INTO Items (id, seq, name, description) VALUES (?1, ?2, ?3, ?4)";

const INSERT_ITEM_NAME: &str = "INSERT INTO ItemNames (item, lang, text) VALUES (?1, ?2, ?3)";

const INSERT_ITEM_PICTURE: &str =
    "INSERT INTO ItemPictures (picture, item, url, label) VALUES (?1, ?2, ?3, ?4)";

/// Closure rows for a new node `?1` under `?2`: a copy of every path ending
/// at the parent, one edge longer, plus the node's own zero-length row.
const INSERT_HIERARCHIES: &str = "INSERT INTO Hierarchies (ancestor, descendant, length)
    SELECT ancestor, ?1, length + 1 FROM Hierarchies WHERE descendant = ?2
    UNION ALL
    SELECT ?1, ?1, 0";

/// A root only gets its self row
const INSERT_ROOT_HIERARCHY: &str =
    "INSERT INTO Hierarchies (ancestor, descendant, length) VALUES (?1, ?1, 0)";

/// Load both trees, characters first.
pub(crate) fn load_dataset(conn: &mut Connection, dataset: &Dataset) -> Result<LoadReport> {
    let mut report = LoadReport::default();
    info!(
        characters = dataset.characters.len(),
        taxa = dataset.taxa.len(),
        "Loading dataset '{}'",
        dataset.id
    );

    load_tree(conn, dataset, Tree::Characters, &mut report)?;
    load_tree(conn, dataset, Tree::Taxa, &mut report)?;

    info!(
        characters = report.characters,
        states = report.states,
        taxa = report.taxa,
        synthesized = report.synthesized,
        "Dataset loaded"
    );
    Ok(report)
}

fn load_tree(
    conn: &mut Connection,
    dataset: &Dataset,
    tree: Tree,
    report: &mut LoadReport,
) -> Result<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Exclusive)
        .map_err(|e| {
            DatasetError::transaction(format!("Cannot begin {:?} load: {}", tree, e)).with_source(e)
        })?;
    let mut tree_report = LoadReport::default();
    let outcome = {
        let mut loader = TreeLoader {
            conn: &tx,
            dataset,
            seq: 0,
            visited: HashSet::new(),
            report: &mut tree_report,
        };
        match tree {
            Tree::Characters => loader.insert_character(dataset.root(tree), None, None),
            Tree::Taxa => loader.insert_taxon(dataset.root(tree), None, None),
        }
    };

    match outcome {
        Ok(()) => {
            tx.commit().map_err(|e| {
                DatasetError::transaction(format!("Cannot commit {:?} load: {}", tree, e))
                    .with_source(e)
            })?;
            report.characters += tree_report.characters;
            report.states += tree_report.states;
            report.taxa += tree_report.taxa;
            report.synthesized += tree_report.synthesized;
            debug!(?tree, "Tree committed");
            Ok(())
        }
        Err(err) => {
            warn!(?tree, error = %err, "Tree load failed, rolling back");
            if let Err(rollback_err) = tx.rollback() {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

struct TreeLoader<'a> {
    conn: &'a Connection,
    dataset: &'a Dataset,
    /// Per-tree insertion order, shared by nodes and states
    seq: i64,
    visited: HashSet<String>,
    report: &'a mut LoadReport,
}

impl TreeLoader<'_> {
    fn next_seq(&mut self) -> i64 {
        self.seq += 1;
        self.seq
    }

    fn insert_record(
        &mut self,
        id: &str,
        name: &MultilangText,
        description: &str,
        pictures: &[Picture],
    ) -> Result<()> {
        let seq = self.next_seq();
        self.conn
            .prepare_cached(INSERT_ITEM)?
            .execute(params![id, seq, name.scientific, description])?;

        let mut insert_name = self.conn.prepare_cached(INSERT_ITEM_NAME)?;
        for (lang, text) in &name.names_by_lang {
            insert_name.execute(params![id, lang, text])?;
        }

        let mut insert_picture = self.conn.prepare_cached(INSERT_ITEM_PICTURE)?;
        for picture in pictures {
            insert_picture.execute(params![picture.id, id, picture.source, picture.legend])?;
        }
        Ok(())
    }

    fn insert_node(&mut self, hierarchy: &Hierarchy, parent_id: Option<&str>) -> Result<()> {
        self.visited.insert(hierarchy.id.clone());
        self.insert_record(
            &hierarchy.id,
            &hierarchy.name,
            &hierarchy.description,
            &hierarchy.pictures,
        )?;
        match parent_id {
            Some(parent_id) => self
                .conn
                .prepare_cached(INSERT_HIERARCHIES)?
                .execute(params![hierarchy.id, parent_id])?,
            None => self
                .conn
                .prepare_cached(INSERT_ROOT_HIERARCHY)?
                .execute(params![hierarchy.id])?,
        };
        Ok(())
    }

    /// `character` is `None` for the synthetic root and for synthesized records
    fn insert_character(
        &mut self,
        hierarchy: &Hierarchy,
        character: Option<&Character>,
        parent_id: Option<&str>,
    ) -> Result<()> {
        self.insert_node(hierarchy, parent_id)?;

        if parent_id.is_some() {
            self.conn
                .prepare_cached("INSERT INTO Characters (item) VALUES (?1)")?
                .execute(params![hierarchy.id])?;
            self.report.characters += 1;
        }

        if let Some(character) = character {
            let dataset = self.dataset;
            for state_id in &character.states {
                let Some(state) = dataset.state(state_id) else {
                    continue;
                };
                self.insert_record(&state.id, &state.name, &state.description, &state.pictures)?;
                self.conn
                    .prepare_cached(
                        "INSERT INTO States (item, character, color) VALUES (?1, ?2, ?3)",
                    )?
                    .execute(params![state.id, hierarchy.id, state.color])?;
                self.report.states += 1;
            }
            let mut insert_required = self.conn.prepare_cached(
                "INSERT OR IGNORE INTO CharacterRequiredStates (character, state) VALUES (?1, ?2)",
            )?;
            for state_id in &character.required_states {
                insert_required.execute(params![hierarchy.id, state_id])?;
            }
        }

        for child_id in &hierarchy.children {
            if self.visited.contains(child_id) {
                debug!(id = %child_id, "Character already inserted, skipping");
                continue;
            }
            let dataset = self.dataset;
            match dataset.character(child_id) {
                Some(child) => {
                    self.insert_character(&child.hierarchy, Some(child), Some(hierarchy.id.as_str()))?
                }
                None => {
                    self.report.synthesized += 1;
                    let stand_in = Hierarchy::new(child_id.clone(), MultilangText::default());
                    self.insert_character(&stand_in, None, Some(hierarchy.id.as_str()))?;
                }
            }
        }
        Ok(())
    }

    /// `taxon` is `None` for the synthetic root and for synthesized records
    fn insert_taxon(
        &mut self,
        hierarchy: &Hierarchy,
        taxon: Option<&Taxon>,
        parent_id: Option<&str>,
    ) -> Result<()> {
        self.insert_node(hierarchy, parent_id)?;

        if parent_id.is_some() {
            let author = taxon.map(|t| t.author.as_str()).unwrap_or_default();
            self.conn
                .prepare_cached("INSERT INTO Taxons (item, author) VALUES (?1, ?2)")?
                .execute(params![hierarchy.id, author])?;
            self.report.taxa += 1;
        }

        if let Some(taxon) = taxon {
            let mut insert_state = self.conn.prepare_cached(
                "INSERT OR IGNORE INTO TaxonStates (taxon, state) VALUES (?1, ?2)",
            )?;
            for state_id in &taxon.states {
                insert_state.execute(params![hierarchy.id, state_id])?;
            }
        }

        for child_id in &hierarchy.children {
            if self.visited.contains(child_id) {
                debug!(id = %child_id, "Taxon already inserted, skipping");
                continue;
            }
            let dataset = self.dataset;
            match dataset.taxon(child_id) {
                Some(child) => self.insert_taxon(&child.hierarchy, Some(child), Some(hierarchy.id.as_str()))?,
                None => {
                    self.report.synthesized += 1;
                    let stand_in = Hierarchy::new(child_id.clone(), MultilangText::default());
                    self.insert_taxon(&stand_in, None, Some(hierarchy.id.as_str()))?;
                }
            }
        }
        Ok(())
    }
}

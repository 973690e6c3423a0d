//! Duplicate id checker
//!
//! Taxa, characters and states share one id namespace. Decoding keeps the
//! last record for a repeated id, so duplicates are reported here instead of
//! failing the import.

use std::collections::BTreeMap;
use std::fmt;

use crate::codec::EncodedDataset;

/// List a record comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordKind {
    Taxon,
    Character,
    State,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Taxon => "taxon",
            RecordKind::Character => "character",
            RecordKind::State => "state",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of one record in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub kind: RecordKind,
    /// Index within its list
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId {
    pub id: String,
    pub occurrences: Vec<Occurrence>,
}

impl fmt::Display for DuplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' used {} times:", self.id, self.occurrences.len())?;
        for occurrence in &self.occurrences {
            write!(f, " {}[{}]", occurrence.kind, occurrence.index)?;
        }
        Ok(())
    }
}

/// Ids used by more than one record, sorted by id.
///
/// Records with an empty id are ignored.
pub fn find_duplicate_ids(document: &EncodedDataset) -> Vec<DuplicateId> {
    let mut seen: BTreeMap<&str, Vec<Occurrence>> = BTreeMap::new();
    let taxa = document.taxons.iter().map(|t| (t.item.id.as_str(), RecordKind::Taxon));
    let characters = document
        .characters
        .iter()
        .map(|c| (c.item.id.as_str(), RecordKind::Character));
    let states = document.states.iter().map(|s| (s.id.as_str(), RecordKind::State));

    for (kind_index, (id, kind)) in index_within_kind(taxa.chain(characters).chain(states)) {
        if id.is_empty() {
            continue;
        }
        seen.entry(id).or_default().push(Occurrence {
            kind,
            index: kind_index,
        });
    }

    seen.into_iter()
        .filter(|(_, occurrences)| occurrences.len() > 1)
        .map(|(id, occurrences)| DuplicateId {
            id: id.to_string(),
            occurrences,
        })
        .collect()
}

/// Pair each record with its index inside the list of its own kind
fn index_within_kind<'a>(
    records: impl Iterator<Item = (&'a str, RecordKind)>,
) -> impl Iterator<Item = (usize, (&'a str, RecordKind))> {
    let mut counters: BTreeMap<RecordKind, usize> = BTreeMap::new();
    records.map(move |(id, kind)| {
        let counter = counters.entry(kind).or_insert(0);
        let index = *counter;
        *counter += 1;
        (index, (id, kind))
    })
}

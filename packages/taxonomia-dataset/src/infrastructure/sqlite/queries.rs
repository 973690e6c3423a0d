//! Identification queries
//!
//! Characters come back from one flattened join (character x state x state
//! picture x state name), ordered so that rows of a character are contiguous
//! and rows of a state are contiguous within it. The reader walks the rows
//! once and opens a new character or state whenever the id changes.

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    CharacterSummary, ItemId, MultilangText, Picture, State, StateId, TaxonSummary,
    CHARACTERS_ROOT_ID,
};
use crate::error::Result;

const CHARACTER_COLUMNS: &str = "c.id, c.name, c.description,
    s.id, s.name, s.description, st.color,
    p.id, p.picture, p.url, p.label,
    sn.lang, sn.text";

const STATE_JOINS: &str = "LEFT JOIN Items s ON s.id = st.item
    LEFT JOIN ItemPictures p ON p.item = s.id
    LEFT JOIN ItemNames sn ON sn.item = s.id";

const CHARACTER_ORDER: &str = "ORDER BY c.seq, c.id, s.seq, s.id, p.id, sn.lang";

/// `?, ?, ?` for `count` parameters
fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn text_values<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<SqlValue> {
    values.into_iter().map(|v| SqlValue::Text(v.clone())).collect()
}

/// One row of the flattened character join
struct JoinRow {
    parent_id: Option<String>,
    character_id: String,
    character_name: String,
    character_description: String,
    state_id: Option<String>,
    state_name: Option<String>,
    state_description: Option<String>,
    state_color: Option<String>,
    picture_row: Option<i64>,
    picture_id: Option<String>,
    picture_url: Option<String>,
    picture_label: Option<String>,
    name_lang: Option<String>,
    name_text: Option<String>,
}

impl JoinRow {
    /// Column 0 is the parent id, the rest follow `CHARACTER_COLUMNS`
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            parent_id: row.get(0)?,
            character_id: row.get(1)?,
            character_name: row.get(2)?,
            character_description: row.get(3)?,
            state_id: row.get(4)?,
            state_name: row.get(5)?,
            state_description: row.get(6)?,
            state_color: row.get(7)?,
            picture_row: row.get(8)?,
            picture_id: row.get(9)?,
            picture_url: row.get(10)?,
            picture_label: row.get(11)?,
            name_lang: row.get(12)?,
            name_text: row.get(13)?,
        })
    }
}

/// Fold joined rows into characters, keeping row order
fn group_rows(rows: Vec<JoinRow>) -> Vec<(Option<String>, CharacterSummary)> {
    let mut characters: Vec<(Option<String>, CharacterSummary)> = Vec::new();
    let mut last_picture_row: Option<i64> = None;

    for row in rows {
        let new_character = characters
            .last()
            .map_or(true, |(_, c)| c.id != row.character_id);
        if new_character {
            characters.push((
                row.parent_id.clone(),
                CharacterSummary {
                    id: row.character_id.clone(),
                    name: MultilangText::new(row.character_name.clone()),
                    description: row.character_description.clone(),
                    ..Default::default()
                },
            ));
        }
        let Some((_, character)) = characters.last_mut() else {
            continue;
        };
        let Some(state_id) = row.state_id else {
            continue;
        };

        let new_state = character.states.last().map_or(true, |s| s.id != state_id);
        if new_state {
            last_picture_row = None;
            character.states.push(State {
                id: state_id,
                name: MultilangText::new(row.state_name.unwrap_or_default()),
                description: row.state_description.unwrap_or_default(),
                pictures: Vec::new(),
                color: row.state_color.unwrap_or_default(),
            });
        }
        let Some(state) = character.states.last_mut() else {
            continue;
        };

        if let Some(picture_row) = row.picture_row {
            if last_picture_row != Some(picture_row) {
                last_picture_row = Some(picture_row);
                state.pictures.push(Picture {
                    id: row.picture_id.unwrap_or_default(),
                    source: row.picture_url.unwrap_or_default(),
                    legend: row.picture_label.unwrap_or_default(),
                });
            }
        }
        if let (Some(lang), Some(text)) = (row.name_lang, row.name_text) {
            state.name.names_by_lang.insert(lang, text);
        }
    }
    characters
}

fn query_characters(
    conn: &Connection,
    sql: &str,
    params: Vec<SqlValue>,
) -> Result<Vec<(Option<String>, CharacterSummary)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(params), JoinRow::read)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    let mut characters = group_rows(rows);

    let ids: Vec<&String> = characters.iter().map(|(_, c)| &c.id).collect();
    let mut names = item_names(conn, &ids)?;
    let mut pictures = item_pictures(conn, &ids)?;
    for (_, character) in &mut characters {
        if let Some(overrides) = names.remove(&character.id) {
            character.name.names_by_lang = overrides;
        }
        if let Some(list) = pictures.remove(&character.id) {
            character.pictures = list;
        }
    }
    Ok(characters)
}

/// Overrides of the given items, by item id
fn item_names(
    conn: &Connection,
    ids: &[&String],
) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
    let sql = format!(
        "SELECT item, lang, text FROM ItemNames WHERE item IN ({}) ORDER BY item, lang",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(text_values(ids.iter().copied())), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut names: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (item, lang, text) in rows {
        names.entry(item).or_default().insert(lang, text);
    }
    Ok(names)
}

/// Pictures of the given items in insertion order, by item id
fn item_pictures(conn: &Connection, ids: &[&String]) -> Result<BTreeMap<String, Vec<Picture>>> {
    let sql = format!(
        "SELECT item, picture, url, label FROM ItemPictures WHERE item IN ({}) ORDER BY id",
        placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(text_values(ids.iter().copied())), |row| {
            Ok((
                row.get::<_, String>(0)?,
                Picture {
                    id: row.get(1)?,
                    source: row.get(2)?,
                    legend: row.get(3)?,
                },
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut pictures: BTreeMap<String, Vec<Picture>> = BTreeMap::new();
    for (item, picture) in rows {
        pictures.entry(item).or_default().push(picture);
    }
    Ok(pictures)
}

/// Characters at distance 1 below `parent_id`, minus `except`
pub(crate) fn child_characters(
    conn: &Connection,
    parent_id: &str,
    except: &[ItemId],
) -> Result<Vec<CharacterSummary>> {
    let sql = format!(
        "SELECT h.ancestor, {CHARACTER_COLUMNS}
         FROM Hierarchies h
         INNER JOIN Characters ch ON ch.item = h.descendant
         INNER JOIN Items c ON c.id = ch.item
         LEFT JOIN States st ON st.character = c.id
         {STATE_JOINS}
         WHERE h.ancestor = ? AND h.length = 1 AND c.id NOT IN ({})
         {CHARACTER_ORDER}",
        placeholders(except.len())
    );
    let mut params = vec![SqlValue::Text(parent_id.to_string())];
    params.extend(text_values(except));

    Ok(query_characters(conn, &sql, params)?
        .into_iter()
        .map(|(_, character)| character)
        .collect())
}

pub(crate) fn top_level_characters(
    conn: &Connection,
    except: &[ItemId],
) -> Result<Vec<CharacterSummary>> {
    child_characters(conn, CHARACTERS_ROOT_ID, except)
}

/// The given characters, each restricted to the states in `state_ids`.
///
/// The state filter sits in the join condition, so a character with none of
/// the requested states is still returned, with no states.
pub(crate) fn characters_by_selection(
    conn: &Connection,
    character_ids: &[ItemId],
    state_ids: &[StateId],
) -> Result<Vec<CharacterSummary>> {
    let sql = format!(
        "SELECT NULL, {CHARACTER_COLUMNS}
         FROM Characters ch
         INNER JOIN Items c ON c.id = ch.item
         LEFT JOIN States st ON st.character = c.id AND st.item IN ({})
         {STATE_JOINS}
         WHERE c.id IN ({})
         {CHARACTER_ORDER}",
        placeholders(state_ids.len()),
        placeholders(character_ids.len())
    );
    let mut params = text_values(state_ids);
    params.extend(text_values(character_ids));

    Ok(query_characters(conn, &sql, params)?
        .into_iter()
        .map(|(_, character)| character)
        .collect())
}

/// Character forest, children nested under their parents
pub(crate) fn character_tree(conn: &Connection) -> Result<Vec<CharacterSummary>> {
    let sql = format!(
        "SELECT h.ancestor, {CHARACTER_COLUMNS}
         FROM Characters ch
         INNER JOIN Items c ON c.id = ch.item
         LEFT JOIN Hierarchies h ON h.descendant = c.id AND h.length = 1
         LEFT JOIN States st ON st.character = c.id
         {STATE_JOINS}
         {CHARACTER_ORDER}"
    );
    let flat = query_characters(conn, &sql, Vec::new())?;

    let known: BTreeSet<String> = flat.iter().map(|(_, c)| c.id.clone()).collect();
    let mut roots: Vec<String> = Vec::new();
    let mut children_of: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut by_id: BTreeMap<String, CharacterSummary> = BTreeMap::new();
    for (parent, character) in flat {
        match parent.filter(|p| known.contains(p)) {
            Some(parent) => children_of.entry(parent).or_default().push(character.id.clone()),
            None => roots.push(character.id.clone()),
        }
        by_id.insert(character.id.clone(), character);
    }

    fn assemble(
        id: &str,
        by_id: &mut BTreeMap<String, CharacterSummary>,
        children_of: &BTreeMap<String, Vec<String>>,
    ) -> Option<CharacterSummary> {
        let mut character = by_id.remove(id)?;
        for child_id in children_of.get(id).into_iter().flatten() {
            if let Some(child) = assemble(child_id, by_id, children_of) {
                character.children.push(child);
            }
        }
        Some(character)
    }

    Ok(roots
        .iter()
        .filter_map(|id| assemble(id, &mut by_id, &children_of))
        .collect())
}

/// Taxa carrying every requested state; duplicate ids count once.
pub(crate) fn identify_taxa(conn: &Connection, state_ids: &[StateId]) -> Result<Vec<TaxonSummary>> {
    let requested: BTreeSet<&String> = state_ids.iter().collect();
    let sql = format!(
        "SELECT t.id, t.name, t.description, tx.author
         FROM Items t
         INNER JOIN Taxons tx ON tx.item = t.id
         INNER JOIN TaxonStates ts ON ts.taxon = t.id
         WHERE ts.state IN ({})
         GROUP BY t.id
         HAVING COUNT(DISTINCT ts.state) = ?
         ORDER BY t.seq, t.id",
        placeholders(requested.len())
    );
    let mut params = text_values(requested.iter().copied());
    params.push(SqlValue::Integer(requested.len() as i64));

    let mut stmt = conn.prepare(&sql)?;
    let taxa = stmt
        .query_map(params_from_iter(params), |row| {
            Ok(TaxonSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                author: row.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(taxa)
}

pub(crate) fn picture_sources(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT url FROM ItemPictures WHERE url <> '' ORDER BY url")?;
    let urls = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(urls)
}

pub(crate) fn cached_picture(conn: &Connection, url: &str) -> Result<Option<Vec<u8>>> {
    let data = conn
        .query_row(
            "SELECT data FROM PictureCache WHERE src = ?1",
            [url],
            |row| row.get(0),
        )
        .optional()?;
    Ok(data)
}

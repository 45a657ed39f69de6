//! Word lists and lexicons loaded at setup.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
};

use tracing::{info, warn};

use crate::{
    entity::{EntitySubtype, EntityType, EntityTypes},
    error::SetupError,
    sexp,
};

fn read(path: &Path) -> Result<String, SetupError> {
    std::fs::read_to_string(path).map_err(|source| SetupError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Answers whether a word denotes a person.
pub trait Lexicon: fmt::Debug + Send + Sync {
    fn is_person(&self, word: &str) -> bool;
}

/// A case-insensitive set of words.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// One word per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        WordList::from_words(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let list = WordList::parse(&read(path)?);
        info!(path = %path.display(), words = list.len(), "loaded word list");
        Ok(list)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        WordList {
            words: words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl Lexicon for WordList {
    fn is_person(&self, word: &str) -> bool {
        self.contains(word)
    }
}

/// Read entries of two or more atoms, e.g. `(bank ORG FAC)`.
fn entries(text: &str, path: &Path, what: &'static str) -> Result<Vec<Vec<String>>, SetupError> {
    let expressions =
        sexp::parse_all(text).map_err(|reason| SetupError::malformed(path, what, reason))?;
    expressions
        .iter()
        .map(|expression| {
            expression
                .as_list()
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_atom().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .filter(|atoms| atoms.len() >= 2)
                .ok_or_else(|| {
                    SetupError::malformed(path, what, format!("expected (word VALUE…), found {expression:?}"))
                })
        })
        .collect()
}

/// Which entity types a descriptor head word can denote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMap {
    types: HashMap<String, Vec<EntityType>>,
}

impl TypeMap {
    pub fn parse(text: &str, registry: &EntityTypes, path: &Path) -> Result<Self, SetupError> {
        let mut types: HashMap<String, Vec<EntityType>> = HashMap::new();
        for atoms in entries(text, path, "descriptor type map")? {
            let word = atoms[0].to_lowercase();
            for name in &atoms[1..] {
                let entity_type = registry.lookup(name).cloned().ok_or_else(|| {
                    SetupError::UnknownEntityType {
                        path: path.to_path_buf(),
                        name: name.clone(),
                    }
                })?;
                types.entry(word.clone()).or_default().push(entity_type);
            }
        }
        Ok(TypeMap { types })
    }

    pub fn load(path: &Path, registry: &EntityTypes) -> Result<Self, SetupError> {
        let map = TypeMap::parse(&read(path)?, registry, path)?;
        info!(path = %path.display(), words = map.types.len(), "loaded descriptor type map");
        Ok(map)
    }

    pub fn insert(&mut self, word: &str, entity_type: EntityType) {
        self.types
            .entry(word.to_lowercase())
            .or_default()
            .push(entity_type);
    }

    pub fn types_for(&self, word: &str) -> &[EntityType] {
        self.types
            .get(&word.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn licenses(&self, word: &str, entity_type: &EntityType) -> bool {
        self.types_for(word).contains(entity_type)
    }
}

/// Subtype lexicon: `(word… TYPE.Subtype)` entries. The key may run to
/// several words, as in `(new york city GPE.Population-Center)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtypeTable {
    entries: HashMap<String, Vec<EntitySubtype>>,
}

impl SubtypeTable {
    /// Entries naming an undefined subtype are skipped with a warning.
    pub fn parse(text: &str, registry: &EntityTypes, path: &Path) -> Result<Self, SetupError> {
        let mut table = SubtypeTable::default();
        for atoms in entries(text, path, "subtype lexicon")? {
            let Some((spec, words)) = atoms.split_last() else {
                continue;
            };
            let phrase = words.join(" ");
            match registry.subtype(spec) {
                Some(subtype) => table.insert(&phrase, subtype.clone()),
                None => warn!(path = %path.display(), %phrase, %spec, "ignoring undefined subtype"),
            }
        }
        Ok(table)
    }

    pub fn load(path: &Path, registry: &EntityTypes) -> Result<Self, SetupError> {
        let table = SubtypeTable::parse(&read(path)?, registry, path)?;
        info!(path = %path.display(), words = table.entries.len(), "loaded subtype lexicon");
        Ok(table)
    }

    pub fn insert(&mut self, word: &str, subtype: EntitySubtype) {
        self.entries
            .entry(word.to_lowercase())
            .or_default()
            .push(subtype);
    }

    /// The first subtype listed for `word` under `entity_type`. Keys are
    /// compared case-insensitively.
    pub fn lookup(&self, word: &str, entity_type: &EntityType) -> Option<&EntitySubtype> {
        self.entries
            .get(&word.to_lowercase())?
            .iter()
            .find(|subtype| subtype.parent() == entity_type)
    }
}

/// The three subtype lexicons consulted by the subtype step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtypeLexicon {
    pub descriptor_heads: SubtypeTable,
    pub name_words: SubtypeTable,
    pub full_names: SubtypeTable,
}

//! N-gram probability tables.
//!
//! A table maps a key `(h_1 … h_{n-1} e)` to the probability of event `e`
//! after history `h`. Each row also records how often its history was seen
//! and how many distinct events followed it, which is all Witten–Bell
//! smoothing needs.
//!
//! On disk a table is an entry count followed by that many entries:
//!
//! ```text
//! 2
//! ((PER officer) 0.25 40 12)
//! ((ORG officer) 0.01 90 30)
//! ```

use std::{
    hash::{Hash, Hasher},
    path::Path,
};

use hashbrown::{Equivalent, HashMap};
use tracing::info;

use crate::{entity::EntityTypes, error::SetupError, sexp::{self, Sexp}};

/// Log-probability used for events with no probability mass.
pub const LOG_OF_ZERO: f64 = -10000.0;

/// How lookups treat rows that are missing or rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Smoothing {
    /// Raw relative frequencies; a missing key scores [`LOG_OF_ZERO`].
    None,
    /// Interpolate with a uniform distribution using the history weight
    /// `c / (c + κ·u)` for history count `c` and `u` distinct events.
    WittenBell,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct History {
    count: f64,
    unique: f64,
}

impl History {
    fn lambda(self, kappa: f64) -> f64 {
        let denominator = self.count + kappa * self.unique;
        if denominator > 0.0 {
            self.count / denominator
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Row {
    probability: f64,
    history: History,
}

/// Borrowed key used to probe a table without allocating.
struct KeyRef<'a>(&'a [&'a str]);

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Equivalent<Vec<String>> for KeyRef<'_> {
    fn equivalent(&self, key: &Vec<String>) -> bool {
        self.0.len() == key.len() && self.0.iter().zip(key).all(|(a, b)| *a == b.as_str())
    }
}

/// The result of probing a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookup {
    pub probability: f64,
    pub log_probability: f64,
    /// Smoothing weight of the key's history.
    pub lambda: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbTable {
    order: usize,
    smoothing: Smoothing,
    kappa: f64,
    rows: HashMap<Vec<String>, Row>,
    histories: HashMap<Vec<String>, History>,
    vocabulary: usize,
}

impl ProbTable {
    /// An empty table over keys of length `order`.
    pub fn new(order: usize, smoothing: Smoothing) -> Self {
        ProbTable {
            order,
            smoothing,
            kappa: 1.0,
            rows: HashMap::new(),
            histories: HashMap::new(),
            vocabulary: 0,
        }
    }

    /// Scale the distinct-event count in the history weight.
    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    /// Add a row. Later rows with the same key replace earlier ones.
    pub fn insert<S: AsRef<str>>(
        &mut self,
        key: &[S],
        probability: f64,
        history_count: f64,
        history_unique: f64,
    ) {
        let key: Vec<String> = key.iter().map(|part| part.as_ref().to_string()).collect();
        let history = History {
            count: history_count,
            unique: history_unique,
        };
        let split = key.len().saturating_sub(1);
        self.histories.insert(key[..split].to_vec(), history);
        self.rows.insert(key, Row { probability, history });
        self.vocabulary = self.count_vocabulary();
    }

    fn count_vocabulary(&self) -> usize {
        let mut events: Vec<&str> = self
            .rows
            .keys()
            .filter_map(|key| key.last().map(String::as_str))
            .collect();
        events.sort_unstable();
        events.dedup();
        events.len()
    }

    pub fn load(path: &Path, order: usize, smoothing: Smoothing) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = ProbTable::parse(&text, order, smoothing, path)?;
        info!(path = %path.display(), entries = table.len(), "loaded probability table");
        Ok(table)
    }

    /// Read a table from text; `source` only labels errors.
    pub fn parse(
        text: &str,
        order: usize,
        smoothing: Smoothing,
        source: &Path,
    ) -> Result<Self, SetupError> {
        const WHAT: &str = "probability table";
        let malformed = |reason: String| SetupError::malformed(source, WHAT, reason);

        let expressions = sexp::parse_all(text).map_err(malformed)?;
        let Some((count, entries)) = expressions.split_first() else {
            return Err(malformed("missing entry count".to_string()));
        };
        let expected: usize = count
            .as_atom()
            .and_then(|atom| atom.parse().ok())
            .ok_or_else(|| malformed(format!("entry count is not a number: {count:?}")))?;
        if expected != entries.len() {
            return Err(malformed(format!(
                "header promises {expected} entries but {} follow",
                entries.len()
            )));
        }

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let fields = match entry.as_list() {
                Some(fields) if fields.len() == 4 => fields,
                _ => return Err(malformed(format!("entry is not (key p c u): {entry:?}"))),
            };
            let key = fields[0]
                .as_list()
                .and_then(|parts| parts.iter().map(Sexp::as_atom).collect::<Option<Vec<&str>>>())
                .filter(|parts| parts.len() == order)
                .ok_or_else(|| {
                    malformed(format!("key is not a list of {order} words: {:?}", fields[0]))
                })?;
            let mut numbers = [0.0; 3];
            for (slot, field) in numbers.iter_mut().zip(&fields[1..]) {
                *slot = field
                    .as_atom()
                    .and_then(|atom| atom.parse::<f64>().ok())
                    .ok_or_else(|| malformed(format!("expected a number, found {field:?}")))?;
            }
            rows.push((key, numbers));
        }

        let mut table = ProbTable::new(order, smoothing);
        for (key, [probability, count, unique]) in rows {
            let history = History { count, unique };
            table.histories.insert(
                key[..order.saturating_sub(1)]
                    .iter()
                    .map(|part| part.to_string())
                    .collect(),
                history,
            );
            table.rows.insert(
                key.iter().map(|part| part.to_string()).collect(),
                Row {
                    probability,
                    history,
                },
            );
        }
        table.vocabulary = table.count_vocabulary();
        Ok(table)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct events; the size of the uniform back-off.
    pub fn vocabulary(&self) -> usize {
        self.vocabulary
    }

    /// Probe the table with a full key.
    pub fn lookup(&self, key: &[&str]) -> Lookup {
        let split = key.len().saturating_sub(1);
        let row = self.rows.get(&KeyRef(key));
        let history = self.histories.get(&KeyRef(&key[..split])).copied();
        let lambda = history.map_or(0.0, |history| history.lambda(self.kappa));
        let raw = row.map_or(0.0, |row| row.probability);

        let probability = match self.smoothing {
            Smoothing::None => raw,
            Smoothing::WittenBell => {
                let uniform = 1.0 / self.vocabulary.max(1) as f64;
                match history {
                    Some(_) => lambda * raw + (1.0 - lambda) * uniform,
                    None => uniform,
                }
            }
        };
        let log_probability = if probability > 0.0 {
            probability.ln()
        } else {
            LOG_OF_ZERO
        };

        Lookup {
            probability,
            log_probability,
            lambda,
        }
    }

    pub fn log_probability(&self, key: &[&str]) -> f64 {
        self.lookup(key).log_probability
    }

    /// Smoothing weight of the key's history.
    pub fn lambda(&self, key: &[&str]) -> f64 {
        self.lookup(key).lambda
    }

    /// The weight stored on the row of the full key, or 0 when the key is
    /// absent. This is what premodifier interpolation uses; it differs from
    /// [`ProbTable::lambda`] whenever the key itself was never seen.
    pub fn incorrect_lambda(&self, key: &[&str]) -> f64 {
        self.rows
            .get(&KeyRef(key))
            .map_or(0.0, |row| row.history.lambda(self.kappa))
    }

    /// Fail if any key names an entity type the registry does not know.
    pub fn check_types(
        &self,
        position: usize,
        types: &EntityTypes,
        source: &Path,
    ) -> Result<(), SetupError> {
        for key in self.rows.keys() {
            if let Some(name) = key.get(position) {
                if types.lookup(name).is_none() {
                    return Err(SetupError::UnknownEntityType {
                        path: source.to_path_buf(),
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

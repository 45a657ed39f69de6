use std::path::Path;

use super::{
    NULL_CONTEXT, with_suffix,
    table::{LOG_OF_ZERO, ProbTable, Smoothing},
};
use crate::{
    entity::{EntityType, EntityTypes},
    error::SetupError,
    ranked::TopK,
};

/// Ranks entity types for pronouns that are not plainly personal.
#[derive(Debug, Clone)]
pub struct PronounModel {
    /// `(pronoun TYPE)`
    word: ProbTable,
    /// `(TYPE parent_head)`
    parent: ProbTable,
}

impl PronounModel {
    pub fn new(word: ProbTable, parent: ProbTable) -> Self {
        PronounModel { word, parent }
    }

    /// Load `prefix.pron1` and `prefix.pron2`.
    pub fn load(prefix: &Path, types: &EntityTypes) -> Result<Self, SetupError> {
        let word_path = with_suffix(prefix, ".pron1");
        let word = ProbTable::load(&word_path, 2, Smoothing::None)?;
        word.check_types(1, types, &word_path)?;

        let parent_path = with_suffix(prefix, ".pron2");
        let parent = ProbTable::load(&parent_path, 2, Smoothing::WittenBell)?;
        parent.check_types(0, types, &parent_path)?;

        Ok(PronounModel::new(word, parent))
    }

    /// Score every type that `pronoun` has been seen with. The result is
    /// empty when the pronoun is unknown.
    pub fn rank(
        &self,
        pronoun: &str,
        functional_parent: Option<&str>,
        types: &EntityTypes,
        max_results: usize,
    ) -> TopK<EntityType> {
        let pronoun = pronoun.to_lowercase();
        let parent = functional_parent.unwrap_or(NULL_CONTEXT);
        let mut ranked = TopK::new(max_results);
        for entity_type in types.iter() {
            let word = self.word.log_probability(&[pronoun.as_str(), entity_type.name()]);
            if word <= LOG_OF_ZERO {
                continue;
            }
            let total = word + self.parent.log_probability(&[entity_type.name(), parent]);
            ranked.insert(total, entity_type.clone());
        }
        ranked
    }
}

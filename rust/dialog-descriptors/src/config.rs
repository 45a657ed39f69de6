//! Recognizer configuration, read from JSON.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::{entity::EntityTypesConfig, error::SetupError, scoring::ScoringStrategy};

fn default_strategy() -> String {
    ScoringStrategy::Multinomial.to_string()
}

fn default_beam_width() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Everything needed to build a [`DescriptorRecognizer`].
///
/// Paths are used as given; relative paths resolve against the working
/// directory of the process.
///
/// [`DescriptorRecognizer`]: crate::recognizer::DescriptorRecognizer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecognizerConfig {
    /// `"multinomial"` or `"discriminative"`.
    #[serde(default = "default_strategy")]
    pub strategy: String,

    /// Prefix of the descriptor model files (`.mnp1` … `.mnp6`).
    pub desc_model: PathBuf,

    /// Prefix of a separate model for nominal premodifiers.
    #[serde(default)]
    pub nom_premod_model: Option<PathBuf>,

    /// Prefix of the pronoun model files (`.pron1`, `.pron2`).
    #[serde(default)]
    pub pronoun_model: Option<PathBuf>,

    #[serde(default)]
    pub partitive_headwords: Option<PathBuf>,

    /// Descriptor head words and the entity types they may denote.
    #[serde(default)]
    pub desc_types: Option<PathBuf>,

    #[serde(default)]
    pub temporal_headwords: Option<PathBuf>,

    #[serde(default)]
    pub person_nouns: Option<PathBuf>,

    #[serde(default)]
    pub desc_head_subtypes: Option<PathBuf>,

    #[serde(default)]
    pub name_word_subtypes: Option<PathBuf>,

    #[serde(default)]
    pub full_name_subtypes: Option<PathBuf>,

    /// Live hypotheses kept by the search.
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,

    #[serde(default)]
    pub branching: bool,

    /// When false, untyped mentions are marked with the other type and no
    /// model is consulted.
    #[serde(default = "default_true")]
    pub classify_descriptors: bool,

    /// Type forced onto the sole mention of a document's first sentence.
    #[serde(default)]
    pub first_mention_type: Option<String>,

    #[serde(default)]
    pub entity_types: EntityTypesConfig,
}

impl RecognizerConfig {
    /// A configuration with every optional resource left out.
    pub fn new(desc_model: impl Into<PathBuf>) -> Self {
        RecognizerConfig {
            strategy: default_strategy(),
            desc_model: desc_model.into(),
            nom_premod_model: None,
            pronoun_model: None,
            partitive_headwords: None,
            desc_types: None,
            temporal_headwords: None,
            person_nouns: None,
            desc_head_subtypes: None,
            name_word_subtypes: None,
            full_name_subtypes: None,
            beam_width: default_beam_width(),
            branching: false,
            classify_descriptors: true,
            first_mention_type: None,
            entity_types: EntityTypesConfig::default(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SetupError> {
        let config: RecognizerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = RecognizerConfig::from_json(&text)?;
        info!(path = %path.display(), strategy = %config.strategy, "loaded recognizer configuration");
        Ok(config)
    }

    pub fn scoring_strategy(&self) -> Result<ScoringStrategy, SetupError> {
        self.strategy.parse()
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        self.scoring_strategy()?;
        if self.beam_width == 0 {
            return Err(SetupError::Config("beam_width must be at least 1".to_string()));
        }
        Ok(())
    }
}

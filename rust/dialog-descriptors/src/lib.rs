//! # Dialog Descriptors: mention classification over parse trees
//!
//! Every noun phrase in a parsed sentence is a *mention*. This crate decides
//! what kind of mention each one is (name, descriptor, pronoun, partitive,
//! appositive, list, nested name) and which entity type it refers to.
//!
//! ## Core Ideas
//!
//! - **Hypotheses are values**: a [`MentionSet`] is one complete reading of a
//!   sentence. Exploring alternatives clones it; nothing is shared but the
//!   immutable parse.
//! - **Steps are small**: each [`Classifier`] handles one mention category
//!   and passes everything else through, and the recognizer runs them in a
//!   fixed order at every mention node.
//! - **Search is bounded**: a [`TreeSearch`] keeps the best `beam_width`
//!   hypotheses, or edits a single one in place.
//! - **Models are data**: descriptor scoring reads n-gram tables from disk
//!   and chooses its strategy once, from configuration.
//!
//! ## Architecture
//!
//! ```text
//! Parse + names → seed MentionSet
//!   → per node (postorder): partitive → appositive → list → nested
//!       → pronoun → descriptor → nominal premod
//!   → subtype pass → commit
//!     → premod + subtype revisit → ranked MentionSets
//! ```
//!
//! [`MentionSet`]: hypothesis::MentionSet
//! [`Classifier`]: classifier::Classifier
//! [`TreeSearch`]: search::TreeSearch

pub mod classifier;
pub mod compound;
pub mod config;
pub mod entity;
pub mod error;
pub mod hypothesis;
pub mod lexicon;
pub mod mention;
pub mod names;
pub mod ranked;
pub mod recognizer;
pub mod rules;
pub mod scoring;
pub mod search;
pub mod sexp;
pub mod steps;
pub mod store;
pub mod tree;

pub use config::RecognizerConfig;
pub use entity::{EntitySubtype, EntityType, EntityTypes, EntityTypesConfig};
pub use error::{DecodeError, SetupError};
pub use hypothesis::MentionSet;
pub use mention::{Mention, MentionId, MentionType};
pub use names::{NameSpan, NameTheory};
pub use recognizer::{DescriptorRecognizer, Sentence};
pub use rules::LanguageRules;
pub use scoring::{Decoder, DescriptorScorer, ScoringStrategy};
pub use tree::{NodeId, ParseTree};

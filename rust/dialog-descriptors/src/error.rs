//! Error types for mention recognition.
//!
//! [`SetupError`] covers everything that can go wrong while a recognizer is
//! being assembled: unreadable files, malformed tables, bad configuration.
//! [`DecodeError`] covers consistency failures while a sentence is being
//! decoded. Any decode error aborts the current sentence.

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::NodeId;

/// A failure while loading models, lexicons or configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {what} in {path}: {reason}")]
    Malformed {
        path: PathBuf,
        what: &'static str,
        reason: String,
    },

    #[error("{path} refers to unrecognized entity type '{name}'")]
    UnknownEntityType { path: PathBuf, name: String },

    #[error("unrecognized entity subtype '{0}'")]
    UnknownSubtype(String),

    #[error("unrecognized scoring strategy '{0}'")]
    UnknownStrategy(String),

    #[error("the discriminative strategy requires a decoder")]
    MissingDecoder,

    #[error("invalid entity type registry: {0}")]
    Registry(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unable to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl SetupError {
    pub(crate) fn malformed(
        path: impl Into<PathBuf>,
        what: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        SetupError::Malformed {
            path: path.into(),
            what,
            reason: reason.into(),
        }
    }
}

/// A consistency failure during decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    #[error("search capacity must be greater than zero")]
    ZeroCapacity,

    #[error("classifier '{classifier}' produced no results")]
    NoResults { classifier: &'static str },

    #[error("classifier '{classifier}' answered in place during a branching search")]
    InPlaceWhileBranching { classifier: &'static str },

    #[error("node {node} carries no mention")]
    NoMention { node: NodeId },

    #[error("no entity type scored above the floor for head word '{head}'")]
    NoCandidates { head: String },

    #[error("mention structure violated: {0}")]
    Structure(String),

    #[error("malformed parse tree: {0}")]
    MalformedTree(String),
}

//! The capability shared by every classification step.
//!
//! A step is handed a [`Solution`] that is either borrowed immutably
//! (branching search) or mutably (in-place decoding). In branching mode the
//! step may only read its input; every alternative it proposes is a fresh
//! clone that it hands back by value. In place, it edits the caller's
//! hypothesis directly and reports the score it added.

use tracing::trace;

use crate::{error::DecodeError, hypothesis::MentionSet, mention::MentionId};

/// The hypothesis a step is asked to classify.
#[derive(Debug)]
pub enum Solution<'a> {
    Branching(&'a MentionSet),
    InPlace(&'a mut MentionSet),
}

/// One alternative produced in branching mode.
#[derive(Debug, Clone)]
pub struct Branch {
    pub solution: MentionSet,
    pub delta: f64,
}

/// The outcome of one classification request.
#[derive(Debug, Clone)]
pub enum Classified {
    /// The caller's hypothesis was edited in place.
    InPlace { delta: f64 },
    /// Owned alternatives, best first.
    Branches(Vec<Branch>),
}

impl Classified {
    pub fn len(&self) -> usize {
        match self {
            Classified::InPlace { .. } => 1,
            Classified::Branches(branches) => branches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Solution<'_> {
    pub fn view(&self) -> &MentionSet {
        match self {
            Solution::Branching(set) => set,
            Solution::InPlace(set) => set,
        }
    }

    pub fn is_branching(&self) -> bool {
        matches!(self, Solution::Branching(_))
    }

    /// Hand the hypothesis back untouched.
    pub fn unchanged(self) -> Classified {
        match self {
            Solution::Branching(set) => Classified::Branches(vec![Branch {
                solution: set.clone(),
                delta: 0.0,
            }]),
            Solution::InPlace(_) => Classified::InPlace { delta: 0.0 },
        }
    }

    /// Apply one deterministic edit.
    pub fn apply<F>(self, edit: F) -> Result<Classified, DecodeError>
    where
        F: FnOnce(&mut MentionSet) -> Result<(), DecodeError>,
    {
        match self {
            Solution::Branching(set) => {
                let mut fork = set.clone();
                edit(&mut fork)?;
                Ok(Classified::Branches(vec![Branch {
                    solution: fork,
                    delta: 0.0,
                }]))
            }
            Solution::InPlace(set) => {
                edit(set)?;
                Ok(Classified::InPlace { delta: 0.0 })
            }
        }
    }

    /// Apply `edit` once per scored candidate, best first, crediting each
    /// score to `mention`. In place only the best candidate is applied.
    pub fn apply_ranked<C, I, F>(
        self,
        mention: MentionId,
        candidates: I,
        max_results: usize,
        mut edit: F,
    ) -> Result<Classified, DecodeError>
    where
        I: IntoIterator<Item = (f64, C)>,
        F: FnMut(&mut MentionSet, C) -> Result<(), DecodeError>,
    {
        match self {
            Solution::Branching(set) => {
                let mut branches = Vec::new();
                for (delta, candidate) in candidates.into_iter().take(max_results) {
                    let mut fork = set.clone();
                    edit(&mut fork, candidate)?;
                    fork.add_score(mention, delta);
                    trace!(%mention, delta, "forked hypothesis");
                    branches.push(Branch {
                        solution: fork,
                        delta,
                    });
                }
                Ok(Classified::Branches(branches))
            }
            Solution::InPlace(set) => match candidates.into_iter().next() {
                Some((delta, candidate)) => {
                    edit(set, candidate)?;
                    set.add_score(mention, delta);
                    Ok(Classified::InPlace { delta })
                }
                None => Ok(Classified::Branches(Vec::new())),
            },
        }
    }
}

/// A single classification step.
pub trait Classifier {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Classify `mention` within `solution`, returning at most
    /// `max_results` alternatives. Mentions outside the step's remit are
    /// passed through unchanged.
    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        max_results: usize,
    ) -> Result<Classified, DecodeError>;
}

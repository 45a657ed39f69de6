//! Seeding a hypothesis with the sentence's name spans.

use tracing::warn;

use crate::{
    entity::EntityType,
    error::DecodeError,
    hypothesis::MentionSet,
    mention::MentionType,
    rules::LanguageRules,
};

/// A name over tokens `start..=end`.
#[derive(Debug, Clone, PartialEq)]
pub struct NameSpan {
    pub start: usize,
    pub end: usize,
    pub entity_type: EntityType,
}

impl NameSpan {
    pub fn new(start: usize, end: usize, entity_type: EntityType) -> Self {
        NameSpan {
            start,
            end,
            entity_type,
        }
    }
}

/// The name finder's verdict for one sentence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameTheory {
    pub spans: Vec<NameSpan>,
    pub score: f64,
}

impl NameTheory {
    pub fn new(spans: Vec<NameSpan>, score: f64) -> Self {
        NameTheory { spans, score }
    }
}

/// Mark the name-labelled mention under each span as a name and record the
/// theory's score on the hypothesis.
pub fn insert_names(
    set: &mut MentionSet,
    theory: &NameTheory,
    rules: &LanguageRules,
) -> Result<(), DecodeError> {
    insert(set, &theory.spans, rules, MentionType::Name)?;
    set.set_name_score(theory.score);
    Ok(())
}

/// Mark names found inside other names as nested mentions.
pub fn insert_nested_names(
    set: &mut MentionSet,
    theory: &NameTheory,
    rules: &LanguageRules,
) -> Result<(), DecodeError> {
    insert(set, &theory.spans, rules, MentionType::Nested)
}

fn insert(
    set: &mut MentionSet,
    spans: &[NameSpan],
    rules: &LanguageRules,
    kind: MentionType,
) -> Result<(), DecodeError> {
    let mut unassigned = 0;
    for span in spans {
        let tree = set.tree();
        let target = set
            .mentions()
            .find(|mention| {
                let node = mention.node();
                tree.start_token(node) == span.start
                    && tree.end_token(node) == span.end
                    && rules.is_name_node(tree, node)
            })
            .map(|mention| (mention.id(), mention.is_populated()));

        match target {
            Some((id, true)) => {
                return Err(DecodeError::Structure(format!(
                    "{id} was populated before its {kind} span was added"
                )));
            }
            Some((id, false)) => {
                let mention = set.mention_mut(id);
                mention.set_mention_type(kind);
                mention.set_entity_type(span.entity_type.clone());
            }
            None => {
                unassigned += 1;
                let words: Vec<&str> = tree
                    .words(tree.root())
                    .into_iter()
                    .skip(span.start)
                    .take(span.end.saturating_sub(span.start) + 1)
                    .collect();
                warn!(%kind, start = span.start, end = span.end, words = %words.join(" "), "name span has no mention");
            }
        }
    }
    if unassigned > 0 {
        warn!(%kind, unassigned, "name spans had no corresponding mention");
    }
    Ok(())
}

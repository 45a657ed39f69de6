//! Per-language tree conventions.
//!
//! Everything the classifiers need to know about a language's tag set and
//! closed-class vocabulary lives in [`LanguageRules`]. A recognizer is given
//! one value at build time; nothing here is global.

use std::collections::HashSet;

use crate::tree::{NodeId, ParseTree};

/// A parent/head tag pair for which the governing child is the one just
/// before the marked head (e.g. a possessive particle heading its phrase).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartHead {
    pub parent_tag: String,
    pub head_tag: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRules {
    noun_phrase_tags: HashSet<String>,
    name_tag: String,
    prepositional_tag: String,
    conjunction_tags: HashSet<String>,
    conjunction_phrase_tag: String,
    comma_tag: String,
    noun_tags: HashSet<String>,
    plural_noun_tags: HashSet<String>,
    pronoun_tags: HashSet<String>,
    partitive_headwords: HashSet<String>,
    partitive_preposition: String,
    hyphen: String,
    person_pronouns: HashSet<String>,
    smart_heads: Vec<SmartHead>,
    city_state_types: HashSet<String>,
    max_list_members: usize,
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|item| item.to_string()).collect()
}

impl LanguageRules {
    /// Penn-style English tags with `NPP` as the name label.
    pub fn english() -> Self {
        LanguageRules {
            noun_phrase_tags: set(&["NP", "NPA", "NPP", "NPPOS"]),
            name_tag: "NPP".to_string(),
            prepositional_tag: "PP".to_string(),
            conjunction_tags: set(&["CC"]),
            conjunction_phrase_tag: "CONJP".to_string(),
            comma_tag: ",".to_string(),
            noun_tags: set(&["NN", "NNS", "NNP", "NNPS"]),
            plural_noun_tags: set(&["NNS", "NNPS"]),
            pronoun_tags: set(&["PRP", "PRP$", "WP", "WP$"]),
            partitive_headwords: set(&[
                "some", "all", "most", "many", "much", "each", "none", "one", "two", "three",
                "four", "five", "several", "few", "half", "part", "both", "any", "either",
                "neither", "majority", "rest", "dozens", "hundreds", "thousands", "millions",
            ]),
            partitive_preposition: "of".to_string(),
            hyphen: "-".to_string(),
            person_pronouns: set(&[
                "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves",
            ]),
            smart_heads: Vec::new(),
            city_state_types: set(&["GPE"]),
            max_list_members: 50,
        }
    }

    pub fn with_partitive_headwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.partitive_headwords = words
            .into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();
        self
    }

    pub fn with_smart_head(mut self, parent_tag: &str, head_tag: &str) -> Self {
        self.smart_heads.push(SmartHead {
            parent_tag: parent_tag.to_string(),
            head_tag: head_tag.to_string(),
        });
        self
    }

    pub fn name_tag(&self) -> &str {
        &self.name_tag
    }

    pub fn max_list_members(&self) -> usize {
        self.max_list_members
    }

    /// Nodes that receive a mention slot: noun phrases and nominal
    /// premodifiers.
    pub fn can_be_mention(&self, tree: &ParseTree, node: NodeId) -> bool {
        if tree.is_terminal(node) {
            return false;
        }
        self.noun_phrase_tags.contains(tree.tag(node)) || self.is_nominal_premod(tree, node)
    }

    /// A noun preterminal sitting before the head of a noun phrase.
    pub fn is_nominal_premod(&self, tree: &ParseTree, node: NodeId) -> bool {
        if !tree.is_preterminal(node) || !self.noun_tags.contains(tree.tag(node)) {
            return false;
        }
        let Some(parent) = tree.parent(node) else {
            return false;
        };
        if !self.noun_phrase_tags.contains(tree.tag(parent)) {
            return false;
        }
        let head_index = tree.node(parent).head_index();
        tree.children(parent)
            .iter()
            .position(|&child| child == node)
            .is_some_and(|position| position < head_index)
    }

    pub fn is_name_node(&self, tree: &ParseTree, node: NodeId) -> bool {
        tree.tag(node) == self.name_tag
    }

    /// A single-token phrase headed by a pronoun.
    pub fn is_pronoun_node(&self, tree: &ParseTree, node: NodeId) -> bool {
        let preterminal = tree.head_preterminal(node);
        self.pronoun_tags.contains(tree.tag(preterminal))
            && tree.start_token(node) == tree.end_token(node)
    }

    /// Whether the head preterminal is a noun, as a descriptor requires.
    pub fn has_noun_head(&self, tree: &ParseTree, node: NodeId) -> bool {
        self.noun_tags
            .contains(tree.tag(tree.head_preterminal(node)))
    }

    pub fn has_plural_head(&self, tree: &ParseTree, node: NodeId) -> bool {
        self.plural_noun_tags
            .contains(tree.tag(tree.head_preterminal(node)))
    }

    pub fn is_prepositional(&self, tree: &ParseTree, node: NodeId) -> bool {
        tree.tag(node) == self.prepositional_tag
    }

    pub fn is_conjunction(&self, tree: &ParseTree, node: NodeId) -> bool {
        self.conjunction_tags.contains(tree.tag(node))
    }

    pub fn is_conjunction_phrase(&self, tree: &ParseTree, node: NodeId) -> bool {
        tree.tag(node) == self.conjunction_phrase_tag
    }

    pub fn is_comma(&self, tree: &ParseTree, node: NodeId) -> bool {
        tree.tag(node) == self.comma_tag
    }

    pub fn is_hyphen(&self, tree: &ParseTree, node: NodeId) -> bool {
        tree.start_token(node) == tree.end_token(node) && tree.head_word(node) == self.hyphen
    }

    pub fn is_partitive_headword(&self, word: &str) -> bool {
        self.partitive_headwords.contains(&word.to_lowercase())
    }

    pub fn partitive_preposition(&self) -> &str {
        &self.partitive_preposition
    }

    pub fn is_person_pronoun(&self, word: &str) -> bool {
        self.person_pronouns.contains(&word.to_lowercase())
    }

    pub fn is_city_state_type(&self, type_name: &str) -> bool {
        self.city_state_types.contains(type_name)
    }

    /// The child that governs `node`, honoring the smart-head pairs.
    pub fn governing_head(&self, tree: &ParseTree, node: NodeId) -> Option<NodeId> {
        let head = tree.head(node)?;
        let head_index = tree.node(node).head_index();
        let skip = self.smart_heads.iter().any(|pair| {
            pair.parent_tag == tree.tag(node) && pair.head_tag == tree.tag(head)
        });
        if skip && head_index > 0 {
            return tree.children(node).get(head_index - 1).copied();
        }
        Some(head)
    }

    /// Climb while the node governs its parent and return the first parent
    /// it does not govern. `None` when the climb reaches the root.
    pub fn functional_parent(&self, tree: &ParseTree, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        while let Some(parent) = tree.parent(current) {
            if self.governing_head(tree, parent) != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Normalize a head word before model lookup.
    pub fn stem(&self, word: &str) -> String {
        word.to_lowercase()
    }
}

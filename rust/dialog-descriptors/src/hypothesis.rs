//! Mention-set hypotheses.
//!
//! A [`MentionSet`] is one complete interpretation of a sentence: a mention
//! record for every mention-bearing node of the parse tree plus a running
//! score. Hypotheses are plain owned values. Forking one is a `clone()`,
//! which copies every mention and shares only the immutable tree, so two
//! hypotheses can never observe each other's edits.

use std::sync::Arc;

use crate::{
    error::DecodeError,
    mention::{Mention, MentionId},
    tree::{NodeId, ParseTree},
};

#[derive(Debug, Clone)]
pub struct MentionSet {
    tree: Arc<ParseTree>,
    sentence: usize,
    mentions: Vec<Mention>,
    score: f64,
    name_score: f64,
}

impl MentionSet {
    /// One untyped, unlinked mention per mention-bearing node.
    pub fn new(tree: Arc<ParseTree>, sentence: usize) -> Self {
        let mentions = tree
            .mention_nodes()
            .iter()
            .enumerate()
            .map(|(index, &node)| Mention::new(MentionId(index), node))
            .collect();
        MentionSet {
            tree,
            sentence,
            mentions,
            score: 0.0,
            name_score: 0.0,
        }
    }

    pub fn tree(&self) -> &ParseTree {
        &self.tree
    }

    pub fn shared_tree(&self) -> Arc<ParseTree> {
        Arc::clone(&self.tree)
    }

    pub fn sentence(&self) -> usize {
        self.sentence
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn mentions(&self) -> impl Iterator<Item = &Mention> {
        self.mentions.iter()
    }

    pub fn mention(&self, id: MentionId) -> &Mention {
        &self.mentions[id.0]
    }

    pub fn mention_mut(&mut self, id: MentionId) -> &mut Mention {
        &mut self.mentions[id.0]
    }

    pub fn get(&self, id: MentionId) -> Option<&Mention> {
        self.mentions.get(id.0)
    }

    pub fn id_for_node(&self, node: NodeId) -> Option<MentionId> {
        self.tree.mention_index(node).map(MentionId)
    }

    pub fn mention_by_node(&self, node: NodeId) -> Option<&Mention> {
        self.id_for_node(node).map(|id| self.mention(id))
    }

    /// Cumulative description score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Credit `delta` to a mention and to the hypothesis as a whole.
    pub fn add_score(&mut self, id: MentionId, delta: f64) {
        self.mentions[id.0].score += delta;
        self.score += delta;
    }

    /// Score of the name theory the hypothesis was seeded with.
    pub fn name_score(&self) -> f64 {
        self.name_score
    }

    pub fn set_name_score(&mut self, score: f64) {
        self.name_score = score;
    }

    /// Make `child` the first and only child of `parent`.
    pub fn make_only_child_of(
        &mut self,
        child: MentionId,
        parent: MentionId,
    ) -> Result<(), DecodeError> {
        if child == parent {
            return Err(DecodeError::Structure(format!(
                "{child} cannot be its own child"
            )));
        }
        if let Some(existing) = self.mention(parent).child {
            return Err(DecodeError::Structure(format!(
                "{parent} already has child {existing}"
            )));
        }
        if let Some(existing) = self.mention(child).parent {
            return Err(DecodeError::Structure(format!(
                "{child} already belongs to {existing}"
            )));
        }
        self.mentions[parent.0].child = Some(child);
        self.mentions[child.0].parent = Some(parent);
        Ok(())
    }

    /// Append `next` after `previous` under the same parent.
    pub fn make_next_sibling_of(
        &mut self,
        next: MentionId,
        previous: MentionId,
    ) -> Result<(), DecodeError> {
        if next == previous {
            return Err(DecodeError::Structure(format!(
                "{next} cannot follow itself"
            )));
        }
        if let Some(existing) = self.mention(previous).next {
            return Err(DecodeError::Structure(format!(
                "{previous} is already followed by {existing}"
            )));
        }
        if let Some(existing) = self.mention(next).parent {
            return Err(DecodeError::Structure(format!(
                "{next} already belongs to {existing}"
            )));
        }
        let parent = self.mention(previous).parent;
        self.mentions[previous.0].next = Some(next);
        self.mentions[next.0].parent = parent;
        Ok(())
    }

    /// The children of a compound mention, in order.
    pub fn children_of(&self, id: MentionId) -> Vec<MentionId> {
        let mut children = Vec::new();
        let mut cursor = self.mention(id).child;
        while let Some(child) = cursor {
            if children.contains(&child) {
                break;
            }
            children.push(child);
            cursor = self.mention(child).next;
        }
        children
    }

    /// Check that parent, child and sibling links agree with each other.
    pub fn check_links(&self) -> Result<(), DecodeError> {
        let mut claimed = vec![None; self.mentions.len()];
        for mention in &self.mentions {
            for child in self.children_of(mention.id()) {
                if self.mention(child).parent != Some(mention.id()) {
                    return Err(DecodeError::Structure(format!(
                        "{child} is listed under {} but points elsewhere",
                        mention.id()
                    )));
                }
                if let Some(other) = claimed[child.0].replace(mention.id()) {
                    return Err(DecodeError::Structure(format!(
                        "{child} is claimed by both {other} and {}",
                        mention.id()
                    )));
                }
            }
        }
        for mention in &self.mentions {
            if let Some(parent) = mention.parent {
                if claimed[mention.id().0] != Some(parent) {
                    return Err(DecodeError::Structure(format!(
                        "{} points at {parent} but is not among its children",
                        mention.id()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mention::MentionType, rules::LanguageRules};
    use pretty_assertions::assert_eq;

    fn set(text: &str) -> MentionSet {
        let tree = ParseTree::parse(text, &LanguageRules::english()).unwrap();
        MentionSet::new(Arc::new(tree), 0)
    }

    const LIST: &str = "(NP (NP (NN cats)) (CC and) (NP (NN dogs)) (CC and) (NP (NN birds)))";

    #[test]
    fn one_mention_per_mention_node() {
        let set = set(LIST);
        assert_eq!(set.len(), 4);
        for mention in set.mentions() {
            assert_eq!(set.mention_by_node(mention.node()), Some(mention));
        }
    }

    #[test]
    fn linking_builds_consistent_chains() {
        let mut set = set(LIST);
        let (list, a, b, c) = (MentionId(0), MentionId(1), MentionId(2), MentionId(3));
        set.make_only_child_of(a, list).unwrap();
        set.make_next_sibling_of(b, a).unwrap();
        set.make_next_sibling_of(c, b).unwrap();
        assert_eq!(set.children_of(list), vec![a, b, c]);
        assert_eq!(set.mention(c).parent(), Some(list));
        set.check_links().unwrap();
    }

    #[test]
    fn relinking_is_a_structure_error() {
        let mut set = set(LIST);
        let (list, a, b) = (MentionId(0), MentionId(1), MentionId(2));
        set.make_only_child_of(a, list).unwrap();
        assert!(matches!(
            set.make_only_child_of(b, list),
            Err(DecodeError::Structure(_))
        ));
        assert!(matches!(
            set.make_only_child_of(a, b),
            Err(DecodeError::Structure(_))
        ));
        assert!(set.make_next_sibling_of(a, a).is_err());
    }

    #[test]
    fn clones_are_independent() {
        let original = set(LIST);
        let mut fork = original.clone();
        fork.mention_mut(MentionId(1))
            .set_mention_type(MentionType::Descriptor);
        fork.add_score(MentionId(1), -2.5);

        assert_eq!(original.mention(MentionId(1)).mention_type(), MentionType::None);
        assert_eq!(original.score(), 0.0);
        assert_eq!(fork.score(), -2.5);
        assert_eq!(fork.mention(MentionId(1)).score(), -2.5);
    }

    #[test]
    fn hypothesis_score_is_sum_of_mention_scores() {
        let mut set = set(LIST);
        set.add_score(MentionId(0), -1.0);
        set.add_score(MentionId(2), -0.5);
        set.add_score(MentionId(2), -0.25);
        let total: f64 = set.mentions().map(Mention::score).sum();
        assert_eq!(set.score(), total);
    }
}

//! The hypothesis search controller.
//!
//! [`TreeSearch`] holds the live leaves between a reset and a commit and
//! applies one classification step at a time to every leaf at a given
//! parse-tree node. In branching mode each leaf may fork, and the forks of
//! all leaves compete for the bounded set of next leaves. In in-place mode
//! each leaf is edited directly and never forks.

use tracing::debug;

use crate::{
    classifier::{Classified, Classifier, Solution},
    error::DecodeError,
    hypothesis::MentionSet,
    ranked::{Admission, TopK},
    store::LeafStore,
    tree::NodeId,
};

/// Most alternatives requested from a step for a single leaf.
pub const BRANCH_CAP: usize = 10;

#[derive(Debug, Default)]
pub struct TreeSearch {
    branching: bool,
    store: LeafStore,
}

impl TreeSearch {
    pub fn new(branching: bool) -> Self {
        TreeSearch {
            branching,
            store: LeafStore::default(),
        }
    }

    pub fn is_branching(&self) -> bool {
        self.branching
    }

    /// Start a search from a single hypothesis.
    pub fn reset(&mut self, root: MentionSet, capacity: usize) -> Result<(), DecodeError> {
        self.store.reset(vec![root], capacity)
    }

    /// Resume a search from previously committed leaves.
    pub fn reset_with_leaves(
        &mut self,
        leaves: Vec<MentionSet>,
        capacity: usize,
    ) -> Result<(), DecodeError> {
        self.store.reset(leaves, capacity)
    }

    pub fn leaves(&self) -> &[MentionSet] {
        self.store.leaves()
    }

    /// Run `classifier` on the mention at `node` in every live leaf.
    ///
    /// A failed step leaves the search empty.
    pub fn apply(&mut self, node: NodeId, classifier: &dyn Classifier) -> Result<(), DecodeError> {
        if self.branching {
            self.apply_branching(node, classifier)
        } else {
            self.apply_in_place(node, classifier)
        }
    }

    fn apply_in_place(
        &mut self,
        node: NodeId,
        classifier: &dyn Classifier,
    ) -> Result<(), DecodeError> {
        for leaf in self.store.leaves_mut() {
            let mention = leaf.id_for_node(node).ok_or(DecodeError::NoMention { node })?;
            match classifier.classify(Solution::InPlace(&mut *leaf), mention, BRANCH_CAP)? {
                Classified::InPlace { .. } => {}
                Classified::Branches(branches) => {
                    let first = branches.into_iter().next().ok_or(DecodeError::NoResults {
                        classifier: classifier.name(),
                    })?;
                    *leaf = first.solution;
                }
            }
        }
        Ok(())
    }

    fn apply_branching(
        &mut self,
        node: NodeId,
        classifier: &dyn Classifier,
    ) -> Result<(), DecodeError> {
        let leaves = self.store.take();
        let mut working = TopK::new(self.store.capacity());

        for leaf in &leaves {
            let mention = leaf.id_for_node(node).ok_or(DecodeError::NoMention { node })?;
            let branches = match classifier.classify(Solution::Branching(leaf), mention, BRANCH_CAP)? {
                Classified::Branches(branches) if !branches.is_empty() => branches,
                Classified::Branches(_) => {
                    return Err(DecodeError::NoResults {
                        classifier: classifier.name(),
                    });
                }
                Classified::InPlace { .. } => {
                    return Err(DecodeError::InPlaceWhileBranching {
                        classifier: classifier.name(),
                    });
                }
            };

            for branch in branches.into_iter().take(BRANCH_CAP) {
                let score = branch.solution.score();
                match working.insert(score, branch.solution) {
                    Admission::Admitted => {}
                    Admission::Evicted(evicted) => {
                        debug!(
                            classifier = classifier.name(),
                            score = evicted.score(),
                            "evicted hypothesis"
                        );
                    }
                    Admission::Rejected(_) => {
                        debug!(classifier = classifier.name(), score, "discarded hypothesis");
                    }
                }
            }
        }

        self.store.replace(working.into_items());
        Ok(())
    }

    /// Hand every live leaf to the caller, best first. A second commit
    /// without a reset returns nothing.
    pub fn commit(&mut self) -> Vec<MentionSet> {
        self.store.take()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Arc};

    use super::*;
    use crate::{
        entity::EntityType,
        mention::{MentionId, MentionType},
        rules::LanguageRules,
        tree::ParseTree,
    };
    use pretty_assertions::assert_eq;

    fn root() -> MentionSet {
        let tree = ParseTree::parse(
            "(S (NP (NN bank)) (VP (VBD hired) (NP (NN staff))))",
            &LanguageRules::english(),
        )
        .unwrap();
        MentionSet::new(Arc::new(tree), 0)
    }

    fn mention_node(set: &MentionSet, index: usize) -> NodeId {
        set.mention(MentionId(index)).node()
    }

    /// Proposes a fixed list of scored types for every mention.
    struct Fixed {
        candidates: Vec<(f64, &'static str)>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn new(candidates: &[(f64, &'static str)]) -> Self {
            Fixed {
                candidates: candidates.to_vec(),
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn classify(
            &self,
            solution: Solution<'_>,
            mention: MentionId,
            max_results: usize,
        ) -> Result<Classified, DecodeError> {
            self.calls.set(self.calls.get() + 1);
            solution.apply_ranked(
                mention,
                self.candidates.iter().copied(),
                max_results,
                |set, name| {
                    let target = set.mention_mut(mention);
                    target.set_mention_type(MentionType::Descriptor);
                    target.set_entity_type(EntityType::new(name));
                    Ok(())
                },
            )
        }
    }

    struct Silent;

    impl Classifier for Silent {
        fn name(&self) -> &'static str {
            "silent"
        }

        fn classify(
            &self,
            _solution: Solution<'_>,
            _mention: MentionId,
            _max_results: usize,
        ) -> Result<Classified, DecodeError> {
            Ok(Classified::Branches(Vec::new()))
        }
    }

    fn types_of(leaves: &[MentionSet], index: usize) -> Vec<String> {
        leaves
            .iter()
            .map(|leaf| leaf.mention(MentionId(index)).entity_type().to_string())
            .collect()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut search = TreeSearch::new(true);
        assert_eq!(search.reset(root(), 0), Err(DecodeError::ZeroCapacity));
    }

    #[test]
    fn branching_keeps_best_forks_in_score_order() {
        let start = root();
        let (first, second) = (mention_node(&start, 0), mention_node(&start, 1));
        let mut search = TreeSearch::new(true);
        search.reset(start, 3).unwrap();

        search
            .apply(first, &Fixed::new(&[(-1.0, "ORG"), (-2.0, "FAC")]))
            .unwrap();
        assert_eq!(search.leaves().len(), 2);

        search
            .apply(second, &Fixed::new(&[(-0.5, "PER"), (-3.0, "OTH")]))
            .unwrap();
        let leaves = search.commit();
        let scores: Vec<f64> = leaves.iter().map(MentionSet::score).collect();
        assert_eq!(scores, vec![-1.5, -2.5, -4.0]);
        assert_eq!(types_of(&leaves, 0), vec!["ORG", "FAC", "ORG"]);
        assert_eq!(types_of(&leaves, 1), vec!["PER", "PER", "OTH"]);
    }

    #[test]
    fn forks_that_outrank_nothing_at_capacity_are_discarded() {
        let start = root();
        let node = mention_node(&start, 0);
        let mut search = TreeSearch::new(true);
        search.reset(start, 2).unwrap();

        search
            .apply(node, &Fixed::new(&[(-1.0, "ORG"), (-2.0, "FAC"), (-9.0, "GPE")]))
            .unwrap();
        assert_eq!(types_of(search.leaves(), 0), vec!["ORG", "FAC"]);
    }

    #[test]
    fn in_place_edits_each_leaf_without_forking() {
        let start = root();
        let node = mention_node(&start, 0);
        let mut search = TreeSearch::new(false);
        search.reset(start, 1).unwrap();

        let classifier = Fixed::new(&[(-1.0, "ORG"), (-2.0, "FAC")]);
        search.apply(node, &classifier).unwrap();
        assert_eq!(classifier.calls.get(), 1);
        assert_eq!(search.leaves().len(), 1);
        assert_eq!(types_of(search.leaves(), 0), vec!["ORG"]);
        assert_eq!(search.leaves()[0].score(), -1.0);
    }

    #[test]
    fn empty_result_is_fatal_in_both_modes() {
        for branching in [true, false] {
            let start = root();
            let node = mention_node(&start, 0);
            let mut search = TreeSearch::new(branching);
            search.reset(start, 2).unwrap();
            assert_eq!(
                search.apply(node, &Silent),
                Err(DecodeError::NoResults {
                    classifier: "silent"
                })
            );
        }
    }

    #[test]
    fn node_without_mention_is_fatal() {
        let start = root();
        let root_node = start.tree().root();
        let mut search = TreeSearch::new(false);
        search.reset(start, 1).unwrap();
        assert_eq!(
            search.apply(root_node, &Fixed::new(&[(0.0, "ORG")])),
            Err(DecodeError::NoMention { node: root_node })
        );
    }

    #[test]
    fn second_commit_is_empty() {
        let mut search = TreeSearch::new(true);
        search.reset(root(), 4).unwrap();
        assert_eq!(search.commit().len(), 1);
        assert!(search.commit().is_empty());
        assert!(search.leaves().is_empty());
    }

    #[test]
    fn reset_with_leaves_resumes_from_prior_results() {
        let mut search = TreeSearch::new(true);
        search
            .reset_with_leaves(vec![root(), root(), root()], 2)
            .unwrap();
        assert_eq!(search.leaves().len(), 2);
    }
}

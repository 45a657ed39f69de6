use tracing::debug;

use crate::{
    classifier::{Classified, Classifier, Solution},
    error::DecodeError,
    mention::{MentionId, MentionType},
    rules::LanguageRules,
    scoring::{DescriptorContext, DescriptorScorer},
};

/// Types bare descriptors with the descriptor model.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorStep<'a> {
    pub rules: &'a LanguageRules,
    pub scorer: &'a DescriptorScorer,
}

impl Classifier for DescriptorStep<'_> {
    fn name(&self) -> &'static str {
        "descriptor"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        let node = set.mention(mention).node();
        if set.mention(mention).is_populated() || self.rules.is_nominal_premod(set.tree(), node) {
            return Ok(solution.unchanged());
        }

        let context = DescriptorContext::extract(set.tree(), node, self.rules);
        let ranked = self.scorer.rank(&context, max_results)?;
        debug!(%mention, head = %context.head_word, candidates = ranked.len(), "classified descriptor");

        solution.apply_ranked(
            mention,
            ranked.into_vec().into_iter().map(|entry| (entry.score, entry.item)),
            max_results,
            |set, entity_type| {
                let descriptor = set.mention_mut(mention);
                descriptor.set_mention_type(MentionType::Descriptor);
                descriptor.set_entity_type(entity_type);
                Ok(())
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        entity::EntityTypes,
        scoring::{MultinomialModel, NULL_CONTEXT, ProbTable, Smoothing},
        steps::testing::{find, fork, mark, run, set},
    };
    use pretty_assertions::assert_eq;

    fn scorer() -> DescriptorScorer {
        let mut prior = ProbTable::new(2, Smoothing::None);
        for (name, p) in [("ORG", 0.5), ("FAC", 0.3), ("PER", 0.2)] {
            prior.insert(&[NULL_CONTEXT, name], p, 100.0, 0.0);
        }
        let model = MultinomialModel::new(
            prior,
            ProbTable::new(2, Smoothing::WittenBell),
            ProbTable::new(3, Smoothing::None),
            ProbTable::new(2, Smoothing::None),
            ProbTable::new(2, Smoothing::WittenBell),
        );
        DescriptorScorer::new(model, Arc::new(EntityTypes::ace()))
    }

    #[test]
    fn branching_yields_one_fork_per_candidate() {
        let (rules, scorer) = (LanguageRules::english(), scorer());
        let step = DescriptorStep {
            rules: &rules,
            scorer: &scorer,
        };
        let set = set("(NP (NN^ bank))");
        let branches = fork(&step, &set, "bank");
        let types: Vec<&str> = branches
            .iter()
            .map(|b| b.solution.mention(find(&b.solution, "bank")).entity_type().name())
            .collect();
        assert_eq!(types, vec!["ORG", "FAC", "PER"]);
        assert_eq!(branches[0].solution.score(), 0.5f64.ln());
        assert!(
            branches
                .iter()
                .all(|b| b.solution.mention(find(&b.solution, "bank")).mention_type()
                    == MentionType::Descriptor)
        );
    }

    #[test]
    fn in_place_takes_the_best_type() {
        let (rules, scorer) = (LanguageRules::english(), scorer());
        let step = DescriptorStep {
            rules: &rules,
            scorer: &scorer,
        };
        let mut set = set("(NP (NN^ bank))");
        run(&step, &mut set, "bank");
        assert_eq!(set.mention(find(&set, "bank")).entity_type().name(), "ORG");
        assert_eq!(set.score(), 0.5f64.ln());
    }

    #[test]
    fn names_and_premods_pass_through() {
        let (rules, scorer) = (LanguageRules::english(), scorer());
        let step = DescriptorStep {
            rules: &rules,
            scorer: &scorer,
        };
        let mut set = set("(NP (NN steel) (NN^ company))");
        mark(&mut set, "steel company", MentionType::Name, "GPE");
        run(&step, &mut set, "steel company");
        run(&step, &mut set, "steel");
        assert_eq!(set.mention(find(&set, "steel")).mention_type(), MentionType::None);
        assert_eq!(
            set.mention(find(&set, "steel company")).entity_type().name(),
            "GPE"
        );
        assert_eq!(set.score(), 0.0);
    }
}

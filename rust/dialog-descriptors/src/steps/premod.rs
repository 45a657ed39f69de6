use crate::{
    classifier::{Classified, Classifier, Solution},
    entity::EntityTypes,
    error::DecodeError,
    mention::{MentionId, MentionType},
    rules::LanguageRules,
    scoring::{DescriptorContext, DescriptorScorer},
};

/// Types nominal premodifiers such as "steel" in "steel company". An
/// *other* verdict leaves the premodifier without a mention type.
#[derive(Debug, Clone, Copy)]
pub struct PremodStep<'a> {
    pub rules: &'a LanguageRules,
    pub types: &'a EntityTypes,
    pub scorer: Option<&'a DescriptorScorer>,
}

impl Classifier for PremodStep<'_> {
    fn name(&self) -> &'static str {
        "nominal-premod"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        let node = set.mention(mention).node();
        let Some(scorer) = self.scorer else {
            return Ok(solution.unchanged());
        };
        if set.mention(mention).is_populated()
            || set.mention(mention).entity_type().is_determined()
            || !self.rules.is_nominal_premod(set.tree(), node)
        {
            return Ok(solution.unchanged());
        }

        let context = DescriptorContext::extract(set.tree(), node, self.rules);
        let ranked = scorer.rank(&context, max_results)?;
        let other = self.types.other();

        solution.apply_ranked(
            mention,
            ranked.into_vec().into_iter().map(|entry| (entry.score, entry.item)),
            max_results,
            |set, entity_type| {
                let premod = set.mention_mut(mention);
                if &entity_type != other {
                    premod.set_mention_type(MentionType::Descriptor);
                }
                premod.set_entity_type(entity_type);
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
        scoring::{MultinomialModel, NULL_CONTEXT, ProbTable, Smoothing},
        steps::testing::{find, run, set},
    };
    use pretty_assertions::assert_eq;

    fn scorer(priors: &[(&str, f64)]) -> DescriptorScorer {
        let mut prior = ProbTable::new(2, Smoothing::None);
        for &(name, p) in priors {
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

    const PHRASE: &str = "(NP (NNP Boston) (NN^ company))";

    #[test]
    fn premodifier_becomes_a_descriptor() {
        let (rules, types, scorer) = (
            LanguageRules::english(),
            EntityTypes::ace(),
            scorer(&[("GPE", 0.7), ("OTH", 0.3)]),
        );
        let step = PremodStep {
            rules: &rules,
            types: &types,
            scorer: Some(&scorer),
        };
        let mut set = set(PHRASE);
        run(&step, &mut set, "Boston");
        let boston = set.mention(find(&set, "Boston"));
        assert_eq!(boston.mention_type(), MentionType::Descriptor);
        assert_eq!(boston.entity_type().name(), "GPE");
    }

    #[test]
    fn other_verdict_keeps_the_premodifier_untyped() {
        let (rules, types, scorer) = (
            LanguageRules::english(),
            EntityTypes::ace(),
            scorer(&[("OTH", 0.9), ("GPE", 0.1)]),
        );
        let step = PremodStep {
            rules: &rules,
            types: &types,
            scorer: Some(&scorer),
        };
        let mut set = set(PHRASE);
        run(&step, &mut set, "Boston");
        let boston = set.mention(find(&set, "Boston"));
        assert_eq!(boston.mention_type(), MentionType::None);
        assert_eq!(boston.entity_type().name(), "OTH");
    }

    #[test]
    fn heads_and_unconfigured_models_pass_through() {
        let (rules, types, scorer) = (
            LanguageRules::english(),
            EntityTypes::ace(),
            scorer(&[("GPE", 1.0)]),
        );
        let with_model = PremodStep {
            rules: &rules,
            types: &types,
            scorer: Some(&scorer),
        };
        let without = PremodStep {
            scorer: None,
            ..with_model
        };

        let mut set = set(PHRASE);
        run(&with_model, &mut set, "Boston company");
        run(&without, &mut set, "Boston");
        assert!(set.mentions().all(|m| m.mention_type() == MentionType::None));
    }
}

use crate::{
    classifier::{Classified, Classifier, Solution},
    entity::{EntityType, EntityTypes},
    error::DecodeError,
    mention::{Mention, MentionId, MentionType},
    rules::LanguageRules,
    scoring::PronounModel,
};

/// Marks pronoun mentions. First-person pronouns are persons outright;
/// other pronouns are ranked by the pronoun model when there is one and
/// otherwise left undetermined for coreference to settle.
#[derive(Debug, Clone, Copy)]
pub struct PronounStep<'a> {
    pub rules: &'a LanguageRules,
    pub types: &'a EntityTypes,
    pub model: Option<&'a PronounModel>,
}

impl Classifier for PronounStep<'_> {
    fn name(&self) -> &'static str {
        "pronoun"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        let tree = set.tree();
        let node = set.mention(mention).node();
        if set.mention(mention).is_populated() || !self.rules.is_pronoun_node(tree, node) {
            return Ok(solution.unchanged());
        }

        let word = tree.head_word(node);
        if self.rules.is_person_pronoun(word) {
            let person = self.types.person().clone();
            return solution.apply(|set| {
                mark_pronoun(set.mention_mut(mention), person);
                Ok(())
            });
        }

        let ranked = self.model.map(|model| {
            let parent = self
                .rules
                .functional_parent(tree, node)
                .map(|parent| tree.head_word(parent));
            model.rank(word, parent, self.types, max_results)
        });
        match ranked {
            Some(ranked) if !ranked.is_empty() => solution.apply_ranked(
                mention,
                ranked.into_vec().into_iter().map(|entry| (entry.score, entry.item)),
                max_results,
                |set, entity_type| {
                    mark_pronoun(set.mention_mut(mention), entity_type);
                    Ok(())
                },
            ),
            _ => solution.apply(|set| {
                mark_pronoun(set.mention_mut(mention), EntityType::undetermined());
                Ok(())
            }),
        }
    }
}

fn mark_pronoun(mention: &mut Mention, entity_type: EntityType) {
    mention.set_mention_type(MentionType::Pronoun);
    mention.set_entity_type(entity_type);
}

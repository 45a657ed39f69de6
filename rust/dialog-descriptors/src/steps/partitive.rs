use tracing::debug;

use crate::{
    classifier::{Classified, Classifier, Solution},
    compound::CompoundMentionFinder,
    error::DecodeError,
    mention::{MentionId, MentionType},
};

/// Marks "some of the workers" as a partitive over its whole.
#[derive(Debug, Clone, Copy)]
pub struct PartitiveStep<'a> {
    pub finder: &'a CompoundMentionFinder,
}

impl Classifier for PartitiveStep<'_> {
    fn name(&self) -> &'static str {
        "partitive"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        _max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        if set.mention(mention).is_populated() {
            return Ok(solution.unchanged());
        }
        let Some(whole) = self.finder.partitive_whole(set, mention) else {
            return Ok(solution.unchanged());
        };

        // A parse that already linked either side is left alone.
        if set.mention(mention).child().is_some() || set.mention(whole).parent().is_some() {
            debug!(%mention, %whole, "skipping partitive with an occupied link");
            return Ok(solution.unchanged());
        }

        solution.apply(|set| {
            let entity_type = set.mention(whole).entity_type().clone();
            let part = set.mention_mut(mention);
            part.set_mention_type(MentionType::Partitive);
            part.set_entity_type(entity_type);
            set.make_only_child_of(whole, mention)
        })
    }
}

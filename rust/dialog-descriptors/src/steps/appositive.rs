use crate::{
    classifier::{Classified, Classifier, Solution},
    compound::CompoundMentionFinder,
    error::DecodeError,
    mention::{MentionId, MentionType},
};

/// Links "the mayor, John Smith" into one appositive mention.
#[derive(Debug, Clone, Copy)]
pub struct AppositiveStep<'a> {
    pub finder: &'a CompoundMentionFinder,
}

impl Classifier for AppositiveStep<'_> {
    fn name(&self) -> &'static str {
        "appositive"
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
        let Some(members) = self.finder.appositive_members(set, mention) else {
            return Ok(solution.unchanged());
        };

        solution.apply(|set| {
            self.finder.coerce_appositive(set, members);
            let typed_by = members
                .iter()
                .copied()
                .find(|&member| set.mention(member).mention_type() == MentionType::Name)
                .unwrap_or(members[0]);
            let entity_type = set.mention(typed_by).entity_type().clone();

            let appositive = set.mention_mut(mention);
            appositive.set_mention_type(MentionType::Appositive);
            appositive.set_entity_type(entity_type);
            set.make_only_child_of(members[0], mention)?;
            set.make_next_sibling_of(members[1], members[0])
        })
    }
}

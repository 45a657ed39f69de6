use crate::{
    classifier::{Classified, Classifier, Solution},
    compound::CompoundMentionFinder,
    error::DecodeError,
    mention::{MentionId, MentionType},
};

/// Links coordinated mentions under a list mention typed like its first
/// member.
#[derive(Debug, Clone, Copy)]
pub struct ListStep<'a> {
    pub finder: &'a CompoundMentionFinder,
}

impl Classifier for ListStep<'_> {
    fn name(&self) -> &'static str {
        "list"
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
        let Some(members) = self.finder.list_members(set, mention) else {
            return Ok(solution.unchanged());
        };

        solution.apply(|set| {
            let entity_type = set.mention(members[0]).entity_type().clone();
            let list = set.mention_mut(mention);
            list.set_mention_type(MentionType::List);
            list.set_entity_type(entity_type);

            set.make_only_child_of(members[0], mention)?;
            for pair in members.windows(2) {
                set.make_next_sibling_of(pair[1], pair[0])?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        lexicon::TypeMap,
        rules::LanguageRules,
        steps::testing::{find, fork, mark, set},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn members_are_chained_in_order() {
        let finder =
            CompoundMentionFinder::new(Arc::new(LanguageRules::english()), TypeMap::default());
        let step = ListStep { finder: &finder };
        let mut set = set("(NP (NP (NNS^ cats)) (, ,) (NP (NNS^ dogs)) (CC and) (NP^ (NNS^ birds)))");
        mark(&mut set, "cats", MentionType::Descriptor, "OTH");

        let branches = fork(&step, &set, "cats , dogs and birds");
        let forked = &branches[0].solution;
        let list = find(forked, "cats , dogs and birds");
        assert_eq!(forked.mention(list).mention_type(), MentionType::List);
        assert_eq!(forked.mention(list).entity_type().name(), "OTH");
        assert_eq!(
            forked.children_of(list),
            vec![find(forked, "cats"), find(forked, "dogs"), find(forked, "birds")]
        );
        forked.check_links().unwrap();
        assert!(set.children_of(list).is_empty());
    }
}

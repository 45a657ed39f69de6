use tracing::trace;

use crate::{
    classifier::{Classified, Classifier, Solution},
    compound::CompoundMentionFinder,
    error::DecodeError,
    mention::{MentionId, MentionType},
};

/// Promotes a noun phrase headed by a name to a name mention and hangs the
/// name under it.
#[derive(Debug, Clone, Copy)]
pub struct NestedStep<'a> {
    pub finder: &'a CompoundMentionFinder,
}

impl Classifier for NestedStep<'_> {
    fn name(&self) -> &'static str {
        "nested"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        _max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        let outer = set.mention(mention);
        if outer.is_populated() || outer.child().is_some() {
            return Ok(solution.unchanged());
        }
        let Some(nested) = self.finder.nested_mention(set, mention) else {
            return Ok(solution.unchanged());
        };
        if set.mention(nested).mention_type() != MentionType::Name {
            return Ok(solution.unchanged());
        }

        let mut top = nested;
        while let Some(parent) = set.mention(top).parent() {
            top = parent;
        }
        if top == mention {
            return Ok(solution.unchanged());
        }
        trace!(%mention, name = %top, "nested name");

        solution.apply(|set| {
            let entity_type = set.mention(top).entity_type().clone();
            let subtype = set.mention(top).subtype().cloned();
            let outer = set.mention_mut(mention);
            outer.set_mention_type(MentionType::Name);
            outer.set_entity_type(entity_type);
            outer.set_subtype(subtype);
            set.make_only_child_of(top, mention)
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
        steps::testing::{find, mark, run, set},
    };
    use pretty_assertions::assert_eq;

    fn finder() -> CompoundMentionFinder {
        CompoundMentionFinder::new(Arc::new(LanguageRules::english()), TypeMap::default())
    }

    #[test]
    fn name_chain_is_hung_under_the_outer_phrase() {
        let finder = finder();
        let step = NestedStep { finder: &finder };
        let mut set = set("(NP (NPA^ (DT the) (NPP^ (NNP^ Senate))))");
        mark(&mut set, "Senate", MentionType::Name, "ORG");
        let ids: Vec<MentionId> = set.mentions().map(|m| m.id()).collect();
        let (outer, middle, name) = (ids[0], ids[1], find(&set, "Senate"));

        step.classify(Solution::InPlace(&mut set), middle, 10).unwrap();
        assert_eq!(set.mention(middle).mention_type(), MentionType::Name);
        assert_eq!(set.mention(name).parent(), Some(middle));

        step.classify(Solution::InPlace(&mut set), outer, 10).unwrap();
        assert_eq!(set.mention(outer).entity_type().name(), "ORG");
        assert_eq!(set.mention(middle).parent(), Some(outer));
        set.check_links().unwrap();
    }

    #[test]
    fn descriptor_heads_are_not_nested_names() {
        let finder = finder();
        let step = NestedStep { finder: &finder };
        let mut set = set("(NP (NP^ (DT the) (NN^ bank)) (PP (IN^ in) (NP (NN^ town))))");
        mark(&mut set, "the bank", MentionType::Descriptor, "ORG");
        run(&step, &mut set, "the bank in town");
        assert_eq!(
            set.mention(find(&set, "the bank in town")).mention_type(),
            MentionType::None
        );
    }
}

use crate::{
    classifier::{Classified, Classifier, Solution},
    entity::{EntitySubtype, EntityTypes},
    error::DecodeError,
    hypothesis::MentionSet,
    lexicon::SubtypeLexicon,
    mention::{MentionId, MentionType},
    rules::LanguageRules,
};

const GROUP: &str = "Group";

/// Assigns subtypes from the subtype lexicons. Mentions that already have
/// a subtype, or whose type is not a recognized entity type, are left
/// alone.
#[derive(Debug, Clone, Copy)]
pub struct SubtypeStep<'a> {
    pub rules: &'a LanguageRules,
    pub types: &'a EntityTypes,
    pub lexicon: &'a SubtypeLexicon,
}

impl SubtypeStep<'_> {
    fn find(&self, set: &MentionSet, mention: MentionId) -> Option<EntitySubtype> {
        let current = set.mention(mention);
        match current.mention_type() {
            MentionType::Descriptor => self.for_descriptor(set, mention),
            MentionType::Name | MentionType::Nested => self.for_name(set, mention),
            MentionType::Partitive | MentionType::Appositive => {
                let child = set.mention(current.child()?);
                child
                    .subtype()
                    .filter(|subtype| subtype.parent() == current.entity_type())
                    .cloned()
            }
            MentionType::None | MentionType::Pronoun | MentionType::List => None,
        }
    }

    fn for_descriptor(&self, set: &MentionSet, mention: MentionId) -> Option<EntitySubtype> {
        let tree = set.tree();
        let current = set.mention(mention);
        let entity_type = current.entity_type();
        let head = tree.head_word(current.node());
        let heads = &self.lexicon.descriptor_heads;

        heads
            .lookup(head, entity_type)
            .or_else(|| heads.lookup(&self.rules.stem(head), entity_type))
            .cloned()
            .or_else(|| {
                if entity_type == self.types.person() && self.rules.has_plural_head(tree, current.node()) {
                    self.types.subtype_of(entity_type, GROUP).cloned()
                } else {
                    None
                }
            })
    }

    fn for_name(&self, set: &MentionSet, mention: MentionId) -> Option<EntitySubtype> {
        let tree = set.tree();
        let entity_type = set.mention(mention).entity_type();

        let mut innermost = mention;
        while let Some(child) = set.mention(innermost).child() {
            innermost = child;
        }
        let node = set.mention(innermost).node();

        let full_name = tree.text(node);
        if let Some(subtype) = self.lexicon.full_names.lookup(&full_name, entity_type) {
            return Some(subtype.clone());
        }

        let words: Vec<&str> = tree
            .children(node)
            .iter()
            .map(|&child| tree.head_word(child))
            .collect();
        words
            .iter()
            .find_map(|word| self.lexicon.name_words.lookup(word, entity_type))
            .or_else(|| {
                words.iter().find_map(|word| {
                    self.lexicon
                        .descriptor_heads
                        .lookup(&self.rules.stem(word), entity_type)
                })
            })
            .cloned()
    }
}

impl Classifier for SubtypeStep<'_> {
    fn name(&self) -> &'static str {
        "subtype"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        _max_results: usize,
    ) -> Result<Classified, DecodeError> {
        let set = solution.view();
        let current = set.mention(mention);
        if !self.types.is_recognized(current.entity_type()) || current.subtype().is_some() {
            return Ok(solution.unchanged());
        }
        let Some(subtype) = self.find(set, mention) else {
            return Ok(solution.unchanged());
        };
        solution.apply(|set| {
            set.mention_mut(mention).set_subtype(Some(subtype));
            Ok(())
        })
    }
}

//! Finding the members of compound mentions.
//!
//! These are pure tree queries over one hypothesis: each returns the
//! mentions that would make up a partitive, appositive, list or nested
//! construction rooted at a given mention, or `None` when the node does
//! not have that shape. The steps in [`crate::steps`] decide what to do
//! with the answer. The one exception is [`CompoundMentionFinder::coerce_appositive`],
//! which reconciles the types of two appositive members in place.

use std::sync::Arc;

use crate::{
    hypothesis::MentionSet,
    lexicon::TypeMap,
    mention::{MentionId, MentionType},
    rules::LanguageRules,
};

#[derive(Debug, Clone)]
pub struct CompoundMentionFinder {
    rules: Arc<LanguageRules>,
    descriptor_types: TypeMap,
}

impl CompoundMentionFinder {
    pub fn new(rules: Arc<LanguageRules>, descriptor_types: TypeMap) -> Self {
        CompoundMentionFinder {
            rules,
            descriptor_types,
        }
    }

    pub fn rules(&self) -> &LanguageRules {
        &self.rules
    }

    /// The whole of a partitive such as "some of the workers": the head is
    /// a partitive word and its only PP is headed by `of` and ends in a
    /// mention.
    pub fn partitive_whole(&self, set: &MentionSet, mention: MentionId) -> Option<MentionId> {
        let tree = set.tree();
        let node = set.mention(mention).node();
        if !self.rules.is_partitive_headword(tree.head_word(node)) {
            return None;
        }

        let mut prepositions = tree
            .children(node)
            .iter()
            .copied()
            .filter(|&child| self.rules.is_prepositional(tree, child));
        let pp = prepositions.next()?;
        if prepositions.next().is_some() {
            return None;
        }
        if !tree
            .head_word(pp)
            .eq_ignore_ascii_case(self.rules.partitive_preposition())
        {
            return None;
        }

        let last = *tree.children(pp).last()?;
        set.id_for_node(last)
    }

    /// The two members of an appositive such as "the mayor, John Smith".
    pub fn appositive_members(&self, set: &MentionSet, mention: MentionId) -> Option<[MentionId; 2]> {
        let tree = set.tree();
        let node = set.mention(mention).node();

        let (mut conjunctions, mut commas, mut names) = (0, 0, 0);
        let mut members = Vec::new();
        for &child in tree.children(node) {
            if self.rules.is_conjunction(tree, child) {
                conjunctions += 1;
            } else if self.rules.is_comma(tree, child) {
                commas += 1;
            } else if let Some(id) = set.id_for_node(child) {
                names += count_names(set, id);
                members.push(id);
            }
        }
        if members.len() != 2 || commas == 0 || conjunctions > 0 || names > 1 {
            return None;
        }
        let [first, second] = [members[0], members[1]];

        // "X, as well as Y"
        let second_node = set.mention(second).node();
        if let Some(&lead) = tree.children(second_node).first() {
            let lead_children = tree.children(lead);
            if self.rules.is_conjunction_phrase(tree, lead)
                && lead_children.len() == 3
                && tree.head_word(lead_children[0]).eq_ignore_ascii_case("as")
                && tree.head_word(lead_children[1]).eq_ignore_ascii_case("well")
            {
                return None;
            }
        }

        let (a, b) = (set.mention(first), set.mention(second));
        if a.entity_type() == b.entity_type() {
            return Some([first, second]);
        }
        let kinds = (a.mention_type(), b.mention_type());
        match kinds {
            (MentionType::Pronoun, _) | (_, MentionType::Pronoun) => Some([first, second]),
            (MentionType::Name, MentionType::Descriptor)
            | (MentionType::Descriptor, MentionType::Name) => Some([first, second]),
            _ => None,
        }
    }

    /// Reconcile clashing appositive member types: a pronoun takes its
    /// partner's type, and a descriptor takes the name's type when its
    /// head word can denote that type.
    pub fn coerce_appositive(&self, set: &mut MentionSet, members: [MentionId; 2]) {
        let [first, second] = members;
        if set.mention(first).entity_type() == set.mention(second).entity_type() {
            return;
        }

        if set.mention(first).mention_type() == MentionType::Pronoun {
            copy_type(set, second, first);
        } else if set.mention(second).mention_type() == MentionType::Pronoun {
            copy_type(set, first, second);
        }

        let (name, descriptor) = match (
            set.mention(first).mention_type(),
            set.mention(second).mention_type(),
        ) {
            (MentionType::Name, MentionType::Descriptor) => (first, second),
            (MentionType::Descriptor, MentionType::Name) => (second, first),
            _ => return,
        };
        let head = set.tree().head_word(set.mention(descriptor).node());
        if self
            .descriptor_types
            .licenses(head, set.mention(name).entity_type())
        {
            copy_type(set, name, descriptor);
        }
    }

    /// The members of a coordination such as "cats, dogs and birds".
    pub fn list_members(&self, set: &MentionSet, mention: MentionId) -> Option<Vec<MentionId>> {
        let tree = set.tree();
        let node = set.mention(mention).node();
        let children = tree.children(node);

        let (mut conjunctions, mut commas, mut hyphens) = (0, 0, 0);
        let mut members = Vec::new();
        for &child in children {
            if self.rules.is_conjunction(tree, child) || self.rules.is_conjunction_phrase(tree, child) {
                conjunctions += 1;
            } else if self.rules.is_comma(tree, child) {
                commas += 1;
            } else if let Some(id) = set.id_for_node(child) {
                members.push(id);
            } else if self.rules.is_hyphen(tree, child) {
                hyphens += 1;
            }
        }

        // "British - US relations"
        if hyphens == 1 && children.len() == 3 && members.len() == 2 {
            let joined = set.id_for_node(children[0]).is_some()
                && self.rules.is_hyphen(tree, children[1])
                && set.id_for_node(children[2]).is_some();
            if joined
                && members
                    .iter()
                    .all(|&id| set.mention(id).mention_type() == MentionType::Name)
            {
                return Some(members);
            }
        }

        if members.len() < 2 || conjunctions + commas == 0 {
            return None;
        }
        let found = members.len();
        members.truncate(self.rules.max_list_members());

        // "Paris, Texas" is a single place.
        let city_state = members.len() == 2
            && found == 2
            && conjunctions == 0
            && commas > 0
            && members.iter().all(|&id| {
                let member = set.mention(id);
                member.mention_type() == MentionType::Name
                    && self.rules.is_name_node(tree, member.node())
                    && self.rules.is_city_state_type(member.entity_type().name())
            });
        if city_state {
            return None;
        }
        Some(members)
    }

    /// The mention reached through the head of `mention`, looking one level
    /// further for a name that heads it on its own.
    pub fn nested_mention(&self, set: &MentionSet, mention: MentionId) -> Option<MentionId> {
        let tree = set.tree();
        let node = set.mention(mention).node();
        if tree.children(node).is_empty() {
            return None;
        }
        let head = tree.head(node)?;
        let nested = set.id_for_node(head)?;
        let kind = set.mention(nested).mention_type();
        if kind.is_compound() || kind == MentionType::Nested {
            return Some(nested);
        }

        let mut twice_nested = None;
        for &child in tree.children(head) {
            if twice_nested.is_some()
                && (set.id_for_node(child).is_some()
                    || (tree.is_preterminal(child) && self.rules.has_noun_head(tree, child)))
            {
                twice_nested = None;
                break;
            }
            if self.rules.is_name_node(tree, child) {
                let is_nested = set
                    .mention_by_node(child)
                    .is_some_and(|m| m.mention_type() == MentionType::Nested);
                if !is_nested {
                    twice_nested = Some(child);
                }
            }
        }

        Some(twice_nested.and_then(|child| set.id_for_node(child)).unwrap_or(nested))
    }
}

/// Names inside a mention, counting through lists and appositives.
pub fn count_names(set: &MentionSet, mention: MentionId) -> usize {
    match set.mention(mention).mention_type() {
        MentionType::List | MentionType::Appositive => set
            .children_of(mention)
            .into_iter()
            .map(|child| count_names(set, child))
            .sum(),
        MentionType::Name => 1,
        _ => 0,
    }
}

fn copy_type(set: &mut MentionSet, from: MentionId, to: MentionId) {
    let source = set.mention(from);
    let (entity_type, subtype) = (source.entity_type().clone(), source.subtype().cloned());
    let target = set.mention_mut(to);
    target.set_entity_type(entity_type);
    target.set_subtype(subtype);
}

//! Mention records.

use std::fmt;

use crate::{
    entity::{EntitySubtype, EntityType},
    tree::NodeId,
};

/// Structural category of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionType {
    None,
    Name,
    Pronoun,
    Descriptor,
    Partitive,
    Appositive,
    List,
    Nested,
}

impl MentionType {
    /// Categories built by linking other mentions together.
    pub fn is_compound(self) -> bool {
        matches!(
            self,
            MentionType::Partitive | MentionType::Appositive | MentionType::List
        )
    }
}

impl fmt::Display for MentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MentionType::None => "none",
            MentionType::Name => "name",
            MentionType::Pronoun => "pron",
            MentionType::Descriptor => "desc",
            MentionType::Partitive => "part",
            MentionType::Appositive => "appo",
            MentionType::List => "list",
            MentionType::Nested => "nest",
        };
        f.write_str(label)
    }
}

/// Stable index of a mention within its hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionId(pub(crate) usize);

impl MentionId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for MentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    id: MentionId,
    node: NodeId,
    mention_type: MentionType,
    entity_type: EntityType,
    subtype: Option<EntitySubtype>,
    pub(crate) parent: Option<MentionId>,
    pub(crate) child: Option<MentionId>,
    pub(crate) next: Option<MentionId>,
    /// This mention's share of the hypothesis score.
    pub(crate) score: f64,
}

impl Mention {
    pub(crate) fn new(id: MentionId, node: NodeId) -> Self {
        Mention {
            id,
            node,
            mention_type: MentionType::None,
            entity_type: EntityType::undetermined(),
            subtype: None,
            parent: None,
            child: None,
            next: None,
            score: 0.0,
        }
    }

    pub fn id(&self) -> MentionId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn mention_type(&self) -> MentionType {
        self.mention_type
    }

    pub fn set_mention_type(&mut self, mention_type: MentionType) {
        self.mention_type = mention_type;
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Changing the type drops a subtype that belonged to the old one.
    pub fn set_entity_type(&mut self, entity_type: EntityType) {
        if self
            .subtype
            .as_ref()
            .is_some_and(|subtype| subtype.parent() != &entity_type)
        {
            self.subtype = None;
        }
        self.entity_type = entity_type;
    }

    pub fn subtype(&self) -> Option<&EntitySubtype> {
        self.subtype.as_ref()
    }

    /// Returns false, leaving the mention untouched, when the subtype
    /// belongs to a different entity type.
    pub fn set_subtype(&mut self, subtype: Option<EntitySubtype>) -> bool {
        match subtype {
            Some(subtype) if subtype.parent() != &self.entity_type => false,
            subtype => {
                self.subtype = subtype;
                true
            }
        }
    }

    pub fn parent(&self) -> Option<MentionId> {
        self.parent
    }

    pub fn child(&self) -> Option<MentionId> {
        self.child
    }

    pub fn next(&self) -> Option<MentionId> {
        self.next
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_populated(&self) -> bool {
        self.mention_type != MentionType::None
    }
}

use crate::{
    classifier::{Classified, Classifier, Solution},
    entity::EntityTypes,
    error::DecodeError,
    mention::MentionId,
};

/// Gives every untyped mention the *other* type. Used when descriptors
/// are not being classified.
#[derive(Debug, Clone, Copy)]
pub struct NoneStep<'a> {
    pub types: &'a EntityTypes,
}

impl Classifier for NoneStep<'_> {
    fn name(&self) -> &'static str {
        "none"
    }

    fn classify(
        &self,
        solution: Solution<'_>,
        mention: MentionId,
        _max_results: usize,
    ) -> Result<Classified, DecodeError> {
        if solution.view().mention(mention).entity_type().is_determined() {
            return Ok(solution.unchanged());
        }
        let other = self.types.other().clone();
        solution.apply(|set| {
            set.mention_mut(mention).set_entity_type(other);
            Ok(())
        })
    }
}

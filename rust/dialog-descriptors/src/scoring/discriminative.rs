use std::{fmt, sync::Arc};

use super::{DescriptorContext, table::LOG_OF_ZERO};
use crate::entity::EntityType;

const SUFFIX_LENGTH: usize = 3;

/// An external scorer of feature strings, e.g. a trained maximum-entropy
/// model. Returns `None` for an outcome it has never seen.
pub trait Decoder: fmt::Debug + Send + Sync {
    fn score(&self, features: &[String], outcome: &EntityType) -> Option<f64>;
}

/// Scores descriptors by handing context features to a [`Decoder`].
#[derive(Debug, Clone)]
pub struct DiscriminativeModel {
    decoder: Arc<dyn Decoder>,
}

impl DiscriminativeModel {
    pub fn new(decoder: Arc<dyn Decoder>) -> Self {
        DiscriminativeModel { decoder }
    }

    pub fn features(&self, context: &DescriptorContext) -> Vec<String> {
        let chars: Vec<char> = context.stemmed_head.chars().collect();
        let suffix: String = chars[chars.len().saturating_sub(SUFFIX_LENGTH)..]
            .iter()
            .collect();

        let mut features = vec![
            format!("head={}", context.head_word),
            format!("stem={}", context.stemmed_head),
        ];
        features.extend(context.premods.iter().map(|premod| format!("premod={premod}")));
        features.push(format!("fparent={}", context.functional_parent_or_null()));
        features.push(format!("suffix={suffix}"));
        features
    }

    /// Unknown outcomes score [`LOG_OF_ZERO`].
    pub fn score(&self, features: &[String], outcome: &EntityType) -> f64 {
        self.decoder.score(features, outcome).unwrap_or(LOG_OF_ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Scores an outcome by how many features mention its lowercase name.
    #[derive(Debug)]
    struct Overlap;

    impl Decoder for Overlap {
        fn score(&self, features: &[String], outcome: &EntityType) -> Option<f64> {
            if outcome.name() == "WEA" {
                return None;
            }
            let needle = outcome.name().to_lowercase();
            Some(features.iter().filter(|f| f.contains(&needle)).count() as f64)
        }
    }

    fn context() -> DescriptorContext {
        DescriptorContext {
            head_word: "Organizers".to_string(),
            stemmed_head: "organizers".to_string(),
            premods: vec!["the".to_string(), "rally".to_string()],
            functional_parent: None,
        }
    }

    #[test]
    fn features_cover_every_context_word() {
        let model = DiscriminativeModel::new(Arc::new(Overlap));
        assert_eq!(
            model.features(&context()),
            vec![
                "head=Organizers",
                "stem=organizers",
                "premod=the",
                "premod=rally",
                "fparent=:NULL",
                "suffix=ers",
            ]
        );
    }

    #[test]
    fn unknown_outcomes_score_log_zero() {
        let model = DiscriminativeModel::new(Arc::new(Overlap));
        let features = model.features(&context());
        assert_eq!(model.score(&features, &EntityType::new("ORG")), 1.0);
        assert_eq!(model.score(&features, &EntityType::new("WEA")), LOG_OF_ZERO);
    }
}

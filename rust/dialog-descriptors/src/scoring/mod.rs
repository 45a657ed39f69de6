//! Descriptor scoring.
//!
//! Given a descriptor's head node, a [`DescriptorScorer`] scores every
//! registered entity type and keeps the best few in a [`TopK`]. The scores
//! come from one of two interchangeable models, chosen once at build time:
//!
//! - [`MultinomialModel`] sums smoothed log-probabilities from a family of
//!   n-gram tables (prior, head, premodifiers, functional parent).
//! - [`DiscriminativeModel`] hands feature strings to an external decoder.
//!
//! Whichever model is used, the same two adjustments follow. A temporal
//! head word forces the temporal type, and an *other* verdict narrowly
//! ahead of *person* is reversed when the head word is a known person noun.

mod discriminative;
mod multinomial;
mod pronoun;
mod table;

use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use tracing::debug;

pub use discriminative::{Decoder, DiscriminativeModel};
pub use multinomial::{ComponentScores, MultinomialModel, VOCAB_SIZE, interpolate_premod};
pub use pronoun::PronounModel;
pub use table::{LOG_OF_ZERO, Lookup, ProbTable, Smoothing};

use crate::{
    entity::{EntityType, EntityTypes},
    error::{DecodeError, SetupError},
    lexicon::{Lexicon, WordList},
    ranked::TopK,
    rules::LanguageRules,
    tree::{NodeId, ParseTree},
};

/// Largest score lead of *other* over *person* that a person noun reverses.
pub const PERSON_MARGIN: f64 = 4.0;

/// Context word used when a node has no functional parent.
pub const NULL_CONTEXT: &str = ":NULL";

/// Which model scores descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringStrategy {
    #[default]
    Multinomial,
    Discriminative,
}

impl FromStr for ScoringStrategy {
    type Err = SetupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "multinomial" => Ok(ScoringStrategy::Multinomial),
            "discriminative" => Ok(ScoringStrategy::Discriminative),
            other => Err(SetupError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringStrategy::Multinomial => f.write_str("multinomial"),
            ScoringStrategy::Discriminative => f.write_str("discriminative"),
        }
    }
}

/// The words around a descriptor head that the models condition on.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorContext {
    pub head_word: String,
    pub stemmed_head: String,
    /// Head words of the children before the head, in order.
    pub premods: Vec<String>,
    /// Head word of the functional parent, if there is one.
    pub functional_parent: Option<String>,
}

impl DescriptorContext {
    pub fn extract(tree: &ParseTree, node: NodeId, rules: &LanguageRules) -> Self {
        let head_word = tree.head_word(node).to_string();
        let head_index = tree.node(node).head_index();
        let premods = tree
            .children(node)
            .iter()
            .take(head_index)
            .map(|&child| tree.head_word(child).to_string())
            .collect();
        let functional_parent = rules
            .functional_parent(tree, node)
            .map(|parent| tree.head_word(parent).to_string());

        DescriptorContext {
            stemmed_head: rules.stem(&head_word),
            head_word,
            premods,
            functional_parent,
        }
    }

    pub fn functional_parent_or_null(&self) -> &str {
        self.functional_parent.as_deref().unwrap_or(NULL_CONTEXT)
    }
}

/// The scoring model, one variant per strategy.
#[derive(Debug, Clone)]
pub enum DescriptorModel {
    Multinomial(MultinomialModel),
    Discriminative(DiscriminativeModel),
}

impl DescriptorModel {
    pub fn strategy(&self) -> ScoringStrategy {
        match self {
            DescriptorModel::Multinomial(_) => ScoringStrategy::Multinomial,
            DescriptorModel::Discriminative(_) => ScoringStrategy::Discriminative,
        }
    }

    fn score_types(
        &self,
        context: &DescriptorContext,
        types: &EntityTypes,
    ) -> Vec<(EntityType, f64)> {
        match self {
            DescriptorModel::Multinomial(model) => types
                .iter()
                .map(|entity_type| {
                    let components = model.components(context, entity_type);
                    debug!(
                        head = %context.head_word,
                        %entity_type,
                        total = components.total(),
                        prior = components.prior,
                        head_score = components.head,
                        premod = components.premod,
                        functional_parent = components.functional_parent,
                        suffix = components.suffix,
                        "scored descriptor candidate"
                    );
                    (entity_type.clone(), components.total())
                })
                .collect(),
            DescriptorModel::Discriminative(model) => {
                let features = model.features(context);
                types
                    .iter()
                    .map(|entity_type| {
                        let total = model.score(&features, entity_type);
                        debug!(head = %context.head_word, %entity_type, total, "scored descriptor candidate");
                        (entity_type.clone(), total)
                    })
                    .collect()
            }
        }
    }
}

impl From<MultinomialModel> for DescriptorModel {
    fn from(model: MultinomialModel) -> Self {
        DescriptorModel::Multinomial(model)
    }
}

impl From<DiscriminativeModel> for DescriptorModel {
    fn from(model: DiscriminativeModel) -> Self {
        DescriptorModel::Discriminative(model)
    }
}

/// Ranks entity types for descriptor heads.
#[derive(Debug, Clone)]
pub struct DescriptorScorer {
    model: DescriptorModel,
    types: Arc<EntityTypes>,
    person_nouns: Arc<dyn Lexicon>,
    temporal_headwords: WordList,
}

impl DescriptorScorer {
    pub fn new(model: impl Into<DescriptorModel>, types: Arc<EntityTypes>) -> Self {
        DescriptorScorer {
            model: model.into(),
            types,
            person_nouns: Arc::new(WordList::default()),
            temporal_headwords: WordList::default(),
        }
    }

    /// Build the model named by `strategy` from files under `prefix`.
    pub fn load(
        strategy: ScoringStrategy,
        prefix: &std::path::Path,
        types: Arc<EntityTypes>,
        decoder: Option<Arc<dyn Decoder>>,
    ) -> Result<Self, SetupError> {
        let model = match strategy {
            ScoringStrategy::Multinomial => {
                DescriptorModel::Multinomial(MultinomialModel::load(prefix, &types)?)
            }
            ScoringStrategy::Discriminative => {
                let decoder = decoder.ok_or(SetupError::MissingDecoder)?;
                DescriptorModel::Discriminative(DiscriminativeModel::new(decoder))
            }
        };
        Ok(DescriptorScorer::new(model, types))
    }

    /// Lexicon confirming that a head word denotes a person.
    pub fn with_person_nouns(mut self, lexicon: Arc<dyn Lexicon>) -> Self {
        self.person_nouns = lexicon;
        self
    }

    pub fn with_temporal_headwords(mut self, words: WordList) -> Self {
        self.temporal_headwords = words;
        self
    }

    pub fn model(&self) -> &DescriptorModel {
        &self.model
    }

    pub fn types(&self) -> &EntityTypes {
        &self.types
    }

    /// Rank entity types for `context`, best first, keeping at most
    /// `max_results`. Candidates at or below [`LOG_OF_ZERO`] are dropped;
    /// if nothing survives the model cannot describe this head at all.
    pub fn rank(
        &self,
        context: &DescriptorContext,
        max_results: usize,
    ) -> Result<TopK<EntityType>, DecodeError> {
        let temporal = self
            .types
            .temporal()
            .filter(|_| self.temporal_headwords.contains(&context.head_word));

        let mut ranked = TopK::new(max_results);
        for (entity_type, total) in self.model.score_types(context, &self.types) {
            if total <= LOG_OF_ZERO {
                continue;
            }
            let proposed = match temporal {
                Some(temporal) if &entity_type != temporal => temporal.clone(),
                _ => entity_type,
            };
            ranked.insert(total, proposed);
        }

        if self.prefers_person(&ranked, context) {
            debug!(head = %context.head_word, "person noun overrides other");
            ranked.swap_items(0, 1);
        }

        if ranked.is_empty() {
            return Err(DecodeError::NoCandidates {
                head: context.head_word.clone(),
            });
        }
        Ok(ranked)
    }

    fn prefers_person(&self, ranked: &TopK<EntityType>, context: &DescriptorContext) -> bool {
        match (ranked.get(0), ranked.get(1)) {
            (Some(first), Some(second)) => {
                &first.item == self.types.other()
                    && first.score - second.score < PERSON_MARGIN
                    && &second.item == self.types.person()
                    && self.person_nouns.is_person(&context.head_word)
            }
            _ => false,
        }
    }
}

pub(crate) fn with_suffix(prefix: &std::path::Path, suffix: &str) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(head: &str) -> DescriptorContext {
        DescriptorContext {
            head_word: head.to_string(),
            stemmed_head: head.to_string(),
            premods: Vec::new(),
            functional_parent: None,
        }
    }

    fn table(order: usize, smoothing: Smoothing, rows: &[(&[&str], f64)]) -> ProbTable {
        let mut table = ProbTable::new(order, smoothing);
        for &(key, probability) in rows {
            table.insert(key, probability, 100.0, 0.0);
        }
        table
    }

    /// A model in which only the prior distinguishes types.
    fn prior_only(priors: &[(&str, f64)]) -> MultinomialModel {
        let rows: Vec<(Vec<&str>, f64)> = priors
            .iter()
            .map(|&(name, p)| (vec![NULL_CONTEXT, name], p))
            .collect();
        let rows: Vec<(&[&str], f64)> = rows.iter().map(|(key, p)| (key.as_slice(), *p)).collect();
        MultinomialModel::new(
            table(2, Smoothing::None, &rows),
            ProbTable::new(2, Smoothing::WittenBell),
            ProbTable::new(3, Smoothing::None),
            ProbTable::new(2, Smoothing::None),
            ProbTable::new(2, Smoothing::WittenBell),
        )
    }

    fn types_of(ranked: &TopK<EntityType>) -> Vec<&str> {
        ranked.iter().map(|entry| entry.item.name()).collect()
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [ScoringStrategy::Multinomial, ScoringStrategy::Discriminative] {
            assert_eq!(strategy.to_string().parse::<ScoringStrategy>().unwrap(), strategy);
        }
        assert!(matches!(
            "maxent".parse::<ScoringStrategy>(),
            Err(SetupError::UnknownStrategy(name)) if name == "maxent"
        ));
    }

    #[test]
    fn ranks_by_total_score() {
        let types = Arc::new(EntityTypes::ace());
        let scorer = DescriptorScorer::new(
            prior_only(&[("ORG", 0.5), ("PER", 0.3), ("GPE", 0.2)]),
            types,
        );
        let ranked = scorer.rank(&context("agency"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["ORG", "PER", "GPE"]);
    }

    #[test]
    fn nothing_above_the_floor_is_fatal() {
        let scorer = DescriptorScorer::new(prior_only(&[]), Arc::new(EntityTypes::ace()));
        assert_eq!(
            scorer.rank(&context("zyzzyva"), 10).unwrap_err(),
            DecodeError::NoCandidates {
                head: "zyzzyva".to_string()
            }
        );
    }

    #[test]
    fn person_noun_reverses_narrow_other_lead() {
        let types = Arc::new(EntityTypes::ace());
        let model = prior_only(&[("OTH", 0.5), ("PER", 0.4)]);
        let plain = DescriptorScorer::new(model.clone(), Arc::clone(&types));
        let with_lexicon = DescriptorScorer::new(model, types)
            .with_person_nouns(Arc::new(WordList::from_words(["veteran"])));

        let ranked = plain.rank(&context("veteran"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["OTH", "PER"]);

        let ranked = with_lexicon.rank(&context("veteran"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["PER", "OTH"]);
        assert_eq!(ranked.scores(), vec![0.5f64.ln(), 0.4f64.ln()]);

        let ranked = with_lexicon.rank(&context("rock"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["OTH", "PER"]);
    }

    #[test]
    fn wide_other_lead_is_kept() {
        let types = Arc::new(EntityTypes::ace());
        let scorer = DescriptorScorer::new(prior_only(&[("OTH", 0.9), ("PER", 0.001)]), types)
            .with_person_nouns(Arc::new(WordList::from_words(["veteran"])));
        let ranked = scorer.rank(&context("veteran"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["OTH", "PER"]);
    }

    #[test]
    fn temporal_head_forces_temporal_type() {
        let types = Arc::new(
            EntityTypes::new(["PER", "ORG", "TIME"], "OTH", "PER")
                .unwrap()
                .with_temporal("TIME")
                .unwrap(),
        );
        let scorer = DescriptorScorer::new(prior_only(&[("ORG", 0.6), ("PER", 0.4)]), types)
            .with_temporal_headwords(WordList::from_words(["week"]));

        let ranked = scorer.rank(&context("week"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["TIME", "TIME"]);

        let ranked = scorer.rank(&context("agency"), 10).unwrap();
        assert_eq!(types_of(&ranked), vec!["ORG", "PER"]);
    }

    #[test]
    fn context_reads_premods_and_functional_parent() {
        let rules = LanguageRules::english();
        let tree = ParseTree::parse(
            "(S (NP (DT the) (JJ former) (NN Officers)) (VP^ (VBD resigned)))",
            &rules,
        )
        .unwrap();
        let np = tree.children(tree.root())[0];
        let context = DescriptorContext::extract(&tree, np, &rules);
        assert_eq!(context.head_word, "Officers");
        assert_eq!(context.stemmed_head, "officers");
        assert_eq!(context.premods, vec!["the", "former"]);
        assert_eq!(context.functional_parent.as_deref(), Some("resigned"));
    }
}

//! Sentence-level mention recognition.
//!
//! [`DescriptorRecognizer::recognize`] seeds a hypothesis with the
//! sentence's names, then walks the mention-bearing nodes of the parse in
//! postorder, running the classification steps at each one. The search
//! keeps at most `beam_width` hypotheses alive. After the walk, every
//! committed hypothesis gets its nominal premodifiers and subtypes
//! revisited in place, since premodifiers typed late may still be missing
//! a subtype.

use std::{path::Path, sync::Arc};

use tracing::{debug, info};

use crate::{
    classifier::Classifier,
    compound::CompoundMentionFinder,
    config::RecognizerConfig,
    entity::{EntityType, EntityTypes},
    error::{DecodeError, SetupError},
    hypothesis::MentionSet,
    lexicon::{Lexicon, SubtypeLexicon, SubtypeTable, TypeMap, WordList},
    mention::Mention,
    names::{NameTheory, insert_names, insert_nested_names},
    rules::LanguageRules,
    scoring::{Decoder, DescriptorScorer, PronounModel},
    search::TreeSearch,
    steps::{
        AppositiveStep, DescriptorStep, ListStep, NestedStep, NoneStep, PartitiveStep,
        PremodStep, PronounStep, SubtypeStep,
    },
    tree::{NodeId, ParseTree},
};

/// One parsed sentence and the names found in it.
#[derive(Debug, Clone)]
pub struct Sentence {
    pub tree: Arc<ParseTree>,
    pub names: NameTheory,
    pub nested_names: NameTheory,
    /// Position of the sentence in its document.
    pub index: usize,
}

impl Sentence {
    pub fn new(tree: Arc<ParseTree>, index: usize) -> Self {
        Sentence {
            tree,
            names: NameTheory::default(),
            nested_names: NameTheory::default(),
            index,
        }
    }

    pub fn with_names(mut self, names: NameTheory) -> Self {
        self.names = names;
        self
    }

    pub fn with_nested_names(mut self, nested_names: NameTheory) -> Self {
        self.nested_names = nested_names;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorRecognizer {
    rules: Arc<LanguageRules>,
    types: Arc<EntityTypes>,
    finder: CompoundMentionFinder,
    scorer: DescriptorScorer,
    premod_scorer: Option<DescriptorScorer>,
    pronoun_model: Option<PronounModel>,
    subtypes: SubtypeLexicon,
    beam_width: usize,
    branching: bool,
    classify_descriptors: bool,
    first_mention_type: Option<EntityType>,
}

impl DescriptorRecognizer {
    /// A recognizer that decodes in place with no optional resources.
    pub fn new(rules: Arc<LanguageRules>, types: Arc<EntityTypes>, scorer: DescriptorScorer) -> Self {
        DescriptorRecognizer {
            finder: CompoundMentionFinder::new(Arc::clone(&rules), TypeMap::default()),
            rules,
            types,
            scorer,
            premod_scorer: None,
            pronoun_model: None,
            subtypes: SubtypeLexicon::default(),
            beam_width: 1,
            branching: false,
            classify_descriptors: true,
            first_mention_type: None,
        }
    }

    /// Build everything named by `config`. The `decoder` is required by
    /// the discriminative strategy and ignored otherwise.
    pub fn from_config(
        config: &RecognizerConfig,
        rules: LanguageRules,
        decoder: Option<Arc<dyn Decoder>>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        let strategy = config.scoring_strategy()?;
        let types = Arc::new(EntityTypes::from_config(&config.entity_types)?);

        let rules = match config.partitive_headwords.as_deref() {
            Some(path) => {
                let words = WordList::load(path)?;
                rules.with_partitive_headwords(words.iter())
            }
            None => rules,
        };
        let rules = Arc::new(rules);

        let temporal_headwords =
            load_optional(config.temporal_headwords.as_deref(), WordList::load)?
                .unwrap_or_default();
        let person_nouns: Arc<dyn Lexicon> = Arc::new(
            load_optional(config.person_nouns.as_deref(), WordList::load)?.unwrap_or_default(),
        );
        let scorer = |prefix: &Path| -> Result<DescriptorScorer, SetupError> {
            Ok(
                DescriptorScorer::load(strategy, prefix, Arc::clone(&types), decoder.clone())?
                    .with_person_nouns(Arc::clone(&person_nouns))
                    .with_temporal_headwords(temporal_headwords.clone()),
            )
        };

        let descriptor_types =
            load_optional(config.desc_types.as_deref(), |path| TypeMap::load(path, &types))?
                .unwrap_or_default();
        let subtype_table = |path: Option<&Path>| {
            load_optional(path, |path| SubtypeTable::load(path, &types))
                .map(Option::unwrap_or_default)
        };
        let subtypes = SubtypeLexicon {
            descriptor_heads: subtype_table(config.desc_head_subtypes.as_deref())?,
            name_words: subtype_table(config.name_word_subtypes.as_deref())?,
            full_names: subtype_table(config.full_name_subtypes.as_deref())?,
        };

        let first_mention_type = config
            .first_mention_type
            .as_deref()
            .map(|name| {
                types.lookup(name).cloned().ok_or_else(|| {
                    SetupError::Registry(format!("first mention type '{name}' is not listed"))
                })
            })
            .transpose()?;

        let mut recognizer = DescriptorRecognizer::new(
            Arc::clone(&rules),
            Arc::clone(&types),
            scorer(&config.desc_model)?,
        )
        .with_descriptor_types(descriptor_types)
        .with_subtype_lexicon(subtypes)
        .with_beam_width(config.beam_width)
        .with_branching(config.branching)
        .with_classify_descriptors(config.classify_descriptors);

        if let Some(prefix) = &config.nom_premod_model {
            recognizer = recognizer.with_premod_scorer(scorer(prefix)?);
        }
        if let Some(prefix) = &config.pronoun_model {
            recognizer = recognizer.with_pronoun_model(PronounModel::load(prefix, &types)?);
        }
        if let Some(entity_type) = first_mention_type {
            recognizer = recognizer.with_first_mention_type(entity_type);
        }

        info!(
            %strategy,
            beam_width = config.beam_width,
            branching = config.branching,
            types = types.len(),
            "built descriptor recognizer"
        );
        Ok(recognizer)
    }

    /// Head words and the types a descriptor headed by them may take,
    /// consulted when an appositive pairs a name with a descriptor.
    pub fn with_descriptor_types(mut self, descriptor_types: TypeMap) -> Self {
        self.finder = CompoundMentionFinder::new(Arc::clone(&self.rules), descriptor_types);
        self
    }

    pub fn with_premod_scorer(mut self, scorer: DescriptorScorer) -> Self {
        self.premod_scorer = Some(scorer);
        self
    }

    pub fn with_pronoun_model(mut self, model: PronounModel) -> Self {
        self.pronoun_model = Some(model);
        self
    }

    pub fn with_subtype_lexicon(mut self, subtypes: SubtypeLexicon) -> Self {
        self.subtypes = subtypes;
        self
    }

    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    pub fn with_branching(mut self, branching: bool) -> Self {
        self.branching = branching;
        self
    }

    /// When false, mentions left untyped by the structural steps are
    /// marked with the other type and no model is consulted.
    pub fn with_classify_descriptors(mut self, classify_descriptors: bool) -> Self {
        self.classify_descriptors = classify_descriptors;
        self
    }

    /// Force `entity_type` onto the sole mention of a document's first
    /// sentence.
    pub fn with_first_mention_type(mut self, entity_type: EntityType) -> Self {
        self.first_mention_type = Some(entity_type);
        self
    }

    pub fn rules(&self) -> &LanguageRules {
        &self.rules
    }

    pub fn types(&self) -> &EntityTypes {
        &self.types
    }

    /// Classify every mention of `sentence`, returning the surviving
    /// hypotheses best first. In-place decoding returns exactly one.
    pub fn recognize(&self, sentence: &Sentence) -> Result<Vec<MentionSet>, DecodeError> {
        let tree = &sentence.tree;
        let mut start = MentionSet::new(Arc::clone(tree), sentence.index);
        if tree.mention_nodes().is_empty() {
            return Ok(vec![start]);
        }

        insert_names(&mut start, &sentence.names, &self.rules)?;
        insert_nested_names(&mut start, &sentence.nested_names, &self.rules)?;

        let nodes: Vec<NodeId> = tree
            .postorder()
            .into_iter()
            .filter(|&node| tree.has_mention(node))
            .collect();

        let mut search = TreeSearch::new(self.branching);
        search.reset(start, self.beam_width)?;
        for &node in &nodes {
            self.process_node(&mut search, node)?;
        }
        if self.types.subtypes_defined() {
            let subtype = self.subtype_step();
            apply_all(&mut search, &nodes, &subtype)?;
        }
        let results = search.commit();

        let mut results = self.revisit(results, &nodes)?;
        self.force_first_mention_type(sentence.index, &mut results);

        debug!(
            sentence = sentence.index,
            mentions = tree.mention_nodes().len(),
            results = results.len(),
            "recognized sentence"
        );
        Ok(results)
    }

    fn process_node(&self, search: &mut TreeSearch, node: NodeId) -> Result<(), DecodeError> {
        let finder = &self.finder;
        search.apply(node, &PartitiveStep { finder })?;
        if self.classify_descriptors {
            search.apply(node, &AppositiveStep { finder })?;
        }
        search.apply(node, &ListStep { finder })?;
        search.apply(node, &NestedStep { finder })?;

        if !self.classify_descriptors {
            return search.apply(node, &NoneStep { types: &self.types });
        }

        search.apply(
            node,
            &PronounStep {
                rules: &self.rules,
                types: &self.types,
                model: self.pronoun_model.as_ref(),
            },
        )?;
        search.apply(
            node,
            &DescriptorStep {
                rules: &self.rules,
                scorer: &self.scorer,
            },
        )?;
        search.apply(node, &self.premod_step())
    }

    /// Re-run the premodifier and subtype steps in place over each
    /// committed hypothesis.
    fn revisit(
        &self,
        results: Vec<MentionSet>,
        nodes: &[NodeId],
    ) -> Result<Vec<MentionSet>, DecodeError> {
        let count = results.len();
        if count == 0 {
            return Ok(results);
        }

        let mut pass = TreeSearch::new(false);
        pass.reset_with_leaves(results, count)?;
        if self.classify_descriptors {
            apply_all(&mut pass, nodes, &self.premod_step())?;
        }
        if self.types.subtypes_defined() {
            apply_all(&mut pass, nodes, &self.subtype_step())?;
        }
        Ok(pass.commit())
    }

    fn force_first_mention_type(&self, sentence: usize, results: &mut [MentionSet]) {
        let Some(forced) = &self.first_mention_type else {
            return;
        };
        let Some(first) = results.first_mut() else {
            return;
        };
        if sentence != 0 || first.len() != 1 {
            return;
        }
        let Some(id) = first.mentions().next().map(Mention::id) else {
            return;
        };
        let mention = first.mention_mut(id);
        if mention.entity_type() != forced {
            debug!(%id, from = %mention.entity_type(), to = %forced, "forced first mention type");
            mention.set_entity_type(forced.clone());
        }
    }

    fn premod_step(&self) -> PremodStep<'_> {
        PremodStep {
            rules: &self.rules,
            types: &self.types,
            scorer: self.premod_scorer.as_ref(),
        }
    }

    fn subtype_step(&self) -> SubtypeStep<'_> {
        SubtypeStep {
            rules: &self.rules,
            types: &self.types,
            lexicon: &self.subtypes,
        }
    }
}

fn apply_all(
    search: &mut TreeSearch,
    nodes: &[NodeId],
    step: &dyn Classifier,
) -> Result<(), DecodeError> {
    for &node in nodes {
        search.apply(node, step)?;
    }
    Ok(())
}

fn load_optional<T>(
    path: Option<&Path>,
    load: impl FnOnce(&Path) -> Result<T, SetupError>,
) -> Result<Option<T>, SetupError> {
    path.map(load).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mention::MentionType,
        names::NameSpan,
        scoring::{MultinomialModel, NULL_CONTEXT, ProbTable, Smoothing},
    };
    use pretty_assertions::assert_eq;

    fn scorer(types: &Arc<EntityTypes>, priors: &[(&str, f64)]) -> DescriptorScorer {
        let mut prior = ProbTable::new(2, Smoothing::None);
        for &(name, p) in priors {
            prior.insert(&[NULL_CONTEXT, name], p, 100.0, 0.0);
        }
        let model = MultinomialModel::new(
            prior,
            ProbTable::new(2, Smoothing::WittenBell),
            ProbTable::new(3, Smoothing::None),
            ProbTable::new(2, Smoothing::None),
            ProbTable::new(2, Smoothing::WittenBell),
        );
        DescriptorScorer::new(model, Arc::clone(types))
    }

    fn recognizer(priors: &[(&str, f64)]) -> DescriptorRecognizer {
        let types = Arc::new(EntityTypes::ace());
        DescriptorRecognizer::new(
            Arc::new(LanguageRules::english()),
            Arc::clone(&types),
            scorer(&types, priors),
        )
    }

    fn sentence(text: &str, index: usize) -> Sentence {
        let tree = ParseTree::parse(text, &LanguageRules::english()).unwrap();
        Sentence::new(Arc::new(tree), index)
    }

    fn typed(set: &MentionSet) -> Vec<(String, MentionType, String)> {
        set.mentions()
            .map(|m| {
                (
                    set.tree().text(m.node()),
                    m.mention_type(),
                    m.entity_type().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn first_person_pronoun_is_a_person() {
        let results = recognizer(&[("ORG", 0.9)])
            .recognize(&sentence("(S (NP (PRP I)) (VP^ (VBD^ left)))", 3))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            typed(&results[0]),
            vec![("I".to_string(), MentionType::Pronoun, "PER".to_string())]
        );
        assert_eq!(results[0].score(), 0.0);
    }

    #[test]
    fn sentence_without_mentions_is_returned_untouched() {
        let results = recognizer(&[])
            .recognize(&sentence("(S (VP^ (VBD^ left)))", 0))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_empty());
    }

    #[test]
    fn branching_returns_ranked_alternatives() {
        let results = recognizer(&[("ORG", 0.6), ("FAC", 0.3), ("GPE", 0.1)])
            .with_branching(true)
            .with_beam_width(2)
            .recognize(&sentence("(S (NP (DT the) (NN^ bank)) (VP^ (VBD^ failed)))", 1))
            .unwrap();
        let types: Vec<String> = results
            .iter()
            .map(|set| typed(set)[0].2.clone())
            .collect();
        assert_eq!(types, vec!["ORG", "FAC"]);
        assert!(results[0].score() > results[1].score());
        for result in &results {
            result.check_links().unwrap();
        }
    }

    #[test]
    fn names_are_kept_and_descriptors_typed() {
        let text = "(S (NPP (NNP Acme)) (VP^ (VBD^ hired) (NP (DT an) (NN^ officer))))";
        let names = NameTheory::new(vec![NameSpan::new(0, 0, EntityType::new("ORG"))], -1.5);
        let results = recognizer(&[("PER", 0.7), ("ORG", 0.2)])
            .recognize(&sentence(text, 1).with_names(names))
            .unwrap();
        assert_eq!(
            typed(&results[0]),
            vec![
                ("Acme".to_string(), MentionType::Name, "ORG".to_string()),
                ("an officer".to_string(), MentionType::Descriptor, "PER".to_string()),
            ]
        );
        assert_eq!(results[0].name_score(), -1.5);
    }

    #[test]
    fn without_descriptor_classification_untyped_mentions_are_other() {
        let results = recognizer(&[("PER", 0.7)])
            .with_classify_descriptors(false)
            .recognize(&sentence("(S (NP (DT the) (NN^ officer)) (VP^ (VBD^ left)))", 1))
            .unwrap();
        assert_eq!(typed(&results[0])[0].2, "OTH");
    }

    #[test]
    fn first_mention_of_first_sentence_takes_forced_type() {
        let recognizer = recognizer(&[("PER", 0.7)]).with_first_mention_type(EntityType::new("ORG"));
        let text = "(S (NP (DT the) (NN^ officer)) (VP^ (VBD^ left)))";

        let first = recognizer.recognize(&sentence(text, 0)).unwrap();
        assert_eq!(typed(&first[0])[0].2, "ORG");

        let later = recognizer.recognize(&sentence(text, 4)).unwrap();
        assert_eq!(typed(&later[0])[0].2, "PER");
    }

    #[test]
    fn zero_beam_is_a_decode_error() {
        let error = recognizer(&[("PER", 0.7)])
            .with_beam_width(0)
            .recognize(&sentence("(S (NP (NN^ officer)) (VP^ (VBD^ left)))", 1))
            .unwrap_err();
        assert_eq!(error, DecodeError::ZeroCapacity);
    }
}

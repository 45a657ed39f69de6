use std::path::Path;

use super::{
    DescriptorContext, NULL_CONTEXT, with_suffix,
    table::{LOG_OF_ZERO, ProbTable, Smoothing},
};
use crate::{
    entity::{EntityType, EntityTypes},
    error::SetupError,
};

/// Size of the uniform distribution under the premodifier back-off.
pub const VOCAB_SIZE: f64 = 10000.0;

const FRONT_PREMOD_KAPPA: f64 = 3.0;
const SUFFIX_LENGTH: usize = 3;

/// Mix the premodifier estimate given head and type with its back-off
/// given type alone, then with a uniform floor.
pub fn interpolate_premod(
    front_probability: f64,
    front_lambda: f64,
    back_probability: f64,
    back_lambda: f64,
) -> f64 {
    front_lambda * front_probability
        + (1.0 - front_lambda)
            * (back_lambda * back_probability + (1.0 - back_lambda) * 1.0 / VOCAB_SIZE)
}

/// Per-component log-probabilities for one candidate type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComponentScores {
    pub prior: f64,
    pub head: f64,
    pub premod: f64,
    pub functional_parent: f64,
    pub suffix: f64,
}

impl ComponentScores {
    pub fn total(&self) -> f64 {
        self.prior + self.head + self.premod + self.functional_parent + self.suffix
    }
}

/// The smoothed multinomial descriptor model.
#[derive(Debug, Clone)]
pub struct MultinomialModel {
    /// `(:NULL TYPE)`
    prior: ProbTable,
    /// `(TYPE head)`
    head: ProbTable,
    /// `(TYPE head premod)`
    premod: ProbTable,
    /// `(TYPE premod)`
    premod_back_off: ProbTable,
    /// `(TYPE parent_head)`
    functional_parent: ProbTable,
    /// `(TYPE suffix)`
    suffix: Option<ProbTable>,
}

impl MultinomialModel {
    pub fn new(
        prior: ProbTable,
        head: ProbTable,
        premod: ProbTable,
        premod_back_off: ProbTable,
        functional_parent: ProbTable,
    ) -> Self {
        MultinomialModel {
            prior,
            head,
            premod: premod.with_kappa(FRONT_PREMOD_KAPPA),
            premod_back_off,
            functional_parent,
            suffix: None,
        }
    }

    /// Add a model of the head word's last few characters.
    pub fn with_suffix(mut self, suffix: ProbTable) -> Self {
        self.suffix = Some(suffix);
        self
    }

    /// Load `prefix.mnp1` through `prefix.mnp5`, plus `prefix.mnp6` when
    /// present, checking every type against the registry.
    pub fn load(prefix: &Path, types: &EntityTypes) -> Result<Self, SetupError> {
        let load = |suffix: &str, order: usize, smoothing: Smoothing, type_position: usize| {
            let path = with_suffix(prefix, suffix);
            let table = ProbTable::load(&path, order, smoothing)?;
            table.check_types(type_position, types, &path)?;
            Ok::<_, SetupError>(table)
        };

        let mut model = MultinomialModel::new(
            load(".mnp1", 2, Smoothing::None, 1)?,
            load(".mnp2", 2, Smoothing::WittenBell, 0)?,
            load(".mnp3", 3, Smoothing::None, 0)?,
            load(".mnp4", 2, Smoothing::None, 0)?,
            load(".mnp5", 2, Smoothing::WittenBell, 0)?,
        );
        if with_suffix(prefix, ".mnp6").exists() {
            model = model.with_suffix(load(".mnp6", 2, Smoothing::WittenBell, 0)?);
        }
        Ok(model)
    }

    pub fn components(&self, context: &DescriptorContext, entity_type: &EntityType) -> ComponentScores {
        let type_name = entity_type.name();
        let head = context.stemmed_head.as_str();

        let premod = context
            .premods
            .iter()
            .map(|premod| {
                let front = [type_name, head, premod.as_str()];
                let back = [type_name, premod.as_str()];
                let combined = interpolate_premod(
                    self.premod.lookup(&front).probability,
                    self.premod.incorrect_lambda(&front),
                    self.premod_back_off.lookup(&back).probability,
                    self.premod_back_off.incorrect_lambda(&back),
                );
                if combined == 0.0 {
                    LOG_OF_ZERO
                } else {
                    combined.ln()
                }
            })
            .sum();

        let suffix = self.suffix.as_ref().map_or(0.0, |table| {
            let chars: Vec<char> = head.chars().collect();
            let tail: String = chars[chars.len().saturating_sub(SUFFIX_LENGTH)..].iter().collect();
            table.log_probability(&[type_name, &tail])
        });

        ComponentScores {
            prior: self.prior.log_probability(&[NULL_CONTEXT, type_name]),
            head: self.head.log_probability(&[type_name, head]),
            premod,
            functional_parent: self
                .functional_parent
                .log_probability(&[type_name, context.functional_parent_or_null()]),
            suffix,
        }
    }

    pub fn score(&self, context: &DescriptorContext, entity_type: &EntityType) -> f64 {
        self.components(context, entity_type).total()
    }
}

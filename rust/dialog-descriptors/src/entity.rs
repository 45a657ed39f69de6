//! Entity types, subtypes and the registry that enumerates them.
//!
//! The set of entity types is data, not code: it is loaded once at setup
//! and shared read-only by every classifier. Two members are distinguished.
//! The *other* type is assigned to mentions that name no entity of
//! interest, and the *person* type is what first-person pronouns resolve
//! to. A *temporal* type may optionally be registered for the
//! temporal-headword override.

use std::{fmt, sync::Arc};

use serde::Deserialize;

use crate::error::SetupError;

/// Name of the sentinel type carried by mentions that have not been typed.
pub const UNDETERMINED: &str = "UNDET";

/// A named entity category such as `PER` or `ORG`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityType(Arc<str>);

impl EntityType {
    pub fn new(name: &str) -> Self {
        EntityType(Arc::from(name))
    }

    pub fn undetermined() -> Self {
        EntityType::new(UNDETERMINED)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_determined(&self) -> bool {
        &*self.0 != UNDETERMINED
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finer category that belongs to exactly one entity type, written
/// `PARENT.Name` in lexicons and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntitySubtype {
    parent: EntityType,
    name: Arc<str>,
}

impl EntitySubtype {
    pub fn parent(&self) -> &EntityType {
        &self.parent
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntitySubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent, self.name)
    }
}

/// Declarative description of a registry, as found in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityTypesConfig {
    pub types: Vec<String>,
    pub other: String,
    pub person: String,
    #[serde(default)]
    pub temporal: Option<String>,
    #[serde(default)]
    pub subtypes: Vec<String>,
}

impl Default for EntityTypesConfig {
    fn default() -> Self {
        EntityTypesConfig {
            types: ["PER", "ORG", "GPE", "LOC", "FAC", "VEH", "WEA", "OTH"]
                .into_iter()
                .map(String::from)
                .collect(),
            other: "OTH".to_string(),
            person: "PER".to_string(),
            temporal: None,
            subtypes: Vec::new(),
        }
    }
}

/// The closed, enumerable set of entity types known to a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTypes {
    types: Vec<EntityType>,
    other: EntityType,
    person: EntityType,
    temporal: Option<EntityType>,
    subtypes: Vec<EntitySubtype>,
}

impl EntityTypes {
    /// Build a registry from type names. The other type is appended if the
    /// list does not already contain it; the person type must be listed.
    pub fn new<I, S>(names: I, other: &str, person: &str) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types: Vec<EntityType> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if name.is_empty() || name == UNDETERMINED {
                return Err(SetupError::Registry(format!(
                    "'{name}' is not a usable entity type name"
                )));
            }
            if types.iter().any(|existing| existing.name() == name) {
                return Err(SetupError::Registry(format!(
                    "entity type '{name}' is listed twice"
                )));
            }
            types.push(EntityType::new(name));
        }

        if !types.iter().any(|t| t.name() == other) {
            types.push(EntityType::new(other));
        }
        let person = types
            .iter()
            .find(|t| t.name() == person)
            .cloned()
            .ok_or_else(|| {
                SetupError::Registry(format!("person type '{person}' is not listed"))
            })?;

        Ok(EntityTypes {
            other: EntityType::new(other),
            person,
            temporal: None,
            subtypes: Vec::new(),
            types,
        })
    }

    /// The ACE inventory, with `OTH` as the other type.
    pub fn ace() -> Self {
        let config = EntityTypesConfig::default();
        EntityTypes {
            types: config.types.iter().map(|name| EntityType::new(name)).collect(),
            other: EntityType::new(&config.other),
            person: EntityType::new(&config.person),
            temporal: None,
            subtypes: Vec::new(),
        }
    }

    pub fn from_config(config: &EntityTypesConfig) -> Result<Self, SetupError> {
        let mut types = EntityTypes::new(&config.types, &config.other, &config.person)?;
        if let Some(temporal) = &config.temporal {
            types = types.with_temporal(temporal)?;
        }
        types.with_subtypes(&config.subtypes)
    }

    /// Register the type assigned by the temporal-headword override.
    pub fn with_temporal(mut self, name: &str) -> Result<Self, SetupError> {
        let temporal = self.lookup(name).cloned().ok_or_else(|| {
            SetupError::Registry(format!("temporal type '{name}' is not listed"))
        })?;
        self.temporal = Some(temporal);
        Ok(self)
    }

    /// Register subtypes written as `PARENT.Name`.
    pub fn with_subtypes<I, S>(mut self, specs: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for spec in specs {
            let spec = spec.as_ref();
            let (parent, name) = spec
                .split_once('.')
                .filter(|(_, name)| !name.is_empty())
                .ok_or_else(|| SetupError::UnknownSubtype(spec.to_string()))?;
            let parent = self
                .lookup(parent)
                .cloned()
                .ok_or_else(|| SetupError::UnknownSubtype(spec.to_string()))?;
            if self.subtype_of(&parent, name).is_none() {
                self.subtypes.push(EntitySubtype {
                    parent,
                    name: Arc::from(name),
                });
            }
        }
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&EntityType> {
        self.types.iter().find(|t| t.name() == name)
    }

    pub fn other(&self) -> &EntityType {
        &self.other
    }

    pub fn person(&self) -> &EntityType {
        &self.person
    }

    pub fn temporal(&self) -> Option<&EntityType> {
        self.temporal.as_ref()
    }

    /// True for registered types other than the other type.
    pub fn is_recognized(&self, entity_type: &EntityType) -> bool {
        entity_type != &self.other && self.types.contains(entity_type)
    }

    pub fn subtypes_defined(&self) -> bool {
        !self.subtypes.is_empty()
    }

    /// Look up a subtype written as `PARENT.Name`.
    pub fn subtype(&self, spec: &str) -> Option<&EntitySubtype> {
        let (parent, name) = spec.split_once('.')?;
        self.subtypes
            .iter()
            .find(|st| st.parent.name() == parent && &*st.name == name)
    }

    pub fn subtype_of(&self, parent: &EntityType, name: &str) -> Option<&EntitySubtype> {
        self.subtypes
            .iter()
            .find(|st| &st.parent == parent && &*st.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn other_type_is_appended_when_missing() {
        let types = EntityTypes::new(["PER", "ORG"], "OTH", "PER").unwrap();
        let names: Vec<&str> = types.iter().map(EntityType::name).collect();
        assert_eq!(names, vec!["PER", "ORG", "OTH"]);
        assert_eq!(types.other().name(), "OTH");
        assert!(!types.is_recognized(types.other()));
        assert!(types.is_recognized(types.person()));
    }

    #[test]
    fn person_type_must_be_listed() {
        let error = EntityTypes::new(["ORG"], "OTH", "PER").unwrap_err();
        assert!(matches!(error, SetupError::Registry(_)));
    }

    #[test]
    fn duplicate_and_sentinel_names_are_rejected() {
        assert!(EntityTypes::new(["PER", "PER"], "OTH", "PER").is_err());
        assert!(EntityTypes::new(["PER", UNDETERMINED], "OTH", "PER").is_err());
    }

    #[test]
    fn undetermined_is_not_a_registered_type() {
        let types = EntityTypes::ace();
        assert!(!EntityType::undetermined().is_determined());
        assert!(!types.is_recognized(&EntityType::undetermined()));
    }

    #[test]
    fn subtypes_resolve_against_their_parent() {
        let types = EntityTypes::ace()
            .with_subtypes(["PER.Group", "PER.Individual", "ORG.Commercial"])
            .unwrap();
        let group = types.subtype("PER.Group").unwrap();
        assert_eq!(group.parent(), types.person());
        assert_eq!(group.to_string(), "PER.Group");
        assert!(types.subtype("ORG.Group").is_none());
        assert!(
            types
                .subtype_of(&EntityType::new("ORG"), "Commercial")
                .is_some()
        );
    }

    #[test]
    fn subtype_with_unknown_parent_is_rejected() {
        let error = EntityTypes::ace().with_subtypes(["XYZ.Thing"]).unwrap_err();
        assert!(matches!(error, SetupError::UnknownSubtype(spec) if spec == "XYZ.Thing"));
    }

    #[test]
    fn temporal_type_must_be_registered() {
        assert!(EntityTypes::ace().with_temporal("TIME").is_err());
        let types = EntityTypes::new(["PER", "TIME"], "OTH", "PER")
            .unwrap()
            .with_temporal("TIME")
            .unwrap();
        assert_eq!(types.temporal().map(EntityType::name), Some("TIME"));
    }

    #[test]
    fn registry_builds_from_configuration() {
        let config: EntityTypesConfig = serde_json::from_str(
            r#"{ "types": ["PER", "ORG", "TIME"], "other": "NONE", "person": "PER",
                 "temporal": "TIME", "subtypes": ["PER.Group"] }"#,
        )
        .unwrap();
        let types = EntityTypes::from_config(&config).unwrap();
        assert_eq!(types.len(), 4);
        assert_eq!(types.other().name(), "NONE");
        assert!(types.subtypes_defined());
    }
}

//! Declarative model: the entities of a run and how they relate.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use pitbridge_core::errors::{PitBridgeError, PitBridgeResult};
use pitbridge_hooks::{HookDefinition, HookMapping};
use pitbridge_temporal::join::{CatalogEntry, HookCatalog};
use pitbridge_temporal::{EventDefinition, JoinStep};
use pitbridge_union::BridgeLayout;

/// One entity (peripheral) of the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Raw store entity name, also the peripheral name in the bridge.
    pub name: String,
    /// Namespace of the primary hook.
    pub concept: String,
    /// Payload field to take the business key from. When absent the raw
    /// record's own key is used.
    #[serde(default)]
    pub key_field: Option<String>,
    #[serde(default)]
    pub foreign: Vec<HookDefinition>,
    #[serde(default)]
    pub joins: Vec<JoinStep>,
    #[serde(default)]
    pub events: Vec<EventDefinition>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>, concept: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            concept: concept.into(),
            key_field: None,
            foreign: Vec::new(),
            joins: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    pub fn with_foreign(mut self, definition: HookDefinition) -> Self {
        self.foreign.push(definition);
        self
    }

    pub fn with_join(mut self, step: JoinStep) -> Self {
        self.joins.push(step);
        self
    }

    pub fn with_event(mut self, definition: EventDefinition) -> Self {
        self.events.push(definition);
        self
    }

    pub fn mapping(&self) -> HookMapping {
        HookMapping {
            concept: self.concept.clone(),
            foreign: self.foreign.clone(),
        }
    }

    pub fn layout(&self) -> BridgeLayout {
        BridgeLayout::new(self.name.as_str(), self.concept.as_str())
            .with_steps(self.joins.iter().map(|s| s.name.as_str()))
            .with_event_types(self.events.iter().map(|e| e.event_type.as_str()))
    }
}

/// The full entity list of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(default)]
    pub entities: Vec<EntityDefinition>,
}

impl ModelDefinition {
    pub fn new(entities: Vec<EntityDefinition>) -> Self {
        Self { entities }
    }

    /// Parse and validate a TOML model.
    pub fn from_toml(source: &str) -> PitBridgeResult<Self> {
        let model: Self = toml::from_str(source)
            .map_err(|e| PitBridgeError::ConfigError(format!("invalid model: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    /// At least one entity, with unique names.
    pub fn validate(&self) -> PitBridgeResult<()> {
        if self.entities.is_empty() {
            return Err(PitBridgeError::ConfigError(
                "model declares no entities".to_string(),
            ));
        }
        let mut names = BTreeSet::new();
        for entity in &self.entities {
            if entity.name.trim().is_empty() {
                return Err(PitBridgeError::ConfigError(
                    "entity name must not be empty".to_string(),
                ));
            }
            if !names.insert(entity.name.as_str()) {
                return Err(PitBridgeError::ConfigError(format!(
                    "entity {} declared twice",
                    entity.name
                )));
            }
        }
        Ok(())
    }

    /// Entities keyed by name.
    pub fn by_name(&self) -> BTreeMap<&str, &EntityDefinition> {
        self.entities.iter().map(|e| (e.name.as_str(), e)).collect()
    }

    /// Each entity's concept and the concepts its foreign hooks reference.
    pub fn catalog(&self) -> HookCatalog {
        self.entities
            .iter()
            .map(|e| {
                let entry = e
                    .foreign
                    .iter()
                    .fold(CatalogEntry::new(e.concept.as_str()), |entry, d| {
                        entry.with_hook(d.name.as_str(), d.concept.as_str())
                    });
                (e.name.clone(), entry)
            })
            .collect()
    }
}

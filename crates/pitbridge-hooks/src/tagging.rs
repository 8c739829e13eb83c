//! Business tagging: the explicit mapping from a versioned record to the
//! hooks it carries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pitbridge_core::errors::{HookError, PitBridgeResult};
use pitbridge_core::models::{HookedRecord, VersionedRecord};

use crate::builder::HookBuilder;

/// One foreign hook: `name` is the role (and column suffix), `concept` the
/// related entity's namespace, `field` the payload field holding the
/// related business key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookDefinition {
    pub name: String,
    pub concept: String,
    pub field: String,
}

impl HookDefinition {
    pub fn new(
        name: impl Into<String>,
        concept: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            concept: concept.into(),
            field: field.into(),
        }
    }
}

/// The hooks an entity's records carry. The primary hook is built from the
/// business key under `concept`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookMapping {
    pub concept: String,
    #[serde(default)]
    pub foreign: Vec<HookDefinition>,
}

impl HookMapping {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            foreign: Vec::new(),
        }
    }

    pub fn with_foreign(mut self, definition: HookDefinition) -> Self {
        self.foreign.push(definition);
        self
    }

    /// Tag one record. A null foreign field yields a null foreign hook.
    pub fn tag(&self, builder: &HookBuilder, record: VersionedRecord) -> PitBridgeResult<HookedRecord> {
        let hook = builder.hook(&self.concept, &record.business_key)?;
        let pit_hook = if record.interval().is_empty() {
            builder.degenerate_pit_hook(&hook, record.valid_from, record.version)
        } else {
            builder.pit_hook(&hook, record.valid_from)
        };

        let mut foreign_hooks = BTreeMap::new();
        for definition in &self.foreign {
            let foreign = match record.field(&definition.field).to_qualifier() {
                Some(qualifier) if !qualifier.is_empty() => {
                    Some(builder.hook(&definition.concept, &qualifier)?)
                }
                _ => None,
            };
            foreign_hooks.insert(definition.name.clone(), foreign);
        }

        Ok(HookedRecord {
            record,
            hook,
            pit_hook,
            foreign_hooks,
        })
    }

    /// Tag every record, preserving order.
    pub fn tag_all(
        &self,
        builder: &HookBuilder,
        records: Vec<VersionedRecord>,
    ) -> PitBridgeResult<Vec<HookedRecord>> {
        self.validate()?;
        let tagged = records
            .into_iter()
            .map(|r| self.tag(builder, r))
            .collect::<PitBridgeResult<Vec<_>>>()?;
        debug!(concept = %self.concept, records = tagged.len(), "tagged records");
        Ok(tagged)
    }

    /// Definition names must be unique and must not render onto a fixed bridge
    /// column: they become column names.
    pub fn validate(&self) -> Result<(), HookError> {
        let mut names: Vec<&str> = self.foreign.iter().map(|d| d.name.as_str()).collect();
        names.push(self.concept.as_str());
        for name in &names {
            if !crate::builder::is_valid_concept(name) {
                return Err(HookError::InvalidConcept {
                    concept: (*name).to_string(),
                });
            }
            if crate::naming::is_reserved(name) {
                return Err(HookError::ReservedName {
                    name: (*name).to_string(),
                });
            }
        }
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(HookError::InvalidConcept {
                concept: format!("{} (declared twice)", dup[0]),
            });
        }
        Ok(())
    }
}

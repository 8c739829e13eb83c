//! BridgeEngine: one full run from the raw store to the unified bridge.
//!
//! Stages: read → version → tag → resolve → unpivot → render → union.
//! Grain is validated at each stage boundary when enabled. Entities are
//! independent until resolution, which reads every entity's tagged history.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use pitbridge_core::config::PitBridgeConfig;
use pitbridge_core::errors::{PitBridgeError, PitBridgeResult};
use pitbridge_core::models::{BridgeRow, EventRow, HookedRecord, RawRecord, Value};
use pitbridge_core::traits::IRawStore;
use pitbridge_hooks::{naming, HookBuilder};
use pitbridge_temporal::events::unpivot_all;
use pitbridge_temporal::grain::{check_versioned_history, GrainSpec};
use pitbridge_temporal::join::JoinStats;
use pitbridge_temporal::partition::{first_error, map_partitions};
use pitbridge_temporal::{version_relation, JoinPlan, RelatedIndex, TemporalJoinEngine};
use pitbridge_union::{to_relation, union_by_name, Relation, UnifiedBridge};

use crate::model::{EntityDefinition, ModelDefinition};
use crate::output::{EntityOutput, RunOutput};

/// Name of the unified relation.
pub const UNIFIED_BRIDGE: &str = "bridge";

/// Versioned and tagged records of one entity.
struct Tagged {
    records: Vec<HookedRecord>,
    quarantined: Vec<RawRecord>,
}

/// Resolved and rendered bridge of one entity.
struct Rendered {
    bridge: Vec<BridgeRow>,
    events: Vec<EventRow>,
    relation: Relation,
    stats: JoinStats,
}

pub struct BridgeEngine {
    config: PitBridgeConfig,
    model: ModelDefinition,
    builder: HookBuilder,
    joins: TemporalJoinEngine,
}

impl BridgeEngine {
    /// Validate `config` and `model` and build an engine.
    pub fn new(config: PitBridgeConfig, model: ModelDefinition) -> PitBridgeResult<Self> {
        config.validate()?;
        model.validate()?;
        let builder = HookBuilder::new(config.hooks.clone());
        let joins = TemporalJoinEngine::new(
            builder.clone(),
            config.join.clone(),
            config.execution.clone(),
        );
        Ok(Self {
            config,
            model,
            builder,
            joins,
        })
    }

    pub fn config(&self) -> &PitBridgeConfig {
        &self.config
    }

    pub fn model(&self) -> &ModelDefinition {
        &self.model
    }

    pub fn builder(&self) -> &HookBuilder {
        &self.builder
    }

    /// Execute every stage. A failed stage returns its error and no output.
    pub fn run(&self, store: &dyn IRawStore) -> PitBridgeResult<RunOutput> {
        let entities = self.model.by_name();
        info!(entities = entities.len(), "starting run");

        // Plans, layouts and store coverage are checked before any data is read.
        let catalog = self.model.catalog();
        let plans = entities
            .values()
            .map(|e| JoinPlan::compile(&e.name, &e.concept, e.joins.clone(), &catalog))
            .collect::<Result<Vec<_>, _>>()?;
        for entity in entities.values() {
            entity.layout().schema()?;
        }

        let available: BTreeSet<String> = store.entities().into_iter().collect();
        let missing: Vec<&str> = entities
            .keys()
            .copied()
            .filter(|name| !available.contains(*name))
            .collect();
        if !missing.is_empty() {
            return Err(PitBridgeError::StoreError(format!(
                "store has no entity {}",
                missing.join(", ")
            )));
        }

        let definitions: Vec<&EntityDefinition> = entities.values().copied().collect();
        let tagged = first_error(map_partitions(
            definitions.clone(),
            &self.config.execution,
            |entity| self.version_and_tag(store, entity),
        ))?;

        let rendered = {
            let indexes: BTreeMap<String, RelatedIndex<'_>> = definitions
                .iter()
                .zip(&tagged)
                .map(|(e, t)| (e.name.clone(), RelatedIndex::build(&t.records)))
                .collect();
            let work: Vec<_> = definitions.iter().zip(&tagged).zip(&plans).collect();
            first_error(map_partitions(work, &self.config.execution, |((entity, staged), plan)| {
                self.resolve_and_render(entity, plan, &staged.records, &indexes)
            }))?
        };

        let relations: Vec<Relation> = rendered.iter().map(|r| r.relation.clone()).collect();
        let unified = UnifiedBridge::new(union_by_name(UNIFIED_BRIDGE, &relations)?)?;
        if self.config.validation.enforce_grain {
            GrainSpec::new(UNIFIED_BRIDGE, naming::BRIDGE_PIT_HOOK).check_unique(
                unified
                    .relation()
                    .column_values(naming::BRIDGE_PIT_HOOK)
                    .filter_map(Value::as_text),
            )?;
        }

        let outputs: BTreeMap<String, EntityOutput> = definitions
            .iter()
            .zip(tagged)
            .zip(rendered)
            .map(|((entity, tagged), rendered)| {
                let output = EntityOutput {
                    tagged: tagged.records,
                    quarantined: tagged.quarantined,
                    bridge: rendered.bridge,
                    events: rendered.events,
                    relation: rendered.relation,
                    stats: rendered.stats,
                };
                (entity.name.clone(), output)
            })
            .collect();

        info!(
            entities = outputs.len(),
            unified_rows = unified.len(),
            "run complete"
        );
        Ok(RunOutput {
            entities: outputs,
            unified,
        })
    }

    fn version_and_tag(&self, store: &dyn IRawStore, entity: &EntityDefinition) -> PitBridgeResult<Tagged> {
        let mut raw = store.read(&entity.name)?;
        if let Some(field) = &entity.key_field {
            key_from_field(&mut raw, field);
        }

        let outcome = version_relation(
            &entity.name,
            raw,
            &self.config.versioning,
            &self.config.execution,
        )?;
        if self.config.validation.enforce_grain {
            check_versioned_history(&entity.name, &outcome.records)?;
        }

        let records = entity.mapping().tag_all(&self.builder, outcome.records)?;
        if self.config.validation.enforce_grain {
            GrainSpec::new(entity.name.as_str(), naming::pit_hook_column(&entity.concept))
                .check_unique(records.iter().map(|r| r.pit_hook.as_str()))?;
        }

        Ok(Tagged {
            records,
            quarantined: outcome.quarantined,
        })
    }

    fn resolve_and_render(
        &self,
        entity: &EntityDefinition,
        plan: &JoinPlan,
        primary: &[HookedRecord],
        indexes: &BTreeMap<String, RelatedIndex<'_>>,
    ) -> PitBridgeResult<Rendered> {
        let resolution = self.joins.resolve(plan, primary, indexes)?;
        let events = unpivot_all(
            &self.builder,
            &entity.name,
            &resolution.rows,
            &entity.events,
            &self.config.execution,
        )?;
        let stats = resolution.stats;
        let bridge = resolution.into_rows();

        if self.config.validation.enforce_grain {
            GrainSpec::new(entity.name.as_str(), naming::BRIDGE_PIT_HOOK)
                .check_unique(bridge.iter().map(|r| r.bridge_pit_hook.as_str()))?;
            GrainSpec::new(format!("{}.events", entity.name), naming::BRIDGE_PIT_HOOK)
                .check_unique(events.iter().map(|e| e.event_pit_hook.as_str()))?;
        }

        let relation = to_relation(&entity.layout(), &bridge, &events)?;
        Ok(Rendered {
            bridge,
            events,
            relation,
            stats,
        })
    }
}

/// Replace each record's business key with the qualifier of `field`. A
/// null or missing field leaves the record keyless.
fn key_from_field(records: &mut [RawRecord], field: &str) {
    for record in records {
        record.business_key = record.payload.get(field).and_then(Value::to_qualifier);
    }
}

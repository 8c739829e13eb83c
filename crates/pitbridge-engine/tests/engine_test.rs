//! End-to-end runs over an in-memory raw store.

use std::sync::atomic::{AtomicUsize, Ordering};

use pitbridge_core::config::PitBridgeConfig;
use pitbridge_core::errors::{JoinError, PitBridgeError, PitBridgeResult, UnionError};
use pitbridge_core::models::{
    max_sentinel, min_sentinel, JoinPolicy, MalformedKeyPolicy, OrphanPolicy, RawRecord, Value,
};
use pitbridge_core::traits::IRawStore;
use pitbridge_engine::{BridgeEngine, EntityDefinition, ModelDefinition};
use pitbridge_hooks::{naming, HookDefinition};
use pitbridge_temporal::{EventDefinition, JoinStep};
use test_fixtures::{date, raw, ts, InMemoryRawStore};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MODEL: &str = r#"
[[entities]]
name = "customers"
concept = "customer"

[[entities]]
name = "invoices"
concept = "invoice"

[[entities.foreign]]
name = "customer"
concept = "customer"
field = "customer_id"

[[entities.joins]]
name = "customer"
related = "customers"
source = { from = "primary", hook = "customer" }

[[entities.events]]
event_type = "due"
field = "due_date"

[[entities.events]]
event_type = "paid"
field = "paid_date"
"#;

fn store() -> InMemoryRawStore {
    InMemoryRawStore::new()
        .with_entity(
            "customers",
            vec![
                raw("C1", ts(2024, 1, 1)).with_field("tier", "bronze"),
                raw("C1", ts(2024, 2, 1)).with_field("tier", "silver"),
            ],
        )
        .with_entity(
            "invoices",
            vec![
                raw("I1", ts(2024, 1, 10))
                    .with_field("customer_id", "C1")
                    .with_field("due_date", date(2024, 5, 1))
                    .with_field("paid_date", Value::Null),
            ],
        )
}

fn config() -> PitBridgeConfig {
    let mut config = PitBridgeConfig::default();
    config.execution.parallel = false;
    config
}

fn engine() -> BridgeEngine {
    BridgeEngine::new(config(), ModelDefinition::from_toml(MODEL).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[test]
fn versioning_produces_contiguous_histories() {
    let out = engine().run(&store()).unwrap();
    let customers: Vec<_> = out.entity("customers").unwrap().versioned().collect();
    assert_eq!(customers.len(), 2);
    assert_eq!((customers[0].valid_from, customers[0].valid_to), (min_sentinel(), ts(2024, 2, 1)));
    assert_eq!((customers[1].valid_from, customers[1].valid_to), (ts(2024, 2, 1), max_sentinel()));
    assert!(customers[1].is_current);
}

#[test]
fn current_invoice_fans_out_over_customer_versions() {
    let out = engine().run(&store()).unwrap();
    let bridge = out.bridge("invoices");

    // The single invoice version [MIN, MAX) meets C1 v1 and v2.
    assert_eq!(bridge.len(), 2);
    assert_eq!(bridge[0].valid_to, ts(2024, 2, 1));
    assert_eq!(bridge[1].valid_from, ts(2024, 2, 1));
    assert!(bridge[1].is_current);
    assert_eq!(out.entity("invoices").unwrap().stats.fanned_out, 1);
}

#[test]
fn only_non_null_dates_become_events() {
    let out = engine().run(&store()).unwrap();
    let events = out.events("invoices");

    // One per bridge row, each for the due date only.
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.event_date == date(2024, 5, 1)));
    assert!(events.iter().all(|e| e.event_types().eq(["due"])));
}

#[test]
fn unified_bridge_spans_every_entity() {
    let out = engine().run(&store()).unwrap();
    let relation = out.unified.relation();

    // 2 customer rows + 2 invoice event rows.
    assert_eq!(relation.len(), 4);
    let peripherals: Vec<_> = relation
        .column_values(naming::PERIPHERAL)
        .filter_map(Value::as_text)
        .collect();
    assert_eq!(peripherals, ["customers", "customers", "invoices", "invoices"]);

    assert_eq!(out.unified.as_is().len(), 2);
    assert_eq!(out.unified.as_of(ts(2024, 1, 15)).len(), 2);
    let by_event = out.unified.as_of_event(engine().builder()).unwrap();
    // May 1 falls in the second invoice row only.
    assert_eq!(by_event.len(), 1);
}

#[test]
fn reruns_are_byte_identical() {
    let a = engine().run(&store()).unwrap();
    let b = engine().run(&store()).unwrap();
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    assert_eq!(a.fingerprint().unwrap().len(), 64);
}

#[test]
fn parallel_run_matches_sequential_run() {
    let mut parallel = config();
    parallel.execution.parallel = true;
    parallel.execution.min_parallel_len = 1;
    let model = ModelDefinition::from_toml(MODEL).unwrap();

    let a = BridgeEngine::new(parallel, model).unwrap().run(&store()).unwrap();
    let b = engine().run(&store()).unwrap();
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn different_input_changes_the_fingerprint() {
    let mut changed = store();
    changed.append("customers", raw("C1", ts(2024, 3, 1)).with_field("tier", "gold"));
    let a = engine().run(&store()).unwrap();
    let b = engine().run(&changed).unwrap();
    assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

// ---------------------------------------------------------------------------
// Policies and failures
// ---------------------------------------------------------------------------

#[test]
fn key_field_overrides_the_raw_key() {
    let model = ModelDefinition::new(vec![EntityDefinition::new("customers", "customer").with_key_field("code")]);
    let store = InMemoryRawStore::new().with_entity(
        "customers",
        vec![
            RawRecord::keyless(ts(2024, 1, 1)).with_field("code", "X1"),
            RawRecord::keyless(ts(2024, 1, 2)).with_field("code", 7i64),
        ],
    );
    let out = BridgeEngine::new(config(), model).unwrap().run(&store).unwrap();
    let keys: Vec<_> = out
        .entity("customers")
        .unwrap()
        .versioned()
        .map(|v| v.business_key.clone())
        .collect();
    assert_eq!(keys, ["7", "X1"]);
}

#[test]
fn quarantined_records_are_reported_not_versioned() {
    let mut config = config();
    config.versioning.malformed_key_policy = MalformedKeyPolicy::Quarantine;
    let mut store = store();
    store.append("customers", RawRecord::keyless(ts(2024, 1, 5)));

    let out = BridgeEngine::new(config, ModelDefinition::from_toml(MODEL).unwrap())
        .unwrap()
        .run(&store)
        .unwrap();
    let customers = out.entity("customers").unwrap();
    assert_eq!(customers.quarantined.len(), 1);
    assert_eq!(customers.versioned().count(), 2);
}

#[test]
fn malformed_key_aborts_the_run_by_default() {
    let mut store = store();
    store.append("customers", RawRecord::keyless(ts(2024, 1, 5)));
    assert!(matches!(
        engine().run(&store),
        Err(PitBridgeError::VersioningError(_))
    ));
}

#[test]
fn strict_inner_join_fails_on_orphans() {
    let mut config = config();
    config.join.default_policy = JoinPolicy::Inner;
    config.join.orphan_policy = OrphanPolicy::Strict;
    let mut store = store();
    store.append(
        "invoices",
        raw("I2", ts(2024, 1, 10)).with_field("customer_id", "C404"),
    );

    let err = BridgeEngine::new(config, ModelDefinition::from_toml(MODEL).unwrap())
        .unwrap()
        .run(&store)
        .unwrap_err();
    assert!(matches!(err, PitBridgeError::JoinError(JoinError::OrphanReference { .. })));
}

#[test]
fn outer_join_keeps_orphans_with_null_foreign_pit() {
    let mut store = store();
    store.append(
        "invoices",
        raw("I2", ts(2024, 1, 10)).with_field("customer_id", "C404"),
    );
    let out = engine().run(&store).unwrap();
    let orphan: Vec<_> = out
        .bridge("invoices")
        .iter()
        .filter(|r| r.primary_hook.as_str() == "invoice|I2")
        .collect();
    assert_eq!(orphan.len(), 1);
    assert_eq!(orphan[0].foreign_pit("customer"), None);
}

#[test]
fn missing_store_entity_is_a_store_error() {
    let store = InMemoryRawStore::new().with_entity("customers", vec![]);
    assert!(matches!(engine().run(&store), Err(PitBridgeError::StoreError(_))));
}

/// Wraps a store and counts reads.
struct CountingStore {
    inner: InMemoryRawStore,
    reads: AtomicUsize,
}

impl IRawStore for CountingStore {
    fn read(&self, entity: &str) -> PitBridgeResult<Vec<RawRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(entity)
    }

    fn entities(&self) -> Vec<String> {
        self.inner.entities()
    }
}

#[test]
fn missing_store_entity_fails_before_any_read() {
    let partial = CountingStore {
        inner: InMemoryRawStore::new().with_entity("customers", vec![]),
        reads: AtomicUsize::new(0),
    };
    let err = engine().run(&partial).unwrap_err();
    assert!(matches!(err, PitBridgeError::StoreError(ref msg) if msg.contains("invoices")));
    assert_eq!(partial.reads.load(Ordering::SeqCst), 0);

    let complete = CountingStore {
        inner: store(),
        reads: AtomicUsize::new(0),
    };
    engine().run(&complete).unwrap();
    assert_eq!(complete.reads.load(Ordering::SeqCst), 2);
}

#[test]
fn join_through_a_hook_of_another_concept_is_rejected() {
    let model = ModelDefinition::new(vec![
        EntityDefinition::new("customers", "customer"),
        EntityDefinition::new("invoices", "invoice")
            .with_foreign(HookDefinition::new("customer", "client", "customer_id"))
            .with_join(JoinStep::from_primary("customer", "customers", "customer")),
    ]);
    let err = BridgeEngine::new(config(), model)
        .unwrap()
        .run(&store())
        .unwrap_err();
    assert!(matches!(
        err,
        PitBridgeError::JoinError(JoinError::ConceptMismatch { ref hook_concept, .. })
            if hook_concept == "client"
    ));
}

#[test]
fn names_colliding_with_bridge_columns_fail_before_reading() {
    let reserved_step = ModelDefinition::new(vec![
        EntityDefinition::new("customers", "customer"),
        EntityDefinition::new("invoices", "invoice")
            .with_foreign(HookDefinition::new("customer", "customer", "customer_id"))
            .with_join(JoinStep::from_primary("bridge", "customers", "customer")),
    ]);
    let err = BridgeEngine::new(config(), reserved_step)
        .unwrap()
        .run(&InMemoryRawStore::new())
        .unwrap_err();
    assert!(matches!(err, PitBridgeError::JoinError(JoinError::InvalidJoinPlan { .. })));

    let repeated_event = ModelDefinition::new(vec![EntityDefinition::new("invoices", "invoice")
        .with_event(EventDefinition::new("due", "due_date"))
        .with_event(EventDefinition::new("due", "due_at"))]);
    let err = BridgeEngine::new(config(), repeated_event)
        .unwrap()
        .run(&InMemoryRawStore::new())
        .unwrap_err();
    assert!(matches!(
        err,
        PitBridgeError::UnionError(UnionError::DuplicateColumn { ref column, .. })
            if column == "event__due"
    ));
}

#[test]
fn bad_join_plan_fails_before_reading() {
    let model = ModelDefinition::new(vec![
        EntityDefinition::new("customers", "customer"),
        EntityDefinition::new("invoices", "invoice")
            .with_foreign(HookDefinition::new("customer", "customer", "customer_id"))
            .with_join(JoinStep::from_primary("customer", "suppliers", "customer")),
    ]);
    let err = BridgeEngine::new(config(), model)
        .unwrap()
        .run(&InMemoryRawStore::new())
        .unwrap_err();
    assert!(matches!(err, PitBridgeError::JoinError(JoinError::UnknownRelation { .. })));
}

#[test]
fn non_date_event_attribute_fails_the_run() {
    let model = ModelDefinition::new(vec![
        EntityDefinition::new("invoices", "invoice").with_event(EventDefinition::new("due", "due_date")),
    ]);
    let store = InMemoryRawStore::new().with_entity(
        "invoices",
        vec![raw("I1", ts(2024, 1, 1)).with_field("due_date", 5i64)],
    );
    assert!(matches!(
        BridgeEngine::new(config(), model).unwrap().run(&store),
        Err(PitBridgeError::EventError(_))
    ));
}

// ---------------------------------------------------------------------------
// Model definition
// ---------------------------------------------------------------------------

#[test]
fn model_toml_round_trips_join_steps() {
    let model = ModelDefinition::from_toml(MODEL).unwrap();
    let invoices = &model.by_name()["invoices"];
    assert_eq!(invoices.joins, vec![JoinStep::from_primary("customer", "customers", "customer")]);
    assert_eq!(invoices.events.len(), 2);
    assert_eq!(model.catalog()["invoices"].hooks["customer"], "customer");
}

#[test]
fn model_rejects_duplicates_and_empty_lists() {
    assert!(matches!(
        ModelDefinition::from_toml(""),
        Err(PitBridgeError::ConfigError(_))
    ));
    let dup = "[[entities]]\nname = \"a\"\nconcept = \"a\"\n[[entities]]\nname = \"a\"\nconcept = \"b\"\n";
    assert!(matches!(
        ModelDefinition::from_toml(dup),
        Err(PitBridgeError::ConfigError(_))
    ));
}

#[test]
fn invalid_hook_config_is_rejected_at_construction() {
    let mut config = config();
    config.hooks.composite_delimiter = config.hooks.namespace_delimiter;
    assert!(BridgeEngine::new(config, ModelDefinition::from_toml(MODEL).unwrap()).is_err());
}

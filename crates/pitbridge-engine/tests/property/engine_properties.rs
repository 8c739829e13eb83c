//! Property tests: partitioned runs agree with sequential runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;

use pitbridge_core::config::PitBridgeConfig;
use pitbridge_core::models::Value;
use pitbridge_engine::{BridgeEngine, EntityDefinition, ModelDefinition};
use pitbridge_hooks::HookDefinition;
use pitbridge_temporal::{EventDefinition, JoinStep};
use test_fixtures::{raw, ts, InMemoryRawStore};

fn day(offset: i64) -> DateTime<Utc> {
    ts(2024, 1, 1) + Duration::days(offset)
}

fn model() -> ModelDefinition {
    ModelDefinition::new(vec![
        EntityDefinition::new("customers", "customer"),
        EntityDefinition::new("invoices", "invoice")
            .with_foreign(HookDefinition::new("customer", "customer", "customer_id"))
            .with_join(JoinStep::from_primary("customer", "customers", "customer"))
            .with_event(EventDefinition::new("due", "due_date")),
    ])
}

fn config(parallel: bool) -> PitBridgeConfig {
    let mut config = PitBridgeConfig::default();
    config.execution.parallel = parallel;
    config.execution.min_parallel_len = 1;
    config
}

/// Invoice loads keyed by (invoice, day): customer and optional due offset.
type InvoiceLoads = BTreeMap<(u8, i64), (u8, Option<i64>)>;

fn store(customers: &BTreeSet<(u8, i64)>, invoices: &InvoiceLoads) -> InMemoryRawStore {
    let customers = customers
        .iter()
        .map(|(k, d)| raw(&format!("C{k}"), day(*d)).with_field("tier", format!("t{d}")))
        .collect();
    let invoices = invoices
        .iter()
        .map(|((k, d), (customer, due))| {
            let due = match due {
                Some(offset) => Value::from(day(*d + offset).date_naive()),
                None => Value::Null,
            };
            raw(&format!("I{k}"), day(*d))
                .with_field("customer_id", format!("C{customer}"))
                .with_field("due_date", due)
        })
        .collect();
    InMemoryRawStore::new()
        .with_entity("customers", customers)
        .with_entity("invoices", invoices)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partitioned_run_fingerprint_matches_sequential(
        customers in prop::collection::btree_set((0u8..4, 0i64..300), 1..30),
        invoices in prop::collection::btree_map(
            (0u8..6, 0i64..300),
            (0u8..6, prop::option::of(0i64..90)),
            1..30,
        ),
    ) {
        let store = store(&customers, &invoices);
        let sequential = BridgeEngine::new(config(false), model()).unwrap().run(&store).unwrap();
        let parallel = BridgeEngine::new(config(true), model()).unwrap().run(&store).unwrap();

        prop_assert_eq!(sequential.fingerprint().unwrap(), parallel.fingerprint().unwrap());
        prop_assert_eq!(
            sequential.unified.relation().len(),
            parallel.unified.relation().len()
        );
    }
}

//! Property tests: history contiguity and fan-out duration conservation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, TimeDelta};
use proptest::prelude::*;

use pitbridge_core::config::{ExecutionConfig, JoinConfig, VersioningConfig};
use pitbridge_core::models::{max_sentinel, min_sentinel, JoinPolicy, OrphanPolicy, RawRecord};
use pitbridge_hooks::{HookBuilder, HookDefinition, HookMapping};
use pitbridge_temporal::grain::check_versioned_history;
use pitbridge_temporal::join::{CatalogEntry, HookCatalog};
use pitbridge_temporal::{version_relation, JoinPlan, JoinStep, RelatedIndex, TemporalJoinEngine};
use test_fixtures::{tag, ts, versioned, HistoryBuilder};

fn day(offset: i64) -> chrono::DateTime<chrono::Utc> {
    ts(2024, 1, 1) + Duration::days(offset)
}

fn plan() -> JoinPlan {
    let mut catalog = HookCatalog::new();
    catalog.insert("orders".into(), CatalogEntry::new("order").with_hook("customer", "customer"));
    catalog.insert("customers".into(), CatalogEntry::new("customer"));
    JoinPlan::compile(
        "orders",
        "order",
        vec![JoinStep::from_primary("customer", "customers", "customer")],
        &catalog,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn versioned_histories_are_contiguous_with_one_current(
        loads in prop::collection::vec((0u8..5, 0i64..500), 1..60),
    ) {
        // Distinct capture instants per key.
        let unique: BTreeSet<(u8, i64)> = loads.into_iter().collect();
        let raw: Vec<RawRecord> = unique
            .iter()
            .map(|(k, d)| RawRecord::new(format!("K{k}"), day(*d)))
            .collect();
        let out = version_relation(
            "orders",
            raw,
            &VersioningConfig::default(),
            &ExecutionConfig::default(),
        ).unwrap();

        prop_assert_eq!(out.records.len(), unique.len());
        prop_assert!(check_versioned_history("orders", &out.records).is_ok());
        let current = out.records.iter().filter(|r| r.is_current).count();
        prop_assert_eq!(current, out.key_count());
    }

    #[test]
    fn fan_out_tiles_the_primary_interval(
        changes in prop::collection::btree_set(1i64..365, 0..8),
        start in 0i64..400,
        len in 1i64..120,
    ) {
        let mut history = HistoryBuilder::new("C1").version_at(day(0), &[]);
        for offset in &changes {
            history = history.version_at(day(*offset), &[]);
        }
        let customers = tag(&HookMapping::new("customer"), history.build());
        let orders = tag(
            &HookMapping::new("order")
                .with_foreign(HookDefinition::new("customer", "customer", "customer_id")),
            vec![versioned("O1", 1, day(start), day(start + len), &[("customer_id", "C1".into())])],
        );
        let related = BTreeMap::from([(
            "customers".to_string(),
            RelatedIndex::build(&customers),
        )]);
        let engine = TemporalJoinEngine::new(
            HookBuilder::default(),
            JoinConfig { default_policy: JoinPolicy::Inner, orphan_policy: OrphanPolicy::Strict },
            ExecutionConfig::default(),
        );

        let rows = engine.resolve(&plan(), &orders, &related).unwrap().into_rows();
        let primary = orders[0].record.interval();

        prop_assert!(!rows.is_empty());
        prop_assert_eq!(rows[0].valid_from, primary.valid_from);
        prop_assert_eq!(rows[rows.len() - 1].valid_to, primary.valid_to);
        for pair in rows.windows(2) {
            prop_assert_eq!(pair[0].valid_to, pair[1].valid_from);
        }
        let total = rows
            .iter()
            .fold(TimeDelta::zero(), |acc, r| acc + r.interval().duration());
        prop_assert_eq!(total, primary.duration());

        for row in &rows {
            prop_assert!(row.interval().is_within(&primary));
            let pit = row.foreign_pit("customer").unwrap();
            let source = customers.iter().find(|c| &c.pit_hook == pit).unwrap();
            prop_assert!(row.interval().is_within(&source.record.interval()));
        }
    }

    #[test]
    fn unbounded_primary_inherits_the_related_timeline(
        changes in prop::collection::btree_set(1i64..365, 0..8),
    ) {
        let mut history = HistoryBuilder::new("C1").version_at(day(0), &[]);
        for offset in &changes {
            history = history.version_at(day(*offset), &[]);
        }
        let customers = tag(&HookMapping::new("customer"), history.build());
        let orders = tag(
            &HookMapping::new("order")
                .with_foreign(HookDefinition::new("customer", "customer", "customer_id")),
            vec![versioned("O1", 1, min_sentinel(), max_sentinel(), &[("customer_id", "C1".into())])],
        );
        let related = BTreeMap::from([(
            "customers".to_string(),
            RelatedIndex::build(&customers),
        )]);

        let rows = TemporalJoinEngine::default()
            .resolve(&plan(), &orders, &related)
            .unwrap()
            .into_rows();
        prop_assert_eq!(rows.len(), customers.len());
        prop_assert_eq!(rows.iter().filter(|r| r.is_current).count(), 1);
    }
}

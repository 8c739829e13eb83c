//! Lookup of a related entity's versions by hook.

use std::collections::HashMap;

use pitbridge_core::models::{Hook, HookedRecord, ValidityInterval};

use super::resolver::tighten;

/// Versions of one related entity grouped by hook, each group sorted by
/// `valid_from`. Borrowed from the tagged records it indexes.
#[derive(Debug)]
pub struct RelatedIndex<'a> {
    by_hook: HashMap<&'a Hook, Vec<&'a HookedRecord>>,
}

impl<'a> RelatedIndex<'a> {
    pub fn build(records: &'a [HookedRecord]) -> Self {
        let mut by_hook: HashMap<&'a Hook, Vec<&'a HookedRecord>> = HashMap::new();
        for record in records {
            by_hook.entry(&record.hook).or_default().push(record);
        }
        for versions in by_hook.values_mut() {
            versions.sort_by(|a, b| {
                a.record
                    .valid_from
                    .cmp(&b.record.valid_from)
                    .then_with(|| a.record.version.cmp(&b.record.version))
            });
        }
        Self { by_hook }
    }

    /// Number of distinct hooks.
    pub fn len(&self) -> usize {
        self.by_hook.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hook.is_empty()
    }

    /// All versions of `hook`, sorted by `valid_from`.
    pub fn versions(&self, hook: &Hook) -> &[&'a HookedRecord] {
        self.by_hook.get(hook).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Versions of `hook` overlapping `interval`, each paired with the
    /// tightened interval, in timeline order.
    pub fn overlapping(
        &self,
        hook: &Hook,
        interval: &ValidityInterval,
    ) -> Vec<(&'a HookedRecord, ValidityInterval)> {
        let versions = self.versions(hook);
        // Histories are contiguous, so valid_to is sorted along with valid_from.
        let start = versions.partition_point(|v| v.record.valid_to <= interval.valid_from);
        versions[start..]
            .iter()
            .take_while(|v| v.record.valid_from <= interval.valid_to)
            .filter_map(|v| tighten(interval, &v.record.interval()).map(|t| (*v, t)))
            .collect()
    }
}

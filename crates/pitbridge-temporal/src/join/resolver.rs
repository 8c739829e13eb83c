//! PIT resolution with interval tightening and temporal fan-out.
//!
//! Each primary version starts as one candidate carrying its own interval.
//! Every join step replaces each candidate with one child per overlapping
//! related version (`vf = max`, `vt = min`, `is_current = AND`), so the
//! final interval is the intersection across all resolved relations. The
//! children of one candidate tile its overlap with the related history: no
//! gaps, no overlaps, durations summing to the overlap duration.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use pitbridge_core::config::{ExecutionConfig, JoinConfig};
use pitbridge_core::errors::{JoinError, PitBridgeResult};
use pitbridge_core::models::{
    BridgeRow, ForeignPit, Hook, HookedRecord, JoinPolicy, OrphanPolicy, PitHook,
    ValidityInterval,
};
use pitbridge_hooks::HookBuilder;

use super::index::RelatedIndex;
use super::plan::{HookSource, JoinPlan, JoinStep};
use crate::partition::{first_error, map_partitions};

/// Tighten a primary interval against a related version's interval.
///
/// A zero-length primary `[t, t)` matches the related version containing
/// `t` and stays `[t, t)`; otherwise this is the strict intersection.
pub fn tighten(primary: &ValidityInterval, related: &ValidityInterval) -> Option<ValidityInterval> {
    if primary.is_empty() {
        related.contains(primary.valid_from).then_some(*primary)
    } else {
        primary.intersect(related)
    }
}

/// Counters reported by one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub primary_rows: usize,
    pub bridge_rows: usize,
    /// Candidates that matched more than one related version.
    pub fanned_out: usize,
    /// Candidates kept unmatched by an outer step.
    pub unmatched_kept: usize,
    /// Candidates dropped by an inner step under the warn-drop policy.
    pub orphans_dropped: usize,
}

impl JoinStats {
    fn merge(&mut self, other: &JoinStats) {
        self.primary_rows += other.primary_rows;
        self.bridge_rows += other.bridge_rows;
        self.fanned_out += other.fanned_out;
        self.unmatched_kept += other.unmatched_kept;
        self.orphans_dropped += other.orphans_dropped;
    }
}

/// A bridge row and the primary version it was resolved from.
#[derive(Debug, Clone)]
pub struct ResolvedRow<'a> {
    pub row: BridgeRow,
    pub source: &'a HookedRecord,
}

/// Output of resolving one peripheral.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// Ordered by primary record, then timeline order of the fan-out.
    pub rows: Vec<ResolvedRow<'a>>,
    pub stats: JoinStats,
}

impl Resolution<'_> {
    pub fn into_rows(self) -> Vec<BridgeRow> {
        self.rows.into_iter().map(|r| r.row).collect()
    }
}

#[derive(Debug, Clone)]
struct Candidate<'r> {
    interval: ValidityInterval,
    is_current: bool,
    loaded_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Indexed by declared step position.
    resolved: Vec<Option<&'r HookedRecord>>,
}

/// Resolves join plans against related indexes.
#[derive(Debug, Clone, Default)]
pub struct TemporalJoinEngine {
    builder: HookBuilder,
    config: JoinConfig,
    execution: ExecutionConfig,
}

impl TemporalJoinEngine {
    pub fn new(builder: HookBuilder, config: JoinConfig, execution: ExecutionConfig) -> Self {
        Self {
            builder,
            config,
            execution,
        }
    }

    /// Resolve every primary version of a peripheral.
    pub fn resolve<'a>(
        &self,
        plan: &JoinPlan,
        primary: &'a [HookedRecord],
        related: &BTreeMap<String, RelatedIndex<'_>>,
    ) -> PitBridgeResult<Resolution<'a>> {
        for step in plan.steps() {
            if !related.contains_key(&step.related) {
                return Err(JoinError::UnknownRelation {
                    peripheral: plan.peripheral().to_string(),
                    relation: step.related.clone(),
                }
                .into());
            }
        }

        let results = map_partitions(primary.iter().collect(), &self.execution, |record| {
            self.resolve_record(plan, record, related)
        });

        let mut stats = JoinStats::default();
        let mut rows = Vec::with_capacity(primary.len());
        for (record_rows, record_stats) in first_error(results)? {
            stats.merge(&record_stats);
            rows.extend(record_rows);
        }
        stats.bridge_rows = rows.len();

        info!(
            peripheral = plan.peripheral(),
            primary_rows = stats.primary_rows,
            bridge_rows = stats.bridge_rows,
            fanned_out = stats.fanned_out,
            unmatched_kept = stats.unmatched_kept,
            orphans_dropped = stats.orphans_dropped,
            "resolved bridge"
        );

        Ok(Resolution { rows, stats })
    }

    fn resolve_record<'a>(
        &self,
        plan: &JoinPlan,
        primary: &'a HookedRecord,
        related: &BTreeMap<String, RelatedIndex<'_>>,
    ) -> PitBridgeResult<(Vec<ResolvedRow<'a>>, JoinStats)> {
        let mut stats = JoinStats {
            primary_rows: 1,
            ..JoinStats::default()
        };
        let record = &primary.record;
        let mut candidates = vec![Candidate {
            interval: record.interval(),
            is_current: record.is_current,
            loaded_at: record.loaded_at,
            updated_at: record.updated_at,
            resolved: vec![None; plan.steps().len()],
        }];

        for &idx in plan.order() {
            let step = &plan.steps()[idx];
            let Some(index) = related.get(&step.related) else {
                continue;
            };
            let policy = step.policy.unwrap_or(self.config.default_policy);
            let upstream = match &step.source {
                HookSource::Step { step: name, .. } => plan.step_index(name),
                HookSource::Primary { .. } => None,
            };

            let mut next = Vec::with_capacity(candidates.len());
            for candidate in candidates {
                let foreign = match &step.source {
                    HookSource::Primary { hook } => primary.foreign_hook(hook),
                    HookSource::Step { hook, .. } => upstream
                        .and_then(|u| candidate.resolved[u])
                        .and_then(|r| r.foreign_hook(hook)),
                };
                let matches = foreign
                    .map(|h| index.overlapping(h, &candidate.interval))
                    .unwrap_or_default();

                if matches.is_empty() {
                    match policy {
                        JoinPolicy::Outer => {
                            stats.unmatched_kept += 1;
                            next.push(candidate);
                        }
                        JoinPolicy::Inner => {
                            self.drop_orphan(plan, step, primary, foreign)?;
                            stats.orphans_dropped += 1;
                        }
                    }
                    continue;
                }

                if matches.len() > 1 {
                    stats.fanned_out += 1;
                }
                for (version, interval) in matches {
                    let mut child = candidate.clone();
                    child.interval = interval;
                    child.is_current &= version.record.is_current;
                    child.loaded_at = child.loaded_at.max(version.record.loaded_at);
                    child.updated_at = child.updated_at.max(version.record.updated_at);
                    child.resolved[idx] = Some(version);
                    next.push(child);
                }
            }
            candidates = next;
        }

        let rows = candidates
            .into_iter()
            .map(|c| ResolvedRow {
                row: self.emit(plan, primary, c),
                source: primary,
            })
            .collect();
        Ok((rows, stats))
    }

    fn drop_orphan(
        &self,
        plan: &JoinPlan,
        step: &JoinStep,
        primary: &HookedRecord,
        foreign: Option<&Hook>,
    ) -> PitBridgeResult<()> {
        match self.config.orphan_policy {
            OrphanPolicy::Strict => Err(JoinError::OrphanReference {
                peripheral: plan.peripheral().to_string(),
                step: step.name.clone(),
                primary_pit_hook: primary.pit_hook.to_string(),
                foreign_hook: foreign.map(Hook::to_string),
            }
            .into()),
            OrphanPolicy::WarnDrop => {
                warn!(
                    peripheral = plan.peripheral(),
                    step = %step.name,
                    primary = %primary.pit_hook,
                    foreign = ?foreign.map(Hook::as_str),
                    "dropped orphan reference"
                );
                Ok(())
            }
        }
    }

    fn emit(&self, plan: &JoinPlan, primary: &HookedRecord, candidate: Candidate<'_>) -> BridgeRow {
        let foreign: Vec<Option<&PitHook>> = candidate
            .resolved
            .iter()
            .map(|r| r.map(|h| &h.pit_hook))
            .collect();
        let bridge_pit_hook = self.builder.bridge_pit_hook(
            plan.peripheral(),
            candidate.interval.valid_from,
            &primary.pit_hook,
            &foreign,
        );
        let foreign_pit_hooks = plan
            .steps()
            .iter()
            .zip(&candidate.resolved)
            .map(|(step, resolved)| ForeignPit {
                step: step.name.clone(),
                pit_hook: resolved.map(|h| h.pit_hook.clone()),
            })
            .collect();

        BridgeRow {
            peripheral: plan.peripheral().to_string(),
            bridge_pit_hook,
            primary_pit_hook: primary.pit_hook.clone(),
            primary_hook: primary.hook.clone(),
            foreign_pit_hooks,
            valid_from: candidate.interval.valid_from,
            valid_to: candidate.interval.valid_to,
            is_current: candidate.is_current,
            loaded_at: candidate.loaded_at,
            updated_at: candidate.updated_at,
        }
    }
}

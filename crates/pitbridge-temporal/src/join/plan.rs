//! Join steps and their execution order.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use pitbridge_core::errors::JoinError;
use pitbridge_core::models::JoinPolicy;
use pitbridge_hooks::builder::is_valid_concept;
use pitbridge_hooks::naming::{hook_column, is_reserved};

/// Where a join step reads its foreign hook from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum HookSource {
    /// A foreign hook of the primary record.
    Primary { hook: String },
    /// A foreign hook of the version resolved by an earlier step.
    Step { step: String, hook: String },
}

/// One foreign resolution of a peripheral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStep {
    /// Role name; the resolved PIT hook lands in `_pit_hook__{name}`.
    pub name: String,
    /// Related entity whose history is searched.
    pub related: String,
    pub source: HookSource,
    /// Falls back to the configured default policy.
    #[serde(default)]
    pub policy: Option<JoinPolicy>,
    /// Steps that must run first, in addition to a `Step` source.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl JoinStep {
    pub fn from_primary(
        name: impl Into<String>,
        related: impl Into<String>,
        hook: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            related: related.into(),
            source: HookSource::Primary { hook: hook.into() },
            policy: None,
            depends_on: Vec::new(),
        }
    }

    pub fn from_step(
        name: impl Into<String>,
        related: impl Into<String>,
        step: impl Into<String>,
        hook: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            related: related.into(),
            source: HookSource::Step {
                step: step.into(),
                hook: hook.into(),
            },
            policy: None,
            depends_on: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: JoinPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn after(mut self, step: impl Into<String>) -> Self {
        self.depends_on.push(step.into());
        self
    }

    fn dependencies(&self) -> impl Iterator<Item = &str> {
        let source = match &self.source {
            HookSource::Step { step, .. } => Some(step.as_str()),
            HookSource::Primary { .. } => None,
        };
        source
            .into_iter()
            .chain(self.depends_on.iter().map(String::as_str))
    }
}

/// An entity's primary concept and the concept of each foreign hook it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub concept: String,
    /// Foreign hook name to the concept it references.
    pub hooks: BTreeMap<String, String>,
}

impl CatalogEntry {
    pub fn new(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            hooks: BTreeMap::new(),
        }
    }

    pub fn with_hook(mut self, name: impl Into<String>, concept: impl Into<String>) -> Self {
        self.hooks.insert(name.into(), concept.into());
        self
    }
}

/// Catalog entries keyed by entity name.
pub type HookCatalog = BTreeMap<String, CatalogEntry>;

/// A validated set of join steps with a dependency-respecting order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPlan {
    peripheral: String,
    steps: Vec<JoinStep>,
    /// Indices into `steps`, in execution order.
    order: Vec<usize>,
}

impl JoinPlan {
    /// Validate `steps` for `peripheral` (whose primary concept is `concept`)
    /// against the hook catalog and compute the execution order: a
    /// topological order in which ready steps run in declaration order.
    pub fn compile(
        peripheral: &str,
        concept: &str,
        steps: Vec<JoinStep>,
        catalog: &HookCatalog,
    ) -> Result<Self, JoinError> {
        let invalid = |reason: String| JoinError::InvalidJoinPlan {
            peripheral: peripheral.to_string(),
            reason,
        };

        if is_reserved(concept) {
            return Err(invalid(format!("concept {concept} is reserved")));
        }

        let mut names: BTreeMap<&str, usize> = BTreeMap::new();
        for (i, step) in steps.iter().enumerate() {
            if !is_valid_concept(&step.name) {
                return Err(invalid(format!("step name {:?} is not an identifier", step.name)));
            }
            if is_reserved(&step.name) {
                return Err(invalid(format!("step name {} is reserved", step.name)));
            }
            if step.name == concept || names.insert(step.name.as_str(), i).is_some() {
                return Err(invalid(format!("step name {} is not unique", step.name)));
            }
        }

        for step in &steps {
            let related = catalog
                .get(&step.related)
                .ok_or_else(|| JoinError::UnknownRelation {
                    peripheral: peripheral.to_string(),
                    relation: step.related.clone(),
                })?;

            let (owner, hook) = match &step.source {
                HookSource::Primary { hook } => (peripheral, hook),
                HookSource::Step { step: upstream, hook } => {
                    let upstream_step = names
                        .get(upstream.as_str())
                        .map(|&i| &steps[i])
                        .ok_or_else(|| invalid(format!("{} reads from unknown step {upstream}", step.name)))?;
                    (upstream_step.related.as_str(), hook)
                }
            };
            let hook_concept = catalog
                .get(owner)
                .and_then(|entry| entry.hooks.get(hook))
                .ok_or_else(|| JoinError::UnknownHookColumn {
                    peripheral: peripheral.to_string(),
                    step: step.name.clone(),
                    column: hook_column(hook),
                })?;
            // Hook tokens embed the concept, so a mismatch can never match.
            if *hook_concept != related.concept {
                return Err(JoinError::ConceptMismatch {
                    peripheral: peripheral.to_string(),
                    step: step.name.clone(),
                    hook_concept: hook_concept.clone(),
                    related: step.related.clone(),
                    related_concept: related.concept.clone(),
                });
            }
            for dep in &step.depends_on {
                if !names.contains_key(dep.as_str()) {
                    return Err(invalid(format!("{} depends on unknown step {dep}", step.name)));
                }
            }
        }

        let order = execution_order(&steps, &names)
            .ok_or_else(|| invalid("join steps form a dependency cycle".to_string()))?;

        Ok(Self {
            peripheral: peripheral.to_string(),
            steps,
            order,
        })
    }

    /// A plan with no foreign resolutions.
    pub fn empty(peripheral: &str) -> Self {
        Self {
            peripheral: peripheral.to_string(),
            steps: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn peripheral(&self) -> &str {
        &self.peripheral
    }

    /// Steps in declaration order.
    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// Step indices in execution order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn step_index(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }
}

/// Kahn's algorithm over the step graph, always picking the lowest
/// declaration index among ready steps. `None` on a cycle.
fn execution_order(steps: &[JoinStep], names: &BTreeMap<&str, usize>) -> Option<Vec<usize>> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..steps.len()).map(|i| graph.add_node(i)).collect();
    for (i, step) in steps.iter().enumerate() {
        for dep in step.dependencies() {
            if let Some(&d) = names.get(dep) {
                graph.update_edge(nodes[d], nodes[i], ());
            }
        }
    }
    if is_cyclic_directed(&graph) {
        return None;
    }

    let mut in_degree: Vec<usize> = nodes
        .iter()
        .map(|&n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BTreeSet<usize> = (0..steps.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(steps.len());

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for next in graph.neighbors_directed(nodes[i], Direction::Outgoing) {
            let j = graph[next];
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                ready.insert(j);
            }
        }
    }

    (order.len() == steps.len()).then_some(order)
}

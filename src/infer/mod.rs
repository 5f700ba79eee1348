//! Inference over a [`KnowledgeBase`](crate::kb::KnowledgeBase).
//!
//! Two dual strategies share the per-call state defined here:
//!
//! - **Forward** ([`forward`]): data-driven, round-based fixpoint saturation.
//! - **Backward** ([`backward`]): goal-driven, depth-first proof search.
//!
//! Each call owns a fresh [`WorkingSet`] and rule trail; nothing here is
//! shared between calls.

pub mod backward;
pub mod forward;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::kb::{FactId, KnowledgeBase, RuleId};

pub use backward::{AntecedentPolicy, BackwardConfig, infer_backward};
pub use forward::{ForwardConfig, infer_forward};

/// Which chaining strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Forward,
    Backward,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Forward => write!(f, "forward"),
            Strategy::Backward => write!(f, "backward"),
        }
    }
}

/// Ordered, duplicate-free set of facts held true during one call.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    order: Vec<FactId>,
    members: HashSet<FactId>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Add a fact. Returns `false` if it was already present.
    pub fn insert(&mut self, fact: FactId) -> bool {
        if self.members.insert(fact) {
            self.order.push(fact);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, fact: FactId) -> bool {
        self.members.contains(&fact)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Facts in the order they became true.
    pub fn iter(&self) -> impl Iterator<Item = FactId> + '_ {
        self.order.iter().copied()
    }

    /// Drop every fact added after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        for fact in self.order.drain(len.min(self.order.len())..) {
            self.members.remove(&fact);
        }
    }

    /// Names of the held facts, in order.
    pub fn names(&self, kb: &KnowledgeBase) -> Vec<String> {
        self.iter().map(|id| kb.fact(id).name.clone()).collect()
    }
}

impl FromIterator<FactId> for WorkingSet {
    fn from_iter<T: IntoIterator<Item = FactId>>(iter: T) -> Self {
        let mut set = WorkingSet::new();
        for fact in iter {
            set.insert(fact);
        }
        set
    }
}

/// Outcome of one inference call, in terms of handles.
#[derive(Debug, Clone)]
pub struct Inference {
    /// Whether the query fact holds.
    pub derived: bool,
    /// Rules that contributed, in the order they were applied.
    pub trail: Vec<RuleId>,
    /// Final working set.
    pub working_set: WorkingSet,
    /// Forward: productive rounds. Backward: goals expanded through rules.
    pub iterations: usize,
    /// `false` if a configured round or depth ceiling cut the search short.
    pub exhaustive: bool,
}

impl Inference {
    /// The query was already among the true facts.
    pub(crate) fn immediate(working_set: WorkingSet) -> Self {
        Self {
            derived: true,
            trail: Vec::new(),
            working_set,
            iterations: 0,
            exhaustive: true,
        }
    }

    /// Names of the trail's rules.
    pub fn rule_names(&self, kb: &KnowledgeBase) -> Vec<String> {
        kb.rule_names(&self.trail)
    }
}

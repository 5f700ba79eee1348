//! Knowledge base: facts, rules, and the arena handles that identify them.
//!
//! Facts and rules live in arenas owned by the [`KnowledgeBase`]. Everything
//! outside the knowledge base refers to them through [`FactId`] and
//! [`RuleId`], which are assigned once at build time and compared by value.
//! A knowledge base can only be obtained from a [`KnowledgeBaseBuilder`],
//! which guarantees unique names and full referential integrity.

pub mod builder;

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

pub use builder::KnowledgeBaseBuilder;

/// Largest arena index a handle can address.
pub(crate) const MAX_ENTRIES: usize = u32::MAX as usize;

/// Stable handle of a fact inside one knowledge base.
///
/// Handles are only minted by the builder and have no serialized form;
/// files refer to facts by name.
///
/// ```compile_fail
/// fn needs_serialize<T: serde::Serialize>() {}
/// needs_serialize::<production_system::kb::FactId>();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct FactId(u32);

impl FactId {
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= MAX_ENTRIES, "fact index {index} overflows FactId");
        Self(index as u32)
    }

    /// Position of the fact in the knowledge base arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fact:{}", self.0)
    }
}

/// Stable handle of a rule inside one knowledge base.
///
/// Rule handles are ordered by declaration, so sorting them recovers the
/// order the rules were written in.
///
/// ```compile_fail
/// fn needs_deserialize<T: serde::de::DeserializeOwned>() {}
/// needs_deserialize::<production_system::kb::RuleId>();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RuleId(u32);

impl RuleId {
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= MAX_ENTRIES, "rule index {index} overflows RuleId");
        Self(index as u32)
    }

    /// Position of the rule in declaration order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule:{}", self.0)
    }
}

/// An atomic named proposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Unique name within the knowledge base.
    pub name: String,
    /// Human-readable description. Never consulted by inference.
    #[serde(default)]
    pub semantic_value: String,
}

/// An implication from a set of antecedent facts to one consequent fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Unique name within the knowledge base.
    pub name: String,
    /// Antecedents in declaration order, duplicate-free.
    pub conditionals: Vec<FactId>,
    /// The consequent.
    pub derivation: FactId,
}

/// The immutable collection of all facts and rules.
///
/// Read-only once built; share it behind an `Arc` across any number of
/// concurrent inference calls.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    facts: Vec<Fact>,
    fact_index: HashMap<String, FactId>,
    rules: Vec<Rule>,
    rule_index: HashMap<String, RuleId>,
    /// Fact -> rules deriving it, each list in declaration order.
    derivers: Vec<Vec<RuleId>>,
}

impl KnowledgeBase {
    pub(crate) fn from_parts(
        facts: Vec<Fact>,
        fact_index: HashMap<String, FactId>,
        rules: Vec<Rule>,
        rule_index: HashMap<String, RuleId>,
    ) -> Self {
        let mut derivers = vec![Vec::new(); facts.len()];
        for (i, rule) in rules.iter().enumerate() {
            derivers[rule.derivation.index()].push(RuleId::from_index(i));
        }
        Self {
            facts,
            fact_index,
            rules,
            rule_index,
            derivers,
        }
    }

    /// Start building a new knowledge base.
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::new()
    }

    pub fn fact(&self, id: FactId) -> &Fact {
        &self.facts[id.index()]
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Look up a fact handle by name.
    pub fn fact_id(&self, name: &str) -> Option<FactId> {
        self.fact_index.get(name).copied()
    }

    /// Look up a rule handle by name.
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.rule_index.get(name).copied()
    }

    /// All facts with their handles, in declaration order.
    pub fn facts(&self) -> impl Iterator<Item = (FactId, &Fact)> {
        self.facts
            .iter()
            .enumerate()
            .map(|(i, f)| (FactId::from_index(i), f))
    }

    /// All rules with their handles, in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, r)| (RuleId::from_index(i), r))
    }

    /// Rules whose consequent is `fact`, in declaration order.
    pub fn rules_deriving(&self, fact: FactId) -> &[RuleId] {
        &self.derivers[fact.index()]
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Names of the given rules, in the order given.
    pub fn rule_names(&self, ids: &[RuleId]) -> Vec<String> {
        ids.iter().map(|&id| self.rule(id).name.clone()).collect()
    }

    /// Whether the rule dependency graph (antecedent -> consequent) has a cycle.
    ///
    /// Both engines terminate on cyclic input; this exists for diagnostics.
    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.dependency_graph())
    }

    fn dependency_graph(&self) -> DiGraph<FactId, RuleId> {
        let mut graph = DiGraph::with_capacity(self.facts.len(), self.rules.len());
        let nodes: Vec<NodeIndex> = (0..self.facts.len())
            .map(|i| graph.add_node(FactId::from_index(i)))
            .collect();
        for (id, rule) in self.rules() {
            for &cond in &rule.conditionals {
                graph.add_edge(nodes[cond.index()], nodes[rule.derivation.index()], id);
            }
        }
        graph
    }
}

impl std::fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "knowledge base: {} facts, {} rules",
            self.facts.len(),
            self.rules.len()
        )
    }
}

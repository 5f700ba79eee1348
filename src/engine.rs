//! Engine facade: top-level API for the production system.
//!
//! The `Engine` holds a shared, immutable [`KnowledgeBase`] and the inference
//! configuration. Every call resolves names, runs one strategy over a fresh
//! working set, and reports the verdict with the names of the rules used.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ProdResult;
use crate::infer::{
    BackwardConfig, ForwardConfig, Inference, Strategy, infer_backward, infer_forward,
};
use crate::kb::KnowledgeBase;
use crate::loader::TaskDescription;
use crate::resolve::resolve;

/// Configuration for the production-system engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Forward-chaining settings.
    pub forward: ForwardConfig,
    /// Backward-chaining settings.
    pub backward: BackwardConfig,
}

/// Verdict of one inference call, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the query fact holds.
    pub derived: bool,
    /// Names of the rules that contributed, in application order.
    pub used_rules: Vec<String>,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Is derived: {}, used rules: [{}]",
            self.derived,
            self.used_rules.join(" ")
        )
    }
}

/// The production-system inference engine.
#[derive(Debug, Clone)]
pub struct Engine {
    kb: Arc<KnowledgeBase>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine over a shared knowledge base.
    pub fn new(kb: Arc<KnowledgeBase>, config: EngineConfig) -> Self {
        tracing::info!(
            facts = kb.fact_count(),
            rules = kb.rule_count(),
            policy = %config.backward.policy,
            "initializing production-system engine"
        );
        Self { kb, config }
    }

    /// Create an engine with the default configuration.
    pub fn from_knowledge_base(kb: KnowledgeBase) -> Self {
        Self::new(Arc::new(kb), EngineConfig::default())
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Shared handle to the knowledge base, for other engines or threads.
    pub fn shared_knowledge_base(&self) -> Arc<KnowledgeBase> {
        Arc::clone(&self.kb)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Data-driven inference: is `query` derivable from `true_facts`?
    pub fn forward<S: AsRef<str>>(&self, true_facts: &[S], query: &str) -> ProdResult<Verdict> {
        self.infer(Strategy::Forward, true_facts, query)
    }

    /// Goal-driven inference: is `query` derivable from `true_facts`?
    pub fn backward<S: AsRef<str>>(&self, true_facts: &[S], query: &str) -> ProdResult<Verdict> {
        self.infer(Strategy::Backward, true_facts, query)
    }

    /// Run `strategy` and report the verdict by name.
    pub fn infer<S: AsRef<str>>(
        &self,
        strategy: Strategy,
        true_facts: &[S],
        query: &str,
    ) -> ProdResult<Verdict> {
        let inference = self.explain(strategy, true_facts, query)?;
        Ok(Verdict {
            derived: inference.derived,
            used_rules: inference.rule_names(&self.kb),
        })
    }

    /// Run `strategy` and return the full result, including the final working set.
    pub fn explain<S: AsRef<str>>(
        &self,
        strategy: Strategy,
        true_facts: &[S],
        query: &str,
    ) -> ProdResult<Inference> {
        let resolved = resolve(&self.kb, true_facts, query)?;
        let inference = match strategy {
            Strategy::Forward => infer_forward(
                &self.kb,
                resolved.true_facts,
                resolved.query,
                &self.config.forward,
            ),
            Strategy::Backward => infer_backward(
                &self.kb,
                resolved.true_facts,
                resolved.query,
                &self.config.backward,
            ),
        };
        tracing::debug!(
            %strategy,
            query,
            derived = inference.derived,
            rules = inference.trail.len(),
            "inference complete"
        );
        Ok(inference)
    }

    /// Evaluate independent tasks in parallel. Results keep the task order.
    pub fn run_batch(
        &self,
        strategy: Strategy,
        tasks: &[TaskDescription],
    ) -> Vec<ProdResult<Verdict>> {
        tasks
            .par_iter()
            .map(|task| self.infer(strategy, &task.true_facts, &task.query))
            .collect()
    }
}

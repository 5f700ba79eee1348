//! Backward chaining: reason from a goal back to the true facts.
//!
//! A goal holds if it is in the working set, or if some rule deriving it (tried
//! in declaration order) has all of its antecedents satisfied. The first rule
//! that succeeds wins; its consequent joins the working set and the rule joins
//! the trail. Working set and trail are a single accumulator owned by the
//! [`Prover`], so additions made deep in the recursion reach the root call.
//!
//! A goal that is already being proved further up the current path is treated
//! as unprovable on that branch, which keeps cyclic rule graphs finite and
//! bounds the recursion depth by the number of facts.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::kb::{FactId, KnowledgeBase, RuleId};

use super::{Inference, WorkingSet};

/// When an antecedent counts as satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntecedentPolicy {
    /// The antecedent must already be in the working set before it is proved.
    /// Only one rule application separates the true facts from the goal, so
    /// this can derive less than forward chaining on the same input.
    #[default]
    Strict,
    /// The antecedent may itself be derived by recursing through its rules.
    Derivable,
}

impl std::fmt::Display for AntecedentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AntecedentPolicy::Strict => write!(f, "strict"),
            AntecedentPolicy::Derivable => write!(f, "derivable"),
        }
    }
}

/// Configuration for backward chaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackwardConfig {
    /// Antecedent semantics (default: [`AntecedentPolicy::Strict`]).
    pub policy: AntecedentPolicy,
    /// Maximum recursion depth (default: none). A goal deeper than this is
    /// unprovable on that branch.
    pub max_depth: Option<usize>,
}

/// Prove `query` from `working` using the rules of `kb`.
pub fn infer_backward(
    kb: &KnowledgeBase,
    working: WorkingSet,
    query: FactId,
    config: &BackwardConfig,
) -> Inference {
    if working.contains(query) {
        return Inference::immediate(working);
    }

    let mut prover = Prover::new(kb, config, working);
    let derived = prover.prove(query, 0);
    tracing::debug!(
        derived,
        expanded = prover.expanded,
        trail = prover.trail.len(),
        policy = %config.policy,
        "backward chaining finished"
    );

    Inference {
        derived,
        trail: prover.trail,
        working_set: prover.working,
        iterations: prover.expanded,
        exhaustive: !prover.cut_off,
    }
}

/// Mutable state of one backward-chaining call.
struct Prover<'a> {
    kb: &'a KnowledgeBase,
    config: &'a BackwardConfig,
    working: WorkingSet,
    trail: Vec<RuleId>,
    /// Goals on the current recursion path.
    in_progress: HashSet<FactId>,
    expanded: usize,
    cut_off: bool,
}

impl<'a> Prover<'a> {
    fn new(kb: &'a KnowledgeBase, config: &'a BackwardConfig, working: WorkingSet) -> Self {
        Self {
            kb,
            config,
            working,
            trail: Vec::new(),
            in_progress: HashSet::new(),
            expanded: 0,
            cut_off: false,
        }
    }

    fn prove(&mut self, goal: FactId, depth: usize) -> bool {
        if self.working.contains(goal) {
            return true;
        }
        if self.in_progress.contains(&goal) {
            tracing::trace!(goal = %goal, depth, "goal already on the proof path");
            return false;
        }
        if self.config.max_depth.is_some_and(|max| depth >= max) {
            self.cut_off = true;
            return false;
        }

        let kb = self.kb;
        self.expanded += 1;
        self.in_progress.insert(goal);

        let mut proved = false;
        for &rule_id in kb.rules_deriving(goal) {
            let rule = kb.rule(rule_id);
            let (working_mark, trail_mark) = (self.working.len(), self.trail.len());

            if rule
                .conditionals
                .iter()
                .all(|&cond| self.satisfies(cond, depth + 1))
            {
                tracing::trace!(rule = %rule.name, depth, "rule proves goal");
                self.trail.push(rule_id);
                self.working.insert(goal);
                proved = true;
                break;
            }

            // Undo what a failed alternative proved on the way.
            self.working.truncate(working_mark);
            self.trail.truncate(trail_mark);
        }

        self.in_progress.remove(&goal);
        proved
    }

    fn satisfies(&mut self, antecedent: FactId, depth: usize) -> bool {
        match self.config.policy {
            AntecedentPolicy::Strict => {
                self.working.contains(antecedent) && self.prove(antecedent, depth)
            }
            AntecedentPolicy::Derivable => self.prove(antecedent, depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;

    fn run(
        kb: &KnowledgeBase,
        true_facts: &[&str],
        query: &str,
        policy: AntecedentPolicy,
    ) -> Inference {
        let config = BackwardConfig {
            policy,
            ..Default::default()
        };
        let resolved = resolve(kb, true_facts, query).unwrap();
        infer_backward(kb, resolved.true_facts, resolved.query, &config)
    }

    fn conjunction_kb() -> KnowledgeBase {
        KnowledgeBase::builder()
            .fact("f1", "")
            .fact("f2", "")
            .fact("f3", "")
            .rule("R1", ["f1", "f2"], "f3")
            .build()
            .unwrap()
    }

    fn chain_kb() -> KnowledgeBase {
        KnowledgeBase::builder()
            .fact("a", "")
            .fact("b", "")
            .fact("c", "")
            .rule("R1", ["a"], "b")
            .rule("R2", ["b"], "c")
            .build()
            .unwrap()
    }

    #[test]
    fn one_step_proof_agrees_under_both_policies() {
        let kb = conjunction_kb();
        for policy in [AntecedentPolicy::Strict, AntecedentPolicy::Derivable] {
            let result = run(&kb, &["f1", "f2"], "f3", policy);
            assert!(result.derived, "{policy}");
            assert_eq!(result.rule_names(&kb), vec!["R1"], "{policy}");

            let result = run(&kb, &["f1"], "f3", policy);
            assert!(!result.derived, "{policy}");
            assert!(result.trail.is_empty(), "{policy}");
        }
    }

    #[test]
    fn strict_policy_does_not_recurse_into_unknown_antecedents() {
        let kb = chain_kb();
        let result = run(&kb, &["a"], "c", AntecedentPolicy::Strict);
        assert!(!result.derived);
        assert!(result.trail.is_empty());
        assert_eq!(result.working_set.names(&kb), vec!["a"]);
    }

    #[test]
    fn derivable_policy_recurses_through_the_chain() {
        let kb = chain_kb();
        let result = run(&kb, &["a"], "c", AntecedentPolicy::Derivable);
        assert!(result.derived);
        assert_eq!(result.rule_names(&kb), vec!["R1", "R2"]);
        assert_eq!(result.working_set.names(&kb), vec!["a", "b", "c"]);
    }

    #[test]
    fn query_already_true_is_the_base_case() {
        let kb = chain_kb();
        let result = run(&kb, &["c"], "c", AntecedentPolicy::Strict);
        assert!(result.derived);
        assert!(result.trail.is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn first_successful_rule_wins() {
        let kb = KnowledgeBase::builder()
            .fact("a", "")
            .fact("b", "")
            .fact("goal", "")
            .rule("via-a", ["a"], "goal")
            .rule("via-b", ["b"], "goal")
            .build()
            .unwrap();
        let result = run(&kb, &["a", "b"], "goal", AntecedentPolicy::Strict);
        assert_eq!(result.rule_names(&kb), vec!["via-a"]);

        let result = run(&kb, &["b"], "goal", AntecedentPolicy::Strict);
        assert_eq!(result.rule_names(&kb), vec!["via-b"]);
    }

    #[test]
    fn failed_alternative_leaves_no_trace() {
        // `first` proves `x` and then fails on `missing`; `second` succeeds.
        let kb = KnowledgeBase::builder()
            .fact("a", "")
            .fact("x", "")
            .fact("missing", "")
            .fact("goal", "")
            .rule("make-x", ["a"], "x")
            .rule("first", ["x", "missing"], "goal")
            .rule("second", ["a"], "goal")
            .build()
            .unwrap();
        let result = run(&kb, &["a"], "goal", AntecedentPolicy::Derivable);
        assert!(result.derived);
        assert_eq!(result.rule_names(&kb), vec!["second"]);
        assert_eq!(result.working_set.names(&kb), vec!["a", "goal"]);
    }

    #[test]
    fn cyclic_rules_terminate() {
        let kb = KnowledgeBase::builder()
            .fact("p", "")
            .fact("q", "")
            .fact("r", "")
            .rule("P->Q", ["p"], "q")
            .rule("Q->P", ["q"], "p")
            .rule("R->P", ["r"], "p")
            .build()
            .unwrap();
        let result = run(&kb, &[], "q", AntecedentPolicy::Derivable);
        assert!(!result.derived);

        let result = run(&kb, &["r"], "q", AntecedentPolicy::Derivable);
        assert!(result.derived);
        assert_eq!(result.rule_names(&kb), vec!["R->P", "P->Q"]);
    }

    #[test]
    fn depth_ceiling_cuts_the_search() {
        let kb = chain_kb();
        let config = BackwardConfig {
            policy: AntecedentPolicy::Derivable,
            max_depth: Some(1),
        };
        let resolved = resolve(&kb, &["a"], "c").unwrap();
        let result = infer_backward(&kb, resolved.true_facts, resolved.query, &config);
        assert!(!result.derived);
        assert!(!result.exhaustive);
    }

    #[test]
    fn repeated_calls_agree() {
        let kb = chain_kb();
        let first = run(&kb, &["a"], "c", AntecedentPolicy::Derivable);
        let second = run(&kb, &["a"], "c", AntecedentPolicy::Derivable);
        assert_eq!(first.derived, second.derived);
        assert_eq!(first.trail, second.trail);
    }
}

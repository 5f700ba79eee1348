//! Forward chaining: round-based fixpoint saturation.
//!
//! Every round scans the rules in declaration order against the working set
//! as it stood when the round began. A rule fires when its consequent is not
//! yet held and all of its antecedents are. The round's consequents become
//! visible only from the next round on, so the outcome of a round does not
//! depend on rule order. The run stops at the first round that fires nothing.

use serde::{Deserialize, Serialize};

use crate::kb::{FactId, KnowledgeBase, RuleId};

use super::{Inference, WorkingSet};

/// Configuration for forward chaining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Ceiling on productive rounds (default: none). Without a ceiling the
    /// run always reaches a fixpoint within `fact_count` rounds.
    pub max_rounds: Option<usize>,
}

/// Saturate `working` from the rules of `kb` and report whether `query` holds.
///
/// Every rule that fires is recorded, including two rules that produce the
/// same consequent in the same round; the fact itself enters the working set
/// once.
pub fn infer_forward(
    kb: &KnowledgeBase,
    mut working: WorkingSet,
    query: FactId,
    config: &ForwardConfig,
) -> Inference {
    if working.contains(query) {
        return Inference::immediate(working);
    }

    let mut trail: Vec<RuleId> = Vec::new();
    let mut rounds = 0;
    let mut reached_fixpoint = false;

    loop {
        let fired: Vec<RuleId> = kb
            .rules()
            .filter(|(_, rule)| {
                !working.contains(rule.derivation)
                    && rule.conditionals.iter().all(|&c| working.contains(c))
            })
            .map(|(id, _)| id)
            .collect();

        if fired.is_empty() {
            reached_fixpoint = true;
            break;
        }
        // Only a round that would fire counts against the ceiling.
        if config.max_rounds.is_some_and(|max| rounds >= max) {
            tracing::debug!(rounds, "forward chaining stopped at round ceiling");
            break;
        }

        rounds += 1;
        let before = working.len();
        for &id in &fired {
            working.insert(kb.rule(id).derivation);
        }
        tracing::debug!(
            round = rounds,
            fired = fired.len(),
            new_facts = working.len() - before,
            "forward round"
        );
        trail.extend(fired);
    }

    Inference {
        derived: working.contains(query),
        trail,
        working_set: working,
        iterations: rounds,
        exhaustive: reached_fixpoint,
    }
}

//! Validating construction of a [`KnowledgeBase`].
//!
//! Declarations are collected first and checked in one pass by
//! [`KnowledgeBaseBuilder::build`]: all facts in declaration order, then all
//! rules in declaration order. The first violation wins.

use std::collections::HashMap;

use crate::error::BuildError;

use super::{Fact, FactId, KnowledgeBase, MAX_ENTRIES, Rule, RuleId};

/// Every declaration needs a distinct 32-bit handle.
fn ensure_addressable(kind: &'static str, count: usize) -> Result<(), BuildError> {
    match count.checked_sub(1) {
        Some(last) if last > MAX_ENTRIES => Err(BuildError::TooManyEntries { kind, count }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone)]
struct PendingRule {
    name: String,
    conditionals: Vec<String>,
    derivation: String,
}

/// Collects fact and rule declarations and validates them into a
/// [`KnowledgeBase`].
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBaseBuilder {
    facts: Vec<Fact>,
    rules: Vec<PendingRule>,
}

impl KnowledgeBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a fact.
    pub fn fact(mut self, name: impl Into<String>, semantic_value: impl Into<String>) -> Self {
        self.add_fact(name, semantic_value);
        self
    }

    /// Declare a rule `conditionals -> derivation`.
    pub fn rule<I, S>(
        mut self,
        name: impl Into<String>,
        conditionals: I,
        derivation: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_rule(name, conditionals, derivation);
        self
    }

    pub fn add_fact(
        &mut self,
        name: impl Into<String>,
        semantic_value: impl Into<String>,
    ) -> &mut Self {
        self.facts.push(Fact {
            name: name.into(),
            semantic_value: semantic_value.into(),
        });
        self
    }

    pub fn add_rule<I, S>(
        &mut self,
        name: impl Into<String>,
        conditionals: I,
        derivation: impl Into<String>,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.push(PendingRule {
            name: name.into(),
            conditionals: conditionals.into_iter().map(Into::into).collect(),
            derivation: derivation.into(),
        });
        self
    }

    /// Validate every declaration and freeze the result.
    pub fn build(self) -> Result<KnowledgeBase, BuildError> {
        ensure_addressable("facts", self.facts.len())?;
        ensure_addressable("rules", self.rules.len())?;

        let mut fact_index: HashMap<String, FactId> = HashMap::with_capacity(self.facts.len());
        for (i, fact) in self.facts.iter().enumerate() {
            if fact_index.contains_key(&fact.name) {
                return Err(BuildError::DuplicateFact {
                    name: fact.name.clone(),
                });
            }
            fact_index.insert(fact.name.clone(), FactId::from_index(i));
        }

        let lookup = |rule: &str, fact: &str| {
            fact_index
                .get(fact)
                .copied()
                .ok_or_else(|| BuildError::UnknownFactReference {
                    rule: rule.to_string(),
                    fact: fact.to_string(),
                })
        };

        let mut rule_index: HashMap<String, RuleId> = HashMap::with_capacity(self.rules.len());
        let mut rules = Vec::with_capacity(self.rules.len());
        for (i, pending) in self.rules.into_iter().enumerate() {
            if rule_index.contains_key(&pending.name) {
                return Err(BuildError::DuplicateRule { name: pending.name });
            }

            let mut conditionals: Vec<FactId> = Vec::with_capacity(pending.conditionals.len());
            for name in &pending.conditionals {
                let id = lookup(&pending.name, name)?;
                // Antecedents are a set; keep the first occurrence only.
                if !conditionals.contains(&id) {
                    conditionals.push(id);
                }
            }
            let derivation = lookup(&pending.name, &pending.derivation)?;

            rule_index.insert(pending.name.clone(), RuleId::from_index(i));
            rules.push(Rule {
                name: pending.name,
                conditionals,
                derivation,
            });
        }

        let kb = KnowledgeBase::from_parts(self.facts, fact_index, rules, rule_index);
        if kb.is_cyclic() {
            tracing::warn!(
                facts = kb.fact_count(),
                rules = kb.rule_count(),
                "rule graph contains a cycle"
            );
        }
        tracing::debug!(facts = kb.fact_count(), rules = kb.rule_count(), "knowledge base built");
        Ok(kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_knowledge_base() {
        let kb = KnowledgeBaseBuilder::new()
            .fact("f1", "first")
            .fact("f2", "second")
            .fact("f3", "third")
            .rule("R1", ["f1", "f2"], "f3")
            .build()
            .unwrap();
        assert_eq!(kb.fact_count(), 3);
        assert_eq!(kb.rule_count(), 1);
        let r1 = kb.rule(kb.rule_id("R1").unwrap());
        assert_eq!(
            r1.conditionals,
            vec![kb.fact_id("f1").unwrap(), kb.fact_id("f2").unwrap()]
        );
    }

    #[test]
    fn rejects_duplicate_fact() {
        let err = KnowledgeBaseBuilder::new()
            .fact("f1", "one")
            .fact("f1", "again")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateFact { name: "f1".into() });
    }

    #[test]
    fn rejects_duplicate_rule() {
        let err = KnowledgeBaseBuilder::new()
            .fact("a", "")
            .fact("b", "")
            .rule("R", ["a"], "b")
            .rule("R", ["b"], "a")
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::DuplicateRule { name: "R".into() });
    }

    #[test]
    fn rejects_unknown_conditional() {
        let err = KnowledgeBaseBuilder::new()
            .fact("a", "")
            .rule("R", ["a", "ghost"], "a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownFactReference {
                rule: "R".into(),
                fact: "ghost".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_derivation() {
        let err = KnowledgeBaseBuilder::new()
            .fact("a", "")
            .rule("R", ["a"], "nowhere")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnknownFactReference { ref fact, .. } if fact == "nowhere"
        ));
    }

    #[test]
    fn facts_are_checked_before_rules() {
        // The dangling rule is declared first, but the duplicate fact wins.
        let mut builder = KnowledgeBaseBuilder::new();
        builder.add_rule("R", ["x"], "y");
        builder.add_fact("a", "").add_fact("a", "");
        let err = builder.build().unwrap_err();
        assert!(matches!(err, BuildError::DuplicateFact { .. }));
    }

    #[test]
    fn repeated_conditionals_collapse() {
        let kb = KnowledgeBaseBuilder::new()
            .fact("a", "")
            .fact("b", "")
            .rule("R", ["a", "a"], "b")
            .build()
            .unwrap();
        assert_eq!(kb.rule(kb.rule_id("R").unwrap()).conditionals.len(), 1);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn declaration_counts_must_fit_handles() {
        let limit = MAX_ENTRIES + 1;
        assert!(ensure_addressable("facts", 0).is_ok());
        assert!(ensure_addressable("facts", limit).is_ok());
        assert_eq!(
            ensure_addressable("rules", limit + 1),
            Err(BuildError::TooManyEntries {
                kind: "rules",
                count: limit + 1,
            })
        );
    }

    #[test]
    fn cyclic_rules_still_build() {
        // A cycle is only reported through the builder's warning.
        let kb = KnowledgeBaseBuilder::new()
            .fact("p", "")
            .fact("q", "")
            .rule("P->Q", ["p"], "q")
            .rule("Q->P", ["q"], "p")
            .build()
            .unwrap();
        assert!(kb.is_cyclic());
        assert_eq!(kb.rule_count(), 2);
    }

    #[test]
    fn rule_without_conditionals_is_allowed() {
        let kb = KnowledgeBaseBuilder::new()
            .fact("axiom", "")
            .rule("R0", Vec::<String>::new(), "axiom")
            .build()
            .unwrap();
        assert!(kb.rule(kb.rule_id("R0").unwrap()).conditionals.is_empty());
    }
}

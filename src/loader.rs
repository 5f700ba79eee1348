//! Loading knowledge bases, tasks, and engine configuration from disk.
//!
//! Knowledge bases and tasks are JSON by default; a `.toml` extension selects
//! TOML. Engine configuration is always TOML.
//!
//! ```json
//! {
//!   "facts": [{"name": "f1", "semantic_value": "it rains"}],
//!   "rules": [{"name": "R1", "conditionals": ["f1"], "derivation": "f2"}]
//! }
//! ```

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::error::LoadError;
use crate::kb::{Fact, KnowledgeBase, KnowledgeBaseBuilder};

/// Serialized form of a rule: facts are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescription {
    pub name: String,
    #[serde(default)]
    pub conditionals: Vec<String>,
    pub derivation: String,
}

/// Serialized form of a knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBaseDescription {
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub rules: Vec<RuleDescription>,
}

impl KnowledgeBaseDescription {
    /// Validate the description through the builder.
    pub fn into_knowledge_base(self) -> Result<KnowledgeBase, LoadError> {
        let mut builder = KnowledgeBaseBuilder::new();
        for fact in self.facts {
            builder.add_fact(fact.name, fact.semantic_value);
        }
        for rule in self.rules {
            builder.add_rule(rule.name, rule.conditionals, rule.derivation);
        }
        Ok(builder.build()?)
    }

    /// Describe an existing knowledge base.
    pub fn from_knowledge_base(kb: &KnowledgeBase) -> Self {
        Self {
            facts: kb.facts().map(|(_, f)| f.clone()).collect(),
            rules: kb
                .rules()
                .map(|(_, r)| RuleDescription {
                    name: r.name.clone(),
                    conditionals: r
                        .conditionals
                        .iter()
                        .map(|&c| kb.fact(c).name.clone())
                        .collect(),
                    derivation: kb.fact(r.derivation).name.clone(),
                })
                .collect(),
        }
    }
}

/// One inference task: the facts held true and the fact to derive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescription {
    #[serde(default)]
    pub true_facts: Vec<String>,
    pub query: String,
}

impl TaskDescription {
    pub fn new<I, S>(true_facts: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            true_facts: true_facts.into_iter().map(Into::into).collect(),
            query: query.into(),
        }
    }
}

/// Load and validate a knowledge base.
pub fn load_knowledge_base(path: &Path) -> Result<KnowledgeBase, LoadError> {
    let description: KnowledgeBaseDescription = load_document(path)?;
    let kb = description.into_knowledge_base()?;
    tracing::info!(
        path = %path.display(),
        facts = kb.fact_count(),
        rules = kb.rule_count(),
        "loaded knowledge base"
    );
    Ok(kb)
}

/// Load a task description.
pub fn load_task(path: &Path) -> Result<TaskDescription, LoadError> {
    load_document(path)
}

/// Load an engine configuration (TOML).
pub fn load_config(path: &Path) -> Result<EngineConfig, LoadError> {
    let content = read(path)?;
    toml::from_str(&content).map_err(|source| LoadError::Toml {
        path: path.display().to_string(),
        source,
    })
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = read(path)?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(&content).map_err(|source| LoadError::Toml {
            path: path.display().to_string(),
            source,
        })
    } else {
        serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.display().to_string(),
            source,
        })
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    const KB_JSON: &str = r#"{
        "facts": [
            {"name": "f1", "semantic_value": "it rains"},
            {"name": "f2", "semantic_value": "no umbrella"},
            {"name": "f3", "semantic_value": "wet"}
        ],
        "rules": [
            {"name": "R1", "conditionals": ["f1", "f2"], "derivation": "f3"}
        ]
    }"#;

    #[test]
    fn parses_json_description() {
        let description: KnowledgeBaseDescription = serde_json::from_str(KB_JSON).unwrap();
        let kb = description.into_knowledge_base().unwrap();
        assert_eq!(kb.fact_count(), 3);
        let f1 = kb.fact(kb.fact_id("f1").unwrap());
        assert_eq!(f1.semantic_value, "it rains");
    }

    #[test]
    fn description_validation_reports_build_errors() {
        let description: KnowledgeBaseDescription = serde_json::from_str(
            r#"{"facts": [{"name": "a", "semantic_value": ""}],
                "rules": [{"name": "R", "conditionals": ["a"], "derivation": "b"}]}"#,
        )
        .unwrap();
        let err = description.into_knowledge_base().unwrap_err();
        assert!(matches!(
            err,
            LoadError::Build(BuildError::UnknownFactReference { .. })
        ));
    }

    #[test]
    fn description_survives_a_knowledge_base() {
        let description: KnowledgeBaseDescription = serde_json::from_str(KB_JSON).unwrap();
        let kb = description.clone().into_knowledge_base().unwrap();
        assert_eq!(KnowledgeBaseDescription::from_knowledge_base(&kb), description);
    }

    #[test]
    fn task_defaults_to_no_true_facts() {
        let task: TaskDescription = serde_json::from_str(r#"{"query": "f3"}"#).unwrap();
        assert!(task.true_facts.is_empty());
        assert_eq!(task.query, "f3");
    }

    #[test]
    fn parses_toml_task() {
        let task: TaskDescription =
            toml::from_str("true_facts = [\"f1\", \"f2\"]\nquery = \"f3\"\n").unwrap();
        assert_eq!(task, TaskDescription::new(["f1", "f2"], "f3"));
    }
}

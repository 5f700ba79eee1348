//! Name resolution: caller-supplied fact names to [`FactId`] handles.

use crate::error::QueryError;
use crate::infer::WorkingSet;
use crate::kb::{FactId, KnowledgeBase};

/// The handles behind one inference call's names.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Initial working set, in the order the names were supplied.
    pub true_facts: WorkingSet,
    pub query: FactId,
}

/// Resolve every true-fact name and then the query name.
///
/// Fails on the first name the knowledge base does not declare. Repeated
/// true-fact names collapse into a single working-set entry.
pub fn resolve<S: AsRef<str>>(
    kb: &KnowledgeBase,
    true_fact_names: &[S],
    query_name: &str,
) -> Result<Resolved, QueryError> {
    let mut true_facts = WorkingSet::with_capacity(kb.fact_count());
    for name in true_fact_names {
        true_facts.insert(lookup(kb, name.as_ref())?);
    }
    let query = lookup(kb, query_name)?;
    Ok(Resolved { true_facts, query })
}

fn lookup(kb: &KnowledgeBase, name: &str) -> Result<FactId, QueryError> {
    kb.fact_id(name).ok_or_else(|| QueryError::UnknownFact {
        name: name.to_string(),
    })
}

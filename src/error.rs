//! Rich diagnostic error types for the production system.
//!
//! Errors are split by the phase that raises them: [`BuildError`] while a
//! knowledge base is validated, [`QueryError`] before an inference call does
//! any work, and [`LoadError`] while reading descriptions from disk. Each
//! derives a miette `#[diagnostic]` with an error code and help text.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the production system.
#[derive(Debug, Error, Diagnostic)]
pub enum ProdError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
}

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BuildError {
    #[error("duplicate fact: {name}")]
    #[diagnostic(
        code(prodsys::build::duplicate_fact),
        help("Fact names must be unique within a knowledge base. Rename or remove the second declaration.")
    )]
    DuplicateFact { name: String },

    #[error("duplicate rule: {name}")]
    #[diagnostic(
        code(prodsys::build::duplicate_rule),
        help("Rule names must be unique within a knowledge base. Rename or remove the second declaration.")
    )]
    DuplicateRule { name: String },

    #[error("unknown fact name {fact} in rule {rule}")]
    #[diagnostic(
        code(prodsys::build::unknown_fact_reference),
        help(
            "Every conditional and the derivation of a rule must name a fact \
             declared in the same knowledge base. Declare the fact first."
        )
    )]
    UnknownFactReference { rule: String, fact: String },

    #[error("too many {kind}: {count} declared, handles address at most 2^32")]
    #[diagnostic(
        code(prodsys::build::too_many_entries),
        help("Split the knowledge base; fact and rule handles are 32-bit indices.")
    )]
    TooManyEntries { kind: &'static str, count: usize },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum QueryError {
    #[error("unknown fact: {name}")]
    #[diagnostic(
        code(prodsys::query::unknown_fact),
        help(
            "True facts and the query must name facts declared in the knowledge base. \
             Run `prodsys check` to list what the knowledge base contains."
        )
    )]
    UnknownFact { name: String },
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    #[diagnostic(
        code(prodsys::load::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    #[diagnostic(
        code(prodsys::load::json),
        help(
            "A knowledge base lists `facts` (name, semantic_value) and `rules` \
             (name, conditionals, derivation). A task lists `true_facts` and a `query`."
        )
    )]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    #[diagnostic(
        code(prodsys::load::toml),
        help("Check the TOML syntax and field names.")
    )]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildError),
}

/// Convenience alias for functions returning production-system results.
pub type ProdResult<T> = std::result::Result<T, ProdError>;

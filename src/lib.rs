// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # production-system
//!
//! A propositional production system: decide whether a query fact follows
//! from a set of true facts and a set of implication rules.
//!
//! ## Architecture
//!
//! - **Knowledge base** (`kb`): facts and rules behind arena handles, validated
//!   once by [`KnowledgeBaseBuilder`](kb::KnowledgeBaseBuilder) and immutable after
//! - **Resolution** (`resolve`): caller fact names to handles
//! - **Inference** (`infer`): forward chaining (fixpoint saturation) and
//!   backward chaining (goal-driven proof search)
//! - **Engine** (`engine`): name-based facade with configuration and batch queries
//! - **Loader** (`loader`): JSON/TOML descriptions of knowledge bases and tasks
//!
//! ## Library usage
//!
//! ```
//! use production_system::engine::Engine;
//! use production_system::kb::KnowledgeBase;
//!
//! let kb = KnowledgeBase::builder()
//!     .fact("f1", "it rains")
//!     .fact("f2", "no umbrella")
//!     .fact("f3", "wet")
//!     .rule("R1", ["f1", "f2"], "f3")
//!     .build()
//!     .unwrap();
//! let engine = Engine::from_knowledge_base(kb);
//!
//! let verdict = engine.forward(&["f1", "f2"], "f3").unwrap();
//! assert!(verdict.derived);
//! assert_eq!(verdict.used_rules, vec!["R1"]);
//! ```

pub mod engine;
pub mod error;
pub mod infer;
pub mod kb;
pub mod loader;
pub mod resolve;

//! # os2cx: OpenSCAD Front-End for Finite Element Analysis
//!
//! os2cx reads a parametric OpenSCAD model whose objects are declared through
//! a small directive library, and builds the project configuration that the
//! meshing and solver stages consume: solids to mesh, named selection regions,
//! loads, and analysis settings.
//!
//! ## Directive Protocol
//!
//! The model is never inspected directly. Instead the evaluator runs it with
//! an injected *mode* parameter, and the directive library answers through
//! `echo()` statements on the evaluator's diagnostic channel:
//!
//! ```text
//! OpenSCAD → stderr → Parser → Statement Stream → Dispatcher → Handlers → Project
//! ```
//!
//! ### Stage 1: Evaluation
//!
//! The [`evaluator`] module launches the external evaluator through the
//! [`evaluator::Evaluator`] trait, collecting its echoed statements, warnings
//! and any top-level geometry ([`geometry`]).
//!
//! ### Stage 2: Parsing
//!
//! The [`parser`] module reads `ECHO:` lines into [`statement::Statement`]s of
//! typed [`value::Value`]s.
//!
//! ### Stage 3: Dispatch
//!
//! The [`directive`] module recognizes statements carrying the directive
//! marker, checks their arity and argument types, and applies them to the
//! [`project::Project`]. Uniqueness, references, and selection capacity are
//! enforced here.
//!
//! ### Stage 4: Object Extraction
//!
//! The [`extract`] module re-runs the evaluator once per declared object to
//! realize its geometry; [`runner`] sequences the stages with checkpoints,
//! optionally on a background task.
//!
//! ## Errors
//!
//! Every stage reports through [`ProjectError`]: a malformed statement
//! (decorated with the statement's text), a configuration error, an evaluator
//! failure, or an interrupt. None of them is recovered; the stage's partial
//! results are discarded.

pub mod config;
pub mod directive;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod geometry;
pub mod parser;
pub mod project;
pub mod runner;
pub mod statement;
pub mod units;
pub mod value;

// Re-exports
pub use error::*;
pub use project::Project;
pub use statement::{Statement, StatementStream};
pub use value::Value;

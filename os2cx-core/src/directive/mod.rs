//! # Directive Dispatch
//!
//! Source descriptions declare their objects by calling library modules that
//! `echo()` a directive instead of (in inventory mode) producing geometry:
//!
//! ```text
//! ECHO: "__openscad2calculix", "mesh_directive", "block"
//! ECHO: "__openscad2calculix", "load_volume_directive", "gravity", "block", -9.8
//! ```
//!
//! A statement is a directive when its first value is the string [`MARKER`].
//! The second value names the subdirective and selects a [`DirectiveKind`];
//! the remaining values are that directive's arguments. Every kind has a
//! fixed arity, checked here uniformly before its handler runs.
//!
//! ## Errors
//!
//! Handlers fail with a [`DirectiveError`]. Malformed statements are
//! re-raised as [`ProjectError::MalformedStatement`] carrying the rendered
//! statement, so the user can find the offending line. Configuration errors
//! already describe themselves and pass through unchanged.

pub mod check;
pub mod error;
pub mod handlers;

use std::str::FromStr;

use tracing::debug;

use crate::error::{ProjectError, ProjectResult};
use crate::project::{BIT_CAPACITY, Project};
use crate::statement::Statement;
use crate::value::Value;
use check::check_arg_count;
use error::{ConfigurationError, DirectiveError, DirectiveResult, StatementError};

/// First value of every directive statement.
pub const MARKER: &str = "__openscad2calculix";

pub type Handler = fn(&mut Project, &[Value]) -> DirectiveResult<()>;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::EnumString,
    strum::Display,
    strum::EnumIter,
    strum::AsRefStr,
)]
pub enum DirectiveKind {
    #[strum(serialize = "analysis_directive")]
    Analysis,
    #[strum(serialize = "mesh_directive")]
    Mesh,
    #[strum(serialize = "select_volume_directive")]
    SelectVolume,
    #[strum(serialize = "select_surface_directive")]
    SelectSurface,
    #[strum(serialize = "load_volume_directive")]
    LoadVolume,
}

/// Row of the dispatch table.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveEntry {
    /// Short name used in diagnostics.
    pub label: &'static str,
    pub arity: usize,
    pub handler: Handler,
}

impl DirectiveKind {
    pub fn entry(self) -> DirectiveEntry {
        match self {
            DirectiveKind::Analysis => DirectiveEntry {
                label: "analysis",
                arity: 2,
                handler: handlers::analysis,
            },
            DirectiveKind::Mesh => DirectiveEntry {
                label: "mesh",
                arity: 1,
                handler: handlers::mesh,
            },
            DirectiveKind::SelectVolume => DirectiveEntry {
                label: "select_volume",
                arity: 1,
                handler: handlers::select_volume,
            },
            DirectiveKind::SelectSurface => DirectiveEntry {
                label: "select_surface",
                arity: 3,
                handler: handlers::select_surface,
            },
            DirectiveKind::LoadVolume => DirectiveEntry {
                label: "load_volume",
                arity: 3,
                handler: handlers::load_volume,
            },
        }
    }
}

pub fn is_directive(statement: &Statement) -> bool {
    matches!(statement.first(), Some(Value::String(tag)) if tag == MARKER)
}

/// Applies one statement to the project. Statements that aren't directives
/// are skipped; returns whether the statement was a directive.
pub fn dispatch(project: &mut Project, statement: &Statement) -> ProjectResult<bool> {
    if !is_directive(statement) {
        return Ok(false);
    }
    apply(project, statement).map_err(|e| match e {
        DirectiveError::Malformed(source) => ProjectError::MalformedStatement {
            statement: statement.to_string(),
            source,
        },
        DirectiveError::Configuration(e) => ProjectError::Configuration(e),
    })?;
    Ok(true)
}

fn apply(project: &mut Project, statement: &Statement) -> DirectiveResult<()> {
    let values = statement.values();
    let subdirective = match values.get(1) {
        Some(Value::String(name)) => name,
        _ => return Err(StatementError::MissingSubdirective.into()),
    };
    let kind = DirectiveKind::from_str(subdirective)
        .map_err(|_| StatementError::UnknownDirective(subdirective.clone()))?;

    let entry = kind.entry();
    let args = &values[2..];
    check_arg_count(args, entry.arity, entry.label)?;

    debug!("{} directive with {} arguments", entry.label, args.len());
    (entry.handler)(project, args)
}

/// Checks that only make sense once every directive has been seen.
pub fn finalize(project: &Project) -> ProjectResult<()> {
    if project.bit_capacity_exceeded() {
        return Err(ConfigurationError::TooManySelections {
            count: project.selection_count(),
            limit: BIT_CAPACITY,
        }
        .into());
    }
    if project.analysis_deck.is_empty() {
        return Err(ConfigurationError::MissingAnalysisDirective.into());
    }
    Ok(())
}

/// Runs the whole statement stream through the dispatcher, then [`finalize`].
#[tracing::instrument(level = "debug", skip_all, fields(statements = statements.len()))]
pub fn apply_directives(project: &mut Project, statements: &[Statement]) -> ProjectResult<()> {
    let mut directives = 0;
    for statement in statements {
        if dispatch(project, statement)? {
            directives += 1;
        }
    }
    debug!("{} directives applied", directives);
    finalize(project)
}

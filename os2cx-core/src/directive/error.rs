use thiserror::Error;

use crate::project::Namespace;
use crate::units::UnitParseError;

/// A single statement could not be read as a directive call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatementError {
    #[error("missing or malformed subdirective")]
    MissingSubdirective,
    #[error("unknown directive: {0}")]
    UnknownDirective(String),
    #[error("wrong number of arguments to {directive}: expected {expected}, found {found}")]
    WrongArgumentCount {
        directive: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("expected vector to have {expected} elements, found {found}")]
    WrongVectorLength { expected: usize, found: usize },
    #[error("invalid object name '{0}': only letters, digits and '_' are allowed")]
    InvalidName(String),
    #[error("empty analysis_directive")]
    EmptyAnalysisDeck,
}

/// A directive was well-formed but breaks a rule spanning the whole project.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(
        "Can't declare a new {kind} named '{name}' because there already exists a {existing} named '{name}'."
    )]
    NameInUse {
        kind: Namespace,
        existing: Namespace,
        name: String,
    },
    #[error("Load '{load}' refers to volume '{volume}', which does not exist (yet).")]
    MissingVolume { load: String, volume: String },
    #[error(
        "There are too many os2cx_select_volume() and/or os2cx_select_surface() directives. \
         There are {count}, but the limit is {limit}."
    )]
    TooManySelections { count: usize, limit: usize },
    #[error("Can't have multiple os2cx_analysis_...() directives in the same file.")]
    MultipleAnalysisDirectives,
    #[error("Please specify an os2cx_analysis_...() directive.")]
    MissingAnalysisDirective,
    #[error("The unit system must name exactly three units (length, mass, time), not {found}.")]
    BadUnitTriple { found: usize },
    #[error("Invalid unit system in analysis directive: {0}")]
    InvalidUnitSystem(#[from] UnitParseError),
    #[error(
        "All toplevel geometry must be wrapped in a directive such as 'os2cx_mesh()'; \
         for example, 'os2cx_mesh() cube(...)' instead of 'cube(...)'. \
         Your file has some toplevel geometry that isn't properly wrapped."
    )]
    UnwrappedGeometry,
    #[error("Empty {kind} '{name}'.")]
    EmptyObject { kind: Namespace, name: String },
}

/// What a directive handler can fail with. The dispatcher decorates
/// [`DirectiveError::Malformed`] with the statement text and passes
/// [`DirectiveError::Configuration`] through untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    #[error(transparent)]
    Malformed(#[from] StatementError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

pub type DirectiveResult<T> = Result<T, DirectiveError>;

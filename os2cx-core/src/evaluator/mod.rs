//! # Evaluator Boundary
//!
//! The geometry evaluator is an external program. This module defines the
//! seam the rest of the crate talks to ([`Evaluator`]) and the request it
//! receives ([`Invocation`]); [`openscad::OpenscadEvaluator`] is the
//! implementation that launches the real process.
//!
//! Every invocation carries a *mode* parameter, injected as a top-level
//! variable, which tells the directive library inside the source description
//! what to emit:
//!
//! * `["inventory"]`: declare every object through directives, emit no geometry
//! * `[<object kind>, <name>]`: emit the geometry of exactly one object

pub mod openscad;

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::DiagnosticParseError;
use crate::statement::StatementStream;
use crate::value::Value;

pub use openscad::OpenscadEvaluator;

/// Name of the injected variable that selects what the source description emits.
pub const MODE_VARIABLE: &str = "__openscad2calculix_mode";

/// Mode value requesting the directive inventory.
pub const INVENTORY_MODE: &str = "inventory";

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    /// File name stem of the geometry file written into `output_dir`.
    pub output_stem: String,
    pub defines: BTreeMap<String, Value>,
}

impl Invocation {
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, stem: &str) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            output_stem: stem.to_string(),
            defines: BTreeMap::new(),
        }
    }

    pub fn with_define(mut self, name: &str, value: Value) -> Self {
        self.defines.insert(name.to_string(), value);
        self
    }

    pub fn with_mode(self, mode: Value) -> Self {
        self.with_define(MODE_VARIABLE, mode)
    }

    pub fn mode(&self) -> Option<&Value> {
        self.defines.get(MODE_VARIABLE)
    }

    pub fn geometry_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.off", self.output_stem))
    }

    /// [`Invocation::geometry_path`], provided the stem names a plain file
    /// directly inside `output_dir`.
    pub fn checked_geometry_path(&self) -> EvaluatorResult<PathBuf> {
        let stem = self.output_stem.as_str();
        let plain = !stem.is_empty()
            && !stem.contains(['/', '\\'])
            && Path::new(stem).file_name() == Some(OsStr::new(stem));
        if !plain {
            return Err(EvaluatorError::InvalidStem(stem.to_string()));
        }
        Ok(self.geometry_path())
    }
}

#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("openscad exited with {status}:\n{stderr}")]
    Failed { status: String, stderr: String },
    #[error(transparent)]
    UnparsableEcho(#[from] DiagnosticParseError),
    #[error("failed to read geometry file {path}: {message}")]
    UnreadableGeometry { path: PathBuf, message: String },
    #[error("invalid geometry file stem '{0}'")]
    InvalidStem(String),
    #[error("no evaluator command configured")]
    NoCommand,
}

impl EvaluatorError {
    pub fn unreadable_geometry(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::UnreadableGeometry {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub type EvaluatorResult<T> = Result<T, EvaluatorError>;

/// Runs the geometry evaluator once and blocks until it has finished.
#[cfg_attr(test, mockall::automock)]
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, invocation: &Invocation) -> EvaluatorResult<StatementStream>;
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::{Evaluator, EvaluatorError, EvaluatorResult, Invocation};
use crate::config::SystemConfig;
use crate::geometry::Poly3;
use crate::parser::parse_diagnostics;
use crate::statement::StatementStream;

/// Launches OpenSCAD as a subprocess, exporting top-level geometry to OFF.
#[derive(Debug, Clone)]
pub struct OpenscadEvaluator {
    /// Program followed by any leading arguments, e.g. `["xvfb-run", "openscad"]`.
    command: Vec<String>,
    library_path: Option<PathBuf>,
}

impl Default for OpenscadEvaluator {
    fn default() -> Self {
        Self::new(vec!["openscad".to_string()])
    }
}

impl OpenscadEvaluator {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            library_path: None,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            command: config.openscad_command.clone(),
            library_path: config.library_path.clone(),
        }
    }

    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    fn build_command(&self, invocation: &Invocation, geometry_path: &Path) -> EvaluatorResult<Command> {
        let (program, leading_args) = self
            .command
            .split_first()
            .ok_or(EvaluatorError::NoCommand)?;

        let mut command = Command::new(program);
        command.args(leading_args).arg("-o").arg(geometry_path);
        for (name, value) in &invocation.defines {
            command.arg("-D").arg(format!("{}={}", name, value));
        }
        command.arg(&invocation.source);

        if let Some(library_path) = &self.library_path {
            command.env("OPENSCADPATH", library_path);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }
}

impl Evaluator for OpenscadEvaluator {
    #[tracing::instrument(level = "debug", skip(self, invocation), fields(stem = %invocation.output_stem))]
    fn evaluate(&self, invocation: &Invocation) -> EvaluatorResult<StatementStream> {
        let geometry_file = GeometryFile::claim(invocation.checked_geometry_path()?);
        let mut command = self.build_command(invocation, geometry_file.path())?;
        info!("running {:?}", command);

        let output = command.output().map_err(|source| EvaluatorError::Spawn {
            program: self.command.first().cloned().unwrap_or_default(),
            source,
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(EvaluatorError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let diagnostics = parse_diagnostics(&stderr)?;
        let geometry = geometry_file.read()?;
        debug!(
            "{} statements, {} warnings, geometry: {}",
            diagnostics.statements.len(),
            diagnostics.warnings.len(),
            geometry.is_some()
        );

        Ok(StatementStream {
            geometry,
            warnings: diagnostics.warnings,
            statements: diagnostics.statements,
        })
    }
}

/// The geometry file one invocation writes. Removed when dropped, on every
/// exit path of [`OpenscadEvaluator::evaluate`].
struct GeometryFile {
    path: PathBuf,
}

impl GeometryFile {
    fn claim(path: PathBuf) -> Self {
        // a stale file from an earlier run must not be mistaken for this run's output
        remove_if_present(&path);
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or empty file means the evaluator produced no geometry.
    fn read(&self) -> EvaluatorResult<Option<Poly3>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EvaluatorError::unreadable_geometry(&self.path, e)),
        };
        let poly = Poly3::from_off(&text)
            .map_err(|e| EvaluatorError::unreadable_geometry(&self.path, e))?;
        Ok(poly.filter(|poly| !poly.is_empty()))
    }
}

impl Drop for GeometryFile {
    fn drop(&mut self) {
        remove_if_present(&self.path);
    }
}

fn remove_if_present(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            warn!("failed to remove {}: {}", path.display(), e);
        }
    }
}

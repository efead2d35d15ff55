//! Renders a project configuration for the terminal or as JSON.

use std::fmt::Write as _;

use os2cx_core::Project;
use os2cx_core::geometry::{Poly3, Vector};
use os2cx_core::project::{LoadObject, MaxTetVolume, Namespace, Progress};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to format report: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySummary {
    pub vertices: usize,
    pub faces: usize,
}

impl From<&Poly3> for GeometrySummary {
    fn from(poly: &Poly3) -> Self {
        Self {
            vertices: poly.vertices.len(),
            faces: poly.faces.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshReport {
    pub name: String,
    /// `None` when the tet volume is chosen automatically.
    pub max_tet_volume: Option<f64>,
    pub solid: Option<GeometrySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub bit_index: u32,
    pub kind: Namespace,
    pub name: String,
    pub mask: Option<GeometrySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub name: String,
    pub target: String,
    pub kind: &'static str,
    pub force: Vector,
}

/// What `os2cx` prints about a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReport {
    pub scad_path: String,
    pub progress: Progress,
    pub units: Option<String>,
    pub analysis_deck: Vec<String>,
    pub meshes: Vec<MeshReport>,
    /// Ordered by bit index.
    pub selections: Vec<SelectionReport>,
    pub loads: Vec<LoadReport>,
    pub approx_scale: f64,
}

impl ProjectReport {
    pub fn new(project: &Project) -> Self {
        let meshes = project
            .mesh_objects
            .iter()
            .map(|(name, mesh)| MeshReport {
                name: name.clone(),
                max_tet_volume: match mesh.max_tet_volume {
                    MaxTetVolume::Auto => None,
                    MaxTetVolume::Fixed(volume) => Some(volume),
                },
                solid: mesh.solid.as_ref().map(GeometrySummary::from),
            })
            .collect();

        let selections = project
            .selections_by_bit()
            .into_iter()
            .map(|(bit_index, kind, name)| {
                let mask = match kind {
                    Namespace::Volume => project
                        .select_volume_objects
                        .get(name)
                        .and_then(|o| o.mask.as_ref()),
                    _ => project
                        .select_surface_objects
                        .get(name)
                        .and_then(|o| o.mask.as_ref()),
                };
                SelectionReport {
                    bit_index,
                    kind,
                    name: name.to_string(),
                    mask: mask.map(GeometrySummary::from),
                }
            })
            .collect();

        let loads = project
            .load_objects
            .iter()
            .map(|(name, load)| {
                let (kind, force) = match load {
                    LoadObject::Volume { force_density, .. } => ("volume", *force_density),
                    LoadObject::Surface { force_per_area, .. } => ("surface", *force_per_area),
                };
                LoadReport {
                    name: name.clone(),
                    target: load.target().to_string(),
                    kind,
                    force,
                }
            })
            .collect();

        Self {
            scad_path: project.scad_path.display().to_string(),
            progress: project.progress,
            units: project.unit_system.as_ref().map(ToString::to_string),
            analysis_deck: project.analysis_deck.clone(),
            meshes,
            selections,
            loads,
            approx_scale: project.approx_scale,
        }
    }

    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_text(&self) -> ReportResult<String> {
        let mut out = String::new();
        writeln!(out, "Project: {} ({})", self.scad_path, self.progress)?;
        writeln!(out, "Units: {}", self.units.as_deref().unwrap_or("(none)"))?;

        writeln!(out, "Analysis:")?;
        for line in &self.analysis_deck {
            writeln!(out, "  {}", line)?;
        }

        writeln!(out, "Meshes:")?;
        for mesh in &self.meshes {
            write!(out, "  {}", mesh.name)?;
            if let Some(volume) = mesh.max_tet_volume {
                write!(out, " max_tet_volume={}", volume)?;
            }
            write_geometry(&mut out, mesh.solid.as_ref())?;
            writeln!(out)?;
        }

        writeln!(out, "Selections:")?;
        for selection in &self.selections {
            write!(
                out,
                "  {:>2} {:<8} {}",
                selection.bit_index,
                selection.kind.as_ref(),
                selection.name
            )?;
            write_geometry(&mut out, selection.mask.as_ref())?;
            writeln!(out)?;
        }

        writeln!(out, "Loads:")?;
        for load in &self.loads {
            writeln!(
                out,
                "  {} on {} {}: ({}, {}, {})",
                load.name, load.kind, load.target, load.force.x, load.force.y, load.force.z
            )?;
        }

        if self.approx_scale > 0.0 {
            writeln!(out, "Approximate scale: {}", self.approx_scale)?;
        }
        Ok(out)
    }
}

fn write_geometry(out: &mut String, geometry: Option<&GeometrySummary>) -> std::fmt::Result {
    match geometry {
        Some(g) => write!(out, " [{} vertices, {} faces]", g.vertices, g.faces),
        None => Ok(()),
    }
}

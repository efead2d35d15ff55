//! Extraction passes: one evaluator invocation in inventory mode to build the
//! project configuration, then one invocation per declared object to realize
//! its geometry.

use tracing::{debug, info, warn};

use crate::directive::apply_directives;
use crate::directive::error::ConfigurationError;
use crate::error::ProjectResult;
use crate::evaluator::{Evaluator, INVENTORY_MODE, Invocation};
use crate::geometry::Poly3;
use crate::project::{Namespace, Progress, Project};
use crate::statement::StatementStream;
use crate::value::Value;

fn log_warnings(stream: &StatementStream) {
    for warning in &stream.warnings {
        warn!("openscad: WARNING: {}", warning);
    }
}

/// Runs the source description in inventory mode and applies every directive
/// it echoes. The project is replaced only when the whole pass succeeds.
#[tracing::instrument(level = "debug", skip_all, fields(scad = %project.scad_path.display()))]
pub fn extract_inventory(project: &mut Project, evaluator: &dyn Evaluator) -> ProjectResult<()> {
    let invocation = Invocation::new(
        project.scad_path.clone(),
        project.temp_dir.clone(),
        "inventory",
    )
    .with_mode(Value::from(vec![INVENTORY_MODE]));

    let stream = evaluator.evaluate(&invocation)?;
    log_warnings(&stream);
    if stream.has_geometry() {
        return Err(ConfigurationError::UnwrappedGeometry.into());
    }

    let mut staged = project.clone();
    apply_directives(&mut staged, &stream.statements)?;
    staged.progress = Progress::InventoryDone;

    info!(
        "inventory: {} meshes, {} selections, {} loads",
        staged.mesh_objects.len(),
        staged.selection_count(),
        staged.load_objects.len()
    );
    *project = staged;
    Ok(())
}

/// Asks the evaluator for the geometry of the single object `name`.
pub fn extract_poly3(
    project: &Project,
    namespace: Namespace,
    name: &str,
    evaluator: &dyn Evaluator,
) -> ProjectResult<Poly3> {
    let empty = || ConfigurationError::EmptyObject {
        kind: namespace,
        name: name.to_string(),
    };
    // loads have no geometry of their own
    let kind = namespace.extraction_kind().ok_or_else(empty)?;

    let invocation = Invocation::new(project.scad_path.clone(), project.temp_dir.clone(), name)
        .with_mode(Value::from(vec![kind, name]));
    let stream = evaluator.evaluate(&invocation)?;
    log_warnings(&stream);

    let poly = stream.geometry.ok_or_else(empty)?;
    debug!(
        "{} '{}': {} vertices, {} faces",
        kind,
        name,
        poly.vertices.len(),
        poly.faces.len()
    );
    Ok(poly)
}

/// Realizes every mesh, select-volume and select-surface object and derives
/// the project's length scale. Staged like [`extract_inventory`].
#[tracing::instrument(level = "debug", skip_all)]
pub fn extract_objects(project: &mut Project, evaluator: &dyn Evaluator) -> ProjectResult<()> {
    let mut staged = project.clone();
    for (namespace, name) in project.geometric_objects() {
        let poly = extract_poly3(project, namespace, &name, evaluator)?;
        match namespace {
            Namespace::Mesh => {
                if let Some(mesh) = staged.mesh_objects.get_mut(&name) {
                    mesh.solid = Some(poly);
                }
            }
            Namespace::Volume => {
                if let Some(select) = staged.select_volume_objects.get_mut(&name) {
                    select.mask = Some(poly);
                }
            }
            Namespace::Surface => {
                if let Some(select) = staged.select_surface_objects.get_mut(&name) {
                    select.mask = Some(poly);
                }
            }
            Namespace::Load => {}
        }
    }

    staged.approx_scale = staged
        .mesh_objects
        .values()
        .filter_map(|mesh| mesh.solid.as_ref())
        .map(Poly3::approx_scale)
        .fold(0.0, f64::max);
    staged.progress = Progress::PolysDone;

    info!("objects extracted, approx scale {}", staged.approx_scale);
    *project = staged;
    Ok(())
}

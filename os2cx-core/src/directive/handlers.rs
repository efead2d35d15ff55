//! Directive handlers.
//!
//! Each handler receives the arguments that follow the subdirective name,
//! already checked against the directive's arity by the dispatcher. Handlers
//! validate every argument before touching the project, so a failing
//! directive leaves no trace.

use tracing::debug;

use super::DirectiveKind;
use super::check::{check_name_new, check_number, check_string, check_vector, check_vector_3};
use super::error::{ConfigurationError, DirectiveError, DirectiveResult, StatementError};
use crate::geometry::Vector;
use crate::project::{
    LoadObject, MeshObject, Namespace, Project, SelectSurfaceObject, SelectVolumeObject,
};
use crate::units::UnitSystem;
use crate::value::Value;

/// Fallback for a slice pattern that doesn't match; label and arity come
/// from the dispatch table.
fn arity_error(kind: DirectiveKind, args: &[Value]) -> DirectiveError {
    let entry = kind.entry();
    StatementError::WrongArgumentCount {
        directive: entry.label,
        expected: entry.arity,
        found: args.len(),
    }
    .into()
}

/// `analysis_directive(deck, [length, mass, time])`
pub fn analysis(project: &mut Project, args: &[Value]) -> DirectiveResult<()> {
    let [deck, units] = args else {
        return Err(arity_error(DirectiveKind::Analysis, args));
    };

    if !project.analysis_deck.is_empty() || project.unit_system.is_some() {
        return Err(ConfigurationError::MultipleAnalysisDirectives.into());
    }

    let deck: Vec<String> = check_vector(deck, check_string)?
        .into_iter()
        .map(str::to_string)
        .collect();
    if deck.is_empty() {
        return Err(StatementError::EmptyAnalysisDeck.into());
    }

    let units = check_vector(units, check_string)?;
    let [length, mass, time] = units.as_slice() else {
        return Err(ConfigurationError::BadUnitTriple {
            found: units.len(),
        }
        .into());
    };
    let unit_system = UnitSystem::new(length, mass, time).map_err(ConfigurationError::from)?;

    debug!("analysis deck of {} lines, units {}", deck.len(), unit_system);
    project.analysis_deck = deck;
    project.unit_system = Some(unit_system);
    Ok(())
}

/// `mesh_directive(name)`
pub fn mesh(project: &mut Project, args: &[Value]) -> DirectiveResult<()> {
    let [name] = args else {
        return Err(arity_error(DirectiveKind::Mesh, args));
    };
    let name = check_name_new(name, Namespace::Mesh, project)?;

    debug!("mesh '{}'", name);
    project.mesh_objects.insert(name, MeshObject::default());
    Ok(())
}

/// `select_volume_directive(name)`
pub fn select_volume(project: &mut Project, args: &[Value]) -> DirectiveResult<()> {
    let [name] = args else {
        return Err(arity_error(DirectiveKind::SelectVolume, args));
    };
    let name = check_name_new(name, Namespace::Volume, project)?;

    // May run past the label width; the inventory pass checks the total at the end.
    let bit_index = project.allocate_bit_index();
    debug!("select_volume '{}' -> bit {}", name, bit_index);
    project.select_volume_objects.insert(
        name,
        SelectVolumeObject {
            bit_index,
            mask: None,
        },
    );
    Ok(())
}

/// `select_surface_directive(name, direction, angle_tolerance)`
pub fn select_surface(project: &mut Project, args: &[Value]) -> DirectiveResult<()> {
    let [name, direction, tolerance] = args else {
        return Err(arity_error(DirectiveKind::SelectSurface, args));
    };
    let name = check_name_new(name, Namespace::Surface, project)?;
    let direction_vector = check_vector_3(direction)?;
    let direction_angle_tolerance = check_number(tolerance)?;

    let bit_index = project.allocate_bit_index();
    debug!("select_surface '{}' -> bit {}", name, bit_index);
    project.select_surface_objects.insert(
        name,
        SelectSurfaceObject {
            bit_index,
            direction_vector,
            direction_angle_tolerance,
            mask: None,
        },
    );
    Ok(())
}

/// `load_volume_directive(name, volume, force_density_z)`
pub fn load_volume(project: &mut Project, args: &[Value]) -> DirectiveResult<()> {
    let [name, volume, force] = args else {
        return Err(arity_error(DirectiveKind::LoadVolume, args));
    };
    let name = check_name_new(name, Namespace::Load, project)?;
    let volume = check_string(volume)?;
    let force = check_number(force)?;

    if project.find_volume_object(volume).is_none() {
        return Err(ConfigurationError::MissingVolume {
            load: name,
            volume: volume.to_string(),
        }
        .into());
    }

    debug!("load '{}' on '{}': {}", name, volume, force);
    project.load_objects.insert(
        name,
        LoadObject::Volume {
            volume: volume.to_string(),
            force_density: Vector::new(0.0, 0.0, force),
        },
    );
    Ok(())
}

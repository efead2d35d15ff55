//! # Project Configuration
//!
//! [`Project`] is the root data structure of the pipeline. It starts empty,
//! is populated by the directive handlers during one inventory pass, gets its
//! objects' geometry filled in by the object extraction stage, and is then
//! read (never re-populated) by meshing and solver stages.
//!
//! ## Namespaces
//!
//! Objects live in four name-keyed tables: mesh objects, select-volume
//! objects, select-surface objects and loads. A name is unique across all
//! four at once; [`Project::namespace_of`] reports which table holds a name.
//!
//! ## Bit indices
//!
//! Every selection object receives a bit index used downstream to label
//! piecewise-linear-complex regions with a fixed-width bitmask. Bit
//! [`BIT_INDEX_SOLID`] is reserved for "inside the base solid", so
//! allocation starts right after it and at most [`BIT_CAPACITY`] selection
//! objects fit into a label of [`LABEL_BITS`] bits.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::{Poly3, Vector};
use crate::units::UnitSystem;

pub type BitIndex = u32;

/// Width of the region label shared with the piecewise-linear-complex encoding.
pub const LABEL_BITS: BitIndex = 64;

/// Reserved bit meaning "inside the base solid".
pub const BIT_INDEX_SOLID: BitIndex = 0;

/// Number of selection objects a label can represent.
pub const BIT_CAPACITY: usize = (LABEL_BITS - BIT_INDEX_SOLID - 1) as usize;

pub type ObjectName = String;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
pub enum Progress {
    #[default]
    NothingDone,
    InventoryDone,
    PolysDone,
}

impl Progress {
    pub const ALL_DONE: Progress = Progress::PolysDone;
}

/// The four tables a name can be declared in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Namespace {
    Mesh,
    Volume,
    Surface,
    Load,
}

impl Namespace {
    /// Object kind passed to the evaluator to materialize one object of this
    /// namespace; loads have no geometry of their own.
    pub fn extraction_kind(self) -> Option<&'static str> {
        match self {
            Namespace::Mesh => Some("mesh"),
            Namespace::Volume => Some("select_volume"),
            Namespace::Surface => Some("select_surface"),
            Namespace::Load => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MaxTetVolume {
    /// Choose a value from the size of the solid.
    #[default]
    Auto,
    Fixed(f64),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshObject {
    pub max_tet_volume: MaxTetVolume,
    #[serde(skip)]
    pub solid: Option<Poly3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectVolumeObject {
    pub bit_index: BitIndex,
    #[serde(skip)]
    pub mask: Option<Poly3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectSurfaceObject {
    pub bit_index: BitIndex,
    pub direction_vector: Vector,
    /// In the angle unit of the source description (degrees for OpenSCAD).
    pub direction_angle_tolerance: f64,
    #[serde(skip)]
    pub mask: Option<Poly3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadObject {
    Volume {
        volume: ObjectName,
        force_density: Vector,
    },
    Surface {
        surface: ObjectName,
        force_per_area: Vector,
    },
}

impl LoadObject {
    /// Name of the volume or surface the load is applied to.
    pub fn target(&self) -> &str {
        match self {
            LoadObject::Volume { volume, .. } => volume,
            LoadObject::Surface { surface, .. } => surface,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialObject {
    pub youngs_modulus: f64,
    pub poissons_ratio: f64,
}

/// A volume-like object: something loads can be applied to and results measured over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeRef<'a> {
    Mesh(&'a MeshObject),
    Select(&'a SelectVolumeObject),
}

/// Result of resolving a name that must denote exactly one geometric object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectRef<'a> {
    Mesh(&'a MeshObject),
    SelectVolume(&'a SelectVolumeObject),
    SelectSurface(&'a SelectSurfaceObject),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub scad_path: PathBuf,
    pub temp_dir: PathBuf,

    pub progress: Progress,
    pub errored: bool,

    pub unit_system: Option<UnitSystem>,
    /// Solver directive lines chosen by the analysis directive.
    pub analysis_deck: Vec<String>,

    pub next_bit_index: BitIndex,

    pub mesh_objects: BTreeMap<ObjectName, MeshObject>,
    pub select_volume_objects: BTreeMap<ObjectName, SelectVolumeObject>,
    pub select_surface_objects: BTreeMap<ObjectName, SelectSurfaceObject>,
    pub load_objects: BTreeMap<ObjectName, LoadObject>,
    pub material_objects: BTreeMap<ObjectName, MaterialObject>,

    /// Rough length scale of the model; zero until object geometry is loaded.
    pub approx_scale: f64,
}

impl Project {
    pub fn new(scad_path: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            scad_path: scad_path.into(),
            temp_dir: temp_dir.into(),
            progress: Progress::NothingDone,
            errored: false,
            unit_system: None,
            analysis_deck: Vec::new(),
            next_bit_index: BIT_INDEX_SOLID + 1,
            mesh_objects: BTreeMap::new(),
            select_volume_objects: BTreeMap::new(),
            select_surface_objects: BTreeMap::new(),
            load_objects: BTreeMap::new(),
            material_objects: BTreeMap::new(),
            approx_scale: 0.0,
        }
    }

    /// The table already holding `name`, if any.
    pub fn namespace_of(&self, name: &str) -> Option<Namespace> {
        if self.mesh_objects.contains_key(name) {
            Some(Namespace::Mesh)
        } else if self.select_volume_objects.contains_key(name) {
            Some(Namespace::Volume)
        } else if self.select_surface_objects.contains_key(name) {
            Some(Namespace::Surface)
        } else if self.load_objects.contains_key(name) {
            Some(Namespace::Load)
        } else {
            None
        }
    }

    /// Hands out the next bit index. Never checked here: the inventory pass
    /// compares the total against [`BIT_CAPACITY`] once all directives are in.
    pub fn allocate_bit_index(&mut self) -> BitIndex {
        let index = self.next_bit_index;
        self.next_bit_index += 1;
        index
    }

    pub fn selection_count(&self) -> usize {
        self.select_volume_objects.len() + self.select_surface_objects.len()
    }

    pub fn bit_capacity_exceeded(&self) -> bool {
        self.next_bit_index > LABEL_BITS
    }

    pub fn find_volume_object(&self, name: &str) -> Option<VolumeRef<'_>> {
        if let Some(mesh) = self.mesh_objects.get(name) {
            return Some(VolumeRef::Mesh(mesh));
        }
        self.select_volume_objects.get(name).map(VolumeRef::Select)
    }

    pub fn find_surface_object(&self, name: &str) -> Option<&SelectSurfaceObject> {
        self.select_surface_objects.get(name)
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectRef<'_>> {
        match self.namespace_of(name)? {
            Namespace::Mesh => self.mesh_objects.get(name).map(ObjectRef::Mesh),
            Namespace::Volume => self.select_volume_objects.get(name).map(ObjectRef::SelectVolume),
            Namespace::Surface => self
                .select_surface_objects
                .get(name)
                .map(ObjectRef::SelectSurface),
            Namespace::Load => None,
        }
    }

    /// Names of every object with geometry to extract, with its namespace.
    pub fn geometric_objects(&self) -> Vec<(Namespace, ObjectName)> {
        let meshes = self.mesh_objects.keys().map(|n| (Namespace::Mesh, n.clone()));
        let volumes = self
            .select_volume_objects
            .keys()
            .map(|n| (Namespace::Volume, n.clone()));
        let surfaces = self
            .select_surface_objects
            .keys()
            .map(|n| (Namespace::Surface, n.clone()));
        meshes.chain(volumes).chain(surfaces).collect()
    }

    /// Selection objects as `(bit index, namespace, name)`, ordered by bit index.
    pub fn selections_by_bit(&self) -> Vec<(BitIndex, Namespace, &str)> {
        let mut selections: Vec<_> = self
            .select_volume_objects
            .iter()
            .map(|(name, o)| (o.bit_index, Namespace::Volume, name.as_str()))
            .chain(
                self.select_surface_objects
                    .iter()
                    .map(|(name, o)| (o.bit_index, Namespace::Surface, name.as_str())),
            )
            .collect();
        selections.sort_by_key(|(bit, _, _)| *bit);
        selections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        let mut project = Project::new("part.scad", "/tmp");
        project
            .mesh_objects
            .insert("block".to_string(), MeshObject::default());
        let bit = project.allocate_bit_index();
        project.select_volume_objects.insert(
            "core".to_string(),
            SelectVolumeObject {
                bit_index: bit,
                mask: None,
            },
        );
        let bit = project.allocate_bit_index();
        project.select_surface_objects.insert(
            "top".to_string(),
            SelectSurfaceObject {
                bit_index: bit,
                direction_vector: Vector::new(0.0, 0.0, 1.0),
                direction_angle_tolerance: 10.0,
                mask: None,
            },
        );
        project.load_objects.insert(
            "push".to_string(),
            LoadObject::Volume {
                volume: "block".to_string(),
                force_density: Vector::new(0.0, 0.0, -1.0),
            },
        );
        project
    }

    #[test]
    fn test_new_project_is_empty() {
        let project = Project::new("part.scad", "/tmp");
        assert_eq!(project.progress, Progress::NothingDone);
        assert_eq!(project.next_bit_index, 1);
        assert_eq!(project.selection_count(), 0);
        assert!(!project.bit_capacity_exceeded());
        assert!(project.unit_system.is_none());
    }

    #[test]
    fn test_namespace_of() {
        let project = sample_project();
        assert_eq!(project.namespace_of("block"), Some(Namespace::Mesh));
        assert_eq!(project.namespace_of("core"), Some(Namespace::Volume));
        assert_eq!(project.namespace_of("top"), Some(Namespace::Surface));
        assert_eq!(project.namespace_of("push"), Some(Namespace::Load));
        assert_eq!(project.namespace_of("Block"), None);
    }

    #[test]
    fn test_find_object_resolves_exactly_one() {
        let project = sample_project();
        assert!(matches!(project.find_object("block"), Some(ObjectRef::Mesh(_))));
        assert!(matches!(
            project.find_object("core"),
            Some(ObjectRef::SelectVolume(o)) if o.bit_index == 1
        ));
        assert!(matches!(
            project.find_object("top"),
            Some(ObjectRef::SelectSurface(o)) if o.bit_index == 2
        ));
        assert_eq!(project.find_object("push"), None);
        assert_eq!(project.find_object("nothing"), None);
    }

    #[test]
    fn test_volume_and_surface_lookup() {
        let project = sample_project();
        assert!(matches!(project.find_volume_object("block"), Some(VolumeRef::Mesh(_))));
        assert!(matches!(project.find_volume_object("core"), Some(VolumeRef::Select(_))));
        assert!(project.find_volume_object("top").is_none());
        assert!(project.find_surface_object("top").is_some());
        assert!(project.find_surface_object("core").is_none());
    }

    #[test]
    fn test_selections_by_bit_and_geometric_objects() {
        let project = sample_project();
        assert_eq!(
            project.selections_by_bit(),
            vec![(1, Namespace::Volume, "core"), (2, Namespace::Surface, "top")]
        );
        assert_eq!(project.geometric_objects().len(), 3);
        assert_eq!(project.load_objects["push"].target(), "block");
    }

    #[test]
    fn test_capacity_constants() {
        assert_eq!(BIT_CAPACITY, 63);
        let mut project = Project::new("part.scad", "/tmp");
        for _ in 0..BIT_CAPACITY {
            project.allocate_bit_index();
        }
        assert!(!project.bit_capacity_exceeded());
        project.allocate_bit_index();
        assert!(project.bit_capacity_exceeded());
    }

    #[test]
    fn test_snapshot_serializes_without_geometry() {
        let mut project = sample_project();
        project.mesh_objects.get_mut("block").unwrap().solid = Some(Poly3::default());
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["mesh_objects"]["block"]["max_tet_volume"], "Auto");
        assert!(json["mesh_objects"]["block"].get("solid").is_none());
        assert_eq!(json["select_volume_objects"]["core"]["bit_index"], 1);
    }
}

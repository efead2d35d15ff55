//! # Solid Geometry
//!
//! The evaluator is asked to write its top-level geometry as an OFF file
//! (Object File Format). This module holds the in-memory form of that file,
//! [`Poly3`], and the reader that produces it. Geometry is only carried here,
//! never processed: later stages turn it into piecewise-linear complexes and
//! meshes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vector,
    pub max: Vector,
}

impl BoundingBox {
    pub fn extent(&self) -> Vector {
        Vector::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }
}

/// A polyhedral solid: vertex positions and faces as vertex index loops.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Poly3 {
    pub vertices: Vec<Vector>,
    pub faces: Vec<Vec<u32>>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OffError {
    #[error("missing OFF header")]
    MissingHeader,
    #[error("unexpected end of file while reading {0}")]
    UnexpectedEof(&'static str),
    #[error("invalid {what}: '{found}'")]
    InvalidNumber { what: &'static str, found: String },
    #[error("vertex count {0} exceeds the 32-bit index range")]
    TooManyVertices(usize),
    #[error("face {face} refers to vertex {index}, but there are only {count} vertices")]
    VertexOutOfRange { face: usize, index: u32, count: usize },
}

pub type OffResult<T> = Result<T, OffError>;

/// Upper bound on capacity reserved from header counts; larger files grow as read.
const PREALLOC_LIMIT: usize = 1 << 16;

impl Poly3 {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.vertices.first()?;
        let mut bbox = BoundingBox {
            min: first,
            max: first,
        };
        for v in &self.vertices[1..] {
            bbox.min = Vector::new(bbox.min.x.min(v.x), bbox.min.y.min(v.y), bbox.min.z.min(v.z));
            bbox.max = Vector::new(bbox.max.x.max(v.x), bbox.max.y.max(v.y), bbox.max.z.max(v.z));
        }
        Some(bbox)
    }

    /// Largest bounding-box extent along any axis; zero for an empty solid.
    pub fn approx_scale(&self) -> f64 {
        self.bounding_box()
            .map(|bbox| {
                let e = bbox.extent();
                e.x.max(e.y).max(e.z)
            })
            .unwrap_or(0.0)
    }

    /// Reads an OFF document. Returns `Ok(None)` for a document with no content
    /// at all, which is how the evaluator reports empty top-level output.
    #[tracing::instrument(level = "debug", skip(text))]
    pub fn from_off(text: &str) -> OffResult<Option<Self>> {
        let mut words = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace);

        let header = match words.next() {
            None => return Ok(None),
            Some(header) => header,
        };
        if header != "OFF" {
            return Err(OffError::MissingHeader);
        }

        let vertex_count = next_usize(&mut words, "vertex count")?;
        let face_count = next_usize(&mut words, "face count")?;
        let _edge_count = next_usize(&mut words, "edge count")?;
        if u32::try_from(vertex_count).is_err() {
            return Err(OffError::TooManyVertices(vertex_count));
        }

        let mut vertices = Vec::with_capacity(vertex_count.min(PREALLOC_LIMIT));
        for _ in 0..vertex_count {
            let x = next_f64(&mut words)?;
            let y = next_f64(&mut words)?;
            let z = next_f64(&mut words)?;
            vertices.push(Vector::new(x, y, z));
        }

        let mut faces = Vec::with_capacity(face_count.min(PREALLOC_LIMIT));
        for face in 0..face_count {
            let corners = next_usize(&mut words, "face size")?;
            let mut indices = Vec::with_capacity(corners.min(PREALLOC_LIMIT));
            for _ in 0..corners {
                let index = next_usize(&mut words, "vertex index")?;
                if index >= vertex_count {
                    return Err(OffError::VertexOutOfRange {
                        face,
                        index: index as u32,
                        count: vertex_count,
                    });
                }
                indices.push(index as u32);
            }
            faces.push(indices);
        }

        Ok(Some(Self { vertices, faces }))
    }
}

fn next_usize<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> OffResult<usize> {
    let word = words.next().ok_or(OffError::UnexpectedEof(what))?;
    word.parse().map_err(|_| OffError::InvalidNumber {
        what,
        found: word.to_string(),
    })
}

fn next_f64<'a>(words: &mut impl Iterator<Item = &'a str>) -> OffResult<f64> {
    let word = words.next().ok_or(OffError::UnexpectedEof("vertex"))?;
    word.parse().map_err(|_| OffError::InvalidNumber {
        what: "coordinate",
        found: word.to_string(),
    })
}

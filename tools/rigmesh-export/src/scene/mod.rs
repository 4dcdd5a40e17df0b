//! In-memory scene graph handed over by an importer
//!
//! The scene keeps the importer's conventions: row-major matrices, 3-component
//! UVs, faces of any arity and bones that reference scene nodes by name only.
//! The export pipeline reads it and never keeps references into it.

mod gltf;
mod index;
mod postprocess;
mod tree;

use std::path::Path;

use glam::{Quat, Vec3};
use thiserror::Error;

use rigmesh_common::MAX_UV_CHANNELS;

pub use self::gltf::GltfImporter;
pub use index::NodeIndex;
pub use postprocess::PostProcess;
pub use tree::{Node, NodeId, NodeTree};

/// 4×4 matrix in row-major order
///
/// `rows[0]` holds `a1..a4`, `rows[3]` holds `d1..d4`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMatrix {
    pub rows: [[f32; 4]; 4],
}

impl SourceMatrix {
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build from column arrays (the layout glTF and glam use)
    pub fn from_columns(cols: [[f32; 4]; 4]) -> Self {
        let mut rows = [[0.0f32; 4]; 4];
        for (c, col) in cols.iter().enumerate() {
            for (r, &v) in col.iter().enumerate() {
                rows[r][c] = v;
            }
        }
        Self { rows }
    }
}

impl Default for SourceMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Polygon as a list of vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFace {
    pub indices: Vec<u32>,
}

impl SourceFace {
    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }
}

/// Influence of a bone on one vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// Bone as stored by the importer: bound to a node by name
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBone {
    pub name: String,
    /// Mesh space to bone space in bind pose
    pub offset: SourceMatrix,
    pub weights: Vec<VertexWeight>,
}

/// Mesh as stored by the importer
///
/// Optional attributes are `None` when the source file did not provide them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMesh {
    pub name: String,
    pub vertices: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec3>>,
    pub uv_channels: [Option<Vec<Vec3>>; MAX_UV_CHANNELS],
    pub faces: Vec<SourceFace>,
    pub bones: Vec<SourceBone>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

/// Keyframes targeting one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceNodeAnim {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scaling_keys: Vec<VectorKey>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceAnimation {
    pub name: String,
    /// Duration in ticks
    pub duration: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<SourceNodeAnim>,
}

/// Loaded scene: node hierarchy plus flat mesh and animation lists
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub nodes: NodeTree,
    pub meshes: Vec<SourceMesh>,
    pub animations: Vec<SourceAnimation>,
}

impl SceneGraph {
    /// Scene with only a root node
    pub fn new(root_name: impl Into<String>, root_transform: SourceMatrix) -> Self {
        Self {
            nodes: NodeTree::new(root_name, root_transform),
            meshes: Vec::new(),
            animations: Vec::new(),
        }
    }
}

/// Importer failure
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("glTF error: {0}")]
    Gltf(#[from] ::gltf::Error),

    #[error("invalid scene data: {0}")]
    Invalid(String),

    #[error("unsupported scene content: {0}")]
    Unsupported(String),
}

/// Scene file loader
///
/// Dropping the returned [`SceneGraph`] releases everything the importer
/// allocated.
pub trait SceneImporter {
    fn import(&self, path: &Path, flags: PostProcess) -> Result<SceneGraph, ImportError>;
}

impl<T: SceneImporter + ?Sized> SceneImporter for &T {
    fn import(&self, path: &Path, flags: PostProcess) -> Result<SceneGraph, ImportError> {
        (**self).import(path, flags)
    }
}

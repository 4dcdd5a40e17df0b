//! Scene -> mesh normalization pipeline
//!
//! For every source mesh the steps run in a fixed order:
//! 1. [`extract_attributes`] copies geometry and UV channels
//! 2. [`resolve_bones`] builds the skeleton from bones and scene nodes
//! 3. [`pack_weights`] scatters bone weights into four slots per vertex
//! 4. [`extract_animations`] attaches the scene's animations
//!
//! The scene is only borrowed; the returned meshes own all their data.

mod animation;
mod attributes;
mod bones;
mod diagnostics;
mod weights;

use std::path::Path;

use glam::Quat;

use rigmesh_common::Mesh;

use crate::error::LoadError;
use crate::scene::{GltfImporter, NodeIndex, PostProcess, SceneGraph, SceneImporter, SourceMesh};

pub use animation::{extract_animations, DEFAULT_ROOT_CORRECTION};
pub use attributes::{extract_attributes, Attributes};
pub use bones::resolve_bones;
pub use diagnostics::{Diagnostics, DroppedInfluence};
pub use weights::{pack_weights, PackedWeights};

/// Settings for one conversion run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Post-processing requested from the importer
    pub postprocess: PostProcess,
    /// Rotation composed onto every animation root transform
    pub root_correction: Quat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            postprocess: PostProcess::DEFAULT,
            root_correction: DEFAULT_ROOT_CORRECTION,
        }
    }
}

/// A mesh record plus what had to be patched up to build it
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMesh {
    pub mesh: Mesh,
    pub diagnostics: Diagnostics,
}

/// Flatten one source mesh of `scene`
pub fn convert_mesh(
    scene: &SceneGraph,
    source: &SourceMesh,
    index: &NodeIndex,
    options: &ExportOptions,
) -> ConvertedMesh {
    let mut diagnostics = Diagnostics::default();

    let attributes = extract_attributes(source, &mut diagnostics);
    let bones = resolve_bones(source, &scene.nodes, index, &mut diagnostics);

    let vertex_count = attributes.vertices.len();
    let packed = if bones.is_empty() {
        PackedWeights::default()
    } else {
        pack_weights(&source.bones, vertex_count, &mut diagnostics)
    };

    let animations = extract_animations(scene, &bones, options.root_correction, &mut diagnostics);

    let mesh = Mesh {
        vertex_count: vertex_count as u32,
        face_count: attributes.faces.len() as u32,
        bone_count: bones.len() as u32,
        vertices: attributes.vertices,
        normals: attributes.normals,
        tangents: attributes.tangents,
        faces: attributes.faces,
        uv_channels: attributes.uv_channels,
        bones,
        vertex_weights: packed.weights,
        vertex_weight_ids: packed.bone_ids,
        animations,
    };

    diagnostics.log(&source.name);
    tracing::debug!(
        "Converted mesh '{}': {} vertices, {} faces, {} bones, {} UV channels, {} animations",
        source.name,
        mesh.vertex_count,
        mesh.face_count,
        mesh.bone_count,
        mesh.uv_channel_count(),
        mesh.animations.len()
    );

    ConvertedMesh { mesh, diagnostics }
}

/// Flatten every mesh of `scene`, in scene order
///
/// Every mesh receives the full animation list of the scene.
pub fn convert_scene(scene: &SceneGraph, options: &ExportOptions) -> Vec<ConvertedMesh> {
    let index = NodeIndex::build(&scene.nodes);
    scene
        .meshes
        .iter()
        .map(|source| convert_mesh(scene, source, &index, options))
        .collect()
}

/// Load a scene file with `importer` and convert all its meshes
///
/// Fails when the importer fails or the scene has no meshes. The scene is
/// dropped before returning.
pub fn parse_file_with<I: SceneImporter>(
    importer: &I,
    path: &Path,
    options: &ExportOptions,
) -> Result<Vec<ConvertedMesh>, LoadError> {
    let scene = importer
        .import(path, options.postprocess)
        .map_err(|source| LoadError::Import {
            path: path.to_path_buf(),
            source,
        })?;

    if scene.meshes.is_empty() {
        return Err(LoadError::NoMeshes {
            path: path.to_path_buf(),
        });
    }

    tracing::info!(
        "Loaded {:?}: {} mesh(es), {} animation(s)",
        path,
        scene.meshes.len(),
        scene.animations.len()
    );

    Ok(convert_scene(&scene, options))
}

/// Load a glTF/GLB file with default options
pub fn parse_file(path: &Path) -> Result<Vec<Mesh>, LoadError> {
    let converted = parse_file_with(&GltfImporter, path, &ExportOptions::default())?;
    Ok(converted.into_iter().map(|c| c.mesh).collect())
}

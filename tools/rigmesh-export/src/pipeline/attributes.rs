//! Per-vertex attributes and faces of one source mesh

use glam::{Vec2, Vec3};

use rigmesh_common::{MeshFace, MAX_UV_CHANNELS};

use super::Diagnostics;
use crate::scene::SourceMesh;

/// Geometry part of a mesh record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pub vertices: Vec<Vec3>,
    /// Empty when the source had no normals
    pub normals: Vec<Vec3>,
    /// Empty when the source had no tangents
    pub tangents: Vec<Vec3>,
    pub uv_channels: [Option<Vec<Vec2>>; MAX_UV_CHANNELS],
    pub faces: Vec<MeshFace>,
}

/// Copy geometry out of the source mesh
///
/// UVs keep only their first two components. Faces that are not triangles or
/// that index past the last vertex are skipped, and optional arrays of the
/// wrong length are treated as absent.
pub fn extract_attributes(source: &SourceMesh, diagnostics: &mut Diagnostics) -> Attributes {
    let vertex_count = source.vertices.len();

    let mut per_vertex = |label: &str, values: Option<&Vec<Vec3>>| -> Option<Vec<Vec3>> {
        let values = values?;
        if values.len() != vertex_count {
            diagnostics.malformed_attributes.push(label.to_string());
            return None;
        }
        Some(values.clone())
    };

    let normals = per_vertex("normals", source.normals.as_ref()).unwrap_or_default();
    let tangents = per_vertex("tangents", source.tangents.as_ref()).unwrap_or_default();

    let mut uv_channels: [Option<Vec<Vec2>>; MAX_UV_CHANNELS] = Default::default();
    for (channel, slot) in uv_channels.iter_mut().enumerate() {
        let label = format!("uv{channel}");
        *slot = per_vertex(&label, source.uv_channels[channel].as_ref())
            .map(|uvs| uvs.iter().map(|uv| uv.truncate()).collect());
    }

    let mut faces = Vec::with_capacity(source.faces.len());
    for face in &source.faces {
        match face.indices[..] {
            [a, b, c] if [a, b, c].iter().all(|&i| (i as usize) < vertex_count) => {
                faces.push([a, b, c])
            }
            [_, _, _] => diagnostics.invalid_faces += 1,
            _ => diagnostics.skipped_faces += 1,
        }
    }

    Attributes {
        vertices: source.vertices.clone(),
        normals,
        tangents,
        uv_channels,
        faces,
    }
}

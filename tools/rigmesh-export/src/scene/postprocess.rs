//! Post-processing steps requested from an importer
//!
//! The flag set mirrors the usual importer post-processing switches. The steps
//! implemented here work on any [`SourceMesh`], so every importer can share them.

use bitflags::bitflags;
use glam::Vec3;

use rigmesh_common::MAX_BONE_INFLUENCES;

use super::{ImportError, SourceFace, SourceMesh};

bitflags! {
    /// Importer post-processing switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PostProcess: u32 {
        /// Merge vertices that are identical in every attribute
        const JOIN_IDENTICAL_VERTICES = 1 << 0;
        /// Split polygons into triangles
        const TRIANGULATE = 1 << 1;
        /// Generate smooth normals when the source has none
        const GEN_NORMALS = 1 << 2;
        /// Generate tangents from UV channel 0 when the source has none
        const CALC_TANGENT_SPACE = 1 << 3;
        /// Drop attribute arrays holding non-finite values
        const FIND_INVALID_DATA = 1 << 4;
        /// Keep at most four influences per vertex
        const LIMIT_BONE_WEIGHTS = 1 << 5;
        /// Reorder triangles for vertex cache locality
        const IMPROVE_CACHE_LOCALITY = 1 << 6;
        /// Flip normals that point into the mesh
        const FIX_INFACING_NORMALS = 1 << 7;
        /// Merge small meshes
        const OPTIMIZE_MESHES = 1 << 8;
        /// Reject meshes with out-of-range references
        const VALIDATE_DATA_STRUCTURE = 1 << 9;
    }
}

impl PostProcess {
    /// Every step enabled, the export pipeline default
    pub const DEFAULT: Self = Self::all();

    /// Steps handled by [`apply`]
    pub const SUPPORTED: Self = Self::TRIANGULATE
        .union(Self::GEN_NORMALS)
        .union(Self::CALC_TANGENT_SPACE)
        .union(Self::FIND_INVALID_DATA)
        .union(Self::LIMIT_BONE_WEIGHTS)
        .union(Self::VALIDATE_DATA_STRUCTURE);
}

impl Default for PostProcess {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Run the supported steps on a freshly imported mesh
pub(crate) fn apply(mesh: &mut SourceMesh, flags: PostProcess) -> Result<(), ImportError> {
    if flags.contains(PostProcess::VALIDATE_DATA_STRUCTURE) {
        validate(mesh)?;
    }
    if flags.contains(PostProcess::TRIANGULATE) {
        triangulate(mesh);
    }
    if flags.contains(PostProcess::FIND_INVALID_DATA) {
        drop_invalid_data(mesh);
    }
    if flags.contains(PostProcess::GEN_NORMALS) && mesh.normals.is_none() {
        mesh.normals = Some(smooth_normals(mesh));
    }
    if flags.contains(PostProcess::CALC_TANGENT_SPACE) && mesh.tangents.is_none() {
        mesh.tangents = tangents(mesh);
    }
    if flags.contains(PostProcess::LIMIT_BONE_WEIGHTS) {
        limit_bone_weights(mesh);
    }

    let skipped = flags.difference(PostProcess::SUPPORTED);
    if !skipped.is_empty() {
        tracing::debug!("Mesh '{}': post-process steps not applied: {:?}", mesh.name, skipped);
    }

    Ok(())
}

fn validate(mesh: &SourceMesh) -> Result<(), ImportError> {
    let vertex_count = mesh.vertices.len();

    let lengths = [
        ("normals", mesh.normals.as_ref().map(Vec::len)),
        ("tangents", mesh.tangents.as_ref().map(Vec::len)),
    ];
    for (name, len) in lengths {
        if let Some(len) = len
            && len != vertex_count
        {
            return Err(ImportError::Invalid(format!(
                "mesh '{}' has {} {} for {} vertices",
                mesh.name, len, name, vertex_count
            )));
        }
    }
    for (channel, uvs) in mesh.uv_channels.iter().enumerate() {
        if let Some(uvs) = uvs
            && uvs.len() != vertex_count
        {
            return Err(ImportError::Invalid(format!(
                "mesh '{}' UV channel {} has {} coordinates for {} vertices",
                mesh.name,
                channel,
                uvs.len(),
                vertex_count
            )));
        }
    }

    for (i, face) in mesh.faces.iter().enumerate() {
        if let Some(index) = face.indices.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(ImportError::Invalid(format!(
                "mesh '{}' face {} references vertex {} of {}",
                mesh.name, i, index, vertex_count
            )));
        }
    }

    for bone in &mesh.bones {
        if let Some(w) = bone.weights.iter().find(|w| w.vertex_id as usize >= vertex_count) {
            return Err(ImportError::Invalid(format!(
                "bone '{}' weights vertex {} of {}",
                bone.name, w.vertex_id, vertex_count
            )));
        }
    }

    Ok(())
}

/// Fan-triangulate polygons with more than three corners
fn triangulate(mesh: &mut SourceMesh) {
    if mesh.faces.iter().all(|f| f.indices.len() <= 3) {
        return;
    }
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for face in mesh.faces.drain(..) {
        if face.indices.len() <= 3 {
            faces.push(face);
            continue;
        }
        let first = face.indices[0];
        for pair in face.indices[1..].windows(2) {
            faces.push(SourceFace::triangle(first, pair[0], pair[1]));
        }
    }
    mesh.faces = faces;
}

fn drop_invalid_data(mesh: &mut SourceMesh) {
    let all_finite = |values: &Vec<Vec3>| values.iter().all(|v| v.is_finite());

    if mesh.normals.as_ref().is_some_and(|n| !all_finite(n)) {
        tracing::warn!("Mesh '{}': dropping normals with non-finite values", mesh.name);
        mesh.normals = None;
    }
    if mesh.tangents.as_ref().is_some_and(|t| !all_finite(t)) {
        tracing::warn!("Mesh '{}': dropping tangents with non-finite values", mesh.name);
        mesh.tangents = None;
    }
    for (channel, uvs) in mesh.uv_channels.iter_mut().enumerate() {
        if uvs.as_ref().is_some_and(|c| !all_finite(c)) {
            tracing::warn!(
                "Mesh '{}': dropping UV channel {} with non-finite values",
                mesh.name,
                channel
            );
            *uvs = None;
        }
    }
}

fn triangles(mesh: &SourceMesh) -> impl Iterator<Item = [usize; 3]> + '_ {
    let n = mesh.vertices.len();
    mesh.faces.iter().filter_map(move |f| match f.indices[..] {
        [a, b, c] if (a as usize) < n && (b as usize) < n && (c as usize) < n => {
            Some([a as usize, b as usize, c as usize])
        }
        _ => None,
    })
}

/// Area-weighted vertex normals
fn smooth_normals(mesh: &SourceMesh) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; mesh.vertices.len()];
    for [a, b, c] in triangles(mesh) {
        let p = &mesh.vertices;
        let face_normal = (p[b] - p[a]).cross(p[c] - p[a]);
        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}

/// Per-vertex tangents from UV channel 0, orthogonalized against the normals
fn tangents(mesh: &SourceMesh) -> Option<Vec<Vec3>> {
    let uvs = mesh.uv_channels[0].as_ref()?;
    let normals = mesh.normals.as_ref()?;
    let p = &mesh.vertices;

    let mut tangents = vec![Vec3::ZERO; p.len()];
    for [a, b, c] in triangles(mesh) {
        let e1 = p[b] - p[a];
        let e2 = p[c] - p[a];
        let (du1, dv1) = (uvs[b].x - uvs[a].x, uvs[b].y - uvs[a].y);
        let (du2, dv2) = (uvs[c].x - uvs[a].x, uvs[c].y - uvs[a].y);

        let det = du1 * dv2 - du2 * dv1;
        if det.abs() < f32::EPSILON {
            continue;
        }
        let t = (e1 * dv2 - e2 * dv1) / det;
        tangents[a] += t;
        tangents[b] += t;
        tangents[c] += t;
    }

    Some(
        tangents
            .iter()
            .zip(normals)
            .map(|(&t, &n)| (t - n * n.dot(t)).normalize_or_zero())
            .collect(),
    )
}

/// Keep the strongest influences per vertex and renormalize what is left
fn limit_bone_weights(mesh: &mut SourceMesh) {
    // (weight, bone, position in bone.weights) per vertex
    let mut per_vertex: Vec<Vec<(f32, usize, usize)>> = vec![Vec::new(); mesh.vertices.len()];
    for (b, bone) in mesh.bones.iter().enumerate() {
        for (w, weight) in bone.weights.iter().enumerate() {
            if let Some(slot) = per_vertex.get_mut(weight.vertex_id as usize) {
                slot.push((weight.weight, b, w));
            }
        }
    }

    let mut removed: Vec<Vec<usize>> = vec![Vec::new(); mesh.bones.len()];
    let mut scale: Vec<Option<f32>> = vec![None; mesh.vertices.len()];
    for (vertex, influences) in per_vertex.iter_mut().enumerate() {
        if influences.len() <= MAX_BONE_INFLUENCES {
            continue;
        }
        influences.sort_by(|x, y| y.0.total_cmp(&x.0));
        for &(_, b, w) in &influences[MAX_BONE_INFLUENCES..] {
            removed[b].push(w);
        }
        let kept: f32 = influences[..MAX_BONE_INFLUENCES].iter().map(|i| i.0).sum();
        if kept > 0.0 {
            scale[vertex] = Some(1.0 / kept);
        }
    }

    let mut dropped = 0usize;
    for (bone, removed) in mesh.bones.iter_mut().zip(removed) {
        dropped += removed.len();
        let mut position = 0usize;
        bone.weights.retain(|_| {
            let keep = !removed.contains(&position);
            position += 1;
            keep
        });
        for weight in &mut bone.weights {
            if let Some(s) = scale.get(weight.vertex_id as usize).copied().flatten() {
                weight.weight *= s;
            }
        }
    }

    if dropped > 0 {
        tracing::debug!(
            "Mesh '{}': limited bone weights, removed {} influence(s)",
            mesh.name,
            dropped
        );
    }
}

//! Per-mesh record of recoverable problems met during conversion

/// Influence that did not fit into the four per-vertex slots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroppedInfluence {
    pub vertex_id: u32,
    pub bone_id: u32,
    pub weight: f32,
}

/// Soft degradations collected while converting one mesh
///
/// None of these abort the conversion; the mesh is still produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    /// Source faces that were not triangles
    pub skipped_faces: usize,
    /// Triangles referencing a vertex past the last one
    pub invalid_faces: usize,
    /// Attribute arrays whose length did not match the vertex count ("normals", "uv1", ...)
    pub malformed_attributes: Vec<String>,
    /// Bones without a node of the same name
    pub unresolved_bones: Vec<String>,
    /// Node names carried by more than one node
    pub duplicate_node_names: Vec<String>,
    /// Influences beyond the fourth per vertex
    pub dropped_influences: Vec<DroppedInfluence>,
    /// Influences pointing past the last vertex
    pub out_of_range_weights: usize,
    /// Animation channels without a bone of the same name
    pub unmatched_channels: Vec<String>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    /// Emit one warning per kind of problem
    pub fn log(&self, mesh_name: &str) {
        if self.skipped_faces > 0 {
            tracing::warn!(
                "Mesh '{}': skipped {} non-triangle face(s)",
                mesh_name,
                self.skipped_faces
            );
        }
        if self.invalid_faces > 0 {
            tracing::warn!(
                "Mesh '{}': dropped {} face(s) with out-of-range vertex indices",
                mesh_name,
                self.invalid_faces
            );
        }
        if !self.malformed_attributes.is_empty() {
            tracing::warn!(
                "Mesh '{}': ignored attribute arrays with wrong length: {:?}",
                mesh_name,
                self.malformed_attributes
            );
        }
        if !self.unresolved_bones.is_empty() {
            tracing::warn!(
                "Mesh '{}': no scene node for bone(s) {:?}, using identity transform",
                mesh_name,
                self.unresolved_bones
            );
        }
        if !self.duplicate_node_names.is_empty() {
            tracing::warn!(
                "Mesh '{}': duplicated node names {:?}, first node in tree order used",
                mesh_name,
                self.duplicate_node_names
            );
        }
        if !self.dropped_influences.is_empty() {
            tracing::warn!(
                "Mesh '{}': dropped {} bone influence(s) beyond {} per vertex",
                mesh_name,
                self.dropped_influences.len(),
                rigmesh_common::MAX_BONE_INFLUENCES
            );
        }
        if self.out_of_range_weights > 0 {
            tracing::warn!(
                "Mesh '{}': ignored {} weight(s) on missing vertices",
                mesh_name,
                self.out_of_range_weights
            );
        }
        if !self.unmatched_channels.is_empty() {
            tracing::debug!(
                "Mesh '{}': animation channels without a bone: {:?}",
                mesh_name,
                self.unmatched_channels
            );
        }
    }
}

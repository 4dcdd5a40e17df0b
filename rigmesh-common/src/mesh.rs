//! Flattened skinned mesh record.
//!
//! A [`Mesh`] is self-contained: geometry, up to [`MAX_UV_CHANNELS`] UV sets,
//! the bone list with parent links, four packed bone influences per vertex and
//! the keyframe animations that drive the bones. Every cross reference is an
//! index into one of the mesh's own arrays, so the record can be serialized
//! and loaded without the scene it was extracted from.

use glam::{Mat4, Quat, UVec4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of UV channels a mesh can carry.
pub const MAX_UV_CHANNELS: usize = 8;

/// Number of bone influence slots per vertex.
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Parent id of a root bone (or a bone whose parent could not be resolved).
pub const NO_PARENT: i32 = -1;

/// Bone id of an animation channel that targets no bone of the mesh.
pub const NO_BONE: i32 = -1;

/// Three vertex indices forming a triangle.
pub type MeshFace = [u32; 3];

/// Skeleton bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    /// Unique name, shared with the scene node the bone was bound to
    pub name: String,

    /// Position of the bone in [`Mesh::bones`]
    pub id: i32,

    /// Id of the parent bone, [`NO_PARENT`] for roots
    pub parent: i32,

    /// Mesh space to bone space transform in bind pose (column-major)
    pub offset: Mat4,

    /// Transform relative to the parent node (column-major)
    pub transform: Mat4,
}

impl Bone {
    /// Whether the bone has no parent bone
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }
}

/// Time-stamped 3D value (position or scale key).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

/// Time-stamped rotation key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

/// Keyframe track for one bone.
///
/// Position, rotation and scale keys are timed independently and may have
/// different lengths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationChannel {
    /// Name of the animated node
    pub name: String,

    /// Id of the bone with the same name, [`NO_BONE`] if there is none
    pub bone_id: i32,

    pub position_keys: Vec<VectorKey>,

    pub rotation_keys: Vec<QuatKey>,

    pub scale_keys: Vec<VectorKey>,
}

/// Keyframe animation clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub name: String,

    /// Duration in ticks
    pub duration: f64,

    /// Ticks per second, 0 when the source did not specify it
    pub ticks_per_second: f64,

    /// Corrective root transform applied on top of the skeleton
    pub transform: Mat4,

    pub channels: Vec<AnimationChannel>,
}

/// Complete mesh record produced by the export pipeline.
///
/// `vertex_count`, `face_count` and `bone_count` duplicate the lengths of the
/// matching arrays and are checked by [`Mesh::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertex_count: u32,
    pub face_count: u32,
    pub bone_count: u32,

    pub vertices: Vec<Vec3>,

    /// Per-vertex normals, empty when the source had none
    pub normals: Vec<Vec3>,

    /// Per-vertex tangents, empty when the source had none
    pub tangents: Vec<Vec3>,

    pub faces: Vec<MeshFace>,

    /// UV sets; `None` marks a channel the source did not provide
    pub uv_channels: [Option<Vec<Vec2>>; MAX_UV_CHANNELS],

    pub bones: Vec<Bone>,

    /// Influence weights per vertex. A slot weight of `0.0` means unused.
    /// Empty for meshes without bones.
    pub vertex_weights: Vec<Vec4>,

    /// Bone ids per vertex, meaningful only where the matching weight is non-zero
    pub vertex_weight_ids: Vec<UVec4>,

    pub animations: Vec<Animation>,
}

/// Violation of a [`Mesh`] invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("{field} has {actual} entries but the mesh declares {expected}")]
    CountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field} has {actual} entries, expected 0 or {expected} (one per vertex)")]
    AttributeLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("UV channel {channel} has {actual} coordinates, expected {expected}")]
    UvChannelLength {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    #[error("vertex weights ({weights}) and weight ids ({ids}) differ in length")]
    WeightIdMismatch { weights: usize, ids: usize },

    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: u32,
    },

    #[error("bone at position {position} has id {id}")]
    BoneIdMismatch { position: usize, id: i32 },

    #[error("bone '{bone}' has parent {parent}, outside of 0..{bone_count}")]
    ParentOutOfRange {
        bone: String,
        parent: i32,
        bone_count: u32,
    },

    #[error("animation '{animation}' channel '{channel}' targets bone {bone_id}, outside of 0..{bone_count}")]
    ChannelBoneOutOfRange {
        animation: String,
        channel: String,
        bone_id: i32,
        bone_count: u32,
    },
}

impl Mesh {
    /// Whether the mesh carries per-vertex normals
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether the mesh carries per-vertex tangents
    pub fn has_tangents(&self) -> bool {
        !self.tangents.is_empty()
    }

    /// UV coordinates of a channel, `None` if absent or out of range
    pub fn uv_channel(&self, channel: usize) -> Option<&[Vec2]> {
        self.uv_channels.get(channel)?.as_deref()
    }

    /// Number of populated UV channels
    pub fn uv_channel_count(&self) -> usize {
        self.uv_channels.iter().filter(|c| c.is_some()).count()
    }

    /// Whether any vertex is bound to a bone
    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Look up a bone by name
    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    /// Populated `(bone_id, weight)` slots of a vertex
    pub fn influences(&self, vertex: usize) -> impl Iterator<Item = (u32, f32)> + '_ {
        let weights = self.vertex_weights.get(vertex).copied();
        let ids = self.vertex_weight_ids.get(vertex).copied();
        (0..MAX_BONE_INFLUENCES).filter_map(move |slot| {
            let w = weights?[slot];
            (w != 0.0).then(|| (ids.map(|i| i[slot]).unwrap_or(0), w))
        })
    }

    /// Check the structural invariants of the record
    ///
    /// Checks:
    /// - declared counts match array lengths
    /// - per-vertex attributes are empty or one per vertex
    /// - bone ids equal their position, parents are in range
    /// - face indices and channel bone ids are in range
    pub fn validate(&self) -> Result<(), MeshError> {
        let vertex_count = self.vertex_count as usize;

        check_count("vertices", vertex_count, self.vertices.len())?;
        check_count("faces", self.face_count as usize, self.faces.len())?;
        check_count("bones", self.bone_count as usize, self.bones.len())?;

        check_attribute("normals", vertex_count, self.normals.len())?;
        check_attribute("tangents", vertex_count, self.tangents.len())?;
        check_attribute("vertex_weights", vertex_count, self.vertex_weights.len())?;

        if self.vertex_weights.len() != self.vertex_weight_ids.len() {
            return Err(MeshError::WeightIdMismatch {
                weights: self.vertex_weights.len(),
                ids: self.vertex_weight_ids.len(),
            });
        }

        for (channel, uvs) in self.uv_channels.iter().enumerate() {
            if let Some(uvs) = uvs
                && uvs.len() != vertex_count
            {
                return Err(MeshError::UvChannelLength {
                    channel,
                    expected: vertex_count,
                    actual: uvs.len(),
                });
            }
        }

        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i >= self.vertex_count) {
                return Err(MeshError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count: self.vertex_count,
                });
            }
        }

        for (position, bone) in self.bones.iter().enumerate() {
            if bone.id < 0 || bone.id as usize != position {
                return Err(MeshError::BoneIdMismatch {
                    position,
                    id: bone.id,
                });
            }
            if !self.bone_ref_in_range(bone.parent) {
                return Err(MeshError::ParentOutOfRange {
                    bone: bone.name.clone(),
                    parent: bone.parent,
                    bone_count: self.bone_count,
                });
            }
        }

        for animation in &self.animations {
            for channel in &animation.channels {
                if !self.bone_ref_in_range(channel.bone_id) {
                    return Err(MeshError::ChannelBoneOutOfRange {
                        animation: animation.name.clone(),
                        channel: channel.name.clone(),
                        bone_id: channel.bone_id,
                        bone_count: self.bone_count,
                    });
                }
            }
        }

        Ok(())
    }

    /// `-1` or a valid bone index
    fn bone_ref_in_range(&self, id: i32) -> bool {
        id == NO_PARENT || (id >= 0 && (id as u32) < self.bone_count)
    }
}

fn check_count(field: &'static str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if expected != actual {
        return Err(MeshError::CountMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_attribute(field: &'static str, expected: usize, actual: usize) -> Result<(), MeshError> {
    if actual != 0 && actual != expected {
        return Err(MeshError::AttributeLength {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

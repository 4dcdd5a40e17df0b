//! Vertex weight packing
//!
//! Importers store weights per bone (`bone -> [(vertex, weight)]`). The mesh
//! record stores them per vertex in four fixed slots.

use glam::{UVec4, Vec4};

use rigmesh_common::MAX_BONE_INFLUENCES;

use super::diagnostics::{DroppedInfluence, Diagnostics};
use crate::scene::SourceBone;

/// Per-vertex influence slots, both `vertex_count` long
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedWeights {
    pub weights: Vec<Vec4>,
    pub bone_ids: Vec<UVec4>,
}

/// Scatter bone weights into per-vertex slots
///
/// Bones are visited in order and each weight goes to the first slot of its
/// vertex whose weight is still `0.0`. Influences that find no free slot are
/// dropped and recorded.
pub fn pack_weights(
    bones: &[SourceBone],
    vertex_count: usize,
    diagnostics: &mut Diagnostics,
) -> PackedWeights {
    let mut weights = vec![Vec4::ZERO; vertex_count];
    let mut bone_ids = vec![UVec4::ZERO; vertex_count];

    for (bone_id, bone) in bones.iter().enumerate() {
        let bone_id = bone_id as u32;
        for influence in &bone.weights {
            let vertex = influence.vertex_id as usize;
            let Some(slots) = weights.get_mut(vertex) else {
                diagnostics.out_of_range_weights += 1;
                continue;
            };

            match (0..MAX_BONE_INFLUENCES).find(|&slot| slots[slot] == 0.0) {
                Some(slot) => {
                    slots[slot] = influence.weight;
                    bone_ids[vertex][slot] = bone_id;
                }
                None => diagnostics.dropped_influences.push(DroppedInfluence {
                    vertex_id: influence.vertex_id,
                    bone_id,
                    weight: influence.weight,
                }),
            }
        }
    }

    PackedWeights { weights, bone_ids }
}

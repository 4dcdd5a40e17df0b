//! Bone resolution: flat importer bones + node tree -> bone hierarchy
//!
//! Importer bones only carry a name. The transform and the parent come from the
//! scene node of the same name, and the parent node is mapped back to a bone by
//! name again.

use glam::Mat4;

use rigmesh_common::{Bone, NO_PARENT};

use super::Diagnostics;
use crate::matrix::to_mat4;
use crate::scene::{NodeIndex, NodeTree, SourceMesh};

/// Build the skeleton of a source mesh
///
/// Bone ids follow the source bone order. A bone without a matching node gets
/// an identity transform and no parent.
pub fn resolve_bones(
    source: &SourceMesh,
    nodes: &NodeTree,
    index: &NodeIndex,
    diagnostics: &mut Diagnostics,
) -> Vec<Bone> {
    let mut bones: Vec<Bone> = source
        .bones
        .iter()
        .enumerate()
        .map(|(id, bone)| {
            let transform = match index.get(&bone.name).and_then(|n| nodes.node(n)) {
                Some(node) => to_mat4(&node.transform),
                None => {
                    diagnostics.unresolved_bones.push(bone.name.clone());
                    Mat4::IDENTITY
                }
            };
            Bone {
                name: bone.name.clone(),
                id: id as i32,
                parent: NO_PARENT,
                offset: to_mat4(&bone.offset),
                transform,
            }
        })
        .collect();

    // Parents can only be resolved once every bone has its id.
    let parents: Vec<i32> = bones
        .iter()
        .map(|bone| {
            let Some(parent_node) = index.get(&bone.name).and_then(|n| nodes.parent(n)) else {
                return NO_PARENT;
            };
            bones
                .iter()
                .find(|candidate| candidate.name == parent_node.name)
                .map_or(NO_PARENT, |parent| parent.id)
        })
        .collect();
    for (bone, parent) in bones.iter_mut().zip(parents) {
        bone.parent = parent;
    }

    diagnostics.duplicate_node_names.extend(
        index
            .duplicates()
            .iter()
            .filter(|name| bones.iter().any(|b| &b.name == *name))
            .cloned(),
    );

    bones
}

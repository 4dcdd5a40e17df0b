//! glTF 2.0 importer (.gltf / .glb)
//!
//! Maps a glTF document onto the [`SceneGraph`] object model:
//! - the default scene becomes the node tree (a synthetic `ROOT` node is added
//!   when the scene has several root nodes)
//! - every mesh primitive becomes one [`SourceMesh`]
//! - skin joints become bones, with weights gathered from all `JOINTS_n`/`WEIGHTS_n` sets
//! - animation channels are grouped per target node, times stay in seconds

use std::path::Path;

use ::gltf::animation::util::ReadOutputs;
use ::gltf::animation::Interpolation;
use ::gltf::mesh::Mode;
use glam::{Quat, Vec3};
use hashbrown::HashMap;

use rigmesh_common::MAX_UV_CHANNELS;

use super::postprocess::{self, PostProcess};
use super::{
    ImportError, NodeId, NodeTree, QuatKey, SceneGraph, SceneImporter, SourceAnimation,
    SourceBone, SourceFace, SourceMatrix, SourceMesh, SourceNodeAnim, VectorKey, VertexWeight,
};

/// Name of the node inserted above several scene roots
pub const SYNTHETIC_ROOT_NAME: &str = "ROOT";

/// glTF keyframe times are in seconds
const GLTF_TICKS_PER_SECOND: f64 = 1.0;

/// Loads glTF and GLB files with the `gltf` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl SceneImporter for GltfImporter {
    fn import(&self, path: &Path, flags: PostProcess) -> Result<SceneGraph, ImportError> {
        let (document, buffers, _images) = ::gltf::import(path)?;

        let (nodes, node_ids) = build_node_tree(&document);

        let mut meshes = Vec::new();
        for mesh in document.meshes() {
            let skin = document
                .nodes()
                .find(|n| n.mesh().is_some_and(|m| m.index() == mesh.index()))
                .and_then(|n| n.skin());
            let primitive_count = mesh.primitives().count();

            for primitive in mesh.primitives() {
                let name = match (mesh.name(), primitive_count) {
                    (Some(name), 1) => name.to_string(),
                    (Some(name), _) => format!("{}_{}", name, primitive.index()),
                    (None, 1) => format!("mesh_{}", mesh.index()),
                    (None, _) => format!("mesh_{}_{}", mesh.index(), primitive.index()),
                };
                let mut source = read_primitive(name, primitive, skin.as_ref(), &buffers)?;
                postprocess::apply(&mut source, flags)?;
                meshes.push(source);
            }
        }

        let animations = document
            .animations()
            .map(|a| read_animation(&a, &buffers))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Imported {:?}: {} nodes ({} mapped), {} meshes, {} animations",
            path,
            nodes.len(),
            node_ids.len(),
            meshes.len(),
            animations.len()
        );

        Ok(SceneGraph {
            nodes,
            meshes,
            animations,
        })
    }
}

fn node_name(node: &::gltf::Node) -> String {
    node.name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn node_matrix(node: &::gltf::Node) -> SourceMatrix {
    SourceMatrix::from_columns(node.transform().matrix())
}

/// Build the node tree from the default scene
///
/// Returns the tree and the glTF node index -> tree node id mapping.
fn build_node_tree(document: &::gltf::Document) -> (NodeTree, HashMap<usize, NodeId>) {
    let roots: Vec<::gltf::Node> = match document
        .default_scene()
        .or_else(|| document.scenes().next())
    {
        Some(scene) => scene.nodes().collect(),
        None => {
            let children: Vec<usize> = document
                .nodes()
                .flat_map(|n| n.children().map(|c| c.index()).collect::<Vec<_>>())
                .collect();
            document
                .nodes()
                .filter(|n| !children.contains(&n.index()))
                .collect()
        }
    };

    let mut ids = HashMap::new();
    let mut tree;
    if let [root] = roots.as_slice() {
        tree = NodeTree::new(node_name(root), node_matrix(root));
        ids.insert(root.index(), NodeTree::ROOT);
        for child in root.children() {
            add_subtree(&mut tree, NodeTree::ROOT, child, &mut ids);
        }
    } else {
        tree = NodeTree::new(SYNTHETIC_ROOT_NAME, SourceMatrix::IDENTITY);
        for root in roots {
            add_subtree(&mut tree, NodeTree::ROOT, root, &mut ids);
        }
    }

    (tree, ids)
}

fn add_subtree(
    tree: &mut NodeTree,
    parent: NodeId,
    node: ::gltf::Node,
    ids: &mut HashMap<usize, NodeId>,
) {
    let id = tree.add_child(parent, node_name(&node), node_matrix(&node));
    ids.insert(node.index(), id);
    for child in node.children() {
        add_subtree(tree, id, child, ids);
    }
}

fn read_primitive(
    name: String,
    primitive: ::gltf::Primitive<'_>,
    skin: Option<&::gltf::Skin<'_>>,
    buffers: &[::gltf::buffer::Data],
) -> Result<SourceMesh, ImportError> {
    let reader = primitive.reader(|b| Some(&buffers[b.index()]));

    let vertices: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| ImportError::Invalid(format!("mesh '{}' has no positions", name)))?
        .map(Vec3::from)
        .collect();
    let normals = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect());
    let tangents = reader
        .read_tangents()
        .map(|iter| iter.map(|[x, y, z, _w]| Vec3::new(x, y, z)).collect());

    let mut uv_channels: [Option<Vec<Vec3>>; MAX_UV_CHANNELS] = Default::default();
    for (set, channel) in uv_channels.iter_mut().enumerate() {
        *channel = reader
            .read_tex_coords(set as u32)
            .map(|tc| tc.into_f32().map(|[u, v]| Vec3::new(u, v, 0.0)).collect());
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    let faces = assemble_faces(primitive.mode(), &indices);

    let bones = match skin {
        Some(skin) => {
            let mut influence_sets = Vec::new();
            let mut set = 0u32;
            while let Some(joints) = reader.read_joints(set) {
                let weights = reader.read_weights(set).ok_or_else(|| {
                    ImportError::Invalid(format!(
                        "mesh '{name}': JOINTS_{set} has no matching WEIGHTS_{set}"
                    ))
                })?;
                influence_sets.push(InfluenceSet {
                    joints: joints.into_u16().collect(),
                    weights: weights.into_f32().collect(),
                });
                set += 1;
            }
            read_bones(skin, &influence_sets, buffers, vertices.len())?
        }
        None => Vec::new(),
    };

    Ok(SourceMesh {
        name,
        vertices,
        normals,
        tangents,
        uv_channels,
        faces,
        bones,
    })
}

/// Turn an index buffer into faces according to the primitive mode
fn assemble_faces(mode: Mode, indices: &[u32]) -> Vec<SourceFace> {
    let face = |i: &[u32]| SourceFace {
        indices: i.to_vec(),
    };
    match mode {
        Mode::Triangles => indices.chunks_exact(3).map(face).collect(),
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .map(|(i, w)| {
                if i % 2 == 0 {
                    SourceFace::triangle(w[0], w[1], w[2])
                } else {
                    SourceFace::triangle(w[1], w[0], w[2])
                }
            })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&first, rest)) => rest
                .windows(2)
                .map(|w| SourceFace::triangle(first, w[0], w[1]))
                .collect(),
            None => Vec::new(),
        },
        Mode::Points => indices.chunks_exact(1).map(face).collect(),
        Mode::Lines => indices.chunks_exact(2).map(face).collect(),
        Mode::LineStrip => indices.windows(2).map(face).collect(),
        Mode::LineLoop => {
            let mut faces: Vec<SourceFace> = indices.windows(2).map(face).collect();
            if let (Some(&first), Some(&last)) = (indices.first(), indices.last())
                && indices.len() > 2
            {
                faces.push(face(&[last, first][..]));
            }
            faces
        }
    }
}

/// One `JOINTS_n` / `WEIGHTS_n` attribute pair
struct InfluenceSet {
    joints: Vec<[u16; 4]>,
    weights: Vec<[f32; 4]>,
}

fn read_bones(
    skin: &::gltf::Skin<'_>,
    influence_sets: &[InfluenceSet],
    buffers: &[::gltf::buffer::Data],
    vertex_count: usize,
) -> Result<Vec<SourceBone>, ImportError> {
    let joint_count = skin.joints().count();
    let inverse_bind: Vec<[[f32; 4]; 4]> = skin
        .reader(|b| Some(&buffers[b.index()]))
        .read_inverse_bind_matrices()
        .map(|iter| iter.collect())
        .unwrap_or_default();

    let mut bones: Vec<SourceBone> = skin
        .joints()
        .enumerate()
        .map(|(i, joint)| SourceBone {
            name: node_name(&joint),
            offset: inverse_bind
                .get(i)
                .map(|&m| SourceMatrix::from_columns(m))
                .unwrap_or(SourceMatrix::IDENTITY),
            weights: Vec::new(),
        })
        .collect();

    for set in influence_sets {
        let per_vertex = set.joints.iter().zip(&set.weights).take(vertex_count);
        for (vertex, (joint_ids, joint_weights)) in per_vertex.enumerate() {
            for (&joint, &weight) in joint_ids.iter().zip(joint_weights) {
                if weight <= 0.0 {
                    continue;
                }
                let bone = bones.get_mut(joint as usize).ok_or_else(|| {
                    ImportError::Invalid(format!(
                        "vertex {vertex} references joint {joint} of {joint_count}"
                    ))
                })?;
                bone.weights.push(VertexWeight {
                    vertex_id: vertex as u32,
                    weight,
                });
            }
        }
    }

    Ok(bones)
}

fn read_animation(
    animation: &::gltf::Animation<'_>,
    buffers: &[::gltf::buffer::Data],
) -> Result<SourceAnimation, ImportError> {
    let name = animation
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("animation_{}", animation.index()));

    let mut channels: Vec<SourceNodeAnim> = Vec::new();
    let mut by_node: HashMap<usize, usize> = HashMap::new();
    let mut duration = 0.0f64;

    for channel in animation.channels() {
        let target = channel.target().node();
        let slot = *by_node.entry(target.index()).or_insert_with(|| {
            channels.push(SourceNodeAnim {
                node_name: node_name(&target),
                ..Default::default()
            });
            channels.len() - 1
        });

        let reader = channel.reader(|b| Some(&buffers[b.index()]));
        let times: Vec<f64> = reader
            .read_inputs()
            .ok_or_else(|| {
                ImportError::Invalid(format!("animation '{name}' channel has no key times"))
            })?
            .map(f64::from)
            .collect();
        if let Some(&last) = times.last() {
            duration = duration.max(last);
        }
        let cubic = matches!(channel.sampler().interpolation(), Interpolation::CubicSpline);

        let anim = &mut channels[slot];
        match reader.read_outputs() {
            Some(ReadOutputs::Translations(values)) => {
                let values = keyframe_values(values.map(Vec3::from).collect(), cubic);
                anim.position_keys = pair_keys(&name, &times, values)?
                    .map(|(time, value)| VectorKey { time, value })
                    .collect();
            }
            Some(ReadOutputs::Rotations(values)) => {
                let values =
                    keyframe_values(values.into_f32().map(Quat::from_array).collect(), cubic);
                anim.rotation_keys = pair_keys(&name, &times, values)?
                    .map(|(time, value)| QuatKey { time, value })
                    .collect();
            }
            Some(ReadOutputs::Scales(values)) => {
                let values = keyframe_values(values.map(Vec3::from).collect(), cubic);
                anim.scaling_keys = pair_keys(&name, &times, values)?
                    .map(|(time, value)| VectorKey { time, value })
                    .collect();
            }
            Some(ReadOutputs::MorphTargetWeights(_)) => {
                tracing::debug!("Animation '{}': skipping morph target weights", name);
            }
            None => {
                return Err(ImportError::Invalid(format!(
                    "animation '{name}' channel has no output values"
                )));
            }
        }
    }

    Ok(SourceAnimation {
        name,
        duration,
        ticks_per_second: GLTF_TICKS_PER_SECOND,
        channels,
    })
}

/// Cubic-spline samplers store `[in_tangent, value, out_tangent]` per key
fn keyframe_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.chunks_exact(3).map(|c| c[1]).collect()
    } else {
        values
    }
}

fn pair_keys<T>(
    animation: &str,
    times: &[f64],
    values: Vec<T>,
) -> Result<impl Iterator<Item = (f64, T)>, ImportError> {
    if times.len() != values.len() {
        return Err(ImportError::Invalid(format!(
            "animation '{animation}' has {} key times but {} values",
            times.len(),
            values.len()
        )));
    }
    Ok(times.to_vec().into_iter().zip(values))
}

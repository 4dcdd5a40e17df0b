//! Keyframe animation extraction

use std::f32::consts::FRAC_1_SQRT_2;

use glam::{Mat4, Quat};

use rigmesh_common::{Animation, AnimationChannel, Bone, QuatKey, VectorKey, NO_BONE};

use super::Diagnostics;
use crate::matrix::to_mat4;
use crate::scene::{self, SceneGraph, SourceNodeAnim};

/// 90° about X followed by 180° about Y
///
/// Takes Z-up source scenes to the Y-up orientation the runtime expects.
pub const DEFAULT_ROOT_CORRECTION: Quat = Quat::from_xyzw(0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0);

/// Convert every scene animation for a mesh with the given skeleton
///
/// Each animation's transform is the inverse of the scene root transform
/// followed by `root_correction`. Channels are matched to bones by name.
pub fn extract_animations(
    scene: &SceneGraph,
    bones: &[Bone],
    root_correction: Quat,
    diagnostics: &mut Diagnostics,
) -> Vec<Animation> {
    let transform =
        to_mat4(&scene.nodes.root().transform).inverse() * Mat4::from_quat(root_correction);

    scene
        .animations
        .iter()
        .map(|animation| Animation {
            name: animation.name.clone(),
            duration: animation.duration,
            ticks_per_second: animation.ticks_per_second,
            transform,
            channels: animation
                .channels
                .iter()
                .map(|channel| extract_channel(channel, bones, diagnostics))
                .collect(),
        })
        .collect()
}

fn extract_channel(
    channel: &SourceNodeAnim,
    bones: &[Bone],
    diagnostics: &mut Diagnostics,
) -> AnimationChannel {
    let bone_id = match bones.iter().find(|b| b.name == channel.node_name) {
        Some(bone) => bone.id,
        None => {
            if !diagnostics.unmatched_channels.contains(&channel.node_name) {
                diagnostics.unmatched_channels.push(channel.node_name.clone());
            }
            NO_BONE
        }
    };

    AnimationChannel {
        name: channel.node_name.clone(),
        bone_id,
        position_keys: channel.position_keys.iter().map(vector_key).collect(),
        rotation_keys: channel
            .rotation_keys
            .iter()
            .map(|key| QuatKey {
                time: key.time,
                value: normalize_rotation(key.value),
            })
            .collect(),
        scale_keys: channel.scaling_keys.iter().map(vector_key).collect(),
    }
}

fn normalize_rotation(q: Quat) -> Quat {
    if q.length_squared() > 0.0 { q.normalize() } else { q }
}

fn vector_key(key: &scene::VectorKey) -> VectorKey {
    VectorKey {
        time: key.time,
        value: key.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::from_column_major;
    use crate::scene::{NodeTree, SourceAnimation, SourceMatrix};
    use glam::Vec3;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn bone(name: &str, id: i32) -> Bone {
        Bone {
            name: name.to_string(),
            id,
            parent: -1,
            offset: Mat4::IDENTITY,
            transform: Mat4::IDENTITY,
        }
    }

    fn walk_scene() -> SceneGraph {
        let mut scene = SceneGraph::new("root", SourceMatrix::IDENTITY);
        scene.animations.push(SourceAnimation {
            name: "walk".to_string(),
            duration: 30.0,
            ticks_per_second: 24.0,
            channels: vec![
                SourceNodeAnim {
                    node_name: "B".to_string(),
                    position_keys: vec![
                        scene::VectorKey {
                            time: 0.0,
                            value: Vec3::ZERO,
                        },
                        scene::VectorKey {
                            time: 30.0,
                            value: Vec3::Y,
                        },
                    ],
                    rotation_keys: vec![scene::QuatKey {
                        time: 0.0,
                        value: Quat::from_xyzw(0.0, 0.0, 0.0, 2.0),
                    }],
                    scaling_keys: Vec::new(),
                },
                SourceNodeAnim {
                    node_name: "camera".to_string(),
                    ..Default::default()
                },
            ],
        });
        scene
    }

    #[test]
    fn test_default_correction_matches_rotations() {
        let expected = Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_y(PI);
        assert!(DEFAULT_ROOT_CORRECTION.abs_diff_eq(expected, 1e-6));
        assert!(DEFAULT_ROOT_CORRECTION.is_normalized());
    }

    #[test]
    fn test_channels_matched_by_name() {
        let bones = [bone("A", 0), bone("B", 1)];
        let mut diagnostics = Diagnostics::default();
        let animations =
            extract_animations(&walk_scene(), &bones, Quat::IDENTITY, &mut diagnostics);

        assert_eq!(animations.len(), 1);
        let walk = &animations[0];
        assert_eq!(walk.name, "walk");
        assert_eq!(walk.duration, 30.0);
        assert_eq!(walk.ticks_per_second, 24.0);
        assert_eq!(walk.channels[0].bone_id, 1);
        assert_eq!(walk.channels[1].bone_id, NO_BONE);
        assert_eq!(diagnostics.unmatched_channels, vec!["camera"]);
    }

    #[test]
    fn test_key_sequences_copied() {
        let bones = [bone("B", 0)];
        let animations = extract_animations(
            &walk_scene(),
            &bones,
            Quat::IDENTITY,
            &mut Diagnostics::default(),
        );
        let channel = &animations[0].channels[0];

        assert_eq!(channel.position_keys.len(), 2);
        assert_eq!(channel.position_keys[1].time, 30.0);
        assert_eq!(channel.position_keys[1].value, Vec3::Y);
        assert_eq!(channel.rotation_keys.len(), 1);
        assert_eq!(channel.rotation_keys[0].value, Quat::IDENTITY);
        assert!(channel.scale_keys.is_empty());
    }

    #[test]
    fn test_transform_undoes_root() {
        let mut scene = walk_scene();
        let root = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        scene.nodes = NodeTree::new("root", from_column_major(&root.to_cols_array()));

        let animations =
            extract_animations(&scene, &[], Quat::IDENTITY, &mut Diagnostics::default());
        assert!(animations[0].transform.abs_diff_eq(root.inverse(), 1e-6));

        let animations = extract_animations(
            &scene,
            &[],
            DEFAULT_ROOT_CORRECTION,
            &mut Diagnostics::default(),
        );
        let expected = root.inverse() * Mat4::from_quat(DEFAULT_ROOT_CORRECTION);
        assert!(animations[0].transform.abs_diff_eq(expected, 1e-6));
    }
}

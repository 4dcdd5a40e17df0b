//! Programmatic GLB generation for integration tests.
//!
//! Two scenes are available:
//! - [`skinned_triangle_glb`]: one skinned triangle, a two-bone chain
//!   (Armature → Hip → Knee) and a two-key "Bend" animation
//! - [`static_quad_glb`]: an unskinned triangle-fan quad under two scene roots

#![allow(dead_code)]

use serde_json::{json, Value};

pub const SKINNED_MESH_NAME: &str = "Body";
pub const ANIMATION_NAME: &str = "Bend";

const FLOAT: u32 = 5126;
const UNSIGNED_SHORT: u32 = 5123;

/// Binary buffer plus the views and accessors describing it
#[derive(Default)]
struct BufferBuilder {
    data: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BufferBuilder {
    /// Append raw bytes as a new view + accessor, returns the accessor index
    fn push(&mut self, bytes: &[u8], component_type: u32, count: usize, kind: &str) -> usize {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let offset = self.data.len();
        self.data.extend_from_slice(bytes);

        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
        }));
        self.accessors.push(json!({
            "bufferView": self.views.len() - 1,
            "componentType": component_type,
            "count": count,
            "type": kind,
        }));
        self.accessors.len() - 1
    }

    fn floats(&mut self, values: &[f32], components: usize, kind: &str) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(&bytes, FLOAT, values.len() / components, kind)
    }

    fn shorts(&mut self, values: &[u16], components: usize, kind: &str) -> usize {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(&bytes, UNSIGNED_SHORT, values.len() / components, kind)
    }

    /// POSITION accessors need min/max bounds
    fn positions(&mut self, values: &[f32]) -> usize {
        let index = self.floats(values, 3, "VEC3");
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in values.chunks_exact(3) {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        self.accessors[index]["min"] = json!(min);
        self.accessors[index]["max"] = json!(max);
        index
    }
}

fn translation(x: f32, y: f32, z: f32) -> [f32; 16] {
    [
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        x, y, z, 1.0,
    ]
}

/// Skinned triangle with a two-bone chain and one animation.
///
/// Vertex influences:
/// - v0: Hip 1.0
/// - v1: Hip 0.5, Knee 0.5
/// - v2: Knee 1.0
///
/// "Bend" rotates Knee 90° about Z over one second and moves Armature, which
/// is not a bone.
pub fn skinned_triangle_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::default();

    let positions = buffer.positions(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    let normals = buffer.floats(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 3, "VEC3");
    let uvs = buffer.floats(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0], 2, "VEC2");
    let joints = buffer.shorts(&[0, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0], 4, "VEC4");
    let weights = buffer.floats(
        &[1.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        4,
        "VEC4",
    );
    let indices = buffer.shorts(&[0, 1, 2], 1, "SCALAR");

    let mut ibm = Vec::new();
    ibm.extend_from_slice(&translation(0.0, -1.0, 0.0));
    ibm.extend_from_slice(&translation(0.0, -2.0, 0.0));
    let inverse_bind = buffer.floats(&ibm, 16, "MAT4");

    let times = buffer.floats(&[0.0, 1.0], 1, "SCALAR");
    buffer.accessors[times]["min"] = json!([0.0]);
    buffer.accessors[times]["max"] = json!([1.0]);
    let half = std::f32::consts::FRAC_1_SQRT_2;
    let rotations = buffer.floats(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, half, half], 4, "VEC4");
    let moves = buffer.floats(&[0.0, 0.0, 0.0, 0.0, 0.0, 2.0], 3, "VEC3");

    let root = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1, 3] },
            { "name": "Hip", "translation": [0.0, 1.0, 0.0], "children": [2] },
            { "name": "Knee", "translation": [0.0, 1.0, 0.0] },
            { "name": SKINNED_MESH_NAME, "mesh": 0, "skin": 0 },
        ],
        "meshes": [{
            "name": SKINNED_MESH_NAME,
            "primitives": [{
                "attributes": {
                    "POSITION": positions,
                    "NORMAL": normals,
                    "TEXCOORD_0": uvs,
                    "JOINTS_0": joints,
                    "WEIGHTS_0": weights,
                },
                "indices": indices,
            }],
        }],
        "skins": [{ "joints": [1, 2], "inverseBindMatrices": inverse_bind }],
        "animations": [{
            "name": ANIMATION_NAME,
            "samplers": [
                { "input": times, "output": rotations, "interpolation": "LINEAR" },
                { "input": times, "output": moves, "interpolation": "LINEAR" },
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 2, "path": "rotation" } },
                { "sampler": 1, "target": { "node": 0, "path": "translation" } },
            ],
        }],
    });

    assemble_glb(root, buffer)
}

/// Unskinned quad drawn as a triangle fan, with a second scene root.
///
/// The file has no normals, no UVs and no index buffer.
pub fn static_quad_glb() -> Vec<u8> {
    let mut buffer = BufferBuilder::default();
    let positions = buffer.positions(&[
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0,
    ]);

    let root = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "Floor", "mesh": 0 },
            { "translation": [0.0, 3.0, 0.0] },
        ],
        "meshes": [{
            "name": "Quad",
            "primitives": [{
                "attributes": { "POSITION": positions },
                "mode": 6,
            }],
        }],
    });

    assemble_glb(root, buffer)
}

/// Valid glTF document without any mesh
pub fn empty_scene_glb() -> Vec<u8> {
    let root = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "Camera" }],
    });
    assemble_glb(root, BufferBuilder::default())
}

/// Wrap the JSON and binary chunks into a GLB container
fn assemble_glb(mut root: Value, buffer: BufferBuilder) -> Vec<u8> {
    let BufferBuilder {
        data,
        views,
        accessors,
    } = buffer;
    if !data.is_empty() {
        root["buffers"] = json!([{ "byteLength": data.len() }]);
        root["bufferViews"] = Value::Array(views);
        root["accessors"] = Value::Array(accessors);
    }

    let json_bytes = serde_json::to_vec(&root).expect("Failed to serialize JSON");
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    let bin_padding = (4 - (data.len() % 4)) % 4;
    let bin_chunk_length = data.len() + bin_padding;

    let mut total_length = 12 + 8 + json_chunk_length;
    if !data.is_empty() {
        total_length += 8 + bin_chunk_length;
    }

    let mut glb = Vec::with_capacity(total_length);

    // Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk, padded with spaces
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(&json_bytes);
    glb.extend(std::iter::repeat_n(0x20u8, json_padding));

    // BIN chunk, padded with zeros
    if !data.is_empty() {
        glb.extend_from_slice(&(bin_chunk_length as u32).to_le_bytes());
        glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
        glb.extend_from_slice(&data);
        glb.extend(std::iter::repeat_n(0u8, bin_padding));
    }

    glb
}

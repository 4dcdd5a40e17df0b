//! Shared mesh record and file codec for rigmesh
//!
//! This crate is used by:
//! - `rigmesh-export` (writes `.rigmz` files from scene files)
//! - runtime loaders that read `.rigmz` files back
//!
//! # Modules
//!
//! - [`mesh`] - the flattened skinned [`Mesh`] record and its invariants
//! - [`codec`] - MessagePack + zlib encoding with a versioned header
//! - [`format`] - file extension, magic bytes and version constants

pub mod codec;
pub mod format;
pub mod header;
pub mod mesh;

pub use codec::{decode_mesh, encode_mesh, read_mesh_file, write_mesh_file, CodecError};
pub use format::{MeshFormat, MESH_FORMAT};
pub use header::MeshFileHeader;
pub use mesh::{
    Animation, AnimationChannel, Bone, Mesh, MeshError, MeshFace, QuatKey, VectorKey,
    MAX_BONE_INFLUENCES, MAX_UV_CHANNELS, NO_BONE, NO_PARENT,
};

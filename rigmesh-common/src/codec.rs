//! `.rigmz` codec
//!
//! A mesh is serialized as MessagePack with named fields, compressed with zlib
//! at the best compression level and prefixed with a [`MeshFileHeader`].
//!
//! Fields are looked up by name on decode, so readers ignore fields they do not
//! know and tolerate reordering. Removing or retyping a field still needs a new
//! format version.

use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::format::MESH_FORMAT;
use crate::header::MeshFileHeader;
use crate::mesh::{Mesh, MeshError};

/// Errors produced while encoding or decoding a mesh file
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode mesh: {0}")]
    Encoding(#[source] rmp_serde::encode::Error),

    #[error("failed to compress mesh data: {0}")]
    Compression(#[source] std::io::Error),

    #[error("failed to decompress mesh data: {0}")]
    Decompression(#[source] std::io::Error),

    #[error("failed to decode mesh: {0}")]
    Decoding(#[source] rmp_serde::decode::Error),

    #[error("mesh data too short ({0} bytes) for the {size}-byte header", size = MeshFileHeader::SIZE)]
    Truncated(usize),

    #[error("invalid mesh magic bytes {found:?} (expected {:?})", MESH_FORMAT.magic)]
    InvalidMagic { found: [u8; 4] },

    #[error("unsupported mesh format version {found} (max supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("mesh is inconsistent: {0}")]
    InvalidMesh(#[from] MeshError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Field-tagged MessagePack encoding of a payload
fn serialize_payload<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    rmp_serde::to_vec_named(value).map_err(CodecError::Encoding)
}

fn deserialize_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
    rmp_serde::from_slice(payload).map_err(CodecError::Decoding)
}

/// Header followed by the zlib-compressed payload
fn compress(payload: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = MeshFileHeader::current().to_bytes().to_vec();
    let mut encoder = ZlibEncoder::new(&mut out, Compression::best());
    encoder.write_all(payload).map_err(CodecError::Compression)?;
    encoder.finish().map_err(CodecError::Compression)?;
    Ok(out)
}

/// Serialize and compress a mesh
///
/// The mesh is validated first, so everything written here decodes again.
pub fn encode_mesh(mesh: &Mesh) -> Result<Vec<u8>, CodecError> {
    mesh.validate()?;

    let payload = serialize_payload(mesh)?;
    let out = compress(&payload)?;

    tracing::debug!(
        "Encoded mesh: {} bytes serialized, {} bytes compressed",
        payload.len(),
        out.len() - MeshFileHeader::SIZE
    );

    Ok(out)
}

/// Decompress and deserialize a mesh, then check its invariants
pub fn decode_mesh(bytes: &[u8]) -> Result<Mesh, CodecError> {
    let header = MeshFileHeader::from_bytes(bytes).ok_or(CodecError::Truncated(bytes.len()))?;
    if !header.has_valid_magic() {
        return Err(CodecError::InvalidMagic {
            found: header.magic,
        });
    }
    if header.version == 0 || header.version > MESH_FORMAT.version {
        return Err(CodecError::UnsupportedVersion {
            found: header.version,
            supported: MESH_FORMAT.version,
        });
    }

    let mut payload = Vec::new();
    ZlibDecoder::new(&bytes[MeshFileHeader::SIZE..])
        .read_to_end(&mut payload)
        .map_err(CodecError::Decompression)?;

    let mesh: Mesh = deserialize_payload(&payload)?;
    mesh.validate()?;

    Ok(mesh)
}

/// Encode a mesh and write it to `path`
pub fn write_mesh_file(path: &Path, mesh: &Mesh) -> Result<(), CodecError> {
    let bytes = encode_mesh(mesh)?;
    std::fs::write(path, bytes).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read and decode the mesh stored at `path`
pub fn read_mesh_file(path: &Path) -> Result<Mesh, CodecError> {
    let bytes = std::fs::read(path).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_mesh(&bytes)
}

impl Mesh {
    /// Serialize and compress this mesh, see [`encode_mesh`]
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        encode_mesh(self)
    }

    /// Load a mesh from bytes produced by [`Mesh::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        decode_mesh(bytes)
    }
}

//! `.rigmz` file header
//!
//! # Layout
//! ```text
//! 0x00: magic   [u8; 4]  "RGMZ"
//! 0x04: version u32 LE
//! 0x08: zlib stream (MessagePack-encoded Mesh, named fields)
//! ```

use crate::format::MESH_FORMAT;

/// Fixed-size header preceding the compressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFileHeader {
    /// Magic bytes, `MESH_FORMAT.magic` for valid files
    pub magic: [u8; 4],
    /// Format version the payload was written with
    pub version: u32,
}

impl MeshFileHeader {
    pub const SIZE: usize = 8;

    /// Header for the current format version.
    pub fn current() -> Self {
        Self {
            magic: *MESH_FORMAT.magic,
            version: MESH_FORMAT.version,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Whether the magic bytes identify a `.rigmz` file
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == MESH_FORMAT.magic
    }
}

//! Mesh file format constants.
//!
//! `MeshFormat` is the single source of truth for the `.rigmz` container:
//! file extension, magic bytes and the current format version.
//!
//! # Example
//!
//! ```
//! use rigmesh_common::MESH_FORMAT;
//!
//! assert_eq!(MESH_FORMAT.extension, "rigmz");
//! assert_eq!(MESH_FORMAT.magic, b"RGMZ");
//! ```

/// Format specification for compressed mesh files.
#[derive(Debug, Clone, Copy)]
pub struct MeshFormat {
    /// File extension without dot (e.g., "rigmz")
    pub extension: &'static str,

    /// Magic bytes at the start of every file (4 bytes)
    pub magic: &'static [u8; 4],

    /// Format version written by this build
    pub version: u32,
}

impl MeshFormat {
    /// Create a new format specification.
    pub const fn new(extension: &'static str, magic: &'static [u8; 4], version: u32) -> Self {
        Self {
            extension,
            magic,
            version,
        }
    }
}

/// The `.rigmz` format.
///
/// Version history:
/// - 1: MessagePack payload with named fields, zlib compressed
pub const MESH_FORMAT: MeshFormat = MeshFormat::new("rigmz", b"RGMZ", 1);

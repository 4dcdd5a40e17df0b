//! rigmesh-export library
//!
//! Flattens skinned scene files into self-contained [`Mesh`] records that
//! `rigmesh-common` encodes as `.rigmz` files.

pub mod config;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod scene;

pub use rigmesh_common::Mesh;

// Re-export the entry points used by the CLI and other tools
pub use config::ExportConfig;
pub use error::{ConfigError, LoadError};
pub use pipeline::{
    convert_mesh, convert_scene, parse_file, parse_file_with, ConvertedMesh, Diagnostics,
    ExportOptions, DEFAULT_ROOT_CORRECTION,
};
pub use scene::{GltfImporter, ImportError, PostProcess, SceneGraph, SceneImporter};

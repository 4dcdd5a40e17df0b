//! Errors returned by the scene loading entry points

use std::path::PathBuf;

use thiserror::Error;

use crate::scene::ImportError;

/// Failure to turn a scene file into meshes
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to import {path:?}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: ImportError,
    },

    #[error("no meshes found in {path:?}")]
    NoMeshes { path: PathBuf },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Import { path, .. } | LoadError::NoMeshes { path } => path,
        }
    }
}

/// Failure to read an export config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

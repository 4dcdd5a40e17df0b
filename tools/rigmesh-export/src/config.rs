//! Export configuration (rigmesh.toml)

use serde::{Deserialize, Serialize};
use std::path::Path;

use glam::Quat;

use crate::error::ConfigError;
use crate::pipeline::{ExportOptions, DEFAULT_ROOT_CORRECTION};
use crate::scene::PostProcess;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Importer post-processing switches, one per [`PostProcess`] flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_true")]
    pub join_identical_vertices: bool,
    #[serde(default = "default_true")]
    pub triangulate: bool,
    #[serde(default = "default_true")]
    pub gen_normals: bool,
    #[serde(default = "default_true")]
    pub calc_tangent_space: bool,
    #[serde(default = "default_true")]
    pub find_invalid_data: bool,
    #[serde(default = "default_true")]
    pub limit_bone_weights: bool,
    #[serde(default = "default_true")]
    pub improve_cache_locality: bool,
    #[serde(default = "default_true")]
    pub fix_infacing_normals: bool,
    #[serde(default = "default_true")]
    pub optimize_meshes: bool,
    #[serde(default = "default_true")]
    pub validate_data_structure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Rotate animation roots from Z-up to Y-up
    #[serde(default = "default_true")]
    pub correct_root_orientation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension of the written mesh file, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_true() -> bool { true }
fn default_extension() -> String { rigmesh_common::MESH_FORMAT.extension.to_string() }

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            join_identical_vertices: true,
            triangulate: true,
            gen_normals: true,
            calc_tangent_space: true,
            find_invalid_data: true,
            limit_bone_weights: true,
            improve_cache_locality: true,
            fix_infacing_normals: true,
            optimize_meshes: true,
            validate_data_structure: true,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            correct_root_orientation: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

impl ImportConfig {
    pub fn flags(&self) -> PostProcess {
        let switches = [
            (self.join_identical_vertices, PostProcess::JOIN_IDENTICAL_VERTICES),
            (self.triangulate, PostProcess::TRIANGULATE),
            (self.gen_normals, PostProcess::GEN_NORMALS),
            (self.calc_tangent_space, PostProcess::CALC_TANGENT_SPACE),
            (self.find_invalid_data, PostProcess::FIND_INVALID_DATA),
            (self.limit_bone_weights, PostProcess::LIMIT_BONE_WEIGHTS),
            (self.improve_cache_locality, PostProcess::IMPROVE_CACHE_LOCALITY),
            (self.fix_infacing_normals, PostProcess::FIX_INFACING_NORMALS),
            (self.optimize_meshes, PostProcess::OPTIMIZE_MESHES),
            (self.validate_data_structure, PostProcess::VALIDATE_DATA_STRUCTURE),
        ];
        switches
            .into_iter()
            .filter(|(enabled, _)| *enabled)
            .fold(PostProcess::empty(), |acc, (_, flag)| acc | flag)
    }
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_options(&self) -> ExportOptions {
        ExportOptions {
            postprocess: self.import.flags(),
            root_correction: if self.animation.correct_root_orientation {
                DEFAULT_ROOT_CORRECTION
            } else {
                Quat::IDENTITY
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = ExportConfig::default();
        assert!(config.animation.correct_root_orientation);
        assert_eq!(config.output.extension, "rigmz");
        assert_eq!(config.import.flags(), PostProcess::all());
    }

    #[test]
    fn test_default_options_match_pipeline() {
        assert_eq!(ExportConfig::default().to_options(), ExportOptions::default());
    }

    #[test]
    fn test_default_helper_functions() {
        assert!(default_true());
        assert_eq!(default_extension(), "rigmz");
    }

    // =============================================================
    // TOML parsing tests
    // =============================================================

    #[test]
    fn test_config_deserialize_empty() {
        let config = ExportConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_config_deserialize_partial_import() {
        let toml_str = r#"
[import]
triangulate = false
optimize_meshes = false
"#;
        let config = ExportConfig::from_toml_str(toml_str).unwrap();
        let flags = config.import.flags();
        assert!(!flags.contains(PostProcess::TRIANGULATE));
        assert!(!flags.contains(PostProcess::OPTIMIZE_MESHES));
        assert!(flags.contains(PostProcess::GEN_NORMALS)); // default
        assert!(config.animation.correct_root_orientation); // default
    }

    #[test]
    fn test_disable_root_correction() {
        let toml_str = r#"
[animation]
correct_root_orientation = false
"#;
        let options = ExportConfig::from_toml_str(toml_str).unwrap().to_options();
        assert_eq!(options.root_correction, Quat::IDENTITY);
        assert_eq!(options.postprocess, PostProcess::DEFAULT);
    }

    #[test]
    fn test_output_extension() {
        let toml_str = r#"
[output]
extension = "mesh"
"#;
        let config = ExportConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.output.extension, "mesh");
    }

    #[test]
    fn test_config_serialize_roundtrip() {
        let mut config = ExportConfig::default();
        config.import.join_identical_vertices = false;
        config.animation.correct_root_orientation = false;

        let toml_str = toml::to_string(&config).unwrap();
        let parsed = ExportConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(ExportConfig::from_toml_str("[import]\ntriangulate = 3").is_err());
    }

    // =============================================================
    // File loading tests
    // =============================================================

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rigmesh.toml");
        std::fs::write(&path, "[animation]\ncorrect_root_orientation = false\n").unwrap();

        let config = ExportConfig::load(&path).unwrap();
        assert!(!config.animation.correct_root_orientation);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExportConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

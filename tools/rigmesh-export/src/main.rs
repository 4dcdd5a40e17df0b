//! rigmesh-export - converts a skinned scene file into a .rigmz mesh
//!
//! Only the first mesh of the file is written.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use rigmesh_export::{parse_file_with, ExportConfig, GltfImporter};

#[derive(Parser)]
#[command(name = "rigmesh-export")]
#[command(about = "Convert a skinned glTF/GLB scene into a compressed .rigmz mesh")]
#[command(version)]
struct Cli {
    /// Source scene file (glTF/GLB)
    #[arg(long)]
    src: PathBuf,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Output file (default: source path with the mesh extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let level = if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ExportConfig::load(path)?,
        None => ExportConfig::default(),
    };

    let output = cli
        .output
        .unwrap_or_else(|| cli.src.with_extension(&config.output.extension));
    tracing::info!("Converting {:?} -> {:?}", cli.src, output);

    let converted = parse_file_with(&GltfImporter, &cli.src, &config.to_options())
        .with_context(|| format!("Failed to parse {:?}", cli.src))?;
    if converted.len() > 1 {
        tracing::warn!(
            "{:?} has {} meshes, only the first one is written",
            cli.src,
            converted.len()
        );
    }
    let mesh = converted
        .into_iter()
        .next()
        .map(|c| c.mesh)
        .with_context(|| format!("No meshes converted from {:?}", cli.src))?;

    rigmesh_common::write_mesh_file(&output, &mesh)
        .with_context(|| format!("Failed to write {:?}", output))?;

    tracing::info!(
        "Exported mesh: {} vertices, {} faces, {} bones, {} animations",
        mesh.vertex_count,
        mesh.face_count,
        mesh.bone_count,
        mesh.animations.len()
    );

    Ok(())
}

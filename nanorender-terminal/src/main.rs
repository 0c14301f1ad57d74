//! nanorender - software rasterizer for OBJ and STL meshes
//!
//! Opens an interactive orbit viewer in the terminal, or renders a mesh
//! straight to a PNG/TGA image.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nanorender_core::{export, Mesh, OrbitState, RenderOptions, Rgba};
use nanorender_terminal::{load_model, render_frame, PresentStyle, TerminalApp, ViewerConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "nanorender")]
#[command(about = "Software rasterizer for OBJ and STL meshes", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive terminal viewer
    View {
        /// Meshes to browse (.obj or .stl); number keys switch between them
        meshes: Vec<PathBuf>,
        /// Draw with an ASCII ramp instead of colored half blocks
        #[arg(long)]
        ascii: bool,
        /// Image written when the viewer quits
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a mesh to an image file
    Render {
        /// Input mesh (.obj or .stl)
        mesh: PathBuf,
        /// Output image (.png or .tga)
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Orbit azimuth in radians
        #[arg(long, allow_hyphen_values = true)]
        phi: Option<f32>,
        /// Orbit polar angle in radians
        #[arg(long)]
        theta: Option<f32>,
        /// Orbit distance from the target
        #[arg(long)]
        radius: Option<f32>,
        /// Overlay triangle edges
        #[arg(long)]
        wireframe: bool,
    },
    /// Print statistics about a mesh
    Info {
        /// Input mesh (.obj or .stl)
        mesh: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match cli.command {
        Some(Commands::View { meshes, ascii, output }) => {
            if !meshes.is_empty() {
                config.mesh = None;
                config.models = meshes;
            }
            if ascii {
                config.style = PresentStyle::Ascii;
            }
            if output.is_some() {
                config.output = output;
            }
            run_viewer(config)?;
        }
        Some(Commands::Render {
            mesh,
            output,
            width,
            height,
            phi,
            theta,
            radius,
            wireframe,
        }) => {
            config.width = width.unwrap_or(config.width);
            config.height = height.unwrap_or(config.height);
            let orbit = OrbitState::new(
                phi.unwrap_or(config.orbit.phi),
                theta.unwrap_or(config.orbit.theta),
                radius.unwrap_or(config.orbit.radius),
            );
            let mut options = config.render;
            if wireframe && options.wireframe.is_none() {
                options.wireframe = Some(Rgba::new(0, 255, 128, 255));
            }
            render_to_file(&mesh, &output, &config, &orbit, options)?;
        }
        Some(Commands::Info { mesh }) => {
            show_info(&mesh)?;
        }
        None => {
            run_viewer(config)?;
        }
    }

    Ok(())
}

fn run_viewer(config: ViewerConfig) -> Result<()> {
    let mut app = TerminalApp::new(config).context("failed to query the terminal size")?;
    app.run()?;
    Ok(())
}

fn render_to_file(
    mesh_path: &Path,
    output: &Path,
    config: &ViewerConfig,
    orbit: &OrbitState,
    options: RenderOptions,
) -> Result<()> {
    let (mesh, problem) = load_model(mesh_path, config)
        .with_context(|| format!("failed to load {}", mesh_path.display()))?;
    if let Some(problem) = problem {
        anyhow::bail!("can't load {}: {}", mesh_path.display(), problem);
    }

    let (context, stats) = render_frame(&mesh, orbit, &config.export_settings(), options)
        .with_context(|| format!("failed to render {}", mesh_path.display()))?;
    export::save(context.color(), output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Rendered {} triangles ({} drawn, {} culled, {} skipped) to {}",
        stats.triangles,
        stats.drawn,
        stats.culled,
        stats.skipped,
        output.display()
    );
    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    let mesh = Mesh::load(path).with_context(|| format!("failed to load {}", path.display()))?;

    println!("File: {}", path.display());
    println!("Vertices: {}", mesh.vertices().len());
    println!("Faces: {}", mesh.faces().len());
    println!("Triangles: {}", mesh.triangles().len());
    if let Some(bounds) = mesh.bounds() {
        println!("Bounds: {} .. {}", bounds.min, bounds.max);
        println!("Size: {}", bounds.size());
        println!("Center: {}", bounds.center());
    }
    Ok(())
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use es_viz::{
    Bounds, Brush, Charge, ChargeShape, FieldConfig, Rk4, Scene, SceneQuery, Streamline, logging,
};
use glam::Vec2;
use serde::Serialize;

/// Sample the electrostatic field of a 2D charge scene and print it as JSON
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Scene file (JSON); a dipole is used when omitted
    #[arg(short, long)]
    scene: Option<PathBuf>,
    /// Config file (JSON) overriding the reference constants
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 800.0)]
    width: f32,
    #[arg(long, default_value_t = 600.0)]
    height: f32,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Field vector, magnitude and direction at one point
    Probe { x: f32, y: f32 },
    /// Raw field samples at grid-cell origins
    Grid {
        #[arg(long)]
        cell: Option<f32>,
    },
    /// Heatmap cells with intensity and alpha
    Heatmap {
        #[arg(long)]
        cell: Option<f32>,
    },
    /// Scaled field arrows
    Arrows {
        #[arg(long)]
        cell: Option<f32>,
    },
    /// Field lines for every charge
    Lines {
        /// Trace with RK4 instead of the reference Euler stepper
        #[arg(long)]
        rk4: bool,
    },
    /// Place a charge, then print the resulting scene
    Place {
        x: f32,
        y: f32,
        #[arg(long, default_value = "point")]
        shape: ChargeShape,
        #[arg(long, default_value_t = 5.0)]
        q: f32,
        #[arg(long, default_value_t = 30.0)]
        extent: f32,
    },
    /// Charge list with densities
    List,
}

#[derive(Serialize)]
struct ListedCharge {
    index: usize,
    label: String,
    extent: f32,
    density: Option<String>,
}

fn dipole() -> Scene {
    let mut scene = Scene::new();
    scene.add(Charge::point(Vec2::new(300.0, 300.0), 5.0));
    scene.add(Charge::point(Vec2::new(500.0, 300.0), -5.0));
    scene
}

fn load(args: &Args) -> Result<(Scene, FieldConfig)> {
    let cfg = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            FieldConfig::from_json(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => FieldConfig::default(),
    };
    let scene = match &args.scene {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading scene {}", path.display()))?;
            Scene::from_json(&text).with_context(|| format!("parsing scene {}", path.display()))?
        }
        None => dipole(),
    };
    Ok((scene, cfg))
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let (mut scene, cfg) = load(&args)?;
    let bounds = Bounds::from_size(args.width, args.height);
    log::info!(
        "{} charges, viewport {}x{}",
        scene.len(),
        args.width,
        args.height
    );

    match args.cmd {
        Cmd::Probe { x, y } => {
            let q = SceneQuery::new(scene.charges(), &cfg);
            emit(&q.probe(Vec2::new(x, y)))
        }
        Cmd::Grid { cell } => {
            let q = SceneQuery::new(scene.charges(), &cfg);
            emit(&q.sample_grid(bounds, cell.unwrap_or(cfg.heatmap_cell)))
        }
        Cmd::Heatmap { cell } => {
            let q = SceneQuery::new(scene.charges(), &cfg);
            emit(&q.heatmap(bounds, cell.unwrap_or(cfg.heatmap_cell)))
        }
        Cmd::Arrows { cell } => {
            let q = SceneQuery::new(scene.charges(), &cfg);
            emit(&q.arrow_grid(bounds, cell.unwrap_or(cfg.arrow_cell)))
        }
        Cmd::Lines { rk4 } => {
            let q = SceneQuery::new(scene.charges(), &cfg);
            let lines: Vec<Streamline> = if rk4 {
                scene
                    .charges()
                    .iter()
                    .flat_map(|c| q.field_lines_for_with(c, bounds, Rk4))
                    .collect()
            } else {
                q.field_lines(bounds)
            };
            emit(&lines)
        }
        Cmd::Place {
            x,
            y,
            shape,
            q,
            extent,
        } => {
            scene.set_brush(Brush { shape, q, extent });
            scene.place(Vec2::new(x, y), &cfg)?;
            println!("{}", scene.to_json()?);
            Ok(())
        }
        Cmd::List => {
            let listed: Vec<ListedCharge> = scene
                .charges()
                .iter()
                .enumerate()
                .map(|(index, c)| ListedCharge {
                    index,
                    label: c.label(),
                    extent: c.extent,
                    density: es_viz::density_descriptor(c).map(|d| d.to_string()),
                })
                .collect();
            emit(&listed)
        }
    }
}

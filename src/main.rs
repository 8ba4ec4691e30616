//! marker-fit - size models to a printed AR marker from the command line.

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use marker_fit::nalgebra as na;
use marker_fit::{
    export_settings, fit_objects, import_settings, resolve_settings_path, serialize, BoundingBox,
    MarkerReference, MarkerSettings, DEFAULT_MARKER_SIZE_CM,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "marker-fit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reference plane for a printed marker
    Reference {
        /// Marker side in centimetres
        #[arg(long, default_value_t = DEFAULT_MARKER_SIZE_CM)]
        size_cm: f64,
    },

    /// Compute the uniform scale that fits each object to the marker
    Fit {
        /// JSON array of {"name": ..., "points": [[x, y, z], ...]} in world space
        #[arg(short, long)]
        points: PathBuf,

        /// Settings document to start from (defaults if omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Save the updated settings back to the settings path
        #[arg(long)]
        write: bool,

        /// Print the per-object report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a settings document
    Export {
        /// Output path (default: mindar_settings.json in the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Read a settings document and print the values in effect
    Show {
        /// Settings document to read
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Marker side in centimetres
    #[arg(long)]
    marker_size: Option<f64>,

    /// Share of the marker the largest model dimension should cover
    #[arg(long)]
    fraction: Option<f64>,

    /// Uniform model scale
    #[arg(long)]
    model_scale: Option<f64>,

    /// Model offset as x,y,z in metres
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    position: Option<Vec<f64>>,

    /// Model rotation as x,y,z Euler angles in degrees
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    rotation: Option<Vec<f64>>,
}

impl Overrides {
    fn apply(&self, settings: &mut MarkerSettings) -> Result<()> {
        if let Some(size) = self.marker_size {
            settings.marker_size_cm = size;
        }
        if let Some(fraction) = self.fraction {
            settings.fit_fraction = fraction;
        }
        if let Some(scale) = self.model_scale {
            settings.model_scale = scale;
        }
        if let Some(position) = &self.position {
            settings.model_position = vector3("position", position)?;
        }
        if let Some(rotation) = &self.rotation {
            settings.model_rotation_deg = vector3("rotation", rotation)?;
        }
        ensure!(
            settings.is_valid(),
            "settings out of range after applying overrides: {settings:?}"
        );
        Ok(())
    }
}

fn vector3(name: &str, values: &[f64]) -> Result<na::Vector3<f64>> {
    ensure!(
        values.len() == 3,
        "--{name} takes exactly three comma-separated values, got {}",
        values.len()
    );
    Ok(na::Vector3::from_column_slice(values))
}

#[derive(Debug, Deserialize)]
struct ObjectPoints {
    name: String,
    points: Vec<[f64; 3]>,
}

impl ObjectPoints {
    fn world_points(&self) -> Vec<na::Point3<f64>> {
        self.points.iter().map(|&p| na::Point3::from(p)).collect()
    }
}

#[derive(Debug, Serialize)]
struct FitReport {
    object: String,
    scale: Option<f64>,
    covers_marker: Option<bool>,
    error: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Reference { size_cm } => run_reference(size_cm),
        Commands::Fit {
            points,
            settings,
            overrides,
            write,
            json,
        } => run_fit(&points, settings.as_deref(), &overrides, write, json),
        Commands::Export { out, overrides } => run_export(out.as_deref(), &overrides),
        Commands::Show { path } => run_show(&path),
    }
}

fn run_reference(size_cm: f64) -> Result<()> {
    let marker = MarkerReference::new(size_cm)?;
    println!("Marker reference: {0}m x {0}m", marker.side_m());
    println!("Area: {} m^2", marker.area_m2());
    for corner in marker.corners() {
        println!("  ({}, {}, {})", corner.x, corner.y, corner.z);
    }
    Ok(())
}

fn run_fit(
    points_path: &Path,
    settings_path: Option<&Path>,
    overrides: &Overrides,
    write: bool,
    json: bool,
) -> Result<()> {
    let text = fs::read_to_string(points_path)
        .with_context(|| format!("failed to read points from {}", points_path.display()))?;
    let objects: Vec<ObjectPoints> = serde_json::from_str(&text)
        .with_context(|| format!("invalid points file {}", points_path.display()))?;
    ensure!(!objects.is_empty(), "no objects in {}", points_path.display());

    let mut settings = load_settings(settings_path)?;
    overrides.apply(&mut settings)?;
    let marker = MarkerReference::new(settings.marker_size_cm)?;

    let outcomes = fit_objects(
        objects.iter().map(|o| (o.name.as_str(), o.world_points())),
        &mut settings,
    );

    let reports: Vec<FitReport> = objects
        .iter()
        .zip(&outcomes)
        .map(|(object, outcome)| {
            let covers_marker = outcome.scale().and_then(|scale| {
                BoundingBox::from_points(object.world_points())
                    .ok()
                    .map(|bbox| marker.covers(&bbox, scale))
            });
            FitReport {
                object: object.name.clone(),
                scale: outcome.scale(),
                covers_marker,
                error: outcome.result.as_ref().err().map(ToString::to_string),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            match (report.scale, &report.error) {
                (Some(scale), _) => {
                    let note = if report.covers_marker == Some(false) {
                        " (footprint exceeds marker)"
                    } else {
                        ""
                    };
                    println!("{}: scale {scale:.3}{note}", report.object);
                }
                (None, Some(error)) => println!("{}: skipped, {error}", report.object),
                (None, None) => println!("{}: skipped", report.object),
            }
        }
    }

    if write {
        let cwd = std::env::current_dir().context("failed to resolve current directory")?;
        let path = resolve_settings_path(settings_path, &cwd);
        export_settings(&settings, &path)?;
    }
    Ok(())
}

fn run_export(out: Option<&Path>, overrides: &Overrides) -> Result<()> {
    let mut settings = MarkerSettings::default();
    overrides.apply(&mut settings)?;
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    export_settings(&settings, resolve_settings_path(out, &cwd))?;
    Ok(())
}

fn run_show(path: &Path) -> Result<()> {
    let imported = import_settings(path)?;
    for field in &imported.defaulted {
        log::warn!("{field} not usable in {}, showing default", path.display());
    }
    println!("{}", serialize(&imported.settings));
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<MarkerSettings> {
    let Some(path) = path else {
        return Ok(MarkerSettings::default());
    };
    let imported = import_settings(path)?;
    if !imported.is_complete() {
        log::warn!(
            "Defaulted settings fields: {}",
            imported
                .defaulted
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(imported.settings)
}

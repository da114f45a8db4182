#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line shell for the schematizer.
//!
//! Reads a TOML project file, builds the grid over the project boundary,
//! loads the GeoJSON layers a pass needs, runs the pass and writes every
//! emitted row plus the per-pass skip reports as JSON.

mod config;
mod features;
mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use geo::Point;
use geojson::Feature;
use schematizer_grid::Grid;
use schematizer_grid_models::GridMetadata;
use schematizer_pass::{LeveeOptions, PassContext, PassKind, PassReport, SchematicOutput};

use crate::config::ProjectConfig;
use crate::output::RunOutput;

#[derive(Parser)]
#[command(name = "schematizer", about = "Grid schematization of channels, levees and streets")]
struct Cli {
    /// Project file
    #[arg(short, long, default_value = "schematizer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Schematize bank lines, cross-sections and confluences
    Channels,
    /// Schematize levee lines onto octagon sides
    Levees,
    /// Schematize streets into cell elements
    Streets,
    /// Sample floodplain cross-sections
    Floodplain,
    /// Compute area and width reduction factors
    Blocked,
    /// Run every pass that has inputs configured
    All,
}

impl Commands {
    fn passes(&self) -> &'static [PassKind] {
        match self {
            Self::Channels => &[PassKind::Channels],
            Self::Levees => &[PassKind::Levees],
            Self::Streets => &[PassKind::Streets],
            Self::Floodplain => &[PassKind::Floodplain],
            Self::Blocked => &[PassKind::Blocked],
            Self::All => &[
                PassKind::Channels,
                PassKind::Levees,
                PassKind::Blocked,
                PassKind::Streets,
                PassKind::Floodplain,
            ],
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = config::load(&cli.config)?;
    let grid = build_grid(&config)?;
    let context = match config.reference_point {
        Some([x, y]) => PassContext::new(
            &grid,
            GridMetadata {
                cell_size: config.cell_size,
                reference_point: Point::new(x, y),
            },
        )?,
        None => PassContext::from_grid(&grid)?,
    };

    let optional = matches!(cli.command, Commands::All);
    let mut rows = SchematicOutput::default();
    let mut reports = Vec::new();
    for &kind in cli.command.passes() {
        if let Some(report) = run_pass(kind, &config, &context, &mut rows, optional)? {
            reports.push(report);
        }
    }

    output::write(
        &RunOutput {
            reports: &reports,
            rows: &rows,
        },
        config.output.as_deref().map(|path| config.resolve(path)).as_deref(),
    )
}

fn build_grid(config: &ProjectConfig) -> Result<Grid, Box<dyn std::error::Error>> {
    let path = config.resolve(&config.boundary);
    let boundary = features::boundary(&features::read_layer(&path)?)
        .ok_or_else(|| format!("No polygon in boundary layer {}", path.display()))?;
    Ok(Grid::build(&boundary, config.cell_size)?)
}

/// Runs one pass. Returns `None` when `optional` is set and the pass has
/// no input configured.
fn run_pass(
    kind: PassKind,
    config: &ProjectConfig,
    context: &PassContext<'_, Grid>,
    rows: &mut SchematicOutput,
    optional: bool,
) -> Result<Option<PassReport>, Box<dyn std::error::Error>> {
    let inputs = &config.inputs;
    let primary = match kind {
        PassKind::Channels => &inputs.bank_lines,
        PassKind::Levees => &inputs.levee_lines,
        PassKind::Blocked => &inputs.blocked_areas,
        PassKind::Streets => &inputs.streets,
        PassKind::Floodplain => &inputs.floodplain,
    };
    let Some(primary) = primary else {
        if optional {
            log::info!("No input configured for the {kind} pass, skipping");
            return Ok(None);
        }
        return Err(format!("No input configured for the {kind} pass").into());
    };
    let primary = features::read_layer(&config.resolve(primary))?;

    let report = match kind {
        PassKind::Channels => {
            let right_banks = read_optional(config, inputs.right_banks.as_deref())?;
            let cross_sections = read_optional(config, inputs.cross_sections.as_deref())?;
            context.run_channels(
                &features::bank_lines(&primary, &right_banks),
                &features::cross_sections(&cross_sections),
                rows,
            )?
        }
        PassKind::Levees => {
            let crest_points = features::crest_points(&read_optional(config, inputs.crest_points.as_deref())?);
            let elevation_polygons =
                features::elevation_polygons(&read_optional(config, inputs.elevation_polygons.as_deref())?);
            let options = LeveeOptions {
                scale: config.levees.scale,
                crest_points: &crest_points,
                crest_buffer: config.levees.crest_buffer,
                elevation_polygons: &elevation_polygons,
            };
            context.run_levees(&features::levee_lines(&primary), &options, rows)?
        }
        PassKind::Blocked => context.run_blocked(&features::blocked_areas(&primary), rows)?,
        PassKind::Streets => context.run_streets(&features::streets(&primary), rows)?,
        PassKind::Floodplain => context.run_floodplain(&features::floodplain_lines(&primary), rows)?,
    };
    Ok(Some(report))
}

fn read_optional(config: &ProjectConfig, path: Option<&Path>) -> Result<Vec<Feature>, features::FeatureError> {
    path.map_or_else(|| Ok(Vec::new()), |path| features::read_layer(&config.resolve(path)))
}

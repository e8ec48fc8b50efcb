//! Command line front end for the fixed grid engine.
//!
//! Every subcommand prints JSON on stdout; logs go to stderr.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fixed_grid::{
    deduplicate, get_grid_view, lightning_ellipse_to_scan, scan_to_geod_checked,
    EllipsoidGeometry, EngineConfig, FootprintResolver, GeodeticCoordinate,
    PixelCornerLookupTable, Resolution, SatellitePosition, Sector,
};

#[derive(Parser, Debug)]
#[command(name = "fixed-grid")]
#[command(about = "GOES-R fixed grid coordinate engine")]
struct Cli {
    /// Satellite position (east, west, test)
    #[arg(long, global = true)]
    position: Option<SatellitePosition>,

    /// Log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert geodetic latitude/longitude (degrees) to scan angles (radians)
    ToScan {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Treat the point as a GLM event located on the lightning ellipse
        #[arg(long)]
        lightning: bool,
    },

    /// Convert scan angles (radians) to geodetic latitude/longitude (degrees)
    ToGeod {
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        x: f64,
    },

    /// Describe a sector grid
    Grid {
        /// Sector (full, conus, meso)
        #[arg(short, long)]
        sector: Option<Sector>,

        /// Nominal resolution in km (0.5, 1.0, 2.0, 4.0, 8.0, 10.0, 100.0)
        #[arg(short, long)]
        resolution: Option<Resolution>,

        /// Override the sector center, E/W then N/S, radians
        #[arg(long, num_args = 2, value_names = ["EW", "NS"], allow_negative_numbers = true)]
        center: Option<Vec<f64>>,
    },

    /// Resolve event footprints against a corner lookup table
    Footprints {
        /// Corner lookup table file
        #[arg(long, env = "CORNER_LUT_PATH")]
        lut: Option<PathBuf>,

        /// Event file with one `x y` pair per line; stdin when omitted
        #[arg(short, long)]
        events: Option<PathBuf>,

        /// Footprint scale factor
        #[arg(long)]
        inflate: Option<f64>,

        /// Eastward shift applied to the table's cell centers, radians
        #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
        origin_shift: f64,

        /// Collapse identical footprints and report counts
        #[arg(long)]
        dedup: bool,
    },
}

#[derive(Serialize)]
struct GeodOutput {
    lat: f64,
    lon: f64,
    discriminant_clamped: bool,
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr);
    if cli.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let mut config = EngineConfig::from_env().context("invalid environment configuration")?;
    if let Some(position) = cli.position {
        config.position = position;
    }
    let geom = EllipsoidGeometry::for_position(config.position);

    match cli.command {
        Commands::ToScan { lat, lon, lightning } => {
            let scan = if lightning {
                lightning_ellipse_to_scan(lat, lon, &geom)
            } else {
                geom.geod_to_scan(GeodeticCoordinate::new(lat, lon))
            };
            if !geom.is_visible(GeodeticCoordinate::new(lat, lon)) {
                info!(lat, lon, "Point is not visible from the satellite");
            }
            print_json(&scan)
        }
        Commands::ToGeod { y, x } => {
            let (geod, diagnostics) = scan_to_geod_checked(y, x, &geom);
            print_json(&GeodOutput {
                lat: geod.lat,
                lon: geod.lon,
                discriminant_clamped: diagnostics.discriminant_clamped,
            })
        }
        Commands::Grid {
            sector,
            resolution,
            center,
        } => {
            let mut view = get_grid_view(
                config.position,
                sector.unwrap_or(config.sector),
                resolution.unwrap_or(config.resolution),
            )?;
            if let Some(center) = center {
                view = view.with_center(center[0], center[1]);
            }
            print_json(&view)
        }
        Commands::Footprints {
            lut,
            events,
            inflate,
            origin_shift,
            dedup,
        } => {
            if let Some(inflate) = inflate {
                config.inflate = inflate;
                config.validate()?;
            }
            let Some(lut_path) = lut.or(config.corner_lut_path.clone()) else {
                bail!("no corner lookup table given; pass --lut or set CORNER_LUT_PATH");
            };

            let start = Instant::now();
            let lookup = PixelCornerLookupTable::open(&lut_path)
                .with_context(|| format!("failed to load {}", lut_path.display()))?;
            let resolver = FootprintResolver::new(&lookup, origin_shift)?;
            info!(
                path = %lut_path.display(),
                cells = lookup.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Corner lookup table ready"
            );

            let events = match events {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    read_events(BufReader::new(file))?
                }
                None => read_events(io::stdin().lock())?,
            };

            let (footprints, stats) = resolver.resolve_with_stats(&events, config.inflate);
            info!(
                events = events.len(),
                extrapolated = stats.extrapolated,
                "Resolved footprints"
            );

            if dedup {
                print_json(&deduplicate(&footprints))
            } else {
                print_json(&footprints)
            }
        }
    }
}

/// Parse `x y` or `x,y` pairs; blank lines and `#` comments are skipped.
fn read_events<R: BufRead>(reader: R) -> Result<Vec<(f64, f64)>> {
    let mut events = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 2 {
            bail!("line {}: expected two values, got '{}'", lineno + 1, line);
        }

        let x: f64 = fields[0]
            .parse()
            .with_context(|| format!("line {}: bad x '{}'", lineno + 1, fields[0]))?;
        let y: f64 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad y '{}'", lineno + 1, fields[1]))?;
        events.push((x, y));
    }
    Ok(events)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

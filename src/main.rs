//! `geoguide` - map acquisition and route planning from the command line

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geoguide_core::GeoPoint;
use tracing_subscriber::EnvFilter;

use config::AppConfig;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[clap(long, global = true, help = "Path to a TOML configuration file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Load the map tiles around a GPS fix")]
    Load(commands::LoadArgs),
    #[command(about = "Build a route over a saved map")]
    Route(commands::RouteArgs),
    #[command(about = "List the locations of a named point of interest")]
    Poi(commands::PoiArgs),
    #[command(about = "Export a saved map as GeoJSON")]
    Export(commands::ExportArgs),
    #[command(about = "Project a geodetic point to UTM")]
    Utm(commands::UtmArgs),
    #[command(about = "Convert a UTM coordinate back to latitude/longitude")]
    Geodetic(commands::GeodeticArgs),
    #[command(about = "Show the slippy tile containing a point")]
    Tile(commands::TileArgs),
}

/// Parses `lat,lon` in degrees
pub(crate) fn parse_lat_lon(text: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = text
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{text}'"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    let point = GeoPoint::from_lat_lon(lat, lon);
    if point.is_valid_geodetic() {
        Ok(point)
    } else {
        Err(format!("({lat}, {lon}) is not a valid latitude/longitude"))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Load(args) => commands::load(args, &config),
        Commands::Route(args) => commands::route(args),
        Commands::Poi(args) => commands::poi(args),
        Commands::Export(args) => commands::export(args),
        Commands::Utm(args) => commands::utm(args),
        Commands::Geodetic(args) => commands::geodetic(args),
        Commands::Tile(args) => commands::tile(args, &config),
    }
}

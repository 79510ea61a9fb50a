use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use geoguide_core::loading::MAX_TILE_RADIUS;
use geoguide_core::prelude::*;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::parse_lat_lon;

#[derive(clap::Args, Debug)]
pub struct LoadArgs {
    #[clap(long, value_parser = parse_lat_lon, allow_hyphen_values = true, help = "GPS fix as LAT,LON")]
    at: GeoPoint,
    #[clap(long, help = "Zoom level, defaults to the configured one")]
    zoom: Option<u8>,
    #[clap(long, help = "Neighbour ring loaded around the center tile")]
    radius: Option<u32>,
    #[clap(long, help = "Tile service URL template with {z}, {x} and {y}")]
    url: Option<String>,
    #[clap(long, help = "Read tiles from a z/x/y.json directory instead of the network")]
    fixtures: Option<PathBuf>,
    #[clap(long, help = "Persistent tile cache directory")]
    cache_dir: Option<PathBuf>,
    #[clap(long, help = "Overall deadline in milliseconds")]
    deadline_ms: Option<u64>,
    #[clap(long, short, help = "Write the merged map to this file")]
    out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RouteArgs {
    #[clap(long, help = "Saved map document")]
    map: PathBuf,
    #[clap(long, value_parser = parse_lat_lon, allow_hyphen_values = true, help = "Start as LAT,LON")]
    from: GeoPoint,
    #[clap(long, value_parser = parse_lat_lon, allow_hyphen_values = true, help = "Goal as LAT,LON")]
    to: GeoPoint,
    #[clap(long, short, help = "Write the path document to this file")]
    out: Option<PathBuf>,
    #[clap(long, help = "Print the route as a GeoJSON feature")]
    geojson: bool,
}

#[derive(clap::Args, Debug)]
pub struct PoiArgs {
    #[clap(long, help = "Saved map document")]
    map: PathBuf,
    #[clap(help = "Exact, case-sensitive POI name")]
    name: String,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[clap(long, help = "Saved map document")]
    map: PathBuf,
    #[clap(long, short, help = "Output file, stdout when omitted")]
    out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct UtmArgs {
    #[clap(allow_hyphen_values = true, help = "Latitude in degrees")]
    lat: f64,
    #[clap(allow_hyphen_values = true, help = "Longitude in degrees")]
    lon: f64,
    #[clap(long, help = "Force a UTM zone (1-60)")]
    zone: Option<u8>,
}

#[derive(clap::Args, Debug)]
pub struct GeodeticArgs {
    #[clap(help = "Easting in metres")]
    x: f64,
    #[clap(help = "Northing in metres")]
    y: f64,
    #[clap(help = "UTM zone (1-60)")]
    zone: i32,
    #[clap(long, help = "Coordinate is in the southern hemisphere")]
    south: bool,
}

#[derive(clap::Args, Debug)]
pub struct TileArgs {
    #[clap(allow_hyphen_values = true, help = "Latitude in degrees")]
    lat: f64,
    #[clap(allow_hyphen_values = true, help = "Longitude in degrees")]
    lon: f64,
    #[clap(long, help = "Zoom level, defaults to the configured one")]
    zoom: Option<u8>,
    #[clap(long, help = "Also list the neighbour ring of this radius")]
    radius: Option<u32>,
}

pub fn load(args: LoadArgs, config: &AppConfig) -> anyhow::Result<()> {
    let mut loader_config = config.loader.clone();
    if let Some(radius) = args.radius {
        loader_config.tile_radius = radius;
    }
    if let Some(url) = args.url {
        loader_config.url_template = url;
    }
    if let Some(dir) = args.cache_dir {
        loader_config.cache_dir = Some(dir);
    }
    if args.deadline_ms.is_some() {
        loader_config.deadline_ms = args.deadline_ms;
    }
    let zoom = args.zoom.unwrap_or(loader_config.zoom);

    let loader = match args.fixtures {
        Some(root) => {
            info!("Reading tiles from {}", root.display());
            TileLoader::new(Arc::new(FixtureTileSource::new(root)), loader_config)?
        }
        None => TileLoader::from_config(loader_config)?,
    };

    let (map, report) = loader.load_map(args.at, zoom)?;
    info!(
        "{} of {} tiles merged ({} from cache), {} dangling edges",
        report.merged.len(),
        report.requested.len(),
        report.reused.len(),
        report.dangling_edges.len()
    );
    for (key, reason) in &report.failed {
        warn!("Tile {key} unavailable: {reason}");
    }

    let graph = map.snapshot()?;
    println!(
        "nodes: {}, edges: {}, pois: {}",
        graph.node_count(),
        graph.edge_count(),
        graph.poi_count()
    );

    if let Some(out) = args.out {
        save_map(&graph, &out).with_context(|| format!("saving map to {}", out.display()))?;
    }
    Ok(())
}

pub fn route(args: RouteArgs) -> anyhow::Result<()> {
    let graph = load_map(&args.map).with_context(|| format!("loading {}", args.map.display()))?;
    let path = build_path(args.from, args.to, &graph)?;

    info!(
        "Route of {} waypoints over {} nodes, {:.1} m",
        path.len(),
        path.nodes().len(),
        path.length()
    );

    if args.geojson {
        println!("{}", serde_json::to_string_pretty(&path.to_geojson()?)?);
    } else {
        for waypoint in path.waypoints() {
            println!("{:.7},{:.7}", waypoint.lat(), waypoint.lon());
        }
    }

    if let Some(out) = args.out {
        save_path(&path, &out).with_context(|| format!("saving path to {}", out.display()))?;
    }
    Ok(())
}

pub fn poi(args: PoiArgs) -> anyhow::Result<()> {
    let graph = load_map(&args.map).with_context(|| format!("loading {}", args.map.display()))?;
    let locations = graph.pois_by_name(&args.name);
    if locations.is_empty() {
        bail!("no point of interest named '{}'", args.name);
    }
    for location in locations {
        println!("{:.7},{:.7}", location.lat(), location.lon());
    }
    Ok(())
}

pub fn export(args: ExportArgs) -> anyhow::Result<()> {
    let graph = load_map(&args.map).with_context(|| format!("loading {}", args.map.display()))?;
    let text = serde_json::to_string_pretty(&graph.to_geojson()?)?;
    match args.out {
        Some(out) => std::fs::write(&out, text)
            .with_context(|| format!("writing {}", out.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}

pub fn utm(args: UtmArgs) -> anyhow::Result<()> {
    let utm = geodetic_to_utm(args.lat, args.lon, args.zone)?;
    println!(
        "zone {}{} x {:.3} y {:.3}",
        utm.zone,
        if utm.south { "S" } else { "N" },
        utm.x,
        utm.y
    );
    Ok(())
}

pub fn geodetic(args: GeodeticArgs) -> anyhow::Result<()> {
    let (lat, lon) = utm_to_geodetic(args.x, args.y, args.zone, args.south)?;
    println!("{lat:.8},{lon:.8}");
    Ok(())
}

pub fn tile(args: TileArgs, config: &AppConfig) -> anyhow::Result<()> {
    let zoom = args.zoom.unwrap_or(config.loader.zoom);
    let key = TileKey::containing(args.lon, args.lat, zoom)?;
    let bounds = key.bounds();
    println!(
        "{key} west {:.7} south {:.7} east {:.7} north {:.7}",
        bounds.min().x,
        bounds.min().y,
        bounds.max().x,
        bounds.max().y
    );
    if let Some(radius) = args.radius {
        if radius > MAX_TILE_RADIUS {
            bail!("radius {radius} is above the supported maximum of {MAX_TILE_RADIUS}");
        }
        for neighbour in key.neighborhood(radius) {
            println!("{neighbour}");
        }
    }
    Ok(())
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use std::sync::Arc;

use rf_coverage::config::Config;
use rf_coverage::coverage::CoverageEngine;
use rf_coverage::geojson;
use rf_coverage::io::{self, GroupStationLookup};
use rf_coverage::terrain::sampler::ElevationSampler;
use rf_coverage::terrain::ElevationDataset;

#[derive(Parser)]
#[command(name = "rf_coverage")]
#[command(about = "RF coverage and viewshed mapping over SRTM terrain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute coverage for every access point in a device export and write GeoJSON
    Map { config: String },
    /// Probe the elevation model at a coordinate
    Sample {
        dem: String,
        latitude: f64,
        longitude: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Map { config } => run_map(&config).await,
        Commands::Sample {
            dem,
            latitude,
            longitude,
        } => run_sample(&dem, latitude, longitude),
    }
}

async fn run_map(config_path: &str) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)
        .with_context(|| format!("loading config from {}", config_path))?;

    let dataset = ElevationDataset::from_hgt(&config.map.dem_path)?;
    log::info!(
        "loaded DEM {} ({}x{} cells)",
        config.map.dem_path,
        dataset.width(),
        dataset.height()
    );

    let records = io::load_records(&config.map.devices_path)?;
    let lookup = GroupStationLookup::new(&records);
    let (stations, access_points): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.is_station());
    log::info!(
        "{} access points, {} stations",
        access_points.len(),
        stations.len()
    );

    let radios = io::normalize_records(access_points, &lookup);

    let sampler = ElevationSampler::with_limit(Arc::new(dataset), config.sampler.max_concurrent_reads);
    let engine = CoverageEngine::with_options(
        sampler.clone(),
        config.viewshed.params(),
        config.viewshed.mode,
        config.cache.capacity,
    );

    let results = engine.compute_all(&radios).await;
    log::debug!("peak concurrent DEM reads: {}", sampler.peak_reads());

    let mut pairs = Vec::new();
    for (radio, result) in radios.iter().zip(results) {
        match result {
            Ok(report) => pairs.push((radio, report)),
            Err(err) => log::error!("{}", err),
        }
    }

    let collection =
        geojson::feature_collection(pairs.iter().map(|(radio, report)| (*radio, report.as_ref())));
    let body = serde_json::to_string_pretty(&collection)?;
    std::fs::write(&config.map.output_path, body)
        .with_context(|| format!("writing {}", config.map.output_path))?;

    log::info!(
        "wrote coverage for {} radios to {}",
        pairs.len(),
        config.map.output_path
    );
    Ok(())
}

fn run_sample(dem: &str, latitude: f64, longitude: f64) -> anyhow::Result<()> {
    let dataset = ElevationDataset::from_hgt(dem)?;
    let elevation = dataset.elevation_at(latitude, longitude)?;
    match dataset.index(latitude, longitude) {
        Some((row, col)) => {
            let (center_lat, center_lon) = dataset.transform().xy(row, col);
            println!(
                "{:.6}, {:.6} -> {:.1} m (cell {}, {} centered at {:.6}, {:.6})",
                latitude, longitude, elevation, row, col, center_lat, center_lon
            );
        }
        None => println!("{:.6}, {:.6} -> {:.1} m", latitude, longitude, elevation),
    }
    Ok(())
}

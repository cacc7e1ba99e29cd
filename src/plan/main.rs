//! Planning pipeline: fetch raw OSM data, run the engine, write the plan.

mod config;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use paperroute::cache::RawCache;
use paperroute::engine::{finish_plan, AddressMatcher, StreetAggregator, StreetGrid};
use paperroute::models::{Metadata, PlanOutput};
use paperroute::overpass::OverpassClient;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "plan")]
#[command(about = "Compute leaflet distribution routes from OpenStreetMap data")]
struct Args {
    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Postal codes to cover, comma separated (overrides the config file)
    #[arg(short = 'p', long, value_delimiter = ',')]
    postal_codes: Vec<String>,

    /// Match radius in meters (overrides the config file)
    #[arg(long)]
    radius: Option<f64>,

    /// Output file (overrides the config file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ignore cached raw data and fetch again
    #[arg(long)]
    refresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if !args.postal_codes.is_empty() {
        config.overpass.postal_codes = args.postal_codes.clone();
    }
    if let Some(radius) = args.radius {
        config.engine.match_radius_m = radius;
    }
    if let Some(output) = &args.output {
        config.plan.output = output.clone();
    }

    if config.overpass.postal_codes.is_empty() {
        anyhow::bail!("No postal codes given (use --postal-codes or the config file)");
    }

    let codes = config.overpass.postal_codes.clone();
    info!("Planning distribution for postal codes {:?}", codes);
    info!("Match radius: {} m", config.engine.match_radius_m);

    // Raw data: cache first, Overpass only when missing or refreshing
    let cache = RawCache::new(&config.plan.cache_dir);
    let cached = if args.refresh { None } else { cache.load(&codes)? };
    let bundle = match cached {
        Some(bundle) => bundle,
        None => {
            let client = OverpassClient::new(&config.overpass.endpoint)?;
            let bundle = client.fetch_bundle(&codes).await?;
            cache.store(&codes, &bundle)?;
            bundle
        }
    };

    info!(
        "{} street fragments, {} address points",
        bundle.fragments.len(),
        bundle.addresses.len()
    );

    // Aggregate fragments into streets
    let mut aggregator = StreetAggregator::new();
    for fragment in bundle.fragments {
        aggregator.add_fragment(fragment);
    }
    let mut streets = aggregator.finish();

    // Index and assign
    let grid = StreetGrid::build(&streets, config.engine.index_sample_stride);

    let pb = ProgressBar::new(bundle.addresses.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut matcher = AddressMatcher::new(
        &grid,
        config.engine.match_radius_m,
        config.engine.match_sample_stride,
    );
    for address in &bundle.addresses {
        matcher.assign(&mut streets, address);
        pb.inc(1);
    }
    pb.finish_with_message("Assignment complete");

    let (assigned, unassigned) = matcher.stats();
    let result = finish_plan(streets, assigned, unassigned, &config.engine);

    info!(
        "Assigned {}/{} addresses to {} streets ({} units after splitting)",
        result.stats.addresses_assigned,
        result.stats.addresses_total,
        result.stats.streets_aggregated,
        result.stats.units_emitted
    );
    if result.stats.unassigned_ratio() > 0.25 {
        warn!(
            "{:.0}% of addresses matched no street; consider re-running with a larger --radius",
            result.stats.unassigned_ratio() * 100.0
        );
    }

    let output = PlanOutput {
        metadata: Metadata {
            generated: Utc::now(),
            postal_codes: codes,
            center: result.center,
            stats: result.stats,
        },
        streets: result.streets,
    };

    if let Some(parent) = config.plan.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output dir {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&output)?;
    fs::write(&config.plan.output, json)
        .with_context(|| format!("Failed to write {}", config.plan.output.display()))?;

    info!(
        "Wrote {} distribution units to {}",
        output.streets.len(),
        config.plan.output.display()
    );

    Ok(())
}

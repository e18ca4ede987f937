//! Pyramid Source CLI.
//!
//! Inspect tier layouts and resolve tile coordinates the way a viewer
//! integration would, without standing up a viewer.

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pyramid_source::{
    config::{Cli, Command, PlanConfig, UrlConfig},
    pyramid::{tile_group, TierPlan, TileCoord},
    source::PyramidSource,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Plan(config) => run_plan(config),
        Command::Url(config) => run_url(config),
    }
}

// =============================================================================
// Plan Command
// =============================================================================

fn run_plan(config: PlanConfig) -> ExitCode {
    init_logging(config.verbose);

    let policy = match config.policy() {
        Ok(policy) => policy,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let plan = match TierPlan::build(config.width, config.height, policy, config.tile_edge) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&plan).unwrap());
        return ExitCode::SUCCESS;
    }

    let (width, height) = plan.extent();
    println!("Pyramid plan for {}x{} ({} policy)", width, height, policy);
    println!("═══════════════════════════════════════════");
    println!();
    println!("  tile edge:   {} px", plan.tile_edge());
    println!("  tiers:       {}", plan.tier_count());
    println!("  total tiles: {}", plan.total_tiles());
    println!();
    println!("  tier   tiles      scale   tiles before");
    println!("  ────   ────────   ─────   ────────────");
    for (tier, descriptor) in plan.tiers().iter().enumerate() {
        println!(
            "  {:<4}   {:>3} x {:<3}   {:>5}   {:>12}",
            tier, descriptor.tiles_x, descriptor.tiles_y, descriptor.resolution, descriptor.tiles_before
        );
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Url Command
// =============================================================================

fn run_url(config: UrlConfig) -> ExitCode {
    init_logging(config.verbose);

    let options = match config.source_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let source = match PyramidSource::new(options) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let coord = TileCoord::new(config.tier, config.x, config.y);
    if !source.plan().contains(coord) {
        eprintln!(
            "Error: tile {} outside pyramid ({} tiers)",
            coord,
            source.plan().tier_count()
        );
        return ExitCode::FAILURE;
    }

    // Inside the plan, so resolution cannot fail.
    let (index, descriptor) = source.resolve(Some(coord)).unwrap();
    let url = descriptor.to_url(source.base_url());

    if config.json {
        let json = serde_json::json!({
            "coord": coord,
            "linearIndex": index,
            "tileGroup": tile_group(index),
            "descriptor": descriptor,
            "url": url,
        });
        println!("{}", serde_json::to_string_pretty(&json).unwrap());
        return ExitCode::SUCCESS;
    }

    println!("tile:         {}", coord);
    println!("linear index: {}", index);
    println!("tile group:   {}", tile_group(index));
    println!(
        "region:       {}+{} {}x{} @ scale {}",
        descriptor.pixel_x, descriptor.pixel_y, descriptor.edge, descriptor.edge, descriptor.scale
    );
    println!("url:          {}", url);

    ExitCode::SUCCESS
}

// =============================================================================
// Logging
// =============================================================================

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pyramid_source=debug"
    } else {
        "pyramid_source=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

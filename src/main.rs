mod app;
mod assets;
mod event;
mod gamestate;
mod scenario;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use torchlight_blocks::BlockRegistry;
use torchlight_tracker::LightTracker;

use crate::app::App;
use crate::event::EventQueue;
use crate::gamestate::{GameState, SimWorld};
use crate::scenario::Scenario;

/// Headless host that drives the torch light tracker through a scripted scenario.
#[derive(Parser, Debug)]
#[command(name = "torchlight", version, about)]
struct Args {
    /// Directory containing `assets/` (defaults to `TORCHLIGHT_ASSETS`, then the source checkout)
    #[arg(long)]
    assets_root: Option<PathBuf>,
    /// Block registry TOML
    #[arg(long)]
    blocks: Option<PathBuf>,
    /// Scenario TOML
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 40)]
    ticks: u64,
    /// Log filter when RUST_LOG is unset (e.g. `info`, `debug`, `events=trace`)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let root = assets::resolve_assets_root(args.assets_root.clone());
    let blocks_path = args.blocks.unwrap_or_else(|| assets::blocks_path(&root));
    let scenario_path = args
        .scenario
        .unwrap_or_else(|| assets::scenario_path(&root));

    let reg = BlockRegistry::load_from_path(&blocks_path)
        .map_err(|e| format!("loading {}: {}", blocks_path.display(), e))?;
    log::info!("loaded {} block type(s) from {}", reg.by_name.len(), blocks_path.display());
    let scenario = Scenario::load(&scenario_path)
        .map_err(|e| format!("loading {}: {}", scenario_path.display(), e))?;
    let cfg = scenario.tracker.clone();
    if reg.id_by_name(&cfg.light_block).is_none() {
        log::warn!(
            "light block `{}` is not in the registry; placements will fail",
            cfg.light_block
        );
    }

    let mut world = SimWorld::new(reg);
    for (dimension, def) in scenario.worlds() {
        world.build_dimension(dimension, def)?;
    }
    let mut queue = EventQueue::new();
    let queued = scenario.schedule(&mut queue);
    log::info!(
        "scenario {}: {} player(s), {} event(s), {} tick(s)",
        scenario_path.display(),
        scenario.players.len(),
        queued,
        args.ticks
    );

    let mut app = App::new(GameState::new(world), queue, LightTracker::new(cfg));
    let totals = app.run(args.ticks);
    if app.queue.pending() > 0 {
        log::info!("{} event(s) scheduled past the last tick", app.queue.pending());
    }
    log::info!(
        "done after {} tick(s): {} placed, {} cleared, {} failed command(s)",
        totals.ticks,
        totals.placed,
        totals.cleared,
        totals.failures
    );
    print!("{}", app.summary());
    Ok(())
}

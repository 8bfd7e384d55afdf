#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Tile Defence simulation headlessly.

mod args;
mod logging;
mod render;
mod summary;

use anyhow::{Context, Result};
use clap::Parser;
use tile_defence_simulation::{Game, GameConfig};

use crate::{args::Args, summary::Summary};

/// Entry point for the Tile Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };
    args.apply_overrides(&mut config);

    let mut game = Game::new(&config).context("failed to start the simulation")?;
    let mut summary = Summary::default();
    summary.record(&game.drain_events());

    for _ in 0..args.ticks {
        game.tick(args.dt);
        summary.record(&game.drain_events());
    }
    log::debug!(
        "simulated {:.2}s with {} unit(s) still on the board",
        game.elapsed(),
        game.unit_count()
    );

    if args.show_field {
        print!("{}", render::flow_field(game.board()));
    }
    println!("{summary}");
    println!("units remaining:    {}", game.unit_count());
    Ok(())
}

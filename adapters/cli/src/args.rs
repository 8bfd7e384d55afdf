use std::path::PathBuf;

use clap::Parser;
use tile_defence_core::TileCoord;
use tile_defence_simulation::GameConfig;

/// Headless runner for the Tile Defence simulation.
#[derive(Debug, Parser)]
#[command(name = "tile-defence", author, version, about, long_about = None)]
pub(crate) struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    pub(crate) ticks: u32,

    /// Seconds simulated per tick.
    #[arg(long, default_value_t = 0.05, value_parser = parse_seconds)]
    pub(crate) dt: f32,

    /// Overrides the board width.
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Overrides the board height.
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Overrides the spawning seed.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Adds a wall at `x,y`; may be repeated.
    #[arg(long = "wall", value_name = "X,Y", value_parser = parse_coord)]
    pub(crate) walls: Vec<TileCoord>,

    /// Adds a laser tower at `x,y`; may be repeated.
    #[arg(long = "tower", value_name = "X,Y", value_parser = parse_coord)]
    pub(crate) towers: Vec<TileCoord>,

    /// Prints the flow field after the run.
    #[arg(long)]
    pub(crate) show_field: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl Args {
    /// Folds the command-line overrides into the loaded configuration.
    pub(crate) fn apply_overrides(&self, config: &mut GameConfig) {
        if let Some(width) = self.width {
            config.board.width = width;
        }
        if let Some(height) = self.height {
            config.board.height = height;
        }
        if let Some(seed) = self.seed {
            config.enemies.seed = seed;
        }
        config.layout.walls.extend_from_slice(&self.walls);
        config.layout.towers.extend_from_slice(&self.towers);
    }
}

fn parse_coord(value: &str) -> Result<TileCoord, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid column in `{value}`"))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid row in `{value}`"))?;
    Ok(TileCoord::new(x, y))
}

fn parse_seconds(value: &str) -> Result<f32, String> {
    let seconds = value
        .trim()
        .parse::<f32>()
        .map_err(|error| format!("invalid duration `{value}`: {error}"))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("duration must be positive, got `{value}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_parse_with_optional_spaces() {
        assert_eq!(parse_coord("3,4"), Ok(TileCoord::new(3, 4)));
        assert_eq!(parse_coord(" 0 , 10 "), Ok(TileCoord::new(0, 10)));
        assert!(parse_coord("3").is_err());
        assert!(parse_coord("-1,2").is_err());
    }

    #[test]
    fn durations_must_be_positive() {
        assert_eq!(parse_seconds("0.25"), Ok(0.25));
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("nan").is_err());
        assert!(parse_seconds("soon").is_err());
    }

    #[test]
    fn overrides_extend_the_configuration() {
        let args = Args::parse_from([
            "tile-defence",
            "--width",
            "7",
            "--seed",
            "9",
            "--wall",
            "1,2",
            "--wall",
            "2,2",
            "--tower",
            "4,4",
        ]);
        let mut config = GameConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.board.width, 7);
        assert_eq!(config.board.height, 11);
        assert_eq!(config.enemies.seed, 9);
        assert_eq!(
            config.layout.walls,
            vec![TileCoord::new(1, 2), TileCoord::new(2, 2)]
        );
        assert_eq!(config.layout.towers, vec![TileCoord::new(4, 4)]);
        assert_eq!(args.ticks, 600);
    }
}

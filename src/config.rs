use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::registry::RemoteMode;

#[derive(Parser, Debug, Clone)]
#[command(name = "gridwalk")]
#[command(about = "Click-to-move multiplayer terrain demo", long_about = None)]
pub struct Config {
    /// World width in grid cells
    #[arg(long, default_value_t = 256)]
    pub width: usize,
    /// World depth in grid cells
    #[arg(long, default_value_t = 256)]
    pub depth: usize,
    /// Edge length of one grid cell in world units
    #[arg(long, default_value_t = 100.0)]
    pub cell_size: f32,
    /// Seconds an avatar takes to cross to its new cell
    #[arg(long, default_value_t = 0.6)]
    pub tick: f32,
    /// Roster size, local player included
    #[arg(long, default_value_t = 10)]
    pub max_players: usize,
    /// Texture pixels per heightmap cell along each axis
    #[arg(long, default_value_t = 4)]
    pub upscale: u32,
    /// Move remote players randomly instead of from packet contents
    #[arg(long)]
    pub demo_remotes: bool,
    /// Seed for texture dither and demo movement
    #[arg(long)]
    pub seed: Option<u64>,
    /// Write the synthesized terrain texture to this PNG file
    #[arg(long)]
    pub texture_out: Option<PathBuf>,
    /// Run this many simulated frames without opening a window, then exit
    #[arg(long)]
    pub headless_frames: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 256,
            depth: 256,
            cell_size: 100.0,
            tick: 0.6,
            max_players: 10,
            upscale: 4,
            demo_remotes: false,
            seed: None,
            texture_out: None,
            headless_frames: None,
        }
    }
}

impl Config {
    pub fn remote_mode(&self) -> RemoteMode {
        if self.demo_remotes { RemoteMode::Demo } else { RemoteMode::Payload }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tick > 0.0) {
            return Err(Error::InvalidArgument(format!("tick must be positive, got {}", self.tick)));
        }
        if self.max_players == 0 {
            return Err(Error::InvalidArgument("roster needs room for the local player".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_command_line_defaults() {
        let parsed = Config::parse_from(["gridwalk"]);
        let default = Config::default();
        assert_eq!(parsed.width, default.width);
        assert_eq!(parsed.depth, default.depth);
        assert_eq!(parsed.cell_size, default.cell_size);
        assert_eq!(parsed.tick, default.tick);
        assert_eq!(parsed.max_players, default.max_players);
        assert_eq!(parsed.upscale, default.upscale);
        assert_eq!(parsed.remote_mode(), RemoteMode::Payload);
    }

    #[test]
    fn parses_overrides() {
        let config = Config::parse_from([
            "gridwalk",
            "--width",
            "32",
            "--cell-size",
            "10",
            "--demo-remotes",
            "--seed",
            "9",
            "--texture-out",
            "terrain.png",
        ]);
        assert_eq!(config.width, 32);
        assert_eq!(config.cell_size, 10.0);
        assert_eq!(config.remote_mode(), RemoteMode::Demo);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.texture_out, Some(PathBuf::from("terrain.png")));
    }

    #[test]
    fn rejects_bad_tick_and_empty_roster() {
        let config = Config { tick: 0.0, ..Config::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let config = Config { max_players: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));
    }
}

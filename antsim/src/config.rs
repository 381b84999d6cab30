use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Playground defaults, in steps
pub const DEFAULT_PLAYGROUND_WIDTH: i32 = 1000;
pub const DEFAULT_PLAYGROUND_HEIGHT: i32 = 750;

/// Wire positions are `i16` steps.
pub const MAX_PLAYGROUND_SIZE: i32 = i16::MAX as i32;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub ticks: u32,
    pub playground_width: i32,
    pub playground_height: i32,
    pub bug_count: u32,
    pub ant_count: u32,
    pub sugar_count: u32,
    pub output: PathBuf, // Video file written by `record`
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: 5000,
            playground_width: DEFAULT_PLAYGROUND_WIDTH,
            playground_height: DEFAULT_PLAYGROUND_HEIGHT,
            bug_count: 8,
            ant_count: 50,
            sugar_count: 4,
            output: PathBuf::from("antsim.avid"),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.playground_width > 0 && self.playground_height > 0,
            "playground must have a positive size, got {}x{}",
            self.playground_width,
            self.playground_height
        );
        ensure!(
            self.playground_width <= MAX_PLAYGROUND_SIZE
                && self.playground_height <= MAX_PLAYGROUND_SIZE,
            "playground is larger than {MAX_PLAYGROUND_SIZE} steps per side"
        );
        for (kind, count) in [
            ("bug", self.bug_count),
            ("ant", self.ant_count),
            ("sugar", self.sugar_count),
        ] {
            ensure!(
                count <= u16::MAX as u32,
                "{kind} count {count} exceeds the {} ids a video can address",
                u16::MAX
            );
        }
        Ok(())
    }
}

/// Loads the simulation configuration from a TOML file or uses defaults.
pub fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            let config: SimulationConfig = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            info!(path = %path.display(), ?config, "loaded config");
            config
        }
        None => {
            info!("no config file provided, using defaults");
            SimulationConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

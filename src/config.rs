use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::solver::{DeviceLimits, SolverParams};

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "dyeflow.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cells along the shorter surface axis; 0 matches the surface.
    pub resolution: usize,
    pub pressure_iterations: usize,
    pub velocity_dissipation: f32,
    pub dye_dissipation: f32,
    pub curl: f32,
    pub splat_radius: f32,
    pub splat_force: f32,
    pub dt: f32,
    pub vorticity: bool,
    pub advection: bool,
    pub projection: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: usize,
    pub height: usize,
    pub device_pixel_ratio: f64,
    pub target_fps: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_texture_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let p = SolverParams::default();
        Self {
            resolution: 256,
            pressure_iterations: p.pressure_iterations,
            velocity_dissipation: p.velocity_dissipation,
            dye_dissipation: p.dye_dissipation,
            curl: p.curl,
            splat_radius: p.splat_radius,
            splat_force: p.splat_force,
            dt: p.dt,
            vorticity: p.vorticity,
            advection: p.advection,
            projection: p.projection,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            device_pixel_ratio: 1.0,
            target_fps: 60,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_texture_size: DeviceLimits::default().max_texture_size,
        }
    }
}

impl Config {
    pub fn solver_params(&self) -> SolverParams {
        let s = &self.simulation;
        SolverParams {
            dt: s.dt,
            pressure_iterations: s.pressure_iterations,
            velocity_dissipation: s.velocity_dissipation,
            dye_dissipation: s.dye_dissipation,
            curl: s.curl,
            splat_radius: s.splat_radius,
            splat_force: s.splat_force,
            vorticity: s.vorticity,
            advection: s.advection,
            projection: s.projection,
        }
    }

    pub fn limits(&self) -> DeviceLimits {
        DeviceLimits {
            max_texture_size: self.limits.max_texture_size,
            ..DeviceLimits::default()
        }
    }
}

/// Strict load: any read, parse or parameter failure is returned.
pub fn load_from(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

fn parse(contents: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(contents)?;
    cfg.solver_params().validate()?;
    Ok(cfg)
}

/// Load `dyeflow.yaml` if present, falling back to defaults on any error.
pub fn load() -> Config {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return Config::default();
    }
    match load_from(path) {
        Ok(cfg) => {
            log::info!("loaded {CONFIG_FILE}");
            cfg
        }
        Err(e) => {
            log::warn!("{e} ({CONFIG_FILE}); using defaults");
            Config::default()
        }
    }
}

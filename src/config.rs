//! Configuration loading for prm_car
//!
//! Every section falls back to its defaults, so a config file only has to name
//! the values it changes:
//!
//! ```toml
//! render_step = 2.5
//!
//! [search]
//! turning_radius = 40.0
//! accept_reversed_goal = true
//!
//! [roadmap]
//! node_count = 80
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::common::{PlannerError, PlannerResult};
use crate::geometry::VehicleFootprint;
use crate::path_planning::prm::{RoadmapConfig, SearchConfig};

/// Random obstacle field used by the demo
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub obstacle_count: usize,
    pub obstacle_width: f64,
    pub obstacle_height: f64,
    /// RNG seed; a fresh one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            obstacle_count: 10,
            obstacle_width: 50.0,
            obstacle_height: 50.0,
            seed: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub vehicle: VehicleFootprint,
    pub roadmap: RoadmapConfig,
    pub search: SearchConfig,
    pub scene: SceneConfig,
    /// Arc length between drawn poses along the route
    pub render_step: f64,
    /// Where the demo writes its plot
    pub output_path: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleFootprint::default(),
            roadmap: RoadmapConfig::default(),
            search: SearchConfig::default(),
            scene: SceneConfig::default(),
            render_step: 5.0,
            output_path: "img/prm_car.svg".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> PlannerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        self.vehicle.validate()?;
        self.roadmap.validate()?;
        self.search.validate()?;
        if !(self.render_step > 0.0) || !self.render_step.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "render step must be positive, got {}",
                self.render_step
            )));
        }
        let scene = &self.scene;
        if !(scene.obstacle_width > 0.0 && scene.obstacle_height > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "obstacle size must be positive, got {} x {}",
                scene.obstacle_width, scene.obstacle_height
            )));
        }
        Ok(())
    }
}

//! Roadmap construction for the car PRM
//!
//! Draws vehicle poses uniformly inside the sampling area and keeps the ones
//! whose footprint is clear of every obstacle.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::common::{AreaBounds, PlannerError, PlannerResult, Pose2D};
use crate::geometry::{Obstacles, OrientedRect, VehicleFootprint};

/// Interval the sampled yaw is drawn from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingRange {
    /// [0, PI)
    #[default]
    HalfTurn,
    /// [0, 2 PI)
    FullTurn,
}

impl HeadingRange {
    pub fn upper(self) -> f64 {
        match self {
            HeadingRange::HalfTurn => PI,
            HeadingRange::FullTurn => TAU,
        }
    }
}

/// Configuration for roadmap sampling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoadmapConfig {
    /// Area positions are drawn from
    pub bounds: AreaBounds,
    /// Number of collision-free nodes wanted
    pub node_count: usize,
    /// Draws allowed before giving up with a partial roadmap
    pub max_attempts: usize,
    /// Yaw sampling interval
    pub heading_range: HeadingRange,
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            bounds: AreaBounds::default(),
            node_count: 50,
            max_attempts: 5000,
            heading_range: HeadingRange::HalfTurn,
        }
    }
}

impl RoadmapConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        self.bounds.validate()?;
        if self.max_attempts < self.node_count {
            return Err(PlannerError::InvalidParameter(format!(
                "max_attempts ({}) is smaller than node_count ({})",
                self.max_attempts, self.node_count
            )));
        }
        Ok(())
    }
}

/// A feasible vehicle pose in the roadmap
///
/// Nodes compare equal only when their poses are field-for-field equal.
#[derive(Debug, Clone, Copy)]
pub struct RoadmapNode {
    pub pose: Pose2D,
    pub footprint: VehicleFootprint,
}

impl RoadmapNode {
    pub fn new(pose: Pose2D, footprint: VehicleFootprint) -> Self {
        Self { pose, footprint }
    }

    /// Vehicle body at this node
    pub fn rect(&self) -> OrientedRect {
        self.footprint.at(&self.pose)
    }
}

impl PartialEq for RoadmapNode {
    fn eq(&self, other: &Self) -> bool {
        self.pose == other.pose
    }
}

/// Immutable set of sampled nodes
#[derive(Debug, Clone)]
pub struct Roadmap {
    nodes: Vec<RoadmapNode>,
    footprint: VehicleFootprint,
    target_count: usize,
    attempts: usize,
}

impl Roadmap {
    /// Roadmap from hand-picked poses; feasibility is the caller's business
    pub fn from_poses<I>(footprint: VehicleFootprint, poses: I) -> Self
    where
        I: IntoIterator<Item = Pose2D>,
    {
        let nodes: Vec<RoadmapNode> = poses
            .into_iter()
            .map(|pose| RoadmapNode::new(pose, footprint))
            .collect();
        let count = nodes.len();
        Self {
            nodes,
            footprint,
            target_count: count,
            attempts: count,
        }
    }

    pub fn nodes(&self) -> &[RoadmapNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&RoadmapNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn footprint(&self) -> VehicleFootprint {
        self.footprint
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Poses drawn while building, accepted or not
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Nodes missing from the requested count
    pub fn shortfall(&self) -> usize {
        self.target_count.saturating_sub(self.nodes.len())
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }
}

/// Rejection sampler producing a [`Roadmap`]
pub struct RoadmapBuilder {
    config: RoadmapConfig,
    footprint: VehicleFootprint,
}

impl RoadmapBuilder {
    pub fn new(config: RoadmapConfig, footprint: VehicleFootprint) -> PlannerResult<Self> {
        config.validate()?;
        footprint.validate()?;
        Ok(Self { config, footprint })
    }

    pub fn config(&self) -> &RoadmapConfig {
        &self.config
    }

    /// Sample until `node_count` nodes are accepted or the attempt budget runs out
    pub fn build<R: Rng + ?Sized>(&self, obstacles: &Obstacles, rng: &mut R) -> Roadmap {
        let mut nodes = Vec::with_capacity(self.config.node_count);
        let mut attempts = 0;

        while nodes.len() < self.config.node_count && attempts < self.config.max_attempts {
            attempts += 1;
            let pose = self.sample_pose(rng);
            if !obstacles.collides(&self.footprint.at(&pose)) {
                nodes.push(RoadmapNode::new(pose, self.footprint));
            }
        }

        let roadmap = Roadmap {
            nodes,
            footprint: self.footprint,
            target_count: self.config.node_count,
            attempts,
        };

        if roadmap.is_complete() {
            debug!(
                "roadmap: {} nodes accepted after {} draws",
                roadmap.len(),
                attempts
            );
        } else {
            warn!(
                "roadmap: only {} of {} nodes accepted within {} draws",
                roadmap.len(),
                roadmap.target_count(),
                attempts
            );
        }
        roadmap
    }

    fn sample_pose<R: Rng + ?Sized>(&self, rng: &mut R) -> Pose2D {
        let b = &self.config.bounds;
        Pose2D::new(
            rng.gen_range(b.xmin..b.xmax),
            rng.gen_range(b.ymin..b.ymax),
            rng.gen_range(0.0..self.config.heading_range.upper()),
        )
    }
}

/// Build a roadmap in one call
pub fn build_roadmap<R: Rng + ?Sized>(
    config: &RoadmapConfig,
    footprint: VehicleFootprint,
    obstacles: &Obstacles,
    rng: &mut R,
) -> PlannerResult<Roadmap> {
    let builder = RoadmapBuilder::new(config.clone(), footprint)?;
    Ok(builder.build(obstacles, rng))
}

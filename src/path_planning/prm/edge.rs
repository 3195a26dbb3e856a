//! Lazy edge evaluation: a Dubins connection is an edge only if the vehicle
//! footprint is clear of every obstacle at each sampled pose.

use crate::common::{EdgeEvaluation, PlannerError, PlannerResult};
use crate::geometry::{Obstacles, VehicleFootprint};
use crate::path_planning::dubins_path::DubinsPath;
use crate::path_planning::prm::roadmap::RoadmapNode;

/// Directed, collision-free connection between two search vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub cost: f64,
}

/// Edge evaluator backed by the Dubins solver and the obstacle set
#[derive(Debug, Clone, Copy)]
pub struct CollisionEdgeEvaluator<'a> {
    obstacles: &'a Obstacles,
    turning_radius: f64,
    collision_step: f64,
}

impl<'a> CollisionEdgeEvaluator<'a> {
    pub fn new(obstacles: &'a Obstacles, turning_radius: f64, collision_step: f64) -> PlannerResult<Self> {
        if !(turning_radius > 0.0) || !turning_radius.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "turning radius must be positive, got {}",
                turning_radius
            )));
        }
        if !(collision_step > 0.0) || !collision_step.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "collision step must be positive, got {}",
                collision_step
            )));
        }
        Ok(Self {
            obstacles,
            turning_radius,
            collision_step,
        })
    }

    pub fn turning_radius(&self) -> f64 {
        self.turning_radius
    }

    /// True when no sample of `path` puts the footprint on an obstacle
    pub fn path_is_free(&self, path: &DubinsPath, footprint: &VehicleFootprint) -> PlannerResult<bool> {
        let mut samples = path.sample(self.collision_step)?;
        Ok(samples.all(|pose| !self.obstacles.collides(&footprint.at(&pose))))
    }
}

impl EdgeEvaluation for CollisionEdgeEvaluator<'_> {
    fn evaluate(&self, from: &RoadmapNode, to: &RoadmapNode) -> PlannerResult<Option<f64>> {
        let path = DubinsPath::shortest(&from.pose, &to.pose, self.turning_radius)?;
        if self.path_is_free(&path, &from.footprint)? {
            Ok(Some(path.length()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Point2D, Pose2D};
    use crate::geometry::OrientedRect;

    fn node(x: f64, y: f64, yaw: f64) -> RoadmapNode {
        RoadmapNode::new(Pose2D::new(x, y, yaw), VehicleFootprint::default())
    }

    #[test]
    fn test_free_edge_costs_path_length() {
        let obstacles = Obstacles::new();
        let evaluator = CollisionEdgeEvaluator::new(&obstacles, 30.0, 20.0).unwrap();
        let cost = evaluator.evaluate(&node(0.0, 0.0, 0.0), &node(100.0, 0.0, 0.0)).unwrap();
        assert!((cost.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_on_segment_blocks_edge() {
        let obstacles = Obstacles::from_rects(vec![OrientedRect::axis_aligned(
            Point2D::new(50.0, 0.0),
            10.0,
            10.0,
        )]);
        let evaluator = CollisionEdgeEvaluator::new(&obstacles, 30.0, 20.0).unwrap();
        assert_eq!(evaluator.evaluate(&node(0.0, 0.0, 0.0), &node(100.0, 0.0, 0.0)).unwrap(), None);
        // clear when passing well to the side
        assert!(evaluator
            .evaluate(&node(0.0, 100.0, 0.0), &node(100.0, 100.0, 0.0))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_endpoint_in_obstacle_blocks_edge() {
        let obstacles = Obstacles::from_rects(vec![OrientedRect::axis_aligned(
            Point2D::new(300.0, 0.0),
            20.0,
            20.0,
        )]);
        let evaluator = CollisionEdgeEvaluator::new(&obstacles, 30.0, 1000.0).unwrap();
        assert_eq!(evaluator.evaluate(&node(0.0, 0.0, 0.0), &node(300.0, 0.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn test_invalid_parameters() {
        let obstacles = Obstacles::new();
        assert!(CollisionEdgeEvaluator::new(&obstacles, 0.0, 20.0).is_err());
        assert!(CollisionEdgeEvaluator::new(&obstacles, 30.0, -1.0).is_err());
        assert!(CollisionEdgeEvaluator::new(&obstacles, 30.0, f64::NAN).is_err());
    }
}

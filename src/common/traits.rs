//! Common traits defining the seams of the planner

use crate::common::error::PlannerResult;
use crate::common::types::*;
use crate::path_planning::prm::{RoadmapNode, SearchResult};

/// Trait for planners that connect two oriented poses
pub trait PosePlanner {
    /// Plan a route from start to goal
    fn plan(&self, start: Pose2D, goal: Pose2D) -> PlannerResult<SearchResult>;
}

/// Trait for the lazy edge cost used by the roadmap search
pub trait EdgeEvaluation {
    /// Cost of driving from `from` to `to`, or `None` when the connection is blocked
    fn evaluate(&self, from: &RoadmapNode, to: &RoadmapNode) -> PlannerResult<Option<f64>>;
}

/// Trait for things that can draw themselves
pub trait Visualizable {
    /// Draw current state to visualizer
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_planning::prm::NoPathReason;

    struct DummyPlanner;

    impl PosePlanner for DummyPlanner {
        fn plan(&self, _start: Pose2D, _goal: Pose2D) -> PlannerResult<SearchResult> {
            Ok(SearchResult::NoPath(NoPathReason::FrontierExhausted))
        }
    }

    #[test]
    fn test_pose_planner_trait() {
        let planner = DummyPlanner;
        let result = planner.plan(Pose2D::origin(), Pose2D::new(1.0, 1.0, 0.0));
        assert!(matches!(result, Ok(SearchResult::NoPath(_))));
    }
}

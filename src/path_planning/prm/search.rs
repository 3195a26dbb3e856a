//! Uniform-cost search over the roadmap with lazily evaluated Dubins edges
//!
//! The graph is never materialised: candidate edges are evaluated when their
//! source node is settled, so blocked connections far from the cheapest route
//! are never checked at all.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use itertools::Itertools;
use ordered_float::NotNan;
use serde::Deserialize;
use tracing::{debug, info};

use crate::common::{EdgeEvaluation, PlannerError, PlannerResult, PosePlanner, Pose2D};
use crate::geometry::Obstacles;
use crate::path_planning::dubins_path::DubinsPath;
use crate::path_planning::prm::edge::{CollisionEdgeEvaluator, Edge};
use crate::path_planning::prm::roadmap::{Roadmap, RoadmapNode};

/// Search parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum turning radius of the car
    pub turning_radius: f64,
    /// Arc length between collision checks along an edge
    pub collision_step: f64,
    /// Pairs further apart than this are never evaluated
    pub connection_radius: f64,
    /// Upper bound on settled nodes, unbounded when `None`
    pub max_expansions: Option<usize>,
    /// Also accept arriving at the goal with the opposite heading
    pub accept_reversed_goal: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            turning_radius: 30.0,
            collision_step: 20.0,
            connection_radius: f64::INFINITY,
            max_expansions: None,
            accept_reversed_goal: false,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.turning_radius > 0.0) || !self.turning_radius.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "turning radius must be positive, got {}",
                self.turning_radius
            )));
        }
        if !(self.collision_step > 0.0) || !self.collision_step.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "collision step must be positive, got {}",
                self.collision_step
            )));
        }
        // infinity is allowed and disables the prune
        if !(self.connection_radius > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "connection radius must be positive, got {}",
                self.connection_radius
            )));
        }
        Ok(())
    }
}

/// Why a search ended without a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoPathReason {
    /// Every reachable node was settled without meeting the goal
    FrontierExhausted,
    /// `max_expansions` nodes were settled first
    ExpansionLimit,
    /// The start footprint overlaps an obstacle
    StartBlocked,
    /// The goal footprint overlaps an obstacle
    GoalBlocked,
}

/// Cheapest route found by the search
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    /// Visited nodes, start first
    pub nodes: Vec<RoadmapNode>,
    /// One Dubins path per consecutive pair of nodes
    pub segments: Vec<DubinsPath>,
    /// Sum of the segment lengths
    pub cost: f64,
}

impl PlannedRoute {
    fn from_nodes(nodes: Vec<RoadmapNode>, cost: f64, turning_radius: f64) -> PlannerResult<Self> {
        let segments = nodes
            .iter()
            .tuple_windows()
            .map(|(a, b)| DubinsPath::shortest(&a.pose, &b.pose, turning_radius))
            .collect::<PlannerResult<Vec<_>>>()?;
        Ok(Self { nodes, segments, cost })
    }

    pub fn poses_of_nodes(&self) -> Vec<Pose2D> {
        self.nodes.iter().map(|n| n.pose).collect()
    }

    /// Dense pose sequence along the whole route; shared joints appear once
    pub fn poses(&self, step: f64) -> PlannerResult<Vec<Pose2D>> {
        if self.segments.is_empty() {
            return Ok(self.nodes.iter().map(|n| n.pose).take(1).collect());
        }
        let mut poses = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            let skip = if i == 0 { 0 } else { 1 };
            poses.extend(segment.sample(step)?.skip(skip));
        }
        Ok(poses)
    }
}

/// Outcome of a search
#[derive(Debug, Clone)]
pub enum SearchResult {
    Found(PlannedRoute),
    NoPath(NoPathReason),
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }

    pub fn route(&self) -> Option<&PlannedRoute> {
        match self {
            SearchResult::Found(route) => Some(route),
            SearchResult::NoPath(_) => None,
        }
    }

    pub fn into_route(self) -> Option<PlannedRoute> {
        match self {
            SearchResult::Found(route) => Some(route),
            SearchResult::NoPath(_) => None,
        }
    }
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes settled
    pub expansions: usize,
    /// Calls into the edge evaluator
    pub edge_evaluations: usize,
    /// Candidate pairs skipped by the connection radius
    pub pruned: usize,
}

type FrontierEntry = (Reverse<NotNan<f64>>, Reverse<u64>, usize);

struct SearchState {
    best_cost: Vec<f64>,
    parent: Vec<Option<usize>>,
    settled: Vec<bool>,
    frontier: BinaryHeap<FrontierEntry>,
    seq: u64,
}

impl SearchState {
    fn new(size: usize) -> Self {
        Self {
            best_cost: vec![f64::INFINITY; size],
            parent: vec![None; size],
            settled: vec![false; size],
            frontier: BinaryHeap::new(),
            seq: 0,
        }
    }

    fn push(&mut self, cost: f64, index: usize) -> PlannerResult<()> {
        let key = NotNan::new(cost)
            .map_err(|_| PlannerError::NumericalError(format!("NaN cost reaching vertex {}", index)))?;
        self.frontier.push((Reverse(key), Reverse(self.seq), index));
        self.seq += 1;
        Ok(())
    }

    /// Record `edge` if it improves on the best known cost of its target
    fn relax(&mut self, edge: Edge) -> PlannerResult<()> {
        let cost = self.best_cost[edge.from] + edge.cost;
        if cost < self.best_cost[edge.to] {
            self.best_cost[edge.to] = cost;
            self.parent[edge.to] = Some(edge.from);
            self.push(cost, edge.to)?;
        }
        Ok(())
    }

    fn reconstruct(&self, end: usize) -> Vec<usize> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(prev) = self.parent[current] {
            path.push(prev);
            current = prev;
        }
        path.reverse();
        path
    }
}

enum Outcome {
    Reached { path: Vec<usize>, cost: f64 },
    Failed(NoPathReason),
}

fn uniform_cost_search<E: EdgeEvaluation + ?Sized>(
    vertices: &[RoadmapNode],
    start: usize,
    goals: &[usize],
    evaluator: &E,
    connection_radius: f64,
    max_expansions: Option<usize>,
    stats: &mut SearchStats,
) -> PlannerResult<Outcome> {
    let mut state = SearchState::new(vertices.len());
    state.best_cost[start] = 0.0;
    state.push(0.0, start)?;

    while let Some((Reverse(cost), _, current)) = state.frontier.pop() {
        if state.settled[current] {
            continue;
        }
        let cost = cost.into_inner();

        if goals.iter().any(|&g| vertices[g] == vertices[current]) {
            return Ok(Outcome::Reached {
                path: state.reconstruct(current),
                cost,
            });
        }

        if let Some(limit) = max_expansions {
            if stats.expansions >= limit {
                return Ok(Outcome::Failed(NoPathReason::ExpansionLimit));
            }
        }
        state.settled[current] = true;
        stats.expansions += 1;

        let from = &vertices[current];
        for (candidate, to) in vertices.iter().enumerate() {
            if state.settled[candidate] {
                continue;
            }
            if from.pose.position().distance(&to.pose.position()) > connection_radius {
                stats.pruned += 1;
                continue;
            }
            stats.edge_evaluations += 1;
            if let Some(edge_cost) = evaluator.evaluate(from, to)? {
                state.relax(Edge {
                    from: current,
                    to: candidate,
                    cost: edge_cost,
                })?;
            }
        }
    }

    Ok(Outcome::Failed(NoPathReason::FrontierExhausted))
}

/// Cheapest collision-free route from `start` to `goal` through the roadmap,
/// together with the search counters
pub fn find_path_with_stats(
    roadmap: &Roadmap,
    obstacles: &Obstacles,
    start: Pose2D,
    goal: Pose2D,
    config: &SearchConfig,
) -> PlannerResult<(SearchResult, SearchStats)> {
    config.validate()?;
    start.ensure_finite("start")?;
    goal.ensure_finite("goal")?;

    let mut stats = SearchStats::default();
    let footprint = roadmap.footprint();
    if obstacles.collides(&footprint.at(&start)) {
        info!("search: start pose ({:.1}, {:.1}) is blocked", start.x, start.y);
        return Ok((SearchResult::NoPath(NoPathReason::StartBlocked), stats));
    }
    if obstacles.collides(&footprint.at(&goal)) {
        info!("search: goal pose ({:.1}, {:.1}) is blocked", goal.x, goal.y);
        return Ok((SearchResult::NoPath(NoPathReason::GoalBlocked), stats));
    }

    let mut vertices: Vec<RoadmapNode> = roadmap.nodes().to_vec();
    let start_index = vertices.len();
    vertices.push(RoadmapNode::new(start, footprint));
    let mut goals = vec![vertices.len()];
    vertices.push(RoadmapNode::new(goal, footprint));
    if config.accept_reversed_goal {
        goals.push(vertices.len());
        vertices.push(RoadmapNode::new(goal.reversed(), footprint));
    }

    let evaluator = CollisionEdgeEvaluator::new(obstacles, config.turning_radius, config.collision_step)?;
    let outcome = uniform_cost_search(
        &vertices,
        start_index,
        &goals,
        &evaluator,
        config.connection_radius,
        config.max_expansions,
        &mut stats,
    )?;

    let result = match outcome {
        Outcome::Reached { path, cost } => {
            let nodes = path.into_iter().map(|i| vertices[i]).collect();
            let route = PlannedRoute::from_nodes(nodes, cost, config.turning_radius)?;
            info!(
                "search: route with {} nodes, cost {:.3} ({} expansions, {} edge evaluations, {} pruned)",
                route.nodes.len(),
                route.cost,
                stats.expansions,
                stats.edge_evaluations,
                stats.pruned
            );
            SearchResult::Found(route)
        }
        Outcome::Failed(reason) => {
            info!(
                "search: no path ({:?}) after {} expansions, {} edge evaluations, {} pruned",
                reason, stats.expansions, stats.edge_evaluations, stats.pruned
            );
            SearchResult::NoPath(reason)
        }
    };
    debug!("search: {} vertices, {} goal candidates", vertices.len(), goals.len());
    Ok((result, stats))
}

/// Cheapest collision-free route from `start` to `goal` through the roadmap
pub fn find_path(
    roadmap: &Roadmap,
    obstacles: &Obstacles,
    start: Pose2D,
    goal: Pose2D,
    config: &SearchConfig,
) -> PlannerResult<SearchResult> {
    find_path_with_stats(roadmap, obstacles, start, goal, config).map(|(result, _)| result)
}

/// Roadmap planner answering start/goal queries against a fixed scene
pub struct PrmPlanner {
    roadmap: Roadmap,
    obstacles: Obstacles,
    config: SearchConfig,
}

impl PrmPlanner {
    pub fn new(roadmap: Roadmap, obstacles: Obstacles, config: SearchConfig) -> PlannerResult<Self> {
        config.validate()?;
        Ok(Self {
            roadmap,
            obstacles,
            config,
        })
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn obstacles(&self) -> &Obstacles {
        &self.obstacles
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl PosePlanner for PrmPlanner {
    fn plan(&self, start: Pose2D, goal: Pose2D) -> PlannerResult<SearchResult> {
        find_path(&self.roadmap, &self.obstacles, start, goal, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;
    use crate::geometry::{OrientedRect, VehicleFootprint};
    use std::f64::consts::PI;

    /// Evaluator with a fixed cost table keyed by the x coordinate of each node
    struct TableEvaluator {
        costs: Vec<((usize, usize), f64)>,
    }

    impl EdgeEvaluation for TableEvaluator {
        fn evaluate(&self, from: &RoadmapNode, to: &RoadmapNode) -> PlannerResult<Option<f64>> {
            let key = (from.pose.x as usize, to.pose.x as usize);
            Ok(self.costs.iter().find(|(k, _)| *k == key).map(|(_, c)| *c))
        }
    }

    fn vertex(id: usize) -> RoadmapNode {
        RoadmapNode::new(Pose2D::new(id as f64, 0.0, 0.0), VehicleFootprint::default())
    }

    const S: usize = 0;
    const A: usize = 1;
    const B: usize = 2;
    const C: usize = 3;
    const G: usize = 4;

    fn run(evaluator: &TableEvaluator, radius: f64, limit: Option<usize>) -> (Outcome, SearchStats) {
        let vertices: Vec<RoadmapNode> = (0..5).map(vertex).collect();
        let mut stats = SearchStats::default();
        let outcome = uniform_cost_search(&vertices, S, &[G], evaluator, radius, limit, &mut stats).unwrap();
        (outcome, stats)
    }

    #[test]
    fn test_cheapest_route_wins_over_fewest_hops() {
        let evaluator = TableEvaluator {
            costs: vec![
                ((S, C), 1.0),
                ((C, G), 10.0),
                ((S, A), 2.0),
                ((A, B), 2.0),
                ((B, G), 2.0),
            ],
        };
        match run(&evaluator, f64::INFINITY, None).0 {
            Outcome::Reached { path, cost } => {
                assert_eq!(path, vec![S, A, B, G]);
                assert!((cost - 6.0).abs() < 1e-12);
            }
            Outcome::Failed(reason) => panic!("unexpected failure {:?}", reason),
        }
    }

    #[test]
    fn test_disconnected_graph_exhausts_frontier() {
        let evaluator = TableEvaluator {
            costs: vec![((S, A), 1.0), ((A, B), 1.0), ((C, G), 1.0)],
        };
        let (outcome, stats) = run(&evaluator, f64::INFINITY, None);
        assert!(matches!(outcome, Outcome::Failed(NoPathReason::FrontierExhausted)));
        assert_eq!(stats.expansions, 3);
    }

    #[test]
    fn test_equal_costs_pop_in_insertion_order() {
        let evaluator = TableEvaluator {
            costs: vec![((S, A), 1.0), ((S, B), 1.0), ((A, G), 1.0), ((B, G), 1.0)],
        };
        for _ in 0..3 {
            match run(&evaluator, f64::INFINITY, None).0 {
                Outcome::Reached { path, .. } => assert_eq!(path, vec![S, A, G]),
                Outcome::Failed(reason) => panic!("unexpected failure {:?}", reason),
            }
        }
    }

    #[test]
    fn test_expansion_limit() {
        let evaluator = TableEvaluator {
            costs: vec![((S, A), 1.0), ((A, G), 1.0)],
        };
        let (outcome, stats) = run(&evaluator, f64::INFINITY, Some(1));
        assert!(matches!(outcome, Outcome::Failed(NoPathReason::ExpansionLimit)));
        assert_eq!(stats.expansions, 1);

        assert!(matches!(run(&evaluator, f64::INFINITY, Some(2)).0, Outcome::Reached { .. }));
    }

    #[test]
    fn test_connection_radius_prunes_before_evaluation() {
        let evaluator = TableEvaluator {
            costs: vec![((S, G), 1.0), ((S, A), 3.0), ((A, G), 3.0)],
        };
        let (open, open_stats) = run(&evaluator, f64::INFINITY, None);
        match open {
            Outcome::Reached { path, .. } => assert_eq!(path, vec![S, G]),
            Outcome::Failed(reason) => panic!("unexpected failure {:?}", reason),
        }
        assert_eq!(open_stats.pruned, 0);

        // S and G are 4 apart, A-G is exactly 3
        let (pruned, pruned_stats) = run(&evaluator, 3.0, None);
        match pruned {
            Outcome::Reached { path, cost } => {
                assert_eq!(path, vec![S, A, G]);
                assert!((cost - 6.0).abs() < 1e-12);
            }
            Outcome::Failed(reason) => panic!("unexpected failure {:?}", reason),
        }
        assert!(pruned_stats.pruned > 0);
    }

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    fn empty_roadmap() -> Roadmap {
        Roadmap::from_poses(VehicleFootprint::default(), Vec::new())
    }

    fn assert_hops_clear(route: &PlannedRoute, obstacles: &Obstacles) {
        let footprint = VehicleFootprint::default();
        for segment in &route.segments {
            for pose in segment.sample(config().collision_step).unwrap() {
                assert!(!obstacles.collides(&footprint.at(&pose)));
            }
        }
    }

    #[test]
    fn test_straight_route_without_obstacles() {
        let result = find_path(
            &empty_roadmap(),
            &Obstacles::new(),
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(100.0, 0.0, 0.0),
            &config(),
        )
        .unwrap();
        let route = result.route().unwrap();
        assert_eq!(route.nodes.len(), 2);
        assert_eq!(route.segments.len(), 1);
        assert!((route.cost - 100.0).abs() < 1e-9);

        let poses = route.poses(7.0).unwrap();
        assert_eq!(poses.len(), 16);
        assert_eq!(poses[0], Pose2D::new(0.0, 0.0, 0.0));
        assert_eq!(poses[15], Pose2D::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn test_start_equal_to_goal_is_zero_cost_route() {
        let pose = Pose2D::new(100.0, 100.0, 0.3);
        let result = find_path(&empty_roadmap(), &Obstacles::new(), pose, pose, &config()).unwrap();
        let route = result.route().unwrap();
        assert_eq!(route.cost, 0.0);
        assert_eq!(route.poses(5.0).unwrap(), vec![pose]);
    }

    #[test]
    fn test_enclosed_goal_has_no_path() {
        let obstacles = Obstacles::from_rects(vec![
            OrientedRect::axis_aligned(Point2D::new(170.0, 250.0), 10.0, 220.0),
            OrientedRect::axis_aligned(Point2D::new(330.0, 250.0), 10.0, 220.0),
            OrientedRect::axis_aligned(Point2D::new(250.0, 170.0), 220.0, 10.0),
            OrientedRect::axis_aligned(Point2D::new(250.0, 330.0), 220.0, 10.0),
        ]);
        let roadmap = Roadmap::from_poses(
            VehicleFootprint::default(),
            vec![
                Pose2D::new(50.0, 50.0, 0.0),
                Pose2D::new(450.0, 450.0, 1.0),
                Pose2D::new(50.0, 450.0, 2.0),
            ],
        );
        let (result, stats) = find_path_with_stats(
            &roadmap,
            &obstacles,
            Pose2D::new(50.0, 50.0, 0.0),
            Pose2D::new(250.0, 250.0, 0.0),
            &config(),
        )
        .unwrap();
        assert!(matches!(result, SearchResult::NoPath(NoPathReason::FrontierExhausted)));
        assert!(!result.is_found());
        assert!(stats.edge_evaluations > 0);
    }

    #[test]
    fn test_route_detours_around_obstacle() {
        let obstacles = Obstacles::from_rects(vec![OrientedRect::axis_aligned(
            Point2D::new(200.0, 0.0),
            40.0,
            40.0,
        )]);
        let far = Pose2D::new(200.0, 250.0, 0.0);
        let roadmap = Roadmap::from_poses(
            VehicleFootprint::default(),
            vec![Pose2D::new(130.0, 100.0, 0.0), Pose2D::new(270.0, 100.0, 0.0), far],
        );
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(400.0, 0.0, 0.0);

        let route = find_path(&roadmap, &obstacles, start, goal, &config())
            .unwrap()
            .into_route()
            .unwrap();

        assert!(route.nodes.len() >= 3);
        assert_eq!(route.nodes[0].pose, start);
        assert_eq!(route.nodes[route.nodes.len() - 1].pose, goal);
        assert!(route.nodes.iter().all(|n| n.pose != far));
        assert!(route.cost >= 400.0);

        let via_far = DubinsPath::shortest(&start, &far, 30.0).unwrap().length()
            + DubinsPath::shortest(&far, &goal, 30.0).unwrap().length();
        assert!(route.cost < via_far);

        let summed: f64 = route.segments.iter().map(|s| s.length()).sum();
        assert!((summed - route.cost).abs() < 1e-6);
        assert_hops_clear(&route, &obstacles);
    }

    #[test]
    fn test_reversed_goal_is_opt_in() {
        let obstacles = Obstacles::from_rects(vec![
            OrientedRect::axis_aligned(Point2D::new(300.0, 35.0), 200.0, 20.0),
            OrientedRect::axis_aligned(Point2D::new(300.0, -35.0), 200.0, 20.0),
            OrientedRect::axis_aligned(Point2D::new(410.0, 0.0), 20.0, 90.0),
        ]);
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(300.0, 0.0, PI);

        let strict = find_path(&empty_roadmap(), &obstacles, start, goal, &config()).unwrap();
        assert!(matches!(strict, SearchResult::NoPath(NoPathReason::FrontierExhausted)));

        let relaxed = SearchConfig {
            accept_reversed_goal: true,
            ..config()
        };
        let route = find_path(&empty_roadmap(), &obstacles, start, goal, &relaxed)
            .unwrap()
            .into_route()
            .unwrap();
        assert!((route.cost - 300.0).abs() < 1e-9);
        assert_eq!(route.nodes[route.nodes.len() - 1].pose, goal.reversed());
        assert_hops_clear(&route, &obstacles);
    }

    #[test]
    fn test_blocked_endpoints() {
        let obstacles = Obstacles::from_rects(vec![OrientedRect::axis_aligned(
            Point2D::new(0.0, 0.0),
            20.0,
            20.0,
        )]);
        let free = Pose2D::new(200.0, 200.0, 0.0);
        let blocked = Pose2D::new(0.0, 0.0, 0.0);

        let result = find_path(&empty_roadmap(), &obstacles, blocked, free, &config()).unwrap();
        assert!(matches!(result, SearchResult::NoPath(NoPathReason::StartBlocked)));
        let result = find_path(&empty_roadmap(), &obstacles, free, blocked, &config()).unwrap();
        assert!(matches!(result, SearchResult::NoPath(NoPathReason::GoalBlocked)));
    }

    #[test]
    fn test_invalid_search_config() {
        let bad = SearchConfig {
            turning_radius: 0.0,
            ..config()
        };
        assert!(find_path(
            &empty_roadmap(),
            &Obstacles::new(),
            Pose2D::origin(),
            Pose2D::new(10.0, 0.0, 0.0),
            &bad
        )
        .is_err());
        assert!(PrmPlanner::new(empty_roadmap(), Obstacles::new(), bad).is_err());

        let nan_goal = Pose2D::new(f64::NAN, 0.0, 0.0);
        assert!(find_path(&empty_roadmap(), &Obstacles::new(), Pose2D::origin(), nan_goal, &config()).is_err());
    }

    #[test]
    fn test_planner_through_trait() {
        let roadmap = Roadmap::from_poses(VehicleFootprint::default(), vec![Pose2D::new(150.0, 150.0, 0.5)]);
        let planner = PrmPlanner::new(roadmap, Obstacles::new(), config()).unwrap();
        let result = planner
            .plan(Pose2D::new(50.0, 50.0, 0.0), Pose2D::new(300.0, 50.0, 0.0))
            .unwrap();
        assert!(result.is_found());
        assert_eq!(planner.roadmap().len(), 1);
    }
}

//! Probabilistic roadmap for a car-like vehicle
//!
//! Nodes are feasible vehicle poses, edges are Dubins paths that are only
//! collision checked when the search reaches them.

pub mod edge;
pub mod roadmap;
pub mod search;

pub use edge::{CollisionEdgeEvaluator, Edge};
pub use roadmap::{build_roadmap, HeadingRange, Roadmap, RoadmapBuilder, RoadmapConfig, RoadmapNode};
pub use search::{
    find_path, find_path_with_stats, NoPathReason, PlannedRoute, PrmPlanner, SearchConfig, SearchResult,
    SearchStats,
};

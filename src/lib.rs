//! prm_car - probabilistic roadmap planning for a car-like vehicle
//!
//! The vehicle is a rectangle that cannot turn tighter than a fixed radius.
//! Roadmap nodes are collision-free poses, edges are Dubins paths checked
//! against rectangular obstacles only when the search needs them.

// Core modules
pub mod common;
pub mod config;
pub mod geometry;
pub mod utils;

// Planning
pub mod path_planning;

// Re-export common types for convenience
pub use common::{AreaBounds, Point2D, Pose2D};
pub use common::{EdgeEvaluation, PosePlanner, Visualizable};
pub use common::{PlannerError, PlannerResult};
pub use config::PlannerConfig;
pub use geometry::{Obstacles, OrientedRect, VehicleFootprint};
pub use path_planning::{find_path, DubinsPath, PlannedRoute, PrmPlanner, Roadmap, SearchResult};

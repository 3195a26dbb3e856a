//! Geometry kernel: oriented rectangles, obstacles and the vehicle footprint

pub mod oriented_rect;
pub mod obstacles;

pub use oriented_rect::{intersects, quick_reject, OrientedRect};
pub use obstacles::{Obstacle, Obstacles, VehicleFootprint};

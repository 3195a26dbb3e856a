//! Utility modules for prm_car

pub mod visualization;

pub use visualization::{colors, PathStyle, PointStyle, Visualizer};

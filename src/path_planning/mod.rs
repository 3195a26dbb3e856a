// Path planning for a car-like vehicle

pub mod dubins_path;
pub mod prm;

pub use dubins_path::{sample_path, DubinsPath, DubinsPathType, PathSamples, SegmentType};
pub use prm::*;

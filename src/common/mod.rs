//! Common types, traits, and error definitions for prm_car
//!
//! This module provides the foundational building blocks shared by
//! the geometry kernel, the curvature path solver and the roadmap planner.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;

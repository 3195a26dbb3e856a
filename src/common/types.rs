//! Common types used throughout prm_car

use nalgebra::{Rotation2, Vector2};
use serde::Deserialize;
use std::f64::consts::PI;

use crate::common::error::{PlannerError, PlannerResult};

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Rotate counter-clockwise about the origin
    pub fn rotate(&self, theta: f64) -> Point2D {
        Point2D::from(Rotation2::new(theta) * self.to_vector())
    }

    /// Translate by `delta`
    pub fn offset(&self, delta: &Point2D) -> Point2D {
        Point2D::new(self.x + delta.x, self.y + delta.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Rotate `point` counter-clockwise about the origin by `theta` radians
pub fn rotate(point: &Point2D, theta: f64) -> Point2D {
    point.rotate(theta)
}

/// Translate `point` by `delta`
pub fn offset(point: &Point2D, delta: &Point2D) -> Point2D {
    point.offset(delta)
}

/// 2D pose (position + orientation)
///
/// The yaw is never wrapped, so two poses facing the same way may still compare unequal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Euclidean distance between the positions, ignoring yaw
    pub fn distance(&self, other: &Pose2D) -> f64 {
        self.position().distance(&other.position())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.yaw.is_finite()
    }

    /// Same position, facing the opposite way
    pub fn reversed(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.yaw + PI)
    }

    pub(crate) fn ensure_finite(&self, what: &str) -> PlannerResult<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(PlannerError::InvalidParameter(format!(
                "{} pose is not finite: ({}, {}, {})",
                what, self.x, self.y, self.yaw
            )))
        }
    }
}

/// Axis-aligned sampling area
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AreaBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl AreaBounds {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        AreaBounds { xmin, xmax, ymin, ymax }
    }

    pub fn from_array(area: [f64; 4]) -> Self {
        AreaBounds {
            xmin: area[0],
            xmax: area[1],
            ymin: area[2],
            ymax: area[3],
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Both extents finite and strictly positive
    pub fn validate(&self) -> PlannerResult<()> {
        let finite = [self.xmin, self.xmax, self.ymin, self.ymax]
            .iter()
            .all(|v| v.is_finite());
        if !finite
            || !self.width().is_finite()
            || !self.height().is_finite()
            || self.xmin >= self.xmax || self.ymin >= self.ymax {
            return Err(PlannerError::InvalidParameter(format!(
                "sampling bounds are empty: x [{}, {}), y [{}, {})",
                self.xmin, self.xmax, self.ymin, self.ymax
            )));
        }
        Ok(())
    }

    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}

impl Default for AreaBounds {
    fn default() -> Self {
        Self::new(0.0, 500.0, 0.0, 500.0)
    }
}

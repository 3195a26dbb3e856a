//! Oriented rectangle overlap test
//!
//! Rectangles are plain values: every query recomputes the corners from the
//! current center and yaw, and moving a rectangle yields a new one.
//! Overlap uses the Separating Axis Theorem; rectangles that only touch along
//! an edge or at a corner are reported as colliding.

use nalgebra::Vector2;

use crate::common::{Point2D, Pose2D};

/// Rectangle with its width along the heading and its height across it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    center: Point2D,
    width: f64,
    height: f64,
    yaw: f64,
}

impl OrientedRect {
    pub fn new(center: Point2D, width: f64, height: f64, yaw: f64) -> Self {
        Self {
            center,
            width,
            height,
            yaw,
        }
    }

    /// Axis-aligned rectangle
    pub fn axis_aligned(center: Point2D, width: f64, height: f64) -> Self {
        Self::new(center, width, height, 0.0)
    }

    pub fn from_pose(pose: &Pose2D, width: f64, height: f64) -> Self {
        Self::new(pose.position(), width, height, pose.yaw)
    }

    pub fn center(&self) -> Point2D {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.center.x, self.center.y, self.yaw)
    }

    /// Same extents placed at another pose
    pub fn with_pose(&self, pose: &Pose2D) -> Self {
        Self::from_pose(pose, self.width, self.height)
    }

    /// Radius of the circle through all four corners
    pub fn bounding_radius(&self) -> f64 {
        (self.width * self.width + self.height * self.height).sqrt() / 2.0
    }

    /// Corners as front-left, front-right, rear-right, rear-left
    pub fn corners(&self) -> [Point2D; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        [
            Point2D::new(hw, hh),
            Point2D::new(hw, -hh),
            Point2D::new(-hw, -hh),
            Point2D::new(-hw, hh),
        ]
        .map(|local| local.rotate(self.yaw).offset(&self.center))
    }

    /// Unit heading direction and its left normal
    fn axes(&self) -> [Vector2<f64>; 2] {
        let (s, c) = self.yaw.sin_cos();
        [Vector2::new(c, s), Vector2::new(-s, c)]
    }
}

/// True when the bounding circles are disjoint, so the rectangles cannot overlap
pub fn quick_reject(a: &OrientedRect, b: &OrientedRect) -> bool {
    a.center.distance(&b.center) > a.bounding_radius() + b.bounding_radius()
}

/// Exact overlap test, touching included
pub fn intersects(a: &OrientedRect, b: &OrientedRect) -> bool {
    let corners_a = a.corners();
    let corners_b = b.corners();

    for axis in a.axes().iter().chain(b.axes().iter()) {
        let (min_a, max_a) = project(&corners_a, axis);
        let (min_b, max_b) = project(&corners_b, axis);
        if max_a < min_b || max_b < min_a {
            return false;
        }
    }
    true
}

fn project(corners: &[Point2D; 4], axis: &Vector2<f64>) -> (f64, f64) {
    corners
        .iter()
        .map(|p| p.to_vector().dot(axis))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| {
            (lo.min(d), hi.max(d))
        })
}

//! Static obstacle set and the vehicle footprint template

use serde::Deserialize;

use crate::common::{PlannerError, PlannerResult, Pose2D};
use crate::geometry::oriented_rect::{intersects, quick_reject, OrientedRect};

/// Static rectangular obstacle; its yaw is fixed once built
pub type Obstacle = OrientedRect;

/// Obstacle collection, read-only while planning
#[derive(Debug, Clone, Default)]
pub struct Obstacles {
    rects: Vec<Obstacle>,
}

impl Obstacles {
    pub fn new() -> Self {
        Self { rects: Vec::new() }
    }

    pub fn from_rects(rects: Vec<Obstacle>) -> Self {
        Self { rects }
    }

    pub fn push(&mut self, rect: Obstacle) {
        self.rects.push(rect);
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.rects.iter()
    }

    pub fn as_slice(&self) -> &[Obstacle] {
        &self.rects
    }

    /// True when `rect` overlaps any obstacle
    pub fn collides(&self, rect: &OrientedRect) -> bool {
        self.rects
            .iter()
            .any(|obs| !quick_reject(obs, rect) && intersects(obs, rect))
    }
}

impl FromIterator<Obstacle> for Obstacles {
    fn from_iter<I: IntoIterator<Item = Obstacle>>(iter: I) -> Self {
        Self::from_rects(iter.into_iter().collect())
    }
}

/// Car body dimensions: width along the heading, height across it
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleFootprint {
    pub width: f64,
    pub height: f64,
}

impl VehicleFootprint {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Footprint placed at `pose`
    pub fn at(&self, pose: &Pose2D) -> OrientedRect {
        OrientedRect::from_pose(pose, self.width, self.height)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "vehicle footprint must be positive, got {} x {}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for VehicleFootprint {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 25.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;

    #[test]
    fn test_collides_with_any_obstacle() {
        let obstacles: Obstacles = vec![
            OrientedRect::axis_aligned(Point2D::new(100.0, 100.0), 50.0, 50.0),
            OrientedRect::axis_aligned(Point2D::new(300.0, 300.0), 50.0, 50.0),
        ]
        .into_iter()
        .collect();
        let car = VehicleFootprint::default();

        assert!(obstacles.collides(&car.at(&Pose2D::new(300.0, 330.0, 0.0))));
        assert!(!obstacles.collides(&car.at(&Pose2D::new(200.0, 200.0, 0.0))));
        assert!(!Obstacles::new().collides(&car.at(&Pose2D::origin())));
    }

    #[test]
    fn test_footprint_validate() {
        assert!(VehicleFootprint::default().validate().is_ok());
        assert!(VehicleFootprint::new(0.0, 10.0).validate().is_err());
        assert!(VehicleFootprint::new(10.0, f64::NAN).validate().is_err());
    }
}

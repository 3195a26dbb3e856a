// Dubins Path Planner
//
// Shortest forward-only path between two oriented poses for a vehicle that
// cannot turn tighter than a fixed radius. Every shortest path is one of six
// words made of left arcs (L), right arcs (R) and at most one straight (S).

use std::f64::consts::TAU;

use crate::common::{PlannerError, PlannerResult, Pose2D};

const COINCIDENT_EPS: f64 = 1e-12;

/// Primitive making up one third of a Dubins word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Left,
    Straight,
    Right,
}

/// The six Dubins words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DubinsPathType {
    LSL,
    LSR,
    RSL,
    RSR,
    RLR,
    LRL,
}

impl DubinsPathType {
    /// Evaluation order; the first word reaching the minimum length wins
    pub const ALL: [DubinsPathType; 6] = [
        DubinsPathType::LSL,
        DubinsPathType::LSR,
        DubinsPathType::RSL,
        DubinsPathType::RSR,
        DubinsPathType::RLR,
        DubinsPathType::LRL,
    ];

    pub fn segment_types(self) -> [SegmentType; 3] {
        use SegmentType::*;
        match self {
            DubinsPathType::LSL => [Left, Straight, Left],
            DubinsPathType::LSR => [Left, Straight, Right],
            DubinsPathType::RSL => [Right, Straight, Left],
            DubinsPathType::RSR => [Right, Straight, Right],
            DubinsPathType::RLR => [Right, Left, Right],
            DubinsPathType::LRL => [Left, Right, Left],
        }
    }
}

fn mod2pi(theta: f64) -> f64 {
    theta.rem_euclid(TAU)
}

/// Quantities shared by all six words, in the frame scaled by the turning radius
struct Intermediate {
    alpha: f64,
    beta: f64,
    d: f64,
    sa: f64,
    sb: f64,
    ca: f64,
    cb: f64,
    c_ab: f64,
    d_sq: f64,
}

impl Intermediate {
    fn new(q0: &Pose2D, q1: &Pose2D, rho: f64) -> Self {
        let dx = q1.x - q0.x;
        let dy = q1.y - q0.y;
        let d = dx.hypot(dy) / rho;
        let theta = mod2pi(dy.atan2(dx));
        let alpha = mod2pi(q0.yaw - theta);
        let beta = mod2pi(q1.yaw - theta);

        Self {
            alpha,
            beta,
            d,
            sa: alpha.sin(),
            sb: beta.sin(),
            ca: alpha.cos(),
            cb: beta.cos(),
            c_ab: (alpha - beta).cos(),
            d_sq: d * d,
        }
    }

    fn word(&self, path_type: DubinsPathType) -> Option<[f64; 3]> {
        match path_type {
            DubinsPathType::LSL => self.lsl(),
            DubinsPathType::LSR => self.lsr(),
            DubinsPathType::RSL => self.rsl(),
            DubinsPathType::RSR => self.rsr(),
            DubinsPathType::RLR => self.rlr(),
            DubinsPathType::LRL => self.lrl(),
        }
    }

    fn lsl(&self) -> Option<[f64; 3]> {
        let p_sq = 2.0 + self.d_sq - 2.0 * self.c_ab + 2.0 * self.d * (self.sa - self.sb);
        if p_sq < 0.0 {
            return None;
        }
        let tmp1 = (self.cb - self.ca).atan2(self.d + self.sa - self.sb);
        Some([
            mod2pi(tmp1 - self.alpha),
            p_sq.sqrt(),
            mod2pi(self.beta - tmp1),
        ])
    }

    fn rsr(&self) -> Option<[f64; 3]> {
        let p_sq = 2.0 + self.d_sq - 2.0 * self.c_ab + 2.0 * self.d * (self.sb - self.sa);
        if p_sq < 0.0 {
            return None;
        }
        let tmp1 = (self.ca - self.cb).atan2(self.d - self.sa + self.sb);
        Some([
            mod2pi(self.alpha - tmp1),
            p_sq.sqrt(),
            mod2pi(tmp1 - self.beta),
        ])
    }

    fn lsr(&self) -> Option<[f64; 3]> {
        let p_sq = -2.0 + self.d_sq + 2.0 * self.c_ab + 2.0 * self.d * (self.sa + self.sb);
        if p_sq < 0.0 {
            return None;
        }
        let p = p_sq.sqrt();
        let tmp0 = (-self.ca - self.cb).atan2(self.d + self.sa + self.sb) - (-2.0_f64).atan2(p);
        Some([mod2pi(tmp0 - self.alpha), p, mod2pi(tmp0 - self.beta)])
    }

    fn rsl(&self) -> Option<[f64; 3]> {
        let p_sq = -2.0 + self.d_sq + 2.0 * self.c_ab - 2.0 * self.d * (self.sa + self.sb);
        if p_sq < 0.0 {
            return None;
        }
        let p = p_sq.sqrt();
        let tmp0 = (self.ca + self.cb).atan2(self.d - self.sa - self.sb) - (2.0_f64).atan2(p);
        Some([mod2pi(self.alpha - tmp0), p, mod2pi(self.beta - tmp0)])
    }

    fn rlr(&self) -> Option<[f64; 3]> {
        let tmp0 = (6.0 - self.d_sq + 2.0 * self.c_ab + 2.0 * self.d * (self.sa - self.sb)) / 8.0;
        if tmp0.abs() > 1.0 {
            return None;
        }
        let phi = (self.ca - self.cb).atan2(self.d - self.sa + self.sb);
        let p = mod2pi(TAU - tmp0.acos());
        let t = mod2pi(self.alpha - phi + mod2pi(p / 2.0));
        Some([t, p, mod2pi(self.alpha - self.beta - t + mod2pi(p))])
    }

    fn lrl(&self) -> Option<[f64; 3]> {
        let tmp0 = (6.0 - self.d_sq + 2.0 * self.c_ab + 2.0 * self.d * (self.sb - self.sa)) / 8.0;
        if tmp0.abs() > 1.0 {
            return None;
        }
        let phi = (self.ca - self.cb).atan2(self.d + self.sa - self.sb);
        let p = mod2pi(TAU - tmp0.acos());
        let t = mod2pi(-self.alpha - phi + p / 2.0);
        Some([t, p, mod2pi(self.beta - self.alpha - t + mod2pi(p))])
    }
}

/// Shortest curvature-constrained connection between two poses
#[derive(Debug, Clone, PartialEq)]
pub struct DubinsPath {
    start: Pose2D,
    goal: Pose2D,
    rho: f64,
    /// Segment lengths divided by the turning radius
    params: [f64; 3],
    path_type: DubinsPathType,
}

impl DubinsPath {
    /// Evaluate every word and keep the shortest
    pub fn shortest(start: &Pose2D, goal: &Pose2D, turning_radius: f64) -> PlannerResult<Self> {
        if !(turning_radius > 0.0) || !turning_radius.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "turning radius must be positive, got {}",
                turning_radius
            )));
        }
        start.ensure_finite("start")?;
        goal.ensure_finite("goal")?;

        let mut path = DubinsPath {
            start: *start,
            goal: *goal,
            rho: turning_radius,
            params: [0.0; 3],
            path_type: DubinsPathType::LSL,
        };

        let heading_gap = mod2pi(goal.yaw - start.yaw);
        if start.distance(goal) <= COINCIDENT_EPS
            && (heading_gap <= COINCIDENT_EPS || TAU - heading_gap <= COINCIDENT_EPS)
        {
            return Ok(path);
        }

        let intermediate = Intermediate::new(start, goal, turning_radius);
        let mut best: Option<([f64; 3], DubinsPathType)> = None;
        let mut best_sum = f64::INFINITY;

        for path_type in DubinsPathType::ALL.iter().copied() {
            if let Some(params) = intermediate.word(path_type) {
                let sum: f64 = params.iter().sum();
                if sum < best_sum {
                    best_sum = sum;
                    best = Some((params, path_type));
                }
            }
        }

        let (params, path_type) = best.ok_or_else(|| {
            PlannerError::NumericalError(format!(
                "no Dubins word connects ({}, {}, {}) to ({}, {}, {})",
                start.x, start.y, start.yaw, goal.x, goal.y, goal.yaw
            ))
        })?;
        path.params = params;
        path.path_type = path_type;
        Ok(path)
    }

    pub fn start(&self) -> Pose2D {
        self.start
    }

    pub fn goal(&self) -> Pose2D {
        self.goal
    }

    pub fn turning_radius(&self) -> f64 {
        self.rho
    }

    pub fn path_type(&self) -> DubinsPathType {
        self.path_type
    }

    pub fn segment_types(&self) -> [SegmentType; 3] {
        self.path_type.segment_types()
    }

    /// Total arc plus line length
    pub fn length(&self) -> f64 {
        (self.params[0] + self.params[1] + self.params[2]) * self.rho
    }

    /// Length of each of the three segments
    pub fn segment_lengths(&self) -> [f64; 3] {
        self.params.map(|p| p * self.rho)
    }

    /// Pose after driving `distance` along the path, clamped to its ends
    pub fn pose_at(&self, distance: f64) -> Pose2D {
        let tprime = distance.max(0.0).min(self.length()) / self.rho;
        let types = self.path_type.segment_types();
        let qi = Pose2D::new(0.0, 0.0, self.start.yaw);

        let q = if tprime < self.params[0] {
            segment(tprime, &qi, types[0])
        } else {
            let q1 = segment(self.params[0], &qi, types[0]);
            if tprime < self.params[0] + self.params[1] {
                segment(tprime - self.params[0], &q1, types[1])
            } else {
                let q2 = segment(self.params[1], &q1, types[1]);
                segment(tprime - self.params[0] - self.params[1], &q2, types[2])
            }
        };

        Pose2D::new(
            q.x * self.rho + self.start.x,
            q.y * self.rho + self.start.y,
            mod2pi(q.yaw),
        )
    }

    /// Poses every `step` of arc length, always starting at the start pose and
    /// ending at the goal pose
    pub fn sample(&self, step: f64) -> PlannerResult<PathSamples<'_>> {
        if !(step > 0.0) || !step.is_finite() {
            return Err(PlannerError::InvalidParameter(format!(
                "sampling step must be positive, got {}",
                step
            )));
        }
        let ratio = (self.length() / step).ceil();
        let count = if ratio.is_finite() && ratio <= usize::MAX as f64 - 1.0 {
            (ratio as usize).max(1).checked_add(1)
        } else {
            None
        }
        .ok_or_else(|| {
            PlannerError::InvalidParameter(format!(
                "sampling step {} too small for path length {}",
                step,
                self.length()
            ))
        })?;
        Ok(PathSamples {
            path: self,
            step,
            next: 0,
            count,
        })
    }
}

/// Advance a unit-radius segment of normalized length `t` from `qi`
fn segment(t: f64, qi: &Pose2D, segment_type: SegmentType) -> Pose2D {
    let (st, ct) = qi.yaw.sin_cos();
    match segment_type {
        SegmentType::Left => Pose2D::new(
            qi.x + (qi.yaw + t).sin() - st,
            qi.y - (qi.yaw + t).cos() + ct,
            qi.yaw + t,
        ),
        SegmentType::Right => Pose2D::new(
            qi.x - (qi.yaw - t).sin() + st,
            qi.y + (qi.yaw - t).cos() - ct,
            qi.yaw - t,
        ),
        SegmentType::Straight => Pose2D::new(qi.x + ct * t, qi.y + st * t, qi.yaw),
    }
}

/// Lazy pose sequence along a [`DubinsPath`]
#[derive(Debug, Clone)]
pub struct PathSamples<'a> {
    path: &'a DubinsPath,
    step: f64,
    next: usize,
    count: usize,
}

impl Iterator for PathSamples<'_> {
    type Item = Pose2D;

    fn next(&mut self) -> Option<Pose2D> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;

        let pose = if i + 1 == self.count {
            self.path.goal
        } else if i == 0 {
            self.path.start
        } else {
            self.path.pose_at(i as f64 * self.step)
        };
        Some(pose)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PathSamples<'_> {}

/// Sample `path` every `step` of arc length
pub fn sample_path(path: &DubinsPath, step: f64) -> PlannerResult<PathSamples<'_>> {
    path.sample(step)
}

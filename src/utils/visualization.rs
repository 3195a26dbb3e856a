//! Visualization utilities for prm_car
//!
//! Collects plot series for the scene (obstacles, roadmap, route) and renders
//! them onto a single gnuplot axes.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{AreaBounds, PlannerError, PlannerResult, Point2D, Pose2D, Visualizable};
use crate::geometry::{Obstacles, OrientedRect};
use crate::path_planning::prm::{PlannedRoute, Roadmap};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00A000";
    pub const BLUE: &str = "#0000FF";
    pub const GRAY: &str = "#808080";
    pub const ORANGE: &str = "#FFA500";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const ROADMAP: &str = GRAY;
    pub const START: &str = GREEN;
    pub const GOAL: &str = BLUE;
    pub const PATH: &str = RED;
    pub const VEHICLE: &str = ORANGE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::PATH.to_string(),
            line_width: 2.0,
            caption: "Path".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

#[derive(Debug, Clone)]
enum Series {
    Lines {
        x: Vec<f64>,
        y: Vec<f64>,
        color: String,
        width: f64,
        caption: Option<String>,
    },
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        style: PointStyle,
    },
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    series: Vec<Series>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            series: Vec::new(),
            title: String::new(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Fix both axes to the sampling area
    pub fn set_bounds(&mut self, bounds: &AreaBounds) -> &mut Self {
        self.set_x_range(bounds.xmin, bounds.xmax);
        self.set_y_range(bounds.ymin, bounds.ymax)
    }

    /// Number of series queued for rendering
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Plot a path from x,y vectors
    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.series.push(Series::Lines {
            x: x.to_vec(),
            y: y.to_vec(),
            color: style.color.clone(),
            width: style.line_width,
            caption: Some(style.caption.clone()),
        });
        self
    }

    /// Plot the positions of a pose sequence as a polyline
    pub fn plot_poses(&mut self, poses: &[Pose2D], style: &PathStyle) -> &mut Self {
        let x: Vec<f64> = poses.iter().map(|p| p.x).collect();
        let y: Vec<f64> = poses.iter().map(|p| p.y).collect();
        self.plot_path_xy(&x, &y, style)
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        self.series.push(Series::Points {
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.y).collect(),
            style: style.clone(),
        });
        self
    }

    /// Plot the closed outline of a rectangle
    pub fn plot_rect(&mut self, rect: &OrientedRect, color: &str, caption: Option<&str>) -> &mut Self {
        let (x, y) = rect_outline(rect);
        self.series.push(Series::Lines {
            x,
            y,
            color: color.to_string(),
            width: 1.5,
            caption: caption.map(str::to_string),
        });
        self
    }

    pub fn plot_obstacles(&mut self, obstacles: &Obstacles) -> &mut Self {
        for (i, rect) in obstacles.iter().enumerate() {
            let caption = if i == 0 { Some("Obstacles") } else { None };
            self.plot_rect(rect, colors::OBSTACLE, caption);
        }
        self
    }

    /// Roadmap node positions with a short heading tick each
    pub fn plot_roadmap(&mut self, roadmap: &Roadmap) -> &mut Self {
        let positions: Vec<Point2D> = roadmap.nodes().iter().map(|n| n.pose.position()).collect();
        self.plot_points(&positions, &PointStyle::new(colors::ROADMAP, "Roadmap").with_size(0.6));

        let tick = roadmap.footprint().width * 0.4;
        for node in roadmap.nodes() {
            let p = node.pose;
            self.series.push(Series::Lines {
                x: vec![p.x, p.x + tick * p.yaw.cos()],
                y: vec![p.y, p.y + tick * p.yaw.sin()],
                color: colors::ROADMAP.to_string(),
                width: 1.0,
                caption: None,
            });
        }
        self
    }

    /// Route polyline sampled every `step`, with the car drawn at each node
    pub fn plot_route(&mut self, route: &PlannedRoute, step: f64) -> PlannerResult<&mut Self> {
        let poses = route.poses(step)?;
        self.plot_poses(&poses, &PathStyle::default());
        for node in &route.nodes {
            self.plot_rect(&node.rect(), colors::VEHICLE, None);
        }
        Ok(self)
    }

    pub fn plot_start(&mut self, pose: &Pose2D) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_goal(&mut self, pose: &Pose2D) -> &mut Self {
        self.plot_points(&[pose.position()], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> PlannerResult<()> {
        self.render();
        self.figure
            .save_to_svg(path, 800, 800)
            .map_err(|e| PlannerError::VisualizationError(e.to_string()))
    }

    fn render(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();

        for series in &self.series {
            match series {
                Series::Lines {
                    x,
                    y,
                    color,
                    width,
                    caption: Some(caption),
                } => {
                    axes.lines(x, y, &[Caption(caption.as_str()), Color(color.as_str()), LineWidth(*width)]);
                }
                Series::Lines {
                    x,
                    y,
                    color,
                    width,
                    caption: None,
                } => {
                    axes.lines(x, y, &[Color(color.as_str()), LineWidth(*width)]);
                }
                Series::Points { x, y, style } => {
                    axes.points(
                        x,
                        y,
                        &[
                            Caption(style.caption.as_str()),
                            Color(style.color.as_str()),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ],
                    );
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Corner polyline of `rect`, closed back onto the first corner
fn rect_outline(rect: &OrientedRect) -> (Vec<f64>, Vec<f64>) {
    let corners = rect.corners();
    corners
        .iter()
        .chain(corners.iter().take(1))
        .map(|c| (c.x, c.y))
        .unzip()
}

impl Visualizable for Obstacles {
    fn visualize(&self, vis: &mut Visualizer) {
        vis.plot_obstacles(self);
    }
}

impl Visualizable for Roadmap {
    fn visualize(&self, vis: &mut Visualizer) {
        vis.plot_roadmap(self);
    }
}

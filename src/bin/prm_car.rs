// Car-like PRM demo
//
// Scatters square obstacles over the field, builds a roadmap of feasible car
// poses and plans between two of them.
//
// usage: prm_car [config.toml]

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::filter::Directive;

use prm_car::config::{PlannerConfig, SceneConfig};
use prm_car::geometry::{Obstacles, OrientedRect};
use prm_car::path_planning::prm::{build_roadmap, find_path, SearchResult};
use prm_car::utils::Visualizer;
use prm_car::{AreaBounds, PlannerError, PlannerResult, Point2D};

fn random_obstacles<R: Rng>(scene: &SceneConfig, bounds: &AreaBounds, rng: &mut R) -> Obstacles {
    (0..scene.obstacle_count)
        .map(|_| {
            let center = Point2D::new(
                rng.gen_range(bounds.xmin..bounds.xmax),
                rng.gen_range(bounds.ymin..bounds.ymax),
            );
            OrientedRect::axis_aligned(center, scene.obstacle_width, scene.obstacle_height)
        })
        .collect()
}

fn main() -> PlannerResult<()> {
    let directive = "prm_car=info"
        .parse::<Directive>()
        .map_err(|e| PlannerError::ConfigError(format!("bad log directive: {}", e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            info!("loading configuration from {}", path);
            PlannerConfig::load(Path::new(path))?
        }
        None => PlannerConfig::default(),
    };
    config.validate()?;

    let seed = config.scene.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let bounds = config.roadmap.bounds;
    let obstacles = random_obstacles(&config.scene, &bounds, &mut rng);
    let roadmap = build_roadmap(&config.roadmap, config.vehicle, &obstacles, &mut rng)?;
    info!(
        "roadmap: {} nodes, {} obstacles",
        roadmap.len(),
        obstacles.len()
    );

    let endpoints: Vec<_> = roadmap.nodes().choose_multiple(&mut rng, 2).copied().collect();
    if endpoints.len() < 2 {
        warn!("need at least two roadmap nodes to plan, got {}", endpoints.len());
        return Ok(());
    }
    let (start, goal) = (endpoints[0].pose, endpoints[1].pose);
    info!(
        "planning from ({:.1}, {:.1}, {:.2}) to ({:.1}, {:.1}, {:.2})",
        start.x, start.y, start.yaw, goal.x, goal.y, goal.yaw
    );

    let result = find_path(&roadmap, &obstacles, start, goal, &config.search)?;

    let mut vis = Visualizer::new();
    vis.set_title("Car PRM").set_bounds(&bounds);
    vis.plot_obstacles(&obstacles);
    vis.plot_roadmap(&roadmap);
    vis.plot_rect(&endpoints[0].rect(), prm_car::utils::colors::START, None);
    vis.plot_rect(&endpoints[1].rect(), prm_car::utils::colors::GOAL, None);

    match &result {
        SearchResult::Found(route) => {
            info!(
                "route: {} hops, length {:.2}",
                route.segments.len(),
                route.cost
            );
            vis.plot_route(route, config.render_step)?;
        }
        SearchResult::NoPath(reason) => warn!("no path found: {:?}", reason),
    }
    vis.plot_start(&start);
    vis.plot_goal(&goal);

    if let Some(dir) = Path::new(&config.output_path).parent() {
        std::fs::create_dir_all(dir)?;
    }
    vis.save_svg(&config.output_path)?;
    info!("plot saved to {}", config.output_path);
    Ok(())
}

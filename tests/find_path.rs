use std::path::PathBuf;

use clearpath::grid::{line_is_clear, Heuristic, PathFailure, SearchConfig, Shortcut};
use clearpath::{LatticePoint, MapDescription, MapError, Point2, Segment, Terrain, TerrainError};

fn map_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos/maps")
        .join(name)
}

fn polyline_length(points: &[Point2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[test]
fn path_through_gap_is_smoothed() {
    env_logger::try_init().ok();

    let terrain = Terrain::load(map_path("gap.map")).unwrap();
    let result = terrain
        .find_path(Point2::new(1.5, 1.5), Point2::new(8.5, 1.5), 0.4)
        .unwrap();

    assert_eq!(result.cells.first(), Some(&LatticePoint::new(1, 1)));
    assert_eq!(result.cells.last(), Some(&LatticePoint::new(8, 1)));
    assert!(result.cells.contains(&LatticePoint::new(5, 8)));
    for step in result.cells.windows(2) {
        assert!((step[0].x - step[1].x).abs() <= 1 && (step[0].y - step[1].y).abs() <= 1);
    }

    assert_eq!(result.raw_path.first(), Some(&Point2::new(1.5, 1.5)));
    assert_eq!(result.smoothed_path.last(), Some(&Point2::new(8.5, 1.5)));
    assert!(result.smoothed_cells.len() < result.cells.len());
    assert!(polyline_length(&result.smoothed_path) < polyline_length(&result.raw_path));

    let grid = terrain.path_finder().as_regular_grid().unwrap();
    for leg in result.smoothed_cells.windows(2) {
        assert!(line_is_clear(grid, leg[0], leg[1], 0.4));
    }
}

#[test]
fn wide_agent_cannot_use_gap() {
    env_logger::try_init().ok();

    let terrain = Terrain::load(map_path("gap.map")).unwrap();
    assert!(matches!(
        terrain.find_path(Point2::new(2.5, 2.5), Point2::new(7.5, 2.5), 1.5),
        Err(PathFailure::NoPath { .. })
    ));
    assert_eq!(
        terrain
            .find_path(Point2::new(1.5, 1.5), Point2::new(8.5, 1.5), 1.5)
            .unwrap_err(),
        PathFailure::SourceBlocked(LatticePoint::new(1, 1))
    );
}

#[test]
fn added_wall_closes_gap_and_removal_reopens_it() {
    env_logger::try_init().ok();

    let map = MapDescription::read(map_path("gap.map")).unwrap();
    let mut terrain = Terrain::build(&map).unwrap();
    let (source, sink) = (Point2::new(1.5, 1.5), Point2::new(8.5, 1.5));

    terrain.add_wall(Segment::from_coords(5.0, 7.0, 5.0, 9.0));
    assert!(matches!(
        terrain.find_path(source, sink, 0.4),
        Err(PathFailure::NoPath { .. })
    ));

    assert!(terrain.remove_wall(1).is_some());
    assert_eq!(terrain.walls(), &map.walls[..]);
    assert!(terrain.find_path(source, sink, 0.4).is_ok());
}

#[test]
fn rooms_with_every_configuration() {
    env_logger::try_init().ok();

    let terrain = Terrain::load(map_path("rooms.map")).unwrap();
    let (source, sink) = (Point2::new(3.0, 3.0), Point2::new(27.0, 17.0));
    let grid = terrain.path_finder().as_regular_grid().unwrap();

    let mut costs = vec![];
    for heuristic in [Heuristic::Octile, Heuristic::Euclidean] {
        for shortcut in [Shortcut::Furthest, Shortcut::FirstBlocked] {
            let config = SearchConfig::default()
                .with_heuristic(heuristic)
                .with_shortcut(shortcut);
            let result = terrain.find_path_with(&config, source, sink, 1.0).unwrap();
            for &cell in &result.cells {
                assert!(grid.is_passable(cell, 1.0), "{cell}");
            }
            for leg in result.smoothed_cells.windows(2) {
                assert!(line_is_clear(grid, leg[0], leg[1], 1.0));
            }
            costs.push(result.cost);
        }
    }
    for cost in &costs {
        assert!((cost - costs[0]).abs() < 1e-9);
    }
}

#[test]
fn load_reports_map_errors() {
    assert!(matches!(
        Terrain::load(map_path("missing.map")),
        Err(TerrainError::Map(MapError::Io(_)))
    ));

    let map = MapDescription::parse("type regular_grid\nresolution 4 4\ndimensions 0 4").unwrap();
    assert!(Terrain::build(&map).is_err());
}

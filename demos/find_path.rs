use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clearpath::grid::{Heuristic, RegularGrid, SearchConfig, Shortcut};
use clearpath::{LatticePoint, Point2, Terrain};

#[derive(Copy, Clone, ValueEnum)]
enum HeuristicArg {
    Octile,
    Euclidean,
}

#[derive(Copy, Clone, ValueEnum)]
enum ShortcutArg {
    Furthest,
    FirstBlocked,
}

#[derive(Parser)]
struct Options {
    map: PathBuf,
    source_x: f32,
    source_y: f32,
    sink_x: f32,
    sink_y: f32,
    /// Agent radius in world units.
    #[arg(short, long, default_value_t = 0.5)]
    radius: f32,
    #[arg(long, value_enum, default_value = "octile")]
    heuristic: HeuristicArg,
    #[arg(long, value_enum, default_value = "furthest")]
    shortcut: ShortcutArg,
    #[arg(long)]
    max_expansions: Option<usize>,
    /// Don't print the map.
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let opt = Options::parse();

    let terrain = Terrain::load(&opt.map).unwrap();

    let mut config = SearchConfig::default()
        .with_heuristic(match opt.heuristic {
            HeuristicArg::Octile => Heuristic::Octile,
            HeuristicArg::Euclidean => Heuristic::Euclidean,
        })
        .with_shortcut(match opt.shortcut {
            ShortcutArg::Furthest => Shortcut::Furthest,
            ShortcutArg::FirstBlocked => Shortcut::FirstBlocked,
        });
    if let Some(limit) = opt.max_expansions {
        config = config.with_max_expansions(limit);
    }

    let source = Point2::new(opt.source_x, opt.source_y);
    let sink = Point2::new(opt.sink_x, opt.sink_y);

    let t1 = std::time::Instant::now();
    let result = terrain.find_path_with(&config, source, sink, opt.radius);
    let t2 = std::time::Instant::now();

    let result = match result {
        Ok(result) => result,
        Err(failure) => {
            println!("no path: {failure}");
            println!("{:<.3}s", (t2 - t1).as_secs_f64());
            std::process::exit(1);
        }
    };

    if !opt.quiet {
        if let Some(grid) = terrain.path_finder().as_regular_grid() {
            print_grid(grid, opt.radius, &result.cells, &result.smoothed_cells);
        }
    }

    println!(
        "{} cells, cost {:.3}, {} expanded",
        result.cells.len(),
        result.cost,
        result.expanded
    );
    let waypoints: Vec<_> = result.smoothed_path.iter().map(|p| p.to_string()).collect();
    println!("{}", waypoints.join(" -> "));
    println!("{:<.3}s", (t2 - t1).as_secs_f64());
}

fn print_grid(grid: &RegularGrid, radius: f32, path: &[LatticePoint], waypoints: &[LatticePoint]) {
    for y in 0..grid.res_y() {
        let row: String = (0..grid.res_x())
            .map(|x| {
                let cell = LatticePoint::new(x, y);
                if waypoints.contains(&cell) {
                    '*'
                } else if path.contains(&cell) {
                    'o'
                } else {
                    match grid.cells()[cell] {
                        d if d == 0.0 => '#',
                        d if d < radius => ':',
                        _ => '.',
                    }
                }
            })
            .collect();
        println!("{row}");
    }
}

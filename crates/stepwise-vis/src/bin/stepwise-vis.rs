//! Stepwise Visualization Server
//!
//! Record one algorithm run and serve its playback.
//!
//! Usage: `stepwise-vis <algorithm> [port] [config.json]`

use std::env;
use std::error::Error;

use stepwise_runners::sorting::SortAlgorithm;
use stepwise_runners::traversal::Strategy;
use stepwise_runners::{MazeInput, MstAlgorithm, SampleGraph, SudokuInput};
use stepwise_vis::{
    AStar, Comparison, Mst, PlaybackConfig, Race, Sorting, Sudoku, Traversal, VisServer, Visualizer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const ALGORITHMS: &str =
    "astar, bfs, dfs, compare, prim, kruskal, bubble, insertion, merge, quick, race, sudoku";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();

    let Some(algorithm) = args.get(1) else {
        eprintln!("usage: stepwise-vis <algorithm> [port] [config.json]");
        eprintln!("algorithms: {}", ALGORITHMS);
        return Err("missing algorithm".into());
    };

    let mut config = match args.get(3) {
        Some(path) => PlaybackConfig::load(path)?,
        None => PlaybackConfig::default(),
    };
    if let Some(port) = args.get(2) {
        config.port = port.parse()?;
    }

    println!("Stepwise Visualizer");
    println!("===================");
    println!();

    match algorithm.as_str() {
        "astar" => serve(AStar, MazeInput::preset()?, config).await,
        "bfs" | "dfs" => {
            let strategy = if algorithm == "bfs" { Strategy::Bfs } else { Strategy::Dfs };
            serve(Traversal { strategy }, SampleGraph::Complex.input()?, config).await
        }
        "compare" => serve(Comparison, SampleGraph::Complex.input()?, config).await,
        "prim" | "kruskal" => {
            let algorithm = if algorithm == "prim" {
                MstAlgorithm::Prim
            } else {
                MstAlgorithm::Kruskal
            };
            let input = config.graph_config().generate()?;
            serve(Mst { algorithm }, input, config).await
        }
        "race" => {
            let input = config.array_config().generate()?;
            serve(Race, input, config).await
        }
        "sudoku" => serve(Sudoku, SudokuInput::classic(), config).await,
        other => match other.parse::<SortAlgorithm>() {
            Ok(algorithm) => {
                let input = config.array_config().generate()?;
                serve(Sorting { algorithm }, input, config).await
            }
            Err(_) => Err(format!("unknown algorithm `{}` (expected one of: {})", other, ALGORITHMS).into()),
        },
    }
}

async fn serve<V: Visualizer>(visualizer: V, input: V::Input, config: PlaybackConfig) -> Result<(), Box<dyn Error>> {
    let events = visualizer.record(&input).len();
    println!("Algorithm: {}", visualizer.name());
    println!("  Events: {}", events);
    println!("  Speed: {}", config.speed.get());
    println!();
    println!("Starting visualization server on http://localhost:{}", config.port);
    println!("POST /api/playback/play to start playback.");
    println!();

    info!(algorithm = visualizer.name(), events, "run recorded");
    let server = VisServer::new(visualizer, input, &config);
    server.serve(config.port).await?;

    Ok(())
}

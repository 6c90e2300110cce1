//! Benchmarks for Stepwise runners
//!
//! Measures recording cost of:
//! - A* on open and walled grids
//! - BFS/DFS on the sample graphs
//! - Prim and Kruskal on random graphs
//! - The four sorts at several array sizes
//! - Sudoku backtracking on the classic puzzle

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stepwise_runners::sorting::RandomArrayConfig;
use stepwise_runners::{
    astar, bfs, dfs, kruskal, prim, solve, sort, MazeInput, RandomGraphConfig, SampleGraph,
    SortAlgorithm, SudokuInput,
};
use stepwise_topology::{Grid, GridCoord};

/// Benchmark A* on square grids of growing size
fn bench_astar(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar");

    for &side in &[10usize, 20, 40, 80] {
        let grid = Grid::new(side, side).unwrap();
        let input = MazeInput::new(grid, GridCoord::ORIGIN, GridCoord::new(side - 1, side - 1)).unwrap();
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("open", side), &input, |b, input| {
            b.iter(|| astar(black_box(input)))
        });
    }

    // Serpentine walls force the search through every row.
    for &side in &[10usize, 20, 40] {
        let walls = (1..side).step_by(2).flat_map(|row| {
            let gap = if (row / 2) % 2 == 0 { side - 1 } else { 0 };
            (0..side).filter(move |&col| col != gap).map(move |col| GridCoord::new(row, col))
        });
        let grid = Grid::with_walls(side, side, walls).unwrap();
        let goal = GridCoord::new(side - 1, side - 1);
        let Ok(input) = MazeInput::new(grid, GridCoord::ORIGIN, goal) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::new("serpentine", side), &input, |b, input| {
            b.iter(|| astar(black_box(input)))
        });
    }
    group.finish();
}

/// Benchmark BFS and DFS on each sample graph
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for sample in SampleGraph::ALL {
        let input = sample.input().unwrap();
        group.bench_with_input(BenchmarkId::new("bfs", sample.name()), &input, |b, input| {
            b.iter(|| bfs(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("dfs", sample.name()), &input, |b, input| {
            b.iter(|| dfs(black_box(input)))
        });
    }
    group.finish();
}

/// Benchmark both MST runners on random graphs
fn bench_mst(c: &mut Criterion) {
    let mut group = c.benchmark_group("mst");

    for &vertex_count in &[8usize, 32, 128] {
        let input = RandomGraphConfig {
            vertex_count,
            seed: 42,
            ..Default::default()
        }
        .generate()
        .unwrap();
        group.throughput(Throughput::Elements(input.graph().edges().len() as u64));
        group.bench_with_input(BenchmarkId::new("prim", vertex_count), &input, |b, input| {
            b.iter(|| prim(black_box(input)))
        });
        group.bench_with_input(BenchmarkId::new("kruskal", vertex_count), &input, |b, input| {
            b.iter(|| kruskal(black_box(input)))
        });
    }
    group.finish();
}

/// Benchmark every sort at several sizes
fn bench_sorting(c: &mut Criterion) {
    let mut group = c.benchmark_group("sorting");

    for &size in &[20usize, 100, 500] {
        let input = RandomArrayConfig {
            size,
            seed: 7,
            ..Default::default()
        }
        .generate()
        .unwrap();
        group.throughput(Throughput::Elements(size as u64));
        for algorithm in SortAlgorithm::ALL {
            group.bench_with_input(BenchmarkId::new(algorithm.name(), size), &input, |b, input| {
                b.iter(|| sort(algorithm, black_box(input)))
            });
        }
    }
    group.finish();
}

/// Benchmark the backtracking solver
fn bench_sudoku(c: &mut Criterion) {
    let input = SudokuInput::classic();
    c.bench_function("sudoku_classic", |b| b.iter(|| solve(black_box(&input))));
}

criterion_group!(
    benches,
    bench_astar,
    bench_traversal,
    bench_mst,
    bench_sorting,
    bench_sudoku,
);

criterion_main!(benches);

use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use indicatif::ProgressBar;
use minikd::{
    KdTree, StackCache, brute_force_intersect,
    geometry::{FloatType, Ray, WorldBox, WorldPoint, WorldTriangle, WorldVector},
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Builds a kd-tree over a random triangle soup and checks it against brute force
/// intersection on a grid of rays.
#[derive(Parser)]
#[command(name = "minikd-cli", long_about = None)]
struct Cli {
    /// Number of random triangles
    #[arg(short = 'n', long, default_value_t = 10_000)]
    triangles: usize,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Horizontal ray count
    #[arg(long, default_value_t = 256)]
    width: usize,

    /// Vertical ray count
    #[arg(long, default_value_t = 256)]
    height: usize,

    /// Print the whole tree
    #[arg(long)]
    print_tree: bool,
}

const SCENE_EXTENT: FloatType = 10.0;
const TRIANGLE_SIZE: FloatType = 1.0;
const EYE_DISTANCE: FloatType = 30.0;

fn random_soup(count: usize, seed: u64) -> Vec<WorldTriangle> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let center_range = -(SCENE_EXTENT - TRIANGLE_SIZE)..(SCENE_EXTENT - TRIANGLE_SIZE);

    (0..count)
        .map(|_| {
            let center = WorldPoint::new(
                rng.random_range(center_range.clone()),
                rng.random_range(center_range.clone()),
                rng.random_range(center_range.clone()),
            );
            let mut vertex = || {
                center
                    + WorldVector::new(
                        rng.random_range(-TRIANGLE_SIZE..TRIANGLE_SIZE),
                        rng.random_range(-TRIANGLE_SIZE..TRIANGLE_SIZE),
                        rng.random_range(-TRIANGLE_SIZE..TRIANGLE_SIZE),
                    )
            };
            WorldTriangle::new(vertex(), vertex(), vertex())
        })
        .collect()
}

/// Ray through the center of pixel (x, y) of a pinhole looking down the z axis.
/// The image plane covers the scene extent at z = 0.
fn pixel_ray(x: usize, y: usize, width: usize, height: usize) -> Ray {
    let sx = ((x as FloatType + 0.5) / width as FloatType * 2.0 - 1.0) * SCENE_EXTENT;
    let sy = (1.0 - (y as FloatType + 0.5) / height as FloatType * 2.0) * SCENE_EXTENT;
    Ray::new(
        WorldPoint::new(0.0, 0.0, EYE_DISTANCE),
        WorldVector::new(sx, sy, -EYE_DISTANCE),
    )
}

#[derive(Copy, Clone, Default)]
struct PixelResult {
    tree: Option<FloatType>,
    brute_force: Option<FloatType>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.width == 0 || cli.height == 0 {
        bail!("Image size must be nonzero");
    }

    let triangles = random_soup(cli.triangles, cli.seed);
    let bounds = WorldBox::new(
        WorldPoint::new(-SCENE_EXTENT, -SCENE_EXTENT, -SCENE_EXTENT),
        WorldPoint::new(SCENE_EXTENT, SCENE_EXTENT, SCENE_EXTENT),
    );

    let start = Instant::now();
    let tree = KdTree::build(&triangles, bounds)?;
    println!("Built tree over {} triangles in {:?}", triangles.len(), start.elapsed());
    tree.print_statistics();
    if cli.print_tree {
        tree.print_tree();
    }

    let mut results = vec![PixelResult::default(); cli.width * cli.height];
    let rows_per_thread = cli.height.div_ceil(num_cpus::get());
    let bar = ProgressBar::new(cli.height as u64);

    let start = Instant::now();
    std::thread::scope(|s| {
        for (chunk_index, chunk) in results.chunks_mut(rows_per_thread * cli.width).enumerate() {
            let tree = &tree;
            let triangles = &triangles;
            let bar = bar.clone();
            s.spawn(move || {
                let mut stack = StackCache::default();
                for (row_offset, row) in chunk.chunks_mut(cli.width).enumerate() {
                    let y = chunk_index * rows_per_thread + row_offset;
                    for (x, pixel) in row.iter_mut().enumerate() {
                        let ray = pixel_ray(x, y, cli.width, cli.height);
                        *pixel = PixelResult {
                            tree: tree
                                .intersect_with_stack(&ray, &mut stack)
                                .map(|hit| hit.distance),
                            brute_force: brute_force_intersect(triangles, &ray)
                                .map(|hit| hit.distance),
                        };
                    }
                    bar.inc(1);
                }
            });
        }
    });
    bar.finish();
    println!("Traced {} rays twice in {:?}", results.len(), start.elapsed());

    let hits = results.iter().filter(|r| r.brute_force.is_some()).count();
    let mismatches: Vec<_> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.tree != r.brute_force)
        .collect();
    println!("{} hits", hits);

    if let Some((index, first)) = mismatches.first() {
        bail!(
            "{} pixels differ, first at ({}, {}): tree {:?}, brute force {:?}",
            mismatches.len(),
            index % cli.width,
            index / cli.width,
            first.tree,
            first.brute_force
        );
    }

    println!("Tree matches brute force");
    Ok(())
}

pub mod geometry;
pub mod kd_tree;
mod util;

pub use kd_tree::{BuildError, BuildSettings, Hit, KdTree, StackCache, TreeStatistics, brute_force_intersect};
pub use util::Stats;

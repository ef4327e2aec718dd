use std::fmt::Display;

use crate::util::Stats;

use super::{KdTree, Node, NodeIdx};

/// Shape summary of a built tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeStatistics {
    pub node_count: usize,
    pub leaf_count: usize,
    /// Number of triangles stored in leaves, counting duplicates.
    pub triangle_references: usize,
    /// Depth of leaves, the root is at depth 0.
    pub leaf_depth: Stats,
    pub leaf_size: Stats,
}

impl Display for TreeStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes: {}", self.node_count)?;
        writeln!(f, "Leaves: {}", self.leaf_count)?;
        writeln!(f, "Triangle references: {}", self.triangle_references)?;
        writeln!(f, "Leaf depth: {}", self.leaf_depth)?;
        write!(f, "Leaf size: {}", self.leaf_size)
    }
}

impl KdTree {
    pub fn statistics(&self) -> TreeStatistics {
        let mut leaf_depth = Stats::default();
        let mut leaf_size = Stats::default();

        let mut stack: Vec<(NodeIdx, usize)> = self.root.map(|root| (root, 0)).into_iter().collect();
        while let Some((index, depth)) = stack.pop() {
            match &self.nodes[index] {
                Node::Inner { children, .. } => {
                    stack.extend(children.iter().flatten().map(|child| (*child, depth + 1)));
                }
                Node::Leaf { triangles, .. } => {
                    leaf_depth.add_sample(depth);
                    leaf_size.add_sample(triangles.len());
                }
            }
        }

        TreeStatistics {
            node_count: self.nodes.len(),
            leaf_count: leaf_size.count,
            triangle_references: self.triangles.len(),
            leaf_depth,
            leaf_size,
        }
    }

    pub fn print_statistics(&self) {
        println!("{}", self.statistics());
    }

    pub fn print_tree(&self) {
        match self.root {
            Some(root) => self.print_recursive(0, root),
            None => println!("<EMPTY>"),
        }
    }

    fn print_recursive(&self, indent: usize, index: NodeIdx) {
        let prefix = "  ".repeat(indent);
        match &self.nodes[index] {
            Node::Inner {
                bounds,
                plane,
                children,
            } => {
                println!(
                    "{}- I{}: {:?}-{:?} split {} = {}",
                    prefix,
                    index.index(),
                    bounds.min,
                    bounds.max,
                    plane.axis,
                    plane.position
                );
                for child in children {
                    match child {
                        Some(child) => self.print_recursive(indent + 1, *child),
                        None => println!("{}  - <EMPTY>", prefix),
                    }
                }
            }
            Node::Leaf { bounds, triangles } => {
                println!(
                    "{}- L{}: {:?}-{:?}",
                    prefix,
                    index.index(),
                    bounds.min,
                    bounds.max
                );
                for triangle in self.leaf_triangles(*triangles) {
                    println!(
                        "{}    {:?}, {:?}, {:?}",
                        prefix, triangle[0], triangle[1], triangle[2]
                    );
                }
            }
        }
    }
}

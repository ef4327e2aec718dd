use assert2::debug_assert;

use crate::geometry::{
    BarycentricCoordinates, FloatType, Ray, RayIntersectionExt as _, WorldPoint, WorldTriangle,
    WorldVector,
};

use super::{KdTree, Node, NodeIdx};

/// Nearest intersection of a ray with the triangle soup.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit<'a> {
    pub triangle: &'a WorldTriangle,
    /// Distance along the (normalized) ray direction, always positive.
    pub distance: FloatType,
    pub uv: BarycentricCoordinates<FloatType>,
    pub point: WorldPoint,
}

impl Hit<'_> {
    /// Unit geometric normal of the hit triangle, facing the side given by vertex winding.
    pub fn normal(&self) -> WorldVector {
        self.triangle.unit_normal()
    }
}

/// Reusable traversal stack, allows repeated queries without allocating.
/// Every thread needs its own.
#[derive(Clone, Debug, Default)]
pub struct StackCache {
    stack: Vec<NodeIdx>,
}

impl KdTree {
    /// Finds the closest triangle hit by the ray, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.intersect_with_stack(ray, &mut StackCache::default())
    }

    pub fn intersect_with_stack(&self, ray: &Ray, stack: &mut StackCache) -> Option<Hit<'_>> {
        debug_assert!(stack.stack.is_empty());
        stack.stack.extend(self.root);

        let mut best: Option<Hit> = None;

        while let Some(index) = stack.stack.pop() {
            let node = &self.nodes[index];
            if !node.bounds().is_hit_by(ray) {
                continue;
            }

            match node {
                Node::Inner { children, .. } => {
                    // Lower child goes last to get popped first
                    stack.stack.extend(children.iter().rev().flatten());
                }
                Node::Leaf { triangles, .. } => {
                    if let Some(hit) = brute_force_intersect(self.leaf_triangles(*triangles), ray)
                    {
                        if best.as_ref().is_none_or(|best| hit.distance < best.distance) {
                            best = Some(hit);
                        }
                    }
                }
            }
        }

        best
    }
}

/// Tests the ray against every triangle in the slice and returns the closest hit.
/// On equal distances the earlier triangle wins.
pub fn brute_force_intersect<'a>(triangles: &'a [WorldTriangle], ray: &Ray) -> Option<Hit<'a>> {
    let mut best: Option<Hit> = None;

    for triangle in triangles {
        let Some((distance, uv)) = triangle.intersect(ray) else {
            continue;
        };
        if best.as_ref().is_none_or(|best| distance < best.distance) {
            best = Some(Hit {
                triangle,
                distance,
                uv,
                point: ray.point_at(distance),
            });
        }
    }

    best
}

use index_vec::IndexVec;

use crate::geometry::{Axis, WorldBox, WorldTriangle};

use super::{KdTree, Node, NodeIdx, TriangleIdx};

impl KdTree {
    /// Iterates over leaves in left to right order, yielding the leaf voxel and its triangles.
    pub fn leaves(&self) -> impl Iterator<Item = (&WorldBox, &[WorldTriangle])> + '_ {
        let mut stack: Vec<NodeIdx> = self.root.into_iter().collect();

        std::iter::from_fn(move || {
            while let Some(index) = stack.pop() {
                match &self.nodes[index] {
                    Node::Inner { children, .. } => stack.extend(children.iter().rev().flatten()),
                    Node::Leaf { bounds, triangles } => {
                        return Some((bounds, self.leaf_triangles(*triangles)));
                    }
                }
            }
            None
        })
    }

    /// Panics if the tree isn't well-formed.
    ///
    /// The tree is well-formed if every node is reachable exactly once from the root,
    /// children are stored before their parents, child voxels are exactly the halves of the
    /// parent voxel, every leaf is non-empty and its triangles touch its voxel, and the leaves
    /// together use every stored triangle exactly once.
    pub fn assert_well_formed(&self) {
        let Some(root) = self.root else {
            assert!(self.nodes.is_empty(), "Empty tree has nodes");
            assert!(self.triangles.is_empty(), "Empty tree has triangles");
            return;
        };

        assert_eq!(root, self.nodes.last_idx(), "Root must be the last node");
        assert_eq!(self.nodes[root].bounds(), &self.bounding_box);

        let mut visited: IndexVec<NodeIdx, bool> = index_vec::index_vec![false; self.nodes.len()];
        let mut triangle_uses: IndexVec<TriangleIdx, usize> =
            index_vec::index_vec![0; self.triangles.len()];
        self.assert_well_formed_recurse(root, &mut visited, &mut triangle_uses);

        if let Some(index) = visited.iter().position(|v| !v) {
            panic!("Node {index} is not reachable from the root");
        }
        if let Some(index) = triangle_uses.iter().position(|uses| *uses != 1) {
            panic!(
                "Triangle {index} is referenced by {} leaves",
                triangle_uses[index]
            );
        }
    }

    fn assert_well_formed_recurse(
        &self,
        index: NodeIdx,
        visited: &mut IndexVec<NodeIdx, bool>,
        triangle_uses: &mut IndexVec<TriangleIdx, usize>,
    ) {
        if std::mem::replace(&mut visited[index], true) {
            panic!("Detected loop. Node {index:?} visited twice.");
        }

        assert!(
            self.nodes[index].bounds().is_valid(),
            "Node {index:?} has invalid bounds"
        );

        match &self.nodes[index] {
            Node::Inner {
                bounds,
                plane,
                children,
            } => {
                assert!(
                    children.iter().any(Option::is_some),
                    "Inner node {index:?} has no children"
                );
                let axis = plane.axis.index();
                assert!(
                    bounds.min[axis] < plane.position && plane.position < bounds.max[axis],
                    "Split plane of node {index:?} is outside its voxel"
                );

                let (lower, upper) = bounds.split(plane.axis, plane.position);
                for (child, expected_bounds) in children.iter().zip([lower, upper]) {
                    let Some(child) = *child else {
                        continue;
                    };
                    assert!(child < index, "Child {child:?} is stored after its parent");
                    assert_eq!(self.nodes[child].bounds(), &expected_bounds);
                    self.assert_well_formed_recurse(child, visited, triangle_uses);
                }
            }
            Node::Leaf { bounds, triangles } => {
                assert!(!triangles.is_empty(), "Leaf {index:?} is empty");
                for triangle_index in triangles.iter() {
                    triangle_uses[triangle_index] += 1;
                    let triangle_box = self.triangles[triangle_index].bounding_box();
                    assert!(
                        overlaps(bounds, &triangle_box),
                        "Triangle {triangle_index:?} does not touch leaf {index:?}"
                    );
                }
            }
        }
    }
}

/// Inclusive box overlap.
fn overlaps(a: &WorldBox, b: &WorldBox) -> bool {
    Axis::ALL.iter().all(|axis| {
        let i = axis.index();
        a.min[i] <= b.max[i] && b.min[i] <= a.max[i]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FloatType, WorldPoint, test::world_triangle};
    use crate::kd_tree::SplitPlane;
    use assert2::{assert, let_assert};
    use proptest::collection::vec;
    use test_strategy::proptest;

    #[test]
    fn overlap() {
        let a = WorldBox::new([0.0, 0.0, 0.0].into(), [1.0, 1.0, 1.0].into());
        let touching = WorldBox::new([1.0, 0.5, 0.5].into(), [2.0, 2.0, 2.0].into());
        let apart = WorldBox::new([1.5, 0.0, 0.0].into(), [2.0, 1.0, 1.0].into());
        assert!(overlaps(&a, &touching));
        assert!(!overlaps(&a, &apart));
    }

    #[test]
    fn leaves_of_split_scene() {
        let triangles: Vec<_> = (0..30)
            .map(|i| {
                let x = i as FloatType * 0.6 - 9.0;
                WorldTriangle::new(
                    WorldPoint::new(x, 0.0, 0.0),
                    WorldPoint::new(x + 0.5, 1.0, 0.0),
                    WorldPoint::new(x, 0.0, 1.0),
                )
            })
            .collect();
        let bounds = WorldBox::new([-10.0, -10.0, -10.0].into(), [10.0, 10.0, 10.0].into());
        let_assert!(Ok(tree) = KdTree::build(&triangles, bounds));
        tree.assert_well_formed();

        let leaves: Vec<_> = tree.leaves().collect();
        assert!(leaves.len() > 1);
        // Leaves come out ordered along x as the triangles are.
        assert!(leaves.is_sorted_by(|a, b| a.0.min.x <= b.0.min.x));
    }

    #[test]
    #[should_panic(expected = "Inner node")]
    fn childless_inner_node_is_rejected() {
        let bounds = WorldBox::new([0.0, 0.0, 0.0].into(), [1.0, 1.0, 1.0].into());
        let mut nodes = IndexVec::new();
        let root = nodes.push(Node::Inner {
            bounds: bounds.clone(),
            plane: SplitPlane {
                axis: Axis::X,
                position: 0.5,
            },
            children: [None, None],
        });
        let tree = KdTree {
            bounding_box: bounds,
            root: Some(root),
            nodes,
            triangles: IndexVec::new(),
        };
        tree.assert_well_formed();
    }

    #[proptest]
    fn random_soups_are_well_formed(
        #[strategy(vec(world_triangle(), 0..80))] triangles: Vec<WorldTriangle>,
    ) {
        let tree = KdTree::with_fitted_bounds(&triangles);
        tree.assert_well_formed();

        // Every input triangle is stored in some leaf whose voxel it touches
        for triangle in &triangles {
            assert!(
                tree.leaves()
                    .any(|(voxel, leaf)| leaf.contains(triangle) && overlaps(voxel, &triangle.bounding_box()))
            );
        }
    }
}

mod building;
mod events;
mod printing;
mod sah;
mod traversal;
mod validation;

use bon::Builder;
use index_vec::IndexVec;

use crate::geometry::{Axis, FloatType, WorldBox, WorldTriangle};

pub use building::BuildError;
pub use printing::TreeStatistics;
pub use traversal::{Hit, StackCache, brute_force_intersect};

/// Kd-tree over a triangle soup, split using the surface area heuristic.
///
/// The tree is immutable once built, queries only take `&self` and can run
/// from any number of threads at once.
#[derive(Clone, Debug)]
pub struct KdTree {
    bounding_box: WorldBox,
    /// Nodes are stored bottom-up, children always have lower index than their parent.
    /// Root is the last node, or None if there is no geometry at all.
    root: Option<NodeIdx>,
    nodes: IndexVec<NodeIdx, Node>,

    /// Triangles referenced by the leaves. Triangles straddling a split plane
    /// are stored once for every leaf they end up in.
    triangles: IndexVec<TriangleIdx, WorldTriangle>,
}

/// Parameters of the SAH cost model and the build limits.
#[derive(Clone, Debug, Builder)]
pub struct BuildSettings {
    /// Estimated cost of visiting an inner node.
    #[builder(default = 1.0)]
    pub traversal_cost: FloatType,

    /// Estimated cost of a single ray-triangle test.
    #[builder(default = 0.1)]
    pub intersection_cost: FloatType,

    /// Multiplier applied to splits that cut off an empty side.
    #[builder(default = 0.8)]
    pub empty_bias: FloatType,

    /// Nodes at this depth become leaves regardless of the split cost.
    #[builder(default = 48)]
    pub max_depth: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings::builder().build()
    }
}

#[derive(Clone, Debug)]
enum Node {
    Inner {
        bounds: WorldBox,
        plane: SplitPlane,
        /// Lower and upper child, at least one is present.
        children: [Option<NodeIdx>; 2],
    },
    Leaf {
        bounds: WorldBox,
        triangles: TriangleIdxRange,
    },
}

impl Node {
    fn bounds(&self) -> &WorldBox {
        match self {
            Node::Inner { bounds, .. } | Node::Leaf { bounds, .. } => bounds,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct SplitPlane {
    axis: Axis,
    position: FloatType,
}

/// Which child a triangle goes to when its node gets split.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Both,
}

index_vec::define_index_type! {
    struct NodeIdx = u32;
}

index_vec::define_index_type! {
    struct TriangleIdx = u32;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct TriangleIdxRange {
    pub first: TriangleIdx,
    pub last: TriangleIdx,
}

impl TriangleIdxRange {
    pub fn into_range(self) -> std::ops::Range<TriangleIdx> {
        self.first..self.last
    }

    pub fn iter(&self) -> impl Iterator<Item = TriangleIdx> + use<> {
        (self.first.index()..self.last.index()).map(TriangleIdx::new)
    }

    pub fn len(&self) -> usize {
        self.last.index() - self.first.index()
    }

    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }
}

impl KdTree {
    pub fn bounding_box(&self) -> &WorldBox {
        &self.bounding_box
    }

    /// True if the tree holds no triangles, all queries will miss.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn leaf_triangles(&self, range: TriangleIdxRange) -> &[WorldTriangle] {
        self.triangles[range.into_range()].as_raw_slice()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn default_settings() {
        let settings = BuildSettings::default();
        assert!(settings.traversal_cost == 1.0);
        assert!(settings.intersection_cost == 0.1);
        assert!(settings.empty_bias == 0.8);
        assert!(settings.max_depth == 48);
    }

    #[test]
    fn settings_builder_overrides() {
        let settings = BuildSettings::builder().max_depth(3).empty_bias(1.0).build();
        assert!(settings.max_depth == 3);
        assert!(settings.empty_bias == 1.0);
        assert!(settings.intersection_cost == 0.1);
    }

    #[test]
    fn triangle_range() {
        let range = TriangleIdxRange {
            first: TriangleIdx::new(3),
            last: TriangleIdx::new(7),
        };
        assert!(range.len() == 4);
        assert!(!range.is_empty());
        assert!(range.iter().map(|i| i.index()).collect::<Vec<_>>() == vec![3, 4, 5, 6]);
    }
}

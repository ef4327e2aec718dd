use std::time::Instant;

use index_vec::IndexVec;
use thiserror::Error;

use crate::geometry::{FloatType, WorldBox, WorldPoint, WorldTriangle};

use super::{
    BuildSettings, KdTree, Node, NodeIdx, Side, TriangleIdx, TriangleIdxRange,
    events::{EventKind, EventLists, SahEvent},
    sah::{SplitCandidate, find_plane},
};

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Bounding box {0:?} is not valid")]
    InvalidBounds(WorldBox),

    #[error("Triangle {index} is not inside the bounding box")]
    TriangleOutsideBounds { index: usize },
}

impl KdTree {
    /// Builds the tree with default settings.
    /// All triangles must lie inside `bounds`.
    pub fn build(triangles: &[WorldTriangle], bounds: WorldBox) -> Result<KdTree, BuildError> {
        Self::build_with_settings(triangles, bounds, &BuildSettings::default())
    }

    /// Builds the tree with default settings, using the tight bounding box of the triangles.
    pub fn with_fitted_bounds(triangles: &[WorldTriangle]) -> KdTree {
        let bounds = WorldBox::from_points(triangles.iter().flat_map(|t| t.iter()))
            .unwrap_or_else(|| WorldBox::new(WorldPoint::origin(), WorldPoint::origin()));
        Self::build_unchecked(triangles, bounds, &BuildSettings::default())
    }

    pub fn build_with_settings(
        triangles: &[WorldTriangle],
        bounds: WorldBox,
        settings: &BuildSettings,
    ) -> Result<KdTree, BuildError> {
        if !bounds.is_valid() {
            return Err(BuildError::InvalidBounds(bounds));
        }
        if let Some(index) = triangles
            .iter()
            .position(|t| !t.iter().all(|p| bounds.contains_point(p)))
        {
            return Err(BuildError::TriangleOutsideBounds { index });
        }

        Ok(Self::build_unchecked(triangles, bounds, settings))
    }

    fn build_unchecked(
        triangles: &[WorldTriangle],
        bounds: WorldBox,
        settings: &BuildSettings,
    ) -> KdTree {
        let start = Instant::now();

        let mut builder = Builder {
            settings,
            nodes: IndexVec::new(),
            triangles: IndexVec::new(),
            depth_limited_leaves: 0,
        };
        let events = EventLists::new(triangles, &bounds);
        let root = builder.create_node(triangles.to_vec(), bounds.clone(), events, 0);

        if builder.depth_limited_leaves > 0 {
            log::warn!(
                "Depth limit {} reached in {} leaves, input probably contains many coplanar triangles",
                settings.max_depth,
                builder.depth_limited_leaves
            );
        }

        let tree = KdTree {
            bounding_box: bounds,
            root,
            nodes: builder.nodes,
            triangles: builder.triangles,
        };

        if log::log_enabled!(log::Level::Debug) {
            let statistics = tree.statistics();
            log::debug!(
                "Built kd-tree over {} triangles in {:?}: {} nodes, {} leaves, depth {}, {} triangle references",
                triangles.len(),
                start.elapsed(),
                statistics.node_count,
                statistics.leaf_count,
                statistics.leaf_depth.max,
                statistics.triangle_references,
            );
        }

        tree
    }
}

struct Builder<'a> {
    settings: &'a BuildSettings,
    nodes: IndexVec<NodeIdx, Node>,
    triangles: IndexVec<TriangleIdx, WorldTriangle>,
    depth_limited_leaves: usize,
}

/// Input of a node that is yet to be built.
struct NodeInput {
    triangles: Vec<WorldTriangle>,
    voxel: WorldBox,
    events: EventLists,
}

impl Builder<'_> {
    /// Recursively builds the subtree for the given triangles, returns None if there is nothing
    /// to store.
    fn create_node(
        &mut self,
        triangles: Vec<WorldTriangle>,
        voxel: WorldBox,
        events: EventLists,
        depth: usize,
    ) -> Option<NodeIdx> {
        if triangles.is_empty() {
            return None;
        }

        // Splitting must be cheaper than intersecting all triangles directly
        let leaf_cost = self.settings.intersection_cost * triangles.len() as FloatType;
        let Some(split) = find_plane(self.settings, triangles.len(), &voxel, &events)
            .filter(|split| split.cost < leaf_cost)
        else {
            return Some(self.push_leaf(triangles, voxel));
        };

        if depth >= self.settings.max_depth {
            self.depth_limited_leaves += 1;
            return Some(self.push_leaf(triangles, voxel));
        }

        let [left, right] = split_node(triangles, &voxel, events, &split);
        let children = [
            self.create_node(left.triangles, left.voxel, left.events, depth + 1),
            self.create_node(right.triangles, right.voxel, right.events, depth + 1),
        ];

        if children.iter().all(Option::is_none) {
            return None;
        }

        Some(self.nodes.push(Node::Inner {
            bounds: voxel,
            plane: split.plane,
            children,
        }))
    }

    fn push_leaf(&mut self, triangles: Vec<WorldTriangle>, voxel: WorldBox) -> NodeIdx {
        let first = self.triangles.next_idx();
        self.triangles.extend(triangles);
        let last = self.triangles.next_idx();

        self.nodes.push(Node::Leaf {
            bounds: voxel,
            triangles: TriangleIdxRange { first, last },
        })
    }
}

/// Distributes triangles and their events into the two halves of the voxel.
/// Triangles straddling the plane are copied to both sides with new events clamped
/// to the respective half.
fn split_node(
    triangles: Vec<WorldTriangle>,
    voxel: &WorldBox,
    events: EventLists,
    split: &SplitCandidate,
) -> [NodeInput; 2] {
    let (left_voxel, right_voxel) = voxel.split(split.plane.axis, split.plane.position);
    let voxels = [left_voxel, right_voxel];

    let sides = classify(
        &events[split.plane.axis],
        split.plane.position,
        split.planar_side,
        triangles.len(),
    );

    // Index of every one-sided triangle in its side's list
    let mut remap = vec![usize::MAX; triangles.len()];
    let mut buckets: [Vec<WorldTriangle>; 2] = Default::default();
    let mut straddling = Vec::new();

    for (i, (triangle, side)) in triangles.into_iter().zip(&sides).enumerate() {
        let bucket = match side {
            Side::Left => &mut buckets[0],
            Side::Right => &mut buckets[1],
            Side::Both => {
                straddling.push(triangle);
                continue;
            }
        };
        remap[i] = bucket.len();
        bucket.push(triangle);
    }

    let mut side_events = events.split(&sides, &remap);
    drop(events);

    let mut stranded_events: [EventLists; 2] = Default::default();
    for triangle in straddling {
        for ((bucket, stranded), voxel) in buckets.iter_mut().zip(&mut stranded_events).zip(&voxels) {
            stranded.push_triangle(bucket.len(), &triangle, voxel);
            bucket.push(triangle.clone());
        }
    }

    for (events, mut stranded) in side_events.iter_mut().zip(stranded_events) {
        stranded.sort();
        events.merge(stranded);
    }

    let [left_triangles, right_triangles] = buckets;
    let [left_events, right_events] = side_events;
    let [left_voxel, right_voxel] = voxels;
    [
        NodeInput {
            triangles: left_triangles,
            voxel: left_voxel,
            events: left_events,
        },
        NodeInput {
            triangles: right_triangles,
            voxel: right_voxel,
            events: right_events,
        },
    ]
}

/// Decides the side for every triangle based on events on the split axis.
/// Triangles that end before the plane go left, triangles that start after it go right,
/// planar triangles in the plane go to `planar_side` and everything else straddles the plane.
fn classify(
    axis_events: &[SahEvent],
    position: FloatType,
    planar_side: Side,
    triangle_count: usize,
) -> Vec<Side> {
    let mut sides = vec![Side::Both; triangle_count];

    for event in axis_events {
        let side = match event.kind {
            EventKind::End if event.position <= position => Side::Left,
            EventKind::Start if event.position >= position => Side::Right,
            EventKind::Planar if event.position < position => Side::Left,
            EventKind::Planar if event.position > position => Side::Right,
            EventKind::Planar => planar_side,
            _ => continue,
        };
        sides[event.triangle] = side;
    }

    sides
}

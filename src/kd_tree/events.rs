use std::ops::Index;

use assert2::debug_assert;
use itertools::Itertools as _;
use ordered_float::OrderedFloat;

use crate::geometry::{Axis, FloatType, WorldBox, WorldTriangle};

use super::Side;

/// Kind of a sweep event. Order matters: at equal positions, triangles ending there
/// are processed before the planar ones, and those before the ones starting there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(super) enum EventKind {
    End,
    Planar,
    Start,
}

/// Position on one axis where a triangle's extent starts, ends, or where it lies flat.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct SahEvent {
    pub position: FloatType,
    /// Index into the triangle list of the node being split.
    pub triangle: usize,
    pub kind: EventKind,
}

impl SahEvent {
    fn sort_key(&self) -> (OrderedFloat<FloatType>, EventKind) {
        (OrderedFloat(self.position), self.kind)
    }
}

/// One event list per axis, each sorted by position and kind.
#[derive(Clone, Debug, Default)]
pub(super) struct EventLists([Vec<SahEvent>; 3]);

impl EventLists {
    /// Creates sorted event lists for the whole triangle set of the root node.
    pub fn new(triangles: &[WorldTriangle], voxel: &WorldBox) -> EventLists {
        let mut events = EventLists::default();
        for list in events.0.iter_mut() {
            list.reserve(2 * triangles.len());
        }
        for (i, triangle) in triangles.iter().enumerate() {
            events.push_triangle(i, triangle, voxel);
        }
        events.sort();
        events
    }

    /// Adds events of a single triangle, with the positions clamped to the voxel.
    /// Keeps the lists unsorted.
    pub fn push_triangle(&mut self, index: usize, triangle: &WorldTriangle, voxel: &WorldBox) {
        for axis in Axis::ALL {
            let list = &mut self.0[axis.index()];
            let min = voxel.clamp(axis, triangle.axis_min(axis));

            if triangle.is_planar(axis) {
                list.push(SahEvent {
                    position: min,
                    triangle: index,
                    kind: EventKind::Planar,
                });
            } else {
                let max = voxel.clamp(axis, triangle.axis_max(axis));
                list.push(SahEvent {
                    position: min,
                    triangle: index,
                    kind: EventKind::Start,
                });
                list.push(SahEvent {
                    position: max,
                    triangle: index,
                    kind: EventKind::End,
                });
            }
        }
    }

    pub fn sort(&mut self) {
        for list in self.0.iter_mut() {
            list.sort_by_key(SahEvent::sort_key);
        }
        debug_assert!(self.is_sorted());
    }

    /// Distributes events into left and right lists according to the side of their triangle,
    /// renumbering the triangles using `remap`. Events of triangles on both sides are dropped,
    /// these have to be regenerated for the clipped voxels.
    pub fn split(&self, sides: &[Side], remap: &[usize]) -> [EventLists; 2] {
        let mut ret: [EventLists; 2] = Default::default();

        for axis in Axis::ALL {
            let source = &self[axis];
            for out in ret.iter_mut() {
                out.0[axis.index()].reserve(source.len());
            }

            for event in source {
                let bucket = match sides[event.triangle] {
                    Side::Left => 0,
                    Side::Right => 1,
                    Side::Both => continue,
                };
                ret[bucket].0[axis.index()].push(SahEvent {
                    triangle: remap[event.triangle],
                    ..*event
                });
            }
        }

        ret
    }

    /// Merges sorted events into these sorted lists.
    /// Stable: among equal events, the ones already present come first.
    pub fn merge(&mut self, other: EventLists) {
        for (list, other_list) in self.0.iter_mut().zip(other.0) {
            if other_list.is_empty() {
                continue;
            }
            let current = std::mem::take(list);
            *list = current
                .into_iter()
                .merge_by(other_list, |a, b| a.sort_key() <= b.sort_key())
                .collect();
        }
        debug_assert!(self.is_sorted());
    }

    pub fn is_sorted(&self) -> bool {
        self.0
            .iter()
            .all(|list| list.is_sorted_by_key(SahEvent::sort_key))
    }
}

impl Index<Axis> for EventLists {
    type Output = [SahEvent];

    fn index(&self, axis: Axis) -> &Self::Output {
        &self.0[axis.index()]
    }
}

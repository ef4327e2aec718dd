use crate::geometry::{Axis, FloatType, WorldBox};

use super::{
    BuildSettings, Side, SplitPlane,
    events::{EventKind, EventLists, SahEvent},
};

/// Cheapest split plane found for a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct SplitCandidate {
    pub plane: SplitPlane,
    /// Where triangles lying in the split plane go.
    pub planar_side: Side,
    pub cost: FloatType,
}

impl BuildSettings {
    /// Cost of a split with given probabilities of hitting each side and triangle counts.
    fn unit_cost(
        &self,
        p_left: FloatType,
        p_right: FloatType,
        left_count: usize,
        right_count: usize,
    ) -> FloatType {
        let cost = self.traversal_cost
            + self.intersection_cost
                * (p_left * left_count as FloatType + p_right * right_count as FloatType);
        if left_count == 0 || right_count == 0 {
            // Reward cutting off empty space
            cost * self.empty_bias
        } else {
            cost
        }
    }

    /// Evaluates SAH for splitting `voxel` at the given plane, trying planar triangles
    /// on both sides. Returns the cost and the side planar triangles should go to.
    /// Planes on the voxel boundary don't split anything and get infinite cost.
    pub(super) fn split_cost(
        &self,
        voxel: &WorldBox,
        inv_voxel_area: FloatType,
        plane: SplitPlane,
        left_count: usize,
        right_count: usize,
        planar_count: usize,
    ) -> (FloatType, Side) {
        if voxel.is_on_boundary(plane.axis, plane.position) {
            return (FloatType::INFINITY, Side::Left);
        }

        let (left, right) = voxel.split(plane.axis, plane.position);
        let p_left = left.surface_area() * inv_voxel_area;
        let p_right = right.surface_area() * inv_voxel_area;

        let planar_left_cost = self.unit_cost(p_left, p_right, left_count + planar_count, right_count);
        let planar_right_cost = self.unit_cost(p_left, p_right, left_count, right_count + planar_count);

        if planar_right_cost < planar_left_cost {
            (planar_right_cost, Side::Right)
        } else {
            (planar_left_cost, Side::Left)
        }
    }
}

/// Sweeps the sorted events of every axis and finds the split plane with the lowest
/// SAH cost. Returns None if no plane has finite cost.
pub(super) fn find_plane(
    settings: &BuildSettings,
    triangle_count: usize,
    voxel: &WorldBox,
    events: &EventLists,
) -> Option<SplitCandidate> {
    let inv_voxel_area = 1.0 / voxel.surface_area();
    let mut best: Option<SplitCandidate> = None;

    for axis in Axis::ALL {
        let events = &events[axis];

        // Triangles completely on the left of the current plane, and
        // triangles that didn't end yet.
        let mut left_count = 0;
        let mut right_count = triangle_count;

        let mut i = 0;
        while i < events.len() {
            let position = events[i].position;
            let ending = count_run(events, &mut i, position, EventKind::End);
            let planar = count_run(events, &mut i, position, EventKind::Planar);
            let starting = count_run(events, &mut i, position, EventKind::Start);

            right_count -= ending + planar;

            let plane = SplitPlane { axis, position };
            let (cost, planar_side) = settings.split_cost(
                voxel,
                inv_voxel_area,
                plane,
                left_count,
                right_count,
                planar,
            );
            if best.is_none_or(|best| cost < best.cost) && cost < FloatType::INFINITY {
                best = Some(SplitCandidate {
                    plane,
                    planar_side,
                    cost,
                });
            }

            left_count += starting + planar;
        }
    }

    best
}

/// Advances `i` over events of the given kind at `position`, returns how many there were.
fn count_run(events: &[SahEvent], i: &mut usize, position: FloatType, kind: EventKind) -> usize {
    let start = *i;
    while *i < events.len() && events[*i].position == position && events[*i].kind == kind {
        *i += 1;
    }
    *i - start
}

use std::ops::Sub;

use super::{Axis, FloatType, WorldBox, WorldPoint};

#[derive(Clone, Debug, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl WorldBox {
    /// Smallest box containing all the points, None if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<WorldBox> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(WorldBox::new(*first, *first), |b, p| WorldBox {
            min: b.min.inf(p),
            max: b.max.sup(p),
        }))
    }

    /// Box has finite coordinates and min <= max on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|x| x.is_finite())
            && Axis::ALL
                .iter()
                .all(|axis| self.min[axis.index()] <= self.max[axis.index()])
    }

    pub fn surface_area(&self) -> FloatType {
        let size = self.size();
        2.0 * (size.x * size.y + size.y * size.z + size.z * size.x)
    }

    /// Splits the box by a plane perpendicular to `axis` at `position`.
    /// Returns (lower, upper) part.
    pub fn split(&self, axis: Axis, position: FloatType) -> (WorldBox, WorldBox) {
        let mut lower = self.clone();
        let mut upper = self.clone();
        lower.max[axis.index()] = position;
        upper.min[axis.index()] = position;
        (lower, upper)
    }

    /// Inclusive point containment. Comparisons with NaN are false.
    pub fn contains_point(&self, p: &WorldPoint) -> bool {
        Axis::ALL.iter().all(|axis| {
            let i = axis.index();
            self.min[i] <= p[i] && p[i] <= self.max[i]
        })
    }

    pub fn contains_box(&self, other: &WorldBox) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Whether `position` coincides with the lower or upper face of the box along `axis`.
    pub fn is_on_boundary(&self, axis: Axis, position: FloatType) -> bool {
        position == self.min[axis.index()] || position == self.max[axis.index()]
    }

    pub fn clamp(&self, axis: Axis, position: FloatType) -> FloatType {
        position.max(self.min[axis.index()]).min(self.max[axis.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{assert, let_assert};
    use test_case::test_case;

    fn unit_box() -> WorldBox {
        WorldBox::new([0.0, 0.0, 0.0].into(), [1.0, 2.0, 3.0].into())
    }

    #[test]
    fn surface_area() {
        assert!(unit_box().surface_area() == 2.0 * (2.0 + 6.0 + 3.0));
    }

    #[test]
    fn flat_box_surface_area() {
        let b = WorldBox::new([0.0, 0.0, 0.0].into(), [2.0, 2.0, 0.0].into());
        assert!(b.surface_area() == 8.0);
    }

    #[test_case(Axis::X, 0.5)]
    #[test_case(Axis::Y, 1.0)]
    #[test_case(Axis::Z, 0.25)]
    fn split_halves_are_contained(axis: Axis, position: FloatType) {
        let b = unit_box();
        let (lower, upper) = b.split(axis, position);
        assert!(b.contains_box(&lower));
        assert!(b.contains_box(&upper));
        assert!(lower.max[axis.index()] == position);
        assert!(upper.min[axis.index()] == position);
        assert!(lower.is_valid());
        assert!(upper.is_valid());
    }

    #[test]
    fn from_points() {
        let points = [
            WorldPoint::new(1.0, -1.0, 0.0),
            WorldPoint::new(-2.0, 3.0, 0.5),
            WorldPoint::new(0.0, 0.0, -4.0),
        ];
        let_assert!(Some(b) = WorldBox::from_points(&points));
        assert!(b.min == WorldPoint::new(-2.0, -1.0, -4.0));
        assert!(b.max == WorldPoint::new(1.0, 3.0, 0.5));
    }

    #[test]
    fn from_no_points() {
        assert!(WorldBox::from_points(&[]) == None);
    }

    #[test]
    fn validity() {
        assert!(unit_box().is_valid());
        assert!(!WorldBox::new([1.0, 0.0, 0.0].into(), [0.0, 1.0, 1.0].into()).is_valid());
        assert!(
            !WorldBox::new([0.0, 0.0, 0.0].into(), [FloatType::INFINITY, 1.0, 1.0].into())
                .is_valid()
        );
        assert!(!WorldBox::new([FloatType::NAN, 0.0, 0.0].into(), [1.0, 1.0, 1.0].into()).is_valid());
    }

    #[test]
    fn nan_point_is_not_contained() {
        assert!(!unit_box().contains_point(&WorldPoint::new(FloatType::NAN, 0.5, 0.5)));
    }

    #[test]
    fn boundary_and_clamp() {
        let b = unit_box();
        assert!(b.is_on_boundary(Axis::Y, 2.0));
        assert!(b.is_on_boundary(Axis::Y, 0.0));
        assert!(!b.is_on_boundary(Axis::Y, 1.0));
        assert!(b.clamp(Axis::Z, 5.0) == 3.0);
        assert!(b.clamp(Axis::Z, -5.0) == 0.0);
        assert!(b.clamp(Axis::Z, 1.5) == 1.5);
    }
}

use std::ops::Index;

use nalgebra::{ClosedAddAssign, ClosedMulAssign, ClosedSubAssign, Scalar, Point3, Vector3};
use num_traits::{One, Zero};

use super::{Axis, FloatType, WorldBox, WorldTriangle, WorldVector};

#[derive(Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'a Point> {
        self.0.iter()
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<T> Triangle<Point3<T>>
where
    T: Scalar + ClosedAddAssign + ClosedSubAssign + ClosedMulAssign + Zero + One,
{
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [Vector3<T>; 2] {
        [&self.0[1] - &self.0[0], &self.0[2] - &self.0[0]]
    }

    /// Returns a normal vector of the triangle, not normalized.
    pub fn normal(&self) -> Vector3<T> {
        let [e1, e2] = self.edges();
        e1.cross(&e2)
    }
}

impl WorldTriangle {
    /// Normal of unit length.
    /// Degenerate (zero area) triangles have all components NaN.
    pub fn unit_normal(&self) -> WorldVector {
        let normal = self.normal();
        normal / normal.norm()
    }

    /// Triangle lies in a plane perpendicular to `axis`.
    pub fn is_planar(&self, axis: Axis) -> bool {
        self.unit_normal()[axis.index()].abs() == 1.0
    }

    pub fn axis_min(&self, axis: Axis) -> FloatType {
        let i = axis.index();
        self[0][i].min(self[1][i]).min(self[2][i])
    }

    pub fn axis_max(&self, axis: Axis) -> FloatType {
        let i = axis.index();
        self[0][i].max(self[1][i]).max(self[2][i])
    }

    pub fn bounding_box(&self) -> WorldBox {
        WorldBox {
            min: self[0].inf(&self[1]).inf(&self[2]),
            max: self[0].sup(&self[1]).sup(&self[2]),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates<T> {
    pub u: T,
    pub v: T,
}

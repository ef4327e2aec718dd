mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray_box_intersection::RayIntersectionExt;
pub use triangle::{BarycentricCoordinates, Triangle};

pub type FloatType = f32;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;
pub type WorldTriangle = Triangle<WorldPoint>;

/// Coordinate axis, usable as an index into points and vectors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        let direction = direction.normalize();
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use assert2::assert;
    use proptest::prelude::*;

    /// Coordinates with a limited number of distinct values, so that generated geometry
    /// is not too badly conditioned.
    pub fn simple_float() -> BoxedStrategy<FloatType> {
        (-8000i32..=8000).prop_map(|n| n as FloatType * 1e-3).boxed()
    }

    pub fn world_point() -> BoxedStrategy<WorldPoint> {
        (simple_float(), simple_float(), simple_float())
            .prop_map(|(x, y, z)| WorldPoint::new(x, y, z))
            .boxed()
    }

    pub fn nonzero_world_vector() -> BoxedStrategy<WorldVector> {
        (simple_float(), simple_float(), simple_float())
            .prop_filter_map("vector is zero", |(x, y, z)| {
                let vector = WorldVector::new(x, y, z);
                if vector.norm() < 1e-3 { None } else { Some(vector) }
            })
            .boxed()
    }

    pub fn world_triangle() -> BoxedStrategy<WorldTriangle> {
        (world_point(), world_point(), world_point())
            .prop_map(|(a, b, c)| WorldTriangle::new(a, b, c))
            .boxed()
    }

    pub fn ray() -> BoxedStrategy<Ray> {
        (world_point(), nonzero_world_vector())
            .prop_map(|(origin, direction)| Ray::new(origin, direction))
            .boxed()
    }

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 3.0, 4.0));
        assert!((ray.direction.norm() - 1.0).abs() < 1e-6);
        assert!((ray.point_at(5.0) - WorldPoint::new(0.0, 3.0, 4.0)).norm() < 1e-5);
    }

    #[test]
    fn ray_zero_direction_component_inverts_to_infinity() {
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(-0.0, 0.0, -2.0));
        assert!(ray.inv_direction.x == FloatType::INFINITY);
        assert!(ray.inv_direction.y == FloatType::INFINITY);
        assert!(ray.inv_direction.z == -1.0);
    }

    #[test]
    fn axis_indices() {
        let p = WorldPoint::new(1.0, 2.0, 3.0);
        let coords: Vec<_> = Axis::ALL.iter().map(|axis| p[axis.index()]).collect();
        assert!(coords == vec![1.0, 2.0, 3.0]);
        assert!(Axis::Z.to_string() == "z");
    }
}

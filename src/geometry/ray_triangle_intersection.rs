use super::{BarycentricCoordinates, FloatType, Ray, WorldTriangle};

impl WorldTriangle {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Returns distance along ray and barycentric uv coordinates of the hit, if any.
    ///
    /// Points with u + v == 1 are rejected, so an edge shared by two triangles
    /// is only reported for one of them. Only hits with positive distance count.
    /// Adapted from https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm#Rust_implementation
    pub fn intersect(&self, ray: &Ray) -> Option<(FloatType, BarycentricCoordinates<FloatType>)> {
        let [e1, e2] = self.edges();

        let ray_cross_e2 = ray.direction.cross(&e2);
        let det = e1.dot(&ray_cross_e2);

        let inv_det = 1.0 / det; // May be infinite
        let s = ray.origin - self[0];
        let u = inv_det * s.dot(&ray_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let s_cross_e1 = s.cross(&e1);
        let v = inv_det * ray.direction.dot(&s_cross_e1);
        if !(v >= 0.0 && u + v < 1.0) {
            return None;
        }

        let t = inv_det * e2.dot(&s_cross_e1);
        if t > 0.0 {
            Some((t, BarycentricCoordinates { u, v }))
        } else {
            None
        }
    }
}

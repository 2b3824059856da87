use super::{Ray, Vec3};

use crate::macros::{variadic_max_comparator, variadic_min_comparator};

/// Axis-aligned bounding box
/// Defined by 2 points
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct AABB {
    pub minimum: Vec3,
    pub maximum: Vec3
}

impl AABB {
    pub fn new(minimum: Vec3, maximum: Vec3) -> AABB {
        AABB { minimum, maximum }
    }

    pub fn from_triangle(p0: Vec3, p1: Vec3, p2: Vec3) -> AABB {
        AABB {
            minimum: variadic_min_comparator!(Vec3::elementwise_min, p0, p1, p2),
            maximum: variadic_max_comparator!(Vec3::elementwise_max, p0, p1, p2),
        }
    }

    /// Returns a box which surrounds both a and b
    pub fn surrounding_box(a: AABB, b: AABB) -> AABB {
        AABB {
            minimum: Vec3::elementwise_min(a.minimum, b.minimum),
            maximum: Vec3::elementwise_max(a.maximum, b.maximum),
        }
    }

    /// Union of a non-empty sequence of boxes, `None` if the sequence is empty
    pub fn union_all(boxes: impl IntoIterator<Item = AABB>) -> Option<AABB> {
        boxes.into_iter().reduce(AABB::surrounding_box)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    /// Longest axis (0=x, 1=y, 2=z).
    pub fn longest_axis(&self) -> usize {
        let extent = self.maximum - self.minimum;
        if extent.0 >= extent.1 && extent.0 >= extent.2 {
            0
        } else if extent.1 >= extent.2 {
            1
        } else {
            2
        }
    }

    pub fn contains(&self, other: &AABB) -> bool {
        self.minimum.0 <= other.minimum.0 && self.minimum.1 <= other.minimum.1 && self.minimum.2 <= other.minimum.2
            && self.maximum.0 >= other.maximum.0 && self.maximum.1 >= other.maximum.1 && self.maximum.2 >= other.maximum.2
    }

    // slab test; zero direction components produce infinities which compare correctly
    pub fn intersects(&self, ray: Ray, t_min: f32, t_max: f32) -> bool {
        let mut t0 = t_min;
        let mut t1 = t_max;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction.axis(axis);
            let mut near = (self.minimum.axis(axis) - ray.origin.axis(axis)) * inv_d;
            let mut far = (self.maximum.axis(axis) - ray.origin.axis(axis)) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut near, &mut far);
            }
            // NaN (0 * inf) means the origin lies on the slab plane, treat as inside
            if !near.is_nan() {
                t0 = t0.max(near);
            }
            if !far.is_nan() {
                t1 = t1.min(far);
            }
            if t1 < t0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_bounds() {
        let aabb = AABB::from_triangle(Vec3(0.0, 1.0, 2.0), Vec3(-1.0, 5.0, 0.0), Vec3(3.0, 0.0, 1.0));
        assert_eq!(aabb.minimum, Vec3(-1.0, 0.0, 0.0));
        assert_eq!(aabb.maximum, Vec3(3.0, 5.0, 2.0));
        assert_eq!(aabb.longest_axis(), 1);
    }

    #[test]
    fn union_contains_inputs() {
        let a = AABB::new(Vec3(0.0, 0.0, 0.0), Vec3(1.0, 1.0, 1.0));
        let b = AABB::new(Vec3(-1.0, 0.5, 0.5), Vec3(0.5, 2.0, 0.5));
        let u = AABB::union_all([a, b]).unwrap();
        assert!(u.contains(&a) && u.contains(&b));
        assert!(AABB::union_all(Vec::<AABB>::new()).is_none());
    }

    #[test]
    fn ray_box_intersection() {
        let aabb = AABB::new(Vec3(-1.0, -1.0, -1.0), Vec3(1.0, 1.0, 1.0));
        let hit = Ray::new(Vec3(0.0, 0.0, -5.0), Vec3(0.0, 0.0, 1.0));
        let miss = Ray::new(Vec3(2.0, 0.0, -5.0), Vec3(0.0, 0.0, 1.0));
        let behind = Ray::new(Vec3(0.0, 0.0, 5.0), Vec3(0.0, 0.0, 1.0));
        assert!(aabb.intersects(hit, 0.0, f32::INFINITY));
        assert!(!aabb.intersects(miss, 0.0, f32::INFINITY));
        assert!(!aabb.intersects(behind, 0.0, f32::INFINITY));
    }
}

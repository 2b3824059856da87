use super::{Matrix4x4, Vec3};

/// Object-to-world transform of a primitive.
///
/// Only the forward matrix is stored; the inverse is derived when the scene is
/// compiled, which is where a singular matrix gets reported.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    object_to_world: Matrix4x4,
}

impl Transform {
    pub fn identity() -> Self {
        Transform { object_to_world: Matrix4x4::identity() }
    }

    pub fn translate(direction: Vec3) -> Self {
        Transform { object_to_world: Matrix4x4::translation(direction) }
    }

    pub fn scale(scale: Vec3) -> Self {
        Transform { object_to_world: Matrix4x4::scale(scale) }
    }

    pub fn rotate(theta: f32, axis: Vec3) -> Self {
        Transform { object_to_world: Matrix4x4::rotation(theta, axis) }
    }

    // applies SELF first, then OTHER
    pub fn compose(&self, other: Transform) -> Self {
        Transform {
            object_to_world: Matrix4x4::matmul(other.object_to_world, self.object_to_world),
        }
    }

    pub fn object_to_world(&self) -> Matrix4x4 {
        self.object_to_world
    }

    pub fn world_to_object(&self) -> Option<Matrix4x4> {
        self.object_to_world.invert()
    }

    pub fn apply_point(&self, point: Vec3) -> Vec3 {
        self.object_to_world.apply_point(point)
    }
}

impl From<Matrix4x4> for Transform {
    fn from(value: Matrix4x4) -> Self {
        Transform { object_to_world: value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_applies_left_to_right() {
        let t = Transform::scale(Vec3(2.0, 2.0, 2.0)).compose(Transform::translate(Vec3(1.0, 0.0, 0.0)));
        assert_eq!(t.apply_point(Vec3(1.0, 1.0, 1.0)), Vec3(3.0, 2.0, 2.0));
    }

    #[test]
    fn degenerate_scale_cannot_be_inverted() {
        assert!(Transform::scale(Vec3(0.0, 1.0, 1.0)).world_to_object().is_none());
        assert!(Transform::identity().world_to_object().is_some());
    }
}

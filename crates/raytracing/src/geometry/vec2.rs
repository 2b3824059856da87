#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq, PartialOrd)]
pub struct Vec2(pub f32, pub f32);

impl Vec2 {
    pub fn zero() -> Vec2 {
        Vec2(0.0, 0.0)
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.0, self.1]
    }
}

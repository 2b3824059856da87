mod camera;
mod primitive;
mod scene;
pub mod test_scenes;

pub use camera::{Camera, Lens};
pub use primitive::Primitive;
pub use scene::{PrimitiveIndex, Scene};

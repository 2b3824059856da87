use crate::scene::{Camera, Primitive};

/// Index of a primitive within its owning Scene
pub type PrimitiveIndex = usize;

/// Mutable scene graph. Compilation reads it; it is never modified by the
/// compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    name: String,
    camera: Camera,
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(name: impl Into<String>, camera: Camera) -> Scene {
        Scene {
            name: name.into(),
            camera,
            primitives: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> PrimitiveIndex {
        let index = self.primitives.len();
        self.primitives.push(primitive);
        index
    }

    /// Removes and returns the primitive at `index`, shifting later ones down
    pub fn remove_primitive(&mut self, index: PrimitiveIndex) -> Option<Primitive> {
        (index < self.primitives.len()).then(|| self.primitives.remove(index))
    }
}

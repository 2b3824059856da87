pub mod accel;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod geometry;
mod macros;
pub mod materials;
pub mod scene;
pub mod settings;

pub use compiled::CompiledScene;
pub use compiler::{CompileObserver, SceneCompiler, TracingObserver};
pub use error::{CompileError, CompiledSceneError};
pub use scene::Scene;
pub use settings::CompileSettings;

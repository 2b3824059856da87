use thiserror::Error;

use crate::compiler::Category;

/// Failures of `SceneCompiler::compile`.
///
/// None of these are caused by user data that could be corrected and retried,
/// with the exception of `SingularTransform`: they indicate a broken invariant
/// inside the compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("{category} entity missing from its offset table")]
    MissingEntity { category: Category },

    #[error("transform of primitive {primitive} is not invertible")]
    SingularTransform { primitive: usize },

    #[error("{category} offset does not fit in a 32-bit record field")]
    OffsetOverflow { category: Category },

    #[error("bounding volume hierarchy node {node} is not followed by its left child in pre-order")]
    MalformedBvh { node: usize },
}

/// Failures reading or writing a `CompiledScene`.
#[derive(Error, Debug)]
pub enum CompiledSceneError {
    #[error("compiled scene i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

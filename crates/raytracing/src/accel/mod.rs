//! Acceleration structure
//! Triangle meshes are compiled into stackless BVH records, since neither the
//! OpenCL nor the CPU kernels have hardware-accelerated raytracing queries.

pub mod bvh2;
pub mod flatten;
pub mod traversal;

pub use bvh2::{BVHNode, BVHNodeKind, BoundingVolumeHierarchy, NodeIndex};
pub use traversal::StacklessTraversal;

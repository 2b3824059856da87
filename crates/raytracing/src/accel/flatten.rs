//! Flattening of a `BoundingVolumeHierarchy` into an `i32` record array that a
//! kernel can walk without a stack.
//!
//! Record layout, one per node, in pre-order:
//! ```text
//! tree: [NODE_TYPE_TREE, next, min_bounds, max_bounds, left]
//! leaf: [NODE_TYPE_LEAF, next, min_bounds, max_bounds, triangle_count, triangle...]
//! ```
//! `min_bounds`/`max_bounds` are offsets into the shared point array, triangle
//! entries are offsets into the shared triangle array. `next` and `left` are
//! absolute element indices into the BVH array the records are placed in;
//! `next` is `NO_NEXT_NODE` when nothing follows the node's subtree.
//!
//! `next` of a node is the first later node (in pre-order) whose depth is not
//! greater than its own, which is the node to resume at once the subtree has
//! been skipped or exhausted. It is computed in one pass with a stack of nodes
//! still waiting for their successor.

use crate::accel::{BVHNode, BVHNodeKind, BoundingVolumeHierarchy};
use crate::compiler::Category;
use crate::error::CompileError;
use crate::geometry::{Triangle, Vec3};

pub const NODE_TYPE_LEAF: i32 = 1;
pub const NODE_TYPE_TREE: i32 = 2;
pub const NO_NEXT_NODE: i32 = -1;

pub const RECORD_TYPE: usize = 0;
pub const RECORD_NEXT: usize = 1;
pub const RECORD_MIN_BOUNDS: usize = 2;
pub const RECORD_MAX_BOUNDS: usize = 3;
// left child for trees, triangle count for leaves
pub const RECORD_PAYLOAD: usize = 4;
pub const RECORD_HEADER_LEN: usize = 5;

pub fn record_len(node: &BVHNode) -> usize {
    match &node.kind {
        BVHNodeKind::Leaf { triangles } => RECORD_HEADER_LEN + triangles.len(),
        BVHNodeKind::Tree { .. } => RECORD_HEADER_LEN,
    }
}

/// Number of `i32` elements `flatten` produces for `bvh`
pub fn flattened_len(bvh: &BoundingVolumeHierarchy) -> usize {
    bvh.nodes().iter().map(record_len).sum()
}

fn to_offset(value: usize) -> Result<i32, CompileError> {
    i32::try_from(value).map_err(|_| CompileError::OffsetOverflow {
        category: Category::BoundingVolumeHierarchies,
    })
}

/// Flattens `bvh` into records that will start at `base_offset` in the
/// combined BVH array. Bounds and triangles are resolved to offsets through
/// the given lookups, which fail when an entity was never registered.
pub fn flatten(
    bvh: &BoundingVolumeHierarchy,
    base_offset: usize,
    mut point_offset: impl FnMut(Vec3) -> Result<i32, CompileError>,
    mut triangle_offset: impl FnMut(&Triangle) -> Result<i32, CompileError>,
) -> Result<Vec<i32>, CompileError> {
    let order = bvh.pre_order();

    let mut offsets = Vec::with_capacity(order.len());
    let mut cursor = base_offset;
    for &index in &order {
        offsets.push(to_offset(cursor)?);
        cursor += record_len(bvh.node(index));
    }
    to_offset(cursor)?;

    let mut next = vec![NO_NEXT_NODE; order.len()];
    let mut pending: Vec<usize> = Vec::new();
    for (position, &index) in order.iter().enumerate() {
        let depth = bvh.node(index).depth;
        while let Some(&waiting) = pending.last() {
            if bvh.node(order[waiting]).depth < depth {
                break;
            }
            next[waiting] = offsets[position];
            pending.pop();
        }
        pending.push(position);
    }

    let mut records = Vec::with_capacity(cursor - base_offset);
    for (position, &index) in order.iter().enumerate() {
        let node = bvh.node(index);
        let min_bounds = point_offset(node.bounds.minimum)?;
        let max_bounds = point_offset(node.bounds.maximum)?;

        match &node.kind {
            BVHNodeKind::Tree { left, .. } => {
                if order.get(position + 1) != Some(left) || bvh.node(*left).depth != node.depth + 1 {
                    return Err(CompileError::MalformedBvh { node: index as usize });
                }
                records.extend_from_slice(&[
                    NODE_TYPE_TREE,
                    next[position],
                    min_bounds,
                    max_bounds,
                    offsets[position + 1],
                ]);
            }
            BVHNodeKind::Leaf { triangles } => {
                records.extend_from_slice(&[
                    NODE_TYPE_LEAF,
                    next[position],
                    min_bounds,
                    max_bounds,
                    to_offset(triangles.len())?,
                ]);
                for triangle in triangles {
                    records.push(triangle_offset(triangle)?);
                }
            }
        }
    }

    debug_assert_eq!(base_offset + records.len(), cursor);
    Ok(records)
}

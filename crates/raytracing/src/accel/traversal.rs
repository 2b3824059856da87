//! Stack-free walk over flattened BVH records.
//!
//! On a bounds miss the walk jumps to the record's `next`; on a hit it steps
//! into the left child of a tree record, or reports the triangles of a leaf
//! and then follows `next`. This is the loop a kernel runs against
//! `CompiledScene::bounding_volume_hierarchies`.

use crate::accel::flatten::{
    NODE_TYPE_LEAF, NODE_TYPE_TREE, RECORD_HEADER_LEN, RECORD_MAX_BOUNDS, RECORD_MIN_BOUNDS, RECORD_NEXT,
    RECORD_PAYLOAD, RECORD_TYPE,
};
use crate::geometry::{Vec3, AABB};

pub struct StacklessTraversal<'a, F> {
    records: &'a [i32],
    point3s: &'a [f32],
    cursor: Option<usize>,
    hit: F,
}

impl<'a, F> StacklessTraversal<'a, F>
where
    F: FnMut(&AABB) -> bool,
{
    /// `root` is the record offset of the tree's root, as stored in the
    /// shape offset of a triangle mesh primitive
    pub fn new(records: &'a [i32], point3s: &'a [f32], root: usize, hit: F) -> Self {
        StacklessTraversal { records, point3s, cursor: Some(root), hit }
    }

    fn point(&self, offset: i32) -> Option<Vec3> {
        let offset = usize::try_from(offset).ok()?;
        match self.point3s.get(offset..offset + 3)? {
            &[x, y, z] => Some(Vec3(x, y, z)),
            _ => None,
        }
    }

    fn follow(next: i32) -> Option<usize> {
        usize::try_from(next).ok()
    }

    // one step of the walk; `None` for records that cannot be read
    fn visit(&mut self, at: usize) -> Option<(Option<usize>, Option<&'a [i32]>)> {
        let records = self.records;
        let header = records.get(at..at + RECORD_HEADER_LEN)?;
        let next = Self::follow(header[RECORD_NEXT]);
        let bounds = AABB::new(self.point(header[RECORD_MIN_BOUNDS])?, self.point(header[RECORD_MAX_BOUNDS])?);

        if !(self.hit)(&bounds) {
            return Some((next, None));
        }

        match header[RECORD_TYPE] {
            NODE_TYPE_TREE => Some((Self::follow(header[RECORD_PAYLOAD]), None)),
            NODE_TYPE_LEAF => {
                let count = usize::try_from(header[RECORD_PAYLOAD]).ok()?;
                let start = at + RECORD_HEADER_LEN;
                Some((next, Some(records.get(start..start + count)?)))
            }
            _ => None,
        }
    }
}

impl<'a, F> Iterator for StacklessTraversal<'a, F>
where
    F: FnMut(&AABB) -> bool,
{
    /// Triangle offsets of a leaf whose bounds (and ancestors' bounds) were hit
    type Item = &'a [i32];

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(at) = self.cursor {
            match self.visit(at) {
                Some((next, leaf)) => {
                    self.cursor = next;
                    if leaf.is_some() {
                        return leaf;
                    }
                }
                None => self.cursor = None,
            }
        }
        None
    }
}

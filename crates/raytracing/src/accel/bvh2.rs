//! Binary BVH over the triangles of one mesh.
//!
//! Nodes live in an arena and refer to their children by index. The builder
//! appends nodes depth-first, left subtree before right, so the arena order is
//! already a pre-order walk; `pre_order` does not rely on that and walks the
//! links explicitly.

use crate::geometry::{Ray, Triangle, Vec3, AABB};

pub type NodeIndex = u32;

#[derive(Debug, Clone, PartialEq)]
pub enum BVHNodeKind {
    Leaf {
        triangles: Vec<Triangle>,
    },
    Tree {
        left: NodeIndex,
        right: NodeIndex,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BVHNode {
    // root is at depth 0, children at parent depth + 1
    pub depth: u32,
    pub bounds: AABB,
    pub kind: BVHNodeKind,
}

impl BVHNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BVHNodeKind::Leaf { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolumeHierarchy {
    nodes: Vec<BVHNode>,
}

struct BuildItem {
    triangle: Triangle,
    bounds: AABB,
    centroid: Vec3,
}

impl BoundingVolumeHierarchy {
    pub const ROOT: NodeIndex = 0;

    /// Top-down median split along the longest axis of the centroid bounds.
    /// A node becomes a leaf once it holds at most `max_triangles_per_leaf`
    /// triangles, or when all of its centroids coincide.
    #[tracing::instrument(skip_all, fields(tri_count = triangles.len()))]
    pub fn build(triangles: &[Triangle], max_triangles_per_leaf: usize) -> BoundingVolumeHierarchy {
        let max_triangles_per_leaf = max_triangles_per_leaf.max(1);
        let mut items: Vec<BuildItem> = triangles
            .iter()
            .map(|triangle| BuildItem {
                triangle: *triangle,
                bounds: triangle.bounds(),
                centroid: triangle.centroid(),
            })
            .collect();

        let mut nodes = Vec::with_capacity(2 * items.len().max(1));
        Self::build_node(&mut nodes, &mut items, 0, max_triangles_per_leaf);

        BoundingVolumeHierarchy { nodes }
    }

    fn build_node(
        nodes: &mut Vec<BVHNode>,
        items: &mut [BuildItem],
        depth: u32,
        max_triangles_per_leaf: usize,
    ) -> NodeIndex {
        let bounds = AABB::union_all(items.iter().map(|item| item.bounds)).unwrap_or_default();
        let index = nodes.len() as NodeIndex;

        let make_leaf = |items: &[BuildItem]| BVHNode {
            depth,
            bounds,
            kind: BVHNodeKind::Leaf {
                triangles: items.iter().map(|item| item.triangle).collect(),
            },
        };

        if items.len() <= max_triangles_per_leaf {
            nodes.push(make_leaf(&items[..]));
            return index;
        }

        let centroid_bounds = AABB::union_all(items.iter().map(|item| AABB::new(item.centroid, item.centroid)))
            .unwrap_or_default();
        let axis = centroid_bounds.longest_axis();
        if centroid_bounds.maximum.axis(axis) - centroid_bounds.minimum.axis(axis) <= 0.0 {
            // all centroids coincide, no split separates them
            nodes.push(make_leaf(&items[..]));
            return index;
        }

        let mid = items.len() / 2;
        items.select_nth_unstable_by(mid, |a, b| a.centroid.axis(axis).total_cmp(&b.centroid.axis(axis)));

        // placeholder, patched once both children exist
        nodes.push(BVHNode {
            depth,
            bounds,
            kind: BVHNodeKind::Tree { left: 0, right: 0 },
        });

        let (left_items, right_items) = items.split_at_mut(mid);
        let left = Self::build_node(nodes, left_items, depth + 1, max_triangles_per_leaf);
        let right = Self::build_node(nodes, right_items, depth + 1, max_triangles_per_leaf);
        nodes[index as usize].kind = BVHNodeKind::Tree { left, right };

        index
    }

    pub fn root(&self) -> &BVHNode {
        &self.nodes[Self::ROOT as usize]
    }

    pub fn node(&self, index: NodeIndex) -> &BVHNode {
        &self.nodes[index as usize]
    }

    pub fn nodes(&self) -> &[BVHNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    pub fn max_depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Node indices in pre-order: a node before its children, the whole left
    /// subtree before the right one.
    pub fn pre_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![Self::ROOT];
        while let Some(index) = stack.pop() {
            order.push(index);
            if let BVHNodeKind::Tree { left, right } = self.node(index).kind {
                stack.push(right);
                stack.push(left);
            }
        }
        order
    }

    /// Every triangle held by a leaf, in pre-order of the leaves
    pub fn triangles(&self) -> impl Iterator<Item = &Triangle> + '_ {
        self.pre_order()
            .into_iter()
            .filter_map(move |index| match &self.node(index).kind {
                BVHNodeKind::Leaf { triangles } => Some(triangles.iter()),
                BVHNodeKind::Tree { .. } => None,
            })
            .flatten()
    }

    /// Recursive reference traversal: calls `visit` on every leaf whose bounds
    /// (and all of whose ancestors' bounds) pass `hit`.
    pub fn visit_leaves<'a>(&'a self, hit: &mut impl FnMut(&AABB) -> bool, visit: &mut impl FnMut(&'a [Triangle])) {
        self.visit_from(Self::ROOT, hit, visit);
    }

    fn visit_from<'a>(
        &'a self,
        index: NodeIndex,
        hit: &mut impl FnMut(&AABB) -> bool,
        visit: &mut impl FnMut(&'a [Triangle]),
    ) {
        let node = self.node(index);
        if !hit(&node.bounds) {
            return;
        }
        match &node.kind {
            BVHNodeKind::Leaf { triangles } => visit(triangles),
            BVHNodeKind::Tree { left, right } => {
                self.visit_from(*left, hit, visit);
                self.visit_from(*right, hit, visit);
            }
        }
    }

    pub fn intersecting_leaves(&self, ray: Ray) -> Vec<&[Triangle]> {
        let mut leaves = Vec::new();
        self.visit_leaves(
            &mut |bounds| bounds.intersects(ray, 0.0, f32::INFINITY),
            &mut |triangles| leaves.push(triangles),
        );
        leaves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Vec2, Vertex};

    fn make_tri(cx: f32, cy: f32, cz: f32) -> Triangle {
        let n = Vec3(0.0, 0.0, 1.0);
        Triangle::new(
            Vertex::new(Vec3(cx - 0.5, cy - 0.5, cz), n, Vec2(0.0, 0.0)),
            Vertex::new(Vec3(cx + 0.5, cy - 0.5, cz), n, Vec2(1.0, 0.0)),
            Vertex::new(Vec3(cx, cy + 0.5, cz), n, Vec2(0.5, 1.0)),
        )
    }

    fn check_invariants(bvh: &BoundingVolumeHierarchy) {
        for node in bvh.nodes() {
            match &node.kind {
                BVHNodeKind::Leaf { triangles } => {
                    for tri in triangles {
                        assert!(node.bounds.contains(&tri.bounds()));
                    }
                }
                BVHNodeKind::Tree { left, right } => {
                    let (left, right) = (bvh.node(*left), bvh.node(*right));
                    assert_eq!(left.depth, node.depth + 1);
                    assert_eq!(right.depth, node.depth + 1);
                    assert_eq!(AABB::surrounding_box(left.bounds, right.bounds), node.bounds);
                }
            }
        }
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BoundingVolumeHierarchy::build(&[], 4);
        assert_eq!(bvh.node_count(), 1);
        assert!(bvh.root().is_leaf());
        assert_eq!(bvh.triangles().count(), 0);
    }

    #[test]
    fn test_small_mesh_is_single_leaf() {
        let tris = [make_tri(0.0, 0.0, 0.0), make_tri(1.0, 0.0, 0.0), make_tri(2.0, 0.0, 0.0)];
        let bvh = BoundingVolumeHierarchy::build(&tris, 4);
        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.root().depth, 0);
        assert_eq!(bvh.triangles().count(), 3);
    }

    #[test]
    fn test_many_triangles_builds_tree() {
        let tris: Vec<Triangle> = (0..100).map(|i| make_tri(i as f32 * 2.0, 0.0, 0.0)).collect();
        let bvh = BoundingVolumeHierarchy::build(&tris, 4);

        assert!(bvh.node_count() > 1);
        assert!(bvh.max_depth() >= 5);
        check_invariants(&bvh);

        // every triangle ends up in exactly one leaf
        let mut xs: Vec<f32> = bvh.triangles().map(|t| t.centroid().x()).collect();
        xs.sort_by(f32::total_cmp);
        let mut expected: Vec<f32> = tris.iter().map(|t| t.centroid().x()).collect();
        expected.sort_by(f32::total_cmp);
        assert_eq!(xs, expected);

        assert!(bvh.root().bounds.minimum.x() < 0.0);
        assert!(bvh.root().bounds.maximum.x() > 198.0);
    }

    #[test]
    fn test_arena_is_pre_order() {
        let tris: Vec<Triangle> = (0..37).map(|i| make_tri((i * 7 % 13) as f32, i as f32, 0.0)).collect();
        let bvh = BoundingVolumeHierarchy::build(&tris, 2);
        let expected: Vec<NodeIndex> = (0..bvh.node_count() as NodeIndex).collect();
        assert_eq!(bvh.pre_order(), expected);
    }

    #[test]
    fn test_coincident_centroids_stay_in_one_leaf() {
        let tris = vec![make_tri(1.0, 1.0, 1.0); 9];
        let bvh = BoundingVolumeHierarchy::build(&tris, 2);
        assert_eq!(bvh.node_count(), 1);
        assert_eq!(bvh.triangles().count(), 9);
    }

    #[test]
    fn test_ray_visits_only_overlapping_leaves() {
        let tris: Vec<Triangle> = (0..16).map(|i| make_tri(i as f32 * 4.0, 0.0, 0.0)).collect();
        let bvh = BoundingVolumeHierarchy::build(&tris, 1);
        let ray = Ray::new(Vec3(8.0, 0.0, -1.0), Vec3(0.0, 0.0, 1.0));
        let leaves = bvh.intersecting_leaves(ray);
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0][0].centroid().x(), 8.0);
    }
}

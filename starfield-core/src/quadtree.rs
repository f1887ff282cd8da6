//! Point quadtree used for per-frame neighbour queries.
//!
//! The tree is rebuilt from scratch every frame, so it only supports
//! insertion and rectangular range queries. Range queries are box tests;
//! callers prune by exact distance when they need a circular radius.

use crate::types::DotId;
use glam::Vec2;

/// Axis-aligned rectangle stored as centre plus half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub half: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    /// Square of half-size `radius` around `center`.
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(center, Vec2::splat(radius))
    }

    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(min + half, half)
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        !(b_min.x > a_max.x || b_max.x < a_min.x || b_min.y > a_max.y || b_max.y < a_min.y)
    }

    fn quadrants(&self) -> [Rect; 4] {
        let h = self.half * 0.5;
        let c = self.center;
        [
            Rect::new(Vec2::new(c.x - h.x, c.y - h.y), h), // NW
            Rect::new(Vec2::new(c.x + h.x, c.y - h.y), h), // NE
            Rect::new(Vec2::new(c.x - h.x, c.y + h.y), h), // SW
            Rect::new(Vec2::new(c.x + h.x, c.y + h.y), h), // SE
        ]
    }
}

/// A position tagged with the dot it was taken from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub pos: Vec2,
    pub id: DotId,
}

impl Point {
    pub fn new(pos: Vec2, id: DotId) -> Self {
        Self { pos, id }
    }
}

/// The capability the simulation phases need from a spatial index.
pub trait SpatialIndex {
    /// Returns `false` if the point lies outside the indexed area.
    fn insert(&mut self, point: Point) -> bool;

    /// Appends every inserted point inside `range` to `out`.
    fn query_into(&self, range: &Rect, out: &mut Vec<Point>);

    fn query(&self, range: &Rect) -> Vec<Point> {
        let mut out = Vec::new();
        self.query_into(range, &mut out);
        out
    }
}

#[derive(Debug)]
pub struct Quadtree {
    boundary: Rect,
    capacity: usize,
    depth: usize,
    max_depth: usize,
    points: Vec<Point>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub const DEFAULT_MAX_DEPTH: usize = 16;

    /// A `capacity` of zero is treated as one.
    pub fn new(boundary: Rect, capacity: usize) -> Self {
        Self::with_max_depth(boundary, capacity, Self::DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(boundary: Rect, capacity: usize, max_depth: usize) -> Self {
        Self::node(boundary, capacity.max(1), 0, max_depth)
    }

    fn node(boundary: Rect, capacity: usize, depth: usize, max_depth: usize) -> Self {
        Self {
            boundary,
            capacity,
            depth,
            max_depth,
            points: Vec::with_capacity(capacity),
            children: None,
        }
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Total number of points held by this node and its descendants.
    pub fn len(&self) -> usize {
        self.points.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(Quadtree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boundaries of every node, parents before children.
    pub fn boundaries(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        self.collect_boundaries(&mut out);
        out
    }

    fn collect_boundaries(&self, out: &mut Vec<Rect>) {
        out.push(self.boundary);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_boundaries(out);
            }
        }
    }

    fn subdivide(&mut self) {
        let [nw, ne, sw, se] = self.boundary.quadrants();
        let d = self.depth + 1;
        let (cap, max) = (self.capacity, self.max_depth);
        self.children = Some(Box::new([
            Quadtree::node(nw, cap, d, max),
            Quadtree::node(ne, cap, d, max),
            Quadtree::node(sw, cap, d, max),
            Quadtree::node(se, cap, d, max),
        ]));
    }
}

impl SpatialIndex for Quadtree {
    fn insert(&mut self, point: Point) -> bool {
        if !self.boundary.contains(point.pos) {
            return false;
        }

        if self.points.len() < self.capacity || self.depth >= self.max_depth {
            self.points.push(point);
            return true;
        }

        if self.children.is_none() {
            self.subdivide();
        }

        let Some(children) = self.children.as_mut() else {
            return false;
        };
        // Edges are shared between quadrants; the first child that accepts wins.
        for child in children.iter_mut() {
            if child.insert(point) {
                return true;
            }
        }

        // Only reachable through float rounding of the quadrant extents.
        self.points.push(point);
        true
    }

    fn query_into(&self, range: &Rect, out: &mut Vec<Point>) {
        if !self.boundary.intersects(range) {
            return;
        }

        out.extend(self.points.iter().filter(|p| range.contains(p.pos)).copied());

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(range, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use std::collections::HashSet;

    fn viewport_tree(w: f32, h: f32, capacity: usize) -> Quadtree {
        Quadtree::new(Rect::from_min_size(Vec2::ZERO, Vec2::new(w, h)), capacity)
    }

    fn random_points(n: usize, w: f32, h: f32, rng: &mut impl Rng) -> Vec<Point> {
        (0..n)
            .map(|id| {
                let pos = Vec2::new(rng.random_range(0.0..w), rng.random_range(0.0..h));
                Point::new(pos, id)
            })
            .collect()
    }

    fn ids(points: &[Point]) -> Vec<DotId> {
        let mut ids: Vec<DotId> = points.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::from_min_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(r.contains(Vec2::new(0.0, 0.0)));
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(5.0, 10.0)));
        assert!(!r.contains(Vec2::new(10.01, 5.0)));
        assert!(!r.contains(Vec2::new(5.0, -0.01)));
    }

    #[test]
    fn rect_intersects_touching_and_disjoint() {
        let a = Rect::from_min_size(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let touching = Rect::from_min_size(Vec2::new(10.0, 0.0), Vec2::new(5.0, 5.0));
        let disjoint = Rect::from_min_size(Vec2::new(20.0, 20.0), Vec2::new(5.0, 5.0));
        let inside = Rect::around(Vec2::new(5.0, 5.0), 1.0);

        assert!(a.intersects(&touching));
        assert!(a.intersects(&inside));
        assert!(inside.intersects(&a));
        assert!(!a.intersects(&disjoint));
    }

    #[test]
    fn insert_outside_root_is_rejected() {
        let mut tree = viewport_tree(100.0, 100.0, 4);
        assert!(!tree.insert(Point::new(Vec2::new(-1.0, 50.0), 0)));
        assert!(!tree.insert(Point::new(Vec2::new(50.0, 100.5), 1)));
        assert!(tree.insert(Point::new(Vec2::new(100.0, 100.0), 2)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn overflow_subdivides() {
        let mut tree = viewport_tree(100.0, 100.0, 2);
        assert_eq!(tree.boundaries().len(), 1);

        for (id, p) in [(10.0, 10.0), (90.0, 10.0), (10.0, 90.0)].into_iter().enumerate() {
            assert!(tree.insert(Point::new(Vec2::new(p.0, p.1), id)));
        }

        assert_eq!(tree.boundaries().len(), 5);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn query_matches_brute_force_for_any_capacity() {
        let mut rng = StdRng::seed_from_u64(7);
        let (w, h) = (800.0, 600.0);

        for capacity in [1, 2, 4, 16] {
            let pts = random_points(300, w, h, &mut rng);
            let mut tree = viewport_tree(w, h, capacity);
            for p in &pts {
                assert!(tree.insert(*p));
            }

            for _ in 0..50 {
                let center = Vec2::new(
                    rng.random_range(-50.0..w + 50.0),
                    rng.random_range(-50.0..h + 50.0),
                );
                let half = Vec2::new(rng.random_range(1.0..200.0), rng.random_range(1.0..200.0));
                let range = Rect::new(center, half);

                let expected: Vec<Point> = pts
                    .iter()
                    .filter(|p| range.contains(p.pos))
                    .copied()
                    .collect();
                assert_eq!(
                    ids(&tree.query(&range)),
                    ids(&expected),
                    "capacity {capacity}, range {range:?}"
                );
            }
        }
    }

    #[test]
    fn insertion_order_does_not_change_results() {
        let mut rng = StdRng::seed_from_u64(11);
        let pts = random_points(200, 400.0, 400.0, &mut rng);

        let mut forward = viewport_tree(400.0, 400.0, 4);
        let mut backward = viewport_tree(400.0, 400.0, 4);
        for p in &pts {
            forward.insert(*p);
        }
        for p in pts.iter().rev() {
            backward.insert(*p);
        }

        let range = Rect::new(Vec2::new(150.0, 220.0), Vec2::new(90.0, 60.0));
        assert_eq!(ids(&forward.query(&range)), ids(&backward.query(&range)));
    }

    #[test]
    fn full_viewport_query_returns_every_point_once() {
        let mut rng = StdRng::seed_from_u64(1920);
        let (w, h) = (1920.0, 1080.0);
        let mut tree = viewport_tree(w, h, 4);

        for p in random_points(500, w, h, &mut rng) {
            assert!(tree.insert(p));
        }

        let found = tree.query(&Rect::from_min_size(Vec2::ZERO, Vec2::new(w, h)));
        assert_eq!(found.len(), 500);
        let unique: HashSet<DotId> = found.iter().map(|p| p.id).collect();
        assert_eq!(unique.len(), 500);
    }

    #[test]
    fn coincident_points_stop_at_max_depth() {
        let mut tree = Quadtree::with_max_depth(
            Rect::from_min_size(Vec2::ZERO, Vec2::new(100.0, 100.0)),
            1,
            6,
        );
        for id in 0..50 {
            assert!(tree.insert(Point::new(Vec2::new(33.0, 33.0), id)));
        }

        assert_eq!(tree.len(), 50);
        assert_eq!(tree.query(&Rect::around(Vec2::new(33.0, 33.0), 0.5)).len(), 50);
    }

    #[test]
    fn points_on_quadrant_edges_are_found_once() {
        let mut tree = viewport_tree(100.0, 100.0, 1);
        let on_edges = [(50.0, 50.0), (50.0, 10.0), (10.0, 50.0), (50.0, 90.0), (90.0, 50.0)];
        for (id, (x, y)) in on_edges.into_iter().enumerate() {
            assert!(tree.insert(Point::new(Vec2::new(x, y), id)));
        }

        let all = tree.query(&Rect::from_min_size(Vec2::ZERO, Vec2::splat(100.0)));
        assert_eq!(ids(&all), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_capacity_behaves_like_one() {
        let mut tree = viewport_tree(10.0, 10.0, 0);
        assert!(tree.insert(Point::new(Vec2::new(1.0, 1.0), 0)));
        assert!(tree.insert(Point::new(Vec2::new(9.0, 9.0), 1)));
        assert_eq!(tree.len(), 2);
    }
}

//! Exact vertex deduplication.
//!
//! STL stores every corner of every triangle separately. [`VertexTable`]
//! collapses corners with identical coordinates into a single vertex, numbering
//! them in order of first appearance so repeated runs on the same input produce
//! the same indices.

use std::collections::HashMap;

use nalgebra::Point3;

use super::{Triangle, VertexId};

/// Hashable key for a position under exact value equality.
///
/// `-0.0` and `0.0` compare equal as floats, so both map to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PointKey([u64; 3]);

impl PointKey {
    fn new(p: &Point3<f64>) -> Self {
        // Adding +0.0 turns -0.0 into +0.0 and leaves every other value alone.
        PointKey([(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()])
    }
}

/// Insertion-ordered bijection between distinct positions and [`VertexId`]s.
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    positions: Vec<Point3<f64>>,
    lookup: HashMap<PointKey, VertexId>,
}

impl VertexTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the ID of `p`, inserting it if it has not been seen yet.
    pub fn insert(&mut self, p: Point3<f64>) -> VertexId {
        let next = VertexId::new(self.positions.len());
        let id = *self.lookup.entry(PointKey::new(&p)).or_insert(next);
        if id == next {
            self.positions.push(p);
        }
        id
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, id: VertexId) -> Point3<f64> {
        self.positions[id.index()]
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions in index order.
    pub fn as_slice(&self) -> &[Point3<f64>] {
        &self.positions
    }
}

/// Deduplicate the corners of a triangle soup.
///
/// Returns the vertex table together with the index triple of every triangle,
/// in input order. Corners are visited triangle by triangle, so vertex IDs
/// follow first appearance.
pub fn deduplicate(triangles: &[Triangle]) -> (VertexTable, Vec<[VertexId; 3]>) {
    let mut table = VertexTable::new();
    let faces = triangles
        .iter()
        .map(|tri| tri.vertices.map(|p| table.insert(p)))
        .collect();
    (table, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Triangle> {
        vec![
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ),
        ]
    }

    #[test]
    fn test_first_occurrence_order() {
        let (table, faces) = deduplicate(&unit_square());

        assert_eq!(table.len(), 4);
        assert_eq!(faces[0], [VertexId::new(0), VertexId::new(1), VertexId::new(2)]);
        assert_eq!(faces[1], [VertexId::new(0), VertexId::new(2), VertexId::new(3)]);
        assert_eq!(table.position(VertexId::new(3)), Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_deterministic() {
        let (a, fa) = deduplicate(&unit_square());
        let (b, fb) = deduplicate(&unit_square());
        assert_eq!(a.as_slice(), b.as_slice());
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_exact_equality() {
        let mut table = VertexTable::new();
        let a = table.insert(Point3::new(0.1, 0.2, 0.3));
        let b = table.insert(Point3::new(0.1, 0.2, 0.3 + 1e-12));
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let mut table = VertexTable::new();
        let a = table.insert(Point3::new(0.0, 1.0, 0.0));
        let b = table.insert(Point3::new(-0.0, 1.0, -0.0));
        assert_eq!(a, b);
        assert_eq!(table.insert(Point3::new(-0.0, 1.0, 0.0)), a);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty() {
        let (table, faces) = deduplicate(&[]);
        assert!(table.is_empty());
        assert!(faces.is_empty());
    }
}

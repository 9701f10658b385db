//! Triangle soup representation.

use std::ops::Index;

use nalgebra::Point3;

/// A triangle given by its three corner positions, in input winding order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner positions.
    pub vertices: [Point3<f64>; 3],
}

impl Triangle {
    /// Create a triangle from three corners.
    pub fn new(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }

    /// Iterate over the corners.
    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.vertices.iter()
    }
}

impl Index<usize> for Triangle {
    type Output = Point3<f64>;

    #[inline]
    fn index(&self, i: usize) -> &Point3<f64> {
        &self.vertices[i]
    }
}

impl<'a> IntoIterator for &'a Triangle {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<[Point3<f64>; 3]> for Triangle {
    fn from(vertices: [Point3<f64>; 3]) -> Self {
        Self { vertices }
    }
}

//! Coordinate axes and axis-aligned bounding boxes.

use std::fmt;

use nalgebra::{Point3, Vector3};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All axes in ascending order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two remaining axes, in ascending order.
    ///
    /// For a plane whose normal is `self`, these span the plane and become the
    /// U and V directions of its texture rectangle.
    #[inline]
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::X, Axis::Z],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Component-wise minimum corner.
    pub min: Point3<f64>,
    /// Component-wise maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// A box containing the single point `p`.
    pub fn from_point(p: Point3<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points<'a, It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(*iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`.
    pub fn extend(&mut self, p: &Point3<f64>) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    /// Size along each axis.
    #[inline]
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Size along a single axis.
    #[inline]
    pub fn extent_along(&self, axis: Axis) -> f64 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    /// Axes along which the box is exactly flat.
    pub fn zero_axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|&a| self.extent_along(a) == 0.0)
            .collect()
    }

    /// The flat axis, if exactly one axis has zero extent.
    pub fn flat_axis(&self) -> Option<Axis> {
        match self.zero_axes().as_slice() {
            [axis] => Some(*axis),
            _ => None,
        }
    }
}

//! Index types for mesh elements.
//!
//! Triangles, vertices and polygon groups are all addressed by position in
//! their owning list. The wrappers here keep those positions from being mixed
//! up with each other.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Create an ID from a zero-based position.
            ///
            /// # Panics
            /// Panics in debug builds if `index` does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "index {} too large for u32", index);
                Self(index as u32)
            }

            /// Zero-based position.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// One-based position, as used by OBJ records.
            #[inline]
            pub fn one_based(self) -> usize {
                self.0 as usize + 1
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $label, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(id: $name) -> usize {
                id.index()
            }
        }
    };
}

define_id!(
    /// Identifies a deduplicated vertex in a [`VertexTable`](super::VertexTable).
    VertexId,
    "V"
);

define_id!(
    /// Identifies a triangle by its position in the input.
    TriangleId,
    "T"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based() {
        let v = VertexId::new(0);
        assert_eq!(v.index(), 0);
        assert_eq!(v.one_based(), 1);
        assert_eq!(usize::from(VertexId::new(41)), 41);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", VertexId::new(7)), "V(7)");
        assert_eq!(format!("{:?}", TriangleId::new(2)), "T(2)");
        assert_eq!(format!("{}", TriangleId::new(2)), "2");
    }

    #[test]
    fn test_ordering() {
        assert!(TriangleId::new(1) < TriangleId::new(2));
    }
}

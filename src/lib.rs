//! # Flatpack
//!
//! Converts triangulated STL solids into textured OBJ meshes with a packed UV
//! atlas.
//!
//! Flat faces built from several triangles are detected and merged, and each
//! merged face gets its own rectangle in a single square texture. The output
//! keeps the original triangles; merging only decides which triangles share a
//! rectangle.
//!
//! ## Features
//!
//! - **Exact vertex deduplication** in first-appearance order
//! - **Coplanar grouping** of edge-adjacent triangles
//! - **Greedy atlas packing** into a power-of-two square
//! - **ASCII and binary STL** input, OBJ output with `v`/`vt`/`f` records
//!
//! ## Quick Start
//!
//! ```no_run
//! use flatpack::prelude::*;
//!
//! let mesh = convert_file("hull.stl", "hull.obj", &ConvertOptions::default()).unwrap();
//! println!("{0} x {0}", mesh.atlas_side);
//! ```
//!
//! ## Working in Memory
//!
//! ```
//! use flatpack::prelude::*;
//! use nalgebra::Point3;
//!
//! let triangles = vec![
//!     Triangle::new(
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!     ),
//!     Triangle::new(
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ),
//! ];
//!
//! let mesh = convert_triangles(&triangles, &ConvertOptions::default()).unwrap();
//! assert_eq!(mesh.groups.len(), 1);
//! assert_eq!(mesh.atlas_side, 16);
//!
//! let obj = flatpack::io::obj::render(&mesh);
//! assert_eq!(obj.lines().filter(|l| l.starts_with("f ")).count(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod convert;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use flatpack::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::coplanar::PolygonGroup;
    pub use crate::algo::pack::{Atlas, PlacementCost, Rect};
    pub use crate::algo::{Progress, Stage};
    pub use crate::convert::{
        convert_file, convert_str, convert_triangles, ConvertOptions, ConvertStats, TexturedMesh,
    };
    pub use crate::error::{ConvertError, Result};
    pub use crate::mesh::{Aabb, Axis, Triangle, TriangleId, VertexId, VertexTable};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

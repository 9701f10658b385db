//! Core mesh data structures.
//!
//! The converter works on a plain triangle soup rather than a connected mesh:
//! adjacency is discovered on the fly by comparing deduplicated vertex IDs.
//!
//! # Overview
//!
//! - [`Triangle`] holds three corner positions in input order.
//! - [`VertexTable`] maps distinct positions to compact [`VertexId`]s.
//! - [`Aabb`] and [`Axis`] describe the extent and orientation of flat regions.
//!
//! ```
//! use flatpack::mesh::{deduplicate, Triangle};
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
//! let (table, faces) = deduplicate(&triangles);
//! assert_eq!(table.len(), 4);
//! assert_eq!(faces.len(), 2);
//! ```

mod bounds;
mod index;
mod triangle;
mod vertex_table;

pub use bounds::{Aabb, Axis};
pub use index::{TriangleId, VertexId};
pub use triangle::Triangle;
pub use vertex_table::{deduplicate, VertexTable};

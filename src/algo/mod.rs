//! Conversion algorithms.
//!
//! - **Coplanar grouping**: merge edge-adjacent triangles lying in one plane
//! - **Atlas packing**: greedy, deterministic rectangle placement
//! - **UV projection**: map each group's plane into its atlas rectangle
//!
//! Each stage consumes the output of the previous one; see
//! [`crate::convert`] for the full pipeline.

pub mod coplanar;
pub mod pack;
pub mod progress;
pub mod project;

pub use progress::{Progress, Stage};

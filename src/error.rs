//! Error types for flatpack.
//!
//! Every stage of the conversion reports failures through [`ConvertError`].
//! None of them are recoverable: the pipeline stops and no output is written.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::Axis;

/// Result type alias using [`ConvertError`].
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while converting a mesh.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The input mesh file does not exist.
    #[error("input mesh not found: {path}")]
    InputNotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A triangle corner has a NaN or infinite coordinate.
    #[error("triangle {triangle} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Input position of the offending triangle.
        triangle: usize,
    },

    /// The mesh contains no triangles, so there is nothing to lay out.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A coplanar group does not have exactly one flat axis.
    #[error("group {group} is not an axis-aligned planar polygon ({zero_axes} zero-extent axes)")]
    MalformedGroup {
        /// Index of the offending group.
        group: usize,
        /// How many bounding box axes had zero extent.
        zero_axes: usize,
    },

    /// A group's atlas rectangle rounded to an unusable size.
    #[error("group {group} maps to an invalid {width}x{height} texel rectangle")]
    InvalidRectangle {
        /// Index of the offending group.
        group: usize,
        /// Computed width in texels.
        width: i64,
        /// Computed height in texels.
        height: i64,
    },

    /// No free spot was found for a rectangle inside the scan window.
    #[error("no free atlas position for group {group}")]
    NoPlacement {
        /// Index of the offending group.
        group: usize,
    },

    /// The packed rectangles reach past the largest power-of-two side.
    #[error("packed atlas extent {extent} texels has no power-of-two side")]
    AtlasTooLarge {
        /// Far corner of the packed rectangles, in texels.
        extent: u32,
    },

    /// The UV map for a group would divide by a zero extent.
    #[error("group {group} has zero extent along {axis}, cannot project UVs")]
    DegenerateProjection {
        /// Index of the offending group.
        group: usize,
        /// The axis whose extent is zero.
        axis: Axis,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl ConvertError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        ConvertError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a load error for `path`.
    pub fn load<P: Into<PathBuf>, M: Into<String>>(path: P, message: M) -> Self {
        ConvertError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }
}

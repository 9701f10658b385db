//! Coplanar triangle grouping.
//!
//! Two triangles are merged when they share an edge (exactly two vertices) and
//! the four distinct corners they span are coplanar. Merging is transitive, so
//! a flat face tessellated into many triangles ends up as one group.
//!
//! Groups live in a plain list indexed by position. When a merge joins two
//! existing groups, the absorbed group is removed from the list and every group
//! behind it moves down one slot. The resulting group order (and the member
//! order inside each group) determines the atlas layout and the order faces are
//! written in, so it is part of the output contract.
//!
//! # Example
//!
//! ```
//! use flatpack::algo::coplanar::group_coplanar;
//! use flatpack::algo::Progress;
//! use flatpack::mesh::{deduplicate, Axis, Triangle};
//! use nalgebra::Point3;
//!
//! let triangles = vec![
//!     Triangle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0)),
//!     Triangle::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0)),
//! ];
//! let (table, faces) = deduplicate(&triangles);
//!
//! let groups = group_coplanar(&table, &faces, 1e-4, &Progress::none()).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].flat_axis(), Axis::Z);
//! ```

use nalgebra::{Matrix3, Point3};
use tracing::{debug, info, instrument};

use crate::error::{ConvertError, Result};
use crate::mesh::{Aabb, Axis, TriangleId, VertexId, VertexTable};

use super::progress::{Progress, Stage};

/// Default tolerance on the determinant of the edge vectors.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// A set of edge-connected coplanar triangles forming one flat polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGroup {
    triangles: Vec<TriangleId>,
    bounds: Aabb,
    flat_axis: Axis,
}

impl PolygonGroup {
    /// Member triangles, in merge order.
    pub fn triangles(&self) -> &[TriangleId] {
        &self.triangles
    }

    /// Bounding box of all member corners.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// The axis along which the group is flat (its normal direction).
    pub fn flat_axis(&self) -> Axis {
        self.flat_axis
    }

    /// Number of member triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Always false for groups produced by [`group_coplanar`].
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Determinant of the three edge vectors from `p[0]` to the other points.
///
/// This is six times the signed volume of the tetrahedron spanned by the four
/// points; it is zero when they are coplanar.
pub fn edge_determinant(p: &[Point3<f64>; 4]) -> f64 {
    let m = Matrix3::from_columns(&[p[1] - p[0], p[2] - p[0], p[3] - p[0]]);
    m.determinant()
}

/// Whether four points lie in one plane within `tolerance`.
pub fn is_coplanar(p: &[Point3<f64>; 4], tolerance: f64) -> bool {
    edge_determinant(p).abs() < tolerance
}

/// Distinct vertices shared by two triangles.
fn shared_vertices(a: &[VertexId; 3], b: &[VertexId; 3]) -> usize {
    let mut seen: Vec<VertexId> = Vec::with_capacity(3);
    for v in a {
        if b.contains(v) && !seen.contains(v) {
            seen.push(*v);
        }
    }
    seen.len()
}

/// The four distinct corners of two edge-adjacent triangles, if there are four.
fn quad_corners(a: &[VertexId; 3], b: &[VertexId; 3]) -> Option<[VertexId; 4]> {
    let mut corners: Vec<VertexId> = Vec::with_capacity(4);
    for v in a.iter().chain(b) {
        if !corners.contains(v) {
            corners.push(*v);
        }
    }
    corners.try_into().ok()
}

/// Whether triangles `a` and `b` should be merged into one polygon.
pub fn can_merge(
    vertices: &VertexTable,
    a: &[VertexId; 3],
    b: &[VertexId; 3],
    tolerance: f64,
) -> bool {
    if shared_vertices(a, b) != 2 {
        return false;
    }
    match quad_corners(a, b) {
        Some(quad) => is_coplanar(&quad.map(|v| vertices.position(v)), tolerance),
        None => false,
    }
}

/// Partition triangles into coplanar, edge-connected groups.
///
/// `faces` holds the vertex IDs of every triangle in input order. Pairs
/// `(i, j)` with `i < j` are visited in order; a triangle that has not been
/// claimed by an earlier group opens a new one when the outer loop reaches it.
///
/// # Errors
///
/// Returns [`ConvertError::MalformedGroup`] if a finished group does not have
/// exactly one zero-extent bounding box axis.
#[instrument(skip_all, fields(triangles = faces.len()))]
pub fn group_coplanar(
    vertices: &VertexTable,
    faces: &[[VertexId; 3]],
    tolerance: f64,
    progress: &Progress,
) -> Result<Vec<PolygonGroup>> {
    let n = faces.len();
    let mut owner: Vec<Option<usize>> = vec![None; n];
    let mut members: Vec<Vec<usize>> = Vec::new();

    for i in 0..n {
        progress.report(Stage::Grouping, i, n);

        if owner[i].is_none() {
            owner[i] = Some(members.len());
            members.push(vec![i]);
        }

        for j in (i + 1)..n {
            // Re-read every time: absorbing a group can shift i's slot.
            let Some(target) = owner[i] else { continue };
            if owner[j] == Some(target) {
                continue;
            }
            if !can_merge(vertices, &faces[i], &faces[j], tolerance) {
                continue;
            }

            match owner[j] {
                None => {
                    owner[j] = Some(target);
                    members[target].push(j);
                }
                Some(removed) => {
                    debug!(into = target, from = removed, "merging groups");
                    let absorbed = std::mem::take(&mut members[removed]);
                    for &t in &absorbed {
                        owner[t] = Some(target);
                    }
                    members[target].extend(absorbed);
                    members.remove(removed);
                    for group in &members[removed..] {
                        for &t in group {
                            if let Some(slot) = owner[t].as_mut() {
                                *slot -= 1;
                            }
                        }
                    }
                }
            }
        }
    }
    progress.report(Stage::Grouping, n, n);

    let groups = members
        .into_iter()
        .enumerate()
        .map(|(g, tris)| build_group(g, tris, vertices, faces))
        .collect::<Result<Vec<_>>>()?;

    info!(groups = groups.len(), "grouped coplanar triangles");
    Ok(groups)
}

fn build_group(
    index: usize,
    tris: Vec<usize>,
    vertices: &VertexTable,
    faces: &[[VertexId; 3]],
) -> Result<PolygonGroup> {
    let corners: Vec<Point3<f64>> = tris
        .iter()
        .flat_map(|&t| faces[t].iter().map(|&v| vertices.position(v)))
        .collect();
    let bounds = Aabb::from_points(&corners).ok_or(ConvertError::MalformedGroup {
        group: index,
        zero_axes: 3,
    })?;

    let flat_axis = bounds
        .flat_axis()
        .ok_or_else(|| ConvertError::MalformedGroup {
            group: index,
            zero_axes: bounds.zero_axes().len(),
        })?;

    Ok(PolygonGroup {
        triangles: tris.into_iter().map(TriangleId::new).collect(),
        bounds,
        flat_axis,
    })
}

//! Planar UV projection into the packed atlas.
//!
//! Each group is flattened by dropping its flat axis. The remaining two
//! coordinates are mapped linearly from the group's bounding box onto its atlas
//! rectangle and divided by the atlas side, giving UVs in `[0, 1]`.
//!
//! UVs are produced per triangle corner, not per vertex: a vertex on the edge
//! of a box belongs to several faces that each land in a different rectangle.

use nalgebra::{Point2, Point3};
use tracing::{info, instrument};

use crate::error::{ConvertError, Result};
use crate::mesh::{Aabb, Axis, TriangleId, VertexId};

use super::coplanar::PolygonGroup;
use super::pack::{Atlas, Rect};
use super::progress::{Progress, Stage};

/// Linear map from a group's plane onto normalized atlas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarMap {
    axes: [Axis; 2],
    base: [f64; 2],
    scale: [f64; 2],
    offset: [f64; 2],
    side: f64,
}

impl PlanarMap {
    /// Build the map taking `bounds` onto `rect` in an atlas of `side` texels.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::DegenerateProjection`] if the box has zero
    /// extent along either in-plane axis.
    pub fn new(group: usize, bounds: &Aabb, flat_axis: Axis, rect: &Rect, side: u32) -> Result<Self> {
        let axes = flat_axis.others();
        let size_uv = [f64::from(rect.width), f64::from(rect.height)];
        let mut base = [0.0; 2];
        let mut scale = [0.0; 2];

        for k in 0..2 {
            let extent = bounds.extent_along(axes[k]);
            if extent == 0.0 {
                return Err(ConvertError::DegenerateProjection {
                    group,
                    axis: axes[k],
                });
            }
            base[k] = bounds.min[axes[k].index()];
            scale[k] = size_uv[k] / extent;
        }

        Ok(Self {
            axes,
            base,
            scale,
            offset: [f64::from(rect.x), f64::from(rect.y)],
            side: f64::from(side),
        })
    }

    /// Texture coordinate of a point on the plane.
    #[inline]
    pub fn apply(&self, p: &Point3<f64>) -> Point2<f64> {
        let uv = |k: usize| {
            ((p[self.axes[k].index()] - self.base[k]) * self.scale[k] + self.offset[k]) / self.side
        };
        Point2::new(uv(0), uv(1))
    }
}

/// Per-corner UVs and the faces that reference them.
///
/// `faces[n]` and `uvs[3n..3n + 3]` describe the same triangle. Faces are in
/// group order, then member order, so they generally differ from input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// One UV per emitted triangle corner.
    pub uvs: Vec<Point2<f64>>,
    /// Vertex IDs of each emitted triangle.
    pub faces: Vec<[VertexId; 3]>,
    /// Input position of each emitted triangle.
    pub sources: Vec<TriangleId>,
}

impl Projection {
    /// Number of emitted triangles.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// One-based UV indices of emitted triangle `n`.
    #[inline]
    pub fn uv_indices(n: usize) -> [usize; 3] {
        [3 * n + 1, 3 * n + 2, 3 * n + 3]
    }
}

/// Project every group's triangles into its atlas rectangle.
///
/// `positions` and `faces` are the deduplicated vertex positions and per-input
/// triangle vertex IDs. `atlas.rects()` must line up with `groups`.
///
/// # Errors
///
/// Returns [`ConvertError::DegenerateProjection`] for a group with a zero
/// in-plane extent.
#[instrument(skip_all, fields(groups = groups.len(), side = atlas.side()))]
pub fn project_groups(
    positions: &[Point3<f64>],
    faces: &[[VertexId; 3]],
    groups: &[PolygonGroup],
    atlas: &Atlas,
    progress: &Progress,
) -> Result<Projection> {
    let mut out = Projection {
        uvs: Vec::with_capacity(faces.len() * 3),
        faces: Vec::with_capacity(faces.len()),
        sources: Vec::with_capacity(faces.len()),
    };

    for (g, (group, rect)) in groups.iter().zip(atlas.rects()).enumerate() {
        progress.report(Stage::Projecting, g, groups.len());
        let map = PlanarMap::new(g, group.bounds(), group.flat_axis(), rect, atlas.side())?;

        for &tri in group.triangles() {
            let face = faces[tri.index()];
            out.uvs
                .extend(face.iter().map(|v| map.apply(&positions[v.index()])));
            out.faces.push(face);
            out.sources.push(tri);
        }
    }
    progress.report(Stage::Projecting, groups.len(), groups.len());

    info!(faces = out.len(), uvs = out.uvs.len(), "projected UVs");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::coplanar::{group_coplanar, DEFAULT_TOLERANCE};
    use crate::algo::pack::{pack_groups, PlacementCost};
    use crate::mesh::{deduplicate, Triangle};

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    fn run(triangles: &[Triangle]) -> (Atlas, Projection) {
        let progress = Progress::none();
        let (table, faces) = deduplicate(triangles);
        let groups = group_coplanar(&table, &faces, DEFAULT_TOLERANCE, &progress).unwrap();
        let atlas = pack_groups(&groups, 16, PlacementCost::Chebyshev, &progress).unwrap();
        let projection =
            project_groups(table.as_slice(), &faces, &groups, &atlas, &progress).unwrap();
        (atlas, projection)
    }

    #[test]
    fn test_unit_square_fills_atlas() {
        let (atlas, projection) = run(&[
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)),
        ]);
        assert_eq!(atlas.side(), 16);
        assert_eq!(
            projection.uvs,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_excluded_axis_drops_coordinate() {
        // A square in the plane x = 2 maps (y, z) onto (u, v).
        let (_, projection) = run(&[
            Triangle::new(p(2.0, 0.0, 0.0), p(2.0, 1.0, 0.0), p(2.0, 1.0, 1.0)),
            Triangle::new(p(2.0, 0.0, 0.0), p(2.0, 1.0, 1.0), p(2.0, 0.0, 1.0)),
        ]);
        assert_eq!(projection.uvs[1], Point2::new(1.0, 0.0));
        assert_eq!(projection.uvs[5], Point2::new(0.0, 1.0));
    }

    #[test]
    fn test_uvs_fall_inside_rectangles() {
        // Two squares in different planes sharing an edge.
        let (atlas, projection) = run(&[
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)),
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)),
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)),
            Triangle::new(p(0.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)),
        ]);
        assert_eq!(atlas.rects().len(), 2);
        assert_eq!(atlas.side(), 32);
        assert_eq!(projection.len(), 4);

        let side = f64::from(atlas.side());
        for (n, rect) in [atlas.rects()[0], atlas.rects()[0], atlas.rects()[1], atlas.rects()[1]]
            .iter()
            .enumerate()
        {
            for uv in &projection.uvs[3 * n..3 * n + 3] {
                let (u, v) = (uv.x * side, uv.y * side);
                assert!(u >= f64::from(rect.x) && u <= f64::from(rect.right()));
                assert!(v >= f64::from(rect.y) && v <= f64::from(rect.top()));
            }
        }
    }

    #[test]
    fn test_degenerate_extent_is_reported() {
        let bounds = Aabb {
            min: p(0.0, 0.0, 0.0),
            max: p(1.0, 0.0, 0.0),
        };
        let rect = Rect::new(0, 0, 16, 16);
        let err = PlanarMap::new(4, &bounds, Axis::Z, &rect, 16).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::DegenerateProjection { group: 4, axis: Axis::Y }
        ));
    }

    #[test]
    fn test_uv_indices() {
        assert_eq!(Projection::uv_indices(0), [1, 2, 3]);
        assert_eq!(Projection::uv_indices(2), [7, 8, 9]);
    }
}

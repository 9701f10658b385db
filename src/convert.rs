//! The STL → OBJ conversion pipeline.
//!
//! [`convert_triangles`] runs the in-memory stages in order:
//!
//! 1. deduplicate vertices ([`crate::mesh::deduplicate`])
//! 2. merge coplanar triangles ([`crate::algo::coplanar`])
//! 3. pack one rectangle per group ([`crate::algo::pack`])
//! 4. project UVs ([`crate::algo::project`])
//!
//! [`convert_file`] wraps it with STL loading and OBJ saving. Output is only
//! written once every stage has succeeded.
//!
//! # Example
//!
//! ```no_run
//! use flatpack::convert::{convert_file, ConvertOptions};
//!
//! let mesh = convert_file("hull.stl", "hull.obj", &ConvertOptions::default()).unwrap();
//! println!("{0} x {0}", mesh.atlas_side);
//! ```

use std::path::Path;

use nalgebra::{Point2, Point3};
use tracing::{info, instrument};

use crate::algo::coplanar::{group_coplanar, PolygonGroup, DEFAULT_TOLERANCE};
use crate::algo::pack::{pack_groups, PlacementCost, Rect, DEFAULT_TEXEL_DENSITY};
use crate::algo::progress::Progress;
use crate::algo::project::project_groups;
use crate::error::{ConvertError, Result};
use crate::io::{obj, stl};
use crate::mesh::{deduplicate, Triangle, TriangleId, VertexId};

/// Options for the conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Texels per world unit when sizing atlas rectangles.
    pub texel_density: u32,

    /// Maximum absolute edge determinant for four points to count as coplanar.
    pub coplanar_tolerance: f64,

    /// How the packer ranks free positions.
    pub placement_cost: PlacementCost,

    /// Progress callback.
    pub progress: Progress,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            texel_density: DEFAULT_TEXEL_DENSITY,
            coplanar_tolerance: DEFAULT_TOLERANCE,
            placement_cost: PlacementCost::default(),
            progress: Progress::none(),
        }
    }
}

impl ConvertOptions {
    /// Set the texel density.
    pub fn with_texel_density(mut self, density: u32) -> Self {
        self.texel_density = density;
        self
    }

    /// Set the coplanarity tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.coplanar_tolerance = tolerance;
        self
    }

    /// Set the placement cost.
    pub fn with_placement_cost(mut self, cost: PlacementCost) -> Self {
        self.placement_cost = cost;
        self
    }

    /// Set the progress callback.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.texel_density == 0 {
            return Err(ConvertError::invalid_param(
                "texel_density",
                self.texel_density,
                "must be at least 1",
            ));
        }
        if !self.coplanar_tolerance.is_finite() || self.coplanar_tolerance <= 0.0 {
            return Err(ConvertError::invalid_param(
                "coplanar_tolerance",
                self.coplanar_tolerance,
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// A converted mesh, ready to be written as OBJ.
#[derive(Debug, Clone)]
pub struct TexturedMesh {
    /// Distinct vertex positions in first-appearance order.
    pub vertices: Vec<Point3<f64>>,
    /// One UV per face corner; face `n` uses `uvs[3n..3n + 3]`.
    pub uvs: Vec<Point2<f64>>,
    /// Faces in group order.
    pub faces: Vec<[VertexId; 3]>,
    /// Input triangle behind each face.
    pub sources: Vec<TriangleId>,
    /// The coplanar groups.
    pub groups: Vec<PolygonGroup>,
    /// Atlas rectangle of each group, in texels.
    pub rects: Vec<Rect>,
    /// Atlas side length in texels (a power of two).
    pub atlas_side: u32,
    /// Fraction of the atlas covered by rectangles.
    pub fill_ratio: f64,
}

/// Summary numbers for a conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertStats {
    /// Number of triangles (input and output).
    pub triangles: usize,
    /// Number of distinct vertices.
    pub vertices: usize,
    /// Number of coplanar groups.
    pub groups: usize,
    /// Atlas side length in texels.
    pub atlas_side: u32,
    /// Fraction of the atlas covered by rectangles.
    pub fill_ratio: f64,
}

impl TexturedMesh {
    /// Summary numbers.
    pub fn stats(&self) -> ConvertStats {
        ConvertStats {
            triangles: self.faces.len(),
            vertices: self.vertices.len(),
            groups: self.groups.len(),
            atlas_side: self.atlas_side,
            fill_ratio: self.fill_ratio,
        }
    }
}

/// Convert a triangle soup.
///
/// # Errors
///
/// - [`ConvertError::InvalidParameter`] for unusable options
/// - [`ConvertError::EmptyMesh`] if there are no triangles
/// - [`ConvertError::NonFiniteCoordinate`] if a corner is NaN or infinite
/// - [`ConvertError::MalformedGroup`], [`ConvertError::InvalidRectangle`] or
///   [`ConvertError::DegenerateProjection`] if the geometry is not made of
///   axis-aligned flat faces large enough to get a texel
#[instrument(skip_all, fields(triangles = triangles.len()))]
pub fn convert_triangles(triangles: &[Triangle], options: &ConvertOptions) -> Result<TexturedMesh> {
    options.validate()?;
    if triangles.is_empty() {
        return Err(ConvertError::EmptyMesh);
    }
    if let Some(triangle) = triangles
        .iter()
        .position(|t| t.iter().any(|p| p.iter().any(|c| !c.is_finite())))
    {
        return Err(ConvertError::NonFiniteCoordinate { triangle });
    }

    let (table, faces) = deduplicate(triangles);
    info!(vertices = table.len(), "deduplicated vertices");

    let groups = group_coplanar(&table, &faces, options.coplanar_tolerance, &options.progress)?;
    let atlas = pack_groups(
        &groups,
        options.texel_density,
        options.placement_cost,
        &options.progress,
    )?;
    let projection = project_groups(table.as_slice(), &faces, &groups, &atlas, &options.progress)?;

    let mesh = TexturedMesh {
        vertices: table.as_slice().to_vec(),
        uvs: projection.uvs,
        faces: projection.faces,
        sources: projection.sources,
        groups,
        rects: atlas.rects().to_vec(),
        atlas_side: atlas.side(),
        fill_ratio: atlas.fill_ratio(),
    };

    let stats = mesh.stats();
    info!(
        triangles = stats.triangles,
        vertices = stats.vertices,
        groups = stats.groups,
        side = stats.atlas_side,
        fill = stats.fill_ratio,
        "conversion complete"
    );
    Ok(mesh)
}

/// Convert ASCII STL text.
///
/// # Errors
///
/// As [`convert_triangles`], plus [`ConvertError::LoadError`] for a trailing
/// partial triangle.
pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<TexturedMesh> {
    let triangles =
        stl::parse_ascii(text).map_err(|message| ConvertError::load("<memory>", message))?;
    convert_triangles(&triangles, options)
}

/// Convert an STL file and save the result as OBJ.
///
/// Nothing is written unless the whole conversion succeeds.
///
/// # Errors
///
/// Any loading, conversion or writing error.
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> Result<TexturedMesh> {
    let triangles = stl::load(input)?;
    let mesh = convert_triangles(&triangles, options)?;
    obj::save(&mesh, output)?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Axis;

    const SQUARE: &str = "\
solid square
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 0 0
vertex 1 1 0
endloop
endfacet
facet normal 0 0 1
outer loop
vertex 0 0 0
vertex 1 1 0
vertex 0 1 0
endloop
endfacet
endsolid square
";

    #[test]
    fn test_square_end_to_end() {
        let mesh = convert_str(SQUARE, &ConvertOptions::default()).unwrap();
        assert_eq!(mesh.groups.len(), 1);
        assert_eq!(mesh.rects, vec![Rect::new(0, 0, 16, 16)]);
        assert_eq!(mesh.atlas_side, 16);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.uvs.len(), 6);
        assert_eq!(mesh.faces.len(), 2);

        let stats = mesh.stats();
        assert_eq!(stats.fill_ratio, 1.0);
        assert_eq!(stats.groups, 1);
    }

    #[test]
    fn test_density_changes_side() {
        let options = ConvertOptions::default().with_texel_density(20);
        let mesh = convert_str(SQUARE, &options).unwrap();
        assert_eq!(mesh.rects[0], Rect::new(0, 0, 20, 20));
        assert_eq!(mesh.atlas_side, 32);
    }

    #[test]
    fn test_faces_follow_group_order() {
        // Triangle 1 is on a different plane; triangle 2 completes the floor.
        let text = "\
vertex 0 0 0
vertex 1 0 0
vertex 1 1 0
vertex 0 0 0
vertex 1 0 0
vertex 1 0 1
vertex 0 0 0
vertex 1 1 0
vertex 0 1 0
";
        let mesh = convert_str(text, &ConvertOptions::default()).unwrap();
        let sources: Vec<usize> = mesh.sources.iter().map(|t| t.index()).collect();
        assert_eq!(sources, vec![0, 2, 1]);
        assert_eq!(mesh.groups[1].flat_axis(), Axis::Y);
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let err = convert_str("solid nothing\nendsolid nothing\n", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyMesh));
    }

    #[test]
    fn test_tiny_face_rejected() {
        // 0.01 units at 16 texels per unit rounds to zero texels.
        let text = "\
vertex 0 0 0
vertex 0.01 0 0
vertex 0.01 0.01 0
";
        let err = convert_str(text, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidRectangle { group: 0, .. }));
    }

    #[test]
    fn test_non_finite_corner_rejected() {
        let triangles = [
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(f64::NAN, 1.0, 0.0),
            ),
        ];
        let err = convert_triangles(&triangles, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::NonFiniteCoordinate { triangle: 1 }));
    }

    #[test]
    fn test_nan_vertex_line_never_reaches_the_uvs() {
        // The NaN record is skipped, leaving one valid triangle.
        let text = "vertex 0 0 0\nvertex 1 0 0\nvertex NaN 1 0\nvertex 1 1 0\n";
        let mesh = convert_str(text, &ConvertOptions::default()).unwrap();
        assert_eq!(mesh.faces.len(), 1);
        assert!(mesh.uvs.iter().all(|uv| uv.x.is_finite() && uv.y.is_finite()));
    }

    #[test]
    fn test_invalid_options() {
        let opts = ConvertOptions::default().with_texel_density(0);
        assert!(matches!(
            opts.validate(),
            Err(ConvertError::InvalidParameter { name: "texel_density", .. })
        ));
        let opts = ConvertOptions::default().with_tolerance(f64::NAN);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_convert_file_writes_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.stl");
        let output = dir.path().join("bad.obj");
        // A tilted triangle has no flat axis.
        std::fs::write(&input, "vertex 0 0 0\nvertex 1 0 0\nvertex 0 1 1\n").unwrap();

        let err = convert_file(&input, &output, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MalformedGroup { group: 0, zero_axes: 0 }));
        assert!(!output.exists());
    }
}

//! STL (stereolithography) input.
//!
//! ASCII files are scanned line by line for `vertex X Y Z` records; every three
//! records make one triangle and everything else (`facet normal`, `outer loop`,
//! blank lines, stray text) is ignored. A `solid` header is not required.
//! Binary files are decoded with `stl_io`.
//!
//! Coordinates must be finite. A text record with `nan` or `inf` is skipped like
//! any other malformed record; a binary file containing one fails to load.
//!
//! Triangles keep the order they appear in the file.

use std::io::Cursor;
use std::path::Path;

use nalgebra::Point3;
use tracing::{debug, info, instrument, warn};

use crate::error::{ConvertError, Result};
use crate::mesh::Triangle;

/// Binary STL header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one binary triangle record: normal, three corners, attribute word.
const RECORD_SIZE: u64 = 50;

/// STL flavour, decided from the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Text with `solid` / `facet` / `vertex` records.
    Ascii,
    /// 80-byte header, triangle count and packed little-endian records.
    Binary,
}

impl Encoding {
    /// Detect the encoding of `bytes`.
    ///
    /// A file is binary when its length is exactly the header, the count word
    /// and `count` records. The `solid` keyword is not trusted: CAD exporters
    /// write it into binary headers too, and text files may omit it.
    /// Everything else is read as text.
    pub fn detect(bytes: &[u8]) -> Encoding {
        let expected = binary_triangle_count(bytes)
            .map(|count| HEADER_SIZE as u64 + 4 + RECORD_SIZE * u64::from(count));
        if expected == Some(bytes.len() as u64) {
            Encoding::Binary
        } else {
            Encoding::Ascii
        }
    }
}

/// The little-endian triangle count following the binary header, if present.
fn binary_triangle_count(bytes: &[u8]) -> Option<u32> {
    let word = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// Load triangles from an STL file.
///
/// # Errors
///
/// - [`ConvertError::InputNotFound`] if the file does not exist
/// - [`ConvertError::Io`] if it cannot be read
/// - [`ConvertError::LoadError`] if the content cannot be decoded or the
///   vertex count is not a multiple of three
///
/// An ASCII file without any vertex records loads as an empty list.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Triangle>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConvertError::InputNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConvertError::Io(e)
        }
    })?;

    let encoding = Encoding::detect(&bytes);
    debug!(?encoding, bytes = bytes.len(), "read STL");

    let triangles = match encoding {
        Encoding::Ascii => parse_ascii(&String::from_utf8_lossy(&bytes)),
        Encoding::Binary => parse_binary(&bytes),
    }
    .map_err(|message| ConvertError::load(path, message))?;

    info!(triangles = triangles.len(), "loaded STL");
    Ok(triangles)
}

/// Parse ASCII STL text.
///
/// Lines whose first token is not `vertex`, or which lack three parseable
/// numbers after it, are skipped without advancing the triangle cursor.
///
/// # Errors
///
/// Returns a message if the number of vertex records is not a multiple of
/// three.
pub fn parse_ascii(text: &str) -> std::result::Result<Vec<Triangle>, String> {
    let mut triangles = Vec::new();
    let mut pending: Vec<Point3<f64>> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let Some(p) = parse_vertex_line(line) else {
            if line.trim_start().starts_with("vertex") {
                warn!(line = line_no + 1, "skipping malformed vertex record");
            }
            continue;
        };
        pending.push(p);
        if pending.len() == 3 {
            triangles.push(Triangle::new(pending[0], pending[1], pending[2]));
            pending.clear();
        }
    }

    if !pending.is_empty() {
        return Err(format!(
            "{} trailing vertex record(s) do not form a triangle",
            pending.len()
        ));
    }
    Ok(triangles)
}

/// Parse one `vertex X Y Z` record. Tokens after the third number are ignored.
fn parse_vertex_line(line: &str) -> Option<Point3<f64>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "vertex" {
        return None;
    }
    let x = tokens.next()?.parse().ok()?;
    let y = tokens.next()?.parse().ok()?;
    let z = tokens.next()?.parse().ok()?;
    let p: Point3<f64> = Point3::new(x, y, z);
    is_finite(&p).then_some(p)
}

fn is_finite(p: &Point3<f64>) -> bool {
    p.iter().all(|c| c.is_finite())
}

/// Parse binary STL bytes.
///
/// # Errors
///
/// Returns the decoder's message if the data is truncated or malformed, or if
/// a corner has a non-finite coordinate.
pub fn parse_binary(bytes: &[u8]) -> std::result::Result<Vec<Triangle>, String> {
    let mut cursor = Cursor::new(bytes);
    let stl = stl_io::read_stl(&mut cursor).map_err(|e| e.to_string())?;

    let corner = |i: usize| {
        let v = &stl.vertices[i];
        Point3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
    };

    stl.faces
        .iter()
        .enumerate()
        .map(|(n, face)| {
            let tri = Triangle::new(
                corner(face.vertices[0]),
                corner(face.vertices[1]),
                corner(face.vertices[2]),
            );
            if tri.iter().all(is_finite) {
                Ok(tri)
            } else {
                Err(format!("triangle {} has a non-finite coordinate", n))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_parse_ascii_square() {
        let tris = parse_ascii(SQUARE).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0][1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(tris[1][2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_malformed_lines_do_not_advance() {
        let text = "\
vertex 0 0 0
vertex 1 nope 0
vertex 1 0 0
vertexx 5 5 5
\tvertex 1.5e0 1 0 extra
";
        let tris = parse_ascii(text).unwrap();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0][2], Point3::new(1.5, 1.0, 0.0));
    }

    #[test]
    fn test_no_vertices_is_empty() {
        assert!(parse_ascii("solid empty\nendsolid empty\n").unwrap().is_empty());
        assert!(parse_ascii("").unwrap().is_empty());
    }

    #[test]
    fn test_trailing_vertices_rejected() {
        let err = parse_ascii("vertex 0 0 0\nvertex 1 0 0\n").unwrap_err();
        assert!(err.contains("2 trailing"));
    }

    /// Binary STL with the given header text and one record per corner triple.
    fn binary_stl(header: &[u8], corners: &[[f32; 9]]) -> Vec<u8> {
        let mut bytes = vec![b' '; HEADER_SIZE];
        bytes[..header.len()].copy_from_slice(header);
        bytes.extend_from_slice(&(corners.len() as u32).to_le_bytes());
        for tri in corners {
            for f in [0.0f32, 0.0, 1.0].iter().chain(tri) {
                bytes.extend_from_slice(&f.to_le_bytes());
            }
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }
        bytes
    }

    const HALF_SQUARE: [[f32; 9]; 2] = [
        [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
    ];

    #[test]
    fn test_detect_encoding() {
        assert_eq!(Encoding::detect(SQUARE.as_bytes()), Encoding::Ascii);
        assert_eq!(Encoding::detect(b"vertex 0 0 0\n"), Encoding::Ascii);
        assert_eq!(Encoding::detect(b""), Encoding::Ascii);
        assert_eq!(Encoding::detect(&[1u8; 84]), Encoding::Ascii);

        assert_eq!(Encoding::detect(&binary_stl(b"", &[])), Encoding::Binary);
        assert_eq!(
            Encoding::detect(&binary_stl(b"solid exported by cad", &HALF_SQUARE)),
            Encoding::Binary
        );

        // One byte short of the declared record count.
        let mut short = binary_stl(b"", &HALF_SQUARE);
        short.pop();
        assert_eq!(Encoding::detect(&short), Encoding::Ascii);
    }

    #[test]
    fn test_parse_binary() {
        let tris = parse_binary(&binary_stl(b"", &[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0]]))
            .unwrap();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0][2], Point3::new(0.5, 1.0, 0.0));
    }

    #[test]
    fn test_parse_binary_rejects_nan() {
        let bytes = binary_stl(b"", &[[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, f32::NAN, 1.0, 0.0]]);
        let err = parse_binary(&bytes).unwrap_err();
        assert!(err.contains("non-finite"));
    }

    #[test]
    fn test_non_finite_vertex_lines_are_skipped() {
        let text = "\
vertex 0 0 0
vertex 1 0 0
vertex NaN 1 0
vertex 1 inf 0
vertex 1 1 0
";
        let tris = parse_ascii(text).unwrap();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0][2], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_load_headerless_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.stl");
        std::fs::write(
            &path,
            "vertex 0 0 0\nvertex 1 0 0\nvertex 1 1 0\nvertex 0 0 0\nvertex 1 1 0\nvertex 0 1 0\n",
        )
        .unwrap();

        let tris = load(&path).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[1][2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_load_text_without_vertices_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.stl");
        std::fs::write(&path, "just some notes\nno geometry here\n").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_binary_with_solid_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cad.stl");
        std::fs::write(&path, binary_stl(b"solid exported by cad", &HALF_SQUARE)).unwrap();

        let tris = load(&path).unwrap();
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0][2], Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/definitely/not/here.stl").unwrap_err();
        assert!(matches!(err, ConvertError::InputNotFound { .. }));
    }
}

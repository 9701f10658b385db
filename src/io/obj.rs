//! Wavefront OBJ output.
//!
//! The writer emits three record kinds:
//!
//! ```text
//! v x y z                  one per deduplicated vertex
//! vt u v                   one per emitted triangle corner
//! f v1/vt1 v2/vt2 v3/vt3   one per triangle
//! ```
//!
//! Numbers use Rust's shortest round-trip `Display` form, so whole values have
//! no fractional part (`0`, not `0.0`) and small values are never written in
//! exponent form (`0.0000001`, not `1e-7`). Any OBJ reader accepts both.
//!
//! The whole file is rendered in memory first and written in one call, so a
//! failed conversion never leaves a half-written OBJ behind.

use std::fmt::Write as _;
use std::path::Path;

use tracing::{info, instrument};

use crate::convert::TexturedMesh;
use crate::error::Result;

/// Render `mesh` as OBJ text.
pub fn render(mesh: &TexturedMesh) -> String {
    let mut out = String::with_capacity(
        mesh.vertices.len() * 32 + mesh.uvs.len() * 24 + mesh.faces.len() * 32,
    );

    // Writing into a String cannot fail.
    for p in &mesh.vertices {
        let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
    }
    for uv in &mesh.uvs {
        let _ = writeln!(out, "vt {} {}", uv.x, uv.y);
    }
    for (n, face) in mesh.faces.iter().enumerate() {
        let [t0, t1, t2] = crate::algo::project::Projection::uv_indices(n);
        let _ = writeln!(
            out,
            "f {}/{} {}/{} {}/{}",
            face[0].one_based(),
            t0,
            face[1].one_based(),
            t1,
            face[2].one_based(),
            t2
        );
    }
    out
}

/// Save `mesh` as an OBJ file.
///
/// # Errors
///
/// Returns [`ConvertError::Io`](crate::error::ConvertError::Io) if the file
/// cannot be written.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save<P: AsRef<Path>>(mesh: &TexturedMesh, path: P) -> Result<()> {
    let text = render(mesh);
    std::fs::write(path.as_ref(), text.as_bytes())?;
    info!(bytes = text.len(), "wrote OBJ");
    Ok(())
}

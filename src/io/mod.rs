//! Mesh file I/O.
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | STL | `.stl` | ✓ | ✗ | ASCII and binary |
//! | Wavefront OBJ | `.obj` | ✗ | ✓ | Vertices, UVs and faces |
//!
//! The command-line tool takes a base name and derives both paths from it:
//!
//! ```
//! use flatpack::io::paths_for;
//! use std::path::Path;
//!
//! let (input, output) = paths_for("models/hull");
//! assert_eq!(input, Path::new("models/hull.stl"));
//! assert_eq!(output, Path::new("models/hull.obj"));
//! ```

pub mod obj;
pub mod stl;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) input.
    Stl,
    /// Wavefront OBJ output.
    Obj,
}

impl Format {
    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Stl => "stl",
            Format::Obj => "obj",
        }
    }

    /// Append this format's extension to `base`.
    ///
    /// Unlike [`Path::with_extension`] this never replaces an existing dot
    /// suffix, so `part.v2` becomes `part.v2.stl`.
    pub fn path_for<P: AsRef<Path>>(self, base: P) -> PathBuf {
        let mut name = OsString::from(base.as_ref().as_os_str());
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }
}

/// Input STL and output OBJ paths for a base name without extension.
pub fn paths_for<P: AsRef<Path>>(base: P) -> (PathBuf, PathBuf) {
    let base = base.as_ref();
    (Format::Stl.path_for(base), Format::Obj.path_for(base))
}

//! Progress reporting for the conversion stages.
//!
//! Grouping is quadratic in the triangle count and packing scans a window that
//! grows with the atlas, so both report how far along they are. Callers pass a
//! [`Progress`] through [`ConvertOptions`](crate::convert::ConvertOptions).
//!
//! # Example
//!
//! ```
//! use flatpack::algo::progress::{Progress, Stage};
//!
//! let progress = Progress::new(|stage, current, total| {
//!     eprintln!("{stage}: {current}/{total}");
//! });
//! progress.report(Stage::Grouping, 1, 10);
//! ```

use std::fmt;
use std::sync::Arc;

/// Pipeline stage a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Merging coplanar triangles.
    Grouping,
    /// Placing group rectangles in the atlas.
    Packing,
    /// Computing UV coordinates.
    Projecting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Stage::Grouping => "grouping",
            Stage::Packing => "packing",
            Stage::Projecting => "projecting",
        })
    }
}

type Callback = dyn Fn(Stage, usize, usize) + Send + Sync;

/// A progress callback that receives `(stage, current, total)` updates.
#[derive(Clone)]
pub struct Progress {
    callback: Arc<Callback>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Stage, usize, usize) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, stage: Stage, current: usize, total: usize) {
        (self.callback)(stage, current, total);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

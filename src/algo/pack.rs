//! Greedy texture atlas packing.
//!
//! Every polygon group gets an axis-aligned rectangle of texels sized from the
//! two in-plane extents of its bounding box. Rectangles are placed one at a time
//! in group order. For each one the packer scans candidate origins inside a
//! window derived from the extent packed so far and keeps the free origin with
//! the lowest [`PlacementCost`]; ties go to the earlier candidate in scan order
//! (x outer, y inner, both ascending).
//!
//! The result is deterministic but order dependent. It is a heuristic, not an
//! optimal packer.
//!
//! # Example
//!
//! ```
//! use flatpack::algo::pack::{AtlasPacker, PlacementCost};
//!
//! let mut packer = AtlasPacker::new(16, PlacementCost::Chebyshev);
//! let a = packer.place(0, 16, 16).unwrap();
//! let b = packer.place(1, 16, 16).unwrap();
//! assert!(!a.overlaps(&b));
//!
//! let atlas = packer.finish().unwrap();
//! assert_eq!(atlas.side(), 32);
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, instrument};

use crate::error::{ConvertError, Result};

use super::coplanar::PolygonGroup;
use super::progress::{Progress, Stage};

/// Default texels per world unit.
pub const DEFAULT_TEXEL_DENSITY: u32 = 16;

/// Cost used to choose between free candidate origins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementCost {
    /// `max(x, y)`: fills the atlas in growing squares.
    #[default]
    Chebyshev,
    /// Straight-line distance from the atlas origin.
    Euclidean,
}

impl PlacementCost {
    /// Cost of placing a rectangle at `(x, y)`.
    ///
    /// Both costs are at least `max(x, y)`, which lets the scan stop early.
    #[inline]
    pub fn cost(self, x: u32, y: u32) -> f64 {
        match self {
            PlacementCost::Chebyshev => f64::from(x.max(y)),
            PlacementCost::Euclidean => f64::from(x).hypot(f64::from(y)),
        }
    }
}

impl fmt::Display for PlacementCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlacementCost::Chebyshev => "chebyshev",
            PlacementCost::Euclidean => "euclidean",
        })
    }
}

impl FromStr for PlacementCost {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chebyshev" | "max" => Ok(PlacementCost::Chebyshev),
            "euclidean" | "distance" => Ok(PlacementCost::Euclidean),
            _ => Err(ConvertError::invalid_param(
                "placement_cost",
                s,
                "expected chebyshev or euclidean",
            )),
        }
    }
}

/// A reserved region of the atlas, in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: u32,
    /// Bottom edge.
    pub y: u32,
    /// Width along the first in-plane axis.
    pub width: u32,
    /// Height along the second in-plane axis.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive top edge.
    #[inline]
    pub fn top(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the interiors of two rectangles intersect.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        other.right() > self.x
            && other.x < self.right()
            && other.top() > self.y
            && other.y < self.top()
    }
}

/// Far corner of everything packed so far, in texels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedExtent {
    /// Largest right edge.
    pub max_x: u32,
    /// Largest top edge.
    pub max_y: u32,
}

impl PackedExtent {
    /// Grow the extent to include `rect`.
    pub fn include(self, rect: &Rect) -> Self {
        Self {
            max_x: self.max_x.max(rect.right()),
            max_y: self.max_y.max(rect.top()),
        }
    }
}

/// Places rectangles one by one without overlap.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    density: u32,
    cost: PlacementCost,
    rects: Vec<Rect>,
    extent: PackedExtent,
}

impl AtlasPacker {
    /// Create a packer.
    ///
    /// `density` is the number of texels per world unit. It also sets how far
    /// past the packed extent candidate origins are searched.
    pub fn new(density: u32, cost: PlacementCost) -> Self {
        Self {
            density,
            cost,
            rects: Vec::new(),
            extent: PackedExtent::default(),
        }
    }

    /// Rectangles placed so far.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Extent packed so far.
    pub fn extent(&self) -> PackedExtent {
        self.extent
    }

    /// Texel size for a group, from the extents of its two in-plane axes.
    ///
    /// Sizes are rounded to the nearest texel, ties to even.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidRectangle`] if either side rounds to zero
    /// or less, or does not fit in a `u32`.
    pub fn rect_size(&self, index: usize, group: &PolygonGroup) -> Result<(u32, u32)> {
        let [u, v] = group.flat_axis().others();
        let scale = f64::from(self.density);
        let width = (group.bounds().extent_along(u) * scale).round_ties_even();
        let height = (group.bounds().extent_along(v) * scale).round_ties_even();

        let valid = |s: f64| s >= 1.0 && s <= f64::from(u32::MAX);
        if !valid(width) || !valid(height) {
            return Err(ConvertError::InvalidRectangle {
                group: index,
                width: width as i64,
                height: height as i64,
            });
        }
        Ok((width as u32, height as u32))
    }

    /// Find the best free origin for a `width` x `height` rectangle.
    ///
    /// Candidates cover `[0, max_x * density] x [0, max_y * density]`.
    pub fn find_origin(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let x_end = u64::from(self.extent.max_x) * u64::from(self.density);
        let y_end = u64::from(self.extent.max_y) * u64::from(self.density);
        let x_end = u32::try_from(x_end).unwrap_or(u32::MAX);
        let y_end = u32::try_from(y_end).unwrap_or(u32::MAX);

        let mut best: Option<((u32, u32), f64)> = None;
        for x in 0..=x_end {
            // Cost never drops below x, so nothing further right can win.
            if best.is_some_and(|(_, c)| f64::from(x) >= c) {
                break;
            }
            for y in 0..=y_end {
                let cost = self.cost.cost(x, y);
                if let Some((_, best_cost)) = best {
                    if f64::from(y) >= best_cost {
                        break;
                    }
                    if cost >= best_cost {
                        continue;
                    }
                }
                let candidate = Rect::new(x, y, width, height);
                if self.rects.iter().all(|r| !r.overlaps(&candidate)) {
                    best = Some(((x, y), cost));
                }
            }
        }
        best.map(|(origin, _)| origin)
    }

    /// Place a `width` x `height` rectangle for group `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::NoPlacement`] if the scan window has no free
    /// origin. That cannot happen once the first rectangle is down, since the
    /// column just right of the packed extent is always free.
    pub fn place(&mut self, index: usize, width: u32, height: u32) -> Result<Rect> {
        let (x, y) = self
            .find_origin(width, height)
            .ok_or(ConvertError::NoPlacement { group: index })?;
        let rect = Rect::new(x, y, width, height);
        self.rects.push(rect);
        self.extent = self.extent.include(&rect);
        debug!(group = index, x, y, width, height, "placed rectangle");
        Ok(rect)
    }

    /// Fix the atlas size.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::EmptyMesh`] if nothing was placed and
    /// [`ConvertError::AtlasTooLarge`] if the side would not fit in a `u32`.
    pub fn finish(self) -> Result<Atlas> {
        let far = self.extent.max_x.max(self.extent.max_y);
        if self.rects.is_empty() || far == 0 {
            return Err(ConvertError::EmptyMesh);
        }
        let side = far
            .checked_next_power_of_two()
            .ok_or(ConvertError::AtlasTooLarge { extent: far })?;
        Ok(Atlas {
            rects: self.rects,
            side,
        })
    }
}

/// Packed rectangles plus the square atlas that holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    rects: Vec<Rect>,
    side: u32,
}

impl Atlas {
    /// One rectangle per group, in group order.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Side length in texels; always a power of two.
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Fraction of the atlas area covered by rectangles.
    pub fn fill_ratio(&self) -> f64 {
        let used: f64 = self
            .rects
            .iter()
            .map(|r| f64::from(r.width) * f64::from(r.height))
            .sum();
        used / (f64::from(self.side) * f64::from(self.side))
    }
}

/// Pack one rectangle per group.
///
/// # Errors
///
/// Fails if a group's rectangle is empty ([`ConvertError::InvalidRectangle`])
/// or there are no groups ([`ConvertError::EmptyMesh`]).
#[instrument(skip_all, fields(groups = groups.len(), density = density, cost = %cost))]
pub fn pack_groups(
    groups: &[PolygonGroup],
    density: u32,
    cost: PlacementCost,
    progress: &Progress,
) -> Result<Atlas> {
    let mut packer = AtlasPacker::new(density, cost);
    for (index, group) in groups.iter().enumerate() {
        progress.report(Stage::Packing, index, groups.len());
        let (width, height) = packer.rect_size(index, group)?;
        packer.place(index, width, height)?;
    }
    progress.report(Stage::Packing, groups.len(), groups.len());

    let atlas = packer.finish()?;
    info!(side = atlas.side(), fill = atlas.fill_ratio(), "packed atlas");
    Ok(atlas)
}

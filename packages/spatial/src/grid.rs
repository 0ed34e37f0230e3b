//! Regular square-grid aggregation of projected points.
//!
//! The tiling covers the bounding box of the input points, snapped
//! outwards to cell-size multiples. Containment is half-open on both
//! axes: a point on a shared edge belongs to the cell whose minimum edge
//! it sits on, so every point lands in at most one cell. When the extreme
//! point sits exactly on the snapped upper edge the tiling is extended by
//! one cell so that point still has a home.

use geo::{Coord, Rect};
use serde::Serialize;
use strum_macros::Display;

/// Cell count above which a hotspot is classified as high.
const HIGH_COUNT: u64 = 10;

/// Hotspot classification for rendering consumers. Not stored on the
/// cell; derived from the count on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HotspotLevel {
    /// Non-zero count at or below the high threshold.
    Moderate,
    /// Count above the high threshold.
    High,
}

/// One cell of the aggregation grid.
///
/// Created fresh per aggregation call and never mutated after counts are
/// assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Axis-aligned cell rectangle in planar metres.
    pub bounds: Rect<f64>,
    /// Geometric center of the rectangle (not of the contained points).
    pub centroid: Coord<f64>,
    /// Number of points assigned to this cell.
    pub crime_count: u64,
}

impl GridCell {
    /// Classifies this cell for rendering. Zero-count cells are retained
    /// in the grid but are not hotspots.
    #[must_use]
    pub const fn hotspot_level(&self) -> Option<HotspotLevel> {
        if self.crime_count > HIGH_COUNT {
            Some(HotspotLevel::High)
        } else if self.crime_count > 0 {
            Some(HotspotLevel::Moderate)
        } else {
            None
        }
    }
}

/// Bins projected points into a regular grid of square cells with side
/// `cell_size`, covering the snapped bounding box of the input.
///
/// Cells are enumerated row-major (x outer, y inner) and returned
/// regardless of count. An empty input yields no cells.
#[must_use]
pub fn aggregate(points: &[Coord<f64>], cell_size: f64) -> Vec<GridCell> {
    if points.is_empty() {
        return Vec::new();
    }
    if cell_size <= 0.0 || !cell_size.is_finite() {
        log::warn!("Ignoring aggregation request with invalid cell size {cell_size}");
        return Vec::new();
    }

    let (min_x, max_x) = min_max(points.iter().map(|c| c.x));
    let (min_y, max_y) = min_max(points.iter().map(|c| c.y));

    let origin_x = (min_x / cell_size).floor() * cell_size;
    let origin_y = (min_y / cell_size).floor() * cell_size;
    let nx = axis_cells(origin_x, max_x, cell_size);
    let ny = axis_cells(origin_y, max_y, cell_size);

    let mut counts = vec![0_u64; nx * ny];
    for point in points {
        let ix = cell_index(point.x, origin_x, cell_size, nx);
        let iy = cell_index(point.y, origin_y, cell_size, ny);
        counts[ix * ny + iy] += 1;
    }

    let mut cells = Vec::with_capacity(nx * ny);
    for ix in 0..nx {
        for iy in 0..ny {
            #[allow(clippy::cast_precision_loss)]
            let min = Coord {
                x: (ix as f64).mul_add(cell_size, origin_x),
                y: (iy as f64).mul_add(cell_size, origin_y),
            };
            let max = Coord {
                x: min.x + cell_size,
                y: min.y + cell_size,
            };
            let bounds = Rect::new(min, max);
            cells.push(GridCell {
                bounds,
                centroid: bounds.center(),
                crime_count: counts[ix * ny + iy],
            });
        }
    }

    let hotspots = cells.iter().filter(|c| c.crime_count > 0).count();
    log::info!(
        "Aggregated {} points into {}x{} grid ({hotspots} hotspot cells)",
        points.len(),
        nx,
        ny,
    );

    cells
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Number of cells needed along one axis so the half-open tiling covers
/// every coordinate up to and including `max`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn axis_cells(origin: f64, max: f64, cell_size: f64) -> usize {
    let mut upper = (max / cell_size).ceil() * cell_size;
    if upper <= max {
        upper += cell_size;
    }
    (((upper - origin) / cell_size).round() as usize).max(1)
}

/// Half-open cell index along one axis, clamped against float rounding at
/// the extreme edge.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_index(value: f64, origin: f64, cell_size: f64, n: usize) -> usize {
    (((value - origin) / cell_size).floor() as usize).min(n - 1)
}

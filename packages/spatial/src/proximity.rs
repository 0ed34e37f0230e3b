//! Radius-bounded point selection.
//!
//! Builds an R-tree over the projected points, narrows candidates with an
//! envelope query, then applies the exact closed-disk test. Selection is
//! monotonic in the radius: growing the radius can only add points.

use geo::Coord;
use rstar::{AABB, RTree, primitives::GeomWithData};

/// Returns the indices of all points within the closed disk of `radius`
/// around `center`, in ascending index order.
///
/// A zero radius selects only points exactly at the center. An empty
/// result is valid output, not an error.
#[must_use]
pub fn within_radius(points: &[Coord<f64>], center: Coord<f64>, radius: f64) -> Vec<usize> {
    if points.is_empty() || radius < 0.0 {
        return Vec::new();
    }

    let entries: Vec<GeomWithData<[f64; 2], usize>> = points
        .iter()
        .enumerate()
        .map(|(i, c)| GeomWithData::new([c.x, c.y], i))
        .collect();
    let tree = RTree::bulk_load(entries);

    let envelope = AABB::from_corners(
        [center.x - radius, center.y - radius],
        [center.x + radius, center.y + radius],
    );
    let radius2 = radius * radius;

    let mut hits: Vec<usize> = tree
        .locate_in_envelope_intersecting(&envelope)
        .filter(|entry| {
            let [x, y] = *entry.geom();
            let dx = x - center.x;
            let dy = y - center.y;
            dx.mul_add(dx, dy * dy) <= radius2
        })
        .map(|entry| entry.data)
        .collect();
    hits.sort_unstable();
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> Vec<Coord<f64>> {
        vec![
            Coord { x: 1_100.0, y: 2_100.0 },
            Coord { x: 1_500.0, y: 2_900.0 },
            Coord { x: 1_999.0, y: 2_001.0 },
        ]
    }

    #[test]
    fn radius_covers_whole_cluster() {
        let hits = within_radius(&cluster(), Coord { x: 1_500.0, y: 2_500.0 }, 1_000.0);
        assert_eq!(hits, vec![0, 1, 2]);
    }

    #[test]
    fn zero_radius_selects_only_exact_matches() {
        let center = Coord { x: 1_500.0, y: 2_500.0 };
        assert!(within_radius(&cluster(), center, 0.0).is_empty());

        let mut points = cluster();
        points.push(center);
        assert_eq!(within_radius(&points, center, 0.0), vec![3]);
    }

    #[test]
    fn boundary_points_are_included() {
        let points = vec![Coord { x: 1_000.0, y: 0.0 }];
        let hits = within_radius(&points, Coord { x: 0.0, y: 0.0 }, 1_000.0);
        assert_eq!(hits, vec![0]);
    }

    #[test]
    fn monotonic_in_radius() {
        let points = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 300.0, y: 400.0 },
            Coord { x: 600.0, y: 800.0 },
            Coord { x: 3_000.0, y: 4_000.0 },
        ];
        let center = Coord { x: 0.0, y: 0.0 };

        let mut previous = Vec::new();
        for radius in [0.0, 500.0, 1_000.0, 5_000.0] {
            let hits = within_radius(&points, center, radius);
            assert!(
                previous.iter().all(|i| hits.contains(i)),
                "radius {radius} lost points from a smaller radius"
            );
            previous = hits;
        }
        assert_eq!(previous.len(), points.len());
    }

    #[test]
    fn empty_input_is_valid() {
        assert!(within_radius(&[], Coord { x: 0.0, y: 0.0 }, 100.0).is_empty());
    }
}

//! Polygon boolean operations
//!
//! Union is delegated to `geo::BooleanOps`. Results come back as `f64` and
//! are snapped to the integer grid (1 board unit, round half away from zero),
//! then cleaned: duplicate and collinear vertices are dropped, contours that
//! touch themselves at a vertex are split into separate loops, and loops with
//! fewer than 3 vertices or no area are discarded.

use std::collections::HashMap;

use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};

use super::outline::{Contour, Outline, PointLocation, PolygonWithHoles};
use super::types::{cross, Point};

impl Outline {
    /// Geometric union of two outlines
    pub fn boolean_add(&self, other: &Outline) -> Outline {
        let merged = to_geo(self).union(&to_geo(other));
        from_geo(&merged)
    }

    /// Resolves self-intersections and degenerate geometry
    pub fn simplify(&self) -> Outline {
        let repaired = to_geo(self).union(&MultiPolygon::<f64>::new(Vec::new()));
        from_geo(&repaired)
    }
}

fn contour_to_line_string(contour: &Contour) -> LineString<f64> {
    LineString::new(
        contour
            .points()
            .iter()
            .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
            .collect(),
    )
}

fn to_geo(outline: &Outline) -> MultiPolygon<f64> {
    MultiPolygon::new(
        outline
            .polygons()
            .iter()
            .filter(|poly| poly.outline.len() >= 3)
            .map(|poly| {
                Polygon::new(
                    contour_to_line_string(&poly.outline),
                    poly.holes
                        .iter()
                        .filter(|hole| hole.len() >= 3)
                        .map(contour_to_line_string)
                        .collect(),
                )
            })
            .collect(),
    )
}

fn from_geo(multi: &MultiPolygon<f64>) -> Outline {
    let mut result = Outline::new();

    for poly in &multi.0 {
        let exterior_loops = ring_loops(poly.exterior());
        let Some(dominant) = exterior_loops
            .iter()
            .max_by_key(|l| l.signed_area2().abs())
            .map(|l| l.signed_area2().signum())
        else {
            continue;
        };

        let mut outers = Vec::new();
        let mut holes = Vec::new();
        for contour in exterior_loops {
            // A pinched-off loop wound against the exterior is a hole
            if contour.signed_area2().signum() == dominant {
                outers.push(contour);
            } else {
                holes.push(contour);
            }
        }
        for interior in poly.interiors() {
            holes.extend(ring_loops(interior));
        }

        for polygon in assign_holes(outers, holes) {
            result.push(polygon);
        }
    }

    result
}

/// Snaps a ring to the grid and splits it at repeated vertices
fn ring_loops(ring: &LineString<f64>) -> Vec<Contour> {
    let mut points: Vec<Point> = ring
        .0
        .iter()
        .map(|c| Point::new(c.x.round() as i64, c.y.round() as i64))
        .collect();

    // geo rings repeat the first coordinate at the end
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let cleaned = remove_redundant_vertices(points);
    split_loops(cleaned)
        .into_iter()
        .map(remove_redundant_vertices)
        .filter(|pts| pts.len() >= 3)
        .map(Contour::new)
        .filter(|contour| contour.signed_area2() != 0)
        .collect()
}

/// Drops repeated and collinear vertices until none remain
fn remove_redundant_vertices(mut points: Vec<Point>) -> Vec<Point> {
    loop {
        let before = points.len();

        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        let n = points.len();
        if n < 3 {
            return points;
        }

        let keep: Vec<bool> = (0..n)
            .map(|i| {
                let prev = points[(i + n - 1) % n];
                let next = points[(i + 1) % n];
                cross(prev, points[i], next) != 0
            })
            .collect();
        points = points
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();

        if points.len() == before {
            return points;
        }
    }
}

/// Splits a closed vertex list into simple loops wherever a vertex repeats
fn split_loops(points: Vec<Point>) -> Vec<Vec<Point>> {
    let mut loops = Vec::new();
    let mut stack: Vec<Point> = Vec::with_capacity(points.len());
    let mut positions: HashMap<Point, usize> = HashMap::new();

    for p in points {
        if let Some(&pos) = positions.get(&p) {
            let tail = stack.split_off(pos + 1);
            for q in &tail {
                positions.remove(q);
            }
            let mut closed = Vec::with_capacity(tail.len() + 1);
            closed.push(p);
            closed.extend(tail);
            loops.push(closed);
        } else {
            positions.insert(p, stack.len());
            stack.push(p);
        }
    }

    loops.push(stack);
    loops
}

/// Pairs each hole with the outer contour that encloses it
fn assign_holes(outers: Vec<Contour>, holes: Vec<Contour>) -> Vec<PolygonWithHoles> {
    let mut polygons: Vec<PolygonWithHoles> = outers
        .into_iter()
        .map(|outer| PolygonWithHoles::new(orient(outer, true), Vec::new()))
        .collect();

    if polygons.is_empty() {
        return polygons;
    }

    for hole in holes {
        let index = if polygons.len() == 1 {
            0
        } else {
            find_enclosing(&polygons, &hole).unwrap_or(0)
        };
        polygons[index].holes.push(orient(hole, false));
    }

    polygons
}

fn find_enclosing(polygons: &[PolygonWithHoles], hole: &Contour) -> Option<usize> {
    let hole_box = hole.bbox()?;
    let candidates: Vec<usize> = polygons
        .iter()
        .enumerate()
        .filter(|(_, poly)| {
            poly.outline
                .bbox()
                .is_some_and(|b| b.contains_box(&hole_box))
        })
        .map(|(i, _)| i)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|&i| {
            hole.points()
                .iter()
                .any(|&p| polygons[i].outline.locate(p) == PointLocation::Inside)
        })
        .or_else(|| candidates.first().copied())
}

/// Outer contours counter-clockwise, holes clockwise
fn orient(mut contour: Contour, counter_clockwise: bool) -> Contour {
    if (contour.signed_area2() > 0) != counter_clockwise {
        contour.0.reverse();
    }
    contour
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Outline {
        Outline::rectangle(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_overlapping_squares_union() {
        let merged = square(0, 0, 10, 10).boolean_add(&square(5, 5, 15, 15));
        assert_eq!(merged.outline_count(), 1);
        assert_eq!(merged.area(), 175.0);
        assert_eq!(merged.corner_count(), 8);
    }

    #[test]
    fn test_disjoint_union_keeps_both() {
        let merged = square(0, 0, 10, 10).boolean_add(&square(100, 100, 110, 110));
        assert_eq!(merged.outline_count(), 2);
        assert_eq!(merged.area(), 200.0);
    }

    #[test]
    fn test_corner_touch_gives_two_outlines() {
        let merged = square(0, 0, 10, 10)
            .boolean_add(&square(10, 10, 20, 20))
            .simplify();
        assert_eq!(merged.outline_count(), 2);
        assert_eq!(merged.area(), 200.0);
    }

    #[test]
    fn test_enclosed_square_is_absorbed() {
        let merged = square(0, 0, 30, 30).boolean_add(&square(10, 10, 20, 20));
        assert_eq!(merged.outline_count(), 1);
        assert_eq!(merged.area(), 900.0);
    }

    #[test]
    fn test_frame_union_produces_hole() {
        // Four bars forming a closed frame around (10,10)-(20,20)
        let frame = square(0, 0, 30, 10)
            .boolean_add(&square(20, 0, 30, 30))
            .boolean_add(&square(0, 20, 30, 30))
            .boolean_add(&square(0, 0, 10, 30));
        assert_eq!(frame.outline_count(), 1);
        assert_eq!(frame.polygons()[0].holes.len(), 1);
        assert_eq!(frame.area(), 800.0);
        assert!(!frame.contains(Point::new(15, 15)));
    }

    #[test]
    fn test_simplify_splits_bow_tie() {
        let bow_tie = Outline::from_points([
            Point::new(0, 0),
            Point::new(10, 10),
            Point::new(10, 0),
            Point::new(0, 10),
        ]);
        let repaired = bow_tie.simplify();
        assert_eq!(repaired.outline_count(), 2);
        assert_eq!(repaired.area(), 50.0);
    }

    #[test]
    fn test_split_loops_at_pinch() {
        let pinched = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(20, 10),
            Point::new(20, 20),
            Point::new(10, 20),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        let loops = split_loops(pinched);
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.len() == 4));
    }

    #[test]
    fn test_collinear_vertices_removed() {
        let points = vec![
            Point::new(0, 0),
            Point::new(5, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(remove_redundant_vertices(points).len(), 4);
    }
}

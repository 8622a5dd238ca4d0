//! Border hatching for zone outlines
//!
//! Hatch lines run at 45 degrees, spaced `hatch_pitch` apart, and are clipped
//! to the outline with the even-odd rule so holes stay clear.

use std::f64::consts::SQRT_2;

use super::types::{HatchStyle, Zone};
use crate::geometry::{Point, Seg};

/// Upper bound on hatch lines per zone; the pitch is widened past this
const MAX_HATCH_LINES: i64 = 2000;

impl Zone {
    /// Recomputes the cached hatch segments from the current outline
    pub fn hatch_border(&mut self) {
        self.hatch_lines = compute_hatch(self);
    }

    /// Drops the cached hatch segments
    pub fn unhatch_border(&mut self) {
        self.hatch_lines.clear();
    }
}

fn compute_hatch(zone: &Zone) -> Vec<Seg> {
    if zone.hatch_style == HatchStyle::NoHatch || zone.hatch_pitch <= 0 {
        return Vec::new();
    }
    let Some(bbox) = zone.bbox() else {
        return Vec::new();
    };

    let edges: Vec<Seg> = zone.outline().segments_with_holes().collect();

    // Lines y = x + b; b spacing gives a perpendicular pitch of hatch_pitch
    let min_b = bbox.min.y.saturating_sub(bbox.max.x);
    let max_b = bbox.max.y.saturating_sub(bbox.min.x);
    let span = max_b as i128 - min_b as i128;
    let mut step = ((zone.hatch_pitch as f64) * SQRT_2).round().max(1.0) as i64;
    if span / step as i128 > MAX_HATCH_LINES as i128 {
        step = (span / MAX_HATCH_LINES as i128 + 1) as i64;
    }

    // Length of an edge hatch stroke, projected on x
    let edge_dx = zone.hatch_pitch as f64 / SQRT_2;

    let mut lines = Vec::new();
    let mut b = min_b.div_euclid(step) * step;
    while b <= max_b {
        let mut xs: Vec<f64> = edges
            .iter()
            .filter_map(|edge| crossing_x(edge, b))
            .collect();
        xs.sort_by(|a, c| a.total_cmp(c));

        for pair in xs.chunks_exact(2) {
            let (x0, x1) = (pair[0], pair[1]);
            if x1 - x0 < 1.0 {
                continue;
            }

            match zone.hatch_style {
                HatchStyle::DiagonalEdge if x1 - x0 > 2.0 * edge_dx => {
                    lines.push(diagonal(x0, x0 + edge_dx, b));
                    lines.push(diagonal(x1 - edge_dx, x1, b));
                }
                _ => lines.push(diagonal(x0, x1, b)),
            }
        }

        match b.checked_add(step) {
            Some(next) => b = next,
            None => break,
        }
    }

    lines
}

/// x where `edge` crosses the line y = x + b, half-open on the edge's end
fn crossing_x(edge: &Seg, b: i64) -> Option<f64> {
    let fa = edge.a.y as f64 - edge.a.x as f64 - b as f64;
    let fb = edge.b.y as f64 - edge.b.x as f64 - b as f64;
    if (fa > 0.0) == (fb > 0.0) {
        return None;
    }
    let t = fa / (fa - fb);
    Some(edge.a.x as f64 + t * (edge.b.x as f64 - edge.a.x as f64))
}

fn diagonal(x0: f64, x1: f64, b: i64) -> Seg {
    let p0 = Point::new(x0.round() as i64, (x0.round() as i64).saturating_add(b));
    let p1 = Point::new(x1.round() as i64, (x1.round() as i64).saturating_add(b));
    Seg::new(p0, p1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Contour, Outline};
    use crate::zones::types::{FillSettings, Layer};

    fn zone_with(outline: Outline, style: HatchStyle, pitch: i64) -> Zone {
        Zone::filled(1, Layer::F_CU, FillSettings::default(), outline).with_hatch(style, pitch)
    }

    #[test]
    fn test_full_hatch_stays_inside_bbox() {
        let mut zone = zone_with(
            Outline::rectangle(Point::new(0, 0), Point::new(100, 100)),
            HatchStyle::DiagonalFull,
            10,
        );
        zone.hatch_border();

        assert!(!zone.hatch_lines().is_empty());
        let bbox = zone.bbox().unwrap();
        for line in zone.hatch_lines() {
            assert!(bbox.contains_point(line.a));
            assert!(bbox.contains_point(line.b));
        }
    }

    #[test]
    fn test_hatch_on_huge_outline_is_capped() {
        let far = 1i64 << 60;
        let mut zone = zone_with(
            Outline::rectangle(Point::new(-far, -far), Point::new(far, far)),
            HatchStyle::DiagonalFull,
            crate::zones::types::DEFAULT_HATCH_PITCH,
        );
        zone.hatch_border();

        assert!(!zone.hatch_lines().is_empty());
        assert!(zone.hatch_lines().len() as i64 <= MAX_HATCH_LINES + 2);
    }

    #[test]
    fn test_no_hatch_style_is_empty() {
        let mut zone = zone_with(
            Outline::rectangle(Point::new(0, 0), Point::new(100, 100)),
            HatchStyle::NoHatch,
            10,
        );
        zone.hatch_border();
        assert!(zone.hatch_lines().is_empty());
    }

    #[test]
    fn test_edge_hatch_splits_long_lines() {
        let outline = Outline::rectangle(Point::new(0, 0), Point::new(1000, 1000));
        let mut full = zone_with(outline.clone(), HatchStyle::DiagonalFull, 50);
        let mut edge = zone_with(outline, HatchStyle::DiagonalEdge, 50);
        full.hatch_border();
        edge.hatch_border();
        assert!(edge.hatch_lines().len() > full.hatch_lines().len());
    }

    #[test]
    fn test_hatch_skips_holes() {
        let mut outline = Outline::rectangle(Point::new(0, 0), Point::new(100, 100));
        outline.add_hole(
            0,
            Contour::new(vec![
                Point::new(20, 20),
                Point::new(80, 20),
                Point::new(80, 80),
                Point::new(20, 80),
            ]),
        );
        let mut zone = zone_with(outline, HatchStyle::DiagonalFull, 10);
        zone.hatch_border();

        // The diagonal through the centre is cut in two by the hole
        let centre: Vec<&Seg> = zone
            .hatch_lines()
            .iter()
            .filter(|line| line.a.y - line.a.x == 0)
            .collect();
        assert_eq!(centre.len(), 2);
    }
}

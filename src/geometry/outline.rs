//! Polygon-with-holes outlines
//!
//! An [`Outline`] is an ordered list of polygons, each made of one outer
//! [`Contour`] and zero or more hole contours. Contours are implicitly closed.

use serde::{Deserialize, Serialize};

use super::types::{cross, BoundingBox, Point, Seg};

/// Where a point lies relative to a closed contour or polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    Outside,
    OnBoundary,
}

/// A closed vertex loop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contour(pub Vec<Point>);

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Edges including the closing edge
    pub fn segments(&self) -> impl Iterator<Item = Seg> + '_ {
        let n = if self.0.len() < 2 { 0 } else { self.0.len() };
        (0..n).map(move |i| Seg::new(self.0[i], self.0[(i + 1) % n]))
    }

    /// Twice the signed area; positive for counter-clockwise loops
    pub fn signed_area2(&self) -> i128 {
        let n = self.0.len();
        if n < 3 {
            return 0;
        }
        let origin = self.0[0];
        (1..n - 1)
            .map(|i| cross(origin, self.0[i], self.0[i + 1]))
            .sum()
    }

    pub fn area(&self) -> f64 {
        (self.signed_area2() as f64 / 2.0).abs()
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.0.iter().copied())
    }

    /// Even-odd location test with exact boundary detection
    pub fn locate(&self, p: Point) -> PointLocation {
        let mut inside = false;

        for seg in self.segments() {
            if seg.contains_point(p) {
                return PointLocation::OnBoundary;
            }

            let (a, b) = (seg.a, seg.b);
            if (a.y > p.y) != (b.y > p.y) {
                // Crossing lies to the right of p when p is left of an upward
                // edge or right of a downward edge
                let side = cross(a, b, p);
                let crosses = if b.y > a.y { side > 0 } else { side < 0 };
                if crosses {
                    inside = !inside;
                }
            }
        }

        if inside {
            PointLocation::Inside
        } else {
            PointLocation::Outside
        }
    }
}

/// One outer contour plus its holes
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolygonWithHoles {
    pub outline: Contour,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Contour>,
}

impl PolygonWithHoles {
    pub fn new(outline: Contour, holes: Vec<Contour>) -> Self {
        Self { outline, holes }
    }

    pub fn contours(&self) -> impl Iterator<Item = &Contour> + '_ {
        std::iter::once(&self.outline).chain(self.holes.iter())
    }

    /// Hole interiors are outside the polygon
    pub fn locate(&self, p: Point) -> PointLocation {
        match self.outline.locate(p) {
            PointLocation::Inside => {}
            other => return other,
        }

        for hole in &self.holes {
            match hole.locate(p) {
                PointLocation::Outside => {}
                PointLocation::Inside => return PointLocation::Outside,
                PointLocation::OnBoundary => return PointLocation::OnBoundary,
            }
        }

        PointLocation::Inside
    }

    pub fn area(&self) -> f64 {
        self.outline.area() - self.holes.iter().map(Contour::area).sum::<f64>()
    }
}

/// A set of polygons with holes, the geometry of one zone
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline {
    polygons: Vec<PolygonWithHoles>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single polygon without holes
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        Self {
            polygons: vec![PolygonWithHoles::new(
                Contour::new(points.into_iter().collect()),
                Vec::new(),
            )],
        }
    }

    /// Axis-aligned rectangle between two corners
    pub fn rectangle(min: Point, max: Point) -> Self {
        Self::from_points([
            min,
            Point::new(max.x, min.y),
            max,
            Point::new(min.x, max.y),
        ])
    }

    pub fn push(&mut self, polygon: PolygonWithHoles) {
        self.polygons.push(polygon);
    }

    /// Adds a hole to the polygon at `index`
    pub fn add_hole(&mut self, index: usize, hole: Contour) {
        if let Some(polygon) = self.polygons.get_mut(index) {
            polygon.holes.push(hole);
        }
    }

    pub fn polygons(&self) -> &[PolygonWithHoles] {
        &self.polygons
    }

    /// Number of disjoint outer contours
    pub fn outline_count(&self) -> usize {
        self.polygons.len()
    }

    /// Outline made of the single polygon at `index`
    pub fn unit_set(&self, index: usize) -> Outline {
        Outline {
            polygons: self.polygons.get(index).cloned().into_iter().collect(),
        }
    }

    pub fn vertices_with_holes(&self) -> impl Iterator<Item = Point> + '_ {
        self.polygons
            .iter()
            .flat_map(|poly| poly.contours())
            .flat_map(|contour| contour.points().iter().copied())
    }

    pub fn segments_with_holes(&self) -> impl Iterator<Item = Seg> + '_ {
        self.polygons
            .iter()
            .flat_map(|poly| poly.contours())
            .flat_map(|contour| contour.segments())
    }

    /// Total vertex count, holes included
    pub fn corner_count(&self) -> usize {
        self.polygons
            .iter()
            .flat_map(|poly| poly.contours())
            .map(Contour::len)
            .sum()
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices_with_holes())
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(PolygonWithHoles::area).sum()
    }

    /// True if `p` is strictly inside some polygon and outside all of its holes.
    /// Points on any boundary are not contained.
    pub fn contains(&self, p: Point) -> bool {
        self.polygons
            .iter()
            .any(|poly| poly.locate(p) == PointLocation::Inside)
    }

    /// True if any two non-adjacent boundary edges touch or cross, including
    /// edges of different contours. Adjacent edges that fold back over each
    /// other also count.
    pub fn is_self_intersecting(&self) -> bool {
        let contours: Vec<&Contour> = self
            .polygons
            .iter()
            .flat_map(|poly| poly.contours())
            .collect();

        for (ci, contour) in contours.iter().enumerate() {
            let segs: Vec<Seg> = contour.segments().collect();
            let n = segs.len();

            for i in 0..n {
                for j in (i + 1)..n {
                    let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                    if adjacent {
                        if n > 2 && folds_back(&segs[i], &segs[j]) {
                            return true;
                        }
                        continue;
                    }
                    if segs[i].intersects(&segs[j]) {
                        return true;
                    }
                }
            }

            for other in &contours[ci + 1..] {
                let (Some(a), Some(b)) = (contour.bbox(), other.bbox()) else {
                    continue;
                };
                if !a.intersects(&b) {
                    continue;
                }
                for seg in &segs {
                    if other.segments().any(|o| seg.intersects(&o)) {
                        return true;
                    }
                }
            }
        }

        false
    }
}

/// Two edges sharing a vertex overlap along a common direction
fn folds_back(first: &Seg, second: &Seg) -> bool {
    let (shared, e1, e2) = if first.b == second.a {
        (first.b, first.a, second.b)
    } else if second.b == first.a {
        (first.a, first.b, second.a)
    } else {
        return false;
    };

    if cross(shared, e1, e2) != 0 {
        return false;
    }
    let dot = (e1.x as i128 - shared.x as i128) * (e2.x as i128 - shared.x as i128)
        + (e1.y as i128 - shared.y as i128) * (e2.y as i128 - shared.y as i128);
    dot > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Outline {
        Outline::rectangle(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn test_rectangle_area_and_corners() {
        let sq = square(0, 0, 10, 10);
        assert_eq!(sq.area(), 100.0);
        assert_eq!(sq.corner_count(), 4);
        assert_eq!(sq.outline_count(), 1);
        assert_eq!(sq.segments_with_holes().count(), 4);
    }

    #[test]
    fn test_contains_is_strict() {
        let sq = square(0, 0, 10, 10);
        assert!(sq.contains(Point::new(5, 5)));
        assert!(!sq.contains(Point::new(0, 5)));
        assert!(!sq.contains(Point::new(10, 10)));
        assert!(!sq.contains(Point::new(11, 5)));
    }

    #[test]
    fn test_hole_is_exterior() {
        let mut ring = square(0, 0, 10, 10);
        ring.add_hole(
            0,
            Contour::new(vec![
                Point::new(3, 3),
                Point::new(7, 3),
                Point::new(7, 7),
                Point::new(3, 7),
            ]),
        );

        assert!(!ring.contains(Point::new(5, 5)));
        assert!(!ring.contains(Point::new(3, 5)));
        assert!(ring.contains(Point::new(1, 1)));
        assert_eq!(ring.area(), 84.0);
        assert_eq!(ring.corner_count(), 8);
        assert_eq!(ring.segments_with_holes().count(), 8);
    }

    #[test]
    fn test_bbox_spans_all_polygons() {
        let mut outline = square(0, 0, 10, 10);
        outline.push(square(20, -5, 30, 5).polygons()[0].clone());
        let bbox = outline.bbox().unwrap();
        assert_eq!(bbox.min, Point::new(0, -5));
        assert_eq!(bbox.max, Point::new(30, 10));
        assert_eq!(outline.unit_set(1).area(), 100.0);
    }

    #[test]
    fn test_bow_tie_is_self_intersecting() {
        let bow_tie = Outline::from_points([
            Point::new(0, 0),
            Point::new(10, 10),
            Point::new(10, 0),
            Point::new(0, 10),
        ]);
        assert!(bow_tie.is_self_intersecting());
        assert!(!square(0, 0, 10, 10).is_self_intersecting());
    }

    #[test]
    fn test_spike_is_self_intersecting() {
        let spike = Outline::from_points([
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(10, 5),
        ]);
        assert!(spike.is_self_intersecting());
    }
}

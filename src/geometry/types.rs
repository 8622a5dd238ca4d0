//! Core geometric primitives for zone outlines
//!
//! Coordinates are integer board units. Orientation tests widen to `i128`
//! before subtracting, so collision results are exact for coordinates
//! within ±2^61.

use rstar::AABB;
use serde::{Deserialize, Serialize};

/// A 2D point in board units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    fn as_f64(self) -> [f64; 2] {
        [self.x as f64, self.y as f64]
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Z component of (a - o) x (b - o)
pub fn cross(o: Point, a: Point, b: Point) -> i128 {
    let ax = a.x as i128 - o.x as i128;
    let ay = a.y as i128 - o.y as i128;
    let bx = b.x as i128 - o.x as i128;
    let by = b.y as i128 - o.y as i128;
    ax * by - ay * bx
}

/// A finite segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seg {
    pub a: Point,
    pub b: Point,
}

impl Seg {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min: Point::new(self.a.x.min(self.b.x), self.a.y.min(self.b.y)),
            max: Point::new(self.a.x.max(self.b.x), self.a.y.max(self.b.y)),
        }
    }

    /// True if `p` lies on this segment (endpoints included)
    pub fn contains_point(&self, p: Point) -> bool {
        cross(self.a, self.b, p) == 0 && self.bbox().contains_point(p)
    }

    /// Exact intersection test. Shared endpoints and collinear overlap count.
    pub fn intersects(&self, other: &Seg) -> bool {
        if !self.bbox().intersects(&other.bbox()) {
            return false;
        }

        let d1 = cross(other.a, other.b, self.a).signum();
        let d2 = cross(other.a, other.b, self.b).signum();
        let d3 = cross(self.a, self.b, other.a).signum();
        let d4 = cross(self.a, self.b, other.b).signum();

        if d1 * d2 < 0 && d3 * d4 < 0 {
            return true;
        }

        // Touching or collinear cases
        (d1 == 0 && other.contains_point(self.a))
            || (d2 == 0 && other.contains_point(self.b))
            || (d3 == 0 && self.contains_point(other.a))
            || (d4 == 0 && self.contains_point(other.b))
    }

    /// True if the segments intersect, or come closer than `clearance`
    pub fn collide(&self, other: &Seg, clearance: i64) -> bool {
        if self.intersects(other) {
            return true;
        }
        if clearance <= 0 {
            return false;
        }

        let limit = clearance as f64;
        self.distance_squared(other) < limit * limit
    }

    /// Squared minimum distance between two non-intersecting segments
    pub fn distance_squared(&self, other: &Seg) -> f64 {
        [
            point_segment_distance_squared(self.a, other),
            point_segment_distance_squared(self.b, other),
            point_segment_distance_squared(other.a, self),
            point_segment_distance_squared(other.b, self),
        ]
        .into_iter()
        .fold(f64::MAX, f64::min)
    }
}

/// Point-to-segment squared distance
pub fn point_segment_distance_squared(p: Point, seg: &Seg) -> f64 {
    let [px, py] = p.as_f64();
    let [ax, ay] = seg.a.as_f64();
    let [bx, by] = seg.b.as_f64();
    let abx = bx - ax;
    let aby = by - ay;
    let len2 = abx * abx + aby * aby;

    if len2 == 0.0 {
        // Degenerate segment
        return (px - ax).powi(2) + (py - ay).powi(2);
    }

    let t = (((px - ax) * abx + (py - ay) * aby) / len2).clamp(0.0, 1.0);
    let cx = ax + t * abx;
    let cy = ay + t * aby;
    (px - cx).powi(2) + (py - cy).powi(2)
}

/// Axis-aligned bounding box, bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Tight box over a point sequence. `None` for an empty sequence.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BoundingBox { min: first, max: first };
        for p in iter {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    /// Overlap test; boxes sharing only an edge or corner intersect
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Envelope for R-tree queries
    pub fn to_aabb(&self) -> AABB<[i64; 2]> {
        AABB::from_corners([self.min.x, self.min.y], [self.max.x, self.max.y])
    }
}

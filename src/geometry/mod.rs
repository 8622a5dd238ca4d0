//! Polygon geometry kernel for zone outlines
//!
//! Integer-coordinate primitives plus the polygon operations the zone
//! merging engine needs.
//!
//! # Submodules
//! - `types` - Points, segments, bounding boxes and exact collision tests
//! - `outline` - Contours, polygons with holes, containment and iteration
//! - `boolean` - Union and simplification backed by `geo`

mod types;
mod outline;
mod boolean;

pub use types::{
    Point,
    Seg,
    BoundingBox,
    cross,
    point_segment_distance_squared,
};

pub use outline::{
    Contour,
    Outline,
    PolygonWithHoles,
    PointLocation,
};

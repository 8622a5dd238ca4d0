//! Copper zone merging for PCB layouts
//!
//! Zones (copper pours and rule areas) on the same net, layer and settings
//! that overlap are combined into a single polygon-with-holes zone. The
//! engine runs to a fixed point after every outline edit.
//!
//! # Example
//! ```ignore
//! let mut board = Board::load_json("board.json")?;
//! let mut picked = PickedItems::new();
//! let zone = board.id_at(0).unwrap();
//! on_area_polygon_modified(&mut board, &mut picked, zone, &MergeRules::default());
//! ```

pub mod geometry;
pub mod zones;
pub mod board;

pub use board::{Board, PickStatus, PickedItem, PickedItems};
pub use geometry::{BoundingBox, Contour, Outline, Point, PolygonWithHoles, Seg};
pub use zones::{
    combine_all_zones_in_net, combine_zones, normalize_area_polygon, on_area_polygon_modified,
    remove_degenerate_zones, test_zone_intersections, CombineError, MergeRules, ModifiedZones,
    Zone, ZoneId,
};

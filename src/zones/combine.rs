//! Zone combination
//!
//! Merges two intersecting zones into one via polygon union, and repairs a
//! single zone whose outline crosses itself.

use thiserror::Error;

use super::types::ZoneId;
use crate::board::{Board, PickStatus, PickedItems};

/// Why a pair of zones could not be combined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombineError {
    #[error("zone {0} cannot be combined with itself")]
    SelfMerge(ZoneId),
    #[error("zone {0} is not on the board")]
    UnknownZone(ZoneId),
    #[error("more than 2 polys after merging ({count} outlines)")]
    TooManyOutlines { count: usize },
}

/// Merge `other_id` into `ref_id`
///
/// Returns `Ok(true)` when the union is a single outline: the reference zone
/// takes the merged outline and the other zone is removed and recorded in
/// `picked`. Returns `Ok(false)` when the union stays in two pieces (the zones
/// only share a corner). Neither zone is touched unless the merge succeeds.
pub fn combine_zones(
    board: &mut Board,
    picked: &mut PickedItems,
    ref_id: ZoneId,
    other_id: ZoneId,
) -> Result<bool, CombineError> {
    if ref_id == other_id {
        return Err(CombineError::SelfMerge(ref_id));
    }

    let ref_zone = board.zone(ref_id).ok_or(CombineError::UnknownZone(ref_id))?;
    let other_zone = board.zone(other_id).ok_or(CombineError::UnknownZone(other_id))?;

    let merged = ref_zone
        .outline()
        .boolean_add(other_zone.outline())
        .simplify();

    let count = merged.outline_count();
    if count > 2 {
        log::error!(
            "[Zones] combine_zones {} + {}: more than 2 polys after merging ({})",
            ref_id,
            other_id,
            count
        );
        return Err(CombineError::TooManyOutlines { count });
    }

    if count != 1 {
        log::debug!(
            "[Zones] {} and {} touch without merging ({} outlines)",
            ref_id,
            other_id,
            count
        );
        return Ok(false);
    }

    if let Some(zone) = board.zone_mut(ref_id) {
        zone.set_outline(merged);
        zone.hatch_border();
    }
    board.remove_zone(other_id, picked);

    log::debug!("[Zones] merged {} into {}", other_id, ref_id);
    Ok(true)
}

/// Repairs a self-intersecting zone outline
///
/// When the repair splits the outline into several pieces, the zone keeps
/// the first one and each other piece becomes a new zone with the same
/// attributes, inserted right after it and recorded as new in `picked`.
/// The hatch is recomputed in every case. Returns true if the outline changed.
pub fn normalize_area_polygon(board: &mut Board, picked: &mut PickedItems, zone_id: ZoneId) -> bool {
    let Some(zone) = board.zone_mut(zone_id) else {
        return false;
    };

    if !zone.outline().is_self_intersecting() {
        zone.hatch_border();
        return false;
    }

    zone.unhatch_border();
    let repaired = zone.outline().simplify();
    let pieces = repaired.outline_count();

    if pieces <= 1 {
        zone.set_outline(repaired);
        zone.hatch_border();
        return true;
    }

    let template = zone.clone();
    zone.set_outline(repaired.unit_set(0));
    zone.hatch_border();

    log::info!(
        "[Zones] {} split into {} zones while removing self-intersections",
        zone_id,
        pieces
    );

    let mut anchor = zone_id;
    for index in 1..pieces {
        let mut piece = template.clone();
        piece.set_outline(repaired.unit_set(index));
        piece.hatch_border();
        let new_id = board.insert_zone_after(anchor, piece.clone());
        picked.push(new_id, PickStatus::New, piece);
        anchor = new_id;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Outline, Point};
    use crate::zones::types::{FillSettings, Layer, Zone};

    fn square(x0: i64, y0: i64, x1: i64, y1: i64) -> Zone {
        Zone::filled(
            1,
            Layer::F_CU,
            FillSettings::default(),
            Outline::rectangle(Point::new(x0, y0), Point::new(x1, y1)),
        )
    }

    #[test]
    fn test_self_merge_is_rejected() {
        let mut board = Board::from_zones([square(0, 0, 10, 10)]);
        let mut picked = PickedItems::new();
        let id = board.id_at(0).unwrap();
        assert_eq!(
            combine_zones(&mut board, &mut picked, id, id),
            Err(CombineError::SelfMerge(id))
        );
        assert_eq!(board.zone_count(), 1);
    }

    #[test]
    fn test_overlapping_zones_merge() {
        let mut board = Board::from_zones([square(0, 0, 10, 10), square(5, 5, 15, 15)]);
        let mut picked = PickedItems::new();
        let a = board.id_at(0).unwrap();
        let b = board.id_at(1).unwrap();

        assert_eq!(combine_zones(&mut board, &mut picked, a, b), Ok(true));
        assert_eq!(board.zone_count(), 1);
        assert!(!board.contains(b));
        assert_eq!(board.zone(a).unwrap().outline().area(), 175.0);
        assert_eq!(picked.deleted_ids().collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_corner_touch_does_not_merge() {
        let mut board = Board::from_zones([square(0, 0, 10, 10), square(10, 10, 20, 20)]);
        let mut picked = PickedItems::new();
        let a = board.id_at(0).unwrap();
        let b = board.id_at(1).unwrap();

        assert_eq!(combine_zones(&mut board, &mut picked, a, b), Ok(false));
        assert_eq!(board.zone_count(), 2);
        assert_eq!(board.zone(a).unwrap().outline().area(), 100.0);
        assert!(picked.is_empty());
    }

    #[test]
    fn test_unknown_zone_is_reported() {
        let mut board = Board::from_zones([square(0, 0, 10, 10)]);
        let mut picked = PickedItems::new();
        let a = board.id_at(0).unwrap();
        let missing = ZoneId(99);
        assert_eq!(
            combine_zones(&mut board, &mut picked, a, missing),
            Err(CombineError::UnknownZone(missing))
        );
    }

    #[test]
    fn test_normalize_leaves_simple_outline() {
        let mut board = Board::from_zones([square(0, 0, 10, 10)]);
        let mut picked = PickedItems::new();
        let a = board.id_at(0).unwrap();
        assert!(!normalize_area_polygon(&mut board, &mut picked, a));
        assert_eq!(board.zone_count(), 1);
    }

    #[test]
    fn test_normalize_splits_bow_tie() {
        let bow_tie = Outline::from_points([
            Point::new(0, 0),
            Point::new(10, 10),
            Point::new(10, 0),
            Point::new(0, 10),
        ]);
        let zone = Zone::filled(4, Layer::F_CU, FillSettings::default(), bow_tie);
        let mut board = Board::from_zones([zone]);
        let mut picked = PickedItems::new();
        let a = board.id_at(0).unwrap();

        assert!(normalize_area_polygon(&mut board, &mut picked, a));
        assert_eq!(board.zone_count(), 2);
        assert_eq!(picked.new_ids().count(), 1);

        let created = picked.new_ids().next().unwrap();
        assert!(board.contains(created));
        assert_eq!(board.index_of(created), Some(1));
        for (_, zone) in board.zones() {
            assert_eq!(zone.net, 4);
            assert_eq!(zone.outline().area(), 25.0);
        }
    }
}

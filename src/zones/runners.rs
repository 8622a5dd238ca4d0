//! Zone merge runner functions
//!
//! Contains the entry points that drive merging across a board:
//! - Net-wide convergence (merge until no pair on the net intersects)
//! - Intersection probe for a single zone
//! - Degenerate zone cleanup
//! - The edit hook run after a zone outline is reshaped

use std::collections::VecDeque;
use std::time::Instant;

use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};

use super::combine::{combine_zones, normalize_area_polygon};
use super::predicate::{are_comparable, may_intersect, zones_intersect};
use super::types::{MergeRules, ModifiedZones, ZoneId};
use crate::board::{Board, PickStatus, PickedItems};

/// Zone bounding box wrapper for R-tree candidate lookup
struct ZoneEnvelope {
    id: ZoneId,
    bounds: AABB<[i64; 2]>,
}

impl RTreeObject for ZoneEnvelope {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// Merge zones of `net` until no two of them intersect
///
/// Zones are visited in board order. Each reference zone is compared with the
/// zones after it, last first; after absorbing anything it goes back to the
/// front of the worklist and is compared again. When `modified` is given, a
/// pair is only tested if one of its zones is in the set, and every zone that
/// absorbs another is added to it.
///
/// Returns true if any zones were combined.
pub fn combine_all_zones_in_net(
    board: &mut Board,
    picked: &mut PickedItems,
    net: i32,
    mut modified: Option<&mut ModifiedZones>,
) -> bool {
    if board.zone_count() <= 1 {
        return false;
    }

    let start = Instant::now();
    let mut pending: VecDeque<ZoneId> = board.zone_ids_in_net(net).into();
    let mut merge_count = 0usize;

    while let Some(ref_id) = pending.pop_front() {
        if !board.contains(ref_id) {
            continue;
        }

        let mut absorbed = false;

        for other_id in board.ids_after(ref_id).into_iter().rev() {
            let (Some(ref_zone), Some(other)) = (board.zone(ref_id), board.zone(other_id)) else {
                continue;
            };

            // Net, layers, priority and every fill or keepout attribute
            if !are_comparable(ref_zone, other) {
                continue;
            }
            if !may_intersect(ref_zone, other) {
                continue;
            }
            if let Some(set) = modified.as_deref() {
                if !set.contains(ref_id) && !set.contains(other_id) {
                    continue;
                }
            }
            if !zones_intersect(ref_zone, other) {
                continue;
            }

            match combine_zones(board, picked, ref_id, other_id) {
                Ok(true) => {
                    absorbed = true;
                    merge_count += 1;
                    if let Some(set) = modified.as_deref_mut() {
                        set.insert(ref_id);
                    }
                }
                Ok(false) => {}
                Err(err) => {
                    log::warn!("[Zones] skipping {} / {}: {}", ref_id, other_id, err);
                }
            }
        }

        if absorbed {
            // Compare the grown zone against everything after it again
            pending.push_front(ref_id);
        }
    }

    log::info!(
        "[Zones] net {}: {} merges, {} zones left on board in {:?}",
        net,
        merge_count,
        board.zone_count(),
        start.elapsed()
    );

    merge_count > 0
}

/// Check if any other comparable zone on the board intersects `zone_id`
pub fn test_zone_intersections(board: &Board, zone_id: ZoneId) -> bool {
    let Some(zone) = board.zone(zone_id) else {
        return false;
    };
    let Some(bbox) = zone.bbox() else {
        return false;
    };

    let entries: Vec<ZoneEnvelope> = board
        .zones()
        .filter(|(id, other)| *id != zone_id && are_comparable(zone, other))
        .filter_map(|(id, other)| {
            other.bbox().map(|b| ZoneEnvelope { id, bounds: b.to_aabb() })
        })
        .collect();

    if entries.is_empty() {
        return false;
    }

    let tree = RTree::bulk_load(entries);
    let candidates: Vec<ZoneId> = tree
        .locate_in_envelope_intersecting(&bbox.to_aabb())
        .map(|entry| entry.id)
        .collect();

    candidates
        .par_iter()
        .any(|id| board.zone(*id).is_some_and(|other| zones_intersect(zone, other)))
}

/// Delete every zone with fewer than `min_corners` corners
///
/// Returns the number of zones removed.
pub fn remove_degenerate_zones(board: &mut Board, picked: &mut PickedItems, min_corners: usize) -> usize {
    let degenerate: Vec<ZoneId> = board
        .zones()
        .filter(|(_, zone)| zone.corner_count() < min_corners)
        .map(|(id, _)| id)
        .collect();

    for id in &degenerate {
        log::debug!("[Zones] removing degenerate zone {}", id);
        board.remove_zone(*id, picked);
    }

    degenerate.len()
}

/// Run after a zone outline was edited
///
/// Repairs the outline, merges it with any zone of its net it now touches,
/// and prunes degenerate zones from the board. Returns true if the board
/// changed.
pub fn on_area_polygon_modified(
    board: &mut Board,
    picked: &mut PickedItems,
    zone_id: ZoneId,
    rules: &MergeRules,
) -> bool {
    if !board.contains(zone_id) {
        log::warn!("[Zones] modified zone {} is not on the board", zone_id);
        return false;
    }

    let first_record = picked.len();
    let mut modified = normalize_area_polygon(board, picked, zone_id);

    if test_zone_intersections(board, zone_id) {
        modified = true;

        // The edited zone plus any piece split off it
        let mut touched: ModifiedZones = std::iter::once(zone_id)
            .chain(
                picked
                    .iter()
                    .skip(first_record)
                    .filter(|item| item.status == PickStatus::New)
                    .map(|item| item.id),
            )
            .collect();

        if let Some(net) = board.zone(zone_id).map(|zone| zone.net) {
            let flags = rules.use_local_flags.then_some(&mut touched);
            combine_all_zones_in_net(board, picked, net, flags);
        }
    }

    let removed = remove_degenerate_zones(board, picked, rules.min_corner_count);

    modified || removed > 0
}

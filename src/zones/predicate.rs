//! Zone intersection predicates
//!
//! Decides which zone pairs are merge candidates and whether their outlines
//! touch or overlap.

use super::types::{Zone, ZoneKind};

/// Check if two zones share every attribute that must match for a merge
pub fn are_comparable(a: &Zone, b: &Zone) -> bool {
    if a.net != b.net || a.layer_set != b.layer_set || a.priority != b.priority {
        return false;
    }

    match (&a.kind, &b.kind) {
        (ZoneKind::RuleArea(ra), ZoneKind::RuleArea(rb)) => ra == rb,
        (ZoneKind::Filled(fa), ZoneKind::Filled(fb)) => fa == fb,
        _ => false,
    }
}

/// Bounding-box pre-filter
pub fn may_intersect(a: &Zone, b: &Zone) -> bool {
    match (a.bbox(), b.bbox()) {
        (Some(ba), Some(bb)) => ba.intersects(&bb),
        _ => false,
    }
}

/// Exact test: outlines on the same layer that cross, touch, or nest
pub fn zones_intersect(a: &Zone, b: &Zone) -> bool {
    if a.layer() != b.layer() {
        return false;
    }

    if !may_intersect(a, b) {
        return false;
    }

    let outline_a = a.outline();
    let outline_b = b.outline();

    // Any boundary crossing or contact, holes included
    let segs_b: Vec<_> = outline_b.segments_with_holes().collect();
    for seg_a in outline_a.segments_with_holes() {
        if segs_b.iter().any(|seg_b| seg_a.collide(seg_b, 0)) {
            return true;
        }
    }

    // No edges meet, but one outline may enclose the other
    if outline_b.vertices_with_holes().any(|p| outline_a.contains(p)) {
        return true;
    }

    outline_a.vertices_with_holes().any(|p| outline_b.contains(p))
}

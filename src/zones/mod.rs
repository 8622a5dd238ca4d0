//! Zone merging engine
//!
//! Finds same-net zones whose outlines overlap or touch and replaces each
//! such pair with one zone covering their union, until no pair is left.
//!
//! # Submodules
//! - `types` - Zone entity, attribute bundles, layer sets, merge rules
//! - `hatch` - Border hatch decoration
//! - `predicate` - Comparability and intersection tests
//! - `combine` - Pairwise merge and self-intersection repair
//! - `runners` - Net-wide convergence and the edit hook

mod types;
mod hatch;
mod predicate;
mod combine;
mod runners;

pub use types::{
    Zone, ZoneId, ZoneKind, Layer, LayerSet,
    FillSettings, RuleAreaRules, PadConnection, CornerSmoothing, HatchStyle,
    MergeRules, ModifiedZones, DEFAULT_HATCH_PITCH,
};

pub use predicate::{
    are_comparable,
    may_intersect,
    zones_intersect,
};

pub use combine::{
    CombineError,
    combine_zones,
    normalize_area_polygon,
};

pub use runners::{
    combine_all_zones_in_net,
    test_zone_intersections,
    remove_degenerate_zones,
    on_area_polygon_modified,
};

//! Zone data types
//!
//! Contains the zone entity, its mode-specific attribute bundles, layer sets,
//! and the rules that drive a merge pass.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Outline, Seg};

/// Default border hatch pitch: 0.508 mm in nanometre board units
pub const DEFAULT_HATCH_PITCH: i64 = 508_000;

/// A physical board layer, identified by its index in the stackup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layer(pub u8);

impl Layer {
    pub const F_CU: Layer = Layer(0);
    pub const B_CU: Layer = Layer(31);

    /// Inner copper layer `n` (1-based)
    pub const fn inner(n: u8) -> Layer {
        Layer(n)
    }
}

/// Bitmask of board layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSet(pub u64);

impl LayerSet {
    pub fn single(layer: Layer) -> Self {
        Self(1u64 << layer.0)
    }

    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | (1u64 << layer.0))
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.0 & (1u64 << layer.0) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Lowest layer in the set
    pub fn first(&self) -> Option<Layer> {
        (!self.is_empty()).then(|| Layer(self.0.trailing_zeros() as u8))
    }
}

/// How pads connect to a filled zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadConnection {
    Inherited,
    Full,
    #[default]
    ThermalRelief,
    NotConnected,
    ThtThermal,
}

/// Corner treatment applied to the zone outline when filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerSmoothing {
    #[default]
    Off,
    Chamfer,
    Fillet,
}

/// Border decoration drawn inside the zone outline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HatchStyle {
    NoHatch,
    DiagonalFull,
    #[default]
    DiagonalEdge,
}

/// Keepout restrictions of a rule area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleAreaRules {
    pub no_copper_pour: bool,
    pub no_tracks: bool,
    pub no_vias: bool,
    pub no_pads: bool,
    pub no_footprints: bool,
}

/// Fill parameters of a copper zone; lengths in board units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    pub local_clearance: i64,
    pub thermal_relief_gap: i64,
    pub thermal_relief_spoke_width: i64,
    pub pad_connection: PadConnection,
    pub min_thickness: i64,
    pub corner_smoothing: CornerSmoothing,
    pub corner_radius: i64,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            local_clearance: 508_000,
            thermal_relief_gap: 508_000,
            thermal_relief_spoke_width: 508_000,
            pad_connection: PadConnection::default(),
            min_thickness: 254_000,
            corner_smoothing: CornerSmoothing::default(),
            corner_radius: 0,
        }
    }
}

/// Rule area or filled copper, with the attributes of that mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ZoneKind {
    RuleArea(RuleAreaRules),
    Filled(FillSettings),
}

impl ZoneKind {
    pub fn is_rule_area(&self) -> bool {
        matches!(self, ZoneKind::RuleArea(_))
    }
}

impl Default for ZoneKind {
    fn default() -> Self {
        ZoneKind::Filled(FillSettings::default())
    }
}

/// Stable handle of a zone on a board. Never reused after deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u64);

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A copper pour or rule area on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub net: i32,
    pub layer_set: LayerSet,
    #[serde(default)]
    pub priority: u32,
    #[serde(default)]
    pub kind: ZoneKind,
    #[serde(default)]
    pub hatch_style: HatchStyle,
    #[serde(default = "default_hatch_pitch")]
    pub hatch_pitch: i64,
    outline: Outline,
    #[serde(skip)]
    bbox: Option<BoundingBox>,
    #[serde(skip)]
    pub(crate) hatch_lines: Vec<Seg>,
}

fn default_hatch_pitch() -> i64 {
    DEFAULT_HATCH_PITCH
}

impl Zone {
    pub fn new(net: i32, layer: Layer, kind: ZoneKind, outline: Outline) -> Self {
        let bbox = outline.bbox();
        Self {
            net,
            layer_set: LayerSet::single(layer),
            priority: 0,
            kind,
            hatch_style: HatchStyle::default(),
            hatch_pitch: DEFAULT_HATCH_PITCH,
            outline,
            bbox,
            hatch_lines: Vec::new(),
        }
    }

    /// Filled copper zone
    pub fn filled(net: i32, layer: Layer, settings: FillSettings, outline: Outline) -> Self {
        Self::new(net, layer, ZoneKind::Filled(settings), outline)
    }

    /// Rule area; keepouts carry no net
    pub fn rule_area(layer: Layer, rules: RuleAreaRules, outline: Outline) -> Self {
        Self::new(0, layer, ZoneKind::RuleArea(rules), outline)
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_hatch(mut self, style: HatchStyle, pitch: i64) -> Self {
        self.hatch_style = style;
        self.hatch_pitch = pitch;
        self
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    /// Replaces the outline and refreshes the cached bounding box.
    /// The hatch is stale until `hatch_border` runs again.
    pub fn set_outline(&mut self, outline: Outline) {
        self.bbox = outline.bbox();
        self.outline = outline;
        self.hatch_lines.clear();
    }

    /// Cached outline bounding box
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox.or_else(|| self.outline.bbox())
    }

    pub(crate) fn refresh_bbox(&mut self) {
        self.bbox = self.outline.bbox();
    }

    pub fn is_rule_area(&self) -> bool {
        self.kind.is_rule_area()
    }

    /// The zone's drawing layer: the lowest layer of its set
    pub fn layer(&self) -> Option<Layer> {
        self.layer_set.first()
    }

    pub fn corner_count(&self) -> usize {
        self.outline.corner_count()
    }

    /// Cached border hatch segments
    pub fn hatch_lines(&self) -> &[Seg] {
        &self.hatch_lines
    }
}

/// Zones touched since the last merge pass
///
/// Restricts a pass to pairs where at least one zone is in the set.
#[derive(Debug, Clone, Default)]
pub struct ModifiedZones(HashSet<ZoneId>);

impl ModifiedZones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ZoneId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        self.0.contains(&id)
    }
}

impl FromIterator<ZoneId> for ModifiedZones {
    fn from_iter<I: IntoIterator<Item = ZoneId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parameters of a merge pass
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRules {
    /// Zones with fewer corners are deleted after a pass
    pub min_corner_count: usize,
    /// Only test pairs involving a recently modified zone
    pub use_local_flags: bool,
}

impl Default for MergeRules {
    fn default() -> Self {
        Self {
            min_corner_count: 3,
            use_local_flags: true,
        }
    }
}

impl MergeRules {
    /// Loads rules from a JSON file; missing fields take their defaults
    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        let rules = serde_json::from_str(&text)
            .with_context(|| format!("Invalid rules file {}", path.display()))?;
        Ok(rules)
    }
}

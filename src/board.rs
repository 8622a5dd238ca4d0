//! Board zone collection and the picked-items ledger
//!
//! Zones are stored in insertion order and addressed by stable [`ZoneId`]s.
//! Every zone the engine deletes or derives is recorded in a [`PickedItems`]
//! ledger owned by the caller, so an undo layer can replay the change.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::zones::{Zone, ZoneId};

/// What happened to a picked zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickStatus {
    /// Removed from the board; `zone` holds the removed state
    Deleted,
    /// Created by splitting an existing zone
    New,
}

/// One ledger record
#[derive(Debug, Clone, Serialize)]
pub struct PickedItem {
    pub id: ZoneId,
    pub status: PickStatus,
    pub zone: Zone,
}

/// Ordered record of zones deleted or created by an operation
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PickedItems {
    items: Vec<PickedItem>,
}

impl PickedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ZoneId, status: PickStatus, zone: Zone) {
        self.items.push(PickedItem { id, status, zone });
    }

    pub fn iter(&self) -> impl Iterator<Item = &PickedItem> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn deleted_ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.ids_with(PickStatus::Deleted)
    }

    pub fn new_ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.ids_with(PickStatus::New)
    }

    fn ids_with(&self, status: PickStatus) -> impl Iterator<Item = ZoneId> + '_ {
        self.items
            .iter()
            .filter(move |item| item.status == status)
            .map(|item| item.id)
    }
}

/// On-disk snapshot layout
#[derive(Serialize, Deserialize)]
struct BoardFile {
    zones: Vec<Zone>,
}

/// The zones of a board, in board order
#[derive(Debug, Clone, Default)]
pub struct Board {
    zones: IndexMap<ZoneId, Zone>,
    next_id: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_zones<I: IntoIterator<Item = Zone>>(zones: I) -> Self {
        let mut board = Self::new();
        for zone in zones {
            board.add_zone(zone);
        }
        board
    }

    fn allocate_id(&mut self) -> ZoneId {
        let id = ZoneId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends a zone and returns its handle
    pub fn add_zone(&mut self, mut zone: Zone) -> ZoneId {
        zone.refresh_bbox();
        let id = self.allocate_id();
        self.zones.insert(id, zone);
        id
    }

    /// Inserts a zone directly after `anchor`, or at the end if `anchor` is gone
    pub fn insert_zone_after(&mut self, anchor: ZoneId, mut zone: Zone) -> ZoneId {
        zone.refresh_bbox();
        let id = self.allocate_id();
        match self.zones.get_index_of(&anchor) {
            Some(index) => {
                self.zones.shift_insert(index + 1, id, zone);
            }
            None => {
                self.zones.insert(id, zone);
            }
        }
        id
    }

    /// Removes a zone, keeping the order of the others, and records it
    pub fn remove_zone(&mut self, id: ZoneId, picked: &mut PickedItems) -> bool {
        match self.zones.shift_remove(&id) {
            Some(zone) => {
                picked.push(id, PickStatus::Deleted, zone);
                true
            }
            None => false,
        }
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn zone_mut(&mut self, id: ZoneId) -> Option<&mut Zone> {
        self.zones.get_mut(&id)
    }

    pub fn contains(&self, id: ZoneId) -> bool {
        self.zones.contains_key(&id)
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> impl Iterator<Item = (ZoneId, &Zone)> + '_ {
        self.zones.iter().map(|(id, zone)| (*id, zone))
    }

    /// Handle of the zone at a board position
    pub fn id_at(&self, index: usize) -> Option<ZoneId> {
        self.zones.get_index(index).map(|(id, _)| *id)
    }

    /// Position of a zone in board order
    pub fn index_of(&self, id: ZoneId) -> Option<usize> {
        self.zones.get_index_of(&id)
    }

    /// Zones positioned after `id`, in board order
    pub fn ids_after(&self, id: ZoneId) -> Vec<ZoneId> {
        match self.zones.get_index_of(&id) {
            Some(index) => self.zones.keys().skip(index + 1).copied().collect(),
            None => Vec::new(),
        }
    }

    pub fn zone_ids_in_net(&self, net: i32) -> Vec<ZoneId> {
        self.zones
            .iter()
            .filter(|(_, zone)| zone.net == net)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Distinct net codes, ascending
    pub fn nets(&self) -> Vec<i32> {
        let mut nets: Vec<i32> = self.zones.values().map(|zone| zone.net).collect();
        nets.sort_unstable();
        nets.dedup();
        nets
    }

    /// Reads a JSON snapshot `{ "zones": [...] }`
    pub fn load_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Board> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open board file {}", path.display()))?;
        let parsed: BoardFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid board file {}", path.display()))?;

        let mut board = Board::from_zones(parsed.zones);
        for zone in board.zones.values_mut() {
            zone.hatch_border();
        }
        Ok(board)
    }

    /// Writes the zones in board order as a JSON snapshot
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let snapshot = BoardFile {
            zones: self.zones.values().cloned().collect(),
        };
        serde_json::to_writer_pretty(BufWriter::new(file), &snapshot)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

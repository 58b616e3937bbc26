//! Vehicles and the records returned by pool operations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot number handed out by the pool (1-based, `0` is never issued)
pub type SlotNumber = u32;

/// Sentinel used by batch parking for entries that could not be placed
pub const UNPLACED: i64 = -1;

/// A parked vehicle, the owner of an occupied slot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique among currently occupied slots
    pub registration_number: String,
    /// Free-form label, matched case-insensitively
    pub color: String,
}

impl Vehicle {
    pub fn new(registration_number: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            registration_number: registration_number.into(),
            color: color.into(),
        }
    }

    /// Case-insensitive colour comparison
    pub fn has_color(&self, color: &str) -> bool {
        self.color.to_lowercase() == color.to_lowercase()
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.registration_number, self.color)
    }
}

/// Pool size after `initialize` or `expand`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSize {
    pub total_slots: u32,
}

/// Slot handed out by `park`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub slot: SlotNumber,
}

/// Slot returned to the pool by `clear`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Release {
    pub slot: SlotNumber,
}

/// One occupied slot, as listed by `occupied_slots`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupiedSlot {
    pub slot: SlotNumber,
    pub registration_number: String,
    pub color: String,
}

/// Outcome of one entry of a batch park
///
/// `allocated_slot` is [`UNPLACED`] when the entry was not parked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPlacement {
    pub registration_number: String,
    pub allocated_slot: i64,
}

impl BatchPlacement {
    pub fn is_placed(&self) -> bool {
        self.allocated_slot != UNPLACED
    }
}

/// Aggregate occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_slots: u32,
    pub occupied_slots: u32,
    pub available_slots: u32,
}

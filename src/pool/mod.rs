//! Parking slot pool
//!
//! Allocates numbered slots from a fixed-size pool, lowest number first,
//! and keeps a registry of which vehicle holds each occupied slot.
//!
//! # Architecture
//!
//! ```text
//! ParkingLot (total_slots = 6)
//!   ├─→ FreeSlotQueue (min-heap)  → Free: [2, 5, 6]
//!   ├─→ Registry                  → 1 → ABC123 (Red)
//!   │                               3 → DEF456 (Blue)
//!   │                               4 → GHI789 (Red)
//!   └─→ Registration index        → ABC123 → 1, DEF456 → 3, GHI789 → 4
//! ```
//!
//! `park` pops the queue minimum into the registry, `clear` moves a slot
//! back. Queries only read the registry. `SharedParkingLot` wraps a lot in
//! a mutex for use from concurrent request handlers.

pub mod free_slots;
pub mod lot;
pub mod shared;
pub mod vehicle;

pub use free_slots::FreeSlotQueue;
pub use lot::{ClearSelector, ParkingLot, PoolConfig};
pub use shared::SharedParkingLot;
pub use vehicle::{
    Allocation, BatchPlacement, OccupiedSlot, PoolSize, Release, SlotNumber, Summary, Vehicle,
    UNPLACED,
};

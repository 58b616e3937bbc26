//! Parking lot: slot allocator plus slot registry

use super::free_slots::FreeSlotQueue;
use super::vehicle::{
    Allocation, BatchPlacement, OccupiedSlot, PoolSize, Release, SlotNumber, Summary, Vehicle,
    UNPLACED,
};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Pre-initialize the pool with this many slots at start-up
    pub initial_slots: Option<u32>,
    /// Upper bound for `initialize` and `expand`
    pub max_slots: u32,
    /// Report a colour query with no matches as `NotFound` instead of an empty list
    pub empty_match_is_error: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_slots: None,
            max_slots: 1_000_000,
            empty_match_is_error: true,
        }
    }
}

/// How `clear` locates the slot to free
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearSelector {
    Slot(SlotNumber),
    Registration(String),
}

impl ClearSelector {
    /// Build a selector from optional request fields
    ///
    /// The slot number wins when both are present.
    pub fn from_parts(slot: Option<SlotNumber>, registration: Option<String>) -> Result<Self> {
        match (slot, registration) {
            (Some(slot), _) => Ok(Self::Slot(slot)),
            (None, Some(registration)) if !registration.trim().is_empty() => {
                Ok(Self::Registration(registration))
            }
            _ => Err(Error::InvalidArgument(
                "Provide either slot_number or car_registration_no".to_string(),
            )),
        }
    }
}

/// Fixed-size pool of numbered parking slots
///
/// Slots `1..=total_slots` are either free (in the queue) or occupied
/// (in the registry), never both. Every mutating operation validates
/// before it touches either structure, so a failed call leaves the
/// pool unchanged.
#[derive(Debug, Default)]
pub struct ParkingLot {
    config: PoolConfig,
    total_slots: u32,
    free_slots: FreeSlotQueue,
    /// Occupied slot → vehicle
    occupied: HashMap<SlotNumber, Vehicle>,
    /// Registration number → occupied slot
    by_registration: HashMap<String, SlotNumber>,
}

impl ParkingLot {
    /// Create an uninitialized lot with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an uninitialized lot
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a lot from configuration, initializing it if `initial_slots` is set
    pub fn from_config(config: PoolConfig) -> Result<Self> {
        let initial = config.initial_slots;
        let mut lot = Self::with_config(config);
        if let Some(slots) = initial {
            lot.initialize(i64::from(slots))?;
        }
        Ok(lot)
    }

    pub fn is_initialized(&self) -> bool {
        self.total_slots > 0
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Number of occupied slots
    pub fn occupied_count(&self) -> u32 {
        self.occupied.len() as u32
    }

    /// Smallest free slot, i.e. the slot the next `park` would take
    pub fn next_free_slot(&self) -> Option<SlotNumber> {
        self.free_slots.peek_min()
    }

    pub(crate) fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::Uninitialized)
        }
    }

    fn within_limit(&self, total: u64) -> Result<u32> {
        if total > u64::from(self.config.max_slots) {
            return Err(Error::InvalidArgument(format!(
                "Parking lot cannot exceed {} slots",
                self.config.max_slots
            )));
        }
        Ok(total as u32)
    }

    /// Reset the lot to `slots` free slots, discarding all occupancy
    pub fn initialize(&mut self, slots: i64) -> Result<PoolSize> {
        if slots <= 0 {
            return Err(Error::InvalidArgument(
                "Number of slots must be greater than zero".to_string(),
            ));
        }
        let total = self.within_limit(slots as u64)?;

        let mut free_slots = FreeSlotQueue::with_capacity(total as usize);
        for slot in 1..=total {
            free_slots.insert(slot);
        }

        let discarded = self.occupied.len();
        self.free_slots = free_slots;
        self.occupied.clear();
        self.by_registration.clear();
        self.total_slots = total;

        info!(total_slots = total, discarded, "Parking lot initialized");
        Ok(PoolSize { total_slots: total })
    }

    /// Append `increment` free slots after the current highest slot
    pub fn expand(&mut self, increment: i64) -> Result<PoolSize> {
        self.ensure_initialized()?;

        if increment <= 0 {
            return Err(Error::InvalidArgument(
                "Increment must be greater than zero".to_string(),
            ));
        }
        let old_total = self.total_slots;
        let new_total = self.within_limit(u64::from(old_total) + increment as u64)?;

        for slot in old_total + 1..=new_total {
            self.free_slots.insert(slot);
        }
        self.total_slots = new_total;

        info!(old_total, new_total, "Parking lot expanded");
        Ok(PoolSize {
            total_slots: new_total,
        })
    }

    /// Park a vehicle in the lowest-numbered free slot
    pub fn park(&mut self, vehicle: Vehicle) -> Result<Allocation> {
        self.ensure_initialized()?;
        let slot = self.place(vehicle)?;
        Ok(Allocation { slot })
    }

    fn place(&mut self, vehicle: Vehicle) -> Result<SlotNumber> {
        if vehicle.registration_number.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "Registration number must not be empty".to_string(),
            ));
        }
        if vehicle.color.trim().is_empty() {
            return Err(Error::InvalidArgument("Color must not be empty".to_string()));
        }
        if self.by_registration.contains_key(&vehicle.registration_number) {
            return Err(Error::DuplicateRegistration(vehicle.registration_number));
        }

        let slot = self.free_slots.extract_min().ok_or(Error::CapacityExceeded)?;

        debug!(slot, vehicle = %vehicle, "Allocated slot");
        self.by_registration
            .insert(vehicle.registration_number.clone(), slot);
        self.occupied.insert(slot, vehicle);
        Ok(slot)
    }

    /// Free the slot picked by `selector`
    pub fn clear(&mut self, selector: ClearSelector) -> Result<Release> {
        self.ensure_initialized()?;

        let slot = match selector {
            ClearSelector::Slot(slot) => {
                if !self.occupied.contains_key(&slot) {
                    return Err(Error::NotFound(
                        "Slot is already free or does not exist".to_string(),
                    ));
                }
                slot
            }
            ClearSelector::Registration(registration) => self
                .by_registration
                .get(&registration)
                .copied()
                .ok_or_else(|| {
                    Error::NotFound("Car with registration number not found".to_string())
                })?,
        };

        if let Some(vehicle) = self.occupied.remove(&slot) {
            self.by_registration.remove(&vehicle.registration_number);
            debug!(slot, vehicle = %vehicle, "Freed slot");
        }
        self.free_slots.insert(slot);

        Ok(Release { slot })
    }

    pub fn clear_by_slot(&mut self, slot: SlotNumber) -> Result<Release> {
        self.clear(ClearSelector::Slot(slot))
    }

    pub fn clear_by_registration(&mut self, registration: &str) -> Result<Release> {
        self.clear(ClearSelector::Registration(registration.to_string()))
    }

    /// All occupied slots, ascending by slot number
    pub fn occupied_slots(&self) -> Result<Vec<OccupiedSlot>> {
        self.ensure_initialized()?;

        let mut slots: Vec<OccupiedSlot> = self
            .occupied
            .iter()
            .map(|(&slot, vehicle)| OccupiedSlot {
                slot,
                registration_number: vehicle.registration_number.clone(),
                color: vehicle.color.clone(),
            })
            .collect();
        slots.sort_unstable_by_key(|entry| entry.slot);
        Ok(slots)
    }

    /// Occupied slots holding a vehicle of `color`, ascending by slot number
    fn matching_color<'a>(&'a self, color: &str) -> Result<Vec<(SlotNumber, &'a Vehicle)>> {
        self.ensure_initialized()?;

        if color.trim().is_empty() {
            return Err(Error::InvalidArgument("Color must not be empty".to_string()));
        }

        let mut matches: Vec<(SlotNumber, &Vehicle)> = self
            .occupied
            .iter()
            .filter(|(_, vehicle)| vehicle.has_color(color))
            .map(|(&slot, vehicle)| (slot, vehicle))
            .collect();
        matches.sort_unstable_by_key(|(slot, _)| *slot);
        Ok(matches)
    }

    /// Registration numbers of vehicles with the given colour
    pub fn registrations_by_color(&self, color: &str) -> Result<Vec<String>> {
        let matches = self.matching_color(color)?;
        if matches.is_empty() && self.config.empty_match_is_error {
            return Err(Error::NotFound(format!("No cars found with color: {}", color)));
        }

        Ok(matches
            .into_iter()
            .map(|(_, vehicle)| vehicle.registration_number.clone())
            .collect())
    }

    /// Slot currently held by `registration`
    pub fn slot_by_registration(&self, registration: &str) -> Result<SlotNumber> {
        self.ensure_initialized()?;

        self.by_registration
            .get(registration)
            .copied()
            .ok_or_else(|| Error::NotFound("Car with registration number not found".to_string()))
    }

    /// Slots holding a vehicle of the given colour
    pub fn slots_by_color(&self, color: &str) -> Result<Vec<SlotNumber>> {
        let matches = self.matching_color(color)?;
        if matches.is_empty() && self.config.empty_match_is_error {
            return Err(Error::NotFound(format!("No slots found for color: {}", color)));
        }

        Ok(matches.into_iter().map(|(slot, _)| slot).collect())
    }

    /// Park vehicles in input order
    ///
    /// Never fails once the lot is initialized: an entry that cannot be
    /// placed (lot full, duplicate registration, invalid vehicle) gets
    /// [`UNPLACED`] and the batch carries on.
    pub fn park_many(&mut self, vehicles: Vec<Vehicle>) -> Result<Vec<BatchPlacement>> {
        self.ensure_initialized()?;

        let mut placements = Vec::with_capacity(vehicles.len());
        for vehicle in vehicles {
            let registration_number = vehicle.registration_number.clone();
            let allocated_slot = match self.place(vehicle) {
                Ok(slot) => i64::from(slot),
                Err(e) => {
                    debug!(
                        registration = %registration_number,
                        error = %e,
                        "Batch entry not placed"
                    );
                    UNPLACED
                }
            };
            placements.push(BatchPlacement {
                registration_number,
                allocated_slot,
            });
        }

        Ok(placements)
    }

    /// Total, occupied and available slot counts
    pub fn summary(&self) -> Result<Summary> {
        self.ensure_initialized()?;

        let occupied = self.occupied_count();
        Ok(Summary {
            total_slots: self.total_slots,
            occupied_slots: occupied,
            available_slots: self.total_slots - occupied,
        })
    }

    /// Verify the pool invariants, describing the first violation found
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        if self.total_slots == 0 {
            return if self.occupied.is_empty() && self.free_slots.is_empty() {
                Ok(())
            } else {
                Err("uninitialized lot holds slots".to_string())
            };
        }

        let total = self.total_slots as usize;
        if self.occupied.len() + self.free_slots.len() != total {
            return Err(format!(
                "occupied ({}) + free ({}) != total ({})",
                self.occupied.len(),
                self.free_slots.len(),
                total
            ));
        }

        if !self.free_slots.is_valid_heap() {
            return Err("free-slot queue violates the heap property".to_string());
        }

        let mut seen = HashSet::with_capacity(total);
        for slot in self.free_slots.iter().chain(self.occupied.keys().copied()) {
            if slot == 0 || slot > self.total_slots {
                return Err(format!("slot {} out of range", slot));
            }
            if !seen.insert(slot) {
                return Err(format!("slot {} tracked twice", slot));
            }
        }

        if self.by_registration.len() != self.occupied.len() {
            return Err("registration index out of sync with registry".to_string());
        }
        for (registration, slot) in &self.by_registration {
            match self.occupied.get(slot) {
                Some(vehicle) if &vehicle.registration_number == registration => {}
                _ => return Err(format!("registration {} indexed to wrong slot", registration)),
            }
        }

        let smallest_free = (1..=self.total_slots).find(|slot| !self.occupied.contains_key(slot));
        if self.free_slots.peek_min() != smallest_free {
            return Err("queue minimum is not the smallest free slot".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car(registration: &str, color: &str) -> Vehicle {
        Vehicle::new(registration, color)
    }

    fn lot_with(slots: i64) -> ParkingLot {
        let mut lot = ParkingLot::new();
        lot.initialize(slots).unwrap();
        lot
    }

    #[test]
    fn test_operations_require_initialization() {
        let mut lot = ParkingLot::new();

        assert!(matches!(lot.expand(1), Err(Error::Uninitialized)));
        assert!(matches!(lot.park(car("A", "Red")), Err(Error::Uninitialized)));
        assert!(matches!(lot.clear_by_slot(1), Err(Error::Uninitialized)));
        assert!(matches!(lot.occupied_slots(), Err(Error::Uninitialized)));
        assert!(matches!(lot.registrations_by_color("Red"), Err(Error::Uninitialized)));
        assert!(matches!(lot.slot_by_registration("A"), Err(Error::Uninitialized)));
        assert!(matches!(lot.slots_by_color("Red"), Err(Error::Uninitialized)));
        assert!(matches!(lot.park_many(vec![car("A", "Red")]), Err(Error::Uninitialized)));
        assert!(matches!(lot.summary(), Err(Error::Uninitialized)));
        assert!(matches!(lot.ensure_initialized(), Err(Error::Uninitialized)));
    }

    #[test]
    fn test_initialize_rejects_non_positive() {
        let mut lot = ParkingLot::new();
        assert!(matches!(lot.initialize(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(lot.initialize(-3), Err(Error::InvalidArgument(_))));
        assert!(!lot.is_initialized());
    }

    #[test]
    fn test_initialize_respects_max_slots() {
        let mut lot = ParkingLot::with_config(PoolConfig {
            max_slots: 10,
            ..PoolConfig::default()
        });
        assert!(matches!(lot.initialize(11), Err(Error::InvalidArgument(_))));
        assert_eq!(lot.initialize(10).unwrap().total_slots, 10);
        assert!(matches!(lot.expand(1), Err(Error::InvalidArgument(_))));
        assert_eq!(lot.total_slots(), 10);
    }

    #[test]
    fn test_initialize_is_a_hard_reset() {
        let mut lot = lot_with(3);
        lot.park(car("A", "Red")).unwrap();
        lot.park(car("B", "Blue")).unwrap();

        assert_eq!(lot.initialize(2).unwrap(), PoolSize { total_slots: 2 });
        assert!(lot.occupied_slots().unwrap().is_empty());
        assert_eq!(lot.park(car("A", "Red")).unwrap().slot, 1);
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_lowest_first_allocation() {
        let mut lot = lot_with(5);
        for expected in 1..=5 {
            let allocation = lot.park(car(&format!("CAR-{}", expected), "White")).unwrap();
            assert_eq!(allocation.slot, expected);
        }
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_released_low_slot_is_preferred() {
        let mut lot = lot_with(3);
        lot.park(car("A", "Red")).unwrap();
        lot.park(car("B", "Red")).unwrap();

        assert_eq!(lot.clear_by_slot(1).unwrap(), Release { slot: 1 });
        assert_eq!(lot.next_free_slot(), Some(1));
        assert_eq!(lot.park(car("C", "Red")).unwrap().slot, 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut lot = lot_with(3);
        lot.park(car("ABC123", "Red")).unwrap();

        let err = lot.park(car("ABC123", "Blue")).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(ref reg) if reg == "ABC123"));
        assert_eq!(lot.summary().unwrap().occupied_slots, 1);

        // Allowed again once the first one has left
        lot.clear_by_registration("ABC123").unwrap();
        assert_eq!(lot.park(car("ABC123", "Blue")).unwrap().slot, 1);
    }

    #[test]
    fn test_park_rejects_blank_fields() {
        let mut lot = lot_with(2);
        assert!(matches!(lot.park(car("", "Red")), Err(Error::InvalidArgument(_))));
        assert!(matches!(lot.park(car("A", "  ")), Err(Error::InvalidArgument(_))));
        assert_eq!(lot.next_free_slot(), Some(1));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut lot = lot_with(1);
        lot.park(car("A", "Red")).unwrap();
        assert!(matches!(lot.park(car("B", "Red")), Err(Error::CapacityExceeded)));
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_expand_appends_free_slots() {
        let mut lot = lot_with(1);
        lot.park(car("A", "Red")).unwrap();

        assert!(matches!(lot.expand(0), Err(Error::InvalidArgument(_))));
        assert_eq!(lot.expand(2).unwrap().total_slots, 3);

        // Existing occupancy untouched
        assert_eq!(lot.slot_by_registration("A").unwrap(), 1);
        assert_eq!(lot.park(car("B", "Red")).unwrap().slot, 2);
        assert_eq!(lot.park(car("C", "Red")).unwrap().slot, 3);
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_clear_errors() {
        let mut lot = lot_with(2);
        lot.park(car("A", "Red")).unwrap();

        assert!(matches!(lot.clear_by_slot(2), Err(Error::NotFound(_))));
        assert!(matches!(lot.clear_by_slot(99), Err(Error::NotFound(_))));
        assert!(matches!(lot.clear_by_registration("ZZZ"), Err(Error::NotFound(_))));
        assert_eq!(lot.clear_by_registration("A").unwrap().slot, 1);
        assert!(matches!(lot.clear_by_slot(1), Err(Error::NotFound(_))));
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_clear_selector_from_parts() {
        assert_eq!(
            ClearSelector::from_parts(Some(3), None).unwrap(),
            ClearSelector::Slot(3)
        );
        assert_eq!(
            ClearSelector::from_parts(None, Some("ABC".to_string())).unwrap(),
            ClearSelector::Registration("ABC".to_string())
        );
        assert_eq!(
            ClearSelector::from_parts(Some(2), Some("ABC".to_string())).unwrap(),
            ClearSelector::Slot(2)
        );
        assert!(matches!(
            ClearSelector::from_parts(None, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ClearSelector::from_parts(None, Some(String::new())),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_occupied_slots_sorted() {
        let mut lot = lot_with(4);
        for reg in ["A", "B", "C", "D"] {
            lot.park(car(reg, "Grey")).unwrap();
        }
        lot.clear_by_slot(2).unwrap();
        lot.clear_by_slot(1).unwrap();
        lot.park(car("E", "Black")).unwrap();

        let slots: Vec<SlotNumber> = lot
            .occupied_slots()
            .unwrap()
            .into_iter()
            .map(|entry| entry.slot)
            .collect();
        assert_eq!(slots, vec![1, 3, 4]);
    }

    #[test]
    fn test_color_queries() {
        let mut lot = lot_with(4);
        lot.park(car("A", "Red")).unwrap();
        lot.park(car("B", "Blue")).unwrap();
        lot.park(car("C", "RED")).unwrap();

        assert_eq!(lot.registrations_by_color("red").unwrap(), vec!["A", "C"]);
        assert_eq!(lot.slots_by_color("Red").unwrap(), vec![1, 3]);
        assert!(matches!(lot.registrations_by_color("Green"), Err(Error::NotFound(_))));
        assert!(matches!(lot.slots_by_color("Green"), Err(Error::NotFound(_))));
        assert!(matches!(lot.slots_by_color(""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_color_queries_empty_success_when_configured() {
        let mut lot = ParkingLot::with_config(PoolConfig {
            empty_match_is_error: false,
            ..PoolConfig::default()
        });
        lot.initialize(2).unwrap();
        lot.park(car("A", "Red")).unwrap();

        assert!(lot.registrations_by_color("Green").unwrap().is_empty());
        assert!(lot.slots_by_color("Green").unwrap().is_empty());
    }

    #[test]
    fn test_park_many_with_exhaustion() {
        let mut lot = lot_with(1);
        let placements = lot.park_many(vec![car("A", "Red"), car("B", "Red")]).unwrap();

        assert_eq!(
            placements,
            vec![
                BatchPlacement {
                    registration_number: "A".to_string(),
                    allocated_slot: 1
                },
                BatchPlacement {
                    registration_number: "B".to_string(),
                    allocated_slot: UNPLACED
                },
            ]
        );
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_park_many_sentinels_duplicates() {
        let mut lot = lot_with(4);
        lot.park(car("X", "Blue")).unwrap();

        let placements = lot
            .park_many(vec![car("A", "Red"), car("A", "Red"), car("X", "Red"), car("B", "Red")])
            .unwrap();
        let slots: Vec<i64> = placements.iter().map(|p| p.allocated_slot).collect();
        assert_eq!(slots, vec![2, UNPLACED, UNPLACED, 3]);
        assert!(!placements[1].is_placed());
        lot.check_invariants().unwrap();
    }

    #[test]
    fn test_summary() {
        let mut lot = lot_with(5);
        lot.park(car("XYZ987", "Black")).unwrap();

        let summary = lot.summary().unwrap();
        assert_eq!(
            summary,
            Summary {
                total_slots: 5,
                occupied_slots: 1,
                available_slots: 4
            }
        );
        assert_eq!(lot.summary().unwrap(), summary);
    }

    #[test]
    fn test_from_config_pre_initializes() -> Result<()> {
        let lot = ParkingLot::from_config(PoolConfig {
            initial_slots: Some(4),
            ..PoolConfig::default()
        })?;
        assert_eq!(lot.total_slots(), 4);

        let lot = ParkingLot::from_config(PoolConfig::default())?;
        assert!(!lot.is_initialized());
        Ok(())
    }

    #[test]
    fn test_concrete_scenario() -> Result<()> {
        let mut lot = ParkingLot::new();
        assert_eq!(lot.initialize(2)?.total_slots, 2);
        assert_eq!(lot.park(car("ABC123", "Red"))?.slot, 1);
        assert_eq!(lot.park(car("DEF456", "Blue"))?.slot, 2);
        assert!(matches!(
            lot.park(car("GHI789", "Black")),
            Err(Error::CapacityExceeded)
        ));
        assert_eq!(lot.clear_by_slot(1)?.slot, 1);
        assert_eq!(lot.park(car("GHI789", "Black"))?.slot, 1);
        Ok(())
    }
}

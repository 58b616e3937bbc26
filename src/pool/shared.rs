//! Thread-safe handle to a parking lot

use super::lot::ParkingLot;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle that serializes every operation on one lot
///
/// `park` and `clear` check then mutate, so each call runs entirely
/// inside a single lock acquisition.
#[derive(Debug, Clone, Default)]
pub struct SharedParkingLot {
    inner: Arc<Mutex<ParkingLot>>,
}

impl SharedParkingLot {
    pub fn new(lot: ParkingLot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lot)),
        }
    }

    /// Run `f` with exclusive access to the lot
    pub fn with<R>(&self, f: impl FnOnce(&mut ParkingLot) -> R) -> R {
        let mut lot = self.inner.lock();
        f(&mut lot)
    }

    /// `(total, occupied)` read under the lock
    pub fn occupancy(&self) -> (u32, u32) {
        let lot = self.inner.lock();
        (lot.total_slots(), lot.occupied_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Vehicle;
    use std::thread;

    #[test]
    fn test_concurrent_parking_hands_out_distinct_slots() {
        let shared = SharedParkingLot::default();
        shared.with(|lot| lot.initialize(64)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    (0..8)
                        .map(|i| {
                            let car = Vehicle::new(format!("W{}-{}", worker, i), "Silver");
                            shared.with(|lot| lot.park(car)).map(|a| a.slot)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut slots: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .map(|r| r.unwrap())
            .collect();
        slots.sort_unstable();

        assert_eq!(slots, (1..=64).collect::<Vec<_>>());
        assert_eq!(shared.occupancy(), (64, 64));
        shared.with(|lot| lot.check_invariants()).unwrap();
    }
}

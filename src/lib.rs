// Carpark - parking slot allocation service
// Lowest-numbered-first slot allocator with a vehicle registry and HTTP API

#![warn(rust_2018_idioms)]

pub mod config;
pub mod metrics;
pub mod pool;
pub mod server;

// Re-exports for convenience
pub use crate::config::AppConfig;
pub use crate::pool::{ClearSelector, ParkingLot, PoolConfig, SharedParkingLot, Vehicle};

/// Carpark error types
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("{0}")]
        InvalidArgument(String),

        #[error("Parking lot has not been initialized")]
        Uninitialized,

        #[error("Parking lot is full")]
        CapacityExceeded,

        #[error("Car with registration number {0} is already parked")]
        DuplicateRegistration(String),

        #[error("{0}")]
        NotFound(String),
    }

    impl Error {
        /// Stable name of the error kind
        pub fn kind(&self) -> &'static str {
            match self {
                Error::InvalidArgument(_) => "invalid_argument",
                Error::Uninitialized => "uninitialized",
                Error::CapacityExceeded => "capacity_exceeded",
                Error::DuplicateRegistration(_) => "duplicate_registration",
                Error::NotFound(_) => "not_found",
            }
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

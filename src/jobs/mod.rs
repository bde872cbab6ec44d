//! Scheduled background jobs

mod cleanup;
mod single_flight;

pub use cleanup::MemoryCleanupJob;
pub use single_flight::{SingleFlight, SingleFlightGuard};

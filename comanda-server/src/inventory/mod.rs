//! Inventory ledger

pub mod ledger;

pub use ledger::{MAX_QUANTITY, ReservationPlan, adjust, release, release_units, reserve};

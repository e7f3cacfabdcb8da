//! Domain models for the pillbox tracker.

mod medication;

pub use medication::*;

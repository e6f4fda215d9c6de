//! Lot orchestrator.
//!
//! Tries levels in floor order, aggregates the free-spot counters, releases
//! spots on removal, and converts between the in-memory model and its
//! [`crate::LotSnapshot`] mirror.

pub mod state;

#[cfg(test)]
mod tests_state;

pub use state::*;

//! Dashboard state shared by the poller and the local server

pub mod in_flight;
pub mod signals;
pub mod synchronizer;

pub use synchronizer::{Dashboard, PollState, TickOutcome};

//! In-memory stores

pub mod snapshot;

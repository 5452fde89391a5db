//! Local HTTP server for the dashboard shell

pub mod handlers;
pub mod serve;
pub mod state;

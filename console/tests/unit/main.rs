//! Integration tests for dashsync

mod mock;
mod test_poller;
mod test_reconcile;
mod test_server;

//! Integration tests for the deployer library

mod mocks;
mod test_fsm;
mod test_server;
mod test_store;
mod test_walker;

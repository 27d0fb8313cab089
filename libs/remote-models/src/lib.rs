//! Wire models for the remote REST APIs used by the deployer.

pub mod models;

pub use models::{github, hub};

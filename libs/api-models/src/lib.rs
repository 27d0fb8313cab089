//! Request and response models for the gh2hf HTTP API.

pub mod models;

pub use models::*;

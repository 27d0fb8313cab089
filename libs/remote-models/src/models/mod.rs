//! Remote API models

pub mod github;
pub mod hub;

//! Deployment module

pub mod fsm;
pub mod job;
pub mod manifest;
pub mod orchestrator;
pub mod runner;

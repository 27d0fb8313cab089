//! GH2HF Deployer Library
//!
//! Publishes GitHub repositories that carry a Dockerfile as Hugging Face
//! Spaces and tracks each deployment as a pollable job.

pub mod app;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod errors;
pub mod github;
pub mod http;
pub mod hub;
pub mod logs;
pub mod remote;
pub mod server;
pub mod store;
pub mod utils;
pub mod workers;

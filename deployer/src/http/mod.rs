//! HTTP client plumbing shared by the remote hosts

pub mod client;

//! Upstream game server access

pub mod client;

pub use client::{UpstreamClient, UpstreamRequest};

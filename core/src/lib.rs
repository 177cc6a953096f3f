//! MiniUltiMaxConsole Core Library
//! Forwarding gateway for the console UI: route table, upstream client,
//! sample fixtures and configuration

pub mod config;
pub mod error;
pub mod fixtures;
pub mod proxy;

pub use error::GatewayError;

//! Request handlers

pub mod console;
pub mod health;

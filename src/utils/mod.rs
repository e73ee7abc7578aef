//! Shared constants for talking to the gateway.

pub mod constants;

pub use constants::*;

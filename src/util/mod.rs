//! Shared helpers: amount conversion and hex validation.

pub mod amount;
pub mod hex;

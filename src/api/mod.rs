//! Node API access.
//!
//! # Data Flow
//! ```text
//! ClientConfig (endpoint, timeouts)
//!     → client.rs (HTTP transport, tagged error decode)
//!     → provider.rs (typed queries, observer handle)
//!     → types.rs (wire structs)
//! ```

pub mod client;
pub mod provider;
pub mod types;

pub use client::{ApiClient, Params, RemoteCall, Verb};
pub use provider::Provider;
pub use types::{Forger, NextBlockGenerators, NodeState};

//! Client SDK for Nxt-family proof-of-stake nodes.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                 stakenet-sdk                  │
//!                      │                                               │
//!   Wallet / caller    │  ┌────────┐    ┌──────────┐    ┌──────────┐   │
//!   ───────────────────┼─▶│   tx   │───▶│   api    │───▶│  client  │───┼──▶ node HTTP API
//!                      │  │ state  │    │ provider │    │ (reqwest)│   │
//!                      │  │ machine│    └────┬─────┘    └──────────┘   │
//!                      │  └────────┘         │                         │
//!                      │                     ▼                         │
//!                      │               ┌──────────┐                    │
//!                      │               │ observer │  health loop +     │
//!                      │               │          │  block-wait loop   │
//!                      │               └──────────┘                    │
//!                      │  ┌─────────────────────────────────────────┐  │
//!                      │  │ cross-cutting: config, error, util,     │  │
//!                      │  │ wallet capability seams                 │  │
//!                      │  └─────────────────────────────────────────┘  │
//!                      └───────────────────────────────────────────────┘
//! ```
//!
//! A [`Provider`] fronts one node endpoint. Transactions walk a
//! guard-checked lifecycle (request → unsigned → signed → broadcast →
//! confirmed); the [`BlockObserver`] predicts block arrival from
//! forger hit times and notifies registered listeners.

pub mod api;
pub mod config;
pub mod error;
pub mod observer;
pub mod tx;
pub mod util;
pub mod wallet;

pub use api::{ApiClient, Provider, RemoteCall};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use observer::{BlockListener, BlockObserver};
pub use tx::{send_money, Transaction, TransactionState};
pub use wallet::{signer::TransactionSigner, Wallet, WalletView};

//! Shared test double: a scripted node behind the `RemoteCall` seam.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use stakenet_sdk::api::{Params, RemoteCall, Verb};
use stakenet_sdk::{ClientError, ClientResult};

/// Unsigned payment bytes: 96-byte header, zeroed 64-byte signature
/// window, 16-byte tail.
pub fn unsigned_bytes() -> String {
    format!("{}{}{}", "a1".repeat(96), "00".repeat(64), "e7".repeat(16))
}

/// Signature the fake signer produces.
pub fn signature() -> String {
    "1f".repeat(64)
}

/// Full hash handed out by the scripted broadcast.
pub fn full_hash() -> String {
    "3c".repeat(32)
}

/// In-process node double. Responses are derived from a handful of
/// mutable knobs so tests can script height growth, health flips and
/// confirmation visibility without any networking.
pub struct MockNode {
    pub height: AtomicU64,
    /// When set, every `getBlock` call bumps the height first.
    pub auto_mine: AtomicBool,
    pub healthy: AtomicBool,
    pub node_time: AtomicI64,
    /// Forger hit times returned by `getNextBlockGenerators`.
    pub hit_times: Mutex<Vec<i64>>,
    /// `getTransaction` payload; `None` means "unknown transaction".
    pub confirmed: Mutex<Option<Value>>,
    /// When set, `broadcastTransaction` is rejected.
    pub reject_broadcast: AtomicBool,
    /// Every requestType seen, in call order.
    pub calls: Mutex<Vec<String>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            height: AtomicU64::new(0),
            auto_mine: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            node_time: AtomicI64::new(46358100),
            hit_times: Mutex::new(vec![46358130]),
            confirmed: Mutex::new(None),
            reject_broadcast: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_height(&self, height: u64) {
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn set_confirmed(&self, payload: Option<Value>) {
        *self.confirmed.lock().unwrap() = payload;
    }

    pub fn calls_of(&self, request_type: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| *c == request_type)
            .count()
    }

    fn state_body(&self) -> Value {
        if self.healthy.load(Ordering::SeqCst) {
            json!({
                "numberOfBlocks": self.height.load(Ordering::SeqCst).max(1),
                "blockchainState": "UP_TO_DATE",
                "isLightClient": false,
                "isScanning": false,
                "isDownloading": false,
                "numberOfPeers": 14,
                "numberOfActivePeers": 8,
                "version": "1.0.0",
            })
        } else {
            json!({
                "numberOfBlocks": self.height.load(Ordering::SeqCst),
                "blockchainState": "DOWNLOADING",
                "isLightClient": false,
                "isScanning": false,
                "isDownloading": true,
                "numberOfPeers": 2,
                "numberOfActivePeers": 0,
                "version": "1.0.0",
            })
        }
    }
}

#[async_trait]
impl RemoteCall for MockNode {
    async fn call(&self, _verb: Verb, params: Params) -> ClientResult<Value> {
        let request_type = params
            .iter()
            .find(|(k, _)| k == "requestType")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(request_type.clone());

        match request_type.as_str() {
            "getBlock" => {
                if self.auto_mine.load(Ordering::SeqCst) {
                    self.height.fetch_add(1, Ordering::SeqCst);
                }
                Ok(json!({ "height": self.height.load(Ordering::SeqCst) }))
            }
            "getTime" => Ok(json!({ "time": self.node_time.load(Ordering::SeqCst) })),
            "getState" => Ok(self.state_body()),
            "getNextBlockGenerators" => {
                let generators: Vec<Value> = self
                    .hit_times
                    .lock()
                    .unwrap()
                    .iter()
                    .map(|hit_time| {
                        json!({
                            "account": "11573504389194551536",
                            "accountRS": "STK-N2L2-GZXR-NES8-CJMBC",
                            "hitTime": hit_time,
                            "deadline": 17,
                            "effectiveBalanceNXT": 464602,
                        })
                    })
                    .collect();
                Ok(json!({ "generators": generators, "height": self.height.load(Ordering::SeqCst) }))
            }
            "getTransaction" => match self.confirmed.lock().unwrap().clone() {
                Some(payload) => Ok(payload),
                None => Err(ClientError::NodeRejected {
                    code: 5,
                    description: "Unknown transaction".to_string(),
                }),
            },
            "sendMoney" => Ok(json!({
                "transactionJSON": { "feeNQT": "25000000" },
                "unsignedTransactionBytes": unsigned_bytes(),
            })),
            "broadcastTransaction" => {
                if self.reject_broadcast.load(Ordering::SeqCst) {
                    return Err(ClientError::NodeRejected {
                        code: 4,
                        description: "Incorrect \"transactionBytes\"".to_string(),
                    });
                }
                Ok(json!({
                    "fullHash": full_hash(),
                    "transaction": "12345678901234567890",
                }))
            }
            other => Err(ClientError::NodeRejected {
                code: 1,
                description: format!("Unknown request type: {other}"),
            }),
        }
    }
}

/// Signer double returning a fixed 64-byte signature.
pub struct FakeSigner;

#[async_trait]
impl stakenet_sdk::TransactionSigner for FakeSigner {
    async fn sign_bytes(&self, _unsigned_hex: &str) -> ClientResult<String> {
        Ok(signature())
    }
}

//! Typed node queries and the observer handle.
//!
//! A [`Provider`] is a cheap-clone handle over one node endpoint. It
//! exposes the request types the SDK consumes as typed methods, and it
//! owns the lazily created [`BlockObserver`] for that endpoint: the
//! observer is built on the first listener registration and torn down
//! when the listener set empties, so background work only runs while
//! somebody is listening.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::{ApiClient, Params, RemoteCall, Verb};
use crate::api::types::{NextBlockGenerators, NodeState};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::observer::{schedule, BlockListener, BlockObserver};

/// Handle to one node endpoint.
#[derive(Clone)]
pub struct Provider {
    remote: Arc<dyn RemoteCall>,
    config: Arc<ClientConfig>,
    observer: Arc<Mutex<Option<Arc<BlockObserver>>>>,
}

impl Provider {
    /// Connect to the endpoint in `config` over HTTP.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = ApiClient::new(&config)?;
        Ok(Self::with_transport(Arc::new(client), config))
    }

    /// Build a provider over an arbitrary transport. Test doubles and
    /// alternative transports plug in here.
    pub fn with_transport(remote: Arc<dyn RemoteCall>, config: ClientConfig) -> Self {
        Self {
            remote,
            config: Arc::new(config),
            observer: Arc::new(Mutex::new(None)),
        }
    }

    /// The configuration this provider was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A clone that shares the transport but not the observer slot.
    /// The observer's internal provider must not keep its own handle
    /// alive through the slot it is stored in.
    fn detached(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            config: Arc::clone(&self.config),
            observer: Arc::new(Mutex::new(None)),
        }
    }

    fn request(name: &str, extra: &[(&str, String)]) -> Params {
        let mut params: Params = vec![("requestType".to_string(), name.to_string())];
        for (key, value) in extra {
            params.push((key.to_string(), value.clone()));
        }
        params
    }

    fn field_u64(body: &Value, field: &str) -> ClientResult<u64> {
        body.get(field)
            .and_then(Value::as_u64)
            .ok_or_else(|| ClientError::Decode(format!("missing numeric field '{field}'")))
    }

    // ----- queries -----

    /// Height of the latest block.
    pub async fn block_height(&self) -> ClientResult<u64> {
        let body = self.call(Verb::Get, Self::request("getBlock", &[])).await?;
        Self::field_u64(&body, "height")
    }

    /// The node's relative clock, in seconds since genesis.
    pub async fn node_time(&self) -> ClientResult<i64> {
        let body = self.call(Verb::Get, Self::request("getTime", &[])).await?;
        body.get("time")
            .and_then(Value::as_i64)
            .ok_or_else(|| ClientError::Decode("missing numeric field 'time'".to_string()))
    }

    /// Full node status report.
    pub async fn node_state(&self) -> ClientResult<NodeState> {
        let body = self.call(Verb::Get, Self::request("getState", &[])).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Upcoming block-producer candidates, ascending by hit time.
    pub async fn next_block_generators(&self) -> ClientResult<NextBlockGenerators> {
        let limit = self.config.generator_limit.to_string();
        let body = self
            .call(
                Verb::Get,
                Self::request("getNextBlockGenerators", &[("limit", limit)]),
            )
            .await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Account balance in NQT.
    pub async fn balance(&self, account_rs: &str) -> ClientResult<String> {
        let body = self
            .call(
                Verb::Get,
                Self::request("getBalance", &[("account", account_rs.to_string())]),
            )
            .await?;
        body.get("balanceNQT")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Decode("missing field 'balanceNQT'".to_string()))
    }

    /// Public key registered for an account, if any.
    pub async fn public_key(&self, account_rs: &str) -> ClientResult<String> {
        let body = self
            .call(
                Verb::Get,
                Self::request("getAccountPublicKey", &[("account", account_rs.to_string())]),
            )
            .await?;
        body.get("publicKey")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Decode("missing field 'publicKey'".to_string()))
    }

    /// Look a transaction up by its full hash. The confirmed
    /// transaction JSON is returned as-is.
    pub async fn transaction_by_full_hash(&self, full_hash: &str) -> ClientResult<Value> {
        self.call(
            Verb::Get,
            Self::request("getTransaction", &[("fullHash", full_hash.to_string())]),
        )
        .await
    }

    /// Ask the node to parse raw transaction bytes back into JSON.
    pub async fn parse_transaction(&self, transaction_bytes: &str) -> ClientResult<Value> {
        self.call(
            Verb::Get,
            Self::request(
                "parseTransaction",
                &[("transactionBytes", transaction_bytes.to_string())],
            ),
        )
        .await
    }

    /// Paged transaction history for an account, outbound or inbound,
    /// optionally filtered by type/subtype.
    pub async fn account_transactions(
        &self,
        outbound: bool,
        account_rs: &str,
        page_size: u32,
        page: u32,
        type_filter: Option<(u32, Option<u32>)>,
    ) -> ClientResult<Vec<Value>> {
        let mut extra = vec![
            ("pageSize", page_size.to_string()),
            ("page", page.to_string()),
        ];
        if outbound {
            extra.push(("filterBySender", account_rs.to_string()));
        } else {
            extra.push(("filterByReceiver", account_rs.to_string()));
        }
        if let Some((tx_type, subtype)) = type_filter {
            extra.push(("filterByType", tx_type.to_string()));
            if let Some(subtype) = subtype {
                extra.push(("filterBySubtype", subtype.to_string()));
            }
        }
        let body = self
            .call(Verb::Get, Self::request("getTransactionsBulk", &extra))
            .await?;
        let transactions = body
            .get("Transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::Decode("missing field 'Transactions'".to_string()))?;
        Ok(transactions.clone())
    }

    /// Health verdict for the node. Transport failures degrade to
    /// `false` instead of surfacing; a network blip must not kill the
    /// observer loops built on top of this.
    pub async fn is_node_healthy(&self) -> bool {
        match self.node_state().await {
            Ok(state) => state.is_healthy(),
            Err(e) => {
                tracing::debug!(error = %e, "health probe failed, reporting unhealthy");
                false
            }
        }
    }

    /// Fetch node time and forger predictions, and turn them into the
    /// sleep schedule for one block-wait attempt.
    pub async fn block_wait_schedule(&self, timeout_secs: u64) -> ClientResult<Vec<Duration>> {
        let (time, generators) = tokio::join!(self.node_time(), self.next_block_generators());
        Ok(schedule::sleep_schedule(
            time?,
            &generators?.generators,
            timeout_secs,
        ))
    }

    // ----- observer handle -----

    /// Get or lazily create the observer for this endpoint.
    pub fn observer(&self) -> Arc<BlockObserver> {
        let mut slot = self.observer.lock().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(observer) => Arc::clone(observer),
            None => {
                let observer = BlockObserver::new(self.detached());
                *slot = Some(Arc::clone(&observer));
                observer
            }
        }
    }

    /// Register a block listener, creating and starting the observer
    /// if this is the first one.
    pub fn add_block_listener(&self, listener: Arc<dyn BlockListener>) {
        self.observer().add_listener(listener);
    }

    /// Remove a previously registered listener (matched by identity).
    /// Removing the last listener stops the observer loops and drops
    /// the observer; a later registration builds a fresh one.
    pub fn remove_block_listener(&self, listener: &Arc<dyn BlockListener>) {
        let mut slot = self.observer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(observer) = slot.as_ref() {
            observer.remove_listener(listener);
            if observer.listener_count() == 0 {
                *slot = None;
            }
        }
    }

    /// Remove every listener and stop the observer.
    pub fn remove_all_block_listeners(&self) {
        let mut slot = self.observer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(observer) = slot.take() {
            observer.remove_all_listeners();
        }
    }

    /// Wait for the next block, bounded by `timeout_secs`. Runs one
    /// health check first so a cold observer has a current verdict.
    ///
    /// Returns the new height, or `None` if no block arrived within
    /// the predicted window.
    pub async fn wait_for_new_block(&self, timeout_secs: u64) -> ClientResult<Option<u64>> {
        let observer = self.observer();
        observer.check_health().await;
        observer.wait_block(timeout_secs).await
    }
}

#[async_trait]
impl RemoteCall for Provider {
    async fn call(&self, verb: Verb, params: Params) -> ClientResult<Value> {
        self.remote.call(verb, params).await
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

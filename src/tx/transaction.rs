//! Transaction lifecycle state machine.
//!
//! Every transaction walks the same five steps, strictly in order:
//!
//! 1. build the request JSON (local)
//! 2. turn it into unsigned bytes (remote)
//! 3. sign the bytes (local, via a signer capability)
//! 4. broadcast the signed bytes (remote)
//! 5. optionally wait for confirmation (remote)
//!
//! Each step is fenced by a `can_*` guard; an operation invoked out
//! of order fails with [`ClientError::InvalidState`] and never
//! mutates the transaction. Step 2 additionally refuses to transmit a
//! request carrying a secret credential.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, Instant};

use crate::api::{Params, Provider, RemoteCall, Verb};
use crate::error::{ClientError, ClientResult};
use crate::util::{amount, hex};
use crate::wallet::signer::{apply_signature, TransactionSigner};

/// Request fields that must never reach the network. Their presence
/// in a request JSON means a caller put a credential where only
/// public data belongs.
const SECRET_FIELDS: [&str; 3] = ["secretPhrase", "privateKey", "passphrase"];

/// Lifecycle position of a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Construction failed; no operation is possible. Kept for wire
    /// parity, not produced by this crate's constructors.
    Error,
    RequestCreated,
    Unsigned,
    Signed,
    Broadcasted,
    Confirmed,
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionState::Error => "error",
            TransactionState::RequestCreated => "request_created",
            TransactionState::Unsigned => "unsigned",
            TransactionState::Signed => "signed",
            TransactionState::Broadcasted => "broadcasted",
            TransactionState::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

/// Flat request parameters for a transaction-create call.
///
/// The node takes flat string fields, so the request is a string map
/// rather than a typed struct; that also lets the secret-credential
/// guard inspect whatever a caller actually put in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    params: BTreeMap<String, String>,
}

impl TransactionRequest {
    /// Start a request for the given node `requestType`.
    pub fn new(request_type: &str) -> Self {
        let mut params = BTreeMap::new();
        params.insert("requestType".to_string(), request_type.to_string());
        Self { params }
    }

    /// Set one flat field.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Read one field back.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &str, value: String) {
        self.params.insert(key.to_string(), value);
    }

    /// First secret field present, if any.
    fn secret_field(&self) -> Option<&'static str> {
        SECRET_FIELDS
            .iter()
            .find(|field| self.params.contains_key(**field))
            .copied()
    }

    fn to_params(&self) -> Params {
        self.params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Broadcast acknowledgement from the node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    /// Unique transaction identifier used for confirmation lookups.
    pub full_hash: String,
    /// Numeric transaction id, as a string.
    pub transaction: String,
}

/// One transaction, from intent to (optionally) confirmation.
///
/// Exclusively owned by its caller; lifecycle operations take `&mut
/// self` so the compiler enforces the no-concurrent-mutation
/// contract.
#[derive(Debug, Clone)]
pub struct Transaction {
    state: TransactionState,
    request: Option<TransactionRequest>,
    unsigned_bytes: Option<String>,
    signed_bytes: Option<String>,
    transaction_id: Option<String>,
    full_hash: Option<String>,
    confirmed: Option<Value>,
}

impl Transaction {
    /// Step 1: start from a request JSON.
    pub fn from_request(request: TransactionRequest) -> Self {
        Self {
            state: TransactionState::RequestCreated,
            request: Some(request),
            unsigned_bytes: None,
            signed_bytes: None,
            transaction_id: None,
            full_hash: None,
            confirmed: None,
        }
    }

    /// Entry point for the externally signed workflow (hardware
    /// signer round trips and the like): adopt raw transaction bytes
    /// that were produced elsewhere.
    pub fn from_bytes(bytes_hex: &str, signed: bool) -> ClientResult<Self> {
        if !hex::is_hex(bytes_hex) {
            return Err(ClientError::InvalidHex(bytes_hex.to_string()));
        }
        let mut tx = Self {
            state: if signed {
                TransactionState::Signed
            } else {
                TransactionState::Unsigned
            },
            request: None,
            unsigned_bytes: None,
            signed_bytes: None,
            transaction_id: None,
            full_hash: None,
            confirmed: None,
        };
        if signed {
            tx.signed_bytes = Some(bytes_hex.to_string());
        } else {
            tx.unsigned_bytes = Some(bytes_hex.to_string());
        }
        Ok(tx)
    }

    // ----- getters -----

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn request(&self) -> Option<&TransactionRequest> {
        self.request.as_ref()
    }

    pub fn unsigned_bytes(&self) -> Option<&str> {
        self.unsigned_bytes.as_deref()
    }

    pub fn signed_bytes(&self) -> Option<&str> {
        self.signed_bytes.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn full_hash(&self) -> Option<&str> {
        self.full_hash.as_deref()
    }

    pub fn confirmed_json(&self) -> Option<&Value> {
        self.confirmed.as_ref()
    }

    fn invalid_state(&self, operation: &'static str) -> ClientError {
        ClientError::InvalidState {
            operation,
            state: self.state,
        }
    }

    // ----- step 1 helpers (local) -----

    /// Ask the node what fee it would charge for this request,
    /// without committing to anything. The request is sent with the
    /// fee forced to zero; the answer comes back in display units.
    pub async fn calculate_fee(&self, remote: &dyn RemoteCall) -> ClientResult<String> {
        let request = self
            .request
            .as_ref()
            .ok_or_else(|| self.invalid_state("calculate_fee"))?;
        let mut probe = request.clone();
        probe.set("feeNQT", "0".to_string());
        let body = remote.call(Verb::Post, probe.to_params()).await?;
        let fee_nqt = body
            .get("transactionJSON")
            .and_then(|t| t.get("feeNQT"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::Decode("missing field 'transactionJSON.feeNQT'".to_string())
            })?;
        amount::nqt_to_display(fee_nqt)
    }

    /// Set the fee, in display units. Only possible before the
    /// unsigned bytes exist.
    pub fn set_fee(&mut self, fee_display: &str) -> ClientResult<()> {
        if self.state != TransactionState::RequestCreated {
            return Err(self.invalid_state("set_fee"));
        }
        let fee_nqt = amount::display_to_nqt(fee_display)?;
        match self.request.as_mut() {
            Some(request) => {
                request.set("feeNQT", fee_nqt);
                Ok(())
            }
            None => Err(self.invalid_state("set_fee")),
        }
    }

    // ----- step 2 (remote) -----

    pub fn can_create_unsigned(&self) -> bool {
        self.state == TransactionState::RequestCreated && self.request.is_some()
    }

    /// Send the request JSON to the node and adopt the unsigned bytes
    /// it returns. Refuses outright if the request carries a secret
    /// credential; that check runs before any network I/O.
    pub async fn create_unsigned(&mut self, remote: &dyn RemoteCall) -> ClientResult<()> {
        if let Some(field) = self.request.as_ref().and_then(TransactionRequest::secret_field) {
            return Err(ClientError::SecretLeak { field });
        }
        let Some(request) = self.request.as_ref().filter(|_| self.can_create_unsigned()) else {
            return Err(self.invalid_state("create_unsigned"));
        };
        let body = remote.call(Verb::Post, request.to_params()).await?;
        let bytes = body
            .get("unsignedTransactionBytes")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ClientError::Decode("missing field 'unsignedTransactionBytes'".to_string())
            })?;
        if !hex::is_hex(bytes) {
            return Err(ClientError::InvalidHex(bytes.to_string()));
        }
        self.unsigned_bytes = Some(bytes.to_string());
        self.state = TransactionState::Unsigned;
        Ok(())
    }

    // ----- step 3 (local) -----

    pub fn can_be_signed(&self) -> bool {
        self.state == TransactionState::Unsigned && hex::is_hex_opt(self.unsigned_bytes.as_deref())
    }

    /// Sign the unsigned bytes with the given signer capability. The
    /// computed signature replaces the fixed signature window inside
    /// the byte string.
    pub async fn sign(&mut self, signer: &dyn TransactionSigner) -> ClientResult<()> {
        let Some(unsigned) = self.unsigned_bytes.as_deref().filter(|_| self.can_be_signed())
        else {
            return Err(self.invalid_state("sign"));
        };
        let signature = signer.sign_bytes(unsigned).await?;
        let signed = apply_signature(unsigned, &signature)?;
        self.signed_bytes = Some(signed);
        self.state = TransactionState::Signed;
        Ok(())
    }

    // ----- step 4 (remote) -----

    pub fn can_broadcast(&self) -> bool {
        self.state == TransactionState::Signed && hex::is_hex_opt(self.signed_bytes.as_deref())
    }

    /// Submit the signed bytes and record the node's receipt.
    pub async fn broadcast(&mut self, remote: &dyn RemoteCall) -> ClientResult<BroadcastReceipt> {
        let Some(signed) = self.signed_bytes.clone().filter(|_| self.can_broadcast()) else {
            return Err(self.invalid_state("broadcast"));
        };
        let body = remote
            .call(
                Verb::Post,
                vec![
                    ("requestType".to_string(), "broadcastTransaction".to_string()),
                    ("transactionBytes".to_string(), signed),
                ],
            )
            .await?;
        let receipt: BroadcastReceipt =
            serde_json::from_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        self.transaction_id = Some(receipt.transaction.clone());
        self.full_hash = Some(receipt.full_hash.clone());
        self.state = TransactionState::Broadcasted;
        tracing::info!(full_hash = %receipt.full_hash, "transaction broadcast");
        Ok(receipt)
    }

    // ----- step 5, optional (remote) -----

    pub fn can_wait_confirmation(&self) -> bool {
        self.state == TransactionState::Broadcasted && self.full_hash.is_some()
    }

    /// Wait until the transaction appears in a block, bounded by
    /// `timeout_secs`. Statistically this takes around half a minute,
    /// but it can stretch to several, depending on the active forgers.
    ///
    /// Each round waits for the next observed block, then looks the
    /// transaction up by full hash. Lookup failures of any kind count
    /// as "not yet confirmed" and the loop keeps going until the
    /// deadline.
    pub async fn wait_confirmation(
        &mut self,
        provider: &Provider,
        timeout_secs: u64,
    ) -> ClientResult<Value> {
        let Some(full_hash) = self.full_hash.clone().filter(|_| self.can_wait_confirmation())
        else {
            return Err(self.invalid_state("wait_confirmation"));
        };
        let poll_pause = Duration::from_secs(provider.config().confirmation_poll_secs);
        let started = Instant::now();
        let deadline = Duration::from_secs(timeout_secs);

        loop {
            if provider.wait_for_new_block(timeout_secs).await?.is_some() {
                match provider.transaction_by_full_hash(&full_hash).await {
                    Ok(json) => {
                        self.confirmed = Some(json.clone());
                        self.state = TransactionState::Confirmed;
                        tracing::info!(full_hash = %full_hash, "transaction confirmed");
                        return Ok(json);
                    }
                    Err(e) => {
                        // Not in a block yet, or the query itself
                        // failed; either way, keep waiting.
                        tracing::debug!(error = %e, "confirmation lookup came back empty");
                    }
                }
            }
            sleep(poll_pause).await;
            if started.elapsed() >= deadline {
                return Err(ClientError::ConfirmationTimeout {
                    waited_secs: timeout_secs,
                });
            }
        }
    }
}

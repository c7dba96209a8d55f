//! Wallet capability tiers.
//!
//! Capabilities compose instead of inheriting: a [`WalletView`] can
//! only read public account data, and a [`Wallet`] is a view plus a
//! held [`TransactionSigner`]. Key derivation, address encoding and
//! passphrase handling are external capabilities; nothing in this
//! module ever sees a private key.

pub mod signer;

use std::sync::Arc;

use serde_json::Value;

use crate::api::Provider;
use crate::error::{ClientError, ClientResult};
use crate::tx::{send_money, Transaction};
use crate::wallet::signer::TransactionSigner;

/// Read-only view of an account: RS address, optional public key,
/// optional provider connection.
#[derive(Debug, Clone)]
pub struct WalletView {
    account_rs: String,
    public_key: Option<String>,
    provider: Option<Provider>,
}

impl WalletView {
    pub fn new(account_rs: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            account_rs: account_rs.into(),
            public_key,
            provider: None,
        }
    }

    /// Attach a provider, enabling the network-backed operations.
    pub fn connect(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn account_rs(&self) -> &str {
        &self.account_rs
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn provider(&self) -> ClientResult<&Provider> {
        self.provider.as_ref().ok_or(ClientError::MissingProvider)
    }

    /// Account balance in NQT.
    pub async fn balance(&self) -> ClientResult<String> {
        self.provider()?.balance(&self.account_rs).await
    }

    /// Paged transaction history, outbound or inbound.
    pub async fn transactions(
        &self,
        outbound: bool,
        page_size: u32,
        page: u32,
    ) -> ClientResult<Vec<Value>> {
        self.provider()?
            .account_transactions(outbound, &self.account_rs, page_size, page, None)
            .await
    }

    /// Build a payment from this account and run it through the node
    /// to obtain the unsigned bytes.
    pub async fn create_send_money(
        &self,
        recipient_rs: &str,
        amount_nqt: &str,
    ) -> ClientResult<Transaction> {
        let public_key = self
            .public_key
            .as_deref()
            .ok_or(ClientError::MissingPublicKey)?;
        let provider = self.provider()?;
        let mut tx = send_money(recipient_rs, amount_nqt, public_key);
        tx.create_unsigned(provider).await?;
        Ok(tx)
    }
}

/// A full wallet: public view plus a signer held by composition.
#[derive(Clone)]
pub struct Wallet {
    view: WalletView,
    signer: Arc<dyn TransactionSigner>,
}

impl Wallet {
    pub fn new(view: WalletView, signer: Arc<dyn TransactionSigner>) -> Self {
        Self { view, signer }
    }

    /// The read-only capability of this wallet.
    pub fn view(&self) -> &WalletView {
        &self.view
    }

    /// The signing capability of this wallet.
    pub fn signer(&self) -> Arc<dyn TransactionSigner> {
        Arc::clone(&self.signer)
    }

    /// Build, sign and broadcast a payment in one call. The returned
    /// transaction is in the broadcasted state; the caller may drive
    /// `wait_confirmation` on it.
    pub async fn send(&self, recipient_rs: &str, amount_nqt: &str) -> ClientResult<Transaction> {
        let mut tx = self.view.create_send_money(recipient_rs, amount_nqt).await?;
        tx.sign(self.signer.as_ref()).await?;
        tx.broadcast(self.view.provider()?).await?;
        Ok(tx)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // signer deliberately opaque
        f.debug_struct("Wallet").field("view", &self.view).finish()
    }
}

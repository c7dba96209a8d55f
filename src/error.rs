//! SDK-wide error definitions.

use thiserror::Error;

use crate::tx::TransactionState;

/// Errors that can occur during SDK operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A lifecycle operation was invoked while its guard precondition
    /// was false. Always a caller bug; never retried.
    #[error("{operation} cannot run while transaction is in state {state}")]
    InvalidState {
        operation: &'static str,
        state: TransactionState,
    },

    /// The request JSON carries a secret credential that was about to
    /// be sent to the node. Refused before any network I/O.
    #[error("request contains secret credential field '{field}'; refusing to send it to the node")]
    SecretLeak { field: &'static str },

    /// The node returned its error shape `{errorCode, errorDescription}`.
    /// Decoded once at the transport boundary; surfaced verbatim.
    #[error("node rejected request (code {code}): {description}")]
    NodeRejected { code: i64, description: String },

    /// `wait_confirmation` exhausted its deadline without seeing the
    /// transaction in a block.
    #[error("transaction not confirmed within {waited_secs} seconds")]
    ConfirmationTimeout { waited_secs: u64 },

    /// HTTP request failed (connection, TLS, timeout at the socket level).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request to the node timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The node answered with something that is not the expected JSON.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// Endpoint URL could not be parsed or joined.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    /// A hex string failed validation (odd length or non-hex digit).
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// A display-unit amount string could not be converted exactly.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A wallet operation needs a connected provider.
    #[error("wallet operation requires a connected provider")]
    MissingProvider,

    /// A wallet operation needs the account public key.
    #[error("wallet has no public key on record")]
    MissingPublicKey,

    /// Signer capability failed.
    #[error("signer error: {0}")]
    Signer(String),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type for SDK operations.
pub type ClientResult<T> = Result<T, ClientError>;

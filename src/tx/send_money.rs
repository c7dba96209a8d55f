//! Payment request construction.

use crate::tx::transaction::{Transaction, TransactionRequest};

/// Default request deadline, in minutes.
pub const DEFAULT_DEADLINE_MINUTES: u32 = 1440;

/// Default fee attempted when the caller does not calculate one:
/// 1 display unit.
pub const DEFAULT_FEE_NQT: &str = "100000000";

/// Build a payment transaction: `amount_nqt` to `recipient_rs`, sent
/// by the account behind `sender_public_key`.
///
/// The fee defaults to 1 display unit; use
/// [`Transaction::calculate_fee`] and [`Transaction::set_fee`] to
/// replace it with what the node would actually charge.
pub fn send_money(recipient_rs: &str, amount_nqt: &str, sender_public_key: &str) -> Transaction {
    let request = TransactionRequest::new("sendMoney")
        .with("recipient", recipient_rs)
        .with("amountNQT", amount_nqt)
        .with("publicKey", sender_public_key)
        .with("feeNQT", DEFAULT_FEE_NQT)
        .with("deadline", DEFAULT_DEADLINE_MINUTES.to_string());
    Transaction::from_request(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TransactionState;

    #[test]
    fn test_send_money_request_fields() {
        let tx = send_money("STK-43MP-76UW-L69N-ALW39", "10000", &"ab".repeat(32));
        assert_eq!(tx.state(), TransactionState::RequestCreated);

        let request = tx.request().unwrap();
        assert_eq!(request.get("requestType"), Some("sendMoney"));
        assert_eq!(request.get("recipient"), Some("STK-43MP-76UW-L69N-ALW39"));
        assert_eq!(request.get("amountNQT"), Some("10000"));
        assert_eq!(request.get("feeNQT"), Some(DEFAULT_FEE_NQT));
        assert_eq!(request.get("deadline"), Some("1440"));
    }
}

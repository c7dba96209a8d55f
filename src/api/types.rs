//! Wire types for node query responses.

use serde::{Deserialize, Serialize};

/// Response of `getState`, reduced to the fields the health verdict
/// and diagnostics use. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub number_of_blocks: u64,
    pub blockchain_state: String,
    pub is_light_client: bool,
    pub is_scanning: bool,
    pub is_downloading: bool,
    pub number_of_peers: u64,
    pub number_of_active_peers: u64,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub last_block: Option<String>,
}

impl NodeState {
    /// The conjunction behind the observer's health verdict: a node is
    /// healthy when it is fully synced, not a light client, idle, and
    /// well connected.
    pub fn is_healthy(&self) -> bool {
        self.number_of_blocks > 0
            && self.blockchain_state == "UP_TO_DATE"
            && !self.is_light_client
            && !self.is_scanning
            && !self.is_downloading
            && self.number_of_peers > 5
            && self.number_of_active_peers > 2
    }
}

/// One block-producer candidate from `getNextBlockGenerators`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Forger {
    pub account: String,
    #[serde(rename = "accountRS")]
    pub account_rs: String,
    /// Blockchain-relative timestamp at which this candidate is
    /// predicted eligible to produce a block.
    pub hit_time: i64,
    #[serde(default)]
    pub deadline: i64,
    #[serde(rename = "effectiveBalanceNXT", default)]
    pub effective_balance: u64,
}

/// Response of `getNextBlockGenerators`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBlockGenerators {
    pub generators: Vec<Forger>,
    #[serde(default)]
    pub height: u64,
    #[serde(default)]
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn healthy_state() -> NodeState {
        NodeState {
            number_of_blocks: 100,
            blockchain_state: "UP_TO_DATE".to_string(),
            is_light_client: false,
            is_scanning: false,
            is_downloading: false,
            number_of_peers: 12,
            number_of_active_peers: 6,
            version: None,
            last_block: None,
        }
    }

    #[test]
    fn test_health_verdict() {
        assert!(healthy_state().is_healthy());

        let mut state = healthy_state();
        state.blockchain_state = "DOWNLOADING".to_string();
        assert!(!state.is_healthy());

        let mut state = healthy_state();
        state.number_of_peers = 5; // boundary: must be strictly > 5
        assert!(!state.is_healthy());

        let mut state = healthy_state();
        state.number_of_active_peers = 2; // boundary: must be strictly > 2
        assert!(!state.is_healthy());

        let mut state = healthy_state();
        state.is_scanning = true;
        assert!(!state.is_healthy());
    }

    #[test]
    fn test_forger_decode() {
        let forger: Forger = serde_json::from_value(json!({
            "effectiveBalanceNXT": 464602,
            "accountRS": "STK-N2L2-GZXR-NES8-CJMBC",
            "deadline": 12,
            "account": "11573504389194551536",
            "hitTime": 46358130
        }))
        .unwrap();
        assert_eq!(forger.hit_time, 46358130);
        assert_eq!(forger.account_rs, "STK-N2L2-GZXR-NES8-CJMBC");
    }
}

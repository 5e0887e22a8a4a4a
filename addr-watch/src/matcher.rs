use crate::feed::{TransactionRecord, TransactionSummary, TxFeed, TxSource};
use serde::{Deserialize, Serialize};

/// True if the first input of any record spends from `address`.
///
/// Only the first input of each transaction is inspected. A transaction that
/// spends from the watched address in a later input is not reported; this
/// mirrors the behavior operators of the tool rely on today.
pub fn sent_from(txs: &[TransactionRecord], address: &str) -> bool {
    txs.iter()
        .any(|tx| tx.first_sender() == Some(address))
}

/// True if any output of any record pays to `address`. All outputs are scanned.
pub fn received_by(txs: &[TransactionRecord], address: &str) -> bool {
    txs.iter().any(|tx| tx.pays_to(address))
}

/// Keeps the records that carry a first sender, a first receiver and a first
/// amount, in feed order.
pub fn flatten_history(txs: &[TransactionRecord]) -> Vec<TransactionSummary> {
    txs.iter().filter_map(TransactionRecord::summary).collect()
}

/// Fetches one history page for `address` and flattens it. Empty on failure.
pub async fn history<S: TxSource + ?Sized>(source: &S, address: &str) -> Vec<TransactionSummary> {
    match source.history(address).await {
        Some(history) => {
            let summaries = flatten_history(&history.txs);
            info!(
                "History for {}: {} records fetched, {} summarized",
                address,
                history.txs.len(),
                summaries.len()
            );
            summaries
        }
        None => Vec::new(),
    }
}

/// Watched address with its send/receive flags for one feed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTarget {
    pub address: String,
    pub has_sent: bool,
    pub has_received: bool,
}

impl WatchTarget {
    pub fn evaluate(address: &str, feed: &TxFeed) -> Self {
        Self {
            address: address.to_string(),
            has_sent: sent_from(feed.records(), address),
            has_received: received_by(feed.records(), address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{AddressHistory, TxInput, TxOutput};
    use async_trait::async_trait;
    use serde_json::json;

    fn example_feed() -> TxFeed {
        TxFeed::from_value(json!({
            "txs": [{
                "inputs": [{"prev_out": {"addr": "A"}}],
                "out": [{"addr": "B"}]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_example_feed() {
        let feed = example_feed();
        assert!(sent_from(feed.records(), "A"));
        assert!(!received_by(feed.records(), "A"));
        assert!(received_by(feed.records(), "B"));
        assert!(!sent_from(feed.records(), "B"));

        let target = WatchTarget::evaluate("A", &feed);
        assert!(target.has_sent);
        assert!(!target.has_received);
    }

    #[test]
    fn test_sent_from_checks_first_input_only() {
        let txs = vec![TransactionRecord::new(
            vec![TxInput::from_address("other"), TxInput::from_address("watch_address")],
            vec![TxOutput::new("B", Some(1))],
        )];
        assert!(!sent_from(&txs, "watch_address"));

        let txs = vec![
            TransactionRecord::new(vec![TxInput::from_address("other")], vec![]),
            TransactionRecord::new(vec![TxInput::from_address("watch_address")], vec![]),
        ];
        assert!(sent_from(&txs, "watch_address"));
    }

    #[test]
    fn test_received_by_scans_all_outputs() {
        let txs = vec![TransactionRecord::new(
            vec![TxInput::from_address("other")],
            vec![
                TxOutput::new("B", Some(1)),
                TxOutput::default(),
                TxOutput::new("watch_address", Some(2)),
            ],
        )];
        assert!(received_by(&txs, "watch_address"));
        assert!(!received_by(&txs, "C"));
    }

    #[test]
    fn test_no_match() {
        let feed = TxFeed::from_value(json!({
            "txs": [{
                "inputs": [{"prev_out": {"addr": "other_address"}}],
                "out": [{"addr": "other_address"}]
            }]
        }))
        .unwrap();

        let target = WatchTarget::evaluate("watch_address", &feed);
        assert!(!target.has_sent);
        assert!(!target.has_received);
    }

    #[test]
    fn test_records_without_expected_fields() {
        // Send-only and receive-only shapes, as well as empty records
        let feed = TxFeed::from_value(json!({
            "txs": [
                {},
                {"inputs": []},
                {"inputs": [{}]},
                {"out": [{"value": 5}]},
                {"inputs": [{"prev_out": {"addr": "watch_address"}}]},
            ]
        }))
        .unwrap();
        assert!(sent_from(feed.records(), "watch_address"));
        assert!(!received_by(feed.records(), "watch_address"));

        let feed = TxFeed::from_value(json!({"txs": [{"out": [{"addr": "watch_address"}]}]})).unwrap();
        assert!(!sent_from(feed.records(), "watch_address"));
        assert!(received_by(feed.records(), "watch_address"));
    }

    #[test]
    fn test_failed_feed_matches_nothing() {
        let feed = TxFeed::failed();
        let target = WatchTarget::evaluate("A", &feed);
        assert!(!target.has_sent);
        assert!(!target.has_received);
    }

    #[test]
    fn test_predicates_are_repeatable() {
        let feed = example_feed();
        for _ in 0..3 {
            assert_eq!(WatchTarget::evaluate("A", &feed), WatchTarget::evaluate("A", &feed));
            assert!(sent_from(feed.records(), "A"));
            assert!(received_by(feed.records(), "B"));
        }
    }

    #[test]
    fn test_flatten_history() {
        let txs = vec![
            TransactionRecord::new(vec![], vec![TxOutput::new("B", Some(1))]),
            TransactionRecord::new(vec![TxInput::from_address("A")], vec![]),
            TransactionRecord::new(vec![TxInput::from_address("A")], vec![TxOutput::new("B", None)]),
            TransactionRecord::new(
                vec![TxInput::default()],
                vec![TxOutput::new("B", Some(3))],
            ),
            TransactionRecord::new(
                vec![TxInput::from_address("A"), TxInput::from_address("Z")],
                vec![TxOutput::new("B", Some(100)), TxOutput::new("C", Some(200))],
            ),
            TransactionRecord::new(vec![TxInput::from_address("C")], vec![TxOutput::new("A", Some(0))]),
        ];

        let summaries = flatten_history(&txs);
        assert_eq!(
            summaries,
            vec![
                TransactionSummary {
                    from: "A".to_string(),
                    to: "B".to_string(),
                    amount: 100,
                },
                TransactionSummary {
                    from: "C".to_string(),
                    to: "A".to_string(),
                    amount: 0,
                },
            ]
        );
    }

    struct StaticSource {
        history: Option<AddressHistory>,
    }

    #[async_trait]
    impl TxSource for StaticSource {
        async fn unconfirmed(&self) -> TxFeed {
            TxFeed::failed()
        }

        async fn history(&self, _address: &str) -> Option<AddressHistory> {
            self.history.clone()
        }
    }

    #[tokio::test]
    async fn test_history() {
        let source = StaticSource {
            history: Some(AddressHistory {
                address: "A".to_string(),
                n_tx: 2,
                txs: vec![
                    TransactionRecord::new(
                        vec![TxInput::from_address("A")],
                        vec![TxOutput::new("B", Some(42))],
                    ),
                    TransactionRecord::new(vec![TxInput::from_address("A")], vec![TxOutput::default()]),
                ],
            }),
        };
        let summaries = history(&source, "A").await;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].amount, 42);

        let source = StaticSource { history: None };
        assert!(history(&source, "A").await.is_empty());
    }
}

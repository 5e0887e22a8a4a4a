use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// A field of the wrong type reads as its default instead of failing the
// whole record, so unrelated fields never hide an address.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

// Same for lists, element by element. Positions are kept: a broken first
// input stays first and does not promote the second one.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevOut {
    #[serde(default, deserialize_with = "lenient")]
    pub addr: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, deserialize_with = "lenient")]
    pub prev_out: Option<PrevOut>,
}

impl TxInput {
    pub fn from_address(addr: &str) -> Self {
        Self {
            prev_out: Some(PrevOut {
                addr: Some(addr.to_string()),
                value: None,
            }),
        }
    }

    pub fn address(&self) -> Option<&str> {
        self.prev_out.as_ref()?.addr.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(default, deserialize_with = "lenient")]
    pub addr: Option<String>,

    // Amount in satoshi
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<u64>,
}

impl TxOutput {
    pub fn new(addr: &str, value: Option<u64>) -> Self {
        Self {
            addr: Some(addr.to_string()),
            value,
        }
    }
}

/// One pending (or historical) transfer as reported by the data provider.
/// Missing or mistyped fields decode as empty, so any JSON object parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub hash: Option<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub inputs: Vec<TxInput>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub out: Vec<TxOutput>,
}

impl TransactionRecord {
    pub fn new(inputs: Vec<TxInput>, out: Vec<TxOutput>) -> Self {
        Self {
            hash: None,
            inputs,
            out,
        }
    }

    /// Source address of the first input. Later inputs are never consulted.
    pub fn first_sender(&self) -> Option<&str> {
        self.inputs.first()?.address()
    }

    pub fn pays_to(&self, address: &str) -> bool {
        self.out
            .iter()
            .any(|output| output.addr.as_deref() == Some(address))
    }

    /// (first sender, first receiver, first amount), or None if any is missing.
    pub fn summary(&self) -> Option<TransactionSummary> {
        let from = self.first_sender()?;
        let first_out = self.out.first()?;
        let to = first_out.addr.as_deref()?;
        let amount = first_out.value?;

        Some(TransactionSummary {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        })
    }

    // Entries that are not objects are dropped one by one, so a single odd
    // entry does not hide the rest of the payload.
    pub fn decode_list(txs: Vec<Value>) -> Vec<TransactionRecord> {
        let total = txs.len();
        let records: Vec<TransactionRecord> = txs
            .into_iter()
            .filter_map(|tx| match serde_json::from_value::<TransactionRecord>(tx) {
                Ok(record) => Some(record),
                Err(e) => {
                    debug!("Skipping malformed transaction record: {}", e);
                    None
                }
            })
            .collect();

        if records.len() != total {
            warn!(
                "Skipped {} malformed transaction records out of {}",
                total - records.len(),
                total
            );
        }

        records
    }
}

/// Outcome of one feed fetch. A failed fetch carries no records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxFeed {
    pub txs: Vec<TransactionRecord>,
    pub failed: bool,
}

#[derive(Deserialize)]
struct FeedPayload {
    txs: Vec<Value>,
}

impl TxFeed {
    pub fn new(txs: Vec<TransactionRecord>) -> Self {
        Self { txs, failed: false }
    }

    pub fn failed() -> Self {
        Self {
            txs: Vec::new(),
            failed: true,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.txs
    }

    pub fn from_value(value: Value) -> Result<Self, String> {
        let payload: FeedPayload = serde_json::from_value(value).map_err(|e| {
            let msg = format!("Unexpected feed payload: {}", e);
            warn!("{}", msg);
            msg
        })?;

        Ok(Self::new(TransactionRecord::decode_list(payload.txs)))
    }
}

/// One page of an address history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressHistory {
    pub address: String,
    pub n_tx: u64,
    pub txs: Vec<TransactionRecord>,
}

#[derive(Deserialize)]
struct HistoryPayload {
    #[serde(default)]
    address: Option<String>,

    #[serde(default)]
    n_tx: Option<u64>,

    txs: Vec<Value>,
}

impl AddressHistory {
    pub fn from_value(address: &str, value: Value) -> Result<Self, String> {
        let payload: HistoryPayload = serde_json::from_value(value).map_err(|e| {
            let msg = format!("Unexpected history payload for {}: {}", address, e);
            warn!("{}", msg);
            msg
        })?;

        let txs = TransactionRecord::decode_list(payload.txs);
        Ok(Self {
            address: payload.address.unwrap_or_else(|| address.to_string()),
            n_tx: payload.n_tx.unwrap_or(txs.len() as u64),
            txs,
        })
    }
}

/// Flattened (from, to, amount) view of a transaction, amount in satoshi.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub from: String,
    pub to: String,
    pub amount: u64,
}

impl fmt::Display for TransactionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {} sat ({} BTC)",
            self.from,
            self.to,
            self.amount,
            watch_util::format_btc(self.amount)
        )
    }
}

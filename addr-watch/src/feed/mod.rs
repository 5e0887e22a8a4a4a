mod client;
mod types;

pub use client::*;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Provider of transaction data. Implementations downgrade every failure to
/// a failed feed or `None`; callers never see transport errors.
#[async_trait]
pub trait TxSource: Send + Sync {
    async fn unconfirmed(&self) -> TxFeed;

    async fn history(&self, address: &str) -> Option<AddressHistory>;
}

pub type TxSourceRef = Arc<dyn TxSource>;

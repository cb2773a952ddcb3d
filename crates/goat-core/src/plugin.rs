//! Plugin contract: one protocol/integration's tool set behind a chain-
//! and wallet-mode-aware gate.

use async_trait::async_trait;

use crate::chain::Chain;
use crate::error::DiscoveryError;
use crate::tool::ToolDescriptor;
use crate::wallet::Wallet;

/// A bundle of related tools for one protocol or integration.
///
/// Plugins are stateless descriptors: configuration (API keys, token
/// lists) is captured at construction through explicit config structs, and
/// one plugin instance may be queried against many wallets.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Pure chain-compatibility predicate, commonly a `chain_type` check or
    /// a chain-id allow-list.
    fn supports_chain(&self, chain: &Chain) -> bool;

    /// Whether the plugin's tools work with contract/smart wallets (which
    /// may lack direct message signing).
    fn supports_smart_wallets(&self) -> bool {
        false
    }

    /// Produce this plugin's tools bound to `wallet`.
    ///
    /// May perform network I/O (dynamic tool discovery); failures surface
    /// as [`DiscoveryError`] and, under the baseline policy, abort the
    /// whole aggregation.
    async fn tools(&self, wallet: &Wallet) -> Result<Vec<ToolDescriptor>, DiscoveryError>;
}

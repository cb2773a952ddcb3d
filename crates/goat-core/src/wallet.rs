//! Wallet client capability contracts and the chain-family tagged union.
//!
//! Every chain wallet implements [`WalletClient`]; chain families with
//! extra operations (transaction sending, contract reads, typed-data
//! signing) add them through family traits. Plugins and the pipeline
//! consume the [`Wallet`] enum and match on its variant at the few call
//! sites that need family-specific operations — there is no downcasting.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::WalletError;

/// A produced signature, hex (EVM) or base58 (Solana) depending on the
/// chain family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub signature: String,
}

/// Balance of an account in base units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    /// Base-unit amount as a decimal string (wei, lamports, ...).
    pub value: String,
}

/// Handle for a submitted transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub hash: String,
}

/// An EVM transaction request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvmTransaction {
    /// Recipient address (0x-prefixed).
    pub to: String,
    /// Native value in wei, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Calldata as 0x-prefixed hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A raw `eth_call` request: contract address plus encoded calldata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmReadRequest {
    pub address: String,
    /// Calldata as 0x-prefixed hex.
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmReadResult {
    /// Return data as 0x-prefixed hex.
    pub value: String,
}

/// A fully built Solana transaction, base64-encoded in the wire format
/// (`VersionedTransaction`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaTransaction {
    pub serialized: String,
}

/// Base capability contract every chain wallet implements.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Account address. An empty string means "not yet resolvable" (e.g. a
    /// smart-wallet address pending remote creation), not an error.
    fn get_address(&self) -> String;

    /// Chain identity; pure and stable for the lifetime of the client.
    fn get_chain(&self) -> Chain;

    /// Whether this is a contract-based account. An explicit flag set at
    /// construction, never inferred from method presence.
    fn is_smart_wallet(&self) -> bool {
        false
    }

    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError>;

    /// Balance of `address` on this wallet's chain. Must fail on RPC
    /// errors rather than silently returning zero.
    async fn balance_of(&self, address: &str) -> Result<Balance, WalletError>;
}

/// EVM family extensions.
#[async_trait]
pub trait EvmWalletClient: WalletClient {
    async fn send_transaction(&self, tx: EvmTransaction)
        -> Result<TransactionReceipt, WalletError>;

    async fn read(&self, request: EvmReadRequest) -> Result<EvmReadResult, WalletError>;

    /// EIP-712 signing over a JSON typed-data payload
    /// (`{domain, types, primaryType, message}`).
    async fn sign_typed_data(&self, data: serde_json::Value) -> Result<Signature, WalletError>;
}

/// Solana family extensions.
#[async_trait]
pub trait SolanaWalletClient: WalletClient {
    async fn send_transaction(
        &self,
        tx: SolanaTransaction,
    ) -> Result<TransactionReceipt, WalletError>;
}

/// Chain-family tagged union handed to plugins and the pipeline.
///
/// Plugins that need family-specific operations match on the variant and
/// clone the inner `Arc` into their tool closures; everything else goes
/// through the forwarded base methods.
#[derive(Clone)]
pub enum Wallet {
    Evm(Arc<dyn EvmWalletClient>),
    Solana(Arc<dyn SolanaWalletClient>),
    /// A chain family without extension operations in this SDK.
    Other(Arc<dyn WalletClient>),
}

impl Wallet {
    pub fn get_address(&self) -> String {
        match self {
            Self::Evm(w) => w.get_address(),
            Self::Solana(w) => w.get_address(),
            Self::Other(w) => w.get_address(),
        }
    }

    pub fn get_chain(&self) -> Chain {
        match self {
            Self::Evm(w) => w.get_chain(),
            Self::Solana(w) => w.get_chain(),
            Self::Other(w) => w.get_chain(),
        }
    }

    pub fn is_smart_wallet(&self) -> bool {
        match self {
            Self::Evm(w) => w.is_smart_wallet(),
            Self::Solana(w) => w.is_smart_wallet(),
            Self::Other(w) => w.is_smart_wallet(),
        }
    }

    pub async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
        match self {
            Self::Evm(w) => w.sign_message(message).await,
            Self::Solana(w) => w.sign_message(message).await,
            Self::Other(w) => w.sign_message(message).await,
        }
    }

    pub async fn balance_of(&self, address: &str) -> Result<Balance, WalletError> {
        match self {
            Self::Evm(w) => w.balance_of(address).await,
            Self::Solana(w) => w.balance_of(address).await,
            Self::Other(w) => w.balance_of(address).await,
        }
    }
}

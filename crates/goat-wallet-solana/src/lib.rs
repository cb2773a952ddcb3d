//! Solana wallet client over JSON-RPC.
//!
//! A single `reqwest::Client` is reused for all RPC calls. Transactions
//! arrive fully built (base64 `VersionedTransaction`); this client signs
//! the serialized message with its ed25519 keypair, places the signature
//! in the fee-payer slot, and submits via `sendTransaction`.

use async_trait::async_trait;
use base64::prelude::*;
use ed25519_dalek::{Signer as _, SigningKey};
use serde_json::{json, Value};
use solana_pubkey::Pubkey;
use solana_transaction::versioned::VersionedTransaction;
use std::time::Duration;
use tracing::debug;

use goat_core::{
    Balance, Chain, Signature, SolanaTransaction, SolanaWalletClient, TransactionReceipt,
    WalletClient, WalletError,
};

const LAMPORTS_DECIMALS: u8 = 9;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Explicit configuration for [`SolanaWallet`].
#[derive(Debug, Clone)]
pub struct SolanaWalletConfig {
    /// Base58-encoded keypair: either the 64-byte secret+public form most
    /// wallet exports use, or a bare 32-byte seed.
    pub private_key: String,
    pub rpc_url: String,
}

// ── Shared RPC helper ──────────────────────────────────────────────

/// Lightweight wrapper around `reqwest::Client` for Solana JSON-RPC calls:
/// connection reuse, envelope construction, and error extraction.
#[derive(Debug)]
struct SolanaRpc {
    client: reqwest::Client,
    rpc_url: String,
}

impl SolanaRpc {
    fn new(rpc_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            rpc_url: rpc_url.to_string(),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Network(format!("Solana RPC unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(WalletError::Network(format!(
                "Solana RPC returned HTTP {}",
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("invalid Solana RPC response: {e}")))?;

        if let Some(err) = data.get("error") {
            let msg = err["message"].as_str().unwrap_or("unknown RPC error");
            return Err(WalletError::Network(format!("Solana RPC error: {msg}")));
        }

        Ok(data)
    }
}

/// Validate a Solana address (base58-encoded, 32–44 characters).
fn validate_address(address: &str) -> Result<(), WalletError> {
    if address.len() < 32 || address.len() > 44 {
        return Err(WalletError::InvalidRequest(format!(
            "invalid address length ({}); Solana addresses are 32-44 characters",
            address.len()
        )));
    }
    if bs58::decode(address).into_vec().is_err() {
        return Err(WalletError::InvalidRequest(
            "invalid base58 characters in address".to_string(),
        ));
    }
    Ok(())
}

// ── Wallet ─────────────────────────────────────────────────────────

/// A keypair-backed Solana account.
#[derive(Debug)]
pub struct SolanaWallet {
    signing_key: SigningKey,
    pubkey: Pubkey,
    rpc: SolanaRpc,
}

impl SolanaWallet {
    pub fn new(config: SolanaWalletConfig) -> Result<Self, WalletError> {
        let bytes = bs58::decode(&config.private_key)
            .into_vec()
            .map_err(|e| WalletError::Signing(format!("invalid private key: {e}")))?;

        // 64-byte exports carry secret || public; only the first 32 bytes
        // seed the signing key.
        let seed: [u8; 32] = match bytes.len() {
            64 | 32 => bytes[..32]
                .try_into()
                .map_err(|_| WalletError::Signing("invalid private key length".to_string()))?,
            n => {
                return Err(WalletError::Signing(format!(
                    "invalid private key length {n}, expected 32 or 64 bytes"
                )))
            }
        };

        let signing_key = SigningKey::from_bytes(&seed);
        let pubkey = Pubkey::from(signing_key.verifying_key().to_bytes());

        Ok(Self {
            signing_key,
            pubkey,
            rpc: SolanaRpc::new(&config.rpc_url),
        })
    }
}

#[async_trait]
impl WalletClient for SolanaWallet {
    fn get_address(&self) -> String {
        self.pubkey.to_string()
    }

    fn get_chain(&self) -> Chain {
        Chain::solana()
    }

    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
        let signature = self.signing_key.sign(message.as_bytes());
        Ok(Signature {
            signature: bs58::encode(signature.to_bytes()).into_string(),
        })
    }

    async fn balance_of(&self, address: &str) -> Result<Balance, WalletError> {
        validate_address(address)?;
        let data = self.rpc.call("getBalance", json!([address])).await?;
        let lamports = data["result"]["value"].as_u64().ok_or_else(|| {
            WalletError::Network("getBalance response missing result.value".to_string())
        })?;
        Ok(Balance {
            decimals: LAMPORTS_DECIMALS,
            symbol: "SOL".to_string(),
            name: "Solana".to_string(),
            value: lamports.to_string(),
        })
    }
}

#[async_trait]
impl SolanaWalletClient for SolanaWallet {
    async fn send_transaction(
        &self,
        tx: SolanaTransaction,
    ) -> Result<TransactionReceipt, WalletError> {
        let tx_bytes = BASE64_STANDARD
            .decode(tx.serialized.trim())
            .map_err(|e| WalletError::InvalidRequest(format!("invalid base64: {e}")))?;

        let mut transaction: VersionedTransaction = bincode::deserialize(&tx_bytes)
            .map_err(|e| WalletError::InvalidRequest(format!("undecodable transaction: {e}")))?;

        // Solana signs the serialized message, with the fee payer's
        // signature in slot 0.
        let message_data = bincode::serialize(&transaction.message)
            .map_err(|e| WalletError::Signing(format!("failed to serialize message: {e}")))?;
        let signature = self.signing_key.sign(&message_data);
        let solana_sig = solana_signature::Signature::from(signature.to_bytes());

        if transaction.signatures.is_empty() {
            transaction.signatures.push(solana_sig);
        } else {
            transaction.signatures[0] = solana_sig;
        }

        let encoded = BASE64_STANDARD.encode(
            bincode::serialize(&transaction)
                .map_err(|e| WalletError::Signing(format!("failed to serialize tx: {e}")))?,
        );

        debug!(payer = %self.pubkey, "submitting Solana transaction");

        let data = self
            .rpc
            .call(
                "sendTransaction",
                json!([encoded, { "encoding": "base64", "preflightCommitment": "confirmed" }]),
            )
            .await?;

        let hash = data["result"].as_str().ok_or_else(|| {
            WalletError::Network("sendTransaction response missing result".to_string())
        })?;

        Ok(TransactionReceipt {
            hash: hash.to_string(),
        })
    }
}

//! EVM wallet client backed by alloy: a local private-key signer bound to
//! an HTTP JSON-RPC provider.
//!
//! Network failures surface as [`WalletError::Network`], signing failures
//! as [`WalletError::Signing`]; nothing is retried at this layer.

use alloy::dyn_abi::TypedData;
use alloy::network::EthereumWallet;
use alloy::primitives::{hex, Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::str::FromStr;
use tracing::debug;
use url::Url;

use goat_core::{
    Balance, Chain, EvmReadRequest, EvmReadResult, EvmTransaction, EvmWalletClient, Signature,
    TransactionReceipt, WalletClient, WalletError,
};

/// Explicit configuration for [`EvmWallet`]. Credential/endpoint loading
/// (env vars, key files) belongs to the caller.
#[derive(Debug, Clone)]
pub struct EvmWalletConfig {
    /// Hex-encoded private key, with or without a 0x prefix.
    pub private_key: String,
    pub rpc_url: String,
    pub chain_id: u64,
    /// Native currency metadata; defaults to ETH/Ether.
    pub currency_symbol: Option<String>,
    pub currency_name: Option<String>,
}

/// An externally-owned EVM account on one chain.
#[derive(Debug)]
pub struct EvmWallet {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
    rpc_url: Url,
    chain_id: u64,
    currency_symbol: String,
    currency_name: String,
}

impl EvmWallet {
    pub fn new(config: EvmWalletConfig) -> Result<Self, WalletError> {
        let key = config.private_key.strip_prefix("0x").unwrap_or(&config.private_key);
        let signer: PrivateKeySigner = key
            .parse()
            .map_err(|e| WalletError::Signing(format!("invalid private key: {e}")))?;
        let rpc_url: Url = config
            .rpc_url
            .parse()
            .map_err(|e| WalletError::InvalidRequest(format!("invalid RPC URL: {e}")))?;
        let wallet = EthereumWallet::from(signer.clone());

        Ok(Self {
            signer,
            wallet,
            rpc_url,
            chain_id: config.chain_id,
            currency_symbol: config.currency_symbol.unwrap_or_else(|| "ETH".to_string()),
            currency_name: config.currency_name.unwrap_or_else(|| "Ether".to_string()),
        })
    }

    fn parse_address(address: &str) -> Result<Address, WalletError> {
        Address::from_str(address)
            .map_err(|e| WalletError::InvalidRequest(format!("invalid address '{address}': {e}")))
    }
}

#[async_trait]
impl WalletClient for EvmWallet {
    fn get_address(&self) -> String {
        self.signer.address().to_string()
    }

    fn get_chain(&self) -> Chain {
        Chain::evm(self.chain_id)
    }

    async fn sign_message(&self, message: &str) -> Result<Signature, WalletError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(Signature {
            signature: format!("0x{}", hex::encode(signature.as_bytes())),
        })
    }

    async fn balance_of(&self, address: &str) -> Result<Balance, WalletError> {
        let address = Self::parse_address(address)?;
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let balance = provider
            .get_balance(address)
            .await
            .map_err(|e| WalletError::Network(format!("failed to get balance: {e}")))?;
        Ok(Balance {
            decimals: 18,
            symbol: self.currency_symbol.clone(),
            name: self.currency_name.clone(),
            value: balance.to_string(),
        })
    }
}

#[async_trait]
impl EvmWalletClient for EvmWallet {
    async fn send_transaction(
        &self,
        tx: EvmTransaction,
    ) -> Result<TransactionReceipt, WalletError> {
        let to = Self::parse_address(&tx.to)?;

        let mut request = TransactionRequest::default().to(to);
        if let Some(value) = &tx.value {
            let value = U256::from_str_radix(value, 10)
                .map_err(|e| WalletError::InvalidRequest(format!("invalid value: {e}")))?;
            request = request.value(value);
        }
        if let Some(data) = &tx.data {
            let bytes = hex::decode(data.strip_prefix("0x").unwrap_or(data))
                .map_err(|e| WalletError::InvalidRequest(format!("invalid calldata: {e}")))?;
            request = request.input(Bytes::from(bytes).into());
        }

        debug!(to = %to, chain_id = self.chain_id, "sending EVM transaction");

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(self.rpc_url.clone());
        let pending = provider
            .send_transaction(request)
            .await
            .map_err(|e| WalletError::Network(format!("failed to send transaction: {e}")))?;
        let hash = pending
            .watch()
            .await
            .map_err(|e| WalletError::Network(format!("transaction not confirmed: {e}")))?;

        Ok(TransactionReceipt {
            hash: format!("{hash}"),
        })
    }

    async fn read(&self, request: EvmReadRequest) -> Result<EvmReadResult, WalletError> {
        let to = Self::parse_address(&request.address)?;
        let data = request.data.strip_prefix("0x").unwrap_or(&request.data);
        let calldata = hex::decode(data)
            .map_err(|e| WalletError::InvalidRequest(format!("invalid calldata: {e}")))?;

        let call = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(calldata).into());

        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let result = provider
            .call(call)
            .await
            .map_err(|e| WalletError::Network(format!("eth_call failed: {e}")))?;

        Ok(EvmReadResult {
            value: format!("{result}"),
        })
    }

    async fn sign_typed_data(&self, data: serde_json::Value) -> Result<Signature, WalletError> {
        let typed: TypedData = serde_json::from_value(data)
            .map_err(|e| WalletError::InvalidRequest(format!("invalid typed data: {e}")))?;
        let signature = self
            .signer
            .sign_dynamic_typed_data(&typed)
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))?;
        Ok(Signature {
            signature: format!("0x{}", hex::encode(signature.as_bytes())),
        })
    }
}

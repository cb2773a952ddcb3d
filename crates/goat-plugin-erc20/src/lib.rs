//! ERC-20 plugin: a family of per-token tools (balance, transfer, approve,
//! allowance, transferFrom, totalSupply) bound to an EVM wallet client.
//!
//! Calldata is encoded with `alloy::sol!`-generated call types; read
//! results come back as single 256-bit words and are decoded directly.
//! Amounts cross the tool boundary as base-unit decimal strings.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{hex, Address, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::debug;

use goat_core::{
    define_tool, Chain, ChainType, DiscoveryError, EvmReadRequest, EvmTransaction,
    EvmWalletClient, ExecutionError, Field, Plugin, Schema, ToolDescriptor, Wallet,
};

sol! {
    function balanceOf(address owner) external view returns (uint256);
    function transfer(address to, uint256 amount) external returns (bool);
    function approve(address spender, uint256 amount) external returns (bool);
    function allowance(address owner, address spender) external view returns (uint256);
    function transferFrom(address from, address to, uint256 amount) external returns (bool);
    function totalSupply() external view returns (uint256);
}

/// EVM address format.
pub const ADDRESS_PATTERN: &str = "^0x[a-fA-F0-9]{40}$";
/// Non-negative base-unit amount.
pub const AMOUNT_PATTERN: &str = "^[0-9]+$";

/// An ERC-20 token deployed on one or more chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Chain id -> contract address.
    pub chain_addresses: HashMap<u64, String>,
}

/// USDC deployments on the major EVM chains.
pub fn usdc() -> Token {
    Token {
        symbol: "USDC".to_string(),
        name: "USD Coin".to_string(),
        decimals: 6,
        chain_addresses: HashMap::from([
            (1, "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string()),
            (10, "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85".to_string()),
            (8453, "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".to_string()),
            (42161, "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".to_string()),
        ]),
    }
}

/// Wrapped ether deployments on the major EVM chains.
pub fn weth() -> Token {
    Token {
        symbol: "WETH".to_string(),
        name: "Wrapped Ether".to_string(),
        decimals: 18,
        chain_addresses: HashMap::from([
            (1, "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2".to_string()),
            (10, "0x4200000000000000000000000000000000000006".to_string()),
            (8453, "0x4200000000000000000000000000000000000006".to_string()),
            (42161, "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".to_string()),
        ]),
    }
}

#[derive(Debug, Clone)]
pub struct Erc20PluginConfig {
    pub tokens: Vec<Token>,
}

/// Exposes ERC-20 tools for every configured token deployed on the
/// wallet's chain.
pub struct Erc20Plugin {
    tokens: Vec<Token>,
}

impl Erc20Plugin {
    pub fn new(config: Erc20PluginConfig) -> Self {
        Self {
            tokens: config.tokens,
        }
    }
}

#[async_trait]
impl Plugin for Erc20Plugin {
    fn name(&self) -> &str {
        "erc20"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        if chain.chain_type != ChainType::Evm {
            return false;
        }
        let Some(id) = chain.id else { return false };
        self.tokens
            .iter()
            .any(|t| t.chain_addresses.contains_key(&id))
    }

    fn supports_smart_wallets(&self) -> bool {
        true
    }

    async fn tools(&self, wallet: &Wallet) -> Result<Vec<ToolDescriptor>, DiscoveryError> {
        let Wallet::Evm(evm) = wallet else {
            return Ok(Vec::new());
        };
        let Some(chain_id) = evm.get_chain().id else {
            return Ok(Vec::new());
        };

        let mut tools = Vec::new();
        for token in &self.tokens {
            if let Some(address) = token.chain_addresses.get(&chain_id) {
                debug!(token = %token.symbol, chain_id, "exposing ERC-20 tools");
                tools.extend(token_tools(evm, token, address));
            }
        }
        Ok(tools)
    }
}

fn token_tools(
    evm: &Arc<dyn EvmWalletClient>,
    token: &Token,
    token_address: &str,
) -> Vec<ToolDescriptor> {
    let sym = token.symbol.to_lowercase();
    let symbol = token.symbol.clone();
    let mut tools = Vec::new();

    // get_<sym>_balance
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("get_{sym}_balance"),
            &format!("Get the {symbol} balance of an address, in base units"),
            Schema::new().field(
                Field::string("address")
                    .pattern(ADDRESS_PATTERN)
                    .describe("The address to check the balance of")
                    .required(),
            ),
            move |args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let owner = arg_address(&args, "address")?;
                    let data = balanceOfCall { owner }.abi_encode();
                    let result = evm
                        .read(EvmReadRequest {
                            address: contract,
                            data: encode_calldata(&data),
                        })
                        .await?;
                    Ok(json!({ "balance": decode_word(&result.value)?.to_string() }))
                }
            },
        ));
    }

    // transfer_<sym>
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("transfer_{sym}"),
            &format!("Transfer {symbol} to an address. The amount is in base units"),
            Schema::new()
                .field(
                    Field::string("to")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The address to send tokens to")
                        .required(),
                )
                .field(
                    Field::string("amount")
                        .pattern(AMOUNT_PATTERN)
                        .describe("The amount to transfer, in base units")
                        .required(),
                ),
            move |args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let to = arg_address(&args, "to")?;
                    let amount = arg_amount(&args, "amount")?;
                    let data = transferCall { to, amount }.abi_encode();
                    let receipt = evm
                        .send_transaction(EvmTransaction {
                            to: contract,
                            value: None,
                            data: Some(encode_calldata(&data)),
                        })
                        .await?;
                    Ok(json!({ "hash": receipt.hash }))
                }
            },
        ));
    }

    // approve_<sym>
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("approve_{sym}"),
            &format!("Approve a spender to move {symbol} on your behalf"),
            Schema::new()
                .field(
                    Field::string("spender")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The address allowed to spend the tokens")
                        .required(),
                )
                .field(
                    Field::string("amount")
                        .pattern(AMOUNT_PATTERN)
                        .describe("The allowance, in base units")
                        .required(),
                ),
            move |args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let spender = arg_address(&args, "spender")?;
                    let amount = arg_amount(&args, "amount")?;
                    let data = approveCall { spender, amount }.abi_encode();
                    let receipt = evm
                        .send_transaction(EvmTransaction {
                            to: contract,
                            value: None,
                            data: Some(encode_calldata(&data)),
                        })
                        .await?;
                    Ok(json!({ "hash": receipt.hash }))
                }
            },
        ));
    }

    // get_<sym>_allowance
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("get_{sym}_allowance"),
            &format!("Get the {symbol} allowance granted by an owner to a spender, in base units"),
            Schema::new()
                .field(
                    Field::string("owner")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The token owner")
                        .required(),
                )
                .field(
                    Field::string("spender")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The approved spender")
                        .required(),
                ),
            move |args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let owner = arg_address(&args, "owner")?;
                    let spender = arg_address(&args, "spender")?;
                    let data = allowanceCall { owner, spender }.abi_encode();
                    let result = evm
                        .read(EvmReadRequest {
                            address: contract,
                            data: encode_calldata(&data),
                        })
                        .await?;
                    Ok(json!({ "allowance": decode_word(&result.value)?.to_string() }))
                }
            },
        ));
    }

    // transfer_<sym>_from
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("transfer_{sym}_from"),
            &format!("Transfer {symbol} from one address to another using an allowance"),
            Schema::new()
                .field(
                    Field::string("from")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The address to move tokens from")
                        .required(),
                )
                .field(
                    Field::string("to")
                        .pattern(ADDRESS_PATTERN)
                        .describe("The address to move tokens to")
                        .required(),
                )
                .field(
                    Field::string("amount")
                        .pattern(AMOUNT_PATTERN)
                        .describe("The amount to transfer, in base units")
                        .required(),
                ),
            move |args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let from = arg_address(&args, "from")?;
                    let to = arg_address(&args, "to")?;
                    let amount = arg_amount(&args, "amount")?;
                    let data = transferFromCall { from, to, amount }.abi_encode();
                    let receipt = evm
                        .send_transaction(EvmTransaction {
                            to: contract,
                            value: None,
                            data: Some(encode_calldata(&data)),
                        })
                        .await?;
                    Ok(json!({ "hash": receipt.hash }))
                }
            },
        ));
    }

    // get_<sym>_total_supply
    {
        let evm = evm.clone();
        let contract = token_address.to_string();
        tools.push(define_tool(
            &format!("get_{sym}_total_supply"),
            &format!("Get the total supply of {symbol}, in base units"),
            Schema::new(),
            move |_args| {
                let evm = evm.clone();
                let contract = contract.clone();
                async move {
                    let data = totalSupplyCall {}.abi_encode();
                    let result = evm
                        .read(EvmReadRequest {
                            address: contract,
                            data: encode_calldata(&data),
                        })
                        .await?;
                    Ok(json!({ "total_supply": decode_word(&result.value)?.to_string() }))
                }
            },
        ));
    }

    tools
}

// ── Argument and ABI helpers ───────────────────────────────────────

fn arg_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, ExecutionError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExecutionError::new(format!("missing argument '{field}'")))
}

fn arg_address(args: &Value, field: &str) -> Result<Address, ExecutionError> {
    let raw = arg_str(args, field)?;
    Address::from_str(raw)
        .map_err(|e| ExecutionError::new(format!("invalid address '{raw}': {e}")))
}

fn arg_amount(args: &Value, field: &str) -> Result<U256, ExecutionError> {
    let raw = arg_str(args, field)?;
    U256::from_str_radix(raw, 10)
        .map_err(|e| ExecutionError::new(format!("invalid amount '{raw}': {e}")))
}

fn encode_calldata(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

/// Decode a single 256-bit word returned by an ERC-20 view call.
fn decode_word(value: &str) -> Result<U256, ExecutionError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped)
        .map_err(|e| ExecutionError::new(format!("undecodable return data: {e}")))?;
    if bytes.len() < 32 {
        return Err(ExecutionError::new(format!(
            "return data too short: {} bytes",
            bytes.len()
        )));
    }
    Ok(U256::from_be_slice(&bytes[..32]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use goat_core::{
        Balance, InvocationError, Signature, TransactionReceipt, WalletClient, WalletError,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ── Mock EVM wallet ────────────────────────────────────────────

    struct MockEvmWallet {
        chain_id: u64,
        sends: AtomicUsize,
        reads: AtomicUsize,
    }

    impl MockEvmWallet {
        fn new(chain_id: u64) -> Arc<Self> {
            Arc::new(Self {
                chain_id,
                sends: AtomicUsize::new(0),
                reads: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WalletClient for MockEvmWallet {
        fn get_address(&self) -> String {
            "0x1111111111111111111111111111111111111111".to_string()
        }

        fn get_chain(&self) -> Chain {
            Chain::evm(self.chain_id)
        }

        async fn sign_message(&self, _message: &str) -> Result<Signature, WalletError> {
            Ok(Signature {
                signature: "0xsig".to_string(),
            })
        }

        async fn balance_of(&self, _address: &str) -> Result<Balance, WalletError> {
            Ok(Balance {
                decimals: 18,
                symbol: "ETH".to_string(),
                name: "Ether".to_string(),
                value: "0".to_string(),
            })
        }
    }

    #[async_trait]
    impl EvmWalletClient for MockEvmWallet {
        async fn send_transaction(
            &self,
            _tx: EvmTransaction,
        ) -> Result<TransactionReceipt, WalletError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(TransactionReceipt {
                hash: "0xabc".to_string(),
            })
        }

        async fn read(
            &self,
            _request: EvmReadRequest,
        ) -> Result<goat_core::EvmReadResult, WalletError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            // 5 as a 256-bit big-endian word
            Ok(goat_core::EvmReadResult {
                value: format!("0x{:064x}", 5),
            })
        }

        async fn sign_typed_data(
            &self,
            _data: serde_json::Value,
        ) -> Result<Signature, WalletError> {
            Ok(Signature {
                signature: "0xsig".to_string(),
            })
        }
    }

    fn plugin() -> Erc20Plugin {
        Erc20Plugin::new(Erc20PluginConfig {
            tokens: vec![usdc(), weth()],
        })
    }

    #[test]
    fn supports_only_evm_chains_with_known_deployments() {
        let p = plugin();
        assert!(p.supports_chain(&Chain::evm(1)));
        assert!(p.supports_chain(&Chain::evm(8453)));
        assert!(!p.supports_chain(&Chain::evm(999_999)));
        assert!(!p.supports_chain(&Chain::solana()));
    }

    #[tokio::test]
    async fn exposes_six_tools_per_deployed_token() {
        let mock = MockEvmWallet::new(1);
        let wallet = Wallet::Evm(mock);
        let tools = plugin().tools(&wallet).await.unwrap();

        // Both USDC and WETH are deployed on mainnet.
        assert_eq!(tools.len(), 12);
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert!(names.contains(&"get_usdc_balance"));
        assert!(names.contains(&"transfer_usdc"));
        assert!(names.contains(&"approve_weth"));
        assert!(names.contains(&"get_weth_total_supply"));
    }

    #[tokio::test]
    async fn non_evm_wallets_get_no_tools() {
        let mock = MockEvmWallet::new(1);
        let wallet = Wallet::Other(mock);
        let tools = plugin().tools(&wallet).await.unwrap();
        assert!(tools.is_empty());
    }

    #[tokio::test]
    async fn transfer_with_invalid_address_fails_validation_without_side_effects() {
        let mock = MockEvmWallet::new(1);
        let wallet = Wallet::Evm(mock.clone());
        let tools = plugin().tools(&wallet).await.unwrap();
        let transfer = tools
            .iter()
            .find(|t| t.name() == "transfer_usdc")
            .unwrap();

        let err = transfer
            .execute(json!({"to": "not-an-address", "amount": "5"}))
            .await
            .unwrap_err();
        match err {
            InvocationError::Validation(e) => assert_eq!(e.field, "to"),
            InvocationError::Execution(_) => panic!("expected validation error"),
        }
        assert_eq!(mock.sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn balance_read_decodes_the_returned_word() {
        let mock = MockEvmWallet::new(1);
        let wallet = Wallet::Evm(mock.clone());
        let tools = plugin().tools(&wallet).await.unwrap();
        let balance = tools
            .iter()
            .find(|t| t.name() == "get_usdc_balance")
            .unwrap();

        let result = balance
            .execute(json!({"address": "0x2222222222222222222222222222222222222222"}))
            .await
            .unwrap();
        assert_eq!(result, json!({"balance": "5"}));
        assert_eq!(mock.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transfer_sends_a_transaction() {
        let mock = MockEvmWallet::new(1);
        let wallet = Wallet::Evm(mock.clone());
        let tools = plugin().tools(&wallet).await.unwrap();
        let transfer = tools
            .iter()
            .find(|t| t.name() == "transfer_usdc")
            .unwrap();

        let result = transfer
            .execute(json!({
                "to": "0x2222222222222222222222222222222222222222",
                "amount": "1000000"
            }))
            .await
            .unwrap();
        assert_eq!(result, json!({"hash": "0xabc"}));
        assert_eq!(mock.sends.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn decode_word_handles_prefixes_and_short_data() {
        assert_eq!(
            decode_word(&format!("0x{:064x}", 42)).unwrap(),
            U256::from(42)
        );
        assert!(decode_word("0x00ff").is_err());
    }
}

//! goat-core: contracts and orchestration for on-chain agent tools.
//!
//! Three decoupled layers meet here:
//!
//! - [`wallet`] — the capability contract chain wallets implement, plus
//!   the [`Wallet`] chain-family tagged union
//! - [`plugin`] — the contract protocol integrations implement to expose
//!   tools, gated by chain and smart-wallet compatibility
//! - [`aggregate`] — the pipeline turning `(wallet, plugins)` into a flat
//!   list of [`ToolDescriptor`]s for a framework adapter to consume
//!
//! Supporting pieces: [`schema`] (parameter validation + JSON Schema
//! generation), [`tool`] (descriptors and the `define_tool` builder), and
//! [`error`] (the error taxonomy).
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use goat_core::{get_tools, Plugin, Wallet};
//!
//! # async fn example(wallet: Wallet, erc20: Arc<dyn Plugin>) -> Result<(), goat_core::DiscoveryError> {
//! let plugins: Vec<Arc<dyn Plugin>> = vec![erc20];
//! let tools = get_tools(&wallet, &plugins).await?;
//! for tool in &tools {
//!     println!("{}: {}", tool.name(), tool.description());
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod chain;
pub mod error;
pub mod plugin;
pub mod schema;
pub mod tool;
pub mod wallet;

pub use aggregate::get_tools;
pub use chain::{Chain, ChainType};
pub use error::{
    DiscoveryError, ExecutionError, InvocationError, ValidationError, WalletError,
};
pub use plugin::Plugin;
pub use schema::{Field, FieldKind, Schema};
pub use tool::{define_tool, is_safe_tool_name, sanitize_tool_name, ToolDescriptor, ToolMethod};
pub use wallet::{
    Balance, EvmReadRequest, EvmReadResult, EvmTransaction, EvmWalletClient, Signature,
    SolanaTransaction, SolanaWalletClient, TransactionReceipt, Wallet, WalletClient,
};

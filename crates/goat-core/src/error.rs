//! Error taxonomy for the tool pipeline.
//!
//! Compatibility mismatches (wrong chain, smart-wallet limitations) are
//! diagnostics, not errors — they are logged by the aggregation pipeline
//! and never surface here.

use thiserror::Error;

/// Failure from a concrete wallet client implementation.
///
/// Treated as opaque by the pipeline; no retries or translation happen
/// above the wallet layer.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The underlying credential/session could not produce a signature.
    #[error("signing failed: {0}")]
    Signing(String),
    /// An RPC or network call failed.
    #[error("network error: {0}")]
    Network(String),
    /// The request was malformed before it reached the network (bad
    /// address, undecodable calldata).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Caller-supplied arguments failed schema validation.
///
/// Raised before the tool method runs; the method is never invoked when
/// validation fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument '{field}': {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// A plugin's tool discovery failed (network/auth failure while fetching a
/// dynamic tool list). Aborts the whole aggregation under the baseline
/// fail-fast policy.
#[derive(Debug, Clone, Error)]
#[error("plugin '{plugin}' failed to produce tools: {message}")]
pub struct DiscoveryError {
    pub plugin: String,
    pub message: String,
}

impl DiscoveryError {
    pub fn new(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

/// The bound tool method itself failed (signing rejected, contract call
/// reverted, third-party API error).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ExecutionError(pub String);

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<WalletError> for ExecutionError {
    fn from(err: WalletError) -> Self {
        Self(err.to_string())
    }
}

/// Error from a validated tool invocation. Adapters map the two variants
/// into their framework's native failure shape; they must stay
/// distinguishable up to that point.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

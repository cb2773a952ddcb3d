//! Dynamic plugin over a 1Shot transaction API: contract methods are
//! discovered at aggregation time and translated into tools.
//!
//! Every discovered method gets a simulation tool (`test_<name>`); methods
//! that can change state (payable or nonpayable) additionally get an
//! `execute_<name>` tool. View and pure methods never get an execute tool,
//! so a model cannot be talked into submitting a transaction through them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use goat_core::{
    define_tool, sanitize_tool_name, Chain, ChainType, DiscoveryError, ExecutionError, Field,
    FieldKind, Plugin, Schema, ToolDescriptor, Wallet,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ADDRESS_PATTERN: &str = "^0x[a-fA-F0-9]{40}$";
const DIGITS_PATTERN: &str = "^-?[0-9]+$";

#[derive(Debug, Clone)]
pub struct OneShotConfig {
    pub api_url: String,
    pub api_key: String,
    pub business_id: String,
}

// ── Remote method catalog ──────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ContractMethod {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub state_mutability: String,
    #[serde(default)]
    pub params: Vec<MethodParam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl ContractMethod {
    fn is_state_changing(&self) -> bool {
        matches!(self.state_mutability.as_str(), "payable" | "nonpayable")
    }
}

/// Map a Solidity parameter type to a schema field. Numeric types travel
/// as decimal strings so precision never leaks through JSON numbers.
fn param_field(param: &MethodParam) -> Field {
    let field = if param.ty == "address" {
        Field::string(&param.name).pattern(ADDRESS_PATTERN)
    } else if param.ty == "bool" {
        Field::boolean(&param.name)
    } else if param.ty.ends_with("[]") {
        Field::array(&param.name, FieldKind::String { pattern: None })
    } else if param.ty.starts_with("uint") || param.ty.starts_with("int") {
        Field::string(&param.name).pattern(DIGITS_PATTERN)
    } else {
        // bytes, string, and anything unrecognized travel as strings
        Field::string(&param.name)
    };
    let field = field.describe(&param.description);
    if param.required {
        field.required()
    } else {
        field
    }
}

fn method_schema(method: &ContractMethod) -> Schema {
    let mut schema = Schema::new();
    for param in &method.params {
        schema = schema.field(param_field(param));
    }
    schema
}

// ── API client ─────────────────────────────────────────────────────

struct OneShotApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    business_id: String,
}

impl OneShotApi {
    fn new(config: &OneShotConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            business_id: config.business_id.clone(),
        }
    }

    async fn list_methods(&self) -> Result<Vec<ContractMethod>, DiscoveryError> {
        let url = format!("{}/business/{}/methods", self.api_url, self.business_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| DiscoveryError::new("oneshot", format!("API unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(DiscoveryError::new(
                "oneshot",
                format!("method listing returned HTTP {}", resp.status()),
            ));
        }

        resp.json()
            .await
            .map_err(|e| DiscoveryError::new("oneshot", format!("invalid method listing: {e}")))
    }

    async fn invoke(
        &self,
        method_id: &str,
        action: &str,
        params: Value,
    ) -> Result<Value, ExecutionError> {
        let url = format!("{}/methods/{method_id}/{action}", self.api_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&params)
            .send()
            .await
            .map_err(|e| ExecutionError::new(format!("{action} request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(ExecutionError::new(format!(
                "{action} returned HTTP {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| ExecutionError::new(format!("invalid {action} response: {e}")))
    }
}

// ── Plugin ─────────────────────────────────────────────────────────

/// Tools discovered from a remote contract-method catalog.
pub struct OneShotPlugin {
    api: Arc<OneShotApi>,
}

impl OneShotPlugin {
    pub fn new(config: OneShotConfig) -> Self {
        Self {
            api: Arc::new(OneShotApi::new(&config)),
        }
    }
}

#[async_trait]
impl Plugin for OneShotPlugin {
    fn name(&self) -> &str {
        "oneshot"
    }

    fn supports_chain(&self, chain: &Chain) -> bool {
        chain.chain_type == ChainType::Evm
    }

    fn supports_smart_wallets(&self) -> bool {
        true
    }

    async fn tools(&self, _wallet: &Wallet) -> Result<Vec<ToolDescriptor>, DiscoveryError> {
        let methods = self.api.list_methods().await?;
        debug!(count = methods.len(), "discovered contract methods");

        let mut tools = Vec::new();
        for method in &methods {
            let safe = sanitize_tool_name(&method.name);
            if safe != method.name {
                warn!(original = %method.name, sanitized = %safe, "sanitized method name");
            }

            let api = self.api.clone();
            let method_id = method.id.clone();
            tools.push(define_tool(
                &format!("test_{safe}"),
                &format!(
                    "Simulate calling {} without submitting a transaction. {}",
                    method.name, method.description
                ),
                method_schema(method),
                move |args| {
                    let api = api.clone();
                    let method_id = method_id.clone();
                    async move { api.invoke(&method_id, "test", args).await }
                },
            ));

            if method.is_state_changing() {
                let api = self.api.clone();
                let method_id = method.id.clone();
                tools.push(define_tool(
                    &format!("execute_{safe}"),
                    &format!(
                        "Submit a transaction calling {}. {}",
                        method.name, method.description
                    ),
                    method_schema(method),
                    move |args| {
                        let api = api.clone();
                        let method_id = method_id.clone();
                        async move { api.invoke(&method_id, "execute", args).await }
                    },
                ));
            }
        }
        Ok(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn method(name: &str, mutability: &str, params: Vec<MethodParam>) -> ContractMethod {
        ContractMethod {
            id: format!("id-{name}"),
            name: name.to_string(),
            description: String::new(),
            state_mutability: mutability.to_string(),
            params,
        }
    }

    fn param(name: &str, ty: &str, required: bool) -> MethodParam {
        MethodParam {
            name: name.to_string(),
            ty: ty.to_string(),
            description: String::new(),
            required,
        }
    }

    #[test]
    fn solidity_types_translate_to_schema_fields() {
        let schema = method_schema(&method(
            "mint",
            "nonpayable",
            vec![
                param("to", "address", true),
                param("amount", "uint256", true),
                param("frozen", "bool", false),
                param("recipients", "address[]", false),
                param("data", "bytes", false),
            ],
        ));
        let json_schema = schema.to_json_schema();

        assert_eq!(json_schema["properties"]["to"]["type"], "string");
        assert_eq!(json_schema["properties"]["to"]["pattern"], ADDRESS_PATTERN);
        assert_eq!(json_schema["properties"]["amount"]["pattern"], DIGITS_PATTERN);
        assert_eq!(json_schema["properties"]["frozen"]["type"], "boolean");
        assert_eq!(json_schema["properties"]["recipients"]["type"], "array");
        assert_eq!(json_schema["properties"]["data"]["type"], "string");
        assert_eq!(json_schema["required"], json!(["to", "amount"]));
    }

    #[test]
    fn numeric_params_reject_non_decimal_strings() {
        let schema = method_schema(&method(
            "burn",
            "nonpayable",
            vec![param("amount", "uint256", true)],
        ));
        assert!(schema.validate(&json!({"amount": "1000"})).is_ok());
        assert!(schema.validate(&json!({"amount": "-3"})).is_ok());
        let err = schema.validate(&json!({"amount": "1.5"})).unwrap_err();
        assert_eq!(err.field, "amount");
    }

    #[test]
    fn only_state_changing_methods_are_executable() {
        assert!(method("mint", "nonpayable", vec![]).is_state_changing());
        assert!(method("deposit", "payable", vec![]).is_state_changing());
        assert!(!method("balanceOf", "view", vec![]).is_state_changing());
        assert!(!method("hash", "pure", vec![]).is_state_changing());
    }

    #[test]
    fn supports_only_evm_chains() {
        let plugin = OneShotPlugin::new(OneShotConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            business_id: "biz".to_string(),
        });
        assert!(plugin.supports_chain(&Chain::evm(1)));
        assert!(!plugin.supports_chain(&Chain::solana()));
    }

    #[tokio::test]
    async fn unreachable_api_surfaces_a_discovery_error() {
        let plugin = OneShotPlugin::new(OneShotConfig {
            // Port 9 (discard) is never serving HTTP.
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
            business_id: "biz".to_string(),
        });
        let err = plugin.api.list_methods().await.unwrap_err();
        assert_eq!(err.plugin, "oneshot");
    }
}

//! The tool aggregation pipeline: `(wallet, plugins) -> flat tool list`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::DiscoveryError;
use crate::plugin::Plugin;
use crate::tool::{is_safe_tool_name, ToolDescriptor};
use crate::wallet::Wallet;

/// Collect the tools of every compatible plugin for `wallet`.
///
/// Plugins are evaluated in order and the output preserves that order:
/// all tools from `plugins[i]` precede tools from `plugins[j]` for `i < j`.
/// Chain and smart-wallet mismatches are expected and skipped with a
/// warning before the plugin's (possibly expensive) tool producer runs.
///
/// Policy, as documented in DESIGN.md:
/// - a failing tool producer aborts the whole aggregation (no partial
///   results);
/// - duplicate tool names are kept, with a warning — map-keyed consumers
///   see last-write-wins;
/// - nothing is cached; re-aggregation re-queries dynamic plugins.
///
/// An empty output is a valid result (no plugin matched the chain) and is
/// distinct from an error.
pub async fn get_tools(
    wallet: &Wallet,
    plugins: &[Arc<dyn Plugin>],
) -> Result<Vec<ToolDescriptor>, DiscoveryError> {
    let chain = wallet.get_chain();
    let smart_wallet = wallet.is_smart_wallet();

    let mut tools = Vec::new();
    let mut seen = HashSet::new();

    for plugin in plugins {
        if !plugin.supports_chain(&chain) {
            warn!(
                plugin = plugin.name(),
                chain = %chain,
                "plugin does not support the wallet's chain, skipping"
            );
            continue;
        }
        if smart_wallet && !plugin.supports_smart_wallets() {
            warn!(
                plugin = plugin.name(),
                "plugin does not support smart wallets, skipping"
            );
            continue;
        }

        let produced = plugin.tools(wallet).await?;
        debug!(
            plugin = plugin.name(),
            count = produced.len(),
            "collected plugin tools"
        );

        for tool in produced {
            if !is_safe_tool_name(tool.name()) {
                warn!(
                    plugin = plugin.name(),
                    tool = tool.name(),
                    "tool name contains unsafe characters"
                );
            }
            if !seen.insert(tool.name().to_string()) {
                warn!(
                    tool = tool.name(),
                    "duplicate tool name; map-keyed consumers will keep the last entry"
                );
            }
            tools.push(tool);
        }
    }

    Ok(tools)
}

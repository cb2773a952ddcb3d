//! Chain identity types.
//!
//! A [`Chain`] is the compatibility key plugins are matched against. It is
//! created once by a wallet client and never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain families a wallet client can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Evm,
    Solana,
    Aptos,
    Starknet,
    Sui,
    Tron,
    Chromia,
    Zetrix,
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Evm => "evm",
            Self::Solana => "solana",
            Self::Aptos => "aptos",
            Self::Starknet => "starknet",
            Self::Sui => "sui",
            Self::Tron => "tron",
            Self::Chromia => "chromia",
            Self::Zetrix => "zetrix",
        };
        f.write_str(name)
    }
}

/// Identity of the chain a wallet is bound to.
///
/// `id` is the numeric chain id where the family has one (EVM); families
/// with a single canonical network leave it unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    #[serde(rename = "type")]
    pub chain_type: ChainType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Chain {
    pub fn new(chain_type: ChainType, id: Option<u64>) -> Self {
        Self { chain_type, id }
    }

    /// An EVM chain with the given chain id (1 = mainnet, 8453 = Base, ...).
    pub fn evm(id: u64) -> Self {
        Self::new(ChainType::Evm, Some(id))
    }

    pub fn solana() -> Self {
        Self::new(ChainType::Solana, None)
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} (chain id {})", self.chain_type, id),
            None => write!(f, "{}", self.chain_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_lowercase_type_tag() {
        let chain = Chain::evm(1);
        let value = serde_json::to_value(&chain).unwrap();
        assert_eq!(value, serde_json::json!({"type": "evm", "id": 1}));

        let chain = Chain::solana();
        let value = serde_json::to_value(&chain).unwrap();
        assert_eq!(value, serde_json::json!({"type": "solana"}));
    }

    #[test]
    fn display_includes_chain_id_when_present() {
        assert_eq!(Chain::evm(8453).to_string(), "evm (chain id 8453)");
        assert_eq!(Chain::solana().to_string(), "solana");
    }
}

//! Denomination lookup in a public chain registry.
//!
//! Only used once at startup, to fill in denom, symbol and exponent when
//! they were not given on the command line.

use super::wire::{self, RegistryResponse};
use super::{ClientError, RestSource};
use crate::config::ChainMetadata;

/// Reads `/{project_name}` from a chain registry such as
/// `https://chains.cosmos.directory`.
pub async fn chain_metadata(
    registry: &dyn RestSource,
    project_name: &str,
) -> Result<ChainMetadata, ClientError> {
    let path = format!("/{project_name}");
    let body = registry.get_json(&path).await?;
    let resp: RegistryResponse = serde_json::from_value(body).map_err(|e| ClientError::Decode {
        url: path,
        message: e.to_string(),
    })?;

    let decimals = resp
        .chain
        .decimals
        .as_ref()
        .map(|d| wire::parse_u64_field("chain.decimals", d))
        .transpose()?
        .map(|d| {
            u32::try_from(d).map_err(|_| ClientError::InvalidNumber {
                field: "chain.decimals",
                value: d.to_string(),
            })
        })
        .transpose()?;

    Ok(ChainMetadata {
        denom: resp.chain.denom.filter(|d| !d.is_empty()),
        symbol: resp.chain.symbol.filter(|s| !s.is_empty()),
        decimals,
    })
}

//! Token metadata helpers.

use anyhow::Result;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;

use crate::common::SolanaRpcClient;

const MAX_TOKEN_METADATA_CACHE_SIZE: usize = 10_000;

/// Global token decimals cache
static DECIMALS_CACHE: Lazy<DashMap<Pubkey, u8>> =
    Lazy::new(|| DashMap::with_capacity(MAX_TOKEN_METADATA_CACHE_SIZE));

/// Fetch a mint's decimal precision, reading the mint account on a cache
/// miss. The cache is append-only; decimals never change for a live mint.
pub async fn get_token_decimals(rpc: &SolanaRpcClient, mint: &Pubkey) -> Result<u8> {
    if let Some(cached) = DECIMALS_CACHE.get(mint) {
        return Ok(*cached);
    }

    let account = rpc.get_account(mint).await?;
    let mint_account = Mint::unpack(&account.data).map_err(|e| {
        anyhow::anyhow!("failed to unpack mint account {} ({} bytes): {e}", mint, account.data.len())
    })?;

    DECIMALS_CACHE.insert(*mint, mint_account.decimals);
    Ok(mint_account.decimals)
}

/// Derive the associated token account of `owner` for `mint`.
pub fn derive_associated_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::USDC_MINT;

    #[test]
    fn test_ata_derivation_is_deterministic() {
        let owner = Pubkey::new_unique();
        let a = derive_associated_token_account(&owner, &USDC_MINT);
        let b = derive_associated_token_account(&owner, &USDC_MINT);
        assert_eq!(a, b);
        assert_ne!(a, owner);
    }

    #[test]
    fn test_ata_differs_per_owner() {
        let a = derive_associated_token_account(&Pubkey::new_unique(), &USDC_MINT);
        let b = derive_associated_token_account(&Pubkey::new_unique(), &USDC_MINT);
        assert_ne!(a, b);
    }
}

use log::warn;
use solana_program::{program_pack::Pack, pubkey::Pubkey};
use spl_token::state::Mint;

use crate::{
    cursor::check_min_len,
    error::{LayoutError, LayoutResult},
    state::{Market, MarketParams, OpenOrdersAccount},
};

/// Number of lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Tuning of the amount of native SOL to wrap before placing an order on a wrapped SOL market.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolWrappingConfig {
    /// Multiplier applied to the quote cost of a buy to absorb price movements
    pub slippage_buffer: f64,
    /// Lamports always added on top of the computed amount
    pub flat_lamport_buffer: u64,
}

impl Default for SolWrappingConfig {
    fn default() -> Self {
        Self {
            slippage_buffer: 1.01,
            flat_lamport_buffer: 10_000_000,
        }
    }
}

/// Converts a price expressed in quote lots per base lot to a human readable price
pub fn price_lots_to_number(price: u64, params: &MarketParams) -> f32 {
    let top = price as f64 * params.quote_lot_size as f64 * params.base_multiplier();
    let bottom = params.base_lot_size as f64 * params.quote_multiplier();
    (top / bottom) as f32
}

/// Converts a human readable price to quote lots per base lot, rounding to the nearest lot
pub fn price_number_to_lots(price: f32, params: &MarketParams) -> u64 {
    let top = price as f64 * params.quote_multiplier() * params.base_lot_size as f64;
    let bottom = params.base_multiplier() * params.quote_lot_size as f64;
    (top / bottom).round() as u64
}

/// Converts a base quantity expressed in lots to a human readable size
pub fn base_size_lots_to_number(size: u64, base_lot_size: u64, base_multiplier: u64) -> f32 {
    let top = size as f64 * base_lot_size as f64;
    (top / base_multiplier as f64) as f32
}

/// Converts a human readable base size to lots. Partial lots are truncated.
pub fn base_size_number_to_lots(size: f32, params: &MarketParams) -> u64 {
    let native = (size as f64 * params.base_multiplier()).round();
    (native / params.base_lot_size as f64) as u64
}

/// Upper bound on the native quote quantity a bid of `size` at `price` can spend
pub fn max_quote_quantity(price: f32, size: f32, params: &MarketParams) -> u64 {
    params
        .quote_lot_size
        .saturating_mul(base_size_number_to_lots(size, params))
        .saturating_mul(price_number_to_lots(price, params))
}

/// Lamports to wrap before placing an order on a market where SOL is the base or quote token.
///
/// Tokens already free in the open orders account are deducted. The result always includes
/// the flat buffer of the configuration.
pub fn lamports_needed_for_sol_wrapping(
    price: f32,
    size: f32,
    is_buy: bool,
    open_orders: Option<&OpenOrdersAccount>,
    config: &SolWrappingConfig,
) -> u64 {
    let (needed, free) = if is_buy {
        let needed = (price * size) as f64 * config.slippage_buffer * LAMPORTS_PER_SOL as f64;
        (
            needed.round().max(0.0) as u64,
            open_orders.map_or(0, |o| o.quote_token_free()),
        )
    } else {
        (
            (size * LAMPORTS_PER_SOL as f32).max(0.0) as u64,
            open_orders.map_or(0, |o| o.base_token_free()),
        )
    };
    needed
        .saturating_sub(free)
        .saturating_add(config.flat_lamport_buffer)
}

/// Derives the authority of the market vaults from its own address and nonce
pub fn vault_signer(market: &Market, program_id: &Pubkey) -> LayoutResult<Pubkey> {
    let nonce = market.vault_signer_nonce.to_le_bytes();
    Pubkey::create_program_address(&[market.own_address.as_ref(), &nonce], program_id).map_err(
        |e| {
            warn!("Vault signer derivation failed for {}: {}", market.own_address, e);
            LayoutError::InvalidVaultSignerNonce
        },
    )
}

/// Reads the decimals of an SPL token mint account
pub fn read_mint_decimals(data: &[u8]) -> LayoutResult<u8> {
    check_min_len(data, Mint::LEN)?;
    Mint::unpack_from_slice(&data[..Mint::LEN])
        .map(|mint| mint.decimals)
        .map_err(|e| {
            warn!("Could not unpack mint: {}", e);
            LayoutError::InvalidMint
        })
}

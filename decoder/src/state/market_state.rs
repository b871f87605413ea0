//! The market account tracks the mints, vaults, queues and lot sizes of a serum dex market
use enumflags2::BitFlags;
use log::debug;
use solana_program::pubkey::Pubkey;

use crate::{
    cursor::{check_magic, check_min_len, read_pubkey, read_u64, PUBKEY_SIZE, U64_SIZE},
    error::LayoutResult,
    state::{read_account_flags, AccountFlag, MarketParams, ACCOUNT_FLAGS_LEN, ACCOUNT_FLAGS_OFFSET},
};

const OWN_ADDRESS_OFFSET: usize = ACCOUNT_FLAGS_OFFSET + ACCOUNT_FLAGS_LEN;
const VAULT_SIGNER_NONCE_OFFSET: usize = OWN_ADDRESS_OFFSET + PUBKEY_SIZE;
const BASE_MINT_OFFSET: usize = VAULT_SIGNER_NONCE_OFFSET + U64_SIZE;
const QUOTE_MINT_OFFSET: usize = BASE_MINT_OFFSET + PUBKEY_SIZE;
const BASE_VAULT_OFFSET: usize = QUOTE_MINT_OFFSET + PUBKEY_SIZE;
const BASE_DEPOSITS_TOTAL_OFFSET: usize = BASE_VAULT_OFFSET + PUBKEY_SIZE;
const BASE_FEES_ACCRUED_OFFSET: usize = BASE_DEPOSITS_TOTAL_OFFSET + U64_SIZE;
const QUOTE_VAULT_OFFSET: usize = BASE_FEES_ACCRUED_OFFSET + U64_SIZE;
const QUOTE_DEPOSITS_TOTAL_OFFSET: usize = QUOTE_VAULT_OFFSET + PUBKEY_SIZE;
const QUOTE_FEES_ACCRUED_OFFSET: usize = QUOTE_DEPOSITS_TOTAL_OFFSET + U64_SIZE;
const QUOTE_DUST_THRESHOLD_OFFSET: usize = QUOTE_FEES_ACCRUED_OFFSET + U64_SIZE;
const REQUEST_QUEUE_OFFSET: usize = QUOTE_DUST_THRESHOLD_OFFSET + U64_SIZE;
const EVENT_QUEUE_OFFSET: usize = REQUEST_QUEUE_OFFSET + PUBKEY_SIZE;
const BIDS_OFFSET: usize = EVENT_QUEUE_OFFSET + PUBKEY_SIZE;
const ASKS_OFFSET: usize = BIDS_OFFSET + PUBKEY_SIZE;
const BASE_LOT_SIZE_OFFSET: usize = ASKS_OFFSET + PUBKEY_SIZE;
const QUOTE_LOT_SIZE_OFFSET: usize = BASE_LOT_SIZE_OFFSET + U64_SIZE;
const FEE_RATE_BPS_OFFSET: usize = QUOTE_LOT_SIZE_OFFSET + U64_SIZE;
const REFERRER_REBATES_ACCRUED_OFFSET: usize = FEE_RATE_BPS_OFFSET + U64_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A decoded serum market
pub struct Market {
    /// Kind and state of the account, `Initialized | Market` for a live market
    pub account_flags: BitFlags<AccountFlag>,
    /// The address the market account lives at, as recorded by the program
    pub own_address: Pubkey,
    /// Nonce used with the own address to derive the vault signer
    pub vault_signer_nonce: u64,
    /// Mint of the traded token
    pub base_mint: Pubkey,
    /// Mint of the token prices are expressed in
    pub quote_mint: Pubkey,
    /// Token account holding the deposited base tokens
    pub base_vault: Pubkey,
    /// Base tokens held by the vault, in native units
    pub base_deposits_total: u64,
    /// Base fees not yet swept, in native units
    pub base_fees_accrued: u64,
    /// Token account holding the deposited quote tokens
    pub quote_vault: Pubkey,
    /// Quote tokens held by the vault, in native units
    pub quote_deposits_total: u64,
    /// Quote fees not yet swept, in native units
    pub quote_fees_accrued: u64,
    /// Quote amount under which leftovers are not returned
    pub quote_dust_threshold: u64,
    /// Request queue address
    pub request_queue: Pubkey,
    /// Event queue address, see [`EventQueue`](crate::state::EventQueue)
    pub event_queue: Pubkey,
    /// Bids slab address
    pub bids: Pubkey,
    /// Asks slab address
    pub asks: Pubkey,
    /// Native base units per base lot
    pub base_lot_size: u64,
    /// Native quote units per quote lot
    pub quote_lot_size: u64,
    /// Taker fee rate in basis points
    pub fee_rate_bps: u64,
    /// Rebates owed to referrers, in native quote units
    pub referrer_rebates_accrued: u64,
}

impl Market {
    /// Minimum number of bytes holding every decoded field
    pub const MIN_LEN: usize = REFERRER_REBATES_ACCRUED_OFFSET + U64_SIZE;
    /// Size of a market account as allocated by the dex, trailing padding included
    pub const LEN: usize = Self::MIN_LEN + 7;

    /// Decodes a market account. Trailing bytes past the last field are ignored.
    pub fn decode(data: &[u8]) -> LayoutResult<Self> {
        check_magic(data)?;
        check_min_len(data, Self::MIN_LEN)?;

        let market = Self {
            account_flags: read_account_flags(data)?,
            own_address: read_pubkey(data, OWN_ADDRESS_OFFSET)?,
            vault_signer_nonce: read_u64(data, VAULT_SIGNER_NONCE_OFFSET)?,
            base_mint: read_pubkey(data, BASE_MINT_OFFSET)?,
            quote_mint: read_pubkey(data, QUOTE_MINT_OFFSET)?,
            base_vault: read_pubkey(data, BASE_VAULT_OFFSET)?,
            base_deposits_total: read_u64(data, BASE_DEPOSITS_TOTAL_OFFSET)?,
            base_fees_accrued: read_u64(data, BASE_FEES_ACCRUED_OFFSET)?,
            quote_vault: read_pubkey(data, QUOTE_VAULT_OFFSET)?,
            quote_deposits_total: read_u64(data, QUOTE_DEPOSITS_TOTAL_OFFSET)?,
            quote_fees_accrued: read_u64(data, QUOTE_FEES_ACCRUED_OFFSET)?,
            quote_dust_threshold: read_u64(data, QUOTE_DUST_THRESHOLD_OFFSET)?,
            request_queue: read_pubkey(data, REQUEST_QUEUE_OFFSET)?,
            event_queue: read_pubkey(data, EVENT_QUEUE_OFFSET)?,
            bids: read_pubkey(data, BIDS_OFFSET)?,
            asks: read_pubkey(data, ASKS_OFFSET)?,
            base_lot_size: read_u64(data, BASE_LOT_SIZE_OFFSET)?,
            quote_lot_size: read_u64(data, QUOTE_LOT_SIZE_OFFSET)?,
            fee_rate_bps: read_u64(data, FEE_RATE_BPS_OFFSET)?,
            referrer_rebates_accrued: read_u64(data, REFERRER_REBATES_ACCRUED_OFFSET)?,
        };
        debug!("Decoded market {}", market.own_address);
        Ok(market)
    }

    /// Combines the market lot sizes with the decimals of its two mints.
    pub fn params(&self, base_decimals: u8, quote_decimals: u8) -> MarketParams {
        MarketParams {
            base_decimals,
            quote_decimals,
            base_lot_size: self.base_lot_size,
            quote_lot_size: self.quote_lot_size,
        }
    }
}

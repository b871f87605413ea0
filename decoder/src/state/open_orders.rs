//! An open orders account holds a user's balances on a market and up to 128 resting orders.
//!
//! Orders live in fixed slots. A slot is occupied when its bit in the free slot mask is
//! cleared, and its side is given by the matching bit of the is-bid mask.
use bytemuck::{Pod, Zeroable};
use enumflags2::BitFlags;
use log::debug;
use solana_program::pubkey::Pubkey;

use crate::{
    cursor::{
        check_min_len, read_array, read_bytes, read_pubkey, read_u64, PUBKEY_SIZE, U128_SIZE,
        U64_SIZE,
    },
    error::LayoutResult,
    state::{read_account_flags, AccountFlag, MarketParams, Side, ACCOUNT_FLAGS_LEN, ACCOUNT_FLAGS_OFFSET},
    utils::price_lots_to_number,
};

/// Offset of the market key, usable as a memcmp filter when looking accounts up
pub const MARKET_OFFSET: usize = ACCOUNT_FLAGS_OFFSET + ACCOUNT_FLAGS_LEN;
/// Offset of the owner key, usable as a memcmp filter when looking accounts up
pub const OWNER_OFFSET: usize = MARKET_OFFSET + PUBKEY_SIZE;
const BASE_TOKEN_FREE_OFFSET: usize = OWNER_OFFSET + PUBKEY_SIZE;
const BASE_TOKEN_TOTAL_OFFSET: usize = BASE_TOKEN_FREE_OFFSET + U64_SIZE;
const QUOTE_TOKEN_FREE_OFFSET: usize = BASE_TOKEN_TOTAL_OFFSET + U64_SIZE;
const QUOTE_TOKEN_TOTAL_OFFSET: usize = QUOTE_TOKEN_FREE_OFFSET + U64_SIZE;
const FREE_SLOT_BITS_OFFSET: usize = QUOTE_TOKEN_TOTAL_OFFSET + U64_SIZE;
const IS_BID_BITS_OFFSET: usize = FREE_SLOT_BITS_OFFSET + U128_SIZE;
const ORDERS_OFFSET: usize = IS_BID_BITS_OFFSET + U128_SIZE;
const ORDERS_LEN: usize = SlotMask::SLOTS * OrderSlot::LEN;
const CLIENT_IDS_OFFSET: usize = ORDERS_OFFSET + ORDERS_LEN;
const CLIENT_IDS_LEN: usize = SlotMask::SLOTS * U64_SIZE;
const REFERRER_REBATES_ACCRUED_OFFSET: usize = CLIENT_IDS_OFFSET + CLIENT_IDS_LEN;

/// A 128 bit per-slot boolean array, bit `i` of the little-endian word being slot `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotMask(u128);

impl SlotMask {
    /// Number of order slots in an open orders account
    pub const SLOTS: usize = 128;

    #[allow(missing_docs)]
    pub const fn new(bits: u128) -> Self {
        Self(bits)
    }

    #[allow(missing_docs)]
    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_le_bytes(bytes))
    }

    #[allow(missing_docs)]
    pub fn to_le_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }

    #[allow(missing_docs)]
    pub fn bits(self) -> u128 {
        self.0
    }

    /// Returns the bit of slot `index`. Slots past 127 read as unset.
    pub fn bit_at(self, index: usize) -> bool {
        index < Self::SLOTS && (self.0 >> index) & 1 == 1
    }

    #[allow(missing_docs)]
    pub fn count_ones(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over the indices of the set bits, lowest first
    pub fn iter_set(self) -> impl Iterator<Item = usize> {
        (0..Self::SLOTS).filter(move |&i| self.bit_at(i))
    }
}

/// The 16 byte order id stored in a slot: sequence number first, then the price in lots
#[derive(Zeroable, Clone, Pod, Copy)]
#[repr(C)]
struct OrderSlot {
    client_order_id: [u8; 8],
    price: u64,
}

impl OrderSlot {
    const LEN: usize = std::mem::size_of::<Self>();
}

/// An occupied order slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOrder {
    /// Position of the order in the account, between 0 and 127
    pub slot: u8,
    #[allow(missing_docs)]
    pub is_bid: bool,
    /// Lower half of the order id, the sequence number assigned by the dex
    pub client_order_id: [u8; 8],
    /// Limit price in quote lots per base lot
    pub price: u64,
    /// The id chosen by the client when placing the order
    pub client_id: u64,
}

impl OpenOrder {
    #[allow(missing_docs)]
    pub fn side(&self) -> Side {
        if self.is_bid {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    /// The full 128 bit order id, as referenced by the event queue
    pub fn order_id(&self) -> u128 {
        ((self.price as u128) << 64) | u64::from_le_bytes(self.client_order_id) as u128
    }

    /// The limit price in quote tokens per base token
    pub fn float_price(&self, params: &MarketParams) -> f32 {
        price_lots_to_number(self.price, params)
    }
}

/// A decoded open orders account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrdersAccount {
    account_flags: BitFlags<AccountFlag>,
    market: Pubkey,
    owner: Pubkey,
    base_token_free: u64,
    base_token_total: u64,
    quote_token_free: u64,
    quote_token_total: u64,
    free_slot_bits: SlotMask,
    is_bid_bits: SlotMask,
    referrer_rebates_accrued: u64,
    prices: Vec<u64>,
    client_ids: Vec<u64>,
    client_order_ids: Vec<[u8; 8]>,
    free_slots: Vec<bool>,
    bid_slots: Vec<bool>,
    orders: Vec<OpenOrder>,
}

impl OpenOrdersAccount {
    /// Minimum number of bytes holding every decoded field
    pub const MIN_LEN: usize = REFERRER_REBATES_ACCRUED_OFFSET + U64_SIZE;
    /// Size of an open orders account as allocated by the dex, trailing padding included
    pub const LEN: usize = Self::MIN_LEN + 7;

    /// Decodes an open orders account and rebuilds its list of occupied slots.
    pub fn decode(data: &[u8]) -> LayoutResult<Self> {
        check_min_len(data, Self::MIN_LEN)?;

        let free_slot_bits = SlotMask::from_le_bytes(read_array(data, FREE_SLOT_BITS_OFFSET)?);
        let is_bid_bits = SlotMask::from_le_bytes(read_array(data, IS_BID_BITS_OFFSET)?);

        let slots = read_bytes(data, ORDERS_OFFSET, ORDERS_LEN)?
            .chunks_exact(OrderSlot::LEN)
            .map(bytemuck::pod_read_unaligned::<OrderSlot>);
        let client_ids = read_bytes(data, CLIENT_IDS_OFFSET, CLIENT_IDS_LEN)?
            .chunks_exact(U64_SIZE)
            .map(|chunk| u64::from_le(bytemuck::pod_read_unaligned(chunk)));

        let mut prices = Vec::with_capacity(SlotMask::SLOTS);
        let mut client_id_list = Vec::with_capacity(SlotMask::SLOTS);
        let mut client_order_ids = Vec::with_capacity(SlotMask::SLOTS);
        let mut free_slots = Vec::with_capacity(SlotMask::SLOTS);
        let mut bid_slots = Vec::with_capacity(SlotMask::SLOTS);
        let mut orders = Vec::new();

        for (slot, (order_slot, client_id)) in slots.zip(client_ids).enumerate() {
            let price = u64::from_le(order_slot.price);
            let is_free = free_slot_bits.bit_at(slot);
            let is_bid = is_bid_bits.bit_at(slot);

            prices.push(price);
            client_id_list.push(client_id);
            client_order_ids.push(order_slot.client_order_id);
            free_slots.push(is_free);
            bid_slots.push(is_bid);

            if !is_free {
                orders.push(OpenOrder {
                    slot: slot as u8,
                    is_bid,
                    client_order_id: order_slot.client_order_id,
                    price,
                    client_id,
                });
            }
        }

        let account = Self {
            account_flags: read_account_flags(data)?,
            market: read_pubkey(data, MARKET_OFFSET)?,
            owner: read_pubkey(data, OWNER_OFFSET)?,
            base_token_free: read_u64(data, BASE_TOKEN_FREE_OFFSET)?,
            base_token_total: read_u64(data, BASE_TOKEN_TOTAL_OFFSET)?,
            quote_token_free: read_u64(data, QUOTE_TOKEN_FREE_OFFSET)?,
            quote_token_total: read_u64(data, QUOTE_TOKEN_TOTAL_OFFSET)?,
            free_slot_bits,
            is_bid_bits,
            referrer_rebates_accrued: read_u64(data, REFERRER_REBATES_ACCRUED_OFFSET)?,
            prices,
            client_ids: client_id_list,
            client_order_ids,
            free_slots,
            bid_slots,
            orders,
        };
        debug!(
            "Decoded open orders of {} on market {} with {} orders",
            account.owner,
            account.market,
            account.orders.len()
        );
        Ok(account)
    }

    #[allow(missing_docs)]
    pub fn account_flags(&self) -> BitFlags<AccountFlag> {
        self.account_flags
    }

    #[allow(missing_docs)]
    pub fn market(&self) -> &Pubkey {
        &self.market
    }

    #[allow(missing_docs)]
    pub fn owner(&self) -> &Pubkey {
        &self.owner
    }

    /// Unsettled base balance
    pub fn base_token_free(&self) -> u64 {
        self.base_token_free
    }

    #[allow(missing_docs)]
    pub fn base_token_total(&self) -> u64 {
        self.base_token_total
    }

    /// Unsettled quote balance
    pub fn quote_token_free(&self) -> u64 {
        self.quote_token_free
    }

    #[allow(missing_docs)]
    pub fn quote_token_total(&self) -> u64 {
        self.quote_token_total
    }

    #[allow(missing_docs)]
    pub fn free_slot_bits(&self) -> SlotMask {
        self.free_slot_bits
    }

    #[allow(missing_docs)]
    pub fn is_bid_bits(&self) -> SlotMask {
        self.is_bid_bits
    }

    #[allow(missing_docs)]
    pub fn referrer_rebates_accrued(&self) -> u64 {
        self.referrer_rebates_accrued
    }

    /// Price of every slot, free or not
    pub fn prices(&self) -> &[u64] {
        &self.prices
    }

    /// Client id of every slot, free or not
    pub fn client_ids(&self) -> &[u64] {
        &self.client_ids
    }

    /// Lower order id half of every slot, free or not
    pub fn client_order_ids(&self) -> &[[u8; 8]] {
        &self.client_order_ids
    }

    #[allow(missing_docs)]
    pub fn free_slots(&self) -> &[bool] {
        &self.free_slots
    }

    #[allow(missing_docs)]
    pub fn bid_slots(&self) -> &[bool] {
        &self.bid_slots
    }

    /// The occupied slots, by increasing slot index
    pub fn orders(&self) -> &[OpenOrder] {
        &self.orders
    }
}

use serum_layouts::state::{EventFlag, MangoGroup, Market, OpenOrdersAccount};
use solana_program::{program_option::COption, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::Mint;

pub const EVENT_QUEUE_HEADER_LEN: usize = 37;
pub const EVENT_LEN: usize = 88;

/// Fields of a market account that the tests care about
pub struct MarketFixture {
    pub own_address: Pubkey,
    pub vault_signer_nonce: u64,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub event_queue: Pubkey,
    pub base_lot_size: u64,
    pub quote_lot_size: u64,
}

impl MarketFixture {
    pub fn new(base_lot_size: u64, quote_lot_size: u64) -> Self {
        Self {
            own_address: Pubkey::new_unique(),
            vault_signer_nonce: 0,
            base_mint: Pubkey::new_unique(),
            quote_mint: Pubkey::new_unique(),
            event_queue: Pubkey::new_unique(),
            base_lot_size,
            quote_lot_size,
        }
    }

    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = vec![0u8; Market::LEN];
        data[..5].copy_from_slice(b"serum");
        // Initialized | Market
        data[5..13].copy_from_slice(&3u64.to_le_bytes());
        data[13..45].copy_from_slice(self.own_address.as_ref());
        data[45..53].copy_from_slice(&self.vault_signer_nonce.to_le_bytes());
        data[53..85].copy_from_slice(self.base_mint.as_ref());
        data[85..117].copy_from_slice(self.quote_mint.as_ref());
        data[253..285].copy_from_slice(self.event_queue.as_ref());
        data[349..357].copy_from_slice(&self.base_lot_size.to_le_bytes());
        data[357..365].copy_from_slice(&self.quote_lot_size.to_le_bytes());
        data[365..373].copy_from_slice(&22u64.to_le_bytes());
        data
    }
}

pub fn mint_account_data(decimals: u8) -> Vec<u8> {
    let mut data = vec![0u8; Mint::LEN];
    Mint {
        mint_authority: COption::None,
        supply: 1_000_000,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    }
    .pack_into_slice(&mut data);
    data
}

/// A raw event queue record
#[derive(Clone)]
pub struct RawEvent {
    pub flags: u8,
    pub owner_slot: u8,
    pub fee_tier: u8,
    pub released: u64,
    pub paid: u64,
    pub fee: u64,
    pub order_id: u128,
    pub owner: Pubkey,
    pub client_order_id: u64,
}

impl RawEvent {
    pub fn fill(bid: bool, maker: bool, released: u64, paid: u64, fee: u64) -> Self {
        let mut flags = EventFlag::Fill as u8;
        if bid {
            flags |= EventFlag::Bid as u8;
        }
        if maker {
            flags |= EventFlag::Maker as u8;
        }
        Self {
            flags,
            owner_slot: 0,
            fee_tier: 0,
            released,
            paid,
            fee,
            order_id: 0,
            owner: Pubkey::default(),
            client_order_id: 0,
        }
    }

    pub fn out(bid: bool, released: u64) -> Self {
        let mut event = Self::fill(bid, true, released, 0, 0);
        event.flags = EventFlag::Out as u8 | if bid { EventFlag::Bid as u8 } else { 0 };
        event
    }

    pub fn write(&self, data: &mut [u8]) {
        data[0] = self.flags;
        data[1] = self.owner_slot;
        data[2] = self.fee_tier;
        data[8..16].copy_from_slice(&self.released.to_le_bytes());
        data[16..24].copy_from_slice(&self.paid.to_le_bytes());
        data[24..32].copy_from_slice(&self.fee.to_le_bytes());
        data[32..48].copy_from_slice(&self.order_id.to_le_bytes());
        data[48..80].copy_from_slice(self.owner.as_ref());
        data[80..88].copy_from_slice(&self.client_order_id.to_le_bytes());
    }
}

/// Builds an event queue of `capacity` slots holding `events` at the given slot indexes.
pub fn event_queue_data(
    capacity: usize,
    head: u32,
    count: u32,
    events: &[(usize, RawEvent)],
) -> Vec<u8> {
    let mut data = vec![0u8; EVENT_QUEUE_HEADER_LEN + capacity * EVENT_LEN];
    data[..5].copy_from_slice(b"serum");
    // Initialized | EventQueue
    data[5..13].copy_from_slice(&((1u64 << 0) | (1 << 4)).to_le_bytes());
    data[13..17].copy_from_slice(&head.to_le_bytes());
    data[21..25].copy_from_slice(&count.to_le_bytes());
    data[29..33].copy_from_slice(&(head + count).to_le_bytes());
    for (index, event) in events {
        let offset = EVENT_QUEUE_HEADER_LEN + index * EVENT_LEN;
        event.write(&mut data[offset..offset + EVENT_LEN]);
    }
    data
}

/// An open order to place in a given slot
pub struct RawOrder {
    pub slot: usize,
    pub is_bid: bool,
    pub price: u64,
    pub client_id: u64,
}

pub fn open_orders_data(
    market: &Pubkey,
    owner: &Pubkey,
    base_free: u64,
    quote_free: u64,
    orders: &[RawOrder],
) -> Vec<u8> {
    let mut data = vec![0u8; OpenOrdersAccount::LEN];
    data[..5].copy_from_slice(b"serum");
    // Initialized | OpenOrders
    data[5..13].copy_from_slice(&((1u64 << 0) | (1 << 2)).to_le_bytes());
    data[13..45].copy_from_slice(market.as_ref());
    data[45..77].copy_from_slice(owner.as_ref());
    data[77..85].copy_from_slice(&base_free.to_le_bytes());
    data[85..93].copy_from_slice(&base_free.to_le_bytes());
    data[93..101].copy_from_slice(&quote_free.to_le_bytes());
    data[101..109].copy_from_slice(&quote_free.to_le_bytes());

    let mut free_slots = u128::MAX;
    let mut bid_slots = 0u128;
    for order in orders {
        free_slots &= !(1 << order.slot);
        if order.is_bid {
            bid_slots |= 1 << order.slot;
        }
        let offset = 141 + order.slot * 16;
        data[offset..offset + 8].copy_from_slice(&(order.slot as u64).to_le_bytes());
        data[offset + 8..offset + 16].copy_from_slice(&order.price.to_le_bytes());
        let offset = 2189 + order.slot * 8;
        data[offset..offset + 8].copy_from_slice(&order.client_id.to_le_bytes());
    }
    data[109..125].copy_from_slice(&free_slots.to_le_bytes());
    data[125..141].copy_from_slice(&bid_slots.to_le_bytes());
    data
}

pub fn mango_group_data(tokens: &[Pubkey; 5], dex_program_id: &Pubkey) -> Vec<u8> {
    let mut data = vec![0u8; MangoGroup::MIN_LEN];
    // Initialized | MangoGroup
    data[0] = 0b11;
    for (i, token) in tokens.iter().enumerate() {
        data[8 + i * 32..40 + i * 32].copy_from_slice(token.as_ref());
    }
    data[824..856].copy_from_slice(dex_program_id.as_ref());
    data
}

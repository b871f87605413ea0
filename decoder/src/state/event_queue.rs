use bytemuck::{Pod, Zeroable};
use enumflags2::{bitflags, BitFlags};
use log::{debug, warn};
use solana_program::pubkey::Pubkey;

use crate::{
    cursor::{check_magic, check_min_len, read_bytes, read_u32},
    error::{LayoutError, LayoutResult},
    state::{read_account_flags, AccountFlag, MarketParams, Side},
};

/// Size of the "serum" padding, account flags, head, count and sequence number
pub const EVENT_QUEUE_HEADER_LEN: usize = 37;

const HEAD_OFFSET: usize = 13;
const COUNT_OFFSET: usize = 21;
const SEQ_NUM_OFFSET: usize = 29;

////////////////////////////////////////////////////
// Events

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum EventFlag {
    Fill = 0x1,
    Out = 0x2,
    Bid = 0x4,
    Maker = 0x8,
    ReleaseFunds = 0x10,
}

/// One slot of the event queue ring buffer, as laid out by the dex
#[derive(Zeroable, Clone, Pod, Copy)]
#[repr(C)]
struct EventNode {
    event_flags: u8,
    owner_slot: u8,
    fee_tier: u8,
    _padding: [u8; 5],
    /// Amount the owner received
    native_qty_released: u64,
    /// Amount the owner paid
    native_qty_paid: u64,
    native_fee_or_rebate: u64,
    order_id: [u8; 16],
    owner: Pubkey,
    client_order_id: u64,
}

impl EventNode {
    const LEN: usize = std::mem::size_of::<Self>();
}

/// A fill read out of the event queue, with its price and size scaled to human units
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    open_orders: Pubkey,
    open_orders_slot: u8,
    fee_tier: u8,
    event_flags: BitFlags<EventFlag>,
    native_quantity_released: u64,
    native_quantity_paid: u64,
    native_fee_or_rebate: u64,
    order_id: u128,
    client_order_id: u64,
    float_price: f32,
    float_quantity: f32,
}

impl TradeEvent {
    /// Returns `None` for anything but a fill with a non zero paid quantity.
    fn from_node(node: &EventNode, params: &MarketParams) -> Option<Self> {
        let event_flags = BitFlags::<EventFlag>::from_bits_truncate(node.event_flags);
        let native_quantity_paid = u64::from_le(node.native_qty_paid);
        if !event_flags.contains(EventFlag::Fill) || native_quantity_paid == 0 {
            return None;
        }
        let native_quantity_released = u64::from_le(node.native_qty_released);
        let native_fee_or_rebate = u64::from_le(node.native_fee_or_rebate);

        let (float_price, float_quantity) = fill_price_and_quantity(
            event_flags,
            native_quantity_released,
            native_quantity_paid,
            native_fee_or_rebate,
            params,
        );

        Some(Self {
            open_orders: node.owner,
            open_orders_slot: node.owner_slot,
            fee_tier: node.fee_tier,
            event_flags,
            native_quantity_released,
            native_quantity_paid,
            native_fee_or_rebate,
            order_id: u128::from_le_bytes(node.order_id),
            client_order_id: u64::from_le(node.client_order_id),
            float_price,
            float_quantity,
        })
    }

    /// The open orders account which owns the filled order
    pub fn open_orders(&self) -> &Pubkey {
        &self.open_orders
    }

    /// Position of the filled order in its open orders account
    pub fn open_orders_slot(&self) -> u8 {
        self.open_orders_slot
    }

    #[allow(missing_docs)]
    pub fn fee_tier(&self) -> u8 {
        self.fee_tier
    }

    #[allow(missing_docs)]
    pub fn event_flags(&self) -> BitFlags<EventFlag> {
        self.event_flags
    }

    #[allow(missing_docs)]
    pub fn side(&self) -> Side {
        if self.event_flags.contains(EventFlag::Bid) {
            Side::Bid
        } else {
            Side::Ask
        }
    }

    /// True when the filled order was resting on the book
    pub fn is_maker(&self) -> bool {
        self.event_flags.contains(EventFlag::Maker)
    }

    /// Native amount the owner received
    pub fn native_quantity_released(&self) -> u64 {
        self.native_quantity_released
    }

    /// Native amount the owner paid
    pub fn native_quantity_paid(&self) -> u64 {
        self.native_quantity_paid
    }

    /// Fee paid by a taker, or rebate credited to a maker, in native quote units
    pub fn native_fee_or_rebate(&self) -> u64 {
        self.native_fee_or_rebate
    }

    #[allow(missing_docs)]
    pub fn order_id(&self) -> u128 {
        self.order_id
    }

    /// The order id as the 16 little-endian bytes stored in the queue
    pub fn order_id_bytes(&self) -> [u8; 16] {
        self.order_id.to_le_bytes()
    }

    /// Limit price of the order in quote lots per base lot, packed in the upper half of the order id
    pub fn price_lots(&self) -> u64 {
        (self.order_id >> 64) as u64
    }

    #[allow(missing_docs)]
    pub fn client_order_id(&self) -> u64 {
        self.client_order_id
    }

    /// Price before fees, in quote tokens per base token
    pub fn float_price(&self) -> f32 {
        self.float_price
    }

    /// Filled size in base tokens
    pub fn float_quantity(&self) -> f32 {
        self.float_quantity
    }
}

/// Recovers the pre-fee price and base size of a fill.
///
/// A bid pays quote and receives base, an ask does the opposite. Makers get the rebate
/// added back to what they paid (bid) or removed from what they received (ask), takers
/// the other way around. Results are narrowed to `f32` on purpose.
fn fill_price_and_quantity(
    flags: BitFlags<EventFlag>,
    native_quantity_released: u64,
    native_quantity_paid: u64,
    native_fee_or_rebate: u64,
    params: &MarketParams,
) -> (f32, f32) {
    let released = native_quantity_released as i128;
    let paid = native_quantity_paid as i128;
    let fee = native_fee_or_rebate as i128;
    let maker = flags.contains(EventFlag::Maker);

    let (price_before_fees, native_base_quantity) = if flags.contains(EventFlag::Bid) {
        (if maker { paid + fee } else { paid - fee }, released)
    } else {
        (if maker { released - fee } else { released + fee }, paid)
    };

    let base_multiplier = params.base_multiplier();
    let top = price_before_fees as f64 * base_multiplier;
    let bottom = params.quote_multiplier() * native_base_quantity as f64;
    let quantity = native_base_quantity as f64 / base_multiplier;
    ((top / bottom) as f32, quantity as f32)
}

////////////////////////////////////////////////////
// Event Queue

/// Yields every slot index of a ring of `capacity` slots, newest live event first.
///
/// The `count` live slots come first, from the newest (`head + count - 1`) back to `head`,
/// followed by the stale slots.
pub fn newest_first_indices(
    head: u32,
    count: u32,
    capacity: usize,
) -> impl Iterator<Item = usize> {
    let capacity = capacity as u64;
    let start = head as u64 + count as u64 + capacity;
    (0..capacity).map(move |i| ((start - 1 - i) % capacity) as usize)
}

/// A decoded event queue account.
///
/// Only the fills are kept from the ring buffer, ordered from the most recent to the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQueue {
    account_flags: BitFlags<AccountFlag>,
    head: u32,
    count: u32,
    seq_num: u32,
    capacity: usize,
    events: Vec<TradeEvent>,
}

impl EventQueue {
    /// Size of a single serialized event
    pub const EVENT_LEN: usize = EventNode::LEN;

    /// Compute the allocation size for an event queue of a desired capacity
    pub fn compute_allocation_size(desired_event_capacity: usize) -> usize {
        desired_event_capacity * Self::EVENT_LEN + EVENT_QUEUE_HEADER_LEN
    }

    /// Decodes an event queue account, scaling the fills with the owning market's parameters.
    pub fn decode(data: &[u8], params: &MarketParams) -> LayoutResult<Self> {
        check_magic(data)?;
        check_min_len(data, EVENT_QUEUE_HEADER_LEN)?;
        let events_len = data.len() - EVENT_QUEUE_HEADER_LEN;
        if events_len % Self::EVENT_LEN != 0 {
            warn!("Event queue account size is invalid!");
            return Err(LayoutError::InvalidQueueLength { len: data.len() });
        }
        let capacity = events_len / Self::EVENT_LEN;

        let account_flags = read_account_flags(data)?;
        let head = read_u32(data, HEAD_OFFSET)?;
        let count = read_u32(data, COUNT_OFFSET)?;
        let seq_num = read_u32(data, SEQ_NUM_OFFSET)?;

        let mut events = Vec::with_capacity(capacity.min(count as usize));
        for node_index in newest_first_indices(head, count, capacity) {
            let offset = EVENT_QUEUE_HEADER_LEN + node_index * Self::EVENT_LEN;
            let node: EventNode =
                bytemuck::pod_read_unaligned(read_bytes(data, offset, Self::EVENT_LEN)?);
            if let Some(event) = TradeEvent::from_node(&node, params) {
                events.push(event);
            }
        }

        debug!(
            "Decoded {} fills from an event queue of {} slots (head {}, count {})",
            events.len(),
            capacity,
            head,
            count
        );
        Ok(Self {
            account_flags,
            head,
            count,
            seq_num,
            capacity,
            events,
        })
    }

    #[allow(missing_docs)]
    pub fn account_flags(&self) -> BitFlags<AccountFlag> {
        self.account_flags
    }

    /// Index of the oldest live event
    pub fn head(&self) -> u32 {
        self.head
    }

    /// Number of live events
    pub fn count(&self) -> u32 {
        self.count
    }

    #[allow(missing_docs)]
    pub fn seq_num(&self) -> u32 {
        self.seq_num
    }

    /// Number of slots in the ring buffer
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fills ordered from the most recent to the oldest
    pub fn events(&self) -> &[TradeEvent] {
        &self.events
    }

    #[allow(missing_docs)]
    pub fn into_events(self) -> Vec<TradeEvent> {
        self.events
    }

    /// The most recent fill, if any
    pub fn latest_fill(&self) -> Option<&TradeEvent> {
        self.events.first()
    }
}

use enumflags2::{bitflags, BitFlags};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{cursor::read_u64, error::LayoutResult};

/// Fixed point 64.64 numbers
pub mod fixed_point;
/// The mango margin group account
pub mod mango_group;
/// The serum market account
pub mod market_state;
/// The serum event queue and the trade events derived from it
pub mod event_queue;
/// The serum open orders account and its order slots
pub mod open_orders;

pub use event_queue::{EventFlag, EventQueue, TradeEvent};
pub use fixed_point::U64F64;
pub use mango_group::{MangoAccountFlag, MangoGroup, MangoIndex};
pub use market_state::Market;
pub use open_orders::{OpenOrder, OpenOrdersAccount, SlotMask};

#[allow(missing_docs)]
pub mod serum_dex_v3 {
    use solana_program::declare_id;

    declare_id!("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin");
}

/// The wrapped SOL mint. Markets using it as base or quote need native SOL wrapped before trading,
/// see [`lamports_needed_for_sol_wrapping`](crate::utils::lamports_needed_for_sol_wrapping).
pub mod wrapped_sol {
    use solana_program::declare_id;

    declare_id!("So11111111111111111111111111111111111111112");
}

/// Offset of the account flags in every serum account, right after the "serum" padding.
pub const ACCOUNT_FLAGS_OFFSET: usize = 5;
#[allow(missing_docs)]
pub const ACCOUNT_FLAGS_LEN: usize = 8;

/// Tags the type and state of a serum dex account
#[bitflags]
#[repr(u64)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AccountFlag {
    Initialized = 1 << 0,
    Market = 1 << 1,
    OpenOrders = 1 << 2,
    RequestQueue = 1 << 3,
    EventQueue = 1 << 4,
    Bids = 1 << 5,
    Asks = 1 << 6,
    Disabled = 1 << 7,
    Closed = 1 << 8,
    Permissioned = 1 << 9,
}

/// Reads the account flags of a serum account. Bits without a flag are dropped.
pub fn read_account_flags(data: &[u8]) -> LayoutResult<BitFlags<AccountFlag>> {
    read_u64(data, ACCOUNT_FLAGS_OFFSET).map(BitFlags::from_bits_truncate)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Side {
    Bid = 0,
    Ask = 1,
}

impl Side {
    /// Returns the side of the counterparty
    pub fn opposite(&self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

/// Describes what happens when two orders with the same owner would match
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
pub enum SelfTradeBehavior {
    /// The orders are matched together
    DecrementTake = 0,
    /// The order on the provide side is cancelled. Matching for the current order continues and essentially bypasses
    /// the self-provided order.
    CancelProvide = 1,
    /// The entire transaction fails and the program returns an error.
    AbortTransaction = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum OrderType {
    Limit = 0,
    ImmediateOrCancel = 1,
    PostOnly = 2,
}

/// Decimal places and lot sizes of a market, needed to scale native quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarketParams {
    #[allow(missing_docs)]
    pub base_decimals: u8,
    #[allow(missing_docs)]
    pub quote_decimals: u8,
    /// Minimum tradable increment of the base token, in native units
    pub base_lot_size: u64,
    /// Minimum tradable increment of the quote token, in native units
    pub quote_lot_size: u64,
}

impl MarketParams {
    /// 10^base_decimals
    pub fn base_multiplier(&self) -> f64 {
        10f64.powi(self.base_decimals as i32)
    }

    /// 10^quote_decimals
    pub fn quote_multiplier(&self) -> f64 {
        10f64.powi(self.quote_decimals as i32)
    }
}

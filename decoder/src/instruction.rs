//! Construction of the serum dex `NewOrderV3` instruction payload.
use borsh::{BorshDeserialize, BorshSerialize};
use log::warn;
use solana_program::pubkey::Pubkey;

use crate::{
    cursor::{check_min_len, read_u32, read_u8},
    error::{LayoutError, LayoutResult},
    state::{OrderType, SelfTradeBehavior, Side},
};

/// Size of an encoded `NewOrderV3` payload
pub const NEW_ORDER_V3_LEN: usize = 51;
/// Instruction tag of `NewOrderV3` in the dex instruction enum
pub const NEW_ORDER_V3_TAG: u32 = 10;
/// Value of the matching limit, the dex caps it to what fits in the compute budget
pub const DEFAULT_MATCH_LIMIT: u16 = u16::MAX;

const VERSION_OFFSET: usize = 0;
const TAG_OFFSET: usize = 1;
const SIDE_OFFSET: usize = 5;
const LIMIT_PRICE_OFFSET: usize = 9;
const MAX_BASE_QUANTITY_OFFSET: usize = 17;
const MAX_QUOTE_QUANTITY_OFFSET: usize = 25;
const SELF_TRADE_BEHAVIOR_OFFSET: usize = 33;
const ORDER_TYPE_OFFSET: usize = 37;
const CLIENT_ID_OFFSET: usize = 41;
const LIMIT_OFFSET: usize = 49;

/// An order to be submitted to the dex.
///
/// Prices and quantities are in lots, the float fields only carry the human readable
/// values the order was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    #[allow(missing_docs)]
    pub side: Side,
    /// Limit price in quote lots per base lot
    pub limit_price: u64,
    /// Maximum quantity of base lots to buy or sell
    pub max_base_quantity: u64,
    /// Maximum native quote quantity to spend, including fees
    pub max_quote_quantity: u64,
    /// Identifier chosen by the client, echoed in the open orders account and fill events
    pub client_id: u64,
    #[allow(missing_docs)]
    pub order_type: OrderType,
    #[allow(missing_docs)]
    pub self_trade_behavior: SelfTradeBehavior,
    /// The wallet placing the order
    pub owner: Pubkey,
    #[allow(missing_docs)]
    pub float_price: f32,
    #[allow(missing_docs)]
    pub float_quantity: f32,
}

impl Order {
    /// A limit order that decrements the take side on self trade and has no quote cap.
    pub fn new(
        side: Side,
        limit_price: u64,
        max_base_quantity: u64,
        client_id: u64,
        owner: Pubkey,
    ) -> Self {
        Self {
            side,
            limit_price,
            max_base_quantity,
            max_quote_quantity: u64::MAX,
            client_id,
            order_type: OrderType::Limit,
            self_trade_behavior: SelfTradeBehavior::DecrementTake,
            owner,
            float_price: 0.0,
            float_quantity: 0.0,
        }
    }

    #[allow(missing_docs)]
    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    #[allow(missing_docs)]
    pub fn with_self_trade_behavior(mut self, self_trade_behavior: SelfTradeBehavior) -> Self {
        self.self_trade_behavior = self_trade_behavior;
        self
    }

    #[allow(missing_docs)]
    pub fn with_max_quote_quantity(mut self, max_quote_quantity: u64) -> Self {
        self.max_quote_quantity = max_quote_quantity;
        self
    }

    /// Records the human readable price and size the lot values were derived from.
    pub fn with_float_values(mut self, float_price: f32, float_quantity: f32) -> Self {
        self.float_price = float_price;
        self.float_quantity = float_quantity;
        self
    }

    /// True for orders on the bid side
    pub fn is_buy(&self) -> bool {
        self.side == Side::Bid
    }

    /// The `NewOrderV3` payload of the order.
    pub fn to_new_order_v3_bytes(&self) -> [u8; NEW_ORDER_V3_LEN] {
        let mut payload = [0u8; NEW_ORDER_V3_LEN];
        payload[VERSION_OFFSET] = 0;
        payload[TAG_OFFSET..SIDE_OFFSET].copy_from_slice(&NEW_ORDER_V3_TAG.to_le_bytes());
        payload[SIDE_OFFSET..LIMIT_PRICE_OFFSET]
            .copy_from_slice(&u32::from(self.side).to_le_bytes());
        payload[LIMIT_PRICE_OFFSET..MAX_BASE_QUANTITY_OFFSET]
            .copy_from_slice(&self.limit_price.to_le_bytes());
        payload[MAX_BASE_QUANTITY_OFFSET..MAX_QUOTE_QUANTITY_OFFSET]
            .copy_from_slice(&self.max_base_quantity.to_le_bytes());
        payload[MAX_QUOTE_QUANTITY_OFFSET..SELF_TRADE_BEHAVIOR_OFFSET]
            .copy_from_slice(&self.max_quote_quantity.to_le_bytes());
        payload[SELF_TRADE_BEHAVIOR_OFFSET..ORDER_TYPE_OFFSET]
            .copy_from_slice(&u32::from(self.self_trade_behavior).to_le_bytes());
        payload[ORDER_TYPE_OFFSET..CLIENT_ID_OFFSET]
            .copy_from_slice(&u32::from(self.order_type).to_le_bytes());
        payload[CLIENT_ID_OFFSET..LIMIT_OFFSET].copy_from_slice(&self.client_id.to_le_bytes());
        payload[LIMIT_OFFSET..].copy_from_slice(&DEFAULT_MATCH_LIMIT.to_le_bytes());
        payload
    }

    /// Encodes the order into a freshly allocated `NewOrderV3` payload.
    pub fn to_new_order_v3_data(&self) -> Vec<u8> {
        self.to_new_order_v3_bytes().to_vec()
    }
}

/// Writes the `NewOrderV3` payload of `order` at the start of `data`.
///
/// Bytes past [`NEW_ORDER_V3_LEN`] are left untouched. Fails without writing anything
/// when the buffer is too small.
pub fn encode_new_order_v3(order: &Order, data: &mut [u8]) -> LayoutResult {
    check_min_len(data, NEW_ORDER_V3_LEN)?;
    data[..NEW_ORDER_V3_LEN].copy_from_slice(&order.to_new_order_v3_bytes());
    Ok(())
}

/// The fields of a `NewOrderV3` instruction, as they follow the version byte and tag.
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, PartialEq, Eq)]
pub struct NewOrderInstructionV3 {
    #[allow(missing_docs)]
    pub side: u32,
    #[allow(missing_docs)]
    pub limit_price: u64,
    #[allow(missing_docs)]
    pub max_base_quantity: u64,
    #[allow(missing_docs)]
    pub max_quote_quantity: u64,
    #[allow(missing_docs)]
    pub self_trade_behavior: u32,
    #[allow(missing_docs)]
    pub order_type: u32,
    #[allow(missing_docs)]
    pub client_id: u64,
    /// Maximum number of orders matched before the remainder is posted or dropped
    pub limit: u16,
}

impl NewOrderInstructionV3 {
    #[allow(missing_docs)]
    pub fn side(&self) -> LayoutResult<Side> {
        Side::try_from(self.side).map_err(|_| LayoutError::InvalidEnumValue {
            field: "side",
            value: self.side as u64,
        })
    }

    #[allow(missing_docs)]
    pub fn order_type(&self) -> LayoutResult<OrderType> {
        OrderType::try_from(self.order_type).map_err(|_| LayoutError::InvalidEnumValue {
            field: "order_type",
            value: self.order_type as u64,
        })
    }

    #[allow(missing_docs)]
    pub fn self_trade_behavior(&self) -> LayoutResult<SelfTradeBehavior> {
        SelfTradeBehavior::try_from(self.self_trade_behavior).map_err(|_| {
            LayoutError::InvalidEnumValue {
                field: "self_trade_behavior",
                value: self.self_trade_behavior as u64,
            }
        })
    }
}

/// Parses a `NewOrderV3` payload, checking the version byte and instruction tag.
pub fn unpack_new_order_v3(data: &[u8]) -> LayoutResult<NewOrderInstructionV3> {
    check_min_len(data, NEW_ORDER_V3_LEN)?;
    let version = read_u8(data, VERSION_OFFSET)?;
    if version != 0 {
        warn!("Unsupported instruction version {}", version);
        return Err(LayoutError::InvalidEnumValue {
            field: "version",
            value: version as u64,
        });
    }
    let tag = read_u32(data, TAG_OFFSET)?;
    if tag != NEW_ORDER_V3_TAG {
        warn!("Expected a NewOrderV3 instruction, found tag {}", tag);
        return Err(LayoutError::InvalidEnumValue {
            field: "instruction",
            value: tag as u64,
        });
    }
    let mut payload = &data[SIDE_OFFSET..NEW_ORDER_V3_LEN];
    // The slice is exactly as long as the struct, so deserializing cannot run short
    NewOrderInstructionV3::deserialize(&mut payload).map_err(|e| {
        warn!("Could not deserialize NewOrderV3 payload: {}", e);
        LayoutError::AccountTooSmall {
            len: data.len(),
            min: NEW_ORDER_V3_LEN,
        }
    })
}

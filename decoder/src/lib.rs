#![warn(missing_docs)]
/*!
Decoders for the account layouts of the Serum DEX v3 and of the Mango margin program.

## Overview

This library turns raw account data, as returned by an RPC node, into typed structures. It performs no
network access and holds no state: every decoder is a pure function from a byte slice to a value.

The supported accounts are:
- the dex [`Market`][`state::Market`], which references the mints, vaults and queues of a market
- the dex [`EventQueue`][`state::EventQueue`], from which fills are extracted as [`TradeEvent`][`state::TradeEvent`] objects
- the dex [`OpenOrdersAccount`][`state::OpenOrdersAccount`], holding the balances and order slots of a trader
- the mango [`MangoGroup`][`state::MangoGroup`], with its tokens, oracles and lending indexes

## Reading fills

Fill events only carry native quantities. To compute human readable prices, the event queue decoder needs the
decimals of both mints alongside the lot sizes of the market, bundled as [`MarketParams`][`state::MarketParams`].
The decimals are found in the mint accounts through [`read_mint_decimals`][`utils::read_mint_decimals`].

The events are returned most recent first, so that the last fill of a market is the first fill event of the list.

## Placing orders

The [`instruction`] module encodes the `NewOrderV3` instruction payload of the dex from an [`Order`][`instruction::Order`].
Conversions between human readable values and lots are found in [`utils`].

## Errors

Every decoder returns a [`LayoutError`][`error::LayoutError`] when the data does not match the expected layout: missing
`serum` padding, buffer too short, or event queue length which is not a whole number of events.
*/

/// Bounds checked little endian reads and writes
pub mod cursor;
/// Layout errors
pub mod error;
/// Order construction and the `NewOrderV3` payload
pub mod instruction;
/// Describes the account layouts handled by the library
pub mod state;
/// Lot conversions and other helpers for building orders
pub mod utils;

pub use error::{LayoutError, LayoutResult};

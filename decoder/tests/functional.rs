use serum_layouts::{
    instruction::{unpack_new_order_v3, Order},
    state::{
        serum_dex_v3, AccountFlag, EventQueue, MangoAccountFlag, MangoGroup, Market,
        OpenOrdersAccount, OrderType, Side,
    },
    utils::{
        base_size_number_to_lots, lamports_needed_for_sol_wrapping, max_quote_quantity,
        price_number_to_lots, read_mint_decimals, vault_signer, SolWrappingConfig,
    },
    LayoutError,
};
use solana_program::pubkey::Pubkey;

pub mod common;
use crate::common::utils::{
    event_queue_data, mango_group_data, mint_account_data, open_orders_data, MarketFixture,
    RawEvent, RawOrder, EVENT_LEN, EVENT_QUEUE_HEADER_LEN,
};

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() <= expected.abs() * 4.0 * f32::EPSILON,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn test_sol_usdc_market() {
    let mut fixture = MarketFixture::new(100_000_000, 100);
    fixture.vault_signer_nonce = (0..=u8::MAX as u64)
        .find(|nonce| {
            Pubkey::create_program_address(
                &[fixture.own_address.as_ref(), &nonce.to_le_bytes()],
                &serum_dex_v3::ID,
            )
            .is_ok()
        })
        .unwrap();

    let market = Market::decode(&fixture.to_account_data()).unwrap();
    assert_eq!(
        market.account_flags,
        AccountFlag::Initialized | AccountFlag::Market
    );
    assert_eq!(market.base_mint, fixture.base_mint);
    assert_eq!(market.event_queue, fixture.event_queue);
    assert_eq!(market.fee_rate_bps, 22);
    assert!(vault_signer(&market, &serum_dex_v3::ID).is_ok());

    let base_decimals = read_mint_decimals(&mint_account_data(9)).unwrap();
    let quote_decimals = read_mint_decimals(&mint_account_data(6)).unwrap();
    let params = market.params(base_decimals, quote_decimals);

    // Live slots are 6, 7, 0 and 1. Slot 3 holds a fill from an earlier lap.
    let owner = Pubkey::new_unique();
    let mut newest = RawEvent::fill(true, true, 2_000_000_000, 46_990_000, 10_000);
    newest.owner = owner;
    newest.owner_slot = 5;
    newest.client_order_id = 99;
    let events = [
        (6, RawEvent::fill(true, false, 1_000_000_000, 23_022_000, 22_000)),
        (7, RawEvent::out(false, 1_000_000_000)),
        (0, RawEvent::fill(false, true, 24_010_000, 1_000_000_000, 10_000)),
        (1, newest),
        (3, RawEvent::fill(false, false, 22_480_000, 1_000_000_000, 20_000)),
    ];
    let queue_data = event_queue_data(8, 6, 4, &events);
    let queue = EventQueue::decode(&queue_data, &params).unwrap();

    assert_eq!(queue.capacity(), 8);
    assert_eq!(queue.seq_num(), 10);
    assert_eq!(
        queue.account_flags(),
        AccountFlag::Initialized | AccountFlag::EventQueue
    );
    let prices = queue
        .events()
        .iter()
        .map(|e| e.float_price())
        .collect::<Vec<_>>();
    assert_eq!(prices.len(), 4);
    for (price, expected) in prices.iter().zip([23.5, 24.0, 23.0, 22.5]) {
        assert_close(*price, expected);
    }

    let latest = queue.latest_fill().unwrap();
    assert_eq!(latest.open_orders(), &owner);
    assert_eq!(latest.open_orders_slot(), 5);
    assert_eq!(latest.client_order_id(), 99);
    assert_eq!(latest.side(), Side::Bid);
    assert!(latest.is_maker());
    assert_close(latest.float_quantity(), 2.0);

    let orders_data = open_orders_data(
        &fixture.own_address,
        &owner,
        3_000_000_000,
        1_000_000_000,
        &[
            RawOrder {
                slot: 0,
                is_bid: true,
                price: 23_500,
                client_id: 7,
            },
            RawOrder {
                slot: 5,
                is_bid: false,
                price: 24_000,
                client_id: 99,
            },
        ],
    );
    let open_orders = OpenOrdersAccount::decode(&orders_data).unwrap();
    assert_eq!(open_orders.market(), &market.own_address);
    let orders = open_orders.orders();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].slot, 0);
    assert_eq!(orders[0].side(), Side::Bid);
    assert_close(orders[0].float_price(&params), 23.5);
    assert_eq!(orders[1].slot, 5);
    assert_eq!(orders[1].client_id, latest.client_order_id());

    // Re-place the first order as a post only bid
    let price_lots = price_number_to_lots(23.5, &params);
    let size_lots = base_size_number_to_lots(2.0, &params);
    let order = Order::new(Side::Bid, price_lots, size_lots, 8, owner)
        .with_order_type(OrderType::PostOnly)
        .with_max_quote_quantity(max_quote_quantity(23.5, 2.0, &params))
        .with_float_values(23.5, 2.0);
    assert!(order.is_buy());
    let payload = unpack_new_order_v3(&order.to_new_order_v3_data()).unwrap();
    assert_eq!(payload.limit_price, orders[0].price);
    assert_eq!(payload.max_base_quantity, 20);
    assert_eq!(payload.max_quote_quantity, 47_000_000);
    assert_eq!(payload.order_type().unwrap(), OrderType::PostOnly);

    let config = SolWrappingConfig::default();
    assert_eq!(
        lamports_needed_for_sol_wrapping(23.5, 2.0, true, Some(&open_orders), &config),
        47_470_000_000 - 1_000_000_000 + 10_000_000
    );
    // Enough base is already free, only the flat buffer remains
    assert_eq!(
        lamports_needed_for_sol_wrapping(23.5, 2.0, false, Some(&open_orders), &config),
        10_000_000
    );
}

#[test]
fn test_mango_group() {
    let tokens = [(); 5].map(|_| Pubkey::new_unique());
    let group = MangoGroup::decode(&mango_group_data(&tokens, &serum_dex_v3::ID)).unwrap();
    assert_eq!(
        group.account_flags,
        MangoAccountFlag::Initialized | MangoAccountFlag::MangoGroup
    );
    assert_eq!(group.tokens, tokens);
    assert_eq!(group.dex_program_id, serum_dex_v3::ID);
    assert!(group.indexes.iter().all(|i| i.last_update == 0));
}

#[test]
fn test_malformed_accounts() {
    let market = Market::decode(&MarketFixture::new(1, 1).to_account_data()).unwrap();
    let params = market.params(6, 6);

    let queue_data = event_queue_data(1, 0, 0, &[]);
    let truncated = &queue_data[..EVENT_QUEUE_HEADER_LEN + EVENT_LEN / 2];
    assert_eq!(
        EventQueue::decode(truncated, &params),
        Err(LayoutError::InvalidQueueLength {
            len: EVENT_QUEUE_HEADER_LEN + EVENT_LEN / 2
        })
    );

    let mut market_data = MarketFixture::new(1, 1).to_account_data();
    market_data[..5].copy_from_slice(b"mango");
    assert_eq!(Market::decode(&market_data), Err(LayoutError::InvalidMagic));

    let orders_data = open_orders_data(&Pubkey::default(), &Pubkey::default(), 0, 0, &[]);
    assert!(OpenOrdersAccount::decode(&orders_data).unwrap().orders().is_empty());
    assert!(OpenOrdersAccount::decode(&orders_data[..3000])
        .unwrap_err()
        .is_layout_size_error());
}

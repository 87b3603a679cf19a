//! End-to-end scenarios through the public exchange API.

use std::sync::Arc;

use rust_decimal::Decimal;

use exchange::{Exchange, ExchangeConfig, PairRegistry};
use order_store::{IntentJournal, MemoryStore};
use types::errors::ExchangeError;
use types::ids::{OrderId, PairId, UserId};
use types::numeric::{Price, Quantity};
use types::order::{OrderStatus, Side};
use types::pair::{FeeSchedule, TradingPair};

fn btc() -> PairId {
    PairId::new("BTC/USDT")
}

fn eth() -> PairId {
    PairId::new("ETH/USDT")
}

/// Exchange over BTC/USDT and ETH/USDT with the given fee schedule.
/// The tempdir must outlive the exchange (it holds the journals).
fn exchange_with(fees: FeeSchedule) -> (Exchange, tempfile::TempDir) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut registry = PairRegistry::new();
    registry.register(TradingPair::new(btc(), 2, 8, fees.clone()));
    registry.register(TradingPair::new(eth(), 2, 8, fees));

    let dir = tempfile::tempdir().unwrap();
    let exchange = Exchange::new(
        registry,
        Arc::new(MemoryStore::new()),
        ExchangeConfig::new(dir.path().join("journal")),
    )
    .unwrap();
    (exchange, dir)
}

fn funded_trader(exchange: &Exchange, usdt: u64, btc_amount: u64) -> UserId {
    let user = UserId::new();
    if usdt > 0 {
        exchange.deposit(user, "USDT", Decimal::from(usdt)).unwrap();
    }
    if btc_amount > 0 {
        exchange
            .deposit(user, "BTC", Decimal::from(btc_amount))
            .unwrap();
    }
    user
}

#[tokio::test]
async fn sweep_two_asks_at_same_price() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller_a = funded_trader(&exchange, 0, 100);
    let seller_b = funded_trader(&exchange, 0, 100);
    let buyer = funded_trader(&exchange, 10_000, 0);

    let ask_a = exchange
        .submit_order(seller_a, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap();
    let ask_b = exchange
        .submit_order(seller_b, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(5))
        .await
        .unwrap();

    let buy = exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(12))
        .await
        .unwrap();

    // Two trades: 10 against the earlier ask, 2 against the later one.
    let trades = exchange.trades(&btc(), 10).unwrap();
    assert_eq!(trades.len(), 2);
    // Newest first: the 2-unit fill is the most recent.
    assert_eq!(trades[0].amount, Quantity::from_u64(2));
    assert_eq!(trades[0].sell_order_id, ask_b.order_id);
    assert_eq!(trades[1].amount, Quantity::from_u64(10));
    assert_eq!(trades[1].sell_order_id, ask_a.order_id);

    assert_eq!(buy.status, OrderStatus::Filled);

    let b_orders = exchange.user_orders(&seller_b, None).unwrap();
    assert_eq!(b_orders[0].status, OrderStatus::Partial);
    assert_eq!(b_orders[0].filled, Quantity::from_u64(2));

    // Buyer paid 1200 USDT and holds 12 BTC.
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(8_800));
    assert_eq!(exchange.available(&buyer, "BTC"), Decimal::from(12));
}

#[tokio::test]
async fn no_cross_rests_open() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 100);
    let buyer = funded_trader(&exchange, 10_000, 0);

    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(55), Quantity::from_u64(10))
        .await
        .unwrap();

    let buy = exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(50), Quantity::from_u64(10))
        .await
        .unwrap();

    assert_eq!(buy.status, OrderStatus::Open);
    assert!(exchange.trades(&btc(), 10).unwrap().is_empty());

    let book = exchange.order_book(&btc(), 10).unwrap();
    assert_eq!(book.best_bid(), Some(Price::from_u64(50)));
    assert_eq!(book.best_ask(), Some(Price::from_u64(55)));
}

#[tokio::test]
async fn book_never_left_crossed() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let maker = funded_trader(&exchange, 1_000_000, 1_000);
    let taker = funded_trader(&exchange, 1_000_000, 1_000);

    let prices = [100u64, 98, 103, 101, 99, 102, 97, 104, 100, 101];
    for (i, price) in prices.iter().enumerate() {
        let (user, side) = if i % 2 == 0 {
            (maker, Side::Sell)
        } else {
            (taker, Side::Buy)
        };
        exchange
            .submit_order(user, &btc(), side, Price::from_u64(*price), Quantity::from_u64(3))
            .await
            .unwrap();

        let book = exchange.order_book(&btc(), 10).unwrap();
        if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
            assert!(bid < ask, "book crossed: bid {bid} >= ask {ask}");
        }
    }
}

#[tokio::test]
async fn price_time_priority_earlier_seller_fills_first() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let early = funded_trader(&exchange, 0, 10);
    let late = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 1_000, 0);

    exchange
        .submit_order(early, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();
    exchange
        .submit_order(late, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    let early_orders = exchange.user_orders(&early, None).unwrap();
    let late_orders = exchange.user_orders(&late, None).unwrap();
    assert_eq!(early_orders[0].status, OrderStatus::Filled);
    assert_eq!(late_orders[0].status, OrderStatus::Open);
}

#[tokio::test]
async fn cancel_releases_reservation_and_is_terminal() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let buyer = funded_trader(&exchange, 10_000, 0);

    let order = exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap();
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(9_000));
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::from(1_000));

    let cancelled = exchange.cancel_order(order.order_id, buyer).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(10_000));
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::ZERO);

    // Cancelling again: no state change, NotFound.
    let err = exchange.cancel_order(order.order_id, buyer).await.unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { .. }));
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(10_000));

    let book = exchange.order_book(&btc(), 10).unwrap();
    assert!(book.bids.is_empty());
}

#[tokio::test]
async fn cancel_rejects_wrong_owner_and_filled_orders() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 1_000, 0);
    let stranger = funded_trader(&exchange, 0, 0);

    let ask = exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    let err = exchange.cancel_order(ask.order_id, stranger).await.unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { .. }));

    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    // Fully filled: no longer cancellable, even by its owner.
    let err = exchange.cancel_order(ask.order_id, seller).await.unwrap_err();
    assert!(matches!(err, ExchangeError::NotFound { .. }));

    let missing = exchange.cancel_order(OrderId::new(), seller).await.unwrap_err();
    assert!(matches!(missing, ExchangeError::NotFound { .. }));
}

#[tokio::test]
async fn settlement_preserves_asset_supply_up_to_fees() {
    let fees = FeeSchedule::new(
        Decimal::from_str_exact("0.0002").unwrap(),
        Decimal::from_str_exact("0.0005").unwrap(),
    );
    let (exchange, _dir) = exchange_with(fees);
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 100_000, 0);

    let usdt_before = exchange.asset_supply("USDT");
    let btc_before = exchange.asset_supply("BTC");

    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(50_000), Quantity::from_u64(1))
        .await
        .unwrap();
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(50_000), Quantity::from_u64(1))
        .await
        .unwrap();

    // Fee collector included, nothing is created or destroyed.
    assert_eq!(exchange.asset_supply("USDT"), usdt_before);
    assert_eq!(exchange.asset_supply("BTC"), btc_before);

    // Taker (buyer) paid 0.05% on the base; maker paid 0.02% on quote.
    assert_eq!(
        exchange.available(&buyer, "BTC"),
        Decimal::from_str_exact("0.9995").unwrap()
    );
    assert_eq!(
        exchange.available(&seller, "USDT"),
        Decimal::from(49_990)
    );
}

#[tokio::test]
async fn insufficient_balance_rejected_without_state_change() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let buyer = funded_trader(&exchange, 500, 0);

    let err = exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap_err();
    match err {
        ExchangeError::InsufficientBalance {
            asset,
            required,
            available,
        } => {
            assert_eq!(asset, "USDT");
            assert_eq!(required, Decimal::from(1_000));
            assert_eq!(available, Decimal::from(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(500));
    assert!(exchange.user_orders(&buyer, None).unwrap().is_empty());
    assert!(exchange.order_book(&btc(), 10).unwrap().bids.is_empty());
}

#[tokio::test]
async fn unknown_and_inactive_pairs_rejected() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let user = funded_trader(&exchange, 1_000, 0);

    let err = exchange
        .submit_order(
            user,
            &PairId::new("DOGE/USDT"),
            Side::Buy,
            Price::from_u64(1),
            Quantity::from_u64(1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::UnknownPair { .. }));

    let err = exchange.order_book(&PairId::new("DOGE/USDT"), 10).unwrap_err();
    assert!(matches!(err, ExchangeError::UnknownPair { .. }));

    let err = exchange.trades(&PairId::new("DOGE/USDT"), 10).unwrap_err();
    assert!(matches!(err, ExchangeError::UnknownPair { .. }));
}

#[tokio::test]
async fn over_precise_price_rejected() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let user = funded_trader(&exchange, 1_000, 0);

    // price_scale is 2; three decimal places must be rejected.
    let err = exchange
        .submit_order(
            user,
            &btc(),
            Side::Buy,
            Price::from_str("100.125").unwrap(),
            Quantity::from_u64(1),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::InvalidOrder { .. }));
    assert_eq!(exchange.available(&user, "USDT"), Decimal::from(1_000));
}

#[tokio::test]
async fn reservation_accounting_tracks_open_orders() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let buyer = funded_trader(&exchange, 10_000, 0);

    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap();
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(90), Quantity::from_u64(5))
        .await
        .unwrap();

    // Locked equals the sum of outstanding reservations: 1000 + 450.
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::from(1_450));
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(8_550));

    // Withdrawal is capped by available, never touches reservations.
    let err = exchange
        .withdraw(buyer, "USDT", Decimal::from(9_000))
        .unwrap_err();
    assert!(matches!(err, ExchangeError::InsufficientBalance { .. }));
    exchange.withdraw(buyer, "USDT", Decimal::from(8_550)).unwrap();
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::from(1_450));
}

#[tokio::test]
async fn buyer_over_reservation_released_at_maker_price() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 10_000, 0);

    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(95), Quantity::from_u64(10))
        .await
        .unwrap();

    // Buyer bids 100 but the resting ask at 95 sets the trade price.
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap();

    let trades = exchange.trades(&btc(), 10).unwrap();
    assert_eq!(trades[0].price, Price::from_u64(95));

    // 950 spent, the 50 over-reservation is back.
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(9_050));
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::ZERO);
}

#[tokio::test]
async fn lanes_run_pairs_independently() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let exchange = Arc::new(exchange);

    let btc_seller = funded_trader(&exchange, 0, 1_000);
    let btc_buyer = funded_trader(&exchange, 1_000_000, 0);
    let eth_seller = UserId::new();
    let eth_buyer = UserId::new();
    exchange.deposit(eth_seller, "ETH", Decimal::from(1_000)).unwrap();
    exchange.deposit(eth_buyer, "USDT", Decimal::from(1_000_000)).unwrap();

    let btc_task = {
        let exchange = exchange.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                exchange
                    .submit_order(btc_seller, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(1))
                    .await
                    .unwrap();
                exchange
                    .submit_order(btc_buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(1))
                    .await
                    .unwrap();
            }
        })
    };
    let eth_task = {
        let exchange = exchange.clone();
        tokio::spawn(async move {
            for _ in 0..50 {
                exchange
                    .submit_order(eth_seller, &eth(), Side::Sell, Price::from_u64(20), Quantity::from_u64(1))
                    .await
                    .unwrap();
                exchange
                    .submit_order(eth_buyer, &eth(), Side::Buy, Price::from_u64(20), Quantity::from_u64(1))
                    .await
                    .unwrap();
            }
        })
    };

    btc_task.await.unwrap();
    eth_task.await.unwrap();

    // Every submission matched on its own pair; books end empty.
    assert_eq!(exchange.trades(&btc(), 100).unwrap().len(), 50);
    assert_eq!(exchange.trades(&eth(), 100).unwrap().len(), 50);
    let btc_book = exchange.order_book(&btc(), 10).unwrap();
    assert!(btc_book.bids.is_empty() && btc_book.asks.is_empty());

    assert_eq!(exchange.available(&btc_buyer, "BTC"), Decimal::from(50));
    assert_eq!(exchange.available(&eth_buyer, "ETH"), Decimal::from(50));
}

#[tokio::test]
async fn ticker_reflects_last_trade_and_volume() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 10_000, 0);

    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(2))
        .await
        .unwrap();
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    let ticker = exchange.ticker(&btc()).unwrap();
    assert_eq!(ticker.last_price, Some(Price::from_u64(100)));
    assert_eq!(ticker.best_ask, Some(Price::from_u64(100)));
    assert_eq!(ticker.best_bid, None);
    assert_eq!(ticker.base_volume, Decimal::ONE);
    assert_eq!(ticker.quote_volume, Decimal::from(100));
    assert!(ticker.revision > 0);
}

#[tokio::test]
async fn journal_records_every_match_step() {
    let (exchange, dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 10_000, 0);

    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(3))
        .await
        .unwrap();
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(2))
        .await
        .unwrap();
    exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(1))
        .await
        .unwrap();

    let journal_path = dir.path().join("journal").join("BTC-USDT.journal");
    let intents = IntentJournal::replay(&journal_path).unwrap();
    assert_eq!(intents.len(), 2);

    let trades = exchange.trades(&btc(), 10).unwrap();
    // Journal is oldest-first, the trades read is newest-first.
    assert_eq!(intents[0].trade.trade_id, trades[1].trade_id);
    assert_eq!(intents[1].trade.trade_id, trades[0].trade_id);
    assert_eq!(intents[1].maker.status, OrderStatus::Filled);
}

#[tokio::test]
async fn partial_fill_then_cancel_releases_only_remainder() {
    let (exchange, _dir) = exchange_with(FeeSchedule::free());
    let seller = funded_trader(&exchange, 0, 10);
    let buyer = funded_trader(&exchange, 10_000, 0);

    let bid = exchange
        .submit_order(buyer, &btc(), Side::Buy, Price::from_u64(100), Quantity::from_u64(10))
        .await
        .unwrap();
    exchange
        .submit_order(seller, &btc(), Side::Sell, Price::from_u64(100), Quantity::from_u64(4))
        .await
        .unwrap();

    // 400 settled, 600 still reserved for the open remainder.
    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::from(600));

    let cancelled = exchange.cancel_order(bid.order_id, buyer).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.filled, Quantity::from_u64(4));

    assert_eq!(exchange.locked(&buyer, "USDT"), Decimal::ZERO);
    assert_eq!(exchange.available(&buyer, "USDT"), Decimal::from(9_600));
    assert_eq!(exchange.available(&buyer, "BTC"), Decimal::from(4));
}

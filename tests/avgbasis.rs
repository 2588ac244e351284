use avgbasis::engine::Engine;
use avgbasis::error::EngineError;
use avgbasis::holding::Holding;
use avgbasis::inventory::{Inventory, InventoryType};
use avgbasis::realized::{realized_to_compact, total_realized};
use avgbasis::transaction::Transaction;
use avgbasis::EngineConfig;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn transactions(lines: &[&str]) -> Vec<Transaction> {
    lines.iter().map(|l| l.parse().unwrap()).collect()
}

#[test]
fn same_input_same_reports() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,BTC,buy,0.3,41000.5,2.1",
        "2024-01-03 10:00:00,BTC,buy,0.7,43000.25,3.3",
        "2024-01-05 10:00:00,BTC,sell,0.4,45000,1.8",
        "2024-01-02 10:00:00,ETH,buy,3,2200,0.5",
        "2024-01-04 10:00:00,ETH,buy,1,2350,0.5",
    ]);
    let engine = Engine::default();
    let first = engine.compute_metrics_strict(&trades).unwrap();
    let second = engine.compute_metrics_strict(&trades).unwrap();
    assert_eq!(first, second);
}

#[test]
fn buys_only_average_is_weighted_mean() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,ADA,buy,10,100",
        "2024-01-02 10:00:00,ADA,buy,30,200",
        "2024-01-03 10:00:00,ADA,buy,60,150",
    ]);
    let notional: Decimal = trades.iter().filter_map(|t| t.notional()).sum();
    let quantity: Decimal = trades.iter().map(|t| t.quantity()).sum();

    let metrics = Engine::default().compute_metrics(&trades);
    let ada = metrics["ADA"].as_ref().unwrap();
    assert_eq!(ada.average_price, notional / quantity);
    assert_eq!(ada.average_price, dec!(160));
    assert_eq!(ada.quantity_held, dec!(100));
}

#[test]
fn full_liquidation_resets_basis() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,DOT,buy,5,10",
        "2024-01-02 10:00:00,DOT,sell,5,12",
        "2024-01-03 10:00:00,DOT,buy,5,20",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    let dot = metrics["DOT"].as_ref().unwrap();
    assert_eq!(dot.average_price, dec!(20));
    assert_eq!(dot.quantity_held, dec!(5));
    assert_eq!(dot.realized_pnl, dec!(10));
}

#[test]
fn buy_then_sell_all_conserves_pnl() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,SOL,buy,10,100",
        "2024-01-02 10:00:00,SOL,sell,10,120",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    let sol = metrics["SOL"].as_ref().unwrap();
    assert_eq!(sol.realized_pnl, dec!(200));
    assert_eq!(sol.quantity_held, Decimal::ZERO);
    assert_eq!(sol.break_even_price, None);
}

#[test]
fn partial_sell_keeps_basis() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,SOL,buy,10,100",
        "2024-01-02 10:00:00,SOL,sell,4,150",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    let sol = metrics["SOL"].as_ref().unwrap();
    assert_eq!(sol.average_price, dec!(100));
    assert_eq!(sol.quantity_held, dec!(6));
    assert_eq!(sol.realized_pnl, dec!(200));
}

#[test]
fn sell_without_holdings_is_an_error() {
    let trades = transactions(&["2024-01-01 10:00:00,XTZ,sell,5,1.2"]);
    let metrics = Engine::default().compute_metrics(&trades);
    match &metrics["XTZ"] {
        Err(EngineError::InsufficientQuantity {
            asset,
            requested,
            held,
            ..
        }) => {
            assert_eq!(asset, "XTZ");
            assert_eq!(*requested, dec!(5));
            assert_eq!(*held, Decimal::ZERO);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn break_even_uses_configured_fee_rate() {
    let trades = transactions(&["2024-01-01 10:00:00,ETH,buy,2,100,0.4"]);
    let metrics = Engine::default().compute_metrics(&trades);
    assert_eq!(
        metrics["ETH"].as_ref().unwrap().break_even_price,
        Some(dec!(100.1))
    );

    let config = EngineConfig::from_toml_str("break_even_fee_rate = \"0.0075\"").unwrap();
    let metrics = Engine::new(config).unwrap().compute_metrics(&trades);
    assert_eq!(
        metrics["ETH"].as_ref().unwrap().break_even_price,
        Some(dec!(100.75))
    );
}

#[test]
fn fees_reduce_realized_but_not_basis() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,LINK,buy,10,10,1",
        "2024-01-02 10:00:00,LINK,sell,5,14,0.5",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    let link = metrics["LINK"].as_ref().unwrap();
    assert_eq!(link.average_price, dec!(10));
    assert_eq!(link.realized_pnl, dec!(19.5));
    assert_eq!(link.total_fees_paid, dec!(1.5));
    assert_eq!(link.trade_count, 2);
}

#[test]
fn malformed_record_fails_only_its_asset() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,BTC,buy,1,100",
        "2024-01-01 11:00:00,ETH,buy,1,-3",
        "2024-01-01 12:00:00,ETH,buy,1,100",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    assert!(metrics["BTC"].is_ok());
    assert!(matches!(
        metrics["ETH"],
        Err(EngineError::MalformedRecord { .. })
    ));
}

#[test]
fn overflow_fails_only_its_asset() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,BTC,buy,1,100",
        "2024-01-01 11:00:00,WHALE,buy,1000000000000000,1000000000000000",
        "2024-01-01 12:00:00,WHALE,buy,1,1",
        "2024-01-01 13:00:00,ETH,buy,2,50",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    match &metrics["WHALE"] {
        Err(e @ EngineError::Overflow { .. }) => assert_eq!(e.asset(), Some("WHALE")),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(metrics["BTC"].as_ref().unwrap().average_price, dec!(100));
    assert_eq!(metrics["ETH"].as_ref().unwrap().quantity_held, dec!(2));
}

#[test]
fn first_buy_price_is_rounded_to_precision() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,DOT,buy,4,7.123456789",
        "2024-01-02 10:00:00,DOT,sell,4,8",
    ]);
    let engine = Engine::new(EngineConfig::new(4, dec!(0.001), true).unwrap()).unwrap();
    let (holding, realized) = Holding::from_transactions(engine.config(), &trades[..1]).unwrap();
    assert!(realized.is_empty());
    assert_eq!(holding.average_price(), dec!(7.1235));

    let dot = engine.compute_metrics_strict(&trades).unwrap().remove("DOT").unwrap();
    // 4 * (8 - 7.1235)
    assert_eq!(dot.realized_pnl, dec!(3.506));
}

#[test]
fn out_of_order_records_are_detected() {
    let trades = transactions(&[
        "2024-01-02 10:00:00,BTC,buy,1,100",
        "2024-01-01 10:00:00,BTC,sell,1,120",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    assert!(matches!(
        metrics["BTC"],
        Err(EngineError::UnorderedInput { .. })
    ));
}

#[test]
fn missing_deposit_can_be_recorded_explicitly() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,ATOM,deposit,20,8",
        "2024-01-02 10:00:00,ATOM,buy,20,12",
        "2024-01-03 10:00:00,ATOM,sell,30,11",
        "2024-01-04 10:00:00,ATOM,withdraw,10,0,0.01",
    ]);
    let metrics = Engine::default().compute_metrics(&trades);
    let atom = metrics["ATOM"].as_ref().unwrap();
    assert!(atom.is_flat());
    assert_eq!(atom.realized_pnl, dec!(29.99));
    assert_eq!(atom.total_fees_paid, dec!(0.01));
}

#[test]
fn holding_realized_matches_report() {
    let trades = transactions(&[
        "2024-01-01 10:00:00,BTC,buy,2,100",
        "2024-01-01 15:00:00,BTC,sell,1,130",
        "2024-01-01 18:00:00,BTC,sell,0.5,90",
        "2024-01-04 10:00:00,BTC,sell,0.5,110",
    ]);
    let (holding, realized) =
        Holding::from_transactions(&EngineConfig::default(), &trades).unwrap();
    assert_eq!(realized.len(), 3);
    assert_eq!(total_realized(&realized), holding.realized_pnl());
    assert_eq!(holding.realized_pnl(), dec!(30));

    let compact = realized_to_compact(&realized);
    assert_eq!(compact.len(), 2);
    assert_eq!(compact[0].pnl, dec!(25));
    assert_eq!(compact[1].pnl, dec!(5));
}

struct Fill {
    symbol: &'static str,
    buyer: bool,
    qty: Decimal,
    px: Decimal,
    at: NaiveDateTime,
}

impl Inventory for Fill {
    fn asset(&self) -> &str {
        self.symbol
    }

    fn itype(&self) -> InventoryType {
        if self.buyer {
            InventoryType::Buy
        } else {
            InventoryType::Sell
        }
    }

    fn quantity(&self) -> Decimal {
        self.qty
    }

    fn price(&self) -> Decimal {
        self.px
    }

    fn fee(&self) -> Decimal {
        Decimal::ZERO
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.at
    }
}

#[test]
fn user_defined_records_can_be_folded() {
    let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    let fills = [
        Fill {
            symbol: "AAVEBTC",
            buyer: true,
            qty: dec!(2),
            px: dec!(0.0021),
            at: at("2024-02-01 08:00:00"),
        },
        Fill {
            symbol: "AAVEBTC",
            buyer: false,
            qty: dec!(1),
            px: dec!(0.0025),
            at: at("2024-02-02 08:00:00"),
        },
    ];
    let metrics = Engine::default().compute_metrics(&fills);
    let aave = metrics["AAVEBTC"].as_ref().unwrap();
    assert_eq!(aave.quantity_held, dec!(1));
    assert_eq!(aave.average_price, dec!(0.0021));
    assert_eq!(aave.realized_pnl, dec!(0.0004));
}

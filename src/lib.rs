//! avgbasis folds a stream of trade fills into a weighted-average cost basis per asset.
//! Sells realize gain/loss against the current average cost, and each asset ends in a
//! `MetricsReport` with quantity held, average price, realized PnL, fees and break-even price.
//!
//! - `Engine` - groups trades by asset and produces one report per asset
//! - `Holding` - running position of one asset, folded one trade at a time
//!
//! - `Transaction` - a record of inventory change.  Can be replaced by a user defined struct
//!     that implements the `Inventory` trait
//! - `Realized` - gain/loss recognized by one sale
//! - `MetricsReport` - the snapshot of one asset after all its trades
//!
//! All held units of an asset share one blended price (weighted average), there is no
//! per-lot tracking. Arithmetic is done with `rust_decimal::Decimal`.
//!
//! Example
//! ```
//! use avgbasis::engine::Engine;
//! use avgbasis::transaction::Transaction;
//! use rust_decimal_macros::dec;
//!
//! let transactions: Vec<Transaction> = [
//!     "2024-01-01 10:00:00,BTC,buy,10,100",
//!     "2024-01-02 10:00:00,BTC,sell,4,150",
//! ]
//! .iter()
//! .map(|l| l.parse().unwrap())
//! .collect();
//!
//! let metrics = Engine::default().compute_metrics(&transactions);
//! let btc = metrics["BTC"].as_ref().unwrap();
//!
//! assert_eq!(btc.quantity_held, dec!(6));
//! assert_eq!(btc.average_price, dec!(100));
//! assert_eq!(btc.realized_pnl, dec!(200));
//! assert_eq!(btc.break_even_price, Some(dec!(100.1)));
//! ```
//!
//! Look also in the demos directory.

/// `EngineConfig`, loaded from TOML
pub mod config;
/// `Engine` grouping trades by asset and computing their metrics
pub mod engine;
/// `EngineError` and `EngineResult`
pub mod error;
/// holds struct and functions dealing with a `Holding`
pub mod holding;
/// traits to use with holding if user defined struct instead of using `Transaction`
pub mod inventory;
/// `MetricsReport`, the per-asset output row
pub mod metrics;
/// struct and functions related to `Realized` - realized gains/losses
pub mod realized;
/// defined `Transaction` struct to use in identifying inventory changes
pub mod transaction;

pub use config::EngineConfig;
pub use engine::{AssetMetrics, Engine};
pub use error::{EngineError, EngineResult};
pub use holding::Holding;
pub use inventory::{Inventory, InventoryType};
pub use metrics::MetricsReport;
pub use realized::Realized;
pub use transaction::Transaction;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::holding::Holding;
use crate::inventory::Inventory;
use crate::metrics::MetricsReport;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-asset outcome of a run. An asset that failed has no report.
pub type AssetMetrics = BTreeMap<String, EngineResult<MetricsReport>>;

/// Groups trades by asset and folds each group into a `MetricsReport`.
///
/// A run is a pure function of its input: nothing is kept between calls, so the full
/// trade history is supplied every time.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Engine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Computes one report per asset found in `trades`.
    ///
    /// Records of the same asset must be in non-decreasing time order; assets may be
    /// interleaved. A failure aborts that asset only and is returned in its slot.
    pub fn compute_metrics<T>(&self, trades: &[T]) -> AssetMetrics
    where
        T: Inventory,
    {
        let results: AssetMetrics = group_by_asset(trades)
            .into_iter()
            .map(|(asset, group)| {
                let result = self.compute_asset(asset, &group[..]);
                if let Err(e) = &result {
                    warn!(asset, error = %e, "asset skipped");
                }
                (asset.to_owned(), result)
            })
            .collect();

        let failed = results.values().filter(|r| r.is_err()).count();
        info!(
            trades = trades.len(),
            assets = results.len(),
            failed,
            "metrics computed"
        );
        results
    }

    /// Like `compute_metrics` but the first failing asset aborts the whole run.
    pub fn compute_metrics_strict<T>(
        &self,
        trades: &[T],
    ) -> EngineResult<BTreeMap<String, MetricsReport>>
    where
        T: Inventory,
    {
        group_by_asset(trades)
            .into_iter()
            .map(|(asset, group)| {
                let report = self.compute_asset(asset, &group[..])?;
                Ok::<_, EngineError>((asset.to_owned(), report))
            })
            .collect()
    }

    /// Point in time view: only records at or before `as_of` are applied.
    pub fn metrics_at<T>(&self, trades: &[T], as_of: NaiveDateTime) -> AssetMetrics
    where
        T: Inventory,
    {
        let upto: Vec<&T> = trades.iter().filter(|t| t.timestamp() <= as_of).collect();
        self.compute_metrics(&upto)
    }

    /// Folds the records of a single asset. Every record must belong to `asset`.
    pub fn compute_asset<T>(&self, asset: &str, trades: &[T]) -> EngineResult<MetricsReport>
    where
        T: Inventory,
    {
        let mut holding = Holding::new(&self.config);
        for trade in trades {
            debug!(
                asset,
                itype = %trade.itype(),
                quantity = %trade.quantity(),
                price = %trade.price(),
                fee = %trade.fee(),
                timestamp = %trade.timestamp(),
                "applying trade"
            );
            holding = holding.apply(trade)?.0;
        }
        MetricsReport::from_holding(asset, &holding, self.config.break_even_fee_rate)
    }
}

// stable grouping, keeps each asset's records in input order
fn group_by_asset<T>(trades: &[T]) -> BTreeMap<&str, Vec<&T>>
where
    T: Inventory,
{
    let mut groups: BTreeMap<&str, Vec<&T>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.asset()).or_default().push(trade);
    }
    groups
}

use crate::error::{EngineError, EngineResult};
use crate::holding::Holding;
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final snapshot of one asset after its trades have been folded.
///
/// Every amount is rounded to the precision the holding was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub asset: String,
    pub quantity_held: Decimal,
    /// Zero when nothing is held.
    pub average_price: Decimal,
    /// `None` when nothing is held.
    pub break_even_price: Option<Decimal>,
    pub realized_pnl: Decimal,
    pub total_fees_paid: Decimal,
    pub last_trade: Option<NaiveDateTime>,
    pub trade_count: usize,
}

impl MetricsReport {
    /// Builds the report for `holding`.
    ///
    /// The break-even price is `average_price * (1 + break_even_fee_rate)`, the exit price
    /// that recovers the cost basis after paying the estimated exit fee. Fees already paid
    /// do not enter it.
    pub fn from_holding(
        asset: &str,
        holding: &Holding,
        break_even_fee_rate: Decimal,
    ) -> EngineResult<Self> {
        let dp = holding.precision();
        let round =
            |d: Decimal| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);

        let break_even_price = if holding.is_flat() {
            None
        } else {
            let price = Decimal::ONE
                .checked_add(break_even_fee_rate)
                .and_then(|markup| holding.average_price().checked_mul(markup))
                .ok_or_else(|| EngineError::Overflow {
                    asset: asset.to_owned(),
                    context: "break-even price".into(),
                })?;
            Some(round(price))
        };

        Ok(MetricsReport {
            asset: asset.to_owned(),
            quantity_held: round(holding.quantity()),
            average_price: round(holding.average_price()),
            break_even_price,
            realized_pnl: round(holding.realized_pnl()),
            total_fees_paid: round(holding.total_fees()),
            last_trade: holding.last_trade(),
            trade_count: holding.trade_count(),
        })
    }

    /// Mark-to-market gain or loss of the units still held, `None` if it does not fit a
    /// `Decimal`.
    pub fn unrealized_pnl(&self, mark_price: Decimal) -> Option<Decimal> {
        mark_price
            .checked_sub(self.average_price)?
            .checked_mul(self.quantity_held)
    }

    pub fn is_flat(&self) -> bool {
        self.quantity_held.is_zero()
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: quantity:{}, average_price:{}, break_even:{}, realized:{}, fees:{}",
            self.asset,
            self.quantity_held,
            self.average_price,
            self.break_even_price
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
            self.realized_pnl,
            self.total_fees_paid
        )
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Gain or loss recognized by one sale, measured against the average cost at the time.
///
/// A withdraw also produces a `Realized`, with proceeds equal to cost, so only its fee
/// shows up as a loss.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Realized {
    pub timestamp: NaiveDateTime,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost: Decimal,
    pub fee: Decimal,
    pub pnl: Decimal,
}

impl Realized {
    pub fn new(
        timestamp: NaiveDateTime,
        quantity: Decimal,
        proceeds: Decimal,
        cost: Decimal,
        fee: Decimal,
    ) -> Self {
        Realized {
            timestamp,
            quantity,
            proceeds,
            cost,
            fee,
            pnl: proceeds - cost - fee,
        }
    }

    /// Same as `new`, but `None` if the gain/loss does not fit a `Decimal`.
    pub fn checked_new(
        timestamp: NaiveDateTime,
        quantity: Decimal,
        proceeds: Decimal,
        cost: Decimal,
        fee: Decimal,
    ) -> Option<Self> {
        let pnl = proceeds.checked_sub(cost)?.checked_sub(fee)?;
        Some(Realized {
            timestamp,
            quantity,
            proceeds,
            cost,
            fee,
            pnl,
        })
    }
}

impl fmt::Display for Realized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "close: {} quantity:{:.4}, proceeds:{:.2}, cost_basis:{:.2}, fee:{:.2}, gain_loss:{:.2}",
            self.timestamp, self.quantity, self.proceeds, self.cost, self.fee, self.pnl
        )
    }
}

/// All sales closed on the same calendar day.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct RealizedCompact {
    pub date: NaiveDate,
    pub sales: usize,
    pub quantity: Decimal,
    pub proceeds: Decimal,
    pub cost: Decimal,
    pub fee: Decimal,
    pub pnl: Decimal,
}

impl From<&[Realized]> for RealizedCompact {
    fn from(realized: &[Realized]) -> Self {
        let date = realized
            .first()
            .map_or(NaiveDate::MIN, |r| r.timestamp.date());
        Self {
            date,
            sales: realized.len(),
            quantity: realized.iter().map(|r| r.quantity).sum(),
            proceeds: realized.iter().map(|r| r.proceeds).sum(),
            cost: realized.iter().map(|r| r.cost).sum(),
            fee: realized.iter().map(|r| r.fee).sum(),
            pnl: realized.iter().map(|r| r.pnl).sum(),
        }
    }
}

impl fmt::Display for RealizedCompact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "close_date: {} sales:{}, quantity:{:.4}, proceeds:{:.2}, cost_basis:{:.2}, gain_loss:{:.2}",
            self.date, self.sales, self.quantity, self.proceeds, self.cost, self.pnl
        )
    }
}

/// Convert slice of `Realized` into compact form by grouping by close date.
/// Assumes the slice is in time order, as produced by `Holding`.
pub fn realized_to_compact(realized: &[Realized]) -> Vec<RealizedCompact> {
    realized
        .chunk_by(|a, b| a.timestamp.date() == b.timestamp.date())
        .map(RealizedCompact::from)
        .collect()
}

/// Total realized is the sum of all profit / loss in the slice of `Realized`
pub fn total_realized(r: &[Realized]) -> Decimal {
    r.iter().map(|r| r.pnl).sum()
}

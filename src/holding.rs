use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::inventory::{Inventory, InventoryType};
use crate::realized::Realized;
use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Holding is the running weighted-average position in one asset.
///
/// apply(change) -> new holding
///     1) buy/deposit: blend the average price with the incoming units
///     2) sell/withdraw: realize against the current average, average price unchanged
///
/// All held units share one blended cost. When the quantity returns to zero the average
/// price resets, so a later re-entry starts from its own price.
///
/// The average price is rounded to `precision` places with banker's rounding on every
/// increase, the first one included, which keeps repeated runs over the same input
/// identical.
///
/// A result that does not fit a `Decimal` fails the record with `EngineError::Overflow`
/// instead of panicking. The total basis `quantity * average_price` always fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holding {
    quantity: Decimal,
    average_price: Decimal,
    realized_pnl: Decimal,
    total_fees: Decimal,
    last_trade: Option<NaiveDateTime>,
    trade_count: usize,
    precision: u32,
    validate_ordering: bool,
}

impl Default for Holding {
    fn default() -> Self {
        Holding::new(&EngineConfig::default())
    }
}

impl Holding {
    pub fn new(config: &EngineConfig) -> Self {
        Holding {
            quantity: Decimal::ZERO,
            average_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            last_trade: None,
            trade_count: 0,
            precision: config.decimal_precision,
            validate_ordering: config.validate_ordering,
        }
    }

    /// Fold a whole sequence, returning the final holding and every realized sale.
    pub fn from_transactions<T>(
        config: &EngineConfig,
        invs: &[T],
    ) -> EngineResult<(Self, Vec<Realized>)>
    where
        T: Inventory,
    {
        invs.iter()
            .try_fold((Holding::new(config), Vec::new()), |(holding, mut gains), inv| {
                let (next, realized) = holding.apply(inv)?;
                gains.extend(realized);
                Ok::<_, EngineError>((next, gains))
            })
    }

    /// Returns the holding after `inv`, leaving `self` untouched.
    pub fn apply<T>(&self, inv: &T) -> EngineResult<(Holding, Option<Realized>)>
    where
        T: Inventory,
    {
        self.check_record(inv)?;
        let overflow = |context: &str| EngineError::Overflow {
            asset: inv.asset().to_owned(),
            context: format!("{} at {}", context, inv.timestamp()),
        };

        let mut next = *self;
        next.total_fees = self
            .total_fees
            .checked_add(inv.fee())
            .ok_or_else(|| overflow("total fees"))?;
        next.last_trade = Some(inv.timestamp());
        next.trade_count += 1;

        if inv.itype().is_increase() {
            next.add_inventory(inv.quantity(), inv.price())
                .ok_or_else(|| overflow("cost basis"))?;
            return Ok((next, None));
        }

        if inv.quantity() > self.quantity {
            return Err(EngineError::InsufficientQuantity {
                asset: inv.asset().to_owned(),
                timestamp: inv.timestamp(),
                requested: inv.quantity(),
                held: self.quantity,
            });
        }

        // within the held basis, cannot overflow
        let cost = self.average_price * inv.quantity();
        let proceeds = match inv.itype() {
            InventoryType::Withdraw => cost,
            _ => inv.notional().ok_or_else(|| overflow("proceeds"))?,
        };
        let realized =
            Realized::checked_new(inv.timestamp(), inv.quantity(), proceeds, cost, inv.fee())
                .ok_or_else(|| overflow("realized gain"))?;
        next.realized_pnl = self
            .realized_pnl
            .checked_add(realized.pnl)
            .ok_or_else(|| overflow("realized pnl"))?;
        next.remove_inventory(inv.quantity());
        Ok((next, Some(realized)))
    }

    /// Applies `inv` in place. On error the holding is unchanged.
    pub fn add_transaction<T>(&mut self, inv: &T) -> EngineResult<Option<Realized>>
    where
        T: Inventory,
    {
        let (next, realized) = self.apply(inv)?;
        *self = next;
        Ok(realized)
    }

    /// Applies every change in order. Either all of them are applied or none.
    pub fn extend_transactions<T>(&mut self, invs: &[T]) -> EngineResult<Vec<Realized>>
    where
        T: Inventory,
    {
        let mut holding = *self;
        let mut gains_r = Vec::new();
        for inv in invs {
            gains_r.extend(holding.add_transaction(inv)?);
        }
        *self = holding;
        Ok(gains_r)
    }

    // None on overflow, leaving self as it was
    fn add_inventory(&mut self, quantity: Decimal, price: Decimal) -> Option<()> {
        let new_quantity = self.quantity.checked_add(quantity)?;
        let average_price = if self.quantity.is_zero() {
            price
        } else {
            let basis = self.quantity * self.average_price;
            basis
                .checked_add(quantity.checked_mul(price)?)?
                .checked_div(new_quantity)?
        }
        .round_dp_with_strategy(self.precision, RoundingStrategy::MidpointNearestEven);

        new_quantity.checked_mul(average_price)?;
        self.quantity = new_quantity;
        self.average_price = average_price;
        Some(())
    }

    fn remove_inventory(&mut self, quantity: Decimal) {
        self.quantity -= quantity;
        if self.quantity.is_zero() {
            self.average_price = Decimal::ZERO;
        }
    }

    fn check_record<T>(&self, inv: &T) -> EngineResult<()>
    where
        T: Inventory,
    {
        let malformed = |reason: String| EngineError::MalformedRecord {
            asset: inv.asset().to_owned(),
            timestamp: inv.timestamp(),
            reason,
        };

        if inv.quantity() <= Decimal::ZERO {
            return Err(malformed(format!("quantity must be positive, got {}", inv.quantity())));
        }
        if inv.itype().requires_price() && inv.price() <= Decimal::ZERO {
            return Err(malformed(format!("price must be positive, got {}", inv.price())));
        }
        if inv.fee() < Decimal::ZERO {
            return Err(malformed(format!("fee must not be negative, got {}", inv.fee())));
        }

        match self.last_trade {
            Some(previous) if self.validate_ordering && inv.timestamp() < previous => {
                Err(EngineError::UnorderedInput {
                    asset: inv.asset().to_owned(),
                    previous,
                    current: inv.timestamp(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Zero while flat.
    pub fn average_price(&self) -> Decimal {
        self.average_price
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn total_fees(&self) -> Decimal {
        self.total_fees
    }

    pub fn last_trade(&self) -> Option<NaiveDateTime> {
        self.last_trade
    }

    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// quantity, price per unit, total basis
    pub fn position(&self) -> (Decimal, Decimal, Decimal) {
        (
            self.quantity,
            self.average_price,
            self.quantity * self.average_price,
        )
    }
}

impl fmt::Display for Holding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (quantity, price, basis) = self.position();
        write!(
            f,
            "Position; quantity:{:.8}, price:{:.8}, basis:{:.8}, realized:{:.8}, fees:{:.8}",
            quantity, price, basis, self.realized_pnl, self.total_fees
        )
    }
}

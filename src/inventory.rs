use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fill or transfer that changes the quantity held of one asset.
///
/// `Transaction` implements this, but any user defined record can be folded by a
/// `Holding` or the `Engine` once it implements the trait. Quantity, price and fee
/// are always unsigned; direction comes from `itype`.
pub trait Inventory {
    fn asset(&self) -> &str;

    fn itype(&self) -> InventoryType;

    fn quantity(&self) -> Decimal;

    fn price(&self) -> Decimal;

    /// Fee in quote currency, already converted by the caller.
    fn fee(&self) -> Decimal;

    fn timestamp(&self) -> NaiveDateTime;

    /// `None` when quantity times price does not fit a `Decimal`.
    fn notional(&self) -> Option<Decimal> {
        self.quantity().checked_mul(self.price())
    }
}

/// Borrowed records fold the same as owned ones, so filtered views need no copies.
impl<T> Inventory for &T
where
    T: Inventory,
{
    fn asset(&self) -> &str {
        (**self).asset()
    }

    fn itype(&self) -> InventoryType {
        (**self).itype()
    }

    fn quantity(&self) -> Decimal {
        (**self).quantity()
    }

    fn price(&self) -> Decimal {
        (**self).price()
    }

    fn fee(&self) -> Decimal {
        (**self).fee()
    }

    fn timestamp(&self) -> NaiveDateTime {
        (**self).timestamp()
    }
}

/// Kind of inventory change.
///
/// `Deposit` and `Withdraw` model transfers in and out of the account. A deposit must
/// carry its acquisition price and is treated like a buy; a withdraw leaves at cost basis
/// and realizes no gain.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryType {
    Buy,
    Sell,
    Deposit,
    Withdraw,
}

impl InventoryType {
    /// True for kinds that add to the held quantity.
    pub fn is_increase(&self) -> bool {
        matches!(self, InventoryType::Buy | InventoryType::Deposit)
    }

    /// Withdrawals do not use the record price.
    pub fn requires_price(&self) -> bool {
        !matches!(self, InventoryType::Withdraw)
    }
}

impl std::str::FromStr for InventoryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" | "buy" | "BUY" | "b" | "Long" | "long" => Ok(InventoryType::Buy),
            "Sell" | "sell" | "SELL" | "s" | "Short" | "short" => Ok(InventoryType::Sell),
            "Deposit" | "deposit" | "DEPOSIT" | "Receive" | "RECEIVE" | "Transfer_In" => {
                Ok(InventoryType::Deposit)
            }
            "Withdraw" | "withdraw" | "WITHDRAW" | "Send" | "SEND" | "Transfer_Out" => {
                Ok(InventoryType::Withdraw)
            }
            _ => Err(format!("'{}' is not a valid value for InventoryType", s)),
        }
    }
}

impl std::fmt::Display for InventoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InventoryType::Buy => "BUY",
            InventoryType::Sell => "SELL",
            InventoryType::Deposit => "DEPOSIT",
            InventoryType::Withdraw => "WITHDRAW",
        };
        f.write_str(s)
    }
}

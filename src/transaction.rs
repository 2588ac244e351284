use crate::error::EngineError;
use crate::inventory::{Inventory, InventoryType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Transaction
/// timestamp, asset, transaction type, quantity, price, fee
///
/// Implements `Inventory` to be used in `Holding` and `Engine`.
///
/// Parsing from text is offered for convenience of whoever extracts the trades. The
/// line format is `timestamp,asset,type,quantity,price[,fee]` with a dot decimal
/// separator; fee defaults to zero.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: NaiveDateTime,
    pub asset: String,
    pub itype: InventoryType,
    pub quantity: Decimal,
    pub price: Decimal,
    #[serde(default)]
    pub fee: Decimal,
}

impl Transaction {
    pub fn new(
        timestamp: NaiveDateTime,
        asset: &str,
        itype: InventoryType,
        quantity: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Self {
        Transaction {
            timestamp,
            asset: asset.to_owned(),
            itype,
            quantity,
            price,
            fee,
        }
    }
}

impl FromStr for Transaction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: String| EngineError::RecordParse {
            input: s.to_owned(),
            reason,
        };
        let field: Vec<&str> = s.split(',').map(str::trim).collect();
        if field.len() != 5 && field.len() != 6 {
            return Err(parse_err(format!("expected 5 or 6 fields, got {}", field.len())));
        }
        if field[1].is_empty() {
            return Err(parse_err("missing asset".into()));
        }

        let decimal = |value: &str, name: &str| {
            Decimal::from_str(value).map_err(|e| parse_err(format!("{}: {}", name, e)))
        };

        Ok(Transaction {
            timestamp: NaiveDateTime::parse_from_str(field[0], TIMESTAMP_FORMAT)
                .map_err(|e| parse_err(format!("timestamp: {}", e)))?,
            asset: field[1].to_owned(),
            itype: InventoryType::from_str(field[2]).map_err(parse_err)?,
            quantity: decimal(field[3], "quantity")?,
            price: decimal(field[4], "price")?,
            fee: match field.get(5) {
                Some(fee) if !fee.is_empty() => decimal(fee, "fee")?,
                _ => Decimal::ZERO,
            },
        })
    }
}

impl Inventory for Transaction {
    fn asset(&self) -> &str {
        &self.asset
    }

    fn itype(&self) -> InventoryType {
        self.itype
    }

    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn fee(&self) -> Decimal {
        self.fee
    }

    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

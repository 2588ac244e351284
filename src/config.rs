use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// Largest scale a `Decimal` can carry.
const MAX_PRECISION: u32 = 28;

/// Engine configuration.
///
/// Loaded from TOML, every field is optional:
///
/// ```toml
/// decimal_precision = 8
/// break_even_fee_rate = "0.001"
/// validate_ordering = true
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Decimal places kept by the weighted-average division and by every reported value.
    pub decimal_precision: u32,

    /// Estimated fee rate paid on exit, used for the break-even price. Written as a
    /// string in TOML to keep it exact.
    pub break_even_fee_rate: Decimal,

    /// Reject records whose timestamp goes backwards within an asset.
    pub validate_ordering: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimal_precision: 8,
            break_even_fee_rate: Decimal::new(1, 3),
            validate_ordering: true,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfiguration` if precision exceeds 28 places or the
    /// fee rate is outside `[0, 1)`.
    pub fn new(
        decimal_precision: u32,
        break_even_fee_rate: Decimal,
        validate_ordering: bool,
    ) -> EngineResult<Self> {
        let config = Self {
            decimal_precision,
            break_even_fee_rate,
            validate_ordering,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.decimal_precision > MAX_PRECISION {
            return Err(EngineError::InvalidConfiguration(format!(
                "decimal_precision must be at most {}, got {}",
                MAX_PRECISION, self.decimal_precision
            )));
        }
        if self.break_even_fee_rate.is_sign_negative() || self.break_even_fee_rate >= Decimal::ONE
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "break_even_fee_rate must be in [0, 1), got {}",
                self.break_even_fee_rate
            )));
        }
        Ok(())
    }
}

use std::fmt;

use alloy_primitives::U256;

use crate::error::MarketError;

/// Decimals of the native currency (APE).
pub const DECIMALS: u32 = 18;

/// An amount of native currency in its smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Wei(pub U256);

fn unit() -> U256 {
    U256::from(10u64).pow(U256::from(DECIMALS))
}

impl Wei {
    /// Parse a human price like "1.5" into wei, exactly.
    /// Only ASCII digits with at most one '.' and 18 fractional digits.
    pub fn parse_ether(input: &str) -> Result<Self, MarketError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MarketError::InvalidInput("price is empty".to_string()));
        }
        if trimmed.starts_with('-') {
            return Err(MarketError::InvalidInput(format!(
                "price must not be negative: {}",
                trimmed
            )));
        }

        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !is_digits(whole) || !is_digits(frac) {
            return Err(MarketError::InvalidInput(format!(
                "'{}' is not a decimal amount",
                trimmed
            )));
        }
        if frac.len() > DECIMALS as usize {
            return Err(MarketError::InvalidInput(format!(
                "price has more than {} decimal places: {}",
                DECIMALS, trimmed
            )));
        }

        let digits = format!("{}{:0<width$}", whole, frac, width = DECIMALS as usize);
        U256::from_str_radix(&digits, 10)
            .map(Self)
            .map_err(|_| MarketError::InvalidInput(format!("price is too large: {}", trimmed)))
    }

    /// Shortest decimal form of the amount in whole units ("1.5", "10").
    pub fn to_ether_string(&self) -> String {
        let base = unit();
        let whole = self.0 / base;
        let frac = self.0 % base;
        if frac.is_zero() {
            return whole.to_string();
        }
        let padded = format!("{:0>width$}", frac.to_string(), width = DECIMALS as usize);
        format!("{}.{}", whole, padded.trim_end_matches('0'))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ether_string())
    }
}

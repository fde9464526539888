//! Initial balance handling for newly created accounts

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::InvalidArgument;

/// Fractional digits of the smallest indivisible token unit.
pub const TOKEN_DECIMALS: u32 = 24;

pub const DEFAULT_INITIAL_BALANCE: &str = "100";

/// Convert a human amount ("100", "0.5") into the smallest token unit.
pub fn parse_initial_balance(value: &str) -> Result<u128, InvalidArgument> {
    let invalid = |reason: &str| InvalidArgument::InvalidBalance {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let amount = Decimal::from_str(value).map_err(|e| invalid(&e.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid("amount must not be negative"));
    }
    if amount.scale() > TOKEN_DECIMALS {
        return Err(invalid("too many decimal places"));
    }

    let mantissa = amount.mantissa().unsigned_abs();
    10u128
        .checked_pow(TOKEN_DECIMALS - amount.scale())
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or_else(|| invalid("amount is too large"))
}

//! Wei / gwei / eth conversions.
//!
//! Amounts are kept as `U256` and scaled with decimal formatting, so large
//! balances never go through float division.

use alloy_primitives::U256;
use alloy_primitives::utils::format_units;
use serde::Serialize;

use crate::error::ConversionError;

pub const GWEI_DECIMALS: u8 = 9;
pub const ETH_DECIMALS: u8 = 18;

/// An eth amount in two renditions: the exact decimal string and a lossy
/// `f64` for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthAmount {
    pub exact: String,
    pub display: f64,
}

pub fn parse_hex_quantity(hex: &str) -> Result<U256, ConversionError> {
    let digits = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConversionError::InvalidFormat(hex.to_string()));
    }

    U256::from_str_radix(digits, 16).map_err(|_| ConversionError::InvalidFormat(hex.to_string()))
}

pub fn hex_to_u64(hex: &str) -> Result<u64, ConversionError> {
    let value = parse_hex_quantity(hex)?;
    u64::try_from(value).map_err(|_| ConversionError::InvalidFormat(hex.to_string()))
}

/// Parse a hex wei amount and express it in gwei.
pub fn hex_to_gwei(hex: &str) -> Result<f64, ConversionError> {
    let wei = parse_hex_quantity(hex)?;
    let gwei = scale_down(wei, GWEI_DECIMALS, hex)?;
    to_display(&gwei, hex)
}

pub fn parse_wei_decimal(wei_decimal: &str) -> Result<U256, ConversionError> {
    if wei_decimal.is_empty() || !wei_decimal.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConversionError::InvalidFormat(wei_decimal.to_string()));
    }

    U256::from_str_radix(wei_decimal, 10)
        .map_err(|_| ConversionError::InvalidFormat(wei_decimal.to_string()))
}

pub fn wei_to_eth(wei: U256) -> EthAmount {
    let raw = wei.to_string();
    // 18 is always a valid unit, the fallback is unreachable in practice
    let exact = scale_down(wei, ETH_DECIMALS, &raw).unwrap_or(raw);
    let display = exact.parse::<f64>().unwrap_or(f64::NAN);
    EthAmount { exact, display }
}

pub fn wei_decimal_to_eth(wei_decimal: &str) -> Result<EthAmount, ConversionError> {
    let wei = parse_wei_decimal(wei_decimal)?;
    Ok(wei_to_eth(wei))
}

fn scale_down(amount: U256, decimals: u8, input: &str) -> Result<String, ConversionError> {
    let formatted = format_units(amount, decimals)
        .map_err(|_| ConversionError::InvalidFormat(input.to_string()))?;
    Ok(trim_fraction(&formatted))
}

fn to_display(decimal: &str, input: &str) -> Result<f64, ConversionError> {
    decimal
        .parse::<f64>()
        .map_err(|_| ConversionError::InvalidFormat(input.to_string()))
}

fn trim_fraction(decimal: &str) -> String {
    if !decimal.contains('.') {
        return decimal.to_string();
    }
    decimal
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

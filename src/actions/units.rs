//! Native unit conversions with the fixed 18-decimal scaling.

use alloy::primitives::U256;
use thiserror::Error;

/// Decimals of the native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Smallest units in one whole native unit.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Error)]
#[error("invalid amount '{amount}': {reason}")]
pub struct AmountError {
    pub amount: String,
    pub reason: String,
}

/// Render a wei amount in whole native units, without trailing zeros.
///
/// `10^18` renders as `1`, `1.5 * 10^18` as `1.5`.
pub fn format_ether(wei: U256) -> String {
    let padded = alloy::primitives::utils::format_ether(wei);
    match padded.split_once('.') {
        Some((whole, fraction)) => match fraction.trim_end_matches('0') {
            "" => whole.to_string(),
            fraction => format!("{}.{}", whole, fraction),
        },
        None => padded,
    }
}

/// Parse a decimal amount of native units into wei.
pub fn parse_ether(amount: &str) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(AmountError {
            amount: amount.to_string(),
            reason: "negative amount".to_string(),
        });
    }
    alloy::primitives::utils::parse_ether(amount).map_err(|e| AmountError {
        amount: amount.to_string(),
        reason: e.to_string(),
    })
}

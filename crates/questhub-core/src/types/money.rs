//! Fee splitting between the platform and referring partners.
//!
//! Amounts are integer satang (1 THB = 100 satang); rates are basis points
//! (10_000 = 100%).

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Basis points representing 100%.
pub const FULL_BPS: i32 = 10_000;

/// The outcome of splitting a gross fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Amount charged, in satang.
    pub gross_amount: i64,
    /// Platform share, in satang.
    pub platform_amount: i64,
    /// Partner share, in satang.
    pub partner_amount: i64,
    /// Rate applied to the partner share.
    pub commission_bps: i32,
}

impl FeeSplit {
    /// Split `gross` satang. The partner share is floored; the platform keeps
    /// the remainder so both parts always sum to the gross amount.
    pub fn compute(gross: i64, commission_bps: i32) -> Result<Self, AppError> {
        if gross <= 0 {
            return Err(AppError::validation("Fee amount must be positive"));
        }
        if !(0..=FULL_BPS).contains(&commission_bps) {
            return Err(AppError::validation(
                "Commission rate must be between 0 and 10000 basis points",
            ));
        }
        let partner = (i128::from(gross) * i128::from(commission_bps)) / i128::from(FULL_BPS);
        let partner_amount = i64::try_from(partner)
            .map_err(|_| AppError::validation("Fee amount is too large"))?;
        Ok(Self {
            gross_amount: gross,
            platform_amount: gross - partner_amount,
            partner_amount,
            commission_bps,
        })
    }

    /// Split with no partner: the platform keeps everything.
    pub fn platform_only(gross: i64) -> Result<Self, AppError> {
        Self::compute(gross, 0)
    }
}

/// Parse a baht amount such as `"199.50"` into satang.
pub fn parse_baht(input: &str) -> Result<i64, AppError> {
    let trimmed = input.trim();
    let invalid = || AppError::validation(format!("Invalid baht amount: '{input}'"));
    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() || frac.len() > 2 || !whole.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let baht: i64 = whole.parse().map_err(|_| invalid())?;
    let satang: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    baht.checked_mul(100)
        .and_then(|v| v.checked_add(satang))
        .ok_or_else(invalid)
}

/// Format satang as a baht string with two decimals.
pub fn format_baht(satang: i64) -> String {
    let sign = if satang < 0 { "-" } else { "" };
    let abs = satang.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_floors_partner_share() {
        let split = FeeSplit::compute(99_999, 1_250).unwrap();
        assert_eq!(split.partner_amount, 12_499);
        assert_eq!(split.platform_amount, 87_500);
        assert_eq!(split.partner_amount + split.platform_amount, 99_999);
    }

    #[test]
    fn test_split_bounds() {
        assert!(FeeSplit::compute(0, 1000).is_err());
        assert!(FeeSplit::compute(100, -1).is_err());
        assert!(FeeSplit::compute(100, 10_001).is_err());
        let all = FeeSplit::compute(500, FULL_BPS).unwrap();
        assert_eq!(all.partner_amount, 500);
        assert_eq!(all.platform_amount, 0);
    }

    #[test]
    fn test_platform_only() {
        let split = FeeSplit::platform_only(150_00).unwrap();
        assert_eq!(split.partner_amount, 0);
        assert_eq!(split.platform_amount, 150_00);
        assert_eq!(split.commission_bps, 0);
    }

    #[test]
    fn test_parse_and_format_baht() {
        assert_eq!(parse_baht("199.5").unwrap(), 19_950);
        assert_eq!(parse_baht("2000").unwrap(), 200_000);
        assert_eq!(parse_baht("0.05").unwrap(), 5);
        assert!(parse_baht("1.234").is_err());
        assert!(parse_baht("-3").is_err());
        assert!(parse_baht("abc").is_err());
        assert_eq!(format_baht(19_950), "199.50");
        assert_eq!(format_baht(-5), "-0.05");
    }
}

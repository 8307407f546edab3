//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary amounts are stored and serialized as `f64`, but every
//! calculation goes through `Decimal` and is rounded half-up to two
//! decimal places.

use crate::orders::error::OrderError;
use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price per item
const MAX_UNIT_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per order line
pub const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed delivery fee
const MAX_DELIVERY_FEE: f64 = 10_000.0;

#[inline]
fn require_finite(value: f64, field: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::Validation(format!(
            "{field} must be a finite number, got {value}"
        )));
    }
    Ok(())
}

/// Validate a delivery fee from intake input.
pub fn validate_delivery_fee(fee: f64) -> Result<(), OrderError> {
    require_finite(fee, "delivery_fee")?;
    if fee < 0.0 {
        return Err(OrderError::Validation(format!(
            "delivery_fee must be non-negative, got {fee}"
        )));
    }
    if fee > MAX_DELIVERY_FEE {
        return Err(OrderError::Validation(format!(
            "delivery_fee exceeds maximum allowed ({MAX_DELIVERY_FEE}), got {fee}"
        )));
    }
    Ok(())
}

/// Validate a unit price captured from the product directory.
pub fn validate_unit_price(price: f64, product_id: &str) -> Result<(), OrderError> {
    require_finite(price, "unit_price")?;
    if price < 0.0 {
        return Err(OrderError::Validation(format!(
            "unit price for product {product_id} must be non-negative, got {price}"
        )));
    }
    if price > MAX_UNIT_PRICE {
        return Err(OrderError::Validation(format!(
            "unit price for product {product_id} exceeds maximum allowed ({MAX_UNIT_PRICE})"
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Sum of unit_price × quantity over the order lines.
pub fn items_price(lines: &[(f64, i32)]) -> Decimal {
    lines
        .iter()
        .map(|(price, quantity)| to_decimal(*price) * Decimal::from(*quantity))
        .sum()
}

/// Final order total: items price plus the delivery fee.
pub fn order_total(items_price: Decimal, delivery_fee: f64) -> Decimal {
    items_price + to_decimal(delivery_fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_conversion_avoids_float_drift() {
        // 0.1 + 0.2 != 0.3 in f64, but does through Decimal
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);
    }

    #[test]
    fn accumulation_precision() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn items_price_sums_lines() {
        // 2 × 10.0 + 1 × 5.0 = 25.0
        let lines = vec![(10.0, 2), (5.0, 1)];
        let items = items_price(&lines);
        assert_eq!(to_f64(items), 25.0);
        assert_eq!(to_f64(order_total(items, 3.0)), 28.0);
    }

    #[test]
    fn delivery_fee_rejects_nan_and_negative() {
        assert!(validate_delivery_fee(f64::NAN).is_err());
        assert!(validate_delivery_fee(-1.0).is_err());
        assert!(validate_delivery_fee(0.0).is_ok());
        assert!(validate_delivery_fee(MAX_DELIVERY_FEE + 1.0).is_err());
    }

    #[test]
    fn unit_price_limits() {
        assert!(validate_unit_price(9.99, "p1").is_ok());
        assert!(validate_unit_price(-0.01, "p1").is_err());
        assert!(validate_unit_price(f64::INFINITY, "p1").is_err());
        assert!(validate_unit_price(MAX_UNIT_PRICE + 1.0, "p1").is_err());
    }
}

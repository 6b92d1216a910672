//! Price-to-amount conversion.

/// Convert a target price in settlement display units into input-token base
/// units.
///
/// `input_units = (output_price / input_price) * target_price * 10^input_decimals`,
/// truncated toward zero.
///
/// Returns `None` when either unit price is zero, negative or non-finite, or
/// when the target price is not positive; the caller must not attempt a
/// swap from an undefined amount.
pub fn input_units_for_target(
    input_price: f64,
    output_price: f64,
    target_price: f64,
    input_decimals: u8,
) -> Option<u64> {
    if !input_price.is_finite() || input_price <= 0.0 {
        return None;
    }
    if !output_price.is_finite() || output_price <= 0.0 {
        return None;
    }
    if !target_price.is_finite() || target_price <= 0.0 {
        return None;
    }

    let units = (output_price / input_price) * target_price * 10f64.powi(input_decimals as i32);
    if !units.is_finite() || units < 0.0 || units >= u64::MAX as f64 {
        return None;
    }
    Some(units as u64)
}

//! Fixed-point to floating-point conversion of on-chain samples.

/// `raw / 10^decimals`.
///
/// The quotient is formed exactly in decimal at scale `decimals`, so the
/// half-down rounding of the division never has to break a tie; the only
/// rounding is the final conversion to the nearest `f64`.
pub fn convert_to_decimal(raw: u64, decimals: u8) -> f64 {
    if decimals == 0 {
        return raw as f64;
    }

    let scale = decimals as usize;
    let digits = format!("{:0>width$}", raw, width = scale + 1);
    let (integer, fraction) = digits.split_at(digits.len() - scale);

    format!("{}.{}", integer, fraction)
        .parse()
        .unwrap_or_else(|_| raw as f64 / 10f64.powi(decimals as i32))
}

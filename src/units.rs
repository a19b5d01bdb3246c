// Value/unit conversion between human-entered decimal quantities and the
// fixed-point integers used on-chain.
//
// All scaling is done with decimal-string arithmetic on U256. On-chain
// amounts must never pass through binary floating point: `0.1 * 10^18`
// has no exact f64 representation, and a wrong intermediate silently
// produces amounts off by orders of magnitude.

use ethers::types::U256;

use crate::error::HarnessError;

/// Default scale for native-currency amounts (wei per ether/BNB).
pub const DEFAULT_DECIMALS: u32 = 18;

/// Convert a decimal value to its fixed-point representation,
/// `round(value * 10^decimals)` as a U256. Digits beyond the scale
/// round half-up.
///
/// The scale is the caller's responsibility: tokens in this system
/// declare 3 or 18 decimals, and a mismatched scale is not detectable
/// here. Fails with `InvalidAmount` on negative or non-finite input.
pub fn to_wei(value: f64, decimals: u32) -> Result<U256, HarnessError> {
    if !value.is_finite() {
        return Err(HarnessError::InvalidAmount(format!(
            "{value} is not a finite number"
        )));
    }
    if value < 0.0 {
        return Err(HarnessError::InvalidAmount(format!(
            "{value} is negative"
        )));
    }
    // f64 Display prints the shortest decimal string that round-trips,
    // so "0.1" stays "0.1" and never becomes 0.1000000000000000055...
    to_wei_str(&value.to_string(), decimals)
}

/// Convert a decimal string (e.g. "0.1", "25", "1.005") to its
/// fixed-point representation without ever constructing a float.
pub fn to_wei_str(value: &str, decimals: u32) -> Result<U256, HarnessError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(HarnessError::InvalidAmount(format!("{value} is negative")));
    }
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(HarnessError::InvalidAmount(format!("{value:?} is empty")));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(HarnessError::InvalidAmount(format!(
            "{value:?} is not a decimal number"
        )));
    }

    // Trailing zeros carry no information and must not count against
    // the available scale.
    let frac_part = frac_part.trim_end_matches('0');

    // Digits past the scale round half-up on the first excess digit.
    let (frac_kept, excess) = if frac_part.len() as u32 > decimals {
        frac_part.split_at(decimals as usize)
    } else {
        (frac_part, "")
    };
    let round_up = excess.chars().next().map_or(false, |c| c >= '5');

    let overflow =
        || HarnessError::InvalidAmount(format!("{value} overflows at scale {decimals}"));

    let mut amount = if int_part.is_empty() {
        U256::zero()
    } else {
        parse_uint(int_part)?
            .checked_mul(U256::exp10(decimals as usize))
            .ok_or_else(overflow)?
    };
    if !frac_kept.is_empty() {
        let scale = U256::exp10((decimals - frac_kept.len() as u32) as usize);
        amount = amount
            .checked_add(parse_uint(frac_kept)? * scale)
            .ok_or_else(overflow)?;
    }
    if round_up {
        amount = amount.checked_add(U256::one()).ok_or_else(overflow)?;
    }
    Ok(amount)
}

/// Inverse of [`to_wei`]: widen to f64 and divide the scale back out.
///
/// Lossy for large values. Display and assertions only, never feeds
/// back into an on-chain amount.
pub fn from_wei(value: U256, decimals: u32) -> f64 {
    let widened: f64 = value.to_string().parse().unwrap_or(f64::INFINITY);
    widened / 10f64.powi(decimals as i32)
}

/// Parse a decimal (or 0x-prefixed hex) integer string into a U256,
/// without scaling.
pub fn to_bn(value: &str) -> Result<U256, HarnessError> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some("") => Err(HarnessError::Parse(format!("{value:?} has no digits"))),
        Some(hex) => U256::from_str_radix(hex, 16)
            .map_err(|e| HarnessError::Parse(format!("{value:?}: {e}"))),
        None => parse_uint(value),
    }
}

/// Scale an integral amount by `10^decimals`, entirely on U256.
pub fn to_bn_scaled(value: u64, decimals: u32) -> U256 {
    U256::from(value) * U256::exp10(decimals as usize)
}

fn parse_uint(digits: &str) -> Result<U256, HarnessError> {
    // from_dec_str accepts the empty string as zero; an empty input
    // here is a caller mistake, not an amount.
    if digits.is_empty() {
        return Err(HarnessError::Parse("empty number".to_string()));
    }
    U256::from_dec_str(digits).map_err(|e| HarnessError::Parse(format!("{digits:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wei_default_scale() {
        // 0.1 BNB must scale to exactly 10^17, not a float approximation
        let amount = to_wei(0.1, DEFAULT_DECIMALS).unwrap();
        assert_eq!(amount, U256::from_dec_str("100000000000000000").unwrap());
    }

    #[test]
    fn test_to_wei_small_scale() {
        // Token decimals of 3, as declared by the token contract
        let amount = to_wei(1.5, 3).unwrap();
        assert_eq!(amount, U256::from(1500u64));
    }

    #[test]
    fn test_to_wei_zero_scale() {
        let amount = to_wei(25.0, 0).unwrap();
        assert_eq!(amount, U256::from(25u64));
    }

    #[test]
    fn test_to_wei_rejects_negative() {
        assert!(matches!(
            to_wei(-0.5, 18),
            Err(HarnessError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_to_wei_rejects_non_finite() {
        assert!(to_wei(f64::NAN, 18).is_err());
        assert!(to_wei(f64::INFINITY, 18).is_err());
    }

    #[test]
    fn test_to_wei_str_rounds_half_up_past_the_scale() {
        // The digit past the scale rounds half-up
        assert_eq!(to_wei_str("1.0005", 3).unwrap(), U256::from(1001u64));
        assert_eq!(to_wei_str("1.0004", 3).unwrap(), U256::from(1000u64));
        assert_eq!(to_wei_str("0.5", 0).unwrap(), U256::from(1u64));
        assert_eq!(to_wei_str("2.4", 0).unwrap(), U256::from(2u64));
        // Trailing zeros are not precision
        assert_eq!(to_wei_str("1.5000", 3).unwrap(), U256::from(1500u64));
    }

    #[test]
    fn test_to_wei_rounds_float_representation_noise() {
        // 0.1 + 0.2 prints as 0.30000000000000004; the noise is far
        // below the scale and must round away, not error
        assert_eq!(to_wei(0.1 + 0.2, 3).unwrap(), U256::from(300u64));
        assert_eq!(
            to_wei(0.1 + 0.2, 18).unwrap(),
            U256::from_dec_str("300000000000000040").unwrap()
        );
    }

    #[test]
    fn test_to_wei_str_rejects_garbage() {
        assert!(to_wei_str("abc", 18).is_err());
        assert!(to_wei_str("", 18).is_err());
        assert!(to_wei_str("1.2.3", 18).is_err());
    }

    #[test]
    fn test_to_wei_floor_property() {
        // For integral input, dividing the scale back out recovers floor(value)
        for v in [0u64, 1, 3, 10, 1000] {
            let scaled = to_wei(v as f64, 18).unwrap();
            assert_eq!(scaled / U256::exp10(18), U256::from(v));
        }
    }

    #[test]
    fn test_round_trip_within_display_tolerance() {
        for decimals in [0u32, 3, 18] {
            for v in [0.0f64, 1.0, 0.25, 42.0] {
                // skip values finer than the scale allows
                if decimals == 0 && v.fract() != 0.0 {
                    continue;
                }
                let back = from_wei(to_wei(v, decimals).unwrap(), decimals);
                assert!((back - v).abs() < 1e-9, "{v} @ {decimals} came back as {back}");
            }
        }
    }

    #[test]
    fn test_to_bn() {
        assert_eq!(to_bn("1000").unwrap(), U256::from(1000u64));
        assert_eq!(to_bn("0x10").unwrap(), U256::from(16u64));
        assert!(to_bn("not a number").is_err());
    }

    #[test]
    fn test_to_bn_rejects_empty_input() {
        // from_dec_str would happily read "" as zero; it must not
        assert!(matches!(to_bn(""), Err(HarnessError::Parse(_))));
        assert!(matches!(to_bn("   "), Err(HarnessError::Parse(_))));
        assert!(matches!(to_bn("0x"), Err(HarnessError::Parse(_))));
    }

    #[test]
    fn test_to_bn_scaled() {
        // toBN(10) in the deploy scripts: 10 BNB at the default scale
        assert_eq!(
            to_bn_scaled(10, 18),
            U256::from_dec_str("10000000000000000000").unwrap()
        );
        assert_eq!(to_bn_scaled(7, 0), U256::from(7u64));
    }
}

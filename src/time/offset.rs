//! Exact conversion of clock offsets to microseconds.
//!
//! Tracking daemons report offsets as signed decimal text, occasionally in
//! scientific notation. Converting through `f64` and peeling components off
//! with repeated casts is not deterministic near component boundaries, so
//! the decimal text is scaled with integer arithmetic instead: shift the
//! digit string by the exponent plus six, then truncate whatever remains
//! toward zero.

/// Converts a signed decimal-seconds string to whole microseconds,
/// truncating toward zero.
///
/// Returns the magnitude; the sign of an offset is irrelevant to an
/// uncertainty bound. Yields `None` for text that is not a decimal number
/// or whose magnitude does not fit in `u64` microseconds.
#[must_use]
pub fn offset_micros(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    if unsigned.is_empty() {
        return None;
    }

    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i32>().ok()?),
        None => (unsigned, 0),
    };

    let (int_digits, frac_digits) = match mantissa.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (mantissa, ""),
    };
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    if !int_digits.bytes().all(|b| b.is_ascii_digit())
        || !frac_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    // Index of the decimal point in the combined digit string once the
    // value is scaled by 1e6. Digits left of it form the result; digits
    // right of it are truncated.
    let point = int_digits.len() as i64 + i64::from(exponent) + 6;
    if point <= 0 {
        return Some(0);
    }

    let digits = [int_digits.as_bytes(), frac_digits.as_bytes()].concat();
    if point > 39 {
        // Cannot fit u64 unless the mantissa is zero.
        return digits.iter().all(|&b| b == b'0').then_some(0);
    }

    let mut total: u64 = 0;
    for position in 0..point as usize {
        let digit = digits.get(position).copied().unwrap_or(b'0') - b'0';
        total = total.checked_mul(10)?.checked_add(u64::from(digit))?;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_plain_decimals_exactly() {
        assert_eq!(offset_micros("1.234567"), Some(1_234_567));
        assert_eq!(offset_micros("0.000001"), Some(1));
        assert_eq!(offset_micros("42"), Some(42_000_000));
        assert_eq!(offset_micros(".5"), Some(500_000));
    }

    #[test]
    fn sign_is_ignored() {
        assert_eq!(offset_micros("-1.234567"), Some(1_234_567));
        assert_eq!(offset_micros("+0.000042"), Some(42));
    }

    #[test]
    fn truncates_toward_zero_past_microseconds() {
        assert_eq!(offset_micros("0.9999999"), Some(999_999));
        assert_eq!(offset_micros("-0.9999999"), Some(999_999));
        assert_eq!(offset_micros("0.0000009"), Some(0));
    }

    #[test]
    fn handles_scientific_notation() {
        assert_eq!(offset_micros("1e-6"), Some(1));
        assert_eq!(offset_micros("1.5e-3"), Some(1_500));
        assert_eq!(offset_micros("1.234567e-3"), Some(1_234));
        assert_eq!(offset_micros("-2.5E1"), Some(25_000_000));
        assert_eq!(offset_micros("1e-12"), Some(0));
    }

    #[test]
    fn zero_survives_any_exponent() {
        assert_eq!(offset_micros("0.000e99"), Some(0));
        assert_eq!(offset_micros("0e-99"), Some(0));
    }

    #[test]
    fn rejects_non_numbers() {
        assert_eq!(offset_micros(""), None);
        assert_eq!(offset_micros("-"), None);
        assert_eq!(offset_micros("."), None);
        assert_eq!(offset_micros("abc"), None);
        assert_eq!(offset_micros("1.2.3"), None);
        assert_eq!(offset_micros("NaN"), None);
        assert_eq!(offset_micros("1e"), None);
    }

    #[test]
    fn rejects_magnitudes_beyond_u64_micros() {
        assert_eq!(offset_micros("1e30"), None);
        assert_eq!(offset_micros(&"9".repeat(30)), None);
    }
}

//! Property-based checks of offset decomposition.

use proptest::prelude::*;
use tsa_service::protocol::Accuracy;
use tsa_service::time::offset::offset_micros;

/// Independent recomputation: integer seconds scaled by 1e6 plus the first
/// six fractional digits, zero padded.
fn expected_micros(int_part: u64, frac: &str) -> u64 {
    let mut frac6: String = frac.chars().take(6).collect();
    while frac6.len() < 6 {
        frac6.push('0');
    }
    int_part * 1_000_000 + frac6.parse::<u64>().unwrap()
}

proptest! {
    #[test]
    fn decimal_offsets_decompose_exactly(
        sign in prop::sample::select(&["", "-", "+"][..]),
        int_part in 0u64..1_000_000,
        frac in "[0-9]{0,9}",
    ) {
        let text = if frac.is_empty() {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac}")
        };
        let micros = offset_micros(&text).unwrap();
        prop_assert_eq!(micros, expected_micros(int_part, &frac));
    }

    #[test]
    fn components_always_recompose_to_the_total(total in any::<u64>()) {
        let acc = Accuracy::from_micros(total);
        prop_assert!(acc.millis < 1000);
        prop_assert!(acc.micros < 1000);
        prop_assert_eq!(acc.total_micros(), u128::from(total));
    }

    #[test]
    fn digits_beyond_microseconds_truncate_toward_zero(
        int_part in 0u64..1000,
        frac6 in "[0-9]{6}",
        extra in "[0-9]{1,6}",
    ) {
        let base = format!("{int_part}.{frac6}");
        let extended = format!("{base}{extra}");
        prop_assert_eq!(offset_micros(&extended), offset_micros(&base));
    }

    #[test]
    fn sign_never_changes_the_magnitude(int_part in 0u64..1_000_000, frac in "[0-9]{0,8}") {
        let positive = format!("{int_part}.{frac}0");
        let negative = format!("-{positive}");
        prop_assert_eq!(offset_micros(&positive), offset_micros(&negative));
    }

    #[test]
    fn scientific_notation_matches_plain_scaling(m in 0u64..10_000_000) {
        prop_assert_eq!(offset_micros(&format!("{m}e-6")), Some(m));
        prop_assert_eq!(offset_micros(&format!("{m}E-6")), Some(m));
        prop_assert_eq!(offset_micros(&format!("{m}e-3")), Some(m * 1000));
    }
}

#[test]
fn a_mixed_offset_splits_into_all_three_components() {
    let acc = Accuracy::from_micros(offset_micros("1.234567").unwrap());
    assert_eq!((acc.seconds, acc.millis, acc.micros), (1, 234, 567));
}

#[test]
fn boundary_offsets_never_round_up() {
    let acc = Accuracy::from_micros(offset_micros("0.9999999").unwrap());
    assert_eq!((acc.seconds, acc.millis, acc.micros), (0, 999, 999));

    let acc = Accuracy::from_micros(offset_micros("1.9999996").unwrap());
    assert_eq!((acc.seconds, acc.millis, acc.micros), (1, 999, 999));
}

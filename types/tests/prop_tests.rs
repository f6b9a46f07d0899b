use proptest::prelude::*;

use ember_types::{Amount, Timestamp, COIN};

proptest! {
    /// Formatting then parsing returns the same amount for every
    /// representable value except `i64::MIN`, whose magnitude has no
    /// positive counterpart.
    #[test]
    fn amount_text_roundtrip(units in (i64::MIN + 1)..=i64::MAX) {
        let amount = Amount::from_units(units);
        let text = amount.to_string();
        prop_assert_eq!(Amount::parse(&text), Ok(amount));
    }

    /// Formatted text always carries exactly six fractional digits.
    #[test]
    fn amount_text_has_six_decimals(units in any::<i64>()) {
        let text = Amount::from_units(units).to_string();
        let (_, fraction) = text.split_once('.').expect("decimal point");
        prop_assert_eq!(fraction.len(), 6);
        prop_assert!(fraction.bytes().all(|b| b.is_ascii_digit()));
    }

    /// Extra trailing zeros never change the parsed value.
    #[test]
    fn trailing_zeros_are_insignificant(units in 0i64..1_000_000_000 * COIN, zeros in 0usize..40) {
        let text = format!("{}{}", Amount::from_units(units), "0".repeat(zeros));
        prop_assert_eq!(Amount::parse(&text), Ok(Amount::from_units(units)));
    }

    /// Shifting the decimal point into the exponent preserves the value.
    #[test]
    fn exponent_form_matches_plain_form(whole in 0i64..1_000_000, micro in 0i64..1_000_000) {
        let plain = format!("{whole}.{micro:06}");
        let digits = format!("{whole}{micro:06}").trim_start_matches('0').to_string();
        let digits = if digits.is_empty() { "0".to_string() } else { digits };
        let exponent_form = format!("{digits}e-6");
        prop_assert_eq!(Amount::parse(&plain), Amount::parse(&exponent_form));
    }

    /// A seventh non-zero fractional digit is always rejected.
    #[test]
    fn seventh_decimal_is_rejected(units in 0i64..1_000_000_000, last in 1u8..=9) {
        let text = format!("{}{}", Amount::from_units(units), last);
        prop_assert!(Amount::parse(&text).is_err());
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }
}

#![no_main]

use ember_types::Amount;
use libfuzzer_sys::fuzz_target;

// Parsing arbitrary text never panics, and every accepted amount formats
// back to text that parses to the same amount.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(amount) = Amount::parse(text) {
        let formatted = amount.to_string();
        assert_eq!(Amount::parse(&formatted), Ok(amount), "{text} -> {formatted}");
    }
});

#![no_main]

use ember_node::Transaction;
use libfuzzer_sys::fuzz_target;

// Decoding arbitrary bytes never panics; accepted bytes re-encode exactly.
fuzz_target!(|data: &[u8]| {
    for try_witness in [true, false] {
        if let Ok(tx) = Transaction::decode(data, try_witness) {
            assert_eq!(tx.serialize(try_witness), data);
            let _ = tx.to_json();
        }
    }
});

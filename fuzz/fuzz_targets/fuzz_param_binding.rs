#![no_main]

use arbitrary::Arbitrary;
use ember_rpc::{bind_arguments, Params, RpcError};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    declared: Vec<String>,
    body: String,
}

// Binding any request body against any declaration never panics, fails only
// with a binding error, and passes positional lists through untouched.
fuzz_target!(|input: Input| {
    let Ok(params) = serde_json::from_str::<Params>(&input.body) else {
        return;
    };
    match bind_arguments(&params, &input.declared) {
        Ok(bound) => {
            if let Params::Positional(values) = &params {
                assert_eq!(&bound, values);
            }
        }
        Err(
            RpcError::UnknownNamedParameter(_)
            | RpcError::DuplicateNamedParameter(_)
            | RpcError::PositionalNamedOverlap(_),
        ) => {}
        Err(other) => panic!("unexpected binding error {other:?}"),
    }
});

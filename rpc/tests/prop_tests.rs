use ember_rpc::{amount_from_value, bind_arguments, value_from_amount, Params, RpcError};
use ember_types::{Amount, MAX_MONEY};
use proptest::prelude::*;
use serde_json::{json, Value};

fn declared(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("arg{i}")).collect()
}

proptest! {
    /// Every named argument lands at its declared index and nowhere else.
    #[test]
    fn named_binding_is_positional_by_declaration(
        n in 1usize..10,
        picks in proptest::collection::vec(any::<bool>(), 10),
        rotate in 0usize..10,
    ) {
        let names = declared(n);
        let mut chosen: Vec<usize> = (0..n).filter(|i| picks[*i]).collect();
        let len = chosen.len().max(1);
        chosen.rotate_left(rotate % len);

        let pairs = chosen
            .iter()
            .map(|i| (names[*i].clone(), json!(*i as u64 + 100)))
            .collect();
        let bound = bind_arguments(&Params::Named(pairs), &names).unwrap();

        let expected_len = chosen.iter().max().map_or(0, |m| m + 1);
        prop_assert_eq!(bound.len(), expected_len);
        for (i, value) in bound.iter().enumerate() {
            if chosen.contains(&i) {
                prop_assert_eq!(value, &json!(i as u64 + 100));
            } else {
                prop_assert_eq!(value, &Value::Null);
            }
        }
    }

    /// Positional `args` and named arguments never share a slot silently.
    #[test]
    fn args_and_names_never_collide(
        n in 1usize..8,
        positional in 0usize..8,
        named_index in 0usize..8,
    ) {
        let names = declared(n);
        prop_assume!(named_index < n);
        let args: Vec<Value> = (0..positional).map(|i| json!(i as u64)).collect();
        let params = Params::Named(vec![
            ("args".into(), Value::Array(args.clone())),
            (names[named_index].clone(), json!("named")),
        ]);

        match bind_arguments(&params, &names) {
            Ok(bound) => {
                prop_assert!(named_index >= positional);
                prop_assert_eq!(&bound[..positional], &args[..]);
                prop_assert_eq!(&bound[named_index], &json!("named"));
            }
            Err(e) => {
                prop_assert!(named_index < positional);
                prop_assert_eq!(e, RpcError::PositionalNamedOverlap(names[named_index].clone()));
            }
        }
    }

    /// Amounts in the money range survive a trip through JSON text.
    #[test]
    fn money_amounts_round_trip_through_json(units in 0i64..=MAX_MONEY) {
        let value = value_from_amount(Amount::from_units(units));
        let text = serde_json::to_string(&value).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(amount_from_value(&parsed), Ok(Amount::from_units(units)));
    }
}

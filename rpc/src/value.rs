//! JSON value helpers shared by handlers and the CLI converter.

use ember_types::Amount;
use serde_json::{Number, Value};

use crate::error::RpcError;

/// Parse a single JSON value, scalars included.
///
/// Surrounding whitespace is allowed; anything after the value is not.
pub fn parse_non_rfc_json_value(text: &str) -> Result<Value, RpcError> {
    serde_json::from_str(text).map_err(|_| RpcError::Misc(format!("Error parsing JSON: {text}")))
}

/// Read an amount from a JSON number or string.
///
/// The number's text is parsed exactly as written, then checked against the
/// money range.
pub fn amount_from_value(value: &Value) -> Result<Amount, RpcError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return Err(RpcError::Type("Amount is not a number or string".into())),
    };
    let amount = Amount::parse(&text).map_err(|_| RpcError::InvalidAmount)?;
    if !amount.is_money_range() {
        return Err(RpcError::AmountOutOfRange);
    }
    Ok(amount)
}

/// A JSON number rendered with exactly six decimals.
pub fn value_from_amount(amount: Amount) -> Value {
    let text = amount.to_string();
    match text.parse::<Number>() {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(text),
    }
}

/// JSON type name used in type-error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(v: &Value) -> String {
        serde_json::to_string(v).unwrap()
    }

    fn number(text: &str) -> Value {
        Value::Number(text.parse().unwrap())
    }

    #[test]
    fn formats_six_decimals() {
        assert_eq!(write(&value_from_amount(Amount::from_units(0))), "0.000000");
        assert_eq!(write(&value_from_amount(Amount::from_units(1))), "0.000001");
        assert_eq!(write(&value_from_amount(Amount::from_units(17_622_195))), "17.622195");
        assert_eq!(write(&value_from_amount(Amount::from_units(50_000_000))), "50.000000");
        assert_eq!(write(&value_from_amount(Amount::from_units(89_898_989))), "89.898989");
        assert_eq!(write(&value_from_amount(Amount::from_units(100_000_000))), "100.000000");
        assert_eq!(
            write(&value_from_amount(Amount::from_units(2_000_000_000_000_000))),
            "2000000000.000000"
        );
        assert_eq!(write(&value_from_amount(Amount::from_units(-1))), "-0.000001");
    }

    #[test]
    fn parses_amounts_from_numbers_and_strings() {
        assert_eq!(amount_from_value(&number("0.000001")), Ok(Amount::from_units(1)));
        assert_eq!(amount_from_value(&number("0.000001000000")), Ok(Amount::from_units(1)));
        assert_eq!(amount_from_value(&number("0")), Ok(Amount::ZERO));
        assert_eq!(amount_from_value(&number("0.0")), Ok(Amount::ZERO));
        assert_eq!(amount_from_value(&number("0.010000")), Ok(Amount::from_units(10_000)));
        assert_eq!(amount_from_value(&number("1e-6")), Ok(Amount::from_units(1)));
        assert_eq!(amount_from_value(&number("0.1e-5")), Ok(Amount::from_units(1)));
        assert_eq!(amount_from_value(&number("20000000.0")), Ok(Amount::from_units(20_000_000_000_000)));
        assert_eq!(amount_from_value(&number("2e+9")), Ok(Amount::MAX_MONEY));
        assert_eq!(amount_from_value(&Value::String("1.5".into())), Ok(Amount::from_units(1_500_000)));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert_eq!(amount_from_value(&number("0.000001009")), Err(RpcError::InvalidAmount));
        assert_eq!(amount_from_value(&number("0.0000001")), Err(RpcError::InvalidAmount));
        assert_eq!(amount_from_value(&number("1e-7")), Err(RpcError::InvalidAmount));
        assert_eq!(amount_from_value(&number("1e11")), Err(RpcError::AmountOutOfRange));
        assert_eq!(amount_from_value(&number("93e+9")), Err(RpcError::AmountOutOfRange));
        assert_eq!(amount_from_value(&number("-0.000001")), Err(RpcError::AmountOutOfRange));
        assert_eq!(amount_from_value(&Value::String(".5".into())), Err(RpcError::InvalidAmount));
        assert_eq!(
            amount_from_value(&Value::Bool(true)).map_err(|e| e.code()),
            Err(-3)
        );
    }

    #[test]
    fn json_scalars_parse() {
        assert_eq!(parse_non_rfc_json_value("1.0").unwrap(), number("1.0"));
        assert_eq!(parse_non_rfc_json_value("true").unwrap(), Value::Bool(true));
        assert_eq!(parse_non_rfc_json_value("\"x\"").unwrap(), Value::String("x".into()));
        assert_eq!(parse_non_rfc_json_value("[1]").unwrap(), serde_json::json!([1]));
        assert_eq!(parse_non_rfc_json_value(" 1 ").unwrap(), number("1"));
    }

    #[test]
    fn json_parse_errors() {
        assert!(parse_non_rfc_json_value("").is_err());
        assert!(parse_non_rfc_json_value("[1] ]").is_err());
        assert!(parse_non_rfc_json_value("1 2").is_err());
        assert!(parse_non_rfc_json_value("{1:2}").is_err());
        assert!(parse_non_rfc_json_value("a").is_err());
        assert!(parse_non_rfc_json_value(".19e-6").is_err());
        assert_eq!(
            parse_non_rfc_json_value("a").unwrap_err().to_string(),
            "Error parsing JSON: a"
        );
    }
}

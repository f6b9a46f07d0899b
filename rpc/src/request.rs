//! Request and reply envelopes.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of a call, by position or by name.
///
/// Named arguments keep their source order, duplicates included, so the
/// binder can reject a name given twice.
#[derive(Clone, Debug, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

impl Default for Params {
    fn default() -> Self {
        Params::Positional(Vec::new())
    }
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::Positional(values) => values.serialize(serializer),
            Params::Named(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ParamsVisitor)
    }
}

struct ParamsVisitor;

impl<'de> Visitor<'de> for ParamsVisitor {
    type Value = Params;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array or object of parameters")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Params, E> {
        Ok(Params::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Params, E> {
        Ok(Params::default())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Params, A::Error> {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(value) = seq.next_element::<Value>()? {
            values.push(value);
        }
        Ok(Params::Positional(values))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Params, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            pairs.push((key, value));
        }
        Ok(Params::Named(pairs))
    }
}

/// A call as handed to the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: String,
    pub params: Params,
}

impl Request {
    pub fn new(method: impl Into<String>, params: impl Into<Params>) -> Self {
        Self {
            method: method.into(),
            params: params.into(),
        }
    }
}

/// A JSON-RPC request object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Params,
}

impl From<JsonRpcRequest> for Request {
    fn from(req: JsonRpcRequest) -> Self {
        Request {
            method: req.method,
            params: req.params,
        }
    }
}

/// A JSON-RPC reply object. Exactly one of `result` and `error` is non-null.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcReply {
    pub result: Value,
    pub error: Value,
    pub id: Value,
}

impl JsonRpcReply {
    pub fn success(result: Value, id: Value) -> Self {
        Self {
            result,
            error: Value::Null,
            id,
        }
    }

    pub fn failure(error: &crate::RpcError, id: Value) -> Self {
        Self {
            result: Value::Null,
            error: error.to_json(),
            id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn named_params_keep_duplicates_in_order() {
        let params: Params = serde_json::from_str(r#"{"arg2":2,"arg4":4,"arg2":3}"#).unwrap();
        assert_eq!(
            params,
            Params::Named(vec![
                ("arg2".into(), json!(2)),
                ("arg4".into(), json!(4)),
                ("arg2".into(), json!(3)),
            ])
        );
    }

    #[test]
    fn positional_and_missing_params() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"id":1,"method":"m","params":[1,"a",null]}"#).unwrap();
        assert_eq!(req.params, Params::Positional(vec![json!(1), json!("a"), Value::Null]));

        let req: JsonRpcRequest = serde_json::from_str(r#"{"method":"m"}"#).unwrap();
        assert!(req.params.is_empty());
        assert_eq!(req.id, Value::Null);

        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"method":"m","params":null}"#).unwrap();
        assert!(req.params.is_empty());
    }

    #[test]
    fn nested_number_text_is_kept() {
        let params: Params = serde_json::from_str(r#"{"amount":0.000001000000}"#).unwrap();
        let Params::Named(pairs) = params else {
            panic!("expected named params");
        };
        assert_eq!(pairs[0].1.to_string(), "0.000001000000");
    }

    #[test]
    fn params_serialize_back() {
        let params = Params::Named(vec![("a".into(), json!(1)), ("b".into(), json!(true))]);
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"{"a":1,"b":true}"#);
    }

    #[test]
    fn reply_shape() {
        let reply = JsonRpcReply::success(json!(true), json!(7));
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"result":true,"error":null,"id":7}"#
        );
    }
}

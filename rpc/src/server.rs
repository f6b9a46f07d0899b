//! JSON-RPC request handling on top of the dispatcher.
//!
//! Transport (HTTP, sockets, authentication) lives outside this crate; the
//! server only turns request bodies into reply bodies.

use std::sync::Arc;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::dispatcher::Dispatcher;
use crate::error::RpcError;
use crate::request::{JsonRpcReply, JsonRpcRequest, Request};

pub struct RpcServer<C> {
    dispatcher: Arc<Dispatcher<C>>,
    context: Arc<C>,
}

impl<C> Clone for RpcServer<C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            context: Arc::clone(&self.context),
        }
    }
}

impl<C> RpcServer<C> {
    pub fn new(dispatcher: Arc<Dispatcher<C>>, context: Arc<C>) -> Self {
        Self {
            dispatcher,
            context,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Execute a request directly.
    pub fn execute(&self, request: &Request) -> Result<Value, RpcError> {
        self.dispatcher.execute(&self.context, request)
    }

    /// Execute one decoded JSON-RPC request.
    pub fn call(&self, request: JsonRpcRequest) -> JsonRpcReply {
        let id = request.id.clone();
        match self.execute(&request.into()) {
            Ok(result) => JsonRpcReply::success(result, id),
            Err(e) => JsonRpcReply::failure(&e, id),
        }
    }

    /// Turn a request body (single object or batch array) into a reply body.
    pub fn handle_request_text(&self, body: &str) -> String {
        if serde_json::from_str::<IgnoredAny>(body).is_err() {
            tracing::debug!("request body is not valid JSON");
            return encode(&JsonRpcReply::failure(
                &RpcError::Parse(body.to_string()),
                Value::Null,
            ));
        }

        if body.trim_start().starts_with('[') {
            let items: Vec<Box<RawValue>> = match serde_json::from_str(body) {
                Ok(items) => items,
                Err(e) => return encode(&invalid_request(e.to_string(), Value::Null)),
            };
            if items.is_empty() {
                return encode(&invalid_request("Invalid Request object".into(), Value::Null));
            }
            let replies: Vec<JsonRpcReply> =
                items.iter().map(|item| self.handle_one(item.get())).collect();
            return encode(&replies);
        }

        encode(&self.handle_one(body))
    }

    fn handle_one(&self, text: &str) -> JsonRpcReply {
        match serde_json::from_str::<JsonRpcRequest>(text) {
            Ok(request) => self.call(request),
            Err(e) => invalid_request(e.to_string(), request_id(text)),
        }
    }
}

/// Just the `id` of a request object that failed to decode as a whole.
#[derive(Deserialize)]
struct RequestId {
    #[serde(default)]
    id: Value,
}

fn request_id(text: &str) -> Value {
    serde_json::from_str::<RequestId>(text)
        .map(|r| r.id)
        .unwrap_or(Value::Null)
}

fn invalid_request(detail: String, id: Value) -> JsonRpcReply {
    tracing::debug!(detail = %detail, "invalid request object");
    JsonRpcReply::failure(
        &RpcError::InvalidRequest("Invalid Request object".into()),
        id,
    )
}

fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to encode reply");
        r#"{"result":null,"error":{"code":-32603,"message":"Internal error"},"id":null}"#
            .to_string()
    })
}

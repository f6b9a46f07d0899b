//! Request dispatch: lookup, warm-up gate, binding, invocation.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::binding::bind_arguments;
use crate::error::RpcError;
use crate::request::Request;
use crate::table::{CommandTable, Invocation};
use crate::warmup::{WarmupState, DEFAULT_WARMUP_ALLOWED};

/// Executes requests against a command table.
///
/// Shared across callers behind an `Arc`; nothing in here is mutated after
/// construction except the warm-up flag.
pub struct Dispatcher<C> {
    table: CommandTable<C>,
    warmup: Arc<WarmupState>,
    warmup_allowed: HashSet<String>,
}

impl<C> Dispatcher<C> {
    pub fn new(table: CommandTable<C>, warmup: Arc<WarmupState>) -> Self {
        Self {
            table,
            warmup,
            warmup_allowed: DEFAULT_WARMUP_ALLOWED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the set of methods served during warm-up.
    pub fn with_warmup_allowed<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warmup_allowed = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn table(&self) -> &CommandTable<C> {
        &self.table
    }

    pub fn warmup(&self) -> &Arc<WarmupState> {
        &self.warmup
    }

    /// Run one request.
    ///
    /// Binding either succeeds completely or fails before the handler runs.
    /// Handler failures come back as [`RpcError::Command`].
    pub fn execute(&self, context: &C, request: &Request) -> Result<Value, RpcError> {
        let method = request.method.as_str();
        let descriptor = self
            .table
            .get(method)
            .ok_or_else(|| RpcError::UnknownMethod(method.to_string()))?;

        if !self.warmup.is_ready() && !self.warmup_allowed.contains(method) {
            tracing::debug!(method = %method, "rejected during warm-up");
            return Err(RpcError::NotReady(self.warmup.status()));
        }

        let args = bind_arguments(&request.params, &descriptor.arg_names)?;
        tracing::debug!(method = %method, args = args.len(), "executing");

        let call = Invocation {
            method,
            context,
            table: &self.table,
        };
        descriptor.handler().invoke(&call, &args).map_err(|e| {
            if e.is_caller_error() {
                tracing::debug!(method = %method, code = e.code(), error = %e, "command failed");
            } else {
                tracing::warn!(method = %method, code = e.code(), error = %e, "command failed");
            }
            RpcError::Command {
                method: method.to_string(),
                source: Box::new(e),
            }
        })
    }
}

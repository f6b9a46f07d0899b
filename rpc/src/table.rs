//! Command registry.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RpcError;

/// What a handler sees of the call it serves.
pub struct Invocation<'a, C> {
    pub method: &'a str,
    pub context: &'a C,
    pub table: &'a CommandTable<C>,
}

impl<C> Invocation<'_, C> {
    /// Usage line of the running command.
    pub fn usage(&self, required: usize) -> String {
        self.table
            .get(self.method)
            .map(|d| d.usage(required))
            .unwrap_or_else(|| self.method.to_string())
    }
}

/// Executes one command against its bound argument list.
pub trait Handler<C>: Send + Sync {
    fn invoke(&self, call: &Invocation<'_, C>, args: &[Value]) -> Result<Value, RpcError>;
}

impl<C, F> Handler<C> for F
where
    F: Fn(&Invocation<'_, C>, &[Value]) -> Result<Value, RpcError> + Send + Sync,
{
    fn invoke(&self, call: &Invocation<'_, C>, args: &[Value]) -> Result<Value, RpcError> {
        self(call, args)
    }
}

/// A registered command.
pub struct CommandDescriptor<C> {
    pub category: String,
    pub name: String,
    pub arg_names: Vec<String>,
    pub unique_id: u64,
    handler: Arc<dyn Handler<C>>,
}

impl<C> CommandDescriptor<C> {
    pub fn new<F>(category: &str, name: &str, arg_names: &[&str], handler: F) -> Self
    where
        F: Fn(&Invocation<'_, C>, &[Value]) -> Result<Value, RpcError> + Send + Sync + 'static,
    {
        Self::with_handler(category, name, arg_names, Arc::new(handler))
    }

    pub fn with_handler(
        category: &str,
        name: &str,
        arg_names: &[&str],
        handler: Arc<dyn Handler<C>>,
    ) -> Self {
        Self {
            category: category.to_string(),
            name: name.to_string(),
            arg_names: arg_names.iter().map(|s| s.to_string()).collect(),
            unique_id: 0,
            handler,
        }
    }

    pub fn with_unique_id(mut self, unique_id: u64) -> Self {
        self.unique_id = unique_id;
        self
    }

    pub fn handler(&self) -> &dyn Handler<C> {
        self.handler.as_ref()
    }

    /// `name arg1 arg2 ( opt1 opt2 )`, with arguments past `required` in
    /// parentheses.
    pub fn usage(&self, required: usize) -> String {
        let mut line = self.name.clone();
        for (i, arg) in self.arg_names.iter().enumerate() {
            if i == required {
                line.push_str(" (");
            }
            line.push(' ');
            line.push_str(arg);
        }
        if required < self.arg_names.len() {
            line.push_str(" )");
        }
        line
    }
}

impl<C> Clone for CommandDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            category: self.category.clone(),
            name: self.name.clone(),
            arg_names: self.arg_names.clone(),
            unique_id: self.unique_id,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<C> fmt::Debug for CommandDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("arg_names", &self.arg_names)
            .field("unique_id", &self.unique_id)
            .finish_non_exhaustive()
    }
}

/// Name to descriptor map. Filled at startup, read-only afterwards.
pub struct CommandTable<C> {
    commands: BTreeMap<String, CommandDescriptor<C>>,
}

impl<C> Default for CommandTable<C> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<C> CommandTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: CommandDescriptor<C>) -> Result<(), RpcError> {
        if self.commands.contains_key(&descriptor.name) {
            return Err(RpcError::DuplicateCommand(descriptor.name));
        }
        tracing::trace!(method = %descriptor.name, category = %descriptor.category, "command registered");
        self.commands.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor<C>> {
        self.commands.get(name)
    }

    /// Commands ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor<C>> {
        self.commands.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

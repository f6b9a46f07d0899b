use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::args::{check_arity, get};
use crate::context::NodeContext;
use crate::error::RpcError;
use crate::help::command_examples;
use crate::table::{CommandDescriptor, Invocation};

pub fn commands() -> Vec<CommandDescriptor<NodeContext>> {
    vec![
        CommandDescriptor::new("control", "help", &["command"], help),
        CommandDescriptor::new("control", "uptime", &[], uptime),
    ]
}

fn title(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn help(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 0, 1)?;

    if let Some(name) = get(args, 0) {
        let name = name
            .as_str()
            .ok_or_else(|| RpcError::Type("command must be a string".into()))?;
        let descriptor = call
            .table
            .get(name)
            .ok_or_else(|| RpcError::Misc(format!("help: unknown command: {name}")))?;
        let mut text = descriptor.usage(descriptor.arg_names.len());
        if let Some(examples) = command_examples(name) {
            text.push_str("\n\nExamples:\n");
            text.push_str(&examples);
        }
        return Ok(Value::String(text));
    }

    let mut by_category: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for descriptor in call.table.iter() {
        by_category
            .entry(descriptor.category.as_str())
            .or_default()
            .push(descriptor.usage(descriptor.arg_names.len()));
    }
    let sections: Vec<String> = by_category
        .into_iter()
        .map(|(category, lines)| format!("== {} ==\n{}", title(category), lines.join("\n")))
        .collect();
    Ok(Value::String(sections.join("\n\n")))
}

fn uptime(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 0, 0)?;
    let ctx = call.context;
    Ok(json!(ctx.started_at.elapsed_since(ctx.clock.now())))
}

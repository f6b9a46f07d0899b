//! Example invocations shown in command help.

use ember_types::NetworkId;
use serde_json::{json, Map, Value};

const CLI_NAME: &str = "ember-cli";

/// Wrap in single quotes; an embedded quote becomes `'''`.
fn shell_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            quoted.push_str("'''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

fn shell_quote_if_needed(text: &str) -> String {
    if text.contains([' ', '\'', '"']) {
        shell_quote(text)
    } else {
        text.to_string()
    }
}

/// `> ember-cli <method> <args>`
pub fn help_example_cli(method: &str, args: &str) -> String {
    if args.is_empty() {
        format!("> {CLI_NAME} {method}\n")
    } else {
        format!("> {CLI_NAME} {method} {args}\n")
    }
}

/// `> ember-cli -named <method> k=v ...`
///
/// Strings are written raw and every other value as compact JSON, so `true`
/// and `"true"` render the same here.
pub fn help_example_cli_named(method: &str, args: &[(&str, Value)]) -> String {
    let mut line = format!("> {CLI_NAME} -named {method}");
    for (name, value) in args {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        line.push(' ');
        line.push_str(name);
        line.push('=');
        line.push_str(&shell_quote_if_needed(&text));
    }
    line.push('\n');
    line
}

fn curl_line(method: &str, params: &str) -> String {
    format!(
        "> curl --user myusername --data-binary '{{\"jsonrpc\": \"1.0\", \"id\": \"curltest\", \
         \"method\": \"{method}\", \"params\": {params}}}' -H 'content-type: text/plain;' \
         http://127.0.0.1:{}/\n",
        NetworkId::Main.default_rpc_port()
    )
}

/// The curl line posting positional `args` (already JSON text, without the
/// surrounding brackets).
pub fn help_example_rpc(method: &str, args: &str) -> String {
    curl_line(method, &format!("[{args}]"))
}

/// The curl line posting `args` as a JSON object.
pub fn help_example_rpc_named(method: &str, args: &[(&str, Value)]) -> String {
    let params: Map<String, Value> = args
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    curl_line(method, &Value::Object(params).to_string())
}

/// The examples block printed under `help <method>`, for the built-in
/// commands.
pub fn command_examples(method: &str) -> Option<String> {
    let text = match method {
        "setban" => [
            help_example_cli("setban", "\"192.168.0.6\" \"add\" 86400"),
            help_example_cli("setban", "\"192.168.0.0/24\" \"add\""),
            help_example_cli_named(
                "setban",
                &[
                    ("subnet", json!("192.168.0.6")),
                    ("command", json!("add")),
                    ("bantime", json!(86400)),
                ],
            ),
            help_example_rpc("setban", "\"192.168.0.6\", \"add\", 86400"),
        ]
        .concat(),
        "listbanned" | "clearbanned" | "getnetworkinfo" | "uptime" => {
            help_example_cli(method, "") + &help_example_rpc(method, "")
        }
        "setnetworkactive" => {
            help_example_cli(method, "false") + &help_example_rpc(method, "false")
        }
        "getblockstats" => [
            help_example_cli(method, r#"1000 '["minfeerate","avgfeerate"]'"#),
            help_example_cli_named(
                method,
                &[
                    ("hash_or_height", json!(1000)),
                    ("stats", json!(["minfeerate", "avgfeerate"])),
                ],
            ),
            help_example_rpc(method, r#"1000, ["minfeerate","avgfeerate"]"#),
            help_example_rpc_named(
                method,
                &[
                    ("hash_or_height", json!(1000)),
                    ("stats", json!(["minfeerate", "avgfeerate"])),
                ],
            ),
        ]
        .concat(),
        "decoderawtransaction" | "sendrawtransaction" => {
            help_example_cli(method, "\"hexstring\"") + &help_example_rpc(method, "\"hexstring\"")
        }
        "settxfee" => help_example_cli(method, "0.00001") + &help_example_rpc(method, "0.00001"),
        "help" => help_example_cli(method, "\"setban\"") + &help_example_rpc(method, "\"setban\""),
        _ => return None,
    };
    Some(text)
}

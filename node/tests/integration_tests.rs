//! Integration tests driving a whole node: real ban list, peer registry,
//! block index, transaction codec and the JSON ban file, with commands
//! issued the way `ember-daemon call` issues them.

use std::net::SocketAddr;
use std::sync::Arc;

use ember_network::{BanStore, MemoryBanStore};
use ember_node::{EmberNode, JsonBanStore, NodeConfig};
use ember_nullables::NullClock;
use ember_rpc::{convert_values, BlockSummary, PeerConnections, Request, RpcError, TxFeeSample};
use ember_types::Amount;
use serde_json::{json, Value};

const RAW_TX: &str = "010000001209a35e0150afd8cc27e9f6bdfdda98bdcb5cf9ffe82b479bb969e908ff0e2357ecd765c00100000048473044022077a33181fed749626ba02d41db813f53e61be4ad0b8d856fecda5977932559300220260106f50d83b82368192ae4ac4c3697951449bff18d266e25356a6d91e97de701ffffffff0300000000000000000008287e010000000023210327f1f1fc8fbd47411ab995879dbdc9f6db8f41a762ee86d028a0ca063e36b175acc82b7e010000000023210327f1f1fc8fbd47411ab995879dbdc9f6db8f41a762ee86d028a0ca063e36b175ac00000000";
const RAW_TXID: &str = "c2d9ce2eae3d3d49dd824e42a95ae0bb4dd0650e2dff76b7e10ad37d77d7ae67";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn started_node(clock: Arc<NullClock>, store: Arc<dyn BanStore>) -> EmberNode {
    let node = EmberNode::with_parts(NodeConfig::default(), clock, store).expect("node");
    node.start().expect("start");
    node
}

fn memory_node() -> (EmberNode, Arc<NullClock>) {
    let clock = Arc::new(NullClock::new(1_600_000_000));
    let node = started_node(clock.clone(), Arc::new(MemoryBanStore::new()));
    (node, clock)
}

fn call_rpc(node: &EmberNode, line: &str) -> Result<Value, RpcError> {
    let mut words = line.split_whitespace().map(String::from);
    let method = words.next().expect("method");
    let words: Vec<String> = words.collect();
    let params = convert_values(&method, &words)?;
    node.execute(&Request::new(method, params))
}

fn peer(text: &str) -> SocketAddr {
    text.parse().expect("socket address")
}

// ---------------------------------------------------------------------------
// Raw transactions
// ---------------------------------------------------------------------------

#[test]
fn rawparams() {
    let (node, _) = memory_node();

    assert!(call_rpc(&node, "decoderawtransaction").is_err());
    assert!(call_rpc(&node, "decoderawtransaction null").is_err());
    assert_eq!(
        call_rpc(&node, "decoderawtransaction DEADBEEF").unwrap_err().code(),
        -22
    );

    let r = call_rpc(&node, &format!("decoderawtransaction {RAW_TX}")).unwrap();
    assert_eq!(r["size"], json!(224));
    assert_eq!(r["version"], json!(1));
    assert_eq!(r["locktime"], json!(0));
    assert_eq!(r["txid"], json!(RAW_TXID));
    assert!(call_rpc(&node, &format!("decoderawtransaction {RAW_TX} extra")).is_err());
    assert!(call_rpc(&node, &format!("decoderawtransaction {RAW_TX} false")).is_ok());
    assert!(call_rpc(&node, &format!("decoderawtransaction {RAW_TX} false extra")).is_err());

    assert!(call_rpc(&node, "sendrawtransaction").is_err());
    assert!(call_rpc(&node, "sendrawtransaction null").is_err());
    assert!(call_rpc(&node, "sendrawtransaction DEADBEEF").is_err());
    assert!(call_rpc(&node, &format!("sendrawtransaction {RAW_TX} extra")).is_err());
    assert_eq!(node.codec().pending_relay(), 0);
}

#[test]
fn submitted_transactions_are_queued_for_relay() {
    let (node, _) = memory_node();
    let txid = call_rpc(&node, &format!("sendrawtransaction {RAW_TX}")).unwrap();
    assert_eq!(txid, json!(RAW_TXID));
    // resubmission returns the same id without queueing twice
    call_rpc(&node, &format!("sendrawtransaction {RAW_TX} 0.5")).unwrap();
    assert_eq!(node.codec().pending_relay(), 1);

    let queued = node.codec().take_relay_queue();
    assert_eq!(queued[0].0, RAW_TXID);
    assert_eq!(hex::encode(&queued[0].1), RAW_TX);
}

#[test]
fn sending_with_network_disabled() {
    let (node, _) = memory_node();
    call_rpc(&node, "setnetworkactive false").unwrap();
    let err = call_rpc(&node, &format!("sendrawtransaction {RAW_TX}")).unwrap_err();
    assert_eq!(err.code(), -9);
    assert!(call_rpc(&node, &format!("decoderawtransaction {RAW_TX}")).is_ok());
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

#[test]
fn togglenetwork() {
    let (node, _) = memory_node();
    node.connections().register(peer("10.0.0.1:9903")).unwrap();
    node.connections().register(peer("10.0.0.2:9903")).unwrap();

    let r = call_rpc(&node, "getnetworkinfo").unwrap();
    assert_eq!(r["networkactive"], json!(true));
    assert_eq!(r["connections"], json!(2));

    call_rpc(&node, "setnetworkactive false").unwrap();
    let r = call_rpc(&node, "getnetworkinfo").unwrap();
    assert_eq!(r["connections"], json!(0));
    assert_eq!(r["networkactive"], json!(false));
    assert!(node.connections().register(peer("10.0.0.3:9903")).is_err());

    call_rpc(&node, "setnetworkactive true").unwrap();
    let r = call_rpc(&node, "getnetworkinfo").unwrap();
    assert_eq!(r["networkactive"], json!(true));
}

#[test]
fn network_starts_inactive_when_configured() {
    let config = NodeConfig {
        network_active: false,
        ..NodeConfig::default()
    };
    let node = EmberNode::with_parts(
        config,
        Arc::new(NullClock::new(0)),
        Arc::new(MemoryBanStore::new()),
    )
    .unwrap();
    node.start().unwrap();
    assert!(!node.connections().is_network_active());
    assert_eq!(call_rpc(&node, "getnetworkinfo").unwrap()["networkactive"], json!(false));
}

#[test]
fn setban_disconnects_and_refuses_peers() {
    let (node, _) = memory_node();
    node.connections().register(peer("192.168.1.5:9903")).unwrap();
    node.connections().register(peer("[2001:db8::7]:9903")).unwrap();

    call_rpc(&node, "setban 192.168.0.0/16 add").unwrap();
    assert_eq!(node.connections().len(), 1);
    assert!(node.connections().register(peer("192.168.200.1:9903")).is_err());

    call_rpc(&node, "setban 192.168.0.0/16 remove").unwrap();
    assert!(node.connections().register(peer("192.168.200.1:9903")).is_ok());
}

#[test]
fn setban_default_length_follows_config() {
    let config = NodeConfig {
        default_ban_time_secs: 0,
        ..NodeConfig::default()
    };
    let node = EmberNode::with_parts(
        config,
        Arc::new(NullClock::new(500)),
        Arc::new(MemoryBanStore::new()),
    )
    .unwrap();
    node.start().unwrap();
    call_rpc(&node, "setban 8.8.8.8 add").unwrap();
    let listed = call_rpc(&node, "listbanned").unwrap();
    assert_eq!(listed[0]["address"], json!("8.8.8.8/32"));
    assert_eq!(listed[0]["banned_until"], Value::Null);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn bans_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = NodeConfig {
        data_dir: dir.path().to_path_buf(),
        ..NodeConfig::default()
    };
    let clock = Arc::new(NullClock::new(1_000));

    let first = EmberNode::with_parts(
        config.clone(),
        clock.clone(),
        Arc::new(JsonBanStore::new(config.ban_file_path())),
    )
    .unwrap();
    first.start().unwrap();
    call_rpc(&first, "setban 127.0.0.0/24 add 200").unwrap();
    call_rpc(&first, "setban 10.0.0.1 add 5").unwrap();
    first.stop().unwrap();
    assert!(config.ban_file_path().exists());

    clock.advance(10);
    let second = EmberNode::with_parts(
        config.clone(),
        clock.clone(),
        Arc::new(JsonBanStore::new(config.ban_file_path())),
    )
    .unwrap();
    second.start().unwrap();
    let listed = call_rpc(&second, "listbanned").unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["address"], json!("127.0.0.0/24"));
    assert_eq!(listed[0]["ban_created"], json!(1_000));
    assert_eq!(listed[0]["time_remaining"], json!(190));

    // The expired host ban came back with the file and still blocks.
    let err = call_rpc(&second, "setban 10.0.0.1 add").unwrap_err();
    assert_eq!(err.code(), -23);
    call_rpc(&second, "setban 10.0.0.1 remove").unwrap();
    call_rpc(&second, "setban 10.0.0.1 add").unwrap();
}

#[test]
fn periodic_save_keeps_expired_bans_blocking() {
    let (node, clock) = memory_node();
    call_rpc(&node, "setban 127.0.0.0/24 add 200").unwrap();
    clock.advance(200);
    assert!(call_rpc(&node, "listbanned").unwrap().as_array().unwrap().is_empty());

    node.persist_bans().unwrap();
    let err = call_rpc(&node, "setban 127.0.0.1 add").unwrap_err();
    assert_eq!(err.to_string(), "Error: IP/Subnet already banned");
    assert_eq!(node.banlist().len(), 1);

    call_rpc(&node, "clearbanned").unwrap();
    call_rpc(&node, "setban 127.0.0.1 add").unwrap();
}

#[test]
fn corrupt_ban_file_fails_start_and_keeps_warmup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("banlist.json");
    std::fs::write(&path, "[]garbage").unwrap();

    let node = EmberNode::with_parts(
        NodeConfig::default(),
        Arc::new(NullClock::new(0)),
        Arc::new(JsonBanStore::new(&path)),
    )
    .unwrap();
    assert!(node.start().is_err());
    assert!(!node.warmup().is_ready());
    assert_eq!(node.warmup().status(), "Loading banlist...");

    let err = call_rpc(&node, "listbanned").unwrap_err();
    assert_eq!(err.code(), -28);
    assert_eq!(err.to_string(), "Loading banlist...");
}

// ---------------------------------------------------------------------------
// Chain and fees
// ---------------------------------------------------------------------------

#[test]
fn block_stats_from_local_chain() {
    let (node, _) = memory_node();
    assert_eq!(call_rpc(&node, "getblockstats 0").unwrap_err().code(), -5);

    node.chain().push(BlockSummary {
        hash: "00".repeat(32),
        height: 0,
        time: 1_600_000_000,
        transactions: Vec::new(),
    });
    node.chain().push(BlockSummary {
        hash: "ab".repeat(32),
        height: 0,
        time: 1_600_000_060,
        transactions: vec![
            TxFeeSample { fee: Amount::from_units(100), weight: 400 },
            TxFeeSample { fee: Amount::from_units(900), weight: 400 },
        ],
    });

    let stats = call_rpc(&node, "getblockstats 1").unwrap();
    assert_eq!(stats["height"], json!(1));
    assert_eq!(stats["feerate_percentiles"], json!([1, 1, 1, 9, 9]));

    let empty = call_rpc(&node, "getblockstats 0 [\"feerate_percentiles\"]").unwrap();
    assert_eq!(empty, json!({"feerate_percentiles": [0, 0, 0, 0, 0]}));

    let by_hash = call_rpc(&node, &format!("getblockstats {}", "AB".repeat(32))).unwrap();
    assert_eq!(by_hash, stats);
    assert_eq!(call_rpc(&node, "getblockstats 2").unwrap_err().code(), -8);
}

#[test]
fn configured_fees_are_reported() {
    let config = NodeConfig {
        min_relay_fee: "0.5".into(),
        pay_tx_fee: "1".into(),
        ..NodeConfig::default()
    };
    let node = EmberNode::with_parts(
        config,
        Arc::new(NullClock::new(0)),
        Arc::new(MemoryBanStore::new()),
    )
    .unwrap();
    node.start().unwrap();

    let info = call_rpc(&node, "getnetworkinfo").unwrap();
    assert_eq!(info["relayfee"].to_string(), "0.500000");
    assert_eq!(info["paytxfee"].to_string(), "1.000000");
    assert_eq!(call_rpc(&node, "settxfee 0.25").unwrap_err().code(), -8);
}

// ---------------------------------------------------------------------------
// JSON-RPC envelope
// ---------------------------------------------------------------------------

#[test]
fn json_rpc_bodies() {
    let (node, clock) = memory_node();
    clock.advance(7);

    let reply: Value = serde_json::from_str(&node.handle_request_text(
        r#"{"jsonrpc":"1.0","id":"curltest","method":"uptime","params":[]}"#,
    ))
    .unwrap();
    assert_eq!(reply, json!({"result": 7, "error": null, "id": "curltest"}));

    let reply: Value = serde_json::from_str(&node.handle_request_text(
        r#"[{"id":1,"method":"setban","params":{"subnet":"1.2.3.4","command":"add"}},
            {"id":2,"method":"setban","params":["1.2.3.4","add"]}]"#,
    ))
    .unwrap();
    assert_eq!(reply[0]["error"], Value::Null);
    assert_eq!(reply[1]["error"]["code"], json!(-23));
    assert_eq!(reply[1]["error"]["message"], json!("Error: IP/Subnet already banned"));

    let reply: Value = serde_json::from_str(&node.handle_request_text("{")).unwrap();
    assert_eq!(reply["error"]["code"], json!(-32700));
}

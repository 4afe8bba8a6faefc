//! Command engine behaviour through the public API.
//!
//! Run with: cargo test --test dispatch

use std::thread;
use std::time::Duration;

use redmock::{args, Arg, CommandError, Dispatcher, Reply, DEFAULT_PASSWORD};

// ============================================================================
// HELPERS
// ============================================================================

fn session() -> Dispatcher {
    let mut d = Dispatcher::new(DEFAULT_PASSWORD);
    assert_eq!(d.dispatch("AUTH %s", &args![DEFAULT_PASSWORD]), Reply::ok());
    d
}

fn wire(parts: &[&str]) -> Vec<Vec<u8>> {
    parts.iter().map(|p| p.as_bytes().to_vec()).collect()
}

fn noauth() -> Reply {
    CommandError::AuthRequired.into()
}

// ============================================================================
// AUTH GATE
// ============================================================================

#[test]
fn test_every_store_command_needs_auth() {
    let mut d = Dispatcher::new(DEFAULT_PASSWORD);
    let calls: Vec<(&str, Vec<Arg>)> = vec![
        ("SET %s %s", args!["k", "v"]),
        ("GET %s", args!["k"]),
        ("EXISTS %s", args!["k"]),
        ("TTL %s", args!["k"]),
        ("INCR %s", args!["k"]),
        ("HSET %s %s %b", args!["h", "f", "v"]),
        ("HGETALL %s", args!["h"]),
        ("SADD %s %b", args!["s", "m"]),
        ("SMEMBERS %s", args!["s"]),
        ("LPUSH %s %b", args!["l", "a"]),
        ("LRANGE %s %d %d", args!["l", 0, -1]),
        ("PUBLISH %s %b", args!["c", "m"]),
        ("SUBSCRIBE %s %s", args!["c", "id"]),
        ("PING", vec![]),
    ];
    for (template, call_args) in &calls {
        assert_eq!(d.dispatch(template, call_args), noauth(), "{template}");
    }

    // Nothing was written while locked out.
    let db = d.db();
    assert!(!db.strings.contains_key("k"));
    assert!(!db.hashes.contains_key("h"));
    assert!(!db.sets.contains_key("s"));
    assert!(!db.lists.contains_key("l"));
    assert!(!db.channels.contains_channel("c"));
}

#[test]
fn test_auth_unlocks_then_bad_password_relocks() {
    let mut d = Dispatcher::new(DEFAULT_PASSWORD);
    assert_eq!(d.dispatch("SET", &args!["k", "v"]), noauth());

    assert_eq!(d.dispatch("AUTH", &args!["hunter2"]), Reply::ok());
    assert_eq!(d.dispatch("SET", &args!["k", "v"]), Reply::ok());
    assert_eq!(d.dispatch("GET", &args!["k"]), Reply::bulk("v"));

    assert!(d.dispatch("AUTH", &args!["badpass"]).is_error());
    assert_eq!(d.dispatch("GET", &args!["k"]), noauth());
}

#[test]
fn test_sessions_are_independent() {
    let mut a = session();
    let mut b = Dispatcher::new("other");
    a.dispatch("SET", &args!["k", "v"]);

    assert_eq!(b.dispatch("AUTH", &args!["hunter2"]), Reply::Error("ERR invalid password".into()));
    assert_eq!(b.dispatch("AUTH", &args!["other"]), Reply::ok());
    assert_eq!(b.dispatch("GET", &args!["k"]), Reply::Nil);
}

// ============================================================================
// LAZY EXPIRY
// ============================================================================

#[test]
fn test_ttl_is_idempotent_on_permanent_key() {
    let mut d = session();
    d.dispatch("SET", &args!["k", "v"]);
    assert_eq!(d.dispatch("TTL", &args!["k"]), Reply::Integer(-1));
    assert_eq!(d.dispatch("TTL", &args!["k"]), Reply::Integer(-1));
}

#[test]
fn test_ttl_evicts_expired_key() {
    let mut d = session();
    d.dispatch("SETEX %s %d %s", &args!["k", 1, "v"]);
    assert_eq!(d.dispatch("EXISTS", &args!["k"]), Reply::Integer(1));

    thread::sleep(Duration::from_millis(1100));

    assert!(d.db().strings.contains_key("k"));
    assert_eq!(d.dispatch("TTL", &args!["k"]), Reply::Integer(-2));
    assert!(!d.db().strings.contains_key("k"));
    assert_eq!(d.dispatch("EXISTS", &args!["k"]), Reply::Integer(0));
    assert_eq!(d.dispatch("GET", &args!["k"]), Reply::Nil);
}

#[test]
fn test_expire_on_expired_key_returns_zero() {
    let mut d = session();
    d.dispatch("SETEX", &args!["k", -5, "v"]);
    assert_eq!(d.dispatch("EXPIRE", &args!["k", 100]), Reply::Integer(0));
    assert_eq!(d.dispatch("TTL", &args!["k"]), Reply::Integer(-2));
}

#[test]
fn test_set_clears_expiry() {
    let mut d = session();
    d.dispatch("SETEX", &args!["k", 100, "v"]);
    d.dispatch("SET", &args!["k", "w"]);
    assert_eq!(d.dispatch("TTL", &args!["k"]), Reply::Integer(-1));
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_counter_scenario() {
    let mut d = session();
    assert_eq!(d.dispatch("SET %s %s", &args!["count", "10"]), Reply::ok());
    assert_eq!(d.dispatch("INCR %s", &args!["count"]), Reply::Integer(11));
    assert_eq!(d.dispatch("INCRBY %s %d", &args!["count", 5]), Reply::Integer(16));
    assert_eq!(d.dispatch("APPEND %s %b", &args!["count", "XYZ"]), Reply::Integer(5));
    assert_eq!(d.dispatch("STRLEN %s", &args!["count"]), Reply::Integer(5));
}

#[test]
fn test_hash_field_count() {
    let mut d = session();
    d.dispatch("HSET", &args!["h", "f1", "v1"]);
    d.dispatch("HDEL", &args!["h", "f1"]);
    assert_eq!(d.dispatch("HEXISTS", &args!["h", "f1"]), Reply::Integer(0));
    assert_eq!(d.dispatch("HLEN", &args!["h"]), Reply::Integer(0));
    assert!(!d.db().hashes.contains_key("h"));
    assert_eq!(d.dispatch("HGETALL", &args!["h"]), Reply::Nil);
}

#[test]
fn test_set_scenario() {
    let mut d = session();
    assert_eq!(d.dispatch("SADD", &args!["myset", "four"]), Reply::Integer(1));
    assert_eq!(d.dispatch("SADD", &args!["myset", "four"]), Reply::Integer(0));
    assert_eq!(d.dispatch("SREM", &args!["myset", "four"]), Reply::Integer(1));
    assert_eq!(d.dispatch("SREM", &args!["myset", "four"]), Reply::Integer(0));
}

#[test]
fn test_list_scenario() {
    let mut d = session();
    d.dispatch("LPUSH", &args!["l", "a"]);
    d.dispatch("RPUSH", &args!["l", "b"]);
    assert_eq!(d.dispatch("LRANGE", &args!["l", 0, -1]), Reply::bulk_array(["a", "b"]));
}

#[test]
fn test_stores_do_not_share_keys() {
    let mut d = session();
    d.dispatch("SET", &args!["k", "v"]);
    d.dispatch("RPUSH", &args!["k", "item"]);
    assert_eq!(d.dispatch("GET", &args!["k"]), Reply::bulk("v"));
    assert_eq!(d.dispatch("LLEN", &args!["k"]), Reply::Integer(1));
}

// ============================================================================
// DISPATCH ERRORS
// ============================================================================

#[test]
fn test_unknown_command_is_a_reply() {
    let mut d = session();
    assert_eq!(
        d.dispatch("FLUSHALL", &[]),
        Reply::Error("ERR unknown command 'FLUSHALL'".into())
    );
    // The engine keeps working afterwards.
    assert_eq!(d.dispatch("PING", &[]), Reply::pong());
}

#[test]
fn test_coercion_failures_are_replies() {
    let mut d = session();
    assert_eq!(
        d.dispatch("SETEX %s %d %s", &args!["k", "ten", "v"]),
        Reply::Error("ERR argument 2 is not a valid integer".into())
    );
    assert_eq!(
        d.dispatch("GET %s", &args![7]),
        Reply::Error("ERR argument 1 is not a valid string".into())
    );
    assert!(d.dispatch("GET", &args!["a", "b"]).is_error());
    assert!(d.dispatch("SETEX %s %d %s", &args!["k", 1]).is_error());
}

#[test]
fn test_wire_execute_binary_and_case() {
    let mut d = session();
    let mut set = wire(&["set", "blob"]);
    set.push(vec![0x00, 0xc3, 0x28]);
    assert_eq!(d.execute(&set), Reply::ok());
    assert_eq!(d.execute(&wire(&["Get", "blob"])), Reply::bulk(vec![0x00, 0xc3, 0x28]));
    assert_eq!(d.execute(&wire(&["incrby", "n", "12"])), Reply::Integer(12));
    assert_eq!(
        d.execute(&wire(&["INCRBY", "n", "x"])),
        Reply::Error("ERR argument 2 is not a valid integer".into())
    );
}

#[test]
fn test_registry_lists_sorted_signatures() {
    let d = Dispatcher::default();
    let signatures = d.registry().signatures();
    let mut sorted = signatures.clone();
    sorted.sort();
    assert_eq!(signatures, sorted);
    assert!(signatures.contains(&"SET %s %s".to_string()));
    assert!(signatures.contains(&"SET %s %b".to_string()));
    assert!(signatures.contains(&"SETEX %s %d %b".to_string()));
}

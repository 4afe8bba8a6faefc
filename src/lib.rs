//! Redmock - in-memory Redis test double
//!
//! A RESP codec, an owned reply model, and a command engine that coerces
//! loosely typed arguments into typed handler calls against lazily expiring
//! in-memory stores.
//!
//! # Example
//!
//! ```
//! use redmock::{args, Dispatcher, Reply};
//!
//! let mut redis = Dispatcher::new("hunter2");
//! assert!(redis.dispatch("GET %s", &args!["k"]).is_error());
//!
//! redis.dispatch("AUTH %s", &args!["hunter2"]);
//! redis.dispatch("SETEX %s %d %s", &args!["k", 60, "v"]);
//! assert_eq!(redis.dispatch("GET %s", &args!["k"]), Reply::bulk("v"));
//! ```

pub mod client;
pub mod command;
pub mod config;
pub mod db;
pub mod error;
pub mod resp;
pub mod server;
pub mod store;

pub use client::Client;
pub use command::{Arg, ArgKind, Dispatcher, Registry, Signature};
pub use config::Config;
pub use db::{Db, DEFAULT_PASSWORD};
pub use error::{ClientError, CommandError, ProtocolError, Result};
pub use resp::Reply;
pub use server::Server;

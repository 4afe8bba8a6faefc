use clap::Parser;

use crate::db::DEFAULT_PASSWORD;
use crate::resp::DEFAULT_MAX_FRAME_BYTES;

/// Runtime settings for the `redmock` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "redmock")]
#[command(about = "In-memory Redis test double")]
pub struct Config {
    /// Listen address
    #[arg(short, long, env = "REDMOCK_ADDR", default_value = "127.0.0.1:6767")]
    pub addr: String,

    /// Password accepted by AUTH
    #[arg(short, long, env = "REDMOCK_PASSWORD", default_value = DEFAULT_PASSWORD)]
    pub password: String,

    /// Largest request frame buffered before the connection is dropped
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_BYTES)]
    pub max_frame_bytes: usize,
}

//! Async client speaking RESP over TCP.
//!
//! ```no_run
//! # async fn demo() -> Result<(), redmock::ClientError> {
//! let mut client = redmock::Client::connect("127.0.0.1:6767").await?;
//! client.auth("hunter2").await?;
//! client.set("greeting", "hello").await?;
//! let reply = client.get("greeting").await?;
//! assert_eq!(reply.as_bytes(), Some(&b"hello"[..]));
//! # Ok(())
//! # }
//! ```

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::ClientError;
use crate::resp::{encode_command, FrameReader, Reply};

type Result<T> = std::result::Result<T, ClientError>;

/// One connection. Each call writes a single command frame and waits for
/// exactly one reply frame; server-side failures come back as
/// [`Reply::Error`], not as `Err`.
pub struct Client {
    reader: FrameReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: FrameReader::new(reader),
            writer,
        })
    }

    /// Send an arbitrary command; `parts[0]` is the command name.
    pub async fn command<T: AsRef<[u8]>>(&mut self, parts: &[T]) -> Result<Reply> {
        self.writer.write_all(&encode_command(parts)).await?;
        self.writer.flush().await?;
        self.reader.read_frame().await?.ok_or(ClientError::Closed)
    }

    pub async fn auth(&mut self, password: &str) -> Result<Reply> {
        self.command(&["AUTH", password]).await
    }

    pub async fn ping(&mut self) -> Result<Reply> {
        self.command(&["PING"]).await
    }

    pub async fn quit(&mut self) -> Result<Reply> {
        self.command(&["QUIT"]).await
    }

    pub async fn set(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<Reply> {
        self.command(&[&b"SET"[..], key.as_bytes(), value.as_ref()]).await
    }

    pub async fn get(&mut self, key: &str) -> Result<Reply> {
        self.command(&["GET", key]).await
    }

    pub async fn incr(&mut self, key: &str) -> Result<Reply> {
        self.command(&["INCR", key]).await
    }

    pub async fn decr(&mut self, key: &str) -> Result<Reply> {
        self.command(&["DECR", key]).await
    }

    pub async fn incr_by(&mut self, key: &str, delta: i64) -> Result<Reply> {
        let delta = delta.to_string();
        self.command(&["INCRBY", key, delta.as_str()]).await
    }

    pub async fn decr_by(&mut self, key: &str, delta: i64) -> Result<Reply> {
        let delta = delta.to_string();
        self.command(&["DECRBY", key, delta.as_str()]).await
    }

    pub async fn append(&mut self, key: &str, suffix: impl AsRef<[u8]>) -> Result<Reply> {
        self.command(&[&b"APPEND"[..], key.as_bytes(), suffix.as_ref()]).await
    }

    pub async fn strlen(&mut self, key: &str) -> Result<Reply> {
        self.command(&["STRLEN", key]).await
    }

    pub async fn get_set(&mut self, key: &str, value: impl AsRef<[u8]>) -> Result<Reply> {
        self.command(&[&b"GETSET"[..], key.as_bytes(), value.as_ref()]).await
    }

    pub async fn mset<K, V>(&mut self, pairs: &[(K, V)]) -> Result<Reply>
    where
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + pairs.len() * 2);
        parts.push(b"MSET");
        for (key, value) in pairs {
            parts.push(key.as_ref().as_bytes());
            parts.push(value.as_ref());
        }
        self.command(&parts).await
    }

    pub async fn mget<K: AsRef<str>>(&mut self, keys: &[K]) -> Result<Reply> {
        let mut parts: Vec<&[u8]> = Vec::with_capacity(1 + keys.len());
        parts.push(b"MGET");
        parts.extend(keys.iter().map(|k| k.as_ref().as_bytes()));
        self.command(&parts).await
    }

    pub async fn hset(&mut self, key: &str, field: &str, value: impl AsRef<[u8]>) -> Result<Reply> {
        self.command(&[&b"HSET"[..], key.as_bytes(), field.as_bytes(), value.as_ref()])
            .await
    }

    pub async fn hget(&mut self, key: &str, field: &str) -> Result<Reply> {
        self.command(&["HGET", key, field]).await
    }

    pub async fn hgetall(&mut self, key: &str) -> Result<Reply> {
        self.command(&["HGETALL", key]).await
    }
}

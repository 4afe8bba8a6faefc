use crate::error::CommandError;

/// A decoded or constructed reply.
///
/// Covers every RESP2 and RESP3 reply kind. Container variants own their
/// children, so a reply tree is dropped as a whole with no manual cleanup.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nil,
    Status(String),
    Error(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    BulkString(Vec<u8>),
    /// RESP3 verbatim string with its three-byte format tag (`txt`, `mkd`, ...).
    Verbatim {
        format: [u8; 3],
        data: Vec<u8>,
    },
    /// RESP3 big number, kept as its decimal text.
    BigNumber(String),
    Array(Vec<Reply>),
    Set(Vec<Reply>),
    Push(Vec<Reply>),
    Map(Vec<(Reply, Reply)>),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    pub fn pong() -> Self {
        Reply::Status("PONG".to_string())
    }

    pub fn nil() -> Self {
        Reply::Nil
    }

    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    /// Generic `ERR`-prefixed error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(format!("ERR {}", msg.into()))
    }

    pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
        Reply::BulkString(data.into())
    }

    pub fn array(items: Vec<Reply>) -> Self {
        Reply::Array(items)
    }

    /// Array of bulk strings.
    pub fn bulk_array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        Reply::Array(items.into_iter().map(Reply::bulk).collect())
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Payload of any string-like reply.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::BulkString(data) => Some(data),
            Reply::Verbatim { data, .. } => Some(data),
            Reply::Status(s) | Reply::Error(s) | Reply::BigNumber(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Child elements of an array, set or push reply.
    pub fn as_elements(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(items) | Reply::Set(items) | Reply::Push(items) => Some(items),
            _ => None,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf);
        buf
    }

    /// Append the wire form of this reply to `buf`.
    ///
    /// `Nil` is written as the RESP2 null bulk string so RESP2 clients can read it.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Nil => buf.extend_from_slice(b"$-1\r\n"),
            Reply::Status(s) => line(buf, b'+', s.as_bytes()),
            Reply::Error(s) => line(buf, b'-', s.as_bytes()),
            Reply::Integer(n) => line(buf, b':', n.to_string().as_bytes()),
            Reply::Double(d) => line(buf, b',', format_double(*d).as_bytes()),
            Reply::Boolean(b) => line(buf, b'#', if *b { b"t" } else { b"f" }),
            Reply::BigNumber(s) => line(buf, b'(', s.as_bytes()),
            Reply::BulkString(data) => {
                line(buf, b'$', data.len().to_string().as_bytes());
                buf.extend_from_slice(data);
                buf.extend_from_slice(b"\r\n");
            }
            Reply::Verbatim { format, data } => {
                line(buf, b'=', (data.len() + 4).to_string().as_bytes());
                buf.extend_from_slice(format);
                buf.push(b':');
                buf.extend_from_slice(data);
                buf.extend_from_slice(b"\r\n");
            }
            Reply::Array(items) => aggregate(buf, b'*', items),
            Reply::Set(items) => aggregate(buf, b'~', items),
            Reply::Push(items) => aggregate(buf, b'>', items),
            Reply::Map(pairs) => {
                line(buf, b'%', pairs.len().to_string().as_bytes());
                for (key, value) in pairs {
                    key.encode_into(buf);
                    value.encode_into(buf);
                }
            }
        }
    }
}

fn line(buf: &mut Vec<u8>, marker: u8, body: &[u8]) {
    buf.push(marker);
    buf.extend_from_slice(body);
    buf.extend_from_slice(b"\r\n");
}

fn aggregate(buf: &mut Vec<u8>, marker: u8, items: &[Reply]) {
    line(buf, marker, items.len().to_string().as_bytes());
    for item in items {
        item.encode_into(buf);
    }
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "nan".to_string()
    } else if d == f64::INFINITY {
        "inf".to_string()
    } else if d == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        d.to_string()
    }
}

impl From<CommandError> for Reply {
    fn from(err: CommandError) -> Self {
        Reply::Error(err.to_string())
    }
}

impl From<i64> for Reply {
    fn from(n: i64) -> Self {
        Reply::Integer(n)
    }
}

impl From<bool> for Reply {
    fn from(b: bool) -> Self {
        Reply::Integer(if b { 1 } else { 0 })
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::BulkString(s.into_bytes())
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::BulkString(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Reply {
    fn from(bytes: Vec<u8>) -> Self {
        Reply::BulkString(bytes)
    }
}

impl From<Option<Vec<u8>>> for Reply {
    fn from(opt: Option<Vec<u8>>) -> Self {
        match opt {
            Some(bytes) => Reply::BulkString(bytes),
            None => Reply::Nil,
        }
    }
}

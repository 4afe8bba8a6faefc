//! RESP wire codec.
//!
//! Requests are always encoded as an array of bulk strings. Replies are
//! decoded from an in-memory buffer one frame at a time; the decoder never
//! performs I/O and reports `ProtocolError::Incomplete` when the buffer
//! ends before the frame does.

use crate::error::ProtocolError;
use crate::resp::Reply;

type Result<T> = std::result::Result<T, ProtocolError>;

/// Deepest aggregate nesting accepted before the frame is rejected.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Encode a command (name first, then arguments) as `*N` followed by N bulk strings.
pub fn encode_command<T: AsRef<[u8]>>(parts: &[T]) -> Vec<u8> {
    let body: usize = parts.iter().map(|p| p.as_ref().len() + 16).sum();
    let mut buf = Vec::with_capacity(16 + body);
    buf.push(b'*');
    buf.extend_from_slice(parts.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for part in parts {
        let part = part.as_ref();
        buf.push(b'$');
        buf.extend_from_slice(part.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(part);
        buf.extend_from_slice(b"\r\n");
    }
    buf
}

/// Decode one reply frame from the start of `buf`.
///
/// Returns the reply and the number of bytes it occupied.
pub fn decode(buf: &[u8]) -> Result<(Reply, usize)> {
    decode_at(buf, 0)
}

/// Decode one reply frame starting at `offset`.
///
/// The returned byte count is relative to `offset`.
pub fn decode_at(buf: &[u8], offset: usize) -> Result<(Reply, usize)> {
    let mut cursor = Cursor {
        buf,
        pos: offset,
        depth: 0,
    };
    let reply = cursor.frame()?;
    Ok((reply, cursor.pos - offset))
}

/// Finds where the first frame in a growing buffer ends without building it.
///
/// Progress is kept between calls, so each byte of an aggregate is looked at
/// once however many reads the frame arrives in. The buffer handed to
/// [`scan`](FrameScanner::scan) must only grow until a length is returned.
#[derive(Debug, Default)]
pub struct FrameScanner {
    scanned: usize,
    // Elements still owed by each open aggregate, innermost last.
    pending: Vec<usize>,
}

enum Token {
    Leaf,
    Open(usize),
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte length of the first complete frame in `buf`, or `None` when more
    /// bytes are needed. The scanner resets itself after a frame or an error.
    pub fn scan(&mut self, buf: &[u8]) -> Result<Option<usize>> {
        'outer: loop {
            let mut cursor = Cursor {
                buf,
                pos: self.scanned,
                depth: self.pending.len(),
            };
            let token = match cursor.token() {
                Ok(token) => token,
                Err(ProtocolError::Incomplete) => return Ok(None),
                Err(e) => {
                    self.reset();
                    return Err(e);
                }
            };
            self.scanned = cursor.pos;

            // An empty aggregate is complete as soon as its header is.
            if let Token::Open(count @ 1..) = token {
                if self.pending.len() >= MAX_NESTING_DEPTH {
                    self.reset();
                    return Err(ProtocolError::NestingTooDeep(MAX_NESTING_DEPTH));
                }
                self.pending.push(count);
                continue;
            }

            while let Some(left) = self.pending.last_mut() {
                *left -= 1;
                if *left > 0 {
                    continue 'outer;
                }
                self.pending.pop();
            }
            let len = self.scanned;
            self.reset();
            return Ok(Some(len));
        }
    }

    pub fn reset(&mut self) {
        self.scanned = 0;
        self.pending.clear();
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn frame(&mut self) -> Result<Reply> {
        let marker = *self.buf.get(self.pos).ok_or(ProtocolError::Incomplete)?;
        self.pos += 1;

        match marker {
            b'+' => Ok(Reply::Status(self.text()?)),
            b'-' => Ok(Reply::Error(self.text()?)),
            b':' => Ok(Reply::Integer(self.integer()?)),
            b'$' => match self.length()? {
                None => Ok(Reply::Nil),
                Some(len) => Ok(Reply::BulkString(self.body(len)?.to_vec())),
            },
            b'*' => match self.length()? {
                None => Ok(Reply::Nil),
                Some(count) => Ok(Reply::Array(self.elements(count)?)),
            },
            b'~' => {
                let count = self.length()?.ok_or(ProtocolError::InvalidLength)?;
                Ok(Reply::Set(self.elements(count)?))
            }
            b'>' => {
                let count = self.length()?.ok_or(ProtocolError::InvalidLength)?;
                Ok(Reply::Push(self.elements(count)?))
            }
            b'%' => {
                let count = self.length()?.ok_or(ProtocolError::InvalidLength)?;
                self.enter()?;
                let mut pairs = Vec::with_capacity(count.min(self.remaining() / 2));
                for _ in 0..count {
                    let key = self.frame()?;
                    let value = self.frame()?;
                    pairs.push((key, value));
                }
                self.depth -= 1;
                Ok(Reply::Map(pairs))
            }
            b'_' => {
                if !self.line()?.is_empty() {
                    return Err(ProtocolError::InvalidLength);
                }
                Ok(Reply::Nil)
            }
            b',' => {
                let text = std::str::from_utf8(self.line()?)
                    .map_err(|_| ProtocolError::InvalidDouble)?;
                text.parse::<f64>()
                    .map(Reply::Double)
                    .map_err(|_| ProtocolError::InvalidDouble)
            }
            b'#' => match self.line()? {
                b"t" => Ok(Reply::Boolean(true)),
                b"f" => Ok(Reply::Boolean(false)),
                _ => Err(ProtocolError::InvalidBoolean),
            },
            b'(' => {
                let text = self.text()?;
                let digits = text
                    .strip_prefix(|c: char| c == '-' || c == '+')
                    .unwrap_or(text.as_str());
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ProtocolError::InvalidInteger);
                }
                Ok(Reply::BigNumber(text))
            }
            b'!' => {
                let len = self.length()?.ok_or(ProtocolError::InvalidLength)?;
                let body = self.body(len)?;
                Ok(Reply::Error(String::from_utf8_lossy(body).into_owned()))
            }
            b'=' => {
                let len = self.length()?.ok_or(ProtocolError::InvalidLength)?;
                let body = self.body(len)?;
                if body.len() < 4 || body[3] != b':' {
                    return Err(ProtocolError::InvalidVerbatim);
                }
                Ok(Reply::Verbatim {
                    format: [body[0], body[1], body[2]],
                    data: body[4..].to_vec(),
                })
            }
            other => Err(ProtocolError::UnknownMarker(other)),
        }
    }

    /// Frame the next element without building it. Aggregates report their
    /// element count and leave the cursor after their header.
    fn token(&mut self) -> Result<Token> {
        let marker = *self.buf.get(self.pos).ok_or(ProtocolError::Incomplete)?;
        self.pos += 1;

        match marker {
            b'*' => Ok(self.length()?.map_or(Token::Leaf, Token::Open)),
            b'~' | b'>' => self
                .length()?
                .map(Token::Open)
                .ok_or(ProtocolError::InvalidLength),
            b'%' => self
                .length()?
                .and_then(|count| count.checked_mul(2))
                .map(Token::Open)
                .ok_or(ProtocolError::InvalidLength),
            b'$' | b'!' | b'=' => {
                if let Some(len) = self.length()? {
                    self.body(len)?;
                }
                Ok(Token::Leaf)
            }
            b'+' | b'-' | b':' | b'_' | b',' | b'#' | b'(' => {
                self.line()?;
                Ok(Token::Leaf)
            }
            other => Err(ProtocolError::UnknownMarker(other)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ProtocolError::NestingTooDeep(MAX_NESTING_DEPTH));
        }
        self.depth += 1;
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Bytes up to the next CRLF; the cursor moves past the CRLF.
    fn line(&mut self) -> Result<&'a [u8]> {
        let rest = self.buf.get(self.pos..).ok_or(ProtocolError::Incomplete)?;
        let end = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .ok_or(ProtocolError::Incomplete)?;
        self.pos += end + 2;
        Ok(&rest[..end])
    }

    fn text(&mut self) -> Result<String> {
        let line = self.line()?;
        String::from_utf8(line.to_vec()).map_err(|_| ProtocolError::InvalidUtf8)
    }

    fn integer(&mut self) -> Result<i64> {
        let line = self.line()?;
        std::str::from_utf8(line)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(ProtocolError::InvalidInteger)
    }

    /// A declared length or count. `-1` is the null marker.
    fn length(&mut self) -> Result<Option<usize>> {
        let declared = self.integer().map_err(|e| match e {
            ProtocolError::InvalidInteger => ProtocolError::InvalidLength,
            other => other,
        })?;
        match declared {
            -1 => Ok(None),
            n if n < 0 => Err(ProtocolError::InvalidLength),
            n => usize::try_from(n)
                .map(Some)
                .map_err(|_| ProtocolError::InvalidLength),
        }
    }

    /// Exactly `len` payload bytes followed by CRLF.
    fn body(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(ProtocolError::InvalidLength)?;
        if end.saturating_add(2) > self.buf.len() {
            return Err(ProtocolError::Incomplete);
        }
        if &self.buf[end..end + 2] != b"\r\n" {
            return Err(ProtocolError::MissingTerminator);
        }
        let body = &self.buf[self.pos..end];
        self.pos = end + 2;
        Ok(body)
    }

    fn elements(&mut self, count: usize) -> Result<Vec<Reply>> {
        // A bogus count must not drive a huge allocation before the bytes exist.
        self.enter()?;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.frame()?);
        }
        self.depth -= 1;
        Ok(items)
    }
}

use thiserror::Error;

use crate::command::ArgKind;

/// Failure while decoding a RESP frame.
///
/// `Incomplete` means the buffer ends before the frame does; every other
/// variant means the stream is desynchronized and must not be retried.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("incomplete frame")]
    Incomplete,

    #[error("unknown type marker {0:#04x}")]
    UnknownMarker(u8),

    #[error("invalid length")]
    InvalidLength,

    #[error("invalid integer")]
    InvalidInteger,

    #[error("invalid double")]
    InvalidDouble,

    #[error("invalid boolean")]
    InvalidBoolean,

    #[error("invalid utf-8 in simple frame")]
    InvalidUtf8,

    #[error("missing CRLF terminator")]
    MissingTerminator,

    #[error("invalid verbatim string")]
    InvalidVerbatim,

    #[error("expected an array of bulk strings")]
    ExpectedCommand,

    #[error("frame exceeds {0} bytes")]
    FrameTooLarge(usize),

    #[error("aggregates nested deeper than {0}")]
    NestingTooDeep(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ProtocolError::Incomplete)
    }
}

/// Failure of a single command. Always surfaced to the caller as an error reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{command}' command (expected {expected}, got {got})")]
    WrongArity {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("ERR argument {position} is not a valid {expected}")]
    ArgumentType { position: usize, expected: ArgKind },

    #[error("NOAUTH Authentication required.")]
    AuthRequired,

    #[error("ERR invalid password")]
    AuthFailed,

    #[error("ERR value is not an integer or out of range")]
    NotInteger,

    #[error("ERR hash value is not an integer")]
    HashNotInteger,

    #[error("ERR increment or decrement would overflow")]
    Overflow,
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors surfaced by [`crate::Client`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by server")]
    Closed,
}

pub mod codec;
mod reader;
mod value;

pub use codec::{decode, decode_at, encode_command, FrameScanner, MAX_NESTING_DEPTH};
pub use reader::{FrameReader, DEFAULT_MAX_FRAME_BYTES};
pub use value::Reply;

//! A small LZ-style codec that frames its output in fixed 12-token chunks.
//!
//! Each token is a literal byte, or a back-reference into already-produced
//! output followed by a literal byte. See [`format`] for the byte layout.
//!
//! ```
//! let encoded = lzchunk::encode(b"this is what this is");
//! assert_eq!(lzchunk::decode(&encoded).unwrap(), b"this is what this is");
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod matcher;
pub mod observer;
pub mod stream;

pub use decoder::{decode, decode_observed, ChunkReader};
pub use encoder::{encode, encode_observed, max_encoded_len};
pub use error::{Error, Result};
pub use format::{Chunk, Reference, Token};
pub use observer::{Observer, Silent};
pub use stream::{compress_stream, decompress_stream, StreamStats};

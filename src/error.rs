use std::io;

use thiserror::Error;

/// Errors produced while building, encoding or decoding chunk streams.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading or writing a stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A back-reference does not fit the 8-bit offset/length fields
    #[error("back-reference <{offset}, {length}> does not fit the record fields")]
    RangeOverflow { offset: usize, length: usize },

    /// The stream ended in the middle of a chunk
    #[error("stream truncated at byte {position}: chunk needs {needed} bytes, {available} left")]
    TruncatedStream {
        position: usize,
        needed: usize,
        available: usize,
    },

    /// A back-reference points before the start of the output
    #[error("back-reference offset {offset} reaches before the start of output ({produced} bytes produced)")]
    OverlapCopyOutOfRange { offset: usize, produced: usize },

    /// A chunk header declares too many slots or flags past its slot count
    #[error("malformed chunk header {header:#06x} at byte {position}")]
    MalformedHeader { position: usize, header: u16 },
}

pub type Result<T> = std::result::Result<T, Error>;

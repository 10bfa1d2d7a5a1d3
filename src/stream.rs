use std::io::{BufRead, Read, Write};

use crate::decoder::decode_observed;
use crate::encoder::encode_observed;
use crate::error::Result;
use crate::observer::Observer;

/// Byte counts for one pass over a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub read: usize,
    pub written: usize,
}

/// Compresses everything from a reader to a writer.
///
/// The match finder looks back over the whole input, so the reader is
/// drained before anything is written.
///
/// # Arguments
/// * `input` - Source of the raw bytes
/// * `output` - Destination for the chunk stream
/// * `observer` - Receives every token and sealed chunk
pub fn compress_stream(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    observer: &mut dyn Observer,
) -> Result<StreamStats> {
    let mut buffer = Vec::new();
    input.read_to_end(&mut buffer)?;

    let encoded = encode_observed(&buffer, observer);
    output.write_all(&encoded)?;
    output.flush()?;

    Ok(StreamStats {
        read: buffer.len(),
        written: encoded.len(),
    })
}

/// Decompresses a chunk stream from a reader to a writer.
///
/// # Errors
/// Returns an error if the stream is truncated or corrupted, or on I/O
/// failure. Nothing is written when decoding fails.
pub fn decompress_stream(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    observer: &mut dyn Observer,
) -> Result<StreamStats> {
    let mut buffer = Vec::new();
    input.read_to_end(&mut buffer)?;

    let decoded = decode_observed(&buffer, observer)?;
    output.write_all(&decoded)?;
    output.flush()?;

    Ok(StreamStats {
        read: buffer.len(),
        written: decoded.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::observer::Silent;
    use std::io::{BufReader, Cursor};

    #[test]
    fn test_stream_roundtrip() -> Result<()> {
        let input_data = b"this is what this is, and that is what that is".to_vec();
        let mut compressed_buf = Vec::new();
        let mut reader = BufReader::new(Cursor::new(input_data.clone()));

        let stats = compress_stream(&mut reader, &mut compressed_buf, &mut Silent)?;
        assert_eq!(stats.read, input_data.len());
        assert_eq!(stats.written, compressed_buf.len());

        let mut decompressed_buf = Vec::new();
        let mut compressed_reader = BufReader::new(Cursor::new(compressed_buf));
        let stats = decompress_stream(&mut compressed_reader, &mut decompressed_buf, &mut Silent)?;

        assert_eq!(stats.written, input_data.len());
        assert_eq!(input_data, decompressed_buf);
        Ok(())
    }

    #[test]
    fn test_compress_empty() -> Result<()> {
        let mut compressed_buf = Vec::new();
        let mut reader = BufReader::new(Cursor::new(Vec::new()));
        compress_stream(&mut reader, &mut compressed_buf, &mut Silent)?;
        assert!(compressed_buf.is_empty());
        Ok(())
    }

    #[test]
    fn test_decompress_corrupt_writes_nothing() {
        // one literal slot, then a reference reaching 9 bytes back
        let mut corrupt = vec![0x02, 0x20, b'a', b'b'];
        corrupt.extend_from_slice(&[0; 10]);
        corrupt.extend_from_slice(&[0x02, 0x09]);

        let mut reader = BufReader::new(Cursor::new(corrupt));
        let mut writer = Vec::new();
        let result = decompress_stream(&mut reader, &mut writer, &mut Silent);

        assert!(matches!(result, Err(Error::OverlapCopyOutOfRange { offset: 9, .. })));
        assert!(writer.is_empty());
    }
}

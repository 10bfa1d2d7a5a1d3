use crate::error::{Error, Result};
use crate::format::{
    split_header, Chunk, Reference, Token, CHUNK_PREFIX_LEN, HEADER_LEN, LITERALS_LEN, MAX_FLAGS,
    REFERENCE_LEN,
};
use crate::observer::{Observer, Silent};

/// Rebuilds the original bytes from a chunk stream.
///
/// Stops at the end of `encoded` or at a header declaring zero slots. The
/// caller checks the decoded length if it knows what to expect.
pub fn decode(encoded: &[u8]) -> Result<Vec<u8>> {
    decode_observed(encoded, &mut Silent)
}

/// Same as [`decode`], reporting every chunk and token to `observer`.
pub fn decode_observed(encoded: &[u8], observer: &mut dyn Observer) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(encoded.len());

    for (index, chunk) in ChunkReader::new(encoded).enumerate() {
        let chunk = chunk?;
        observer.chunk(index, &chunk);

        for token in chunk.tokens() {
            let position = output.len();
            if let Token::Match(reference, _) = token {
                copy_reference(&mut output, reference)?;
            }
            output.push(token.literal());
            observer.token(position, &token);
        }
    }

    Ok(output)
}

/// Appends `reference.length()` bytes copied from `reference.offset()` back.
///
/// Goes one byte at a time so a copy longer than its offset re-reads what it
/// just wrote.
fn copy_reference(output: &mut Vec<u8>, reference: Reference) -> Result<()> {
    let offset = reference.offset();
    if offset == 0 || offset > output.len() {
        return Err(Error::OverlapCopyOutOfRange {
            offset,
            produced: output.len(),
        });
    }

    let start = output.len() - offset;
    output.reserve(reference.length());
    for i in 0..reference.length() {
        let byte = output[start + i];
        output.push(byte);
    }
    Ok(())
}

/// Iterates the chunks of an encoded stream without reconstructing output.
///
/// Yields an error at most once, then stops.
pub struct ChunkReader<'a> {
    input: &'a [u8],
    position: usize,
    done: bool,
}

impl<'a> ChunkReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            done: false,
        }
    }

    /// Byte offset of the next chunk
    pub fn position(&self) -> usize {
        self.position
    }

    fn read_chunk(&mut self) -> Result<Option<Chunk>> {
        let rest = &self.input[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }
        if rest.len() < HEADER_LEN {
            return Err(self.truncated(HEADER_LEN));
        }

        let header = u16::from_le_bytes([rest[0], rest[1]]);
        let (used_slots, flags) = split_header(header);
        if used_slots == 0 {
            return Ok(None);
        }
        if used_slots > MAX_FLAGS || flags >> used_slots != 0 {
            return Err(Error::MalformedHeader {
                position: self.position,
                header,
            });
        }

        let needed = CHUNK_PREFIX_LEN + flags.count_ones() as usize * REFERENCE_LEN;
        if rest.len() < needed {
            return Err(self.truncated(needed));
        }

        let mut literals = [0u8; LITERALS_LEN];
        literals.copy_from_slice(&rest[HEADER_LEN..CHUNK_PREFIX_LEN]);
        let references = rest[CHUNK_PREFIX_LEN..needed]
            .chunks_exact(REFERENCE_LEN)
            .map(|record| Reference::from_le_bytes([record[0], record[1]]))
            .collect();

        self.position += needed;
        Ok(Some(Chunk::from_parts(used_slots, flags, literals, references)))
    }

    fn truncated(&self, needed: usize) -> Error {
        Error::TruncatedStream {
            position: self.position,
            needed,
            available: self.input.len() - self.position,
        }
    }
}

impl Iterator for ChunkReader<'_> {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_chunk().transpose();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

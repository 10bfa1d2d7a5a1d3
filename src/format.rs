//! Wire format shared by the encoder and decoder.
//!
//! A stream is a plain sequence of chunks with no magic byte or separator:
//!
//! ```text
//! +--------+----------------------+---------------------------+
//! | header | literals (12 bytes)  | references (2 bytes each) |
//! +--------+----------------------+---------------------------+
//! ```
//!
//! The 16-bit little-endian header keeps one reference flag per slot in its
//! low 12 bits and the number of used slots in its high 4 bits. Each
//! reference record stores the offset in its high byte and the length in
//! its low byte.

use crate::error::{Error, Result};

/// Tokens per chunk, one flag bit each
pub const MAX_FLAGS: usize = 12;
/// Size of the chunk header in bytes
pub const HEADER_LEN: usize = 2;
/// Size of the literal array; always written in full
pub const LITERALS_LEN: usize = MAX_FLAGS;
/// Size of one back-reference record in bytes
pub const REFERENCE_LEN: usize = 2;
/// Fixed part of every chunk (header plus literal array)
pub const CHUNK_PREFIX_LEN: usize = HEADER_LEN + LITERALS_LEN;
/// Shortest run worth a back-reference
pub const MIN_MATCH_LEN: usize = 2;
/// Longest run a record can describe
pub const MAX_MATCH_LEN: usize = u8::MAX as usize;
/// Furthest distance a record can point back
pub const MAX_OFFSET: usize = u8::MAX as usize;

const SIZE_SHIFT: u32 = 12;
const FLAGS_MASK: u16 = (1 << SIZE_SHIFT) - 1;

// Flags must stay below the size field, and the slot count must fit in 4 bits.
const _: () = assert!(MAX_FLAGS <= SIZE_SHIFT as usize);
const _: () = assert!(MAX_FLAGS < 1 << (16 - SIZE_SHIFT));

/// Splits a raw header into `(used_slots, flags)`.
pub fn split_header(header: u16) -> (usize, u16) {
    ((header >> SIZE_SHIFT) as usize, header & FLAGS_MASK)
}

/// A back-reference: copy `length` bytes starting `offset` bytes behind the
/// current write position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    offset: u8,
    length: u8,
}

impl Reference {
    /// Builds a reference, rejecting anything the record fields cannot hold.
    pub fn new(offset: usize, length: usize) -> Result<Self> {
        if !(1..=MAX_OFFSET).contains(&offset) || !(MIN_MATCH_LEN..=MAX_MATCH_LEN).contains(&length) {
            return Err(Error::RangeOverflow { offset, length });
        }
        Ok(Self {
            offset: offset as u8,
            length: length as u8,
        })
    }

    pub fn offset(self) -> usize {
        self.offset as usize
    }

    pub fn length(self) -> usize {
        self.length as usize
    }

    pub fn to_le_bytes(self) -> [u8; REFERENCE_LEN] {
        (u16::from(self.offset) << 8 | u16::from(self.length)).to_le_bytes()
    }

    /// Reads a record as-is. Range checks against the output happen at copy
    /// time in the decoder.
    pub fn from_le_bytes(bytes: [u8; REFERENCE_LEN]) -> Self {
        let raw = u16::from_le_bytes(bytes);
        Self {
            offset: (raw >> 8) as u8,
            length: (raw & 0x00FF) as u8,
        }
    }
}

/// One slot of a chunk. Every slot ends with a literal byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match(Reference, u8),
}

impl Token {
    /// The trailing literal of this slot
    pub fn literal(&self) -> u8 {
        match *self {
            Token::Literal(byte) | Token::Match(_, byte) => byte,
        }
    }

    /// Number of input bytes this slot stands for
    pub fn input_len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match(reference, _) => reference.length() + 1,
        }
    }
}

/// The framing unit: up to [`MAX_FLAGS`] tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    used_slots: usize,
    flags: u16,
    literals: [u8; LITERALS_LEN],
    references: Vec<Reference>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a chunk read off the wire. The caller has already checked
    /// that `references` holds one record per flag below `used_slots`.
    pub(crate) fn from_parts(
        used_slots: usize,
        flags: u16,
        literals: [u8; LITERALS_LEN],
        references: Vec<Reference>,
    ) -> Self {
        debug_assert_eq!(references.len(), flags.count_ones() as usize);
        Self {
            used_slots,
            flags,
            literals,
            references,
        }
    }

    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// The meaningful part of the literal array
    pub fn literals(&self) -> &[u8] {
        &self.literals[..self.used_slots]
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn is_empty(&self) -> bool {
        self.used_slots == 0
    }

    pub fn is_full(&self) -> bool {
        self.used_slots == MAX_FLAGS
    }

    pub fn has_reference(&self, slot: usize) -> bool {
        self.flags & (1 << slot) != 0
    }

    /// Fills the next free slot. Pushing into a full chunk is a logic error.
    pub fn push(&mut self, token: Token) {
        assert!(!self.is_full(), "chunk already holds {} tokens", MAX_FLAGS);
        let slot = self.used_slots;
        if let Token::Match(reference, _) = token {
            self.flags |= 1 << slot;
            self.references.push(reference);
        }
        self.literals[slot] = token.literal();
        self.used_slots += 1;
    }

    pub fn header(&self) -> u16 {
        (self.used_slots as u16) << SIZE_SHIFT | self.flags
    }

    /// Bytes this chunk takes on the wire
    pub fn encoded_len(&self) -> usize {
        CHUNK_PREFIX_LEN + self.references.len() * REFERENCE_LEN
    }

    /// Appends the sealed chunk to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        out.extend_from_slice(&self.header().to_le_bytes());
        out.extend_from_slice(&self.literals);
        for reference in &self.references {
            out.extend_from_slice(&reference.to_le_bytes());
        }
    }

    /// Walks the used slots in order, pairing flagged slots with their records.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        let mut references = self.references.iter().copied();
        (0..self.used_slots).map(move |slot| {
            let literal = self.literals[slot];
            match self.has_reference(slot).then(|| references.next()).flatten() {
                Some(reference) => Token::Match(reference, literal),
                None => Token::Literal(literal),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_bit_layout() {
        let reference = Reference::new(5, 4).unwrap();
        // offset in the high byte, length in the low byte, little-endian
        assert_eq!(reference.to_le_bytes(), [0x04, 0x05]);
        assert_eq!(Reference::from_le_bytes([0x04, 0x05]), reference);
    }

    #[test]
    fn test_reference_rejects_unrepresentable_values() {
        for (offset, length) in [(0, 3), (256, 3), (3, 1), (3, 256)] {
            let err = Reference::new(offset, length).unwrap_err();
            assert!(
                matches!(err, Error::RangeOverflow { offset: o, length: l } if o == offset && l == length),
                "unexpected error for <{}, {}>: {:?}",
                offset,
                length,
                err
            );
        }
        assert!(Reference::new(MAX_OFFSET, MAX_MATCH_LEN).is_ok());
    }

    #[test]
    fn test_header_packs_flags_and_size() {
        let mut chunk = Chunk::new();
        chunk.push(Token::Literal(b'a'));
        chunk.push(Token::Literal(b'b'));
        chunk.push(Token::Match(Reference::new(2, 2).unwrap(), b'c'));

        assert_eq!(chunk.header(), 0x3004);
        assert_eq!(split_header(chunk.header()), (3, 0b100));
        assert!(chunk.has_reference(2));
        assert!(!chunk.has_reference(1));
    }

    #[test]
    fn test_write_to_always_emits_full_literal_array() {
        let mut chunk = Chunk::new();
        chunk.push(Token::Literal(b'x'));

        let mut out = Vec::new();
        chunk.write_to(&mut out);

        assert_eq!(out.len(), CHUNK_PREFIX_LEN);
        assert_eq!(out.len(), chunk.encoded_len());
        assert_eq!(&out[..3], &[0x00, 0x10, b'x']);
        assert!(out[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_tokens_follow_slot_order() {
        let first = Reference::new(1, 2).unwrap();
        let second = Reference::new(7, 9).unwrap();
        let mut chunk = Chunk::new();
        chunk.push(Token::Match(first, b'a'));
        chunk.push(Token::Literal(b'b'));
        chunk.push(Token::Match(second, b'c'));

        let tokens: Vec<Token> = chunk.tokens().collect();
        assert_eq!(
            tokens,
            vec![
                Token::Match(first, b'a'),
                Token::Literal(b'b'),
                Token::Match(second, b'c'),
            ]
        );
        assert_eq!(chunk.references(), &[first, second]);
        assert_eq!(chunk.literals(), b"abc");
    }

    #[test]
    #[should_panic]
    fn test_push_into_full_chunk_panics() {
        let mut chunk = Chunk::new();
        for byte in 0..=MAX_FLAGS as u8 {
            chunk.push(Token::Literal(byte));
        }
    }
}

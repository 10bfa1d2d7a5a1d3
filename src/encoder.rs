use crate::format::{Chunk, Reference, Token, CHUNK_PREFIX_LEN, MAX_FLAGS};
use crate::matcher::find_match;
use crate::observer::{Observer, Silent};

/// Compresses `input` into a chunk stream. Empty input gives empty output.
pub fn encode(input: &[u8]) -> Vec<u8> {
    encode_observed(input, &mut Silent)
}

/// Same as [`encode`], reporting every token and sealed chunk to `observer`.
pub fn encode_observed(input: &[u8], observer: &mut dyn Observer) -> Vec<u8> {
    let mut output = Vec::with_capacity(max_encoded_len(input.len()));
    let mut chunk = Chunk::new();
    let mut chunk_index = 0;
    let mut pos = 0;

    while pos < input.len() {
        let token = next_token(input, pos);
        observer.token(pos, &token);
        pos += token.input_len();
        chunk.push(token);

        if chunk.is_full() {
            observer.chunk(chunk_index, &chunk);
            chunk.write_to(&mut output);
            chunk = Chunk::new();
            chunk_index += 1;
        }
    }

    // Partial final chunk; its slot count tells the decoder where to stop
    if !chunk.is_empty() {
        observer.chunk(chunk_index, &chunk);
        chunk.write_to(&mut output);
    }

    output
}

/// Upper bound on the encoded size of `input_len` bytes.
///
/// Every chunk costs its fixed prefix, and each reference record (2 bytes)
/// stands for at least 3 input bytes.
pub fn max_encoded_len(input_len: usize) -> usize {
    input_len.div_ceil(MAX_FLAGS) * CHUNK_PREFIX_LEN + input_len
}

fn next_token(input: &[u8], pos: usize) -> Token {
    // Matches reaching further back than a record can hold fall back to a literal
    let reference = find_match(input, pos).and_then(|m| Reference::new(m.offset(pos), m.length).ok());

    match reference {
        Some(reference) => Token::Match(reference, input[pos + reference.length()]),
        None => Token::Literal(input[pos]),
    }
}

use crate::format::{Chunk, Token};

/// Hook for watching the codec work, token by token.
///
/// `position` is where the token starts: the input offset when encoding, the
/// output offset when decoding. Both methods default to doing nothing.
pub trait Observer {
    fn token(&mut self, _position: usize, _token: &Token) {}

    fn chunk(&mut self, _index: usize, _chunk: &Chunk) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Observer for Silent {}

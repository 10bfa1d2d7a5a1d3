use crate::format::{MAX_MATCH_LEN, MIN_MATCH_LEN};

/// A run of earlier input that repeats at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub length: usize,
}

impl Match {
    /// Distance from `pos` back to the start of the run
    pub fn offset(&self, pos: usize) -> usize {
        pos - self.start
    }
}

/// Looks for a run in `input[..pos]` repeating the bytes at `pos`.
///
/// The scan walks every earlier index once and follows a single running
/// candidate: a mismatch closes the run and the next index starts over
/// against `input[pos]`, without retrying the index that broke it. The best
/// closed run wins, first one on ties. This is not an exhaustive search and
/// the encoded output depends on exactly this selection.
///
/// The run always stops one byte short of the end of input so the slot
/// keeps its trailing literal. Runs shorter than [`MIN_MATCH_LEN`] are
/// dropped, and longer than [`MAX_MATCH_LEN`] are clamped.
pub fn find_match(input: &[u8], pos: usize) -> Option<Match> {
    let mut best = Match { start: 0, length: 0 };
    let mut cur_start = 0;
    let mut cur_len = 0;

    for j in 0..pos {
        if pos + cur_len + 1 >= input.len() {
            break;
        }

        if input[j] == input[pos + cur_len] {
            if cur_len == 0 {
                cur_start = j;
            }
            cur_len += 1;
        } else {
            if cur_len > best.length {
                best = Match { start: cur_start, length: cur_len };
            }
            cur_len = 0;
        }
    }

    // A run can still be open when the scan reaches `pos`
    if cur_len > best.length {
        best = Match { start: cur_start, length: cur_len };
    }

    if best.length < MIN_MATCH_LEN {
        return None;
    }
    best.length = best.length.min(MAX_MATCH_LEN);
    Some(best)
}

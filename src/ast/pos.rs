use std::ops::{BitOr, BitOrAssign, Range};
use std::{fmt, str};

use bit_vec::BitVec;

/// Byte range into the schema source text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeRange {
    pub start: usize,
    pub end: usize,
}
impl CodeRange {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
    pub fn is_dummy(&self) -> bool {
        self.start > self.end
    }
    pub fn empty_at(pos: usize) -> Self {
        CodeRange {
            start: pos,
            end: pos,
        }
    }
}
impl fmt::Debug for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == DUMMY_RANGE {
            write!(f, "DUMMY_RANGE")
        } else {
            f.debug_struct("CodeRange")
                .field("start", &self.start)
                .field("end", &self.end)
                .finish()
        }
    }
}
impl From<Range<usize>> for CodeRange {
    fn from(range: Range<usize>) -> Self {
        CodeRange {
            start: range.start,
            end: range.end,
        }
    }
}
impl From<CodeRange> for Range<usize> {
    fn from(range: CodeRange) -> Self {
        range.start..range.end
    }
}
pub const DUMMY_RANGE: CodeRange = CodeRange { start: 1, end: 0 };

impl BitOr for CodeRange {
    type Output = CodeRange;
    fn bitor(self, rhs: Self) -> Self::Output {
        if rhs.is_dummy() {
            self
        } else if self.is_dummy() {
            rhs
        } else {
            CodeRange {
                start: self.start.min(rhs.start),
                end: self.end.max(rhs.end),
            }
        }
    }
}
impl BitOrAssign for CodeRange {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

// For testing
pub fn pos_in<T, U>(all_text: T, sub_text: U, mut idx: usize) -> CodeRange
where
    T: AsRef<[u8]>,
    U: AsRef<[u8]>,
{
    let all_text: &[u8] = all_text.as_ref();
    let sub_text: &[u8] = sub_text.as_ref();
    let mut i = 0;
    while i + sub_text.len() <= all_text.len() {
        if all_text[i..i + sub_text.len()] == *sub_text {
            if idx == 0 {
                return CodeRange {
                    start: i,
                    end: i + sub_text.len(),
                };
            } else {
                idx -= 1;
            }
        }
        i += 1;
    }
    DUMMY_RANGE
}

/// Maps byte offsets to zero-based (row, column) pairs, where a column counts
/// Unicode scalar values.
///
/// The text is split into chunks at every newline and whenever the pending
/// multi-byte bookkeeping grows past `chunk_size`. Chunks that only contain
/// ASCII keep an empty `skip` vector and are resolved with plain arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionIndex {
    entries: Vec<PositionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PositionEntry {
    pos: usize,
    rc: (usize, usize),
    /// One bit per byte since `pos`: `true` for continuation bytes that do not
    /// advance the column.
    skip: BitVec,
}

impl PositionIndex {
    pub fn new(s: &str) -> Self {
        Self::with_chunk_size(s, 32)
    }

    pub fn with_chunk_size(s: &str, chunk_size: usize) -> Self {
        let mut entries = Vec::<PositionEntry>::new();
        let mut start_rc = (0_usize, 0_usize);
        let mut start_pos = 0_usize;
        let mut rc = (0_usize, 0_usize);
        let mut skip = BitVec::new();
        for (pos, ch) in s.char_indices() {
            let len = ch.len_utf8();

            let need_early_flush = len > 1 && (pos - start_pos) - skip.len() > chunk_size;
            if need_early_flush {
                entries.push(PositionEntry {
                    pos: start_pos,
                    rc: start_rc,
                    skip: skip.clone(),
                });
                start_rc = rc;
                start_pos = pos;
                skip.truncate(0);
            }

            if len > 1 {
                // Backfill the ASCII bytes deferred so far
                while skip.len() < pos - start_pos {
                    skip.push(false);
                }
                for _ in 1..len {
                    skip.push(true);
                }
                skip.push(false);
            }

            let need_flush = ch == '\n' || skip.len() > chunk_size;

            if ch == '\n' {
                rc.0 += 1;
                rc.1 = 0;
            } else {
                rc.1 += 1;
            }

            if need_flush {
                entries.push(PositionEntry {
                    pos: start_pos,
                    rc: start_rc,
                    skip: skip.clone(),
                });
                start_rc = rc;
                start_pos = pos + len;
                skip.truncate(0);
            }
        }
        entries.push(PositionEntry {
            pos: start_pos,
            rc: start_rc,
            skip,
        });
        Self { entries }
    }

    pub fn rc_of(&self, pos: usize) -> (usize, usize) {
        let entry_index = self.entries.partition_point(|entry| entry.pos <= pos);
        let entry = &self.entries[entry_index.max(1) - 1];
        let relpos = pos - entry.pos;
        if entry.skip.is_empty() {
            // Fast path for ASCII case
            return (entry.rc.0, entry.rc.1 + relpos);
        }

        let relcol = if relpos < entry.skip.len() {
            (0..relpos).filter(|&i| !entry.skip[i]).count()
        } else {
            entry.skip.iter().filter(|&b| !b).count() + (relpos - entry.skip.len())
        };
        (entry.rc.0, entry.rc.1 + relcol)
    }
}

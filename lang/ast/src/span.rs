use std::fmt;
use std::ops::{Add, Sub};

/// The raw, untyped index. We use a 32-bit integer here for space efficiency,
/// assuming we won't be working with sources larger than 4GB.
pub type RawIndex = u32;

/// A byte position in a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteIndex(pub RawIndex);

impl ByteIndex {
    /// Convert the position into a `usize`, for use in array indexing
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ByteIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Add<u32> for ByteIndex {
    type Output = ByteIndex;

    fn add(self, rhs: u32) -> ByteIndex {
        ByteIndex(self.0 + rhs)
    }
}

impl Sub for ByteIndex {
    type Output = u32;

    fn sub(self, rhs: ByteIndex) -> u32 {
        self.0.saturating_sub(rhs.0)
    }
}

/// A region of source code, from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: ByteIndex,
    pub end: ByteIndex,
}

impl Span {
    pub fn new(start: RawIndex, end: RawIndex) -> Span {
        Span::from_indices(ByteIndex(start), ByteIndex(end))
    }

    pub fn from_indices(start: ByteIndex, end: ByteIndex) -> Span {
        assert!(end >= start, "span end {end} before start {start}");
        Span { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `pos` lies inside the span.
    ///
    /// The end position only counts as inside if `include_stop` is set.
    pub fn contains(&self, pos: ByteIndex, include_stop: bool) -> bool {
        self.start <= pos && (pos < self.end || (include_stop && pos == self.end))
    }
}

impl From<u32> for ByteIndex {
    fn from(value: u32) -> Self {
        ByteIndex(value)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Endpoint, Error, TextStorage};

/// A validated position in a UTF-8 text buffer.
///
/// A `TextIndex` is always on a UTF-8 codepoint boundary of the text it was validated against,
/// and converts to and from a byte offset with [`TextIndex::offset`] and [`TextIndex::new`].
/// Indices are ordered by their position in the text.
///
/// Like [`TextRange`], a `TextIndex` does not record which text it was validated against; using
/// it with a different text is a contract violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextIndex {
    offset: usize,
}

impl TextIndex {
    /// Returns a validated `TextIndex` for the provided text.
    pub fn new<T: TextStorage + ?Sized>(text: &T, offset: usize) -> Result<Self, Error> {
        let len = text.len();
        if offset > len {
            return Err(Error::invalid_bounds(offset, offset, len));
        }
        if !text.is_char_boundary(offset) {
            return Err(Error::not_on_char_boundary(
                text,
                offset,
                offset,
                len,
                Endpoint::Start,
                offset,
            ));
        }
        Ok(Self { offset })
    }

    /// Creates a `TextIndex` without validation.
    ///
    /// This is intended for internal callers that already maintain boundary invariants.
    #[must_use]
    #[inline]
    pub const fn new_unchecked(offset: usize) -> Self {
        Self { offset }
    }

    /// The byte offset of this index from the start of the text.
    #[must_use]
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }
}

/// A validated byte range into a UTF-8 text buffer.
///
/// This is a convenience wrapper around `Range<usize>` that carries invariants useful for
/// attributed text APIs:
///
/// - `start <= end`
/// - `start` and `end` are within the text bounds
/// - `start` and `end` lie on UTF-8 codepoint boundaries
///
/// **Why `TextRange`?**
///
/// Many text APIs accept `Range<usize>` byte offsets. That is flexible, but it means every call
/// must re-check bounds and UTF-8 boundary alignment, and every caller has to decide how to handle
/// failures.
///
/// `TextRange` lets you validate once and then pass the range to APIs that can be infallible with
/// respect to range correctness.
///
/// ## Important
///
/// `TextRange` does not currently encode which specific text buffer it was validated against. It
/// is the caller's responsibility to only reuse a `TextRange` with the same underlying text
/// content it was validated for. [`AttributedText`] treats a range that is out of bounds for its
/// text as a contract violation and panics.
///
/// ## Example
///
/// ```
/// use attributed_text::{AttributeSet, AttributedText, TextRange};
///
/// let mut text = AttributedText::new("Hello!");
/// let range = TextRange::new(&text, 0..5).unwrap();
/// text.set_attributes(range, AttributeSet::new());
/// ```
///
/// [`AttributedText`]: crate::AttributedText
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: usize,
    end: usize,
}

impl TextRange {
    /// Returns a validated `TextRange` for the provided text.
    #[inline]
    pub fn new<T: TextStorage + ?Sized>(text: &T, range: Range<usize>) -> Result<Self, Error> {
        validate_range(text, &range)?;
        Ok(Self {
            start: range.start,
            end: range.end,
        })
    }

    /// Returns the range between two indices that were validated against the same text.
    ///
    /// Fails with [`ErrorKind::InvalidRange`] if `start > end`.
    ///
    /// [`ErrorKind::InvalidRange`]: crate::ErrorKind::InvalidRange
    pub fn from_indices<T: TextStorage + ?Sized>(
        text: &T,
        start: TextIndex,
        end: TextIndex,
    ) -> Result<Self, Error> {
        Self::new(text, start.offset()..end.offset())
    }

    /// Creates a `TextRange` without validation.
    ///
    /// This is intended for internal callers that already maintain range invariants.
    #[must_use]
    #[inline]
    pub const fn new_unchecked(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The start byte offset.
    #[must_use]
    #[inline]
    pub const fn start(self) -> usize {
        self.start
    }

    /// The end byte offset (exclusive).
    #[must_use]
    #[inline]
    pub const fn end(self) -> usize {
        self.end
    }

    /// The start of the range as a [`TextIndex`].
    #[must_use]
    #[inline]
    pub const fn start_index(self) -> TextIndex {
        TextIndex::new_unchecked(self.start)
    }

    /// The end of the range as a [`TextIndex`].
    #[must_use]
    #[inline]
    pub const fn end_index(self) -> TextIndex {
        TextIndex::new_unchecked(self.end)
    }

    /// The length of the range in bytes.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the range covers no bytes.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Returns this range as a `Range<usize>`.
    #[must_use]
    #[inline]
    pub fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<TextRange> for Range<usize> {
    #[inline]
    fn from(value: TextRange) -> Self {
        value.as_range()
    }
}

#[inline]
pub(crate) fn validate_range<T: TextStorage + ?Sized>(
    text: &T,
    range: &Range<usize>,
) -> Result<(), Error> {
    let text_len = text.len();
    if range.start > range.end {
        return Err(Error::invalid_range(range.start, range.end, text_len));
    }
    if range.start > text_len || range.end > text_len {
        return Err(Error::invalid_bounds(range.start, range.end, text_len));
    }
    if !text.is_char_boundary(range.start) {
        return Err(Error::not_on_char_boundary(
            text,
            range.start,
            range.end,
            text_len,
            Endpoint::Start,
            range.start,
        ));
    }
    if !text.is_char_boundary(range.end) {
        return Err(Error::not_on_char_boundary(
            text,
            range.start,
            range.end,
            text_len,
            Endpoint::End,
            range.end,
        ));
    }
    Ok(())
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use unicode_segmentation::{GraphemeCursor, UnicodeSegmentation};

use crate::TextIndex;

/// The text of an [`AttributedText`](crate::AttributedText) as extended grapheme clusters.
///
/// Indices passed in must be on a character boundary of the text. Stepping from an index
/// inside a cluster moves to the nearest cluster boundary in that direction.
#[derive(Clone, Copy, Debug)]
pub struct CharacterView<'a> {
    text: &'a str,
}

impl<'a> CharacterView<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// The underlying text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Iterates over the grapheme clusters.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &'a str> + 'a {
        self.text.graphemes(true)
    }

    /// Iterates over the grapheme clusters together with the index each starts at.
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = (TextIndex, &'a str)> + 'a {
        self.text
            .grapheme_indices(true)
            .map(|(offset, cluster)| (TextIndex::new_unchecked(offset), cluster))
    }

    /// The number of grapheme clusters.
    pub fn count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// The start of the cluster after the one containing `index`, or `None` at the end.
    pub fn index_after(&self, index: TextIndex) -> Option<TextIndex> {
        let mut cursor = GraphemeCursor::new(index.offset(), self.text.len(), true);
        let next = cursor.next_boundary(self.text, 0).ok()??;
        Some(TextIndex::new_unchecked(next))
    }

    /// The start of the cluster before `index`, or `None` at the start.
    pub fn index_before(&self, index: TextIndex) -> Option<TextIndex> {
        let mut cursor = GraphemeCursor::new(index.offset(), self.text.len(), true);
        let previous = cursor.prev_boundary(self.text, 0).ok()??;
        Some(TextIndex::new_unchecked(previous))
    }

    /// The index `distance` clusters away from `index`, or `None` if that leaves the text.
    pub fn index_offset_by(&self, index: TextIndex, distance: isize) -> Option<TextIndex> {
        step_by(
            index,
            distance,
            |index| self.index_after(index),
            |index| self.index_before(index),
        )
    }
}

/// The text of an [`AttributedText`](crate::AttributedText) as Unicode scalar values.
#[derive(Clone, Copy, Debug)]
pub struct UnicodeScalarView<'a> {
    text: &'a str,
}

impl<'a> UnicodeScalarView<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// The underlying text.
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Iterates over the scalar values.
    pub fn iter(&self) -> core::str::Chars<'a> {
        self.text.chars()
    }

    /// Iterates over the scalar values together with the index each starts at.
    pub fn indices(&self) -> impl DoubleEndedIterator<Item = (TextIndex, char)> + 'a {
        self.text
            .char_indices()
            .map(|(offset, scalar)| (TextIndex::new_unchecked(offset), scalar))
    }

    /// The number of scalar values.
    pub fn count(&self) -> usize {
        self.text.chars().count()
    }

    /// The index after the scalar at `index`, or `None` at the end.
    pub fn index_after(&self, index: TextIndex) -> Option<TextIndex> {
        let offset = index.offset();
        let scalar = self.text[offset..].chars().next()?;
        Some(TextIndex::new_unchecked(offset + scalar.len_utf8()))
    }

    /// The index of the scalar before `index`, or `None` at the start.
    pub fn index_before(&self, index: TextIndex) -> Option<TextIndex> {
        let offset = index.offset();
        let scalar = self.text[..offset].chars().next_back()?;
        Some(TextIndex::new_unchecked(offset - scalar.len_utf8()))
    }

    /// The index `distance` scalars away from `index`, or `None` if that leaves the text.
    pub fn index_offset_by(&self, index: TextIndex, distance: isize) -> Option<TextIndex> {
        step_by(
            index,
            distance,
            |index| self.index_after(index),
            |index| self.index_before(index),
        )
    }
}

fn step_by(
    mut index: TextIndex,
    distance: isize,
    after: impl Fn(TextIndex) -> Option<TextIndex>,
    before: impl Fn(TextIndex) -> Option<TextIndex>,
) -> Option<TextIndex> {
    for _ in 0..distance.unsigned_abs() {
        index = if distance > 0 {
            after(index)?
        } else {
            before(index)?
        };
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use crate::{AttributedText, TextIndex};
    use alloc::vec::Vec;

    // An "e" with a combining acute, then a flag made of two regional indicators.
    const TEXT: &str = "ae\u{301}\u{1F1EB}\u{1F1F7}z";

    fn at(offset: usize) -> TextIndex {
        TextIndex::new_unchecked(offset)
    }

    #[test]
    fn characters_are_grapheme_clusters() {
        let text = AttributedText::new(TEXT);
        let characters = text.characters();
        assert_eq!(characters.count(), 4);
        assert_eq!(
            characters.iter().collect::<Vec<_>>(),
            ["a", "e\u{301}", "\u{1F1EB}\u{1F1F7}", "z"]
        );
        let starts: Vec<_> = characters
            .indices()
            .map(|(index, _)| index.offset())
            .collect();
        assert_eq!(starts, [0, 1, 4, 12]);
        assert_eq!(characters.iter().next_back(), Some("z"));
    }

    #[test]
    fn character_stepping() {
        let text = AttributedText::new(TEXT);
        let characters = text.characters();
        assert_eq!(characters.index_after(at(0)), Some(at(1)));
        assert_eq!(characters.index_after(at(1)), Some(at(4)));
        assert_eq!(characters.index_after(at(12)), Some(at(13)));
        assert_eq!(characters.index_after(at(13)), None);
        assert_eq!(characters.index_before(at(12)), Some(at(4)));
        assert_eq!(characters.index_before(at(0)), None);
        assert_eq!(characters.index_offset_by(at(0), 3), Some(at(12)));
        assert_eq!(characters.index_offset_by(at(13), -2), Some(at(4)));
        assert_eq!(characters.index_offset_by(at(4), 0), Some(at(4)));
        assert_eq!(characters.index_offset_by(at(0), 5), None);
    }

    #[test]
    fn scalars() {
        let text = AttributedText::new(TEXT);
        let scalars = text.unicode_scalars();
        assert_eq!(scalars.count(), 6);
        assert_eq!(scalars.iter().nth(2), Some('\u{301}'));
        assert_eq!(scalars.index_after(at(2)), Some(at(4)));
        assert_eq!(scalars.index_before(at(4)), Some(at(2)));
        assert_eq!(scalars.index_before(at(0)), None);
        assert_eq!(scalars.index_after(at(13)), None);
        assert_eq!(scalars.index_offset_by(at(0), 4), Some(at(8)));
        assert_eq!(scalars.index_offset_by(at(8), -3), Some(at(1)));
        let last = scalars.indices().next_back();
        assert_eq!(last, Some((at(12), 'z')));
    }
}

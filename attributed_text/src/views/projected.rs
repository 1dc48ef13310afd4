// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt::{self, Debug};
use core::iter::FusedIterator;

use crate::views::{RunIndex, Runs};
use crate::{AttributeSet, TextRange};

/// A [`Runs`] view that only distinguishes a subset of attribute keys.
///
/// A projected run spans every neighbouring run that agrees on the projected keys, so it can
/// cover several runs of the underlying view. Positions are the [`RunIndex`] of the first
/// underlying run of each projected run.
///
/// ```
/// use attributed_text::{AttributeSet, AttributeValue, AttributedText, Run};
///
/// let bold = AttributeSet::from_iter([("bold", AttributeValue::new(true))]);
/// let mut bold_big = bold.clone();
/// bold_big.insert_value("size", AttributeValue::new(20_u32));
/// let text = AttributedText::from_runs(
///     "abcdef",
///     [Run::new(2, bold.clone()), Run::new(2, bold_big), Run::new(2, AttributeSet::new())],
/// );
///
/// let runs = text.runs();
/// let by_weight: Vec<_> = runs
///     .projected(&["bold"])
///     .iter()
///     .map(|(range, _)| range.as_range())
///     .collect();
/// assert_eq!(by_weight, [0..4, 4..6]);
/// ```
#[derive(Clone)]
pub struct ProjectedRuns<'a, 'k> {
    runs: Runs<'a>,
    keys: &'k [&'k str],
}

impl<'a, 'k> ProjectedRuns<'a, 'k> {
    pub(crate) fn new(runs: Runs<'a>, keys: &'k [&'k str]) -> Self {
        Self { runs, keys }
    }

    /// The keys this view distinguishes.
    pub fn keys(&self) -> &'k [&'k str] {
        self.keys
    }

    /// The index of the first projected run.
    pub fn start_index(&self) -> RunIndex {
        self.runs.start_index()
    }

    /// The index one past the last projected run.
    pub fn end_index(&self) -> RunIndex {
        self.runs.end_index()
    }

    /// The index of the projected run after the one containing `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not before the end of the view.
    pub fn index_after(&self, index: RunIndex) -> RunIndex {
        let slots = self.runs.slots();
        let slot = index.slot();
        assert!(
            slots.contains(&slot),
            "run index {slot} has no successor in the run view over runs {}..{}",
            slots.start,
            slots.end
        );
        let attributes = self.runs.attributes_of(slot);
        let mut next = slot + 1;
        while next < slots.end && self.agree(attributes, self.runs.attributes_of(next)) {
            next += 1;
        }
        RunIndex::from_slot(next)
    }

    /// The index of the projected run before `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not after the start of the view.
    pub fn index_before(&self, index: RunIndex) -> RunIndex {
        let slots = self.runs.slots();
        let slot = index.slot();
        assert!(
            slot > slots.start && slot <= slots.end,
            "run index {slot} has no predecessor in the run view over runs {}..{}",
            slots.start,
            slots.end
        );
        let attributes = self.runs.attributes_of(slot - 1);
        let mut previous = slot - 1;
        while previous > slots.start
            && self.agree(attributes, self.runs.attributes_of(previous - 1))
        {
            previous -= 1;
        }
        RunIndex::from_slot(previous)
    }

    /// The range of text from `index` to the end of its projected run.
    pub fn range_at(&self, index: RunIndex) -> TextRange {
        let end = self.index_after(index);
        self.clamped_range(index.slot(), end.slot())
    }

    /// Iterates over the projected runs, yielding each range with its projected attributes.
    pub fn iter(&self) -> ProjectedRunsIter<'a, 'k> {
        ProjectedRunsIter {
            projected: self.clone(),
            front: self.runs.slots().start,
            back: self.runs.slots().end,
        }
    }

    fn agree(&self, a: &AttributeSet, b: &AttributeSet) -> bool {
        a.equal_on(b, self.keys)
    }

    /// The range covered by the underlying runs in `start..end`, clamped to the view.
    fn clamped_range(&self, start: usize, end: usize) -> TextRange {
        let range = self.runs.range();
        let start = self.runs.offset_of(start).max(range.start);
        let end = self.runs.offset_of(end).min(range.end);
        TextRange::new_unchecked(start, end)
    }

    fn item(&self, start: usize, end: usize) -> (TextRange, AttributeSet) {
        let attributes = self.runs.attributes_of(start).projected(self.keys);
        (self.clamped_range(start, end), attributes)
    }
}

impl Debug for ProjectedRuns<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedRuns")
            .field("keys", &self.keys)
            .field("runs", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a, 'k> IntoIterator for &ProjectedRuns<'a, 'k> {
    type Item = (TextRange, AttributeSet);
    type IntoIter = ProjectedRunsIter<'a, 'k>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the projected runs of a [`ProjectedRuns`] view.
#[derive(Clone)]
pub struct ProjectedRunsIter<'a, 'k> {
    projected: ProjectedRuns<'a, 'k>,
    front: usize,
    back: usize,
}

impl Iterator for ProjectedRunsIter<'_, '_> {
    type Item = (TextRange, AttributeSet);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let start = self.front;
        self.front = self
            .projected
            .index_after(RunIndex::from_slot(start))
            .slot();
        Some(self.projected.item(start, self.front))
    }
}

impl DoubleEndedIterator for ProjectedRunsIter<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back <= self.front {
            return None;
        }
        let end = self.back;
        self.back = self
            .projected
            .index_before(RunIndex::from_slot(end))
            .slot();
        Some(self.projected.item(self.back, end))
    }
}

impl FusedIterator for ProjectedRunsIter<'_, '_> {}

impl Debug for ProjectedRunsIter<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedRunsIter")
            .field("keys", &self.projected.keys)
            .field("front", &self.front)
            .field("back", &self.back)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AttributeKey, AttributeSet, AttributedText, Run, TextRange};
    use alloc::vec::Vec;

    enum Bold {}
    impl AttributeKey for Bold {
        const NAME: &'static str = "bold";
        type Value = bool;
    }

    enum Size {}
    impl AttributeKey for Size {
        const NAME: &'static str = "size";
        type Value = u32;
    }

    /// Bold over 0..4, with sizes 1, 2, 2, 3 every two bytes.
    fn sample() -> AttributedText {
        let run = |bold: bool, size: u32| {
            Run::new(
                2,
                AttributeSet::new().with::<Bold>(bold).with::<Size>(size),
            )
        };
        AttributedText::from_runs(
            "aabbccdd",
            [run(true, 1), run(true, 2), run(false, 2), run(false, 3)],
        )
    }

    #[test]
    fn neighbours_agreeing_on_keys_merge() {
        let text = sample();
        let runs = text.runs();
        let bold = runs.projected(&["bold"]);
        let forward: Vec<_> = bold.iter().map(|(range, _)| range.as_range()).collect();
        assert_eq!(forward, [0..4, 4..8]);
        let backward: Vec<_> = bold.iter().rev().map(|(range, _)| range.as_range()).collect();
        assert_eq!(backward, [4..8, 0..4]);

        let (_, attributes) = bold.iter().next().unwrap();
        assert_eq!(attributes, AttributeSet::new().with::<Bold>(true));

        let size = runs.projected(&["size"]);
        let ranges: Vec<_> = size.iter().map(|(range, _)| range.as_range()).collect();
        assert_eq!(ranges, [0..2, 2..6, 6..8]);
    }

    #[test]
    fn stepping_between_projected_runs() {
        let text = sample();
        let runs = text.runs();
        let bold = runs.projected(&["bold"]);
        let start = bold.start_index();
        let second = bold.index_after(start);
        assert_eq!(start.distance_to(second), 2);
        assert_eq!(bold.index_after(second), bold.end_index());
        assert_eq!(bold.index_before(bold.end_index()), second);
        assert_eq!(bold.index_before(second), start);
        assert_eq!(bold.range_at(second).as_range(), 4..8);
        // Starting inside a projected run reaches its end.
        assert_eq!(bold.range_at(start.advanced_by(1)).as_range(), 2..4);
    }

    #[test]
    fn projection_clamps_to_the_view() {
        let text = sample();
        let runs = text.runs_in(TextRange::new(&text, 3..7).unwrap());
        let ranges: Vec<_> = runs
            .projected(&["bold"])
            .iter()
            .map(|(range, _)| range.as_range())
            .collect();
        assert_eq!(ranges, [3..4, 4..7]);
    }

    #[test]
    fn projection_onto_no_keys_is_one_run() {
        let text = sample();
        let runs = text.runs();
        let all: Vec<_> = runs.projected(&[]).iter().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0.as_range(), 0..8);
        assert!(all[0].1.is_empty());
    }
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::{self, Debug};
use core::iter::FusedIterator;
use core::ops::Range;

use crate::guts::Guts;
use crate::views::ProjectedRuns;
use crate::{AttributeKey, AttributeSet, AttributeValue, TextIndex, TextRange};

/// The position of a run in a [`Runs`] view.
///
/// Run indices name slots of the run table of the text the view was taken from. They are
/// distinct from [`TextIndex`] and are only meaningful for views of an unmodified text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunIndex(usize);

impl RunIndex {
    /// The index `distance` runs away from this one.
    ///
    /// # Panics
    ///
    /// If the result would be negative.
    #[must_use]
    pub fn advanced_by(self, distance: isize) -> Self {
        match self.0.checked_add_signed(distance) {
            Some(index) => Self(index),
            None => panic!("advancing run index {} by {distance} underflows", self.0),
        }
    }

    /// The number of runs from this index to `other`, negative if `other` comes first.
    ///
    /// # Panics
    ///
    /// If the distance does not fit in an `isize`.
    pub fn distance_to(self, other: Self) -> isize {
        let distance = if other.0 >= self.0 {
            isize::try_from(other.0 - self.0)
        } else {
            isize::try_from(self.0 - other.0).map(isize::wrapping_neg)
        };
        match distance {
            Ok(distance) => distance,
            Err(_) => panic!(
                "distance from run index {} to {} overflows isize",
                self.0, other.0
            ),
        }
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(slot)
    }

    pub(crate) fn slot(self) -> usize {
        self.0
    }
}

/// One run of a [`Runs`] view: a range of the text and the attributes of every byte in it.
#[derive(Clone, Copy, Debug)]
pub struct AttributedRun<'a> {
    range: TextRange,
    attributes: &'a AttributeSet,
}

impl<'a> AttributedRun<'a> {
    /// The range of the text covered by this run, clamped to the view.
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// The length of the run in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Returns `true` if the run is empty. Runs yielded by a view never are.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The attributes of the run.
    pub fn attributes(&self) -> &'a AttributeSet {
        self.attributes
    }

    /// The value of `K` in this run.
    pub fn get<K: AttributeKey>(&self) -> Option<&'a K::Value> {
        self.attributes.get::<K>()
    }

    /// The value stored under `name` in this run.
    pub fn value(&self, name: &str) -> Option<&'a AttributeValue> {
        self.attributes.value(name)
    }
}

/// Runs compare by length and attributes, not by position.
impl PartialEq for AttributedRun<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.attributes == other.attributes
    }
}

impl Eq for AttributedRun<'_> {}

/// The runs of an [`AttributedText`](crate::AttributedText) overlapping a range, clamped to it.
///
/// Two views are equal when they yield equal runs, even when they were taken from different
/// texts or different ranges.
#[derive(Clone)]
pub struct Runs<'a> {
    guts: &'a Guts,
    range: Range<usize>,
    slots: Range<usize>,
}

impl<'a> Runs<'a> {
    pub(crate) fn new(guts: &'a Guts, range: Range<usize>) -> Self {
        guts.assert_range(&range);
        let first = guts.locate(range.start).index;
        let slots = if range.is_empty() {
            first..first
        } else {
            // The run containing the end overlaps the range unless it starts there.
            let end = guts.locate(range.end);
            first..end.index + usize::from(end.offset < range.end)
        };
        Self { guts, range, slots }
    }

    /// The number of runs in the view.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the view has no runs, which is when its range is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The index of the first run.
    pub fn start_index(&self) -> RunIndex {
        RunIndex(self.slots.start)
    }

    /// The index one past the last run.
    pub fn end_index(&self) -> RunIndex {
        RunIndex(self.slots.end)
    }

    /// The run at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is not a run of this view.
    pub fn get(&self, index: RunIndex) -> AttributedRun<'a> {
        self.assert_slot(index.0);
        self.run(index.0, self.guts.locate_index(index.0).offset)
    }

    /// The run containing `index`.
    ///
    /// # Panics
    ///
    /// If `index` is outside the range of this view or at its end.
    pub fn run_at(&self, index: TextIndex) -> AttributedRun<'a> {
        self.get(self.index_of_run_at(index))
    }

    /// The index of the run containing `index`.
    ///
    /// # Panics
    ///
    /// If `index` is outside the range of this view or at its end.
    pub fn index_of_run_at(&self, index: TextIndex) -> RunIndex {
        let offset = index.offset();
        assert!(
            self.range.contains(&offset),
            "offset {offset} is outside of the run view over {}..{}",
            self.range.start,
            self.range.end
        );
        RunIndex(self.guts.locate(offset).index)
    }

    /// Iterates over the runs of the view.
    pub fn iter(&self) -> RunsIter<'a> {
        let front = self.guts.locate_index(self.slots.start).offset;
        let back = self.guts.locate_index(self.slots.end).offset;
        RunsIter {
            runs: self.clone(),
            front: (self.slots.start, front),
            back: (self.slots.end, back),
        }
    }

    /// A view of the same runs that only distinguishes the attributes named in `keys`.
    ///
    /// Neighbouring runs that agree on every key in `keys` form a single projected run.
    pub fn projected<'k>(&self, keys: &'k [&'k str]) -> ProjectedRuns<'a, 'k> {
        ProjectedRuns::new(self.clone(), keys)
    }

    pub(crate) fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    pub(crate) fn slots(&self) -> Range<usize> {
        self.slots.clone()
    }

    pub(crate) fn attributes_of(&self, slot: usize) -> &'a AttributeSet {
        self.guts.runs[slot].attributes()
    }

    pub(crate) fn offset_of(&self, slot: usize) -> usize {
        self.guts.locate_index(slot).offset
    }

    /// The run in `slot`, which starts at `start`, clamped to the view.
    fn run(&self, slot: usize, start: usize) -> AttributedRun<'a> {
        let run = &self.guts.runs[slot];
        let clamped = start.max(self.range.start)..(start + run.len()).min(self.range.end);
        AttributedRun {
            range: TextRange::new_unchecked(clamped.start, clamped.end),
            attributes: run.attributes(),
        }
    }

    fn assert_slot(&self, slot: usize) {
        assert!(
            self.slots.contains(&slot),
            "run index {slot} is outside of the run view over runs {}..{}",
            self.slots.start,
            self.slots.end
        );
    }
}

impl PartialEq for Runs<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Runs<'_> {}

impl Debug for Runs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &Runs<'a> {
    type Item = AttributedRun<'a>;
    type IntoIter = RunsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for Runs<'a> {
    type Item = AttributedRun<'a>;
    type IntoIter = RunsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the runs of a [`Runs`] view.
#[derive(Clone)]
pub struct RunsIter<'a> {
    runs: Runs<'a>,
    /// Next slot from the front, and the offset it starts at.
    front: (usize, usize),
    /// One past the next slot from the back, and the offset it starts at.
    back: (usize, usize),
}

impl<'a> Iterator for RunsIter<'a> {
    type Item = AttributedRun<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (slot, start) = self.front;
        if slot >= self.back.0 {
            return None;
        }
        self.front = (slot + 1, start + self.runs.guts.runs[slot].len());
        Some(self.runs.run(slot, start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back.0 - self.front.0;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for RunsIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (end, end_offset) = self.back;
        if end <= self.front.0 {
            return None;
        }
        let slot = end - 1;
        let start = end_offset - self.runs.guts.runs[slot].len();
        self.back = (slot, start);
        Some(self.runs.run(slot, start))
    }
}

impl ExactSizeIterator for RunsIter<'_> {}

impl FusedIterator for RunsIter<'_> {}

impl Debug for RunsIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunsIter")
            .field("front", &self.front.0)
            .field("back", &self.back.0)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::RunIndex;
    use crate::{AttributeKey, AttributeSet, AttributedText, Run, TextIndex, TextRange};
    use alloc::vec::Vec;

    enum Size {}
    impl AttributeKey for Size {
        const NAME: &'static str = "size";
        type Value = u32;
    }

    fn sample() -> AttributedText {
        let runs = [1, 2, 3].map(|size| Run::new(3, AttributeSet::new().with::<Size>(size)));
        AttributedText::from_runs("aaabbbccc", runs)
    }

    #[test]
    fn clamped_iteration_in_both_directions() {
        let text = sample();
        let runs = text.runs_in(TextRange::new(&text, 2..7).unwrap());
        assert_eq!(runs.len(), 3);
        let forward: Vec<_> = runs
            .iter()
            .map(|run| (run.range().as_range(), run.get::<Size>().copied()))
            .collect();
        assert_eq!(forward, [(2..3, Some(1)), (3..6, Some(2)), (6..7, Some(3))]);
        let backward: Vec<_> = runs.iter().rev().map(|run| run.range().as_range()).collect();
        assert_eq!(backward, [6..7, 3..6, 2..3]);

        let mut iter = runs.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next().map(|run| run.len()), Some(1));
        assert_eq!(iter.next_back().map(|run| run.len()), Some(1));
        assert_eq!(iter.len(), 1);
        assert_eq!(iter.next().map(|run| run.len()), Some(3));
        assert!(iter.next().is_none());
        assert!(iter.next_back().is_none());
    }

    #[test]
    fn empty_range_has_no_runs() {
        let text = sample();
        let runs = text.runs_in(TextRange::new(&text, 4..4).unwrap());
        assert!(runs.is_empty());
        assert_eq!(runs.iter().count(), 0);
        assert!(AttributedText::default().runs().is_empty());
    }

    #[test]
    fn lookup_by_index() {
        let text = sample();
        let runs = text.runs_in(TextRange::new(&text, 1..9).unwrap());
        let at = |offset| TextIndex::new(&text, offset).unwrap();
        assert_eq!(runs.index_of_run_at(at(4)), RunIndex(1));
        assert_eq!(runs.run_at(at(1)).range().as_range(), 1..3);
        assert_eq!(runs.get(RunIndex(2)).range().as_range(), 6..9);
        assert_eq!(runs.start_index().distance_to(runs.end_index()), 3);
        assert_eq!(runs.end_index().distance_to(runs.start_index()), -3);
        assert_eq!(runs.start_index().advanced_by(2), RunIndex(2));
        assert_eq!(runs.end_index().advanced_by(-1), RunIndex(2));
    }

    #[test]
    fn distances_at_the_extremes() {
        let max = isize::MAX.unsigned_abs();
        assert_eq!(RunIndex(0).distance_to(RunIndex(max)), isize::MAX);
        assert_eq!(RunIndex(max).distance_to(RunIndex(0)), -isize::MAX);
    }

    #[test]
    #[should_panic(expected = "overflows isize")]
    fn distance_overflow_panics() {
        let _ = RunIndex(0).distance_to(RunIndex(usize::MAX));
    }

    #[test]
    #[should_panic(expected = "outside of the run view")]
    fn lookup_outside_the_view_panics() {
        let text = sample();
        let runs = text.runs_in(TextRange::new(&text, 3..6).unwrap());
        let _ = runs.get(RunIndex(0));
    }

    #[test]
    fn views_compare_by_content() {
        let text = sample();
        let other = AttributedText::from_runs(
            "xxbbbyy",
            [
                Run::new(2, AttributeSet::new().with::<Size>(1)),
                Run::new(3, AttributeSet::new().with::<Size>(2)),
                Run::new(2, AttributeSet::new().with::<Size>(3)),
            ],
        );
        let left = text.runs_in(TextRange::new(&text, 1..8).unwrap());
        assert_eq!(left, other.runs());
        let shifted = text.runs_in(TextRange::new(&text, 0..7).unwrap());
        assert_ne!(shifted, other.runs());
    }

    #[test]
    fn runs_agree_with_to_runs() {
        let text = sample();
        let range = TextRange::new(&text, 2..8).unwrap();
        let copied = text.to_runs(range);
        let viewed: Vec<_> = text
            .runs_in(range)
            .iter()
            .map(|run| Run::new(run.len(), run.attributes().clone()))
            .collect();
        assert_eq!(copied, viewed);
    }
}

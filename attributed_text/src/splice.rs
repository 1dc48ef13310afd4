// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run table replacement.
//!
//! Every change to the run table funnels through [`Guts::replace_slots`] or
//! [`Guts::update_and_coalesce`]. Both assume that the table is coalesced outside the slots they
//! touch and that the runs they insert are coalesced among themselves, so only the two new edges
//! can need merging.

use alloc::vec::Vec;
use core::ops::Range;

use smallvec::SmallVec;

use crate::Run;
use crate::guts::Guts;
use crate::location_cache::RunOffset;
use crate::run::push_coalesced;
use crate::seek::seek_index;

impl Guts {
    /// Replaces the runs over the `range` bytes with `runs`, then checks the table.
    ///
    /// The text itself is not touched, so `runs` must cover exactly `range.len()` bytes when
    /// called on its own.
    pub(crate) fn replace_runs(
        &mut self,
        range: Range<usize>,
        runs: impl IntoIterator<Item = Run>,
    ) {
        self.splice_runs(range, runs);
        self.debug_check_invariants();
    }

    /// Replaces the runs over the `range` bytes with `runs`.
    ///
    /// Runs that straddle either end of `range` are split, keeping their attributes outside of
    /// it. `runs` may cover any number of bytes, which is what lets text replacement change
    /// the length of the text.
    pub(crate) fn splice_runs(
        &mut self,
        range: Range<usize>,
        runs: impl IntoIterator<Item = Run>,
    ) {
        self.assert_range(&range);
        let mut assembled: SmallVec<[Run; 4]> = SmallVec::new();

        let start = self.locate_mut(range.start);
        if start.offset < range.start {
            let prefix = &self.runs[start.index];
            assembled.push(Run::new(
                range.start - start.offset,
                prefix.attributes().clone(),
            ));
        }
        for run in runs {
            debug_assert!(run.len() > 0, "inserted runs must not be empty");
            push_coalesced(&mut assembled, run);
        }

        let end = self.locate_mut(range.end);
        let end_slot = if end.index < self.runs.len() && end.offset < range.end {
            let suffix = &self.runs[end.index];
            let suffix_len = end.offset + suffix.len() - range.end;
            push_coalesced(
                &mut assembled,
                Run::new(suffix_len, suffix.attributes().clone()),
            );
            end.index + 1
        } else {
            end.index
        };

        self.replace_slots(start.index..end_slot, assembled);
    }

    /// Replaces the run table slots in `slots` with `runs` and merges the new edges.
    ///
    /// `runs` must be coalesced among themselves but may equal their new neighbours.
    pub(crate) fn replace_slots(
        &mut self,
        slots: Range<usize>,
        runs: impl IntoIterator<Item = Run>,
    ) {
        let hint = self.cache.get_mut();
        if hint.index > slots.start {
            // Slots before the splice keep their offsets, so the start of it stays valid.
            seek_index(&self.runs, hint, slots.start);
        }

        let before = self.runs.len();
        let removed = slots.len();
        self.runs.splice(slots.clone(), runs);
        let inserted = self.runs.len() + removed - before;

        let hint = self.cache.get_mut();
        let right_edge = slots.start + inserted;
        if equal_neighbours(&self.runs, right_edge) {
            merge_into_previous(&mut self.runs, hint, right_edge);
        }
        if inserted > 0 && equal_neighbours(&self.runs, slots.start) {
            merge_into_previous(&mut self.runs, hint, slots.start);
        }

        #[cfg(test)]
        {
            self.splices += 1;
        }
        log::trace!(
            "replaced run slots {}..{} with {inserted} runs, table now has {} runs",
            slots.start,
            slots.end,
            self.runs.len()
        );
    }

    /// Overwrites the run at `index` with `run`, which must have the same length, and merges it
    /// with its neighbours when their attributes are equal.
    ///
    /// Returns the slot of the run that now contains the updated bytes.
    pub(crate) fn update_and_coalesce(&mut self, run: Run, index: usize) -> usize {
        assert!(
            index < self.runs.len(),
            "run index {index} is out of bounds for {} runs",
            self.runs.len()
        );
        debug_assert_eq!(
            self.runs[index].len(),
            run.len(),
            "updating a run must not change its length"
        );
        self.runs[index] = run;

        let mut index = index;
        let hint = self.cache.get_mut();
        if equal_neighbours(&self.runs, index + 1) {
            merge_into_previous(&mut self.runs, hint, index + 1);
        }
        if equal_neighbours(&self.runs, index) {
            merge_into_previous(&mut self.runs, hint, index);
            index -= 1;
        }

        #[cfg(test)]
        {
            self.splices += 1;
        }
        index
    }
}

/// Whether the runs at `index - 1` and `index` both exist and carry equal attributes.
fn equal_neighbours(runs: &[Run], index: usize) -> bool {
    index > 0 && index < runs.len() && runs[index - 1].attributes() == runs[index].attributes()
}

/// Folds the run at `index` into the one before it, keeping `hint` pointing at the same bytes.
fn merge_into_previous(runs: &mut Vec<Run>, hint: &mut RunOffset, index: usize) {
    let merged = runs.remove(index);
    let previous = &mut runs[index - 1];
    if hint.index == index {
        hint.index -= 1;
        hint.offset -= previous.len();
    } else if hint.index > index {
        hint.index -= 1;
    }
    previous.grow(merged.len());
}

#[cfg(test)]
mod tests {
    use crate::Run;
    use crate::guts::tests::{guts, shape, x};
    use crate::location_cache::RunOffset;
    use alloc::vec;
    use alloc::vec::Vec;

    fn runs(shape: &[(usize, u32)]) -> Vec<Run> {
        shape
            .iter()
            .map(|&(len, value)| Run::new(len, x(value)))
            .collect()
    }

    /// Checks that the cached location names the real start of its run.
    fn assert_cache_consistent(g: &crate::guts::Guts) {
        let hint = g.cache.snapshot();
        assert!(hint.index <= g.runs.len(), "cache points past the table");
        let expected: usize = g.runs[..hint.index].iter().map(Run::len).sum();
        assert_eq!(hint.offset, expected, "cache offset disagrees with its index");
    }

    #[test]
    fn replacement_merges_with_left_neighbour() {
        let mut g = guts("aaabbb", &[(3, 1), (3, 2)]);
        g.replace_text(2..4, "cc", runs(&[(2, 1)]));
        assert_eq!(g.text, "aaccbb");
        assert_eq!(shape(&g), vec![(4, 1), (2, 2)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn replacement_splits_a_run() {
        let mut g = guts("aaaaaa", &[(6, 1)]);
        g.replace_runs(2..4, runs(&[(2, 2)]));
        assert_eq!(shape(&g), vec![(2, 1), (2, 2), (2, 1)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn replacement_bridges_equal_neighbours() {
        let mut g = guts("aaabbbccc", &[(3, 1), (3, 2), (3, 1)]);
        g.replace_runs(3..6, runs(&[(3, 1)]));
        assert_eq!(shape(&g), vec![(9, 1)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn deletion_joins_equal_neighbours() {
        let mut g = guts("aaabbbaaa", &[(3, 1), (3, 2), (3, 1)]);
        let _ = g.locate(8);
        g.replace_text(3..6, "", Vec::new());
        assert_eq!(g.text, "aaaaaa");
        assert_eq!(shape(&g), vec![(6, 1)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn insertion_at_boundaries() {
        let mut g = guts("aaabbb", &[(3, 1), (3, 2)]);
        g.replace_text(3..3, "c", runs(&[(1, 3)]));
        assert_eq!(shape(&g), vec![(3, 1), (1, 3), (3, 2)]);
        g.replace_text(0..0, "d", runs(&[(1, 1)]));
        assert_eq!(shape(&g), vec![(4, 1), (1, 3), (3, 2)]);
        g.replace_text(8..8, "e", runs(&[(1, 4)]));
        assert_eq!(g.text, "daaacbbbe");
        assert_eq!(shape(&g), vec![(4, 1), (1, 3), (3, 2), (1, 4)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn idempotent_replace_keeps_boundaries() {
        let mut g = guts("aaabbbccc", &[(3, 1), (3, 2), (3, 3)]);
        let before = g.runs.clone();
        let same = g.runs_in(2..7);
        g.replace_runs(2..7, same);
        assert_eq!(g.runs, before);
        assert_cache_consistent(&g);
    }

    #[test]
    fn cache_never_dangles_after_shrinking() {
        let mut g = guts(
            "abcdefgh",
            &[(1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (1, 6), (1, 7), (1, 8)],
        );
        let _ = g.locate(7);
        assert_eq!(g.cache.snapshot().index, 7);
        g.replace_text(1..8, "z", runs(&[(1, 1)]));
        assert_eq!(shape(&g), vec![(2, 1)]);
        assert_cache_consistent(&g);
        // Lookups after the splice land where they should.
        assert_eq!(g.locate(1), RunOffset { offset: 0, index: 0 });
        assert_eq!(g.locate(2), RunOffset { offset: 2, index: 1 });
    }

    #[test]
    fn full_extent_adopts_runs() {
        let mut g = guts("aaabbb", &[(3, 1), (3, 2)]);
        let _ = g.locate(5);
        g.replace_text(0..6, "xy", runs(&[(1, 7), (1, 8)]));
        assert_eq!(shape(&g), vec![(1, 7), (1, 8)]);
        assert_eq!(g.cache.snapshot(), RunOffset::START);
    }

    #[test]
    fn update_and_coalesce_merges_both_sides() {
        let mut g = guts("aaabbbaaa", &[(3, 1), (3, 2), (3, 1)]);
        let _ = g.locate(7);
        let index = g.update_and_coalesce(Run::new(3, x(1)), 1);
        assert_eq!(index, 0);
        assert_eq!(shape(&g), vec![(9, 1)]);
        assert_cache_consistent(&g);
    }

    #[test]
    fn update_and_coalesce_without_neighbours() {
        let mut g = guts("aaabbbccc", &[(3, 1), (3, 2), (3, 3)]);
        let index = g.update_and_coalesce(Run::new(3, x(4)), 1);
        assert_eq!(index, 1);
        assert_eq!(shape(&g), vec![(3, 1), (3, 4), (3, 3)]);
    }
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Range-scoped traversal of the run table.

use alloc::sync::Arc;
use core::ops::{ControlFlow, Range};

use smallvec::SmallVec;

use crate::guts::Guts;
use crate::location_cache::RunOffset;
use crate::run::push_coalesced;
use crate::{AttributeSet, Run};

/// What a run visitor did to the run it was handed.
///
/// Visitors passed to [`AttributedText::update_runs`](crate::AttributedText::update_runs) may
/// report this to spare the comparison of the visited attributes with the stored ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunModification {
    /// The visitor did not say; attributes are compared to find out.
    #[default]
    Unknown,
    /// The attributes were changed.
    Modified,
    /// The attributes were left alone. The run table is not touched.
    Unmodified,
}

impl Guts {
    /// Calls `visit` with the attributes and clamped byte range of every run overlapping
    /// `range`, in order.
    pub(crate) fn for_each_run<'a>(
        &'a self,
        range: Range<usize>,
        mut visit: impl FnMut(&'a AttributeSet, Range<usize>) -> ControlFlow<()>,
    ) {
        self.assert_range(&range);
        if range.is_empty() {
            return;
        }
        let found = self.locate(range.start);
        let mut run_start = found.offset;
        for run in &self.runs[found.index..] {
            if run_start >= range.end {
                break;
            }
            let run_end = run_start + run.len();
            let clamped = run_start.max(range.start)..run_end.min(range.end);
            if visit(run.attributes(), clamped).is_break() {
                break;
            }
            run_start = run_end;
        }
    }

    /// Calls `visit` with every run overlapping `range`, in order, clamped to `range`.
    ///
    /// The visitor receives a copy of the run, its start offset and a [`RunModification`] it
    /// may fill in. Changed attributes are written back over the clamped bytes only, splitting
    /// the stored run when the clamp is partial, and re-coalesced with the neighbours.
    /// Enumeration resumes at the end of the clamped bytes, so every byte of `range` is
    /// visited exactly once even when a write merges runs.
    pub(crate) fn for_each_run_mut(
        &mut self,
        range: Range<usize>,
        mut visit: impl FnMut(&mut Run, usize, &mut RunModification) -> ControlFlow<()>,
    ) {
        self.assert_range(&range);
        let mut visited = 0_usize;
        let mut written = 0_usize;
        let mut offset = range.start;
        while offset < range.end {
            let found = self.locate_mut(offset);
            let stored = &self.runs[found.index];
            let clamped = offset..(found.offset + stored.len()).min(range.end);

            let mut run = Run::new(clamped.len(), stored.attributes().clone());
            let mut modification = RunModification::Unknown;
            let flow = visit(&mut run, clamped.start, &mut modification);
            visited += 1;
            run.set_len(clamped.len());

            if is_modified(stored, &run, modification) {
                written += 1;
                self.write_back(found, clamped.clone(), run);
            }
            if flow.is_break() {
                break;
            }
            offset = clamped.end;
        }
        log::trace!(
            "visited {visited} runs over {}..{}, wrote back {written}",
            range.start,
            range.end
        );
    }

    /// Like [`Guts::for_each_run_mut`], for storage that may be shared.
    ///
    /// Shared storage is visited in place and only copied at the first write.
    pub(crate) fn for_each_run_cow(
        guts: &mut Arc<Self>,
        range: Range<usize>,
        mut visit: impl FnMut(&mut Run, usize, &mut RunModification) -> ControlFlow<()>,
    ) {
        if let Some(unique) = Arc::get_mut(guts) {
            unique.for_each_run_mut(range, visit);
            return;
        }
        guts.assert_range(&range);
        let mut offset = range.start;
        while offset < range.end {
            let found = guts.locate(offset);
            let stored = &guts.runs[found.index];
            let clamped = offset..(found.offset + stored.len()).min(range.end);

            let mut run = Run::new(clamped.len(), stored.attributes().clone());
            let mut modification = RunModification::Unknown;
            let flow = visit(&mut run, clamped.start, &mut modification);
            run.set_len(clamped.len());

            if is_modified(stored, &run, modification) {
                // The copy has the same run table, so `found` still holds.
                let unique = Self::make_unique(guts);
                unique.write_back(found, clamped.clone(), run);
                if flow.is_continue() {
                    unique.for_each_run_mut(clamped.end..range.end, visit);
                }
                return;
            }
            if flow.is_break() {
                return;
            }
            offset = clamped.end;
        }
    }

    /// Writes `run` over the `clamped` bytes of the run located at `found`.
    fn write_back(&mut self, found: RunOffset, clamped: Range<usize>, run: Run) {
        let stored_len = self.runs[found.index].len();
        let run_end = found.offset + stored_len;
        if found.offset == clamped.start && run_end == clamped.end {
            self.update_and_coalesce(run, found.index);
        } else {
            let stored = self.runs[found.index].attributes().clone();
            let mut pieces: SmallVec<[Run; 3]> = SmallVec::new();
            push_coalesced(
                &mut pieces,
                Run::new(clamped.start - found.offset, stored.clone()),
            );
            push_coalesced(&mut pieces, run);
            push_coalesced(&mut pieces, Run::new(run_end - clamped.end, stored));
            self.replace_slots(found.index..found.index + 1, pieces);
        }
        self.debug_check_invariants();
    }
}

fn is_modified(stored: &Run, run: &Run, modification: RunModification) -> bool {
    match modification {
        RunModification::Unknown => run.attributes() != stored.attributes(),
        RunModification::Modified => true,
        RunModification::Unmodified => false,
    }
}

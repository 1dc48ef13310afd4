// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run lookup by byte offset or by run-table slot.
//!
//! Lookups scan linearly from the cached location when the target is closer to it than to the
//! start of the text, and from the start otherwise. Edits are overwhelmingly local and
//! sequential, so this is amortized constant time in practice without maintaining an index.

use crate::Run;
use crate::guts::Guts;
use crate::location_cache::RunOffset;

/// Finds the run containing `offset`, starting from `hint` when it is closer, and stores the
/// result back in `hint`.
///
/// At the end of the text this returns one past the last run.
pub(crate) fn seek_offset(runs: &[Run], hint: &mut RunOffset, offset: usize) -> RunOffset {
    debug_assert!(
        hint.index <= runs.len(),
        "location cache points past the run table"
    );
    let mut current = if offset > hint.offset / 2 {
        *hint
    } else {
        RunOffset::START
    };
    if current.offset <= offset {
        while current.index < runs.len() && current.offset + runs[current.index].len() <= offset {
            current.offset += runs[current.index].len();
            current.index += 1;
        }
    } else {
        while current.offset > offset {
            current.index -= 1;
            current.offset -= runs[current.index].len();
        }
    }
    *hint = current;
    current
}

/// Finds the start offset of run `index`, starting from `hint` when it is closer, and stores
/// the result back in `hint`.
pub(crate) fn seek_index(runs: &[Run], hint: &mut RunOffset, index: usize) -> RunOffset {
    debug_assert!(
        hint.index <= runs.len(),
        "location cache points past the run table"
    );
    let mut current = if index > hint.index / 2 {
        *hint
    } else {
        RunOffset::START
    };
    while current.index < index {
        current.offset += runs[current.index].len();
        current.index += 1;
    }
    while current.index > index {
        current.index -= 1;
        current.offset -= runs[current.index].len();
    }
    *hint = current;
    current
}

impl Guts {
    /// Locates the run containing `offset` through shared storage.
    ///
    /// # Panics
    ///
    /// If `offset` is past the end of the text.
    pub(crate) fn locate(&self, offset: usize) -> RunOffset {
        self.assert_offset(offset);
        let mut hint = self.cache.lock();
        seek_offset(&self.runs, &mut hint, offset)
    }

    /// Locates the start of run `index` through shared storage.
    ///
    /// `index` may be the number of runs, which locates the end of the text.
    ///
    /// # Panics
    ///
    /// If `index` is past the end of the run table.
    pub(crate) fn locate_index(&self, index: usize) -> RunOffset {
        self.assert_run_index(index);
        let mut hint = self.cache.lock();
        seek_index(&self.runs, &mut hint, index)
    }

    /// Like [`Guts::locate`], for callers that own the storage uniquely.
    pub(crate) fn locate_mut(&mut self, offset: usize) -> RunOffset {
        self.assert_offset(offset);
        seek_offset(&self.runs, self.cache.get_mut(), offset)
    }

    /// Like [`Guts::locate_index`], for callers that own the storage uniquely.
    pub(crate) fn locate_index_mut(&mut self, index: usize) -> RunOffset {
        self.assert_run_index(index);
        seek_index(&self.runs, self.cache.get_mut(), index)
    }

    /// The run containing `offset` and the offset it starts at, or `None` at the end of the
    /// text.
    pub(crate) fn run_containing(&self, offset: usize) -> Option<(&Run, usize)> {
        let found = self.locate(offset);
        self.runs.get(found.index).map(|run| (run, found.offset))
    }

    fn assert_run_index(&self, index: usize) {
        assert!(
            index <= self.runs.len(),
            "run index {index} is out of bounds for {} runs",
            self.runs.len()
        );
    }
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage shared by the copy-on-write [`AttributedText`](crate::AttributedText) handle.
//!
//! `Guts` owns the text buffer, the run table and the location cache. The run table is only
//! ever changed through the seek, splice and enumeration routines, which keep it in canonical
//! form:
//!
//! 1. the run lengths add up to the length of the text, and an empty text has no runs;
//! 2. no run is empty;
//! 3. no two adjacent runs have equal attributes.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use core::hash::{Hash, Hasher};
use core::ops::Range;

use crate::location_cache::LocationCache;
use crate::run::push_coalesced;
use crate::{AttributeSet, Endpoint, Error, Run};

#[derive(Default)]
pub(crate) struct Guts {
    pub(crate) text: String,
    pub(crate) runs: Vec<Run>,
    pub(crate) cache: LocationCache,
    /// Number of calls into the splice entry points.
    #[cfg(test)]
    pub(crate) splices: usize,
}

impl Guts {
    /// Storage for `text` with every byte carrying `attributes`.
    pub(crate) fn with_attributes(text: String, attributes: AttributeSet) -> Self {
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            alloc::vec![Run::new(text.len(), attributes)]
        };
        Self::from_parts(text, runs)
    }

    /// Validates `runs` against `text` and builds storage from them.
    ///
    /// Adjacent runs with equal attributes are merged, so callers do not need to coalesce.
    pub(crate) fn try_from_runs(
        text: String,
        runs: impl IntoIterator<Item = Run>,
    ) -> Result<Self, Error> {
        let len = text.len();
        let mut table = Vec::new();
        let mut covered = 0_usize;
        for run in runs {
            if run.len() == 0 {
                return Err(Error::empty_run(covered, len));
            }
            covered = covered.saturating_add(run.len());
            if covered > len {
                return Err(Error::run_coverage(covered, len));
            }
            if !text.is_char_boundary(covered) {
                return Err(Error::not_on_char_boundary(
                    &text,
                    covered - run.len(),
                    covered,
                    len,
                    Endpoint::End,
                    covered,
                ));
            }
            push_coalesced(&mut table, run);
        }
        if covered != len {
            return Err(Error::run_coverage(covered, len));
        }
        Ok(Self::from_parts(text, table))
    }

    /// A fresh copy of the `range` bytes of this storage, with the run table clamped to it.
    pub(crate) fn slice(&self, range: Range<usize>) -> Self {
        self.assert_range(&range);
        let text = String::from(&self.text[range.clone()]);
        let runs = self.runs_in(range);
        Self::from_parts(text, runs)
    }

    fn from_parts(text: String, runs: Vec<Run>) -> Self {
        let guts = Self {
            text,
            runs,
            ..Self::default()
        };
        guts.debug_check_invariants();
        guts
    }

    /// The runs overlapping `range`, with the first and last clamped to it.
    ///
    /// The result is coalesced because the run table is.
    pub(crate) fn runs_in(&self, range: Range<usize>) -> Vec<Run> {
        self.assert_range(&range);
        let mut runs = Vec::new();
        self.for_each_run(range, |attributes, clamped| {
            runs.push(Run::new(clamped.len(), attributes.clone()));
            core::ops::ControlFlow::Continue(())
        });
        runs
    }

    /// Attributes for text inserted over `range` when the caller supplies none.
    ///
    /// This is the attribute set of the first replaced run or, for an insertion, the run just
    /// before the insertion point (the first run when inserting at the start).
    pub(crate) fn attributes_for_replacement(&self, range: Range<usize>) -> AttributeSet {
        if self.text.is_empty() {
            return AttributeSet::new();
        }
        let found = self.locate(range.start);
        let index = if range.is_empty() && found.offset == range.start && found.index > 0 {
            // An insertion at a run boundary continues the run before it.
            found.index - 1
        } else {
            found.index
        };
        self.runs[index].attributes().clone()
    }

    /// Replaces the `range` bytes of the text with `text`, carrying `runs`.
    ///
    /// `runs` must cover `text` exactly and be coalesced.
    pub(crate) fn replace_text(
        &mut self,
        range: Range<usize>,
        text: &str,
        runs: impl IntoIterator<Item = Run>,
    ) {
        self.assert_range(&range);
        if range.start == 0 && range.end == self.text.len() {
            // Nothing survives, so the new runs are adopted as they are.
            self.text.clear();
            self.text.push_str(text);
            self.runs.clear();
            self.runs.extend(runs);
            self.cache.reset();
            #[cfg(test)]
            {
                self.splices += 1;
            }
        } else {
            self.splice_runs(range.clone(), runs);
            if self.text[range.clone()] != *text {
                self.text.replace_range(range, text);
            }
        }
        self.debug_check_invariants();
    }

    /// Unique access to shared storage, copying it first if another handle holds it.
    pub(crate) fn make_unique(this: &mut Arc<Self>) -> &mut Self {
        if Arc::strong_count(this) > 1 {
            log::debug!(
                "copying shared attributed text storage ({} bytes, {} runs) before mutation",
                this.text.len(),
                this.runs.len()
            );
        }
        Arc::make_mut(this)
    }

    /// Checks that `range` is in bounds and on character boundaries of this text.
    ///
    /// A range validated against another text can satisfy the first but not the second.
    pub(crate) fn assert_range(&self, range: &Range<usize>) {
        assert!(
            range.start <= range.end && range.end <= self.text.len(),
            "range {}..{} is out of bounds for attributed text of len {}",
            range.start,
            range.end,
            self.text.len()
        );
        assert!(
            self.text.is_char_boundary(range.start) && self.text.is_char_boundary(range.end),
            "range {}..{} is not on character boundaries of the attributed text",
            range.start,
            range.end
        );
    }

    pub(crate) fn assert_offset(&self, offset: usize) {
        assert!(
            offset <= self.text.len(),
            "offset {offset} is out of bounds for attributed text of len {}",
            self.text.len()
        );
        assert!(
            self.text.is_char_boundary(offset),
            "offset {offset} is not on a character boundary of the attributed text"
        );
    }

    /// Checks the run table invariants in debug builds.
    pub(crate) fn debug_check_invariants(&self) {
        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(
                self.text.is_empty(),
                self.runs.is_empty(),
                "an attributed text has runs exactly when its text is non-empty"
            );
            debug_assert!(
                self.runs.iter().all(|run| run.len() > 0),
                "run table contains an empty run"
            );
            debug_assert_eq!(
                self.runs.iter().map(Run::len).sum::<usize>(),
                self.text.len(),
                "run lengths do not cover the text"
            );
            debug_assert!(
                self.runs
                    .windows(2)
                    .all(|pair| pair[0].attributes() != pair[1].attributes()),
                "run table contains adjacent runs with equal attributes"
            );
        }
    }
}

impl Clone for Guts {
    /// Copies the text and run table. The copy starts with an empty location cache.
    fn clone(&self) -> Self {
        Self {
            text: self.text.clone(),
            runs: self.runs.clone(),
            ..Self::default()
        }
    }
}

impl PartialEq for Guts {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.runs == other.runs
    }
}

impl Eq for Guts {}

impl Hash for Guts {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
        self.runs.hash(state);
    }
}

impl Debug for Guts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guts")
            .field("text", &self.text)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

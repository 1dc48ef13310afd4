// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::AttributeSet;

/// A contiguous span of text carrying one [`AttributeSet`].
///
/// This is the unit of the run table: an [`AttributedText`] is partitioned into runs whose
/// lengths, in UTF-8 bytes, add up to the length of the text. Runs are what
/// [`AttributedText::to_runs`] hands out and what [`AttributedText::from_runs`] accepts.
///
/// [`AttributedText`]: crate::AttributedText
/// [`AttributedText::to_runs`]: crate::AttributedText::to_runs
/// [`AttributedText::from_runs`]: crate::AttributedText::from_runs
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Run {
    len: usize,
    attributes: AttributeSet,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "Runs in a run table are never empty."
)]
impl Run {
    /// Creates a run of `len` bytes.
    pub fn new(len: usize, attributes: AttributeSet) -> Self {
        Self { len, attributes }
    }

    /// The length of the run in UTF-8 bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The attributes of the run.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Mutable access to the attributes of the run.
    pub fn attributes_mut(&mut self) -> &mut AttributeSet {
        &mut self.attributes
    }

    /// Consumes the run, returning its attributes.
    pub fn into_attributes(self) -> AttributeSet {
        self.attributes
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    pub(crate) fn grow(&mut self, by: usize) {
        self.len += by;
    }
}

/// Appends `run` to `runs`, folding it into the last run when the attributes are equal.
pub(crate) fn push_coalesced<E: Extend<Run> + AsMut<[Run]>>(runs: &mut E, run: Run) {
    if run.len == 0 {
        return;
    }
    if let Some(last) = runs.as_mut().last_mut() {
        if last.attributes == run.attributes {
            last.grow(run.len);
            return;
        }
    }
    runs.extend(core::iter::once(run));
}

#[cfg(test)]
mod tests {
    use super::{Run, push_coalesced};
    use crate::{AttributeSet, AttributeValue};
    use alloc::vec::Vec;

    fn attrs(x: u32) -> AttributeSet {
        let mut set = AttributeSet::new();
        set.insert_value("x", AttributeValue::new(x));
        set
    }

    #[test]
    fn push_coalesced_merges_equal_neighbours() {
        let mut runs = Vec::new();
        push_coalesced(&mut runs, Run::new(2, attrs(1)));
        push_coalesced(&mut runs, Run::new(3, attrs(1)));
        push_coalesced(&mut runs, Run::new(0, attrs(2)));
        push_coalesced(&mut runs, Run::new(1, attrs(2)));
        assert_eq!(runs, [Run::new(5, attrs(1)), Run::new(1, attrs(2))]);
    }
}

// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display};
use core::ops::ControlFlow;

use crate::guts::Guts;
use crate::views::{CharacterView, Runs, UnicodeScalarView};
use crate::{
    AttributeKey, AttributeSet, AttributeValue, Error, MergePolicy, Run, RunModification,
    TextIndex, TextRange,
};

/// A block of text with an [`AttributeSet`] applied to every byte.
///
/// The text is partitioned into [runs](Run) of bytes sharing equal attributes. The partition is
/// kept canonical: runs cover the whole text, none is empty, and no two neighbours carry equal
/// attributes. Two `AttributedText`s are equal when their text and runs are.
///
/// Cloning is cheap: clones share storage until one of them is mutated, at which point the
/// mutated clone makes its own copy.
///
/// Positions are given as [`TextIndex`] and [`TextRange`] values validated against the text
/// they are used with. Passing a position that is out of bounds for this text panics.
///
/// ```
/// use attributed_text::{AttributeKey, AttributedText, TextRange};
///
/// enum Bold {}
///
/// impl AttributeKey for Bold {
///     const NAME: &'static str = "bold";
///     type Value = bool;
/// }
///
/// let mut text = AttributedText::new("Hello, world!");
/// let hello = TextRange::new(&text, 0..5).unwrap();
/// text.set_value::<Bold>(hello, true);
///
/// assert_eq!(text.value::<Bold>(hello), Some(&true));
/// assert_eq!(text.runs().len(), 2);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributedText {
    guts: Arc<Guts>,
}

impl AttributedText {
    /// Creates an `AttributedText` with no attributes.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_attributes(text, AttributeSet::new())
    }

    /// Creates an `AttributedText` with `attributes` applied to all of `text`.
    pub fn with_attributes(text: impl Into<String>, attributes: AttributeSet) -> Self {
        Self::from_guts(Guts::with_attributes(text.into(), attributes))
    }

    /// Creates an `AttributedText` from `text` and the runs partitioning it.
    ///
    /// Adjacent runs with equal attributes are merged. Fails if a run is empty, if the runs do
    /// not add up to the length of `text`, or if a run ends inside a character.
    pub fn try_from_runs(
        text: impl Into<String>,
        runs: impl IntoIterator<Item = Run>,
    ) -> Result<Self, Error> {
        Guts::try_from_runs(text.into(), runs).map(Self::from_guts)
    }

    /// Like [`AttributedText::try_from_runs`], for runs known to be valid.
    ///
    /// # Panics
    ///
    /// If the runs do not partition `text`.
    pub fn from_runs(text: impl Into<String>, runs: impl IntoIterator<Item = Run>) -> Self {
        match Self::try_from_runs(text, runs) {
            Ok(text) => text,
            Err(err) => panic!("invalid runs for attributed text: {err}"),
        }
    }

    fn from_guts(guts: Guts) -> Self {
        Self {
            guts: Arc::new(guts),
        }
    }

    /// Borrow the underlying text.
    pub fn as_str(&self) -> &str {
        &self.guts.text
    }

    /// Returns the length of the text, in bytes.
    pub fn len(&self) -> usize {
        self.guts.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.guts.text.is_empty()
    }

    /// The index of the start of the text.
    pub fn start_index(&self) -> TextIndex {
        TextIndex::new_unchecked(0)
    }

    /// The index of the end of the text.
    pub fn end_index(&self) -> TextIndex {
        TextIndex::new_unchecked(self.len())
    }

    /// The range covering the whole text.
    pub fn full_range(&self) -> TextRange {
        TextRange::new_unchecked(0, self.len())
    }

    /// Validates a byte offset into this text.
    pub fn index_at_offset(&self, offset: usize) -> Result<TextIndex, Error> {
        TextIndex::new(self, offset)
    }

    /// Copies the `range` of this text, with its attributes, into a new `AttributedText`.
    pub fn slice(&self, range: TextRange) -> Self {
        Self::from_guts(self.guts.slice(range.as_range()))
    }

    /// A view of the runs of the whole text.
    pub fn runs(&self) -> Runs<'_> {
        Runs::new(&self.guts, self.full_range().as_range())
    }

    /// A view of the runs overlapping `range`, clamped to it.
    pub fn runs_in(&self, range: TextRange) -> Runs<'_> {
        Runs::new(&self.guts, range.as_range())
    }

    /// Copies out the runs overlapping `range`, clamped to it.
    ///
    /// Together with the text of `range`, the result can be handed to
    /// [`AttributedText::from_runs`] to rebuild the slice.
    pub fn to_runs(&self, range: TextRange) -> Vec<Run> {
        self.guts.runs_in(range.as_range())
    }

    /// The value of `K` shared by every run overlapping `range`.
    ///
    /// Returns `None` if any run lacks the attribute, if two runs disagree on it, or if `range`
    /// is empty.
    pub fn value<K: AttributeKey>(&self, range: TextRange) -> Option<&K::Value> {
        self.value_for_key(range, K::NAME)?
            .downcast_ref::<K::Value>()
    }

    /// The value of `K` at `index`, or `None` at the end of the text.
    pub fn value_at<K: AttributeKey>(&self, index: TextIndex) -> Option<&K::Value> {
        let (run, _) = self.guts.run_containing(index.offset())?;
        run.attributes().get::<K>()
    }

    /// The value stored under `name` shared by every run overlapping `range`.
    ///
    /// Returns `None` if any run lacks the attribute, if two runs disagree on it, or if `range`
    /// is empty.
    pub fn value_for_key(&self, range: TextRange, name: &str) -> Option<&AttributeValue> {
        let mut uniform: Option<&AttributeValue> = None;
        self.guts.for_each_run(range.as_range(), |attributes, _| {
            match (attributes.value(name), uniform) {
                (Some(value), None) => {
                    uniform = Some(value);
                    ControlFlow::Continue(())
                }
                (Some(value), Some(previous)) if value == previous => ControlFlow::Continue(()),
                _ => {
                    uniform = None;
                    ControlFlow::Break(())
                }
            }
        });
        uniform
    }

    /// The attributes every run overlapping `range` agrees on.
    pub fn uniform_attributes(&self, range: TextRange) -> AttributeSet {
        let mut uniform: Option<AttributeSet> = None;
        self.guts.for_each_run(range.as_range(), |attributes, _| {
            if let Some(common) = &mut uniform {
                common.intersect(attributes);
                if common.is_empty() {
                    return ControlFlow::Break(());
                }
            } else {
                uniform = Some(attributes.clone());
            }
            ControlFlow::Continue(())
        });
        uniform.unwrap_or_default()
    }

    /// A view of the text as grapheme clusters.
    pub fn characters(&self) -> CharacterView<'_> {
        CharacterView::new(self.as_str())
    }

    /// A view of the text as Unicode scalar values.
    pub fn unicode_scalars(&self) -> UnicodeScalarView<'_> {
        UnicodeScalarView::new(self.as_str())
    }

    /// Visits the runs overlapping `range`, clamped to it, and writes back what `visit` changes.
    ///
    /// `visit` gets a copy of each run, the index it starts at, and a [`RunModification`] it
    /// may set to skip the comparison against the stored attributes. Length changes are
    /// ignored. Returning [`ControlFlow::Break`] stops after the current run.
    ///
    /// ```
    /// use attributed_text::{AttributeSet, AttributeValue, AttributedText, TextRange};
    /// use core::ops::ControlFlow;
    ///
    /// let mut text = AttributedText::new("abcdef");
    /// let middle = TextRange::new(&text, 2..4).unwrap();
    /// text.update_runs(middle, |run, _, _| {
    ///     run.attributes_mut()
    ///         .insert_value("highlight", AttributeValue::new(true));
    ///     ControlFlow::Continue(())
    /// });
    /// assert_eq!(text.runs().len(), 3);
    /// ```
    pub fn update_runs(
        &mut self,
        range: TextRange,
        mut visit: impl FnMut(&mut Run, TextIndex, &mut RunModification) -> ControlFlow<()>,
    ) {
        self.guts.assert_range(&range.as_range());
        if range.is_empty() {
            return;
        }
        Guts::for_each_run_cow(
            &mut self.guts,
            range.as_range(),
            |run, start, modification| visit(run, TextIndex::new_unchecked(start), modification),
        );
    }

    /// Stores `value` under `K` across `range`.
    pub fn set_value<K: AttributeKey>(&mut self, range: TextRange, value: K::Value) {
        self.update_runs(range, |run, _, _| {
            run.attributes_mut().insert::<K>(value.clone());
            ControlFlow::Continue(())
        });
    }

    /// Removes `K` across `range`.
    pub fn remove_value<K: AttributeKey>(&mut self, range: TextRange) {
        self.remove_key(range, K::NAME);
    }

    /// Removes the attribute stored under `name` across `range`.
    pub fn remove_key(&mut self, range: TextRange, name: &str) {
        self.update_runs(range, |run, _, modification| {
            if run.attributes_mut().remove_key(name).is_none() {
                *modification = RunModification::Unmodified;
            }
            ControlFlow::Continue(())
        });
    }

    /// Merges `attributes` into every run across `range`.
    pub fn merge_attributes(
        &mut self,
        range: TextRange,
        attributes: &AttributeSet,
        policy: MergePolicy,
    ) {
        self.update_runs(range, |run, _, _| {
            run.attributes_mut().merge(attributes, policy);
            ControlFlow::Continue(())
        });
    }

    /// Replaces the attributes across `range` with `attributes`.
    pub fn set_attributes(&mut self, range: TextRange, attributes: AttributeSet) {
        self.guts.assert_range(&range.as_range());
        if range.is_empty() {
            return;
        }
        self.guts_mut()
            .replace_runs(range.as_range(), [Run::new(range.len(), attributes)]);
    }

    /// In every run holding all of `matching`, removes those attributes and merges in `with`.
    ///
    /// Does nothing when both sets are equal.
    pub fn replace_attributes(&mut self, matching: &AttributeSet, with: &AttributeSet) {
        if matching == with {
            return;
        }
        let range = self.full_range();
        self.update_runs(range, |run, _, modification| {
            if run.attributes().contains_all(matching) {
                let attributes = run.attributes_mut();
                attributes.retain(|name| !matching.contains_key(name));
                attributes.merge(with, MergePolicy::KeepNew);
                *modification = RunModification::Modified;
            } else {
                *modification = RunModification::Unmodified;
            }
            ControlFlow::Continue(())
        });
    }

    /// Keeps only the attributes whose name satisfies `keep`, across the whole text.
    ///
    /// Attribute names are never checked on insertion; this is how a caller restricts a text to
    /// the names it knows.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let range = self.full_range();
        self.update_runs(range, |run, _, _| {
            run.attributes_mut().retain(&mut keep);
            ControlFlow::Continue(())
        });
    }

    /// Replaces `range` with `replacement`, text and attributes.
    pub fn replace_range(&mut self, range: TextRange, replacement: &Self) {
        let runs = replacement.guts.runs.clone();
        self.guts_mut()
            .replace_text(range.as_range(), replacement.as_str(), runs);
    }

    /// Inserts `text` at `index`.
    pub fn insert(&mut self, index: TextIndex, text: &Self) {
        let at = TextRange::new_unchecked(index.offset(), index.offset());
        self.replace_range(at, text);
    }

    /// Appends `text` at the end.
    pub fn append(&mut self, text: &Self) {
        let end = self.end_index();
        self.insert(end, text);
    }

    /// Removes `range` from the text.
    pub fn remove_range(&mut self, range: TextRange) {
        self.guts.assert_range(&range.as_range());
        if range.is_empty() {
            return;
        }
        self.guts_mut()
            .replace_text(range.as_range(), "", Vec::new());
    }

    /// Replaces `range` with plain `text`.
    ///
    /// The new text takes the attributes of the first replaced character or, when `range` is
    /// empty, of the character before it (the first character when inserting at the start).
    pub fn replace_characters(&mut self, range: TextRange, text: &str) {
        let attributes = self.guts.attributes_for_replacement(range.as_range());
        let runs = if text.is_empty() {
            None
        } else {
            Some(Run::new(text.len(), attributes))
        };
        self.guts_mut().replace_text(range.as_range(), text, runs);
    }

    /// Replaces `range` with the Unicode scalar values of `scalars`.
    ///
    /// Attributes are chosen as for [`AttributedText::replace_characters`].
    pub fn replace_scalars(
        &mut self,
        range: TextRange,
        scalars: impl IntoIterator<Item = char>,
    ) {
        let text: String = scalars.into_iter().collect();
        self.replace_characters(range, &text);
    }

    /// Unique access to the storage, copying it first if it is shared.
    fn guts_mut(&mut self) -> &mut Guts {
        Guts::make_unique(&mut self.guts)
    }
}

impl From<&str> for AttributedText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for AttributedText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl Debug for AttributedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributedText")
            .field("text", &self.guts.text)
            .field("runs", &self.guts.runs)
            .finish()
    }
}

impl Display for AttributedText {
    /// Writes each run's text followed by its attributes, one run per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.runs().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let text = &self.as_str()[run.range().as_range()];
            write!(f, "{text} {}", run.attributes())?;
        }
        Ok(())
    }
}

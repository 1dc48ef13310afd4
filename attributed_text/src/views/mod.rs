// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only views of an [`AttributedText`](crate::AttributedText).
//!
//! Views borrow the text and convert between their own granularity (runs, projected runs,
//! grapheme clusters or scalar values) and [`TextIndex`](crate::TextIndex) positions.

mod chars;
mod projected;
mod runs;

pub use self::chars::{CharacterView, UnicodeScalarView};
pub use self::projected::{ProjectedRuns, ProjectedRunsIter};
pub use self::runs::{AttributedRun, RunIndex, Runs, RunsIter};

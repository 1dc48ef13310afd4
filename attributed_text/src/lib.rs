// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Attributed Text is a Rust crate for storing text with a set of attributes applied to every
//! byte of it.
//!
//! An [`AttributedText`] pairs a UTF-8 string with a partition of it into [runs](Run), each
//! carrying an [`AttributeSet`] of type-erased, string-keyed values. The partition is kept in
//! canonical form through every edit: the runs cover the text exactly, none of them is empty,
//! and no two neighbouring runs carry equal attributes.
//!
//! Lookups and edits find their run by scanning from the position of the previous lookup, so
//! localized, sequential work on a text stays cheap. Storage is reference counted and copied on
//! write, so cloning an `AttributedText` is cheap too.
//!
//! ```
//! use attributed_text::{AttributeKey, AttributedText, TextRange};
//!
//! enum Weight {}
//!
//! impl AttributeKey for Weight {
//!     const NAME: &'static str = "weight";
//!     type Value = u16;
//! }
//!
//! let mut text = AttributedText::new("Hello, world!");
//! let world = TextRange::new(&text, 7..12).unwrap();
//! text.set_value::<Weight>(world, 700);
//!
//! let runs: Vec<_> = text
//!     .runs()
//!     .iter()
//!     .map(|run| (run.range().as_range(), run.get::<Weight>().copied()))
//!     .collect();
//! assert_eq!(runs, [(0..7, None), (7..12, Some(700)), (12..13, None)]);
//! ```
//!
//! ## Features
//!
//! - `std` (enabled by default): Required. The run location cache is guarded by a
//!   `std::sync::Mutex`.
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
compile_error!("attributed_text requires the `std` feature to be enabled");

extern crate alloc;

mod attribute;
mod attributed_text;
mod enumerate;
mod error;
mod guts;
mod location_cache;
mod run;
mod seek;
mod splice;
mod text_range;
mod text_storage;
mod views;


pub use crate::attribute::{
    AttributeKey, AttributeSet, AttributeValue, ErasedAttributeValue, MergePolicy,
};
pub use crate::attributed_text::AttributedText;
pub use crate::enumerate::RunModification;
pub use crate::error::{BoundaryInfo, Endpoint, Error, ErrorKind};
pub use crate::run::Run;
pub use crate::text_range::{TextIndex, TextRange};
pub use crate::text_storage::TextStorage;
pub use crate::views::{
    AttributedRun, CharacterView, ProjectedRuns, ProjectedRunsIter, RunIndex, Runs, RunsIter,
    UnicodeScalarView,
};

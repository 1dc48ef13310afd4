// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The run location cache.
//!
//! This is a cache, not state: it remembers where the last lookup landed so that the next nearby
//! lookup can start scanning from there. It is never part of the value of an
//! [`AttributedText`](crate::AttributedText).
//!
//! Storage is shared between clones of an `AttributedText`, possibly across threads, and every
//! read through shared storage updates the cache. The cache therefore sits behind its own mutex,
//! separate from the copy-on-write uniqueness check that guards mutation of the run table.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A run-table slot together with the byte offset at which it starts.
///
/// `index` may equal the number of runs, in which case `offset` is the length of the text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunOffset {
    pub(crate) offset: usize,
    pub(crate) index: usize,
}

impl RunOffset {
    pub(crate) const START: Self = Self {
        offset: 0,
        index: 0,
    };
}

#[derive(Debug, Default)]
pub(crate) struct LocationCache {
    hint: Mutex<RunOffset>,
}

impl LocationCache {
    /// Locks the cache for the duration of a scan through shared storage.
    pub(crate) fn lock(&self) -> MutexGuard<'_, RunOffset> {
        self.hint.lock().unwrap_or_else(|poisoned| {
            // The hint may be half-written.
            let mut hint = poisoned.into_inner();
            *hint = RunOffset::START;
            self.hint.clear_poison();
            log::debug!("location cache lock was poisoned; hint reset");
            hint
        })
    }

    /// Exclusive access to the hint, for callers that already own the storage uniquely.
    pub(crate) fn get_mut(&mut self) -> &mut RunOffset {
        self.hint.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn reset(&mut self) {
        *self.get_mut() = RunOffset::START;
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> RunOffset {
        *self.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::{LocationCache, RunOffset};

    #[test]
    fn starts_at_the_beginning() {
        let cache = LocationCache::default();
        assert_eq!(cache.snapshot(), RunOffset::START);
    }

    #[test]
    fn reset_forgets_the_hint() {
        let mut cache = LocationCache::default();
        *cache.get_mut() = RunOffset {
            offset: 10,
            index: 3,
        };
        assert_eq!(cache.snapshot().index, 3);
        cache.reset();
        assert_eq!(cache.snapshot(), RunOffset::START);
    }
}

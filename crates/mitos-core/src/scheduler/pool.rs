// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Generic reuse cache for scheduler state records.

/// A record that can be recycled through a [`Pool`].
///
/// `reset` must return every field the record's lifecycle touches to its
/// documented default. Reset completeness is a hard correctness
/// requirement: any field left stale leaks state from one occupant of a
/// pooled record into the next, unrelated one.
pub trait Reusable: Default {
    /// Returns the record to its pristine state.
    fn reset(&mut self);
}

/// An unbounded reuse cache for state records.
///
/// `obtain` hands out a previously released instance when one is cached
/// and constructs a fresh default otherwise; `release` resets the record
/// and caches it. The pool imposes no capacity bound — steady-state record
/// count is assumed bounded by the caller, so unbounded growth is an
/// accepted tradeoff rather than a defect.
pub struct Pool<T: Reusable> {
    free: Vec<T>,
}

impl<T: Reusable> Pool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Returns a pristine record, recycled or freshly constructed.
    pub fn obtain(&mut self) -> T {
        self.free.pop().unwrap_or_default()
    }

    /// Resets a record and returns it to the cache.
    pub fn release(&mut self, mut record: T) {
        record.reset();
        self.free.push(record);
    }

    /// Pre-builds `count` default records so the first `count` obtains
    /// construct nothing.
    pub fn prewarm(&mut self, count: usize) {
        self.free.reserve(count);
        for _ in 0..count {
            self.free.push(T::default());
        }
    }

    /// Number of records currently cached.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}

impl<T: Reusable> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

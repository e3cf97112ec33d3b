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

//! Point-in-time snapshots of scheduler occupancy and lifetime activity.

/// A snapshot of scheduler occupancy and lifetime counters.
///
/// Produced by [`Scheduler::stats`](crate::Scheduler::stats); all values
/// are consistent with each other because the scheduler mutates nothing
/// while the snapshot is taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Coroutines currently registered (active list plus next-tick buffer).
    pub live: usize,
    /// State records sitting in the reuse pool, ready to be handed out.
    pub pooled_states: usize,
    /// Total registry slots ever created (live plus recyclable).
    pub slot_capacity: usize,
    /// Coroutines ever submitted through `start`.
    pub started_lifetime: u64,
    /// Coroutines that ran to completion.
    pub finished_lifetime: u64,
    /// Coroutines released because of a stop request.
    pub stopped_lifetime: u64,
}

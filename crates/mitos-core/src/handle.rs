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

//! External capability referencing a scheduled coroutine.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::scheduler::slot::{StopSignal, Token};

/// A thin, cloneable capability referencing a scheduled coroutine.
///
/// Cloning a handle is cheap: it copies the registry token and bumps the
/// reference count of the shared stop signal. A handle does not keep its
/// coroutine alive in any way; once the target finishes (or is stopped)
/// and its slot is recycled, every outstanding handle becomes logically
/// inert.
#[derive(Debug, Clone)]
pub struct Handle {
    token: Token,
    signal: Arc<StopSignal>,
}

impl Handle {
    pub(crate) fn new(token: Token, signal: Arc<StopSignal>) -> Self {
        Self { token, signal }
    }

    /// Requests a cooperative stop of the referenced coroutine.
    ///
    /// Cooperative, not preemptive: a resumption already mid-step is not
    /// interrupted. The flag is consulted at the top of the coroutine's
    /// next scheduled evaluation, at which point the coroutine is released
    /// without being resumed again. Idempotent, and a silent no-op once
    /// the target has been recycled.
    pub fn request_stop(&self) {
        if self.signal.epoch.load(Ordering::Acquire) == self.token.generation {
            self.signal.stop.store(true, Ordering::Release);
            log::trace!("[Handle] Stop requested for {:?}", self.token);
        }
    }

    /// Returns `true` once the referenced coroutine has been released,
    /// whether it ran to completion or was stopped.
    pub fn is_finished(&self) -> bool {
        self.signal.epoch.load(Ordering::Acquire) != self.token.generation
    }

    /// The registry token this handle refers to.
    pub fn token(&self) -> Token {
        self.token
    }
}

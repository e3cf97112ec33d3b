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

//! The pooled per-coroutine record and its suspension causes.

use crate::coroutine::{Coroutine, Yield};
use crate::scheduler::pool::Reusable;
use crate::scheduler::slot::Token;

/// Why a registered coroutine is currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum WaitSpec {
    /// Ready: resume at the coroutine's next scheduled evaluation.
    #[default]
    NextTick,
    /// Suspended until the remaining seconds have been consumed by tick
    /// deltas. Resumption requires the remainder to go strictly negative;
    /// a tick landing exactly on the boundary still waits.
    Timer(f32),
    /// Suspended until the slot behind the token has been retired.
    WaitFor(Token),
}

impl WaitSpec {
    /// Maps a yielded request onto a suspension record.
    ///
    /// Negative and NaN delay requests clamp to a zero timer. Requests the
    /// scheduler does not specifically recognize suspend until the next
    /// tick, exactly as [`Yield::Continue`] does.
    pub(crate) fn from_request(request: Yield) -> Self {
        match request {
            Yield::Continue => WaitSpec::NextTick,
            Yield::Delay(seconds) => {
                WaitSpec::Timer(if seconds > 0.0 { seconds } else { 0.0 })
            }
            Yield::WaitFor(handle) => WaitSpec::WaitFor(handle.token()),
            #[allow(unreachable_patterns)]
            _ => WaitSpec::NextTick,
        }
    }
}

/// The pooled record backing one scheduled coroutine.
///
/// Holds the resumable body and the current suspension cause. The
/// cooperative stop flag lives in the slot's `StopSignal` rather than
/// here, so detached handles can set it without a borrow of the
/// scheduler; the signal is cleared on every slot (re-)registration.
pub(crate) struct CoroutineState {
    /// The resumable body. `None` only while pooled, or for the brief
    /// window during which the scheduler has taken it out to resume it.
    pub(crate) body: Option<Box<dyn Coroutine>>,
    /// The current suspension cause.
    pub(crate) wait: WaitSpec,
}

impl Default for CoroutineState {
    fn default() -> Self {
        Self {
            body: None,
            wait: WaitSpec::default(),
        }
    }
}

impl Reusable for CoroutineState {
    fn reset(&mut self) {
        self.body = None;
        self.wait = WaitSpec::default();
    }
}

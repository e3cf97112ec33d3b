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

//! The resumable-sequence interface the scheduler drives.
//!
//! A coroutine is a lazy sequence of steps: each call to
//! [`Coroutine::resume`] runs the body up to its next suspension point and
//! reports either a [`Yield`] describing how the body wants to be resumed,
//! or that the body has run to completion. Bodies can be hand-written
//! state machines implementing the trait directly, or closures wrapped
//! through [`from_fn`].

use crate::handle::Handle;
use crate::scheduler::Context;

/// The outcome of driving a coroutine one step.
pub enum Step {
    /// The body reached a suspension point and describes how it wants to
    /// be resumed.
    Yielded(Yield),
    /// The body ran to completion and will never be resumed again.
    Finished,
}

/// A suspension request produced by a yielding coroutine.
///
/// The enum is non-exhaustive so new suspension causes can be introduced
/// without breaking downstream bodies; the scheduler treats any variant it
/// does not specifically recognize as [`Yield::Continue`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Yield {
    /// Resume on the next tick.
    Continue,
    /// Resume once the given number of seconds of tick time has been
    /// consumed. Negative requests are clamped to zero.
    Delay(f32),
    /// Resume once the coroutine behind the handle has finished.
    WaitFor(Handle),
}

/// A suspendable unit of work, resumed at most once per tick.
///
/// One call to `resume` equals one cooperative step: the body runs until
/// it either yields or finishes, and nothing interrupts it in between. A
/// body that never yields starves the frame it runs in; the scheduler
/// offers no protection against this.
pub trait Coroutine {
    /// Runs the body up to its next suspension point or to completion.
    ///
    /// The [`Context`] is the scheduler re-entry surface: it lets a
    /// running body start further coroutines, which are registered for the
    /// following tick rather than the list currently being scanned.
    fn resume(&mut self, ctx: &mut Context<'_>) -> Step;
}

/// Adapter implementing [`Coroutine`] for a resumable closure.
///
/// Built through [`from_fn`]; the closure's captured state carries the
/// machine from one resumption to the next.
pub struct FnCoroutine<F> {
    f: F,
}

impl<F> Coroutine for FnCoroutine<F>
where
    F: FnMut(&mut Context<'_>) -> Step,
{
    fn resume(&mut self, ctx: &mut Context<'_>) -> Step {
        (self.f)(ctx)
    }
}

/// Builds a coroutine from an `FnMut` closure.
///
/// The cheapest way to express a hand-written resumable state machine:
///
/// ```
/// use mitos_core::{from_fn, Scheduler, Step, Yield};
///
/// let mut scheduler = Scheduler::new();
/// let mut beats = 3u32;
/// scheduler.start(from_fn(move |_ctx| {
///     if beats == 0 {
///         return Step::Finished;
///     }
///     beats -= 1;
///     Step::Yielded(Yield::Delay(0.5))
/// }));
/// ```
pub fn from_fn<F>(f: F) -> FnCoroutine<F>
where
    F: FnMut(&mut Context<'_>) -> Step,
{
    FnCoroutine { f }
}

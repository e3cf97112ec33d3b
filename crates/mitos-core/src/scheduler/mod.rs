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

//! The scheduler: active-work registry, submission, and the tick loop.

pub mod pool;
pub mod stats;

pub(crate) mod slot;
mod state;

use std::fmt;

use crate::coroutine::{Coroutine, Step};
use crate::handle::Handle;

use pool::Pool;
use slot::{SlotStore, Token};
use state::{CoroutineState, WaitSpec};
use stats::SchedulerStats;

/// Construction-time tuning for a [`Scheduler`].
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Registry slots and list entries to reserve up front.
    pub initial_capacity: usize,
    /// State records to pre-build in the reuse pool, so the first starts
    /// construct nothing.
    pub prewarmed_states: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 32,
            prewarmed_states: 0,
        }
    }
}

/// Outcome of one resumption, from the registry's point of view.
enum StepOutcome {
    /// The coroutine finished (or was unresumable) and has been released.
    Finished,
    /// The coroutine yielded and is resident again, awaiting scheduling.
    Pending,
}

/// A cooperative, tick-driven scheduler for suspendable coroutines.
///
/// The scheduler owns the active-work registry and resumes every
/// registered coroutine at most once per [`tick`](Scheduler::tick). It is
/// constructed explicitly by the host application and driven from one
/// logical thread; all resumption happens synchronously inside the
/// driver's call. Entries are evaluated in submission order, and entries
/// added while a tick is in progress are double-buffered into the
/// following tick's list, never the one being scanned.
pub struct Scheduler {
    store: SlotStore,
    pool: Pool<CoroutineState>,
    /// Entries evaluated by the current (or upcoming) tick, in insertion
    /// order.
    active: Vec<Token>,
    /// Entries carried over or added mid-tick; swapped into `active` when
    /// the scan completes.
    next: Vec<Token>,
    /// Reentrancy guard: set for the duration of a tick scan so
    /// registrations route into `next`.
    ticking: bool,
    started_lifetime: u64,
    finished_lifetime: u64,
    stopped_lifetime: u64,
}

impl Scheduler {
    /// Creates a scheduler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a scheduler with explicit tuning.
    pub fn with_config(config: SchedulerConfig) -> Self {
        let mut pool = Pool::new();
        pool.prewarm(config.prewarmed_states);
        Self {
            store: SlotStore::with_capacity(config.initial_capacity),
            pool,
            active: Vec::with_capacity(config.initial_capacity),
            next: Vec::with_capacity(config.initial_capacity),
            ticking: false,
            started_lifetime: 0,
            finished_lifetime: 0,
            stopped_lifetime: 0,
        }
    }

    /// Submits a coroutine and synchronously drives it to its first
    /// suspension point.
    ///
    /// Returns `None` when that first step already finishes the body —
    /// the state goes straight back to the pool and there is nothing left
    /// to stop. Otherwise the coroutine is registered (into the active
    /// list normally, into the next-tick buffer when a tick is in
    /// progress) and a [`Handle`] for it is returned.
    pub fn start<C>(&mut self, coroutine: C) -> Option<Handle>
    where
        C: Coroutine + 'static,
    {
        self.start_boxed(Box::new(coroutine))
    }

    /// Submits an already-boxed coroutine body. See [`Scheduler::start`].
    pub fn start_boxed(&mut self, body: Box<dyn Coroutine>) -> Option<Handle> {
        let mut state = self.pool.obtain();
        state.body = Some(body);
        let (token, signal) = self.store.insert(state);
        self.started_lifetime += 1;
        log::trace!("[Scheduler] Started coroutine {:?}", token);

        match self.resume_once(token) {
            StepOutcome::Finished => None,
            StepOutcome::Pending => {
                if self.ticking {
                    self.next.push(token);
                } else {
                    self.active.push(token);
                }
                Some(Handle::new(token, signal))
            }
        }
    }

    /// Advances every registered coroutine by one update cycle.
    ///
    /// `delta_seconds` is the elapsed time the driver attributes to this
    /// cycle; the scheduler never sources time itself. Entries are
    /// evaluated in insertion order: stopped ones are released, timed ones
    /// count down, dependent ones check their target, and ready ones are
    /// resumed exactly one step. Survivors and mid-tick additions are
    /// collected in a secondary buffer which becomes the next tick's
    /// active list.
    pub fn tick(&mut self, delta_seconds: f32) {
        self.ticking = true;
        let scheduled = self.active.len();
        log::trace!(
            "[Scheduler] Tick: {} scheduled, delta {:.4}s",
            scheduled,
            delta_seconds
        );
        for position in 0..scheduled {
            let token = self.active[position];
            self.evaluate(token, delta_seconds);
        }
        self.active.clear();
        std::mem::swap(&mut self.active, &mut self.next);
        self.ticking = false;
    }

    /// Requests a cooperative stop of every registered coroutine.
    ///
    /// Each one is released at its next scheduled evaluation, exactly as
    /// if [`Handle::request_stop`] had been called on it.
    pub fn stop_all(&self) {
        log::debug!("[Scheduler] Stop requested for all {} coroutines", self.len());
        self.store.signal_stop_all();
    }

    /// Number of currently registered coroutines.
    pub fn len(&self) -> usize {
        self.store.live_len()
    }

    /// Whether no coroutines are registered.
    pub fn is_idle(&self) -> bool {
        self.len() == 0
    }

    /// Takes a snapshot of occupancy and lifetime counters.
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            live: self.store.live_len(),
            pooled_states: self.pool.len(),
            slot_capacity: self.store.slot_len(),
            started_lifetime: self.started_lifetime,
            finished_lifetime: self.finished_lifetime,
            stopped_lifetime: self.stopped_lifetime,
        }
    }

    /// Evaluates one active entry: stop check, wait handling, resumption.
    fn evaluate(&mut self, token: Token, delta_seconds: f32) {
        if self.store.stop_requested(token) {
            if let Some(state) = self.store.take_state(token) {
                self.release(state, token);
                self.stopped_lifetime += 1;
                log::trace!("[Scheduler] Coroutine {:?} stopped", token);
            }
            return;
        }

        match self.store.wait_of(token) {
            None => return,
            Some(WaitSpec::WaitFor(target)) => {
                if self.store.is_live(target) {
                    self.next.push(token);
                    return;
                }
                // Target reached terminal state: resume this same pass.
                self.store.set_wait(token, WaitSpec::NextTick);
            }
            Some(WaitSpec::Timer(remaining)) => {
                let remaining = remaining - delta_seconds;
                if remaining >= 0.0 {
                    self.store.set_wait(token, WaitSpec::Timer(remaining));
                    self.next.push(token);
                    return;
                }
                // Timer expired. Overshoot is discarded, never banked.
                self.store.set_wait(token, WaitSpec::NextTick);
            }
            Some(WaitSpec::NextTick) => {}
        }

        if let StepOutcome::Pending = self.resume_once(token) {
            self.next.push(token);
        }
    }

    /// Resumes a coroutine exactly one step and applies the outcome.
    ///
    /// The state record is taken out of its slot for the duration of the
    /// call, so the body can re-enter the scheduler through [`Context`]
    /// without aliasing it.
    fn resume_once(&mut self, token: Token) -> StepOutcome {
        let Some(mut state) = self.store.take_state(token) else {
            return StepOutcome::Finished;
        };
        let Some(mut body) = state.body.take() else {
            self.release(state, token);
            return StepOutcome::Finished;
        };

        let mut ctx = Context {
            scheduler: &mut *self,
        };
        let step = body.resume(&mut ctx);

        match step {
            Step::Finished => {
                self.release(state, token);
                self.finished_lifetime += 1;
                log::trace!("[Scheduler] Coroutine {:?} finished", token);
                StepOutcome::Finished
            }
            Step::Yielded(request) => {
                state.body = Some(body);
                state.wait = WaitSpec::from_request(request);
                self.store.put_state(token, state);
                StepOutcome::Pending
            }
        }
    }

    /// Returns a state to the pool and retires its slot.
    fn release(&mut self, state: CoroutineState, token: Token) {
        self.pool.release(state);
        self.store.retire(token);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("live", &self.store.live_len())
            .field("pooled_states", &self.pool.len())
            .field("ticking", &self.ticking)
            .finish()
    }
}

/// Scheduler re-entry surface handed to every resuming coroutine body.
///
/// Starting a coroutine from here follows the usual submission contract
/// (one synchronous step, `None` on immediate exhaustion), except that
/// registration lands in the next tick's list — the scan in progress is
/// never mutated, so nothing is skipped or resumed twice in one pass.
pub struct Context<'a> {
    scheduler: &'a mut Scheduler,
}

impl Context<'_> {
    /// Starts a coroutine from inside another one's resumption.
    pub fn start<C>(&mut self, coroutine: C) -> Option<Handle>
    where
        C: Coroutine + 'static,
    {
        self.scheduler.start(coroutine)
    }

    /// Starts an already-boxed coroutine body. See [`Context::start`].
    pub fn start_boxed(&mut self, body: Box<dyn Coroutine>) -> Option<Handle> {
        self.scheduler.start_boxed(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coroutine::Yield;
    use crate::from_fn;

    fn forever() -> impl Coroutine {
        from_fn(|_| Step::Yielded(Yield::Continue))
    }

    #[test]
    fn start_registers_into_the_active_list() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.start(forever());
        assert!(handle.is_some());
        assert_eq!(scheduler.active.len(), 1);
        assert!(scheduler.next.is_empty());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn immediate_exhaustion_returns_none_and_registers_nothing() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.start(from_fn(|_| Step::Finished));
        assert!(handle.is_none());
        assert!(scheduler.active.is_empty());
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.stats().pooled_states, 1);
    }

    #[test]
    fn tick_swaps_survivors_into_the_active_list() {
        let mut scheduler = Scheduler::new();
        scheduler.start(forever());
        scheduler.start(forever());
        scheduler.tick(0.0);
        assert_eq!(scheduler.active.len(), 2);
        assert!(scheduler.next.is_empty());
        assert!(!scheduler.ticking);
    }

    #[test]
    fn released_states_return_to_the_pool() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.start(forever());
        assert_eq!(scheduler.stats().pooled_states, 0);
        if let Some(handle) = handle {
            handle.request_stop();
        }
        scheduler.tick(0.0);
        assert_eq!(scheduler.stats().pooled_states, 1);
        assert!(scheduler.is_idle());
    }
}

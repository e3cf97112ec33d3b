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

//! Behavioral coverage of the scheduler through its public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mitos_core::{from_fn, Coroutine, Handle, Scheduler, SchedulerConfig, Step, Yield};

/// A body that yields `Continue` forever, counting its resumptions.
fn forever(hits: Rc<Cell<u32>>) -> impl Coroutine {
    from_fn(move |_| {
        hits.set(hits.get() + 1);
        Step::Yielded(Yield::Continue)
    })
}

/// A body that yields `Continue` `yields` times, then finishes.
fn finite(yields: u32, hits: Rc<Cell<u32>>) -> impl Coroutine {
    let mut remaining = yields;
    from_fn(move |_| {
        hits.set(hits.get() + 1);
        if remaining == 0 {
            return Step::Finished;
        }
        remaining -= 1;
        Step::Yielded(Yield::Continue)
    })
}

#[test]
fn continue_coroutine_is_resumed_once_at_start_then_once_per_tick() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));

    // Three yields: resumed once at start, then once per tick for three
    // ticks, the last of which exhausts the body.
    let handle = scheduler.start(finite(3, hits.clone()));
    assert!(handle.is_some());
    assert_eq!(hits.get(), 1, "start performs one synchronous resumption");

    scheduler.tick(0.0);
    assert_eq!(hits.get(), 2);
    scheduler.tick(0.0);
    assert_eq!(hits.get(), 3);
    scheduler.tick(0.0);
    assert_eq!(hits.get(), 4, "fourth resumption exhausts the body");
    assert!(scheduler.is_idle(), "exhausted coroutine must be released");

    scheduler.tick(0.0);
    assert_eq!(hits.get(), 4, "released coroutine must never be resumed again");
}

#[test]
fn immediately_exhausting_coroutine_yields_no_handle() {
    let mut scheduler = Scheduler::new();
    let handle = scheduler.start(from_fn(|_| Step::Finished));
    assert!(handle.is_none(), "nothing is left to stop");
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.stats().started_lifetime, 1);
    assert_eq!(scheduler.stats().finished_lifetime, 1);
}

#[test]
fn delay_resumes_during_the_tick_that_exceeds_the_requested_seconds() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));
    let hits_in = hits.clone();
    let mut asked = false;
    scheduler.start(from_fn(move |_| {
        hits_in.set(hits_in.get() + 1);
        if asked {
            return Step::Finished;
        }
        asked = true;
        Step::Yielded(Yield::Delay(2.0))
    }));
    assert_eq!(hits.get(), 1);

    scheduler.tick(1.0);
    assert_eq!(hits.get(), 1, "1.0s consumed, still waiting");
    scheduler.tick(1.0);
    assert_eq!(
        hits.get(),
        1,
        "a tick landing exactly on the boundary still waits"
    );
    scheduler.tick(0.1);
    assert_eq!(hits.get(), 2, "cumulative 2.1s exceeds the 2.0s request");
    assert!(scheduler.is_idle());
}

#[test]
fn delay_overshoot_is_discarded_not_banked() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));
    let hits_in = hits.clone();
    let mut phase = 0u32;
    scheduler.start(from_fn(move |_| {
        hits_in.set(hits_in.get() + 1);
        phase += 1;
        match phase {
            1 => Step::Yielded(Yield::Delay(2.0)),
            2 => Step::Yielded(Yield::Delay(1.0)),
            _ => Step::Finished,
        }
    }));

    scheduler.tick(1.5);
    assert_eq!(hits.get(), 1);
    // 1.0s of excess beyond the 2.0s request is consumed here...
    scheduler.tick(1.5);
    assert_eq!(hits.get(), 2, "first delay satisfied");
    // ...and must not be credited against the second delay.
    scheduler.tick(1.0);
    assert_eq!(hits.get(), 2, "second delay starts from its full 1.0s");
    scheduler.tick(0.5);
    assert_eq!(hits.get(), 3);
    assert!(scheduler.is_idle());
}

#[test]
fn negative_delay_behaves_like_a_zero_delay() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));
    let hits_in = hits.clone();
    let mut asked = false;
    scheduler.start(from_fn(move |_| {
        hits_in.set(hits_in.get() + 1);
        if asked {
            return Step::Finished;
        }
        asked = true;
        Step::Yielded(Yield::Delay(-5.0))
    }));

    scheduler.tick(0.016);
    assert_eq!(hits.get(), 2, "clamped timer expires on the first real tick");
}

#[test]
fn waiter_resumes_in_the_pass_that_finds_its_target_terminal() {
    let mut scheduler = Scheduler::new();
    let a_hits = Rc::new(Cell::new(0));

    // B: one yield at start, finishes on its next resumption.
    let b_handle = scheduler
        .start(finite(1, Rc::new(Cell::new(0))))
        .expect("B should suspend once");

    // A: waits on B from its very first suspension point.
    let a_hits_in = a_hits.clone();
    let b_for_a = b_handle.clone();
    scheduler.start(from_fn(move |_| {
        a_hits_in.set(a_hits_in.get() + 1);
        if a_hits_in.get() == 1 {
            Step::Yielded(Yield::WaitFor(b_for_a.clone()))
        } else {
            Step::Finished
        }
    }));
    assert_eq!(a_hits.get(), 1);

    // B sits before A in the active list, so this tick retires B first
    // and A's wait check already sees a terminal target.
    scheduler.tick(0.0);
    assert!(b_handle.is_finished());
    assert_eq!(
        a_hits.get(),
        2,
        "A's wait clears and A resumes in the same pass"
    );
    assert!(scheduler.is_idle());
}

#[test]
fn waiter_checked_before_its_target_finishes_resumes_next_tick() {
    let mut scheduler = Scheduler::new();
    let a_hits = Rc::new(Cell::new(0));
    let b_slot: Rc<RefCell<Option<Handle>>> = Rc::new(RefCell::new(None));

    // A registers first so it is always evaluated before B.
    let a_hits_in = a_hits.clone();
    let b_lookup = b_slot.clone();
    scheduler.start(from_fn(move |_| {
        a_hits_in.set(a_hits_in.get() + 1);
        match b_lookup.borrow().as_ref() {
            Some(b) => Step::Yielded(Yield::WaitFor(b.clone())),
            None => Step::Yielded(Yield::Continue),
        }
    }));
    let b_handle = scheduler
        .start(finite(1, Rc::new(Cell::new(0))))
        .expect("B should suspend once");
    *b_slot.borrow_mut() = Some(b_handle.clone());
    assert_eq!(a_hits.get(), 1);

    // A resumes and records the wait; B finishes later in the same pass.
    scheduler.tick(0.0);
    assert_eq!(a_hits.get(), 2);
    assert!(b_handle.is_finished());

    // A was not revisited in the pass that retired B; it resumes on its
    // next scheduled evaluation.
    scheduler.tick(0.0);
    assert_eq!(a_hits.get(), 3);
}

#[test]
fn wait_on_an_already_terminal_handle_holds_for_one_evaluation() {
    let mut scheduler = Scheduler::new();

    let b_handle = scheduler
        .start(finite(1, Rc::new(Cell::new(0))))
        .expect("B should suspend once");
    scheduler.tick(0.0);
    assert!(b_handle.is_finished());

    // A yields a wait on a coroutine that is already gone. The wait is
    // recorded as-is and noticed at A's next evaluation, not instantly.
    let a_hits = Rc::new(Cell::new(0));
    let a_hits_in = a_hits.clone();
    scheduler.start(from_fn(move |_| {
        a_hits_in.set(a_hits_in.get() + 1);
        if a_hits_in.get() == 1 {
            Step::Yielded(Yield::WaitFor(b_handle.clone()))
        } else {
            Step::Finished
        }
    }));
    assert_eq!(a_hits.get(), 1);

    scheduler.tick(0.0);
    assert_eq!(a_hits.get(), 2, "terminal target noticed one evaluation later");
    assert!(scheduler.is_idle());
}

#[test]
fn request_stop_releases_without_another_resumption() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));
    let handle = scheduler
        .start(forever(hits.clone()))
        .expect("body yields forever");
    scheduler.tick(0.0);
    assert_eq!(hits.get(), 2);

    handle.request_stop();
    handle.request_stop(); // idempotent
    scheduler.tick(0.0);
    assert_eq!(hits.get(), 2, "stopped coroutine must not be resumed");
    assert!(scheduler.is_idle());
    assert!(handle.is_finished());
    assert_eq!(scheduler.stats().stopped_lifetime, 1);

    // Still a no-op after the slot has been recycled.
    handle.request_stop();
}

#[test]
fn stale_handle_cannot_stop_the_slot_recycled_under_it() {
    let mut scheduler = Scheduler::new();

    let first = scheduler
        .start(forever(Rc::new(Cell::new(0))))
        .expect("first occupant");
    first.request_stop();
    scheduler.tick(0.0);
    assert!(scheduler.is_idle());

    // The second coroutine reuses the freed slot under a new generation.
    let second_hits = Rc::new(Cell::new(0));
    let second = scheduler
        .start(forever(second_hits.clone()))
        .expect("second occupant");
    assert_eq!(second.token().index, first.token().index);
    assert_ne!(second.token().generation, first.token().generation);

    first.request_stop();
    scheduler.tick(0.0);
    assert_eq!(scheduler.len(), 1, "stale stop must not hit the new occupant");
    assert_eq!(second_hits.get(), 2);
}

#[test]
fn coroutine_started_mid_tick_runs_next_tick_exactly_once() {
    let mut scheduler = Scheduler::new();
    let child_hits = Rc::new(Cell::new(0));
    let parent_hits = Rc::new(Cell::new(0));

    let child_hits_in = child_hits.clone();
    let parent_hits_in = parent_hits.clone();
    scheduler.start(from_fn(move |ctx| {
        parent_hits_in.set(parent_hits_in.get() + 1);
        if parent_hits_in.get() == 2 {
            let spawned = child_hits_in.clone();
            ctx.start(forever(spawned));
        }
        Step::Yielded(Yield::Continue)
    }));
    assert_eq!(child_hits.get(), 0);

    // The parent spawns during this pass; the child runs its synchronous
    // first step but is not evaluated again within the same pass.
    scheduler.tick(0.0);
    assert_eq!(child_hits.get(), 1, "one synchronous step, no double resume");
    assert_eq!(scheduler.len(), 2);

    scheduler.tick(0.0);
    assert_eq!(child_hits.get(), 2, "child joins the following tick exactly once");
}

#[test]
fn stop_all_releases_every_registered_coroutine() {
    let mut scheduler = Scheduler::new();
    let hits = Rc::new(Cell::new(0));
    scheduler.start(forever(hits.clone()));
    scheduler.start(forever(hits.clone()));
    scheduler.start(forever(hits.clone()));
    assert_eq!(scheduler.len(), 3);
    assert_eq!(hits.get(), 3);

    scheduler.stop_all();
    scheduler.tick(0.0);
    assert!(scheduler.is_idle());
    assert_eq!(hits.get(), 3, "no coroutine runs past the stop");
    assert_eq!(scheduler.stats().stopped_lifetime, 3);
}

#[test]
fn handle_clones_agree_on_completion() {
    let mut scheduler = Scheduler::new();
    let handle = scheduler
        .start(finite(1, Rc::new(Cell::new(0))))
        .expect("one yield before finishing");
    let clone = handle.clone();
    assert!(!handle.is_finished());
    assert!(!clone.is_finished());

    scheduler.tick(0.0);
    assert!(handle.is_finished());
    assert!(clone.is_finished());
}

#[test]
fn prewarmed_pool_serves_starts_without_construction() {
    let mut scheduler = Scheduler::with_config(SchedulerConfig {
        initial_capacity: 8,
        prewarmed_states: 2,
    });
    assert_eq!(scheduler.stats().pooled_states, 2);

    scheduler.start(forever(Rc::new(Cell::new(0))));
    scheduler.start(forever(Rc::new(Cell::new(0))));
    assert_eq!(scheduler.stats().pooled_states, 0);

    scheduler.start(forever(Rc::new(Cell::new(0))));
    scheduler.stop_all();
    scheduler.tick(0.0);
    assert_eq!(
        scheduler.stats().pooled_states,
        3,
        "every released state returns to the pool"
    );
}

#[test]
fn lifetime_counters_track_each_terminal_event_once() {
    let mut scheduler = Scheduler::new();

    scheduler.start(from_fn(|_| Step::Finished));
    let stopped = scheduler
        .start(forever(Rc::new(Cell::new(0))))
        .expect("runs until stopped");
    scheduler.start(finite(1, Rc::new(Cell::new(0))));

    stopped.request_stop();
    scheduler.tick(0.0);
    scheduler.tick(0.0);

    let stats = scheduler.stats();
    assert_eq!(stats.started_lifetime, 3);
    assert_eq!(stats.finished_lifetime, 2);
    assert_eq!(stats.stopped_lifetime, 1);
    assert_eq!(stats.live, 0);
}

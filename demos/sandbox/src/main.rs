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

// Mitos Sandbox
// Small scripted scene exercising delays, dependencies and cooperative stop.

use anyhow::Result;
use mitos_core::{from_fn, Context, Coroutine, Scheduler, SchedulerConfig, Step, Yield};

/// Fixed simulation step, thirty updates per simulated second.
const STEP_SECONDS: f32 = 1.0 / 30.0;

/// A countdown that logs one beat per interval, written as an explicit
/// state machine rather than a closure.
struct Countdown {
    label: &'static str,
    remaining: u32,
    interval: f32,
}

impl Coroutine for Countdown {
    fn resume(&mut self, _ctx: &mut Context<'_>) -> Step {
        if self.remaining == 0 {
            log::info!("[{}] Lift-off!", self.label);
            return Step::Finished;
        }
        log::info!("[{}] {}...", self.label, self.remaining);
        self.remaining -= 1;
        Step::Yielded(Yield::Delay(self.interval))
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut scheduler = Scheduler::with_config(SchedulerConfig {
        initial_capacity: 16,
        prewarmed_states: 4,
    });

    // A three-beat countdown, one beat per simulated second.
    let countdown = scheduler
        .start(Countdown {
            label: "Countdown",
            remaining: 3,
            interval: 1.0,
        })
        .expect("countdown suspends on its first beat");

    // A watcher that blocks on the countdown, then spawns a follow-up
    // coroutine mid-tick once it unblocks.
    let mut announced = false;
    scheduler.start(from_fn(move |ctx| {
        if !announced {
            announced = true;
            log::info!("[Watcher] Holding until the countdown finishes");
            return Step::Yielded(Yield::WaitFor(countdown.clone()));
        }
        log::info!("[Watcher] Countdown done, starting the encore");
        ctx.start(Countdown {
            label: "Encore",
            remaining: 2,
            interval: 0.5,
        });
        Step::Finished
    }));

    // A chatterbox that would run forever; stopped from the outside once
    // the scene winds down.
    let mut beats = 0u32;
    let chatter = scheduler
        .start(from_fn(move |_ctx| {
            beats += 1;
            if beats % 30 == 0 {
                log::info!("[Chatter] Still ticking ({beats} beats)");
            }
            Step::Yielded(Yield::Continue)
        }))
        .expect("chatter never finishes on its own");

    let mut elapsed = 0.0f32;
    while !scheduler.is_idle() {
        scheduler.tick(STEP_SECONDS);
        elapsed += STEP_SECONDS;

        // Give the scene six simulated seconds, then wind down.
        if elapsed >= 6.0 && !chatter.is_finished() {
            log::info!("[Sandbox] Scene over, stopping the chatterbox");
            chatter.request_stop();
        }
    }

    let stats = scheduler.stats();
    log::info!(
        "[Sandbox] Done after {:.1}s simulated: {} started, {} finished, {} stopped, {} states pooled",
        elapsed,
        stats.started_lifetime,
        stats.finished_lifetime,
        stats.stopped_lifetime,
        stats.pooled_states
    );
    Ok(())
}

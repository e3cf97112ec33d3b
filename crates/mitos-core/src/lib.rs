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

//! # Mitos Core
//!
//! Cooperative, tick-driven scheduling for suspendable units of work.
//!
//! A [`Scheduler`] resumes registered [`Coroutine`]s at most once per
//! discrete update cycle, tracks why each one is suspended (immediate
//! re-tick, timed delay, or completion of another coroutine) and recycles
//! its internal state records through a [`Pool`] so that steady-state
//! ticking performs no per-frame allocation.
//!
//! The scheduler runs on a single logical thread: every resumption happens
//! synchronously inside [`Scheduler::tick`], or as the one immediate step
//! performed by [`Scheduler::start`]. The host application owns the
//! scheduler, decides when a tick happens and supplies the elapsed delta
//! time; the crate never sources time on its own.

#![warn(missing_docs)]

pub mod coroutine;
pub mod handle;
pub mod scheduler;

pub use coroutine::{from_fn, Coroutine, FnCoroutine, Step, Yield};
pub use handle::Handle;
pub use scheduler::pool::{Pool, Reusable};
pub use scheduler::slot::Token;
pub use scheduler::stats::SchedulerStats;
pub use scheduler::{Context, Scheduler, SchedulerConfig};

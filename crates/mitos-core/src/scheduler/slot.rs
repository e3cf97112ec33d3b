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

//! Internal slot storage and token management.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::scheduler::state::{CoroutineState, WaitSpec};

/// A non-owning reference to a coroutine slot in the scheduler registry.
///
/// It combines an index with a generation count to solve the "ABA
/// problem". When a coroutine finishes, its slot index is recycled for a
/// later coroutine, but the generation is incremented. This ensures that
/// old tokens pointing to a recycled index become invalid and can never be
/// mistaken for a reference to the slot's new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// The index of the coroutine's slot in the scheduler's registry.
    pub index: u32,
    /// A generation counter that is incremented each time the index is
    /// recycled.
    pub generation: u32,
}

/// Stop channel shared between a slot and every handle minted for it.
///
/// `epoch` echoes the generation currently occupying the slot. A handle
/// whose generation no longer matches the epoch is inert: its stop
/// requests are dropped and it reports the coroutine as finished.
#[derive(Debug)]
pub(crate) struct StopSignal {
    pub(crate) epoch: AtomicU32,
    pub(crate) stop: AtomicBool,
}

/// One registry slot: the token carrying the live generation, the signal
/// shared with handles, and the pooled state (`Some` iff registered).
pub(crate) struct Slot {
    id: Token,
    signal: Arc<StopSignal>,
    state: Option<CoroutineState>,
}

/// Internal manager for coroutine slots.
///
/// Maintains a dense list of slots and recycles indices through a free
/// list, so registering a coroutine is O(1) and allocation-free once the
/// registry has grown to its steady-state size. Invariant: a state record
/// is in exactly one place at any time — the reuse pool, or exactly one
/// live slot.
pub(crate) struct SlotStore {
    slots: Vec<Slot>,
    freed: Vec<u32>,
    live: usize,
}

impl SlotStore {
    /// Creates a store with room for `capacity` slots before regrowth.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            freed: Vec::new(),
            live: 0,
        }
    }

    /// Registers a state record, recycling a freed slot when one exists.
    ///
    /// The slot's signal is returned fresh: stop flag cleared and epoch
    /// matching the token handed back, so handles minted from the pair
    /// resolve to exactly this occupancy.
    pub(crate) fn insert(&mut self, state: CoroutineState) -> (Token, Arc<StopSignal>) {
        self.live += 1;
        if let Some(index) = self.freed.pop() {
            let slot = &mut self.slots[index as usize];
            slot.signal.stop.store(false, Ordering::Release);
            slot.signal.epoch.store(slot.id.generation, Ordering::Release);
            slot.state = Some(state);
            (slot.id, slot.signal.clone())
        } else {
            let index = self.slots.len() as u32;
            let id = Token {
                index,
                generation: 0,
            };
            let signal = Arc::new(StopSignal {
                epoch: AtomicU32::new(0),
                stop: AtomicBool::new(false),
            });
            self.slots.push(Slot {
                id,
                signal: signal.clone(),
                state: Some(state),
            });
            (id, signal)
        }
    }

    /// Whether the token still refers to the slot's current occupant.
    ///
    /// Liveness is a generation check only: a state temporarily taken out
    /// for resumption is still live, it just is not resident.
    pub(crate) fn is_live(&self, token: Token) -> bool {
        self.slots
            .get(token.index as usize)
            .map(|slot| slot.id.generation == token.generation)
            .unwrap_or(false)
    }

    /// Whether a cooperative stop has been requested for a live token.
    pub(crate) fn stop_requested(&self, token: Token) -> bool {
        self.slots
            .get(token.index as usize)
            .map(|slot| {
                slot.id.generation == token.generation && slot.signal.stop.load(Ordering::Acquire)
            })
            .unwrap_or(false)
    }

    /// Takes the state record out of a live slot for resumption.
    pub(crate) fn take_state(&mut self, token: Token) -> Option<CoroutineState> {
        let slot = self.slots.get_mut(token.index as usize)?;
        if slot.id.generation != token.generation {
            return None;
        }
        slot.state.take()
    }

    /// Puts a state record back after resumption.
    pub(crate) fn put_state(&mut self, token: Token, state: CoroutineState) {
        if let Some(slot) = self.slots.get_mut(token.index as usize) {
            if slot.id.generation == token.generation {
                slot.state = Some(state);
            }
        }
    }

    /// Reads the current suspension cause of a resident state.
    pub(crate) fn wait_of(&self, token: Token) -> Option<WaitSpec> {
        self.slots.get(token.index as usize).and_then(|slot| {
            if slot.id.generation == token.generation {
                slot.state.as_ref().map(|state| state.wait)
            } else {
                None
            }
        })
    }

    /// Replaces the suspension cause of a resident state.
    pub(crate) fn set_wait(&mut self, token: Token, wait: WaitSpec) {
        if let Some(slot) = self.slots.get_mut(token.index as usize) {
            if slot.id.generation == token.generation {
                if let Some(state) = slot.state.as_mut() {
                    state.wait = wait;
                }
            }
        }
    }

    /// Retires a slot whose state has already been released.
    ///
    /// Bumps the generation and publishes it to the signal, so every
    /// outstanding token and handle for the previous occupant goes stale,
    /// then returns the index to the free list.
    pub(crate) fn retire(&mut self, token: Token) {
        let Some(slot) = self.slots.get_mut(token.index as usize) else {
            return;
        };
        if slot.id.generation != token.generation {
            return;
        }
        slot.state = None;
        slot.id.generation += 1;
        slot.signal.epoch.store(slot.id.generation, Ordering::Release);
        slot.signal.stop.store(false, Ordering::Release);
        self.freed.push(token.index);
        self.live -= 1;
    }

    /// Sets the stop flag on every registered coroutine.
    pub(crate) fn signal_stop_all(&self) {
        for slot in &self.slots {
            if slot.state.is_some() {
                slot.signal.stop.store(true, Ordering::Release);
            }
        }
    }

    /// Number of currently registered coroutines.
    pub(crate) fn live_len(&self) -> usize {
        self.live
    }

    /// Total number of slots ever created (live and recyclable).
    pub(crate) fn slot_len(&self) -> usize {
        self.slots.len()
    }
}

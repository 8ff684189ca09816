// Copyright (C) 2025 Category Labs, Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Synchronization primitives, swappable for loom models, plus the
//! cancellation token blocked transfers abort on.

use std::sync::Arc;

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::{Condvar, Mutex};

#[cfg(feature = "loom")]
pub(crate) use loom::sync::{Condvar, Mutex};

/// Wakes every party blocked on a condition so each re-checks its own
/// predicate. Implementations must take the lock the waiters sleep under
/// before notifying; a bare notify can land between a waiter's predicate
/// check and its wait and be lost.
pub(crate) trait Waker: Send + Sync {
    fn wake_all(&self);
}

struct TokenState {
    cancelled: AtomicBool,
    watchers: Mutex<Vec<Arc<dyn Waker>>>,
}

/// Cooperative cancellation request shared between the party that aborts and
/// the parties blocked inside a transfer.
///
/// Cloning yields another handle to the same request. Cancellation is
/// one-way: once [`cancel`](CancelToken::cancel) is called the token stays
/// cancelled.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken {
            inner: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                watchers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Request cancellation and wake every registered waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        let watchers = self.inner.watchers.lock().unwrap();
        for watcher in watchers.iter() {
            watcher.wake_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Register a waiter for the duration of a blocking call. Dropping the
    /// guard deregisters it.
    pub(crate) fn watch(&self, waker: Arc<dyn Waker>) -> WatchGuard<'_> {
        self.inner.watchers.lock().unwrap().push(waker.clone());
        WatchGuard { token: self, waker }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct WatchGuard<'a> {
    token: &'a CancelToken,
    waker: Arc<dyn Waker>,
}

impl Drop for WatchGuard<'_> {
    fn drop(&mut self) {
        let mut watchers = self.token.inner.watchers.lock().unwrap();
        if let Some(slot) = watchers.iter().position(|w| Arc::ptr_eq(w, &self.waker)) {
            watchers.swap_remove(slot);
        }
    }
}

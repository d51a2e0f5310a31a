//! Observable values.
//!
//! A [`StateCell`] holds the latest value of something that changes over time
//! (a caret rectangle, the current remote connection). Tasks observe it by
//! awaiting [`StateCell::changed_since`] with the version they last saw, so a
//! burst of writes between two polls collapses into one observation of the
//! latest value.

use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

struct StateCellInner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    wakers: RefCell<SmallVec<[Waker; 2]>>,
}

impl<T> StateCellInner<T> {
    fn bump(&self) {
        self.version.set(self.version.get() + 1);
        let wakers = std::mem::take(&mut *self.wakers.borrow_mut());
        for waker in wakers {
            waker.wake();
        }
    }

    fn register(&self, waker: &Waker) {
        let mut wakers = self.wakers.borrow_mut();
        if !wakers.iter().any(|existing| existing.will_wake(waker)) {
            wakers.push(waker.clone());
        }
    }
}

/// Shared, observable value with a monotonically increasing version.
pub struct StateCell<T> {
    inner: Rc<StateCellInner<T>>,
}

impl<T> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateCellInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                wakers: RefCell::new(SmallVec::new()),
            }),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replaces the value unconditionally and wakes observers.
    pub fn replace(&self, value: T) -> T {
        let previous = self.inner.value.replace(value);
        self.inner.bump();
        previous
    }

    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Resolves once the version differs from `seen`.
    pub fn changed_since(&self, seen: u64) -> Changed<T> {
        Changed {
            cell: self.clone(),
            seen,
        }
    }
}

impl<T: Clone> StateCell<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: PartialEq> StateCell<T> {
    /// Stores `value` if it differs from the current one. Returns whether the
    /// value changed; equal writes do not wake observers.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        *self.inner.value.borrow_mut() = value;
        self.inner.bump();
        true
    }
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.version())
            .finish()
    }
}

/// Future returned by [`StateCell::changed_since`]. Yields the new version.
pub struct Changed<T> {
    cell: StateCell<T>,
    seen: u64,
}

impl<T> Future for Changed<T> {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<u64> {
        let current = self.cell.version();
        if current != self.seen {
            return Poll::Ready(current);
        }
        self.cell.inner.register(cx.waker());
        Poll::Pending
    }
}

struct EitherChanged<A, B> {
    first: StateCell<A>,
    first_seen: u64,
    second: StateCell<B>,
    second_seen: u64,
}

impl<A, B> Future for EitherChanged<A, B> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.first.version() != self.first_seen || self.second.version() != self.second_seen
        {
            return Poll::Ready(());
        }
        self.first.inner.register(cx.waker());
        self.second.inner.register(cx.waker());
        Poll::Pending
    }
}

/// Calls `f` with the current pair of values, then again every time either
/// cell changes. Runs until the surrounding task is cancelled.
pub async fn collect_latest2<A, B, F>(first: StateCell<A>, second: StateCell<B>, mut f: F)
where
    A: Clone,
    B: Clone,
    F: FnMut(A, B),
{
    loop {
        let first_seen = first.version();
        let second_seen = second.version();
        f(first.get(), second.get());
        EitherChanged {
            first: first.clone(),
            first_seen,
            second: second.clone(),
            second_seen,
        }
        .await;
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;

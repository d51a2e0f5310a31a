//! Unbounded, ordered, single-consumer channel for runtime tasks.
//!
//! Values are delivered strictly in send order. The receiving task parks on
//! [`Receiver::recv`] and is woken by the next send or by the last sender
//! going away.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

struct ChannelState<T> {
    queue: RefCell<VecDeque<T>>,
    waiting: RefCell<Option<Waker>>,
    senders: Cell<usize>,
    receiver_alive: Cell<bool>,
}

impl<T> ChannelState<T> {
    fn wake_receiver(&self) {
        let waker = self.waiting.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn poll_recv(&self, cx: &mut Context<'_>) -> Poll<Option<T>> {
        if let Some(value) = self.queue.borrow_mut().pop_front() {
            return Poll::Ready(Some(value));
        }
        if self.senders.get() == 0 {
            return Poll::Ready(None);
        }
        self.waiting.replace(Some(cx.waker().clone()));
        Poll::Pending
    }
}

/// Creates a connected sender/receiver pair.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let state = Rc::new(ChannelState {
        queue: RefCell::new(VecDeque::new()),
        waiting: RefCell::new(None),
        senders: Cell::new(1),
        receiver_alive: Cell::new(true),
    });
    (
        Sender {
            state: Rc::clone(&state),
        },
        Receiver { state },
    )
}

/// Sending half. Cloneable; the channel closes when the last clone drops.
pub struct Sender<T> {
    state: Rc<ChannelState<T>>,
}

impl<T> Sender<T> {
    /// Queues `value` for the receiver. Hands the value back when the
    /// receiver has been dropped.
    pub fn send(&self, value: T) -> Result<(), T> {
        if !self.state.receiver_alive.get() {
            return Err(value);
        }
        self.state.queue.borrow_mut().push_back(value);
        self.state.wake_receiver();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        !self.state.receiver_alive.get()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.state.senders.set(self.state.senders.get() + 1);
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        let remaining = self.state.senders.get() - 1;
        self.state.senders.set(remaining);
        if remaining == 0 {
            self.state.wake_receiver();
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("queued", &self.state.queue.borrow().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Receiving half. Not cloneable: one consumer per channel.
pub struct Receiver<T> {
    state: Rc<ChannelState<T>>,
}

impl<T> Receiver<T> {
    /// Waits for the next value. Resolves to `None` once every sender has
    /// been dropped and the queue is drained.
    pub fn recv(&self) -> Recv<'_, T> {
        Recv { receiver: self }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.state.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.state.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.queue.borrow().is_empty()
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        self.state.receiver_alive.set(false);
        // Take the values out first so their destructors run without a borrow held.
        let drained = std::mem::take(&mut *self.state.queue.borrow_mut());
        drop(drained);
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("queued", &self.len())
            .field("senders", &self.state.senders.get())
            .finish()
    }
}

/// Future returned by [`Receiver::recv`].
pub struct Recv<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Future for Recv<'_, T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.receiver.state.poll_recv(cx)
    }
}

#[cfg(test)]
#[path = "tests/channel_tests.rs"]
mod tests;

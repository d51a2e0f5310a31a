use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::collections::map::HashSet;

/// Upper bound on poll passes per [`Runtime::run_until_idle`] call. A task that
/// wakes itself on every poll would otherwise spin forever.
const MAX_PASSES_PER_DRAIN: usize = 4096;

type LocalFuture = Pin<Box<dyn Future<Output = ()> + 'static>>;

struct TaskEntry {
    id: u64,
    future: LocalFuture,
}

struct RuntimeInner {
    tasks: RefCell<Vec<TaskEntry>>,
    // Ids taken out of `tasks` for the current poll pass.
    in_flight: RefCell<HashSet<u64>>,
    cancelled: RefCell<HashSet<u64>>,
    next_task_id: Cell<u64>,
    wake_flag: Arc<RuntimeTaskWaker>,
    task_waker: Waker,
}

impl RuntimeInner {
    fn new() -> Self {
        let wake_flag = Arc::new(RuntimeTaskWaker {
            woken: AtomicBool::new(false),
        });
        let task_waker = futures_task::waker(Arc::clone(&wake_flag));
        Self {
            tasks: RefCell::new(Vec::new()),
            in_flight: RefCell::new(HashSet::default()),
            cancelled: RefCell::new(HashSet::default()),
            next_task_id: Cell::new(1),
            wake_flag,
            task_waker,
        }
    }

    fn spawn_task(&self, future: LocalFuture) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.wake_flag.woken.store(true, Ordering::SeqCst);
        id
    }

    fn cancel_task(&self, id: u64) {
        let removed = {
            let mut tasks = self.tasks.borrow_mut();
            tasks
                .iter()
                .position(|entry| entry.id == id)
                .map(|index| tasks.remove(index))
        };
        match removed {
            // Dropped outside the borrow: task destructors may cancel other tasks.
            Some(entry) => drop(entry),
            None => {
                if self.in_flight.borrow().contains(&id) {
                    self.cancelled.borrow_mut().insert(id);
                }
            }
        }
    }

    fn poll_pass(&self) -> bool {
        let batch = std::mem::take(&mut *self.tasks.borrow_mut());
        if batch.is_empty() {
            return false;
        }
        self.in_flight
            .borrow_mut()
            .extend(batch.iter().map(|entry| entry.id));

        let mut cx = Context::from_waker(&self.task_waker);
        let mut pending = Vec::with_capacity(batch.len());
        let mut made_progress = false;
        for mut entry in batch {
            if self.cancelled.borrow_mut().remove(&entry.id) {
                self.in_flight.borrow_mut().remove(&entry.id);
                made_progress = true;
                drop(entry);
                continue;
            }
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => {
                    self.in_flight.borrow_mut().remove(&entry.id);
                    self.cancelled.borrow_mut().remove(&entry.id);
                    made_progress = true;
                }
                Poll::Pending => pending.push(entry),
            }
        }

        let mut survivors = Vec::with_capacity(pending.len());
        for entry in pending {
            self.in_flight.borrow_mut().remove(&entry.id);
            if self.cancelled.borrow_mut().remove(&entry.id) {
                made_progress = true;
                drop(entry);
            } else {
                survivors.push(entry);
            }
        }
        if !survivors.is_empty() {
            let mut tasks = self.tasks.borrow_mut();
            // Keep spawn order: survivors first, then tasks spawned during the pass.
            let spawned = std::mem::take(&mut *tasks);
            tasks.extend(survivors);
            tasks.extend(spawned);
        }
        made_progress
    }
}

/// Single-threaded cooperative runtime.
///
/// Every independent event source (remote state consumer, rectangle combiner,
/// pointer consumer) runs as its own task here. Futures never cross threads,
/// so they may capture `Rc`/`RefCell` state freely.
///
/// The host drives the runtime by calling [`Runtime::run_until_idle`] whenever
/// it has delivered new input (sent on a channel, set a [`StateCell`](crate::StateCell)).
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new()),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn spawn<F>(&self, future: F) -> TaskHandle
    where
        F: Future<Output = ()> + 'static,
    {
        let id = self.inner.spawn_task(Box::pin(future));
        TaskHandle {
            id,
            runtime: self.handle(),
        }
    }

    /// Polls tasks until none of them has been woken. Returns whether any task
    /// completed or was cancelled along the way.
    pub fn run_until_idle(&self) -> bool {
        let mut made_progress = false;
        for _ in 0..MAX_PASSES_PER_DRAIN {
            if !self.inner.wake_flag.woken.swap(false, Ordering::SeqCst) {
                return made_progress;
            }
            made_progress |= self.inner.poll_pass();
        }
        log::warn!("runtime did not settle after {MAX_PASSES_PER_DRAIN} passes");
        made_progress
    }

    /// Number of tasks that have not completed or been cancelled.
    pub fn task_count(&self) -> usize {
        self.inner.tasks.borrow().len() + self.inner.in_flight.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.wake_flag.woken.load(Ordering::SeqCst)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("tasks", &self.task_count())
            .field("idle", &self.is_idle())
            .finish()
    }
}

/// Weak handle to a [`Runtime`], cheap to clone into tasks.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    /// Spawns a task. Returns `None` when the runtime has been dropped.
    pub fn spawn<F>(&self, future: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_task(Box::pin(future));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Handle to a spawned task. Cancelling drops the task's future, which runs
/// the destructors of everything it owns.
#[derive(Debug)]
pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

struct RuntimeTaskWaker {
    woken: AtomicBool,
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;

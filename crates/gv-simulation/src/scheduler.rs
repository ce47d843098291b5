use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Delayed callbacks keyed by the tick they fall due.
///
/// Tasks are plain data; the owner drains due tasks at the start of a tick
/// and interprets them. Tasks due on the same tick run in scheduling order.
#[derive(Debug)]
pub struct TickScheduler<T> {
    next_handle: u64,
    queue: BTreeMap<(u64, TaskHandle), T>,
    due: HashMap<TaskHandle, u64>,
}

impl<T> Default for TickScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TickScheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            next_handle: 0,
            queue: BTreeMap::new(),
            due: HashMap::new(),
        }
    }

    /// Schedule `task` to fall due `delay` ticks after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        let due = now + delay;
        self.queue.insert((due, handle), task);
        self.due.insert(handle, due);
        handle
    }

    /// Cancel a scheduled task. Returns `false` if it already ran or was
    /// already cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due.remove(&handle) {
            Some(due) => self.queue.remove(&(due, handle)).is_some(),
            None => false,
        }
    }

    /// Return `true` if the task has neither run nor been cancelled.
    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.due.contains_key(&handle)
    }

    /// Remove and return every task due at or before `now`, in order.
    pub fn drain_due(&mut self, now: u64) -> Vec<(TaskHandle, T)> {
        let later = self.queue.split_off(&(now + 1, TaskHandle(0)));
        let ready = std::mem::replace(&mut self.queue, later);
        ready
            .into_iter()
            .map(|((_, handle), task)| {
                self.due.remove(&handle);
                (handle, task)
            })
            .collect()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Return `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

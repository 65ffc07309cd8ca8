//! In-memory queue with configurable ends and priority reordering.

use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::config::{InsertionEnd, RemovalEnd};
use crate::core::{Schedulable, TaskQueue};

/// In-memory queue storing pending tasks in a ring buffer.
///
/// Insertion and removal are O(1) at either end; priority reordering is a
/// stable O(n log n) sort, so items of one priority tier keep their
/// FIFO/LIFO order.
pub struct InMemoryQueue<T> {
    insertion: InsertionEnd,
    removal: RemovalEnd,
    tasks: VecDeque<T>,
}

impl<T> InMemoryQueue<T> {
    /// Create an empty queue.
    pub const fn new(insertion: InsertionEnd, removal: RemovalEnd) -> Self {
        Self {
            insertion,
            removal,
            tasks: VecDeque::new(),
        }
    }

    fn head(&self) -> Option<&T> {
        match self.removal {
            RemovalEnd::Front => self.tasks.front(),
            RemovalEnd::Back => self.tasks.back(),
        }
    }
}

impl<T> Default for InMemoryQueue<T> {
    fn default() -> Self {
        Self::new(InsertionEnd::Back, RemovalEnd::Front)
    }
}

impl<T: Schedulable> TaskQueue<T> for InMemoryQueue<T> {
    fn enqueue(&mut self, task: T) {
        match self.insertion {
            InsertionEnd::Front => self.tasks.push_front(task),
            InsertionEnd::Back => self.tasks.push_back(task),
        }
    }

    fn dequeue(&mut self) -> Option<T> {
        match self.removal {
            RemovalEnd::Front => self.tasks.pop_front(),
            RemovalEnd::Back => self.tasks.pop_back(),
        }
    }

    fn restore(&mut self, task: T) {
        match self.removal {
            RemovalEnd::Front => self.tasks.push_front(task),
            RemovalEnd::Back => self.tasks.push_back(task),
        }
    }

    fn reorder_by_priority(&mut self) -> bool {
        if !self.head().is_some_and(|t| t.is_prioritized()) {
            return false;
        }
        let slice = self.tasks.make_contiguous();
        match self.removal {
            RemovalEnd::Front => slice.sort_by_key(|t| t.effective_priority()),
            RemovalEnd::Back => slice.sort_by_key(|t| Reverse(t.effective_priority())),
        }
        true
    }

    fn removal_end(&self) -> RemovalEnd {
        self.removal
    }

    fn pending(&self) -> Vec<T> {
        self.tasks.iter().cloned().collect()
    }

    fn len(&self) -> usize {
        self.tasks.len()
    }
}

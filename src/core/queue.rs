//! Queue store abstraction.

use crate::config::RemovalEnd;

use super::Schedulable;

/// Abstraction for queue stores.
///
/// A queue store only holds pending items; the item being executed has
/// already been removed by [`dequeue`](TaskQueue::dequeue).
pub trait TaskQueue<T: Schedulable>: Send + 'static {
    /// Insert an item at the configured insertion end.
    fn enqueue(&mut self, task: T);
    /// Remove the item at the configured removal end.
    fn dequeue(&mut self) -> Option<T>;
    /// Put an item back at the removal end so it is consumed next.
    fn restore(&mut self, task: T);
    /// Stable sort so the lowest priority number sits at the removal end.
    ///
    /// Only applies when the item at the removal end is prioritized; returns
    /// whether a sort happened.
    fn reorder_by_priority(&mut self) -> bool;
    /// End items are consumed from.
    fn removal_end(&self) -> RemovalEnd;
    /// Copy of the pending items in storage order (front to back).
    fn pending(&self) -> Vec<T>;
    /// Current depth.
    fn len(&self) -> usize;
    /// Whether nothing is pending.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Bounded drop-oldest working buffer.

use std::collections::VecDeque;

/// FIFO buffer that evicts its oldest element instead of growing past
/// `capacity`. Survivors keep their relative order.
#[derive(Debug)]
pub struct PendingBuffer<P> {
    items: VecDeque<P>,
    capacity: usize,
}

impl<P> PendingBuffer<P> {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "pending buffer capacity must be non-zero");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the evicted oldest element if the buffer was
    /// already full.
    pub fn push(&mut self, item: P) -> Option<P> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn head(&self) -> Option<&P> {
        self.items.front()
    }

    pub fn pop(&mut self) -> Option<P> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &P> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut buf = PendingBuffer::with_capacity(3);
        assert_eq!(buf.push(1), None);
        assert_eq!(buf.push(2), None);
        assert_eq!(buf.push(3), None);
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn pop_advances_head() {
        let mut buf = PendingBuffer::with_capacity(2);
        buf.push("a");
        buf.push("b");
        assert_eq!(buf.head(), Some(&"a"));
        assert_eq!(buf.pop(), Some("a"));
        assert_eq!(buf.head(), Some(&"b"));
        assert_eq!(buf.pop(), Some("b"));
        assert!(buf.is_empty());
    }
}

//! LRU Order Module
//!
//! Arena-backed doubly linked list that records recency order for eviction.
//!
//! Nodes live in a `Vec` and link to each other by index, so moving a node to
//! the front or unlinking it is O(1) without raw pointers. Freed slots are
//! recycled through a free list.

/// Stable handle to a node in an [`LruList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Tracks access order for LRU eviction.
///
/// - Front = most recently touched
/// - Back = eviction candidate
#[derive(Debug)]
pub struct LruList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Accessors ==
    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list has no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value stored at `id`, if the node is live.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0).and_then(|n| n.value.as_ref())
    }

    /// Mutable counterpart of [`LruList::get`].
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0).and_then(|n| n.value.as_mut())
    }

    /// Returns the back-most (least recently touched) node.
    pub fn back(&self) -> Option<NodeId> {
        self.tail.map(NodeId)
    }

    /// Returns the front-most (most recently touched) node.
    pub fn front(&self) -> Option<NodeId> {
        self.head.map(NodeId)
    }

    // == Push Front ==
    /// Inserts `value` as the most recently touched node.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let node = Node {
            value: Some(value),
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.attach_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Marks a node as most recently touched. Returns false for dead handles.
    pub fn move_to_front(&mut self, id: NodeId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if self.head != Some(id.0) {
            self.detach(id.0);
            self.attach_front(id.0);
        }
        true
    }

    // == Remove ==
    /// Unlinks a node and returns its value.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.get(id)?;
        self.detach(id.0);
        self.len -= 1;
        self.free.push(id.0);
        self.nodes[id.0].value.take()
    }

    // == Pop Back ==
    /// Removes and returns the least recently touched value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.back()?;
        self.remove(tail)
    }

    // == Clear ==
    /// Drops every node and resets the arena.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iter ==
    /// Iterates values from front (most recent) to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = &self.nodes[idx];
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        let node = &mut self.nodes[idx];
        node.prev = None;
        node.next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}

/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (NodeId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let node = &self.list.nodes[idx];
        self.cursor = node.next;
        node.value.as_ref().map(|v| (NodeId(idx), v))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Clone>(list: &LruList<T>) -> Vec<T> {
        list.iter().map(|(_, v)| v.clone()).collect()
    }

    #[test]
    fn test_lru_new() {
        let list: LruList<&str> = LruList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.back(), None);
    }

    #[test]
    fn test_push_front_orders_newest_first() {
        let mut list = LruList::new();
        list.push_front("key1");
        list.push_front("key2");
        list.push_front("key3");

        assert_eq!(list.len(), 3);
        assert_eq!(values(&list), vec!["key3", "key2", "key1"]);
        assert_eq!(list.back().and_then(|id| list.get(id)), Some(&"key1"));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = LruList::new();
        let a = list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert!(list.move_to_front(a));
        assert_eq!(values(&list), vec!["a", "c", "b"]);
        assert_eq!(list.pop_back(), Some("b"));
    }

    #[test]
    fn test_move_to_front_of_head_is_noop() {
        let mut list = LruList::new();
        list.push_front("a");
        let b = list.push_front("b");

        assert!(list.move_to_front(b));
        assert_eq!(values(&list), vec!["b", "a"]);
    }

    #[test]
    fn test_pop_back_drains_in_lru_order() {
        let mut list = LruList::new();
        list.push_front(1);
        list.push_front(2);
        list.push_front(3);

        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_middle_node() {
        let mut list = LruList::new();
        list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.len(), 2);
        assert_eq!(values(&list), vec!["c", "a"]);

        // Dead handle
        assert_eq!(list.remove(b), None);
        assert!(!list.move_to_front(b));
    }

    #[test]
    fn test_slots_are_recycled() {
        let mut list = LruList::new();
        let a = list.push_front("a");
        list.remove(a);
        let b = list.push_front("b");

        assert_eq!(a, b);
        assert_eq!(list.get(b), Some(&"b"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut list = LruList::new();
        list.push_front("a");
        list.push_front("b");
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.front(), None);
        assert_eq!(list.back(), None);
        assert_eq!(list.iter().count(), 0);
    }
}

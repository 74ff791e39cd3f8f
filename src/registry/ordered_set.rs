//! Insertion-ordered multi-value storage with O(1) successor lookup.
//!
//! An arena-backed doubly linked list plus an identity-to-node index. The
//! index is what makes "the value registered after this one" and removal by
//! identity constant-time. Pushing the same identity twice is caller error
//! and is not guarded: a second node is appended and the index is repointed
//! at it, leaving the first node reachable only by traversal.

use std::collections::HashMap;

struct Node<V> {
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

pub(crate) struct OrderedValueSet<V> {
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    index: HashMap<usize, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<V> OrderedValueSet<V> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Earliest-pushed value still present, if any.
    pub(crate) fn first(&self) -> Option<&V> {
        self.head.map(|slot| &self.node(slot).value)
    }

    /// Appends `value` at the tail under `identity`.
    pub(crate) fn push(&mut self, identity: usize, value: V) {
        let node = Node {
            value,
            prev: self.tail,
            next: None,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                slot
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        };
        if let Some(tail) = self.tail {
            self.node_mut(tail).next = Some(slot);
        } else {
            self.head = Some(slot);
        }
        self.tail = Some(slot);
        self.index.insert(identity, slot);
        self.len += 1;
    }

    /// The value pushed immediately after `identity`, or `None` if the
    /// identity is unknown or last.
    pub(crate) fn after(&self, identity: usize) -> Option<&V> {
        let slot = *self.index.get(&identity)?;
        let next = self.node(slot).next?;
        Some(&self.node(next).value)
    }

    /// Removes the value indexed under `identity`. No-op for unknown
    /// identities.
    pub(crate) fn remove(&mut self, identity: usize) -> Option<V> {
        let slot = self.index.remove(&identity)?;
        let node = self.nodes[slot].take()?;
        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }
        self.free.push(slot);
        self.len -= 1;
        Some(node.value)
    }

    fn node(&self, slot: usize) -> &Node<V> {
        self.nodes[slot]
            .as_ref()
            .unwrap_or_else(|| panic!("linked node slot {slot} is vacant"))
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<V> {
        self.nodes[slot]
            .as_mut()
            .unwrap_or_else(|| panic!("linked node slot {slot} is vacant"))
    }
}

// Not derived: V need not be Default.
impl<V> Default for OrderedValueSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

use std::collections::HashMap;
use std::num::NonZeroUsize;

use super::EvictionStore;

struct Node<V> {
    key: String,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Least-recently-used store: a hash index over a slab of nodes that are
/// threaded into a doubly-linked recency list.
///
/// `head` is the most recently used slot, `tail` the next one to go. Slots are
/// never freed; once the slab is full a new key takes over the tail's slot.
pub struct LruStore<V> {
    capacity: NonZeroUsize,
    index: HashMap<String, usize>,
    nodes: Vec<Node<V>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<V> LruStore<V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            index: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub fn keys_by_recency(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            keys.push(node.key.as_str());
            cursor = node.next;
        }
        keys
    }

    fn unlink(&mut self, idx: usize) {
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

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;

        if let Some(head) = self.head {
            self.nodes[head].prev = Some(idx);
        }
        self.head = Some(idx);

        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn touch(&mut self, idx: usize) {
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front(idx);
        }
    }
}

impl<V: Send + Sync> EvictionStore<V> for LruStore<V> {
    fn get(&mut self, key: &str) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        Some(&self.nodes[idx].value)
    }

    fn insert(&mut self, key: String, value: V) -> Option<String> {
        if let Some(&idx) = self.index.get(&key) {
            self.nodes[idx].value = value;
            self.touch(idx);
            return None;
        }

        if self.nodes.len() < self.capacity.get() {
            let idx = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.index.insert(key, idx);
            self.push_front(idx);
            return None;
        }

        // full, so the tail is always set
        debug_assert!(self.tail.is_some(), "full store without a tail");
        let idx = self.tail?;
        self.unlink(idx);

        let node = &mut self.nodes[idx];
        let evicted = std::mem::replace(&mut node.key, key.clone());
        node.value = value;

        self.index.remove(&evicted);
        self.index.insert(key, idx);
        self.push_front(idx);

        Some(evicted)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

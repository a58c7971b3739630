//! Bucket array with inline chain heads and an arena of overflow entries.
//!
//! Slot `i` of the array embeds the first entry of bucket `i` directly.
//! Second and later entries of a chain live in a `SlotMap` and are linked by
//! arena key, so growing the array never invalidates a chain link.

use crate::config::Indexing;
use crate::error::TableError;
use core::mem;
use slotmap::SlotMap;
use tracing::warn;

slotmap::new_key_type! {
    /// Arena key of a chained (non-head) entry.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Hash computed at insert; redistribution never re-hashes the key.
    pub(crate) hash: u32,
    next: Option<NodeKey>,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, hash: u32) -> Self {
        Self {
            key,
            value,
            hash,
            next: None,
        }
    }
}

/// Where an entry sits within its bucket's chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Link {
    Head,
    Node(NodeKey),
}

/// A located entry together with the link that points at it.
struct Position {
    prev: Option<Link>,
    at: Link,
}

type Slot<K, V> = Option<Entry<K, V>>;

fn alloc_slots<K, V>(n: usize) -> Result<Vec<Slot<K, V>>, TableError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(n).map_err(|e| {
        warn!(requested = n, error = %e, "bucket array allocation failed");
        TableError::AllocationFailure { requested: n }
    })?;
    slots.resize_with(n, || None);
    Ok(slots)
}

pub(crate) struct Buckets<K, V> {
    slots: Vec<Slot<K, V>>,
    nodes: SlotMap<NodeKey, Entry<K, V>>,
    len: usize,
}

impl<K, V> Buckets<K, V> {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            slots: (0..n).map(|_| None).collect(),
            nodes: SlotMap::with_key(),
            len: 0,
        }
    }

    pub(crate) fn try_new(n: usize) -> Result<Self, TableError> {
        Ok(Self {
            slots: alloc_slots(n)?,
            nodes: SlotMap::with_key(),
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn entry(&self, index: usize, link: Link) -> Option<&Entry<K, V>> {
        match link {
            Link::Head => self.slots.get(index)?.as_ref(),
            Link::Node(k) => self.nodes.get(k),
        }
    }

    fn entry_mut(&mut self, index: usize, link: Link) -> Option<&mut Entry<K, V>> {
        match link {
            Link::Head => self.slots.get_mut(index)?.as_mut(),
            Link::Node(k) => self.nodes.get_mut(k),
        }
    }

    /// Walks bucket `index` until `eq` accepts a key.
    fn locate<F>(&self, index: usize, mut eq: F) -> Option<Position>
    where
        F: FnMut(&K) -> bool,
    {
        let head = self.slots.get(index)?.as_ref()?;
        if eq(&head.key) {
            return Some(Position {
                prev: None,
                at: Link::Head,
            });
        }
        let mut prev = Link::Head;
        let mut next = head.next;
        while let Some(k) = next {
            let node = self.nodes.get(k)?;
            if eq(&node.key) {
                return Some(Position {
                    prev: Some(prev),
                    at: Link::Node(k),
                });
            }
            prev = Link::Node(k);
            next = node.next;
        }
        None
    }

    /// Last link of bucket `index`, `None` when the bucket is empty.
    fn tail(&self, index: usize) -> Option<Link> {
        let head = self.slots.get(index)?.as_ref()?;
        let mut tail = Link::Head;
        let mut next = head.next;
        while let Some(k) = next {
            tail = Link::Node(k);
            next = self.nodes.get(k).and_then(|n| n.next);
        }
        Some(tail)
    }

    pub(crate) fn get<F>(&self, index: usize, eq: F) -> Option<&Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let pos = self.locate(index, eq)?;
        self.entry(index, pos.at)
    }

    pub(crate) fn get_mut<F>(&mut self, index: usize, eq: F) -> Option<&mut Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let pos = self.locate(index, eq)?;
        self.entry_mut(index, pos.at)
    }

    /// Number of entries chained in bucket `index`.
    pub(crate) fn chain_len(&self, index: usize) -> usize {
        let Some(Some(head)) = self.slots.get(index) else {
            return 0;
        };
        let mut n = 1;
        let mut next = head.next;
        while let Some(node) = next.and_then(|k| self.nodes.get(k)) {
            n += 1;
            next = node.next;
        }
        n
    }

    /// Stores `entry` in bucket `index`: overwrites the value of an entry with
    /// an equal key, or becomes the head of an empty bucket, or is appended to
    /// the chain's tail.
    pub(crate) fn insert(&mut self, index: usize, entry: Entry<K, V>) -> Result<&mut V, TableError>
    where
        K: Eq,
    {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(TableError::OutOfRangeIndex { index, capacity });
        }

        let link = match self.locate(index, |k| *k == entry.key) {
            Some(pos) => {
                if let Some(existing) = self.entry_mut(index, pos.at) {
                    existing.value = entry.value;
                }
                pos.at
            }
            None => match self.tail(index) {
                None => {
                    self.slots[index] = Some(entry);
                    self.len += 1;
                    Link::Head
                }
                Some(tail) => {
                    let k = self.nodes.insert(entry);
                    if let Some(t) = self.entry_mut(index, tail) {
                        t.next = Some(k);
                    }
                    self.len += 1;
                    Link::Node(k)
                }
            },
        };

        self.entry_mut(index, link)
            .map(|e| &mut e.value)
            .ok_or(TableError::OutOfRangeIndex { index, capacity })
    }

    /// Unlinks the entry whose key satisfies `eq`. A removed head is replaced
    /// by its successor.
    pub(crate) fn remove<F>(&mut self, index: usize, eq: F) -> Option<Entry<K, V>>
    where
        F: FnMut(&K) -> bool,
    {
        let pos = self.locate(index, eq)?;
        let removed = match pos.at {
            Link::Head => {
                let slot = self.slots.get_mut(index)?;
                let mut head = slot.take()?;
                if let Some(second) = head.next.take() {
                    *slot = self.nodes.remove(second);
                }
                head
            }
            Link::Node(k) => {
                let mut node = self.nodes.remove(k)?;
                let successor = node.next.take();
                if let Some(prev) = pos.prev.and_then(|p| self.entry_mut(index, p)) {
                    prev.next = successor;
                }
                node
            }
        };
        self.len -= 1;
        Some(removed)
    }

    /// Empties every bucket; the array keeps its length.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.len = 0;
    }

    /// Drops all entries and the array itself.
    pub(crate) fn release(&mut self) {
        self.nodes = SlotMap::with_key();
        self.slots = Vec::new();
        self.len = 0;
    }

    /// Extends the array to `capacity` slots, the new ones empty. Existing
    /// slots keep their indices. Fails without touching the array if the
    /// memory cannot be reserved.
    pub(crate) fn grow_to(&mut self, capacity: usize) -> Result<(), TableError> {
        let additional = capacity.saturating_sub(self.slots.len());
        self.slots.try_reserve_exact(additional).map_err(|e| {
            warn!(requested = capacity, error = %e, "bucket array growth failed");
            TableError::AllocationFailure {
                requested: capacity,
            }
        })?;
        self.slots.resize_with(capacity.max(self.slots.len()), || None);
        Ok(())
    }

    /// Replaces the array with one of `capacity` slots and moves every entry
    /// to the bucket `indexing` assigns its stored hash.
    pub(crate) fn redistribute(&mut self, capacity: usize, indexing: Indexing) -> Result<(), TableError> {
        let capacity = capacity.max(1);
        let fresh = alloc_slots(capacity)?;
        let old_slots = mem::replace(&mut self.slots, fresh);
        let mut old_nodes = mem::replace(
            &mut self.nodes,
            SlotMap::with_capacity_and_key(self.len),
        );
        self.len = 0;

        for head in old_slots.into_iter().flatten() {
            let mut pending = Some(head);
            while let Some(mut entry) = pending {
                pending = entry.next.take().and_then(|k| old_nodes.remove(k));
                let index = indexing.slot_for(entry.hash, capacity).unwrap_or(0);
                self.place(index, entry);
            }
        }
        Ok(())
    }

    /// Links an entry known to be absent into bucket `index`, right after the
    /// head when the bucket is occupied.
    fn place(&mut self, index: usize, mut entry: Entry<K, V>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if let Some(head) = slot.as_mut() {
            entry.next = head.next.take();
            head.next = Some(self.nodes.insert(entry));
        } else {
            *slot = Some(entry);
        }
        self.len += 1;
    }

    pub(crate) fn chains(&self) -> Chains<'_, K, V> {
        Chains {
            buckets: self,
            slot: 0,
            next: None,
            remaining: self.len,
        }
    }
}

/// Visits entries slot by slot, head first, then down each chain.
pub(crate) struct Chains<'a, K, V> {
    buckets: &'a Buckets<K, V>,
    slot: usize,
    next: Option<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Chains<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let buckets = self.buckets;
        if let Some(node) = self.next.take().and_then(|k| buckets.nodes.get(k)) {
            self.next = node.next;
            self.remaining = self.remaining.saturating_sub(1);
            return Some(node);
        }
        while let Some(slot) = buckets.slots.get(self.slot) {
            self.slot += 1;
            if let Some(head) = slot {
                self.next = head.next;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(head);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

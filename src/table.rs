//! Transposition table shared by all workers.
//!
//! Nodes live in a flat arena owned by the table and are addressed by
//! [`NodeId`]. A fingerprint is mapped to its node through one of several
//! mutex-guarded shards; the shard lock is held while a node is allocated and
//! initialized, so concurrent requests for one fingerprint always agree on a
//! single node. Reading a node's statistics never takes a lock.
//!
//! The table does not evict. It fills up during a search and is cleared
//! wholesale with [`TranspositionTable::reset`] once a real move is played.
//! When full, [`TranspositionTable::find_or_create`] hands back a fresh node
//! that is not stored, so the tree stops growing instead of failing.
//! Workers use [`TranspositionTable::find_or_insert`], which skips building
//! such a node altogether.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::warn;

use crate::game::Fingerprint;
use crate::node::SearchNode;

/// Stable index of a node in the table's arena. Valid until the next reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Result of [`TranspositionTable::find_or_create`].
#[derive(Debug)]
pub enum Lookup {
    /// The fingerprint was already present.
    Found(NodeId),
    /// A new node was stored by this call.
    Created(NodeId),
    /// The table is full. The node is usable but nobody else will find it.
    Unmemoized(SearchNode),
}

impl Lookup {
    /// The stored node, if there is one.
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Lookup::Found(id) | Lookup::Created(id) => Some(*id),
            Lookup::Unmemoized(_) => None,
        }
    }
}

type Shard = HashMap<Fingerprint, NodeId>;

enum Slot<'a> {
    Found(NodeId),
    Reserved(MutexGuard<'a, Shard>, usize),
    Full,
}

pub struct TranspositionTable {
    shards: Box<[Mutex<Shard>]>,
    arena: Box<[OnceLock<SearchNode>]>,
    /// Number of arena slots handed out, never more than the capacity.
    allocated: AtomicUsize,
    full_warned: AtomicBool,
}

impl TranspositionTable {
    /// Create a table holding at most `capacity` nodes, locked in `shards`
    /// independent pieces.
    pub fn new(capacity: usize, shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(HashMap::new())).collect(),
            arena: (0..capacity).map(|_| OnceLock::new()).collect(),
            allocated: AtomicUsize::new(0),
            full_warned: AtomicBool::new(false),
        }
    }

    #[inline]
    fn shard(&self, fingerprint: Fingerprint) -> MutexGuard<'_, Shard> {
        // Mix the high bits in so shards stay balanced for weak hashes
        let mixed = fingerprint.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 32;
        let shard = &self.shards[mixed as usize % self.shards.len()];
        shard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Maximum number of stored nodes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    /// Number of stored nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Look up a fingerprint without creating anything.
    pub fn find(&self, fingerprint: Fingerprint) -> Option<NodeId> {
        self.shard(fingerprint).get(&fingerprint).copied()
    }

    /// Look up a fingerprint and return its node.
    pub fn find_node(&self, fingerprint: Fingerprint) -> Option<&SearchNode> {
        self.find(fingerprint).map(|id| self.node(id))
    }

    /// Return the node for `fingerprint`, building it with `make` if absent.
    ///
    /// `make` runs at most once per call and only when the fingerprint is
    /// missing. While there is room it runs under the shard lock, so it
    /// should not touch the table. Once the table is full the lock is
    /// released first and the node comes back as [`Lookup::Unmemoized`].
    pub fn find_or_create(
        &self,
        fingerprint: Fingerprint,
        make: impl FnOnce() -> SearchNode,
    ) -> Lookup {
        match self.claim(fingerprint) {
            Slot::Found(id) => Lookup::Found(id),
            Slot::Reserved(shard, index) => {
                Lookup::Created(self.store(shard, index, fingerprint, make()))
            }
            Slot::Full => Lookup::Unmemoized(make()),
        }
    }

    /// Like [`find_or_create`](Self::find_or_create), but never builds a
    /// node that could not be stored. Returns `None` when the fingerprint is
    /// missing and the table is full.
    pub fn find_or_insert(
        &self,
        fingerprint: Fingerprint,
        make: impl FnOnce() -> SearchNode,
    ) -> Option<NodeId> {
        match self.claim(fingerprint) {
            Slot::Found(id) => Some(id),
            Slot::Reserved(shard, index) => Some(self.store(shard, index, fingerprint, make())),
            Slot::Full => None,
        }
    }

    /// Find `fingerprint`, or reserve an arena slot for it while keeping its
    /// shard locked.
    fn claim(&self, fingerprint: Fingerprint) -> Slot<'_> {
        let shard = self.shard(fingerprint);
        if let Some(&id) = shard.get(&fingerprint) {
            return Slot::Found(id);
        }

        let capacity = self.capacity();
        let reserved = self
            .allocated
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                (n < capacity).then_some(n + 1)
            });
        match reserved {
            Ok(index) => Slot::Reserved(shard, index),
            Err(_) => {
                drop(shard);
                if !self.full_warned.swap(true, Ordering::Relaxed) {
                    warn!("transposition table full ({capacity} nodes); the tree stops growing");
                }
                Slot::Full
            }
        }
    }

    fn store(
        &self,
        mut shard: MutexGuard<'_, Shard>,
        index: usize,
        fingerprint: Fingerprint,
        node: SearchNode,
    ) -> NodeId {
        debug_assert_eq!(node.fingerprint(), fingerprint);
        // Slots are handed out once per reset, so the cell is always empty here
        let _ = self.arena[index].set(node);
        let id = NodeId::from_index(index);
        shard.insert(fingerprint, id);
        id
    }

    /// The node stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this table since its last reset.
    pub fn node(&self, id: NodeId) -> &SearchNode {
        match self.arena.get(id.index()).and_then(OnceLock::get) {
            Some(node) => node,
            None => panic!("stale node id {}", id.index()),
        }
    }

    /// Drop every node. Outstanding [`NodeId`]s become invalid.
    pub fn reset(&mut self) {
        for shard in self.shards.iter_mut() {
            shard.get_mut().unwrap_or_else(PoisonError::into_inner).clear();
        }
        let used = *self.allocated.get_mut();
        for slot in &mut self.arena[..used] {
            slot.take();
        }
        *self.allocated.get_mut() = 0;
        *self.full_warned.get_mut() = false;
    }
}

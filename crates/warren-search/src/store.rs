//! Search state stores: visited-node claiming and predecessor recording.

use std::collections::{HashMap, HashSet};

use dashmap::{DashMap, DashSet};
use warren_core::NodeId;

/// Storage backing one search invocation.
///
/// Claiming a node is the authorization to expand its neighbors: the
/// combined membership-test-and-insert must report whether this caller was
/// the one to add the node, so that exactly one claimer expands it.
pub trait SearchStore {
    /// Add `node` to the visited set if absent. Returns `true` when this
    /// call inserted it, granting the caller the exclusive right to expand
    /// the node.
    fn claim(&mut self, node: NodeId) -> bool;

    /// Whether `node` has already been claimed.
    fn is_claimed(&self, node: NodeId) -> bool;

    /// Record that `node` was first reached from `from`. The first recorded
    /// entry wins; later calls for the same node are ignored.
    fn record_predecessor(&mut self, node: NodeId, from: NodeId);

    /// The node from which `node` was first reached.
    fn predecessor(&self, node: NodeId) -> Option<NodeId>;

    /// Reconstruct the path from `from` to `to` by walking predecessor
    /// links backward from `to`, then reversing.
    ///
    /// # Panics
    ///
    /// Panics if the chain from `to` does not reach `from`. Every claimed
    /// node has its predecessor recorded before it is pushed onto any
    /// frontier, so a broken chain means the claim discipline was
    /// violated.
    fn path_from_to(&self, from: NodeId, to: NodeId) -> Vec<NodeId> {
        let mut path = vec![to];
        let mut curr = to;
        while curr != from {
            match self.predecessor(curr) {
                Some(prev) => {
                    path.push(prev);
                    curr = prev;
                }
                None => panic!("predecessor chain from {to} broken at {curr}"),
            }
        }
        path.reverse();
        path
    }
}

// ---------------------------------------------------------------------------
// LocalStore
// ---------------------------------------------------------------------------

/// Plain single-task store. No synchronization.
#[derive(Debug, Default)]
pub struct LocalStore {
    visited: HashSet<NodeId>,
    predecessor: HashMap<NodeId, NodeId>,
}

impl LocalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchStore for LocalStore {
    fn claim(&mut self, node: NodeId) -> bool {
        self.visited.insert(node)
    }

    fn is_claimed(&self, node: NodeId) -> bool {
        self.visited.contains(&node)
    }

    fn record_predecessor(&mut self, node: NodeId, from: NodeId) {
        self.predecessor.entry(node).or_insert(from);
    }

    fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessor.get(&node).copied()
    }
}

// ---------------------------------------------------------------------------
// SharedStore
// ---------------------------------------------------------------------------

/// Concurrency-safe store shared by every task of one parallel search.
///
/// The visited set's `insert` is an atomic add-if-absent and is the only
/// synchronization the search needs: a `true` return means this task won
/// the claim. Predecessors are first-write-wins, which keeps every recorded
/// chain anchored at the search root even when tasks race on the same key.
#[derive(Debug, Default)]
pub struct SharedStore {
    visited: DashSet<NodeId>,
    predecessor: DashMap<NodeId, NodeId>,
}

impl SharedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim `node`; `true` means this caller won.
    pub fn claim(&self, node: NodeId) -> bool {
        self.visited.insert(node)
    }

    /// Whether `node` has already been claimed by any task.
    pub fn is_claimed(&self, node: NodeId) -> bool {
        self.visited.contains(&node)
    }

    /// Record `from` as the predecessor of `node` unless one is already
    /// recorded.
    pub fn record_predecessor(&self, node: NodeId, from: NodeId) {
        self.predecessor.entry(node).or_insert(from);
    }

    /// The node from which `node` was first reached.
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessor.get(&node).map(|r| *r)
    }
}

/// Shared stores are driven through a shared reference, so any number of
/// tasks can run the same traversal code against one store.
impl SearchStore for &SharedStore {
    fn claim(&mut self, node: NodeId) -> bool {
        SharedStore::claim(*self, node)
    }

    fn is_claimed(&self, node: NodeId) -> bool {
        SharedStore::is_claimed(*self, node)
    }

    fn record_predecessor(&mut self, node: NodeId, from: NodeId) {
        SharedStore::record_predecessor(*self, node, from)
    }

    fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        SharedStore::predecessor(*self, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_reports_the_first_caller_only() {
        let mut store = LocalStore::new();
        assert!(store.claim(NodeId::new(7)));
        assert!(!store.claim(NodeId::new(7)));
        assert!(store.is_claimed(NodeId::new(7)));
        assert!(!store.is_claimed(NodeId::new(8)));
    }

    #[test]
    fn first_recorded_predecessor_wins() {
        let mut store = LocalStore::new();
        store.record_predecessor(NodeId::new(3), NodeId::new(1));
        store.record_predecessor(NodeId::new(3), NodeId::new(2));
        assert_eq!(store.predecessor(NodeId::new(3)), Some(NodeId::new(1)));
    }

    #[test]
    fn reconstructs_a_chain() {
        let mut store = LocalStore::new();
        store.record_predecessor(NodeId::new(1), NodeId::new(0));
        store.record_predecessor(NodeId::new(2), NodeId::new(1));
        store.record_predecessor(NodeId::new(3), NodeId::new(2));
        let path = store.path_from_to(NodeId::new(0), NodeId::new(3));
        let expected: Vec<NodeId> = (0..4).map(NodeId::new).collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn path_to_self_is_a_single_node() {
        let store = LocalStore::new();
        let path = store.path_from_to(NodeId::new(5), NodeId::new(5));
        assert_eq!(path, vec![NodeId::new(5)]);
    }

    #[test]
    #[should_panic(expected = "predecessor chain")]
    fn broken_chain_panics() {
        let store = LocalStore::new();
        store.path_from_to(NodeId::new(0), NodeId::new(9));
    }

    #[test]
    fn concurrent_claims_admit_exactly_one_winner() {
        let store = SharedStore::new();
        let winners: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| store.claim(NodeId::new(42)) as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(winners, 1);
        assert!(store.is_claimed(NodeId::new(42)));
    }

    #[test]
    fn concurrent_predecessor_writes_on_distinct_keys() {
        let store = SharedStore::new();
        std::thread::scope(|scope| {
            for t in 0..4u32 {
                let store = &store;
                scope.spawn(move || {
                    for i in (t * 100)..(t * 100 + 100) {
                        store.record_predecessor(NodeId::new(i + 1000), NodeId::new(i));
                    }
                });
            }
        });
        for i in 0..400u32 {
            assert_eq!(store.predecessor(NodeId::new(i + 1000)), Some(NodeId::new(i)));
        }
    }
}

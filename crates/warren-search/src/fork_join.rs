//! Fork/join parallel depth-first maze search.
//!
//! One search task runs per claimed fork point. All tasks of an invocation
//! share a [`SharedStore`] and a write-once goal flag; the store's atomic
//! claim is the only synchronization the algorithm needs. Tasks are scoped
//! threads: a parent joins exactly the children it spawned before its own
//! result is surfaced, and the first non-empty path in depth-first order
//! wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};

use warren_core::{Maze, NodeId};

use crate::store::{SearchStore, SharedStore};

/// State shared by every task of one parallel search invocation.
struct Shared {
    store: SharedStore,
    /// Write-once early-termination signal. Relaxed ordering suffices: a
    /// task reading a stale `false` performs one extra harmless iteration.
    goal_found: AtomicBool,
    /// Start node of the whole search; returned paths are anchored here.
    root: NodeId,
}

impl Shared {
    fn new(root: NodeId) -> Self {
        Self {
            store: SharedStore::new(),
            goal_found: AtomicBool::new(false),
            root,
        }
    }

    /// Path from the search root to `to` over the shared predecessor map.
    ///
    /// Predecessors are first-write-wins and only recorded while expanding
    /// a claimed node, so every chain terminates at the root no matter
    /// which task records which link.
    fn path_to(&self, to: NodeId) -> Vec<NodeId> {
        (&self.store).path_from_to(self.root, to)
    }
}

/// Search `maze` from `start`, forking additional concurrent tasks.
///
/// A task forks once it has advanced `fork_after` steps since its last
/// fork and its current node still branches into more than one unclaimed
/// neighbor. `fork_after == 0` disables forking, leaving a single task.
///
/// Returns the path from `start` to a goal node (both inclusive), or
/// `None` when no goal is reachable. Exactly one path is returned even
/// when several tasks reach goals near-simultaneously: the goal flag is
/// write-once and result aggregation keeps the first non-empty path in
/// depth-first order.
pub fn parallel_search<M>(maze: &M, start: NodeId, fork_after: usize) -> Option<Vec<NodeId>>
where
    M: Maze + Sync,
{
    let shared = Shared::new(start);
    thread::scope(|scope| Task::new(maze, &shared, start, fork_after).run(scope))
}

/// One concurrent unit of traversal: an exclusive frontier and step
/// counter over the invocation-wide shared state.
struct Task<'env, M> {
    maze: &'env M,
    shared: &'env Shared,
    start: NodeId,
    fork_after: usize,
    frontier: Vec<NodeId>,
    nbuf: Vec<NodeId>,
}

impl<'env, M: Maze + Sync> Task<'env, M> {
    fn new(maze: &'env M, shared: &'env Shared, start: NodeId, fork_after: usize) -> Self {
        Self {
            maze,
            shared,
            start,
            fork_after,
            frontier: Vec::new(),
            nbuf: Vec::with_capacity(8),
        }
    }

    fn run<'scope>(mut self, scope: &'scope Scope<'scope, 'env>) -> Option<Vec<NodeId>> {
        let mut children: Vec<ScopedJoinHandle<'scope, Option<Vec<NodeId>>>> = Vec::new();
        let player = self.maze.new_player(self.start);
        self.frontier.push(self.start);
        // Steps taken since this task last forked.
        let mut moves: usize = 0;
        let mut found = None;

        while !self.shared.goal_found.load(Ordering::Relaxed) {
            let Some(curr) = self.frontier.pop() else {
                break;
            };
            // The claim authorizes expansion. A forked task's start was
            // already claimed by its parent, so the task admits it anyway.
            if !self.shared.store.claim(curr) && curr != self.start {
                continue;
            }
            if self.maze.has_goal(curr) {
                self.shared.goal_found.store(true, Ordering::Relaxed);
                self.maze.move_player(player, curr);
                log::debug!("goal {curr} claimed by task rooted at {}", self.start);
                found = Some(self.shared.path_to(curr));
                break;
            }
            self.maze.move_player(player, curr);
            moves += 1;

            self.nbuf.clear();
            self.maze.neighbors(curr, &mut self.nbuf);
            // Snapshot of the still-unclaimed continuations from here. A
            // lone continuation always stays on this task's own frontier;
            // forking is only considered where the walk branches.
            self.nbuf.retain(|&nb| !self.shared.store.is_claimed(nb));
            let lone = self.nbuf.len() == 1;

            for i in 0..self.nbuf.len() {
                let nb = self.nbuf[i];
                // Recorded before any push or fork, so reconstruction
                // never walks into a missing entry.
                self.shared.store.record_predecessor(nb, curr);
                if lone || self.fork_after == 0 || moves < self.fork_after {
                    self.frontier.push(nb);
                } else if self.shared.store.claim(nb) {
                    // The counter resets here, so the remaining neighbors
                    // of `curr` are kept local: at most one fork per
                    // expansion.
                    moves = 0;
                    log::debug!("task at {} forking at {nb}", self.start);
                    let child = Task::new(self.maze, self.shared, nb, self.fork_after);
                    children.push(scope.spawn(move || child.run(scope)));
                }
                // A failed claim means another task owns `nb` now; there
                // is nothing left to do with it.
            }
        }

        if found.is_none() {
            log::trace!("task rooted at {} exhausted its frontier", self.start);
        }
        join_children(found, children)
    }
}

/// Join every spawned child and keep the first non-empty path in
/// depth-first order: the task's own result first, then the children in
/// spawn order. Children are always joined — on the success path too — so
/// no task is ever abandoned.
fn join_children(
    own: Option<Vec<NodeId>>,
    children: Vec<ScopedJoinHandle<'_, Option<Vec<NodeId>>>>,
) -> Option<Vec<NodeId>> {
    let mut result = own;
    for handle in children {
        match handle.join() {
            Ok(path) => {
                if result.is_none() {
                    result = path;
                }
            }
            // A panicking child broke a search invariant; the panic is
            // re-raised in the parent.
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
    result
}

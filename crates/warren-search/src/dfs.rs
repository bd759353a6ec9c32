//! Sequential depth-first maze search.

use warren_core::{Maze, NodeId};

use crate::store::{LocalStore, SearchStore};

/// Single-task depth-first search over a maze.
///
/// The store parameter selects the concurrency mode of the backing
/// structures: the default [`LocalStore`] for plain sequential use, or a
/// [`&SharedStore`](crate::SharedStore) when the same traversal runs
/// against state owned by a parallel search.
pub struct DepthFirst<'m, M, S = LocalStore> {
    maze: &'m M,
    start: NodeId,
    frontier: Vec<NodeId>,
    store: S,
    nbuf: Vec<NodeId>,
}

impl<'m, M: Maze> DepthFirst<'m, M> {
    /// Create a search from `start` backed by plain structures.
    pub fn new(maze: &'m M, start: NodeId) -> Self {
        Self::with_store(maze, start, LocalStore::new())
    }
}

impl<'m, M: Maze, S: SearchStore> DepthFirst<'m, M, S> {
    /// Create a search from `start` backed by `store`.
    pub fn with_store(maze: &'m M, start: NodeId, store: S) -> Self {
        Self {
            maze,
            start,
            frontier: Vec::new(),
            store,
            nbuf: Vec::with_capacity(8),
        }
    }

    /// Search for a goal and return the path from the start node to it
    /// (both inclusive), or `None` when no goal is reachable.
    pub fn search(&mut self) -> Option<Vec<NodeId>> {
        let player = self.maze.new_player(self.start);
        self.frontier.push(self.start);

        while let Some(curr) = self.frontier.pop() {
            // The claim is the authorization to expand. The start node is
            // admitted even when already claimed, so a search handed a
            // pre-claimed start still runs.
            if !self.store.claim(curr) && curr != self.start {
                continue;
            }
            if self.maze.has_goal(curr) {
                self.maze.move_player(player, curr);
                return Some(self.store.path_from_to(self.start, curr));
            }
            self.maze.move_player(player, curr);

            self.nbuf.clear();
            self.maze.neighbors(curr, &mut self.nbuf);
            for i in 0..self.nbuf.len() {
                let nb = self.nbuf[i];
                if self.store.is_claimed(nb) {
                    continue;
                }
                // Recorded before the push, so reconstruction never walks
                // into a missing entry.
                self.store.record_predecessor(nb, curr);
                self.frontier.push(nb);
            }
        }

        log::trace!("frontier exhausted from {} without reaching a goal", self.start);
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use warren_core::NodeId;

    use super::*;
    use crate::store::SharedStore;
    use crate::testmaze::{GraphMaze, assert_valid_path, diamond};

    #[test]
    fn finds_a_path_through_the_diamond() {
        let maze = diamond();
        let path = DepthFirst::new(&maze, NodeId::new(0)).search().unwrap();
        assert_valid_path(&maze, &path, NodeId::new(0));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn start_carrying_a_goal_yields_a_single_node_path() {
        let mut maze = GraphMaze::chain(3);
        maze.goal(0);
        let path = DepthFirst::new(&maze, NodeId::new(0)).search().unwrap();
        assert_eq!(path, vec![NodeId::new(0)]);
    }

    #[test]
    fn isolated_start_has_no_path() {
        let maze = GraphMaze::new(1);
        assert_eq!(DepthFirst::new(&maze, NodeId::new(0)).search(), None);
    }

    #[test]
    fn chain_returns_the_exact_corridor() {
        let mut maze = GraphMaze::chain(100);
        maze.goal(99);
        let path = DepthFirst::new(&maze, NodeId::new(0)).search().unwrap();
        let expected: Vec<NodeId> = (0..100).map(NodeId::new).collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn unreachable_goal_visits_every_reachable_node_once() {
        let maze = GraphMaze::grid(5, 5);
        assert_eq!(DepthFirst::new(&maze, NodeId::new(0)).search(), None);
        let visited = maze.visited_nodes();
        let distinct: HashSet<_> = visited.iter().collect();
        assert_eq!(distinct.len(), 25, "every reachable node is visited");
        assert_eq!(visited.len(), 25, "no node is expanded twice");
    }

    #[test]
    fn goal_beyond_a_disconnected_component_is_unreachable() {
        // Two components: 0-1-2 and 3-4, goal in the far one.
        let mut maze = GraphMaze::new(5);
        maze.edge(0, 1).edge(1, 2).edge(3, 4).goal(4);
        assert_eq!(DepthFirst::new(&maze, NodeId::new(0)).search(), None);
    }

    #[test]
    fn runs_against_a_shared_store() {
        let maze = diamond();
        let store = SharedStore::new();
        let path = DepthFirst::with_store(&maze, NodeId::new(0), &store)
            .search()
            .unwrap();
        assert_valid_path(&maze, &path, NodeId::new(0));
        assert!(store.is_claimed(NodeId::new(3)));
    }

    #[test]
    fn two_fresh_runs_are_both_valid() {
        for _ in 0..2 {
            let maze = diamond();
            let path = DepthFirst::new(&maze, NodeId::new(0)).search().unwrap();
            assert_valid_path(&maze, &path, NodeId::new(0));
        }
    }
}

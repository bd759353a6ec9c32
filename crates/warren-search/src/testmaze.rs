//! Test-only maze fixtures.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use warren_core::{Maze, NodeId, PlayerId};

/// Adjacency-list maze with goal marking and a move log.
///
/// Every `move_player` notification is recorded; tests use the log to
/// assert that no node is ever expanded twice and that exhaustive searches
/// reach every node. `players_registered` counts `new_player` calls, which
/// equals the number of search tasks that ran.
pub struct GraphMaze {
    adjacency: Vec<Vec<NodeId>>,
    goals: HashSet<NodeId>,
    players: AtomicU32,
    moves: Mutex<Vec<(PlayerId, NodeId)>>,
}

impl GraphMaze {
    pub fn new(nodes: u32) -> Self {
        Self {
            adjacency: vec![Vec::new(); nodes as usize],
            goals: HashSet::new(),
            players: AtomicU32::new(0),
            moves: Mutex::new(Vec::new()),
        }
    }

    /// Add an undirected edge between `a` and `b`.
    pub fn edge(&mut self, a: u32, b: u32) -> &mut Self {
        self.adjacency[a as usize].push(NodeId::new(b));
        self.adjacency[b as usize].push(NodeId::new(a));
        self
    }

    /// Mark `node` as carrying a goal.
    pub fn goal(&mut self, node: u32) -> &mut Self {
        self.goals.insert(NodeId::new(node));
        self
    }

    /// A linear corridor `0 - 1 - ... - nodes-1`.
    pub fn chain(nodes: u32) -> Self {
        let mut maze = Self::new(nodes);
        for i in 1..nodes {
            maze.edge(i - 1, i);
        }
        maze
    }

    /// An open `w x h` grid with 4-way adjacency, numbered row-major.
    pub fn grid(w: u32, h: u32) -> Self {
        let mut maze = Self::new(w * h);
        for y in 0..h {
            for x in 0..w {
                let n = y * w + x;
                if x + 1 < w {
                    maze.edge(n, n + 1);
                }
                if y + 1 < h {
                    maze.edge(n, n + w);
                }
            }
        }
        maze
    }

    pub fn players_registered(&self) -> u32 {
        self.players.load(Ordering::Relaxed)
    }

    /// Nodes a player was moved to, in arrival order.
    pub fn visited_nodes(&self) -> Vec<NodeId> {
        self.moves.lock().unwrap().iter().map(|&(_, n)| n).collect()
    }

    pub fn adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency[a.value() as usize].contains(&b)
    }

    pub fn is_goal(&self, node: NodeId) -> bool {
        self.goals.contains(&node)
    }
}

impl Maze for GraphMaze {
    fn new_player(&self, _at: NodeId) -> PlayerId {
        PlayerId::new(self.players.fetch_add(1, Ordering::Relaxed))
    }

    fn has_goal(&self, node: NodeId) -> bool {
        self.goals.contains(&node)
    }

    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>) {
        buf.extend_from_slice(&self.adjacency[node.value() as usize]);
    }

    fn move_player(&self, player: PlayerId, to: NodeId) {
        self.moves.lock().unwrap().push((player, to));
    }
}

/// The four-node branching maze: `0 - {1, 2} - 3`, goal at 3.
pub fn diamond() -> GraphMaze {
    let mut maze = GraphMaze::new(4);
    maze.edge(0, 1).edge(0, 2).edge(1, 3).edge(2, 3).goal(3);
    maze
}

/// Assert `path` is a start-to-goal walk through `maze`.
pub fn assert_valid_path(maze: &GraphMaze, path: &[NodeId], start: NodeId) {
    assert!(!path.is_empty(), "path must not be empty");
    assert_eq!(path[0], start, "path must begin at the start node");
    assert!(
        maze.is_goal(*path.last().unwrap()),
        "path must end on a goal node"
    );
    for pair in path.windows(2) {
        assert!(
            maze.adjacent(pair[0], pair[1]),
            "{} and {} are not adjacent",
            pair[0],
            pair[1]
        );
    }
}

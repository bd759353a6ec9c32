//! The maze collaborator interface consumed by the search engines.

use crate::node::{NodeId, PlayerId};

/// Minimal maze interface — goal marking, neighbor enumeration, and
/// player-token bookkeeping.
///
/// Player registration and movement notifications exist purely so an
/// embedding application can observe or animate a search; they have no
/// effect on the result. All methods take `&self` because parallel
/// searches call them from many tasks at once — implementations that track
/// tokens do so behind interior mutability.
pub trait Maze {
    /// Register a new traversal token at `at` and return its handle.
    fn new_player(&self, at: NodeId) -> PlayerId;

    /// Whether `node` carries a goal.
    fn has_goal(&self, node: NodeId) -> bool;

    /// Append the neighbors of `node` into `buf`. The caller clears `buf`
    /// before calling.
    fn neighbors(&self, node: NodeId, buf: &mut Vec<NodeId>);

    /// Notify the maze that `player` advanced to `to`.
    fn move_player(&self, player: PlayerId, to: NodeId);
}

//! Arena storage for the search tree.
//!
//! Nodes live in one contiguous Vec and reference each other through
//! `NodeId` indices, so the tree can grow without chasing pointers and can
//! be rebuilt cheaply when the root advances.

use std::collections::VecDeque;

use log::debug;

use crate::board::Move;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(pub u32);

/// A search node. Children occupy one contiguous arena block written at
/// expansion time; an empty range means the node was never expanded. The
/// root is its own parent, and that self-loop is what terminates every
/// upward walk.
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: NodeId,
    pub children_start: u32,
    pub children_end: u32,
    pub win_count: i32,
    pub visits: u32,
    pub last_move: Option<Move>,
}

impl Node {
    /// Visits start at one so the visit counter is never a zero divisor.
    pub fn new(parent: NodeId, last_move: Option<Move>) -> Node {
        Node {
            parent,
            children_start: 0,
            children_end: 0,
            win_count: 0,
            visits: 1,
            last_move,
        }
    }

    pub fn child_count(&self) -> u32 {
        self.children_end - self.children_start
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> {
        (self.children_start..self.children_end).map(NodeId)
    }
}

pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding only a self-parented root with no move label.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeId(0), None)],
            root: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends one child per move as a contiguous block and links the
    /// range into `id`. An empty move list leaves the node childless.
    pub fn expand(&mut self, id: NodeId, moves: &[Move]) {
        let start = self.nodes.len() as u32;
        for &mv in moves {
            self.nodes.push(Node::new(id, Some(mv)));
        }
        let end = self.nodes.len() as u32;

        let node = self.get_mut(id);
        node.children_start = start;
        node.children_end = end;
    }

    /// Appends a single child under a childless node. Used when the game
    /// advances along a move the search never expanded.
    pub fn append_child(&mut self, id: NodeId, mv: Move) -> NodeId {
        debug_assert_eq!(self.get(id).child_count(), 0, "append_child on expanded node");
        let child = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, Some(mv)));

        let node = self.get_mut(id);
        node.children_start = child.0;
        node.children_end = child.0 + 1;
        child
    }

    /// Rebuilds the arena breadth-first so it holds exactly the nodes
    /// reachable from `new_root`, which lands at index 0 as its own parent.
    /// Counters and move labels survive; indices do not.
    pub fn compact(&mut self, new_root: NodeId) {
        let old = std::mem::take(&mut self.nodes);
        let start_size = old.len();

        let mut root_node = old[new_root.0 as usize].clone();
        root_node.parent = NodeId(0);
        self.nodes.push(root_node);
        self.root = NodeId(0);

        let mut queue = VecDeque::new();
        queue.push_back((new_root, NodeId(0)));

        while let Some((old_id, new_id)) = queue.pop_front() {
            let old_node = &old[old_id.0 as usize];
            let start = self.nodes.len() as u32;

            for i in old_node.children_start..old_node.children_end {
                let new_child_id = NodeId(self.nodes.len() as u32);
                let mut child = old[i as usize].clone();
                child.parent = new_id;
                self.nodes.push(child);
                queue.push_back((NodeId(i), new_child_id));
            }

            let end = self.nodes.len() as u32;
            let node = &mut self.nodes[new_id.0 as usize];
            node.children_start = start;
            node.children_end = end;
        }

        debug!("tree compacted from {} to {} nodes", start_size, self.nodes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tree_has_self_parented_root() {
        let tree = Tree::new();
        assert_eq!(tree.len(), 1);
        let root = tree.get(tree.root());
        assert_eq!(root.parent, tree.root());
        assert_eq!(root.child_count(), 0);
        assert_eq!(root.visits, 1);
    }

    #[test]
    fn expand_links_contiguous_children() {
        let mut tree = Tree::new();
        let moves = [Move::new(0, 0), Move::new(0, 1), Move::new(7, 7)];
        tree.expand(tree.root(), &moves);

        assert_eq!(tree.len(), 4);
        let root = tree.get(tree.root());
        assert_eq!(root.children_start, 1);
        assert_eq!(root.children_end, 4);
        for (id, mv) in root.children().zip(moves) {
            let child = tree.get(id);
            assert_eq!(child.parent, tree.root());
            assert_eq!(child.last_move, Some(mv));
        }
    }

    #[test]
    fn compact_drops_unreachable_siblings() {
        let mut tree = Tree::new();
        tree.expand(tree.root(), &[Move::new(1, 1), Move::new(2, 2)]);
        let kept = NodeId(1);
        tree.get_mut(kept).win_count = 5;
        tree.get_mut(kept).visits = 9;
        let grandchild_moves = [Move::new(3, 3)];
        tree.expand(kept, &grandchild_moves);

        tree.compact(kept);

        assert_eq!(tree.len(), 2, "kept node and its child only");
        let root = tree.get(tree.root());
        assert_eq!(root.parent, NodeId(0));
        assert_eq!(root.win_count, 5);
        assert_eq!(root.visits, 9);
        assert_eq!(root.last_move, Some(Move::new(1, 1)));
        let child = tree.get(NodeId(1));
        assert_eq!(child.parent, NodeId(0));
        assert_eq!(child.last_move, Some(Move::new(3, 3)));
    }
}

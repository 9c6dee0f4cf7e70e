use std::ops::{Index, IndexMut};

/// Stable index of a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Append-only node arena addressed by [`NodeId`].
///
/// Nodes are never removed individually; structural edits rewrite the links
/// stored inside the nodes, not the arena itself. `clear` drops everything at
/// once, which is the only form of deallocation the splay tree needs.
#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    nodes: Vec<T>,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn alloc(&mut self, value: T) -> NodeId {
        self.nodes.push(value);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, value)| (NodeId(idx), value))
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        &self.nodes[id.0]
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.0]
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_assigns_sequential_ids() {
        let mut arena = NodeArena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena[a], "a");
        assert_eq!(arena[b], "b");
    }

    #[test]
    fn index_mut_updates_in_place() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(10);
        arena[id] = 20;
        assert_eq!(arena.get(id), Some(&20));
    }

    #[test]
    fn clear_empties_arena() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(1);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.get(id), None);
    }

    #[test]
    fn iter_yields_all_nodes() {
        let mut arena = NodeArena::new();
        arena.alloc(1);
        arena.alloc(2);
        let collected: Vec<_> = arena.iter().map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(collected, vec![(0, 1), (1, 2)]);
    }
}

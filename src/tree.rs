use crate::game::{Game, Position};
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Search statistics of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub visits: u32,
    pub score: i64,
    /// Result of the most recent evaluation that passed through this node.
    pub status: Option<Status>,
    /// Set when one of this node's children was found stuck. Selection avoids dead nodes.
    pub dead: bool,
}

impl Evaluation {
    pub fn mean_score(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.score as f64 / self.visits as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub state: Game,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub eval: Evaluation,
}

impl Node {
    fn new(state: Game, parent: Option<NodeId>) -> Self {
        Node {
            state,
            parent,
            children: Vec::new(),
            eval: Evaluation::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(root: Game) -> Self {
        Tree {
            nodes: vec![Node::new(root, None)],
        }
    }

    /// # Panics
    /// Panics if the id does not belong to this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn root(&self) -> &Node {
        self.get(NodeId::ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).parent
    }

    /// Attach a new child holding `state` under `parent`.
    pub fn add_child(&mut self, parent: NodeId, state: Game) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(state, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Create one child per state reachable with a single legal move. Returns the new ids.
    pub fn expand(&mut self, id: NodeId) -> Vec<NodeId> {
        let successors = self.get(id).state.successors();
        successors
            .into_iter()
            .map(|state| self.add_child(id, state))
            .collect()
    }

    /// Ids from `id` up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Player positions from the first move after the root down to `id`.
    pub fn path_to(&self, id: NodeId) -> Vec<Position> {
        let mut path: Vec<Position> = self
            .ancestors(id)
            .filter(|&node| node != NodeId::ROOT)
            .map(|node| self.get(node).state.player())
            .collect();
        path.reverse();
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count() - 1
    }
}

pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

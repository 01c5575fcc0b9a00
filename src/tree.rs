//! Arena-backed tree data structure for MCTS

use crate::Player;

/// Index of a node inside a [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId{
    /// Position of the node in the arena, in creation order.
    #[inline]
    pub fn index(self) -> usize{
        self.0
    }
}

/// A node of the search tree.
///
/// # Type Parameters
/// - `S`: The board state stored in the node
#[derive(Clone, Debug)]
pub struct SearchNode<S>{
    pub(crate) state: S,
    pub(crate) player: Player,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) value: f64,
    pub(crate) visits: usize
}

impl<S> SearchNode<S>{
    #[inline]
    fn new(state: S, player: Player, parent: Option<NodeId>, visits: usize) -> Self{
        SearchNode { state, player, parent, children: Vec::new(), value: 0.0, visits }
    }

    /// The position this node stands for.
    #[inline]
    pub fn state(&self) -> &S{
        &self.state
    }

    /// The player to move from this node's state.
    #[inline]
    pub fn player(&self) -> Player{
        self.player
    }

    /// Gets the parent node if it exists
    #[inline]
    pub fn parent(&self) -> Option<NodeId>{
        self.parent
    }

    /// Checks if this node is the root (has no parent)
    #[inline]
    pub fn is_root(&self) -> bool{
        self.parent.is_none()
    }

    /// Children in the order they were expanded.
    #[inline]
    pub fn children(&self) -> &[NodeId]{
        &self.children
    }

    /// Mean utility of the simulations that went through this node.
    ///
    /// Utilities are counted as-is on nodes where `Light` is to move and
    /// negated on nodes where `Dark` is to move, so a high value is good for
    /// the player who made the move leading here.
    #[inline]
    pub fn value(&self) -> f64{
        self.value
    }

    /// Number of times this node has been visited.
    #[inline]
    pub fn visits(&self) -> usize{
        self.visits
    }

    /// Folds one simulated utility into the running mean.
    #[inline]
    pub(crate) fn record(&mut self, utility: f64){
        self.visits += 1;

        let utility = match self.player {
            Player::Light => utility,
            Player::Dark => -utility
        };

        self.value = (self.value * (self.visits - 1) as f64 + utility) / self.visits as f64;
    }
}

/// The search tree of one decision. Nodes live in a flat arena and refer to
/// each other by [`NodeId`]; the whole tree is dropped at once.
#[derive(Clone, Debug)]
pub struct Tree<S>{
    nodes: Vec<SearchNode<S>>
}

impl<S> Tree<S>{
    /// Creates a tree holding only a root for `state`, with `player` to move.
    ///
    /// The root starts with one visit so that the UCT logarithm of its visit
    /// count is always defined.
    pub fn new_root(state: S, player: Player) -> Self{
        Tree { nodes: vec![SearchNode::new(state, player, None, 1)] }
    }

    #[inline]
    pub fn root(&self) -> NodeId{
        NodeId(0)
    }

    /// Total number of nodes.
    #[inline]
    pub fn len(&self) -> usize{
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool{
        self.nodes.is_empty()
    }

    /// Gets a reference to a node.
    ///
    /// # Panics
    /// If `id` does not belong to this tree.
    #[inline]
    pub fn get(&self, id: NodeId) -> &SearchNode<S>{
        &self.nodes[id.0]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut SearchNode<S>{
        &mut self.nodes[id.0]
    }

    /// Iterates over every node in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SearchNode<S>)>{
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Appends an unvisited child under `parent`.
    ///
    /// # Returns
    /// The id of the newly created child node
    pub fn add_child(&mut self, parent: NodeId, state: S, player: Player) -> NodeId{
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode::new(state, player, Some(parent), 0));
        self.nodes[parent.0].children.push(id);
        id
    }
}

impl<S: PartialEq> Tree<S>{
    /// Finds the child of `node` whose state is exactly `state`.
    pub fn find_child(&self, node: NodeId, state: &S) -> Option<NodeId>{
        self.get(node).children.iter()
            .copied()
            .find(|&child| self.get(child).state == *state)
    }
}

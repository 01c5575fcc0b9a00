//! Test utilities for the MCTS implementation

use crate::{Board, NodeId, Player, RandomSource, Tree};

fn board(rows: [[u8; 4]; 4]) -> Board {
    Board::from_rows(rows.iter().map(|row| row.to_vec()).collect())
        .unwrap_or_else(|e| panic!("invalid fixture board: {e}"))
}

/// A 4x4 position with `Dark` to move and three legal moves.
pub fn fixture_initial() -> Board {
    board([[2, 1, 0, 0],
           [0, 2, 2, 2],
           [0, 1, 2, 0],
           [1, 2, 1, 0]])
}

/// `fixture_initial` after `Dark` plays (2, 0).
pub fn fixture_child1() -> Board {
    board([[2, 1, 1, 0],
           [0, 2, 1, 2],
           [0, 1, 1, 0],
           [1, 2, 1, 0]])
}

/// `fixture_initial` after `Dark` plays (3, 0).
pub fn fixture_child2() -> Board {
    board([[2, 1, 0, 1],
           [0, 2, 1, 2],
           [0, 1, 2, 0],
           [1, 2, 1, 0]])
}

/// `fixture_initial` after `Dark` plays (3, 2).
pub fn fixture_child3() -> Board {
    board([[2, 1, 0, 0],
           [0, 2, 1, 2],
           [0, 1, 1, 1],
           [1, 2, 1, 0]])
}

/// `fixture_child3` after `Light` plays (2, 0).
pub fn fixture_grandchild1() -> Board {
    board([[2, 2, 2, 0],
           [0, 2, 1, 2],
           [0, 1, 1, 1],
           [1, 2, 1, 0]])
}

/// `fixture_child3` after `Light` plays (3, 3).
pub fn fixture_grandchild2() -> Board {
    board([[2, 1, 0, 0],
           [0, 2, 1, 2],
           [0, 1, 2, 2],
           [1, 2, 2, 2]])
}

/// Ids of the nodes of [`fixture_tree`].
pub struct FixtureNodes {
    pub root: NodeId,
    pub child1: NodeId,
    pub child2: NodeId,
    pub child3: NodeId,
    pub grandchild1: NodeId,
}

fn set_stats(tree: &mut Tree<Board>, id: NodeId, value: f64, visits: usize) {
    let node = tree.get_mut(id);
    node.value = value;
    node.visits = visits;
}

/// A partially searched tree over `fixture_initial`:
///
/// - root: value 0, 20 visits, fully expanded
/// - child1: value -1, 1 visit
/// - child2: value 1.5, 17 visits
/// - child3: value 1, 2 visits, one of its two moves expanded
/// - grandchild1 (under child3): value 0, 2 visits
pub fn fixture_tree() -> (Tree<Board>, FixtureNodes) {
    let mut tree = Tree::new_root(fixture_initial(), Player::Dark);
    let root = tree.root();
    set_stats(&mut tree, root, 0.0, 20);

    let child1 = tree.add_child(root, fixture_child1(), Player::Light);
    set_stats(&mut tree, child1, -1.0, 1);
    let child2 = tree.add_child(root, fixture_child2(), Player::Light);
    set_stats(&mut tree, child2, 1.5, 17);
    let child3 = tree.add_child(root, fixture_child3(), Player::Light);
    set_stats(&mut tree, child3, 1.0, 2);
    let grandchild1 = tree.add_child(child3, fixture_grandchild1(), Player::Dark);
    set_stats(&mut tree, grandchild1, 0.0, 2);

    (tree, FixtureNodes { root, child1, child2, child3, grandchild1 })
}

/// A deterministic random source based on SplitMix64.
///
/// `pick(len)` is the next output modulo `len`, which makes every choice
/// easy to reproduce outside of Rust.
pub struct SplitMixSource {
    state: u64,
}

impl SplitMixSource {
    pub fn new(seed: u64) -> Self {
        SplitMixSource { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl RandomSource for SplitMixSource {
    fn pick(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }
}

/// Always picks the first candidate.
pub struct FirstSource;

impl RandomSource for FirstSource {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// Utility function to compare floats with tolerance
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

//! Implementation of the Monte Carlo Tree Search (MCTS) algorithm.
//!
//! Each decision grows a fresh tree from the current position. One rollout
//! walks down the tree with UCT until it reaches a node that still has an
//! untried move, adds one child for a random untried move, plays a uniformly
//! random game from that child to the end and folds the final utility back
//! into every node on the way up to the root. After the rollout budget is
//! spent, the most visited move at the root is played.

use tracing::{debug, trace};

use crate::{utils::choose, MctsConfig, MctsError, Move, NodeId, Player, RandomSource, RuleEngine, Tree};

/// The UCT score of a child during selection:
/// `value / n_visits + exploration_coef * sqrt(ln(parent_n_visits) / n_visits)`.
///
/// # Parameters
/// - `value`: The value of the child node.
/// - `n_visits`: Number of visits to the child node. Must be at least 1.
/// - `parent_n_visits`: Number of visits to the parent node. Must be at least 1.
/// - `exploration_coef`: The exploration coefficient.
#[inline]
pub fn uct_score(value: f64, n_visits: f64, parent_n_visits: f64, exploration_coef: f64) -> f64{
    value / n_visits + exploration_coef * (parent_n_visits.ln() / n_visits).sqrt()
}

/// The Monte Carlo Tree Search decision engine.
///
/// # Type Parameters
/// - `E`: The rule engine of the game being played.
pub struct Mcts<E: RuleEngine>{
    engine: E,
    config: MctsConfig
}

impl<E: RuleEngine> Mcts<E>{
    /// Creates a search engine for `engine` with the given configuration.
    ///
    /// # Returns
    /// `Err(MctsError::InvalidConfig(_))` if `config` does not validate.
    pub fn new(engine: E, config: MctsConfig) -> Result<Self, MctsError>{
        config.validate()?;
        Ok(Mcts { engine, config })
    }

    #[inline]
    pub fn engine(&self) -> &E{
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &MctsConfig{
        &self.config
    }

    /// Performs the selection phase of MCTS.
    ///
    /// Starting at `node`, descends through fully expanded nodes by picking
    /// the child with the greatest [`uct_score`]. On equal scores the child
    /// expanded first wins.
    ///
    /// # Returns
    /// The first node reached that either has an untried move or has no
    /// legal move at all.
    pub fn selection(&self, tree: &Tree<E::State>, node: NodeId) -> NodeId{
        let mut node = node;

        loop {
            let current = tree.get(node);
            let moves = self.engine.legal_moves(current.state(), current.player());

            if moves.is_empty() || current.children().len() < moves.len() {
                return node;
            }

            let parent_visits = current.visits() as f64;
            let mut best: Option<(NodeId, f64)> = None;

            for &child_id in current.children() {
                let child = tree.get(child_id);
                let score = uct_score(child.value(), child.visits() as f64, parent_visits, self.config.exploration_coef);

                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((child_id, score));
                }
            }

            match best {
                Some((child_id, _)) => node = child_id,
                None => return node
            }
        }
    }

    /// Performs the expansion phase of MCTS.
    ///
    /// Picks uniformly among the legal moves of `node` whose resulting state
    /// is not yet a child, and appends that state as a new child with the
    /// opponent to move.
    ///
    /// # Returns
    /// The new child, or `node` itself when nothing is left to expand
    /// (fully expanded or terminal).
    pub fn expansion<R: RandomSource + ?Sized>(&self, tree: &mut Tree<E::State>, node: NodeId, rng: &mut R) -> NodeId{
        let current = tree.get(node);
        let player = current.player();

        let mut untried: Vec<E::State> = self.engine.legal_moves(current.state(), player)
            .into_iter()
            .map(|mv| self.engine.apply_move(current.state(), player, mv))
            .filter(|state| tree.find_child(node, state).is_none())
            .collect();

        if untried.is_empty() {
            return node;
        }

        let state = untried.swap_remove(rng.pick(untried.len()));
        tree.add_child(node, state, player.opponent())
    }

    /// Performs the simulation phase of MCTS.
    ///
    /// Plays uniformly random moves from `state`, `player` to move first,
    /// until the player to move has no legal move.
    ///
    /// # Returns
    /// The utility of the final position.
    pub fn simulation<R: RandomSource + ?Sized>(&self, state: &E::State, player: Player, rng: &mut R) -> f64{
        let mut state = state.clone();
        let mut player = player;

        loop {
            let moves = self.engine.legal_moves(&state, player);

            match choose(&moves, rng) {
                Some(&mv) => {
                    state = self.engine.apply_move(&state, player, mv);
                    player = player.opponent();
                },
                None => return self.engine.terminal_utility(&state)
            }
        }
    }

    /// Performs the backpropagation phase of MCTS.
    ///
    /// Adds one visit to `node` and to each of its ancestors, and folds
    /// `utility` into their running means: as-is on nodes where `Light` is
    /// to move, negated where `Dark` is to move.
    pub fn backpropagation(&self, tree: &mut Tree<E::State>, node: NodeId, utility: f64){
        let mut current = Some(node);

        while let Some(id) = current {
            let node = tree.get_mut(id);
            node.record(utility);
            current = node.parent();
        }
    }

    /// Performs one full rollout (selection, expansion, simulation, backpropagation)
    /// from the root of `tree`.
    pub fn iterate<R: RandomSource + ?Sized>(&self, tree: &mut Tree<E::State>, rng: &mut R){
        let leaf = self.selection(tree, tree.root());
        let expanded = self.expansion(tree, leaf, rng);

        let node = tree.get(expanded);
        let utility = self.simulation(node.state(), node.player(), rng);

        self.backpropagation(tree, expanded, utility);

        trace!(leaf = leaf.index(), expanded = expanded.index(), utility, "MCTS rollout complete");
    }

    /// Builds a search tree rooted at `state` and runs the configured number
    /// of rollouts on it.
    ///
    /// # Returns
    /// `Err(MctsError::NoLegalMoves{..})` if `player` cannot move from `state`.
    pub fn search<R: RandomSource + ?Sized>(&self, state: E::State, player: Player, rng: &mut R) -> Result<Tree<E::State>, MctsError>{
        if self.engine.legal_moves(&state, player).is_empty() {
            return Err(MctsError::NoLegalMoves { player });
        }

        let mut tree = Tree::new_root(state, player);

        for _ in 0..self.config.rollouts {
            self.iterate(&mut tree, rng);
        }

        Ok(tree)
    }

    /// Reads the decision off a searched tree: the legal root move whose
    /// child has the most visits. Moves are scanned in the rule engine's
    /// order and the first one wins on equal visits.
    ///
    /// # Returns
    /// `Err(MctsError::NoLegalMoves{..})` if the root has no legal move.
    /// `Err(MctsError::UnexploredRoot)` if no root child has been visited.
    pub fn best_move(&self, tree: &Tree<E::State>) -> Result<Move, MctsError>{
        let root_id = tree.root();
        let root = tree.get(root_id);
        let moves = self.engine.legal_moves(root.state(), root.player());

        if moves.is_empty() {
            return Err(MctsError::NoLegalMoves { player: root.player() });
        }

        let mut best = None;
        let mut plays = 0;

        for mv in moves.iter().copied() {
            let state = self.engine.apply_move(root.state(), root.player(), mv);

            let visits = match tree.find_child(root_id, &state) {
                Some(child) => tree.get(child).visits(),
                None => {
                    // only possible when the budget was smaller than the branching factor
                    debug_assert!(root.visits() <= moves.len(), "legal root move {mv} was never expanded");
                    0
                }
            };

            if visits > plays {
                plays = visits;
                best = Some(mv);
            }
        }

        best.ok_or(MctsError::UnexploredRoot)
    }

    /// Chooses a move for `player` in `state`.
    ///
    /// The tree is built for this call only and dropped before returning.
    ///
    /// # Returns
    /// `Err(MctsError::NoLegalMoves{..})` if `player` cannot move from
    /// `state`; callers should check for the end of the game first.
    pub fn decide<R: RandomSource + ?Sized>(&self, state: E::State, player: Player, rng: &mut R) -> Result<Move, MctsError>{
        debug!(?player, rollouts = self.config.rollouts, exploration_coef = self.config.exploration_coef, "MCTS decision started");

        let tree = self.search(state, player, rng)?;
        let mv = self.best_move(&tree)?;

        let root = tree.get(tree.root());
        debug!(%mv, root_visits = root.visits(), root_value = root.value(), nodes = tree.len(), "MCTS decision complete");

        Ok(mv)
    }
}

/// Chooses a move for `player` in `state` with a one-off search of
/// `rollouts` rollouts and exploration coefficient `exploration_coef`.
///
/// # Examples
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use othello_mcts::{decide, Board, Othello, Player, RuleEngine};
///
/// let board = Board::initial(4).unwrap();
/// let mut rng = StdRng::seed_from_u64(7);
/// let mv = decide(Othello, board.clone(), Player::Dark, 100, 5.0, &mut rng).unwrap();
/// assert!(Othello.legal_moves(&board, Player::Dark).contains(&mv));
/// ```
pub fn decide<E, R>(engine: E, state: E::State, player: Player, rollouts: usize, exploration_coef: f64, rng: &mut R) -> Result<Move, MctsError>
where
    E: RuleEngine,
    R: RandomSource + ?Sized
{
    let config = MctsConfig::new(rollouts, exploration_coef)?;
    Mcts::new(engine, config)?.decide(state, player, rng)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{test_utils::*, Board, MctsConfig, MctsError, Move, Othello, Player, RuleEngine, Tree};
    use super::*;

    fn mcts(rollouts: usize, exploration_coef: f64) -> Mcts<Othello> {
        Mcts::new(Othello, MctsConfig::new(rollouts, exploration_coef).unwrap()).unwrap()
    }

    #[test]
    fn test_uct_score(){
        assert!(approx_eq(uct_score(1.0, 2.0, 20.0, 1.0), 0.5 + (20f64.ln() / 2.0).sqrt()));
        assert!(approx_eq(uct_score(-1.0, 1.0, 20.0, 0.0), -1.0));
        // a single visit at the parent gives no exploration bonus
        assert!(approx_eq(uct_score(3.0, 3.0, 1.0, 5.0), 1.0));
    }

    #[test]
    fn test_selection_fixture(){
        let (tree, nodes) = fixture_tree();
        let mcts = mcts(1, 1.0);

        let selected = mcts.selection(&tree, nodes.root);

        assert_eq!(selected, nodes.child3);
        assert_eq!(*tree.get(selected).state(), fixture_child3());
    }

    #[test]
    fn test_selection_deterministic(){
        let (tree, nodes) = fixture_tree();
        let mcts = mcts(1, 1.0);

        let first = mcts.selection(&tree, nodes.root);
        for _ in 0..10 {
            assert_eq!(mcts.selection(&tree, nodes.root), first);
        }
    }

    #[test]
    fn test_selection_not_fully_expanded(){
        let (tree, nodes) = fixture_tree();
        let mcts = mcts(1, 1.0);

        // child3 has two legal moves and a single child
        assert_eq!(mcts.selection(&tree, nodes.child3), nodes.child3);
    }

    #[test]
    fn test_selection_descends_fully_expanded(){
        let (mut tree, nodes) = fixture_tree();
        let grandchild2 = tree.add_child(nodes.child3, fixture_grandchild2(), Player::Dark);
        tree.get_mut(grandchild2).value = 5.0;
        tree.get_mut(grandchild2).visits = 1;

        let mcts = mcts(1, 0.0);

        assert_eq!(mcts.selection(&tree, nodes.root), grandchild2);
    }

    #[test]
    fn test_selection_tie_first_wins(){
        let (mut tree, nodes) = fixture_tree();
        for id in [nodes.child1, nodes.child2] {
            tree.get_mut(id).value = 3.0;
            tree.get_mut(id).visits = 1;
        }

        let mcts = mcts(1, 0.0);

        assert_eq!(mcts.selection(&tree, nodes.root), nodes.child1);
    }

    #[test]
    fn test_selection_terminal(){
        let board = Board::from_rows(vec![
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0]
        ]).unwrap();
        let tree = Tree::new_root(board, Player::Light);
        let mcts = mcts(1, 1.0);

        assert_eq!(mcts.selection(&tree, tree.root()), tree.root());
    }

    #[test]
    fn test_expansion_fixture(){
        let (mut tree, nodes) = fixture_tree();
        let mcts = mcts(1, 1.0);
        let mut rng = StdRng::seed_from_u64(5);

        let expanded = mcts.expansion(&mut tree, nodes.child3, &mut rng);

        let node = tree.get(expanded);
        assert_eq!(*node.state(), fixture_grandchild2());
        assert_eq!(node.player(), Player::Dark);
        assert_eq!(node.visits(), 0);
        assert_eq!(node.value(), 0.0);
        assert_eq!(node.parent(), Some(nodes.child3));
        assert!(node.children().is_empty());
        assert_eq!(tree.get(nodes.child3).children(), &[nodes.grandchild1, expanded]);
    }

    #[test]
    fn test_expansion_exhausted(){
        let (mut tree, nodes) = fixture_tree();
        let mcts = mcts(1, 1.0);
        let mut rng = StdRng::seed_from_u64(5);

        mcts.expansion(&mut tree, nodes.child3, &mut rng);
        let len = tree.len();

        assert_eq!(mcts.expansion(&mut tree, nodes.child3, &mut rng), nodes.child3);
        assert_eq!(mcts.expansion(&mut tree, nodes.root, &mut rng), nodes.root);
        assert_eq!(tree.len(), len);
        assert_eq!(tree.get(nodes.child3).children().len(), 2);
    }

    #[test]
    fn test_expansion_terminal(){
        let board = Board::from_rows(vec![
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0]
        ]).unwrap();
        let mut tree = Tree::new_root(board, Player::Light);
        let root = tree.root();
        let mcts = mcts(1, 1.0);

        assert_eq!(mcts.expansion(&mut tree, root, &mut FirstSource), root);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_expansion_picks_untried(){
        let board = Board::initial(4).unwrap();
        let mut tree = Tree::new_root(board.clone(), Player::Dark);
        let root = tree.root();
        let mcts = mcts(1, 1.0);
        let moves = Othello.legal_moves(&board, Player::Dark);

        for mv in &moves {
            let child = mcts.expansion(&mut tree, root, &mut FirstSource);
            assert_eq!(tree.get(child).player(), Player::Light);
            assert!(tree.find_child(root, &Othello.apply_move(&board, Player::Dark, *mv)).is_some());
        }

        assert_eq!(tree.get(root).children().len(), moves.len());
        assert_eq!(mcts.expansion(&mut tree, root, &mut FirstSource), root);
    }

    #[test]
    fn test_simulation_fixture(){
        let mcts = mcts(1, 1.0);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let utility = mcts.simulation(&fixture_grandchild2(), Player::Dark, &mut rng);
            assert!(utility == -6.0 || utility == -10.0, "unexpected utility {utility}");
        }
    }

    #[test]
    fn test_simulation_terminal(){
        let board = Board::from_rows(vec![
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 2],
            vec![0, 0, 0, 1]
        ]).unwrap();
        let mcts = mcts(1, 1.0);

        assert!(Othello.legal_moves(&board, Player::Light).is_empty());
        assert_eq!(mcts.simulation(&board, Player::Light, &mut FirstSource), 2.0);
    }

    #[test]
    fn test_backpropagation_fixture(){
        let (mut tree, nodes) = fixture_tree();
        let grandchild2 = tree.add_child(nodes.child3, fixture_grandchild2(), Player::Dark);
        let mcts = mcts(1, 1.0);

        mcts.backpropagation(&mut tree, grandchild2, -6.0);

        assert!(approx_eq(tree.get(grandchild2).value(), 6.0));
        assert_eq!(tree.get(grandchild2).visits(), 1);
        assert!(approx_eq(tree.get(nodes.child3).value(), -4.0 / 3.0));
        assert_eq!(tree.get(nodes.child3).visits(), 3);
        assert!(approx_eq(tree.get(nodes.root).value(), 2.0 / 7.0));
        assert_eq!(tree.get(nodes.root).visits(), 21);

        // siblings are untouched
        assert_eq!(tree.get(nodes.child1).visits(), 1);
        assert_eq!(tree.get(nodes.grandchild1).visits(), 2);
    }

    #[test]
    fn test_backpropagation_perspective(){
        let mut tree = Tree::new_root(Board::initial(4).unwrap(), Player::Light);
        let root = tree.root();
        let child = tree.add_child(root, Board::initial(4).unwrap(), Player::Dark);
        let mcts = mcts(1, 1.0);

        mcts.backpropagation(&mut tree, child, 8.0);

        assert_eq!(tree.get(child).value(), -8.0);
        assert_eq!(tree.get(root).value(), 4.0);
    }

    #[test]
    fn test_iterate_visit_conservation(){
        let mcts = mcts(1, 5.0);
        let mut tree = Tree::new_root(Board::initial(4).unwrap(), Player::Dark);
        let mut rng = StdRng::seed_from_u64(3);

        for rollouts in 1..=40 {
            mcts.iterate(&mut tree, &mut rng);
            assert_eq!(tree.get(tree.root()).visits(), rollouts + 1);
        }

        let child_visits: usize = tree.get(tree.root()).children().iter().map(|&c| tree.get(c).visits()).sum();
        assert_eq!(child_visits, 40);
    }

    #[test]
    fn test_search_expands_every_root_move(){
        let board = Board::initial(4).unwrap();
        let mcts = mcts(4, 5.0);
        let mut rng = StdRng::seed_from_u64(1);

        let tree = mcts.search(board, Player::Dark, &mut rng).unwrap();
        let root = tree.get(tree.root());

        assert_eq!(root.visits(), 5);
        assert_eq!(root.children().len(), 4);
        assert!(root.children().iter().all(|&c| tree.get(c).visits() == 1));
    }

    #[test]
    fn test_decide_pinned(){
        let mcts = mcts(100, 5.0);
        let mut source = SplitMixSource::new(42);

        let tree = mcts.search(Board::initial(4).unwrap(), Player::Dark, &mut source).unwrap();
        let root = tree.get(tree.root());
        let visits: Vec<usize> = root.children().iter().map(|&c| tree.get(c).visits()).collect();

        assert_eq!(root.visits(), 101);
        assert_eq!(visits, vec![25, 24, 25, 26]);
        assert_eq!(mcts.best_move(&tree).unwrap(), Move::new(0, 1));

        let mut source = SplitMixSource::new(42);
        assert_eq!(mcts.decide(Board::initial(4).unwrap(), Player::Dark, &mut source).unwrap(), Move::new(0, 1));
    }

    #[test]
    fn test_decide_pinned_light(){
        let mut source = SplitMixSource::new(42);
        let mv = decide(Othello, Board::initial(4).unwrap(), Player::Light, 100, 5.0, &mut source).unwrap();
        assert_eq!(mv, Move::new(1, 3));
    }

    #[test]
    fn test_decide_first_source(){
        let mut source = FirstSource;
        let mv = decide(Othello, Board::initial(4).unwrap(), Player::Dark, 100, 5.0, &mut source).unwrap();
        assert_eq!(mv, Move::new(1, 0));
    }

    #[test]
    fn test_decide_reproducible(){
        let mcts = mcts(60, 2.0);

        for seed in 0..5 {
            let a = mcts.decide(Board::initial(6).unwrap(), Player::Dark, &mut StdRng::seed_from_u64(seed)).unwrap();
            let b = mcts.decide(Board::initial(6).unwrap(), Player::Dark, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_decide_no_legal_moves(){
        let board = Board::from_rows(vec![
            vec![1, 1, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0]
        ]).unwrap();
        let mcts = mcts(10, 1.0);
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(mcts.decide(board, Player::Light, &mut rng), Err(MctsError::NoLegalMoves { player: Player::Light })));
    }

    #[test]
    fn test_best_move_unexplored(){
        let mcts = mcts(10, 1.0);
        let tree = Tree::new_root(Board::initial(4).unwrap(), Player::Dark);

        assert!(matches!(mcts.best_move(&tree), Err(MctsError::UnexploredRoot)));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "was never expanded")]
    fn test_best_move_missing_child_after_full_budget(){
        let board = Board::initial(4).unwrap();
        let mcts = mcts(10, 1.0);
        let mut tree = Tree::new_root(board.clone(), Player::Dark);
        let root = tree.root();
        tree.get_mut(root).visits = 11;

        let child = tree.add_child(root, Othello.apply_move(&board, Player::Dark, Move::new(0, 1)), Player::Light);
        tree.get_mut(child).visits = 10;

        let _ = mcts.best_move(&tree);
    }

    #[test]
    fn test_best_move_missing_child_small_budget(){
        let board = Board::initial(4).unwrap();
        let mcts = mcts(3, 1.0);
        let mut tree = Tree::new_root(board.clone(), Player::Dark);
        let root = tree.root();
        tree.get_mut(root).visits = 4;

        let child = tree.add_child(root, Othello.apply_move(&board, Player::Dark, Move::new(2, 3)), Player::Light);
        tree.get_mut(child).visits = 3;

        assert_eq!(mcts.best_move(&tree).unwrap(), Move::new(2, 3));
    }

    #[test]
    fn test_best_move_tie_first_in_move_order(){
        let board = Board::initial(4).unwrap();
        let mcts = mcts(10, 1.0);
        let mut tree = Tree::new_root(board.clone(), Player::Dark);

        // expand in reverse move order, all with the same visit count
        let root = tree.root();
        for mv in Othello.legal_moves(&board, Player::Dark).into_iter().rev() {
            let child = tree.add_child(root, Othello.apply_move(&board, Player::Dark, mv), Player::Light);
            tree.get_mut(child).visits = 3;
        }

        assert_eq!(mcts.best_move(&tree).unwrap(), Move::new(0, 1));
    }

    #[test]
    fn test_new_rejects_invalid_config(){
        let config = MctsConfig { rollouts: 0, exploration_coef: 1.0 };
        assert!(matches!(Mcts::new(Othello, config), Err(MctsError::InvalidConfig(_))));
        assert!(matches!(decide(Othello, Board::initial(4).unwrap(), Player::Dark, 10, -2.0, &mut FirstSource), Err(MctsError::InvalidConfig(_))));
    }
}

//! Monte Carlo Tree Search with UCT selection.
//!
//! Tree nodes are keyed by [`StateKey`], a hashable snapshot of the board seen
//! from the searching side. The tree stores, per node:
//! - the visit count `N` and the cumulative reward `Q`
//! - whether the position is terminal
//! - the children found when the node was expanded
//!
//! One rollout runs the four classic phases: select down the tree with UCT,
//! expand the leaf, value it with a random [`playout`], and backpropagate the
//! reward to the root. `Q` of a node is kept from the point of view of the
//! player who moved into it, so a parent simply picks its best child.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::board::{Board, Move, Rules};
use crate::constants::{
    ABORTED_ROLLOUT_REWARD, CELLS, EXPLORATION_WEIGHT, N, N_ROLLOUTS, ROLLOUT_BUDGET_MS,
};
use crate::piece::{Piece, Position, Side};
use crate::playout::{Deadline, Playout, playout, random_move, reward};

/// Content of one cell relative to the searching side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Own,
    OwnKing,
    Opponent,
    OpponentKing,
}

/// Hashable board snapshot used as a tree key.
///
/// Equality and hashing are structural, so the same position reached by
/// different move orders shares one node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateKey {
    cells: [Cell; CELLS],
    own_to_move: bool,
}

impl StateKey {
    /// Snapshot of `board` for `owner`, with `to_move` next to play.
    pub fn new(board: &Board, owner: Side, to_move: Side) -> Self {
        let mut cells = [Cell::Empty; CELLS];
        for side in Side::ALL {
            for piece in board.pieces(side) {
                cells[piece.position.index()] = match (side == owner, piece.king) {
                    (true, false) => Cell::Own,
                    (true, true) => Cell::OwnKing,
                    (false, false) => Cell::Opponent,
                    (false, true) => Cell::OpponentKing,
                };
            }
        }
        Self {
            cells,
            own_to_move: to_move == owner,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Side to play, given the side the snapshot was taken for.
    pub fn to_move(&self, owner: Side) -> Side {
        if self.own_to_move {
            owner
        } else {
            owner.opponent()
        }
    }

    /// Rebuild a board with no history from the snapshot.
    pub fn to_board(&self, owner: Side, rules: Rules) -> Board {
        let pieces = self.cells.iter().enumerate().filter_map(|(i, cell)| {
            let (side, king) = match cell {
                Cell::Empty => return None,
                Cell::Own => (owner, false),
                Cell::OwnKing => (owner, true),
                Cell::Opponent => (owner.opponent(), false),
                Cell::OpponentKing => (owner.opponent(), true),
            };
            Some(Piece {
                position: Position::new(i / N, i % N),
                side,
                king,
            })
        });
        Board::from_pieces(rules, pieces)
    }
}

/// A child of an expanded node and the move leading to it.
#[derive(Clone, Debug)]
pub struct Child {
    pub mv: Move,
    pub key: StateKey,
}

/// Visit statistics of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NodeStats {
    /// Number of visits (N)
    pub visits: u32,
    /// Total reward (Q), each visit contributing a value in `[0, 1]`
    pub reward: f64,
}

impl NodeStats {
    /// Average reward, or `None` before the first visit.
    pub fn mean(&self) -> Option<f64> {
        (self.visits > 0).then(|| self.reward / self.visits as f64)
    }
}

#[derive(Clone, Debug)]
struct Node {
    stats: NodeStats,
    terminal: bool,
    /// `None` until the node is expanded.
    children: Option<Vec<Child>>,
}

/// MCTS parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MctsConfig {
    /// Rollouts per move.
    pub rollouts: usize,
    /// Exploration weight `c` in the UCT formula.
    pub exploration_weight: f64,
    /// Wall-clock budget of one random playout.
    pub rollout_budget: Duration,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            rollouts: N_ROLLOUTS,
            exploration_weight: EXPLORATION_WEIGHT,
            rollout_budget: Duration::from_millis(ROLLOUT_BUDGET_MS),
        }
    }
}

/// Monte Carlo tree searcher playing for one side.
#[derive(Clone, Debug)]
pub struct Mcts {
    side: Side,
    rules: Rules,
    config: MctsConfig,
    nodes: HashMap<StateKey, Node>,
    aborted: usize,
}

impl Mcts {
    pub fn new(side: Side, rules: Rules, config: MctsConfig) -> Self {
        Self {
            side,
            rules,
            config,
            nodes: HashMap::new(),
            aborted: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Key of `board` with this searcher's side to move.
    pub fn root_key(&self, board: &Board) -> StateKey {
        StateKey::new(board, self.side, self.side)
    }

    /// Statistics of a node, if the tree has seen it.
    pub fn stats(&self, key: &StateKey) -> Option<NodeStats> {
        self.nodes.get(key).map(|n| n.stats)
    }

    /// Every node in the tree with its statistics.
    pub fn nodes(&self) -> impl Iterator<Item = (&StateKey, NodeStats)> {
        self.nodes.iter().map(|(k, n)| (k, n.stats))
    }

    /// Children recorded for `key`, if it was expanded.
    pub fn children(&self, key: &StateKey) -> Option<&[Child]> {
        self.nodes.get(key)?.children.as_deref()
    }

    /// Playouts cut short by the deadline since the last reset.
    pub fn aborted_rollouts(&self) -> usize {
        self.aborted
    }

    /// Drop the whole tree.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.aborted = 0;
    }

    /// Run the configured number of rollouts on a fresh tree and pick a move.
    pub fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.reset();
        let root = self.root_key(board);
        let start = Instant::now();
        for _ in 0..self.config.rollouts {
            self.do_rollout(&root);
        }
        let elapsed = start.elapsed();
        debug!(
            "mcts {}: {} rollouts in {:.2?} ({:.1}/s), {} aborted, {} nodes",
            self.side,
            self.config.rollouts,
            elapsed,
            self.config.rollouts as f64 / elapsed.as_secs_f64().max(1e-9),
            self.aborted,
            self.nodes.len()
        );
        self.choose(board)
    }

    /// Best move from `board`: the child with the highest average reward.
    ///
    /// Falls back to a random legal move when the root was never expanded.
    pub fn choose(&self, board: &Board) -> Option<Move> {
        let root = self.root_key(board);
        let children = match self.children(&root) {
            Some(children) if !children.is_empty() => children,
            _ => {
                warn!("mcts {}: root not expanded, choosing a random move", self.side);
                return random_move(board, self.side);
            }
        };

        let score = |child: &Child| {
            self.stats(&child.key)
                .and_then(|s| s.mean())
                .unwrap_or(f64::NEG_INFINITY)
        };
        // `max_by` keeps the last of equal elements; reversing keeps the first.
        let best = children
            .iter()
            .rev()
            .max_by(|a, b| score(a).total_cmp(&score(b)))?;
        if let Some(stats) = self.stats(&best.key) {
            debug!(
                "mcts {}: chose {} (Q={:.1} N={})",
                self.side, best.mv, stats.reward, stats.visits
            );
        }
        Some(best.mv.clone())
    }

    /// One select / expand / simulate / backpropagate iteration from `root`.
    pub fn do_rollout(&mut self, root: &StateKey) {
        self.ensure(root);
        let path = self.select(root);
        let Some(leaf) = path.last().cloned() else {
            return;
        };
        self.expand(&leaf);
        let reward = self.simulate(&leaf);
        self.backpropagate(&path, reward);
    }

    /// Walk down from `root` to a node that is unexpanded, terminal, or has a
    /// child that was never expanded.
    fn select(&self, root: &StateKey) -> Vec<StateKey> {
        let mut path = Vec::new();
        let mut key = root.clone();
        loop {
            path.push(key.clone());
            let children = match self.children(&key) {
                Some(children) if !children.is_empty() => children,
                _ => return path,
            };
            if let Some(fresh) = children.iter().find(|c| self.children(&c.key).is_none()) {
                path.push(fresh.key.clone());
                return path;
            }
            let next = self.uct_select(&key, children);
            // Repeated positions would otherwise loop forever.
            if path.contains(&next) {
                return path;
            }
            key = next;
        }
    }

    /// Child maximizing `Q/N + c * sqrt(ln(N_parent) / N)`. Unvisited children
    /// come first.
    fn uct_select(&self, parent: &StateKey, children: &[Child]) -> StateKey {
        let parent_visits = self.stats(parent).map_or(0, |s| s.visits).max(1);
        let log_n = (parent_visits as f64).ln();
        let c = self.config.exploration_weight;
        let uct = |child: &Child| match self.stats(&child.key) {
            Some(s) if s.visits > 0 => {
                let n = s.visits as f64;
                s.reward / n + c * (log_n / n).sqrt()
            }
            _ => f64::INFINITY,
        };
        children
            .iter()
            .rev()
            .max_by(|a, b| uct(a).total_cmp(&uct(b)))
            .map_or_else(|| parent.clone(), |child| child.key.clone())
    }

    /// Record the children of `key` and, one ply further, their replies.
    fn expand(&mut self, key: &StateKey) {
        if self.children(key).is_some() {
            return;
        }
        let children = self.find_children(key);
        for child in &children {
            if self.children(&child.key).is_none() {
                let replies = self.find_children(&child.key);
                for reply in &replies {
                    self.ensure(&reply.key);
                }
                self.ensure(&child.key).children = Some(replies);
            }
        }
        self.ensure(key).children = Some(children);
    }

    /// Positions one ply away from `key`. Terminal positions have none.
    fn find_children(&self, key: &StateKey) -> Vec<Child> {
        let board = key.to_board(self.side, self.rules);
        if board.winner().is_over() {
            return Vec::new();
        }
        let to_move = key.to_move(self.side);
        let mut children: Vec<Child> = Vec::new();
        for mv in board.legal_moves(to_move) {
            let mut next = board.clone();
            next.apply(&mv);
            let child = StateKey::new(&next, self.side, to_move.opponent());
            if !children.iter().any(|c| c.key == child) {
                children.push(Child { mv, key: child });
            }
        }
        children
    }

    /// Random playout from `leaf`.
    ///
    /// The reward is seen by the side to move at a live leaf, or by the side
    /// that moved into a terminal one; backpropagation flips it accordingly.
    fn simulate(&mut self, leaf: &StateKey) -> f64 {
        let terminal = self.nodes.get(leaf).is_some_and(|n| n.terminal);
        let to_move = leaf.to_move(self.side);
        let perspective = if terminal { to_move.opponent() } else { to_move };

        let mut board = leaf.to_board(self.side, self.rules);
        let deadline = Deadline::after(self.config.rollout_budget);
        match playout(&mut board, to_move, &deadline) {
            Playout::Finished(outcome) => reward(outcome, perspective),
            Playout::Aborted => {
                self.aborted += 1;
                debug!(
                    "mcts {}: playout aborted after {} moves",
                    self.side,
                    board.history().len()
                );
                ABORTED_ROLLOUT_REWARD
            }
        }
    }

    /// Add one visit and the reward to every node on `path`, flipping the
    /// reward's point of view at each non-terminal node.
    fn backpropagate(&mut self, path: &[StateKey], mut reward: f64) {
        for key in path.iter().rev() {
            let node = self.ensure(key);
            node.stats.visits += 1;
            if !node.terminal {
                reward = 1.0 - reward;
            }
            node.stats.reward += reward;
        }
    }

    fn ensure(&mut self, key: &StateKey) -> &mut Node {
        let (side, rules) = (self.side, self.rules);
        self.nodes.entry(key.clone()).or_insert_with(|| Node {
            stats: NodeStats::default(),
            terminal: key.to_board(side, rules).winner().is_over(),
            children: None,
        })
    }
}

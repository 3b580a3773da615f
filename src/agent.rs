//! Move-choosing policies behind one trait.
//!
//! Every way of playing a side, from random play to tree search to a person
//! at the keyboard, is an [`Agent`]: given the current board, produce one of
//! its legal moves.

use std::io::{BufRead, Write};

use crate::alphabeta::AlphaBeta;
use crate::board::{Board, Move, Rules};
use crate::mcts::{Mcts, MctsConfig};
use crate::piece::Side;
use crate::playout::random_move;

/// A policy choosing moves for one side.
pub trait Agent {
    /// The side this agent plays.
    fn side(&self) -> Side;

    /// A legal move for [`Agent::side`] on `board`, or `None` if there is none.
    fn select_move(&mut self, board: &Board) -> Option<Move>;

    /// Short label for logs and tallies.
    fn name(&self) -> &'static str;
}

/// Plays a uniformly random legal move.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    side: Side,
}

impl RandomAgent {
    pub fn new(side: Side) -> Self {
        Self { side }
    }
}

impl Agent for RandomAgent {
    fn side(&self) -> Side {
        self.side
    }

    fn select_move(&mut self, board: &Board) -> Option<Move> {
        random_move(board, self.side)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Minimax with alpha-beta pruning.
#[derive(Clone, Debug)]
pub struct AlphaBetaAgent {
    search: AlphaBeta,
}

impl AlphaBetaAgent {
    pub fn new(side: Side, depth: u32) -> Self {
        Self {
            search: AlphaBeta::with_depth(side, depth),
        }
    }

    pub fn from_search(search: AlphaBeta) -> Self {
        Self { search }
    }
}

impl Agent for AlphaBetaAgent {
    fn side(&self) -> Side {
        self.search.side
    }

    fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.search.select_move(board)
    }

    fn name(&self) -> &'static str {
        "alphabeta"
    }
}

/// Monte Carlo tree search, with a fresh tree for every move.
#[derive(Clone, Debug)]
pub struct MctsAgent {
    tree: Mcts,
}

impl MctsAgent {
    pub fn new(side: Side, rules: Rules, config: MctsConfig) -> Self {
        Self {
            tree: Mcts::new(side, rules, config),
        }
    }
}

impl Agent for MctsAgent {
    fn side(&self) -> Side {
        self.tree.side()
    }

    fn select_move(&mut self, board: &Board) -> Option<Move> {
        self.tree.select_move(board)
    }

    fn name(&self) -> &'static str {
        "mcts"
    }
}

/// Lists the legal moves and reads the chosen index from `input`.
pub struct HumanAgent<R, W> {
    side: Side,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanAgent<R, W> {
    pub fn new(side: Side, input: R, output: W) -> Self {
        Self {
            side,
            input,
            output,
        }
    }

    fn prompt(&mut self, moves: &[Move]) -> std::io::Result<Option<usize>> {
        for (i, mv) in moves.iter().enumerate() {
            writeln!(self.output, "{i} : {} to {}", mv.from, mv.to)?;
        }
        loop {
            write!(self.output, "Pick move: ")?;
            self.output.flush()?;
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            match line.trim().parse::<usize>() {
                Ok(i) if i < moves.len() => return Ok(Some(i)),
                _ => writeln!(self.output, "Enter a number from 0 to {}", moves.len() - 1)?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Agent for HumanAgent<R, W> {
    fn side(&self) -> Side {
        self.side
    }

    /// `None` when there is no legal move or the input is closed.
    fn select_move(&mut self, board: &Board) -> Option<Move> {
        let mut moves = board.legal_moves(self.side);
        if moves.is_empty() {
            return None;
        }
        match self.prompt(&moves) {
            Ok(Some(i)) => Some(moves.swap_remove(i)),
            Ok(None) => None,
            Err(err) => {
                log::error!("reading move for {}: {err}", self.side);
                None
            }
        }
    }

    fn name(&self) -> &'static str {
        "human"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_agent_retries_bad_input() {
        let board = Board::new();
        let input = b"seven\n99\n1\n".as_slice();
        let mut output = Vec::new();
        let mut agent = HumanAgent::new(Side::White, input, &mut output);
        let mv = agent.select_move(&board).unwrap();
        assert_eq!(mv, board.legal_moves(Side::White)[1]);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("0 : "));
        assert_eq!(text.matches("Pick move: ").count(), 3);
    }

    #[test]
    fn test_human_agent_closed_input() {
        let board = Board::new();
        let mut agent = HumanAgent::new(Side::Black, b"".as_slice(), std::io::sink());
        assert!(agent.select_move(&board).is_none());
    }

    #[test]
    fn test_agents_are_interchangeable() {
        let board = Board::new();
        let config = MctsConfig {
            rollouts: 10,
            ..MctsConfig::default()
        };
        let mut agents: Vec<Box<dyn Agent>> = vec![
            Box::new(RandomAgent::new(Side::White)),
            Box::new(AlphaBetaAgent::new(Side::White, 2)),
            Box::new(MctsAgent::new(Side::White, Rules::default(), config)),
        ];
        let legal = board.legal_moves(Side::White);
        for agent in &mut agents {
            assert_eq!(agent.side(), Side::White);
            let mv = agent.select_move(&board).unwrap();
            assert!(legal.contains(&mv), "{} chose {mv}", agent.name());
        }
    }
}

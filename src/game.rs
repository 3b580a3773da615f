//! Game driver: runs agents against each other on one authoritative board.

use std::fmt;

use log::{info, warn};

use crate::agent::Agent;
use crate::board::{Board, Move, Outcome, Rules};
use crate::piece::Side;

/// Everything left over from a finished game.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub outcome: Outcome,
    /// Side that made the first move.
    pub first: Side,
    pub board: Board,
}

impl GameRecord {
    /// Moves in the order they were played.
    pub fn moves(&self) -> &[Move] {
        self.board.history()
    }

    pub fn plies(&self) -> usize {
        self.board.history().len()
    }
}

/// Play one game from the starting layout of `rules`.
///
/// `observer` sees the board after every move together with that move. A
/// side whose agent gives up while it still has legal moves, or answers with
/// a move outside its legal moves, loses.
pub fn play_game(
    white: &mut dyn Agent,
    black: &mut dyn Agent,
    first: Side,
    rules: Rules,
    mut observer: impl FnMut(&Board, &Move),
) -> GameRecord {
    let mut board = Board::with_rules(rules);
    let mut to_move = first;

    let outcome = loop {
        let outcome = board.winner();
        if outcome.is_over() {
            break outcome;
        }

        let agent: &mut dyn Agent = match to_move {
            Side::White => &mut *white,
            Side::Black => &mut *black,
        };
        let Some(mv) = agent.select_move(&board) else {
            warn!("{} ({}) resigned", to_move, agent.name());
            break Outcome::Win(to_move.opponent());
        };
        if !board.legal_moves(to_move).contains(&mv) {
            warn!("{} ({}) played illegal move {mv}", to_move, agent.name());
            break Outcome::Win(to_move.opponent());
        }
        board.apply(&mv);
        observer(&board, &mv);
        to_move = to_move.opponent();
    };

    info!(
        "game over after {} plies: {}",
        board.history().len(),
        describe(outcome)
    );
    GameRecord {
        outcome,
        first,
        board,
    }
}

fn describe(outcome: Outcome) -> String {
    match outcome {
        Outcome::Win(side) => format!("{side} wins"),
        Outcome::Draw => "draw".to_string(),
        Outcome::Ongoing => "unfinished".to_string(),
    }
}

/// Running tally over a series of games.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Series {
    pub white_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
}

impl Series {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Side::White) => self.white_wins += 1,
            Outcome::Win(Side::Black) => self.black_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::Ongoing => {}
        }
    }

    pub fn games(&self) -> u32 {
        self.white_wins + self.black_wins + self.draws
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "white wins: {}, black wins: {}, draws: {}",
            self.white_wins, self.black_wins, self.draws
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AlphaBetaAgent, RandomAgent};
    use crate::constants::N;
    use crate::piece::Position;

    /// Black agent that always answers with the same move.
    struct Cheater(Move);

    impl Agent for Cheater {
        fn side(&self) -> Side {
            Side::Black
        }

        fn select_move(&mut self, _board: &Board) -> Option<Move> {
            Some(self.0.clone())
        }

        fn name(&self) -> &'static str {
            "cheater"
        }
    }

    fn forfeit_by(mv: Move) -> GameRecord {
        let mut white = AlphaBetaAgent::new(Side::White, 1);
        let mut black = Cheater(mv);
        play_game(&mut white, &mut black, Side::Black, Rules::default(), |_, _| {})
    }

    #[test]
    fn test_random_game_finishes() {
        let mut white = RandomAgent::new(Side::White);
        let mut black = RandomAgent::new(Side::Black);
        let mut seen = 0;
        let record = play_game(&mut white, &mut black, Side::White, Rules::default(), |_, _| {
            seen += 1;
        });
        assert!(record.outcome.is_over());
        assert_eq!(record.outcome, record.board.winner());
        assert_eq!(seen, record.plies());
    }

    #[test]
    fn test_first_mover_is_respected() {
        let mut white = RandomAgent::new(Side::White);
        let mut black = RandomAgent::new(Side::Black);
        let mut movers = Vec::new();
        play_game(&mut white, &mut black, Side::Black, Rules::default(), |board, mv| {
            movers.push(board.piece_at(mv.to).map(|p| p.side));
        });
        assert_eq!(movers[0], Some(Side::Black));
        assert!(movers.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn test_bad_move_forfeits() {
        let record = forfeit_by(Move::step(Position::new(4, 1), Position::new(5, 0)));
        assert_eq!(record.outcome, Outcome::Win(Side::White));
        assert_eq!(record.plies(), 0);
    }

    #[test]
    fn test_moves_that_fit_the_board_but_break_the_rules_forfeit() {
        let white_man = Position::new(N - 3, 0);
        let black_man = Position::new(2, 1);
        let bad = [
            // Opponent's piece, two rows at once.
            Move::step(white_man, Position::new(N - 5, 2)),
            // Own piece, two rows at once.
            Move::step(black_man, Position::new(4, 3)),
            // Own piece, not moving at all.
            Move::step(black_man, black_man),
        ];
        for mv in bad {
            assert!(Board::new().piece_at(mv.from).is_some(), "{mv}");
            let record = forfeit_by(mv.clone());
            assert_eq!(record.outcome, Outcome::Win(Side::White), "{mv}");
            assert_eq!(record.plies(), 0, "{mv}");
            assert_eq!(record.board.to_string(), Board::new().to_string(), "{mv}");
        }
    }

    #[test]
    fn test_series_tally() {
        let mut series = Series::default();
        series.record(Outcome::Win(Side::White));
        series.record(Outcome::Draw);
        series.record(Outcome::Win(Side::White));
        assert_eq!(series.white_wins, 2);
        assert_eq!(series.draws, 1);
        assert_eq!(series.games(), 3);
        assert_eq!(series.to_string(), "white wins: 2, black wins: 0, draws: 1");
    }
}

use std::io::{self, BufRead, Write};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Color, GameError, Move, PAWNS_PER_SIDE, Player};
use crate::turn::TurnCycle;

/// How a finished game ended. [`GameController::run`] yields `None` instead
/// when a player left with `exit` (or the input ended).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Win(Color),
    Stalemate,
}

enum RoundStatus {
    Moved,
    Exit,
}

/// Drives a full game: turn order, prompting, move resolution and
/// termination. Generic over the line source and sink so whole games can be
/// scripted in tests.
#[derive(Debug)]
pub struct GameController {
    board: Board,
    /// Both players, indexed by `Color as usize`.
    players: [Player; 2],
    turn: TurnCycle,
}

impl GameController {
    pub fn new(first_name: impl Into<String>, second_name: impl Into<String>) -> Self {
        let mut board = Board::new();
        let mut white = Player::new(first_name, Color::White);
        let mut black = Player::new(second_name, Color::Black);
        board.place_initial_pawns(&mut white);
        board.place_initial_pawns(&mut black);
        GameController {
            board,
            players: [white, black],
            turn: TurnCycle::new(),
        }
    }

    /// Collect both player names and set up the starting position.
    pub fn setup<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Self> {
        writeln!(output, "First Player's name:")?;
        let first = read_player_line(input)?.ok_or_else(names_cut_short)?;
        writeln!(output, "Second Player's name:")?;
        let second = read_player_line(input)?.ok_or_else(names_cut_short)?;
        Ok(Self::new(first, second))
    }

    /// Play rounds until the game ends. Returns the result, or `None` after
    /// an exit request, with all reporting already written to `output`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<Option<GameResult>> {
        loop {
            write!(output, "{}", self.board.render_state())?;
            let current = self.turn.current();
            self.board
                .clear_expired_capture_link(&self.players[current as usize]);

            if let RoundStatus::Exit = self.play_round(input, output)? {
                writeln!(output, "Bye!")?;
                return Ok(None);
            }
            self.turn.advance();

            if let Some(result) = self.finished_result() {
                write!(output, "{}", self.board.render_state())?;
                match result {
                    GameResult::Win(color) => writeln!(output, "{} Wins!", color.name())?,
                    GameResult::Stalemate => writeln!(output, "Stalemate!")?,
                }
                writeln!(output, "Bye!")?;
                return Ok(Some(result));
            }
        }
    }

    /// Prompt the current player until a move resolves or they leave.
    /// Rejected entries re-prompt the same player; the turn is not consumed.
    fn play_round<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> io::Result<RoundStatus> {
        let color = self.turn.current();
        loop {
            writeln!(output, "{}'s turn:", self.players[color as usize].name())?;
            let Some(line) = read_player_line(input)? else {
                return Ok(RoundStatus::Exit);
            };
            if line == "exit" {
                return Ok(RoundStatus::Exit);
            }
            let entry: Move = match line.parse() {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("rejected entry '{line}': {err}");
                    writeln!(output, "Invalid Input")?;
                    continue;
                }
            };
            let player = &mut self.players[color as usize];
            match self.board.resolve_move(player, entry.from, entry.to) {
                Ok(kind) => {
                    debug!("{} plays {entry} ({kind:?})", color.name());
                    return Ok(RoundStatus::Moved);
                }
                Err(GameError::IllegalPiece(at)) => {
                    writeln!(output, "No {} pawn at {at}", color.capitalized_name())?;
                }
                Err(err) => {
                    debug!("rejected move {entry}: {err}");
                    writeln!(output, "Invalid Input")?;
                }
            }
        }
    }

    /// Termination check, run right after the turn has advanced: first the
    /// player who just moved for a win, then the upcoming player for
    /// stalemate.
    fn finished_result(&self) -> Option<GameResult> {
        let last = self.turn.previous();
        let mover = &self.players[last as usize];
        if mover.captured_count() as usize == PAWNS_PER_SIDE
            || self.board.has_pawn_on_far_row(mover)
        {
            return Some(GameResult::Win(last));
        }
        let upcoming = &self.players[self.turn.current() as usize];
        if !self.board.player_has_legal_move(upcoming) {
            return Some(GameResult::Stalemate);
        }
        None
    }
}

/// One line of player input with the trailing newline removed, or `None`
/// once the input is exhausted.
fn read_player_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

fn names_cut_short() -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "input ended before both player names were read",
    )
}

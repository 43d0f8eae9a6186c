use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use thiserror::Error;

/// Board size constants
pub const BOARD_SIZE: usize = 8;
pub const PAWNS_PER_SIDE: usize = 8;

/// Full-line pattern a move entry must match: two coordinates, no separator.
static MOVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^([a-h][1-8]){2}$").expect("valid pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    White, // moves first, advances toward rank 8
    Black, // advances toward rank 1
}

impl Color {
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }

    pub fn capitalized_name(&self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }

    /// Board symbol used by [`Board::render_state`].
    pub fn symbol(&self) -> char {
        match self {
            Color::White => 'W',
            Color::Black => 'B',
        }
    }

    /// Row the side's pawns start on.
    pub fn home_row(&self) -> usize {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    /// Row farthest from the side's start; reaching it wins the game.
    pub fn far_row(&self) -> usize {
        match self {
            Color::White => BOARD_SIZE - 1,
            Color::Black => 0,
        }
    }

    /// Signed row direction of a forward move for this side.
    pub fn forward(&self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

/// A board coordinate by value. Row 0 is rank 1, column 0 is file 'a'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub row: usize,
    pub col: usize,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Self {
        Square { row, col }
    }

    /// Square `rows`/`cols` away, or `None` when that leaves the board.
    pub fn offset(&self, rows: i32, cols: i32) -> Option<Square> {
        let row = self.row as i32 + rows;
        let col = self.col as i32 + cols;
        if (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col) {
            Some(Square::new(row as usize, col as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.col as u8) as char, self.row + 1)
    }
}

impl FromStr for Square {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Square {
                row: (rank - b'1') as usize,
                col: (file - b'a') as usize,
            }),
            _ => Err(GameError::IllegalPosition(s.to_string())),
        }
    }
}

/// A source/destination pair as entered by a player, e.g. `e2e4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !MOVE_PATTERN.is_match(s) {
            return Err(GameError::IllegalPosition(s.to_string()));
        }
        Ok(Move {
            from: s[0..2].parse()?,
            to: s[2..4].parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Advance one square ahead.
    Single,
    /// Advance two squares from the starting row, opening a capture link.
    Double,
    /// Move one square diagonally forward onto an opposing pawn, or onto the
    /// passed square of the stored capture link.
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no movable pawn at {0}")]
    IllegalPiece(Square),
    #[error("move violates the pawn movement rules")]
    IllegalMove,
    #[error("not a board coordinate: {0}")]
    IllegalPosition(String),
}

/// Stable index of a pawn record in the board's arena. A player's pawn list
/// and a cell's occupant both refer to the same record through this index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pawn {
    pub color: Color,
    pub has_moved: bool,
    pub captured: bool,
}

impl Pawn {
    fn new(color: Color) -> Self {
        Pawn {
            color,
            has_moved: false,
            captured: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    color: Color,
    pawns: Vec<PawnId>,
    captured_count: u8,
}

impl Player {
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Player {
            name: name.into(),
            color,
            pawns: Vec::with_capacity(PAWNS_PER_SIDE),
            captured_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Ids of this player's pawns, one per file in column order.
    pub fn pawns(&self) -> &[PawnId] {
        &self.pawns
    }

    /// How many opposing pawns this player has captured.
    pub fn captured_count(&self) -> u8 {
        self.captured_count
    }

    fn add_capture(&mut self) {
        self.captured_count += 1;
    }
}

/// The square jumped over by the most recent double advance and the square
/// the advancing pawn landed on. Both held by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureLink {
    pub passed: Square,
    pub landing: Square,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<PawnId>; BOARD_SIZE]; BOARD_SIZE],
    pawns: Vec<Pawn>,
    capture_link: Option<CaptureLink>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
            pawns: Vec::new(),
            capture_link: None,
        }
    }

    pub fn occupant(&self, square: Square) -> Option<PawnId> {
        self.cells[square.row][square.col]
    }

    pub fn pawn(&self, id: PawnId) -> &Pawn {
        &self.pawns[id.0]
    }

    pub fn capture_link(&self) -> Option<CaptureLink> {
        self.capture_link
    }

    /// Fill the player's home row with its 8 pawns, one per column.
    pub fn place_initial_pawns(&mut self, player: &mut Player) {
        let row = player.color().home_row();
        for col in 0..BOARD_SIZE {
            let id = PawnId(self.pawns.len());
            self.pawns.push(Pawn::new(player.color()));
            self.cells[row][col] = Some(id);
            player.pawns.push(id);
        }
    }

    /// Validate and execute a move for `player`. On success the board and the
    /// player are updated and the move's category is returned; on failure
    /// nothing is mutated.
    pub fn resolve_move(
        &mut self,
        player: &mut Player,
        from: Square,
        to: Square,
    ) -> Result<MoveKind, GameError> {
        let (id, kind) = self.check_move(player, from, to)?;
        match kind {
            MoveKind::Double => {
                let link = CaptureLink {
                    passed: Square::new((from.row + to.row) / 2, from.col),
                    landing: to,
                };
                debug!(
                    "capture link recorded: passed {} landing {}",
                    link.passed, link.landing
                );
                self.capture_link = Some(link);
            }
            MoveKind::Capture => self.capture_at(player, to)?,
            MoveKind::Single => {}
        }
        self.move_pawn(id, from, to);
        Ok(kind)
    }

    fn check_move(
        &self,
        player: &Player,
        from: Square,
        to: Square,
    ) -> Result<(PawnId, MoveKind), GameError> {
        let id = match self.occupant(from) {
            Some(id) if self.pawns[id.0].color == player.color() => id,
            _ => return Err(GameError::IllegalPiece(from)),
        };
        let kind = move_kind(player.color(), from, to)?;
        if kind != MoveKind::Capture && self.occupant(to).is_some() {
            return Err(GameError::IllegalMove);
        }
        if kind == MoveKind::Double {
            if self.pawns[id.0].has_moved {
                return Err(GameError::IllegalMove);
            }
            let intermediate = Square::new((from.row + to.row) / 2, from.col);
            if self.occupant(intermediate).is_some() {
                return Err(GameError::IllegalMove);
            }
        }
        if kind == MoveKind::Capture
            && self.occupant(to).is_none()
            && self.capture_link.is_none_or(|link| link.passed != to)
        {
            return Err(GameError::IllegalMove);
        }
        Ok((id, kind))
    }

    /// Capture at `target`: either its occupant, or when `target` is the
    /// stored link's passed square, the pawn that landed past it.
    fn capture_at(&mut self, player: &mut Player, target: Square) -> Result<(), GameError> {
        let victim_square = match self.occupant(target) {
            Some(_) => target,
            None => match self.capture_link {
                Some(link) if link.passed == target => link.landing,
                _ => return Err(GameError::IllegalMove),
            },
        };
        let Some(victim) = self.occupant(victim_square) else {
            return Err(GameError::IllegalMove);
        };
        if self.pawns[victim.0].color == player.color() {
            return Err(GameError::IllegalMove);
        }
        self.pawns[victim.0].captured = true;
        self.cells[victim_square.row][victim_square.col] = None;
        player.add_capture();
        Ok(())
    }

    fn move_pawn(&mut self, id: PawnId, from: Square, to: Square) {
        debug_assert!(self.occupant(to).is_none());
        self.pawns[id.0].has_moved = true;
        self.cells[from.row][from.col] = None;
        self.cells[to.row][to.col] = Some(id);
    }

    /// Drop the stored capture link once the window for using it has closed:
    /// its landing square is empty, or holds a pawn of `player`'s own color
    /// because the turn has come back around to the side that opened it.
    pub fn clear_expired_capture_link(&mut self, player: &Player) {
        if let Some(link) = self.capture_link {
            let expired = match self.occupant(link.landing) {
                None => true,
                Some(id) => self.pawns[id.0].color == player.color(),
            };
            if expired {
                debug!(
                    "capture link expired: passed {} landing {}",
                    link.passed, link.landing
                );
                self.capture_link = None;
            }
        }
    }

    pub fn has_pawn_on_far_row(&self, player: &Player) -> bool {
        let row = player.color().far_row();
        (0..BOARD_SIZE).any(|col| {
            self.cells[row][col].is_some_and(|id| self.pawns[id.0].color == player.color())
        })
    }

    pub fn player_has_legal_move(&self, player: &Player) -> bool {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let Some(id) = self.cells[row][col] else {
                    continue;
                };
                if self.pawns[id.0].color != player.color() {
                    continue;
                }
                if self.pawn_has_move(Square::new(row, col), player.color()) {
                    return true;
                }
            }
        }
        false
    }

    // An empty square ahead is already sufficient evidence of a move: a legal
    // double advance requires that square to be open as well.
    fn pawn_has_move(&self, at: Square, color: Color) -> bool {
        let Some(ahead) = at.offset(color.forward(), 0) else {
            return false;
        };
        if self.occupant(ahead).is_none() {
            return true;
        }
        for side in [-1, 1] {
            let Some(diagonal) = at.offset(color.forward(), side) else {
                continue;
            };
            if self.capture_link.is_some_and(|link| link.passed == diagonal) {
                return true;
            }
            if self
                .occupant(diagonal)
                .is_some_and(|id| self.pawns[id.0].color != color)
            {
                return true;
            }
        }
        false
    }

    /// Fixed-width ASCII rendering: rank labels on the left, column headers
    /// below, ranks printed from 8 down to 1.
    pub fn render_state(&self) -> String {
        let mut out = String::new();
        push_border(&mut out);
        for rank in (1..=BOARD_SIZE).rev() {
            let row = rank - 1;
            out.push_str(&format!("{rank} "));
            for col in 0..BOARD_SIZE {
                let symbol = match self.cells[row][col] {
                    Some(id) => self.pawns[id.0].color.symbol(),
                    None => ' ',
                };
                out.push_str(&format!("| {symbol} "));
            }
            out.push_str("|\n");
            push_border(&mut out);
        }
        out.push_str("  ");
        for file in 'a'..='h' {
            out.push_str(&format!("  {file} "));
        }
        out.push_str(" \n");
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn push_border(out: &mut String) {
    out.push_str("  ");
    for _ in 0..BOARD_SIZE {
        out.push_str("+---");
    }
    out.push_str("+\n");
}

/// Classify the geometry of a move by its signed forward row difference.
fn move_kind(color: Color, from: Square, to: Square) -> Result<MoveKind, GameError> {
    let row_diff = (to.row as i32 - from.row as i32) * color.forward();
    if from.col == to.col {
        match row_diff {
            1 => Ok(MoveKind::Single),
            2 => Ok(MoveKind::Double),
            _ => Err(GameError::IllegalMove),
        }
    } else if from.col.abs_diff(to.col) == 1 {
        if row_diff == 1 {
            Ok(MoveKind::Capture)
        } else {
            Err(GameError::IllegalMove)
        }
    } else {
        Err(GameError::IllegalMove)
    }
}

#[cfg(test)]
impl Board {
    /// Test helper: empty every cell and drop the link; arena records stay.
    pub(crate) fn clear(&mut self) {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                self.cells[row][col] = None;
            }
        }
        self.capture_link = None;
    }

    /// Test helper: add one fresh pawn for `player` at `at`.
    pub(crate) fn place_single_pawn(&mut self, player: &mut Player, at: Square) -> PawnId {
        let id = PawnId(self.pawns.len());
        self.pawns.push(Pawn::new(player.color()));
        self.cells[at.row][at.col] = Some(id);
        player.pawns.push(id);
        id
    }
}

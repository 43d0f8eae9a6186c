use serde::{Deserialize, Serialize};

use crate::game::Color;

/// Two-state rotation over the move order. White always opens; `advance`
/// flips to the other side and there is no way to skip or repeat a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCycle {
    current: Color,
}

impl TurnCycle {
    pub fn new() -> Self {
        TurnCycle {
            current: Color::White,
        }
    }

    /// Side to move now.
    pub fn current(&self) -> Color {
        self.current
    }

    /// Side that moves after the current one, without advancing.
    pub fn peek_next(&self) -> Color {
        self.current.opponent()
    }

    /// Switch to the other side and return it.
    pub fn advance(&mut self) -> Color {
        self.current = self.current.opponent();
        self.current
    }

    /// Side that held the last completed turn. With only two slots in the
    /// rotation this is the same side `peek_next` names.
    pub fn previous(&self) -> Color {
        self.current.opponent()
    }
}

impl Default for TurnCycle {
    fn default() -> Self {
        Self::new()
    }
}

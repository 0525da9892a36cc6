use crate::board::Board;

use std::fmt;

/// A single jump: the peg at `from` leaps over the peg at `jumped` and
/// lands on `to`. All three are cell indices (`y * width + x`); the move
/// is always axis-aligned with `jumped` the arithmetic midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: u8,
    pub jumped: u8,
    pub to: u8,
}

impl Move {
    pub fn new(from: usize, jumped: usize, to: usize) -> Self {
        Move {
            from: from as u8,
            jumped: jumped as u8,
            to: to as u8,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} (over {})", self.from, self.to, self.jumped)
    }
}

/// Renders a move list as one `x1,y1 -> x2,y2` pair per line, with
/// coordinates resolved against the board the moves were played on.
pub fn format_moves(moves: &[Move], board: &Board) -> String {
    moves
        .iter()
        .map(|mov| {
            let (x1, y1) = board.coords(mov.from as usize);
            let (x2, y2) = board.coords(mov.to as usize);
            format!("{x1},{y1} -> {x2},{y2}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_moves() {
        let board = Board::rectangle(4, 4).unwrap();
        let moves = [Move::new(5, 6, 7), Move::new(15, 11, 7)];
        assert_eq!(format_moves(&moves, &board), "1,1 -> 3,1\n3,3 -> 3,1");
    }

    #[test]
    fn test_display() {
        assert_eq!(Move::new(2, 3, 4).to_string(), "2 -> 4 (over 3)");
    }
}

use crate::board::{Board, BoardError};
use crate::moves::Move;

use smallvec::SmallVec;
use std::cell::OnceCell;

/// Move histories stay inline for every board that fits in 64 cells
/// minus the usual hole count.
pub type MoveList = SmallVec<[Move; 32]>;

/// Jump directions in generation order: down, up, right, left. The
/// order is part of the engine's contract because it decides which of
/// two equally scored positions survives a beam cut.
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// One arrangement of pegs on a board, together with the moves that
/// produced it from the search root. Positions are immutable snapshots:
/// every move creates a fresh child, and the canonical id / heuristic
/// score are memoized on first use.
#[derive(Debug, Clone)]
pub struct Position<'a> {
    board: &'a Board,
    occupied: u64,
    moves: MoveList,
    canonical_id: OnceCell<u64>,
    score: OnceCell<u32>,
}

impl<'a> Position<'a> {
    /// The opening position: every playable hole holds a peg except `(x, y)`.
    pub fn initial(board: &'a Board, x: usize, y: usize) -> Result<Self, BoardError> {
        if x >= board.width() || y >= board.height() || !board.is_playable(board.index(x, y)) {
            return Err(BoardError::OutOfBounds { x, y });
        }
        let occupied = board.playable() & !(1 << board.index(x, y));
        Ok(Self::with_occupancy(board, occupied, MoveList::new()))
    }

    fn with_occupancy(board: &'a Board, occupied: u64, moves: MoveList) -> Self {
        debug_assert_eq!(occupied & !board.playable(), 0);
        Position {
            board,
            occupied,
            moves,
            canonical_id: OnceCell::new(),
            score: OnceCell::new(),
        }
    }

    pub fn board(&self) -> &'a Board {
        self.board
    }

    /// The occupancy bitmask, bit `i` set iff cell `i` holds a peg.
    pub fn occupied(&self) -> u64 {
        self.occupied
    }

    /// The path from the search root to this position.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn peg_count(&self) -> u32 {
        self.occupied.count_ones()
    }

    /// The classic goal test: exactly one peg remains.
    pub fn is_final(&self) -> bool {
        self.peg_count() == 1
    }

    fn is_occupied(&self, index: usize) -> bool {
        self.occupied >> index & 1 != 0
    }

    /// Every position reachable in one jump, in a fixed order: occupied
    /// cells by ascending index, directions down, up, right, left. Each
    /// child has exactly one peg fewer than this position.
    pub fn children(&self) -> Vec<Position<'a>> {
        let mut children = Vec::new();
        let width = self.board.width() as i32;
        let height = self.board.height() as i32;

        for index in 0..self.board.cell_count() {
            if !self.is_occupied(index) {
                continue;
            }
            let (x, y) = self.board.coords(index);
            let (x, y) = (x as i32, y as i32);
            for (dx, dy) in DIRECTIONS {
                let (tx, ty) = (x + 2 * dx, y + 2 * dy);
                if tx < 0 || ty < 0 || tx >= width || ty >= height {
                    continue;
                }
                // The jumped cell is the midpoint, so it is in bounds
                // whenever the landing cell is.
                let jumped = self.board.index((x + dx) as usize, (y + dy) as usize);
                let to = self.board.index(tx as usize, ty as usize);
                if self.board.is_playable(jumped)
                    && self.is_occupied(jumped)
                    && self.board.is_playable(to)
                    && !self.is_occupied(to)
                {
                    children.push(self.child(index, jumped, to));
                }
            }
        }
        children
    }

    fn child(&self, from: usize, jumped: usize, to: usize) -> Position<'a> {
        let occupied = self.occupied & !(1 << from) & !(1 << jumped) | 1 << to;
        let mut moves = self.moves.clone();
        moves.push(Move::new(from, jumped, to));
        Self::with_occupancy(self.board, occupied, moves)
    }

    /// Replays a single move, validating it in full. Meant for solution
    /// replay and rendering; the search itself only goes through
    /// [`children`](Self::children).
    pub fn make_move(&self, mov: Move) -> Result<Position<'a>, BoardError> {
        let (from, jumped, to) = (mov.from as usize, mov.jumped as usize, mov.to as usize);
        if from >= self.board.cell_count() || to >= self.board.cell_count() {
            return Err(BoardError::IllegalMove(mov));
        }
        let (fx, fy) = self.board.coords(from);
        let (tx, ty) = self.board.coords(to);
        let dx = tx as i32 - fx as i32;
        let dy = ty as i32 - fy as i32;
        if !((dx == 0 && dy.abs() == 2) || (dy == 0 && dx.abs() == 2)) {
            return Err(BoardError::IllegalMove(mov));
        }
        let midpoint = self
            .board
            .index((fx as i32 + dx / 2) as usize, (fy as i32 + dy / 2) as usize);
        if jumped != midpoint
            || !self.is_occupied(from)
            || !self.is_occupied(jumped)
            || !self.board.is_playable(to)
            || self.is_occupied(to)
        {
            return Err(BoardError::IllegalMove(mov));
        }
        Ok(self.child(from, jumped, to))
    }

    /// The plain occupancy fingerprint: no symmetry folding.
    pub fn raw_id(&self) -> u64 {
        self.occupied
    }

    /// The symmetry-folded fingerprint: the minimum of the raw id over
    /// the identity and every transform in the board's symmetry set.
    /// Positions related by a shape-preserving symmetry share this id.
    pub fn canonical_id(&self) -> u64 {
        *self.canonical_id.get_or_init(|| {
            let width = self.board.width();
            let height = self.board.height();
            let mut id = self.occupied;
            for &transform in self.board.symmetries() {
                id = id.min(transform.apply(self.occupied, width, height));
            }
            id
        })
    }

    /// Border length: for each peg, the number of its four orthogonal
    /// neighbours that are out of bounds, blocked, or empty. Lower means
    /// a more compact cluster. Ranking heuristic only, no correctness
    /// guarantee.
    pub fn score(&self) -> u32 {
        *self.score.get_or_init(|| {
            let mut score = 0;
            for index in 0..self.board.cell_count() {
                if !self.is_occupied(index) {
                    continue;
                }
                let (x, y) = self.board.coords(index);
                for (dx, dy) in DIRECTIONS {
                    if self.empty_at(x as i32 + dx, y as i32 + dy) {
                        score += 1;
                    }
                }
            }
            score
        })
    }

    /// A neighbour counts as empty when it falls off the grid, is not a
    /// playable hole, or holds no peg.
    fn empty_at(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.board.width() as i32 || y >= self.board.height() as i32 {
            return true;
        }
        let index = self.board.index(x as usize, y as usize);
        !self.board.is_playable(index) || !self.is_occupied(index)
    }

    /// Grid rendering: `o` peg, `.` empty hole, `-` blocked cell.
    pub fn pretty_print(&self) -> String {
        let mut output = String::new();
        for y in 0..self.board.height() {
            if y > 0 {
                output.push('\n');
            }
            for x in 0..self.board.width() {
                let index = self.board.index(x, y);
                output.push(if !self.board.is_playable(index) {
                    '-'
                } else if self.is_occupied(index) {
                    'o'
                } else {
                    '.'
                });
            }
        }
        output
    }
}

use crate::moves::Move;
use crate::transform::Transform;

use smallvec::SmallVec;
use thiserror::Error;

/// The occupancy mask fits a single machine word.
pub const MAX_CELLS: usize = 64;
pub const MIN_DIMENSION: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error(
        "board dimensions must be at least {MIN_DIMENSION}x{MIN_DIMENSION} \
         and at most {MAX_CELLS} cells, got {width}x{height}"
    )]
    InvalidDimensions { width: usize, height: usize },
    #[error("cell flags length {got} does not match board size {expected}")]
    SizeMismatch { expected: usize, got: usize },
    #[error("cell ({x}, {y}) is not a playable hole")]
    OutOfBounds { x: usize, y: usize },
    #[error("failed to parse board: {0}")]
    ParseBoard(String),
    #[error("illegal move {0}")]
    IllegalMove(Move),
}

/// The immutable geometry of a board: its dimensions, which cells are
/// playable holes, and the dihedral symmetries that map the hole pattern
/// onto itself. Built once per puzzle and shared by reference by every
/// position derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    playable: u64,
    symmetries: SmallVec<[Transform; 7]>,
}

impl Board {
    /// Builds a board from per-cell playability flags, indexed `y * width + x`.
    pub fn new(width: usize, height: usize, cells: &[bool]) -> Result<Self, BoardError> {
        if width < MIN_DIMENSION || height < MIN_DIMENSION || width * height > MAX_CELLS {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        if cells.len() != width * height {
            return Err(BoardError::SizeMismatch {
                expected: width * height,
                got: cells.len(),
            });
        }

        let mut playable = 0u64;
        for (index, &hole) in cells.iter().enumerate() {
            if hole {
                playable |= 1 << index;
            }
        }

        let symmetries = discover_symmetries(width, height, playable);
        Ok(Board {
            width,
            height,
            playable,
            symmetries,
        })
    }

    /// The classic English board: a 7x7 cross with 2x2 corners removed.
    pub fn english() -> Self {
        Self::parse(
            "--ooo--\n\
             --ooo--\n\
             ooooooo\n\
             ooooooo\n\
             ooooooo\n\
             --ooo--\n\
             --ooo--",
        )
        .expect("preset board is valid")
    }

    /// The European (French) board: the English cross with filled-in
    /// diagonal corners.
    pub fn european() -> Self {
        Self::parse(
            "--ooo--\n\
             -ooooo-\n\
             ooooooo\n\
             ooooooo\n\
             ooooooo\n\
             -ooooo-\n\
             --ooo--",
        )
        .expect("preset board is valid")
    }

    /// A fully playable rectangle.
    pub fn rectangle(width: usize, height: usize) -> Result<Self, BoardError> {
        if width < MIN_DIMENSION || height < MIN_DIMENSION || width * height > MAX_CELLS {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        let cells = vec![true; width * height];
        Self::new(width, height, &cells)
    }

    /// Parses a board layout from text: one row per line, `o` (or `1`)
    /// for a playable hole, `-` (or `0` or space) for a blocked cell.
    /// Short rows are padded with blocked cells.
    pub fn parse(content: &str) -> Result<Self, BoardError> {
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for line in content.lines().map(str::trim_end) {
            if line.is_empty() {
                continue;
            }
            let row = line
                .chars()
                .map(|c| match c {
                    'o' | 'O' | '1' => Ok(true),
                    '-' | '0' | ' ' => Ok(false),
                    other => Err(BoardError::ParseBoard(format!(
                        "unexpected character {other:?}"
                    ))),
                })
                .collect::<Result<Vec<bool>, BoardError>>()?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(BoardError::ParseBoard("no rows".into()));
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        for row in &rows {
            cells.extend_from_slice(row);
            cells.resize(cells.len() + width - row.len(), false);
        }
        Self::new(width, height, &cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// The playable holes as a bitmask over cell indices.
    pub fn playable(&self) -> u64 {
        self.playable
    }

    pub fn is_playable(&self, index: usize) -> bool {
        self.playable >> index & 1 != 0
    }

    /// The non-identity transforms under which the hole pattern is
    /// invariant, discovered at construction.
    pub fn symmetries(&self) -> &[Transform] {
        &self.symmetries
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn pretty_print(&self) -> String {
        let mut output = String::new();
        for y in 0..self.height {
            if y > 0 {
                output.push('\n');
            }
            for x in 0..self.width {
                output.push(if self.is_playable(self.index(x, y)) {
                    'o'
                } else {
                    '-'
                });
            }
        }
        output
    }
}

fn discover_symmetries(width: usize, height: usize, playable: u64) -> SmallVec<[Transform; 7]> {
    let mut symmetries = SmallVec::new();
    for transform in Transform::ALL {
        if transform.requires_square() && width != height {
            continue;
        }
        if transform.apply(playable, width, height) == playable {
            symmetries.push(transform);
        }
    }
    symmetries
}

/// The seven non-identity dihedral operations on a rectangular grid,
/// expressed as cell-index remappings over a packed occupancy mask.
///
/// Flips and `Rotate180` apply to any rectangle; the diagonal flips and
/// the quarter rotations only make sense on square boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Mirror across the horizontal axis: top row swaps with bottom row.
    HorizontalFlip,
    /// Mirror across the vertical axis: left column swaps with right column.
    VerticalFlip,
    /// Mirror across the top-left to bottom-right diagonal.
    LeftDiagonalFlip,
    /// Mirror across the top-right to bottom-left diagonal (transpose).
    RightDiagonalFlip,
    /// Quarter turn clockwise.
    Rotate90,
    /// Half turn.
    Rotate180,
    /// Quarter turn counter-clockwise.
    Rotate270,
}

impl Transform {
    pub const ALL: [Transform; 7] = [
        Transform::HorizontalFlip,
        Transform::VerticalFlip,
        Transform::LeftDiagonalFlip,
        Transform::RightDiagonalFlip,
        Transform::Rotate90,
        Transform::Rotate180,
        Transform::Rotate270,
    ];

    /// Transforms that map a `width x height` grid onto itself only when
    /// `width == height`. Applying one of these to a non-square board is
    /// never attempted.
    pub fn requires_square(self) -> bool {
        matches!(
            self,
            Transform::LeftDiagonalFlip
                | Transform::RightDiagonalFlip
                | Transform::Rotate90
                | Transform::Rotate270
        )
    }

    /// Remaps an occupancy mask through this operation. Bit `y * width + x`
    /// of the result is taken from the source cell that lands on `(x, y)`.
    pub fn apply(self, bits: u64, width: usize, height: usize) -> u64 {
        debug_assert!(!self.requires_square() || width == height);
        let mut out = 0u64;
        for y in 0..height {
            for x in 0..width {
                let (sx, sy) = self.source(x, y, width, height);
                if bits >> (sy * width + sx) & 1 != 0 {
                    out |= 1 << (y * width + x);
                }
            }
        }
        out
    }

    /// Source coordinate for the cell that this operation moves onto `(x, y)`.
    fn source(self, x: usize, y: usize, width: usize, height: usize) -> (usize, usize) {
        match self {
            Transform::HorizontalFlip => (x, height - 1 - y),
            Transform::VerticalFlip => (width - 1 - x, y),
            Transform::LeftDiagonalFlip => (height - 1 - y, width - 1 - x),
            Transform::RightDiagonalFlip => (y, x),
            Transform::Rotate90 => (y, width - 1 - x),
            Transform::Rotate180 => (width - 1 - x, height - 1 - y),
            Transform::Rotate270 => (height - 1 - y, x),
        }
    }
}

//! Shared board model for the peg solitaire solver: board geometry with
//! dihedral symmetry discovery, immutable position snapshots over a
//! 64-bit occupancy mask, and the jump-move representation.

pub mod board;
pub mod moves;
pub mod position;
pub mod transform;

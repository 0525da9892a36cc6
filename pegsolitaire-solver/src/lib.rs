//! Generation-by-generation pruning search for generalized peg
//! solitaire: expand a whole generation, fold out symmetric duplicates,
//! test for the goal, then cut the generation down to the best-scoring
//! beam before recursing.

mod solver;

pub use crate::solver::{
    DEFAULT_PRUNE_WIDTH, DedupMode, Goal, PruneLimit, PruningSearch, SolveResult, solve,
};

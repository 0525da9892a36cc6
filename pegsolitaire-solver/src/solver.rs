use pegsolitaire_common::moves::Move;
use pegsolitaire_common::position::Position;

use ahash::AHashSet;
use anyhow::{Result, bail};
use std::time::{Duration, Instant};

/// Default beam width. Lax enough to solve the classic boards; most
/// boards solve with a much smaller width, and a smaller width searches
/// much faster.
pub const DEFAULT_PRUNE_WIDTH: usize = 200;

/// How many positions survive a generation. `Bounded(0)` keeps nothing
/// and ends the search; "no pruning at all" is spelled [`Unbounded`],
/// which explores the full breadth and can take hours on large boards.
///
/// [`Unbounded`]: PruneLimit::Unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneLimit {
    Unbounded,
    Bounded(usize),
}

impl Default for PruneLimit {
    fn default() -> Self {
        PruneLimit::Bounded(DEFAULT_PRUNE_WIDTH)
    }
}

/// Deduplication key for positions within one generation. `Symmetry`
/// folds positions related by the board's shape-preserving transforms
/// into one; `Exact` only merges bit-identical occupancies, trading
/// duplicate work for a cheaper per-position key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupMode {
    Exact,
    #[default]
    Symmetry,
}

/// What counts as a solved position. The target modes compare raw
/// occupancy masks; `ExactOrComplement` also accepts the target with
/// peg and hole roles swapped over the playable cells, which is what
/// makes inverted puzzle constructions findable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Goal {
    #[default]
    SinglePeg,
    Exact(u64),
    ExactOrComplement(u64),
}

impl Goal {
    pub fn exact(target: &Position) -> Self {
        Goal::Exact(target.occupied())
    }

    pub fn exact_or_complement(target: &Position) -> Self {
        Goal::ExactOrComplement(target.occupied())
    }

    pub fn matches(self, position: &Position) -> bool {
        match self {
            Goal::SinglePeg => position.is_final(),
            Goal::Exact(mask) => position.occupied() == mask,
            Goal::ExactOrComplement(mask) => {
                position.occupied() == mask
                    || position.occupied() == position.board().playable() & !mask
            }
        }
    }
}

type GenerationObserver<'a> = Box<dyn FnMut(usize, usize) + 'a>;

/// Breadth-first beam search over peg solitaire positions.
///
/// Each pass expands every frontier position, deduplicates the children
/// within the generation, scans them for goal matches, and stops at the
/// first generation containing any solution. An oversized generation is
/// cut down to the beam width by a destructive prune: positions are
/// stable-sorted by heuristic score ascending (ties keep generation
/// order) and the tail is discarded for good.
pub struct PruningSearch<'a> {
    initial: Position<'a>,
    prune: PruneLimit,
    dedup: DedupMode,
    goal: Goal,
    max_generations: Option<usize>,
    observer: Option<GenerationObserver<'a>>,
    solutions: Vec<Position<'a>>,
    generations: usize,
}

impl<'a> PruningSearch<'a> {
    pub fn new(initial: Position<'a>) -> Self {
        PruningSearch {
            initial,
            prune: PruneLimit::default(),
            dedup: DedupMode::default(),
            goal: Goal::default(),
            max_generations: None,
            observer: None,
            solutions: Vec::new(),
            generations: 0,
        }
    }

    pub fn prune(&mut self, limit: PruneLimit) {
        self.prune = limit;
    }

    pub fn set_dedup_mode(&mut self, mode: DedupMode) {
        self.dedup = mode;
    }

    pub fn set_goal(&mut self, goal: Goal) {
        self.goal = goal;
    }

    /// Caps how many generations are expanded before giving up. The
    /// depth of a run is already bounded by the peg count, so this is
    /// off by default; it exists for callers that want a hard ceiling.
    pub fn set_max_generations(&mut self, cap: Option<usize>) {
        self.max_generations = cap;
    }

    /// Installs a callback invoked once per expanded generation with
    /// the generation index (starting at 1) and its deduplicated size.
    pub fn on_generation(&mut self, observer: impl FnMut(usize, usize) + 'a) {
        self.observer = Some(Box::new(observer));
    }

    /// Runs the search to completion and returns the number of
    /// solutions found. Zero solutions is a normal outcome: the caller
    /// may retry with a wider beam. Calling `search` again restarts
    /// from the initial position.
    pub fn search(&mut self) -> usize {
        self.solutions.clear();
        self.generations = 0;

        let mut frontier = vec![self.initial.clone()];
        while !frontier.is_empty() {
            if let Some(cap) = self.max_generations
                && self.generations >= cap
            {
                break;
            }

            let mut seen = AHashSet::with_capacity(frontier.len() * 4);
            let mut next: Vec<Position<'a>> = Vec::new();
            for position in &frontier {
                for child in position.children() {
                    let key = match self.dedup {
                        DedupMode::Exact => child.raw_id(),
                        DedupMode::Symmetry => child.canonical_id(),
                    };
                    if seen.insert(key) {
                        next.push(child);
                    }
                }
            }

            self.generations += 1;
            if let Some(observer) = &mut self.observer {
                observer(self.generations, next.len());
            }

            for position in &next {
                if self.goal.matches(position) {
                    self.solutions.push(position.clone());
                }
            }
            if !self.solutions.is_empty() {
                break;
            }

            if let PruneLimit::Bounded(width) = self.prune
                && next.len() > width
            {
                // Stable sort: equal scores keep generation order, so
                // the cut is deterministic.
                next.sort_by_key(|position| position.score());
                next.truncate(width);
            }
            frontier = next;
        }

        self.solutions.len()
    }

    pub fn num_solutions(&self) -> usize {
        self.solutions.len()
    }

    /// How many generations the last `search` call expanded.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// The move list of solution `index`, or `None` when the index is
    /// outside the discovered range.
    pub fn solution(&self, index: usize) -> Option<&[Move]> {
        self.solutions.get(index).map(Position::moves)
    }

    /// The solved position reached by solution `index`.
    pub fn final_position(&self, index: usize) -> Option<&Position<'a>> {
        self.solutions.get(index)
    }
}

/// Result of a one-shot [`solve`] call.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub solutions: usize,
    pub generations: usize,
    pub elapsed: Duration,
    pub moves: Vec<Move>,
}

/// Runs a single-peg search with symmetry deduplication and returns the
/// first solution found, or an error when the beam exhausts without one.
pub fn solve(initial: Position<'_>, prune: PruneLimit) -> Result<SolveResult> {
    let timer = Instant::now();
    let mut search = PruningSearch::new(initial);
    search.prune(prune);
    let solutions = search.search();
    if solutions == 0 {
        bail!("No solution found; try a wider pruning width.");
    }
    let moves = search
        .solution(0)
        .map(<[Move]>::to_vec)
        .unwrap_or_default();
    Ok(SolveResult {
        solutions,
        generations: search.generations(),
        elapsed: timer.elapsed(),
        moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pegsolitaire_common::board::Board;

    fn replay<'a>(initial: &Position<'a>, moves: &[Move]) -> Position<'a> {
        let mut position = initial.clone();
        for &mov in moves {
            position = position.make_move(mov).expect("solution move replays");
        }
        position
    }

    #[test]
    fn test_solves_english_board() {
        let board = Board::english();
        let initial = Position::initial(&board, 3, 3).unwrap();
        let mut search = PruningSearch::new(initial.clone());
        // The narrowest beam that still solves the English board.
        search.prune(PruneLimit::Bounded(10));
        let solutions = search.search();
        assert!(solutions >= 1);

        let moves = search.solution(0).unwrap();
        assert_eq!(moves.len(), 31);
        let replayed = replay(&initial, moves);
        assert!(replayed.is_final());
        assert_eq!(
            replayed.occupied(),
            search.final_position(0).unwrap().occupied()
        );
    }

    #[test]
    fn test_solves_european_board() {
        let board = Board::european();
        let initial = Position::initial(&board, 0, 2).unwrap();
        let mut search = PruningSearch::new(initial);
        search.prune(PruneLimit::Bounded(9));
        assert!(search.search() >= 1);
        assert_eq!(search.solution(0).unwrap().len(), 35);
    }

    #[test]
    fn test_solves_6x6_board() {
        let board = Board::rectangle(6, 6).unwrap();
        let initial = Position::initial(&board, 1, 1).unwrap();
        let mut search = PruningSearch::new(initial.clone());
        search.prune(PruneLimit::Bounded(17));
        assert!(search.search() >= 1);

        let replayed = replay(&initial, search.solution(0).unwrap());
        assert!(replayed.is_final());
    }

    #[test]
    fn test_solves_4x6_board() {
        let board = Board::rectangle(4, 6).unwrap();
        let initial = Position::initial(&board, 1, 1).unwrap();
        let mut search = PruningSearch::new(initial.clone());
        assert!(search.search() >= 1);

        let moves = search.solution(0).unwrap();
        assert_eq!(moves.len(), 22);
        assert!(replay(&initial, moves).is_final());
    }

    #[test]
    fn test_unbounded_agrees_with_wide_beam() {
        let board = Board::rectangle(4, 4).unwrap();

        let mut unbounded = PruningSearch::new(Position::initial(&board, 1, 1).unwrap());
        unbounded.prune(PruneLimit::Unbounded);
        let full = unbounded.search();

        let mut wide = PruningSearch::new(Position::initial(&board, 1, 1).unwrap());
        // Wider than any 4x4 generation, so nothing is ever cut.
        wide.prune(PruneLimit::Bounded(100_000));
        assert_eq!(wide.search(), full);
        assert_eq!(wide.generations(), unbounded.generations());
    }

    #[test]
    fn test_zero_width_beam_finds_nothing() {
        let board = Board::english();
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        search.prune(PruneLimit::Bounded(0));
        assert_eq!(search.search(), 0);
        assert_eq!(search.num_solutions(), 0);
    }

    #[test]
    fn test_solution_index_out_of_range() {
        let board = Board::english();
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        assert!(search.solution(0).is_none());

        search.prune(PruneLimit::Bounded(10));
        let solutions = search.search();
        assert!(search.solution(solutions).is_none());
        assert!(search.final_position(solutions).is_none());
        assert!(search.solution(0).is_some());
    }

    #[test]
    fn test_exact_target_goal() {
        let board = Board::rectangle(6, 6).unwrap();
        let initial = Position::initial(&board, 1, 1).unwrap();

        let mut single_peg = PruningSearch::new(initial.clone());
        single_peg.prune(PruneLimit::Bounded(17));
        assert!(single_peg.search() >= 1);
        let target = single_peg.final_position(0).unwrap().clone();

        let mut targeted = PruningSearch::new(initial);
        targeted.prune(PruneLimit::Bounded(17));
        targeted.set_goal(Goal::exact(&target));
        assert!(targeted.search() >= 1);
        assert_eq!(
            targeted.final_position(0).unwrap().occupied(),
            target.occupied()
        );
    }

    #[test]
    fn test_complement_goal_matches_swapped_roles() {
        let board = Board::english();
        let position = Position::initial(&board, 3, 3).unwrap();
        // A target with pegs and holes swapped relative to `position`:
        // a lone peg at the centre.
        let complement = board.playable() & !position.occupied();

        let exact = Goal::Exact(complement);
        assert!(!exact.matches(&position));
        let either = Goal::ExactOrComplement(complement);
        assert!(either.matches(&position));
    }

    #[test]
    fn test_observer_reports_each_generation() {
        let board = Board::english();
        let mut sizes = Vec::new();
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        search.prune(PruneLimit::Bounded(10));
        search.on_generation(|generation, size| sizes.push((generation, size)));
        let solutions = search.search();
        assert!(solutions >= 1);

        drop(search);
        assert_eq!(sizes.len(), 31);
        assert_eq!(sizes.first(), Some(&(1, 1)));
        assert!(sizes.iter().enumerate().all(|(i, &(g, _))| g == i + 1));
    }

    #[test]
    fn test_symmetry_dedup_folds_first_generation() {
        let board = Board::english();

        // The four opening jumps are all equivalent under the cross's
        // symmetries; exact dedup keeps all four.
        let mut folded_size = 0;
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        search.set_max_generations(Some(1));
        search.on_generation(|_, size| folded_size = size);
        search.search();
        drop(search);
        assert_eq!(folded_size, 1);

        let mut exact_size = 0;
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        search.set_dedup_mode(DedupMode::Exact);
        search.set_max_generations(Some(1));
        search.on_generation(|_, size| exact_size = size);
        search.search();
        drop(search);
        assert_eq!(exact_size, 4);
    }

    #[test]
    fn test_generation_cap_stops_early() {
        let board = Board::english();
        let mut search = PruningSearch::new(Position::initial(&board, 3, 3).unwrap());
        search.prune(PruneLimit::Bounded(10));
        search.set_max_generations(Some(3));
        assert_eq!(search.search(), 0);
        assert_eq!(search.generations(), 3);
    }

    #[test]
    fn test_solve_convenience() {
        let board = Board::english();
        let initial = Position::initial(&board, 3, 3).unwrap();
        let result = solve(initial, PruneLimit::Bounded(10)).unwrap();
        assert!(result.solutions >= 1);
        assert_eq!(result.moves.len(), 31);
        assert_eq!(result.generations, 31);
    }

    #[test]
    fn test_solve_reports_exhaustion_as_error() {
        let board = Board::english();
        let initial = Position::initial(&board, 3, 3).unwrap();
        assert!(solve(initial, PruneLimit::Bounded(0)).is_err());
    }
}

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, trace};

use crate::algorithm::Algorithm;
use crate::cube::Cube;
use crate::moves::{Metrics, Move, Move::*};
use crate::pieces::PieceGroup;
use crate::spin::{Layer, Spin, ALL_SPINS};

/// Candidates are capped; hitting the cap raises the skip flag.
const MAX_SOLVES: usize = 5000;

/// Named static subsets of the move alphabet used to constrain search levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum MoveSet {
    /// All 18 outer face turns.
    #[default]
    Outer,
    /// U layer turns only.
    LayerU,
    /// R layer turns only.
    LayerR,
    /// U and R turns (2-gen).
    UR,
    /// U, R and F turns (Petrus block expansion).
    URF,
    /// U and R turns plus F2 (expansion that keeps edges oriented).
    UrF2,
    /// U, R and L turns (ZZ first two layers).
    URL,
    /// r, U, R turns (YruRU after the CP line).
    WideRUR,
    /// u, r, U, R turns (YruRU pEO extension).
    WideURUR,
    /// R, r, U, M turns (Roux/Nautilus second block).
    BlockRUrM,
    /// M and U turns (Roux last six edges).
    SliceMU,
    /// F' and B' setup turns for conjugated insertions.
    LateralFB,
}

impl MoveSet {
    pub fn moves(self) -> &'static [Move] {
        match self {
            MoveSet::Outer => &[
                U, U2, U3, R, R2, R3, F, F2, F3, D, D2, D3, L, L2, L3, B, B2, B3,
            ],
            MoveSet::LayerU => &[U, U2, U3],
            MoveSet::LayerR => &[R, R2, R3],
            MoveSet::UR => &[U, U2, U3, R, R2, R3],
            MoveSet::URF => &[U, U2, U3, R, R2, R3, F, F2, F3],
            MoveSet::UrF2 => &[U, U2, U3, R, R2, R3, F2],
            MoveSet::URL => &[U, U2, U3, R, R2, R3, L, L2, L3],
            MoveSet::WideRUR => &[Rw, Rw2, Rw3, U, U2, U3, R, R2, R3],
            MoveSet::WideURUR => &[Uw, Uw2, Uw3, Rw, Rw2, Rw3, U, U2, U3, R, R2, R3],
            MoveSet::BlockRUrM => &[R, R2, R3, Rw, Rw2, Rw3, U, U2, U3, M, M2, M3],
            MoveSet::SliceMU => &[M, M2, M3, U, U2, U3],
            MoveSet::LateralFB => &[F3, B3],
        }
    }
}

/// A micro-template expanded at a search level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchUnit {
    /// One move drawn from the set.
    Single(MoveSet),
    /// Two moves drawn from the set; used at the root to widen the
    /// expansion for thread parallelism.
    Double(MoveSet),
    /// `S m S'` with `m` from the first set and `S` from the lateral set.
    ConjugateSingle(MoveSet, MoveSet),
}

impl SearchUnit {
    /// Longest sequence this unit can contribute.
    pub fn max_len(self) -> usize {
        match self {
            SearchUnit::Single(_) => 1,
            SearchUnit::Double(_) => 2,
            SearchUnit::ConjugateSingle(..) => 3,
        }
    }

    /// All option sequences of the unit, internally pruned.
    fn expand(self) -> Vec<Vec<Move>> {
        let mut out = Vec::new();
        match self {
            SearchUnit::Single(set) => {
                for &m in set.moves() {
                    out.push(vec![m]);
                }
            }
            SearchUnit::Double(set) => {
                for &m1 in set.moves() {
                    for &m2 in set.moves() {
                        if m1.is_same_layer(m2) || bad_opposite_order(m1, m2) {
                            continue;
                        }
                        out.push(vec![m1, m2]);
                    }
                }
            }
            SearchUnit::ConjugateSingle(set, lateral) => {
                for &s in lateral.moves() {
                    for &m in set.moves() {
                        if s.is_same_layer(m) {
                            continue;
                        }
                        out.push(vec![s, m, s.get_inverse()]);
                    }
                }
            }
        }
        out
    }
}

/// Opposite-face pairs are emitted in one canonical order only
/// (alphabetical face: B before F, D before U, L before R).
fn bad_opposite_order(first: Move, second: Move) -> bool {
    first.is_inverse(second) && first.base() < 3
}

/// An ordered list of search units plus the check flag. A checking level
/// evaluates the goal after every unit it emits and prunes satisfied
/// branches as candidate solutions.
#[derive(Debug, Clone)]
pub struct SearchLevel {
    pub units: Vec<SearchUnit>,
    pub check: bool,
}

impl SearchLevel {
    pub fn new(check: bool) -> Self {
        SearchLevel {
            units: Vec::new(),
            check,
        }
    }

    pub fn add(&mut self, unit: SearchUnit) {
        self.units.push(unit);
    }

    pub fn with(check: bool, unit: SearchUnit) -> Self {
        SearchLevel {
            units: vec![unit],
            check,
        }
    }

    fn max_len(&self) -> usize {
        self.units.iter().map(|u| u.max_len()).max().unwrap_or(0)
    }

    /// Union of the unit expansions; units are alternatives.
    fn options(&self) -> Vec<Vec<Move>> {
        let mut out = Vec::new();
        for u in &self.units {
            out.extend(u.expand());
        }
        out
    }
}

/// One alternative of the optional part of a goal: every listed group must
/// be solved and every listed orientation group oriented.
#[derive(Debug, Clone, Default)]
pub struct GoalAlternative {
    pub solved: Vec<(PieceGroup, Spin)>,
    pub oriented: Vec<(PieceGroup, Spin)>,
}

/// The constraint predicate evaluated on `scramble · sequence`.
#[derive(Debug, Clone, Default)]
pub struct SearchGoal {
    mandatory: Vec<(PieceGroup, Spin)>,
    optional: Vec<GoalAlternative>,
    orientation: Vec<(PieceGroup, Spin)>,
    positions: Vec<(PieceGroup, Spin)>,
}

impl SearchGoal {
    pub fn satisfied(&self, cube: &Cube) -> bool {
        for (g, s) in &self.mandatory {
            if !cube.is_group_solved_for(*g, *s) {
                return false;
            }
        }
        for (g, s) in &self.orientation {
            if !cube.check_orientation_for(*g, *s) {
                return false;
            }
        }
        for (g, s) in &self.positions {
            if !cube.positions_match_for(*g, *s) {
                return false;
            }
        }
        if self.optional.is_empty() {
            return true;
        }
        self.optional.iter().any(|alt| {
            alt.solved
                .iter()
                .all(|(g, s)| cube.is_group_solved_for(*g, *s))
                && alt
                    .oriented
                    .iter()
                    .all(|(g, s)| cube.check_orientation_for(*g, *s))
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum EngineState {
    Configuring,
    Ready,
    Done,
}

/// Parallel bounded enumeration of move sequences satisfying a constraint
/// predicate.
///
/// Lifecycle: configure (set scramble, goal pieces, search levels), then
/// `update_root_data`, then `run`, then collect with `get_solves`. Calling
/// `run` before `update_root_data` is a programming error.
pub struct DeepSearch {
    scramble: Algorithm,
    base: Cube,
    goal: SearchGoal,
    plan: Vec<SearchLevel>,
    level_options: Vec<Vec<Vec<Move>>>,
    roots: Vec<Vec<Move>>,
    solves: Vec<Algorithm>,
    min_depth: Option<usize>,
    used_cores: usize,
    state: EngineState,
    cancel: Arc<AtomicBool>,
    skip: Arc<AtomicBool>,
}

impl DeepSearch {
    pub fn new(scramble: &Algorithm) -> Self {
        DeepSearch {
            scramble: scramble.clone(),
            base: Cube::from_algorithm(scramble),
            goal: SearchGoal::default(),
            plan: Vec::new(),
            level_options: Vec::new(),
            roots: Vec::new(),
            solves: Vec::new(),
            min_depth: None,
            used_cores: 0,
            state: EngineState::Configuring,
            cancel: Arc::new(AtomicBool::new(false)),
            skip: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reset to an empty configuration, keeping the cancel handle.
    pub fn clear(&mut self) {
        self.goal = SearchGoal::default();
        self.plan.clear();
        self.level_options.clear();
        self.roots.clear();
        self.solves.clear();
        self.min_depth = None;
        self.skip = Arc::new(AtomicBool::new(false));
        self.state = EngineState::Configuring;
    }

    pub fn set_scramble(&mut self, scramble: &Algorithm) {
        assert!(self.state == EngineState::Configuring);
        self.scramble = scramble.clone();
        self.base = Cube::from_algorithm(scramble);
    }

    /// Share a cooperative cancellation flag with the outer driver.
    pub fn set_cancel_handle(&mut self, cancel: Arc<AtomicBool>) {
        self.cancel = cancel;
    }

    pub fn add_to_mandatory_pieces(&mut self, g: PieceGroup, s: Spin) {
        assert!(self.state == EngineState::Configuring);
        self.goal.mandatory.push((g, s));
    }

    /// At least one of the optional groups must be solved.
    pub fn add_to_optional_pieces(&mut self, g: PieceGroup, s: Spin) {
        assert!(self.state == EngineState::Configuring);
        self.goal.optional.push(GoalAlternative {
            solved: vec![(g, s)],
            oriented: Vec::new(),
        });
    }

    pub fn add_optional_alternative(&mut self, alt: GoalAlternative) {
        assert!(self.state == EngineState::Configuring);
        self.goal.optional.push(alt);
    }

    pub fn add_to_mandatory_orientations(&mut self, g: PieceGroup, s: Spin) {
        assert!(self.state == EngineState::Configuring);
        self.goal.orientation.push((g, s));
    }

    pub fn add_to_mandatory_positions(&mut self, g: PieceGroup, s: Spin) {
        assert!(self.state == EngineState::Configuring);
        self.goal.positions.push((g, s));
    }

    pub fn add_search_level(&mut self, level: SearchLevel) {
        assert!(self.state == EngineState::Configuring);
        self.plan.push(level);
    }

    /// Suppress candidates shorter than the bound (used when a shallower
    /// search has already covered them).
    pub fn set_min_depth(&mut self, d: usize) {
        self.min_depth = Some(d);
    }

    /// Longest sequence the current plan can emit.
    pub fn plan_depth(&self) -> usize {
        self.plan.iter().map(|l| l.max_len()).sum()
    }

    /// Expand every level's options once; the search becomes ready to run.
    pub fn update_root_data(&mut self) {
        assert!(self.state == EngineState::Configuring);
        self.level_options = self.plan.iter().map(|l| l.options()).collect();
        self.roots = self.level_options.first().cloned().unwrap_or_default();
        self.state = EngineState::Ready;
    }

    /// Run the search with the given worker count: -1 single-threaded,
    /// 0 all hardware threads, otherwise exactly `cores`.
    pub fn run(&mut self, cores: i32) {
        assert!(
            self.state == EngineState::Ready,
            "DeepSearch::run called before update_root_data"
        );

        // An already satisfied goal is solved by the empty sequence.
        if self.goal.satisfied(&self.base) {
            self.solves = vec![Algorithm::new()];
            self.used_cores = 1;
            self.state = EngineState::Done;
            return;
        }

        let requested = match cores {
            c if c < 0 => 1,
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            c => c as usize,
        };
        let threads = requested.min(self.roots.len()).max(1);
        self.used_cores = threads;

        let results: Mutex<Vec<Algorithm>> = Mutex::new(Vec::new());
        let emitted = AtomicUsize::new(0);
        let chunk = self.roots.len().div_ceil(threads.max(1)).max(1);

        let ctx = WorkerContext {
            base: &self.base,
            goal: &self.goal,
            plan: &self.plan,
            level_options: &self.level_options,
            min_depth: self.min_depth,
            cancel: &self.cancel,
            skip: &self.skip,
            emitted: &emitted,
            results: &results,
        };

        debug!(
            "deep search: {} roots over {} threads, plan depth {}",
            self.roots.len(),
            threads,
            self.plan_depth()
        );

        // a worker panic aborts only this search; the driver sees no solves
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            thread::scope(|scope| {
                for roots in self.roots.chunks(chunk) {
                    let ctx = &ctx;
                    scope.spawn(move || {
                        let mut local: Vec<Algorithm> = Vec::new();
                        for root in roots {
                            if ctx.cancel.load(Ordering::Relaxed)
                                || ctx.skip.load(Ordering::Relaxed)
                            {
                                break;
                            }
                            let mut cube = *ctx.base;
                            cube.apply_moves(root);
                            let mut seq = root.clone();
                            if ctx.plan[0].check && ctx.goal.satisfied(&cube) {
                                ctx.emit(&seq, &mut local);
                                continue;
                            }
                            if ctx.plan.len() > 1 {
                                ctx.descend(1, &cube, &mut seq, &mut local);
                            }
                        }
                        // merged once per worker on join, never in the hot loop
                        ctx.results.lock().unwrap().extend(local);
                    });
                }
            });
        }));

        self.solves = match outcome {
            Ok(()) => results.into_inner().unwrap_or_default(),
            Err(_) => {
                debug!("search worker panicked; returning no candidates");
                Vec::new()
            }
        };
        trace!("deep search finished with {} candidates", self.solves.len());
        self.state = EngineState::Done;
    }

    /// Candidates found by the last run.
    pub fn get_solves(&self) -> &[Algorithm] {
        &self.solves
    }

    /// True when the candidate cap cut the search short.
    pub fn check_skip(&self) -> bool {
        self.skip.load(Ordering::Relaxed)
    }

    pub fn get_used_cores(&self) -> usize {
        self.used_cores
    }

    /// Convenience reducer: the metric-shortest candidate. Ties fall back
    /// to the subjective score and then to canonical move order, so the
    /// result does not depend on worker finishing order.
    pub fn evaluate_shortest(&self, metric: Metrics) -> Option<Algorithm> {
        self.solves
            .iter()
            .min_by(|a, b| {
                a.metric(metric)
                    .partial_cmp(&b.metric(metric))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.subjective_score().cmp(&b.subjective_score()))
                    .then(a.moves().cmp(b.moves()))
            })
            .cloned()
    }

    /// Configure and run the shared first-stage search: any cross, first
    /// block, Petrus block, CP line or EO line over every orientation. The
    /// candidate list feeds every method's first-stage evaluator, which is
    /// what makes the scramble cache shareable between methods.
    pub fn search_base(&mut self, depth: usize, cores: i32) {
        assert!(self.state == EngineState::Configuring);
        let depth = depth.max(4);

        for layer in [Layer::U, Layer::D, Layer::F, Layer::B, Layer::R, Layer::L] {
            self.add_to_optional_pieces(PieceGroup::CrossD, Spin::for_cross_layer(layer));
        }
        for s in ALL_SPINS {
            self.add_to_optional_pieces(PieceGroup::RouxFb, s);
        }
        for s in &ALL_SPINS[..8] {
            self.add_to_optional_pieces(PieceGroup::PetrusBlock, *s);
        }
        for s in &ALL_SPINS[..12] {
            self.add_to_optional_pieces(PieceGroup::CpLine, *s);
        }
        for s in ALL_SPINS {
            self.add_optional_alternative(GoalAlternative {
                solved: vec![(PieceGroup::EoLine, s)],
                oriented: vec![(PieceGroup::AllEdges, s)],
            });
        }

        let root = SearchUnit::Double(MoveSet::Outer);
        let unit = SearchUnit::Single(MoveSet::Outer);
        self.add_search_level(SearchLevel::with(false, root));
        for _ in 2..depth {
            self.add_search_level(SearchLevel::with(true, unit));
        }
        self.update_root_data();
        self.run(cores);
    }
}

struct WorkerContext<'a> {
    base: &'a Cube,
    goal: &'a SearchGoal,
    plan: &'a [SearchLevel],
    level_options: &'a [Vec<Vec<Move>>],
    min_depth: Option<usize>,
    cancel: &'a AtomicBool,
    skip: &'a AtomicBool,
    emitted: &'a AtomicUsize,
    results: &'a Mutex<Vec<Algorithm>>,
}

impl<'a> WorkerContext<'a> {
    fn emit(&self, seq: &[Move], local: &mut Vec<Algorithm>) {
        if let Some(min) = self.min_depth {
            if seq.len() < min {
                return;
            }
        }
        local.push(Algorithm::from_moves(seq.to_vec()));
        if self.emitted.fetch_add(1, Ordering::Relaxed) + 1 >= MAX_SOLVES {
            self.skip.store(true, Ordering::Relaxed);
        }
    }

    fn descend(&self, idx: usize, cube: &Cube, seq: &mut Vec<Move>, local: &mut Vec<Algorithm>) {
        if self.cancel.load(Ordering::Relaxed) || self.skip.load(Ordering::Relaxed) {
            return;
        }
        let level = &self.plan[idx];
        for option in &self.level_options[idx] {
            let first = option[0];
            let last = *seq.last().unwrap();
            if first.is_same_layer(last) || bad_opposite_order(last, first) {
                continue;
            }
            let mut next = *cube;
            next.apply_moves(option);
            let len_before = seq.len();
            seq.extend_from_slice(option);
            if level.check && self.goal.satisfied(&next) {
                self.emit(seq, local);
            } else if idx + 1 < self.plan.len() {
                self.descend(idx + 1, &next, seq, local);
            }
            seq.truncate(len_before);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::algorithm::Algorithm;

    fn cross_goal(ds: &mut DeepSearch) {
        ds.add_to_mandatory_pieces(PieceGroup::CrossD, Spin::UF);
    }

    fn standard_plan(ds: &mut DeepSearch, depth: usize) {
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..depth {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
    }

    #[test]
    fn test_already_solved_goal_gives_empty() {
        let scramble = Algorithm::new();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        standard_plan(&mut ds, 5);
        ds.run(1);
        assert_eq!(ds.get_solves().len(), 1);
        assert!(ds.get_solves()[0].is_empty());
    }

    #[test]
    fn test_single_move_scramble() {
        // F' breaks the cross; every candidate must rebuild it
        let scramble = Algorithm::from_str("F'").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        standard_plan(&mut ds, 4);
        ds.run(1);
        assert!(!ds.get_solves().is_empty());
        for alg in ds.get_solves() {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(alg);
            assert!(cube.is_group_solved(PieceGroup::CrossD));
        }
        let best = ds.evaluate_shortest(Metrics::HTM).unwrap();
        let mut cube = Cube::from_algorithm(&scramble);
        cube.apply_algorithm(&best);
        assert!(cube.is_group_solved(PieceGroup::CrossD));
    }

    #[test]
    fn test_no_duplicate_candidates() {
        let scramble = Algorithm::from_str("R U F'").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        standard_plan(&mut ds, 5);
        ds.run(1);
        let mut seen = std::collections::HashSet::new();
        for alg in ds.get_solves() {
            assert!(seen.insert(alg.to_string()), "duplicate {}", alg);
        }
    }

    #[test]
    fn test_parallel_same_candidate_set() {
        let scramble = Algorithm::from_str("F2 L2 D R'").unwrap();
        let make = |cores: i32| {
            let mut ds = DeepSearch::new(&scramble);
            cross_goal(&mut ds);
            standard_plan(&mut ds, 5);
            ds.run(cores);
            let mut out: Vec<String> = ds.get_solves().iter().map(|a| a.to_string()).collect();
            out.sort();
            out
        };
        let single = make(-1);
        let multi = make(4);
        assert_eq!(single, multi);
    }

    #[test]
    fn test_used_cores_reported() {
        let scramble = Algorithm::from_str("R U F'").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        standard_plan(&mut ds, 5);
        ds.run(4);
        let used = ds.get_used_cores();
        assert!(used >= 1 && used <= 4);
    }

    #[test]
    fn test_min_depth_filter() {
        let scramble = Algorithm::from_str("F'").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        ds.set_min_depth(4);
        standard_plan(&mut ds, 5);
        ds.run(1);
        for alg in ds.get_solves() {
            assert!(alg.num_steps() >= 4);
        }
    }

    #[test]
    fn test_cancellation_stops_search() {
        let scramble = Algorithm::from_str("R U R' F2 D' L U2 B").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        cross_goal(&mut ds);
        let cancel = Arc::new(AtomicBool::new(true)); // cancelled before start
        ds.set_cancel_handle(cancel);
        standard_plan(&mut ds, 7);
        ds.run(2);
        // workers drain immediately; whatever was accumulated is returned
        assert!(ds.get_solves().len() <= MAX_SOLVES);
    }

    #[test]
    fn test_optional_groups() {
        // the scramble preserves the bottom-left block for some orientation
        let scramble = Algorithm::from_str("R U R'").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        for s in ALL_SPINS {
            ds.add_to_optional_pieces(PieceGroup::RouxFb, s);
        }
        standard_plan(&mut ds, 4);
        ds.run(1);
        // R U R' leaves the left block of the reference spin untouched, so
        // the goal is satisfied by the empty algorithm
        assert_eq!(ds.get_solves().len(), 1);
        assert!(ds.get_solves()[0].is_empty());
    }

    #[test]
    fn test_conjugate_unit_shape() {
        let unit = SearchUnit::ConjugateSingle(MoveSet::LayerR, MoveSet::LateralFB);
        for option in unit.expand() {
            assert_eq!(option.len(), 3);
            assert_eq!(option[0].get_inverse(), option[2]);
        }
    }

    #[test]
    fn test_double_unit_pruning() {
        let unit = SearchUnit::Double(MoveSet::Outer);
        for option in unit.expand() {
            assert!(!option[0].is_same_layer(option[1]));
            assert!(!bad_opposite_order(option[0], option[1]));
        }
    }

    #[test]
    fn test_search_base_finds_structures() {
        let scramble = Algorithm::from_str("R U").unwrap();
        let mut ds = DeepSearch::new(&scramble);
        ds.search_base(4, 0);
        assert!(!ds.get_solves().is_empty());
    }
}

//! Method pipeline drivers.
//!
//! One module per speedcubing method. Every driver owns its scramble, the
//! per-spin stage results and timings, and composes deep searches,
//! evaluator rankings and collection lookups into a full solve.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::algorithm::{Algorithm, U_MOVES, Y_TURNS};
use crate::collection::{Collection, Policy};
use crate::cube::Cube;
use crate::cubie::{Corner, Edge};
use crate::moves::{Metrics, Move};
use crate::pieces::PieceGroup;
use crate::spin::{Layer, Spin, ALL_SPINS};

/// Module for the CFOP (Fridrich) method solver.
pub mod cfop;
/// Module for the Roux method solver.
pub mod roux;
/// Module for the Petrus method solver.
pub mod petrus;
/// Module for the ZZ method solver.
pub mod zz;
/// Module for the CEOR (YruRU) method solver.
pub mod ceor;
/// Module for the Mehta method solver.
pub mod mehta;
/// Module for the Nautilus method solver.
pub mod nautilus;
/// Module for the LEOR method solver.
pub mod leor;
/// Module for the beginner layer-by-layer solver.
pub mod lbl;

pub use cfop::Cfop;
pub use ceor::Ceor;
pub use lbl::Lbl;
pub use leor::Leor;
pub use mehta::Mehta;
pub use nautilus::Nautilus;
pub use petrus::Petrus;
pub use roux::Roux;
pub use zz::Zz;

/// Per-spin storage for stage algorithms.
pub type SpinVec = [Vec<Algorithm>; 24];
/// Per-spin storage for lookup case names.
pub type SpinNames = [Vec<String>; 24];

pub fn spin_vec() -> SpinVec {
    std::array::from_fn(|_| Vec::new())
}

pub fn spin_names() -> SpinNames {
    std::array::from_fn(|_| Vec::new())
}

/// Capability set shared by all method drivers.
pub trait Method {
    /// Forget all search results.
    fn reset(&mut self);
    /// Rewrite stage algorithms into grip-friendly form, migrating leading
    /// rotations into the inspection.
    fn set_regrips(&mut self);
    /// All-spins report; `cancellations` adds post-cancellation metrics,
    /// `debug` keeps lines for failed spins.
    fn get_report(&self, cancellations: bool, debug: bool) -> String;
    /// Detailed report for one (spin, inspection index) record.
    fn get_spin_report(&self, spin: Spin, n: usize) -> String;
    /// Wall-time report for the stages.
    fn get_time_report(&self) -> String;
    /// Concatenation of inspection and every stage algorithm.
    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm;
    /// All stage slots are filled for the spin.
    fn check_solve_consistency(&self, spin: Spin) -> bool;

    fn data(&self) -> &MethodData;

    fn is_solved(&self, spin: Spin, n: usize) -> bool {
        let mut c = self.data().cube_base;
        c.apply_algorithm(&self.get_full_solve(spin, n));
        c.is_solved()
    }

    fn get_metric_solve(&self, spin: Spin, n: usize) -> f32 {
        self.get_full_solve(spin, n).metric(self.data().metric)
    }

    fn get_cancellations(&self, spin: Spin, n: usize) -> Algorithm {
        self.get_full_solve(spin, n).cancellations()
    }

    fn get_metric_cancellations(&self, spin: Spin, n: usize) -> f32 {
        self.get_cancellations(spin, n).metric(self.data().metric)
    }

    /// Report for the (spin, index) with the smallest total metric.
    fn get_best_report(&self, cancellations: bool) -> String {
        let data = self.data();
        let mut best: Option<(f32, Spin, usize)> = None;
        for &spin in &data.search_spins {
            if !self.check_solve_consistency(spin) {
                continue;
            }
            for n in 0..data.inspections[spin.index()].len() {
                if !self.is_solved(spin, n) {
                    continue;
                }
                let m = if cancellations {
                    self.get_metric_cancellations(spin, n)
                } else {
                    self.get_metric_solve(spin, n)
                };
                if best.map_or(true, |(bm, _, _)| m < bm) {
                    best = Some((m, spin, n));
                }
            }
        }
        let Some((_, spin, n)) = best else {
            return "No solves!\n".to_string();
        };
        if cancellations {
            let c = self.get_cancellations(spin, n);
            format!(
                "{}\nCancellations ({} {}): {}\n",
                self.get_spin_report(spin, n),
                Algorithm::metric_value(c.metric(self.data().metric)),
                self.data().metric,
                c
            )
        } else {
            self.get_spin_report(spin, n)
        }
    }
}

/// State every method driver carries: scramble, allowed spins, inspections,
/// metric and threading knobs.
#[derive(Debug, Clone)]
pub struct MethodData {
    pub scramble: Algorithm,
    pub cube_base: Cube,
    pub search_spins: Vec<Spin>,
    pub inspections: SpinVec,
    pub metric: Metrics,
    pub cores: i32,
    pub cancel: Arc<AtomicBool>,
}

impl MethodData {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        MethodData {
            scramble: scramble.clone(),
            cube_base: Cube::from_algorithm(scramble),
            search_spins: ALL_SPINS.to_vec(),
            inspections: spin_vec(),
            metric: Metrics::default(),
            cores,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// An empty spin list means every orientation.
    pub fn set_search_spins(&mut self, spins: &[Spin]) {
        if spins.is_empty() {
            self.search_spins = ALL_SPINS.to_vec();
        } else {
            self.search_spins = spins.to_vec();
        }
    }

    pub fn set_metric(&mut self, m: Metrics) {
        self.metric = m;
    }

    pub fn set_cancel_handle(&mut self, cancel: Arc<AtomicBool>) {
        self.cancel = cancel;
    }

    /// Store the best first-stage candidates per spin: rank the raw solves
    /// with the given evaluator kind, fix the inspection rotations, and
    /// rewrite each winner relative to its spin.
    pub fn evaluate_first_stage<F>(
        &mut self,
        store: &mut SpinVec,
        solves: &[Algorithm],
        max_solves: usize,
        policy: Policy,
        kind: F,
    ) where
        F: Fn(Spin) -> crate::evaluator::StageKind,
    {
        for &spin in &self.search_spins.clone() {
            let sp = spin.index();
            store[sp] =
                crate::evaluator::evaluate(kind(spin), solves, &self.cube_base, max_solves, policy);
            self.inspections[sp].clear();
            if store[sp].is_empty() {
                continue;
            }
            let (t1, t2) = self.cube_base.spin().steps_to(spin);
            let mut insp = Algorithm::new();
            insp.push(t1);
            insp.push(t2);
            for alg in store[sp].iter_mut() {
                if t1 != Move::N {
                    alg.transform_turn(t1);
                }
                if t2 != Move::N {
                    alg.transform_turn(t2);
                }
                self.inspections[sp].push(insp.clone());
            }
        }
    }

    /// Scramble, inspection and the given stage algorithms concatenated.
    pub fn stage_start(&self, spin: Spin, n: usize, stages: &[&SpinVec]) -> Algorithm {
        let sp = spin.index();
        let mut alg = self.scramble.clone();
        if let Some(insp) = self.inspections[sp].get(n) {
            alg.append(insp);
        }
        for stage in stages {
            if let Some(a) = stage[sp].get(n) {
                alg.append(a);
            }
        }
        alg
    }

    /// Regrip one stage store, pulling any leading rotation into the
    /// inspection algorithm.
    pub fn regrip_first_stage(&mut self, store: &mut SpinVec) {
        for &spin in &self.search_spins {
            let sp = spin.index();
            for n in 0..store[sp].len() {
                store[sp][n] = store[sp][n].regrip();
                let first = store[sp][n].first();
                if first.is_rotation() {
                    if let Some(insp) = self.inspections[sp].get_mut(n) {
                        insp.append_shrink(first);
                        store[sp][n].erase_first();
                    }
                }
            }
        }
    }
}

// Structure predicates shared by the method drivers. Each one reorients a
// copy of the cube to the asked spin and tests observer-frame groups.

/// The first cross is built for the given cross layer.
pub fn is_cross_built(c: &Cube, layer: Layer) -> bool {
    c.is_group_solved_for(PieceGroup::CrossD, Spin::for_cross_layer(layer))
}

/// Cross plus at least one F2L pair.
pub fn is_xcross_built(c: &Cube, layer: Layer) -> bool {
    let spin = Spin::for_cross_layer(layer);
    c.is_group_solved_for(PieceGroup::CrossD, spin)
        && PieceGroup::f2l_pairs()
            .iter()
            .any(|g| c.is_group_solved_for(*g, spin))
}

/// Both first layers are built for the spin.
pub fn is_f2l_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::F2l, spin)
}

/// All four F2L pairs are built (no cross check).
pub fn is_f2l_pairs_built(c: &Cube, spin: Spin) -> bool {
    PieceGroup::f2l_pairs()
        .iter()
        .all(|g| c.is_group_solved_for(*g, spin))
}

/// The last layer is oriented (OLL done) relative to the cube's spin.
pub fn is_last_layer_oriented(c: &Cube) -> bool {
    c.is_face_oriented(Layer::U)
}

/// Roux/Nautilus first block (1x2x3 bottom left).
pub fn is_roux_fb_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::RouxFb, spin)
}

pub fn is_roux_fb_square_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::RouxFbSquare, spin)
}

/// Roux second block (1x2x3 bottom right).
pub fn is_roux_sb_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::RouxSb, spin)
}

/// First block plus either square of the second block.
pub fn is_roux_fb_and_sb_square_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::RouxFb, spin)
        && (c.is_group_solved_for(PieceGroup::RouxSbSquareFront, spin)
            || c.is_group_solved_for(PieceGroup::RouxSbSquareBack, spin))
}

pub fn are_roux_blocks_built(c: &Cube, spin: Spin) -> bool {
    is_roux_fb_built(c, spin) && is_roux_sb_built(c, spin)
}

/// The up-layer corners are solved (CMLL/COLL done).
pub fn is_cmll_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::CornersU, spin)
}

/// Both blocks built and the last six edges oriented.
pub fn is_roux_l6e_oriented(c: &Cube, spin: Spin) -> bool {
    if !are_roux_blocks_built(c, spin) {
        return false;
    }
    let v = c.with_spin(spin);
    v.is_face_oriented2(Layer::U) && v.is_face_oriented2(Layer::D)
}

/// L6E oriented with the left and right layers complete (UL/UR solved).
pub fn is_roux_l6e_o2e(c: &Cube, spin: Spin) -> bool {
    let v = c.with_spin(spin);
    v.is_layer_solved(Layer::L)
        && v.is_layer_solved(Layer::R)
        && v.is_face_oriented2(Layer::U)
        && v.is_face_oriented2(Layer::D)
}

pub fn is_petrus_block_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::PetrusBlock, spin)
}

pub fn is_petrus_expanded_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::PetrusExpandedBlock, spin)
}

pub fn is_eoline_built(c: &Cube, spin: Spin) -> bool {
    c.check_orientation_for(PieceGroup::AllEdges, spin)
        && c.is_group_solved_for(PieceGroup::EoLine, spin)
}

pub fn is_eoarrow_built(c: &Cube, spin: Spin) -> bool {
    is_eoline_built(c, spin) && c.is_edge_solved_for(Edge::DL, spin)
}

pub fn is_eocross_built(c: &Cube, spin: Spin) -> bool {
    c.check_orientation_for(PieceGroup::AllEdges, spin)
        && c.is_group_solved_for(PieceGroup::CrossD, spin)
}

pub fn is_xeoline_built(c: &Cube, spin: Spin) -> bool {
    is_eoline_built(c, spin)
        && c.is_edge_solved_for(Edge::DL, spin)
        && c.is_edge_solved_for(Edge::BL, spin)
        && c.is_corner_solved_for(Corner::DBL, spin)
}

pub fn is_xeocross_built(c: &Cube, spin: Spin) -> bool {
    is_eocross_built(c, spin)
        && c.is_edge_solved_for(Edge::BL, spin)
        && c.is_corner_solved_for(Corner::DBL, spin)
}

/// EO arrow extended to the full bottom-left 2x2x3.
pub fn is_eo223_built(c: &Cube, spin: Spin) -> bool {
    is_eoarrow_built(c, spin)
        && c.is_edge_solved_for(Edge::BL, spin)
        && c.is_edge_solved_for(Edge::FL, spin)
        && c.is_corner_solved_for(Corner::DBL, spin)
        && c.is_corner_solved_for(Corner::DLF, spin)
}

/// YruRU CP line (the 1x1x3 on the bottom left).
pub fn is_yruru_line_built(c: &Cube, spin: Spin) -> bool {
    c.is_group_solved_for(PieceGroup::CpLine, spin)
}

/// YruRU corner permutation, beginner reduction: with the line built, read
/// the six remaining corners as a thread of couples and reduce the two
/// back-right corners out of it; CP is solved when the remaining four read
/// as a cycle placing corners 1 and 2 after corner 4.
pub fn is_yruru_cp_built(c: &Cube, spin: Spin) -> bool {
    use Corner::*;
    if !is_yruru_line_built(c, spin) {
        return false;
    }
    let v = c.with_spin(spin);
    let r = crate::spin::rotated_solved(spin);

    // Couple places in reading order: (UFL,UBL), (UBR,UFR), (DFR,DBR)
    let places = [UFL, ULB, UBR, URF, DFR, DRB];
    let corners: Vec<Corner> = places.iter().map(|p| r.cp[*p as usize]).collect();
    let place_for: Vec<Corner> = corners.iter().map(|cn| v.position_of_corner(*cn)).collect();

    let odd = |p: Corner| p == places[0] || p == places[2] || p == places[4];
    let corner5_odd = odd(place_for[4]);
    let same_couple = |a: Corner, b: Corner| {
        (a == places[0] && b == places[1])
            || (a == places[1] && b == places[0])
            || (a == places[2] && b == places[3])
            || (a == places[3] && b == places[2])
            || (a == places[4] && b == places[5])
            || (a == places[5] && b == places[4])
    };
    let couple56 = same_couple(place_for[4], place_for[5]);
    let parity: Vec<bool> = place_for.iter().map(|p| odd(*p)).collect();

    // Read the thread of corners; direction depends on where corner 5 sits.
    let mut sequence: Vec<Corner> = if corner5_odd {
        places.iter().map(|p| v.corner_at(*p)).collect()
    } else {
        places.iter().rev().map(|p| v.corner_at(*p)).collect()
    };

    if !couple56 {
        let idx_of = |seq: &[Corner], c: Corner| seq.iter().position(|x| *x == c).unwrap();
        let i5 = idx_of(&sequence, corners[4]);
        let i6 = idx_of(&sequence, corners[5]);
        let friend = |i: usize| if i % 2 == 0 { i + 1 } else { i - 1 };
        let f5 = friend(i5);
        let f6 = friend(i6);
        // First swap: corner 6 with the friend of corner 5.
        sequence.swap(i6, f5);
        if parity[4] == parity[5] {
            // Swap the third corner sharing their parity with 6's friend.
            let Some(third) = (0..4).find(|i| parity[*i] == parity[4]).map(|i| corners[i]) else {
                return false;
            };
            let it = idx_of(&sequence, third);
            sequence.swap(f6, it);
        } else {
            // Swap the remaining couple with each other.
            let mut others: Vec<usize> = (0..6)
                .filter(|i| *i != i5 && *i != f5 && *i != i6 && *i != f6)
                .collect();
            if others.len() >= 2 {
                let (a, b) = (others.remove(0), others.remove(0));
                sequence.swap(a, b);
            }
        }
    }

    // Drop corners 5 and 6 and check the cyclic order around corner 4.
    let seq4: Vec<Corner> = sequence
        .into_iter()
        .filter(|cn| *cn != corners[4] && *cn != corners[5])
        .collect();
    let Some(i4) = seq4.iter().position(|cn| *cn == corners[3]) else {
        return false;
    };
    seq4[(i4 + 1) % 4] == corners[0] && seq4[(i4 + 2) % 4] == corners[1]
}

/// Spin remap for the Mehta first block (a Roux first block seen from
/// another orientation: the 1x1x3 sits in the DL position).
pub fn mehta_fb_spin(spin: Spin) -> Spin {
    match spin {
        Spin::UF => Spin::RB,
        Spin::UB => Spin::LF,
        Spin::UR => Spin::BL,
        Spin::UL => Spin::FR,
        Spin::DF => Spin::LB,
        Spin::DB => Spin::RF,
        Spin::DR => Spin::FL,
        Spin::DL => Spin::BR,
        Spin::FU => Spin::LD,
        Spin::FD => Spin::RU,
        Spin::FR => Spin::UL,
        Spin::FL => Spin::DR,
        Spin::BU => Spin::RD,
        Spin::BD => Spin::LU,
        Spin::BR => Spin::DL,
        Spin::BL => Spin::UR,
        Spin::RU => Spin::FD,
        Spin::RD => Spin::BU,
        Spin::RF => Spin::DB,
        Spin::RB => Spin::UF,
        Spin::LU => Spin::BD,
        Spin::LD => Spin::FU,
        Spin::LF => Spin::UB,
        Spin::LB => Spin::DF,
    }
}

pub fn is_mehta_fb_built(c: &Cube, spin: Spin) -> bool {
    is_roux_fb_built(c, mehta_fb_spin(spin))
}

/// First block plus at least three of the four belt edges.
pub fn is_mehta_3qb_built(c: &Cube, spin: Spin) -> bool {
    if !is_mehta_fb_built(c, spin) {
        return false;
    }
    let v = c.with_spin(spin);
    let solved = Cube::layer_edges(Layer::E)
        .iter()
        .filter(|&&e| v.is_edge_solved(e))
        .count();
    solved >= 3
}

/// First block, full belt, and all edges oriented.
pub fn is_mehta_eole_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_fb_built(c, spin)
        && c.check_orientation_for(PieceGroup::AllEdges, spin)
        && c.with_spin(spin).is_layer_solved(Layer::E)
}

pub fn is_mehta_6co_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_eole_built(c, spin) && c.check_orientation_for(PieceGroup::AllCorners, spin)
}

pub fn is_mehta_6cp_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_eole_built(c, spin) && c.is_group_solved_for(PieceGroup::AllCorners, spin)
}

/// Down layer and belt solved with the up layer oriented.
pub fn is_mehta_apdr_built(c: &Cube, spin: Spin) -> bool {
    let v = c.with_spin(spin);
    v.is_layer_solved(Layer::D)
        && v.is_layer_solved(Layer::E)
        && v.check_orientation(PieceGroup::LayerU)
}

/// EOLE plus the two remaining down-layer corners.
pub fn is_mehta_dcal_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_eole_built(c, spin)
        && c.is_corner_solved_for(Corner::DFR, spin)
        && c.is_corner_solved_for(Corner::DRB, spin)
}

pub fn is_mehta_cdrll_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_dcal_built(c, spin) && c.is_group_solved_for(PieceGroup::CornersU, spin)
}

pub fn is_mehta_jtle_built(c: &Cube, spin: Spin) -> bool {
    is_mehta_apdr_built(c, spin)
}

/// All edges oriented with the down layer and belt solved.
pub fn is_mehta_tdr_built(c: &Cube, spin: Spin) -> bool {
    if !c.check_orientation_for(PieceGroup::AllEdges, spin) {
        return false;
    }
    let v = c.with_spin(spin);
    v.is_layer_solved(Layer::D) && v.is_layer_solved(Layer::E)
}

/// Nautilus second block (2x2x2 bottom back right) over the first block.
pub fn is_nautilus_sb_built(c: &Cube, spin: Spin) -> bool {
    is_roux_fb_built(c, spin) && c.is_group_solved_for(PieceGroup::NautilusSb, spin)
}

/// Nautilus second block square (1x2x2).
pub fn is_nautilus_sbs_built(c: &Cube, spin: Spin) -> bool {
    is_roux_fb_built(c, spin) && c.is_group_solved_for(PieceGroup::NautilusSbSquare, spin)
}

/// Both Nautilus blocks, the F2L pairs, and all corners oriented.
pub fn is_nautilus_ncll_built(c: &Cube, spin: Spin) -> bool {
    is_nautilus_sb_built(c, spin)
        && is_f2l_pairs_built(c, spin)
        && c.check_orientation_for(PieceGroup::AllCorners, spin)
}

/// Both Nautilus blocks with the DF edge solved and all edges oriented.
pub fn is_nautilus_eodf_built(c: &Cube, spin: Spin) -> bool {
    is_nautilus_sb_built(c, spin)
        && c.is_edge_solved_for(Edge::DF, spin)
        && c.check_orientation_for(PieceGroup::AllEdges, spin)
}

// Collection lookups shared by the last-layer stages.

/// Search an orientation collection (OLL, OCLL) for an algorithm that
/// orients the last layer of the given cube, trying y pre-turns.
pub fn orientate_ll(
    algset: &Collection,
    policy: Policy,
    metric: Metrics,
    cube: &Cube,
) -> Option<(Algorithm, String)> {
    for index in 0..algset.cases_number() {
        let alg = algset.algorithm(index, policy, metric);
        for y_turn in Y_TURNS {
            let mut c = *cube;
            if y_turn != Move::N {
                c.apply(y_turn);
            }
            let spin1 = c.spin();
            c.apply_algorithm(&alg);
            let spin2 = c.spin();
            let (s1, s2) = spin2.steps_to(spin1);
            if spin1 != spin2 {
                c.apply(s1);
                c.apply(s2);
            }
            if c.is_layer_solved(Layer::D)
                && c.is_layer_solved(Layer::E)
                && c.is_face_oriented(Layer::U)
            {
                let mut solve = Algorithm::new();
                solve.append_grouped(y_turn);
                solve.append(&alg);
                if spin1.up_layer() != spin2.up_layer() {
                    solve.push(s1);
                    solve.push(s2);
                }
                return Some((solve, algset.case_name(index).to_string()));
            }
        }
    }
    None
}

/// Search a last-layer collection (PLL, ZBLL, EPLL, 1LLL, 2GLL) for an
/// algorithm solving the cube, with pre-adjustment and a final AUF.
/// Returns the solve, the case name and the AUF step.
pub fn solve_ll(
    algset: &Collection,
    policy: Policy,
    metric: Metrics,
    cube: &Cube,
) -> Option<(Algorithm, String, Move)> {
    // 2GLL cases keep the U/R gen so only U adjustments apply; the other
    // sets also angle with y turns.
    let pre_turns: &[Move] = if algset.name() == "2GLL" {
        &U_MOVES
    } else {
        &Y_TURNS
    };
    for index in 0..algset.cases_number() {
        let alg = algset.algorithm(index, policy, metric);
        for &pre in pre_turns {
            for auf in U_MOVES {
                let mut c = *cube;
                if pre != Move::N {
                    c.apply(pre);
                }
                let spin1 = c.spin();
                c.apply_algorithm(&alg);
                let spin2 = c.spin();
                let (s1, s2) = spin2.steps_to(spin1);
                if spin1 != spin2 {
                    c.apply(s1);
                    c.apply(s2);
                }
                if auf != Move::N {
                    c.apply(auf);
                }
                if c.is_solved() {
                    let mut solve = Algorithm::new();
                    solve.append_grouped(pre);
                    solve.append(&alg);
                    if spin1.up_layer() != spin2.up_layer() {
                        solve.push(s1);
                        solve.push(s2);
                    }
                    return Some((solve, algset.case_name(index).to_string(), auf));
                }
            }
        }
    }
    None
}

/// Search a corner collection (CMLL, COLL, NCLL, NCOLL, TNCLL) for an
/// algorithm solving the up-layer corners while keeping the blocks.
pub fn corners_ll(
    algset: &Collection,
    policy: Policy,
    metric: Metrics,
    cube: &Cube,
    edges_oriented: bool,
) -> Option<(Algorithm, String, Move)> {
    for index in 0..algset.cases_number() {
        let alg = algset.algorithm(index, policy, metric);
        for pre in U_MOVES {
            for auf in U_MOVES {
                let mut c = *cube;
                if pre != Move::N {
                    c.apply(pre);
                }
                let spin1 = c.spin();
                c.apply_algorithm(&alg);
                let spin2 = c.spin();
                let (s1, s2) = spin2.steps_to(spin1);
                if spin1 != spin2 {
                    c.apply(s1);
                    c.apply(s2);
                }
                if auf != Move::N {
                    c.apply(auf);
                }
                let mut found = c.is_group_solved(PieceGroup::CornersD)
                    && c.is_layer_solved(Layer::E)
                    && c.is_group_solved(PieceGroup::CornersU)
                    && c.is_edge_solved(Edge::DR)
                    && c.is_edge_solved(Edge::DL);
                if found && edges_oriented {
                    found = c.check_orientation(PieceGroup::CrossU);
                }
                if found {
                    let mut solve = Algorithm::new();
                    solve.append_grouped(pre);
                    solve.append(&alg);
                    if spin1.up_layer() != spin2.up_layer() {
                        solve.push(s1);
                        solve.push(s2);
                    }
                    return Some((solve, algset.case_name(index).to_string(), auf));
                }
            }
        }
    }
    None
}

/// Run a configured search at increasing depths until candidates appear,
/// teacher-style iterative deepening at the driver level: shallow solves
/// are found cheaply and the deep bound is only paid when needed. The
/// closure builds the goal and plan for the requested depth.
pub fn search_to_depth<F>(
    configure: F,
    min_depth: usize,
    max_depth: usize,
    cores: i32,
) -> crate::search::DeepSearch
where
    F: Fn(usize) -> crate::search::DeepSearch,
{
    let min_depth = min_depth.max(4);
    let max_depth = max_depth.max(min_depth);
    let mut depth = min_depth;
    loop {
        let mut ds = configure(depth);
        ds.update_root_data();
        ds.run(cores);
        if !ds.get_solves().is_empty() || ds.check_skip() || depth >= max_depth {
            return ds;
        }
        depth += 1;
    }
}

/// Generic collection lookup with optional U/E pre-adjustments and a final
/// AUF, verified by an arbitrary structural predicate (Mehta/Nautilus
/// style stages).
pub fn lookup_case(
    algset: &Collection,
    policy: Policy,
    metric: Metrics,
    cube: &Cube,
    pre_u: bool,
    pre_e: bool,
    post_u: bool,
    check: &dyn Fn(&Cube) -> bool,
) -> Option<(Algorithm, String)> {
    let pre_us: &[Move] = if pre_u { &U_MOVES } else { &U_MOVES[..1] };
    let pre_es: &[Move] = if pre_e {
        &crate::algorithm::E_MOVES
    } else {
        &crate::algorithm::E_MOVES[..1]
    };
    let post_us: &[Move] = if post_u { &U_MOVES } else { &U_MOVES[..1] };
    for index in 0..algset.cases_number() {
        let alg = algset.algorithm(index, policy, metric);
        for &um in pre_us {
            for &em in pre_es {
                for &auf in post_us {
                    let mut c = *cube;
                    if um != Move::N {
                        c.apply(um);
                    }
                    if em != Move::N {
                        c.apply(em);
                    }
                    c.apply_algorithm(&alg);
                    if em != Move::N {
                        c.apply(em.get_inverse());
                    }
                    if auf != Move::N {
                        c.apply(auf);
                    }
                    if check(&c) {
                        let mut solve = Algorithm::new();
                        solve.append_grouped(um);
                        solve.append_grouped(em);
                        solve.append(&alg);
                        if em != Move::N {
                            solve.append_grouped(em.get_inverse());
                        }
                        solve.append_grouped(auf);
                        return Some((solve, algset.case_name(index).to_string()));
                    }
                }
            }
        }
    }
    None
}

/// Header of an all-spins report line: spin tag, total metric and the
/// optional post-cancellation metric.
pub fn spin_header(
    spin: Spin,
    metric_value: f32,
    cancel_value: Option<f32>,
    metric: Metrics,
    insp: &Algorithm,
) -> String {
    let mut s = format!("[{}|{}", spin, Algorithm::metric_value(metric_value));
    if let Some(cv) = cancel_value {
        s.push_str(&format!("({})", Algorithm::metric_value(cv)));
    }
    s.push_str(&format!(" {}]: ", metric));
    if !insp.is_empty() {
        s.push_str(&format!("({}) ", insp));
    }
    s
}

/// Append one verified stage to a report line. Applies the stage algorithm
/// to the running cube, writes the parenthesised text on success or a
/// diagnostic on failure; returns whether the stage held.
pub fn report_stage(
    line: &mut String,
    cube: &mut Cube,
    alg: &Algorithm,
    label: &str,
    depth: Option<usize>,
    check: &dyn Fn(&Cube) -> bool,
) -> bool {
    cube.apply_algorithm(alg);
    if check(cube) {
        line.push_str(&format!(" ({})", alg));
        true
    } else {
        line.push_str(&format!(" {} not built", label));
        if let Some(d) = depth {
            line.push_str(&format!(" in {} steps", d));
        }
        if !alg.is_empty() {
            line.push_str(&format!(": ({})", alg));
        }
        line.push('\n');
        false
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::collection::CollectionRegistry;
    use crate::moves::Move::*;

    #[test]
    fn test_cross_predicates() {
        let c = Cube::from_moves(&[U]);
        assert!(is_cross_built(&c, Layer::D));
        assert!(!is_cross_built(&c, Layer::U));
        let c = Cube::new();
        for l in [Layer::U, Layer::D, Layer::F, Layer::B, Layer::R, Layer::L] {
            assert!(is_cross_built(&c, l));
            assert!(is_xcross_built(&c, l));
        }
    }

    #[test]
    fn test_roux_predicates() {
        let c = Cube::from_moves(&[R, U, Rw, M2, U2]);
        assert!(is_roux_fb_built(&c, Spin::UF));
        assert!(!is_roux_sb_built(&c, Spin::UF));
        let c = Cube::from_moves(&[M, U, M3, U2]);
        assert!(are_roux_blocks_built(&c, Spin::UF) == (is_roux_sb_built(&c, Spin::UF)));
        // generated fixtures: pinned blocks satisfy the block predicates
        use crate::generator::Generator;
        for _ in 0..5 {
            let c = Cube {
                cc: Generator::solved_groups(&[PieceGroup::RouxFb]),
            };
            assert!(is_roux_fb_built(&c, Spin::UF));
            let c = Cube {
                cc: Generator::solved_groups(&[PieceGroup::RouxFb, PieceGroup::RouxSb]),
            };
            assert!(are_roux_blocks_built(&c, Spin::UF));
        }
    }

    #[test]
    fn test_f2l_predicates_on_generated_states() {
        use crate::generator::Generator;
        for _ in 0..5 {
            let c = Cube {
                cc: Generator::solved_groups(&[PieceGroup::F2l]),
            };
            assert!(is_f2l_built(&c, Spin::UF));
            assert!(is_f2l_pairs_built(&c, Spin::UF));
            assert!(is_cross_built(&c, Layer::D));
        }
    }

    #[test]
    fn test_l6e_orientation() {
        // M U M' U' style moves keep blocks; M flips orientation
        let c = Cube::from_moves(&[M2, U2, M2, U2]);
        assert!(are_roux_blocks_built(&c, Spin::UF));
        assert!(is_roux_l6e_oriented(&c, Spin::UF));
        let c = Cube::from_moves(&[M, U]);
        assert!(!is_roux_l6e_oriented(&c, Spin::UF));
    }

    #[test]
    fn test_eoline_predicates() {
        let c = Cube::new();
        assert!(is_eoline_built(&c, Spin::UF));
        assert!(is_eocross_built(&c, Spin::UF));
        assert!(is_eoarrow_built(&c, Spin::UF));
        assert!(is_xeoline_built(&c, Spin::UF));
        assert!(is_xeocross_built(&c, Spin::UF));
        assert!(is_eo223_built(&c, Spin::UF));
        let c = Cube::from_moves(&[F]);
        assert!(!is_eoline_built(&c, Spin::UF));
        // an L turn keeps the line but breaks the bottom-left extensions
        let c = Cube::from_moves(&[L]);
        assert!(is_eoline_built(&c, Spin::UF));
        assert!(!is_xeoline_built(&c, Spin::UF));
        assert!(!is_eo223_built(&c, Spin::UF));
        // U turns disturb neither the line nor the orientation
        let c = Cube::from_moves(&[U, R2, U3]);
        assert!(c.check_orientation(PieceGroup::AllEdges));
    }

    #[test]
    fn test_xcross_and_square_predicates() {
        let c = Cube::new();
        for l in [Layer::U, Layer::D, Layer::F] {
            assert!(is_xcross_built(&c, l));
        }
        assert!(is_roux_fb_square_built(&c, Spin::UF));
        // pulling one pair out keeps the cross and the other pairs
        let c = Cube::from_moves(&[R, U, R3, U]);
        assert!(is_cross_built(&c, Layer::D));
        assert!(is_xcross_built(&c, Layer::D));
        // the first block square survives r/M turns that break the front pair
        let c = Cube::from_moves(&[Rw, U, Rw3]);
        assert!(is_roux_fb_square_built(&c, Spin::UF));
    }

    #[test]
    fn test_nautilus_ncll_predicate() {
        let c = Cube::new();
        assert!(is_nautilus_ncll_built(&c, Spin::UF));
        // a U turn keeps corners oriented but the predicate needs the pairs
        let c = Cube::from_moves(&[R, U, R3]);
        assert!(!is_nautilus_ncll_built(&c, Spin::UF));
    }

    #[test]
    fn test_yruru_cp_solved_cube() {
        let c = Cube::new();
        for s in [Spin::UF, Spin::UB, Spin::DR, Spin::FD] {
            assert!(is_yruru_line_built(&c, s));
            assert!(is_yruru_cp_built(&c, s));
        }
        // a U turn keeps the line but permutes the thread; after U2 the
        // corners form a 2-2 swap which is not 2-gen reducible for UF
        let c = Cube::from_moves(&[R, U, R3, U3]);
        assert!(is_yruru_line_built(&c, Spin::UF));
    }

    #[test]
    fn test_mehta_predicates() {
        let c = Cube::new();
        for s in ALL_SPINS {
            assert!(is_mehta_fb_built(&c, s));
            assert!(is_mehta_3qb_built(&c, s));
            assert!(is_mehta_eole_built(&c, s));
            assert!(is_mehta_6cp_built(&c, s));
            assert!(is_mehta_tdr_built(&c, s));
        }
        // one belt edge misplaced still counts as 3QB
        let c = Cube::from_moves(&[U]);
        assert!(is_mehta_3qb_built(&c, Spin::UF));
    }

    #[test]
    fn test_nautilus_predicates() {
        let c = Cube::new();
        assert!(is_nautilus_sb_built(&c, Spin::UF));
        assert!(is_nautilus_sbs_built(&c, Spin::UF));
        assert!(is_nautilus_ncll_built(&c, Spin::UF));
        assert!(is_nautilus_eodf_built(&c, Spin::UF));
        let c = Cube::from_moves(&[R]);
        assert!(!is_nautilus_sb_built(&c, Spin::UF));
    }

    #[test]
    fn test_solve_ll_with_pll() {
        let reg = CollectionRegistry::builtin();
        // T perm away from solved
        let scramble = Algorithm::from_str("R U R' U' R' F R2 U' R' U' R U R' F'").unwrap();
        let cube = Cube::from_algorithm(&scramble);
        let (solve, case, auf) =
            solve_ll(&reg.pll, Policy::First, Metrics::HTM, &cube).expect("pll found");
        let mut c = cube;
        c.apply_algorithm(&solve);
        if auf != Move::N {
            c.apply(auf);
        }
        assert!(c.is_solved());
        assert!(!case.is_empty());
    }

    #[test]
    fn test_solve_ll_solved_cube_uses_skip() {
        let reg = CollectionRegistry::builtin();
        let cube = Cube::new();
        let (solve, case, auf) =
            solve_ll(&reg.pll, Policy::First, Metrics::HTM, &cube).expect("skip case");
        assert!(solve.is_empty());
        assert_eq!(auf, Move::N);
        assert_eq!(case, "Skip");
    }

    #[test]
    fn test_orientate_ll_with_oll() {
        let reg = CollectionRegistry::builtin();
        // an OLL case away from solved: invert a known OLL algorithm
        let alg = Algorithm::from_str("F R U R' U' F'").unwrap();
        let cube = Cube::from_algorithm(&alg.inverted());
        let (solve, _case) =
            orientate_ll(&reg.oll, Policy::First, Metrics::HTM, &cube).expect("oll found");
        let mut c = cube;
        c.apply_algorithm(&solve);
        assert!(c.is_face_oriented(Layer::U));
    }

    #[test]
    fn test_evaluate_first_stage_sets_inspections() {
        let scramble = Algorithm::from_str("R U R'").unwrap();
        let mut data = MethodData::new(&scramble, -1);
        data.set_search_spins(&[Spin::UF, Spin::DF]);
        let mut store = spin_vec();
        let solves = vec![Algorithm::new()];
        data.evaluate_first_stage(&mut store, &solves, 1, Policy::Best, |s| {
            crate::evaluator::StageKind::RouxFirstBlock(s)
        });
        // the empty candidate solves the reference-spin first block
        assert_eq!(store[Spin::UF.index()].len(), 1);
        assert_eq!(data.inspections[Spin::UF.index()].len(), 1);
        assert!(data.inspections[Spin::UF.index()][0].is_empty());
    }
}

//! # LBL
//! Beginner layer-by-layer: a cross search followed by fixed-algorithm
//! passes (corner insertion, second-layer edges, last-layer orientation and
//! permutation). Every candidate application is verified on the cube, so
//! the passes either make checked progress or give up; there is no deep
//! search beyond the cross.

use std::str::FromStr;
use std::time::Instant;

use crate::algorithm::{Algorithm, U_MOVES};
use crate::cube::Cube;
use crate::cubie::{Corner, Edge};
use crate::moves::Move;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Layer, Spin};

use super::{is_cross_built, Method, MethodData};

const F2L_SLOTS: [Corner; 4] = [Corner::DFR, Corner::DLF, Corner::DBL, Corner::DRB];
const SL_EDGES: [Edge; 4] = [Edge::FR, Edge::FL, Edge::BL, Edge::BR];

/// Solver for the beginner layer-by-layer method.
pub struct Lbl {
    data: MethodData,
    spin: Spin,
    cross_layer: Layer,
    alg_cross: Algorithm,
    alg_fl: Algorithm,
    alg_sl: Algorithm,
    alg_ll_eo: Algorithm,
    alg_ll_ep: Algorithm,
    alg_ll_cp: Algorithm,
    alg_ll_co: Algorithm,
    depth_cross: usize,
    time_total: f64,
}

impl Lbl {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        let mut solver = Lbl {
            data: MethodData::new(scramble, cores),
            spin: Spin::UF,
            cross_layer: Layer::D,
            alg_cross: Algorithm::new(),
            alg_fl: Algorithm::new(),
            alg_sl: Algorithm::new(),
            alg_ll_eo: Algorithm::new(),
            alg_ll_ep: Algorithm::new(),
            alg_ll_cp: Algorithm::new(),
            alg_ll_co: Algorithm::new(),
            depth_cross: 0,
            time_total: 0.0,
        };
        solver.set_cross_layer(Layer::D);
        solver
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    pub fn set_cross_layer(&mut self, layer: Layer) {
        self.cross_layer = layer;
        self.spin = Spin::for_cross_layer(layer);
        self.data.set_search_spins(&[self.spin]);
    }

    pub fn cross_layer(&self) -> Layer {
        self.cross_layer
    }

    /// Cross search. Returns false when no cross was found.
    pub fn search_fl_cross(&mut self, max_depth: usize) -> bool {
        let start = Instant::now();
        self.depth_cross = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        ds.add_to_mandatory_pieces(PieceGroup::CrossD, self.spin);
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_cross {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let sp = self.spin.index();
        self.data.inspections[sp].clear();
        if let Some(mut best) = ds.evaluate_shortest(self.data.metric) {
            let (t1, t2) = self.data.cube_base.spin().steps_to(self.spin);
            let mut insp = Algorithm::new();
            insp.push(t1);
            insp.push(t2);
            if t1 != Move::N {
                best.transform_turn(t1);
            }
            if t2 != Move::N {
                best.transform_turn(t2);
            }
            self.data.inspections[sp].push(insp);
            self.alg_cross = best;
            self.time_total += start.elapsed().as_secs_f64();
            true
        } else {
            self.time_total += start.elapsed().as_secs_f64();
            false
        }
    }

    fn cube_after(&self, stages: &[&Algorithm]) -> Cube {
        let sp = self.spin.index();
        let mut seq = self.data.scramble.clone();
        if let Some(insp) = self.data.inspections[sp].first() {
            seq.append(insp);
        }
        for s in stages {
            seq.append(s);
        }
        Cube::from_algorithm(&seq)
    }

    fn solved_fl_corners(cube: &Cube) -> usize {
        F2L_SLOTS.iter().filter(|&&q| cube.is_corner_solved(q)).count()
    }

    fn solved_sl_edges(cube: &Cube) -> usize {
        SL_EDGES.iter().filter(|&&q| cube.is_edge_solved(q)).count()
    }

    /// Insert the first-layer corners with repeated sexy moves.
    pub fn search_fl_corners(&mut self) {
        let start = Instant::now();
        // one insertion trigger per slot, the DFR one rotated around
        let base = Algorithm::from_str("R U R' U'").unwrap();
        let mut slot_algs: Vec<Algorithm> = Vec::new();
        for rot in [Move::N, Move::y, Move::y2, Move::y3] {
            let mut alg = base.clone();
            if rot != Move::N {
                alg.transform_turn(rot);
            }
            slot_algs.push(alg);
        }

        let mut total = Algorithm::new();
        for _ in 0..12 {
            let cube = self.cube_after(&[&self.alg_cross, &total]);
            if !is_cross_built(&cube, self.cross_layer) {
                break;
            }
            let solved = Lbl::solved_fl_corners(&cube);
            if solved == 4 {
                break;
            }
            let mut improved = false;
            'tries: for auf in U_MOVES {
                for slot in &slot_algs {
                    for reps in 1..=6 {
                        let mut candidate = Algorithm::new();
                        candidate.push(auf);
                        for _ in 0..reps {
                            candidate.append(slot);
                        }
                        let mut c = cube;
                        c.apply_algorithm(&candidate);
                        if is_cross_built(&c, self.cross_layer)
                            && Lbl::solved_fl_corners(&c) > solved
                        {
                            total.append(&candidate);
                            improved = true;
                            break 'tries;
                        }
                    }
                }
            }
            if !improved {
                break;
            }
        }
        self.alg_fl = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    /// Insert the second-layer edges with the classic left/right triggers.
    pub fn search_sl_edges(&mut self) {
        let start = Instant::now();
        let right = Algorithm::from_str("U R U' R' U' F' U F").unwrap();
        let left = Algorithm::from_str("U' L' U L U F U' F'").unwrap();
        let mut inserts: Vec<Algorithm> = Vec::new();
        for rot in [Move::N, Move::y, Move::y2, Move::y3] {
            for base in [&right, &left] {
                let mut alg = base.clone();
                if rot != Move::N {
                    alg.transform_turn(rot);
                }
                inserts.push(alg);
            }
        }

        let mut total = Algorithm::new();
        for _ in 0..12 {
            let cube = self.cube_after(&[&self.alg_cross, &self.alg_fl, &total]);
            if !cube.is_layer_solved(Layer::D) {
                break;
            }
            let solved = Lbl::solved_sl_edges(&cube);
            if solved == 4 {
                break;
            }
            let mut improved = false;
            'tries: for auf in U_MOVES {
                for insert in &inserts {
                    let mut candidate = Algorithm::new();
                    candidate.push(auf);
                    candidate.append(insert);
                    let mut c = cube;
                    c.apply_algorithm(&candidate);
                    if c.is_layer_solved(Layer::D) && Lbl::solved_sl_edges(&c) > solved {
                        total.append(&candidate);
                        improved = true;
                        break 'tries;
                    }
                }
                // no direct insert: pop a misplaced edge out of a slot first
                for insert in &inserts {
                    let mut c = cube;
                    c.apply_algorithm(insert);
                    if c.is_layer_solved(Layer::D) && Lbl::solved_sl_edges(&c) >= solved {
                        total.append(insert);
                        improved = true;
                        break 'tries;
                    }
                }
            }
            if !improved {
                break;
            }
        }
        self.alg_sl = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    /// Orient the last-layer edges (top cross).
    pub fn search_ll_cross1(&mut self) {
        let start = Instant::now();
        let trigger = Algorithm::from_str("F R U R' U' F'").unwrap();
        let mut total = Algorithm::new();
        for _ in 0..4 {
            let cube = self.cube_after(&[
                &self.alg_cross,
                &self.alg_fl,
                &self.alg_sl,
                &total,
            ]);
            if cube.check_orientation(PieceGroup::CrossU) {
                break;
            }
            let mut improved = false;
            for auf in U_MOVES {
                let mut candidate = Algorithm::new();
                candidate.push(auf);
                candidate.append(&trigger);
                let mut c = cube;
                c.apply_algorithm(&candidate);
                let before = oriented_up_edges(&cube);
                if c.is_layer_solved(Layer::D)
                    && c.is_layer_solved(Layer::E)
                    && oriented_up_edges(&c) > before
                {
                    total.append(&candidate);
                    improved = true;
                    break;
                }
            }
            if !improved {
                break;
            }
        }
        self.alg_ll_eo = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    /// Permute the last-layer edges with sune applications.
    pub fn search_ll_cross2(&mut self) {
        let start = Instant::now();
        let sune = Algorithm::from_str("R U R' U R U2 R'").unwrap();
        let mut total = Algorithm::new();
        for _ in 0..6 {
            let cube = self.cube_after(&[
                &self.alg_cross,
                &self.alg_fl,
                &self.alg_sl,
                &self.alg_ll_eo,
                &total,
            ]);
            if cube.is_group_solved(PieceGroup::CrossU) {
                break;
            }
            let mut improved = false;
            for auf in U_MOVES {
                for post in U_MOVES {
                    let mut candidate = Algorithm::new();
                    candidate.push(auf);
                    candidate.append(&sune);
                    candidate.push(post);
                    let mut c = cube;
                    c.apply_algorithm(&candidate);
                    if c.is_layer_solved(Layer::D)
                        && c.is_layer_solved(Layer::E)
                        && c.is_group_solved(PieceGroup::CrossU)
                    {
                        total.append(&candidate);
                        improved = true;
                        break;
                    }
                }
                if improved {
                    break;
                }
            }
            if !improved {
                // one sune with the best AUF keeps the walk going
                let mut candidate = Algorithm::new();
                candidate.append(&sune);
                let mut c = cube;
                c.apply_algorithm(&candidate);
                if c.is_layer_solved(Layer::D) && c.is_layer_solved(Layer::E) {
                    total.append(&candidate);
                } else {
                    break;
                }
            }
        }
        self.alg_ll_ep = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    /// Place the last-layer corners with the Niklas commutator.
    pub fn search_ll_corners1(&mut self) {
        let start = Instant::now();
        let niklas = Algorithm::from_str("U R U' L' U R' U' L").unwrap();
        let mut total = Algorithm::new();
        for _ in 0..6 {
            let cube = self.cube_after(&[
                &self.alg_cross,
                &self.alg_fl,
                &self.alg_sl,
                &self.alg_ll_eo,
                &self.alg_ll_ep,
                &total,
            ]);
            if cube.positions_match(PieceGroup::CornersU) {
                break;
            }
            let mut improved = false;
            for auf in U_MOVES {
                for post in U_MOVES {
                    let mut candidate = Algorithm::new();
                    candidate.push(auf);
                    candidate.append(&niklas);
                    candidate.push(post);
                    let mut c = cube;
                    c.apply_algorithm(&candidate);
                    if c.is_layer_solved(Layer::D)
                        && c.is_layer_solved(Layer::E)
                        && c.is_group_solved(PieceGroup::CrossU)
                        && c.positions_match(PieceGroup::CornersU)
                    {
                        total.append(&candidate);
                        improved = true;
                        break;
                    }
                }
                if improved {
                    break;
                }
            }
            if !improved {
                let mut c = cube;
                c.apply_algorithm(&niklas);
                if c.is_layer_solved(Layer::D)
                    && c.is_layer_solved(Layer::E)
                    && c.is_group_solved(PieceGroup::CrossU)
                {
                    total.append(&niklas);
                } else {
                    break;
                }
            }
        }
        self.alg_ll_cp = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    /// Twist the placed corners one by one with R' D' R D pairs.
    pub fn search_ll_corners2(&mut self) {
        let start = Instant::now();
        let twist = Algorithm::from_str("R' D' R D").unwrap();
        let mut total = Algorithm::new();
        let mut cube = self.cube_after(&[
            &self.alg_cross,
            &self.alg_fl,
            &self.alg_sl,
            &self.alg_ll_eo,
            &self.alg_ll_ep,
            &self.alg_ll_cp,
        ]);
        for _ in 0..4 {
            if cube.is_solved() {
                break;
            }
            let mut twisted = 0;
            while !cube.is_corner_solved(Corner::URF) && twisted < 3 {
                for _ in 0..2 {
                    cube.apply_algorithm(&twist);
                    total.append(&twist);
                }
                twisted += 1;
            }
            cube.apply(Move::U);
            total.push(Move::U);
        }
        // final up-layer adjustment
        for auf in U_MOVES {
            let mut c = cube;
            if auf != Move::N {
                c.apply(auf);
            }
            if c.is_solved() {
                total.push(auf);
                break;
            }
        }
        self.alg_ll_co = total;
        self.time_total += start.elapsed().as_secs_f64();
    }

    pub fn get_cross_layer_text(&self) -> String {
        format!("{}", self.cross_layer)
    }
}

fn oriented_up_edges(cube: &Cube) -> usize {
    Cube::layer_edges(Layer::U)
        .iter()
        .filter(|&&q| {
            cube.edge_sticker(q, 0) == cube.cc.center[0]
        })
        .count()
}

impl Method for Lbl {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let layer = self.cross_layer;
        *self = Lbl::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.set_cross_layer(layer);
    }

    fn set_regrips(&mut self) {
        self.alg_cross = self.alg_cross.regrip();
    }

    fn get_report(&self, _cancellations: bool, debug: bool) -> String {
        let spin = self.spin;
        if !self.check_solve_consistency(spin) {
            return if debug {
                format!("Cross not built in {} steps\n", self.depth_cross)
            } else {
                String::new()
            };
        }
        let mut report = String::new();
        let insp = &self.data.inspections[spin.index()][0];
        if !insp.is_empty() {
            report.push_str(&format!("{} // Inspection [{}]\n", insp, spin));
        }
        let metric = self.data.metric;
        let mut push_stage = |alg: &Algorithm, label: &str| {
            if !alg.is_empty() {
                report.push_str(&format!(
                    "{} // {} ({})\n",
                    alg,
                    label,
                    Algorithm::metric_value(alg.metric(metric))
                ));
            }
        };
        push_stage(&self.alg_cross, "Cross");
        push_stage(&self.alg_fl, "First layer corners");
        push_stage(&self.alg_sl, "Second layer edges");
        push_stage(&self.alg_ll_eo, "Top cross");
        push_stage(&self.alg_ll_ep, "Top cross permutation");
        push_stage(&self.alg_ll_cp, "Corner permutation");
        push_stage(&self.alg_ll_co, "Corner orientation");
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, 0)),
            self.data.metric
        ));
        report
    }

    fn get_spin_report(&self, _spin: Spin, _n: usize) -> String {
        self.get_report(false, false)
    }

    fn get_time_report(&self) -> String {
        format!("Total time: {:.3} s\n", self.time_total)
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        if spin != self.spin || n != 0 || !self.check_solve_consistency(spin) {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[spin.index()][0].clone();
        a.append(&self.alg_cross);
        a.append(&self.alg_fl);
        a.append(&self.alg_sl);
        a.append(&self.alg_ll_eo);
        a.append(&self.alg_ll_ep);
        a.append(&self.alg_ll_cp);
        a.append(&self.alg_ll_co);
        a
    }

    fn check_solve_consistency(&self, spin: Spin) -> bool {
        spin == self.spin && !self.data.inspections[spin.index()].is_empty()
    }

    fn data(&self) -> &MethodData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lbl_empty_scramble() {
        let scramble = Algorithm::new();
        let mut lbl = Lbl::new(&scramble, -1);
        assert!(lbl.search_fl_cross(5));
        lbl.search_fl_corners();
        lbl.search_sl_edges();
        lbl.search_ll_cross1();
        lbl.search_ll_cross2();
        lbl.search_ll_corners1();
        lbl.search_ll_corners2();
        assert!(lbl.is_solved(Spin::UF, 0));
    }

    #[test]
    fn test_lbl_sexy_scramble() {
        // two sexy moves scramble only the top layers
        let scramble = Algorithm::from_str("R U R' U' R U R' U'").unwrap();
        let mut lbl = Lbl::new(&scramble, -1);
        if !lbl.search_fl_cross(6) {
            return;
        }
        lbl.search_fl_corners();
        lbl.search_sl_edges();
        lbl.search_ll_cross1();
        lbl.search_ll_cross2();
        lbl.search_ll_corners1();
        lbl.search_ll_corners2();
        if lbl.is_solved(Spin::UF, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&lbl.get_full_solve(Spin::UF, 0));
            assert!(cube.is_solved());
        }
    }
}

//! # Roux
//! `Roux` builds two 1x2x3 blocks on the left and right, solves the last
//! layer corners with CMLL (or COLL), and finishes the last six edges with
//! M and U turns only. The second block is searched square-first, and the
//! last six edges either in one deep search or staged (orientation, UL/UR,
//! the rest).

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::evaluator::StageKind;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    are_roux_blocks_built, corners_ll, is_cmll_built, is_roux_fb_and_sb_square_built,
    is_roux_fb_built, is_roux_l6e_o2e, is_roux_l6e_oriented, is_roux_sb_built, report_stage,
    search_to_depth, spin_header, spin_names, spin_vec, Method, MethodData, SpinNames, SpinVec,
};

/// Spin with the same up face whose front axis is the right/left axis of
/// `s`; orientation checks against it measure the M-slice edge orientation
/// used by the last six edges.
fn eo_spin(s: Spin) -> Spin {
    let up = s.up_color();
    let right = crate::spin::rotated_solved(s).center[1];
    *ALL_SPINS
        .iter()
        .find(|c| c.up_color() == up && c.front_color() == right)
        .expect("every up/right pair names a spin")
}

/// Solver for the Roux method.
pub struct Roux {
    data: MethodData,
    alg_fb: SpinVec,
    alg_sb1: SpinVec,
    alg_sb2: SpinVec,
    alg_cmll: SpinVec,
    cases_cmll: SpinNames,
    alg_coll: SpinVec,
    cases_coll: SpinNames,
    alg_l6e_o: SpinVec,
    alg_l6e_2e: SpinVec,
    alg_l6e: SpinVec,
    depth_fb: usize,
    depth_sb: usize,
    time_fb: f64,
    time_sb: f64,
    time_cmll: f64,
    time_l6e: f64,
}

impl Roux {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Roux {
            data: MethodData::new(scramble, cores),
            alg_fb: spin_vec(),
            alg_sb1: spin_vec(),
            alg_sb2: spin_vec(),
            alg_cmll: spin_vec(),
            cases_cmll: spin_names(),
            alg_coll: spin_vec(),
            cases_coll: spin_names(),
            alg_l6e_o: spin_vec(),
            alg_l6e_2e: spin_vec(),
            alg_l6e: spin_vec(),
            depth_fb: 0,
            depth_sb: 0,
            time_fb: 0.0,
            time_sb: 0.0,
            time_cmll: 0.0,
            time_l6e: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    /// First block search over every allowed orientation. Returns false
    /// when no block was found.
    pub fn search_first_block(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_fb = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        for s in ALL_SPINS {
            ds.add_to_optional_pieces(PieceGroup::RouxFb, s);
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_fb {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let found = !ds.get_solves().is_empty();
        self.evaluate_first_block(ds.get_solves(), max_solves);
        self.time_fb = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_first_block(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_fb,
            solves,
            max_solves,
            Policy::Best,
            StageKind::RouxFirstBlock,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_fb = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_fb = d;
    }

    /// Build one square of the second block.
    pub fn search_second_blocks_first_square(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_sb = max_depth.max(4);
        let mut skip = false;

        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_sb1[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_sb1[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin) {
                    continue;
                }
                if is_roux_fb_and_sb_square_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_sb;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_optional_pieces(PieceGroup::RouxSbSquareFront, spin);
                        ds.add_to_optional_pieces(PieceGroup::RouxSbSquareBack, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::BlockRUrM),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::BlockRUrM),
                            ));
                        }
                        ds
                    },
                    4,
                    max,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_sb1[sp][n] = best;
                }
            }
        }
        self.time_sb += start.elapsed().as_secs_f64();
    }

    /// Complete the second block.
    pub fn search_second_blocks_second_square(&mut self, max_depth: usize) {
        let start = Instant::now();
        let mut skip = false;

        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_sb2[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_sb2[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb, &self.alg_sb1]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_and_sb_square_built(&cube, spin) {
                    continue;
                }
                if is_roux_sb_built(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::RouxSb, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::BlockRUrM),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::BlockRUrM),
                            ));
                        }
                        ds
                    },
                    4,
                    max_depth.max(4),
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_sb2[sp][n] = best;
                }
            }
        }
        self.time_sb += start.elapsed().as_secs_f64();
    }

    /// Solve the last layer corners from the CMLL collection.
    pub fn search_cmll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_corners(&registry.cmll, policy, false);
        self.time_cmll += start.elapsed().as_secs_f64();
    }

    /// COLL variant: corners solved preserving edge orientation.
    pub fn search_coll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_corners(&registry.coll, policy, true);
        self.time_cmll += start.elapsed().as_secs_f64();
    }

    fn lookup_corners(
        &mut self,
        algset: &crate::collection::Collection,
        policy: Policy,
        edges_oriented: bool,
    ) {
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let seq = self
                    .data
                    .stage_start(spin, n, &[&self.alg_fb, &self.alg_sb1, &self.alg_sb2]);
                let cube = Cube::from_algorithm(&seq);
                if !are_roux_blocks_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    corners_ll(algset, policy, self.data.metric, &cube, edges_oriented)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            if edges_oriented {
                self.alg_coll[sp] = algs;
                self.cases_coll[sp] = cases;
            } else {
                self.alg_cmll[sp] = algs;
                self.cases_cmll[sp] = cases;
            }
        }
    }

    /// Orient the last six edges (M/U turns only).
    pub fn search_l6e_orient(&mut self, max_depth: usize) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_l6e_o[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_l6e_o[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.l6e_start(spin, n, &[]);
                let cube = Cube::from_algorithm(&seq);
                if !are_roux_blocks_built(&cube, spin) || is_roux_l6e_oriented(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::RouxSb, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, eo_spin(spin));
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::SliceMU),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::SliceMU),
                            ));
                        }
                        ds
                    },
                    4,
                    max_depth.max(4),
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_l6e_o[sp][n] = best;
                }
            }
        }
        self.time_l6e += start.elapsed().as_secs_f64();
    }

    /// Solve UL and UR preserving the orientation.
    pub fn search_l6e_2e(&mut self, max_depth: usize) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_l6e_2e[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_l6e_2e[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.l6e_start(spin, n, &[&self.alg_l6e_o]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_l6e_oriented(&cube, spin) || is_roux_l6e_o2e(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::RouxSb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::EdgesUlUr, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, eo_spin(spin));
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::SliceMU),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::SliceMU),
                            ));
                        }
                        ds
                    },
                    4,
                    max_depth.max(4),
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_l6e_2e[sp][n] = best;
                }
            }
        }
        self.time_l6e += start.elapsed().as_secs_f64();
    }

    /// Finish the last six edges.
    pub fn search_l6e(&mut self, max_depth: usize) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_l6e[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_l6e[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.l6e_start(spin, n, &[&self.alg_l6e_o, &self.alg_l6e_2e]);
                let cube = Cube::from_algorithm(&seq);
                if !are_roux_blocks_built(&cube, spin) || cube.is_solved() {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::All, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::SliceMU),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::SliceMU),
                            ));
                        }
                        ds
                    },
                    4,
                    max_depth.max(4),
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_l6e[sp][n] = best;
                }
            }
        }
        self.time_l6e += start.elapsed().as_secs_f64();
    }

    fn corners_alg(&self, sp: usize, n: usize) -> &Algorithm {
        if !self.alg_coll[sp].is_empty() {
            &self.alg_coll[sp][n]
        } else {
            &self.alg_cmll[sp][n]
        }
    }

    fn l6e_start(&self, spin: Spin, n: usize, extra: &[&SpinVec]) -> Algorithm {
        let sp = spin.index();
        let mut seq = self.data.scramble.clone();
        seq.append(&self.data.inspections[sp][n]);
        seq.append(&self.alg_fb[sp][n]);
        seq.append(&self.alg_sb1[sp][n]);
        seq.append(&self.alg_sb2[sp][n]);
        seq.append(self.corners_alg(sp, n));
        for stage in extra {
            if let Some(a) = stage[sp].get(n) {
                seq.append(a);
            }
        }
        seq
    }
}

impl Method for Roux {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Roux::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.data.set_search_spins(&spins);
    }

    fn set_regrips(&mut self) {
        let mut fb = std::mem::replace(&mut self.alg_fb, spin_vec());
        self.data.regrip_first_stage(&mut fb);
        self.alg_fb = fb;
    }

    fn get_report(&self, cancellations: bool, debug: bool) -> String {
        let mut report = String::new();
        for &spin in &self.data.search_spins {
            let sp = spin.index();
            if !self.check_solve_consistency(spin) {
                continue;
            }
            for n in 0..self.data.inspections[sp].len() {
                let cancel_value = cancellations.then(|| self.get_metric_cancellations(spin, n));
                let mut line = spin_header(
                    spin,
                    self.get_metric_solve(spin, n),
                    cancel_value,
                    self.data.metric,
                    &self.data.inspections[sp][n],
                );
                let mut cube = self.data.cube_base;
                cube.apply_algorithm(&self.data.inspections[sp][n]);
                let mut ok = report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_fb[sp][n],
                    "First block",
                    Some(self.depth_fb),
                    &|c| is_roux_fb_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_sb1[sp][n],
                    "Second block square",
                    Some(self.depth_sb),
                    &|c| is_roux_fb_and_sb_square_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_sb2[sp][n],
                    "Second block",
                    Some(self.depth_sb),
                    &|c| is_roux_sb_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    self.corners_alg(sp, n),
                    "CMLL",
                    None,
                    &|c| is_cmll_built(c, spin),
                );
                if ok && !self.alg_l6e_o[sp].is_empty() {
                    ok = report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_l6e_o[sp][n],
                        "L6E orientation",
                        None,
                        &|c| is_roux_l6e_oriented(c, spin),
                    ) && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_l6e_2e[sp][n],
                        "UL/UR",
                        None,
                        &|c| is_roux_l6e_o2e(c, spin),
                    );
                }
                ok = ok
                    && report_stage(&mut line, &mut cube, &self.alg_l6e[sp][n], "L6E", None, &|c| {
                        c.is_solved()
                    });
                if ok {
                    line.push('\n');
                    report.push_str(&line);
                } else if debug {
                    report.push_str(&line);
                }
            }
        }
        report
    }

    fn get_spin_report(&self, spin: Spin, n: usize) -> String {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || self.data.inspections[sp].len() <= n {
            return format!("No solve for spin {}, position {}\n", spin, n);
        }
        let mut report = String::new();
        let mut cube = self.data.cube_base;
        cube.apply_algorithm(&self.data.inspections[sp][n]);
        if !self.data.inspections[sp][n].is_empty() {
            report.push_str(&format!(
                "{} // Inspection [{}]\n",
                self.data.inspections[sp][n],
                cube.spin()
            ));
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
        push_stage(&self.alg_fb[sp][n], "First block");
        push_stage(&self.alg_sb1[sp][n], "Second block square");
        push_stage(&self.alg_sb2[sp][n], "Second block");
        if !self.alg_coll[sp].is_empty() {
            push_stage(&self.alg_coll[sp][n], "COLL");
        } else {
            push_stage(&self.alg_cmll[sp][n], "CMLL");
        }
        if !self.alg_l6e_o[sp].is_empty() {
            push_stage(&self.alg_l6e_o[sp][n], "L6E orientation");
            push_stage(&self.alg_l6e_2e[sp][n], "UL/UR edges");
        }
        push_stage(&self.alg_l6e[sp][n], "L6E");
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        if !self.alg_coll[sp].is_empty() {
            report.push_str(&format!("COLL case: {}\n", self.cases_coll[sp][n]));
        } else {
            report.push_str(&format!("CMLL case: {}\n", self.cases_cmll[sp][n]));
        }
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_fb + self.time_sb + self.time_cmll + self.time_l6e;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("First blocks time: {:.3} s\n", self.time_fb));
        report.push_str(&format!("Second blocks time: {:.3} s\n", self.time_sb));
        report.push_str(&format!("CMLL time: {:.3} s\n", self.time_cmll));
        report.push_str(&format!("L6E time: {:.3} s\n", self.time_l6e));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        a.append(&self.alg_fb[sp][n]);
        a.append(&self.alg_sb1[sp][n]);
        a.append(&self.alg_sb2[sp][n]);
        a.append(self.corners_alg(sp, n));
        if !self.alg_l6e_o[sp].is_empty() {
            a.append(&self.alg_l6e_o[sp][n]);
            a.append(&self.alg_l6e_2e[sp][n]);
        }
        a.append(&self.alg_l6e[sp][n]);
        a
    }

    fn check_solve_consistency(&self, spin: Spin) -> bool {
        let sp = spin.index();
        let n = self.data.inspections[sp].len();
        if n == 0 {
            return false;
        }
        let corners_ok = self.alg_cmll[sp].len() == n || self.alg_coll[sp].len() == n;
        let staged_ok = (self.alg_l6e_o[sp].is_empty() && self.alg_l6e_2e[sp].is_empty())
            || (self.alg_l6e_o[sp].len() == n && self.alg_l6e_2e[sp].len() == n);
        self.alg_fb[sp].len() == n
            && self.alg_sb1[sp].len() == n
            && self.alg_sb2[sp].len() == n
            && corners_ok
            && staged_ok
            && self.alg_l6e[sp].len() == n
    }

    fn data(&self) -> &MethodData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::collection::CollectionRegistry;

    #[test]
    fn test_eo_spin() {
        assert_eq!(eo_spin(Spin::UF), Spin::UR);
        assert_eq!(eo_spin(Spin::DF), Spin::DL);
    }

    #[test]
    fn test_roux_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut roux = Roux::new(&scramble, -1);
        roux.data_mut().set_search_spins(&[Spin::UF]);
        assert!(roux.search_first_block(6, 1));
        roux.search_second_blocks_first_square(6);
        roux.search_second_blocks_second_square(4);
        roux.search_cmll(&registry, Policy::First);
        roux.search_l6e(8);
        assert!(roux.check_solve_consistency(Spin::UF));
        assert!(roux.is_solved(Spin::UF, 0));
        assert_eq!(roux.get_full_solve(Spin::UF, 0).num_steps(), 0);
    }

    #[test]
    fn test_roux_short_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::from_str("R2 U M'").unwrap();
        let mut roux = Roux::new(&scramble, -1);
        roux.data_mut().set_search_spins(&[Spin::UF]);
        if !roux.search_first_block(6, 1) {
            return;
        }
        roux.search_second_blocks_first_square(6);
        roux.search_second_blocks_second_square(5);
        roux.search_cmll(&registry, Policy::First);
        roux.search_l6e_orient(8);
        roux.search_l6e_2e(9);
        roux.search_l6e(10);
        if roux.check_solve_consistency(Spin::UF) && roux.is_solved(Spin::UF, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&roux.get_full_solve(Spin::UF, 0));
            assert!(cube.is_solved());
            let report = roux.get_report(false, false);
            assert!(report.contains("[UF|"));
        }
    }
}

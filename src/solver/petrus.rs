//! # Petrus
//! `Petrus` starts from a 2x2x2 block, expands it to 2x2x3, orients the
//! remaining edges, finishes the first two layers without breaking the
//! orientation and ends with ZBLL (or a two-look last layer).

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::evaluator::StageKind;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    corners_ll, is_cmll_built, is_f2l_built, is_last_layer_oriented, is_petrus_block_built,
    is_petrus_expanded_built, orientate_ll, report_stage, search_to_depth, solve_ll, spin_header,
    spin_names, spin_vec, Method, MethodData, SpinNames, SpinVec,
};

/// Solver for the Petrus method.
pub struct Petrus {
    data: MethodData,
    alg_block: SpinVec,
    alg_eb: SpinVec,
    alg_eo: SpinVec,
    alg_f2l: SpinVec,
    alg_zbll: SpinVec,
    cases_zbll: SpinNames,
    alg_ocll: SpinVec,
    cases_ocll: SpinNames,
    alg_pll: SpinVec,
    cases_pll: SpinNames,
    alg_coll: SpinVec,
    cases_coll: SpinNames,
    alg_epll: SpinVec,
    cases_epll: SpinNames,
    depth_block: usize,
    depth_f2l: usize,
    time_block: f64,
    time_eb: f64,
    time_eo: f64,
    time_f2l: f64,
    time_ll: f64,
}

impl Petrus {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Petrus {
            data: MethodData::new(scramble, cores),
            alg_block: spin_vec(),
            alg_eb: spin_vec(),
            alg_eo: spin_vec(),
            alg_f2l: spin_vec(),
            alg_zbll: spin_vec(),
            cases_zbll: spin_names(),
            alg_ocll: spin_vec(),
            cases_ocll: spin_names(),
            alg_pll: spin_vec(),
            cases_pll: spin_names(),
            alg_coll: spin_vec(),
            cases_coll: spin_names(),
            alg_epll: spin_vec(),
            cases_epll: spin_names(),
            depth_block: 0,
            depth_f2l: 9,
            time_block: 0.0,
            time_eb: 0.0,
            time_eo: 0.0,
            time_f2l: 0.0,
            time_ll: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    /// 2x2x2 block search. Returns false when no block was found.
    pub fn search_block(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_block = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        // three spins share each corner block; eight groups cover all 24
        for s in &ALL_SPINS[..8] {
            ds.add_to_optional_pieces(PieceGroup::PetrusBlock, *s);
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_block {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let found = !ds.get_solves().is_empty();
        self.evaluate_block(ds.get_solves(), max_solves);
        self.time_block = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_block(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_block,
            solves,
            max_solves,
            Policy::Best,
            StageKind::PetrusBlock,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_block = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_block = d;
    }

    /// Expand the block to 2x2x3 with U/R/F turns.
    pub fn search_expanded_block(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_eb[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_eb[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_block]);
                let cube = Cube::from_algorithm(&seq);
                if !is_petrus_block_built(&cube, spin) || is_petrus_expanded_built(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::PetrusExpandedBlock, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::URF),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::URF),
                            ));
                        }
                        ds
                    },
                    4,
                    8,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_eb[sp][n] = best;
                }
            }
        }
        self.time_eb = start.elapsed().as_secs_f64();
    }

    /// Orient the remaining edges while keeping the expanded block.
    pub fn search_eo(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_eo[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_eo[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self
                    .data
                    .stage_start(spin, n, &[&self.alg_block, &self.alg_eb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_petrus_expanded_built(&cube, spin) {
                    continue;
                }
                if cube.check_orientation_for(PieceGroup::AllEdges, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::PetrusExpandedBlock, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::URF),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::URF),
                            ));
                        }
                        ds
                    },
                    4,
                    8,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_eo[sp][n] = best;
                }
            }
        }
        self.time_eo = start.elapsed().as_secs_f64();
    }

    /// Finish the first two layers with orientation-preserving turns.
    pub fn search_f2l(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_f2l = max_depth.max(4);
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_f2l[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_f2l[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq =
                    self.data
                        .stage_start(spin, n, &[&self.alg_block, &self.alg_eb, &self.alg_eo]);
                let cube = Cube::from_algorithm(&seq);
                if !is_petrus_expanded_built(&cube, spin)
                    || !cube.check_orientation_for(PieceGroup::AllEdges, spin)
                    || is_f2l_built(&cube, spin)
                {
                    continue;
                }
                let max = self.depth_f2l;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::F2l, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::UrF2),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::UrF2),
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
                    self.alg_f2l[sp][n] = best;
                }
            }
        }
        self.time_f2l = start.elapsed().as_secs_f64();
    }

    /// One-look last layer (ZBLL); the edges are already oriented.
    pub fn search_zbll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_f2l(spin, n);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.zbll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_zbll[sp] = algs;
            self.cases_zbll[sp] = cases;
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// Two-look variant: orient corners, then permute everything.
    pub fn search_ocll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_f2l(spin, n);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((solve, case)) =
                    orientate_ll(&registry.ocll, policy, self.data.metric, &cube)
                {
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_ocll[sp] = algs;
            self.cases_ocll[sp] = cases;
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_pll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let mut cube = self.cube_after_f2l(spin, n);
                cube.apply_algorithm(&self.alg_ocll[sp][n]);
                if !is_f2l_built(&cube, spin) || !is_last_layer_oriented(&cube.with_spin(spin)) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.pll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_pll[sp] = algs;
            self.cases_pll[sp] = cases;
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// Two-look variant: corners first (COLL), then the edge cycle.
    pub fn search_coll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_f2l(spin, n);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    corners_ll(&registry.coll, policy, self.data.metric, &cube, true)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_coll[sp] = algs;
            self.cases_coll[sp] = cases;
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_epll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let mut cube = self.cube_after_f2l(spin, n);
                cube.apply_algorithm(&self.alg_coll[sp][n]);
                if !is_f2l_built(&cube, spin) || !is_cmll_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.epll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_epll[sp] = algs;
            self.cases_epll[sp] = cases;
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    fn cube_after_f2l(&self, spin: Spin, n: usize) -> Cube {
        let seq = self.data.stage_start(
            spin,
            n,
            &[&self.alg_block, &self.alg_eb, &self.alg_eo, &self.alg_f2l],
        );
        Cube::from_algorithm(&seq)
    }

    fn ll_variant(&self, sp: usize) -> u8 {
        if !self.alg_zbll[sp].is_empty() {
            0
        } else if !self.alg_ocll[sp].is_empty() {
            1
        } else {
            2
        }
    }
}

impl Method for Petrus {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Petrus::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.data.set_search_spins(&spins);
    }

    fn set_regrips(&mut self) {
        let mut block = std::mem::replace(&mut self.alg_block, spin_vec());
        self.data.regrip_first_stage(&mut block);
        self.alg_block = block;
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
                let ok = report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_block[sp][n],
                    "Block",
                    Some(self.depth_block),
                    &|c| is_petrus_block_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_eb[sp][n],
                    "Expanded block",
                    None,
                    &|c| is_petrus_expanded_built(c, spin),
                ) && report_stage(&mut line, &mut cube, &self.alg_eo[sp][n], "EO", None, &|c| {
                    c.check_orientation_for(PieceGroup::AllEdges, spin)
                }) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_f2l[sp][n],
                    "F2L",
                    Some(self.depth_f2l),
                    &|c| is_f2l_built(c, spin),
                );
                let ok = ok
                    && match self.ll_variant(sp) {
                        0 => report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_zbll[sp][n],
                            "ZBLL",
                            None,
                            &|c| c.is_solved(),
                        ),
                        1 => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_ocll[sp][n],
                                "OCLL",
                                None,
                                &|c| is_last_layer_oriented(&c.with_spin(spin)),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_pll[sp][n],
                                "PLL",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                        _ => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_coll[sp][n],
                                "COLL",
                                None,
                                &|c| is_cmll_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_epll[sp][n],
                                "EPLL",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                    };
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
        if !self.data.inspections[sp][n].is_empty() {
            report.push_str(&format!(
                "{} // Inspection [{}]\n",
                self.data.inspections[sp][n], spin
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
        push_stage(&self.alg_block[sp][n], "Block");
        push_stage(&self.alg_eb[sp][n], "Expanded block");
        push_stage(&self.alg_eo[sp][n], "EO");
        push_stage(&self.alg_f2l[sp][n], "F2L");
        match self.ll_variant(sp) {
            0 => push_stage(&self.alg_zbll[sp][n], "ZBLL"),
            1 => {
                push_stage(&self.alg_ocll[sp][n], "OCLL");
                push_stage(&self.alg_pll[sp][n], "PLL");
            }
            _ => {
                push_stage(&self.alg_coll[sp][n], "COLL");
                push_stage(&self.alg_epll[sp][n], "EPLL");
            }
        }
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        match self.ll_variant(sp) {
            0 => report.push_str(&format!("ZBLL case: {}\n", self.cases_zbll[sp][n])),
            1 => {
                report.push_str(&format!("OCLL case: {}\n", self.cases_ocll[sp][n]));
                report.push_str(&format!("PLL case: {}\n", self.cases_pll[sp][n]));
            }
            _ => {
                report.push_str(&format!("COLL case: {}\n", self.cases_coll[sp][n]));
                report.push_str(&format!("EPLL case: {}\n", self.cases_epll[sp][n]));
            }
        }
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_block + self.time_eb + self.time_eo + self.time_f2l + self.time_ll;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("Blocks time: {:.3} s\n", self.time_block));
        report.push_str(&format!("Expanded blocks time: {:.3} s\n", self.time_eb));
        report.push_str(&format!("EO time: {:.3} s\n", self.time_eo));
        report.push_str(&format!("F2L time: {:.3} s\n", self.time_f2l));
        report.push_str(&format!("Last layer time: {:.3} s\n", self.time_ll));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        a.append(&self.alg_block[sp][n]);
        a.append(&self.alg_eb[sp][n]);
        a.append(&self.alg_eo[sp][n]);
        a.append(&self.alg_f2l[sp][n]);
        match self.ll_variant(sp) {
            0 => a.append(&self.alg_zbll[sp][n]),
            1 => {
                a.append(&self.alg_ocll[sp][n]);
                a.append(&self.alg_pll[sp][n]);
            }
            _ => {
                a.append(&self.alg_coll[sp][n]);
                a.append(&self.alg_epll[sp][n]);
            }
        }
        a
    }

    fn check_solve_consistency(&self, spin: Spin) -> bool {
        let sp = spin.index();
        let n = self.data.inspections[sp].len();
        if n == 0 {
            return false;
        }
        let ll_ok = self.alg_zbll[sp].len() == n
            || (self.alg_ocll[sp].len() == n && self.alg_pll[sp].len() == n)
            || (self.alg_coll[sp].len() == n && self.alg_epll[sp].len() == n);
        self.alg_block[sp].len() == n
            && self.alg_eb[sp].len() == n
            && self.alg_eo[sp].len() == n
            && self.alg_f2l[sp].len() == n
            && ll_ok
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
    fn test_petrus_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut petrus = Petrus::new(&scramble, -1);
        petrus.data_mut().set_search_spins(&[Spin::UF]);
        assert!(petrus.search_block(5, 1));
        petrus.search_expanded_block();
        petrus.search_eo();
        petrus.search_f2l(7);
        petrus.search_zbll(&registry, Policy::First);
        assert!(petrus.check_solve_consistency(Spin::UF));
        assert!(petrus.is_solved(Spin::UF, 0));
    }

    #[test]
    fn test_petrus_short_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::from_str("R U2").unwrap();
        let mut petrus = Petrus::new(&scramble, -1);
        petrus.data_mut().set_search_spins(&[Spin::UF]);
        if !petrus.search_block(6, 1) {
            return;
        }
        petrus.search_expanded_block();
        petrus.search_eo();
        petrus.search_f2l(9);
        petrus.search_ocll(&registry, Policy::First);
        petrus.search_pll(&registry, Policy::First);
        if petrus.check_solve_consistency(Spin::UF) && petrus.is_solved(Spin::UF, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&petrus.get_full_solve(Spin::UF, 0));
            assert!(cube.is_solved());
        }
    }
}

//! # LEOR
//! `LEOR` builds the left 1x2x3 block (directly, or as a 2x2x2 plus the
//! FL pair in the B variant), orients all edges while placing the DF/DB
//! stripe, solves the second block with r/R/U/M turns and conjugated
//! insertions, and finishes with ZBLL or a two-look last layer.

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::evaluator::StageKind;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    corners_ll, is_cmll_built, is_eoline_built, is_f2l_built, is_last_layer_oriented,
    is_petrus_block_built, is_roux_fb_built, is_roux_sb_built, orientate_ll, report_stage,
    search_to_depth, solve_ll, spin_header, spin_names, spin_vec, Method, MethodData, SpinNames,
    SpinVec,
};

/// Solver for the LEOR method.
pub struct Leor {
    data: MethodData,
    alg_fb: SpinVec,
    alg_flpair: SpinVec,
    alg_eostripe: SpinVec,
    alg_sb: SpinVec,
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
    variant_b: bool,
    depth_fb: usize,
    depth_eo: usize,
    time_fb: f64,
    time_eo: f64,
    time_sb: f64,
    time_ll: f64,
}

impl Leor {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Leor {
            data: MethodData::new(scramble, cores),
            alg_fb: spin_vec(),
            alg_flpair: spin_vec(),
            alg_eostripe: spin_vec(),
            alg_sb: spin_vec(),
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
            variant_b: false,
            depth_fb: 0,
            depth_eo: 0,
            time_fb: 0.0,
            time_eo: 0.0,
            time_sb: 0.0,
            time_ll: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    /// LEOR-A first block: the full left 1x2x3.
    pub fn search_fb_a(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.variant_b = false;
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
        self.evaluate_fb_a(ds.get_solves(), max_solves);
        self.time_fb = start.elapsed().as_secs_f64();
        found
    }

    /// LEOR-B first block: a 2x2x2 block completed later by the FL pair.
    pub fn search_fb_b(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.variant_b = true;
        self.depth_fb = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        for s in &ALL_SPINS[..8] {
            ds.add_to_optional_pieces(PieceGroup::PetrusBlock, *s);
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_fb {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let found = !ds.get_solves().is_empty();
        self.evaluate_fb_b(ds.get_solves(), max_solves);
        self.time_fb = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_fb_a(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.variant_b = false;
        self.data.evaluate_first_stage(
            &mut self.alg_fb,
            solves,
            max_solves,
            Policy::Best,
            StageKind::RouxFirstBlock,
        );
    }

    pub fn evaluate_fb_b(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.variant_b = true;
        self.data.evaluate_first_stage(
            &mut self.alg_fb,
            solves,
            max_solves,
            Policy::Best,
            StageKind::PetrusBlock,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_fb = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_fb = d;
    }

    /// LEOR-B second step: complete the left block with the FL pair.
    pub fn search_fl_pair(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_flpair[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_flpair[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_petrus_block_built(&cube, spin) || is_roux_fb_built(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::Outer),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::Outer),
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
                    self.alg_flpair[sp][n] = best;
                }
            }
        }
        self.time_fb += start.elapsed().as_secs_f64();
    }

    /// Orient every edge while placing the DF/DB stripe.
    pub fn search_eo_stripe(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_eo = max_depth.max(4);
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_eostripe[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_eostripe[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self
                    .data
                    .stage_start(spin, n, &[&self.alg_fb, &self.alg_flpair]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin) {
                    continue;
                }
                if is_eoline_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_eo;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::EoLine, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::Outer),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::Outer),
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
                    self.alg_eostripe[sp][n] = best;
                }
            }
        }
        self.time_eo = start.elapsed().as_secs_f64();
    }

    /// Second block preserving the edge orientation.
    pub fn search_sb(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_sb[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_sb[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(
                    spin,
                    n,
                    &[&self.alg_fb, &self.alg_flpair, &self.alg_eostripe],
                );
                let cube = Cube::from_algorithm(&seq);
                if !is_eoline_built(&cube, spin)
                    || !is_roux_fb_built(&cube, spin)
                    || is_roux_sb_built(&cube, spin)
                {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::RouxSb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::EoLine, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::BlockRUrM),
                        ));
                        for _ in 2..depth {
                            let mut level = SearchLevel::new(true);
                            level.add(SearchUnit::Single(MoveSet::BlockRUrM));
                            level.add(SearchUnit::ConjugateSingle(
                                MoveSet::LayerR,
                                MoveSet::LateralFB,
                            ));
                            ds.add_search_level(level);
                        }
                        ds
                    },
                    4,
                    8,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_sb[sp][n] = best;
                }
            }
        }
        self.time_sb = start.elapsed().as_secs_f64();
    }

    pub fn search_zbll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_sb(spin, n);
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

    pub fn search_ocll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_sb(spin, n);
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
                let mut cube = self.cube_after_sb(spin, n);
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

    pub fn search_coll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let cube = self.cube_after_sb(spin, n);
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
                let mut cube = self.cube_after_sb(spin, n);
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

    fn cube_after_sb(&self, spin: Spin, n: usize) -> Cube {
        let seq = self.data.stage_start(
            spin,
            n,
            &[
                &self.alg_fb,
                &self.alg_flpair,
                &self.alg_eostripe,
                &self.alg_sb,
            ],
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

impl Method for Leor {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Leor::new(&scramble, cores);
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
                let mut ok = if self.variant_b {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_fb[sp][n],
                        "First block square",
                        Some(self.depth_fb),
                        &|c| is_petrus_block_built(c, spin),
                    ) && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_flpair[sp][n],
                        "FL pair",
                        None,
                        &|c| is_roux_fb_built(c, spin),
                    )
                } else {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_fb[sp][n],
                        "First block",
                        Some(self.depth_fb),
                        &|c| is_roux_fb_built(c, spin),
                    )
                };
                ok = ok
                    && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_eostripe[sp][n],
                        "EO stripe",
                        Some(self.depth_eo),
                        &|c| is_eoline_built(c, spin),
                    )
                    && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_sb[sp][n],
                        "Second block",
                        None,
                        &|c| is_f2l_built(c, spin),
                    );
                ok = ok
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
        push_stage(&self.alg_fb[sp][n], "First block");
        push_stage(&self.alg_flpair[sp][n], "FL pair");
        push_stage(&self.alg_eostripe[sp][n], "EO stripe");
        push_stage(&self.alg_sb[sp][n], "Second block");
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
        let total = self.time_fb + self.time_eo + self.time_sb + self.time_ll;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("First blocks time: {:.3} s\n", self.time_fb));
        report.push_str(&format!("EO stripe time: {:.3} s\n", self.time_eo));
        report.push_str(&format!("Second blocks time: {:.3} s\n", self.time_sb));
        report.push_str(&format!("Last layer time: {:.3} s\n", self.time_ll));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        a.append(&self.alg_fb[sp][n]);
        a.append(&self.alg_flpair[sp][n]);
        a.append(&self.alg_eostripe[sp][n]);
        a.append(&self.alg_sb[sp][n]);
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
        let fb_ok = if self.variant_b {
            self.alg_fb[sp].len() == n && self.alg_flpair[sp].len() == n
        } else {
            self.alg_fb[sp].len() == n
        };
        let ll_ok = self.alg_zbll[sp].len() == n
            || (self.alg_ocll[sp].len() == n && self.alg_pll[sp].len() == n)
            || (self.alg_coll[sp].len() == n && self.alg_epll[sp].len() == n);
        fb_ok && self.alg_eostripe[sp].len() == n && self.alg_sb[sp].len() == n && ll_ok
    }

    fn data(&self) -> &MethodData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionRegistry;

    #[test]
    fn test_leor_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut leor = Leor::new(&scramble, -1);
        leor.data_mut().set_search_spins(&[Spin::UF]);
        assert!(leor.search_fb_a(5, 1));
        leor.search_eo_stripe(6);
        leor.search_sb();
        leor.search_zbll(&registry, Policy::First);
        assert!(leor.check_solve_consistency(Spin::UF));
        assert!(leor.is_solved(Spin::UF, 0));
    }
}

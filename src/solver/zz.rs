//! # ZZ
//! `ZZ` starts with an EO line (edge orientation plus the DF/DB edges),
//! builds the first two layers with U/R/L turns only and ends with ZBLL or
//! a two-look last layer.

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::cubie::Corner;
use crate::evaluator::StageKind;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, GoalAlternative, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    corners_ll, is_cmll_built, is_eoline_built, is_f2l_built, is_last_layer_oriented,
    orientate_ll, report_stage, search_to_depth, solve_ll, spin_header, spin_names, spin_vec,
    Method, MethodData, SpinNames, SpinVec,
};

const F2L_SLOTS: [Corner; 4] = [Corner::DFR, Corner::DLF, Corner::DBL, Corner::DRB];

/// Solver for the ZZ method.
pub struct Zz {
    data: MethodData,
    alg_eox: SpinVec,
    alg_f2l: [SpinVec; 4],
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
    depth_eox: usize,
    depth_f2l: usize,
    time_eox: f64,
    time_f2l: f64,
    time_ll: f64,
}

impl Zz {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Zz {
            data: MethodData::new(scramble, cores),
            alg_eox: spin_vec(),
            alg_f2l: [spin_vec(), spin_vec(), spin_vec(), spin_vec()],
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
            depth_eox: 0,
            depth_f2l: 10,
            time_eox: 0.0,
            time_f2l: 0.0,
            time_ll: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    /// EO line search. Returns false when nothing was found.
    pub fn search_eox(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_eox = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        for s in ALL_SPINS {
            ds.add_optional_alternative(GoalAlternative {
                solved: vec![(PieceGroup::EoLine, s)],
                oriented: vec![(PieceGroup::AllEdges, s)],
            });
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_eox {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let found = !ds.get_solves().is_empty();
        self.evaluate_eox(ds.get_solves(), max_solves);
        self.time_eox = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_eox(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_eox,
            solves,
            max_solves,
            Policy::Best,
            StageKind::ZzEox,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_eox = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_eox = d;
    }

    /// Pair-by-pair F2L with U/R/L turns; orientation is preserved by the
    /// move set and enforced by the goal.
    pub fn search_f2l(&mut self) {
        let start = Instant::now();
        let mut skip = false;

        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            for k in 0..4 {
                self.alg_f2l[k][sp].clear();
            }
            for n in 0..self.data.inspections[sp].len() {
                for k in 0..4 {
                    self.alg_f2l[k][sp].push(Algorithm::new());
                }
                if skip {
                    continue;
                }
                let mut seq = self.data.stage_start(spin, n, &[&self.alg_eox]);
                let mut cube = Cube::from_algorithm(&seq);
                if !is_eoline_built(&cube, spin) {
                    continue;
                }
                for k in 0..4 {
                    if is_f2l_built(&cube, spin) {
                        break;
                    }
                    let ds = search_to_depth(
                        |depth| {
                            let mut ds = DeepSearch::new(&seq);
                            ds.set_cancel_handle(self.data.cancel.clone());
                            ds.add_to_mandatory_pieces(PieceGroup::EoLine, spin);
                            ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                            for slot in F2L_SLOTS {
                                if cube.is_group_solved_for(PieceGroup::F2lPair(slot), spin) {
                                    ds.add_to_mandatory_pieces(PieceGroup::F2lPair(slot), spin);
                                } else {
                                    ds.add_to_optional_pieces(PieceGroup::F2lPair(slot), spin);
                                }
                            }
                            ds.add_search_level(SearchLevel::with(
                                false,
                                SearchUnit::Double(MoveSet::URL),
                            ));
                            for _ in 2..depth {
                                ds.add_search_level(SearchLevel::with(
                                    true,
                                    SearchUnit::Single(MoveSet::URL),
                                ));
                            }
                            ds
                        },
                        4,
                        self.depth_f2l,
                        self.data.cores,
                    );
                    skip = skip || ds.check_skip();
                    let Some(best) = ds.evaluate_shortest(self.data.metric) else {
                        break;
                    };
                    seq.append(&best);
                    cube.apply_algorithm(&best);
                    self.alg_f2l[k][sp][n] = best;
                }
            }
        }
        self.time_f2l = start.elapsed().as_secs_f64();
    }

    pub fn search_zbll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_ll(registry, policy, LlStage::Zbll);
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_ocll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_ll(registry, policy, LlStage::Ocll);
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_pll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_ll(registry, policy, LlStage::Pll);
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_coll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_ll(registry, policy, LlStage::Coll);
        self.time_ll += start.elapsed().as_secs_f64();
    }

    pub fn search_epll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        self.lookup_ll(registry, policy, LlStage::Epll);
        self.time_ll += start.elapsed().as_secs_f64();
    }

    fn lookup_ll(&mut self, registry: &CollectionRegistry, policy: Policy, stage: LlStage) {
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let mut cube = self.cube_after_f2l(spin, n);
                match stage {
                    LlStage::Ocll | LlStage::Coll | LlStage::Zbll => {}
                    LlStage::Pll => cube.apply_algorithm(&self.alg_ocll[sp][n]),
                    LlStage::Epll => cube.apply_algorithm(&self.alg_coll[sp][n]),
                }
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                let found = match stage {
                    LlStage::Zbll => solve_ll(&registry.zbll, policy, self.data.metric, &cube)
                        .map(|(mut a, c, auf)| {
                            a.push(auf);
                            (a, c)
                        }),
                    LlStage::Ocll => orientate_ll(&registry.ocll, policy, self.data.metric, &cube),
                    LlStage::Pll => {
                        if !is_last_layer_oriented(&cube.with_spin(spin)) {
                            None
                        } else {
                            solve_ll(&registry.pll, policy, self.data.metric, &cube).map(
                                |(mut a, c, auf)| {
                                    a.push(auf);
                                    (a, c)
                                },
                            )
                        }
                    }
                    LlStage::Coll => {
                        corners_ll(&registry.coll, policy, self.data.metric, &cube, true).map(
                            |(mut a, c, auf)| {
                                a.push(auf);
                                (a, c)
                            },
                        )
                    }
                    LlStage::Epll => {
                        if !is_cmll_built(&cube, spin) {
                            None
                        } else {
                            solve_ll(&registry.epll, policy, self.data.metric, &cube).map(
                                |(mut a, c, auf)| {
                                    a.push(auf);
                                    (a, c)
                                },
                            )
                        }
                    }
                };
                if let Some((solve, case)) = found {
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            match stage {
                LlStage::Zbll => {
                    self.alg_zbll[sp] = algs;
                    self.cases_zbll[sp] = cases;
                }
                LlStage::Ocll => {
                    self.alg_ocll[sp] = algs;
                    self.cases_ocll[sp] = cases;
                }
                LlStage::Pll => {
                    self.alg_pll[sp] = algs;
                    self.cases_pll[sp] = cases;
                }
                LlStage::Coll => {
                    self.alg_coll[sp] = algs;
                    self.cases_coll[sp] = cases;
                }
                LlStage::Epll => {
                    self.alg_epll[sp] = algs;
                    self.cases_epll[sp] = cases;
                }
            }
        }
    }

    fn cube_after_f2l(&self, spin: Spin, n: usize) -> Cube {
        let seq = self.data.stage_start(
            spin,
            n,
            &[
                &self.alg_eox,
                &self.alg_f2l[0],
                &self.alg_f2l[1],
                &self.alg_f2l[2],
                &self.alg_f2l[3],
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

#[derive(Clone, Copy)]
enum LlStage {
    Zbll,
    Ocll,
    Pll,
    Coll,
    Epll,
}

impl Method for Zz {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Zz::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.data.set_search_spins(&spins);
    }

    fn set_regrips(&mut self) {
        let mut eox = std::mem::replace(&mut self.alg_eox, spin_vec());
        self.data.regrip_first_stage(&mut eox);
        self.alg_eox = eox;
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
                    &self.alg_eox[sp][n],
                    "EO line",
                    Some(self.depth_eox),
                    &|c| is_eoline_built(c, spin),
                ) && (0..4).all(|k| {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_f2l[k][sp][n],
                        "F2L",
                        Some(self.depth_f2l),
                        &|c| is_eoline_built(c, spin),
                    )
                }) && is_f2l_built(&cube, spin);
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
        push_stage(&self.alg_eox[sp][n], "EO line");
        for k in 0..4 {
            push_stage(&self.alg_f2l[k][sp][n], "F2L");
        }
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
        let total = self.time_eox + self.time_f2l + self.time_ll;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("EOX time: {:.3} s\n", self.time_eox));
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
        a.append(&self.alg_eox[sp][n]);
        for k in 0..4 {
            a.append(&self.alg_f2l[k][sp][n]);
        }
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
        let f2l_ok = (0..4).all(|k| self.alg_f2l[k][sp].len() == n);
        let ll_ok = self.alg_zbll[sp].len() == n
            || (self.alg_ocll[sp].len() == n && self.alg_pll[sp].len() == n)
            || (self.alg_coll[sp].len() == n && self.alg_epll[sp].len() == n);
        self.alg_eox[sp].len() == n && f2l_ok && ll_ok
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
    fn test_zz_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut zz = Zz::new(&scramble, -1);
        zz.data_mut().set_search_spins(&[Spin::UF]);
        assert!(zz.search_eox(5, 1));
        zz.search_f2l();
        zz.search_zbll(&registry, Policy::First);
        assert!(zz.check_solve_consistency(Spin::UF));
        assert!(zz.is_solved(Spin::UF, 0));
    }

    #[test]
    fn test_zz_eo_scramble() {
        let registry = CollectionRegistry::builtin();
        // a scramble with misoriented edges
        let scramble = Algorithm::from_str("F R U").unwrap();
        let mut zz = Zz::new(&scramble, -1);
        zz.data_mut().set_search_spins(&[Spin::UF]);
        if !zz.search_eox(6, 1) {
            return;
        }
        zz.search_f2l();
        zz.search_ocll(&registry, Policy::First);
        zz.search_pll(&registry, Policy::First);
        if zz.check_solve_consistency(Spin::UF) && zz.is_solved(Spin::UF, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&zz.get_full_solve(Spin::UF, 0));
            assert!(cube.is_solved());
        }
    }
}

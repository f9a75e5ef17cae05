//! # CFOP
//! `CFOP` (Cross, F2L, OLL, PLL) is the dominant speedsolving method: build
//! a cross, fill the four corner/edge slots of the first two layers, then
//! finish the last layer with an orientation and a permutation lookup.
//! Variants solve the last layer in one look (1LLL) or orient the edges
//! first and finish with ZBLL.

use std::time::Instant;

use log::debug;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::cubie::Corner;
use crate::evaluator::StageKind;
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Layer, Spin};

use super::{
    is_cross_built, is_f2l_built, is_last_layer_oriented, orientate_ll, report_stage, solve_ll,
    spin_header, spin_names, spin_vec, Method, MethodData, SpinNames, SpinVec,
};

const F2L_SLOTS: [Corner; 4] = [Corner::DFR, Corner::DLF, Corner::DBL, Corner::DRB];

/// Solver for the CFOP method.
pub struct Cfop {
    data: MethodData,
    cross_layers: Vec<Layer>,
    alg_cross: SpinVec,
    alg_f2l: [SpinVec; 4],
    alg_oll: SpinVec,
    cases_oll: SpinNames,
    alg_pll: SpinVec,
    cases_pll: SpinNames,
    alg_1lll: SpinVec,
    cases_1lll: SpinNames,
    alg_eoll: SpinVec,
    alg_zbll: SpinVec,
    cases_zbll: SpinNames,
    depth_cross: usize,
    depth_f2l: usize,
    time_cross: f64,
    time_f2l: f64,
    time_ll: f64,
}

impl Cfop {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        let mut solver = Cfop {
            data: MethodData::new(scramble, cores),
            cross_layers: Vec::new(),
            alg_cross: spin_vec(),
            alg_f2l: [spin_vec(), spin_vec(), spin_vec(), spin_vec()],
            alg_oll: spin_vec(),
            cases_oll: spin_names(),
            alg_pll: spin_vec(),
            cases_pll: spin_names(),
            alg_1lll: spin_vec(),
            cases_1lll: spin_names(),
            alg_eoll: spin_vec(),
            alg_zbll: spin_vec(),
            cases_zbll: spin_names(),
            depth_cross: 0,
            depth_f2l: 8,
            time_cross: 0.0,
            time_f2l: 0.0,
            time_ll: 0.0,
        };
        solver.set_cross_layers(&[Layer::U, Layer::D, Layer::F, Layer::B, Layer::R, Layer::L]);
        solver
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    pub fn set_cross_layers(&mut self, layers: &[Layer]) {
        self.cross_layers = if layers.is_empty() {
            vec![Layer::U, Layer::D, Layer::F, Layer::B, Layer::R, Layer::L]
        } else {
            layers.to_vec()
        };
        let spins: Vec<Spin> = self
            .cross_layers
            .iter()
            .map(|l| Spin::for_cross_layer(*l))
            .collect();
        self.data.set_search_spins(&spins);
    }

    /// First step search. Returns false when no cross was found.
    pub fn search_crosses(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_cross = max_depth.max(4);

        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        for layer in &self.cross_layers {
            ds.add_to_optional_pieces(PieceGroup::CrossD, Spin::for_cross_layer(*layer));
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..self.depth_cross {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);

        let found = !ds.get_solves().is_empty();
        self.evaluate_crosses(ds.get_solves(), max_solves);
        self.time_cross = start.elapsed().as_secs_f64();
        found
    }

    /// Keep the best cross candidates per layer spin and fix inspections.
    pub fn evaluate_crosses(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_cross,
            solves,
            max_solves,
            Policy::Best,
            |spin| StageKind::CfopCross(spin.down_layer()),
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_cross = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_cross = d;
    }

    /// Insert the four F2L pairs, best-first, one bounded search per pair.
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
                let mut seq = self.data.stage_start(spin, n, &[&self.alg_cross]);
                let mut cube = Cube::from_algorithm(&seq);
                if !is_cross_built(&cube, spin.down_layer()) {
                    continue;
                }
                for k in 0..4 {
                    if is_f2l_built(&cube, spin) {
                        break;
                    }
                    let ds = super::search_to_depth(
                        |depth| {
                            let mut ds = DeepSearch::new(&seq);
                            ds.set_cancel_handle(self.data.cancel.clone());
                            ds.add_to_mandatory_pieces(PieceGroup::CrossD, spin);
                            for slot in F2L_SLOTS {
                                if cube.is_group_solved_for(PieceGroup::F2lPair(slot), spin) {
                                    ds.add_to_mandatory_pieces(PieceGroup::F2lPair(slot), spin);
                                } else {
                                    ds.add_to_optional_pieces(PieceGroup::F2lPair(slot), spin);
                                }
                            }
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
        debug!("CFOP F2L search finished");
        self.time_f2l = start.elapsed().as_secs_f64();
    }

    /// Orientation of the last layer from the OLL collection.
    pub fn search_oll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_oll[sp].clear();
            self.cases_oll[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_oll[sp].push(Algorithm::new());
                self.cases_oll[sp].push(String::new());
                let cube = self.cube_after_f2l(spin, n);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((solve, case)) =
                    orientate_ll(&registry.oll, policy, self.data.metric, &cube)
                {
                    self.alg_oll[sp][n] = solve;
                    self.cases_oll[sp][n] = case;
                }
            }
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// Permutation of the last layer from the PLL collection.
    pub fn search_pll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_pll[sp].clear();
            self.cases_pll[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_pll[sp].push(Algorithm::new());
                self.cases_pll[sp].push(String::new());
                let mut cube = self.cube_after_f2l(spin, n);
                cube.apply_algorithm(&self.alg_oll[sp][n]);
                if !is_f2l_built(&cube, spin) || !is_last_layer_oriented(&cube.with_spin(spin)) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.pll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    self.alg_pll[sp][n] = solve;
                    self.cases_pll[sp][n] = case;
                }
            }
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// One-look last layer from the 1LLL collection.
    pub fn search_1lll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_1lll[sp].clear();
            self.cases_1lll[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_1lll[sp].push(Algorithm::new());
                self.cases_1lll[sp].push(String::new());
                let cube = self.cube_after_f2l(spin, n);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.one_lll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    self.alg_1lll[sp][n] = solve;
                    self.cases_1lll[sp][n] = case;
                }
            }
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// Orient the last-layer edges by search (ZBLL preparation).
    pub fn search_eoll(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_eoll[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_eoll[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.seq_after_f2l(spin, n);
                let cube = Cube::from_algorithm(&seq);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                let ds = super::search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::F2l, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::CrossU, spin);
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
                    7,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_eoll[sp][n] = best;
                }
            }
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    /// ZBLL finish after the edge orientation.
    pub fn search_zbll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_zbll[sp].clear();
            self.cases_zbll[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_zbll[sp].push(Algorithm::new());
                self.cases_zbll[sp].push(String::new());
                let mut cube = self.cube_after_f2l(spin, n);
                cube.apply_algorithm(&self.alg_eoll[sp][n]);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.zbll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    self.alg_zbll[sp][n] = solve;
                    self.cases_zbll[sp][n] = case;
                }
            }
        }
        self.time_ll += start.elapsed().as_secs_f64();
    }

    fn seq_after_f2l(&self, spin: Spin, n: usize) -> Algorithm {
        self.data.stage_start(
            spin,
            n,
            &[
                &self.alg_cross,
                &self.alg_f2l[0],
                &self.alg_f2l[1],
                &self.alg_f2l[2],
                &self.alg_f2l[3],
            ],
        )
    }

    fn cube_after_f2l(&self, spin: Spin, n: usize) -> Cube {
        Cube::from_algorithm(&self.seq_after_f2l(spin, n))
    }

    fn uses_1lll(&self) -> bool {
        self.data
            .search_spins
            .iter()
            .any(|s| !self.alg_1lll[s.index()].is_empty())
    }

    fn uses_zbll(&self) -> bool {
        self.data
            .search_spins
            .iter()
            .any(|s| !self.alg_zbll[s.index()].is_empty())
    }
}

impl Method for Cfop {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let layers = self.cross_layers.clone();
        *self = Cfop::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.set_cross_layers(&layers);
    }

    fn set_regrips(&mut self) {
        let mut cross = std::mem::replace(&mut self.alg_cross, spin_vec());
        self.data.regrip_first_stage(&mut cross);
        self.alg_cross = cross;
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
                let layer = spin.down_layer();
                let ok = report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_cross[sp][n],
                    "Cross",
                    Some(self.depth_cross),
                    &|c| is_cross_built(c, layer),
                ) && (0..4).all(|k| {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_f2l[k][sp][n],
                        "F2L",
                        Some(self.depth_f2l),
                        &|c| is_cross_built(c, layer),
                    )
                }) && is_f2l_built(&cube, spin);
                let ok = ok
                    && if self.uses_1lll() {
                        report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_1lll[sp][n],
                            "1LLL",
                            None,
                            &|c| c.is_solved(),
                        )
                    } else if self.uses_zbll() {
                        report_stage(&mut line, &mut cube, &self.alg_eoll[sp][n], "EO", None, &|c| {
                            is_f2l_built(c, spin)
                        }) && report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_zbll[sp][n],
                            "ZBLL",
                            None,
                            &|c| c.is_solved(),
                        )
                    } else {
                        report_stage(&mut line, &mut cube, &self.alg_oll[sp][n], "OLL", None, &|c| {
                            is_f2l_built(c, spin) && is_last_layer_oriented(&c.with_spin(spin))
                        }) && report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_pll[sp][n],
                            "PLL",
                            None,
                            &|c| c.is_solved(),
                        )
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
        let mut cube = self.data.cube_base;
        cube.apply_algorithm(&self.data.inspections[sp][n]);
        if !self.data.inspections[sp][n].is_empty() {
            report.push_str(&format!(
                "{} // Inspection [{}]\n",
                self.data.inspections[sp][n],
                cube.spin()
            ));
        }
        cube.apply_algorithm(&self.alg_cross[sp][n]);
        if !is_cross_built(&cube, spin.down_layer()) {
            report.push_str(&format!(
                "Cross not built in {} movements\n",
                self.depth_cross
            ));
            return report;
        }
        report.push_str(&format!(
            "{} // Cross ({})\n",
            self.alg_cross[sp][n],
            Algorithm::metric_value(self.alg_cross[sp][n].metric(self.data.metric))
        ));
        for k in 0..4 {
            cube.apply_algorithm(&self.alg_f2l[k][sp][n]);
            if !self.alg_f2l[k][sp][n].is_empty() {
                report.push_str(&format!(
                    "{} // F2L {} ({})\n",
                    self.alg_f2l[k][sp][n],
                    k + 1,
                    Algorithm::metric_value(self.alg_f2l[k][sp][n].metric(self.data.metric))
                ));
            }
        }
        if !is_f2l_built(&cube, spin) {
            report.push_str(&format!("F2L not built in {} movements\n", self.depth_f2l));
            return report;
        }
        let mut push_ll = |alg: &Algorithm, label: &str| {
            if !alg.is_empty() {
                report.push_str(&format!(
                    "{} // {} ({})\n",
                    alg,
                    label,
                    Algorithm::metric_value(alg.metric(self.data.metric))
                ));
            }
        };
        if self.uses_1lll() {
            push_ll(&self.alg_1lll[sp][n], "1LLL");
        } else if self.uses_zbll() {
            push_ll(&self.alg_eoll[sp][n], "EO LL");
            push_ll(&self.alg_zbll[sp][n], "ZBLL");
        } else {
            push_ll(&self.alg_oll[sp][n], "OLL");
            push_ll(&self.alg_pll[sp][n], "PLL");
        }
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        if self.uses_1lll() {
            report.push_str(&format!("1LLL case: {}\n", self.cases_1lll[sp][n]));
        } else if self.uses_zbll() {
            report.push_str(&format!("ZBLL case: {}\n", self.cases_zbll[sp][n]));
        } else {
            report.push_str(&format!("OLL case: {}\n", self.cases_oll[sp][n]));
            report.push_str(&format!("PLL case: {}\n", self.cases_pll[sp][n]));
        }
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_cross + self.time_f2l + self.time_ll;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("Crosses time: {:.3} s\n", self.time_cross));
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
        a.append(&self.alg_cross[sp][n]);
        for k in 0..4 {
            a.append(&self.alg_f2l[k][sp][n]);
        }
        if self.uses_1lll() {
            a.append(&self.alg_1lll[sp][n]);
        } else if self.uses_zbll() {
            a.append(&self.alg_eoll[sp][n]);
            a.append(&self.alg_zbll[sp][n]);
        } else {
            a.append(&self.alg_oll[sp][n]);
            a.append(&self.alg_pll[sp][n]);
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
        self.alg_cross[sp].len() == n
            && f2l_ok
            && ((self.alg_oll[sp].len() == n && self.alg_pll[sp].len() == n)
                || self.alg_1lll[sp].len() == n
                || (self.alg_eoll[sp].len() == n && self.alg_zbll[sp].len() == n))
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
    fn test_cfop_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut cfop = Cfop::new(&scramble, -1);
        cfop.set_cross_layers(&[Layer::D]);
        assert!(cfop.search_crosses(5, 1));
        cfop.search_f2l();
        cfop.search_oll(&registry, Policy::First);
        cfop.search_pll(&registry, Policy::First);
        let spin = Spin::UF;
        assert!(cfop.check_solve_consistency(spin));
        assert!(cfop.is_solved(spin, 0));
        let solve = cfop.get_full_solve(spin, 0);
        assert_eq!(solve.metric(crate::moves::Metrics::HTM), 0.0);
    }

    #[test]
    fn test_cfop_single_move_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::from_str("R").unwrap();
        let mut cfop = Cfop::new(&scramble, -1);
        cfop.set_cross_layers(&[Layer::D]);
        assert!(cfop.search_crosses(5, 1));
        cfop.search_f2l();
        cfop.search_oll(&registry, Policy::First);
        cfop.search_pll(&registry, Policy::First);
        let spin = Spin::UF;
        assert!(cfop.check_solve_consistency(spin));
        assert!(cfop.is_solved(spin, 0));
        let mut cube = Cube::from_algorithm(&scramble);
        cube.apply_algorithm(&cfop.get_full_solve(spin, 0));
        assert!(cube.is_solved());
        let report = cfop.get_report(false, false);
        assert!(report.contains("[UF|"));
    }

    #[test]
    fn test_cfop_short_scramble_round_trip() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::from_str("R U F'").unwrap();
        let mut cfop = Cfop::new(&scramble, -1);
        cfop.set_cross_layers(&[Layer::D]);
        if !cfop.search_crosses(6, 1) {
            return;
        }
        cfop.search_f2l();
        cfop.search_oll(&registry, Policy::First);
        cfop.search_pll(&registry, Policy::First);
        let spin = Spin::UF;
        if cfop.check_solve_consistency(spin) && cfop.is_solved(spin, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&cfop.get_full_solve(spin, 0));
            assert!(cube.is_solved());
            // cancellations never increase the metric
            assert!(
                cfop.get_metric_cancellations(spin, 0) <= cfop.get_metric_solve(spin, 0)
            );
        }
    }
}

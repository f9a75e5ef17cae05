//! # CEOR (YruRU)
//! `CEOR` solves a 1x1x3 line with the corner permutation (directly or in
//! two steps), extends it to the full left block with u/r/U/R turns,
//! orients the remaining edges, finishes the first two layers 2-gen and
//! ends with 2GLL. The corner permutation predicate is the beginner
//! thread-reduction reading.

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::evaluator::{evaluate, StageKind};
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::Spin;

use super::{
    is_eoline_built, is_f2l_built, is_roux_fb_built, is_yruru_cp_built, is_yruru_line_built,
    report_stage, search_to_depth, solve_ll, spin_header, spin_names, spin_vec, Method,
    MethodData, SpinNames, SpinVec,
};

/// The twelve distinct CP line placements (spin pairs share a line).
const LINE_SPINS: [Spin; 12] = [
    Spin::UF, Spin::UB, Spin::UR, Spin::UL,
    Spin::DF, Spin::DB, Spin::DR, Spin::DL,
    Spin::FU, Spin::FD, Spin::BU, Spin::BD,
];

/// Solver for the CEOR (YruRU) method.
pub struct Ceor {
    data: MethodData,
    alg_lines: SpinVec,
    alg_cp: SpinVec,
    alg_cplines: SpinVec,
    alg_peo: SpinVec,
    alg_eo: SpinVec,
    alg_eobf: SpinVec,
    alg_f2l: SpinVec,
    alg_2gll: SpinVec,
    cases_2gll: SpinNames,
    depth_lines: usize,
    depth_peo: usize,
    depth_eobf: usize,
    time_lines: f64,
    time_cp: f64,
    time_peo: f64,
    time_eobf: f64,
    time_f2l: f64,
    time_ll: f64,
}

impl Ceor {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Ceor {
            data: MethodData::new(scramble, cores),
            alg_lines: spin_vec(),
            alg_cp: spin_vec(),
            alg_cplines: spin_vec(),
            alg_peo: spin_vec(),
            alg_eo: spin_vec(),
            alg_eobf: spin_vec(),
            alg_f2l: spin_vec(),
            alg_2gll: spin_vec(),
            cases_2gll: spin_names(),
            depth_lines: 0,
            depth_peo: 0,
            depth_eobf: 0,
            time_lines: 0.0,
            time_cp: 0.0,
            time_peo: 0.0,
            time_eobf: 0.0,
            time_f2l: 0.0,
            time_ll: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    fn lines_search(&mut self, max_depth: usize) -> DeepSearch {
        let mut ds = DeepSearch::new(&self.data.scramble);
        ds.set_cancel_handle(self.data.cancel.clone());
        for s in LINE_SPINS {
            ds.add_to_optional_pieces(PieceGroup::CpLine, s);
        }
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        for _ in 2..max_depth {
            ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
        }
        ds.update_root_data();
        ds.run(self.data.cores);
        ds
    }

    /// Line search without caring about the corner permutation.
    pub fn search_lines(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_lines = max_depth.max(4);
        let ds = self.lines_search(max_depth.max(4));
        let found = !ds.get_solves().is_empty();
        self.evaluate_lines(ds.get_solves(), max_solves);
        self.time_lines = start.elapsed().as_secs_f64();
        found
    }

    /// Combined line plus corner permutation search.
    pub fn search_cp_lines(&mut self, max_depth: usize, max_solves: usize) -> bool {
        let start = Instant::now();
        self.depth_lines = max_depth.max(4);
        let ds = self.lines_search(max_depth.max(4));
        let found = !ds.get_solves().is_empty();
        self.evaluate_cp_lines(ds.get_solves(), max_solves);
        self.time_lines = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_lines(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_lines,
            solves,
            max_solves,
            Policy::Best,
            StageKind::YruruLines,
        );
    }

    pub fn evaluate_cp_lines(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_cplines,
            solves,
            max_solves,
            Policy::Best,
            StageKind::YruruCpLines,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_lines = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_lines = d;
    }

    /// Solve the corner permutation on top of a line (two-step option).
    pub fn search_cp(&mut self) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_cp[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_cp[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_lines]);
                let cube = Cube::from_algorithm(&seq);
                if !is_yruru_line_built(&cube, spin) || is_yruru_cp_built(&cube, spin) {
                    continue;
                }
                let mut ds = DeepSearch::new(&seq);
                ds.set_cancel_handle(self.data.cancel.clone());
                ds.add_to_mandatory_pieces(PieceGroup::CpLine, spin);
                ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
                ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
                ds.add_search_level(SearchLevel::with(true, SearchUnit::Single(MoveSet::Outer)));
                ds.update_root_data();
                ds.run(self.data.cores);
                skip = skip || ds.check_skip();
                let best = evaluate(
                    StageKind::YruruCpLines(spin),
                    ds.get_solves(),
                    &cube,
                    1,
                    Policy::Best,
                );
                if let Some(alg) = best.into_iter().next() {
                    self.alg_cp[sp][n] = alg;
                }
            }
        }
        self.time_cp = start.elapsed().as_secs_f64();
    }

    /// Extend the line to the full left block (pEO extension).
    pub fn search_peo(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_peo = max_depth.max(4);
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_peo[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_peo[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.first_stage_start(spin, n, &[]);
                let cube = Cube::from_algorithm(&seq);
                if !is_yruru_line_built(&cube, spin) || is_roux_fb_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_peo;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::WideURUR),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::WideURUR),
                            ));
                        }
                        ds
                    },
                    4,
                    max,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                let best = evaluate(
                    StageKind::CeorPeo(spin),
                    ds.get_solves(),
                    &Cube::from_algorithm(&seq),
                    1,
                    Policy::Best,
                );
                if let Some(alg) = best.into_iter().next() {
                    self.alg_peo[sp][n] = alg;
                }
            }
        }
        self.time_peo = start.elapsed().as_secs_f64();
    }

    /// Orient every edge with r/U/R turns.
    pub fn search_eo(&mut self, max_depth: usize) {
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
                let seq = self.first_stage_start(spin, n, &[&self.alg_peo]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin)
                    || cube.check_orientation_for(PieceGroup::AllEdges, spin)
                {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::WideRUR),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::WideRUR),
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
                    self.alg_eo[sp][n] = best;
                }
            }
        }
        self.time_eobf += start.elapsed().as_secs_f64();
    }

    /// Orient the edges while placing DF and DB (EOBF).
    pub fn search_eobf(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_eobf = max_depth.max(4);
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_eobf[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_eobf[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.first_stage_start(spin, n, &[&self.alg_peo, &self.alg_eo]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin) || is_eoline_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_eobf;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::EoLine, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::WideRUR),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::WideRUR),
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
                    self.alg_eobf[sp][n] = best;
                }
            }
        }
        self.time_eobf += start.elapsed().as_secs_f64();
    }

    /// Finish the first two layers 2-gen.
    pub fn search_f2l(&mut self, max_depth: usize) {
        let start = Instant::now();
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
                    self.first_stage_start(spin, n, &[&self.alg_peo, &self.alg_eo, &self.alg_eobf]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin) || is_f2l_built(&cube, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::F2l, spin);
                        ds.add_to_mandatory_orientations(PieceGroup::AllEdges, spin);
                        ds.add_search_level(SearchLevel::with(
                            false,
                            SearchUnit::Double(MoveSet::UR),
                        ));
                        for _ in 2..depth {
                            ds.add_search_level(SearchLevel::with(
                                true,
                                SearchUnit::Single(MoveSet::UR),
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
                    self.alg_f2l[sp][n] = best;
                }
            }
        }
        self.time_f2l = start.elapsed().as_secs_f64();
    }

    /// 2GLL finish: the last layer is solvable with U/R turns.
    pub fn search_2gll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let seq = self.first_stage_start(
                    spin,
                    n,
                    &[&self.alg_peo, &self.alg_eo, &self.alg_eobf, &self.alg_f2l],
                );
                let cube = Cube::from_algorithm(&seq);
                if !is_f2l_built(&cube, spin) {
                    continue;
                }
                if let Some((mut solve, case, auf)) =
                    solve_ll(&registry.two_gll, policy, self.data.metric, &cube)
                {
                    solve.push(auf);
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_2gll[sp] = algs;
            self.cases_2gll[sp] = cases;
        }
        self.time_ll = start.elapsed().as_secs_f64();
    }

    fn uses_cplines(&self, sp: usize) -> bool {
        !self.alg_cplines[sp].is_empty()
    }

    /// Scramble, inspection and the first stage (lines+CP or CP-lines).
    fn first_stage_start(&self, spin: Spin, n: usize, extra: &[&SpinVec]) -> Algorithm {
        let sp = spin.index();
        let mut seq = self.data.scramble.clone();
        seq.append(&self.data.inspections[sp][n]);
        if self.uses_cplines(sp) {
            seq.append(&self.alg_cplines[sp][n]);
        } else {
            seq.append(&self.alg_lines[sp][n]);
            if let Some(a) = self.alg_cp[sp].get(n) {
                seq.append(a);
            }
        }
        for stage in extra {
            if let Some(a) = stage[sp].get(n) {
                seq.append(a);
            }
        }
        seq
    }
}

impl Method for Ceor {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Ceor::new(&scramble, cores);
        self.data.set_cancel_handle(cancel);
        self.data.set_search_spins(&spins);
    }

    fn set_regrips(&mut self) {
        if self
            .data
            .search_spins
            .iter()
            .any(|s| self.uses_cplines(s.index()))
        {
            let mut first = std::mem::replace(&mut self.alg_cplines, spin_vec());
            self.data.regrip_first_stage(&mut first);
            self.alg_cplines = first;
        } else {
            let mut first = std::mem::replace(&mut self.alg_lines, spin_vec());
            self.data.regrip_first_stage(&mut first);
            self.alg_lines = first;
        }
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
                let ok = if self.uses_cplines(sp) {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_cplines[sp][n],
                        "CP line",
                        Some(self.depth_lines),
                        &|c| is_yruru_cp_built(c, spin),
                    )
                } else {
                    report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_lines[sp][n],
                        "Line",
                        Some(self.depth_lines),
                        &|c| is_yruru_line_built(c, spin),
                    ) && report_stage(&mut line, &mut cube, &self.alg_cp[sp][n], "CP", None, &|c| {
                        is_yruru_cp_built(c, spin)
                    })
                };
                let ok = ok
                    && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_peo[sp][n],
                        "pEO extension",
                        Some(self.depth_peo),
                        &|c| is_roux_fb_built(c, spin),
                    )
                    && report_stage(&mut line, &mut cube, &self.alg_eo[sp][n], "EO", None, &|c| {
                        c.check_orientation_for(PieceGroup::AllEdges, spin)
                    })
                    && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_eobf[sp][n],
                        "EOBF",
                        Some(self.depth_eobf),
                        &|c| is_eoline_built(c, spin),
                    )
                    && report_stage(&mut line, &mut cube, &self.alg_f2l[sp][n], "F2L", None, &|c| {
                        is_f2l_built(c, spin)
                    })
                    && report_stage(
                        &mut line,
                        &mut cube,
                        &self.alg_2gll[sp][n],
                        "2GLL",
                        None,
                        &|c| c.is_solved(),
                    );
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
        if self.uses_cplines(sp) {
            push_stage(&self.alg_cplines[sp][n], "CP line");
        } else {
            push_stage(&self.alg_lines[sp][n], "Line");
            push_stage(&self.alg_cp[sp][n], "CP");
        }
        push_stage(&self.alg_peo[sp][n], "pEO extension");
        push_stage(&self.alg_eo[sp][n], "EO");
        push_stage(&self.alg_eobf[sp][n], "EOBF");
        push_stage(&self.alg_f2l[sp][n], "F2L");
        push_stage(&self.alg_2gll[sp][n], "2GLL");
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        report.push_str(&format!("2GLL case: {}\n", self.cases_2gll[sp][n]));
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_lines
            + self.time_cp
            + self.time_peo
            + self.time_eobf
            + self.time_f2l
            + self.time_ll;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("Lines time: {:.3} s\n", self.time_lines));
        report.push_str(&format!("CP time: {:.3} s\n", self.time_cp));
        report.push_str(&format!("pEO time: {:.3} s\n", self.time_peo));
        report.push_str(&format!("EOBF time: {:.3} s\n", self.time_eobf));
        report.push_str(&format!("F2L time: {:.3} s\n", self.time_f2l));
        report.push_str(&format!("2GLL time: {:.3} s\n", self.time_ll));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        if self.uses_cplines(sp) {
            a.append(&self.alg_cplines[sp][n]);
        } else {
            a.append(&self.alg_lines[sp][n]);
            a.append(&self.alg_cp[sp][n]);
        }
        a.append(&self.alg_peo[sp][n]);
        a.append(&self.alg_eo[sp][n]);
        a.append(&self.alg_eobf[sp][n]);
        a.append(&self.alg_f2l[sp][n]);
        a.append(&self.alg_2gll[sp][n]);
        a
    }

    fn check_solve_consistency(&self, spin: Spin) -> bool {
        let sp = spin.index();
        let n = self.data.inspections[sp].len();
        if n == 0 {
            return false;
        }
        let first_ok = self.alg_cplines[sp].len() == n
            || (self.alg_lines[sp].len() == n && self.alg_cp[sp].len() == n);
        first_ok
            && self.alg_peo[sp].len() == n
            && self.alg_eo[sp].len() == n
            && self.alg_eobf[sp].len() == n
            && self.alg_f2l[sp].len() == n
            && self.alg_2gll[sp].len() == n
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
    fn test_ceor_empty_scramble_cp_skip() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut ceor = Ceor::new(&scramble, -1);
        ceor.data_mut().set_search_spins(&[Spin::UF]);
        assert!(ceor.search_cp_lines(5, 1));
        ceor.search_peo(6);
        ceor.search_eo(7);
        ceor.search_eobf(6);
        ceor.search_f2l(8);
        ceor.search_2gll(&registry, Policy::First);
        // scenario: with the CP-line option the Lines stage stays empty
        assert!(ceor.alg_lines[Spin::UF.index()].is_empty());
        assert!(!ceor.alg_cplines[Spin::UF.index()].is_empty());
        assert!(ceor.check_solve_consistency(Spin::UF));
        assert!(ceor.is_solved(Spin::UF, 0));
        let cube = Cube::from_algorithm(&ceor.get_full_solve(Spin::UF, 0));
        assert!(is_yruru_cp_built(&cube, Spin::UF));
    }

    #[test]
    fn test_ceor_short_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::from_str("R U R'").unwrap();
        let mut ceor = Ceor::new(&scramble, -1);
        ceor.data_mut().set_search_spins(&[Spin::UF]);
        if !ceor.search_cp_lines(6, 1) {
            return;
        }
        ceor.search_peo(7);
        ceor.search_eo(8);
        ceor.search_eobf(6);
        ceor.search_f2l(10);
        ceor.search_2gll(&registry, Policy::First);
        if ceor.check_solve_consistency(Spin::UF) && ceor.is_solved(Spin::UF, 0) {
            let mut cube = Cube::from_algorithm(&scramble);
            cube.apply_algorithm(&ceor.get_full_solve(Spin::UF, 0));
            assert!(cube.is_solved());
        }
    }
}

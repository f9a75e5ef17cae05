//! # Nautilus
//! `Nautilus` pairs a Roux-style first block with a 2x2x2 second block in
//! the bottom back right. The LSE variants solve the dFR pair and the
//! corners (NCLL/NCOLL/TNCLL) before the last five edges; the LSLL
//! variants orient edges with EODF, finish F2L and end with a last-layer
//! lookup.

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::cubie::Corner;
use crate::evaluator::{evaluate, StageKind};
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    corners_ll, is_f2l_built, is_last_layer_oriented, is_nautilus_eodf_built,
    is_nautilus_sb_built, is_roux_fb_built, lookup_case, orientate_ll, report_stage,
    search_to_depth, solve_ll, spin_header, spin_names, spin_vec, Method, MethodData, SpinNames,
    SpinVec,
};

/// Solver for the Nautilus method.
pub struct Nautilus {
    data: MethodData,
    alg_fb: SpinVec,
    alg_sb: SpinVec,
    alg_dfr: SpinVec,
    alg_ncll: SpinVec,
    cases_ncll: SpinNames,
    alg_l5e: SpinVec,
    cases_l5e: SpinNames,
    alg_eodf: SpinVec,
    cases_eodf: SpinNames,
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
    corners_label: &'static str,
    depth_fb: usize,
    depth_sb: usize,
    time_fb: f64,
    time_sb: f64,
    time_tail: f64,
}

impl Nautilus {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Nautilus {
            data: MethodData::new(scramble, cores),
            alg_fb: spin_vec(),
            alg_sb: spin_vec(),
            alg_dfr: spin_vec(),
            alg_ncll: spin_vec(),
            cases_ncll: spin_names(),
            alg_l5e: spin_vec(),
            cases_l5e: spin_names(),
            alg_eodf: spin_vec(),
            cases_eodf: spin_names(),
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
            corners_label: "NCLL",
            depth_fb: 0,
            depth_sb: 0,
            time_fb: 0.0,
            time_sb: 0.0,
            time_tail: 0.0,
        }
    }

    pub fn data_mut(&mut self) -> &mut MethodData {
        &mut self.data
    }

    /// First block search. Returns false when no block was found.
    pub fn search_fb(&mut self, max_depth: usize, max_solves: usize) -> bool {
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
        self.evaluate_fb(ds.get_solves(), max_solves);
        self.time_fb = start.elapsed().as_secs_f64();
        found
    }

    pub fn evaluate_fb(&mut self, solves: &[Algorithm], max_solves: usize) {
        self.data.evaluate_first_stage(
            &mut self.alg_fb,
            solves,
            max_solves,
            Policy::Short,
            StageKind::NautilusFirstBlock,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_fb = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_fb = d;
    }

    /// Second block search: r/R/U/M turns plus conjugated R insertions.
    pub fn search_sb(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_sb = max_depth.max(4);
        let mut skip = false;

        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_sb[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_sb[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_roux_fb_built(&cube, spin) || is_nautilus_sb_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_sb;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_optional_pieces(PieceGroup::NautilusSb, spin);
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
                    max,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                let best = evaluate(
                    StageKind::NautilusSecondBlock(spin),
                    ds.get_solves(),
                    &cube,
                    1,
                    Policy::Best,
                );
                if let Some(alg) = best.into_iter().next() {
                    self.alg_sb[sp][n] = alg;
                }
            }
        }
        self.time_sb = start.elapsed().as_secs_f64();
    }

    /// Solve the dFR pair (DFR corner and FR edge). With `twistable` the
    /// corner only needs its position (TNCLL finishes the twist).
    pub fn search_pair_dfr(&mut self, twistable: bool) {
        let start = Instant::now();
        let mut skip = false;
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_dfr[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_dfr[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb, &self.alg_sb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_nautilus_sb_built(&cube, spin) {
                    continue;
                }
                let pair = PieceGroup::F2lPair(Corner::DFR);
                if cube.is_group_solved_for(pair, spin) {
                    continue;
                }
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, spin);
                        ds.add_to_mandatory_pieces(PieceGroup::NautilusSb, spin);
                        if twistable {
                            ds.add_to_mandatory_positions(pair, spin);
                        } else {
                            ds.add_to_mandatory_pieces(pair, spin);
                        }
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
                    8,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_dfr[sp][n] = best;
                }
            }
        }
        self.time_tail += start.elapsed().as_secs_f64();
    }

    /// NCLL corner finish for the L5E variants.
    pub fn search_ncll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.corners_label = "NCLL";
        self.lookup_corners(&registry.ncll, policy, false);
    }

    /// NCOLL: corners preserving the last-layer edge orientation.
    pub fn search_ncoll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.corners_label = "NCOLL";
        self.lookup_corners(&registry.ncoll, policy, true);
    }

    /// TNCLL: corners with the twistable dFR corner.
    pub fn search_tncll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.corners_label = "TNCLL";
        self.lookup_corners(&registry.tncll, policy, false);
    }

    fn lookup_corners(
        &mut self,
        algset: &crate::collection::Collection,
        policy: Policy,
        edges_oriented: bool,
    ) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let seq = self
                    .data
                    .stage_start(spin, n, &[&self.alg_fb, &self.alg_sb, &self.alg_dfr]);
                let cube = Cube::from_algorithm(&seq);
                if !is_nautilus_sb_built(&cube, spin) {
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
            self.alg_ncll[sp] = algs;
            self.cases_ncll[sp] = cases;
        }
        self.time_tail += start.elapsed().as_secs_f64();
    }

    /// Last five edges lookup, solving the cube.
    pub fn search_l5e(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let seq = self.data.stage_start(
                    spin,
                    n,
                    &[&self.alg_fb, &self.alg_sb, &self.alg_dfr, &self.alg_ncll],
                );
                let cube = Cube::from_algorithm(&seq);
                if let Some((solve, case)) = lookup_case(
                    &registry.l5e,
                    policy,
                    self.data.metric,
                    &cube,
                    true,
                    false,
                    true,
                    &|c| c.is_solved(),
                ) {
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_l5e[sp] = algs;
            self.cases_l5e[sp] = cases;
        }
        self.time_tail += start.elapsed().as_secs_f64();
    }

    /// EODF lookup: orient all edges while solving DF.
    pub fn search_eodf(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb, &self.alg_sb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_nautilus_sb_built(&cube, spin) {
                    continue;
                }
                if let Some((solve, case)) = lookup_case(
                    &registry.eodf,
                    policy,
                    self.data.metric,
                    &cube,
                    true,
                    false,
                    false,
                    &|c| is_nautilus_eodf_built(c, spin),
                ) {
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            self.alg_eodf[sp] = algs;
            self.cases_eodf[sp] = cases;
        }
        self.time_tail += start.elapsed().as_secs_f64();
    }

    /// Finish the first two layers 2-gen after EODF.
    pub fn search_f2l(&mut self) {
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
                let seq = self
                    .data
                    .stage_start(spin, n, &[&self.alg_fb, &self.alg_sb, &self.alg_eodf]);
                let cube = Cube::from_algorithm(&seq);
                if !is_nautilus_eodf_built(&cube, spin) || is_f2l_built(&cube, spin) {
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
                    10,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                if let Some(best) = ds.evaluate_shortest(self.data.metric) {
                    self.alg_f2l[sp][n] = best;
                }
            }
        }
        self.time_tail += start.elapsed().as_secs_f64();
    }

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
        self.time_tail += start.elapsed().as_secs_f64();
    }

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
        self.time_tail += start.elapsed().as_secs_f64();
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
        self.time_tail += start.elapsed().as_secs_f64();
    }

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
        self.time_tail += start.elapsed().as_secs_f64();
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
                if !is_f2l_built(&cube, spin) {
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
        self.time_tail += start.elapsed().as_secs_f64();
    }

    fn cube_after_f2l(&self, spin: Spin, n: usize) -> Cube {
        let seq = self.data.stage_start(
            spin,
            n,
            &[&self.alg_fb, &self.alg_sb, &self.alg_eodf, &self.alg_f2l],
        );
        Cube::from_algorithm(&seq)
    }

    fn uses_lse(&self, sp: usize) -> bool {
        !self.alg_ncll[sp].is_empty()
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

impl Method for Nautilus {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Nautilus::new(&scramble, cores);
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
                let ok = report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_fb[sp][n],
                    "First block",
                    Some(self.depth_fb),
                    &|c| is_roux_fb_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_sb[sp][n],
                    "Second block",
                    Some(self.depth_sb),
                    &|c| is_nautilus_sb_built(c, spin),
                );
                let ok = ok
                    && if self.uses_lse(sp) {
                        report_stage(&mut line, &mut cube, &self.alg_dfr[sp][n], "dFR", None, &|c| {
                            is_nautilus_sb_built(c, spin)
                        }) && report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_ncll[sp][n],
                            self.corners_label,
                            None,
                            &|c| is_nautilus_sb_built(c, spin),
                        ) && report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_l5e[sp][n],
                            "L5E",
                            None,
                            &|c| c.is_solved(),
                        )
                    } else {
                        let mut ok = report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_eodf[sp][n],
                            "EODF",
                            None,
                            &|c| is_nautilus_eodf_built(c, spin),
                        ) && report_stage(
                            &mut line,
                            &mut cube,
                            &self.alg_f2l[sp][n],
                            "F2L",
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
                                        &|c| is_f2l_built(c, spin),
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
                        ok
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
        push_stage(&self.alg_sb[sp][n], "Second block");
        if self.uses_lse(sp) {
            push_stage(&self.alg_dfr[sp][n], "dFR pair");
            push_stage(&self.alg_ncll[sp][n], self.corners_label);
            push_stage(&self.alg_l5e[sp][n], "L5E");
        } else {
            push_stage(&self.alg_eodf[sp][n], "EODF");
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
        }
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        if self.uses_lse(sp) {
            report.push_str(&format!(
                "{} case: {}\n",
                self.corners_label, self.cases_ncll[sp][n]
            ));
            report.push_str(&format!("L5E case: {}\n", self.cases_l5e[sp][n]));
        } else {
            report.push_str(&format!("EODF case: {}\n", self.cases_eodf[sp][n]));
        }
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_fb + self.time_sb + self.time_tail;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("First blocks time: {:.3} s\n", self.time_fb));
        report.push_str(&format!("Second blocks time: {:.3} s\n", self.time_sb));
        report.push_str(&format!("Tail stages time: {:.3} s\n", self.time_tail));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        a.append(&self.alg_fb[sp][n]);
        a.append(&self.alg_sb[sp][n]);
        if self.uses_lse(sp) {
            a.append(&self.alg_dfr[sp][n]);
            a.append(&self.alg_ncll[sp][n]);
            a.append(&self.alg_l5e[sp][n]);
        } else {
            a.append(&self.alg_eodf[sp][n]);
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
        }
        a
    }

    fn check_solve_consistency(&self, spin: Spin) -> bool {
        let sp = spin.index();
        let n = self.data.inspections[sp].len();
        if n == 0 {
            return false;
        }
        let lse_ok = self.alg_dfr[sp].len() == n
            && self.alg_ncll[sp].len() == n
            && self.alg_l5e[sp].len() == n;
        let ll_ok = self.alg_zbll[sp].len() == n
            || (self.alg_ocll[sp].len() == n && self.alg_pll[sp].len() == n)
            || (self.alg_coll[sp].len() == n && self.alg_epll[sp].len() == n);
        let lsll_ok = self.alg_eodf[sp].len() == n && self.alg_f2l[sp].len() == n && ll_ok;
        self.alg_fb[sp].len() == n && self.alg_sb[sp].len() == n && (lse_ok || lsll_ok)
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
    fn test_nautilus_empty_scramble() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut nautilus = Nautilus::new(&scramble, -1);
        nautilus.data_mut().set_search_spins(&[Spin::UF]);
        assert!(nautilus.search_fb(5, 1));
        nautilus.search_sb(5);
        nautilus.search_pair_dfr(false);
        nautilus.search_ncll(&registry, Policy::First);
        nautilus.search_l5e(&registry, Policy::First);
        assert!(nautilus.check_solve_consistency(Spin::UF));
        assert!(nautilus.is_solved(Spin::UF, 0));
    }
}

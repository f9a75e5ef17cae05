//! # Mehta
//! `Mehta` builds a 1x2x3 block on the bottom with its 1x1x3 in the DL
//! position, places three of the four belt edges, then runs one of five
//! lookup-driven tails: 6CP (EOLE, 6CO, 6CP, L5EP), APDR (EOLE, 6CO, APDR,
//! PLL), CDRLL (EOLE, DCAL, CDRLL, L5EP), JTLE (EOLE, DCAL, JTLE, PLL) or
//! TDR (EOLE, TDR, ZBLL).

use std::time::Instant;

use crate::algorithm::Algorithm;
use crate::collection::{Collection, CollectionRegistry, Policy};
use crate::cube::Cube;
use crate::evaluator::{evaluate, StageKind};
use crate::pieces::PieceGroup;
use crate::search::{DeepSearch, MoveSet, SearchLevel, SearchUnit};
use crate::spin::{Spin, ALL_SPINS};

use super::{
    is_mehta_3qb_built, is_mehta_6co_built, is_mehta_6cp_built, is_mehta_apdr_built,
    is_mehta_cdrll_built, is_mehta_dcal_built, is_mehta_eole_built, is_mehta_fb_built,
    is_mehta_jtle_built, is_mehta_tdr_built, lookup_case, mehta_fb_spin, report_stage,
    search_to_depth, solve_ll, spin_header, spin_names, spin_vec, Method, MethodData, SpinNames,
    SpinVec,
};

/// Solver for the Mehta method.
pub struct Mehta {
    data: MethodData,
    alg_fb: SpinVec,
    alg_3qb: SpinVec,
    alg_eole: SpinVec,
    cases_eole: SpinNames,
    alg_6co: SpinVec,
    cases_6co: SpinNames,
    alg_6cp: SpinVec,
    cases_6cp: SpinNames,
    alg_l5ep: SpinVec,
    cases_l5ep: SpinNames,
    alg_apdr: SpinVec,
    cases_apdr: SpinNames,
    alg_pll: SpinVec,
    cases_pll: SpinNames,
    alg_dcal: SpinVec,
    cases_dcal: SpinNames,
    alg_cdrll: SpinVec,
    cases_cdrll: SpinNames,
    alg_jtle: SpinVec,
    cases_jtle: SpinNames,
    alg_tdr: SpinVec,
    cases_tdr: SpinNames,
    alg_zbll: SpinVec,
    cases_zbll: SpinNames,
    depth_fb: usize,
    depth_3qb: usize,
    time_fb: f64,
    time_3qb: f64,
    time_lookups: f64,
}

impl Mehta {
    pub fn new(scramble: &Algorithm, cores: i32) -> Self {
        Mehta {
            data: MethodData::new(scramble, cores),
            alg_fb: spin_vec(),
            alg_3qb: spin_vec(),
            alg_eole: spin_vec(),
            cases_eole: spin_names(),
            alg_6co: spin_vec(),
            cases_6co: spin_names(),
            alg_6cp: spin_vec(),
            cases_6cp: spin_names(),
            alg_l5ep: spin_vec(),
            cases_l5ep: spin_names(),
            alg_apdr: spin_vec(),
            cases_apdr: spin_names(),
            alg_pll: spin_vec(),
            cases_pll: spin_names(),
            alg_dcal: spin_vec(),
            cases_dcal: spin_names(),
            alg_cdrll: spin_vec(),
            cases_cdrll: spin_names(),
            alg_jtle: spin_vec(),
            cases_jtle: spin_names(),
            alg_tdr: spin_vec(),
            cases_tdr: spin_names(),
            alg_zbll: spin_vec(),
            cases_zbll: spin_names(),
            depth_fb: 0,
            depth_3qb: 0,
            time_fb: 0.0,
            time_3qb: 0.0,
            time_lookups: 0.0,
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
        // extended root plus an unchecked second level: a first block never
        // falls in fewer than three moves
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Double(MoveSet::Outer)));
        ds.add_search_level(SearchLevel::with(false, SearchUnit::Single(MoveSet::Outer)));
        for _ in 3..self.depth_fb {
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
            StageKind::MehtaFirstBlock,
        );
    }

    pub fn set_time_fs(&mut self, t: f64) {
        self.time_fb = t;
    }

    pub fn set_depth_fs(&mut self, d: usize) {
        self.depth_fb = d;
    }

    /// Three quarters belt: place three of the four middle-ring edges.
    pub fn search_3qb(&mut self, max_depth: usize) {
        let start = Instant::now();
        self.depth_3qb = max_depth.max(4);
        let mut skip = false;

        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            self.alg_3qb[sp].clear();
            for n in 0..self.data.inspections[sp].len() {
                self.alg_3qb[sp].push(Algorithm::new());
                if skip {
                    continue;
                }
                let seq = self.data.stage_start(spin, n, &[&self.alg_fb]);
                let cube = Cube::from_algorithm(&seq);
                if !is_mehta_fb_built(&cube, spin) || is_mehta_3qb_built(&cube, spin) {
                    continue;
                }
                let max = self.depth_3qb;
                let ds = search_to_depth(
                    |depth| {
                        let mut ds = DeepSearch::new(&seq);
                        ds.set_cancel_handle(self.data.cancel.clone());
                        ds.add_to_mandatory_pieces(PieceGroup::RouxFb, mehta_fb_spin(spin));
                        for g in PieceGroup::belt_quarters() {
                            ds.add_to_optional_pieces(g, spin);
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
                    max,
                    self.data.cores,
                );
                skip = skip || ds.check_skip();
                let best = evaluate(
                    StageKind::Mehta3qb(spin),
                    ds.get_solves(),
                    &cube,
                    1,
                    Policy::Best,
                );
                if let Some(alg) = best.into_iter().next() {
                    self.alg_3qb[sp][n] = alg;
                }
            }
        }
        self.time_3qb = start.elapsed().as_secs_f64();
    }

    /// One lookup stage: walk the prior stages, check the entry predicate,
    /// and store the found algorithm and case.
    fn lookup_stage(
        &mut self,
        algset: &Collection,
        policy: Policy,
        prior: &[StageId],
        target: StageId,
        pre_u: bool,
        pre_e: bool,
        post_u: bool,
        entry: &dyn Fn(&Cube, Spin) -> bool,
        check: &dyn Fn(&Cube, Spin) -> bool,
    ) {
        let start = Instant::now();
        for spin in self.data.search_spins.clone() {
            let sp = spin.index();
            let count = self.data.inspections[sp].len();
            let mut algs = vec![Algorithm::new(); count];
            let mut cases = vec![String::new(); count];
            for n in 0..count {
                let mut seq = self.data.scramble.clone();
                seq.append(&self.data.inspections[sp][n]);
                for id in prior {
                    seq.append(&self.stage_store(*id)[sp][n]);
                }
                let cube = Cube::from_algorithm(&seq);
                if !entry(&cube, spin) {
                    continue;
                }
                if let Some((solve, case)) = lookup_case(
                    algset,
                    policy,
                    self.data.metric,
                    &cube,
                    pre_u,
                    pre_e,
                    post_u,
                    &|c| check(c, spin),
                ) {
                    algs[n] = solve;
                    cases[n] = case;
                }
            }
            let (store, names) = self.stage_store_mut(target);
            store[sp] = algs;
            names[sp] = cases;
        }
        self.time_lookups += start.elapsed().as_secs_f64();
    }

    /// Edge orientation plus last belt edge.
    pub fn search_eole(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.eole,
            policy,
            &[StageId::Fb, StageId::Qb],
            StageId::Eole,
            true,
            true,
            false,
            &is_mehta_3qb_built,
            &is_mehta_eole_built,
        );
    }

    /// Orient the six remaining corners.
    pub fn search_6co(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.six_co,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole],
            StageId::SixCo,
            true,
            false,
            false,
            &is_mehta_eole_built,
            &is_mehta_6co_built,
        );
    }

    /// Permute the six remaining corners.
    pub fn search_6cp(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.six_cp,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole, StageId::SixCo],
            StageId::SixCp,
            true,
            false,
            true,
            &is_mehta_6co_built,
            &is_mehta_6cp_built,
        );
    }

    /// Permute the last five edges, solving the cube.
    pub fn search_l5ep(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let prior: &[StageId] = if !self.stage_store(StageId::SixCp).is_empty_all() {
            &[
                StageId::Fb,
                StageId::Qb,
                StageId::Eole,
                StageId::SixCo,
                StageId::SixCp,
            ]
        } else {
            &[
                StageId::Fb,
                StageId::Qb,
                StageId::Eole,
                StageId::Dcal,
                StageId::Cdrll,
            ]
        };
        let entry: &dyn Fn(&Cube, Spin) -> bool =
            if !self.stage_store(StageId::SixCp).is_empty_all() {
                &is_mehta_6cp_built
            } else {
                &is_mehta_cdrll_built
            };
        self.lookup_stage(
            &registry.l5ep,
            policy,
            prior,
            StageId::L5ep,
            true,
            false,
            true,
            entry,
            &|c, _| c.is_solved(),
        );
    }

    /// Solve the DR block in one step (APDR variant).
    pub fn search_apdr(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.apdr,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole, StageId::SixCo],
            StageId::Apdr,
            true,
            false,
            true,
            &is_mehta_6co_built,
            &is_mehta_apdr_built,
        );
    }

    /// Final PLL after APDR or JTLE.
    pub fn search_pll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        let prior: &[StageId] = if !self.stage_store(StageId::Apdr).is_empty_all() {
            &[
                StageId::Fb,
                StageId::Qb,
                StageId::Eole,
                StageId::SixCo,
                StageId::Apdr,
            ]
        } else {
            &[
                StageId::Fb,
                StageId::Qb,
                StageId::Eole,
                StageId::Dcal,
                StageId::Jtle,
            ]
        };
        self.lookup_stage(
            &registry.pll,
            policy,
            prior,
            StageId::Pll,
            true,
            false,
            true,
            &is_mehta_apdr_built,
            &|c, _| c.is_solved(),
        );
    }

    /// Solve the two D-layer corners (CDRLL/JTLE variants).
    pub fn search_dcal(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.dcal,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole],
            StageId::Dcal,
            true,
            false,
            true,
            &is_mehta_eole_built,
            &is_mehta_dcal_built,
        );
    }

    /// Orient and permute the U-layer corners.
    pub fn search_cdrll(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.cdrll,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole, StageId::Dcal],
            StageId::Cdrll,
            true,
            false,
            true,
            &is_mehta_dcal_built,
            &is_mehta_cdrll_built,
        );
    }

    /// Orient the U-layer corners while inserting the DR edge.
    pub fn search_jtle(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.jtle,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole, StageId::Dcal],
            StageId::Jtle,
            true,
            false,
            true,
            &is_mehta_dcal_built,
            &is_mehta_jtle_built,
        );
    }

    /// Solve the whole DR block (TDR variant).
    pub fn search_tdr(&mut self, registry: &CollectionRegistry, policy: Policy) {
        self.lookup_stage(
            &registry.tdr,
            policy,
            &[StageId::Fb, StageId::Qb, StageId::Eole],
            StageId::Tdr,
            true,
            false,
            true,
            &is_mehta_eole_built,
            &is_mehta_tdr_built,
        );
    }

    /// ZBLL finish for the TDR variant.
    pub fn search_zbll(&mut self, registry: &CollectionRegistry, policy: Policy) {
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
                    &[&self.alg_fb, &self.alg_3qb, &self.alg_eole, &self.alg_tdr],
                );
                let cube = Cube::from_algorithm(&seq);
                if !is_mehta_tdr_built(&cube, spin) {
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
        self.time_lookups += start.elapsed().as_secs_f64();
    }

    fn stage_store(&self, id: StageId) -> &SpinVec {
        match id {
            StageId::Fb => &self.alg_fb,
            StageId::Qb => &self.alg_3qb,
            StageId::Eole => &self.alg_eole,
            StageId::SixCo => &self.alg_6co,
            StageId::SixCp => &self.alg_6cp,
            StageId::L5ep => &self.alg_l5ep,
            StageId::Apdr => &self.alg_apdr,
            StageId::Pll => &self.alg_pll,
            StageId::Dcal => &self.alg_dcal,
            StageId::Cdrll => &self.alg_cdrll,
            StageId::Jtle => &self.alg_jtle,
            StageId::Tdr => &self.alg_tdr,
        }
    }

    fn stage_store_mut(&mut self, id: StageId) -> (&mut SpinVec, &mut SpinNames) {
        match id {
            StageId::Fb => (&mut self.alg_fb, &mut self.cases_eole),
            StageId::Qb => (&mut self.alg_3qb, &mut self.cases_eole),
            StageId::Eole => (&mut self.alg_eole, &mut self.cases_eole),
            StageId::SixCo => (&mut self.alg_6co, &mut self.cases_6co),
            StageId::SixCp => (&mut self.alg_6cp, &mut self.cases_6cp),
            StageId::L5ep => (&mut self.alg_l5ep, &mut self.cases_l5ep),
            StageId::Apdr => (&mut self.alg_apdr, &mut self.cases_apdr),
            StageId::Pll => (&mut self.alg_pll, &mut self.cases_pll),
            StageId::Dcal => (&mut self.alg_dcal, &mut self.cases_dcal),
            StageId::Cdrll => (&mut self.alg_cdrll, &mut self.cases_cdrll),
            StageId::Jtle => (&mut self.alg_jtle, &mut self.cases_jtle),
            StageId::Tdr => (&mut self.alg_tdr, &mut self.cases_tdr),
        }
    }

    fn variant(&self, sp: usize) -> MehtaVariant {
        if !self.alg_6cp[sp].is_empty() {
            MehtaVariant::SixCp
        } else if !self.alg_apdr[sp].is_empty() {
            MehtaVariant::Apdr
        } else if !self.alg_cdrll[sp].is_empty() {
            MehtaVariant::Cdrll
        } else if !self.alg_jtle[sp].is_empty() {
            MehtaVariant::Jtle
        } else {
            MehtaVariant::Tdr
        }
    }
}

trait EmptyAll {
    fn is_empty_all(&self) -> bool;
}

impl EmptyAll for SpinVec {
    fn is_empty_all(&self) -> bool {
        self.iter().all(|v| v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageId {
    Fb,
    Qb,
    Eole,
    SixCo,
    SixCp,
    L5ep,
    Apdr,
    Pll,
    Dcal,
    Cdrll,
    Jtle,
    Tdr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MehtaVariant {
    SixCp,
    Apdr,
    Cdrll,
    Jtle,
    Tdr,
}

impl Method for Mehta {
    fn reset(&mut self) {
        let scramble = self.data.scramble.clone();
        let cores = self.data.cores;
        let cancel = self.data.cancel.clone();
        let spins = self.data.search_spins.clone();
        *self = Mehta::new(&scramble, cores);
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
                    &|c| is_mehta_fb_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_3qb[sp][n],
                    "3QB",
                    Some(self.depth_3qb),
                    &|c| is_mehta_3qb_built(c, spin),
                ) && report_stage(
                    &mut line,
                    &mut cube,
                    &self.alg_eole[sp][n],
                    "EOLE",
                    None,
                    &|c| is_mehta_eole_built(c, spin),
                );
                let ok = ok
                    && match self.variant(sp) {
                        MehtaVariant::SixCp => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_6co[sp][n],
                                "6CO",
                                None,
                                &|c| is_mehta_6co_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_6cp[sp][n],
                                "6CP",
                                None,
                                &|c| is_mehta_6cp_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_l5ep[sp][n],
                                "L5EP",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                        MehtaVariant::Apdr => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_6co[sp][n],
                                "6CO",
                                None,
                                &|c| is_mehta_6co_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_apdr[sp][n],
                                "APDR",
                                None,
                                &|c| is_mehta_apdr_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_pll[sp][n],
                                "PLL",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                        MehtaVariant::Cdrll => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_dcal[sp][n],
                                "DCAL",
                                None,
                                &|c| is_mehta_dcal_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_cdrll[sp][n],
                                "CDRLL",
                                None,
                                &|c| is_mehta_cdrll_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_l5ep[sp][n],
                                "L5EP",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                        MehtaVariant::Jtle => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_dcal[sp][n],
                                "DCAL",
                                None,
                                &|c| is_mehta_dcal_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_jtle[sp][n],
                                "JTLE",
                                None,
                                &|c| is_mehta_jtle_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_pll[sp][n],
                                "PLL",
                                None,
                                &|c| c.is_solved(),
                            )
                        }
                        MehtaVariant::Tdr => {
                            report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_tdr[sp][n],
                                "TDR",
                                None,
                                &|c| is_mehta_tdr_built(c, spin),
                            ) && report_stage(
                                &mut line,
                                &mut cube,
                                &self.alg_zbll[sp][n],
                                "ZBLL",
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
        push_stage(&self.alg_3qb[sp][n], "3QB");
        push_stage(&self.alg_eole[sp][n], "EOLE");
        match self.variant(sp) {
            MehtaVariant::SixCp => {
                push_stage(&self.alg_6co[sp][n], "6CO");
                push_stage(&self.alg_6cp[sp][n], "6CP");
                push_stage(&self.alg_l5ep[sp][n], "L5EP");
            }
            MehtaVariant::Apdr => {
                push_stage(&self.alg_6co[sp][n], "6CO");
                push_stage(&self.alg_apdr[sp][n], "APDR");
                push_stage(&self.alg_pll[sp][n], "PLL");
            }
            MehtaVariant::Cdrll => {
                push_stage(&self.alg_dcal[sp][n], "DCAL");
                push_stage(&self.alg_cdrll[sp][n], "CDRLL");
                push_stage(&self.alg_l5ep[sp][n], "L5EP");
            }
            MehtaVariant::Jtle => {
                push_stage(&self.alg_dcal[sp][n], "DCAL");
                push_stage(&self.alg_jtle[sp][n], "JTLE");
                push_stage(&self.alg_pll[sp][n], "PLL");
            }
            MehtaVariant::Tdr => {
                push_stage(&self.alg_tdr[sp][n], "TDR");
                push_stage(&self.alg_zbll[sp][n], "ZBLL");
            }
        }
        report.push_str(&format!(
            "\nMetric: {} {}\n",
            Algorithm::metric_value(self.get_metric_solve(spin, n)),
            self.data.metric
        ));
        report.push_str(&format!("EOLE case: {}\n", self.cases_eole[sp][n]));
        match self.variant(sp) {
            MehtaVariant::SixCp => {
                report.push_str(&format!("6CO case: {}\n", self.cases_6co[sp][n]));
                report.push_str(&format!("6CP case: {}\n", self.cases_6cp[sp][n]));
                report.push_str(&format!("L5EP case: {}\n", self.cases_l5ep[sp][n]));
            }
            MehtaVariant::Apdr => {
                report.push_str(&format!("6CO case: {}\n", self.cases_6co[sp][n]));
                report.push_str(&format!("APDR case: {}\n", self.cases_apdr[sp][n]));
                report.push_str(&format!("PLL case: {}\n", self.cases_pll[sp][n]));
            }
            MehtaVariant::Cdrll => {
                report.push_str(&format!("DCAL case: {}\n", self.cases_dcal[sp][n]));
                report.push_str(&format!("CDRLL case: {}\n", self.cases_cdrll[sp][n]));
                report.push_str(&format!("L5EP case: {}\n", self.cases_l5ep[sp][n]));
            }
            MehtaVariant::Jtle => {
                report.push_str(&format!("DCAL case: {}\n", self.cases_dcal[sp][n]));
                report.push_str(&format!("JTLE case: {}\n", self.cases_jtle[sp][n]));
                report.push_str(&format!("PLL case: {}\n", self.cases_pll[sp][n]));
            }
            MehtaVariant::Tdr => {
                report.push_str(&format!("TDR case: {}\n", self.cases_tdr[sp][n]));
                report.push_str(&format!("ZBLL case: {}\n", self.cases_zbll[sp][n]));
            }
        }
        report
    }

    fn get_time_report(&self) -> String {
        let total = self.time_fb + self.time_3qb + self.time_lookups;
        let mut report = format!("Total time: {:.3} s\n", total);
        report.push_str(&format!("First blocks time: {:.3} s\n", self.time_fb));
        report.push_str(&format!("3QB time: {:.3} s\n", self.time_3qb));
        report.push_str(&format!("Lookup stages time: {:.3} s\n", self.time_lookups));
        report
    }

    fn get_full_solve(&self, spin: Spin, n: usize) -> Algorithm {
        let sp = spin.index();
        if !self.check_solve_consistency(spin) || n >= self.data.inspections[sp].len() {
            return Algorithm::new();
        }
        let mut a = self.data.inspections[sp][n].clone();
        a.append(&self.alg_fb[sp][n]);
        a.append(&self.alg_3qb[sp][n]);
        a.append(&self.alg_eole[sp][n]);
        match self.variant(sp) {
            MehtaVariant::SixCp => {
                a.append(&self.alg_6co[sp][n]);
                a.append(&self.alg_6cp[sp][n]);
                a.append(&self.alg_l5ep[sp][n]);
            }
            MehtaVariant::Apdr => {
                a.append(&self.alg_6co[sp][n]);
                a.append(&self.alg_apdr[sp][n]);
                a.append(&self.alg_pll[sp][n]);
            }
            MehtaVariant::Cdrll => {
                a.append(&self.alg_dcal[sp][n]);
                a.append(&self.alg_cdrll[sp][n]);
                a.append(&self.alg_l5ep[sp][n]);
            }
            MehtaVariant::Jtle => {
                a.append(&self.alg_dcal[sp][n]);
                a.append(&self.alg_jtle[sp][n]);
                a.append(&self.alg_pll[sp][n]);
            }
            MehtaVariant::Tdr => {
                a.append(&self.alg_tdr[sp][n]);
                a.append(&self.alg_zbll[sp][n]);
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
        let tail_ok = (self.alg_6co[sp].len() == n
            && self.alg_6cp[sp].len() == n
            && self.alg_l5ep[sp].len() == n)
            || (self.alg_6co[sp].len() == n
                && self.alg_apdr[sp].len() == n
                && self.alg_pll[sp].len() == n)
            || (self.alg_dcal[sp].len() == n
                && self.alg_cdrll[sp].len() == n
                && self.alg_l5ep[sp].len() == n)
            || (self.alg_dcal[sp].len() == n
                && self.alg_jtle[sp].len() == n
                && self.alg_pll[sp].len() == n)
            || (self.alg_tdr[sp].len() == n && self.alg_zbll[sp].len() == n);
        self.alg_fb[sp].len() == n
            && self.alg_3qb[sp].len() == n
            && self.alg_eole[sp].len() == n
            && tail_ok
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
    fn test_mehta_empty_scramble_tdr() {
        let registry = CollectionRegistry::builtin();
        let scramble = Algorithm::new();
        let mut mehta = Mehta::new(&scramble, -1);
        mehta.data_mut().set_search_spins(&[Spin::UF]);
        assert!(mehta.search_fb(5, 1));
        mehta.search_3qb(5);
        mehta.search_eole(&registry, Policy::First);
        mehta.search_tdr(&registry, Policy::First);
        mehta.search_zbll(&registry, Policy::First);
        assert!(mehta.check_solve_consistency(Spin::UF));
        assert!(mehta.is_solved(Spin::UF, 0));
    }

    #[test]
    fn test_mehta_fb_spin_mapping_is_a_bijection() {
        let mut seen = std::collections::HashSet::new();
        for s in ALL_SPINS {
            assert!(seen.insert(mehta_fb_spin(s)));
        }
    }
}

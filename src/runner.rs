//! Scramble→report façade.
//!
//! Owns the collection registry, the scramble cache and the cooperative
//! cancellation flag; maps request presets to search depths and inspection
//! counts; drives one method pipeline per request and emits progress and
//! result events on a channel.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::algorithm::Algorithm;
use crate::collection::{CollectionRegistry, Policy};
use crate::error::Error;
use crate::moves::Metrics;
use crate::search::DeepSearch;
use crate::solver::{Ceor, Cfop, Lbl, Leor, Mehta, Method, Nautilus, Petrus, Roux, Zz};
use crate::spin::{Layer, Spin, ALL_SPINS};

/// Solving method selector.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SolveMethod {
    Cfop,
    Roux,
    Petrus,
    Zz,
    Ceor,
    Mehta,
    Nautilus,
    Leor,
    Lbl,
}

/// Search effort presets, mapped to engine depth bounds per method.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SpeedPreset {
    #[default]
    Fast,
    Normal,
    Deep,
    Deeper,
}

/// Allowed orientations for the solve.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum OrientPreset {
    #[default]
    All,
    UD,
    FB,
    RL,
    U,
    D,
    F,
    B,
    R,
    L,
}

/// How many first-stage candidates to keep per orientation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum AmountPreset {
    #[default]
    One,
    Three,
    Six,
    Twelve,
    TwentyFour,
}

/// Post-processing switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveFlags {
    pub cache: bool,
    pub regrips: bool,
    pub cancellations: bool,
}

impl SolveFlags {
    /// Decode from the packed bit form (cache, regrips, cancellations).
    pub fn from_bits(bits: u32) -> SolveFlags {
        SolveFlags {
            cache: bits & 1 == 1,
            regrips: (bits >> 1) & 1 == 1,
            cancellations: (bits >> 2) & 1 == 1,
        }
    }
}

/// One solve request.
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub scramble: String,
    pub method: SolveMethod,
    pub cores: i32,
    pub variant: u32,
    pub option: u32,
    pub speed: SpeedPreset,
    pub orient: OrientPreset,
    pub amount: AmountPreset,
    pub metric: Metrics,
    pub flags: SolveFlags,
}

impl Default for SolveRequest {
    fn default() -> Self {
        SolveRequest {
            scramble: String::new(),
            method: SolveMethod::Cfop,
            cores: 0,
            variant: 0,
            option: 0,
            speed: SpeedPreset::default(),
            orient: OrientPreset::default(),
            amount: AmountPreset::default(),
            metric: Metrics::default(),
            flags: SolveFlags::default(),
        }
    }
}

/// Progress and result events emitted while solving.
#[derive(Debug, Clone)]
pub enum SolveEvent {
    /// A pipeline stage started (method-specific label).
    StageStart(&'static str),
    /// The first stage was served from the scramble cache.
    CacheHit,
    /// The first stage found nothing for any orientation.
    NoSolves,
    /// The finished solve.
    Solves {
        scramble: String,
        report: String,
        best_report: String,
        time_report: String,
    },
}

struct CacheEntry {
    scramble: Algorithm,
    depth: usize,
    time: f64,
    solves: Vec<Algorithm>,
}

/// Drives solve requests; owns the registry, cache and cancel flag.
pub struct SolveRunner {
    registry: CollectionRegistry,
    cache: Vec<CacheEntry>,
    cancel: Arc<AtomicBool>,
}

impl Default for SolveRunner {
    fn default() -> Self {
        SolveRunner::new()
    }
}

/// The spins allowed by an orientation preset.
pub fn search_spins(orient: OrientPreset) -> Vec<Spin> {
    use Spin::*;
    match orient {
        OrientPreset::All => ALL_SPINS.to_vec(),
        OrientPreset::UD => vec![UF, UB, UR, UL, DF, DB, DR, DL],
        OrientPreset::FB => vec![FU, FD, FR, FL, BU, BD, BR, BL],
        OrientPreset::RL => vec![RU, RD, RF, RB, LU, LD, LF, LB],
        OrientPreset::U => vec![UF, UB, UR, UL],
        OrientPreset::D => vec![DF, DB, DR, DL],
        OrientPreset::F => vec![FU, FD, FR, FL],
        OrientPreset::B => vec![BU, BD, BR, BL],
        OrientPreset::R => vec![RU, RD, RF, RB],
        OrientPreset::L => vec![LU, LD, LF, LB],
    }
}

/// The cross layers allowed by an orientation preset (CFOP, LBL).
pub fn cross_layers(orient: OrientPreset) -> Vec<Layer> {
    match orient {
        OrientPreset::All => vec![Layer::U, Layer::D, Layer::F, Layer::B, Layer::R, Layer::L],
        OrientPreset::UD => vec![Layer::U, Layer::D],
        OrientPreset::FB => vec![Layer::F, Layer::B],
        OrientPreset::RL => vec![Layer::R, Layer::L],
        OrientPreset::U => vec![Layer::D],
        OrientPreset::D => vec![Layer::U],
        OrientPreset::F => vec![Layer::B],
        OrientPreset::B => vec![Layer::F],
        OrientPreset::R => vec![Layer::L],
        OrientPreset::L => vec![Layer::R],
    }
}

/// Inspection count from the amount preset, scaled by the number of
/// allowed orientations.
fn inspections_for_spins(amount: AmountPreset, n_spins: usize) -> usize {
    let pick = |many: usize, some: usize, few: usize| {
        if n_spins > 20 {
            many
        } else if n_spins > 4 {
            some
        } else {
            few
        }
    };
    match amount {
        AmountPreset::One => 1,
        AmountPreset::Three => pick(1, 3, 6),
        AmountPreset::Six => pick(2, 6, 12),
        AmountPreset::Twelve => pick(4, 12, 24),
        AmountPreset::TwentyFour => pick(8, 24, 48),
    }
}

fn inspections_for_layers(amount: AmountPreset, n_layers: usize) -> usize {
    let pick = |many: usize, some: usize, few: usize| {
        if n_layers > 5 {
            many
        } else if n_layers > 1 {
            some
        } else {
            few
        }
    };
    match amount {
        AmountPreset::One => 1,
        AmountPreset::Three => pick(1, 3, 6),
        AmountPreset::Six => pick(2, 6, 12),
        AmountPreset::Twelve => pick(4, 12, 24),
        AmountPreset::TwentyFour => pick(8, 24, 48),
    }
}

/// First and second stage depth bounds per method and speed preset.
fn depths(method: SolveMethod, speed: SpeedPreset, cache: bool) -> (usize, usize) {
    use SolveMethod::*;
    use SpeedPreset::*;
    match method {
        Cfop | Lbl => match speed {
            Fast => (6, 0),
            Normal => (7, 0),
            Deep => (8, 0),
            Deeper => (if cache { 8 } else { 9 }, 0),
        },
        Roux => match speed {
            Fast => (6, 6),
            Normal => (7, 6),
            Deep => (8, 7),
            Deeper => (8, 8),
        },
        Petrus => match speed {
            Fast => (6, 6),
            Normal => (6, 7),
            Deep => (7, 7),
            Deeper => (8, 8),
        },
        Zz => match speed {
            Fast => (6, 0),
            Normal => (7, 0),
            Deep => (8, 0),
            Deeper => (8, 0),
        },
        Ceor => match speed {
            Fast => (6, 5),
            Normal => (6, 6),
            Deep => (7, 6),
            Deeper => (7, 7),
        },
        Mehta | Nautilus | Leor => match speed {
            Fast => (6, 6),
            Normal => (7, 6),
            Deep => (7, 7),
            Deeper => (8, 7),
        },
    }
}

impl SolveRunner {
    pub fn new() -> Self {
        SolveRunner {
            registry: CollectionRegistry::builtin(),
            cache: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_registry(registry: CollectionRegistry) -> Self {
        SolveRunner {
            registry,
            cache: Vec::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag; setting it requests cooperative cancellation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// First-stage candidates: from the cache when possible, otherwise a
    /// fresh shared base search (cached afterwards unless it was cut short).
    fn first_stage_solves(
        &mut self,
        scramble: &Algorithm,
        depth: usize,
        cores: i32,
        events: &Sender<SolveEvent>,
    ) -> (Vec<Algorithm>, f64, usize, bool) {
        for entry in &self.cache {
            if entry.scramble == *scramble && entry.depth >= depth && !entry.solves.is_empty() {
                let _ = events.send(SolveEvent::CacheHit);
                debug!("cache hit for scramble at depth {}", entry.depth);
                return (entry.solves.clone(), entry.time, entry.depth, true);
            }
        }
        // cache memory usage can be large, drop the previous entry
        self.cache.clear();
        let start = Instant::now();
        let mut ds = DeepSearch::new(scramble);
        ds.set_cancel_handle(self.cancel.clone());
        ds.search_base(depth, cores);
        let elapsed = start.elapsed().as_secs_f64();
        let solves: Vec<Algorithm> = ds.get_solves().to_vec();
        if !ds.check_skip() && !solves.is_empty() {
            self.cache.push(CacheEntry {
                scramble: scramble.clone(),
                depth,
                time: elapsed,
                solves: solves.clone(),
            });
        }
        (solves, elapsed, depth, false)
    }

    fn finish(&self, m: &impl Method, flags: SolveFlags, events: &Sender<SolveEvent>) {
        let _ = events.send(SolveEvent::Solves {
            scramble: m.data().scramble.to_string(),
            report: m.get_report(flags.cancellations, false),
            best_report: m.get_best_report(flags.cancellations),
            time_report: m.get_time_report(),
        });
    }

    /// Run one request, emitting progress and the final result on the
    /// channel. Unparseable scrambles error synchronously; cancellation
    /// returns silently.
    pub fn solve(&mut self, request: &SolveRequest, events: &Sender<SolveEvent>) -> Result<(), Error> {
        let scramble = Algorithm::from_str(&request.scramble)?;
        info!("solving {:?} with {:?}", request.scramble, request.method);
        match request.method {
            SolveMethod::Cfop => self.solve_cfop(&scramble, request, events),
            SolveMethod::Roux => self.solve_roux(&scramble, request, events),
            SolveMethod::Petrus => self.solve_petrus(&scramble, request, events),
            SolveMethod::Zz => self.solve_zz(&scramble, request, events),
            SolveMethod::Ceor => self.solve_ceor(&scramble, request, events),
            SolveMethod::Mehta => self.solve_mehta(&scramble, request, events),
            SolveMethod::Nautilus => self.solve_nautilus(&scramble, request, events),
            SolveMethod::Leor => self.solve_leor(&scramble, request, events),
            SolveMethod::Lbl => self.solve_lbl(&scramble, request, events),
        }
        Ok(())
    }

    fn solve_cfop(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let layers = cross_layers(req.orient);
        let inspections = inspections_for_layers(req.amount, layers.len());
        let (depth, _) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Cfop::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.set_cross_layers(&layers);

        let _ = events.send(SolveEvent::StageStart("cross"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_crosses(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_crosses(depth, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("F2L"));
        m.search_f2l();
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("last layer"));
        match req.variant {
            1 => m.search_1lll(&self.registry, Policy::First),
            2 => {
                m.search_eoll();
                if self.cancelled() {
                    return;
                }
                m.search_zbll(&self.registry, Policy::First);
            }
            _ => {
                m.search_oll(&self.registry, Policy::First);
                m.search_pll(&self.registry, Policy::First);
            }
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_roux(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Roux::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("first block"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth1, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_first_block(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_first_block(depth1, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("second block"));
        m.search_second_blocks_first_square(depth2);
        m.search_second_blocks_second_square(4);
        if self.cancelled() {
            return;
        }

        if req.variant == 1 {
            let _ = events.send(SolveEvent::StageStart("COLL"));
            m.search_coll(&self.registry, Policy::First);
        } else {
            let _ = events.send(SolveEvent::StageStart("CMLL"));
            m.search_cmll(&self.registry, Policy::First);
        }

        let _ = events.send(SolveEvent::StageStart("L6E"));
        if req.option == 1 {
            m.search_l6e(12);
        } else {
            m.search_l6e_orient(8);
            m.search_l6e_2e(9);
            m.search_l6e(11);
        }
        if self.cancelled() {
            return;
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_petrus(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Petrus::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("block"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth1, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_block(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_block(depth1, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("expanded block"));
        m.search_expanded_block();
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("EO"));
        m.search_eo();
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("F2L"));
        m.search_f2l(depth2);
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("last layer"));
        match req.variant {
            1 => {
                m.search_ocll(&self.registry, Policy::First);
                m.search_pll(&self.registry, Policy::First);
            }
            2 => {
                m.search_coll(&self.registry, Policy::First);
                m.search_epll(&self.registry, Policy::First);
            }
            _ => m.search_zbll(&self.registry, Policy::First),
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_zz(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth, _) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Zz::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("EOX"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_eox(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_eox(depth, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("F2L"));
        m.search_f2l();
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("last layer"));
        match req.variant {
            1 => {
                m.search_ocll(&self.registry, Policy::First);
                m.search_pll(&self.registry, Policy::First);
            }
            2 => {
                m.search_coll(&self.registry, Policy::First);
                m.search_epll(&self.registry, Policy::First);
            }
            _ => m.search_zbll(&self.registry, Policy::First),
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_ceor(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Ceor::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        if req.option == 1 {
            let _ = events.send(SolveEvent::StageStart("lines"));
            if req.flags.cache {
                let (solves, time, found_depth, _) =
                    self.first_stage_solves(scramble, 6, req.cores, events);
                if solves.is_empty() {
                    let _ = events.send(SolveEvent::NoSolves);
                    return;
                }
                m.evaluate_lines(&solves, inspections);
                m.set_time_fs(time);
                m.set_depth_fs(found_depth);
            } else if !m.search_lines(6, inspections) {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            if self.cancelled() {
                return;
            }
            let _ = events.send(SolveEvent::StageStart("CP"));
            m.search_cp();
        } else {
            let _ = events.send(SolveEvent::StageStart("CP lines"));
            if req.flags.cache {
                let (solves, time, found_depth, _) =
                    self.first_stage_solves(scramble, 6, req.cores, events);
                if solves.is_empty() {
                    let _ = events.send(SolveEvent::NoSolves);
                    return;
                }
                m.evaluate_cp_lines(&solves, inspections);
                m.set_time_fs(time);
                m.set_depth_fs(found_depth);
            } else if !m.search_cp_lines(6, inspections) {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("pEO extension"));
        m.search_peo(depth1);
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("EOBF"));
        m.search_eo(8);
        m.search_eobf(depth2);
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("F2L"));
        m.search_f2l(10);
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("2GLL"));
        m.search_2gll(&self.registry, Policy::First);
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_mehta(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Mehta::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("first block"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth1, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_fb(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_fb(depth1, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("3QB"));
        m.search_3qb(depth2);
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("EOLE"));
        m.search_eole(&self.registry, Policy::First);

        match req.variant {
            1 => {
                let _ = events.send(SolveEvent::StageStart("6CO"));
                m.search_6co(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("6CP"));
                m.search_6cp(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("L5EP"));
                m.search_l5ep(&self.registry, Policy::First);
            }
            2 => {
                let _ = events.send(SolveEvent::StageStart("6CO"));
                m.search_6co(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("APDR"));
                m.search_apdr(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("PLL"));
                m.search_pll(&self.registry, Policy::First);
            }
            3 => {
                let _ = events.send(SolveEvent::StageStart("DCAL"));
                m.search_dcal(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("CDRLL"));
                m.search_cdrll(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("L5EP"));
                m.search_l5ep(&self.registry, Policy::First);
            }
            4 => {
                let _ = events.send(SolveEvent::StageStart("DCAL"));
                m.search_dcal(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("JTLE"));
                m.search_jtle(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("PLL"));
                m.search_pll(&self.registry, Policy::First);
            }
            _ => {
                let _ = events.send(SolveEvent::StageStart("TDR"));
                m.search_tdr(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("ZBLL"));
                m.search_zbll(&self.registry, Policy::First);
            }
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_nautilus(
        &mut self,
        scramble: &Algorithm,
        req: &SolveRequest,
        events: &Sender<SolveEvent>,
    ) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Nautilus::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("first block"));
        if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth1, req.cores, events);
            if solves.is_empty() {
                let _ = events.send(SolveEvent::NoSolves);
                return;
            }
            m.evaluate_fb(&solves, inspections);
            m.set_time_fs(time);
            m.set_depth_fs(found_depth);
        } else if !m.search_fb(depth1, inspections) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("second block"));
        m.search_sb(depth2);
        if self.cancelled() {
            return;
        }

        match req.variant {
            1 => {
                let _ = events.send(SolveEvent::StageStart("dFR"));
                m.search_pair_dfr(false);
                let _ = events.send(SolveEvent::StageStart("NCOLL"));
                m.search_ncoll(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("L5E"));
                m.search_l5e(&self.registry, Policy::First);
            }
            2 => {
                let _ = events.send(SolveEvent::StageStart("dFR"));
                m.search_pair_dfr(true);
                let _ = events.send(SolveEvent::StageStart("TNCLL"));
                m.search_tncll(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("L5E"));
                m.search_l5e(&self.registry, Policy::First);
            }
            3 | 4 | 5 => {
                let _ = events.send(SolveEvent::StageStart("EODF"));
                m.search_eodf(&self.registry, Policy::First);
                if self.cancelled() {
                    return;
                }
                let _ = events.send(SolveEvent::StageStart("F2L"));
                m.search_f2l();
                if self.cancelled() {
                    return;
                }
                let _ = events.send(SolveEvent::StageStart("last layer"));
                match req.variant {
                    4 => {
                        m.search_ocll(&self.registry, Policy::First);
                        m.search_pll(&self.registry, Policy::First);
                    }
                    5 => {
                        m.search_coll(&self.registry, Policy::First);
                        m.search_epll(&self.registry, Policy::First);
                    }
                    _ => m.search_zbll(&self.registry, Policy::First),
                }
            }
            _ => {
                let _ = events.send(SolveEvent::StageStart("dFR"));
                m.search_pair_dfr(false);
                let _ = events.send(SolveEvent::StageStart("NCLL"));
                m.search_ncll(&self.registry, Policy::First);
                let _ = events.send(SolveEvent::StageStart("L5E"));
                m.search_l5e(&self.registry, Policy::First);
            }
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_leor(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let spins = search_spins(req.orient);
        let inspections = inspections_for_spins(req.amount, spins.len());
        let (depth1, depth2) = depths(req.method, req.speed, req.flags.cache);

        let mut m = Leor::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.data_mut().set_search_spins(&spins);

        let _ = events.send(SolveEvent::StageStart("first block"));
        let found = if req.flags.cache {
            let (solves, time, found_depth, _) =
                self.first_stage_solves(scramble, depth1, req.cores, events);
            if solves.is_empty() {
                false
            } else {
                if req.variant == 1 {
                    m.evaluate_fb_b(&solves, inspections);
                } else {
                    m.evaluate_fb_a(&solves, inspections);
                }
                m.set_time_fs(time);
                m.set_depth_fs(found_depth);
                true
            }
        } else if req.variant == 1 {
            m.search_fb_b(depth1, inspections)
        } else {
            m.search_fb_a(depth1, inspections)
        };
        if !found {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }

        if req.variant == 1 {
            let _ = events.send(SolveEvent::StageStart("FL pair"));
            m.search_fl_pair();
            if self.cancelled() {
                return;
            }
        }
        let _ = events.send(SolveEvent::StageStart("EO stripe"));
        m.search_eo_stripe(depth2);
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("second block"));
        m.search_sb();
        if self.cancelled() {
            return;
        }

        let _ = events.send(SolveEvent::StageStart("last layer"));
        match req.option {
            1 => {
                m.search_ocll(&self.registry, Policy::First);
                m.search_pll(&self.registry, Policy::First);
            }
            2 => {
                m.search_coll(&self.registry, Policy::First);
                m.search_epll(&self.registry, Policy::First);
            }
            _ => m.search_zbll(&self.registry, Policy::First),
        }
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }

    fn solve_lbl(&mut self, scramble: &Algorithm, req: &SolveRequest, events: &Sender<SolveEvent>) {
        let layer = match req.orient {
            OrientPreset::All => Layer::D,
            other => cross_layers(other).first().copied().unwrap_or(Layer::D),
        };
        let (depth, _) = depths(req.method, req.speed, false);

        let mut m = Lbl::new(scramble, req.cores);
        m.data_mut().set_cancel_handle(self.cancel.clone());
        m.data_mut().set_metric(req.metric);
        m.set_cross_layer(layer);

        let _ = events.send(SolveEvent::StageStart("cross"));
        if !m.search_fl_cross(depth) {
            let _ = events.send(SolveEvent::NoSolves);
            return;
        }
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("first layer"));
        m.search_fl_corners();
        let _ = events.send(SolveEvent::StageStart("second layer"));
        m.search_sl_edges();
        if self.cancelled() {
            return;
        }
        let _ = events.send(SolveEvent::StageStart("last layer"));
        m.search_ll_cross1();
        m.search_ll_cross2();
        m.search_ll_corners1();
        m.search_ll_corners2();
        if req.flags.regrips {
            m.set_regrips();
        }
        self.finish(&m, req.flags, events);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::channel;

    use super::*;

    fn run(request: SolveRequest) -> Vec<SolveEvent> {
        let (tx, rx) = channel();
        let mut runner = SolveRunner::new();
        runner.solve(&request, &tx).unwrap();
        drop(tx);
        rx.iter().collect()
    }

    fn final_event(events: &[SolveEvent]) -> &SolveEvent {
        events
            .iter()
            .rev()
            .find(|e| matches!(e, SolveEvent::Solves { .. } | SolveEvent::NoSolves))
            .expect("a final event")
    }

    #[test]
    fn test_invalid_scramble_is_synchronous() {
        let (tx, _rx) = channel();
        let mut runner = SolveRunner::new();
        let request = SolveRequest {
            scramble: "R Q".into(),
            ..SolveRequest::default()
        };
        assert!(runner.solve(&request, &tx).is_err());
    }

    #[test]
    fn test_cfop_solved_scramble_event_flow() {
        let request = SolveRequest {
            scramble: "".into(),
            method: SolveMethod::Cfop,
            cores: -1,
            orient: OrientPreset::U,
            ..SolveRequest::default()
        };
        let events = run(request);
        match final_event(&events) {
            SolveEvent::Solves { report, .. } => {
                // empty scramble: every stage is empty and the metric is 0
                assert!(report.contains("|0"));
            }
            other => panic!("unexpected final event {:?}", other),
        }
    }

    #[test]
    fn test_cfop_single_move() {
        let request = SolveRequest {
            scramble: "R".into(),
            method: SolveMethod::Cfop,
            cores: -1,
            orient: OrientPreset::U,
            ..SolveRequest::default()
        };
        let events = run(request);
        assert!(matches!(
            final_event(&events),
            SolveEvent::Solves { .. } | SolveEvent::NoSolves
        ));
    }

    #[test]
    fn test_cache_hit_on_second_request() {
        let (tx, rx) = channel();
        let mut runner = SolveRunner::new();
        let request = SolveRequest {
            scramble: "R U".into(),
            method: SolveMethod::Roux,
            cores: -1,
            orient: OrientPreset::U,
            flags: SolveFlags {
                cache: true,
                ..SolveFlags::default()
            },
            ..SolveRequest::default()
        };
        runner.solve(&request, &tx).unwrap();
        runner.solve(&request, &tx).unwrap();
        drop(tx);
        let events: Vec<SolveEvent> = rx.iter().collect();
        let hits = events
            .iter()
            .filter(|e| matches!(e, SolveEvent::CacheHit))
            .count();
        assert!(hits >= 1, "second request should hit the cache");
    }

    #[test]
    fn test_roux_standard_scramble() {
        use crate::collection::{CollectionRegistry, Policy};
        use crate::cube::Cube;
        use crate::moves::Metrics;
        use crate::solver::{Method, Roux};

        let registry = CollectionRegistry::builtin();
        let scramble: Algorithm = "F2 L2 D B2 U B2 F2 U2 F2 R2 U L' U L F2 U' F2 R' B' F"
            .parse()
            .unwrap();
        let mut roux = Roux::new(&scramble, 0);
        roux.data_mut().set_metric(Metrics::HTM);
        if !roux.search_first_block(6, 1) {
            return; // no block within the fast bound; nothing to verify
        }
        roux.search_second_blocks_first_square(6);
        roux.search_second_blocks_second_square(5);
        roux.search_cmll(&registry, Policy::First);
        roux.search_l6e_orient(8);
        roux.search_l6e_2e(9);
        roux.search_l6e(11);
        for &spin in &crate::spin::ALL_SPINS {
            if !roux.check_solve_consistency(spin) {
                continue;
            }
            if !roux.is_solved(spin, 0) {
                continue;
            }
            // round trip: reapplying the full sequence solves the cube
            let mut cube = Cube::from_algorithm(&scramble);
            let solve = roux.get_full_solve(spin, 0);
            cube.apply_algorithm(&solve);
            assert!(cube.is_solved());
            let total = solve.metric(Metrics::HTM);
            assert!(total > 0.0 && total < 100.0, "implausible total {}", total);
            // cancellations never increase the metric
            assert!(roux.get_metric_cancellations(spin, 0) <= total);
        }
    }

    #[test]
    fn test_cancellation_returns_silently() {
        let (tx, rx) = channel();
        let mut runner = SolveRunner::new();
        runner.cancel_handle().store(true, Ordering::Relaxed);
        let request = SolveRequest {
            scramble: "R U F' L2".into(),
            method: SolveMethod::Roux,
            cores: -1,
            orient: OrientPreset::U,
            ..SolveRequest::default()
        };
        runner.solve(&request, &tx).unwrap();
        drop(tx);
        let events: Vec<SolveEvent> = rx.iter().collect();
        // no final result when cancelled before the pipeline ends
        assert!(!events
            .iter()
            .any(|e| matches!(e, SolveEvent::Solves { .. })));
    }
}

//! Pure scoring functions ranking first-stage candidates.
//!
//! Every evaluator has the same shape: filter the candidates through the
//! stage predicate, score the survivors with weighted structure bonuses,
//! and return the best few. Candidates are canonically sorted before
//! scoring so multi-core searches rank deterministically.

use crate::algorithm::Algorithm;
use crate::collection::Policy;
use crate::cube::Cube;
use crate::cubie::Corner;
use crate::pieces::PieceGroup;
use crate::solver;
use crate::spin::{Layer, Spin};

/// Weights applied to the scoring criteria. The policy swaps the size and
/// structure magnitudes: `Short` prefers short solves with structures as a
/// tiebreak, `Best` prefers structure-rich solves.
#[derive(Debug, Clone, Copy)]
pub struct EvalWeights {
    pub size: u32,
    pub structure: u32,
    pub opposite: u32,
    pub oriented: u32,
    pub adjacent: u32,
}

impl EvalWeights {
    fn for_policy(policy: Policy) -> EvalWeights {
        match policy {
            Policy::Short | Policy::First => EvalWeights {
                size: 1000,
                structure: 100,
                opposite: 10,
                oriented: 50,
                adjacent: 10,
            },
            Policy::Best => EvalWeights {
                size: 100,
                structure: 1000,
                opposite: 10,
                oriented: 50,
                adjacent: 10,
            },
        }
    }
}

/// One evaluator per kind of first-stage solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// CFOP cross on the given layer, F2L pair bonuses.
    CfopCross(Layer),
    /// Roux first block, F2L pair bonuses.
    RouxFirstBlock(Spin),
    /// Petrus 2x2x2 block, expansion bonuses.
    PetrusBlock(Spin),
    /// ZZ EO line, cross and arrow bonuses.
    ZzEox(Spin),
    /// YruRU line without requiring CP.
    YruruLines(Spin),
    /// YruRU line with the corner permutation solved.
    YruruCpLines(Spin),
    /// CEOR pEO extension (the full left block).
    CeorPeo(Spin),
    /// Mehta first block.
    MehtaFirstBlock(Spin),
    /// Mehta three quarters belt.
    Mehta3qb(Spin),
    /// Nautilus first block, second-block bonuses.
    NautilusFirstBlock(Spin),
    /// Nautilus full second block.
    NautilusSecondBlock(Spin),
    /// Nautilus second block square.
    NautilusSecondBlockSquare(Spin),
}

impl StageKind {
    fn spin(self) -> Spin {
        match self {
            StageKind::CfopCross(layer) => Spin::for_cross_layer(layer),
            StageKind::RouxFirstBlock(s)
            | StageKind::PetrusBlock(s)
            | StageKind::ZzEox(s)
            | StageKind::YruruLines(s)
            | StageKind::YruruCpLines(s)
            | StageKind::CeorPeo(s)
            | StageKind::MehtaFirstBlock(s)
            | StageKind::Mehta3qb(s)
            | StageKind::NautilusFirstBlock(s)
            | StageKind::NautilusSecondBlock(s)
            | StageKind::NautilusSecondBlockSquare(s) => s,
        }
    }

    fn filter(self, c: &Cube) -> bool {
        match self {
            StageKind::CfopCross(layer) => solver::is_cross_built(c, layer),
            StageKind::RouxFirstBlock(s) => solver::is_roux_fb_built(c, s),
            StageKind::PetrusBlock(s) => solver::is_petrus_block_built(c, s),
            StageKind::ZzEox(s) => solver::is_eoline_built(c, s),
            StageKind::YruruLines(s) => solver::is_yruru_line_built(c, s),
            StageKind::YruruCpLines(s) => solver::is_yruru_cp_built(c, s),
            StageKind::CeorPeo(s) => solver::is_roux_fb_built(c, s),
            StageKind::MehtaFirstBlock(s) => solver::is_mehta_fb_built(c, s),
            StageKind::Mehta3qb(s) => solver::is_mehta_3qb_built(c, s),
            StageKind::NautilusFirstBlock(s) => solver::is_roux_fb_built(c, s),
            StageKind::NautilusSecondBlock(s) => solver::is_nautilus_sb_built(c, s),
            StageKind::NautilusSecondBlockSquare(s) => solver::is_nautilus_sbs_built(c, s),
        }
    }

    /// Structure bonuses on top of the base size score.
    fn bonus(self, c: &Cube, w: &EvalWeights) -> u32 {
        let spin = self.spin();
        match self {
            StageKind::CfopCross(_)
            | StageKind::RouxFirstBlock(_)
            | StageKind::MehtaFirstBlock(_) => f2l_pair_bonus(c, spin, w),
            StageKind::PetrusBlock(s) => {
                let mut score = 0;
                if solver::is_petrus_expanded_built(c, s) {
                    score += w.structure;
                }
                score + f2l_pair_bonus(c, s, w)
            }
            StageKind::ZzEox(s) => {
                let mut score = 0;
                if solver::is_eocross_built(c, s) {
                    score += w.structure;
                }
                if solver::is_eoarrow_built(c, s) {
                    score += w.opposite;
                }
                if solver::is_eo223_built(c, s) {
                    score += w.oriented;
                }
                score
            }
            StageKind::YruruLines(s) => {
                if solver::is_yruru_cp_built(c, s) {
                    w.structure
                } else {
                    0
                }
            }
            StageKind::YruruCpLines(_) | StageKind::CeorPeo(_) => 0,
            StageKind::Mehta3qb(s) => {
                let v = c.with_spin(s);
                let solved = Cube::layer_edges(Layer::E)
                    .iter()
                    .filter(|&&e| v.is_edge_solved(e))
                    .count() as u32;
                solved * w.structure
            }
            StageKind::NautilusFirstBlock(s) => {
                let mut score = 0;
                if c.is_group_solved_for(PieceGroup::NautilusSb, s) {
                    score += w.structure;
                }
                if c.is_group_solved_for(PieceGroup::NautilusSbSquare, s) {
                    score += w.opposite;
                }
                score + f2l_pair_bonus(c, s, w)
            }
            StageKind::NautilusSecondBlock(_) | StageKind::NautilusSecondBlockSquare(_) => 0,
        }
    }
}

/// The F2L slot bonuses used by the cross and first-block evaluators: a
/// solved slot scores full structure weight, an oriented pair a medium one,
/// a pair parked in the last layer a small one (more if adjacent).
fn f2l_pair_bonus(c: &Cube, spin: Spin, w: &EvalWeights) -> u32 {
    let v = c.with_spin(spin);
    let mut score = 0;
    for slot in [Corner::DFR, Corner::DLF, Corner::DBL, Corner::DRB] {
        if v.is_group_solved(PieceGroup::F2lPair(slot)) {
            score += w.structure;
        }
        if v.f2l_pair_oriented(slot) {
            score += w.oriented;
        } else if v.f2l_pair_in_layer(slot, Layer::U) {
            score += w.opposite;
            if v.f2l_pair_adjacent(slot) {
                score += w.adjacent;
            }
        }
    }
    score
}

/// Rank candidates for a stage kind: drop the ones failing the stage
/// predicate, score the rest, and return up to `max_out`, best first.
pub fn evaluate(
    kind: StageKind,
    solves: &[Algorithm],
    base: &Cube,
    max_out: usize,
    policy: Policy,
) -> Vec<Algorithm> {
    if solves.is_empty() {
        return Vec::new();
    }
    let weights = EvalWeights::for_policy(policy);

    // canonical order first so multi-core candidate lists rank identically
    let mut candidates: Vec<&Algorithm> = solves.iter().collect();
    candidates.sort_by(|a, b| a.moves().cmp(b.moves()));

    let mut scored: Vec<(u32, &Algorithm)> = Vec::new();
    for alg in candidates {
        let mut check = *base;
        check.apply_algorithm(alg);
        if !kind.filter(&check) {
            continue;
        }
        let len = alg.num_steps() as u32;
        let mut score = if len > 50 { 0 } else { (50 - len) * weights.size };
        score = score.saturating_sub(alg.subjective_score());
        score += kind.bonus(&check, &weights);
        if score > 0 {
            scored.push((score, alg));
        }
    }
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(max_out)
        .map(|(_, a)| a.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_empty_candidates() {
        let base = Cube::new();
        let out = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[],
            &base,
            3,
            Policy::Best,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_filter_rejects_non_solutions() {
        // scramble L2 breaks the reference first block; the candidate L2
        // restores it, the candidate U does not
        let base = Cube::from_moves(&[crate::moves::Move::L2]);
        let fix = Algorithm::from_str("L2").unwrap();
        let noise = Algorithm::from_str("U").unwrap();
        let out = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[noise, fix],
            &base,
            5,
            Policy::Best,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_string(), "L2");
    }

    #[test]
    fn test_shorter_wins_under_short_policy() {
        let base = Cube::new();
        let empty = Algorithm::new();
        let long = Algorithm::from_str("U D U' D'").unwrap();
        // both keep the first block solved; the shorter one must rank first
        let out = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[long.clone(), empty.clone()],
            &base,
            2,
            Policy::Short,
        );
        assert_eq!(out.len(), 2);
        assert!(out[0].is_empty());
    }

    #[test]
    fn test_max_out_truncates() {
        let base = Cube::new();
        let a = Algorithm::from_str("U").unwrap();
        let b = Algorithm::from_str("U'").unwrap();
        let c = Algorithm::from_str("U2").unwrap();
        let out = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[a, b, c],
            &base,
            2,
            Policy::Short,
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_generated_first_block_base() {
        use crate::generator::Generator;
        // a state with the first block pinned accepts the empty candidate
        let base = Cube {
            cc: Generator::solved_groups(&[crate::pieces::PieceGroup::RouxFb]),
        };
        let out = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[Algorithm::new()],
            &base,
            1,
            Policy::Best,
        );
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty());
    }

    #[test]
    fn test_deterministic_under_input_order() {
        let base = Cube::new();
        let a = Algorithm::from_str("U").unwrap();
        let b = Algorithm::from_str("D").unwrap();
        let x = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[a.clone(), b.clone()],
            &base,
            2,
            Policy::Short,
        );
        let y = evaluate(
            StageKind::RouxFirstBlock(Spin::UF),
            &[b, a],
            &base,
            2,
            Policy::Short,
        );
        let xs: Vec<String> = x.iter().map(|s| s.to_string()).collect();
        let ys: Vec<String> = y.iter().map(|s| s.to_string()).collect();
        assert_eq!(xs, ys);
    }
}

//! # speedsolve
//! `speedsolve` - multi-method Rubik's cube solver (CFOP, Roux, Petrus, ZZ,
//! CEOR, Mehta, Nautilus, LEOR and beginner LBL), built around a parallel
//! bounded-depth search engine and per-method pipeline drivers.

pub mod error;
/// Module containing 3x3 cube constants.
pub mod constants;
/// Module for represent a cube on the facelet level.
pub mod facelet;
/// Module for represent a cube on the cubie level.
pub mod cubie;
/// Module for represent moves and metrics.
pub mod moves;
/// Module for move sequences (parsing, shrinking, metrics, regrips).
pub mod algorithm;
/// Module for the 24 whole-cube orientations.
pub mod spin;
/// Module for named piece groups.
pub mod pieces;
/// Module for the spin-aware cube and its predicates.
pub mod cube;
/// Module for algorithm collections and the registry.
pub mod collection;
/// Module for the parallel bounded-depth search engine.
pub mod search;
/// Module for candidate scoring and ranking.
pub mod evaluator;
/// Module for the method pipeline drivers.
pub mod solver;
/// Module for the scramble→report façade.
pub mod runner;
/// Module for random state generation.
pub mod generator;
#[cfg(feature = "term")]
/// Module for print a facelet cube on terminal with color.
pub mod printer;

use std::str::FromStr;

use rand::random;

use moves::Move::{self, *};

/// Generate a random scramble formula.
pub fn scramble() -> Vec<Move> {
    let mut r = Vec::new();
    let mut p = B;
    for _ in 0..25 {
        let m = match random::<u32>() % 6 {
            0 => U,
            1 => R,
            2 => F,
            3 => D,
            4 => L,
            _ => B,
        };
        if m == p {
            continue;
        }
        let s = match random::<u32>() % 3 {
            0 => "",
            1 => "2",
            _ => "'",
        };
        let mv = format!("{}{}", m.get_face(), s);
        let mv = Move::from_str(mv.as_str()).unwrap();
        r.push(mv);
        p = m;
    }
    r
}

#[cfg(test)]
mod tests {
    use crate::scramble;

    #[test]
    fn test_scramble() {
        let r = scramble();
        assert!(!r.is_empty());
        for pair in r.windows(2) {
            assert!(!pair[0].is_same_layer(pair[1]));
        }
    }
}

use std::ops::{Add, Mul};
use std::{fmt, str::FromStr};

use static_init::dynamic;

use self::Move::*;
use crate::cubie::{Corner::*, CubieCube, Edge::*};
use crate::error::Error;
use crate::facelet::Color;

/// Face Turns Moves: Up, Right, Front, Down, Left, Back;
/// Slice Moves: Slice moves only turn the middle layer, M follows the L direction, E follows the D direction, S follows the F direction.
/// Wide Moves: Wide moves turn 2 layers at once. They can be written in 2 ways:
///     Lower case: u, d, r, l, f, b
///     Ending in w: Uw, Dw, Rw, Lw, Fw, Bw
/// Here use second way (the parser accepts both).
/// Cube Rotations: x follows the R direction, y follows the U direction, z follows the F direction.
///
/// $ clockwise, $2 double, $3 counter-clockwise.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, PartialOrd, Ord)]
pub enum Move {
    N,
    U, U2, U3,
    R, R2, R3,
    F, F2, F3,
    D, D2, D3,
    L, L2, L3,
    B, B2, B3,
    M, M2, M3,
    E, E2, E3,
    S, S2, S3,
    Uw, Uw2, Uw3,
    Rw, Rw2, Rw3,
    Fw, Fw2, Fw3,
    Dw, Dw2, Dw3,
    Lw, Lw2, Lw3,
    Bw, Bw2, Bw3,
    x, x2, x3,
    y, y2, y3,
    z, z2, z3,
}

/// Every move of the alphabet, indexed by enum discriminant.
#[rustfmt::skip]
pub const ALL_MOVES_FULL: [Move; 55] = [
    N,
    U, U2, U3, R, R2, R3, F, F2, F3, D, D2, D3, L, L2, L3, B, B2, B3,
    M, M2, M3, E, E2, E3, S, S2, S3,
    Uw, Uw2, Uw3, Rw, Rw2, Rw3, Fw, Fw2, Fw3, Dw, Dw2, Dw3, Lw, Lw2, Lw3, Bw, Bw2, Bw3,
    x, x2, x3, y, y2, y3, z, z2, z3,
];

/// The 18 outer face turns.
#[rustfmt::skip]
pub const ALL_MOVES: [Move; 18] = [
    U, U2, U3, R, R2, R3, F, F2, F3, D, D2, D3, L, L2, L3, B, B2, B3,
];

/// The nine whole-cube rotations.
pub const ROTATIONS: [Move; 9] = [x, x2, x3, y, y2, y3, z, z2, z3];

const BASE_NAMES: [&str; 18] = [
    "U", "R", "F", "D", "L", "B", "M", "E", "S", "Uw", "Rw", "Fw", "Dw", "Lw", "Bw", "x", "y", "z",
];

/// Solution length metrics. Costs per step are documented per variant;
/// rotations are free except in `Movements` and `ETM`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Metrics {
    /// Every step counts 1, rotations included.
    #[default]
    Movements,
    /// Quarter turn metric: face quarter 1, face half 2, wide/slice double.
    QTM,
    /// Half turn metric: face turn 1, wide/slice 2.
    HTM,
    /// Slice turn metric: face, wide and slice turns all 1.
    STM,
    /// Axial turn metric (approximated per-step: as STM).
    ATM,
    /// Execution turn metric: every step counts 1, rotations included.
    ETM,
    /// Outer block turn metric: face or wide 1, slice 2.
    OBTM,
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metrics::Movements => "movements",
            Metrics::QTM => "QTM",
            Metrics::HTM => "HTM",
            Metrics::STM => "STM",
            Metrics::ATM => "ATM",
            Metrics::ETM => "ETM",
            Metrics::OBTM => "OBTM",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == N {
            return write!(f, "");
        }
        let suffix = match self.turns() {
            2 => "2",
            3 => "'",
            _ => "",
        };
        write!(f, "{}{}", BASE_NAMES[self.base()], suffix)
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, turns) = match s {
            _ if s.ends_with('\'') => (&s[..s.len() - 1], 3),
            _ if s.ends_with('3') => (&s[..s.len() - 1], 3),
            _ if s.ends_with('2') => (&s[..s.len() - 1], 2),
            _ => (s, 1),
        };
        let base = match body {
            "U" => 0, "R" => 1, "F" => 2, "D" => 3, "L" => 4, "B" => 5,
            "M" => 6, "E" => 7, "S" => 8,
            "Uw" | "u" => 9, "Rw" | "r" => 10, "Fw" | "f" => 11,
            "Dw" | "d" => 12, "Lw" | "l" => 13, "Bw" | "b" => 14,
            "x" => 15, "y" => 16, "z" => 17,
            _ => return Err(Error::InvalidScramble),
        };
        Ok(Move::from_parts(base, turns))
    }
}

impl Add for Move {
    type Output = Move;

    /// Combine two turns of the same layer. Panics if the layers differ.
    fn add(self, rhs: Self) -> Self::Output {
        if self == N {
            return rhs;
        }
        if rhs == N {
            return self;
        }
        assert!(self.base() == rhs.base());
        let turns = (self.turns() + rhs.turns()) % 4;
        match turns {
            0 => N,
            t => Move::from_parts(self.base(), t),
        }
    }
}

impl Mul<usize> for Move {
    type Output = Move;

    fn mul(self, rhs: usize) -> Self::Output {
        if self == N {
            return N;
        }
        match self.turns() * rhs % 4 {
            0 => N,
            t => Move::from_parts(self.base(), t),
        }
    }
}

impl Move {
    /// Layer index of the move: U R F D L B M E S Uw Rw Fw Dw Lw Bw x y z.
    pub fn base(self) -> usize {
        debug_assert!(self != N);
        (self as usize - 1) / 3
    }

    /// Number of clockwise quarter turns (1, 2 or 3).
    pub fn turns(self) -> usize {
        debug_assert!(self != N);
        (self as usize - 1) % 3 + 1
    }

    /// Rebuild a move from layer index and quarter turn count.
    pub fn from_parts(base: usize, turns: usize) -> Self {
        debug_assert!(base < 18 && turns >= 1 && turns <= 3);
        ALL_MOVES_FULL[1 + base * 3 + turns - 1]
    }

    pub fn get_face(self) -> &'static str {
        BASE_NAMES[self.base()]
    }

    pub fn is_same_layer(&self, other: Move) -> bool {
        *self != N && other != N && self.base() == other.base()
    }

    /// True for two single-face turns on opposite faces (U/D, R/L, F/B).
    pub fn is_inverse(&self, other: Move) -> bool {
        if *self == N || other == N {
            return false;
        }
        let (a, b) = (self.base(), other.base());
        a < 6 && b < 6 && a % 3 == b % 3 && a != b
    }

    pub fn get_inverse(self) -> Self {
        if self == N {
            return N;
        }
        match self.turns() {
            1 => Move::from_parts(self.base(), 3),
            3 => Move::from_parts(self.base(), 1),
            _ => self,
        }
    }

    pub fn is_counter_clockwise(self) -> bool {
        self != N && self.turns() == 3
    }

    pub fn is_clockwise(self) -> bool {
        !self.is_counter_clockwise()
    }

    pub fn is_180(self) -> bool {
        self != N && self.turns() == 2
    }

    pub fn is_single(self) -> bool {
        self != N && self.base() < 6
    }

    pub fn is_slice(self) -> bool {
        self != N && (6..9).contains(&self.base())
    }

    pub fn is_wide(self) -> bool {
        self != N && (9..15).contains(&self.base())
    }

    pub fn is_rotation(self) -> bool {
        self != N && self.base() >= 15
    }

    /// Cost of the move under the given metric.
    pub fn cost(self, metric: Metrics) -> f32 {
        if self == N {
            return 0.0;
        }
        let double = self.is_180();
        match metric {
            Metrics::Movements | Metrics::ETM => 1.0,
            Metrics::QTM => {
                if self.is_rotation() {
                    0.0
                } else if self.is_single() {
                    if double { 2.0 } else { 1.0 }
                } else if double {
                    4.0
                } else {
                    2.0
                }
            }
            Metrics::HTM => {
                if self.is_rotation() {
                    0.0
                } else if self.is_single() {
                    1.0
                } else {
                    2.0
                }
            }
            Metrics::STM | Metrics::ATM => {
                if self.is_rotation() {
                    0.0
                } else {
                    1.0
                }
            }
            Metrics::OBTM => {
                if self.is_rotation() {
                    0.0
                } else if self.is_slice() {
                    2.0
                } else {
                    1.0
                }
            }
        }
    }

    /// Discomfort weight of the move, summed into `Algorithm::subjective_score`.
    /// Right-hand friendly moves are free; back face and S slice are the worst.
    pub fn subjective_weight(self) -> u32 {
        if self == N {
            return 0;
        }
        let base = match self.get_face() {
            "U" | "R" | "Uw" | "Rw" => 0,
            "D" | "L" | "M" | "Dw" | "Lw" => 1,
            "F" | "E" | "Fw" => 2,
            "x" | "y" | "z" => 2,
            "S" => 3,
            _ => 4, // B face family
        };
        base + if self.is_180() { 1 } else { 0 }
    }

    /// The same physical move expressed after the whole cube is first turned
    /// by `rotation`: the unique `t` with `rotation · t == self · rotation`.
    pub fn transform(self, rotation: Move) -> Move {
        if self == N {
            return N;
        }
        if rotation == N {
            return self;
        }
        assert!(rotation.is_rotation());
        TRANSFORM.0[self as usize][(rotation.base() - 15) * 3 + rotation.turns() - 1]
    }
}

/// The basic cube moves described by permutations and changes in orientation.
///
/// N_MOVE
pub const N_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// U_MOVE
pub const U_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// R_MOVE
pub const R_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR], //permutation of the corners
    co: [2, 0, 0, 1, 1, 0, 0, 2],                 //changes of the orientations of the corners
    ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR], //permutation of the edges
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],     //changes of the permutations of the edges
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// F_MOVE
pub const F_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
    co: [1, 2, 0, 0, 2, 1, 0, 0],
    ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
    eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// D_MOVE
pub const D_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// L_MOVE
pub const L_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
    co: [0, 1, 2, 0, 0, 2, 1, 0],
    ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// B_MOVE
pub const B_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
    co: [0, 0, 1, 2, 0, 0, 2, 1],
    ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
    eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// M_MOVE
pub const M_MOVE: CubieCube = CubieCube {
    center: [Color::B, Color::R, Color::U, Color::F, Color::L, Color::D],
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UB, UL, DB, DR, UF, DL, DF, FR, FL, BL, BR],
    eo: [0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// E_MOVE
pub const E_MOVE: CubieCube = CubieCube {
    center: [Color::U, Color::F, Color::L, Color::D, Color::B, Color::R],
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DR, DF, DL, DB, FL, BL, BR, FR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1],
};

/// The basic cube moves described by permutations and changes in orientation.
///
/// S_MOVE
pub const S_MOVE: CubieCube = CubieCube {
    center: [Color::L, Color::U, Color::F, Color::R, Color::D, Color::B],
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UL, UF, DL, UB, UR, DF, DR, DB, FR, FL, BL, BR],
    eo: [1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0],
};

/// Permutation state of a single move, composed from the basic move cubes.
fn basic_state(m: Move) -> CubieCube {
    match m {
        N => N_MOVE,
        U => U_MOVE,
        U2 => U_MOVE * U_MOVE,
        U3 => U_MOVE * U_MOVE * U_MOVE,
        D => D_MOVE,
        D2 => D_MOVE * D_MOVE,
        D3 => D_MOVE * D_MOVE * D_MOVE,
        R => R_MOVE,
        R2 => R_MOVE * R_MOVE,
        R3 => R_MOVE * R_MOVE * R_MOVE,
        L => L_MOVE,
        L2 => L_MOVE * L_MOVE,
        L3 => L_MOVE * L_MOVE * L_MOVE,
        F => F_MOVE,
        F2 => F_MOVE * F_MOVE,
        F3 => F_MOVE * F_MOVE * F_MOVE,
        B => B_MOVE,
        B2 => B_MOVE * B_MOVE,
        B3 => B_MOVE * B_MOVE * B_MOVE,
        M => M_MOVE,
        M2 => M_MOVE * M_MOVE,
        M3 => M_MOVE * M_MOVE * M_MOVE,
        E => E_MOVE,
        E2 => E_MOVE * E_MOVE,
        E3 => E_MOVE * E_MOVE * E_MOVE,
        S => S_MOVE,
        S2 => S_MOVE * S_MOVE,
        S3 => S_MOVE * S_MOVE * S_MOVE,
        Uw => U_MOVE * E_MOVE * E_MOVE * E_MOVE,
        Uw2 => U_MOVE * U_MOVE * E_MOVE * E_MOVE,
        Uw3 => U_MOVE * U_MOVE * U_MOVE * E_MOVE,
        Dw => D_MOVE * E_MOVE,
        Dw2 => D_MOVE * D_MOVE * E_MOVE * E_MOVE,
        Dw3 => D_MOVE * D_MOVE * D_MOVE * E_MOVE * E_MOVE * E_MOVE,
        Rw => R_MOVE * M_MOVE * M_MOVE * M_MOVE,
        Rw2 => R_MOVE * R_MOVE * M_MOVE * M_MOVE,
        Rw3 => R_MOVE * R_MOVE * R_MOVE * M_MOVE,
        Lw => L_MOVE * M_MOVE,
        Lw2 => L_MOVE * L_MOVE * M_MOVE * M_MOVE,
        Lw3 => L_MOVE * L_MOVE * L_MOVE * M_MOVE * M_MOVE * M_MOVE,
        Fw => F_MOVE * S_MOVE,
        Fw2 => F_MOVE * F_MOVE * S_MOVE * S_MOVE,
        Fw3 => F_MOVE * F_MOVE * F_MOVE * S_MOVE * S_MOVE * S_MOVE,
        Bw => B_MOVE * S_MOVE * S_MOVE * S_MOVE,
        Bw2 => B_MOVE * B_MOVE * S_MOVE * S_MOVE,
        Bw3 => B_MOVE * B_MOVE * B_MOVE * S_MOVE,
        x => R_MOVE * M_MOVE * M_MOVE * M_MOVE * L_MOVE * L_MOVE * L_MOVE,
        x2 => R_MOVE * R_MOVE * M_MOVE * M_MOVE * L_MOVE * L_MOVE,
        x3 => R_MOVE * R_MOVE * R_MOVE * M_MOVE * L_MOVE,
        y => U_MOVE * E_MOVE * E_MOVE * E_MOVE * D_MOVE * D_MOVE * D_MOVE,
        y2 => U_MOVE * U_MOVE * E_MOVE * E_MOVE * D_MOVE * D_MOVE,
        y3 => U_MOVE * U_MOVE * U_MOVE * E_MOVE * D_MOVE,
        z => F_MOVE * S_MOVE * B_MOVE * B_MOVE * B_MOVE,
        z2 => F_MOVE * F_MOVE * S_MOVE * S_MOVE * B_MOVE * B_MOVE,
        z3 => F_MOVE * F_MOVE * F_MOVE * S_MOVE * S_MOVE * S_MOVE * B_MOVE,
    }
}

pub(crate) struct MoveCubeTables {
    pub amc: [CubieCube; 55],
}

impl MoveCubeTables {
    fn new() -> Self {
        let mut amc = [CubieCube::default(); 55];
        for (i, m) in ALL_MOVES_FULL.iter().enumerate() {
            amc[i] = basic_state(*m);
        }
        Self { amc }
    }
}

/// Move cube table for every move of the alphabet, indexed by discriminant.
#[dynamic(lazy)]
pub(crate) static MOVE_CUBES: MoveCubeTables = MoveCubeTables::new();

struct TransformTables([[Move; 9]; 55]);

impl TransformTables {
    fn new() -> Self {
        let mut table = [[N; 9]; 55];
        for (mi, m) in ALL_MOVES_FULL.iter().enumerate() {
            if *m == N {
                continue;
            }
            let ms = basic_state(*m);
            for (ri, r) in ROTATIONS.iter().enumerate() {
                let rs = basic_state(*r);
                let target = ms * rs;
                for t in ALL_MOVES_FULL.iter().skip(1) {
                    if rs * basic_state(*t) == target {
                        table[mi][ri] = *t;
                        break;
                    }
                }
                assert!(table[mi][ri] != N);
            }
        }
        Self(table)
    }
}

/// `TRANSFORM.0[m][r]` is `r⁻¹·m·r`: move `m` rewritten for a cube
/// that was first rotated by rotation `r`.
#[dynamic(lazy)]
static TRANSFORM: TransformTables = TransformTables::new();

pub fn inverse_moves(moves: &[Move]) -> Vec<Move> {
    let mut rev: Vec<Move> = moves.iter().map(|m| m.get_inverse()).collect();
    rev.reverse();
    rev
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Move, Move::*, ALL_MOVES_FULL, ROTATIONS};
    use crate::cubie::CubieCube;

    #[test]
    fn test_move_add_mul() {
        assert_eq!(R, R + N);
        assert_eq!(R, N + R);
        let mv = U;
        let mv2 = mv + mv;
        assert_eq!(mv2, U2);
        let mv3 = mv2 + mv;
        assert_eq!(mv3, U3);
        let mv2 = mv3 + mv3 + mv2 + mv2;
        assert_eq!(mv2, U2);
        assert_eq!(R2 + R2, N);
        assert_eq!(Rw2 + Rw, Rw3);
        assert_eq!(y3 + y2, y);
        assert_eq!(N * 3, N);
        assert_eq!(R * 3, R3);
        assert_eq!(R * 97, R);
        assert_eq!(R * 100, N);
        assert_eq!(R3 * 3, R);
        assert_eq!(R2 * 6, N);
    }

    #[test]
    fn test_parse_display() {
        for m in ALL_MOVES_FULL.iter().skip(1) {
            let s = format!("{}", m);
            assert_eq!(Move::from_str(&s).unwrap(), *m);
        }
        assert_eq!(Move::from_str("r").unwrap(), Rw);
        assert_eq!(Move::from_str("u'").unwrap(), Uw3);
        assert_eq!(Move::from_str("f2").unwrap(), Fw2);
        assert!(Move::from_str("Q").is_err());
    }

    #[test]
    fn test_inverse() {
        assert_eq!(R.get_inverse(), R3);
        assert_eq!(R2.get_inverse(), R2);
        assert_eq!(Uw3.get_inverse(), Uw);
        assert_eq!(x.get_inverse(), x3);
        for m in ALL_MOVES_FULL.iter().skip(1) {
            let state = CubieCube::default().apply_move(*m).apply_move(m.get_inverse());
            assert_eq!(state, CubieCube::default());
        }
    }

    #[test]
    fn test_layer_queries() {
        assert!(U.is_same_layer(U2));
        assert!(!U.is_same_layer(D));
        assert!(U.is_inverse(D2));
        assert!(!U.is_inverse(R));
        assert!(!Rw.is_same_layer(R));
        assert!(M.is_slice());
        assert!(Rw2.is_wide());
        assert!(y3.is_rotation());
        assert!(B.is_single());
    }

    #[test]
    fn test_transform_law() {
        // r · t == m · r over the cube model, for every move and rotation.
        for m in ALL_MOVES_FULL.iter().skip(1) {
            for r in ROTATIONS.iter() {
                let t = m.transform(*r);
                let lhs = CubieCube::default().apply_move(*r).apply_move(t);
                let rhs = CubieCube::default().apply_move(*m).apply_move(*r);
                assert_eq!(lhs, rhs, "transform broken for {} by {}", m, r);
            }
        }
    }

    #[test]
    fn test_transform_spot_checks() {
        assert_eq!(U.transform(x), B);
        assert_eq!(F.transform(x), U);
        assert_eq!(R.transform(x), R);
        assert_eq!(R.transform(y), F);
        assert_eq!(U.transform(y), U);
        assert_eq!(U.transform(z), R);
    }

    #[test]
    fn test_metric_costs() {
        use super::Metrics::*;
        assert_eq!(R.cost(HTM), 1.0);
        assert_eq!(R2.cost(HTM), 1.0);
        assert_eq!(R2.cost(QTM), 2.0);
        assert_eq!(M.cost(HTM), 2.0);
        assert_eq!(M.cost(STM), 1.0);
        assert_eq!(Rw.cost(OBTM), 1.0);
        assert_eq!(M2.cost(OBTM), 2.0);
        assert_eq!(x.cost(HTM), 0.0);
        assert_eq!(x.cost(ETM), 1.0);
        assert_eq!(N.cost(HTM), 0.0);
    }
}

use std::fmt;

use static_init::dynamic;

use crate::cubie::CubieCube;
use crate::error::Error;
use crate::facelet::Color;
use crate::moves::{Move, ROTATIONS};

/// One of the 24 whole-cube orientations, named by (up face, front face).
///
/// `UF` is the reference orientation: white up, green front on a standard
/// colour scheme.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Spin {
    UF, UB, UR, UL,
    DF, DB, DR, DL,
    FU, FD, FR, FL,
    BU, BD, BR, BL,
    RU, RD, RF, RB,
    LU, LD, LF, LB,
}

pub const ALL_SPINS: [Spin; 24] = [
    Spin::UF, Spin::UB, Spin::UR, Spin::UL,
    Spin::DF, Spin::DB, Spin::DR, Spin::DL,
    Spin::FU, Spin::FD, Spin::FR, Spin::FL,
    Spin::BU, Spin::BD, Spin::BR, Spin::BL,
    Spin::RU, Spin::RD, Spin::RF, Spin::RB,
    Spin::LU, Spin::LD, Spin::LF, Spin::LB,
];

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A cube layer: the six faces plus the three middle slices.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Layer {
    U, D, F, B, R, L, M, E, S,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Layer {
    pub fn from_color(c: Color) -> Layer {
        match c {
            Color::U => Layer::U,
            Color::R => Layer::R,
            Color::F => Layer::F,
            Color::D => Layer::D,
            Color::L => Layer::L,
            Color::B => Layer::B,
        }
    }

    pub fn opposite(self) -> Layer {
        match self {
            Layer::U => Layer::D,
            Layer::D => Layer::U,
            Layer::F => Layer::B,
            Layer::B => Layer::F,
            Layer::R => Layer::L,
            Layer::L => Layer::R,
            Layer::M => Layer::M,
            Layer::E => Layer::E,
            Layer::S => Layer::S,
        }
    }

    /// The middle slice between a face layer and its opposite.
    pub fn adjacent(self) -> Layer {
        match self {
            Layer::U | Layer::D => Layer::E,
            Layer::F | Layer::B => Layer::S,
            Layer::R | Layer::L => Layer::M,
            other => other,
        }
    }
}

impl Spin {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn up_color(self) -> Color {
        match self {
            Spin::UF | Spin::UB | Spin::UR | Spin::UL => Color::U,
            Spin::DF | Spin::DB | Spin::DR | Spin::DL => Color::D,
            Spin::FU | Spin::FD | Spin::FR | Spin::FL => Color::F,
            Spin::BU | Spin::BD | Spin::BR | Spin::BL => Color::B,
            Spin::RU | Spin::RD | Spin::RF | Spin::RB => Color::R,
            Spin::LU | Spin::LD | Spin::LF | Spin::LB => Color::L,
        }
    }

    pub fn front_color(self) -> Color {
        match self {
            Spin::UF | Spin::DF | Spin::RF | Spin::LF => Color::F,
            Spin::UB | Spin::DB | Spin::RB | Spin::LB => Color::B,
            Spin::UR | Spin::DR | Spin::FR | Spin::BR => Color::R,
            Spin::UL | Spin::DL | Spin::FL | Spin::BL => Color::L,
            Spin::FU | Spin::BU | Spin::RU | Spin::LU => Color::U,
            Spin::FD | Spin::BD | Spin::RD | Spin::LD => Color::D,
        }
    }

    /// Spin of a cube given its center configuration.
    pub fn from_centers(center: &[Color; 6]) -> Result<Spin, Error> {
        let up = center[0];
        let front = center[2];
        for s in ALL_SPINS {
            if s.up_color() == up && s.front_color() == front {
                return Ok(s);
            }
        }
        Err(Error::InvalidSpin)
    }

    /// The layer of the absolute face currently on top for this spin.
    pub fn up_layer(self) -> Layer {
        Layer::from_color(ROTATED_SOLVED.0[self as usize].center[0])
    }

    pub fn down_layer(self) -> Layer {
        self.up_layer().opposite()
    }

    pub fn front_layer(self) -> Layer {
        Layer::from_color(ROTATED_SOLVED.0[self as usize].center[2])
    }

    pub fn back_layer(self) -> Layer {
        self.front_layer().opposite()
    }

    pub fn right_layer(self) -> Layer {
        Layer::from_color(ROTATED_SOLVED.0[self as usize].center[1])
    }

    pub fn left_layer(self) -> Layer {
        self.right_layer().opposite()
    }

    /// Rotation steps (at most two, `N` padded) taking spin `self` to `to`.
    pub fn steps_to(self, to: Spin) -> (Move, Move) {
        SPIN_STEPS.0[self as usize][to as usize]
    }

    /// Rotation steps from the reference spin to this one (the inspection).
    pub fn inspection(self) -> (Move, Move) {
        Spin::UF.steps_to(self)
    }

    /// The spin whose down layer is the given cross layer, CFOP convention.
    pub fn for_cross_layer(layer: Layer) -> Spin {
        match layer {
            Layer::U => Spin::DF,
            Layer::D => Spin::UF,
            Layer::F => Spin::BU,
            Layer::B => Spin::FU,
            Layer::R => Spin::LU,
            Layer::L => Spin::RU,
            _ => Spin::UF,
        }
    }
}

pub(crate) struct RotatedSolvedTables(pub [CubieCube; 24]);

impl RotatedSolvedTables {
    fn new() -> Self {
        let mut table = [CubieCube::default(); 24];
        let solved = CubieCube::default();
        for s in ALL_SPINS {
            let mut found = false;
            'outer: for r1 in std::iter::once(Move::N).chain(ROTATIONS) {
                for r2 in std::iter::once(Move::N).chain(ROTATIONS) {
                    let cc = solved.apply_move(r1).apply_move(r2);
                    if Spin::from_centers(&cc.center).ok() == Some(s) {
                        table[s as usize] = cc;
                        found = true;
                        break 'outer;
                    }
                }
            }
            assert!(found);
        }
        Self(table)
    }
}

/// The solved cube under each of the 24 whole-cube rotations. All
/// spin-relative predicates compare against these reference states.
#[dynamic(lazy)]
pub(crate) static ROTATED_SOLVED: RotatedSolvedTables = RotatedSolvedTables::new();

pub(crate) struct SpinStepTables(pub [[(Move, Move); 24]; 24]);

impl SpinStepTables {
    fn new() -> Self {
        let mut table = [[(Move::N, Move::N); 24]; 24];
        for from in ALL_SPINS {
            let start = ROTATED_SOLVED.0[from as usize];
            for to in ALL_SPINS {
                let target = ROTATED_SOLVED.0[to as usize].center;
                let mut found = false;
                'outer: for r1 in std::iter::once(Move::N).chain(ROTATIONS) {
                    for r2 in std::iter::once(Move::N).chain(ROTATIONS) {
                        if r1 == Move::N && r2 != Move::N {
                            continue; // prefer the single step in first position
                        }
                        let cc = start.apply_move(r1).apply_move(r2);
                        if cc.center == target {
                            table[from as usize][to as usize] = (r1, r2);
                            found = true;
                            break 'outer;
                        }
                    }
                }
                assert!(found);
            }
        }
        Self(table)
    }
}

/// `SPIN_STEPS.0[a][b]` holds the (up to two) rotation steps from spin a to b.
#[dynamic(lazy)]
pub(crate) static SPIN_STEPS: SpinStepTables = SpinStepTables::new();

/// Reference state of the solved cube rotated to the given spin.
pub(crate) fn rotated_solved(s: Spin) -> &'static CubieCube {
    &ROTATED_SOLVED.0[s as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;

    #[test]
    fn test_from_centers_roundtrip() {
        for s in ALL_SPINS {
            let cc = rotated_solved(s);
            assert_eq!(Spin::from_centers(&cc.center).unwrap(), s);
        }
    }

    #[test]
    fn test_reference_spin() {
        assert_eq!(Spin::UF.inspection(), (Move::N, Move::N));
        assert_eq!(Spin::UF.up_layer(), Layer::U);
        assert_eq!(Spin::UF.front_layer(), Layer::F);
        assert_eq!(Spin::UF.right_layer(), Layer::R);
        assert_eq!(Spin::FD.up_layer(), Layer::F);
        assert_eq!(Spin::FD.front_layer(), Layer::D);
    }

    #[test]
    fn test_steps_between_all_spins() {
        for from in ALL_SPINS {
            for to in ALL_SPINS {
                let (r1, r2) = from.steps_to(to);
                let cc = rotated_solved(from).apply_move(r1).apply_move(r2);
                assert_eq!(Spin::from_centers(&cc.center).unwrap(), to);
            }
        }
    }

    #[test]
    fn test_layers() {
        assert_eq!(Layer::U.opposite(), Layer::D);
        assert_eq!(Layer::U.adjacent(), Layer::E);
        assert_eq!(Layer::R.adjacent(), Layer::M);
        assert_eq!(Layer::F.adjacent(), Layer::S);
        assert_eq!(Spin::for_cross_layer(Layer::U), Spin::DF);
        assert_eq!(Spin::for_cross_layer(Layer::D).down_layer(), Layer::D);
    }
}

use std::ops::Mul;

use self::{Corner::*, Edge::*};
use crate::constants::{ALL_CORNERS, ALL_EDGES};
use crate::error::Error;
use crate::facelet::Color;
use crate::moves::{Move, MOVE_CUBES};

/// Represents the 8 corners on the cube, described by the layer they are on.
///
/// Example: `ULB` (Up, Left, Bottom).
///
/// The same enum names the 8 corner positions: `cp[ULB as usize]` is the
/// corner piece sitting in the ULB position.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Eq, Hash)]
pub enum Corner {
    URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB,
}

impl TryFrom<u8> for Corner {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ALL_CORNERS
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidCorner)
    }
}

/// Represents the 12 edges on the cube, described by the layer they are on.
///
/// Example: `BL` (Bottom, Left). Doubles as the 12 edge position names.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Eq, Hash)]
pub enum Edge {
    UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR,
}

impl TryFrom<u8> for Edge {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ALL_EDGES
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidEdge)
    }
}

/// Cube on the cubie level.
///
/// Moves permute pieces over fixed spatial position labels; slice, wide and
/// rotation moves also permute the `center` array. The whole-cube
/// orientation (spin) is always derived from the centers, never stored.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CubieCube {
    /// Center permutation, relative to SOLVED_CUBIE_CUBE.
    pub center: [Color; 6],
    /// Corner permutation, relative to SOLVED_CUBIE_CUBE.
    pub cp: [Corner; 8],
    /// Corner orientation, 3 possible values: 0 (correctly oriented), 1 (twisted clockwise), 2 (twisted counter-clockwise).
    pub co: [u8; 8],
    /// Edge permutation, relative to SOLVED_CUBIE_CUBE.
    pub ep: [Edge; 12],
    /// Edge orientation, 2 possible values: 0 (correctly oriented), 1 (flipped).
    pub eo: [u8; 12],
}

/// Solved cube on the Cubie level.
pub const SOLVED_CUBIE_CUBE: CubieCube = CubieCube {
    center: [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B],
    cp: [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

impl Default for CubieCube {
    fn default() -> Self {
        SOLVED_CUBIE_CUBE
    }
}

impl Mul for CubieCube {
    type Output = Self;

    /// Group composition: `a * b` is the state after performing `a`, then
    /// the transformation `b`. Permutations chain through `b`'s indices and
    /// orientations add on the way.
    fn mul(self, rhs: CubieCube) -> Self::Output {
        let mut out = self;
        for i in 0..8 {
            let from = rhs.cp[i] as usize;
            out.cp[i] = self.cp[from];
            out.co[i] = (self.co[from] + rhs.co[i]) % 3;
        }
        for i in 0..12 {
            let from = rhs.ep[i] as usize;
            out.ep[i] = self.ep[from];
            out.eo[i] = (self.eo[from] + rhs.eo[i]) % 2;
        }
        for i in 0..6 {
            out.center[i] = self.center[rhs.center[i] as usize];
        }
        out
    }
}

impl CubieCube {
    /// Applies a move to the current state.
    pub fn apply_move(self, move_name: Move) -> Self {
        self * MOVE_CUBES.amc[move_name as usize]
    }

    /// Applies the sequence of moves to the current state.
    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        moves.iter().fold(*self, |acc, &m| acc.apply_move(m))
    }

    /// Check that this is a reachable cube state: every piece exactly once,
    /// orientation sums balanced, corner and edge permutation parities equal.
    pub fn verify(&self) -> Result<(), Error> {
        let mut seen = [false; 8];
        for c in self.cp {
            if std::mem::replace(&mut seen[c as usize], true) {
                return Err(Error::InvalidCorner);
            }
        }
        if self.co.iter().any(|o| *o > 2)
            || self.co.iter().map(|o| u32::from(*o)).sum::<u32>() % 3 != 0
        {
            return Err(Error::InvalidCorner);
        }
        let mut seen = [false; 12];
        for e in self.ep {
            if std::mem::replace(&mut seen[e as usize], true) {
                return Err(Error::InvalidEdge);
            }
        }
        if self.eo.iter().any(|o| *o > 1)
            || self.eo.iter().map(|o| u32::from(*o)).sum::<u32>() % 2 != 0
        {
            return Err(Error::InvalidEdge);
        }
        if permutation_parity(&self.cp) != permutation_parity(&self.ep) {
            return Err(Error::ParityError);
        }
        Ok(())
    }
}

/// Parity of a permutation given as a slice of distinct orderable values;
/// true for an even number of inversions. A reachable cube has equal corner
/// and edge parity.
pub fn permutation_parity<T: PartialOrd>(arr: &[T]) -> bool {
    let mut inversions = 0;
    for i in 0..arr.len() {
        for j in i + 1..arr.len() {
            if arr[i] > arr[j] {
                inversions += 1;
            }
        }
    }
    inversions % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move::*;
    use crate::moves::{ROTATIONS, R_MOVE};

    #[test]
    fn test_eq() {
        let state = CubieCube::default();
        let state2 = CubieCube::default();
        assert_eq!(state, state2);
    }

    #[test]
    fn test_single_move_matches_table() {
        assert_eq!(CubieCube::default().apply_move(R), R_MOVE);
        let r2 = CubieCube::default().apply_move(R).apply_move(R);
        assert_eq!(r2, R_MOVE * R_MOVE);
        assert_eq!(r2.apply_move(R2), CubieCube::default());
    }

    #[test]
    fn test_parity() {
        let state = CubieCube::default();
        assert!(permutation_parity(&state.cp));
        assert!(permutation_parity(&state.ep));

        // a quarter turn is a 4-cycle on both piece kinds: both parities flip
        let state = CubieCube::default().apply_move(R);
        assert!(!permutation_parity(&state.cp));
        assert!(!permutation_parity(&state.ep));
        assert!(state.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_twists_and_flips() {
        let mut cc = CubieCube::default();
        cc.co[0] = 1;
        assert!(cc.verify().is_err());
        let mut cc = CubieCube::default();
        cc.eo[3] = 1;
        assert!(cc.verify().is_err());
        let mut cc = CubieCube::default();
        cc.cp.swap(0, 1);
        assert!(cc.verify().is_err());
        // balancing the twist makes the state reachable again
        let mut cc = CubieCube::default();
        cc.co[0] = 1;
        cc.co[1] = 2;
        assert!(cc.verify().is_ok());
    }

    #[test]
    fn test_move_n() {
        let cc = CubieCube::default().apply_move(N);
        assert_eq!(cc, CubieCube::default());
        let with_n = CubieCube::default().apply_moves(&[R, U, R3, U3, N, R, U, R3]);
        let without = CubieCube::default().apply_moves(&[R, U, R3, U3, R, U, R3]);
        assert_eq!(with_n, without);
    }

    #[test]
    fn test_move_sequence() {
        // (R U R' U') * 6
        let moves = [
            R, U, R3, U3, R, U, R3, U3, R, U, R3, U3, R, U, R3, U3, R, U, R3, U3, R, U, R3, U3,
        ];
        let state = CubieCube::default().apply_moves(&moves);
        assert_eq!(state, SOLVED_CUBIE_CUBE);
    }

    #[test]
    fn test_slice_wide_rotation_scramble() {
        // Rw U2 M' D B E2 F' L S z y'
        let scramble = [Rw, U2, M3, D, B, E2, F3, L, S, z, y3];
        let state = CubieCube::default().apply_moves(&scramble);

        let expected = CubieCube {
            center: [Color::U, Color::F, Color::L, Color::D, Color::B, Color::R],
            cp: [ULB, URF, DFR, UFL, DBL, UBR, DRB, DLF],
            co: [0, 1, 2, 0, 0, 2, 1, 0],
            ep: [FR, UB, DF, DB, DL, UL, FL, DR, BR, BL, UR, UF],
            eo: [1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 1, 0],
        };

        assert_eq!(state, expected);
        assert!(state.verify().is_ok());
    }

    #[test]
    fn test_rotation_keeps_solved() {
        for r in ROTATIONS {
            let cc = CubieCube::default().apply_move(r);
            assert!(cc.verify().is_ok());
            let back = cc.apply_move(r.get_inverse());
            assert_eq!(back, SOLVED_CUBIE_CUBE);
        }
    }
}

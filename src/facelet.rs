use std::fmt;

use crate::cubie::CubieCube;
use crate::spin::Spin;

/// Names the colors of the cube facelets: up, right, front, down, left, back.
#[rustfmt::skip]
#[derive(Debug, PartialEq, PartialOrd, Clone, Copy, Eq, Hash)]
pub enum Color {
    U, R, F, D, L, B,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Cube on the facelet level, used for rendering.
///
/// The 54 stickers follow the face order U-R-F-D-L-B, nine cells per face in
/// reading order; sticker `i` sits on face `i / 9`, cell `i % 9`. A solved
/// cube reads `UUUUUUUUURRRRRRRRR...`.
#[derive(Debug, PartialEq, Clone)]
pub struct FaceCube {
    pub f: [Color; 54],
}

impl FaceCube {
    /// Render a cubie-level state. The whole-cube rotation is normalised
    /// away first (via the spin tables) so the picture always shows U on
    /// top and F in front.
    pub fn from_cubie(state: &CubieCube) -> FaceCube {
        let mut cc = *state;
        if let Ok(spin) = Spin::from_centers(&cc.center) {
            let (r1, r2) = spin.steps_to(Spin::UF);
            cc = cc.apply_move(r1).apply_move(r2);
        }

        let mut f = [Color::U; 54];
        for (face, color) in cc.center.iter().enumerate() {
            f[face * 9 + 4] = *color;
        }
        for (pos, slots) in CORNER_FACELET.iter().enumerate() {
            let piece = cc.cp[pos] as usize;
            let ori = cc.co[pos] as usize;
            for (slot, cell) in slots.iter().enumerate() {
                f[*cell as usize] = CORNER_COLOR[piece][(slot + 3 - ori) % 3];
            }
        }
        for (pos, slots) in EDGE_FACELET.iter().enumerate() {
            let piece = cc.ep[pos] as usize;
            let ori = cc.eo[pos] as usize;
            for (slot, cell) in slots.iter().enumerate() {
                f[*cell as usize] = EDGE_COLOR[piece][(slot + ori) % 2];
            }
        }
        FaceCube { f }
    }

    /// One face as a 3x3 block of colors.
    pub fn face(&self, face: usize) -> [[Color; 3]; 3] {
        let base = face * 9;
        std::array::from_fn(|row| std::array::from_fn(|col| self.f[base + row * 3 + col]))
    }
}

impl Default for FaceCube {
    fn default() -> Self {
        FaceCube::from_cubie(&CubieCube::default())
    }
}

impl From<&CubieCube> for FaceCube {
    fn from(state: &CubieCube) -> Self {
        FaceCube::from_cubie(state)
    }
}

impl fmt::Display for FaceCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.f.iter() {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

// Sticker layout tables. A facelet index is face * 9 + cell with faces in
// U-R-F-D-L-B order; slot 0 of a corner is its U/D sticker and slot 0 of an
// edge its primary sticker, matching the orientation convention of the
// cubie model.

/// Facelet indices of the three stickers of each corner position.
pub const CORNER_FACELET: [[u8; 3]; 8] = [
    [8, 9, 20],   // URF
    [6, 18, 38],  // UFL
    [0, 36, 47],  // ULB
    [2, 45, 11],  // UBR
    [29, 26, 15], // DFR
    [27, 44, 24], // DLF
    [33, 53, 42], // DBL
    [35, 17, 51], // DRB
];

/// Facelet indices of the two stickers of each edge position.
pub const EDGE_FACELET: [[u8; 2]; 12] = [
    [5, 10],  // UR
    [7, 19],  // UF
    [3, 37],  // UL
    [1, 46],  // UB
    [32, 16], // DR
    [28, 25], // DF
    [30, 43], // DL
    [34, 52], // DB
    [23, 12], // FR
    [21, 41], // FL
    [50, 39], // BL
    [48, 14], // BR
];

/// Sticker colors of each corner piece, slot 0 first.
pub const CORNER_COLOR: [[Color; 3]; 8] = [
    [Color::U, Color::R, Color::F],
    [Color::U, Color::F, Color::L],
    [Color::U, Color::L, Color::B],
    [Color::U, Color::B, Color::R],
    [Color::D, Color::F, Color::R],
    [Color::D, Color::L, Color::F],
    [Color::D, Color::B, Color::L],
    [Color::D, Color::R, Color::B],
];

/// Sticker colors of each edge piece, slot 0 first.
pub const EDGE_COLOR: [[Color; 2]; 12] = [
    [Color::U, Color::R],
    [Color::U, Color::F],
    [Color::U, Color::L],
    [Color::U, Color::B],
    [Color::D, Color::R],
    [Color::D, Color::F],
    [Color::D, Color::L],
    [Color::D, Color::B],
    [Color::F, Color::R],
    [Color::F, Color::L],
    [Color::B, Color::L],
    [Color::B, Color::R],
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::moves::Move::*;

    #[test]
    fn test_layout_covers_every_sticker_once() {
        let mut seen = [0u8; 54];
        for face in 0..6 {
            seen[face * 9 + 4] += 1;
        }
        for slots in CORNER_FACELET {
            for cell in slots {
                seen[cell as usize] += 1;
            }
        }
        for slots in EDGE_FACELET {
            for cell in slots {
                seen[cell as usize] += 1;
            }
        }
        assert!(seen.iter().all(|n| *n == 1));
    }

    #[test]
    fn test_solved_rendering() {
        let fc = FaceCube::default();
        let text = fc.to_string();
        assert_eq!(
            text,
            "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB"
        );
    }

    #[test]
    fn test_single_turn_rendering() {
        // an R turn lifts the F column onto U and drops U onto B; the R
        // face itself keeps its own color
        let cc = CubieCube::default().apply_move(R);
        let fc = FaceCube::from_cubie(&cc);
        assert_eq!(
            fc.to_string(),
            "UUFUUFUUFRRRRRRRRRFFDFFDFFDDDBDDBDDBLLLLLLLLLUBBUBBUBB"
        );
        assert_eq!(fc.face(1), [[Color::R; 3]; 3]);
    }

    #[test]
    fn test_rotation_normalised_away() {
        // a rotated but otherwise solved cube renders as solved
        let cc = CubieCube::default().apply_move(x).apply_move(y2);
        let fc = FaceCube::from_cubie(&cc);
        assert_eq!(fc, FaceCube::default());
        // and a rotated scramble renders like the unrotated one
        let a = CubieCube::default().apply_moves(&[R, U2, F3]);
        let b = CubieCube::default().apply_moves(&[R, U2, F3, z, y]);
        assert_eq!(FaceCube::from_cubie(&a), FaceCube::from_cubie(&b));
    }
}

use std::fmt;

use crate::algorithm::Algorithm;
use crate::cubie::{Corner, CubieCube, Edge};
use crate::facelet::{Color, FaceCube, CORNER_COLOR, CORNER_FACELET, EDGE_COLOR, EDGE_FACELET};
use crate::moves::Move;
use crate::pieces::PieceGroup;
use crate::spin::{rotated_solved, Layer, Spin};

/// A cube plus its whole-cube orientation.
///
/// Convention: moves permute pieces over fixed spatial position labels, and
/// rotations permute the centers too, so the spin is always derived from the
/// center configuration. Every spin-relative predicate compares the cube
/// against the solved cube held in the same spin (`spin::rotated_solved`),
/// which removes any per-spin case analysis from the call sites.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Cube {
    pub cc: CubieCube,
}

impl Default for Cube {
    fn default() -> Self {
        Cube {
            cc: CubieCube::default(),
        }
    }
}

/// A color and the color of the opposite face.
fn axis_pair(c: Color) -> [Color; 2] {
    match c {
        Color::U | Color::D => [Color::U, Color::D],
        Color::F | Color::B => [Color::F, Color::B],
        Color::R | Color::L => [Color::R, Color::L],
    }
}

/// The sticker faces consulted first when measuring edge orientation
/// against the given axis (the classical good/bad edge rule).
fn reference_pair(axis: [Color; 2]) -> [Color; 2] {
    match axis[0] {
        Color::F | Color::B => [Color::U, Color::D],
        Color::U | Color::D => [Color::F, Color::B],
        _ => [Color::U, Color::D],
    }
}

/// Home color of an absolute face index (U R F D L B order).
fn face_home_color(face: usize) -> Color {
    match face {
        0 => Color::U,
        1 => Color::R,
        2 => Color::F,
        3 => Color::D,
        4 => Color::L,
        _ => Color::B,
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", FaceCube::from_cubie(&self.cc))
    }
}

impl Cube {
    pub fn new() -> Self {
        Cube::default()
    }

    pub fn from_moves(moves: &[Move]) -> Self {
        Cube {
            cc: CubieCube::default().apply_moves(moves),
        }
    }

    pub fn from_algorithm(alg: &Algorithm) -> Self {
        let mut c = Cube::default();
        c.apply_algorithm(alg);
        c
    }

    pub fn apply(&mut self, m: Move) {
        self.cc = self.cc.apply_move(m);
    }

    pub fn apply_moves(&mut self, moves: &[Move]) {
        self.cc = self.cc.apply_moves(moves);
    }

    pub fn apply_algorithm(&mut self, alg: &Algorithm) {
        for m in alg.moves() {
            self.cc = self.cc.apply_move(*m);
        }
    }

    /// Whole-cube orientation, derived from the centers.
    pub fn spin(&self) -> Spin {
        Spin::from_centers(&self.cc.center).expect("centers always name a spin")
    }

    /// Physically rotate the cube so its spin becomes `s`.
    pub fn set_spin(&mut self, s: Spin) {
        let (r1, r2) = self.spin().steps_to(s);
        if r1 != Move::N {
            self.apply(r1);
        }
        if r2 != Move::N {
            self.apply(r2);
        }
    }

    pub fn with_spin(&self, s: Spin) -> Cube {
        let mut c = *self;
        c.set_spin(s);
        c
    }

    /// Fully solved in any orientation.
    pub fn is_solved(&self) -> bool {
        self.cc == *rotated_solved(self.spin())
    }

    /// Every piece of the group is home, relative to the current orientation.
    pub fn is_group_solved(&self, g: PieceGroup) -> bool {
        let r = rotated_solved(self.spin());
        g.corners().iter().all(|&q| {
            self.cc.cp[q as usize] == r.cp[q as usize] && self.cc.co[q as usize] == r.co[q as usize]
        }) && g.edges().iter().all(|&q| {
            self.cc.ep[q as usize] == r.ep[q as usize] && self.cc.eo[q as usize] == r.eo[q as usize]
        })
    }

    pub fn is_group_solved_for(&self, g: PieceGroup, s: Spin) -> bool {
        if self.spin() == s {
            self.is_group_solved(g)
        } else {
            self.with_spin(s).is_group_solved(g)
        }
    }

    /// The group's pieces are at the group's positions, orientation ignored.
    pub fn positions_match(&self, g: PieceGroup) -> bool {
        let r = rotated_solved(self.spin());
        g.corners()
            .iter()
            .all(|&q| self.cc.cp[q as usize] == r.cp[q as usize])
            && g.edges()
                .iter()
                .all(|&q| self.cc.ep[q as usize] == r.ep[q as usize])
    }

    pub fn positions_match_for(&self, g: PieceGroup, s: Spin) -> bool {
        if self.spin() == s {
            self.positions_match(g)
        } else {
            self.with_spin(s).positions_match(g)
        }
    }

    /// The group's pieces have correct orientation relative to the current
    /// orientation; home position is not required.
    pub fn check_orientation(&self, g: PieceGroup) -> bool {
        self.check_orientation_for(g, self.spin())
    }

    /// Orientation is frame relative: edges are measured against the frame's
    /// front/back axis, corners against its up/down axis. The cube is first
    /// rotated back to the reference so sticker faces line up with colors.
    pub fn check_orientation_for(&self, g: PieceGroup, s: Spin) -> bool {
        let r = rotated_solved(s);
        let norm = self.with_spin(Spin::UF);
        let edge_axis = axis_pair(s.front_color());
        let corner_axis = axis_pair(s.up_color());
        g.corners().iter().all(|&q| {
            let piece = r.cp[q as usize];
            norm.corner_oriented_on_axis(norm.position_of_corner(piece), corner_axis)
        }) && g.edges().iter().all(|&q| {
            let piece = r.ep[q as usize];
            norm.edge_oriented_on_axis(norm.position_of_edge(piece), edge_axis)
        })
    }

    /// Edge orientation against a color axis, on a reference-spin cube: if
    /// the edge shows a sticker on a reference-axis face, that sticker must
    /// carry a reference-axis color; otherwise its axis-face sticker must
    /// carry an axis color.
    fn edge_oriented_on_axis(&self, q: Edge, axis: [Color; 2]) -> bool {
        let reference = reference_pair(axis);
        for (slot, fl) in EDGE_FACELET[q as usize].iter().enumerate() {
            let face_color = face_home_color(*fl as usize / 9);
            if reference.contains(&face_color) {
                return reference.contains(&self.edge_sticker(q, slot));
            }
        }
        for (slot, fl) in EDGE_FACELET[q as usize].iter().enumerate() {
            let face_color = face_home_color(*fl as usize / 9);
            if axis.contains(&face_color) {
                return axis.contains(&self.edge_sticker(q, slot));
            }
        }
        false
    }

    /// Corner orientation against a color axis, on a reference-spin cube:
    /// the sticker on the axis face must carry an axis color.
    fn corner_oriented_on_axis(&self, q: Corner, axis: [Color; 2]) -> bool {
        for (slot, fl) in CORNER_FACELET[q as usize].iter().enumerate() {
            let face_color = face_home_color(*fl as usize / 9);
            if axis.contains(&face_color) {
                return axis.contains(&self.corner_sticker(q, slot));
            }
        }
        false
    }

    /// The piece belonging to the given corner position (current orientation)
    /// is in place with correct orientation.
    pub fn is_corner_solved(&self, q: Corner) -> bool {
        let r = rotated_solved(self.spin());
        self.cc.cp[q as usize] == r.cp[q as usize] && self.cc.co[q as usize] == r.co[q as usize]
    }

    pub fn is_edge_solved(&self, q: Edge) -> bool {
        let r = rotated_solved(self.spin());
        self.cc.ep[q as usize] == r.ep[q as usize] && self.cc.eo[q as usize] == r.eo[q as usize]
    }

    pub fn is_corner_solved_for(&self, q: Corner, s: Spin) -> bool {
        if self.spin() == s {
            self.is_corner_solved(q)
        } else {
            self.with_spin(s).is_corner_solved(q)
        }
    }

    pub fn is_edge_solved_for(&self, q: Edge, s: Spin) -> bool {
        if self.spin() == s {
            self.is_edge_solved(q)
        } else {
            self.with_spin(s).is_edge_solved(q)
        }
    }

    pub fn position_of_corner(&self, piece: Corner) -> Corner {
        for q in 0..8 {
            if self.cc.cp[q] == piece {
                return Corner::try_from(q as u8).unwrap();
            }
        }
        unreachable!("every corner piece is somewhere")
    }

    pub fn position_of_edge(&self, piece: Edge) -> Edge {
        for q in 0..12 {
            if self.cc.ep[q] == piece {
                return Edge::try_from(q as u8).unwrap();
            }
        }
        unreachable!("every edge piece is somewhere")
    }

    pub fn corner_at(&self, q: Corner) -> Corner {
        self.cc.cp[q as usize]
    }

    pub fn edge_at(&self, q: Edge) -> Edge {
        self.cc.ep[q as usize]
    }

    /// Corner positions of a layer in the observer frame.
    pub fn layer_corners(l: Layer) -> &'static [Corner] {
        use Corner::*;
        match l {
            Layer::U => &[URF, UFL, ULB, UBR],
            Layer::D => &[DFR, DLF, DBL, DRB],
            Layer::F => &[URF, UFL, DFR, DLF],
            Layer::B => &[ULB, UBR, DBL, DRB],
            Layer::R => &[URF, UBR, DFR, DRB],
            Layer::L => &[UFL, ULB, DLF, DBL],
            _ => &[],
        }
    }

    /// Edge positions of a layer in the observer frame.
    pub fn layer_edges(l: Layer) -> &'static [Edge] {
        use Edge::*;
        match l {
            Layer::U => &[UR, UF, UL, UB],
            Layer::D => &[DR, DF, DL, DB],
            Layer::F => &[UF, DF, FR, FL],
            Layer::B => &[UB, DB, BL, BR],
            Layer::R => &[UR, DR, FR, BR],
            Layer::L => &[UL, DL, FL, BL],
            Layer::M => &[UF, UB, DF, DB],
            Layer::E => &[FR, FL, BL, BR],
            Layer::S => &[UR, UL, DR, DL],
        }
    }

    /// Every piece of the observer-frame layer is in place.
    pub fn is_layer_solved(&self, l: Layer) -> bool {
        let r = rotated_solved(self.spin());
        Cube::layer_corners(l).iter().all(|&q| {
            self.cc.cp[q as usize] == r.cp[q as usize] && self.cc.co[q as usize] == r.co[q as usize]
        }) && Cube::layer_edges(l).iter().all(|&q| {
            self.cc.ep[q as usize] == r.ep[q as usize] && self.cc.eo[q as usize] == r.eo[q as usize]
        })
    }

    fn face_index(l: Layer) -> Option<usize> {
        match l {
            Layer::U => Some(0),
            Layer::R => Some(1),
            Layer::F => Some(2),
            Layer::D => Some(3),
            Layer::L => Some(4),
            Layer::B => Some(5),
            _ => None,
        }
    }

    /// Color shown on facelet slot `slot` of the corner position `q`.
    pub fn corner_sticker(&self, q: Corner, slot: usize) -> Color {
        let piece = self.cc.cp[q as usize] as usize;
        let ori = self.cc.co[q as usize] as usize;
        CORNER_COLOR[piece][(slot + 3 - ori) % 3]
    }

    /// Color shown on facelet slot `slot` of the edge position `q`.
    pub fn edge_sticker(&self, q: Edge, slot: usize) -> Color {
        let piece = self.cc.ep[q as usize] as usize;
        let ori = self.cc.eo[q as usize] as usize;
        EDGE_COLOR[piece][(slot + ori) % 2]
    }

    /// All stickers of the face show its center color (OLL-style check).
    pub fn is_face_oriented(&self, l: Layer) -> bool {
        let Some(face) = Cube::face_index(l) else {
            return false;
        };
        let center = self.cc.center[face];
        for q in 0..8 {
            for (slot, fl) in CORNER_FACELET[q].iter().enumerate() {
                if *fl as usize / 9 == face
                    && self.corner_sticker(Corner::try_from(q as u8).unwrap(), slot) != center
                {
                    return false;
                }
            }
        }
        for q in 0..12 {
            for (slot, fl) in EDGE_FACELET[q].iter().enumerate() {
                if *fl as usize / 9 == face
                    && self.edge_sticker(Edge::try_from(q as u8).unwrap(), slot) != center
                {
                    return false;
                }
            }
        }
        true
    }

    /// Every edge sticker of the face shows the face color or the opposite
    /// face color (Roux L6E orientation check).
    pub fn is_face_oriented2(&self, l: Layer) -> bool {
        let Some(face) = Cube::face_index(l) else {
            return false;
        };
        let center = self.cc.center[face];
        let opposite = self.cc.center[match face {
            0 => 3,
            3 => 0,
            1 => 4,
            4 => 1,
            2 => 5,
            _ => 2,
        }];
        for q in 0..12 {
            for (slot, fl) in EDGE_FACELET[q].iter().enumerate() {
                if *fl as usize / 9 == face {
                    let c = self.edge_sticker(Edge::try_from(q as u8).unwrap(), slot);
                    if c != center && c != opposite {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Current positions of the pieces belonging to the given F2L slot.
    fn f2l_slot_positions(&self, slot: Corner) -> (Corner, Edge) {
        let r = rotated_solved(self.spin());
        let edge_slot = match slot {
            Corner::DFR => Edge::FR,
            Corner::DLF => Edge::FL,
            Corner::DBL => Edge::BL,
            _ => Edge::BR,
        };
        let corner_piece = r.cp[slot as usize];
        let edge_piece = r.ep[edge_slot as usize];
        (
            self.position_of_corner(corner_piece),
            self.position_of_edge(edge_piece),
        )
    }

    /// The F2L pair's corner sits next to its edge, orientation not checked.
    pub fn f2l_pair_adjacent(&self, slot: Corner) -> bool {
        use Corner::*;
        use Edge::*;
        let (qc, qe) = self.f2l_slot_positions(slot);
        match qc {
            URF => qe == UF || qe == UR || qe == FR,
            UFL => qe == UF || qe == UL || qe == FL,
            UBR => qe == UB || qe == UR || qe == BR,
            ULB => qe == UB || qe == UL || qe == BL,
            DFR => qe == DF || qe == DR || qe == FR,
            DLF => qe == DF || qe == DL || qe == FL,
            DBL => qe == DB || qe == DL || qe == BL,
            DRB => qe == DB || qe == DR || qe == BR,
        }
    }

    /// The common colors of the F2L pair face the same way.
    pub fn f2l_pair_oriented(&self, slot: Corner) -> bool {
        let (qc, qe) = self.f2l_slot_positions(slot);
        let es1 = self.edge_sticker(qe, 0);
        let es2 = self.edge_sticker(qe, 1);
        let cs1 = self.corner_sticker(qc, 0);
        let cs2 = self.corner_sticker(qc, 1);
        let cs3 = self.corner_sticker(qc, 2);
        ((es1 == cs1) && (es2 == cs2))
            || ((es1 == cs1) && (es2 == cs1))
            || ((es1 == cs1) && (es2 == cs3))
            || ((es1 == cs3) && (es2 == cs1))
            || ((es1 == cs2) && (es2 == cs3))
            || ((es1 == cs3) && (es2 == cs2))
    }

    /// Both pieces of the F2L slot currently sit in the given layer.
    pub fn f2l_pair_in_layer(&self, slot: Corner, l: Layer) -> bool {
        let (qc, qe) = self.f2l_slot_positions(slot);
        Cube::layer_corners(l).contains(&qc) && Cube::layer_edges(l).contains(&qe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move::*;
    use crate::spin::ALL_SPINS;

    #[test]
    fn test_solved_under_rotation() {
        for r in crate::moves::ROTATIONS {
            let mut c = Cube::new();
            c.apply(r);
            assert!(c.is_solved());
            assert!(c.is_group_solved(PieceGroup::All));
            assert!(c.check_orientation(PieceGroup::AllEdges));
            assert!(c.check_orientation(PieceGroup::AllCorners));
        }
    }

    #[test]
    fn test_spin_roundtrip() {
        for s in ALL_SPINS {
            let mut c = Cube::new();
            c.set_spin(s);
            assert_eq!(c.spin(), s);
            assert!(c.is_solved());
            c.set_spin(Spin::UF);
            assert_eq!(c.cc, crate::cubie::SOLVED_CUBIE_CUBE);
        }
    }

    #[test]
    fn test_cross_predicates() {
        let c = Cube::from_moves(&[U]);
        assert!(c.is_group_solved(PieceGroup::CrossD));
        assert!(!c.is_group_solved(PieceGroup::CrossU));
        let c = Cube::from_moves(&[R]);
        assert!(!c.is_group_solved(PieceGroup::CrossD));
    }

    #[test]
    fn test_roux_block_preserved_by_r_u() {
        // the bottom left 1x2x3 never moves under R, U, M or r turns
        let c = Cube::from_moves(&[R, U, R3, U2, M, Rw, U, Rw3, M2]);
        assert!(c.is_group_solved(PieceGroup::RouxFb));
        let c = Cube::from_moves(&[L]);
        assert!(!c.is_group_solved(PieceGroup::RouxFb));
    }

    #[test]
    fn test_block_for_other_spin() {
        // after x2 the cube is upside down; the bottom-left block in that
        // orientation corresponds to spin FB-flipped groups
        let mut c = Cube::new();
        c.apply(x2);
        for s in ALL_SPINS {
            assert!(c.is_group_solved_for(PieceGroup::RouxFb, s));
        }
        let mut c = Cube::from_moves(&[L]);
        // an L turn breaks the block for some spins but not all
        assert!(c.is_group_solved_for(PieceGroup::RouxFb, Spin::LF));
        assert!(!c.is_group_solved_for(PieceGroup::RouxFb, Spin::UF));
        c.apply(L3);
        assert!(c.is_group_solved_for(PieceGroup::RouxFb, Spin::UF));
    }

    #[test]
    fn test_orientation_checks() {
        // F flips four edges in the reference frame
        let c = Cube::from_moves(&[F]);
        assert!(!c.check_orientation(PieceGroup::AllEdges));
        // U and R preserve edge orientation
        let c = Cube::from_moves(&[U, R, U2, R3]);
        assert!(c.check_orientation(PieceGroup::AllEdges));
        // M from solved flips the M slice edges
        let c = Cube::from_moves(&[M]);
        assert!(!c.check_orientation(PieceGroup::AllEdges));
    }

    #[test]
    fn test_positions_match() {
        // U2 keeps the up edges in the up layer but moves them around
        let c = Cube::from_moves(&[U2]);
        assert!(!c.positions_match(PieceGroup::CrossU));
        let c = Cube::from_moves(&[U, U3]);
        assert!(c.positions_match(PieceGroup::CrossU));
    }

    #[test]
    fn test_face_oriented() {
        let c = Cube::new();
        assert!(c.is_face_oriented(Layer::U));
        let c = Cube::from_moves(&[R, U, R3]);
        assert!(!c.is_face_oriented(Layer::U));
        // a bare U-layer turn keeps every U sticker on top
        let c = Cube::from_moves(&[U2]);
        assert!(c.is_face_oriented(Layer::U));
    }

    #[test]
    fn test_face_oriented2() {
        let c = Cube::new();
        assert!(c.is_face_oriented2(Layer::U));
        // M2 keeps all edge stickers in the U/D color pair on U and D
        let c = Cube::from_moves(&[M2]);
        assert!(c.is_face_oriented2(Layer::U));
        assert!(c.is_face_oriented2(Layer::D));
        // F brings side colors onto U
        let c = Cube::from_moves(&[F]);
        assert!(!c.is_face_oriented2(Layer::U));
    }

    #[test]
    fn test_f2l_pair_queries() {
        let c = Cube::new();
        for slot in [Corner::DFR, Corner::DLF, Corner::DBL, Corner::DRB] {
            assert!(c.f2l_pair_adjacent(slot));
            assert!(c.f2l_pair_oriented(slot));
            assert!(c.f2l_pair_in_layer(slot, Layer::D) || c.f2l_pair_adjacent(slot));
        }
        // pull the DFR pair out
        let c = Cube::from_moves(&[R, U, R3]);
        assert!(!c.is_group_solved(PieceGroup::F2lPair(Corner::DFR)));
        assert!(c.is_group_solved(PieceGroup::F2lPair(Corner::DLF)));
    }

    #[test]
    fn test_layer_solved() {
        let c = Cube::from_moves(&[U]);
        assert!(!c.is_layer_solved(Layer::U));
        assert!(c.is_layer_solved(Layer::D));
        assert!(c.is_layer_solved(Layer::E));
    }

    #[test]
    fn test_predicates_on_generated_states() {
        use crate::generator::Generator;
        for _ in 0..10 {
            let c = Cube {
                cc: Generator::solved_groups(&[PieceGroup::CrossD]),
            };
            assert!(c.is_group_solved(PieceGroup::CrossD));

            let c = Cube {
                cc: Generator::solved_groups(&[PieceGroup::PetrusBlock]),
            };
            assert!(c.is_group_solved(PieceGroup::PetrusBlock));
            assert!(c.is_group_solved_for(PieceGroup::PetrusBlock, Spin::UF));
        }
        // the superflip keeps every piece in place but none oriented
        let c = Cube {
            cc: Generator::superflip(),
        };
        assert!(c.positions_match(PieceGroup::AllEdges));
        assert!(!c.check_orientation(PieceGroup::AllEdges));
        assert!(!c.is_solved());
    }
}

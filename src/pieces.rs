use crate::cubie::{Corner, Corner::*, Edge, Edge::*};

/// A named set of cube pieces tested together as a predicate.
///
/// Groups are defined by the positions they occupy in the observer's frame:
/// the cube is held in some spin and the group names the corner and edge
/// positions that must match the solved cube held in the same spin. One
/// definition therefore serves all 24 spins; the spin binding happens at the
/// `Cube` predicate call.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceGroup {
    AllCorners,
    AllEdges,
    All,
    /// The four down-layer cross edges.
    CrossD,
    /// The four up-layer edges.
    CrossU,
    /// An F2L corner/edge pair, named by its down-layer corner position.
    F2lPair(Corner),
    /// Both first layers: down layer plus middle ring.
    F2l,
    LayerU,
    LayerD,
    /// The middle ring between the first and last layer (E slice).
    LayerE,
    /// The vertical middle slice between R and L (M slice).
    LayerM,
    /// The vertical middle slice between F and B (S slice).
    LayerS,
    CornersU,
    CornersD,
    /// Roux first block: 1x2x3 on the bottom left.
    RouxFb,
    /// Back 1x2x2 square of the Roux first block.
    RouxFbSquare,
    /// Roux second block: 1x2x3 on the bottom right.
    RouxSb,
    /// Front 1x2x2 square of the Roux second block.
    RouxSbSquareFront,
    /// Back 1x2x2 square of the Roux second block.
    RouxSbSquareBack,
    /// Petrus 2x2x2 block in the bottom back left.
    PetrusBlock,
    /// Petrus 2x2x3 expanded block: bottom left two thirds of the cube.
    PetrusExpandedBlock,
    /// The ZZ EO-line edges (DF and DB).
    EoLine,
    /// YruRU CP line: the 1x1x3 column on the bottom left.
    CpLine,
    /// Three of the four middle-ring edges (Mehta belt quarters).
    BeltQuarter(Edge),
    /// Nautilus second block: 2x2x2 in the bottom back right.
    NautilusSb,
    /// Nautilus second block square: DRB corner with DR and BR edges.
    NautilusSbSquare,
    /// The UL and UR edges (Roux L6E intermediate target).
    EdgesUlUr,
}

impl PieceGroup {
    /// Corner positions belonging to the group.
    pub fn corners(self) -> &'static [Corner] {
        match self {
            PieceGroup::AllCorners | PieceGroup::All => {
                &[URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB]
            }
            PieceGroup::AllEdges
            | PieceGroup::CrossD
            | PieceGroup::CrossU
            | PieceGroup::LayerE
            | PieceGroup::LayerM
            | PieceGroup::LayerS
            | PieceGroup::EoLine
            | PieceGroup::EdgesUlUr => &[],
            PieceGroup::F2lPair(c) => match c {
                DFR => &[DFR],
                DLF => &[DLF],
                DBL => &[DBL],
                DRB => &[DRB],
                _ => &[],
            },
            PieceGroup::F2l | PieceGroup::LayerD | PieceGroup::CornersD => {
                &[DFR, DLF, DBL, DRB]
            }
            PieceGroup::LayerU | PieceGroup::CornersU => &[URF, UFL, ULB, UBR],
            PieceGroup::RouxFb => &[DLF, DBL],
            PieceGroup::RouxFbSquare => &[DBL],
            PieceGroup::RouxSb => &[DFR, DRB],
            PieceGroup::RouxSbSquareFront => &[DFR],
            PieceGroup::RouxSbSquareBack => &[DRB],
            PieceGroup::PetrusBlock => &[DBL],
            PieceGroup::PetrusExpandedBlock => &[DLF, DBL],
            PieceGroup::CpLine => &[DLF, DBL],
            PieceGroup::BeltQuarter(_) => &[],
            PieceGroup::NautilusSb | PieceGroup::NautilusSbSquare => &[DRB],
        }
    }

    /// Edge positions belonging to the group.
    pub fn edges(self) -> &'static [Edge] {
        match self {
            PieceGroup::AllEdges | PieceGroup::All => {
                &[UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR]
            }
            PieceGroup::AllCorners
            | PieceGroup::CornersU
            | PieceGroup::CornersD => &[],
            PieceGroup::CrossD => &[DR, DF, DL, DB],
            PieceGroup::CrossU | PieceGroup::LayerU => &[UR, UF, UL, UB],
            PieceGroup::F2lPair(c) => match c {
                DFR => &[FR],
                DLF => &[FL],
                DBL => &[BL],
                DRB => &[BR],
                _ => &[],
            },
            PieceGroup::F2l => &[DR, DF, DL, DB, FR, FL, BL, BR],
            PieceGroup::LayerD => &[DR, DF, DL, DB],
            PieceGroup::LayerE => &[FR, FL, BL, BR],
            PieceGroup::LayerM => &[UF, UB, DF, DB],
            PieceGroup::LayerS => &[UR, UL, DR, DL],
            PieceGroup::RouxFb => &[DL, FL, BL],
            PieceGroup::RouxFbSquare => &[BL, DL],
            PieceGroup::RouxSb => &[DR, FR, BR],
            PieceGroup::RouxSbSquareFront => &[FR, DR],
            PieceGroup::RouxSbSquareBack => &[BR, DR],
            PieceGroup::PetrusBlock => &[DL, BL, DB],
            PieceGroup::PetrusExpandedBlock => &[DL, FL, BL, DF, DB],
            PieceGroup::EoLine => &[DF, DB],
            PieceGroup::CpLine => &[DL],
            PieceGroup::BeltQuarter(missing) => match missing {
                BR => &[FR, FL, BL],
                BL => &[FR, FL, BR],
                FL => &[FR, BL, BR],
                FR => &[FL, BL, BR],
                _ => &[FR, FL, BL, BR],
            },
            PieceGroup::NautilusSb => &[DR, BR, DB],
            PieceGroup::NautilusSbSquare => &[DR, BR],
            PieceGroup::EdgesUlUr => &[UL, UR],
        }
    }

    /// The four belt quarter groups (each drops one middle-ring edge).
    pub fn belt_quarters() -> [PieceGroup; 4] {
        [
            PieceGroup::BeltQuarter(BR),
            PieceGroup::BeltQuarter(BL),
            PieceGroup::BeltQuarter(FL),
            PieceGroup::BeltQuarter(FR),
        ]
    }

    /// The four F2L pair groups.
    pub fn f2l_pairs() -> [PieceGroup; 4] {
        [
            PieceGroup::F2lPair(DFR),
            PieceGroup::F2lPair(DLF),
            PieceGroup::F2lPair(DBL),
            PieceGroup::F2lPair(DRB),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_sizes() {
        assert_eq!(PieceGroup::All.corners().len(), 8);
        assert_eq!(PieceGroup::All.edges().len(), 12);
        assert_eq!(PieceGroup::CrossD.edges().len(), 4);
        assert_eq!(PieceGroup::RouxFb.corners().len(), 2);
        assert_eq!(PieceGroup::RouxFb.edges().len(), 3);
        assert_eq!(PieceGroup::PetrusExpandedBlock.edges().len(), 5);
        for g in PieceGroup::belt_quarters() {
            assert_eq!(g.edges().len(), 3);
        }
    }

    #[test]
    fn test_f2l_pair_slots() {
        assert_eq!(PieceGroup::F2lPair(DFR).edges(), &[FR]);
        assert_eq!(PieceGroup::F2lPair(DBL).edges(), &[BL]);
    }
}

use std::io::{stdout, Write};

use crossterm::{
    queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor},
};

use crate::facelet::{Color, FaceCube};

fn tint(color: Color) -> TermColor {
    match color {
        Color::U => TermColor::DarkYellow,
        Color::R => TermColor::Magenta,
        Color::F => TermColor::Green,
        Color::D => TermColor::White,
        Color::L => TermColor::Red,
        Color::B => TermColor::Blue,
    }
}

fn queue_row(out: &mut impl Write, row: &[Color; 3]) -> Result<(), std::io::Error> {
    for c in row {
        queue!(out, SetBackgroundColor(tint(*c)), Print("  "))?;
    }
    queue!(out, ResetColor)
}

/// Print the cube as an unfolded net with colored cells: U on top, the
/// L-F-R-B band in the middle, D at the bottom.
pub fn print_facelet(facelet: &FaceCube) -> Result<(), std::io::Error> {
    let mut out = stdout();
    let gap = "      "; // U and D sit above and below the F face

    queue!(out, Print("\n"))?;
    for row in facelet.face(0) {
        queue!(out, Print(gap))?;
        queue_row(&mut out, &row)?;
        queue!(out, Print("\n"))?;
    }
    for row_idx in 0..3 {
        for face in [4, 2, 1, 5] {
            let row = facelet.face(face)[row_idx];
            queue_row(&mut out, &row)?;
        }
        queue!(out, Print("\n"))?;
    }
    for row in facelet.face(3) {
        queue!(out, Print(gap))?;
        queue_row(&mut out, &row)?;
        queue!(out, Print("\n"))?;
    }
    queue!(out, Print("\n"))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubie::CubieCube;
    use crate::moves::Move::*;

    #[test]
    fn test_printer() {
        let cc = CubieCube::default().apply_moves(&[R, U, R3, U3, M, S, E]);
        let fc = FaceCube::from_cubie(&cc);
        assert!(print_facelet(&fc).is_ok());
    }
}

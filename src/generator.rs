use rand::random;

use crate::cubie::{permutation_parity, CubieCube};
use crate::pieces::PieceGroup;

/// Random cube states for tests and benchmarks, optionally constrained so
/// that chosen piece groups are already solved relative to the reference
/// spin. The free pieces are shuffled with balanced orientations and
/// matching permutation parity, so every generated state is reachable.
pub struct Generator {}

impl Generator {
    /// Uniform random reachable state.
    pub fn random() -> CubieCube {
        Generator::solved_groups(&[])
    }

    /// Random reachable state with every piece of the given groups in its
    /// home position and orientation; the remaining pieces are scrambled.
    pub fn solved_groups(groups: &[PieceGroup]) -> CubieCube {
        let mut fixed_corners = [false; 8];
        let mut fixed_edges = [false; 12];
        for g in groups {
            for &q in g.corners() {
                fixed_corners[q as usize] = true;
            }
            for &q in g.edges() {
                fixed_edges[q as usize] = true;
            }
        }
        let free_c: Vec<usize> = (0..8).filter(|i| !fixed_corners[*i]).collect();
        let free_e: Vec<usize> = (0..12).filter(|i| !fixed_edges[*i]).collect();

        let mut cc = CubieCube::default();
        shuffle_slots(&mut cc.cp, &free_c);
        shuffle_slots(&mut cc.ep, &free_e);
        if permutation_parity(&cc.cp) != permutation_parity(&cc.ep) {
            // swap two scrambled pieces of whichever kind has room; with at
            // most one free piece per kind no mismatch can arise
            if free_e.len() >= 2 {
                cc.ep.swap(free_e[0], free_e[1]);
            } else if free_c.len() >= 2 {
                cc.cp.swap(free_c[0], free_c[1]);
            }
        }
        spin_orientations(&mut cc.co, &free_c, 3);
        spin_orientations(&mut cc.eo, &free_e, 2);

        debug_assert!(cc.verify().is_ok());
        cc
    }

    /// All twelve edges flipped in place.
    pub fn superflip() -> CubieCube {
        let mut cc = CubieCube::default();
        cc.eo = [1; 12];
        cc
    }
}

/// Fisher-Yates restricted to the listed slots.
fn shuffle_slots<T>(arr: &mut [T], free: &[usize]) {
    for i in (1..free.len()).rev() {
        let j = random::<usize>() % (i + 1);
        arr.swap(free[i], free[j]);
    }
}

/// Random orientations over the free slots, the last one balancing the sum.
fn spin_orientations(ori: &mut [u8], free: &[usize], modulus: u8) {
    let Some((last, rest)) = free.split_last() else {
        return;
    };
    let modulus = u32::from(modulus);
    let mut sum = 0u32;
    for &i in rest {
        let o = random::<u32>() % modulus;
        ori[i] = o as u8;
        sum += o;
    }
    ori[*last] = ((modulus - sum % modulus) % modulus) as u8;
}

#[cfg(test)]
mod tests {
    use super::Generator;
    use crate::cube::Cube;
    use crate::pieces::PieceGroup;
    use crate::spin::Spin;

    #[test]
    fn test_random_states_are_reachable() {
        for _ in 0..20 {
            assert!(Generator::random().verify().is_ok());
        }
    }

    #[test]
    fn test_solved_groups_pin_their_pieces() {
        for _ in 0..10 {
            let cc = Generator::solved_groups(&[PieceGroup::CrossD]);
            assert!(cc.verify().is_ok());
            assert!(Cube { cc }.is_group_solved(PieceGroup::CrossD));

            let cc = Generator::solved_groups(&[PieceGroup::RouxFb, PieceGroup::RouxSb]);
            assert!(cc.verify().is_ok());
            let cube = Cube { cc };
            assert!(cube.is_group_solved_for(PieceGroup::RouxFb, Spin::UF));
            assert!(cube.is_group_solved_for(PieceGroup::RouxSb, Spin::UF));
        }
    }

    #[test]
    fn test_solved_groups_with_nearly_full_cube() {
        // only the last layer free: parity balancing must still work
        let cc = Generator::solved_groups(&[PieceGroup::F2l]);
        assert!(cc.verify().is_ok());
        assert!(Cube { cc }.is_group_solved(PieceGroup::F2l));
    }

    #[test]
    fn test_superflip() {
        let cc = Generator::superflip();
        assert!(cc.verify().is_ok());
        let cube = Cube { cc };
        assert!(!cube.check_orientation(PieceGroup::AllEdges));
        assert!(cube.positions_match(PieceGroup::All));
    }
}

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::moves::{Metrics, Move};

/// An ordered sequence of moves.
///
/// Single moves appended with [`Algorithm::append_grouped`] are rendered in
/// parentheses, the way setup and adjustment turns are conventionally
/// written. The parser expands parenthesised groups (with optional `2`/`3`
/// repeat suffixes) on read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Algorithm {
    moves: Vec<Move>,
    grouped: Vec<usize>,
}

/// The up-layer adjustment turns tried before/after collection algorithms.
pub const U_MOVES: [Move; 4] = [Move::N, Move::U, Move::U2, Move::U3];

/// The middle-ring adjustment turns (EOLE style lookups).
pub const E_MOVES: [Move; 4] = [Move::N, Move::E, Move::E2, Move::E3];

/// The y rotations tried to re-angle a collection algorithm.
pub const Y_TURNS: [Move; 4] = [Move::N, Move::y, Move::y2, Move::y3];

impl Algorithm {
    pub fn new() -> Self {
        Algorithm::default()
    }

    pub fn from_moves(moves: Vec<Move>) -> Self {
        Algorithm {
            moves,
            grouped: Vec::new(),
        }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of real steps (the no-op `N` does not count).
    pub fn num_steps(&self) -> usize {
        self.moves.iter().filter(|m| **m != Move::N).count()
    }

    pub fn first(&self) -> Move {
        *self.moves.first().unwrap_or(&Move::N)
    }

    pub fn last(&self) -> Move {
        *self.moves.last().unwrap_or(&Move::N)
    }

    pub fn clear(&mut self) {
        self.moves.clear();
        self.grouped.clear();
    }

    pub fn push(&mut self, m: Move) {
        if m != Move::N {
            self.moves.push(m);
        }
    }

    /// Append a single move rendered in parentheses (setup/adjustment turn).
    pub fn append_grouped(&mut self, m: Move) {
        if m != Move::N {
            self.grouped.push(self.moves.len());
            self.moves.push(m);
        }
    }

    pub fn append(&mut self, other: &Algorithm) {
        let offset = self.moves.len();
        self.moves.extend_from_slice(&other.moves);
        self.grouped.extend(other.grouped.iter().map(|i| i + offset));
    }

    /// Append a move, merging it with the last step when both act on the
    /// same layer. Returns true if a merge happened.
    pub fn append_shrink(&mut self, m: Move) -> bool {
        if m == Move::N {
            return false;
        }
        if let Some(&lastm) = self.moves.last() {
            if lastm.is_same_layer(m) {
                self.moves.pop();
                self.grouped.retain(|i| *i < self.moves.len());
                let combined = lastm + m;
                if combined != Move::N {
                    self.moves.push(combined);
                }
                return true;
            }
        }
        self.moves.push(m);
        false
    }

    pub fn erase_first(&mut self) {
        if !self.moves.is_empty() {
            self.moves.remove(0);
            self.grouped.retain(|i| *i > 0);
            for i in self.grouped.iter_mut() {
                *i -= 1;
            }
        }
    }

    /// Collapse adjacent same-layer turns and drop no-ops, to fixpoint.
    /// The result produces the same cube as the original.
    pub fn shrink(&self) -> Algorithm {
        let mut out: Vec<Move> = Vec::with_capacity(self.moves.len());
        for &m in &self.moves {
            if m == Move::N {
                continue;
            }
            match out.last() {
                Some(&t) if t.is_same_layer(m) => {
                    out.pop();
                    let combined = t + m;
                    if combined != Move::N {
                        out.push(combined);
                    }
                }
                _ => out.push(m),
            }
        }
        Algorithm::from_moves(out)
    }

    /// Like [`Algorithm::shrink`], mutating in place; reports whether the
    /// sequence changed.
    pub fn shrink_in_place(&mut self) -> bool {
        let shrunk = self.shrink();
        let changed = shrunk.moves != self.moves;
        if changed {
            *self = shrunk;
        }
        changed
    }

    /// Shrink applied across boundaries: same-layer turns also merge when
    /// only commuting (same axis) moves stand between them.
    pub fn cancellations(&self) -> Algorithm {
        let mut out: Vec<Move> = Vec::with_capacity(self.moves.len());
        let mut changed = true;
        let mut moves: Vec<Move> = self.moves.iter().filter(|m| **m != Move::N).copied().collect();
        while changed {
            changed = false;
            out.clear();
            for &m in &moves {
                let mut i = out.len();
                loop {
                    if i == 0 {
                        out.push(m);
                        break;
                    }
                    let t = out[i - 1];
                    if t.is_same_layer(m) {
                        let combined = t + m;
                        if combined == Move::N {
                            out.remove(i - 1);
                        } else {
                            out[i - 1] = combined;
                        }
                        changed = true;
                        break;
                    } else if same_axis(t, m) {
                        i -= 1;
                    } else {
                        out.push(m);
                        break;
                    }
                }
            }
            std::mem::swap(&mut moves, &mut out);
        }
        Algorithm::from_moves(moves)
    }

    /// Rewrite every step as if the whole cube were first rotated by
    /// `rotation`; `rotation · transformed == original · rotation`.
    pub fn transform_turn(&mut self, rotation: Move) {
        if rotation == Move::N {
            return;
        }
        for m in self.moves.iter_mut() {
            *m = m.transform(rotation);
        }
    }

    /// Substitute wide turns by their rotation-plus-face equivalents so the
    /// sequence starts and ends at natural grips. Cube effect is preserved;
    /// a leading rotation may surface for the caller to migrate.
    pub fn regrip(&self) -> Algorithm {
        let mut out = Algorithm::new();
        for &m in &self.moves {
            if m.is_wide() {
                let (rot, face) = match m.get_face() {
                    "Uw" => (Move::y, Move::D),
                    "Dw" => (Move::y3, Move::U),
                    "Rw" => (Move::x, Move::L),
                    "Lw" => (Move::x3, Move::R),
                    "Fw" => (Move::z, Move::B),
                    _ => (Move::z3, Move::F),
                };
                out.push(rot * m.turns());
                out.push(face * m.turns());
            } else {
                out.push(m);
            }
        }
        out.shrink()
    }

    /// Inverse sequence: applying `self` then the inverse is the identity.
    pub fn inverted(&self) -> Algorithm {
        let mut out: Vec<Move> = self.moves.iter().map(|m| m.get_inverse()).collect();
        out.reverse();
        Algorithm::from_moves(out)
    }

    /// Length of the sequence under the given metric.
    pub fn metric(&self, m: Metrics) -> f32 {
        self.moves.iter().map(|mv| mv.cost(m)).sum()
    }

    /// Ergonomics penalty, used as a secondary ranking key.
    pub fn subjective_score(&self) -> u32 {
        self.moves.iter().map(|m| m.subjective_weight()).sum()
    }

    /// Two algorithms are AUF-equivalent when an up-layer turn before and
    /// after one of them produces the other's cube effect.
    pub fn equivalent_under_auf(&self, other: &Algorithm) -> bool {
        let target = crate::cubie::CubieCube::default().apply_moves(&other.moves);
        for pre in U_MOVES {
            for post in U_MOVES {
                let mut c = crate::cubie::CubieCube::default().apply_move(pre);
                c = c.apply_moves(&self.moves);
                c = c.apply_move(post);
                if c == target {
                    return true;
                }
            }
        }
        false
    }

    /// Format a metric value without trailing zeros (8 not 8.0, 8.5 stays).
    pub fn metric_value(v: f32) -> String {
        if (v - v.round()).abs() < f32::EPSILON {
            format!("{}", v.round() as i64)
        } else {
            format!("{:.1}", v)
        }
    }
}

/// Moves on the same rotation axis commute.
fn same_axis(a: Move, b: Move) -> bool {
    fn axis(m: Move) -> usize {
        match m.get_face() {
            "U" | "D" | "E" | "Uw" | "Dw" | "y" => 0,
            "R" | "L" | "M" | "Rw" | "Lw" | "x" => 1,
            _ => 2,
        }
    }
    a != Move::N && b != Move::N && axis(a) == axis(b)
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, m) in self.moves.iter().enumerate() {
            if *m == Move::N {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            if self.grouped.contains(&i) {
                write!(f, "({})", m)?;
            } else {
                write!(f, "{}", m)?;
            }
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse WCA-extended notation. Whitespace is ignored; parentheses group
    /// sub-sequences and accept a repeat count suffix, e.g. `(R U)3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut moves: Vec<Move> = Vec::new();
        let mut grouped: Vec<usize> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            if c == '(' {
                stack.push(moves.len());
                i += 1;
                continue;
            }
            if c == ')' {
                let start = stack.pop().ok_or(Error::InvalidScramble)?;
                let mut reps = 1;
                if i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
                    reps = chars[i + 1].to_digit(10).unwrap() as usize;
                    i += 1;
                }
                if reps == 0 {
                    return Err(Error::InvalidScramble);
                }
                let body: Vec<Move> = moves[start..].to_vec();
                for _ in 1..reps {
                    moves.extend_from_slice(&body);
                }
                if body.len() == 1 && reps == 1 {
                    grouped.push(start);
                }
                i += 1;
                continue;
            }
            // one move token: base letter, optional 'w', optional suffix
            let mut token = String::new();
            token.push(c);
            i += 1;
            if i < chars.len() && chars[i] == 'w' {
                token.push('w');
                i += 1;
            }
            if i < chars.len() && (chars[i] == '\'' || chars[i] == '2' || chars[i] == '3') {
                token.push(chars[i]);
                i += 1;
            }
            moves.push(Move::from_str(&token)?);
        }
        if !stack.is_empty() {
            return Err(Error::InvalidScramble);
        }
        Ok(Algorithm { moves, grouped })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::cubie::CubieCube;
    use crate::moves::Move::*;
    use crate::moves::{Metrics, ROTATIONS};

    fn state(alg: &Algorithm) -> CubieCube {
        CubieCube::default().apply_moves(alg.moves())
    }

    #[test]
    fn test_parse_roundtrip() {
        let alg = Algorithm::from_str("R U R' U' r M2 x y' Fw2").unwrap();
        assert_eq!(alg.num_steps(), 9);
        let text = alg.to_string();
        let again = Algorithm::from_str(&text).unwrap();
        assert_eq!(alg.moves(), again.moves());
    }

    #[test]
    fn test_parse_whitespace_insensitive() {
        let a = Algorithm::from_str("RUR'U'").unwrap();
        let b = Algorithm::from_str("R U R' U'").unwrap();
        assert_eq!(a.moves(), b.moves());
    }

    #[test]
    fn test_parse_parentheses() {
        let alg = Algorithm::from_str("(R U)3").unwrap();
        assert_eq!(alg.moves(), &[R, U, R, U, R, U]);
        let alg = Algorithm::from_str("(U)").unwrap();
        assert_eq!(alg.moves(), &[U]);
        assert_eq!(alg.to_string(), "(U)");
        assert!(Algorithm::from_str("(R U").is_err());
        assert!(Algorithm::from_str("R U)").is_err());
    }

    #[test]
    fn test_shrink() {
        let alg = Algorithm::from_str("R R").unwrap();
        assert_eq!(alg.shrink().moves(), &[R2]);
        let alg = Algorithm::from_str("R R'").unwrap();
        assert!(alg.shrink().is_empty());
        let alg = Algorithm::from_str("R L L' R' U").unwrap();
        assert_eq!(alg.shrink().moves(), &[U]);
        let alg = Algorithm::from_str("U U2 U").unwrap();
        assert!(alg.shrink().is_empty());
    }

    #[test]
    fn test_shrink_idempotent_and_preserving() {
        let alg = Algorithm::from_str("R R U U' L2 L2 F F F F' M M'").unwrap();
        let once = alg.shrink();
        let twice = once.shrink();
        assert_eq!(once, twice);
        assert_eq!(state(&alg), state(&once));
    }

    #[test]
    fn test_append_shrink() {
        let mut alg = Algorithm::from_str("R U").unwrap();
        assert!(alg.append_shrink(U));
        assert_eq!(alg.moves(), &[R, U2]);
        assert!(!alg.append_shrink(F));
        assert_eq!(alg.moves(), &[R, U2, F]);
    }

    #[test]
    fn test_cancellations_across_boundary() {
        // the D2 moves merge across the commuting U turn
        let alg = Algorithm::from_str("D2 U D2 U'").unwrap();
        let c = alg.cancellations();
        assert_eq!(state(&alg), state(&c));
        assert!(c.metric(Metrics::HTM) < alg.metric(Metrics::HTM));
        // plain adjacent merge still applies
        let alg = Algorithm::from_str("R U U R").unwrap();
        assert_eq!(alg.cancellations().moves(), &[R, U2, R]);
    }

    #[test]
    fn test_metric_additivity() {
        let a = Algorithm::from_str("R U R'").unwrap();
        let b = Algorithm::from_str("F2 D").unwrap();
        let mut ab = a.clone();
        ab.append(&b);
        for m in [Metrics::HTM, Metrics::QTM, Metrics::STM, Metrics::OBTM] {
            assert_eq!(ab.metric(m), a.metric(m) + b.metric(m));
        }
    }

    #[test]
    fn test_transform_turn_law() {
        // cube after σ, then r == cube after r, then transformed σ
        let alg = Algorithm::from_str("R U2 F' L D B2 M E' Rw").unwrap();
        for r in ROTATIONS {
            let mut t = alg.clone();
            t.transform_turn(r);
            let lhs = CubieCube::default().apply_move(r).apply_moves(t.moves());
            let rhs = state(&alg).apply_move(r);
            assert_eq!(lhs, rhs, "transform_turn broken for rotation {}", r);
        }
    }

    #[test]
    fn test_regrip_preserves_effect() {
        let alg = Algorithm::from_str("Rw U Rw' M' U2 Fw Dw'").unwrap();
        let re = alg.regrip();
        assert_eq!(state(&alg), state(&re));
        assert!(re.moves().iter().all(|m| !m.is_wide()));
    }

    #[test]
    fn test_inverted() {
        let alg = Algorithm::from_str("R U2 F' M").unwrap();
        let mut both = alg.clone();
        both.append(&alg.inverted());
        assert_eq!(state(&both), CubieCube::default());
    }

    #[test]
    fn test_equivalent_under_auf() {
        let a = Algorithm::from_str("R U R'").unwrap();
        let mut b = Algorithm::new();
        b.push(U);
        b.append(&a);
        let mut pre = Algorithm::from_str("U'").unwrap();
        pre.append(&b);
        assert!(b.equivalent_under_auf(&b));
        assert!(pre.equivalent_under_auf(&a));
    }

    #[test]
    fn test_subjective_score_prefers_right_hand() {
        let nice = Algorithm::from_str("R U R' U'").unwrap();
        let ugly = Algorithm::from_str("B S B' S'").unwrap();
        assert!(nice.subjective_score() < ugly.subjective_score());
    }

    #[test]
    fn test_erase_first_and_grouped() {
        let mut alg = Algorithm::new();
        alg.append_grouped(U);
        alg.push(R);
        assert_eq!(alg.to_string(), "(U) R");
        alg.erase_first();
        assert_eq!(alg.to_string(), "R");
    }
}
